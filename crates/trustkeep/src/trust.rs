//! Bounded in-memory cache over the durable record store.
//!
//! `TrustCache` keeps at most `capacity` owners' trusted lists resident.
//! A `load` miss reads the owner's record from the [`RecordStore`] (an
//! absent record materializes as an empty list); a hit returns the *same*
//! shared list as every previous load, so in-place mutation by the caller
//! is visible on subsequent loads without an explicit write-back. `save`
//! persists whatever the list currently holds.
//!
//! Known limitation: eviction from the bounded cache is silent and does not
//! persist. A mutation made to a loaded list that is evicted before `save`
//! is called is lost. The surrounding workflow always saves immediately
//! after mutating, before any other owner's load could evict the entry.

use std::sync::{Arc, Mutex, PoisonError};

use log::warn;

use crate::cache::BoundedCache;
use crate::error::Result;
use crate::identity::Identity;
use crate::store::{RecordStore, TrustRecord};

/// Shared, mutable trusted list for one owner.
///
/// The cache hands out clones of the same `Arc`, so all holders see one
/// list. Lock it briefly to read or mutate; never hold the lock across a
/// call back into the cache (in particular [`TrustCache::save`]).
pub type TrustedList = Arc<Mutex<Vec<Identity>>>;

/// Bounded lazy-load/write-back cache of per-owner trusted lists.
pub struct TrustCache {
    cache: BoundedCache<Identity, TrustedList>,
    store: RecordStore,
}

impl TrustCache {
    /// Create a cache over `store` holding at most `capacity` owners.
    pub fn new(store: RecordStore, capacity: usize) -> Self {
        Self {
            cache: BoundedCache::new(capacity),
            store,
        }
    }

    /// The trusted list for `owner`, loading it from the store on a miss.
    ///
    /// This is the only path that touches storage, and only on a miss. A
    /// missing record yields an empty list; an unreadable record is logged
    /// and treated the same, leaving the in-memory list authoritative from
    /// here on.
    pub fn load(&self, owner: Identity) -> TrustedList {
        if let Some(list) = self.cache.get(&owner) {
            return list;
        }
        let trusted = match self.store.load(&owner) {
            Ok(Some(record)) => record.trusted,
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("treating unreadable trust record for {owner} as empty: {e}");
                Vec::new()
            }
        };
        let list: TrustedList = Arc::new(Mutex::new(trusted));
        self.cache.put(owner, Arc::clone(&list));
        list
    }

    /// Persist the current in-memory list for `owner`.
    ///
    /// A no-op for owners that are not cache-resident — never loaded means
    /// never mutated. An empty list deletes the on-disk record.
    ///
    /// # Errors
    ///
    /// Returns the store's error on a failed write. The in-memory list is
    /// left untouched; callers treat this as a warning, not a failure.
    pub fn save(&self, owner: &Identity) -> Result<()> {
        let Some(list) = self.cache.get(owner) else {
            return Ok(());
        };
        let trusted = lock_list(&list).clone();
        self.store.save(&TrustRecord {
            owner: *owner,
            trusted,
        })
    }

    /// Whether `owner` currently trusts `requester`.
    ///
    /// Loads the owner's list if it is not resident. This answers the
    /// access request `(owner, requester) -> grant | no-opinion`.
    pub fn contains(&self, owner: Identity, requester: &Identity) -> bool {
        let list = self.load(owner);
        let trusted = lock_list(&list);
        trusted.contains(requester)
    }

    /// Number of owners currently resident.
    pub fn resident_count(&self) -> usize {
        self.cache.len()
    }

    /// Whether `owner`'s list is cache-resident, without touching recency.
    pub fn is_resident(&self, owner: &Identity) -> bool {
        self.cache.contains_key(owner)
    }
}

/// Lock a trusted list, recovering from poisoning.
///
/// The list is a plain `Vec`; a panic while it is locked cannot leave it
/// in a state worth refusing to read.
pub fn lock_list(list: &TrustedList) -> std::sync::MutexGuard<'_, Vec<Identity>> {
    list.lock().unwrap_or_else(PoisonError::into_inner)
}
