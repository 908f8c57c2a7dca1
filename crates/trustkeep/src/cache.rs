//! Bounded key/value cache with least-recently-used eviction.
//!
//! `BoundedCache` is a fixed-capacity map: every successful `get` and every
//! `put` marks the key most-recently-used, and a `put` that would exceed the
//! capacity synchronously evicts the single least-recently-used entry.
//! Eviction is silent — it performs no I/O and notifies nobody. Components
//! that need durability must persist an entry before anything can evict it.
//!
//! Recency is tracked with a queue of `(key, stamp)` pairs next to the entry
//! map. Touching a key pushes a fresh pair and bumps the entry's stamp, so
//! older pairs for the same key become ghosts; eviction skips ghosts by
//! comparing stamps, and the queue is compacted once ghosts outnumber live
//! entries so repeated lookups cannot grow it without bound.
//!
//! All operations lock an internal mutex, so a shared instance is safe under
//! concurrent calls from independent threads. A poisoned lock is recovered
//! rather than propagated — entries are plain values and every critical
//! section leaves the map and queue consistent.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Fixed-capacity LRU cache, internally synchronized.
///
/// Purely count-based: no TTL, no byte accounting. Capacity is fixed at
/// construction; a requested capacity of zero is clamped to one so the cache
/// always admits the entry being inserted.
pub struct BoundedCache<K, V> {
    inner: Mutex<Inner<K, V>>,
}

struct Inner<K, V> {
    capacity: usize,
    /// Monotonic access clock; each touch takes the next value.
    clock: u64,
    entries: HashMap<K, Slot<V>>,
    /// Recency queue, least-recently-used at the front. May contain ghost
    /// pairs whose stamp no longer matches the entry's.
    recency: VecDeque<(K, u64)>,
}

struct Slot<V> {
    value: V,
    touched: u64,
}

impl<K, V> BoundedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a cache holding at most `capacity` entries.
    ///
    /// `capacity` is clamped to a minimum of 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Mutex::new(Inner {
                capacity,
                clock: 0,
                entries: HashMap::with_capacity(capacity.min(1024)),
                recency: VecDeque::new(),
            }),
        }
    }

    /// Look up `key`, marking it most-recently-used on a hit.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut guard = self.locked();
        let inner = &mut *guard;
        let slot = inner.entries.get_mut(key)?;
        inner.clock += 1;
        slot.touched = inner.clock;
        let value = slot.value.clone();
        inner.recency.push_back((key.clone(), inner.clock));
        inner.maybe_compact();
        Some(value)
    }

    /// Insert or update `key`, marking it most-recently-used.
    ///
    /// When the insert pushes the cache over capacity, the least-recently-used
    /// entry is dropped as part of this call.
    pub fn put(&self, key: K, value: V) {
        let mut inner = self.locked();
        let stamp = inner.next_stamp();
        inner.entries.insert(key.clone(), Slot { value, touched: stamp });
        inner.recency.push_back((key, stamp));
        inner.evict_over_capacity();
        inner.maybe_compact();
    }

    /// Whether `key` is resident, without touching its recency.
    ///
    /// Use this for pure queries that must not perturb eviction order.
    pub fn contains_key(&self, key: &K) -> bool {
        self.locked().entries.contains_key(key)
    }

    /// Remove `key`, returning its value if it was resident.
    pub fn remove(&self, key: &K) -> Option<V> {
        // The recency queue keeps a ghost pair; eviction skips it later.
        self.locked().entries.remove(key).map(|slot| slot.value)
    }

    /// Number of resident entries.
    pub fn len(&self) -> usize {
        self.locked().entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.locked().entries.is_empty()
    }

    fn locked(&self) -> MutexGuard<'_, Inner<K, V>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<K, V> Inner<K, V>
where
    K: Eq + Hash + Clone,
{
    fn next_stamp(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Drop least-recently-used entries until the map fits the capacity.
    ///
    /// A popped pair whose stamp does not match the live entry is a ghost
    /// from an earlier touch (or a removed key) and is skipped.
    fn evict_over_capacity(&mut self) {
        while self.entries.len() > self.capacity {
            let Some((key, stamp)) = self.recency.pop_front() else {
                // Unreachable: every live entry has a matching pair queued.
                return;
            };
            let is_live = self
                .entries
                .get(&key)
                .is_some_and(|slot| slot.touched == stamp);
            if is_live {
                self.entries.remove(&key);
            }
        }
    }

    /// Rebuild the recency queue once ghosts outnumber live entries.
    ///
    /// Every live entry owns exactly one non-ghost pair, so the ghost count
    /// is `recency.len() - entries.len()`.
    fn maybe_compact(&mut self) {
        if self.recency.len() <= self.entries.len() * 2 + self.capacity {
            return;
        }
        let mut live: Vec<(K, u64)> = self
            .entries
            .iter()
            .map(|(key, slot)| (key.clone(), slot.touched))
            .collect();
        live.sort_unstable_by_key(|&(_, touched)| touched);
        self.recency = live.into();
    }
}
