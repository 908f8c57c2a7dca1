//! Top-level facade tying the trust cache and the confirmation workflow
//! together behind one configuration.
//!
//! `TrustManager` is what the surrounding command handler talks to: it owns
//! one [`TrustCache`] and one [`ConfirmationWorkflow`], both bounded by the
//! same configured size, and decides whether an `add` takes effect
//! immediately or is staged for confirmation.

use std::path::PathBuf;

use log::warn;

use crate::confirm::{CancelOutcome, ConfirmOutcome, ConfirmationWorkflow};
use crate::error::Result;
use crate::identity::Identity;
use crate::store::RecordStore;
use crate::trust::{lock_list, TrustCache};

/// Default number of owners (and pending proposals) resident at once.
pub const DEFAULT_CACHE_SIZE: usize = 1000;

/// Construction-time configuration for a [`TrustManager`].
#[derive(Debug, Clone)]
pub struct TrustConfig {
    /// Directory under which the `trusts/` record directory is created.
    pub data_dir: PathBuf,
    /// Capacity of both the trust cache and the pending-proposal cache.
    pub cache_size: usize,
    /// Whether `add` stages a proposal instead of mutating directly.
    pub confirm_required: bool,
}

impl TrustConfig {
    /// Configuration with default sizing rooted at `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            cache_size: DEFAULT_CACHE_SIZE,
            confirm_required: true,
        }
    }
}

/// Result of an `add` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// The candidates were staged; a `confirm` call will apply them.
    ConfirmationRequired,
    /// The not-yet-trusted candidates were appended and persisted.
    Added(Vec<Identity>),
}

/// Facade over one trust cache and one confirmation workflow.
pub struct TrustManager {
    trusts: TrustCache,
    confirmations: ConfirmationWorkflow,
    confirm_required: bool,
}

impl TrustManager {
    /// Build a manager from `config`, preparing the record directory.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::Io` if the record directory cannot be created.
    pub fn new(config: TrustConfig) -> Result<Self> {
        let store = RecordStore::new(config.data_dir)?;
        Ok(Self {
            trusts: TrustCache::new(store, config.cache_size),
            confirmations: ConfirmationWorkflow::new(config.cache_size),
            confirm_required: config.confirm_required,
        })
    }

    /// Add `candidates` to `owner`'s trusted list, or stage them for
    /// confirmation when the workflow requires it.
    ///
    /// Duplicate candidates are collapsed to their first appearance before
    /// anything else happens. In the direct path, candidates already trusted
    /// are skipped and the result reports only those actually appended.
    pub fn add(&self, owner: Identity, candidates: Vec<Identity>) -> AddOutcome {
        let candidates = dedup_preserving_order(candidates);
        if self.confirm_required {
            self.confirmations.propose(owner, candidates);
            return AddOutcome::ConfirmationRequired;
        }

        let list = self.trusts.load(owner);
        let mut added = Vec::new();
        {
            let mut trusted = lock_list(&list);
            for candidate in candidates {
                if !trusted.contains(&candidate) {
                    trusted.push(candidate);
                    added.push(candidate);
                }
            }
        }
        self.save_logging_failure(&owner);
        AddOutcome::Added(added)
    }

    /// Remove `targets` from `owner`'s trusted list, returning the ones
    /// that were actually present.
    pub fn remove(&self, owner: Identity, targets: &[Identity]) -> Vec<Identity> {
        let list = self.trusts.load(owner);
        let mut removed = Vec::new();
        {
            let mut trusted = lock_list(&list);
            for target in targets {
                if let Some(pos) = trusted.iter().position(|id| id == target) {
                    trusted.remove(pos);
                    removed.push(*target);
                }
            }
        }
        self.save_logging_failure(&owner);
        removed
    }

    /// Snapshot of `owner`'s current trusted list.
    pub fn list(&self, owner: Identity) -> Vec<Identity> {
        let list = self.trusts.load(owner);
        let trusted = lock_list(&list);
        trusted.clone()
    }

    /// Whether `owner` trusts `requester` — the access-request answer.
    pub fn is_trusted(&self, owner: Identity, requester: &Identity) -> bool {
        self.trusts.contains(owner, requester)
    }

    /// Apply `owner`'s pending proposal, if any.
    pub fn confirm(&self, owner: Identity) -> ConfirmOutcome {
        self.confirmations.confirm(owner, &self.trusts)
    }

    /// Discard `owner`'s pending proposal, if any.
    pub fn cancel(&self, owner: &Identity) -> CancelOutcome {
        self.confirmations.cancel(owner)
    }

    /// Whether `owner` has a pending proposal. Does not perturb any cache.
    pub fn is_pending(&self, owner: &Identity) -> bool {
        self.confirmations.is_pending(owner)
    }

    /// Persist `owner`'s current in-memory list.
    ///
    /// # Errors
    ///
    /// Returns the store's error on a failed write; the in-memory list is
    /// unaffected.
    pub fn save(&self, owner: &Identity) -> Result<()> {
        self.trusts.save(owner)
    }

    /// Direct access to the underlying trust cache.
    pub fn trusts(&self) -> &TrustCache {
        &self.trusts
    }

    fn save_logging_failure(&self, owner: &Identity) {
        if let Err(e) = self.trusts.save(owner) {
            warn!("unable to save trusts for {owner}: {e}");
        }
    }
}

/// Collapse duplicates, keeping each identity's first appearance.
fn dedup_preserving_order(candidates: Vec<Identity>) -> Vec<Identity> {
    let mut seen = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !seen.contains(&candidate) {
            seen.push(candidate);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(dir: &std::path::Path, confirm_required: bool) -> TrustManager {
        let config = TrustConfig {
            data_dir: dir.to_path_buf(),
            cache_size: 8,
            confirm_required,
        };
        TrustManager::new(config).unwrap()
    }

    #[test]
    fn test_direct_add_persists_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager(dir.path(), false);

        let owner = Identity::random();
        let friend = Identity::random();

        let outcome = manager.add(owner, vec![friend]);
        assert_eq!(outcome, AddOutcome::Added(vec![friend]));
        assert!(manager.is_trusted(owner, &friend));
        assert!(dir
            .path()
            .join("trusts")
            .join(format!("{owner}.json"))
            .exists());
    }

    #[test]
    fn test_gated_add_stages_a_proposal() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager(dir.path(), true);

        let owner = Identity::random();
        let friend = Identity::random();

        let outcome = manager.add(owner, vec![friend]);
        assert_eq!(outcome, AddOutcome::ConfirmationRequired);
        assert!(manager.is_pending(&owner));
        // Nothing is trusted or persisted until the confirmation.
        assert!(!manager.is_trusted(owner, &friend));

        let confirmed = manager.confirm(owner);
        assert_eq!(
            confirmed,
            ConfirmOutcome::Confirmed {
                added: vec![friend],
                already_trusted: vec![],
            }
        );
        assert!(manager.is_trusted(owner, &friend));
    }

    #[test]
    fn test_add_collapses_duplicate_candidates() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager(dir.path(), false);

        let owner = Identity::random();
        let friend = Identity::random();

        let outcome = manager.add(owner, vec![friend, friend, friend]);
        assert_eq!(outcome, AddOutcome::Added(vec![friend]));
        assert_eq!(manager.list(owner), vec![friend]);
    }

    #[test]
    fn test_direct_add_skips_already_trusted() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager(dir.path(), false);

        let owner = Identity::random();
        let (b, c) = (Identity::random(), Identity::random());

        manager.add(owner, vec![b]);
        let outcome = manager.add(owner, vec![b, c]);
        assert_eq!(outcome, AddOutcome::Added(vec![c]));
    }

    #[test]
    fn test_remove_reports_only_present_targets() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager(dir.path(), false);

        let owner = Identity::random();
        let (b, c) = (Identity::random(), Identity::random());
        let stranger = Identity::random();

        manager.add(owner, vec![b, c]);
        let removed = manager.remove(owner, &[b, stranger]);
        assert_eq!(removed, vec![b]);
        assert_eq!(manager.list(owner), vec![c]);
    }

    #[test]
    fn test_remove_last_trust_deletes_the_record_file() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager(dir.path(), false);

        let owner = Identity::random();
        let friend = Identity::random();
        let path = dir.path().join("trusts").join(format!("{owner}.json"));

        manager.add(owner, vec![friend]);
        assert!(path.exists());

        manager.remove(owner, &[friend]);
        assert!(!path.exists());
        assert!(manager.list(owner).is_empty());
    }

    #[test]
    fn test_cancel_after_gated_add() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager(dir.path(), true);

        let owner = Identity::random();
        manager.add(owner, vec![Identity::random()]);

        assert_eq!(manager.cancel(&owner), CancelOutcome::Cancelled);
        assert_eq!(manager.cancel(&owner), CancelOutcome::NothingPending);
        assert!(manager.list(owner).is_empty());
    }

    #[test]
    fn test_trusts_survive_a_manager_restart() {
        let dir = tempfile::tempdir().unwrap();
        let owner = Identity::random();
        let friend = Identity::random();

        {
            let manager = manager(dir.path(), false);
            manager.add(owner, vec![friend]);
        }

        let reopened = manager(dir.path(), false);
        assert!(reopened.is_trusted(owner, &friend));
    }

    #[test]
    fn test_failed_save_keeps_memory_authoritative() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager(dir.path(), false);

        let owner = Identity::random();
        let friend = Identity::random();

        // Make the record directory unwritable so the save fails.
        let trusts_dir = dir.path().join("trusts");
        let mut perms = std::fs::metadata(&trusts_dir).unwrap().permissions();
        let original = perms.clone();
        perms.set_readonly(true);
        std::fs::set_permissions(&trusts_dir, perms).unwrap();

        let outcome = manager.add(owner, vec![friend]);
        // The write failed, but the in-memory list took the addition.
        assert_eq!(outcome, AddOutcome::Added(vec![friend]));
        assert!(manager.is_trusted(owner, &friend));

        std::fs::set_permissions(&trusts_dir, original).unwrap();
        manager.save(&owner).expect("save after restoring permissions");
        assert!(trusts_dir.join(format!("{owner}.json")).exists());
    }
}
