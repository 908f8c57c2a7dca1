//! Two-phase propose/confirm workflow for staged trust additions.
//!
//! Each proposer has at most one pending proposal at a time, held in a
//! second bounded cache keyed by the proposer's identity. `propose`
//! overwrites any earlier proposal (last-writer-wins, no merge); `confirm`
//! consumes the proposal and moves its candidates into the proposer's
//! trusted list; `cancel` discards it. Both report a `NothingPending`
//! outcome instead of erroring when there is nothing to act on, so the
//! operations are idempotent from the caller's point of view.

use log::warn;

use crate::cache::BoundedCache;
use crate::identity::Identity;
use crate::trust::{lock_list, TrustCache};

/// Result of a `confirm` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// No proposal was pending for the proposer.
    NothingPending,
    /// A pending proposal was applied and persisted.
    Confirmed {
        /// Candidates newly appended to the trusted list, in proposal order.
        added: Vec<Identity>,
        /// Candidates skipped because they were already trusted.
        already_trusted: Vec<Identity>,
    },
}

/// Result of a `cancel` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// No proposal was pending for the proposer.
    NothingPending,
    /// The pending proposal was discarded.
    Cancelled,
}

/// Pending-proposal state machine, independent per proposer.
pub struct ConfirmationWorkflow {
    pending: BoundedCache<Identity, Vec<Identity>>,
}

impl ConfirmationWorkflow {
    /// Create a workflow tracking at most `capacity` pending proposals.
    pub fn new(capacity: usize) -> Self {
        Self {
            pending: BoundedCache::new(capacity),
        }
    }

    /// Stage `candidates` as the proposer's pending addition.
    ///
    /// Replaces any prior pending proposal for this proposer. The sequence
    /// is stored as given; callers are expected to have resolved and
    /// de-duplicated it.
    pub fn propose(&self, proposer: Identity, candidates: Vec<Identity>) {
        self.pending.put(proposer, candidates);
    }

    /// Apply the proposer's pending proposal to their trusted list.
    ///
    /// Candidates not already trusted are appended in proposal order and the
    /// list is persisted through `trusts`; the proposal is consumed either
    /// way. A failed write is logged and does not undo the in-memory
    /// addition — the list stays authoritative until the next save.
    pub fn confirm(&self, proposer: Identity, trusts: &TrustCache) -> ConfirmOutcome {
        let Some(candidates) = self.pending.remove(&proposer) else {
            return ConfirmOutcome::NothingPending;
        };

        let list = trusts.load(proposer);
        let mut added = Vec::new();
        let mut already_trusted = Vec::new();
        {
            let mut trusted = lock_list(&list);
            for candidate in candidates {
                if trusted.contains(&candidate) {
                    already_trusted.push(candidate);
                } else {
                    trusted.push(candidate);
                    added.push(candidate);
                }
            }
        }

        if let Err(e) = trusts.save(&proposer) {
            warn!("unable to save trusts for {proposer}: {e}");
        }

        ConfirmOutcome::Confirmed {
            added,
            already_trusted,
        }
    }

    /// Discard the proposer's pending proposal, if any.
    pub fn cancel(&self, proposer: &Identity) -> CancelOutcome {
        match self.pending.remove(proposer) {
            Some(_) => CancelOutcome::Cancelled,
            None => CancelOutcome::NothingPending,
        }
    }

    /// Whether the proposer has a pending proposal.
    ///
    /// A pure query: it must not perturb the LRU order of the pending
    /// cache, so it deliberately avoids `get`.
    pub fn is_pending(&self, proposer: &Identity) -> bool {
        self.pending.contains_key(proposer)
    }
}
