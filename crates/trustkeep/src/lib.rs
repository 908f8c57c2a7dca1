//! trustkeep — per-owner trusted-identity lists behind a bounded cache.
//!
//! Each owner's set of trusted identities is persisted as one small JSON
//! file and served through a fixed-capacity LRU cache that loads lazily on
//! miss and writes through on save. Staged additions go through a
//! propose/confirm workflow so an owner can review a change before it
//! lands.

pub mod cache;
pub mod confirm;
pub mod error;
pub mod identity;
pub mod manager;
pub mod store;
pub mod trust;

// Re-export primary types
pub use cache::BoundedCache;
pub use confirm::{CancelOutcome, ConfirmOutcome, ConfirmationWorkflow};
pub use error::{Result, TrustError};
pub use identity::Identity;
pub use manager::{AddOutcome, TrustConfig, TrustManager, DEFAULT_CACHE_SIZE};
pub use store::{RecordStore, TrustRecord};
pub use trust::{lock_list, TrustCache, TrustedList};
