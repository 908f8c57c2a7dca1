//! Error types for trustkeep.
//!
//! Nothing in this crate is fatal: the worst outcome of any failure is
//! that one owner's latest mutation was not durably persisted. A missing
//! record is the expected case and is not an error at all — the store
//! reports it as `Ok(None)`.

/// Trust error types covering all operations.
#[derive(Debug, thiserror::Error)]
pub enum TrustError {
    #[error("Invalid identity: {0}")]
    InvalidIdentity(String),

    #[error("Malformed trust record {path}: {reason}")]
    MalformedRecord { path: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, TrustError>;
