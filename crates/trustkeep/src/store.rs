//! Durable one-file-per-owner persistence for trust records.
//!
//! Records are stored as JSON files under a dedicated directory:
//!
//! ```text
//! {base_dir}/
//! └── trusts/
//!     └── {owner-uuid}.json
//! ```
//!
//! File format:
//! ```json
//! { "owner": "<uuid>", "trusted": ["<uuid>", ...] }
//! ```
//!
//! A missing file is the expected "no trusts yet" case and is reported as
//! `Ok(None)`, never as an error. An owner whose trusted list becomes empty
//! has no file at all: `save` deletes instead of writing an empty record, so
//! the directory never accumulates stale empty files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrustError};
use crate::identity::Identity;

const TRUSTS_DIR: &str = "trusts";
const RECORD_EXT: &str = "json";

/// Persisted form of one owner's trusted-identity set.
///
/// The record only exists at save/load time; between those points the
/// in-memory trusted list owned by the cache is authoritative. `trusted`
/// must not contain duplicates — de-duplication is the mutating caller's
/// responsibility, not the store's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustRecord {
    /// The owner of the trusted set.
    pub owner: Identity,
    /// The identities the owner trusts.
    pub trusted: Vec<Identity>,
}

/// Filesystem-backed store for `TrustRecord`s, one file per owner.
pub struct RecordStore {
    dir: PathBuf,
}

impl RecordStore {
    /// Create a store rooted at `base_dir`.
    ///
    /// Creates the `trusts/` sub-directory if it does not already exist.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::Io` if the directory cannot be created.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = base_dir.into().join(TRUSTS_DIR);
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Load the record for `owner`, or `Ok(None)` if none is stored.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::MalformedRecord` if the file exists but cannot
    /// be parsed, or `TrustError::Io` for other filesystem errors.
    pub fn load(&self, owner: &Identity) -> Result<Option<TrustRecord>> {
        let path = self.record_path(owner);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record: TrustRecord =
            serde_json::from_slice(&bytes).map_err(|e| TrustError::MalformedRecord {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        Ok(Some(record))
    }

    /// Persist a record, overwriting the whole file.
    ///
    /// A record with an empty trusted list deletes the owner's file instead
    /// of writing it.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::Serialization` if serialization fails, or
    /// `TrustError::Io` for filesystem errors.
    pub fn save(&self, record: &TrustRecord) -> Result<()> {
        if record.trusted.is_empty() {
            return self.delete(&record.owner);
        }
        let json = serde_json::to_string(record)
            .map_err(|e| TrustError::Serialization(e.to_string()))?;
        std::fs::write(self.record_path(&record.owner), json.as_bytes())?;
        Ok(())
    }

    /// Delete the record for `owner`. Deleting a missing record is not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::Io` for filesystem errors other than the file
    /// not existing.
    pub fn delete(&self, owner: &Identity) -> Result<()> {
        match std::fs::remove_file(self.record_path(owner)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Build the filesystem path for an owner: `{base}/trusts/{owner}.json`.
    fn record_path(&self, owner: &Identity) -> PathBuf {
        self.dir.join(format!("{owner}.{RECORD_EXT}"))
    }
}
