//! Opaque 128-bit identity keys.
//!
//! An `Identity` names either an owner of a trust list or a party on one.
//! It carries no behavior beyond equality/hashing and a canonical string
//! encoding — the lowercase hyphenated UUID form — which doubles as the
//! on-disk filename stem for the owner's record.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TrustError;

/// Unique identifier for an owner or a trusted party.
///
/// Serializes as its canonical string form, so a `Vec<Identity>` becomes a
/// plain JSON array of UUID strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(Uuid);

impl Identity {
    /// Generate a fresh random (version 4) identity.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Construct from the raw 128-bit value.
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// The underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// The raw 128-bit value.
    pub const fn into_bytes(self) -> [u8; 16] {
        self.0.into_bytes()
    }
}

impl fmt::Display for Identity {
    /// Canonical encoding: lowercase hyphenated hex, e.g.
    /// `67e55044-10b1-426f-9247-bb680e5fe0c8`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.as_hyphenated())
    }
}

impl FromStr for Identity {
    type Err = TrustError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| TrustError::InvalidIdentity(format!("{s}: {e}")))
    }
}

impl From<Uuid> for Identity {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}
