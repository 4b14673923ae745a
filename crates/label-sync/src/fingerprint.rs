//! Content fingerprints for change detection.

use sha2::{Digest, Sha256};
use std::fmt;

/// Lowercase hex SHA-256 digest of the raw label file bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint the given bytes.
    #[must_use]
    pub fn of(bytes: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(bytes)))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether `current` differs from the fingerprint of the last completed pass.
///
/// With no previous fingerprint the content always counts as changed.
#[must_use]
pub fn changed(previous: Option<&Fingerprint>, current: &Fingerprint) -> bool {
    previous != Some(current)
}
