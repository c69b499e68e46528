//! Commit objects.
//!
//! A commit is a content-addressed metadata object identifying a tree
//! snapshot. The verification gate only sees its canonical serialized form:
//! the exact byte sequence producers sign over and the repository addresses
//! by checksum.

use sha2::{Digest, Sha256};

/// Compute the lowercase hex SHA-256 checksum of a byte sequence
pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// A commit in canonical serialized form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    bytes: Vec<u8>,
}

impl Commit {
    /// Wrap an already-canonical byte serialization
    pub fn from_canonical_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// The exact byte sequence every signature scheme signs over
    pub fn signed_data(&self) -> &[u8] {
        &self.bytes
    }

    /// Content address of this commit
    pub fn checksum(&self) -> String {
        compute_checksum(&self.bytes)
    }
}
