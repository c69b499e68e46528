//! Test-only dummy scheme.
//!
//! Listed in the registry like any other scheme, but only resolvable when
//! `TREELINE_SIGN_DUMMY=1` is set in the environment. A "signature" is valid
//! when it is string-equal to a trusted key. Exists so the multi-scheme
//! protocol can be exercised without real cryptography.

use std::fs;
use std::path::Path;

use crate::error::SchemeError;
use crate::metadata::MetaValue;

/// Metadata key under which dummy signatures are attached to a commit
pub const DUMMY_METADATA_KEY: &str = "treeline.sign.dummy";

/// Dummy scheme instance; keys and signatures are plain strings
#[derive(Debug, Default)]
pub struct DummyScheme {
    keys: Vec<String>,
}

/// Whether the dummy scheme is resolvable in this process
pub(crate) fn enabled() -> bool {
    std::env::var_os("TREELINE_SIGN_DUMMY").is_some_and(|v| v == "1")
}

impl DummyScheme {
    /// Create a scheme instance with an empty key store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of trusted keys currently loaded
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Load trusted keys from a file, one per line, replacing the store
    pub fn load_keys_file(&mut self, path: &Path) -> Result<(), SchemeError> {
        let contents = fs::read_to_string(path).map_err(|source| SchemeError::KeyFile {
            path: path.to_path_buf(),
            source,
        })?;

        self.keys = contents
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(str::to_string)
            .collect();
        Ok(())
    }

    /// Add an inline key to the store
    pub fn add_key(&mut self, inline: &str) -> Result<(), SchemeError> {
        let inline = inline.trim();
        if inline.is_empty() {
            return Err(SchemeError::InvalidKey("empty dummy key".to_string()));
        }
        self.keys.push(inline.to_string());
        Ok(())
    }

    /// Replace the store with a single inline key
    pub fn set_keys(&mut self, inline: &str) -> Result<(), SchemeError> {
        self.keys.clear();
        self.add_key(inline)
    }

    /// A dummy signature verifies when it equals any trusted key
    pub fn verify(&self, _data: &[u8], signatures: &MetaValue) -> Result<(), SchemeError> {
        let MetaValue::Strings(sigs) = signatures else {
            return Err(SchemeError::WrongFormat { scheme: "dummy" });
        };

        if self.keys.is_empty() {
            return Err(SchemeError::NoKeys { scheme: "dummy" });
        }

        if sigs.iter().any(|s| self.keys.contains(s)) {
            return Ok(());
        }

        Err(SchemeError::NotVerified {
            keys: self.keys.len(),
            signatures: sigs.len(),
        })
    }
}
