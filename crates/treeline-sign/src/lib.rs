//! Treeline signature schemes.
//!
//! Pluggable signature formats used to authenticate commits pulled from a
//! remote. Each scheme defines where its signatures live in a commit's
//! detached metadata, how trusted public keys are loaded, and how a payload
//! is checked against a signature blob.
//!
//! The set of schemes is closed: [`SignScheme`] is a tagged union with one
//! variant per known format, and [`SignScheme::by_name`] is the registration
//! table resolving identifiers to instances. Identifiers listed by
//! [`SignScheme::list_names`] may still fail to resolve (a scheme can be
//! disabled in a given build or process); callers treat that as "unknown
//! scheme", not as an error.

pub mod dummy;
pub mod ed25519;
pub mod error;
pub mod metadata;
pub mod spki;

use std::path::Path;

pub use dummy::{DummyScheme, DUMMY_METADATA_KEY};
pub use ed25519::{Ed25519Scheme, ED25519_METADATA_KEY};
pub use error::SchemeError;
pub use metadata::{DetachedMetadata, MetaFormat, MetaValue};
pub use spki::{SpkiScheme, SPKI_METADATA_KEY};

/// Known scheme identifiers, in registry iteration order
const KNOWN_SCHEMES: &[&str] = &["ed25519", "spki", "dummy"];

/// A concrete signature scheme instance with its transient key store
#[derive(Debug)]
pub enum SignScheme {
    Ed25519(Ed25519Scheme),
    Spki(SpkiScheme),
    Dummy(DummyScheme),
}

impl SignScheme {
    /// All registered scheme identifiers, in the fixed order verification
    /// iterates them
    pub fn list_names() -> &'static [&'static str] {
        KNOWN_SCHEMES
    }

    /// Resolve an identifier to a fresh scheme instance with an empty key
    /// store. Returns `None` for identifiers that are listed but not
    /// available here ("dummy" resolves only when `TREELINE_SIGN_DUMMY=1`).
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "ed25519" => Some(SignScheme::Ed25519(Ed25519Scheme::new())),
            "spki" => Some(SignScheme::Spki(SpkiScheme::new())),
            "dummy" if dummy::enabled() => Some(SignScheme::Dummy(DummyScheme::new())),
            _ => None,
        }
    }

    /// Scheme identifier
    pub fn name(&self) -> &'static str {
        match self {
            SignScheme::Ed25519(_) => "ed25519",
            SignScheme::Spki(_) => "spki",
            SignScheme::Dummy(_) => "dummy",
        }
    }

    /// Detached-metadata key this scheme's signatures live under
    pub fn metadata_key(&self) -> &'static str {
        match self {
            SignScheme::Ed25519(_) => ED25519_METADATA_KEY,
            SignScheme::Spki(_) => SPKI_METADATA_KEY,
            SignScheme::Dummy(_) => DUMMY_METADATA_KEY,
        }
    }

    /// Expected shape of the metadata value under [`Self::metadata_key`]
    pub fn metadata_format(&self) -> MetaFormat {
        match self {
            SignScheme::Ed25519(_) | SignScheme::Spki(_) => MetaFormat::ByteArrays,
            SignScheme::Dummy(_) => MetaFormat::Strings,
        }
    }

    /// Load the trusted key set from a key file, replacing the store
    pub fn load_keys_file(&mut self, path: &Path) -> Result<(), SchemeError> {
        match self {
            SignScheme::Ed25519(s) => s.load_keys_file(path),
            SignScheme::Spki(s) => s.load_keys_file(path),
            SignScheme::Dummy(s) => s.load_keys_file(path),
        }
    }

    /// Add an inline key to the store
    pub fn add_key(&mut self, inline: &str) -> Result<(), SchemeError> {
        match self {
            SignScheme::Ed25519(s) => s.add_key(inline),
            SignScheme::Spki(s) => s.add_key(inline),
            SignScheme::Dummy(s) => s.add_key(inline),
        }
    }

    /// Replace the store with a single inline key
    pub fn set_keys(&mut self, inline: &str) -> Result<(), SchemeError> {
        match self {
            SignScheme::Ed25519(s) => s.set_keys(inline),
            SignScheme::Spki(s) => s.set_keys(inline),
            SignScheme::Dummy(s) => s.set_keys(inline),
        }
    }

    /// Number of trusted keys currently loaded
    pub fn key_count(&self) -> usize {
        match self {
            SignScheme::Ed25519(s) => s.key_count(),
            SignScheme::Spki(s) => s.key_count(),
            SignScheme::Dummy(s) => s.key_count(),
        }
    }

    /// Verify `data` against a signature blob extracted from detached
    /// metadata
    pub fn verify(&self, data: &[u8], signatures: &MetaValue) -> Result<(), SchemeError> {
        match self {
            SignScheme::Ed25519(s) => s.verify(data, signatures),
            SignScheme::Spki(s) => s.verify(data, signatures),
            SignScheme::Dummy(s) => s.verify(data, signatures),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_order_is_fixed() {
        assert_eq!(SignScheme::list_names(), &["ed25519", "spki", "dummy"]);
    }

    #[test]
    fn test_by_name_resolves_builtin_schemes() {
        assert!(matches!(
            SignScheme::by_name("ed25519"),
            Some(SignScheme::Ed25519(_))
        ));
        assert!(matches!(
            SignScheme::by_name("spki"),
            Some(SignScheme::Spki(_))
        ));
        assert!(SignScheme::by_name("no-such-scheme").is_none());
    }

    #[test]
    fn test_fresh_instance_has_empty_store() {
        let scheme = SignScheme::by_name("ed25519").unwrap();
        assert_eq!(scheme.key_count(), 0);
    }

    #[test]
    fn test_metadata_keys_are_distinct() {
        let keys = [ED25519_METADATA_KEY, SPKI_METADATA_KEY, DUMMY_METADATA_KEY];
        for (i, a) in keys.iter().enumerate() {
            for b in &keys[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
