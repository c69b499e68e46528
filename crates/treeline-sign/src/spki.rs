//! SPKI-encoded ed25519 scheme.
//!
//! Same signature wire shape as the plain ed25519 scheme, but public keys
//! are DER SubjectPublicKeyInfo documents (ed25519 algorithm identifier),
//! base64-encoded. This is the container commonly emitted by
//! `openssl pkey -pubout`.

use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use ed25519_dalek::VerifyingKey;

use crate::ed25519::verify_raw;
use crate::error::SchemeError;
use crate::metadata::MetaValue;

/// Metadata key under which SPKI signatures are attached to a commit
pub const SPKI_METADATA_KEY: &str = "treeline.sign.spki";

/// DER prefix of an ed25519 SubjectPublicKeyInfo document; the raw 32-byte
/// key follows immediately after.
const SPKI_ED25519_PREFIX: [u8; 12] = [
    0x30, 0x2a, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x03, 0x21, 0x00,
];

/// SPKI scheme instance holding the keys trusted for one verification attempt
#[derive(Debug, Default)]
pub struct SpkiScheme {
    keys: Vec<VerifyingKey>,
}

impl SpkiScheme {
    /// Create a scheme instance with an empty key store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of trusted keys currently loaded
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Load the trusted key set from a key file, replacing the store.
    /// One base64 SPKI document per line; `#` lines and blanks are skipped.
    pub fn load_keys_file(&mut self, path: &Path) -> Result<(), SchemeError> {
        let contents = fs::read_to_string(path).map_err(|source| SchemeError::KeyFile {
            path: path.to_path_buf(),
            source,
        })?;

        let mut loaded = Vec::new();
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            loaded.push(decode_spki_key(line)?);
        }

        self.keys = loaded;
        Ok(())
    }

    /// Add an inline base64 SPKI key to the store
    pub fn add_key(&mut self, inline: &str) -> Result<(), SchemeError> {
        self.keys.push(decode_spki_key(inline.trim())?);
        Ok(())
    }

    /// Replace the store with a single inline base64 SPKI key
    pub fn set_keys(&mut self, inline: &str) -> Result<(), SchemeError> {
        self.keys.clear();
        self.add_key(inline)
    }

    /// Verify `data` against the signature list from detached metadata
    pub fn verify(&self, data: &[u8], signatures: &MetaValue) -> Result<(), SchemeError> {
        let MetaValue::ByteArrays(sigs) = signatures else {
            return Err(SchemeError::WrongFormat { scheme: "spki" });
        };
        verify_raw(&self.keys, "spki", data, sigs)
    }
}

fn decode_spki_key(encoded: &str) -> Result<VerifyingKey, SchemeError> {
    let der = BASE64
        .decode(encoded)
        .map_err(|e| SchemeError::InvalidKey(e.to_string()))?;

    if der.len() != SPKI_ED25519_PREFIX.len() + 32 || der[..12] != SPKI_ED25519_PREFIX {
        return Err(SchemeError::InvalidKey(
            "not an ed25519 SubjectPublicKeyInfo document".to_string(),
        ));
    }

    let bytes: [u8; 32] = der[12..]
        .try_into()
        .map_err(|_| SchemeError::InvalidKey("truncated SubjectPublicKeyInfo".to_string()))?;
    VerifyingKey::from_bytes(&bytes).map_err(|e| SchemeError::InvalidKey(e.to_string()))
}

/// Encode a verifying key as a base64 SPKI document
pub fn encode_spki_key(key: &VerifyingKey) -> String {
    let mut der = Vec::with_capacity(SPKI_ED25519_PREFIX.len() + 32);
    der.extend_from_slice(&SPKI_ED25519_PREFIX);
    der.extend_from_slice(key.as_bytes());
    BASE64.encode(der)
}
