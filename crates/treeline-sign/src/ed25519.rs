//! Ed25519 signature scheme.
//!
//! Public keys are raw 32-byte ed25519 keys: base64-encoded when passed
//! inline through remote configuration, or stored one base64 key per line in
//! a key file (`#`-prefixed and blank lines are skipped). Signatures are raw
//! 64-byte ed25519 signatures carried as a byte-array list in detached
//! metadata.

use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use ed25519_dalek::{Signature, Signer as _, SigningKey, Verifier as _, VerifyingKey};

use crate::error::SchemeError;
use crate::metadata::MetaValue;

/// Metadata key under which ed25519 signatures are attached to a commit
pub const ED25519_METADATA_KEY: &str = "treeline.sign.ed25519";

/// Ed25519 scheme instance holding the keys trusted for one verification
/// attempt. An empty store is a legitimate state: it simply means no key
/// was configured for the remote.
#[derive(Debug, Default)]
pub struct Ed25519Scheme {
    keys: Vec<VerifyingKey>,
}

impl Ed25519Scheme {
    /// Create a scheme instance with an empty key store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of trusted keys currently loaded
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Load the trusted key set from a key file, replacing the store
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
            loaded.push(decode_public_key(line)?);
        }

        self.keys = loaded;
        Ok(())
    }

    /// Add an inline base64 key to the store
    pub fn add_key(&mut self, inline: &str) -> Result<(), SchemeError> {
        self.keys.push(decode_public_key(inline.trim())?);
        Ok(())
    }

    /// Replace the store with a single inline base64 key
    pub fn set_keys(&mut self, inline: &str) -> Result<(), SchemeError> {
        self.keys.clear();
        self.add_key(inline)
    }

    /// Verify `data` against the signature list from detached metadata.
    /// Succeeds when any signature matches any trusted key.
    pub fn verify(&self, data: &[u8], signatures: &MetaValue) -> Result<(), SchemeError> {
        let MetaValue::ByteArrays(sigs) = signatures else {
            return Err(SchemeError::WrongFormat { scheme: "ed25519" });
        };
        verify_raw(&self.keys, "ed25519", data, sigs)
    }
}

/// Check every signature against every trusted key; the first match wins.
/// Signature blobs that are not well-formed ed25519 signatures count as
/// non-matching rather than erroring out.
pub(crate) fn verify_raw(
    keys: &[VerifyingKey],
    scheme: &'static str,
    data: &[u8],
    sigs: &[Vec<u8>],
) -> Result<(), SchemeError> {
    if keys.is_empty() {
        return Err(SchemeError::NoKeys { scheme });
    }

    for raw in sigs {
        let Ok(sig) = Signature::from_slice(raw) else {
            continue;
        };
        for key in keys {
            if key.verify(data, &sig).is_ok() {
                return Ok(());
            }
        }
    }

    Err(SchemeError::NotVerified {
        keys: keys.len(),
        signatures: sigs.len(),
    })
}

fn decode_public_key(encoded: &str) -> Result<VerifyingKey, SchemeError> {
    let bytes = BASE64
        .decode(encoded)
        .map_err(|e| SchemeError::InvalidKey(e.to_string()))?;
    let bytes: [u8; 32] = bytes
        .try_into()
        .map_err(|_| SchemeError::InvalidKey("key must be 32 bytes".to_string()))?;
    VerifyingKey::from_bytes(&bytes).map_err(|e| SchemeError::InvalidKey(e.to_string()))
}

/// Generate a new ed25519 keypair (for producers and tests)
pub fn generate_keypair() -> SigningKey {
    SigningKey::generate(&mut rand::thread_rng())
}

/// Sign `data`, returning the raw 64-byte signature
pub fn sign_data(key: &SigningKey, data: &[u8]) -> Vec<u8> {
    key.sign(data).to_bytes().to_vec()
}

/// Encode a verifying key to the base64 form used in remote configuration
pub fn encode_verifying_key(key: &VerifyingKey) -> String {
    BASE64.encode(key.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_verify_valid_signature() {
        let keypair = generate_keypair();
        let data = b"commit payload";
        let sig = sign_data(&keypair, data);

        let mut scheme = Ed25519Scheme::new();
        scheme
            .add_key(&encode_verifying_key(&keypair.verifying_key()))
            .unwrap();

        let sigs = MetaValue::ByteArrays(vec![sig]);
        assert!(scheme.verify(data, &sigs).is_ok());
    }

    #[test]
    fn test_verify_wrong_key_fails() {
        let signer = generate_keypair();
        let other = generate_keypair();
        let data = b"commit payload";
        let sig = sign_data(&signer, data);

        let mut scheme = Ed25519Scheme::new();
        scheme
            .add_key(&encode_verifying_key(&other.verifying_key()))
            .unwrap();

        let sigs = MetaValue::ByteArrays(vec![sig]);
        assert!(matches!(
            scheme.verify(data, &sigs),
            Err(SchemeError::NotVerified { keys: 1, signatures: 1 })
        ));
    }

    #[test]
    fn test_verify_empty_store_fails() {
        let scheme = Ed25519Scheme::new();
        let sigs = MetaValue::ByteArrays(vec![vec![0u8; 64]]);

        assert!(matches!(
            scheme.verify(b"data", &sigs),
            Err(SchemeError::NoKeys { scheme: "ed25519" })
        ));
    }

    #[test]
    fn test_verify_any_of_several_signatures() {
        let signer = generate_keypair();
        let data = b"payload";
        let good = sign_data(&signer, data);

        let mut scheme = Ed25519Scheme::new();
        scheme
            .add_key(&encode_verifying_key(&signer.verifying_key()))
            .unwrap();

        // Garbage first, a malformed blob second, the real signature last
        let sigs = MetaValue::ByteArrays(vec![vec![0u8; 64], vec![1, 2, 3], good]);
        assert!(scheme.verify(data, &sigs).is_ok());
    }

    #[test]
    fn test_wrong_metadata_shape() {
        let mut scheme = Ed25519Scheme::new();
        scheme
            .add_key(&encode_verifying_key(&generate_keypair().verifying_key()))
            .unwrap();

        let sigs = MetaValue::Strings(vec!["not bytes".to_string()]);
        assert!(matches!(
            scheme.verify(b"data", &sigs),
            Err(SchemeError::WrongFormat { scheme: "ed25519" })
        ));
    }

    #[test]
    fn test_load_keys_file() {
        let k1 = generate_keypair();
        let k2 = generate_keypair();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# trusted signers").unwrap();
        writeln!(file, "{}", encode_verifying_key(&k1.verifying_key())).unwrap();
        writeln!(file).unwrap();
        writeln!(file, "{}", encode_verifying_key(&k2.verifying_key())).unwrap();

        let mut scheme = Ed25519Scheme::new();
        scheme.load_keys_file(file.path()).unwrap();
        assert_eq!(scheme.key_count(), 2);
    }

    #[test]
    fn test_load_keys_file_missing() {
        let mut scheme = Ed25519Scheme::new();
        let err = scheme
            .load_keys_file(Path::new("/nonexistent/keys"))
            .unwrap_err();
        assert!(matches!(err, SchemeError::KeyFile { .. }));
    }

    #[test]
    fn test_load_keys_file_bad_key() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not-base64!!!").unwrap();

        let mut scheme = Ed25519Scheme::new();
        assert!(matches!(
            scheme.load_keys_file(file.path()),
            Err(SchemeError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_set_keys_replaces() {
        let k1 = generate_keypair();
        let k2 = generate_keypair();

        let mut scheme = Ed25519Scheme::new();
        scheme
            .add_key(&encode_verifying_key(&k1.verifying_key()))
            .unwrap();
        scheme
            .set_keys(&encode_verifying_key(&k2.verifying_key()))
            .unwrap();

        assert_eq!(scheme.key_count(), 1);

        // Only k2 verifies now
        let data = b"data";
        let sigs = MetaValue::ByteArrays(vec![sign_data(&k2, data)]);
        assert!(scheme.verify(data, &sigs).is_ok());
        let sigs = MetaValue::ByteArrays(vec![sign_data(&k1, data)]);
        assert!(scheme.verify(data, &sigs).is_err());
    }
}
