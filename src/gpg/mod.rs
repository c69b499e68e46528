//! Opaque OpenPGP verifier interface.
//!
//! The OpenPGP cryptographic engine lives outside this core. It receives the
//! signed payload, the commit's detached metadata, and the name of the remote
//! whose keyring applies, and returns a structured verdict listing every
//! signature it examined. The gate only decides what a verdict means.

use thiserror::Error;
use treeline_sign::DetachedMetadata;

use crate::cancel::{CancellationToken, Cancelled};

/// Errors from OpenPGP verification
#[derive(Debug, Error)]
pub enum GpgError {
    #[error("GPG verification enabled, but no signatures found")]
    NoSignatures,

    #[error("GPG signatures found ({total}), but none are valid")]
    NoValidSignature { total: usize },

    #[error("GPG verification enabled, but no GPG engine is available")]
    EngineUnavailable,

    #[error("GPG engine failure: {0}")]
    Engine(String),

    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

/// One signature as examined by the OpenPGP engine
#[derive(Debug, Clone)]
pub struct GpgSignature {
    /// Fingerprint of the signing key
    pub fingerprint: String,

    /// Whether the signature is valid against the keyring
    pub valid: bool,

    /// Human-readable status (e.g. "good", "key expired", "missing key")
    pub status: String,
}

/// Structured verdict returned by the OpenPGP engine.
///
/// Carries every signature examined, valid or not, so subscribers of the
/// verification event can display the full picture even when the commit is
/// ultimately rejected.
#[derive(Debug, Clone, Default)]
pub struct GpgVerdict {
    /// Every signature the engine examined
    pub signatures: Vec<GpgSignature>,
}

impl GpgVerdict {
    /// Total number of signatures examined
    pub fn count_all(&self) -> usize {
        self.signatures.len()
    }

    /// Number of valid signatures
    pub fn count_valid(&self) -> usize {
        self.signatures.iter().filter(|s| s.valid).count()
    }

    /// Acceptance criterion: at least one valid signature
    pub fn require_valid_signature(&self) -> Result<(), GpgError> {
        if self.count_all() == 0 {
            return Err(GpgError::NoSignatures);
        }
        if self.count_valid() == 0 {
            return Err(GpgError::NoValidSignature {
                total: self.count_all(),
            });
        }
        Ok(())
    }
}

/// The opaque OpenPGP verification engine.
///
/// Implementations resolve `keyring_remote` to the per-remote (or global)
/// keyring, check `signed_data` against the signatures in `metadata`, and
/// report every signature tried. Blocking is expected; implementations
/// should poll `cancel` during long keyring operations.
pub trait GpgVerifier {
    fn verify_with_metadata(
        &self,
        signed_data: &[u8],
        metadata: Option<&DetachedMetadata>,
        keyring_remote: &str,
        cancel: &CancellationToken,
    ) -> Result<GpgVerdict, GpgError>;
}

/// Subscriber for OpenPGP verification verdicts.
///
/// Invoked synchronously with `(checksum, verdict)` every time the engine
/// runs, before the accept/reject decision, regardless of outcome.
pub trait GpgResultSink {
    fn gpg_verify_result(&self, checksum: &str, verdict: &GpgVerdict);
}

impl<F: Fn(&str, &GpgVerdict)> GpgResultSink for F {
    fn gpg_verify_result(&self, checksum: &str, verdict: &GpgVerdict) {
        self(checksum, verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(valid: bool) -> GpgSignature {
        GpgSignature {
            fingerprint: "AABBCCDD".to_string(),
            valid,
            status: if valid { "good" } else { "bad" }.to_string(),
        }
    }

    #[test]
    fn test_empty_verdict_rejected() {
        let verdict = GpgVerdict::default();
        assert!(matches!(
            verdict.require_valid_signature(),
            Err(GpgError::NoSignatures)
        ));
    }

    #[test]
    fn test_all_invalid_rejected_with_total() {
        let verdict = GpgVerdict {
            signatures: vec![sig(false), sig(false)],
        };
        assert!(matches!(
            verdict.require_valid_signature(),
            Err(GpgError::NoValidSignature { total: 2 })
        ));
    }

    #[test]
    fn test_one_valid_among_invalid_accepted() {
        let verdict = GpgVerdict {
            signatures: vec![sig(false), sig(true)],
        };
        assert!(verdict.require_valid_signature().is_ok());
        assert_eq!(verdict.count_valid(), 1);
        assert_eq!(verdict.count_all(), 2);
    }
}
