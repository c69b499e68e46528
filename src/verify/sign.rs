//! Multi-scheme signature verification.
//!
//! Walks the scheme registry in its fixed order against a commit's detached
//! metadata. The first scheme whose signature verifies accepts the commit;
//! when every scheme with signature data fails, the first failure is
//! surfaced in detail and the rest are only counted. A key-loading failure
//! aborts the scan instead of moving on to the next scheme.

use thiserror::Error;
use treeline_sign::{DetachedMetadata, SchemeError, SignScheme};

use crate::keys::{load_public_keys, KeyLoadError};
use crate::remote::Remote;

/// Errors from multi-scheme verification
#[derive(Debug, Error)]
pub enum SignVerifyError {
    #[error("No signatures found")]
    NoSignatures,

    #[error("No signatures found ({unknown} unknown type)")]
    NoSignaturesUnknown { unknown: usize },

    #[error("{first}")]
    Invalid {
        scheme: &'static str,
        first: SchemeError,
    },

    #[error("({others} other invalid signatures): {first}")]
    InvalidMultiple {
        scheme: &'static str,
        first: SchemeError,
        others: usize,
    },

    #[error(transparent)]
    KeyLoad(#[from] KeyLoadError),
}

/// Keep-first-count-rest accumulator for a registry scan
#[derive(Default)]
struct ErrorTally {
    first: Option<(&'static str, SchemeError)>,
    invalid: usize,
    unknown: usize,
}

impl ErrorTally {
    fn record_invalid(&mut self, scheme: &'static str, err: SchemeError) {
        self.invalid += 1;
        if self.first.is_none() {
            self.first = Some((scheme, err));
        } else {
            tracing::debug!(scheme, %err, "additional invalid signature");
        }
    }
}

/// Check `signed_data` against every signature scheme present in `metadata`,
/// trusting the keys `remote` configures per scheme.
///
/// First valid signature wins. Registry identifiers that do not resolve are
/// counted but skipped, since a scheme may be disabled in this build. A
/// key-load error propagates immediately and no further schemes are tried.
pub fn verify_signatures_for_remote(
    remote: &Remote,
    signed_data: &[u8],
    metadata: &DetachedMetadata,
) -> Result<(), SignVerifyError> {
    let mut tally = ErrorTally::default();

    for name in SignScheme::list_names() {
        let Some(mut scheme) = SignScheme::by_name(name) else {
            tally.unknown += 1;
            continue;
        };

        // This scheme contributes nothing unless its key holds a value of
        // the shape its producer writes.
        let Some(signatures) = metadata.lookup(scheme.metadata_key(), scheme.metadata_format())
        else {
            continue;
        };

        load_public_keys(&mut scheme, remote)?;

        match scheme.verify(signed_data, signatures) {
            Ok(()) => {
                tracing::debug!(scheme = scheme.name(), "signature accepted");
                return Ok(());
            }
            Err(err) => tally.record_invalid(scheme.name(), err),
        }
    }

    // Every scheme that had signature data either returned early on success
    // or recorded a failure, so an empty tally means no signatures at all.
    let Some((scheme, first)) = tally.first.take() else {
        return Err(if tally.unknown > 0 {
            SignVerifyError::NoSignaturesUnknown {
                unknown: tally.unknown,
            }
        } else {
            SignVerifyError::NoSignatures
        });
    };

    let others = tally.invalid - 1;
    Err(if others > 0 {
        SignVerifyError::InvalidMultiple {
            scheme,
            first,
            others,
        }
    } else {
        SignVerifyError::Invalid { scheme, first }
    })
}
