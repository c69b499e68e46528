//! Commit authenticity verification.
//!
//! The top-level gate invoked once per fetched (or about-to-be-fetched)
//! commit. Two independent mechanisms can be enabled per remote: classic
//! OpenPGP verification and the pluggable signing API. When both are on,
//! both must pass, since they attest independent trust claims. Checksums proven
//! authentic are memoized in the session so a commit verified before being
//! durably written is not re-verified afterwards.

mod gpg;
mod sign;

pub use sign::{verify_signatures_for_remote, SignVerifyError};

use thiserror::Error;
use treeline_sign::DetachedMetadata;

use crate::cancel::{CancellationToken, Cancelled};
use crate::commit::Commit;
use crate::gpg::{GpgError, GpgResultSink, GpgVerifier};
use crate::session::{CollectionRef, PullSession};

/// Errors from verifying one commit
#[derive(Debug, Error)]
pub enum CommitVerifyError {
    #[error("Commit {checksum}: {source}")]
    Gpg {
        checksum: String,
        #[source]
        source: GpgError,
    },

    #[error("Can't verify commit without detached metadata")]
    MissingMetadata,

    #[error("Can't verify commit: {source}")]
    Sign {
        #[source]
        source: SignVerifyError,
    },

    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

fn gpg_error(checksum: &str, source: GpgError) -> CommitVerifyError {
    match source {
        // Cancellation is its own outcome, not a GPG failure
        GpgError::Cancelled(c) => CommitVerifyError::Cancelled(c),
        source => CommitVerifyError::Gpg {
            checksum: checksum.to_string(),
            source,
        },
    }
}

/// Per-pull commit verifier holding the externally supplied collaborators:
/// the opaque OpenPGP engine and an optional verdict subscriber
#[derive(Default)]
pub struct CommitVerifier<'a> {
    gpg: Option<&'a dyn GpgVerifier>,
    gpg_sink: Option<&'a dyn GpgResultSink>,
}

impl<'a> CommitVerifier<'a> {
    /// Create a verifier with no OpenPGP engine. Remotes with `gpg-verify`
    /// enabled will fail until one is supplied.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a verifier backed by an OpenPGP engine
    pub fn with_gpg(gpg: &'a dyn GpgVerifier) -> Self {
        Self {
            gpg: Some(gpg),
            gpg_sink: None,
        }
    }

    /// Subscribe `sink` to OpenPGP verdicts, builder-style
    pub fn gpg_sink(mut self, sink: &'a dyn GpgResultSink) -> Self {
        self.gpg_sink = Some(sink);
        self
    }

    /// Verify one commit before the pull machinery trusts it.
    ///
    /// `checksum` is the commit's content address, `commit` its canonical
    /// serialized form, `detached_metadata` the out-of-band signature
    /// carrier (absent when the remote published none), and `collection_ref`
    /// the branch the commit was resolved from, used only to pick an OpenPGP
    /// keyring.
    ///
    /// Returns `Ok(())` when every enabled mechanism accepts the commit, or
    /// immediately when the session already proved this checksum authentic.
    pub fn verify_unwritten_commit(
        &self,
        session: &mut PullSession,
        checksum: &str,
        commit: &Commit,
        detached_metadata: Option<&DetachedMetadata>,
        collection_ref: Option<&CollectionRef>,
        cancel: &CancellationToken,
    ) -> Result<(), CommitVerifyError> {
        let flags = session.flags();

        // A commit can be verified once before being durably written and
        // once again afterwards; the first success settles it.
        if flags.any_enabled() && session.is_verified(checksum) {
            tracing::debug!(checksum, "commit already verified this session");
            return Ok(());
        }

        cancel.check()?;

        let signed_data = commit.signed_data();

        if flags.gpg_verify {
            let keyring_remote = session.keyring_remote_for(collection_ref).to_string();
            tracing::debug!(checksum, keyring_remote = %keyring_remote, "gpg verification");

            let verdict = match self.gpg {
                Some(engine) => engine
                    .verify_with_metadata(signed_data, detached_metadata, &keyring_remote, cancel)
                    .map_err(|e| gpg_error(checksum, e))?,
                None => return Err(gpg_error(checksum, GpgError::EngineUnavailable)),
            };

            // When the signing API must also pass, recording waits for it:
            // a commit is never marked verified on a partial success.
            let record_on_accept = !flags.sign_verify;
            gpg::process_gpg_verdict(session, checksum, &verdict, self.gpg_sink, record_on_accept)
                .map_err(|e| gpg_error(checksum, e))?;
        }

        if flags.sign_verify {
            // Nothing to check if detached metadata is absent
            let Some(metadata) = detached_metadata else {
                return Err(CommitVerifyError::MissingMetadata);
            };

            verify_signatures_for_remote(session.remote(), signed_data, metadata)
                .map_err(|source| CommitVerifyError::Sign { source })?;

            session.mark_verified(checksum);
        }

        Ok(())
    }
}
