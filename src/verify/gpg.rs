//! OpenPGP verdict processing.
//!
//! Every verdict is surfaced to the caller's result sink before the
//! accept/reject decision, so external tooling (UI, audit logging) can
//! inspect the full signature list even when the commit is ultimately
//! rejected. Acceptance requires at least one valid signature.

use crate::gpg::{GpgError, GpgResultSink, GpgVerdict};
use crate::session::PullSession;

/// Decide what an engine verdict means for `checksum`.
///
/// `record_on_accept` controls whether acceptance is written to the
/// session's verified set here; the orchestrator defers that to the
/// signing-API pass when both mechanisms must agree.
pub(crate) fn process_gpg_verdict(
    session: &mut PullSession,
    checksum: &str,
    verdict: &GpgVerdict,
    sink: Option<&dyn GpgResultSink>,
    record_on_accept: bool,
) -> Result<(), GpgError> {
    // Subscribers see the verdict first, whatever it says.
    if let Some(sink) = sink {
        sink.gpg_verify_result(checksum, verdict);
    }

    tracing::debug!(
        checksum,
        total = verdict.count_all(),
        valid = verdict.count_valid(),
        "gpg verdict"
    );

    verdict.require_valid_signature()?;

    // The commit is checked both before being durably written and after;
    // recording it makes the second pass a no-op so subscribers are not
    // signalled twice.
    if record_on_accept {
        session.mark_verified(checksum);
    }

    Ok(())
}
