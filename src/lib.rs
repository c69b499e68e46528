//! Treeline Pull Gate - Commit authenticity verification
//!
//! This crate implements the verification gate of the Treeline pull
//! subsystem: before a fetched commit object is trusted (and, normally,
//! before it is durably written), the gate decides whether it is authentic
//! using one or both of two independent mechanisms: classic OpenPGP
//! verification through an opaque engine, and a pluggable signing API with
//! multiple concrete schemes.
//!
//! The gate performs no network I/O and implements no cryptographic
//! primitive itself; it orchestrates externally supplied verifiers and
//! aggregates their verdicts.

pub mod cancel;
pub mod commit;
pub mod gpg;
pub mod keys;
pub mod remote;
pub mod session;
pub mod verify;

pub use cancel::{CancellationToken, Cancelled};
pub use commit::{compute_checksum, Commit};
pub use gpg::{GpgError, GpgResultSink, GpgSignature, GpgVerdict, GpgVerifier};
pub use keys::{load_public_keys, KeyLoadError};
pub use remote::{Remote, RemoteError, RemoteInventory};
pub use session::{CollectionRef, PullSession, VerifyFlags};
pub use verify::{
    verify_signatures_for_remote, CommitVerifier, CommitVerifyError, SignVerifyError,
};

// Scheme-layer surface used alongside the gate.
pub use treeline_sign::{DetachedMetadata, MetaFormat, MetaValue, SchemeError, SignScheme};
