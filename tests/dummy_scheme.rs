//! Multi-scheme protocol tests using the env-gated dummy scheme
//!
//! `TREELINE_SIGN_DUMMY=1` makes every registry identifier resolvable, so
//! these tests can observe behavior that depends on zero unknown schemes.
//! They live in their own integration binary because the toggle is
//! process-wide.

use treeline_pull::{
    verify_signatures_for_remote, DetachedMetadata, MetaValue, Remote, SignVerifyError,
};
use treeline_sign::{SignScheme, DUMMY_METADATA_KEY, ED25519_METADATA_KEY};

fn enable_dummy() {
    std::env::set_var("TREELINE_SIGN_DUMMY", "1");
}

#[test]
fn dummy_resolves_when_enabled() {
    enable_dummy();
    assert!(matches!(
        SignScheme::by_name("dummy"),
        Some(SignScheme::Dummy(_))
    ));
}

#[test]
fn no_signatures_error_has_no_unknown_suffix() {
    enable_dummy();
    let remote = Remote::new("origin");
    let metadata = DetachedMetadata::new();

    let err = verify_signatures_for_remote(&remote, b"data", &metadata).unwrap_err();
    assert!(matches!(err, SignVerifyError::NoSignatures));
    assert_eq!(err.to_string(), "No signatures found");
}

#[test]
fn dummy_signature_verifies_against_inline_key() {
    enable_dummy();
    let remote = Remote::new("origin").with_option("verification-dummy-key", "sesame");

    let mut metadata = DetachedMetadata::new();
    metadata.insert(
        DUMMY_METADATA_KEY,
        MetaValue::Strings(vec!["sesame".to_string()]),
    );

    verify_signatures_for_remote(&remote, b"data", &metadata).unwrap();
}

#[test]
fn later_scheme_accepts_after_earlier_invalid() {
    enable_dummy();
    // ed25519 signature data is garbage; the dummy scheme, last in registry
    // order, matches. First valid signature wins regardless of earlier
    // failures.
    let remote = Remote::new("origin")
        .with_option(
            "verification-ed25519-key",
            treeline_sign::ed25519::encode_verifying_key(
                &treeline_sign::ed25519::generate_keypair().verifying_key(),
            ),
        )
        .with_option("verification-dummy-key", "sesame");

    let mut metadata = DetachedMetadata::new();
    metadata.insert(ED25519_METADATA_KEY, MetaValue::ByteArrays(vec![vec![0u8; 64]]));
    metadata.insert(
        DUMMY_METADATA_KEY,
        MetaValue::Strings(vec!["sesame".to_string()]),
    );

    verify_signatures_for_remote(&remote, b"data", &metadata).unwrap();
}

#[test]
fn dummy_only_invalid_error_counts_one_scheme() {
    enable_dummy();
    let remote = Remote::new("origin").with_option("verification-dummy-key", "sesame");

    let mut metadata = DetachedMetadata::new();
    metadata.insert(
        DUMMY_METADATA_KEY,
        MetaValue::Strings(vec!["wrong".to_string()]),
    );

    let err = verify_signatures_for_remote(&remote, b"data", &metadata).unwrap_err();
    assert!(matches!(err, SignVerifyError::Invalid { scheme: "dummy", .. }));
    assert!(!err.to_string().contains("other invalid"));
}
