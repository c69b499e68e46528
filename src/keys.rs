//! Key material resolution.
//!
//! Resolves, per (remote, scheme) pair, the public keys one verification
//! attempt should trust: a key file named by `verification-<scheme>-file`,
//! an inline key in `verification-<scheme>-key`, or both. File keys load
//! first; an inline key is added on top of them, and only initializes the
//! store when no file was configured. Nothing configured is not an error:
//! the scheme falls back to whatever default keyring it manages.
//!
//! A configured-but-broken source aborts verification outright. It is a
//! configuration defect, not an authenticity failure, and is never treated
//! as "try the next scheme".

use std::path::Path;

use thiserror::Error;
use treeline_sign::{SchemeError, SignScheme};

use crate::remote::{Remote, RemoteError};

/// Errors from resolving a scheme's key material
#[derive(Debug, Error)]
pub enum KeyLoadError {
    #[error("Failed loading '{scheme}' keys from '{path}'")]
    File {
        scheme: &'static str,
        path: String,
        #[source]
        source: SchemeError,
    },

    #[error("Failed loading '{scheme}' keys from inline 'verification-key'")]
    Inline {
        scheme: &'static str,
        #[source]
        source: SchemeError,
    },

    #[error(transparent)]
    Config(#[from] RemoteError),
}

/// Load the public keys `remote` configures for `scheme`.
///
/// Returns `Ok(false)` when neither the file nor the inline option is set
/// (the scheme's key store is left empty), `Ok(true)` when at least one
/// source was configured and loaded.
pub fn load_public_keys(scheme: &mut SignScheme, remote: &Remote) -> Result<bool, KeyLoadError> {
    let name = scheme.name();
    let pk_file = remote.verification_option(name, "file")?.map(str::to_string);
    let pk_inline = remote.verification_option(name, "key")?.map(str::to_string);

    if pk_file.is_none() && pk_inline.is_none() {
        tracing::debug!(scheme = name, remote = %remote.name, "no verification keys configured");
        return Ok(false);
    }

    let mut loaded_from_file = false;
    if let Some(path) = &pk_file {
        scheme
            .load_keys_file(Path::new(path))
            .map_err(|source| KeyLoadError::File {
                scheme: name,
                path: path.clone(),
                source,
            })?;
        loaded_from_file = true;
    }

    if let Some(inline) = &pk_inline {
        // A file-sourced store is never replaced: the inline key joins it.
        let result = if loaded_from_file {
            scheme.add_key(inline)
        } else {
            scheme.set_keys(inline)
        };
        result.map_err(|source| KeyLoadError::Inline {
            scheme: name,
            source,
        })?;
    }

    tracing::debug!(
        scheme = name,
        remote = %remote.name,
        keys = scheme.key_count(),
        "loaded verification keys"
    );
    Ok(true)
}
