//! Error types for scheme key loading and signature verification.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors from signature scheme operations
#[derive(Debug, Error)]
pub enum SchemeError {
    #[error("failed to read key file '{}': {}", .path.display(), .source)]
    KeyFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid public key: {0}")]
    InvalidKey(String),

    #[error("wrong metadata shape for '{scheme}' signatures")]
    WrongFormat { scheme: &'static str },

    #[error("no '{scheme}' keys available for verification")]
    NoKeys { scheme: &'static str },

    #[error("signature verification failed: tried {keys} key(s) against {signatures} signature(s)")]
    NotVerified { keys: usize, signatures: usize },
}
