//! Pull-session verification context.
//!
//! One [`PullSession`] lives for the duration of a pull. It owns the only
//! cross-call state in the gate: the set of commit checksums already proven
//! authentic, plus the ref-to-keyring mapping used to pick an OpenPGP
//! keyring. The verified set is mechanism-agnostic, only ever grows, and is
//! discarded with the session.
//!
//! Access is single-threaded within one pull session. Callers that verify
//! commits from several workers against one session must serialize on it
//! themselves; the gate takes `&mut` and never locks.

use std::collections::{HashMap, HashSet};

use crate::remote::{Remote, RemoteError};

/// A (collection, ref) pair naming a branch a commit was resolved from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionRef {
    /// Globally unique collection identifier, when the remote publishes one
    pub collection_id: Option<String>,

    /// Ref name within the collection (e.g. "os/x86_64/stable")
    pub ref_name: String,
}

impl CollectionRef {
    /// Create a collection ref
    pub fn new(collection_id: Option<&str>, ref_name: &str) -> Self {
        Self {
            collection_id: collection_id.map(str::to_string),
            ref_name: ref_name.to_string(),
        }
    }
}

/// Which verification mechanisms are enabled for a pull
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyFlags {
    /// Classic OpenPGP verification
    pub gpg_verify: bool,

    /// Pluggable signing-API verification
    pub sign_verify: bool,
}

impl VerifyFlags {
    /// Read the verification toggles from a remote's options.
    /// OpenPGP verification defaults on; signing-API verification defaults
    /// off.
    pub fn from_remote(remote: &Remote) -> Result<Self, RemoteError> {
        Ok(Self {
            gpg_verify: remote.bool_option("gpg-verify", true)?,
            sign_verify: remote.bool_option("sign-verify", false)?,
        })
    }

    /// Whether any mechanism is enabled
    pub fn any_enabled(&self) -> bool {
        self.gpg_verify || self.sign_verify
    }
}

/// Session-scoped verification context for one pull
#[derive(Debug)]
pub struct PullSession {
    remote: Remote,
    flags: VerifyFlags,
    verified_commits: HashSet<String>,
    ref_keyring_map: HashMap<CollectionRef, String>,
}

impl PullSession {
    /// Create a session pulling from `remote` with explicit flags
    pub fn new(remote: Remote, flags: VerifyFlags) -> Self {
        Self {
            remote,
            flags,
            verified_commits: HashSet::new(),
            ref_keyring_map: HashMap::new(),
        }
    }

    /// Create a session with flags read from the remote's own options
    pub fn from_remote(remote: Remote) -> Result<Self, RemoteError> {
        let flags = VerifyFlags::from_remote(&remote)?;
        Ok(Self::new(remote, flags))
    }

    /// The remote this session pulls from
    pub fn remote(&self) -> &Remote {
        &self.remote
    }

    /// Enabled verification mechanisms
    pub fn flags(&self) -> VerifyFlags {
        self.flags
    }

    /// Whether `checksum` was already proven authentic this session
    pub fn is_verified(&self, checksum: &str) -> bool {
        self.verified_commits.contains(checksum)
    }

    /// Record a successful verification. Insertion is monotonic; nothing
    /// ever leaves the set while the session lives.
    pub(crate) fn mark_verified(&mut self, checksum: &str) {
        self.verified_commits.insert(checksum.to_string());
    }

    /// Route commits resolved from `ref` to the keyring of another remote
    pub fn map_ref_keyring(&mut self, collection_ref: CollectionRef, remote_name: impl Into<String>) {
        self.ref_keyring_map.insert(collection_ref, remote_name.into());
    }

    /// The keyring remote for a commit: the remote mapped to its ref when
    /// one exists, otherwise the remote this pull is configured against
    pub fn keyring_remote_for(&self, collection_ref: Option<&CollectionRef>) -> &str {
        collection_ref
            .and_then(|r| self.ref_keyring_map.get(r))
            .map(String::as_str)
            .unwrap_or(self.remote.name.as_str())
    }
}
