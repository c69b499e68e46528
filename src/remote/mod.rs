//! Remote trust configuration.
//!
//! A remote is a named source of commits carrying its own trust options.
//! Remotes parse from a `remotes.toml` inventory; each entry is a `[[remote]]`
//! table whose non-structural keys land in a free-form option map. This core
//! only ever reads options; it never writes configuration.
//!
//! Keys consulted during verification:
//! - `gpg-verify` (bool): enable OpenPGP verification
//! - `sign-verify` (bool): enable signing-API verification
//! - `verification-<scheme>-file` (path): public key file for `<scheme>`
//! - `verification-<scheme>-key` (string): inline public key for `<scheme>`

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Errors that can occur when loading or reading remote configuration
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("Failed to read remotes file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Duplicate remote name: '{0}'")]
    DuplicateName(String),

    #[error("Remote '{name}': invalid value for '{key}': expected {expected}")]
    InvalidValue {
        name: String,
        key: String,
        expected: &'static str,
    },

    #[error("Remotes file not found: {0}")]
    NotFound(PathBuf),

    #[error("No remote named '{0}'")]
    UnknownRemote(String),
}

/// A single configured remote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Remote {
    /// Unique identifier for this remote (must be unique across the inventory)
    pub name: String,

    /// Base URL commits are fetched from (unused by verification)
    #[serde(default)]
    pub url: Option<String>,

    /// All remaining per-remote options, including the trust keys
    #[serde(flatten)]
    options: BTreeMap<String, toml::Value>,
}

impl Remote {
    /// Create a remote with no options (programmatic construction)
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: None,
            options: BTreeMap::new(),
        }
    }

    /// Set an option, builder-style
    pub fn with_option(mut self, key: &str, value: impl Into<toml::Value>) -> Self {
        self.options.insert(key.to_string(), value.into());
        self
    }

    /// Read a boolean option, falling back to `default` when unset.
    /// Accepts TOML booleans and the strings "true"/"false".
    pub fn bool_option(&self, key: &str, default: bool) -> Result<bool, RemoteError> {
        match self.options.get(key) {
            None => Ok(default),
            Some(toml::Value::Boolean(b)) => Ok(*b),
            Some(toml::Value::String(s)) if s == "true" => Ok(true),
            Some(toml::Value::String(s)) if s == "false" => Ok(false),
            Some(_) => Err(RemoteError::InvalidValue {
                name: self.name.clone(),
                key: key.to_string(),
                expected: "a boolean",
            }),
        }
    }

    /// Read a string option; `Ok(None)` when unset
    pub fn string_option(&self, key: &str) -> Result<Option<&str>, RemoteError> {
        match self.options.get(key) {
            None => Ok(None),
            Some(toml::Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(RemoteError::InvalidValue {
                name: self.name.clone(),
                key: key.to_string(),
                expected: "a string",
            }),
        }
    }

    /// Read a per-scheme verification option, `verification-<scheme>-<suffix>`
    pub fn verification_option(
        &self,
        scheme: &str,
        suffix: &str,
    ) -> Result<Option<&str>, RemoteError> {
        self.string_option(&format!("verification-{scheme}-{suffix}"))
    }

    fn validate(&self) -> Result<(), RemoteError> {
        if self.name.is_empty() {
            return Err(RemoteError::InvalidValue {
                name: "(unnamed)".to_string(),
                key: "name".to_string(),
                expected: "a non-empty string",
            });
        }
        Ok(())
    }
}

/// Remote inventory parsed from `remotes.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteInventory {
    /// Schema version for forward compatibility
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// List of remotes
    #[serde(default, rename = "remote")]
    pub remotes: Vec<Remote>,
}

fn default_schema_version() -> u32 {
    1
}

impl RemoteInventory {
    /// Load the remote inventory from a specific path
    pub fn load(path: &Path) -> Result<Self, RemoteError> {
        if !path.exists() {
            return Err(RemoteError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse the remote inventory from a TOML string
    pub fn parse(content: &str) -> Result<Self, RemoteError> {
        let inventory: RemoteInventory = toml::from_str(content)?;
        inventory.validate()?;
        Ok(inventory)
    }

    fn validate(&self) -> Result<(), RemoteError> {
        let mut seen = HashSet::new();
        for remote in &self.remotes {
            remote.validate()?;
            if !seen.insert(&remote.name) {
                return Err(RemoteError::DuplicateName(remote.name.clone()));
            }
        }
        Ok(())
    }

    /// Get a remote by name
    pub fn get(&self, name: &str) -> Result<&Remote, RemoteError> {
        self.remotes
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| RemoteError::UnknownRemote(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
schema_version = 1

[[remote]]
name = "os"
url = "https://builds.example.com/repo"
gpg-verify = false
sign-verify = true
verification-ed25519-file = "/etc/treeline/trusted.ed25519"

[[remote]]
name = "apps"
url = "https://apps.example.com/repo"
verification-ed25519-key = "AAAA"
"#;

    #[test]
    fn test_parse_inventory() {
        let inventory = RemoteInventory::parse(SAMPLE).unwrap();
        assert_eq!(inventory.remotes.len(), 2);

        let os = inventory.get("os").unwrap();
        assert_eq!(os.bool_option("gpg-verify", true).unwrap(), false);
        assert_eq!(os.bool_option("sign-verify", false).unwrap(), true);
        assert_eq!(
            os.verification_option("ed25519", "file").unwrap(),
            Some("/etc/treeline/trusted.ed25519")
        );
        assert_eq!(os.verification_option("ed25519", "key").unwrap(), None);
    }

    #[test]
    fn test_bool_option_defaults() {
        let remote = Remote::new("r");
        assert!(remote.bool_option("gpg-verify", true).unwrap());
        assert!(!remote.bool_option("gpg-verify", false).unwrap());
    }

    #[test]
    fn test_bool_option_from_string() {
        let remote = Remote::new("r").with_option("sign-verify", "true");
        assert!(remote.bool_option("sign-verify", false).unwrap());
    }

    #[test]
    fn test_bool_option_wrong_type() {
        let remote = Remote::new("r").with_option("sign-verify", 3i64);
        assert!(matches!(
            remote.bool_option("sign-verify", false),
            Err(RemoteError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_string_option_wrong_type() {
        let remote = Remote::new("r").with_option("verification-ed25519-key", true);
        assert!(matches!(
            remote.verification_option("ed25519", "key"),
            Err(RemoteError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let content = r#"
[[remote]]
name = "os"

[[remote]]
name = "os"
"#;
        assert!(matches!(
            RemoteInventory::parse(content),
            Err(RemoteError::DuplicateName(_))
        ));
    }

    #[test]
    fn test_unknown_remote() {
        let inventory = RemoteInventory::parse(SAMPLE).unwrap();
        assert!(matches!(
            inventory.get("missing"),
            Err(RemoteError::UnknownRemote(_))
        ));
    }

    #[test]
    fn test_empty_name_rejected() {
        let content = r#"
[[remote]]
name = ""
"#;
        assert!(RemoteInventory::parse(content).is_err());
    }
}
