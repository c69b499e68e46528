//! Detached commit metadata.
//!
//! Signatures travel out-of-band from the signed payload, in an associative
//! structure attached to each commit. Each scheme owns one metadata key and
//! an expected value shape; a lookup only yields a value when both match
//! what the producer wrote.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Shape of a metadata value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetaFormat {
    String,
    Bool,
    Bytes,
    ByteArrays,
    Strings,
}

/// A typed metadata value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetaValue {
    String(String),
    Bool(bool),
    Bytes(Vec<u8>),
    /// List of opaque byte blobs (the shape binary signatures use)
    ByteArrays(Vec<Vec<u8>>),
    /// List of strings (the shape text-valued schemes use)
    Strings(Vec<String>),
}

impl MetaValue {
    /// The shape of this value
    pub fn format(&self) -> MetaFormat {
        match self {
            MetaValue::String(_) => MetaFormat::String,
            MetaValue::Bool(_) => MetaFormat::Bool,
            MetaValue::Bytes(_) => MetaFormat::Bytes,
            MetaValue::ByteArrays(_) => MetaFormat::ByteArrays,
            MetaValue::Strings(_) => MetaFormat::Strings,
        }
    }
}

/// Detached metadata attached to a commit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetachedMetadata {
    entries: BTreeMap<String, MetaValue>,
}

impl DetachedMetadata {
    /// Create empty metadata
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value under `key`, replacing any previous value
    pub fn insert(&mut self, key: impl Into<String>, value: MetaValue) {
        self.entries.insert(key.into(), value);
    }

    /// Look up a value regardless of shape
    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.entries.get(key)
    }

    /// Look up `key`, returning the value only when it has the expected shape
    pub fn lookup(&self, key: &str, format: MetaFormat) -> Option<&MetaValue> {
        self.entries.get(key).filter(|v| v.format() == format)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
