//! Tagged metadata value type.
//!
//! Mint metadata, requirements and lockup options are free-form documents
//! supplied by the minting party. They are modelled as a recursive sum type
//! rather than a loosely-typed map so the wire and gossip serializers get
//! compile-time exhaustiveness.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ordered string-keyed map of metadata values.
///
/// `BTreeMap` keeps key order deterministic, which matters because these
/// maps feed into content hashes.
pub type MetadataMap = BTreeMap<String, MetadataValue>;

/// A single metadata value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetadataValue {
    /// Absent / explicit null.
    Null,
    /// Boolean flag.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// UTF-8 text.
    Text(String),
    /// Ordered list of values.
    Array(Vec<MetadataValue>),
    /// Nested object.
    Object(MetadataMap),
}

impl MetadataValue {
    /// Returns the contained text, if this value is `Text`.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the contained integer, if this value is `Int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<i64> for MetadataValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<bool> for MetadataValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}
