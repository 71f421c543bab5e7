//! Parsed log field and ranked result types.

use serde::{Deserialize, Serialize};

/// Key used for a line that did not match the access-log grammar.
pub const RAW_KEY: &str = "raw";

/// Field names emitted for a matched line, in grammar order.
pub const FIELD_NAMES: [&str; 11] = [
    "ip",
    "ident",
    "authuser",
    "timestamp",
    "method",
    "path",
    "protocol",
    "status",
    "bytes",
    "referrer",
    "agent",
];

/// One named field extracted from one log line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldRecord {
    /// 1-based position of the line among the non-empty lines of the input.
    pub line_number: usize,
    /// Field name, or [`RAW_KEY`] for an unparseable line.
    pub key: String,
    /// Matched text. Empty matches stay `Some("")`.
    pub value: Option<String>,
}

impl FieldRecord {
    /// Create a new field record.
    pub fn new(line_number: usize, key: impl Into<String>, value: Option<String>) -> Self {
        Self {
            line_number,
            key: key.into(),
            value,
        }
    }

    /// Create the single record emitted for an unparseable line.
    pub fn raw(line_number: usize, line: impl Into<String>) -> Self {
        Self::new(line_number, RAW_KEY, Some(line.into()))
    }

    /// Check if this record stands for an unparseable line.
    pub fn is_raw(&self) -> bool {
        self.key == RAW_KEY
    }

    /// Get the value as a string slice.
    pub fn value_str(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

/// A dense rank tier: every value sharing one hit count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedGroup {
    /// 1-based dense rank.
    pub rank: usize,
    /// Number of records each item appeared in.
    pub hit_count: usize,
    /// Distinct values in ascending order.
    pub items: Vec<Option<String>>,
}

impl RankedGroup {
    /// Create a new ranked group.
    pub fn new(rank: usize, hit_count: usize, items: Vec<Option<String>>) -> Self {
        Self {
            rank,
            hit_count,
            items,
        }
    }

    /// Number of values tied in this tier.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if this tier holds no values.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
