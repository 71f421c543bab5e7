//! Scan verdicts and content hashing.

use std::fmt;

use serde::{Deserialize, Serialize};

/// BLAKE3 content hash of a file's bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub [u8; 32]);

impl ContentHash {
    /// Create a new ContentHash from raw bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Hash a byte slice.
    pub fn of(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Get the hash as a hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Outcome of one scan attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanVerdict {
    /// Whether the bytes may be handed to the parser.
    pub is_clean: bool,
    /// Engines that took part in the scan, if known.
    pub engines_consulted: Option<Vec<String>>,
    /// Free-form message from the scanner.
    pub diagnostic_message: Option<String>,
}

impl ScanVerdict {
    /// Create a new verdict.
    pub fn new(
        is_clean: bool,
        engines_consulted: Option<Vec<String>>,
        diagnostic_message: Option<String>,
    ) -> Self {
        Self {
            is_clean,
            engines_consulted,
            diagnostic_message,
        }
    }

    /// Create a fail-closed verdict carrying only a message.
    pub fn unsafe_with(message: impl Into<String>) -> Self {
        Self::new(false, None, Some(message.into()))
    }

    /// Engines joined with commas, or `N/A` when none were reported.
    pub fn engines_display(&self) -> String {
        match &self.engines_consulted {
            Some(engines) if !engines.is_empty() => engines.join(","),
            _ => "N/A".to_string(),
        }
    }
}

/// The single certified file kept by an integrity gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedFile {
    /// Hash of `bytes`.
    pub content_hash: ContentHash,
    /// Bytes that passed a clean scan.
    pub bytes: Vec<u8>,
}

impl CachedFile {
    /// Create a cache entry, hashing the bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            content_hash: ContentHash::of(&bytes),
            bytes,
        }
    }

    /// Check if this entry was built from content with the given hash.
    pub fn matches(&self, hash: &ContentHash) -> bool {
        &self.content_hash == hash
    }
}
