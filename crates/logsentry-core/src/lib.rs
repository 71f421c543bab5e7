//! Core types and traits for logsentry.
//!
//! This crate provides the data model shared by the scanning and analysis
//! crates: parsed log fields, ranked result groups, scan verdicts, content
//! hashes, error types and configuration.

mod config;
mod error;
mod record;
mod verdict;

pub use config::{
    AnalysisConfig, AnalysisConfigBuilder, PollConfig, PollConfigBuilder, SimulatedScanConfig,
    SimulatedScanConfigBuilder,
};
pub use error::{AnalyzeError, ClientError, SourceError};
pub use record::{FIELD_NAMES, FieldRecord, RAW_KEY, RankedGroup};
pub use verdict::{CachedFile, ContentHash, ScanVerdict};
