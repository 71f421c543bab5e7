//! File integrity gate and virus scan services for logsentry.
//!
//! Nothing reads a log file's bytes without passing through a
//! [`FileIntegrityGate`]. The gate hashes the file, skips rescanning content
//! it has already certified, and otherwise asks a [`ScanService`] for a
//! verdict.
//!
//! Two scan services exist:
//!
//! - [`RemoteScanService`] - submits the bytes to a multi-engine scanner via a
//!   [`ScanClient`] and drives a [`ScanPoller`] until the job completes or the
//!   attempt budget runs out
//! - [`SimulatedScanService`] - a non-authoritative stand-in used when no API
//!   key is configured
//!
//! [`ScanServiceFactory`] picks one once, from the credential.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use logsentry_scan::{FileIntegrityGate, FsSource, ScanServiceFactory};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let service = ScanServiceFactory::from_env().create()?;
//! let gate = FileIntegrityGate::new(Arc::new(FsSource), service);
//!
//! let bytes = gate.get_bytes("access.log").await?;
//! if bytes.is_empty() {
//!     eprintln!("file rejected by virus scan");
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod gate;
mod poller;
mod remote;
mod service;
mod simulated;
mod source;
mod virustotal;

pub use client::{ReportStatus, ScanClient, ScanReport, ScanTicket};
pub use gate::FileIntegrityGate;
pub use poller::{PollState, ScanPoller};
pub use remote::RemoteScanService;
pub use service::{API_KEY_ENV, ScanService, ScanServiceFactory};
pub use simulated::SimulatedScanService;
pub use source::{FileBytesSource, FsSource};
pub use virustotal::VirusTotalClient;

// Re-export core types for convenience
pub use logsentry_core::{
    CachedFile, ClientError, ContentHash, PollConfig, ScanVerdict, SimulatedScanConfig,
    SourceError,
};
