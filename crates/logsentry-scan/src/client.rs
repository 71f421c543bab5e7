//! Contract for remote multi-engine scanners.

use async_trait::async_trait;
use logsentry_core::{ClientError, ScanVerdict};
use serde::{Deserialize, Serialize};
use strum::Display;

/// Handle to a submitted scan job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanTicket {
    /// Remote job identifier.
    pub id: String,
}

impl ScanTicket {
    /// Create a ticket for a job id.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// State of a scan job as reported by the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
pub enum ReportStatus {
    /// Still waiting to be analyzed.
    Queued,
    /// Analysis finished and a report exists.
    Present,
    /// The service has no record of the item.
    NotPresent,
}

impl ReportStatus {
    /// Check if the job has left the queue.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Queued)
    }
}

/// A job report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Job state.
    pub status: ReportStatus,
    /// Number of engines that flagged the content.
    pub positives: u32,
    /// Engines included in the report.
    pub engines: Vec<String>,
    /// Human-readable summary from the service.
    pub verbose_message: Option<String>,
}

impl ScanReport {
    /// Convert a finished report into a verdict. Clean means zero detections.
    pub fn to_verdict(&self) -> ScanVerdict {
        ScanVerdict::new(
            self.positives == 0,
            Some(self.engines.clone()),
            self.verbose_message.clone(),
        )
    }
}

/// Submits bytes to a remote scanner and fetches job reports.
#[async_trait]
pub trait ScanClient: Send + Sync {
    /// Upload bytes under the given filename and start a scan job.
    async fn submit(&self, bytes: &[u8], filename: &str) -> Result<ScanTicket, ClientError>;

    /// Fetch the current report for a job.
    async fn report(&self, ticket: &ScanTicket) -> Result<ScanReport, ClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_queued_is_pending() {
        assert!(!ReportStatus::Queued.is_terminal());
        assert!(ReportStatus::Present.is_terminal());
        assert!(ReportStatus::NotPresent.is_terminal());
        assert_eq!(ReportStatus::NotPresent.to_string(), "not_present");
    }

    #[test]
    fn test_report_to_verdict() {
        let report = ScanReport {
            status: ReportStatus::Present,
            positives: 2,
            engines: vec!["EngineA".to_string(), "EngineB".to_string()],
            verbose_message: Some("Scan finished".to_string()),
        };
        let verdict = report.to_verdict();
        assert!(!verdict.is_clean);
        assert_eq!(verdict.engines_display(), "EngineA,EngineB");
        assert_eq!(verdict.diagnostic_message.as_deref(), Some("Scan finished"));
    }
}
