//! Scan service backed by a remote multi-engine scanner.

use std::sync::Arc;

use async_trait::async_trait;
use logsentry_core::{PollConfig, ScanVerdict};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::client::ScanClient;
use crate::poller::ScanPoller;
use crate::service::ScanService;

/// Uploads bytes to a remote scanner and polls the job to completion.
pub struct RemoteScanService {
    client: Arc<dyn ScanClient>,
    config: PollConfig,
    cancel: Option<CancellationToken>,
}

impl RemoteScanService {
    /// Create a remote service using the given client.
    pub fn new(client: Arc<dyn ScanClient>, config: PollConfig) -> Self {
        Self {
            client,
            config,
            cancel: None,
        }
    }

    /// Cut polling short when `token` is cancelled.
    ///
    /// Without a token the attempt budget is the only way polling ends early.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Scan under an explicit upload filename.
    pub async fn scan_named(&self, bytes: &[u8], filename: &str) -> ScanVerdict {
        let mut poller = ScanPoller::new(self.client.as_ref(), &self.config);
        if let Some(token) = &self.cancel {
            poller = poller.with_cancellation(token);
        }

        let verdict = poller.run(bytes, filename).await;
        info!(
            filename,
            attempts = poller.attempts(),
            state = %poller.state(),
            is_clean = verdict.is_clean,
            "remote virus scan finished"
        );
        verdict
    }
}

/// Upload name used when the caller does not supply one.
pub(crate) fn default_filename() -> String {
    format!("{}_scan.bin", chrono::Local::now().format("%Y%m%d%H%M%S"))
}

#[async_trait]
impl ScanService for RemoteScanService {
    async fn scan(&self, bytes: &[u8]) -> ScanVerdict {
        self.scan_named(bytes, &default_filename()).await
    }

    fn name(&self) -> &str {
        "remote"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filename_shape() {
        let name = default_filename();
        assert!(name.ends_with("_scan.bin"));
        let stamp = name.trim_end_matches("_scan.bin");
        assert_eq!(stamp.len(), 14);
        assert!(stamp.chars().all(|c| c.is_ascii_digit()));
    }
}
