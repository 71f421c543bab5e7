//! Scan service abstraction and variant selection.

use std::sync::Arc;

use async_trait::async_trait;
use logsentry_core::{ClientError, PollConfig, ScanVerdict, SimulatedScanConfig};
use tracing::info;

use crate::remote::RemoteScanService;
use crate::simulated::SimulatedScanService;
use crate::virustotal::VirusTotalClient;

/// Environment variable holding the remote scanner API key.
pub const API_KEY_ENV: &str = "VIRUSTOTAL_API_KEY";

/// Produces a verdict for a blob of bytes.
///
/// Implementations never fail: infrastructure problems come back as a
/// verdict with `is_clean == false`.
#[async_trait]
pub trait ScanService: Send + Sync {
    /// Scan the bytes and report whether they are safe to use.
    async fn scan(&self, bytes: &[u8]) -> ScanVerdict;

    /// Short name of the variant, for logging.
    fn name(&self) -> &str;
}

/// Chooses between the remote and simulated scan services.
#[derive(Debug, Clone, Default)]
pub struct ScanServiceFactory {
    api_key: Option<String>,
    poll_config: PollConfig,
    simulated_config: SimulatedScanConfig,
}

impl ScanServiceFactory {
    /// Create a factory for the given credential.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            ..Default::default()
        }
    }

    /// Create a factory reading the credential from [`API_KEY_ENV`].
    pub fn from_env() -> Self {
        Self::new(std::env::var(API_KEY_ENV).ok())
    }

    /// Set the polling configuration used by the remote service.
    pub fn with_poll_config(mut self, config: PollConfig) -> Self {
        self.poll_config = config;
        self
    }

    /// Set the configuration used by the simulated service.
    pub fn with_simulated_config(mut self, config: SimulatedScanConfig) -> Self {
        self.simulated_config = config;
        self
    }

    /// Check if a usable credential is present.
    pub fn uses_remote(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }

    /// Build the scan service. A blank or missing key selects the simulated one.
    pub fn create(&self) -> Result<Arc<dyn ScanService>, ClientError> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => {
                info!("using remote virus scan service");
                let client = VirusTotalClient::new(key)?;
                Ok(Arc::new(RemoteScanService::new(
                    Arc::new(client),
                    self.poll_config.clone(),
                )))
            }
            _ => {
                info!("no {API_KEY_ENV} configured, using simulated virus scan service");
                Ok(Arc::new(SimulatedScanService::with_config(
                    self.simulated_config.clone(),
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_selects_simulated() {
        let factory = ScanServiceFactory::new(None);
        assert!(!factory.uses_remote());
        assert_eq!(factory.create().unwrap().name(), "simulated");
    }

    #[test]
    fn test_blank_key_selects_simulated() {
        for key in ["", "   ", "\t\n"] {
            let factory = ScanServiceFactory::new(Some(key.to_string()));
            assert!(!factory.uses_remote());
            assert_eq!(factory.create().unwrap().name(), "simulated");
        }
    }

    #[test]
    fn test_key_selects_remote() {
        let factory = ScanServiceFactory::new(Some("abc123".to_string()));
        assert!(factory.uses_remote());
        assert_eq!(factory.create().unwrap().name(), "remote");
    }
}
