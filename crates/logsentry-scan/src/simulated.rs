//! Stand-in scanner used when no remote credential is configured.

use async_trait::async_trait;
use logsentry_core::{ScanVerdict, SimulatedScanConfig};
use rand::{Rng, rng};
use tracing::warn;

use crate::service::ScanService;

/// Pretends to scan, passing files at random.
///
/// Its verdicts carry a message marking them as non-authoritative.
#[derive(Debug, Clone, Default)]
pub struct SimulatedScanService {
    config: SimulatedScanConfig,
}

impl SimulatedScanService {
    /// Create a simulated service with default settings (80% clean, 80 ms).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a simulated service with custom settings.
    pub fn with_config(config: SimulatedScanConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ScanService for SimulatedScanService {
    async fn scan(&self, bytes: &[u8]) -> ScanVerdict {
        tokio::time::sleep(self.config.latency).await;

        let is_clean = rng().random_bool(self.config.clean_probability.clamp(0.0, 1.0));
        warn!(
            len = bytes.len(),
            is_clean, "simulated virus scan, result is not authoritative"
        );

        ScanVerdict::new(
            is_clean,
            Some(vec![self.config.engine_name.clone()]),
            Some(self.config.message.clone()),
        )
    }

    fn name(&self) -> &str {
        "simulated"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service_with(probability: f64) -> SimulatedScanService {
        SimulatedScanService::with_config(
            SimulatedScanConfig::builder()
                .clean_probability(probability)
                .build()
                .unwrap(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_clean() {
        let verdict = service_with(1.0).scan(b"data").await;
        assert!(verdict.is_clean);
        assert_eq!(
            verdict.engines_consulted,
            Some(vec!["DummyEngine".to_string()])
        );
        assert_eq!(
            verdict.diagnostic_message.as_deref(),
            Some("NOT A REAL SCAN RESULT")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_clean() {
        let verdict = service_with(0.0).scan(b"data").await;
        assert!(!verdict.is_clean);
        assert_eq!(verdict.engines_display(), "DummyEngine");
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_latency() {
        let start = tokio::time::Instant::now();
        SimulatedScanService::new().scan(b"data").await;
        assert!(start.elapsed() >= std::time::Duration::from_millis(80));
    }
}
