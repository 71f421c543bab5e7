//! Configuration types for scanning and analysis.

use std::path::PathBuf;
use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Default log file looked up in the current directory.
const DEFAULT_LOG_FILE: &str = "programming-task-example-data.log";

/// Configuration for polling a remote scan job.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct PollConfig {
    /// Wait between submitting a job and the first status query.
    #[builder(default = "Duration::from_secs(3)")]
    #[serde(default = "default_initial_delay")]
    pub initial_delay: Duration,

    /// Maximum number of status queries before giving up.
    #[builder(default = "10")]
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base of the exponential backoff, in seconds.
    #[builder(default = "2")]
    #[serde(default = "default_backoff_base")]
    pub backoff_base_secs: u64,

    /// Upper bound for a single backoff delay.
    #[builder(default = "Duration::from_secs(15)")]
    #[serde(default = "default_backoff_cap")]
    pub backoff_cap: Duration,

    /// Longest upload filename the remote service accepts.
    #[builder(default = "255")]
    #[serde(default = "default_max_filename_len")]
    pub max_filename_len: usize,
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(3)
}

fn default_max_attempts() -> u32 {
    10
}

fn default_backoff_base() -> u64 {
    2
}

fn default_backoff_cap() -> Duration {
    Duration::from_secs(15)
}

fn default_max_filename_len() -> usize {
    255
}

impl PollConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.max_attempts == Some(0) {
            return Err("max_attempts must be at least 1".to_string());
        }
        if self.backoff_base_secs == Some(0) {
            return Err("backoff_base_secs must be at least 1".to_string());
        }
        Ok(())
    }
}

impl PollConfig {
    /// Create a new config builder.
    pub fn builder() -> PollConfigBuilder {
        PollConfigBuilder::default()
    }

    /// Delay to wait after the given 0-based attempt failed to confirm.
    ///
    /// `min(base^(attempt + 1) seconds, cap)`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let secs = attempt
            .checked_add(1)
            .and_then(|exp| self.backoff_base_secs.checked_pow(exp))
            .unwrap_or(u64::MAX);
        Duration::from_secs(secs).min(self.backoff_cap)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_delay: default_initial_delay(),
            max_attempts: default_max_attempts(),
            backoff_base_secs: default_backoff_base(),
            backoff_cap: default_backoff_cap(),
            max_filename_len: default_max_filename_len(),
        }
    }
}

/// Configuration for the simulated, non-authoritative scanner.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct SimulatedScanConfig {
    /// Simulated round-trip latency.
    #[builder(default = "Duration::from_millis(80)")]
    pub latency: Duration,

    /// Probability that a scan reports the file as clean.
    #[builder(default = "0.8")]
    pub clean_probability: f64,

    /// Engine name reported in every verdict.
    #[builder(default = "\"DummyEngine\".to_string()")]
    pub engine_name: String,

    /// Message reported in every verdict.
    #[builder(default = "\"NOT A REAL SCAN RESULT\".to_string()")]
    pub message: String,
}

impl SimulatedScanConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(p) = self.clean_probability {
            if !(0.0..=1.0).contains(&p) {
                return Err(format!("clean_probability must be within [0, 1], got {p}"));
            }
        }
        Ok(())
    }
}

impl SimulatedScanConfig {
    /// Create a new config builder.
    pub fn builder() -> SimulatedScanConfigBuilder {
        SimulatedScanConfigBuilder::default()
    }
}

impl Default for SimulatedScanConfig {
    fn default() -> Self {
        Self {
            latency: Duration::from_millis(80),
            clean_probability: 0.8,
            engine_name: "DummyEngine".to_string(),
            message: "NOT A REAL SCAN RESULT".to_string(),
        }
    }
}

/// Configuration for a query run.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct AnalysisConfig {
    /// Log file to analyze. Relative paths resolve against the current directory.
    #[builder(default = "PathBuf::from(DEFAULT_LOG_FILE)")]
    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,

    /// Number of rank tiers reported by top-N queries.
    #[builder(default = "3")]
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_log_path() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_FILE)
}

fn default_top_n() -> usize {
    3
}

impl AnalysisConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref path) = self.log_path {
            if path.as_os_str().is_empty() {
                return Err("Log path cannot be empty".to_string());
            }
        }
        if self.top_n == Some(0) {
            return Err("top_n must be at least 1".to_string());
        }
        Ok(())
    }
}

impl AnalysisConfig {
    /// Create a new config builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Absolute location of the log file.
    pub fn resolved_log_path(&self) -> PathBuf {
        if self.log_path.is_absolute() {
            return self.log_path.clone();
        }
        std::env::current_dir()
            .map(|cwd| cwd.join(&self.log_path))
            .unwrap_or_else(|_| self.log_path.clone())
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            log_path: default_log_path(),
            top_n: default_top_n(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_schedule() {
        let config = PollConfig::default();
        let delays: Vec<u64> = (0..6).map(|i| config.backoff_delay(i).as_secs()).collect();
        assert_eq!(delays, vec![2, 4, 8, 15, 15, 15]);
    }

    #[test]
    fn test_backoff_does_not_overflow() {
        let config = PollConfig::default();
        assert_eq!(config.backoff_delay(u32::MAX), Duration::from_secs(15));
        assert_eq!(config.backoff_delay(200), Duration::from_secs(15));
    }

    #[test]
    fn test_poll_config_rejects_zero_attempts() {
        assert!(PollConfig::builder().max_attempts(0u32).build().is_err());
    }

    #[test]
    fn test_simulated_config_rejects_bad_probability() {
        assert!(
            SimulatedScanConfig::builder()
                .clean_probability(1.5)
                .build()
                .is_err()
        );
        assert!(
            SimulatedScanConfig::builder()
                .clean_probability(1.0)
                .build()
                .is_ok()
        );
    }

    #[test]
    fn test_analysis_config_defaults() {
        let config = AnalysisConfig::builder().build().unwrap();
        assert_eq!(config.top_n, 3);
        assert_eq!(config.log_path, PathBuf::from(DEFAULT_LOG_FILE));
        assert!(config.resolved_log_path().ends_with(DEFAULT_LOG_FILE));
    }
}
