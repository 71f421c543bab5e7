//! Log queries built on a shared, scan-gated log source.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use logsentry_core::{AnalyzeError, FieldRecord, RankedGroup};
use logsentry_scan::FileIntegrityGate;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::parser::LineParser;
use crate::rank::RankAggregator;

/// Hook telling the hosting process to shut down.
///
/// Invoked when the log file exists but cannot be used. Library code never
/// exits the process itself.
pub trait LifecycleSignal: Send + Sync {
    /// Request process termination.
    fn exit(&self);
}

/// A log file read through an integrity gate and parsed on demand.
pub struct LogSource {
    gate: Arc<FileIntegrityGate>,
    parser: LineParser,
    lifecycle: Arc<dyn LifecycleSignal>,
    path: PathBuf,
}

impl LogSource {
    /// Create a source for `path`.
    pub fn new(
        gate: Arc<FileIntegrityGate>,
        lifecycle: Arc<dyn LifecycleSignal>,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            gate,
            parser: LineParser::new(),
            lifecycle,
            path: path.into(),
        }
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read, verify and parse the log file.
    ///
    /// If the gate hands back no bytes, the lifecycle signal is raised and
    /// [`AnalyzeError::UnusableSource`] is returned.
    pub async fn records(&self) -> Result<Vec<FieldRecord>, AnalyzeError> {
        let bytes = self.gate.get_bytes(&self.path).await?;

        if bytes.is_empty() {
            error!(path = %self.path.display(), "Unable to read log file.");
            self.lifecycle.exit();
            return Err(AnalyzeError::UnusableSource {
                path: self.path.clone(),
            });
        }

        let records = self.parser.parse(&bytes);
        info!(path = %self.path.display(), records = records.len(), "log file parsed");
        Ok(records)
    }
}

/// Counts the distinct client IPs.
pub struct UniqueIpsHandler {
    source: Arc<LogSource>,
    aggregator: RankAggregator,
}

impl UniqueIpsHandler {
    /// Create a handler reading from `source`.
    pub fn new(source: Arc<LogSource>) -> Self {
        Self {
            source,
            aggregator: RankAggregator::new(),
        }
    }

    /// Distinct IP values in first-seen order.
    pub async fn handle(&self) -> Result<Vec<Option<String>>, AnalyzeError> {
        let records = self.source.records().await?;
        self.aggregator.distinct_values(&records, "ip")
    }
}

/// Request for the most visited paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopVisitedPathsQuery {
    /// Number of rank tiers to return.
    pub count: usize,
}

impl Default for TopVisitedPathsQuery {
    fn default() -> Self {
        Self { count: 3 }
    }
}

/// Ranks request paths by hit count.
pub struct TopVisitedPathsHandler {
    source: Arc<LogSource>,
    aggregator: RankAggregator,
}

impl TopVisitedPathsHandler {
    /// Create a handler reading from `source`.
    pub fn new(source: Arc<LogSource>) -> Self {
        Self {
            source,
            aggregator: RankAggregator::new(),
        }
    }

    /// Top `query.count` rank tiers of paths.
    pub async fn handle(
        &self,
        query: TopVisitedPathsQuery,
    ) -> Result<Vec<RankedGroup>, AnalyzeError> {
        let records = self.source.records().await?;
        self.aggregator.rank(&records, "path", query.count)
    }
}

/// Request for the most active client IPs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopActiveIpsQuery {
    /// Number of rank tiers to return.
    pub count: usize,
}

impl Default for TopActiveIpsQuery {
    fn default() -> Self {
        Self { count: 3 }
    }
}

/// Ranks client IPs by request count.
pub struct TopActiveIpsHandler {
    source: Arc<LogSource>,
    aggregator: RankAggregator,
}

impl TopActiveIpsHandler {
    /// Create a handler reading from `source`.
    pub fn new(source: Arc<LogSource>) -> Self {
        Self {
            source,
            aggregator: RankAggregator::new(),
        }
    }

    /// Top `query.count` rank tiers of IPs.
    pub async fn handle(&self, query: TopActiveIpsQuery) -> Result<Vec<RankedGroup>, AnalyzeError> {
        let records = self.source.records().await?;
        self.aggregator.rank(&records, "ip", query.count)
    }
}
