//! Hash-cached virus scan gate in front of raw file reads.

use std::path::Path;
use std::sync::Arc;

use logsentry_core::{CachedFile, ContentHash, SourceError};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::service::ScanService;
use crate::source::FileBytesSource;

/// Hands out file bytes only once a scan has certified them clean.
///
/// The last certified file is kept in memory. Reading unchanged content
/// again returns the cached bytes without another scan. The check, scan and
/// cache update run under one lock, so concurrent callers never scan the
/// same content twice or overwrite each other's entry mid-flight.
pub struct FileIntegrityGate {
    source: Arc<dyn FileBytesSource>,
    scanner: Arc<dyn ScanService>,
    cache: Mutex<Option<CachedFile>>,
}

impl FileIntegrityGate {
    /// Create a gate with an empty cache.
    pub fn new(source: Arc<dyn FileBytesSource>, scanner: Arc<dyn ScanService>) -> Self {
        Self {
            source,
            scanner,
            cache: Mutex::new(None),
        }
    }

    /// Read `path` and return its bytes if they are certified clean.
    ///
    /// An empty vector means the file failed the scan (or was empty) and must
    /// not be used. Read failures propagate as [`SourceError`].
    pub async fn get_bytes(&self, path: impl AsRef<Path>) -> Result<Vec<u8>, SourceError> {
        let path = path.as_ref();
        info!(path = %path.display(), "reading file");

        let bytes = self.source.read_all_bytes(path).await?;
        let hash = ContentHash::of(&bytes);

        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.as_ref().filter(|c| c.matches(&hash)) {
            info!(%hash, "previously passed, no changes detected");
            return Ok(cached.bytes.clone());
        }

        info!(%hash, scanner = self.scanner.name(), "scanning for viruses");
        let verdict = self.scanner.scan(&bytes).await;
        info!(
            engines = %verdict.engines_display(),
            message = verdict.diagnostic_message.as_deref().unwrap_or(""),
            "scan completed"
        );

        if !verdict.is_clean {
            warn!(path = %path.display(), "virus scan failed");
            return Ok(Vec::new());
        }

        info!(path = %path.display(), "virus scan passed");
        *cache = Some(CachedFile {
            content_hash: hash,
            bytes: bytes.clone(),
        });
        Ok(bytes)
    }

    /// Hash of the currently certified file, if any.
    pub async fn cached_hash(&self) -> Option<ContentHash> {
        self.cache.lock().await.as_ref().map(|c| c.content_hash)
    }
}
