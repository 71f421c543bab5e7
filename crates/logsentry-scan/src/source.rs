//! Raw byte sources.

use std::path::Path;

use async_trait::async_trait;
use logsentry_core::SourceError;

/// Something that can hand back the full contents of a path.
#[async_trait]
pub trait FileBytesSource: Send + Sync {
    /// Read every byte at `path`.
    async fn read_all_bytes(&self, path: &Path) -> Result<Vec<u8>, SourceError>;
}

/// Reads from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

#[async_trait]
impl FileBytesSource for FsSource {
    async fn read_all_bytes(&self, path: &Path) -> Result<Vec<u8>, SourceError> {
        tokio::fs::read(path)
            .await
            .map_err(|e| SourceError::io(path, e))
    }
}
