//! Error types for reading, scanning and analyzing log files.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading a source file.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SourceError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Path the error refers to.
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::PermissionDenied { path } | Self::NotFound { path } | Self::Io { path, .. } => {
                path
            }
        }
    }
}

/// Errors returned by log queries.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    /// The parser produced no records at all.
    #[error("No log entries found")]
    EmptyInput,

    /// The integrity gate refused the file.
    #[error("Unable to read log file: {path}")]
    UnusableSource { path: PathBuf },

    /// The file could not be read.
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Errors raised by a remote scan client.
///
/// These never leave a scan service; they are folded into a fail-closed verdict.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure.
    #[error("request failed: {0}")]
    Http(String),

    /// The response body could not be understood.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// The upload name exceeds the remote limit.
    #[error("Filename cannot be longer than {max} characters.")]
    InvalidFilename { max: usize },

    /// The remote service or the client refused the request.
    #[error("{0}")]
    Rejected(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_io() {
        let err = SourceError::io(
            "/var/log/access.log",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(matches!(err, SourceError::NotFound { .. }));
        assert_eq!(err.path(), &PathBuf::from("/var/log/access.log"));
    }

    #[test]
    fn test_analyze_error_from_source() {
        let err: AnalyzeError = SourceError::io(
            "/denied",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        )
        .into();
        assert!(matches!(
            err,
            AnalyzeError::Source(SourceError::PermissionDenied { .. })
        ));
    }

    #[test]
    fn test_filename_error_message() {
        let err = ClientError::InvalidFilename { max: 255 };
        assert_eq!(
            err.to_string(),
            "Filename cannot be longer than 255 characters."
        );
    }
}
