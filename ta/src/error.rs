//! Archive error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or rewriting the archive file
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode trip records: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Failed to replace archive file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

impl ArchiveError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
