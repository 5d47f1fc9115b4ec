//! Error types for foldersync

use super::SyncMode;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error types for sync operations
#[derive(Debug, Error)]
pub enum SyncError {
    /// Source or destination cannot be entered
    #[error("Invalid folder: {path} does not exist or cannot be entered")]
    InvalidFolder { path: PathBuf },

    /// Only single-folder sync is implemented
    #[error("Unsupported sync mode: {0}")]
    UnsupportedSyncMode(SyncMode),

    /// Stat or directory listing failed during a walk
    #[error("Failed to read {path}: {source}")]
    Traversal {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Manifest could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Standard IO error (automatically converted via #[from])
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Destination occupied by something other than a regular file
    #[error("Type mismatch: {path} exists and is not a regular file")]
    TypeMismatch { path: PathBuf },

    /// Source entry is neither a directory nor a regular file
    #[error("Unsupported file type: {path}")]
    UnsupportedType { path: PathBuf },

    /// Content copy or directory creation failed
    #[error("Copy failed for {path}: {source}")]
    Copy {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Run finished but recorded non-fatal errors
    #[error("Sync completed with {count} error(s)")]
    CompletedWithErrors { count: usize },
}

impl SyncError {
    /// Whether this error aborts a run instead of being aggregated
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SyncError::InvalidFolder { .. }
                | SyncError::UnsupportedSyncMode(_)
                | SyncError::Serialization(_)
                | SyncError::Io(_)
                | SyncError::Config(_)
        )
    }

    /// Path the error refers to, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            SyncError::InvalidFolder { path }
            | SyncError::Traversal { path, .. }
            | SyncError::TypeMismatch { path }
            | SyncError::UnsupportedType { path }
            | SyncError::Copy { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Underlying IO error kind, if any
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            SyncError::Io(e)
            | SyncError::Traversal { source: e, .. }
            | SyncError::Copy { source: e, .. } => Some(e.kind()),
            _ => None,
        }
    }

    /// Short label used to group errors in reports
    pub fn kind_label(&self) -> &'static str {
        match self {
            SyncError::InvalidFolder { .. } => "Invalid folder",
            SyncError::UnsupportedSyncMode(_) => "Unsupported sync mode",
            SyncError::Traversal { .. } => "Traversal error",
            SyncError::Serialization(_) => "Serialization error",
            SyncError::Io(_) => "I/O error",
            SyncError::TypeMismatch { .. } => "Type mismatch",
            SyncError::UnsupportedType { .. } => "Unsupported type",
            SyncError::Copy { .. } => "Copy error",
            SyncError::Config(_) => "Configuration error",
            SyncError::CompletedWithErrors { .. } => "Completed with errors",
        }
    }

    pub(crate) fn traversal(path: &Path, source: std::io::Error) -> Self {
        SyncError::Traversal {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn copy(path: &Path, source: std::io::Error) -> Self {
        SyncError::Copy {
            path: path.to_path_buf(),
            source,
        }
    }
}
