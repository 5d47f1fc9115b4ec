//! FolderPair - the source/destination pair of one run

use super::SyncError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Sync mode requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    /// One host folder mirrored to one destination
    #[default]
    Single,

    /// Several folders kept in sync with each other (not implemented)
    Multi,
}

impl SyncMode {
    /// Value stored in the manifest's `sync_type` field
    pub fn manifest_label(self) -> &'static str {
        match self {
            SyncMode::Single => "solo",
            SyncMode::Multi => "multi",
        }
    }
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncMode::Single => f.write_str("single"),
            SyncMode::Multi => f.write_str("multi"),
        }
    }
}

/// Source and destination folders of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderPair {
    source: PathBuf,
    destination: PathBuf,
    mode: SyncMode,
}

impl FolderPair {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>, mode: SyncMode) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            mode,
        }
    }

    /// Shorthand for a `SyncMode::Single` pair
    pub fn single(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self::new(source, destination, SyncMode::Single)
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn mode(&self) -> SyncMode {
        self.mode
    }

    /// Check that both folders can be entered, then that the mode is supported.
    pub fn validate(&self) -> Result<(), SyncError> {
        for folder in [&self.source, &self.destination] {
            if !can_enter_folder(folder) {
                return Err(SyncError::InvalidFolder {
                    path: folder.clone(),
                });
            }
        }

        if self.mode != SyncMode::Single {
            return Err(SyncError::UnsupportedSyncMode(self.mode));
        }

        Ok(())
    }
}

/// A folder is enterable when it is a directory whose entries can be listed.
pub fn can_enter_folder(path: &Path) -> bool {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => fs::read_dir(path).is_ok(),
        _ => false,
    }
}
