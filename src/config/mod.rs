//! Configuration management

mod cli;

pub use cli::{Cli, Command, SyncArgs};

use crate::types::{FolderPair, SyncError};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Runtime configuration for one sync run
#[derive(Debug, Clone)]
pub struct Config {
    /// Source and destination folders
    pub folders: FolderPair,

    /// Worker threads shared by the scan and mirror phases
    pub threads: usize,

    /// `sync_all` every copied file before closing it
    pub fsync: bool,

    /// Also skip destination files whose size and mtime already match.
    /// Off by default: only the same underlying file is skipped, anything
    /// else is overwritten.
    pub skip_unchanged: bool,

    /// Draw progress bars on stderr
    pub show_progress: bool,
}

impl Config {
    pub fn new(folders: FolderPair) -> Self {
        Self {
            folders,
            threads: 4,
            fsync: true,
            skip_unchanged: false,
            show_progress: false,
        }
    }

    /// Apply values from a TOML config file on top of the current ones
    pub fn merge_file(mut self, file: &FileConfig) -> Self {
        if let Some(threads) = file.threads {
            self.threads = threads;
        }
        if let Some(fsync) = file.fsync {
            self.fsync = fsync;
        }
        if let Some(skip) = file.skip_unchanged {
            self.skip_unchanged = skip;
        }
        if let Some(progress) = file.progress {
            self.show_progress = progress;
        }
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), SyncError> {
        if self.threads == 0 {
            return Err(SyncError::Config(
                "Thread count must be at least 1".to_string(),
            ));
        }
        self.folders.validate()
    }
}

/// Optional settings read from a TOML file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub threads: Option<usize>,
    pub fsync: Option<bool>,
    pub skip_unchanged: Option<bool>,
    pub progress: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, SyncError> {
        let text = fs::read_to_string(path).map_err(|e| {
            SyncError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&text)
            .map_err(|e| SyncError::Config(format!("Invalid config {}: {}", path.display(), e)))
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn pair() -> FolderPair {
        FolderPair::single("/src", "/dst")
    }

    #[test]
    fn test_defaults() {
        let config = Config::new(pair());
        assert_eq!(config.threads, 4);
        assert!(config.fsync);
        assert!(!config.skip_unchanged);
        assert!(!config.show_progress);
    }

    #[test]
    fn test_parse_file_config() {
        let file = FileConfig::parse("threads = 8\nfsync = false\n").expect("valid toml");
        assert_eq!(file.threads, Some(8));
        assert_eq!(file.fsync, Some(false));
        assert_eq!(file.skip_unchanged, None);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(FileConfig::parse("exclude = [\"*.log\"]").is_err());
    }

    #[test]
    fn test_merge_only_overrides_present_keys() {
        let file = FileConfig {
            threads: Some(2),
            progress: Some(true),
            ..FileConfig::default()
        };
        let config = Config::new(pair()).merge_file(&file);
        assert_eq!(config.threads, 2);
        assert!(config.show_progress);
        assert!(config.fsync);
        assert!(!config.skip_unchanged);
    }

    #[test]
    fn test_load_reports_path_on_error() {
        let temp = TempDir::new().expect("create temp dir");
        let path = temp.path().join("foldersync.toml");
        fs::write(&path, "threads = \"many\"").expect("write config");

        let err = FileConfig::load(&path).unwrap_err();
        assert!(matches!(err, SyncError::Config(ref msg) if msg.contains("foldersync.toml")));
    }

    #[test]
    fn test_validate_rejects_zero_threads() {
        let src = TempDir::new().expect("create src");
        let dst = TempDir::new().expect("create dst");
        let mut config = Config::new(FolderPair::single(src.path(), dst.path()));
        config.validate().expect("valid config");

        config.threads = 0;
        assert!(matches!(config.validate(), Err(SyncError::Config(_))));
    }
}
