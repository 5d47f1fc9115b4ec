//! Persisted description of a scanned source tree
//!
//! The manifest is written to `JSONSync.json` inside the source folder before
//! any file is copied. Its folder hash fields hold a fixed placeholder; no
//! content hashing is performed.

use crate::types::node::serialize_path_lossy;
use crate::types::{format_timestamp, FolderPair, MetadataNode, SyncError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// File name of the manifest inside the source folder
pub const MANIFEST_FILE_NAME: &str = "JSONSync.json";

/// Base name excluded from scans so the manifest never describes itself
pub const MANIFEST_BASE_NAME: &str = "JSONSync";

/// Stand-in value for the folder hash fields
pub const PLACEHOLDER_HASH: &str = "example_hash";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Manifest {
    pub sync_type: String,
    #[serde(serialize_with = "serialize_path_lossy")]
    pub first_folder: PathBuf,
    #[serde(serialize_with = "serialize_path_lossy")]
    pub last_folder: PathBuf,
    /// Always a single element: the root of the source tree
    pub elem_list: Vec<MetadataNode>,
    pub first_folder_hash: String,
    pub last_folder_hash: String,
    pub last_modified: String,
}

impl Manifest {
    /// Describe one run over `folders`, stamped with the current time
    pub fn new(folders: &FolderPair, root: MetadataNode) -> Self {
        Self {
            sync_type: folders.mode().manifest_label().to_string(),
            first_folder: folders.source().to_path_buf(),
            last_folder: folders.destination().to_path_buf(),
            elem_list: vec![root],
            first_folder_hash: PLACEHOLDER_HASH.to_string(),
            last_folder_hash: PLACEHOLDER_HASH.to_string(),
            last_modified: format_timestamp(SystemTime::now()),
        }
    }

    pub fn root(&self) -> Option<&MetadataNode> {
        self.elem_list.first()
    }

    /// Pretty JSON with two-space indentation
    pub fn to_json(&self) -> Result<String, SyncError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the manifest into `folder`, replacing any previous one.
    ///
    /// # Errors
    /// * `SyncError::Serialization` if the tree cannot be encoded
    /// * `SyncError::Io` if the file cannot be written
    pub fn write(&self, folder: &Path) -> Result<PathBuf, SyncError> {
        let path = manifest_path(folder);
        let json = self.to_json()?;
        fs::write(&path, json)?;
        tracing::info!(path = %path.display(), "manifest written");
        Ok(path)
    }

    /// Read the manifest stored in `folder`
    pub fn load(folder: &Path) -> Result<Self, SyncError> {
        let text = fs::read_to_string(manifest_path(folder))?;
        Ok(serde_json::from_str(&text)?)
    }
}

pub fn manifest_path(folder: &Path) -> PathBuf {
    folder.join(MANIFEST_FILE_NAME)
}
