//! Parallel tree builder
//!
//! Each directory lists its entries, records its files in name order and then
//! fans out one rayon task per subdirectory. A directory returns only once all
//! of its subdirectory tasks are done, so every node is owned by exactly one
//! task until it is handed to its parent.

use crate::manifest::MANIFEST_BASE_NAME;
use crate::types::{split_name, ErrorAggregator, MetadataNode, SyncError};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Callback for reporting scan progress
///
/// Arguments:
/// - `files_scanned`: Total number of files scanned so far
/// - `bytes_scanned`: Total bytes scanned so far
pub type ProgressCallback = Box<dyn Fn(u64, u64) + Send + Sync>;

#[derive(Default)]
struct ProgressState {
    files: u64,
    bytes: u64,
}

/// Builds a [`MetadataNode`] tree for a directory.
///
/// Failures below the root are recorded in the [`ErrorAggregator`] and the
/// affected entry or subtree is left out; the rest of the walk continues.
pub struct TreeBuilder<'a> {
    errors: &'a ErrorAggregator,
    on_progress: Option<&'a ProgressCallback>,
    progress: Mutex<ProgressState>,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(errors: &'a ErrorAggregator) -> Self {
        Self {
            errors,
            on_progress: None,
            progress: Mutex::new(ProgressState::default()),
        }
    }

    pub fn with_progress(mut self, on_progress: &'a ProgressCallback) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    /// Scan `path` and everything below it.
    ///
    /// # Errors
    /// * `SyncError::Traversal` if `path` itself cannot be stat'ed or listed
    pub fn build(&self, path: &Path) -> Result<MetadataNode, SyncError> {
        let dir_meta = fs::metadata(path).map_err(|e| SyncError::traversal(path, e))?;
        let listing = fs::read_dir(path).map_err(|e| SyncError::traversal(path, e))?;
        let mut node =
            MetadataNode::directory(path, &dir_meta).map_err(|e| SyncError::traversal(path, e))?;

        let mut entries = Vec::new();
        for entry in listing {
            match entry {
                Ok(entry) => entries.push(entry),
                Err(e) => self.errors.record(SyncError::traversal(path, e)),
            }
        }
        entries.sort_by_key(|entry| entry.file_name());

        let mut subdirs: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let entry_path = entry.path();
            let file_type = match entry.file_type() {
                Ok(ft) => ft,
                Err(e) => {
                    self.errors.record(SyncError::traversal(&entry_path, e));
                    continue;
                }
            };

            // Symlinked directories are recorded as plain entries, never walked.
            if file_type.is_dir() {
                subdirs.push(entry_path);
                continue;
            }

            let full_name = entry.file_name().to_string_lossy().into_owned();
            if split_name(&full_name).0 == MANIFEST_BASE_NAME {
                continue;
            }

            match entry
                .metadata()
                .and_then(|meta| MetadataNode::file(&entry_path, &full_name, &meta))
            {
                Ok(file_node) => {
                    self.report_file(file_node.size);
                    node.push_child(file_node);
                }
                Err(e) => self.errors.record(SyncError::traversal(&entry_path, e)),
            }
        }

        tracing::debug!(
            path = %path.display(),
            files = node.children().len(),
            subdirs = subdirs.len(),
            "listed directory"
        );

        let subtrees: Vec<Result<MetadataNode, SyncError>> =
            subdirs.par_iter().map(|dir| self.build(dir)).collect();

        for subtree in subtrees {
            match subtree {
                Ok(child) => node.push_child(child),
                Err(e) => self.errors.record(e),
            }
        }

        Ok(node)
    }

    fn report_file(&self, size: u64) {
        let Some(callback) = self.on_progress else {
            return;
        };
        // Held across the callback so updates arrive one at a time.
        let mut state = self.progress.lock().unwrap_or_else(PoisonError::into_inner);
        state.files += 1;
        state.bytes += size;
        callback(state.files, state.bytes);
    }
}
