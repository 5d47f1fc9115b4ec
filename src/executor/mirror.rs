//! Mirror a scanned tree onto the destination folder
//!
//! The copier walks the same [`MetadataNode`] tree the builder produced. Files
//! of a directory are handled in order, then one rayon task runs per
//! subdirectory. Every failure is recorded and the walk moves on, so a single
//! bad entry never hides the rest of the tree.

use super::copy::{copy_file_contents, is_same_file, is_unchanged};
use crate::types::{ErrorAggregator, MetadataNode, SyncError};
use crate::Config;
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Counters for one mirror pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MirrorStats {
    /// Destination directories that did not exist before
    pub dirs_created: usize,
    pub files_copied: usize,
    /// Files already in sync at the destination
    pub files_skipped: usize,
    pub bytes_copied: u64,
    pub failed: usize,
}

/// Events emitted while mirroring.
#[derive(Debug)]
pub enum MirrorEvent {
    DirectoryCreated { path: PathBuf },
    FileCopied { path: PathBuf, bytes: u64 },
    FileSkipped { path: PathBuf },
    Failed { path: Option<PathBuf>, message: String },
}

/// Optional callback used to receive mirror events.
pub type MirrorCallback = dyn Fn(&MirrorEvent) + Send + Sync;

#[derive(Default)]
struct Counters {
    dirs_created: AtomicUsize,
    files_copied: AtomicUsize,
    files_skipped: AtomicUsize,
    bytes_copied: AtomicU64,
    failed: AtomicUsize,
}

pub struct MirrorCopier<'a> {
    source_root: &'a Path,
    destination_root: &'a Path,
    config: &'a Config,
    errors: &'a ErrorAggregator,
    on_event: Option<&'a (dyn Fn(&MirrorEvent) + Send + Sync + 'a)>,
    counters: Counters,
}

impl<'a> MirrorCopier<'a> {
    pub fn new(config: &'a Config, errors: &'a ErrorAggregator) -> Self {
        Self {
            source_root: config.folders.source(),
            destination_root: config.folders.destination(),
            config,
            errors,
            on_event: None,
            counters: Counters::default(),
        }
    }

    pub fn with_events(mut self, on_event: &'a (dyn Fn(&MirrorEvent) + Send + Sync + 'a)) -> Self {
        self.on_event = Some(on_event);
        self
    }

    /// Replicate `node` and everything below it, returning the counters so far.
    pub fn copy(&self, node: &MetadataNode) -> MirrorStats {
        self.copy_dir(node);
        self.stats()
    }

    pub fn stats(&self) -> MirrorStats {
        MirrorStats {
            dirs_created: self.counters.dirs_created.load(Ordering::Relaxed),
            files_copied: self.counters.files_copied.load(Ordering::Relaxed),
            files_skipped: self.counters.files_skipped.load(Ordering::Relaxed),
            bytes_copied: self.counters.bytes_copied.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }

    /// Destination path for a path under the source root
    pub fn destination_for(&self, route: &Path) -> Option<PathBuf> {
        let relative = route.strip_prefix(self.source_root).ok()?;
        if relative.as_os_str().is_empty() {
            Some(self.destination_root.to_path_buf())
        } else {
            Some(self.destination_root.join(relative))
        }
    }

    fn copy_dir(&self, node: &MetadataNode) {
        let Some(dest_dir) = self.destination_for(&node.route) else {
            self.fail(outside_source(&node.route));
            return;
        };

        let mut subdirs: Vec<&MetadataNode> = Vec::new();
        for child in node.children() {
            let src_meta = match fs::metadata(&child.route) {
                Ok(meta) => meta,
                Err(e) => {
                    self.fail(SyncError::traversal(&child.route, e));
                    continue;
                }
            };

            if src_meta.is_dir() {
                if self.ensure_dir(child) {
                    subdirs.push(child);
                }
            } else if src_meta.is_file() {
                let target = match child.route.file_name() {
                    Some(name) => dest_dir.join(name),
                    None => dest_dir.join(&child.full_name),
                };
                self.mirror_file(&child.route, &src_meta, &target);
            } else {
                self.fail(SyncError::UnsupportedType {
                    path: child.route.clone(),
                });
            }
        }

        subdirs.par_iter().for_each(|dir| self.copy_dir(dir));
    }

    fn ensure_dir(&self, child: &MetadataNode) -> bool {
        let Some(target) = self.destination_for(&child.route) else {
            self.fail(outside_source(&child.route));
            return false;
        };
        if target.is_dir() {
            return true;
        }
        match fs::create_dir_all(&target) {
            Ok(()) => {
                tracing::debug!(path = %target.display(), "created directory");
                self.counters.dirs_created.fetch_add(1, Ordering::Relaxed);
                self.emit(MirrorEvent::DirectoryCreated { path: target });
                true
            }
            Err(e) => {
                self.fail(SyncError::copy(&target, e));
                false
            }
        }
    }

    fn mirror_file(&self, src: &Path, src_meta: &fs::Metadata, target: &Path) {
        match fs::metadata(target) {
            Ok(dest_meta) => {
                if !dest_meta.is_file() {
                    self.fail(SyncError::TypeMismatch {
                        path: target.to_path_buf(),
                    });
                    return;
                }
                let in_sync = is_same_file(src, src_meta, target, &dest_meta)
                    || (self.config.skip_unchanged && is_unchanged(src_meta, &dest_meta));
                if in_sync {
                    tracing::debug!(path = %target.display(), "already in sync");
                    self.counters.files_skipped.fetch_add(1, Ordering::Relaxed);
                    self.emit(MirrorEvent::FileSkipped {
                        path: target.to_path_buf(),
                    });
                    return;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                self.fail(SyncError::traversal(target, e));
                return;
            }
        }

        match copy_file_contents(src, target, self.config) {
            Ok(bytes) => {
                tracing::debug!(path = %target.display(), bytes, "copied file");
                self.counters.files_copied.fetch_add(1, Ordering::Relaxed);
                self.counters.bytes_copied.fetch_add(bytes, Ordering::Relaxed);
                self.emit(MirrorEvent::FileCopied {
                    path: target.to_path_buf(),
                    bytes,
                });
            }
            Err(e) => self.fail(SyncError::copy(target, e)),
        }
    }

    fn fail(&self, error: SyncError) {
        self.counters.failed.fetch_add(1, Ordering::Relaxed);
        self.emit(MirrorEvent::Failed {
            path: error.path().map(Path::to_path_buf),
            message: error.to_string(),
        });
        self.errors.record(error);
    }

    fn emit(&self, event: MirrorEvent) {
        if let Some(callback) = self.on_event {
            callback(&event);
        }
    }
}

fn outside_source(route: &Path) -> SyncError {
    SyncError::copy(
        route,
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "path is not inside the source folder",
        ),
    )
}
