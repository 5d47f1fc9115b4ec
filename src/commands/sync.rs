//! Main sync command

use crate::executor::{MirrorCallback, MirrorCopier, MirrorEvent, MirrorStats};
use crate::manifest::Manifest;
use crate::scanner::{ProgressCallback, TreeBuilder};
use crate::types::{ErrorAggregator, SyncError};
use crate::ui::ProgressReporter;
use crate::Config;
use indicatif::HumanBytes;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Outcome of a run that got past the manifest write
#[derive(Debug)]
pub struct SyncReport {
    pub manifest_path: PathBuf,
    pub scanned_files: usize,
    pub scanned_dirs: usize,
    pub mirror: MirrorStats,
    /// Non-fatal errors from both phases, scan errors first
    pub errors: Vec<SyncError>,
    /// How many leading entries of `errors` were recorded by the scan
    pub scan_error_count: usize,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Turn a run that completed with errors into an `Err`
    pub fn into_result(self) -> Result<Self, SyncError> {
        if self.is_clean() {
            Ok(self)
        } else {
            Err(SyncError::CompletedWithErrors {
                count: self.errors.len(),
            })
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Synced {} files in {} folders:\n  Copied: {}  Up to date: {}  Folders created: {}  Failed: {}\n  Bytes copied: {}\n  Manifest: {}",
            self.scanned_files,
            self.scanned_dirs,
            self.mirror.files_copied,
            self.mirror.files_skipped,
            self.mirror.dirs_created,
            self.errors.len(),
            HumanBytes(self.mirror.bytes_copied),
            self.manifest_path.display()
        )
    }

    /// Grouped, human-readable listing of the recorded errors
    pub fn error_summary(&self) -> Option<String> {
        if self.errors.is_empty() {
            return None;
        }
        let records: Vec<ErrorRecord> = self
            .errors
            .iter()
            .enumerate()
            .map(|(i, error)| {
                let phase = if i < self.scan_error_count {
                    Phase::Scan
                } else {
                    Phase::Mirror
                };
                ErrorRecord::new(phase, error)
            })
            .collect();
        Some(format_error_summary(&records))
    }
}

/// Run the sync operation
///
/// Validates the folders, scans the source, writes the manifest and mirrors the
/// tree onto the destination. Only validation, the root scan and the manifest
/// write can fail the run; everything else ends up in `SyncReport::errors`.
pub fn run(config: &Config) -> Result<SyncReport, SyncError> {
    config.validate()?;
    let folders = &config.folders;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .thread_name(|i| format!("foldersync-{i}"))
        .build()
        .map_err(|e| SyncError::Config(format!("Failed to start worker pool: {}", e)))?;

    let reporter = Arc::new(Mutex::new(if config.show_progress {
        ProgressReporter::new()
    } else {
        ProgressReporter::hidden()
    }));
    let errors = ErrorAggregator::new();

    tracing::info!(
        source = %folders.source().display(),
        destination = %folders.destination().display(),
        threads = config.threads,
        "starting sync"
    );

    if let Ok(progress) = reporter.lock() {
        progress.start_scan(&folders.source().display().to_string());
    }
    let scan_progress: ProgressCallback = {
        let reporter = Arc::clone(&reporter);
        Box::new(move |files: u64, bytes: u64| {
            if let Ok(progress) = reporter.lock() {
                progress.update_scan(files, bytes);
            }
        })
    };
    let root = pool.install(|| {
        TreeBuilder::new(&errors)
            .with_progress(&scan_progress)
            .build(folders.source())
    })?;
    let scan_error_count = errors.len();
    let scanned_files = root.file_count();
    let scanned_dirs = root.dir_count();
    if let Ok(progress) = reporter.lock() {
        progress.finish_scan(scanned_files, scanned_dirs);
    }

    let manifest = Manifest::new(folders, root);
    let manifest_path = manifest.write(folders.source())?;

    if let Ok(mut progress) = reporter.lock() {
        progress.start_mirror(scanned_files as u64);
    }
    let on_event = {
        let reporter = Arc::clone(&reporter);
        move |event: &MirrorEvent| {
            if let Ok(mut progress) = reporter.lock() {
                progress.mirror_event(event);
            }
        }
    };
    let on_event: &MirrorCallback = &on_event;
    let mirror = match manifest.root() {
        Some(root) => pool.install(|| {
            MirrorCopier::new(config, &errors)
                .with_events(on_event)
                .copy(root)
        }),
        None => MirrorStats::default(),
    };
    if let Ok(progress) = reporter.lock() {
        progress.finish_mirror(&mirror);
    }

    let errors = errors.into_inner();
    tracing::info!(
        copied = mirror.files_copied,
        skipped = mirror.files_skipped,
        errors = errors.len(),
        "sync finished"
    );

    Ok(SyncReport {
        manifest_path,
        scanned_files,
        scanned_dirs,
        mirror,
        errors,
        scan_error_count,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Phase {
    Scan,
    Mirror,
}

impl Phase {
    fn label(self) -> &'static str {
        match self {
            Phase::Scan => "scan",
            Phase::Mirror => "mirror",
        }
    }
}

#[derive(Debug)]
struct ErrorRecord {
    phase: Phase,
    kind: &'static str,
    path: Option<PathBuf>,
    message: String,
    suggestion: Option<String>,
}

impl ErrorRecord {
    fn new(phase: Phase, error: &SyncError) -> Self {
        let (message, suggestion) = humanize_error(error);
        Self {
            phase,
            kind: error.kind_label(),
            path: error.path().map(PathBuf::from),
            message,
            suggestion,
        }
    }
}

fn humanize_error(error: &SyncError) -> (String, Option<String>) {
    match error {
        SyncError::Traversal { source, .. } | SyncError::Copy { source, .. } => {
            humanize_io(source)
        }
        SyncError::Io(io) => humanize_io(io),
        SyncError::TypeMismatch { .. } => (
            "The destination path exists but is not a regular file".to_string(),
            Some("Remove or rename the conflicting path, then retry.".to_string()),
        ),
        SyncError::UnsupportedType { .. } => (
            "Source entry is neither a file nor a folder and cannot be copied".to_string(),
            Some("Sockets, pipes and device files are not synced.".to_string()),
        ),
        SyncError::InvalidFolder { .. } => (
            "Folder does not exist or cannot be entered".to_string(),
            Some("Check the path and its permissions.".to_string()),
        ),
        SyncError::UnsupportedSyncMode(mode) => (
            format!("Sync mode '{}' is not available yet", mode),
            Some("Use single mode (-s).".to_string()),
        ),
        SyncError::Serialization(e) => (format!("Manifest could not be encoded: {}", e), None),
        SyncError::Config(msg) => (msg.clone(), None),
        SyncError::CompletedWithErrors { count } => {
            (format!("{} error(s) were recorded", count), None)
        }
    }
}

fn humanize_io(io: &std::io::Error) -> (String, Option<String>) {
    match io.kind() {
        ErrorKind::NotFound => (
            "File or directory was not found".to_string(),
            Some("Verify the path still exists and retry.".to_string()),
        ),
        ErrorKind::PermissionDenied => (
            "Permission denied while accessing file".to_string(),
            Some("Check file permissions or run with a user that has access.".to_string()),
        ),
        ErrorKind::AlreadyExists => (
            "The destination path already exists as a file or directory".to_string(),
            Some("Remove or rename the conflicting path, then retry.".to_string()),
        ),
        ErrorKind::WriteZero | ErrorKind::BrokenPipe | ErrorKind::UnexpectedEof => (
            "File copy was interrupted before completion".to_string(),
            Some("Retry the sync and check disk stability.".to_string()),
        ),
        _ => (
            format!("I/O operation failed: {}", io),
            Some(
                "Retry the sync. If this keeps happening, check disk health and permissions."
                    .to_string(),
            ),
        ),
    }
}

const SHOWN_PER_GROUP: usize = 3;

// Groups by phase, then kind; each group lists its first few entries.
fn format_error_summary(records: &[ErrorRecord]) -> String {
    let mut groups: BTreeMap<(Phase, &'static str), Vec<&ErrorRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry((record.phase, record.kind))
            .or_default()
            .push(record);
    }

    let mut out = format!("Error summary: {} error(s)", records.len());
    for ((phase, kind), items) in &groups {
        out.push_str(&format!("\n  [{}] {} ({}):", phase.label(), kind, items.len()));
        for record in items.iter().take(SHOWN_PER_GROUP) {
            match &record.path {
                Some(path) => out.push_str(&format!("\n    {}: {}", path.display(), record.message)),
                None => out.push_str(&format!("\n    {}", record.message)),
            }
            if let Some(hint) = &record.suggestion {
                out.push_str(&format!("\n      hint: {}", hint));
            }
        }
        if items.len() > SHOWN_PER_GROUP {
            out.push_str(&format!("\n    and {} more", items.len() - SHOWN_PER_GROUP));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SyncMode;
    use crate::FolderPair;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn report_with(errors: Vec<SyncError>) -> SyncReport {
        SyncReport {
            manifest_path: PathBuf::from("/src/JSONSync.json"),
            scanned_files: 4,
            scanned_dirs: 1,
            mirror: MirrorStats {
                files_copied: 3,
                files_skipped: 1,
                bytes_copied: 5 * 1024 * 1024,
                ..MirrorStats::default()
            },
            errors,
            scan_error_count: 0,
        }
    }

    #[test]
    fn test_clean_report_passes_into_result() {
        let report = report_with(Vec::new());
        assert!(report.is_clean());
        assert!(report.error_summary().is_none());
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn test_report_with_errors_is_completed_with_errors() {
        let report = report_with(vec![SyncError::UnsupportedType {
            path: PathBuf::from("/src/pipe"),
        }]);
        assert!(!report.is_clean());
        let err = report.into_result().unwrap_err();
        assert!(matches!(err, SyncError::CompletedWithErrors { count: 1 }));
    }

    #[test]
    fn test_summary_contains_counts_and_human_bytes() {
        let summary = report_with(Vec::new()).summary();
        assert!(summary.contains("Copied: 3"));
        assert!(summary.contains("Up to date: 1"));
        assert!(summary.contains("MiB"), "{summary}");
        assert!(summary.contains("JSONSync.json"));
    }

    #[test]
    fn test_format_error_summary_groups_by_kind() {
        let errors = vec![
            SyncError::TypeMismatch {
                path: PathBuf::from("/dst/a.txt"),
            },
            SyncError::copy(
                Path::new("/dst/b.txt"),
                std::io::Error::new(ErrorKind::PermissionDenied, "denied"),
            ),
            SyncError::TypeMismatch {
                path: PathBuf::from("/dst/c.txt"),
            },
        ];

        let summary = report_with(errors).error_summary().expect("has errors");
        assert!(summary.starts_with("Error summary: 3 error(s)"), "{summary}");
        assert!(summary.contains("[mirror] Type mismatch (2):"));
        assert!(summary.contains("[mirror] Copy error (1):"));
        assert!(summary.contains("/dst/a.txt: The destination path exists"));
        assert!(summary.contains("hint: Check file permissions"));
    }

    #[test]
    fn test_error_summary_truncates_long_groups() {
        let errors = (0..5)
            .map(|i| SyncError::UnsupportedType {
                path: PathBuf::from(format!("/src/sock{i}")),
            })
            .collect();
        let summary = report_with(errors).error_summary().expect("has errors");
        assert!(summary.contains("Unsupported type (5):"));
        assert!(summary.contains("and 2 more"));
        assert!(!summary.contains("/src/sock3"));
    }

    #[test]
    fn test_error_summary_separates_scan_and_mirror() {
        let errors = vec![
            SyncError::traversal(
                Path::new("/src/locked"),
                std::io::Error::new(ErrorKind::PermissionDenied, "denied"),
            ),
            SyncError::traversal(
                Path::new("/src/vanished.txt"),
                std::io::Error::new(ErrorKind::NotFound, "gone"),
            ),
        ];
        let mut report = report_with(errors);
        report.scan_error_count = 1;

        let summary = report.error_summary().expect("has errors");
        let scan = summary.find("[scan] Traversal error (1):").expect("scan group");
        let mirror = summary
            .find("[mirror] Traversal error (1):")
            .expect("mirror group");
        assert!(scan < mirror, "{summary}");
        assert!(summary[scan..mirror].contains("/src/locked"));
        assert!(summary[mirror..].contains("/src/vanished.txt"));
    }

    #[test]
    fn test_run_rejects_invalid_folder_before_writing() {
        let src = TempDir::new().expect("create src");
        let config = Config::new(FolderPair::single(src.path(), src.path().join("missing")));

        let err = run(&config).unwrap_err();
        assert!(matches!(err, SyncError::InvalidFolder { .. }));
        assert!(!src.path().join("JSONSync.json").exists());
    }

    #[test]
    fn test_run_rejects_zero_threads() {
        let src = TempDir::new().expect("create src");
        let dst = TempDir::new().expect("create dst");
        let mut config = Config::new(FolderPair::single(src.path(), dst.path()));
        config.threads = 0;

        let err = run(&config).unwrap_err();
        assert!(matches!(err, SyncError::Config(_)));
        assert!(!src.path().join("JSONSync.json").exists());
    }

    #[test]
    fn test_run_rejects_multi_mode_before_writing() {
        let src = TempDir::new().expect("create src");
        let dst = TempDir::new().expect("create dst");
        fs::write(src.path().join("a.txt"), b"a").expect("write a");
        let config = Config::new(FolderPair::new(src.path(), dst.path(), SyncMode::Multi));

        let err = run(&config).unwrap_err();
        assert!(matches!(err, SyncError::UnsupportedSyncMode(SyncMode::Multi)));
        assert!(!src.path().join("JSONSync.json").exists());
        assert!(!dst.path().join("a.txt").exists());
    }
}
