//! Progress reporting

use crate::executor::{MirrorEvent, MirrorStats};
use indicatif::{HumanBytes, ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};

/// Progress reporter for the scan and mirror phases
pub struct ProgressReporter {
    scan_bar: ProgressBar,
    mirror_bar: ProgressBar,
    mirror_started_at: Option<Instant>,
    copied_bytes: u64,
}

impl ProgressReporter {
    /// Create a reporter drawing to stderr
    pub fn new() -> Self {
        let scan_bar = ProgressBar::new_spinner();
        scan_bar.enable_steady_tick(Duration::from_millis(120));
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            scan_bar.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
        }

        let mirror_bar = ProgressBar::new(0);
        if let Ok(style) =
            ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} files | {msg}")
        {
            mirror_bar.set_style(style.progress_chars("=>-"));
        }

        Self::with_bars(scan_bar, mirror_bar)
    }

    /// Create a reporter that tracks state without drawing anything
    pub fn hidden() -> Self {
        Self::with_bars(ProgressBar::hidden(), ProgressBar::hidden())
    }

    fn with_bars(scan_bar: ProgressBar, mirror_bar: ProgressBar) -> Self {
        Self {
            scan_bar,
            mirror_bar,
            mirror_started_at: None,
            copied_bytes: 0,
        }
    }

    pub fn start_scan(&self, root: &str) {
        self.scan_bar.set_message(format!("Scanning {}...", root));
    }

    pub fn update_scan(&self, files: u64, bytes: u64) {
        self.scan_bar.set_message(format!(
            "Scanning... {} files | {}",
            files,
            HumanBytes(bytes)
        ));
    }

    pub fn finish_scan(&self, files: usize, dirs: usize) {
        self.scan_bar
            .finish_with_message(format!("Scanned {} files in {} folders", files, dirs));
    }

    /// Initialize the mirror phase with the number of files to visit.
    pub fn start_mirror(&mut self, total_files: u64) {
        self.mirror_started_at = Some(Instant::now());
        self.copied_bytes = 0;
        self.mirror_bar.set_length(total_files);
        self.mirror_bar.set_position(0);
        self.mirror_bar.set_message("Starting copy...".to_string());
    }

    pub fn mirror_event(&mut self, event: &MirrorEvent) {
        match event {
            MirrorEvent::FileCopied { bytes, .. } => {
                self.copied_bytes = self.copied_bytes.saturating_add(*bytes);
                self.mirror_bar.inc(1);
                self.mirror_bar.set_message(format!(
                    "{} copied | {}/s",
                    HumanBytes(self.copied_bytes),
                    HumanBytes(self.throughput_bps())
                ));
            }
            MirrorEvent::FileSkipped { .. } => self.mirror_bar.inc(1),
            MirrorEvent::DirectoryCreated { .. } => {}
            MirrorEvent::Failed { path, message } => {
                let shown = path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<none>".to_string());
                self.mirror_bar.println(format!("ERROR {}: {}", shown, message));
            }
        }
    }

    pub fn finish_mirror(&self, stats: &MirrorStats) {
        self.mirror_bar.finish_with_message(format!(
            "{} copied, {} up to date, {} failed | {} | {}/s",
            stats.files_copied,
            stats.files_skipped,
            stats.failed,
            HumanBytes(stats.bytes_copied),
            HumanBytes(self.throughput_bps())
        ));
    }

    fn throughput_bps(&self) -> u64 {
        match self.mirror_started_at {
            Some(started) => {
                let secs = started.elapsed().as_secs_f64();
                if secs > 0.0 {
                    (self.copied_bytes as f64 / secs) as u64
                } else {
                    0
                }
            }
            None => 0,
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}
