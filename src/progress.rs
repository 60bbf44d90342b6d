//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce il feedback visivo e le statistiche del run.
//!
//! ## Componenti principali:
//! - `ProgressManager`: Spinner `indicatif` mostrato mentre FFmpeg lavora
//! - `SessionStats`: Contatori del run (trovati, convertiti, saltati, falliti)
//!
//! ## Statistiche tracciate:
//! - **discovered**: File video trovati nella directory di input
//! - **succeeded**: File convertiti con successo
//! - **skipped**: File il cui output esisteva già
//! - **failed**: Conversioni fallite
//! - **input_bytes / output_bytes**: Byte letti/scritti dalle conversioni riuscite
//!
//! A fine run vale sempre `discovered == succeeded + skipped + failed`.
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:01:12] Converting holiday.mov
//! ```

use crate::converter::job::{ConversionJob, JobStatus};
use crate::file_manager::FileManager;
use chrono::{DateTime, Local};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::Duration;

/// Manages the interactive spinner shown during a transcode
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a spinner, hidden when `visible` is false
    pub fn spinner(message: &str, visible: bool) -> Self {
        let bar = if visible {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::hidden()
        };

        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}") {
            bar.set_style(style);
        }

        bar.set_message(message.to_string());
        if visible {
            bar.enable_steady_tick(Duration::from_millis(100));
        }

        Self { bar }
    }

    /// Set a custom message
    pub fn set_message(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    /// Remove the spinner from the terminal
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Counters and timings for one run
#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    pub discovered: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub input_bytes: u64,
    pub output_bytes: u64,
    pub started_at: DateTime<Local>,
    pub finished_at: Option<DateTime<Local>>,
}

impl SessionStats {
    pub fn new(started_at: DateTime<Local>) -> Self {
        Self {
            discovered: 0,
            succeeded: 0,
            skipped: 0,
            failed: 0,
            input_bytes: 0,
            output_bytes: 0,
            started_at,
            finished_at: None,
        }
    }

    /// Count a job that reached its terminal state
    pub fn record(&mut self, job: &ConversionJob) {
        match job.status {
            JobStatus::Pending => {}
            JobStatus::Skipped => self.skipped += 1,
            JobStatus::Failed => self.failed += 1,
            JobStatus::Succeeded => {
                self.succeeded += 1;
                self.input_bytes += job.input.size_bytes;
                self.output_bytes += job.output_bytes.unwrap_or(0);
            }
        }
    }

    pub fn finish(&mut self, finished_at: DateTime<Local>) {
        self.finished_at = Some(finished_at);
    }

    /// Jobs that reached a terminal state
    pub fn settled(&self) -> usize {
        self.succeeded + self.skipped + self.failed
    }

    pub fn is_consistent(&self) -> bool {
        self.discovered == self.settled()
    }

    /// Run verdict: nothing failed (an empty run counts as success)
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at.unwrap_or_else(Local::now) - self.started_at
    }

    /// `H:MM:SS`
    pub fn format_elapsed(&self) -> String {
        let total = self.elapsed().num_seconds().max(0);
        format!("{}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
    }

    /// Lines of the closing summary block
    pub fn summary_lines(&self) -> Vec<String> {
        vec![
            format!("Total files found: {}", self.discovered),
            format!("Successfully processed: {}", self.succeeded),
            format!("Skipped (already exists): {}", self.skipped),
            format!("Failed conversions: {}", self.failed),
            format!(
                "Data converted: {} -> {}",
                FileManager::format_size(self.input_bytes),
                FileManager::format_size(self.output_bytes)
            ),
            format!("Total processing time: {}", self.format_elapsed()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_manager::VideoFile;
    use std::path::PathBuf;

    fn job(name: &str, size: u64) -> ConversionJob {
        ConversionJob::new(
            VideoFile {
                path: PathBuf::from(format!("/in/{}", name)),
                extension: "mov".to_string(),
                size_bytes: size,
            },
            PathBuf::from("/out"),
        )
    }

    #[test]
    fn test_record_terminal_states() {
        let mut stats = SessionStats::new(Local::now());
        stats.discovered = 3;

        let mut converted = job("a.mov", 1000);
        converted.succeed(400);
        let mut skipped = job("b.mov", 10);
        skipped.skip();
        let mut failed = job("c.mov", 10);
        failed.fail("exit status 1");

        for job in [&converted, &skipped, &failed] {
            stats.record(job);
        }

        assert_eq!((stats.succeeded, stats.skipped, stats.failed), (1, 1, 1));
        assert_eq!(stats.input_bytes, 1000);
        assert_eq!(stats.output_bytes, 400);
        assert!(stats.is_consistent());
        assert!(!stats.is_success());
    }

    #[test]
    fn test_pending_jobs_are_not_counted() {
        let mut stats = SessionStats::new(Local::now());
        stats.discovered = 1;
        stats.record(&job("a.mov", 1));
        assert_eq!(stats.settled(), 0);
        assert!(!stats.is_consistent());
    }

    #[test]
    fn test_empty_run_is_success() {
        let stats = SessionStats::new(Local::now());
        assert!(stats.is_consistent());
        assert!(stats.is_success());
    }

    #[test]
    fn test_format_elapsed() {
        let start = Local::now();
        let mut stats = SessionStats::new(start);
        stats.finish(start + chrono::Duration::seconds(3725));
        assert_eq!(stats.format_elapsed(), "1:02:05");
        assert!(stats
            .summary_lines()
            .contains(&"Total processing time: 1:02:05".to_string()));
    }

    #[test]
    fn test_hidden_spinner_is_silent() {
        let spinner = ProgressManager::spinner("Converting a.mov", false);
        spinner.set_message("Converting b.mov");
        spinner.finish();
    }
}
