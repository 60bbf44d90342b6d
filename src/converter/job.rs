//! # Conversion Job Module
//!
//! Macchina a stati per singolo file: `Pending` passa esattamente una volta
//! a uno stato terminale (`Skipped`, `Succeeded`, `Failed`) e non torna mai
//! indietro.

use crate::file_manager::VideoFile;
use crate::media_probe::VideoInfo;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::PathBuf;
use tracing::warn;

/// Stato di un job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Skipped,
    Succeeded,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        self != Self::Pending
    }
}

/// Un file da convertire in questo run
#[derive(Debug, Clone, Serialize)]
pub struct ConversionJob {
    pub input: VideoFile,
    pub output_path: PathBuf,
    pub status: JobStatus,
    pub video_info: Option<VideoInfo>,
    pub error: Option<String>,
    /// Dimensione dell'output prodotto (solo `Succeeded`)
    pub output_bytes: Option<u64>,
    pub started_at: Option<DateTime<Local>>,
    pub finished_at: Option<DateTime<Local>>,
}

impl ConversionJob {
    pub fn new(input: VideoFile, output_path: PathBuf) -> Self {
        Self {
            input,
            output_path,
            status: JobStatus::Pending,
            video_info: None,
            error: None,
            output_bytes: None,
            started_at: None,
            finished_at: None,
        }
    }

    /// Segna l'inizio dell'elaborazione
    pub fn start(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(Local::now());
        }
    }

    pub fn skip(&mut self) {
        self.settle(JobStatus::Skipped, None);
    }

    pub fn succeed(&mut self, output_bytes: u64) {
        if self.settle(JobStatus::Succeeded, None) {
            self.output_bytes = Some(output_bytes);
        }
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.settle(JobStatus::Failed, Some(error.into()));
    }

    /// Unica transizione ammessa: `Pending` -> terminale.
    /// Ritorna false (senza modificare il job) se il job era già chiuso.
    fn settle(&mut self, status: JobStatus, error: Option<String>) -> bool {
        if self.status.is_terminal() {
            warn!(
                "Ignoring {:?} for {}: already {:?}",
                status,
                self.input.path.display(),
                self.status
            );
            return false;
        }

        self.start();
        self.status = status;
        self.error = error;
        self.finished_at = Some(Local::now());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> ConversionJob {
        ConversionJob::new(
            VideoFile {
                path: PathBuf::from("/in/vacation.mov"),
                extension: "mov".to_string(),
                size_bytes: 2048,
            },
            PathBuf::from("/out/vacation.mp4"),
        )
    }

    #[test]
    fn test_new_job_is_pending() {
        let job = job();
        assert_eq!(job.status, JobStatus::Pending);
        assert!(job.started_at.is_none());
        assert!(job.error.is_none());
    }

    #[test]
    fn test_failure_records_detail_and_timestamps() {
        let mut job = job();
        job.start();
        job.fail("ffmpeg exited with status 1");

        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error.as_deref(), Some("ffmpeg exited with status 1"));
        assert!(job.started_at.unwrap() <= job.finished_at.unwrap());
    }

    #[test]
    fn test_terminal_state_never_reverts() {
        let mut job = job();
        job.succeed(1024);
        job.fail("late failure");
        job.skip();

        assert_eq!(job.status, JobStatus::Succeeded);
        assert_eq!(job.output_bytes, Some(1024));
        assert!(job.error.is_none());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&JobStatus::Skipped).unwrap(), "\"skipped\"");
    }
}
