//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON per consumatori programmatici.
//!
//! ## Responsabilità:
//! - Emette un messaggio JSON per riga su stdout (`--json`)
//! - Riusa i tipi del run (`ConversionJob`, `SessionStats`)
//!
//! ## Tipi di messaggi:
//! - `start`: Inizio run con numero di file trovati
//! - `file_complete`: Fine elaborazione di un file (esito ed eventuale errore)
//! - `complete`: Fine run con statistiche finali e verdetto

use crate::converter::job::{ConversionJob, JobStatus};
use crate::progress::SessionStats;
use serde::Serialize;
use std::path::PathBuf;

/// Tipo di messaggio JSON
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JsonMessage {
    /// Inizio del run
    Start {
        input_dir: PathBuf,
        output_dir: PathBuf,
        total_files: usize,
    },

    /// Fine elaborazione di un file specifico
    FileComplete {
        index: usize,
        total: usize,
        input: PathBuf,
        output: PathBuf,
        status: JobStatus,
        error: Option<String>,
    },

    /// Run completato
    Complete {
        discovered: usize,
        succeeded: usize,
        skipped: usize,
        failed: usize,
        duration_seconds: f64,
        success: bool,
    },
}

impl JsonMessage {
    pub fn start(input_dir: PathBuf, output_dir: PathBuf, total_files: usize) -> Self {
        Self::Start {
            input_dir,
            output_dir,
            total_files,
        }
    }

    pub fn file_complete(index: usize, total: usize, job: &ConversionJob) -> Self {
        Self::FileComplete {
            index,
            total,
            input: job.input.path.clone(),
            output: job.output_path.clone(),
            status: job.status,
            error: job.error.clone(),
        }
    }

    pub fn complete(stats: &SessionStats) -> Self {
        Self::Complete {
            discovered: stats.discovered,
            succeeded: stats.succeeded,
            skipped: stats.skipped,
            failed: stats.failed,
            duration_seconds: stats.elapsed().num_milliseconds() as f64 / 1000.0,
            success: stats.is_success(),
        }
    }

    /// Print as a single JSON line on stdout
    pub fn emit(&self) {
        match serde_json::to_string(self) {
            Ok(line) => println!("{}", line),
            Err(e) => tracing::warn!("Failed to serialize JSON message: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_manager::VideoFile;
    use chrono::Local;

    #[test]
    fn test_file_complete_shape() {
        let mut job = ConversionJob::new(
            VideoFile {
                path: PathBuf::from("/in/c.avi"),
                extension: "avi".to_string(),
                size_bytes: 10,
            },
            PathBuf::from("/out/c.mp4"),
        );
        job.fail("ffmpeg exited with exit status: 1");

        let value = serde_json::to_value(JsonMessage::file_complete(3, 3, &job)).unwrap();
        assert_eq!(value["type"], "file_complete");
        assert_eq!(value["status"], "failed");
        assert_eq!(value["index"], 3);
        assert_eq!(value["output"], "/out/c.mp4");
        assert_eq!(value["error"], "ffmpeg exited with exit status: 1");
    }

    #[test]
    fn test_complete_carries_verdict() {
        let mut stats = SessionStats::new(Local::now());
        stats.discovered = 2;
        stats.succeeded = 1;
        stats.failed = 1;
        stats.finish(Local::now());

        let value = serde_json::to_value(JsonMessage::complete(&stats)).unwrap();
        assert_eq!(value["type"], "complete");
        assert_eq!(value["success"], false);
        assert_eq!(value["failed"], 1);
    }
}
