//! # Run Log Module
//!
//! Handle di logging esplicito, legato alla durata di un singolo run.
//!
//! ## Responsabilità:
//! - Apre un file di log per run: `video_conversion_<YYYYMMDD_HHMMSS>.log`
//! - Scrive ogni evento con timestamp (`2024-05-01 10:00:00.123 - INFO - ...`)
//! - Inoltra ogni evento a `tracing` (sink interattivo configurato nel main)
//! - Degrada a solo-interattivo se il file non è apribile
//!
//! Il file riceve INFO/WARN/ERROR; DEBUG va solo al sink interattivo.
//! Il handle viene passato per riferimento a probe e invoker e chiuso
//! (`close`) alla fine del run.

use chrono::{DateTime, Local};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};

const FILE_PREFIX: &str = "video_conversion_";

/// Dual-sink logger for one conversion run
pub struct RunLog {
    file: Option<Mutex<RollingFileAppender>>,
    path: Option<PathBuf>,
}

impl RunLog {
    /// Open the persistent log for a run starting at `started_at`
    pub fn open(log_dir: &Path, started_at: DateTime<Local>) -> std::io::Result<Self> {
        let stem = Self::file_stem(started_at);
        let appender = RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(&stem)
            .filename_suffix("log")
            .build(log_dir)
            .map_err(std::io::Error::other)?;

        Ok(Self {
            file: Some(Mutex::new(appender)),
            path: Some(log_dir.join(format!("{}.log", stem))),
        })
    }

    /// A log without a persistent sink
    pub fn interactive_only() -> Self {
        Self { file: None, path: None }
    }

    /// `video_conversion_20240501_100000`
    pub fn file_stem(started_at: DateTime<Local>) -> String {
        format!("{}{}", FILE_PREFIX, started_at.format("%Y%m%d_%H%M%S"))
    }

    /// Path of the session file, if one is open
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn debug(&self, message: impl AsRef<str>) {
        self.record(Level::DEBUG, message.as_ref());
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.record(Level::INFO, message.as_ref());
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        self.record(Level::WARN, message.as_ref());
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.record(Level::ERROR, message.as_ref());
    }

    fn record(&self, level: Level, message: &str) {
        match level {
            Level::ERROR => tracing::error!("{}", message),
            Level::WARN => tracing::warn!("{}", message),
            Level::INFO => tracing::info!("{}", message),
            Level::DEBUG => tracing::debug!("{}", message),
            _ => tracing::trace!("{}", message),
        }

        if level > Level::INFO {
            return;
        }

        if let Some(file) = &self.file {
            let line = format!(
                "{} - {} - {}\n",
                Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                level,
                message
            );
            // A broken log sink must not disturb the conversion itself
            if let Ok(mut writer) = file.lock() {
                if let Err(e) = writer.write_all(line.as_bytes()) {
                    tracing::debug!("Failed to write run log: {}", e);
                }
            }
        }
    }

    /// Flush and close the persistent sink
    pub fn close(self) -> std::io::Result<()> {
        if let Some(file) = self.file {
            let mut writer = file.into_inner().map_err(|_| std::io::Error::other("run log poisoned"))?;
            writer.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn start_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 1, 9, 5, 7).unwrap()
    }

    #[test]
    fn test_file_naming() {
        assert_eq!(RunLog::file_stem(start_time()), "video_conversion_20240501_090507");
    }

    #[test]
    fn test_writes_timestamped_lines() {
        let temp_dir = TempDir::new().unwrap();
        let log = RunLog::open(temp_dir.path(), start_time()).unwrap();
        let path = log.path().unwrap().to_path_buf();
        assert_eq!(path, temp_dir.path().join("video_conversion_20240501_090507.log"));

        log.info("Found 3 video files in input directory");
        log.warn("Probe failed");
        log.error("Failed to convert b.mov");
        log.debug("FFmpeg command: ffmpeg -i b.mov");
        log.close().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with(" - INFO - Found 3 video files in input directory"));
        assert!(lines[1].contains(" - WARN - Probe failed"));
        assert!(lines[2].contains(" - ERROR - Failed to convert b.mov"));
        assert!(!content.contains("FFmpeg command"));
        // "YYYY-MM-DD HH:MM:SS.mmm - "
        assert_eq!(&lines[0][4..5], "-");
        assert_eq!(&lines[0][19..20], ".");
    }

    #[test]
    fn test_interactive_only_has_no_file() {
        let log = RunLog::interactive_only();
        assert!(log.path().is_none());
        log.info("nothing persisted");
        log.close().unwrap();
    }

    #[test]
    fn test_open_creates_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let log_dir = temp_dir.path().join("logs");
        let log = RunLog::open(&log_dir, start_time()).unwrap();
        log.info("hello");
        let path = log.path().unwrap().to_path_buf();
        log.close().unwrap();
        assert!(path.exists());
    }
}
