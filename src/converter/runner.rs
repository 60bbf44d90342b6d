//! # Conversion Runner
//!
//! Orchestratore principale: compone discovery, skip, probe e transcode in
//! un loop sequenziale con isolamento degli errori per file.
//!
//! Solo un errore di discovery interrompe il run. Qualsiasi altro errore
//! (anche un panic) viene catturato al confine del job, registrato come
//! `Failed` e il loop prosegue con il file successivo.

use crate::{
    config::Config,
    converter::job::ConversionJob,
    error::ConvertError,
    file_manager::FileManager,
    json_output::JsonMessage,
    media_probe::{FfprobeProbe, MediaProbe},
    progress::{ProgressManager, SessionStats},
    run_log::RunLog,
    video_processor::{validate_output, FfmpegInvoker, TranscodeInvoker},
};
use chrono::{DateTime, Local};
use futures::FutureExt;
use serde::Serialize;
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const RULE_WIDTH: usize = 60;

/// Result of a run that got past discovery
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub stats: SessionStats,
    pub jobs: Vec<ConversionJob>,
    pub log_path: Option<PathBuf>,
}

impl RunSummary {
    /// Overall verdict: true iff no job failed
    pub fn is_success(&self) -> bool {
        self.stats.is_success()
    }
}

/// Esito non terminale di `process_job`, tradotto poi nello stato del job
enum JobOutcome {
    Skipped,
    Converted { output_bytes: u64 },
}

/// Orchestratore sequenziale del batch
pub struct ConversionRunner {
    config: Config,
    prober: Box<dyn MediaProbe>,
    invoker: Box<dyn TranscodeInvoker>,
}

impl ConversionRunner {
    pub fn new(config: Config, prober: Box<dyn MediaProbe>, invoker: Box<dyn TranscodeInvoker>) -> Self {
        Self {
            config,
            prober,
            invoker,
        }
    }

    /// Runner wired to the real ffprobe/ffmpeg binaries
    pub fn from_config(config: Config) -> Self {
        let prober = Box::new(FfprobeProbe::new(config.ffprobe_program()));
        let invoker = Box::new(FfmpegInvoker::new(config.ffmpeg_program()));
        Self::new(config, prober, invoker)
    }

    /// Esegue un run completo.
    ///
    /// Il log di sessione viene aperto qui (nome basato sull'ora di avvio)
    /// e chiuso prima di ritornare, anche in caso di errore fatale.
    pub async fn run(&self) -> Result<RunSummary, ConvertError> {
        let started_at = Local::now();
        let log = self.open_log(started_at);
        let log_path = log.path().map(Path::to_path_buf);

        let result = self.run_with_log(&log, started_at).await;
        if let Err(e) = &result {
            log.error(format!("Fatal error: {}", e));
        }

        if let Err(e) = log.close() {
            warn!("Failed to close run log: {}", e);
        }

        result.map(|(stats, jobs)| RunSummary {
            stats,
            jobs,
            log_path,
        })
    }

    fn open_log(&self, started_at: DateTime<Local>) -> RunLog {
        match RunLog::open(&self.config.log_dir, started_at) {
            Ok(log) => log,
            Err(e) => {
                warn!(
                    "Cannot open run log in {}: {} (logging to console only)",
                    self.config.log_dir.display(),
                    e
                );
                RunLog::interactive_only()
            }
        }
    }

    async fn run_with_log(
        &self,
        log: &RunLog,
        started_at: DateTime<Local>,
    ) -> Result<(SessionStats, Vec<ConversionJob>), ConvertError> {
        self.log_header(log);

        let files = FileManager::discover(&self.config.input_dir)?;
        let total = files.len();
        log.info(format!("Found {} video files in input directory", total));

        let mut stats = SessionStats::new(started_at);
        stats.discovered = total;

        if self.config.json_output {
            JsonMessage::start(self.config.input_dir.clone(), self.config.output_dir.clone(), total).emit();
        }

        let mut jobs: Vec<ConversionJob> = files
            .into_iter()
            .map(|file| {
                let output_path = FileManager::output_path(&file.path, &self.config.output_dir);
                ConversionJob::new(file, output_path)
            })
            .collect();

        if jobs.is_empty() {
            log.warn("No video files found in input directory");
        } else {
            log.info(format!("Starting conversion of {} files...", total));
            log.info("-".repeat(RULE_WIDTH));
        }

        // output path -> primo input che lo ha reclamato
        let mut claims: HashMap<PathBuf, PathBuf> = HashMap::new();

        for (i, job) in jobs.iter_mut().enumerate() {
            let index = i + 1;
            let name = job.input.file_name();
            log.info(format!("[{}/{}] Processing: {}", index, total, name));
            job.start();

            let claimant = claims
                .entry(job.output_path.clone())
                .or_insert_with(|| job.input.path.clone())
                .clone();

            let result = if claimant != job.input.path {
                Err(ConvertError::OutputCollision {
                    output: job.output_path.clone(),
                    claimed_by: claimant,
                }
                .to_string())
            } else {
                match AssertUnwindSafe(self.process_job(job, log)).catch_unwind().await {
                    Ok(result) => result.map_err(|e| e.to_string()),
                    Err(payload) => Err(format!("unexpected panic: {}", panic_message(payload.as_ref()))),
                }
            };

            match result {
                Ok(JobOutcome::Skipped) => {
                    job.skip();
                    log.info(format!("⏭  Skipping {} (already exists in output)", name));
                }
                Ok(JobOutcome::Converted { output_bytes }) => {
                    job.succeed(output_bytes);
                    log.info(format!(
                        "✓ Successfully converted: {} ({} -> {})",
                        name,
                        FileManager::format_size(job.input.size_bytes),
                        FileManager::format_size(output_bytes)
                    ));
                }
                Err(detail) => {
                    log.error(format!("✗ Failed to convert {}: {}", name, detail));
                    job.fail(detail);
                }
            }

            stats.record(job);

            if self.config.json_output {
                JsonMessage::file_complete(index, total, job).emit();
            }
        }

        stats.finish(Local::now());
        debug_assert!(stats.is_consistent());
        self.log_summary(log, &stats);

        if self.config.json_output {
            JsonMessage::complete(&stats).emit();
        }

        Ok((stats, jobs))
    }

    /// Skip check, probe best-effort, transcode e validazione per un job
    async fn process_job(&self, job: &mut ConversionJob, log: &RunLog) -> Result<JobOutcome, ConvertError> {
        if FileManager::output_exists(&job.output_path) {
            debug!("Output exists: {}", job.output_path.display());
            return Ok(JobOutcome::Skipped);
        }

        match self.prober.probe(&job.input.path, log).await {
            Ok(info) => {
                log.info(format!("  📹 {}", info.summary_line()));
                job.video_info = Some(info);
            }
            Err(e) => log.warn(format!("Could not read video info: {}", e)),
        }

        let name = job.input.file_name();
        log.info(format!(
            "Converting: {} -> {}",
            name,
            job.output_path.file_name().unwrap_or_default().to_string_lossy()
        ));

        let spinner = ProgressManager::spinner(&format!("Converting {}", name), self.show_progress());
        let transcoded = self.invoker.transcode(&job.input.path, &job.output_path, log).await;
        spinner.finish();
        transcoded?;

        match validate_output(&job.input.path, &job.output_path) {
            Ok(output_bytes) => Ok(JobOutcome::Converted { output_bytes }),
            Err(e) => {
                // the path was free at the skip check, so whatever is there is ours
                if job.output_path.exists() {
                    if let Err(remove_err) = std::fs::remove_file(&job.output_path) {
                        log.warn(format!(
                            "Could not remove invalid output {}: {}",
                            job.output_path.display(),
                            remove_err
                        ));
                    }
                }
                Err(e)
            }
        }
    }

    fn show_progress(&self) -> bool {
        self.config.show_progress && !self.config.json_output
    }

    fn log_header(&self, log: &RunLog) {
        log.info("=".repeat(RULE_WIDTH));
        log.info("Video Converter Started");
        log.info("=".repeat(RULE_WIDTH));
        log.info(format!("Input directory: {}", display_absolute(&self.config.input_dir)));
        log.info(format!("Output directory: {}", display_absolute(&self.config.output_dir)));
        log.info(format!("Log directory: {}", display_absolute(&self.config.log_dir)));
    }

    fn log_summary(&self, log: &RunLog, stats: &SessionStats) {
        log.info("=".repeat(RULE_WIDTH));
        log.info("CONVERSION COMPLETED");
        log.info("=".repeat(RULE_WIDTH));
        for line in stats.summary_lines() {
            log.info(line);
        }
        if stats.is_success() {
            log.info("Result: SUCCESS");
        } else {
            log.error(format!("Result: FAILED ({} conversion(s) failed)", stats.failed));
        }
        log.info("=".repeat(RULE_WIDTH));
    }
}

fn display_absolute(path: &Path) -> String {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
