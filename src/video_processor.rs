//! # Video Processing Module
//!
//! Questo modulo esegue la conversione vera e propria con FFmpeg.
//!
//! ## Responsabilità:
//! - Definisce il trait `TranscodeInvoker` (sostituibile con un fake nei test)
//! - Implementazione `FfmpegInvoker` con parametri FISSI, non configurabili
//! - Validazione del risultato: exit status zero + file di output non vuoto
//! - Verifica dipendenze esterne (ffmpeg obbligatorio, ffprobe opzionale)
//!
//! ## Parametri FFmpeg:
//! - Codec video: libx264 (H.264), CRF 23, preset medium
//! - Codec audio: AAC
//! - Nessun filtro video: dimensioni invariate
//! - `-movflags +faststart`: indice in testa per lo streaming
//!
//! ## Pipeline:
//! 1. FFmpeg scrive su un file temporaneo nascosto nella directory di output
//! 2. Se FFmpeg termina con successo e il file non è vuoto, il file viene
//!    rinominato sul path finale
//! 3. In caso di errore (o interruzione) il temporaneo viene rimosso: sul
//!    path finale non resta mai un output parziale
//!
//! Nessun timeout: un FFmpeg bloccato blocca il resto del batch.

use crate::error::ConvertError;
use crate::platform::PlatformCommands;
use crate::run_log::RunLog;
use crate::utils::display_command;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

pub const VIDEO_CODEC: &str = "libx264";
pub const AUDIO_CODEC: &str = "aac";
pub const CRF: &str = "23";
pub const PRESET: &str = "medium";

/// Lines of engine stderr kept in a failure diagnostic
const DIAGNOSTIC_TAIL_LINES: usize = 20;

/// Runs one conversion and validates its result
#[async_trait]
pub trait TranscodeInvoker: Send + Sync {
    async fn transcode(&self, input_path: &Path, output_path: &Path, log: &RunLog) -> Result<(), ConvertError>;
}

/// Full FFmpeg argument list for one conversion
pub fn ffmpeg_args(input_path: &Path, output_path: &Path) -> Vec<OsString> {
    crate::args![
        "-i", input_path,
        "-c:v", VIDEO_CODEC,
        "-crf", CRF,
        "-preset", PRESET,
        "-c:a", AUDIO_CODEC,
        "-movflags", "+faststart",
        "-avoid_negative_ts", "make_zero",
        "-y",
        output_path,
    ]
}

/// Size of a valid (existing, non-empty) output file
pub fn validate_output(input_path: &Path, output_path: &Path) -> Result<u64, ConvertError> {
    match std::fs::metadata(output_path) {
        Ok(metadata) if metadata.is_file() && metadata.len() > 0 => Ok(metadata.len()),
        Ok(_) => Err(ConvertError::transcode(
            input_path,
            format!("output {} is empty", output_path.display()),
        )),
        Err(e) => Err(ConvertError::transcode(
            input_path,
            format!("output {} missing: {}", output_path.display(), e),
        )),
    }
}

/// Handles video conversion with an external ffmpeg binary
pub struct FfmpegInvoker {
    program: PathBuf,
}

impl FfmpegInvoker {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Check if required tools are available.
    ///
    /// Returns whether ffprobe is usable; a missing ffmpeg is an error.
    pub async fn check_dependencies(ffmpeg: &Path, ffprobe: &Path) -> Result<bool, ConvertError> {
        let platform = PlatformCommands::instance();

        if !platform.is_command_available(ffmpeg).await {
            return Err(ConvertError::MissingDependency(format!(
                "{} is required for video conversion",
                ffmpeg.display()
            )));
        }

        Ok(platform.is_command_available(ffprobe).await)
    }
}

#[async_trait]
impl TranscodeInvoker for FfmpegInvoker {
    async fn transcode(&self, input_path: &Path, output_path: &Path, log: &RunLog) -> Result<(), ConvertError> {
        let output_dir = output_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let staged = tempfile::Builder::new()
            .prefix(".converting-")
            .suffix(".mp4")
            .tempfile_in(output_dir)
            .map_err(|e| {
                ConvertError::transcode(
                    input_path,
                    format!("cannot create temporary output in {}: {}", output_dir.display(), e),
                )
            })?;

        let args = ffmpeg_args(input_path, staged.path());
        log.debug(format!("FFmpeg command: {}", display_command(self.program.as_os_str(), &args)));

        let start_time = std::time::Instant::now();
        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                ConvertError::transcode(
                    input_path,
                    format!("failed to execute {}: {}", self.program.display(), e),
                )
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(ConvertError::transcode(
                input_path,
                format!("ffmpeg exited with {}\n{}", output.status, tail_lines(&stderr, DIAGNOSTIC_TAIL_LINES)),
            ));
        }

        let size = validate_output(input_path, staged.path())?;
        staged.persist(output_path).map_err(|e| {
            ConvertError::transcode(
                input_path,
                format!("cannot move output into {}: {}", output_path.display(), e.error),
            )
        })?;

        log.debug(format!(
            "FFmpeg finished in {:.1}s, wrote {} bytes",
            start_time.elapsed().as_secs_f64(),
            size
        ));
        Ok(())
    }
}

/// Last `count` non-empty lines of an engine diagnostic stream
fn tail_lines(text: &str, count: usize) -> String {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    lines[lines.len().saturating_sub(count)..].join("\n")
}
