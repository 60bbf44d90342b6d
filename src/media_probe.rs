//! # Media Probe Module
//!
//! Ispezione best-effort dei metadati video con ffprobe.
//!
//! ## Responsabilità:
//! - Definisce il trait `MediaProbe` (sostituibile nei test)
//! - Implementazione `FfprobeProbe` basata su `ffprobe -print_format json`
//! - Estrae risoluzione, codec, durata e dimensione del primo stream video
//!
//! I dati raccolti servono solo per log e statistiche: un probe fallito
//! non cambia mai il flusso della conversione.

use crate::error::ConvertError;
use crate::file_manager::FileManager;
use crate::run_log::RunLog;
use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Best-effort metadata inspection
#[async_trait]
pub trait MediaProbe: Send + Sync {
    async fn probe(&self, input_path: &Path, log: &RunLog) -> Result<VideoInfo, ConvertError>;
}

/// Video file information
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    pub codec: String,
    pub duration_seconds: f64,
    pub size_bytes: u64,
}

impl VideoInfo {
    /// `1920x1080 | h264 | 12.5s | 3.2 MB`
    pub fn summary_line(&self) -> String {
        format!(
            "{}x{} | {} | {:.1}s | {}",
            self.width,
            self.height,
            self.codec,
            self.duration_seconds,
            FileManager::format_size(self.size_bytes)
        )
    }
}

/// Probes with an external ffprobe binary
pub struct FfprobeProbe {
    program: PathBuf,
}

impl FfprobeProbe {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl MediaProbe for FfprobeProbe {
    async fn probe(&self, input_path: &Path, log: &RunLog) -> Result<VideoInfo, ConvertError> {
        log.debug(format!("Probing {}", input_path.display()));

        let output = Command::new(&self.program)
            .args(["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams"])
            .arg(input_path)
            .stdin(std::process::Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                ConvertError::probe(
                    input_path,
                    format!("failed to execute {}: {}", self.program.display(), e),
                )
            })?;

        if !output.status.success() {
            return Err(ConvertError::probe(
                input_path,
                format!(
                    "ffprobe exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }

        parse_ffprobe_json(input_path, &String::from_utf8_lossy(&output.stdout))
    }
}

/// Extract a `VideoInfo` from ffprobe's JSON report
pub fn parse_ffprobe_json(input_path: &Path, json: &str) -> Result<VideoInfo, ConvertError> {
    let info: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| ConvertError::probe(input_path, format!("invalid ffprobe output: {}", e)))?;

    // ffprobe reports numeric format fields as strings
    let format = &info["format"];
    let duration_seconds = format["duration"]
        .as_str()
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);
    let size_bytes = format["size"]
        .as_str()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0);

    let video_stream = info["streams"]
        .as_array()
        .and_then(|streams| streams.iter().find(|s| s["codec_type"] == "video"))
        .ok_or_else(|| ConvertError::probe(input_path, "no video stream found"))?;

    Ok(VideoInfo {
        width: video_stream["width"].as_u64().unwrap_or(0) as u32,
        height: video_stream["height"].as_u64().unwrap_or(0) as u32,
        codec: video_stream["codec_name"]
            .as_str()
            .unwrap_or("unknown")
            .to_string(),
        duration_seconds,
        size_bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "streams": [
            { "index": 0, "codec_type": "audio", "codec_name": "aac" },
            { "index": 1, "codec_type": "video", "codec_name": "hevc", "width": 1920, "height": 1080 }
        ],
        "format": { "duration": "12.480000", "size": "3355443", "format_name": "mov,mp4,m4a,3gp,3g2,mj2" }
    }"#;

    #[test]
    fn test_parse_first_video_stream() {
        let info = parse_ffprobe_json(Path::new("b.mov"), SAMPLE).unwrap();
        assert_eq!(info.width, 1920);
        assert_eq!(info.height, 1080);
        assert_eq!(info.codec, "hevc");
        assert!((info.duration_seconds - 12.48).abs() < 1e-9);
        assert_eq!(info.size_bytes, 3_355_443);
    }

    #[test]
    fn test_summary_line() {
        let info = parse_ffprobe_json(Path::new("b.mov"), SAMPLE).unwrap();
        assert_eq!(info.summary_line(), "1920x1080 | hevc | 12.5s | 3.2 MB");
    }

    #[test]
    fn test_missing_format_fields_default_to_zero() {
        let json = r#"{ "streams": [ { "codec_type": "video", "codec_name": "mpeg4" } ] }"#;
        let info = parse_ffprobe_json(Path::new("old.avi"), json).unwrap();
        assert_eq!(info.codec, "mpeg4");
        assert_eq!(info.width, 0);
        assert_eq!(info.duration_seconds, 0.0);
        assert_eq!(info.size_bytes, 0);
    }

    #[test]
    fn test_audio_only_is_a_probe_error() {
        let json = r#"{ "streams": [ { "codec_type": "audio", "codec_name": "mp3" } ], "format": {} }"#;
        let err = parse_ffprobe_json(Path::new("song.mp4"), json).unwrap_err();
        assert!(matches!(err, ConvertError::Probe { .. }));
    }

    #[test]
    fn test_garbage_is_a_probe_error() {
        let err = parse_ffprobe_json(Path::new("x.mkv"), "not json").unwrap_err();
        assert!(err.to_string().contains("invalid ffprobe output"));
    }

    #[tokio::test]
    async fn test_missing_ffprobe_binary_is_a_probe_error() {
        let probe = FfprobeProbe::new("/nonexistent/bin/ffprobe");
        let log = RunLog::interactive_only();
        let err = probe.probe(Path::new("a.mp4"), &log).await.unwrap_err();
        assert!(matches!(err, ConvertError::Probe { .. }));
        assert!(!err.is_fatal());
    }
}
