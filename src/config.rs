//! # Configuration Management Module
//!
//! Questo modulo gestisce la configurazione del run di conversione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con directory e percorsi dei tool
//! - Fornisce validazione dei parametri di input
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//! - Fornisce valori di default sensati per tutti i parametri
//!
//! ## Parametri di configurazione:
//! - `input_dir`: Directory dei video sorgente (default: "input")
//! - `output_dir`: Directory dei file convertiti (default: "output")
//! - `log_dir`: Directory dei log di sessione (default: "logs")
//! - `ffmpeg_path` / `ffprobe_path`: Override dei tool esterni (default: None = PATH)
//! - `show_progress`: Spinner durante la conversione (default: true)
//! - `json_output`: Eventi JSON su stdout (default: false)
//! - `verbose`: Logging DEBUG (default: false)
//!
//! I parametri di codifica (codec, CRF, preset) NON sono configurabili:
//! vivono come costanti in `video_processor`.
//!
//! ## Esempio:
//! ```rust,ignore
//! let config = Config {
//!     input_dir: "clips".into(),
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use crate::error::ConvertError;
use crate::platform::PlatformCommands;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for a conversion run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory containing source videos
    pub input_dir: PathBuf,
    /// Directory receiving converted MP4 files
    pub output_dir: PathBuf,
    /// Directory receiving one log file per run
    pub log_dir: PathBuf,
    /// Explicit ffmpeg binary (None = resolve from PATH)
    pub ffmpeg_path: Option<PathBuf>,
    /// Explicit ffprobe binary (None = resolve from PATH)
    pub ffprobe_path: Option<PathBuf>,
    /// Show a spinner while the engine runs
    pub show_progress: bool,
    /// Emit newline-delimited JSON events on stdout
    pub json_output: bool,
    /// Verbose logging
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
            log_dir: PathBuf::from("logs"),
            ffmpeg_path: None,
            ffprobe_path: None,
            show_progress: true,
            json_output: false,
            verbose: false,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), ConvertError> {
        for (name, dir) in [
            ("Input", &self.input_dir),
            ("Output", &self.output_dir),
            ("Log", &self.log_dir),
        ] {
            if dir.as_os_str().is_empty() {
                return Err(ConvertError::Validation(format!("{} directory must not be empty", name)));
            }
        }

        if same_directory(&self.input_dir, &self.output_dir) {
            return Err(ConvertError::Validation(format!(
                "Output directory must differ from input directory: {}",
                self.output_dir.display()
            )));
        }

        Ok(())
    }

    /// The ffmpeg program to spawn
    pub fn ffmpeg_program(&self) -> PathBuf {
        self.ffmpeg_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(PlatformCommands::instance().get_command("ffmpeg")))
    }

    /// The ffprobe program to spawn
    pub fn ffprobe_program(&self) -> PathBuf {
        self.ffprobe_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(PlatformCommands::instance().get_command("ffprobe")))
    }

    /// Load configuration from file
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

fn same_directory(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.input_dir, PathBuf::from("input"));
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert_eq!(config.log_dir, PathBuf::from("logs"));
        assert!(config.ffmpeg_path.is_none());
        assert!(config.show_progress);
        assert!(!config.json_output);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.output_dir = PathBuf::from("input");
        assert!(config.validate().is_err());

        config.output_dir = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_same_directory_through_different_spellings() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("videos");
        std::fs::create_dir(&dir).unwrap();

        let config = Config {
            input_dir: dir.clone(),
            output_dir: temp_dir.path().join("videos").join("..").join("videos"),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_tool_paths_win() {
        let config = Config {
            ffmpeg_path: Some(PathBuf::from("/opt/ffmpeg/bin/ffmpeg")),
            ..Default::default()
        };
        assert_eq!(config.ffmpeg_program(), PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
        assert!(config.ffprobe_program().to_string_lossy().starts_with("ffprobe"));
    }

    #[tokio::test]
    async fn test_config_save_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let original_config = Config {
            input_dir: PathBuf::from("incoming"),
            output_dir: PathBuf::from("converted"),
            ffprobe_path: Some(PathBuf::from("/usr/local/bin/ffprobe")),
            json_output: true,
            ..Default::default()
        };

        original_config.save_to_file(&config_path).await.unwrap();
        let loaded_config = Config::from_file(&config_path).await.unwrap();

        assert_eq!(loaded_config.input_dir, PathBuf::from("incoming"));
        assert_eq!(loaded_config.output_dir, PathBuf::from("converted"));
        assert_eq!(loaded_config.ffprobe_path, Some(PathBuf::from("/usr/local/bin/ffprobe")));
        assert!(loaded_config.json_output);
        assert_eq!(loaded_config.log_dir, PathBuf::from("logs"));
    }

    #[tokio::test]
    async fn test_missing_config_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::from_file(&temp_dir.path().join("absent.json")).await.unwrap();
        assert_eq!(config.input_dir, PathBuf::from("input"));
    }

    #[tokio::test]
    async fn test_partial_config_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        tokio::fs::write(&config_path, r#"{ "output_dir": "whatsapp" }"#).await.unwrap();

        let config = Config::from_file(&config_path).await.unwrap();
        assert_eq!(config.output_dir, PathBuf::from("whatsapp"));
        assert_eq!(config.input_dir, PathBuf::from("input"));
        assert!(config.show_progress);
    }
}
