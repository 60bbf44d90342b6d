//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom della conversione.
//!
//! ## Responsabilità:
//! - Definisce `ConvertError` enum per categorizzare gli errori della pipeline
//! - Distingue l'unico errore fatale (`Discovery`) dagli errori per-file
//! - Integra con `thiserror` per automatic error conversion
//!
//! ## Categorie di errori:
//! - `Discovery`: Directory di input illeggibile (interrompe il run)
//! - `Probe`: ffprobe fallito (solo warning, la conversione prosegue)
//! - `Transcode`: FFmpeg fallito o output vuoto (job `FAILED`)
//! - `OutputCollision`: Due input con lo stesso nome base
//! - `Io`: Errori di I/O generici
//! - `MissingDependency`: Tool esterno mancante (ffmpeg)
//! - `Validation`: Errori di validazione configurazione
//!
//! ## Esempio:
//! ```rust,ignore
//! if !tool_exists {
//!     return Err(ConvertError::MissingDependency("ffmpeg".to_string()));
//! }
//! ```

use std::path::PathBuf;

/// Custom error types for batch video conversion
#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    #[error("Cannot read input directory {}: {source}", path.display())]
    Discovery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Probe failed for {}: {reason}", path.display())]
    Probe { path: PathBuf, reason: String },

    #[error("Transcode failed for {}: {diagnostic}", path.display())]
    Transcode { path: PathBuf, diagnostic: String },

    #[error("Output {} is already claimed by {}", output.display(), claimed_by.display())]
    OutputCollision { output: PathBuf, claimed_by: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Dependency missing: {0}")]
    MissingDependency(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

impl ConvertError {
    pub fn probe(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Probe {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn transcode(path: impl Into<PathBuf>, diagnostic: impl Into<String>) -> Self {
        Self::Transcode {
            path: path.into(),
            diagnostic: diagnostic.into(),
        }
    }

    /// True only for the error that aborts a whole run
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Discovery { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_discovery_is_fatal() {
        let discovery = ConvertError::Discovery {
            path: PathBuf::from("input"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(discovery.is_fatal());
        assert!(!ConvertError::probe("a.mp4", "bad json").is_fatal());
        assert!(!ConvertError::transcode("a.mp4", "exit 1").is_fatal());
    }

    #[test]
    fn test_transcode_message_carries_diagnostic() {
        let err = ConvertError::transcode("clips/b.mov", "Invalid data found when processing input");
        let message = err.to_string();
        assert!(message.contains("b.mov"));
        assert!(message.contains("Invalid data found"));
    }
}
