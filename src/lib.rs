//! # Video Normalizer Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per i test
//!
//! ## Architettura dei moduli:
//! - `config`: Gestione configurazione e validazione parametri
//! - `error`: Tipi di errore custom (discovery, probe, transcode)
//! - `file_manager`: Discovery dei video e regole sui nomi di output
//! - `media_probe`: Ispezione metadati con ffprobe (best-effort)
//! - `video_processor`: Conversione con FFmpeg (H.264/AAC, faststart)
//! - `converter`: Orchestratore sequenziale del batch
//! - `run_log`: Log di sessione su file + console
//! - `progress`: Spinner e statistiche del run
//! - `json_output`: Eventi JSON per uso programmatico
//!
//! ## Utilizzo:
//! ```rust,ignore
//! use video_normalizer::{Config, ConversionRunner};
//!
//! let runner = ConversionRunner::from_config(Config::default());
//! let summary = runner.run().await?;
//! std::process::exit(if summary.is_success() { 0 } else { 1 });
//! ```

pub mod utils;

pub mod config;
pub mod converter;
pub mod error;
pub mod file_manager;
pub mod json_output;
pub mod media_probe;
pub mod platform;
pub mod progress;
pub mod run_log;
pub mod video_processor;

pub use config::Config;
pub use converter::{ConversionJob, ConversionRunner, JobStatus, RunSummary};
pub use error::ConvertError;
pub use file_manager::{FileManager, VideoFile};
pub use media_probe::{FfprobeProbe, MediaProbe, VideoInfo};
pub use progress::SessionStats;
pub use run_log::RunLog;
pub use video_processor::{FfmpegInvoker, TranscodeInvoker};
