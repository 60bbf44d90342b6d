//! # Video Normalizer - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del logging interattivo con `tracing`
//! - Creazione delle directory `input/`, `output/`, `logs/`
//! - Verifica della presenza di ffmpeg/ffprobe
//! - Traduzione del verdetto del run in exit code (0 = successo)
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (eventualmente sopra un file di configurazione)
//! 2. Configura il logging (INFO o DEBUG a seconda del flag verbose)
//! 3. Crea le directory mancanti e controlla i tool esterni
//! 4. Avvia il `ConversionRunner` (interrompibile con Ctrl-C)
//!
//! ## Esempio di utilizzo:
//! ```bash
//! video-normalizer --input ~/Videos/raw --output ~/Videos/whatsapp --verbose
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use video_normalizer::{platform::PlatformCommands, Config, ConversionRunner, FfmpegInvoker};

#[derive(Parser)]
#[command(name = "video-normalizer")]
#[command(about = "Convert every video in a directory to WhatsApp-friendly H.264/AAC MP4")]
struct Args {
    /// Directory containing source videos [default: input]
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Directory for converted files [default: output]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory for per-run log files [default: logs]
    #[arg(short, long)]
    logs: Option<PathBuf>,

    /// JSON configuration file (command line values take precedence)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the ffmpeg binary
    #[arg(long)]
    ffmpeg: Option<PathBuf>,

    /// Path to the ffprobe binary
    #[arg(long)]
    ffprobe: Option<PathBuf>,

    /// Emit newline-delimited JSON events on stdout
    #[arg(long)]
    json: bool,

    /// Disable the progress spinner
    #[arg(long)]
    no_progress: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    async fn into_config(self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path).await?,
            None => Config::default(),
        };

        if let Some(input) = self.input {
            config.input_dir = input;
        }
        if let Some(output) = self.output {
            config.output_dir = output;
        }
        if let Some(logs) = self.logs {
            config.log_dir = logs;
        }
        if self.ffmpeg.is_some() {
            config.ffmpeg_path = self.ffmpeg;
        }
        if self.ffprobe.is_some() {
            config.ffprobe_path = self.ffprobe;
        }
        config.json_output |= self.json;
        config.verbose |= self.verbose;
        if self.no_progress {
            config.show_progress = false;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let config = Args::parse().into_config().await?;

    // Initialize logging; stdout stays free for --json
    let default_level = if config.verbose { "debug" } else { "info" };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    debug!("Running on {}", PlatformCommands::system_info());

    for dir in [&config.input_dir, &config.output_dir, &config.log_dir] {
        if !dir.exists() {
            tokio::fs::create_dir_all(dir).await?;
            info!("Created directory: {}", dir.display());
        }
    }

    let ffprobe_available = FfmpegInvoker::check_dependencies(&config.ffmpeg_program(), &config.ffprobe_program()).await?;
    if !ffprobe_available {
        warn!(
            "{} not found: video details will not be logged",
            config.ffprobe_program().display()
        );
    }

    let runner = ConversionRunner::from_config(config);

    tokio::select! {
        result = runner.run() => {
            let summary = result?;
            Ok(if summary.is_success() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\n🛑 Conversion interrupted by user");
            Ok(ExitCode::FAILURE)
        }
    }
}
