//! # File Management Module
//!
//! Questo modulo gestisce la discovery dei video e le regole sui nomi dei file.
//!
//! ## Responsabilità:
//! - Discovery NON ricorsiva dei video nella directory di input
//! - Filtro per estensione (case-insensitive) su una allow-list fissa
//! - Ordine deterministico (lessicografico per nome file)
//! - Derivazione del path di output (`<stem>.mp4` nella directory di output)
//! - Controllo di esistenza dell'output (skip idempotente)
//! - Formattazione human-readable delle dimensioni
//!
//! ## Formati supportati:
//! mp4, avi, mov, mkv, wmv, flv, webm, m4v, 3gp, ogv, ts, mts, m2ts
//!
//! ## Esempio:
//! ```rust,ignore
//! let files = FileManager::discover(Path::new("input"))?;
//! for file in files {
//!     let output = FileManager::output_path(&file.path, Path::new("output"));
//!     if FileManager::output_exists(&output) {
//!         // skip
//!     }
//! }
//! ```

use crate::error::ConvertError;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Input extensions accepted by discovery, lowercase
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "mp4", "avi", "mov", "mkv", "wmv", "flv", "webm", "m4v", "3gp", "ogv", "ts", "mts", "m2ts",
];

/// Extension of every converted file
pub const TARGET_EXTENSION: &str = "mp4";

/// A discovered input video
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoFile {
    /// Absolute path of the input
    pub path: PathBuf,
    /// Lowercased extension
    pub extension: String,
    pub size_bytes: u64,
}

impl VideoFile {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned()
    }
}

/// Manages file discovery and naming rules
pub struct FileManager;

impl FileManager {
    /// List the supported videos directly inside `input_dir`, sorted by file name.
    ///
    /// Fails only when the directory itself cannot be read. Unreadable
    /// entries inside it are skipped.
    pub fn discover(input_dir: &Path) -> Result<Vec<VideoFile>, ConvertError> {
        let discovery_error = |source: std::io::Error| ConvertError::Discovery {
            path: input_dir.to_path_buf(),
            source,
        };

        let metadata = std::fs::metadata(input_dir).map_err(discovery_error)?;
        if !metadata.is_dir() {
            return Err(discovery_error(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "not a directory",
            )));
        }

        let mut files = Vec::new();

        for entry in WalkDir::new(input_dir)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => return Err(discovery_error(e.into())),
                Err(e) => {
                    debug!("Ignoring unreadable entry in {}: {}", input_dir.display(), e);
                    continue;
                }
            };

            if entry.depth() == 0 || !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let Some(extension) = Self::supported_extension(path) else {
                continue;
            };

            let size_bytes = match entry.metadata() {
                Ok(metadata) => metadata.len(),
                Err(e) => {
                    debug!("Ignoring {} (no metadata): {}", path.display(), e);
                    continue;
                }
            };

            files.push(VideoFile {
                path: absolute(path),
                extension,
                size_bytes,
            });
        }

        Ok(files)
    }

    /// Lowercased extension of `path` if it is on the allow-list
    pub fn supported_extension(path: &Path) -> Option<String> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        SUPPORTED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
    }

    /// Check if a file format is supported
    pub fn is_supported_format(path: &Path) -> bool {
        Self::supported_extension(path).is_some()
    }

    /// `output_dir/<input stem>.mp4`
    pub fn output_path(input_path: &Path, output_dir: &Path) -> PathBuf {
        let mut file_name = input_path.file_stem().unwrap_or_default().to_os_string();
        file_name.push(".");
        file_name.push(TARGET_EXTENSION);
        output_dir.join(file_name)
    }

    /// Existence is the whole skip test: content, size and mtime are not compared.
    pub fn output_exists(output_path: &Path) -> bool {
        output_path.exists()
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.1} {}", size, UNITS[unit_index])
        }
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
