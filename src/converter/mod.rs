//! # Converter Module
//!
//! Modulo che separa le responsabilità dell'orchestratore in sottomoduli:
//! - `runner`: Orchestratore del batch (loop sequenziale, isolamento errori)
//! - `job`: Macchina a stati del singolo file

pub mod job;
pub mod runner;

pub use job::{ConversionJob, JobStatus};
pub use runner::{ConversionRunner, RunSummary};
