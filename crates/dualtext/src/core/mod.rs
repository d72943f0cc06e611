//! Core orchestration, configuration and MIME handling.

pub mod config;
pub mod mime;
pub mod orchestrator;

pub use config::{ExtractionConfig, LoaderConfig, OcrConfig, PdfConfig};
pub use orchestrator::{Orchestrator, OrchestratorBuilder, process, process_sync};
