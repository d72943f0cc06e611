//! dualtext - dual-path document text extraction.
//!
//! A document (PDF or image) is read two ways at once: the embedded text layer
//! is parsed directly, and every page is rasterized and run through OCR. The
//! two outcomes are reconciled by a deterministic policy so that clean digital
//! PDFs keep their exact text while scanned documents still yield something.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use dualtext::{DocumentSource, ExtractionConfig, Orchestrator, ProcessingMode};
//!
//! # async fn example() -> dualtext::Result<()> {
//! let orchestrator = Orchestrator::new(ExtractionConfig::default())?;
//! let result = orchestrator
//!     .process(DocumentSource::Path("certificate.pdf".into()), ProcessingMode::Concurrent)
//!     .await?;
//!
//! println!("{} ({})", result.text, result.strategy_used);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`source`]: resolves paths, bytes, base64 and URLs into a [`DocumentHandle`]
//! - [`extractors`]: the text-layer and rasterize+OCR strategies
//! - [`reconcile`]: the selection policy applied to both outcomes
//! - [`core::orchestrator`]: request lifecycle, scheduling and fault isolation

pub mod core;
pub mod error;
pub mod extractors;
pub mod ocr;
pub mod pdf;
pub mod reconcile;
pub mod source;
pub mod types;

pub use error::{DualtextError, Result};
pub use types::*;

pub use core::config::{ExtractionConfig, LoaderConfig, OcrConfig, PdfConfig};
pub use core::orchestrator::{Orchestrator, OrchestratorBuilder, process, process_sync};

pub use extractors::{ExtractionStrategy, OcrExtractor, TextLayerExtractor};
pub use ocr::{OcrEngine, TesseractCli};
pub use reconcile::{LongestTextPolicy, ReconciliationPolicy, select_longest};
pub use source::{DocumentHandle, DocumentRequest, DocumentSource, LoadedDocument};
