//! Optical character recognition.
//!
//! The OCR path hands page images to an [`OcrEngine`]. The default engine is
//! the Tesseract command-line binary ([`TesseractCli`]); tests and embedders
//! can supply their own implementation.

pub mod error;
pub mod tesseract;
pub mod validation;

use async_trait::async_trait;
use std::path::Path;

pub use error::OcrError;
pub use tesseract::TesseractCli;
pub use validation::validate_language_code;

/// A recognizer that turns one page image on disk into text.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    fn name(&self) -> &str;

    async fn recognize(&self, image_path: &Path) -> Result<String, OcrError>;
}
