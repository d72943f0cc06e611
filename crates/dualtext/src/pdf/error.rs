use crate::error::DualtextError;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub enum PdfError {
    NotFound(PathBuf),
    InvalidPdf(String),
    PasswordRequired,
    TextExtractionFailed { page: u32, message: String },
    RenderingFailed(String),
    PdfiumUnavailable(String),
    IOError(String),
}

impl fmt::Display for PdfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PdfError::NotFound(path) => write!(f, "PDF file not found: {}", path.display()),
            PdfError::InvalidPdf(msg) => write!(f, "Invalid PDF: {}", msg),
            PdfError::PasswordRequired => write!(f, "PDF is password-protected"),
            PdfError::TextExtractionFailed { page, message } => {
                write!(f, "Text extraction failed on page {}: {}", page, message)
            }
            PdfError::RenderingFailed(msg) => write!(f, "Page rendering failed: {}", msg),
            PdfError::PdfiumUnavailable(msg) => write!(f, "Pdfium library unavailable: {}", msg),
            PdfError::IOError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for PdfError {}

impl From<lopdf::Error> for PdfError {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(io_err) => PdfError::IOError(io_err.to_string()),
            _ => PdfError::InvalidPdf(err.to_string()),
        }
    }
}

impl PdfError {
    /// Classify a failure raised while reading the text layer.
    pub fn into_text_layer_error(self) -> DualtextError {
        match self {
            PdfError::NotFound(path) => DualtextError::not_found(path),
            PdfError::TextExtractionFailed { .. } => DualtextError::extraction_with_source("Error in PDF extraction", self),
            _ => DualtextError::read_with_source("Error reading PDF file", self),
        }
    }

    /// Classify a failure raised while turning pages into images.
    pub fn into_rasterization_error(self) -> DualtextError {
        DualtextError::rasterization_with_source("Error converting PDF pages to images", self)
    }
}

pub type Result<T> = std::result::Result<T, PdfError>;
