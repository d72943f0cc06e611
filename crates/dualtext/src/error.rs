//! Error types for dualtext.
//!
//! Every fallible operation in the crate returns [`DualtextError`]. Variants map
//! onto the failure classes of the extraction pipeline:
//!
//! - `Validation` - malformed or ambiguous input (bad base64, several inputs at once)
//! - `NotFound` - the referenced document does not exist
//! - `Read` - the document exists but cannot be opened or parsed as a paged document
//! - `Extraction` - text-layer parsing failed after the document was opened
//! - `Rasterization` - a page could not be turned into an image
//! - `Ocr` - the recognition engine failed
//! - `Fetch` - a remote document could not be downloaded
//! - `Combined` - both extraction strategies failed for the same request
//!
//! Causes are preserved with `#[source]` so callers can walk the chain.
//!
//! # Example
//!
//! ```rust
//! use dualtext::{DualtextError, Result};
//!
//! fn require_input(input: &str) -> Result<&str> {
//!     if input.is_empty() {
//!         return Err(DualtextError::validation("no document supplied"));
//!     }
//!     Ok(input)
//! }
//!
//! assert!(require_input("").is_err());
//! ```
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `DualtextError`.
pub type Result<T> = std::result::Result<T, DualtextError>;

/// Main error type for all dualtext operations.
#[derive(Debug, Error)]
pub enum DualtextError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Document not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Read error: {message}")]
    Read {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Extraction error: {message}")]
    Extraction {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Rasterization error: {message}")]
    Rasterization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("OCR error: {message}")]
    Ocr {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Failed to fetch {url}: {message}")]
    Fetch {
        url: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Both extraction strategies failed (text-layer: {text_layer}; ocr: {ocr})")]
    Combined {
        text_layer: Box<DualtextError>,
        ocr: Box<DualtextError>,
    },

    #[error("Extraction timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

macro_rules! error_constructor {
    ($name:ident, $variant:ident) => {
        pastey::paste! {
            #[doc = "Create a " $variant " error"]
            pub fn $name<S: Into<String>>(message: S) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: None,
                }
            }

            #[doc = "Create a " $variant " error with source"]
            pub fn [<$name _with_source>]<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
                message: S,
                source: E,
            ) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: Some(Box::new(source)),
                }
            }
        }
    };
}

impl DualtextError {
    error_constructor!(validation, Validation);
    error_constructor!(read, Read);
    error_constructor!(extraction, Extraction);
    error_constructor!(rasterization, Rasterization);
    error_constructor!(ocr, Ocr);

    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub fn fetch<U: Into<String>, S: Into<String>>(url: U, message: S) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.into(),
            source: None,
        }
    }

    pub fn fetch_with_source<U, S, E>(url: U, message: S, source: E) -> Self
    where
        U: Into<String>,
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Fetch {
            url: url.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn combined(text_layer: DualtextError, ocr: DualtextError) -> Self {
        Self::Combined {
            text_layer: Box::new(text_layer),
            ocr: Box::new(ocr),
        }
    }

    /// Stable machine-readable name of the failure class.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Validation { .. } => "validation",
            Self::NotFound { .. } => "not_found",
            Self::Read { .. } => "read",
            Self::Extraction { .. } => "extraction",
            Self::Rasterization { .. } => "rasterization",
            Self::Ocr { .. } => "ocr",
            Self::Fetch { .. } => "fetch",
            Self::Combined { .. } => "combined",
            Self::Timeout { .. } => "timeout",
            Self::UnsupportedFormat(_) => "unsupported_format",
        }
    }
}
