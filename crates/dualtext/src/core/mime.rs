//! MIME type detection for incoming documents.
//!
//! Byte inputs are sniffed by magic number with `infer`; paths are resolved by
//! extension with `mime_guess` and sniffed when the extension says nothing.
//! Inputs whose type cannot be determined are treated as PDF candidates and
//! left for the extractors to accept or reject.

use crate::{DualtextError, Result};
use std::path::Path;

pub const PDF_MIME_TYPE: &str = "application/pdf";
pub const SVG_MIME_TYPE: &str = "image/svg+xml";

/// Broad document family, which decides how each extractor treats the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Image,
}

/// Sniff the MIME type of an in-memory document.
pub fn detect_from_bytes(bytes: &[u8]) -> Option<String> {
    infer::get(bytes).map(|kind| kind.mime_type().to_string())
}

/// Determine the MIME type of a document on disk.
///
/// The file does not have to exist; a missing file is reported later by the
/// extractors so each strategy can classify the failure itself.
pub fn detect_from_path(path: &Path) -> Option<String> {
    if let Some(mime) = mime_guess::from_path(path).first() {
        return Some(mime.essence_str().to_string());
    }

    if path.is_file() {
        match infer::get_from_path(path) {
            Ok(Some(kind)) => return Some(kind.mime_type().to_string()),
            Ok(None) => {}
            Err(e) => tracing::debug!(path = %path.display(), error = %e, "could not sniff file type"),
        }
    }

    None
}

/// Map a MIME type onto the families the pipeline handles.
pub fn classify(mime_type: &str) -> Result<DocumentKind> {
    if mime_type == PDF_MIME_TYPE {
        return Ok(DocumentKind::Pdf);
    }
    if mime_type.starts_with("image/") && mime_type != SVG_MIME_TYPE {
        return Ok(DocumentKind::Image);
    }
    Err(DualtextError::UnsupportedFormat(mime_type.to_string()))
}

/// Resolve and validate a MIME type, defaulting to PDF when detection is inconclusive.
pub fn resolve(detected: Option<String>) -> Result<String> {
    let mime_type = detected.unwrap_or_else(|| PDF_MIME_TYPE.to_string());
    classify(&mime_type)?;
    Ok(mime_type)
}
