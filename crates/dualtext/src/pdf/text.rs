//! Text-layer extraction built on `lopdf`.
//!
//! Pages are visited in document order. Each page contributes the text drawn by
//! its content stream operators; pages that carry no text are skipped, so a
//! purely scanned document yields an empty [`PageText`].

use super::error::{PdfError, Result};
use crate::types::PageText;
use lopdf::Document;
use std::path::Path;

/// Read the text layer of the PDF at `path`.
pub fn extract_page_texts_from_path(path: &Path) -> Result<PageText> {
    if !path.exists() {
        return Err(PdfError::NotFound(path.to_path_buf()));
    }

    let document = Document::load(path).map_err(|err| match err {
        lopdf::Error::IO(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
            PdfError::NotFound(path.to_path_buf())
        }
        other => PdfError::from(other),
    })?;

    extract_page_texts(&document)
}

/// Read the text layer of an in-memory PDF.
pub fn extract_page_texts_from_bytes(bytes: &[u8]) -> Result<PageText> {
    let document = Document::load_mem(bytes)?;
    extract_page_texts(&document)
}

fn extract_page_texts(document: &Document) -> Result<PageText> {
    let pages = document.get_pages();
    let mut texts = Vec::with_capacity(pages.len());

    for page_number in pages.keys() {
        let text = document
            .extract_text(&[*page_number])
            .map_err(|e| PdfError::TextExtractionFailed {
                page: *page_number,
                message: e.to_string(),
            })?;

        // lopdf emits a line break per text object even when nothing was drawn
        if text.chars().all(|c| c == '\n' || c == '\r') {
            tracing::debug!(page = page_number, "page has no text layer, skipping");
            continue;
        }

        texts.push(text);
    }

    tracing::debug!(
        total_pages = pages.len(),
        text_pages = texts.len(),
        "text layer extracted"
    );

    Ok(PageText::new(texts))
}
