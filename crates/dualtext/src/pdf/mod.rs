//! PDF access for both extraction paths.
//!
//! [`text`] reads the embedded text layer with `lopdf`; [`rendering`] turns
//! pages into bitmaps with Pdfium for the OCR path.

mod bindings;
pub mod error;
pub mod rendering;
pub mod text;

pub use error::PdfError;
pub use rendering::{PageRenderOptions, PdfInput, PdfRenderer};
pub use text::{extract_page_texts_from_bytes, extract_page_texts_from_path};
