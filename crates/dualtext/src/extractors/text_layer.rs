use super::ExtractionStrategy;
use crate::core::mime::DocumentKind;
use crate::pdf::{PdfError, extract_page_texts_from_bytes, extract_page_texts_from_path};
use crate::source::{DocumentData, DocumentHandle};
use crate::types::{PageText, StrategyKind};
use crate::{DualtextError, Result};
use async_trait::async_trait;

/// Reads the embedded text layer of a PDF.
///
/// Images have no text layer and produce empty text once the file is known to exist.
#[derive(Debug, Clone, Default)]
pub struct TextLayerExtractor;

impl TextLayerExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ExtractionStrategy for TextLayerExtractor {
    fn kind(&self) -> StrategyKind {
        StrategyKind::TextLayer
    }

    fn name(&self) -> &str {
        "lopdf-text-layer"
    }

    async fn extract_pages(&self, document: &DocumentHandle) -> Result<PageText> {
        if let Some(path) = document.path()
            && !path.exists()
        {
            return Err(DualtextError::not_found(path));
        }

        if document.kind() == DocumentKind::Image {
            tracing::debug!(mime_type = document.mime_type(), "image input has no text layer");
            return Ok(PageText::default());
        }

        let data = document.data().clone();
        let result = tokio::task::spawn_blocking(move || match data {
            DocumentData::File(path) => extract_page_texts_from_path(&path),
            DocumentData::Memory(bytes) => extract_page_texts_from_bytes(&bytes),
        })
        .await
        .map_err(|e| DualtextError::extraction(format!("Text-layer task failed: {}", e)))?;

        result.map_err(PdfError::into_text_layer_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mime::PDF_MIME_TYPE;

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let handle = DocumentHandle::from_path("/no/such/dir/missing.pdf", PDF_MIME_TYPE);
        let err = TextLayerExtractor::new().extract(&handle).await.unwrap_err();
        assert!(matches!(err, DualtextError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_corrupt_bytes_are_read_failure() {
        let handle = DocumentHandle::from_bytes(b"this is not a pdf at all".to_vec(), PDF_MIME_TYPE);
        let err = TextLayerExtractor::new().extract(&handle).await.unwrap_err();
        assert!(matches!(err, DualtextError::Read { .. }));
    }

    #[tokio::test]
    async fn test_missing_image_file_is_not_found() {
        let handle = DocumentHandle::from_path("/no/such/dir/scan.png", "image/png");
        let err = TextLayerExtractor::new().extract(&handle).await.unwrap_err();
        assert!(matches!(err, DualtextError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_image_input_yields_empty_text() {
        let handle = DocumentHandle::from_bytes(vec![0u8; 4], "image/png");
        let text = TextLayerExtractor::new().extract(&handle).await.unwrap();
        assert_eq!(text, "");
    }
}
