//! Rasterize+OCR strategy.
//!
//! PDF pages are rendered with Pdfium, image inputs are decoded as a single
//! page. Every page image is written as PNG into a request-scoped temporary
//! directory and recognized in page order. Recognized page texts are joined
//! with a single space, empty pages included.

use super::ExtractionStrategy;
use crate::core::config::ExtractionConfig;
use crate::core::mime::DocumentKind;
use crate::ocr::{OcrEngine, OcrError, TesseractCli};
use crate::pdf::{PageRenderOptions, PdfError, PdfInput, PdfRenderer};
use crate::source::{DocumentData, DocumentHandle};
use crate::types::{PageText, StrategyKind};
use crate::{DualtextError, Result};
use async_trait::async_trait;
use image::{DynamicImage, ImageFormat};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct OcrExtractor {
    engine: Arc<dyn OcrEngine>,
    render: PageRenderOptions,
    pdfium_library_path: Option<PathBuf>,
}

impl OcrExtractor {
    /// Build the default Tesseract-backed extractor.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        let engine = TesseractCli::from_config(&config.ocr)
            .map_err(|e| DualtextError::validation_with_source("invalid OCR configuration", e))?;
        Ok(Self::with_engine(Arc::new(engine), config))
    }

    pub fn with_engine(engine: Arc<dyn OcrEngine>, config: &ExtractionConfig) -> Self {
        Self {
            engine,
            render: config.ocr.render.clone(),
            pdfium_library_path: config.pdf.pdfium_library_path.clone(),
        }
    }

    async fn rasterize(&self, document: &DocumentHandle) -> Result<Vec<DynamicImage>> {
        let data = document.data().clone();
        let kind = document.kind();
        let render = self.render.clone();
        let library_path = self.pdfium_library_path.clone();

        tokio::task::spawn_blocking(move || match kind {
            DocumentKind::Image => decode_image(&data).map(|image| vec![image]),
            DocumentKind::Pdf => {
                let renderer =
                    PdfRenderer::new(library_path.as_deref()).map_err(PdfError::into_rasterization_error)?;
                let input = match &data {
                    DocumentData::File(path) => PdfInput::File(path),
                    DocumentData::Memory(bytes) => PdfInput::Bytes(bytes),
                };
                renderer
                    .render_all_pages(input, &render)
                    .map_err(PdfError::into_rasterization_error)
            }
        })
        .await
        .map_err(|e| DualtextError::rasterization(format!("Rasterization task failed: {}", e)))?
    }
}

#[async_trait]
impl ExtractionStrategy for OcrExtractor {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Ocr
    }

    fn name(&self) -> &str {
        self.engine.name()
    }

    async fn extract_pages(&self, document: &DocumentHandle) -> Result<PageText> {
        let images = self.rasterize(document).await?;
        tracing::debug!(pages = images.len(), document = %document.describe(), "rasterized document");

        if images.is_empty() {
            return Ok(PageText::default());
        }

        let workdir = tempfile::Builder::new()
            .prefix("dualtext-ocr-")
            .tempdir()
            .map_err(|e| OcrError::IOError(format!("Failed to create OCR work directory: {}", e)))?;

        let dir = workdir.path().to_path_buf();
        let page_paths = tokio::task::spawn_blocking(move || write_page_images(images, &dir))
            .await
            .map_err(|e| DualtextError::rasterization(format!("Page image task failed: {}", e)))??;

        let mut pages = Vec::with_capacity(page_paths.len());
        for (index, page_path) in page_paths.iter().enumerate() {
            let text = self.engine.recognize(page_path).await?;
            tracing::debug!(page = index + 1, chars = text.chars().count(), "recognized page");
            pages.push(text);
        }

        Ok(PageText::new(pages))
    }
}

fn decode_image(data: &DocumentData) -> Result<DynamicImage> {
    let bytes: std::borrow::Cow<'_, [u8]> = match data {
        DocumentData::File(path) => {
            if !path.exists() {
                return Err(DualtextError::rasterization(format!(
                    "Image file not found: {}",
                    path.display()
                )));
            }
            let bytes = std::fs::read(path).map_err(|e| {
                DualtextError::rasterization_with_source(format!("Error reading image {}", path.display()), e)
            })?;
            std::borrow::Cow::Owned(bytes)
        }
        DocumentData::Memory(bytes) => std::borrow::Cow::Borrowed(&bytes[..]),
    };

    image::load_from_memory(&bytes).map_err(|e| DualtextError::rasterization_with_source("Error decoding image", e))
}

fn write_page_images(images: Vec<DynamicImage>, dir: &Path) -> Result<Vec<PathBuf>> {
    images
        .into_iter()
        .enumerate()
        .map(|(index, image)| {
            let path = dir.join(format!("page-{:04}.png", index + 1));
            image.save_with_format(&path, ImageFormat::Png).map_err(|e| {
                DualtextError::rasterization_with_source(format!("Error writing image for page {}", index + 1), e)
            })?;
            Ok(path)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Mutex;

    /// Returns a canned text per call and remembers the files it was shown.
    struct ScriptedEngine {
        responses: Mutex<Vec<String>>,
        seen: Mutex<Vec<PathBuf>>,
    }

    impl ScriptedEngine {
        fn new(responses: &[&str]) -> Self {
            Self {
                responses: Mutex::new(responses.iter().rev().map(|s| s.to_string()).collect()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl OcrEngine for ScriptedEngine {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn recognize(&self, image_path: &Path) -> std::result::Result<String, OcrError> {
            assert!(image_path.exists());
            self.seen.lock().unwrap().push(image_path.to_path_buf());
            Ok(self.responses.lock().unwrap().pop().unwrap_or_default())
        }
    }

    struct FailingEngine;

    #[async_trait]
    impl OcrEngine for FailingEngine {
        fn name(&self) -> &str {
            "failing"
        }

        async fn recognize(&self, _image_path: &Path) -> std::result::Result<String, OcrError> {
            Err(OcrError::ProcessingFailed("engine crashed".to_string()))
        }
    }

    fn png_bytes() -> Vec<u8> {
        let image = DynamicImage::new_rgb8(8, 8);
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, ImageFormat::Png).unwrap();
        buffer.into_inner()
    }

    #[tokio::test]
    async fn test_image_input_is_single_page() {
        let engine = Arc::new(ScriptedEngine::new(&["Invoice 42"]));
        let extractor = OcrExtractor::with_engine(engine.clone(), &ExtractionConfig::default());
        let handle = DocumentHandle::from_bytes(png_bytes(), "image/png");

        let text = extractor.extract(&handle).await.unwrap();
        assert_eq!(text, "Invoice 42");

        let seen = engine.seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 1);
        assert!(!seen[0].exists(), "page images must be removed after extraction");
    }

    #[tokio::test]
    async fn test_engine_failure_is_ocr_error() {
        let extractor = OcrExtractor::with_engine(Arc::new(FailingEngine), &ExtractionConfig::default());
        let handle = DocumentHandle::from_bytes(png_bytes(), "image/png");

        let err = extractor.extract(&handle).await.unwrap_err();
        assert!(matches!(err, DualtextError::Ocr { .. }));
    }

    #[tokio::test]
    async fn test_undecodable_image_is_rasterization_error() {
        let extractor = OcrExtractor::with_engine(Arc::new(FailingEngine), &ExtractionConfig::default());
        let handle = DocumentHandle::from_bytes(b"\x89PNG but not really".to_vec(), "image/png");

        let err = extractor.extract(&handle).await.unwrap_err();
        assert!(matches!(err, DualtextError::Rasterization { .. }));
    }

    #[tokio::test]
    async fn test_missing_image_file_is_rasterization_error() {
        let extractor = OcrExtractor::with_engine(Arc::new(FailingEngine), &ExtractionConfig::default());
        let handle = DocumentHandle::from_path("/missing/scan.png", "image/png");

        let err = extractor.extract(&handle).await.unwrap_err();
        assert!(matches!(err, DualtextError::Rasterization { .. }));
    }

    #[tokio::test]
    async fn test_missing_pdf_is_rasterization_error() {
        let extractor = OcrExtractor::with_engine(Arc::new(FailingEngine), &ExtractionConfig::default());
        let handle = DocumentHandle::from_path("/missing/scan.pdf", crate::core::mime::PDF_MIME_TYPE);

        // fails on Pdfium binding or on the missing file, both are rasterization failures
        let err = extractor.extract(&handle).await.unwrap_err();
        assert!(matches!(err, DualtextError::Rasterization { .. }));
    }

    #[test]
    fn test_unwritable_page_image_is_rasterization_error() {
        let err = write_page_images(vec![DynamicImage::new_rgb8(4, 4)], Path::new("/no/such/dir")).unwrap_err();
        assert!(matches!(err, DualtextError::Rasterization { .. }));
    }

    #[test]
    fn test_from_config_rejects_bad_language() {
        let mut config = ExtractionConfig::default();
        config.ocr.language = "nope".to_string();
        assert!(matches!(
            OcrExtractor::from_config(&config),
            Err(DualtextError::Validation { .. })
        ));
    }
}
