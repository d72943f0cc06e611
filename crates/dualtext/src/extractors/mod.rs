//! The two extraction strategies.
//!
//! Both implement [`ExtractionStrategy`] and read the same shared
//! [`DocumentHandle`]. Each strategy owns its failure classification, so the
//! orchestrator only ever sees typed [`crate::DualtextError`] values.

pub mod ocr;
pub mod text_layer;

use crate::Result;
use crate::source::DocumentHandle;
use crate::types::{PageText, StrategyKind};
use async_trait::async_trait;

pub use ocr::OcrExtractor;
pub use text_layer::TextLayerExtractor;

/// One way of turning a document into text.
///
/// Implementations must be `Send + Sync` because the orchestrator runs each
/// strategy on its own task.
#[async_trait]
pub trait ExtractionStrategy: Send + Sync {
    /// Which path this strategy represents. Decides the page separator.
    fn kind(&self) -> StrategyKind;

    fn name(&self) -> &str;

    /// Extract per-page text in page order.
    async fn extract_pages(&self, document: &DocumentHandle) -> Result<PageText>;

    /// Extract the joined document text.
    async fn extract(&self, document: &DocumentHandle) -> Result<String> {
        let pages = self.extract_pages(document).await?;
        Ok(pages.join(self.kind()))
    }
}
