//! Reconciliation of the two strategy outcomes.
//!
//! The rules, evaluated in order:
//!
//! 1. Both texts non-empty: the longer one by character count wins, text-layer on a tie.
//! 2. Exactly one text non-empty: that one wins, whatever happened to the other.
//! 3. Neither has text and neither failed: empty text, strategy `none`.
//! 4. Both failed: [`DualtextError::Combined`] carrying both causes.
//!
//! When one strategy failed and the other succeeded with empty text the result
//! is empty text with strategy `none`; the failure is kept in
//! [`ReconciledResult::suppressed`].
//!
//! Texts are compared as-is, without trimming or normalization.

use crate::types::{ExtractionResult, ReconciledResult, StrategyKind, StrategyUsed, SuppressedFailure};
use crate::{DualtextError, Result};

/// Selection rule applied to a text-layer and an OCR outcome.
pub trait ReconciliationPolicy: Send + Sync {
    fn name(&self) -> &str;

    fn reconcile(&self, text_layer: ExtractionResult, ocr: ExtractionResult) -> Result<ReconciledResult>;
}

/// The default policy: prefer whichever strategy recovered more characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct LongestTextPolicy;

impl ReconciliationPolicy for LongestTextPolicy {
    fn name(&self) -> &str {
        "longest-text"
    }

    fn reconcile(&self, text_layer: ExtractionResult, ocr: ExtractionResult) -> Result<ReconciledResult> {
        select_longest(text_layer, ocr)
    }
}

/// Apply the longest-text rule. See the module documentation for the exact order.
pub fn select_longest(text_layer: ExtractionResult, ocr: ExtractionResult) -> Result<ReconciledResult> {
    debug_assert_eq!(text_layer.strategy, StrategyKind::TextLayer);
    debug_assert_eq!(ocr.strategy, StrategyKind::Ocr);

    match (text_layer.error, ocr.error) {
        (Some(text_err), Some(ocr_err)) => Err(DualtextError::combined(text_err, ocr_err)),
        (text_err, ocr_err) => {
            let suppressed: Vec<SuppressedFailure> = text_err
                .iter()
                .map(|e| SuppressedFailure::new(StrategyKind::TextLayer, e))
                .chain(ocr_err.iter().map(|e| SuppressedFailure::new(StrategyKind::Ocr, e)))
                .collect();

            let (text, strategy_used) = match (text_layer.text.is_empty(), ocr.text.is_empty()) {
                (false, false) => {
                    if ocr.text.chars().count() > text_layer.text.chars().count() {
                        (ocr.text, StrategyUsed::Ocr)
                    } else {
                        (text_layer.text, StrategyUsed::TextLayer)
                    }
                }
                (false, true) => (text_layer.text, StrategyUsed::TextLayer),
                (true, false) => (ocr.text, StrategyUsed::Ocr),
                (true, true) => (String::new(), StrategyUsed::None),
            };

            Ok(ReconciledResult {
                text,
                strategy_used,
                suppressed,
            })
        }
    }
}
