//! Request orchestration.
//!
//! An [`Orchestrator`] takes one document through
//! `Idle -> Loading -> Extracting -> Reconciling -> Done | Failed`.
//! Both strategies always run to completion (or to the request deadline) and
//! each runs on its own Tokio task, so a panic in one strategy becomes that
//! strategy's typed failure instead of tearing down the request.

use crate::core::config::ExtractionConfig;
use crate::extractors::{ExtractionStrategy, OcrExtractor, TextLayerExtractor};
use crate::reconcile::{LongestTextPolicy, ReconciliationPolicy};
use crate::source::{self, DocumentHandle, DocumentSource};
use crate::types::{ExtractionResult, ProcessingMode, ProcessingStage, ReconciledResult, StrategyKind};
use crate::{DualtextError, Result};
use once_cell::sync::Lazy;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinError, JoinHandle};
use tracing::Instrument;

static GLOBAL_RUNTIME: Lazy<std::result::Result<tokio::runtime::Runtime, String>> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| e.to_string())
});

/// Runs both extraction strategies for a document and reconciles their output.
pub struct Orchestrator {
    text_layer: Arc<dyn ExtractionStrategy>,
    ocr: Arc<dyn ExtractionStrategy>,
    policy: Arc<dyn ReconciliationPolicy>,
    config: ExtractionConfig,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("text_layer", &self.text_layer.name())
            .field("ocr", &self.ocr.name())
            .field("policy", &self.policy.name())
            .field("config", &self.config)
            .finish()
    }
}

impl Orchestrator {
    /// Build an orchestrator with the lopdf text layer, Tesseract OCR and the longest-text policy.
    pub fn new(config: ExtractionConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    pub fn builder(config: ExtractionConfig) -> OrchestratorBuilder {
        OrchestratorBuilder {
            config,
            text_layer: None,
            ocr: None,
            policy: None,
        }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Process a document using the mode from the configuration.
    pub async fn process_default(&self, source: DocumentSource) -> Result<ReconciledResult> {
        self.process(source, self.config.mode).await
    }

    /// Load `source`, run both strategies in `mode` and reconcile.
    ///
    /// When `timeout_secs` is configured the whole request is abandoned at the
    /// deadline with [`DualtextError::Timeout`]; running strategy tasks are
    /// aborted and any temporary file is removed before this returns.
    #[tracing::instrument(skip(self, source))]
    pub async fn process(&self, source: DocumentSource, mode: ProcessingMode) -> Result<ReconciledResult> {
        let mut tracker = StageTracker::new();

        let outcome = match self.config.timeout_secs {
            Some(seconds) => {
                match tokio::time::timeout(Duration::from_secs(seconds), self.run(source, mode, &mut tracker)).await {
                    Ok(outcome) => outcome,
                    Err(_) => Err(DualtextError::Timeout { seconds }),
                }
            }
            None => self.run(source, mode, &mut tracker).await,
        };

        tracker.finish(&outcome);
        outcome
    }

    /// Run both strategies against an already loaded document and reconcile.
    pub async fn process_document(&self, document: &DocumentHandle, mode: ProcessingMode) -> Result<ReconciledResult> {
        let (text_layer, ocr) = self.extract_both(document, mode).await;
        self.policy.reconcile(text_layer, ocr)
    }

    async fn run(
        &self,
        source: DocumentSource,
        mode: ProcessingMode,
        tracker: &mut StageTracker,
    ) -> Result<ReconciledResult> {
        tracker.advance(ProcessingStage::Loading);
        let loaded = source::load(source, &self.config.loader).await?;
        tracing::debug!(document = %loaded.handle().describe(), mime_type = loaded.handle().mime_type(), "document loaded");

        tracker.advance(ProcessingStage::Extracting(mode));
        let (text_layer, ocr) = self.extract_both(loaded.handle(), mode).await;
        log_strategy_outcome(&text_layer);
        log_strategy_outcome(&ocr);

        tracker.advance(ProcessingStage::Reconciling);
        let reconciled = self.policy.reconcile(text_layer, ocr);

        drop(loaded);
        reconciled
    }

    async fn extract_both(&self, document: &DocumentHandle, mode: ProcessingMode) -> (ExtractionResult, ExtractionResult) {
        match mode {
            ProcessingMode::Concurrent => {
                let text_task = StrategyTask::spawn(self.text_layer.clone(), document.clone());
                let ocr_task = StrategyTask::spawn(self.ocr.clone(), document.clone());
                tokio::join!(text_task.join(), ocr_task.join())
            }
            ProcessingMode::Sequential => {
                let text_layer = StrategyTask::spawn(self.text_layer.clone(), document.clone())
                    .join()
                    .await;
                let ocr = StrategyTask::spawn(self.ocr.clone(), document.clone()).join().await;
                (text_layer, ocr)
            }
        }
    }
}

/// Assembles an [`Orchestrator`] with custom strategies or policy.
pub struct OrchestratorBuilder {
    config: ExtractionConfig,
    text_layer: Option<Arc<dyn ExtractionStrategy>>,
    ocr: Option<Arc<dyn ExtractionStrategy>>,
    policy: Option<Arc<dyn ReconciliationPolicy>>,
}

impl OrchestratorBuilder {
    pub fn text_layer_strategy(mut self, strategy: Arc<dyn ExtractionStrategy>) -> Self {
        self.text_layer = Some(strategy);
        self
    }

    pub fn ocr_strategy(mut self, strategy: Arc<dyn ExtractionStrategy>) -> Self {
        self.ocr = Some(strategy);
        self
    }

    pub fn policy(mut self, policy: Arc<dyn ReconciliationPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn build(self) -> Result<Orchestrator> {
        self.config.validate()?;

        let text_layer: Arc<dyn ExtractionStrategy> = match self.text_layer {
            Some(strategy) => strategy,
            None => Arc::new(TextLayerExtractor::new()),
        };
        let ocr: Arc<dyn ExtractionStrategy> = match self.ocr {
            Some(strategy) => strategy,
            None => Arc::new(OcrExtractor::from_config(&self.config)?),
        };

        for (strategy, expected) in [(&text_layer, StrategyKind::TextLayer), (&ocr, StrategyKind::Ocr)] {
            if strategy.kind() != expected {
                return Err(DualtextError::validation(format!(
                    "Strategy '{}' reports kind '{}' but was registered as '{}'",
                    strategy.name(),
                    strategy.kind(),
                    expected
                )));
            }
        }

        let policy: Arc<dyn ReconciliationPolicy> = match self.policy {
            Some(policy) => policy,
            None => Arc::new(LongestTextPolicy),
        };

        Ok(Orchestrator {
            text_layer,
            ocr,
            policy,
            config: self.config,
        })
    }
}

/// A strategy running on its own task. The task is aborted if this is dropped before completion.
struct StrategyTask {
    kind: StrategyKind,
    handle: JoinHandle<Result<String>>,
}

impl StrategyTask {
    fn spawn(strategy: Arc<dyn ExtractionStrategy>, document: DocumentHandle) -> Self {
        let kind = strategy.kind();
        let span = tracing::debug_span!("strategy", strategy = %kind, name = strategy.name());
        let handle = tokio::spawn(async move { strategy.extract(&document).await }.instrument(span));
        Self { kind, handle }
    }

    async fn join(mut self) -> ExtractionResult {
        match (&mut self.handle).await {
            Ok(result) => ExtractionResult::from_result(self.kind, result),
            Err(join_error) => ExtractionResult::failure(self.kind, task_failure(self.kind, join_error)),
        }
    }
}

impl Drop for StrategyTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn task_failure(kind: StrategyKind, error: JoinError) -> DualtextError {
    let message = if error.is_panic() {
        let payload = error.into_panic();
        let detail = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_string());
        format!("{} strategy panicked: {}", kind, detail)
    } else {
        format!("{} strategy was cancelled", kind)
    };

    tracing::error!(strategy = %kind, "{}", message);

    match kind {
        StrategyKind::TextLayer => DualtextError::extraction(message),
        StrategyKind::Ocr => DualtextError::ocr(message),
    }
}

fn log_strategy_outcome(result: &ExtractionResult) {
    match &result.error {
        Some(error) => tracing::debug!(strategy = %result.strategy, error = %error, "strategy failed"),
        None => tracing::debug!(strategy = %result.strategy, chars = result.char_len(), "strategy finished"),
    }
}

/// Logs each stage transition of a request.
struct StageTracker {
    stage: ProcessingStage,
}

impl StageTracker {
    fn new() -> Self {
        Self {
            stage: ProcessingStage::Idle,
        }
    }

    fn advance(&mut self, next: ProcessingStage) {
        tracing::debug!(from = ?self.stage, to = ?next, "stage transition");
        self.stage = next;
    }

    fn finish(&mut self, outcome: &Result<ReconciledResult>) {
        match outcome {
            Ok(result) => {
                self.advance(ProcessingStage::Done);
                for failure in &result.suppressed {
                    tracing::warn!(
                        strategy = %failure.strategy,
                        kind = %failure.kind,
                        "{}",
                        failure.message
                    );
                }
                tracing::info!(
                    strategy_used = %result.strategy_used,
                    chars = result.text.chars().count(),
                    "extraction complete"
                );
            }
            Err(error) => {
                self.advance(ProcessingStage::Failed);
                tracing::info!(kind = error.kind(), error = %error, "extraction failed");
            }
        }
    }
}

/// Process a document with a one-off [`Orchestrator`] built from `config`.
pub async fn process(source: DocumentSource, mode: ProcessingMode, config: &ExtractionConfig) -> Result<ReconciledResult> {
    Orchestrator::new(config.clone())?.process(source, mode).await
}

/// Synchronous wrapper for [`process`] backed by a shared multi-threaded runtime.
///
/// Must not be called from within an async context.
pub fn process_sync(source: DocumentSource, mode: ProcessingMode, config: &ExtractionConfig) -> Result<ReconciledResult> {
    let runtime = GLOBAL_RUNTIME
        .as_ref()
        .map_err(|e| DualtextError::Io(std::io::Error::other(format!("Failed to create Tokio runtime: {}", e))))?;
    runtime.block_on(process(source, mode, config))
}
