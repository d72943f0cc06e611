use crate::error::DualtextError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which extraction path produced a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    TextLayer,
    Ocr,
}

impl StrategyKind {
    /// Separator placed between consecutive page fragments.
    ///
    /// Text-layer pages are concatenated directly while OCR pages are joined
    /// with a single space.
    pub fn page_separator(self) -> &'static str {
        match self {
            Self::TextLayer => "",
            Self::Ocr => " ",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TextLayer => "text-layer",
            Self::Ocr => "ocr",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered text fragments, one per page that contributed text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageText {
    pub pages: Vec<String>,
}

impl PageText {
    pub fn new(pages: Vec<String>) -> Self {
        Self { pages }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Concatenate the fragments with the separator owned by `kind`.
    pub fn join(&self, kind: StrategyKind) -> String {
        self.pages.join(kind.page_separator())
    }
}

/// Outcome of one strategy for one request.
#[derive(Debug)]
pub struct ExtractionResult {
    pub text: String,
    pub strategy: StrategyKind,
    pub error: Option<DualtextError>,
}

impl ExtractionResult {
    pub fn success(strategy: StrategyKind, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            strategy,
            error: None,
        }
    }

    pub fn failure(strategy: StrategyKind, error: DualtextError) -> Self {
        Self {
            text: String::new(),
            strategy,
            error: Some(error),
        }
    }

    pub fn from_result(strategy: StrategyKind, result: crate::Result<String>) -> Self {
        match result {
            Ok(text) => Self::success(strategy, text),
            Err(error) => Self::failure(strategy, error),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }

    /// Number of Unicode scalar values in the text. No normalization is applied.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }
}

/// Strategy reported to the caller for the final text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyUsed {
    #[serde(rename = "text-layer")]
    TextLayer,
    #[serde(rename = "ocr")]
    Ocr,
    #[serde(rename = "none")]
    None,
}

impl StrategyUsed {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TextLayer => "text-layer",
            Self::Ocr => "ocr",
            Self::None => "none",
        }
    }
}

impl From<StrategyKind> for StrategyUsed {
    fn from(kind: StrategyKind) -> Self {
        match kind {
            StrategyKind::TextLayer => Self::TextLayer,
            StrategyKind::Ocr => Self::Ocr,
        }
    }
}

impl fmt::Display for StrategyUsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single-strategy failure that reconciliation resolved around.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuppressedFailure {
    pub strategy: StrategyKind,
    pub kind: String,
    pub message: String,
}

impl SuppressedFailure {
    pub fn new(strategy: StrategyKind, error: &DualtextError) -> Self {
        Self {
            strategy,
            kind: error.kind().to_string(),
            message: error.to_string(),
        }
    }
}

/// Final text for a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciledResult {
    pub text: String,
    pub strategy_used: StrategyUsed,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suppressed: Vec<SuppressedFailure>,
}

/// How the two strategies are scheduled for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingMode {
    #[default]
    Concurrent,
    Sequential,
}

impl std::str::FromStr for ProcessingMode {
    type Err = DualtextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "concurrent" | "parallel" => Ok(Self::Concurrent),
            "sequential" => Ok(Self::Sequential),
            other => Err(DualtextError::validation(format!(
                "Unknown processing mode '{}', expected 'concurrent' or 'sequential'",
                other
            ))),
        }
    }
}

impl fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Concurrent => f.write_str("concurrent"),
            Self::Sequential => f.write_str("sequential"),
        }
    }
}

/// Lifecycle of a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    Idle,
    Loading,
    Extracting(ProcessingMode),
    Reconciling,
    Done,
    Failed,
}

/// Structured failure description returned at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub kind: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<String>,
}

impl From<&DualtextError> for ErrorReport {
    fn from(error: &DualtextError) -> Self {
        let causes = match error {
            DualtextError::Combined { text_layer, ocr } => vec![
                format!("{}: {}", StrategyKind::TextLayer, text_layer),
                format!("{}: {}", StrategyKind::Ocr, ocr),
            ],
            other => {
                let mut causes = Vec::new();
                let mut source = std::error::Error::source(other);
                while let Some(cause) = source {
                    causes.push(cause.to_string());
                    source = std::error::Error::source(cause);
                }
                causes
            }
        };

        Self {
            kind: error.kind().to_string(),
            message: error.to_string(),
            causes,
        }
    }
}

impl From<&SuppressedFailure> for ErrorReport {
    fn from(failure: &SuppressedFailure) -> Self {
        Self {
            kind: failure.kind.clone(),
            message: format!("{}: {}", failure.strategy, failure.message),
            causes: Vec::new(),
        }
    }
}

/// Boundary output: `{ text, strategy_used, error }`.
///
/// `warnings` lists single-strategy failures that did not fail the request;
/// it is omitted from JSON when empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessOutput {
    pub text: String,
    pub strategy_used: StrategyUsed,
    pub error: Option<ErrorReport>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ErrorReport>,
}

impl ProcessOutput {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

impl From<crate::Result<ReconciledResult>> for ProcessOutput {
    fn from(result: crate::Result<ReconciledResult>) -> Self {
        match result {
            Ok(reconciled) => Self {
                warnings: reconciled.suppressed.iter().map(ErrorReport::from).collect(),
                text: reconciled.text,
                strategy_used: reconciled.strategy_used,
                error: None,
            },
            Err(error) => Self {
                text: String::new(),
                strategy_used: StrategyUsed::None,
                error: Some(ErrorReport::from(&error)),
                warnings: Vec::new(),
            },
        }
    }
}
