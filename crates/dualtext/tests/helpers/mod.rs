//! Shared fixtures for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use dualtext::types::{PageText, StrategyKind};
use dualtext::{DocumentHandle, DualtextError, ExtractionConfig, ExtractionStrategy, Orchestrator, Result};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Build a PDF where each entry is one page; `None` produces a page without any text operators.
pub fn build_pdf(pages: &[Option<&str>]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });

    let mut kids: Vec<Object> = Vec::new();
    for page in pages {
        let operations = match page {
            Some(text) => vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 18.into()]),
                Operation::new("Td", vec![50.into(), 750.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
            None => vec![],
        };
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

pub fn write_pdf(dir: &Path, name: &str, pages: &[Option<&str>]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, build_pdf(pages)).unwrap();
    path
}

/// Always returns the same outcome.
pub struct FixedStrategy {
    kind: StrategyKind,
    outcome: std::result::Result<String, String>,
}

impl FixedStrategy {
    pub fn text(kind: StrategyKind, text: &str) -> Arc<Self> {
        Arc::new(Self {
            kind,
            outcome: Ok(text.to_string()),
        })
    }

    pub fn failing(kind: StrategyKind, message: &str) -> Arc<Self> {
        Arc::new(Self {
            kind,
            outcome: Err(message.to_string()),
        })
    }
}

#[async_trait]
impl ExtractionStrategy for FixedStrategy {
    fn kind(&self) -> StrategyKind {
        self.kind
    }

    fn name(&self) -> &str {
        "fixed"
    }

    async fn extract_pages(&self, _document: &DocumentHandle) -> Result<PageText> {
        match &self.outcome {
            Ok(text) => Ok(PageText::new(vec![text.clone()])),
            Err(message) => Err(match self.kind {
                StrategyKind::TextLayer => DualtextError::extraction(message.clone()),
                StrategyKind::Ocr => DualtextError::ocr(message.clone()),
            }),
        }
    }
}

/// Panics whenever it runs.
pub struct PanickingStrategy(pub StrategyKind);

#[async_trait]
impl ExtractionStrategy for PanickingStrategy {
    fn kind(&self) -> StrategyKind {
        self.0
    }

    fn name(&self) -> &str {
        "panicking"
    }

    async fn extract_pages(&self, _document: &DocumentHandle) -> Result<PageText> {
        panic!("simulated crash in {}", self.0);
    }
}

/// Sleeps before answering and records the document path it was given.
pub struct SlowStrategy {
    kind: StrategyKind,
    delay: Duration,
    text: String,
    pub seen_paths: Mutex<Vec<PathBuf>>,
}

impl SlowStrategy {
    pub fn new(kind: StrategyKind, delay: Duration, text: &str) -> Arc<Self> {
        Arc::new(Self {
            kind,
            delay,
            text: text.to_string(),
            seen_paths: Mutex::new(Vec::new()),
        })
    }

    pub fn seen(&self) -> Vec<PathBuf> {
        self.seen_paths.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExtractionStrategy for SlowStrategy {
    fn kind(&self) -> StrategyKind {
        self.kind
    }

    fn name(&self) -> &str {
        "slow"
    }

    async fn extract_pages(&self, document: &DocumentHandle) -> Result<PageText> {
        if let Some(path) = document.path() {
            self.seen_paths.lock().unwrap().push(path.to_path_buf());
        }
        tokio::time::sleep(self.delay).await;
        Ok(PageText::new(vec![self.text.clone()]))
    }
}

/// Tracks how many strategies sharing the same gauge run at the same time.
#[derive(Default)]
pub struct OverlapGauge {
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl OverlapGauge {
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

pub struct GaugedStrategy {
    kind: StrategyKind,
    gauge: Arc<OverlapGauge>,
    text: String,
}

impl GaugedStrategy {
    pub fn new(kind: StrategyKind, gauge: Arc<OverlapGauge>, text: &str) -> Arc<Self> {
        Arc::new(Self {
            kind,
            gauge,
            text: text.to_string(),
        })
    }
}

#[async_trait]
impl ExtractionStrategy for GaugedStrategy {
    fn kind(&self) -> StrategyKind {
        self.kind
    }

    fn name(&self) -> &str {
        "gauged"
    }

    async fn extract_pages(&self, _document: &DocumentHandle) -> Result<PageText> {
        let now = self.gauge.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.gauge.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(150)).await;
        self.gauge.active.fetch_sub(1, Ordering::SeqCst);
        Ok(PageText::new(vec![self.text.clone()]))
    }
}

pub fn orchestrator_with(
    text_layer: Arc<dyn ExtractionStrategy>,
    ocr: Arc<dyn ExtractionStrategy>,
    config: ExtractionConfig,
) -> Orchestrator {
    Orchestrator::builder(config)
        .text_layer_strategy(text_layer)
        .ocr_strategy(ocr)
        .build()
        .unwrap()
}
