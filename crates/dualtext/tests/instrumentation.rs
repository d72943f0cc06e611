use dualtext::types::{ProcessingMode, StrategyKind};
use dualtext::{DocumentSource, ExtractionConfig};
use std::sync::{Arc, Mutex};
use tracing::span::{Attributes, Id};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;

mod helpers;

use helpers::{FixedStrategy, build_pdf, orchestrator_with};

/// Collects span names and the number of warnings emitted.
#[derive(Clone, Default)]
struct Collector {
    spans: Arc<Mutex<Vec<String>>>,
    warnings: Arc<Mutex<usize>>,
}

impl<S: Subscriber + for<'a> LookupSpan<'a>> Layer<S> for Collector {
    fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, _ctx: Context<'_, S>) {
        self.spans.lock().unwrap().push(attrs.metadata().name().to_string());
    }

    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            *self.warnings.lock().unwrap() += 1;
        }
    }
}

#[tokio::test]
async fn test_request_and_strategy_spans_are_recorded() {
    let collector = Collector::default();
    let subscriber = tracing_subscriber::registry().with(collector.clone());
    let _guard = tracing::subscriber::set_default(subscriber);

    let orchestrator = orchestrator_with(
        FixedStrategy::failing(StrategyKind::TextLayer, "no xref"),
        FixedStrategy::text(StrategyKind::Ocr, "recognized"),
        ExtractionConfig::default(),
    );

    let result = orchestrator
        .process(DocumentSource::Bytes(build_pdf(&[None])), ProcessingMode::Sequential)
        .await
        .unwrap();
    assert_eq!(result.text, "recognized");

    let spans = collector.spans.lock().unwrap().clone();
    assert!(spans.iter().any(|name| name == "process"), "spans: {spans:?}");
    assert_eq!(spans.iter().filter(|name| *name == "strategy").count(), 2);

    assert_eq!(*collector.warnings.lock().unwrap(), 1, "suppressed failure is logged once");
}
