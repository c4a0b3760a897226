//! Common test utilities for integration tests.
//!
//! Builders for pagers wired to mock collaborators, plus event helpers.

#![allow(dead_code)]

use std::sync::Arc;
use tokio::sync::mpsc;

use chat_pager::adapters::mock::{MockMessageSource, RecordingPresentation};
use chat_pager::app::{Pager, PagerEvent};
use chat_pager::config::PagerConfig;
use chat_pager::models::LoadRange;

/// Default config with no artificial latency.
pub fn fast_config() -> PagerConfig {
    PagerConfig::default().with_fetch_latency_ms(0)
}

pub fn range(start: i64, end: i64) -> LoadRange {
    LoadRange::new(start, end).expect("valid range")
}

/// A pager plus handles on everything it talks to.
pub struct TestPager {
    pub pager: Pager,
    pub source: MockMessageSource,
    pub presentation: RecordingPresentation,
    pub events: mpsc::UnboundedReceiver<PagerEvent>,
}

impl TestPager {
    pub fn new(config: PagerConfig) -> Self {
        Self::with_source(config, MockMessageSource::new())
    }

    pub fn with_source(config: PagerConfig, source: MockMessageSource) -> Self {
        let presentation = RecordingPresentation::new();
        let (event_tx, events) = mpsc::unbounded_channel();
        let pager = Pager::new(
            config,
            Arc::new(source.clone()),
            Box::new(presentation.clone()),
        )
        .expect("valid config")
        .with_event_sender(event_tx);

        Self {
            pager,
            source,
            presentation,
            events,
        }
    }

    /// Pager with the first page already merged.
    pub async fn started(config: PagerConfig) -> Self {
        let mut test = Self::new(config);
        test.pager.start().expect("initial request");
        test.pager.drain().await;
        test.take_events();
        test
    }

    /// Events published so far.
    pub fn take_events(&mut self) -> Vec<PagerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }

    pub fn event_kinds(&mut self) -> Vec<&'static str> {
        self.take_events().iter().map(|event| event.kind()).collect()
    }
}
