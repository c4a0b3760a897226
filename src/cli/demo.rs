//! Headless demo run against the synthetic source.

use color_eyre::Result;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::adapters::{SyntheticSource, TracingPresentation};
use crate::app::{Pager, PagerEvent, ViewportSignal};
use crate::config::PagerConfig;
use crate::domain::WindowBounds;
use crate::models::PageBounds;

/// State of the window when the demo finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoSummary {
    pub item_count: usize,
    pub bounds: WindowBounds,
    pub page_bounds: PageBounds,
    pub fetches: u64,
    pub events: usize,
}

impl std::fmt::Display for DemoSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.bounds {
            WindowBounds::Loaded { min, max } => write!(
                f,
                "{} messages loaded in [{}, {}] after {} fetches (pages {}..={})",
                self.item_count,
                min,
                max,
                self.fetches,
                self.page_bounds.lower_page,
                self.page_bounds.upper_page
            ),
            WindowBounds::Empty => write!(f, "no messages loaded after {} fetches", self.fetches),
        }
    }
}

/// Load the first page, page once toward the bottom, then jump to
/// `jump` (or the configured target).
pub async fn run_demo(config: PagerConfig, jump: Option<i64>) -> Result<DemoSummary> {
    let target = jump.unwrap_or(config.target_message_id);
    let source = Arc::new(SyntheticSource::from_config(&config));

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<PagerEvent>();
    let event_logger = tokio::spawn(async move {
        let mut seen = 0usize;
        while let Some(event) = event_rx.recv().await {
            tracing::debug!(kind = event.kind(), event = ?event, "Pager event");
            seen += 1;
        }
        seen
    });

    let mut pager = Pager::new(config, source, Box::new(TracingPresentation::new()))?
        .with_event_sender(event_tx);

    pager.start()?;
    pager.drain().await;

    let (signal_tx, signal_rx) = mpsc::unbounded_channel();
    signal_tx.send(ViewportSignal::NearBottom(pager.window().bounds_snapshot().max()))?;
    signal_tx.send(ViewportSignal::JumpRequested(target))?;
    drop(signal_tx);

    pager.run(signal_rx).await;

    let snapshot = pager.window().snapshot();
    let page_bounds = pager.page_bounds();
    let fetches = pager.coordinator().fetches_started();
    // Closes the event channel
    drop(pager);
    let events = event_logger.await?;

    Ok(DemoSummary {
        item_count: snapshot.item_count,
        bounds: snapshot.bounds,
        page_bounds,
        fetches,
        events,
    })
}
