//! The pagination engine.
//!
//! [`Pager`] is the coordinating context: it owns the [`MessageWindow`],
//! the [`LoadCoordinator`] and the [`NavigationResolver`], turns viewport
//! signals into load requests, and applies fetch completions one at a time.
//!
//! - [`ViewportSignal`] - Input from the presentation layer
//! - [`SignalOutcome`] - What the pager did with a signal
//! - [`PagerEvent`] - Observable events, published over an `mpsc` channel

mod handlers;
mod messages;
mod navigation;

pub use messages::{PagerEvent, SignalOutcome, ViewportSignal};

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::config::PagerConfig;
use crate::coordinator::{FetchSettings, LoadCoordinator};
use crate::domain::{MessageWindow, NavigationResolver};
use crate::error::PagerResult;
use crate::models::PageBounds;
use crate::traits::{MessageSource, Presentation};

/// Windowed pagination engine.
pub struct Pager {
    config: PagerConfig,
    window: MessageWindow,
    coordinator: LoadCoordinator,
    resolver: NavigationResolver,
    presentation: Box<dyn Presentation>,
    event_tx: Option<mpsc::UnboundedSender<PagerEvent>>,
}

impl std::fmt::Debug for Pager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pager")
            .field("config", &self.config)
            .field("window", &self.window.snapshot())
            .field("coordinator", &self.coordinator)
            .field("resolver", &self.resolver)
            .finish()
    }
}

impl Pager {
    /// Create a pager over `source`, reporting to `presentation`.
    ///
    /// Fails if `config` does not validate.
    pub fn new(
        config: PagerConfig,
        source: Arc<dyn MessageSource>,
        presentation: Box<dyn Presentation>,
    ) -> PagerResult<Self> {
        config.validate()?;

        let coordinator = LoadCoordinator::new(source, FetchSettings::from_config(&config));
        let resolver = NavigationResolver::from_config(&config);

        Ok(Self {
            config,
            window: MessageWindow::new(),
            coordinator,
            resolver,
            presentation,
            event_tx: None,
        })
    }

    /// Publish [`PagerEvent`]s on `tx`.
    pub fn with_event_sender(mut self, tx: mpsc::UnboundedSender<PagerEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    pub fn config(&self) -> &PagerConfig {
        &self.config
    }

    pub fn window(&self) -> &MessageWindow {
        &self.window
    }

    pub fn coordinator(&self) -> &LoadCoordinator {
        &self.coordinator
    }

    pub fn resolver(&self) -> &NavigationResolver {
        &self.resolver
    }

    pub fn page_bounds(&self) -> PageBounds {
        self.coordinator.page_bounds()
    }

    /// True when no fetch is running or queued.
    pub fn is_idle(&self) -> bool {
        self.coordinator.is_idle()
    }

    /// Request the first page, `[1, initial_load_count]`.
    pub fn start(&mut self) -> PagerResult<SignalOutcome> {
        self.request_initial()
    }

    /// Apply completions until nothing is running or queued.
    pub async fn drain(&mut self) {
        while let Some(settled) = self.coordinator.settle_next().await {
            self.handle_settled(settled);
        }
    }

    /// Process viewport signals and fetch completions until the signal
    /// channel closes, then finish outstanding loads.
    pub async fn run(&mut self, mut signals: mpsc::UnboundedReceiver<ViewportSignal>) {
        tracing::info!("Pager loop started");

        loop {
            tokio::select! {
                signal = signals.recv() => match signal {
                    Some(signal) => {
                        if let Err(e) = self.handle_signal(signal) {
                            tracing::warn!(error = %e, "Viewport signal rejected");
                        }
                    }
                    None => break,
                },
                Some(completion) = self.coordinator.next_completion() => {
                    if let Some(settled) = self.coordinator.complete(completion) {
                        self.handle_settled(settled);
                    }
                }
            }
        }

        self.drain().await;
        tracing::info!(items = self.window.item_count(), "Pager loop finished");
    }

    /// Cancel the running and queued loads.
    pub fn cancel_loads(&mut self) {
        for cancelled in self.coordinator.cancel_all() {
            if let Some(target_id) = cancelled.purpose.jump_target() {
                self.resolver.abandon(target_id);
            }
            self.emit(PagerEvent::LoadCancelled {
                range: cancelled.range,
                purpose: cancelled.purpose,
            });
        }
    }

    fn emit(&self, event: PagerEvent) {
        if let Some(tx) = &self.event_tx {
            // Nobody listening is fine
            let _ = tx.send(event);
        }
    }
}
