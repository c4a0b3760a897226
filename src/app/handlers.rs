//! Signal and completion handling for the Pager.

use tracing::{debug, info, warn};

use super::{Pager, PagerEvent, SignalOutcome, ViewportSignal};
use crate::coordinator::{QueuedLoad, RequestStatus, SettledLoad};
use crate::domain::{NavigationOutcome, WindowBounds};
use crate::error::PagerResult;
use crate::models::{LoadPurpose, LoadRange, PageBounds};

impl Pager {
    /// Handle a viewport signal.
    pub fn handle_signal(&mut self, signal: ViewportSignal) -> PagerResult<SignalOutcome> {
        debug!(signal = ?signal, "Viewport signal");
        match signal {
            ViewportSignal::NearBottom(visible_max) => self.load_after(visible_max),
            ViewportSignal::NearTop(visible_min) => Ok(self.load_before(visible_min)),
            ViewportSignal::JumpRequested(target_id) => Ok(self.jump_to(target_id)),
        }
    }

    /// Load the next page below the run containing `anchor`.
    ///
    /// An empty window falls back to the initial page.
    pub fn load_after(&mut self, anchor: Option<i64>) -> PagerResult<SignalOutcome> {
        if self.window.is_empty() {
            return self.request_initial();
        }

        match self
            .window
            .next_page_after(anchor, self.config.pagination_load_count)
        {
            Some(range) => Ok(self.submit(range, LoadPurpose::Append)),
            None => Ok(SignalOutcome::NothingToLoad),
        }
    }

    /// Load the page above the run containing `anchor`, never below the
    /// configured minimum id.
    pub fn load_before(&mut self, anchor: Option<i64>) -> SignalOutcome {
        let range = self.window.next_page_before(
            anchor,
            self.config.pagination_load_count,
            self.config.min_message_id,
        );
        match range {
            Some(range) => self.submit(range, LoadPurpose::Prepend),
            None => {
                debug!(anchor = ?anchor, "Nothing left to load above");
                SignalOutcome::NothingToLoad
            }
        }
    }

    pub(super) fn request_initial(&mut self) -> PagerResult<SignalOutcome> {
        let range = LoadRange::from_count(1, self.config.initial_load_count)?;
        Ok(self.submit(range, LoadPurpose::Initial))
    }

    /// Hand `range` to the coordinator unless it is already running or queued.
    pub(super) fn submit(&mut self, range: LoadRange, purpose: LoadPurpose) -> SignalOutcome {
        if self.coordinator.is_requested(range) {
            debug!(range = %range, purpose = %purpose, "Range already requested");
            return SignalOutcome::AlreadyRequested(range);
        }

        // Completions are applied from the coordinator, not the ticket.
        let request = self.coordinator.request_range(range, purpose);

        if let RequestStatus::Queued {
            displaced: Some(displaced),
        } = request.status
        {
            self.on_displaced(displaced);
        }
        self.emit(PagerEvent::LoadRequested {
            range,
            purpose,
            queued: request.status != RequestStatus::Started,
        });

        SignalOutcome::Requested {
            range,
            status: request.status,
        }
    }

    fn on_displaced(&mut self, displaced: QueuedLoad) {
        if let Some(target_id) = displaced.purpose.jump_target() {
            self.resolver.abandon(target_id);
        }
        self.emit(PagerEvent::RequestSuperseded {
            range: displaced.range,
            purpose: displaced.purpose,
        });
    }

    /// Apply a settled load: merge, notify, record page bounds, and finish
    /// any jump that was waiting on it.
    pub fn handle_settled(&mut self, settled: SettledLoad) {
        if let Some(dropped) = settled.dropped {
            if let Some(target_id) = dropped.purpose.jump_target() {
                self.resolver.abandon(target_id);
            }
            self.emit(PagerEvent::RequestDropped {
                range: dropped.range,
                purpose: dropped.purpose,
            });
        }

        let SettledLoad {
            range,
            purpose,
            outcome,
            ..
        } = settled;

        let batch = match outcome {
            Ok(batch) => batch,
            Err(e) => {
                warn!(range = %range, purpose = %purpose, error = %e, "Load failed");
                if let Some(target_id) = purpose.jump_target() {
                    self.resolver.abandon(target_id);
                }
                self.emit(PagerEvent::load_failed(range, purpose, &e));
                return;
            }
        };

        let summary = self.window.merge(batch, purpose.direction());
        let snapshot = self.window.snapshot();
        info!(
            range = %range,
            purpose = %purpose,
            inserted = summary.inserted,
            replaced = summary.replaced,
            items = snapshot.item_count,
            "Window merged"
        );
        self.presentation.on_window_changed(&snapshot);
        self.emit(PagerEvent::WindowChanged(snapshot));

        match purpose {
            LoadPurpose::Initial => self.coordinator.set_page_bounds(PageBounds::new(0, 1)),
            LoadPurpose::Append | LoadPurpose::Prepend => {
                if let WindowBounds::Loaded { min, max } = snapshot.bounds {
                    if let Ok(loaded) = LoadRange::new(min, max) {
                        self.coordinator
                            .set_page_bounds(PageBounds::from_range(loaded, self.config.page_size));
                    }
                }
            }
            LoadPurpose::Jump { target_id } => {
                self.coordinator
                    .set_page_bounds(self.resolver.page_bounds_for(range));
                self.finish_jump(target_id, range);
            }
        }
    }

    fn finish_jump(&mut self, target_id: i64, range: LoadRange) {
        if self.resolver.pending_target() != Some(target_id) {
            debug!(target_id, "Jump replaced by a newer target, not scrolling");
            return;
        }

        match self.resolver.settle(target_id, range, &self.window) {
            NavigationOutcome::Scrolled(instruction) => self.scroll_to(instruction),
            NavigationOutcome::Miss { target_id, range } => {
                info!(target_id, range = %range, "Navigation miss: target not in loaded range");
                self.emit(PagerEvent::NavigationMiss {
                    target_id,
                    range: Some(range),
                });
            }
        }
    }
}
