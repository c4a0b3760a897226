//! Load coordination for the message window.
//!
//! At most one fetch is in flight at any time. While one runs, new requests
//! queue in a single pending slot where the newest request wins. When the
//! in-flight fetch settles, the requester's ticket is resolved first and the
//! pending request (if any) is started as its own fetch for its own range.
//!
//! Fetches run on spawned Tokio tasks and report back over an internal
//! channel. The coordinator itself is a plain struct owned by whoever drives
//! it (normally the [`Pager`](crate::app::Pager)); completions are applied
//! with [`LoadCoordinator::complete`], so all state changes happen on the
//! owning context.

mod fetch;
mod ticket;

pub use ticket::LoadTicket;

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::PagerConfig;
use crate::error::{FetchError, PagerError, PagerResult};
use crate::models::{LoadPurpose, LoadRange, Message, PageBounds};
use crate::traits::MessageSource;

type Responder = oneshot::Sender<PagerResult<Vec<Message>>>;

/// How each fetch is run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchSettings {
    /// Give up on a fetch after this long
    pub timeout: Option<Duration>,
    /// Retry a transient failure once before reporting it
    pub retry_transient: bool,
    /// Resolve the queued request with an error when the in-flight fetch fails
    pub drop_pending_on_failure: bool,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(10)),
            retry_transient: false,
            drop_pending_on_failure: true,
        }
    }
}

impl FetchSettings {
    pub fn from_config(config: &PagerConfig) -> Self {
        Self {
            timeout: config.fetch_timeout(),
            retry_transient: config.retry_transient_failures,
            drop_pending_on_failure: config.drop_pending_on_failure,
        }
    }
}

/// Result of a fetch as reported by its worker task.
#[derive(Debug)]
pub struct FetchCompletion {
    generation: u64,
    range: LoadRange,
    result: PagerResult<Vec<Message>>,
}

impl FetchCompletion {
    pub fn range(&self) -> LoadRange {
        self.range
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// A request that sat in the pending slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuedLoad {
    pub range: LoadRange,
    pub purpose: LoadPurpose,
}

/// What happened to a request when it was submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    /// No fetch was running; this one started immediately
    Started,
    /// A fetch was running; this request now occupies the pending slot
    Queued {
        /// Earlier pending request this one replaced
        displaced: Option<QueuedLoad>,
    },
}

/// Handle returned for every request.
#[derive(Debug)]
pub struct LoadRequest {
    pub ticket: LoadTicket,
    pub status: RequestStatus,
}

/// An in-flight fetch that finished and has been applied.
#[derive(Debug)]
pub struct SettledLoad {
    pub range: LoadRange,
    pub purpose: LoadPurpose,
    pub outcome: PagerResult<Vec<Message>>,
    /// Pending request discarded because this fetch failed
    pub dropped: Option<QueuedLoad>,
    /// Pending request started as the next fetch
    pub follow_up: Option<QueuedLoad>,
}

#[derive(Debug)]
struct ActiveLoad {
    generation: u64,
    range: LoadRange,
    purpose: LoadPurpose,
    responder: Responder,
    task: JoinHandle<()>,
}

#[derive(Debug)]
struct PendingLoad {
    range: LoadRange,
    purpose: LoadPurpose,
    responder: Responder,
}

impl PendingLoad {
    fn queued(&self) -> QueuedLoad {
        QueuedLoad {
            range: self.range,
            purpose: self.purpose,
        }
    }
}

/// Serializes fetches against a [`MessageSource`].
///
/// Requests must be made from within a Tokio runtime, since starting a fetch
/// spawns a task.
pub struct LoadCoordinator {
    source: Arc<dyn MessageSource>,
    settings: FetchSettings,
    active: Option<ActiveLoad>,
    pending: Option<PendingLoad>,
    page_bounds: PageBounds,
    next_generation: u64,
    fetches_started: u64,
    completion_tx: mpsc::UnboundedSender<FetchCompletion>,
    completion_rx: mpsc::UnboundedReceiver<FetchCompletion>,
}

impl std::fmt::Debug for LoadCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadCoordinator")
            .field("settings", &self.settings)
            .field("active", &self.active_range())
            .field("pending", &self.pending_range())
            .field("page_bounds", &self.page_bounds)
            .field("fetches_started", &self.fetches_started)
            .finish()
    }
}

impl LoadCoordinator {
    pub fn new(source: Arc<dyn MessageSource>, settings: FetchSettings) -> Self {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        Self {
            source,
            settings,
            active: None,
            pending: None,
            page_bounds: PageBounds::default(),
            next_generation: 0,
            fetches_started: 0,
            completion_tx,
            completion_rx,
        }
    }

    /// Request `range`. Starts a fetch when idle, otherwise takes the pending
    /// slot and resolves any request it displaces with
    /// [`PagerError::Superseded`].
    pub fn request_range(&mut self, range: LoadRange, purpose: LoadPurpose) -> LoadRequest {
        let (responder, receiver) = oneshot::channel();
        let ticket = LoadTicket::new(range, receiver);

        if self.active.is_none() {
            self.start_fetch(range, purpose, responder);
            return LoadRequest {
                ticket,
                status: RequestStatus::Started,
            };
        }

        let replacement = PendingLoad {
            range,
            purpose,
            responder,
        };
        let displaced = self.pending.replace(replacement).map(|old| {
            let queued = old.queued();
            debug!(
                range = %old.range,
                purpose = %old.purpose,
                replaced_by = %range,
                "Pending load superseded"
            );
            let _ = old.responder.send(Err(PagerError::Superseded { range: old.range }));
            queued
        });

        debug!(range = %range, purpose = %purpose, "Load in flight, request queued");
        LoadRequest {
            ticket,
            status: RequestStatus::Queued { displaced },
        }
    }

    /// Request the inclusive id range `[start_id, end_id]`.
    pub fn request(
        &mut self,
        start_id: i64,
        end_id: i64,
        purpose: LoadPurpose,
    ) -> PagerResult<LoadRequest> {
        let range = LoadRange::new(start_id, end_id)?;
        Ok(self.request_range(range, purpose))
    }

    /// Request `count` ids starting at `start_id`.
    pub fn request_count(
        &mut self,
        start_id: i64,
        count: i64,
        purpose: LoadPurpose,
    ) -> PagerResult<LoadRequest> {
        let range = LoadRange::from_count(start_id, count)?;
        Ok(self.request_range(range, purpose))
    }

    fn start_fetch(&mut self, range: LoadRange, purpose: LoadPurpose, responder: Responder) {
        self.next_generation += 1;
        self.fetches_started += 1;
        let generation = self.next_generation;

        let source = Arc::clone(&self.source);
        let completion_tx = self.completion_tx.clone();
        let settings = self.settings;

        info!(range = %range, purpose = %purpose, generation, "Fetch started");

        let task = tokio::spawn(async move {
            let result = fetch::run(source.as_ref(), range, settings).await;
            // Receiver is gone only if the coordinator was dropped.
            let _ = completion_tx.send(FetchCompletion {
                generation,
                range,
                result,
            });
        });

        self.active = Some(ActiveLoad {
            generation,
            range,
            purpose,
            responder,
            task,
        });
    }

    /// Wait for the in-flight fetch to report. Returns `None` when idle.
    ///
    /// The completion must be handed to [`complete`](Self::complete).
    pub async fn next_completion(&mut self) -> Option<FetchCompletion> {
        let active = self.active.as_mut()?;
        let (generation, range) = (active.generation, active.range);
        let task = &mut active.task;
        let completion_rx = &mut self.completion_rx;

        let joined = tokio::select! {
            biased;
            completion = completion_rx.recv() => return completion,
            joined = task => joined,
        };

        match joined {
            Err(error) if error.is_panic() => {
                warn!(range = %range, generation, "Fetch task panicked");
                Some(FetchCompletion {
                    generation,
                    range,
                    result: Err(PagerError::Fetch {
                        range,
                        source: FetchError::Unreachable {
                            message: "fetch task panicked".to_string(),
                        },
                    }),
                })
            }
            // The task sends before it finishes, so the completion is queued.
            _ => self.completion_rx.recv().await,
        }
    }

    /// Apply a completion: clear the in-flight slot, resolve its ticket, then
    /// start or drop the pending request.
    ///
    /// Returns `None` for completions of fetches that were cancelled or
    /// already applied.
    pub fn complete(&mut self, completion: FetchCompletion) -> Option<SettledLoad> {
        let is_current = self
            .active
            .as_ref()
            .is_some_and(|active| active.generation == completion.generation);
        if !is_current {
            debug!(
                range = %completion.range,
                generation = completion.generation,
                "Ignoring stale fetch completion"
            );
            return None;
        }

        let active = self.active.take()?;
        let result = completion.result;

        match &result {
            Ok(batch) => info!(
                range = %active.range,
                purpose = %active.purpose,
                returned = batch.len(),
                "Fetch completed"
            ),
            Err(error) => warn!(
                range = %active.range,
                purpose = %active.purpose,
                error = %error,
                code = error.error_code(),
                "Fetch failed"
            ),
        }

        let _ = active.responder.send(result.clone());

        let mut dropped = None;
        let mut follow_up = None;
        if let Some(pending) = self.pending.take() {
            let queued = pending.queued();
            if result.is_err() && self.settings.drop_pending_on_failure {
                warn!(
                    range = %pending.range,
                    purpose = %pending.purpose,
                    "Dropping pending load after failed fetch"
                );
                let _ = pending
                    .responder
                    .send(Err(PagerError::PendingDropped { range: pending.range }));
                dropped = Some(queued);
            } else {
                self.start_fetch(pending.range, pending.purpose, pending.responder);
                follow_up = Some(queued);
            }
        }

        Some(SettledLoad {
            range: active.range,
            purpose: active.purpose,
            outcome: result,
            dropped,
            follow_up,
        })
    }

    /// Wait for the in-flight fetch and apply it, skipping stale completions.
    pub async fn settle_next(&mut self) -> Option<SettledLoad> {
        loop {
            let completion = self.next_completion().await?;
            if let Some(settled) = self.complete(completion) {
                return Some(settled);
            }
        }
    }

    /// Abort the in-flight fetch and drop the pending request. Both tickets
    /// resolve with [`PagerError::Cancelled`].
    pub fn cancel_all(&mut self) -> Vec<QueuedLoad> {
        let mut cancelled = Vec::new();

        if let Some(active) = self.active.take() {
            active.task.abort();
            let _ = active
                .responder
                .send(Err(PagerError::Cancelled { range: active.range }));
            cancelled.push(QueuedLoad {
                range: active.range,
                purpose: active.purpose,
            });
        }
        if let Some(pending) = self.pending.take() {
            cancelled.push(pending.queued());
            let _ = pending
                .responder
                .send(Err(PagerError::Cancelled { range: pending.range }));
        }

        if !cancelled.is_empty() {
            info!(count = cancelled.len(), "Cancelled loads");
        }
        cancelled
    }

    pub fn is_loading(&self) -> bool {
        self.active.is_some()
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_none() && self.pending.is_none()
    }

    pub fn active_range(&self) -> Option<LoadRange> {
        self.active.as_ref().map(|active| active.range)
    }

    pub fn active_purpose(&self) -> Option<LoadPurpose> {
        self.active.as_ref().map(|active| active.purpose)
    }

    pub fn pending_range(&self) -> Option<LoadRange> {
        self.pending.as_ref().map(|pending| pending.range)
    }

    pub fn pending_purpose(&self) -> Option<LoadPurpose> {
        self.pending.as_ref().map(|pending| pending.purpose)
    }

    /// Whether `range` is already running or queued.
    pub fn is_requested(&self, range: LoadRange) -> bool {
        self.active_range() == Some(range) || self.pending_range() == Some(range)
    }

    /// Last recorded page bounds.
    pub fn page_bounds(&self) -> PageBounds {
        self.page_bounds
    }

    pub fn set_page_bounds(&mut self, bounds: PageBounds) {
        if bounds != self.page_bounds {
            debug!(
                lower = bounds.lower_page,
                upper = bounds.upper_page,
                "Page bounds updated"
            );
        }
        self.page_bounds = bounds;
    }

    /// Total fetches started since creation.
    pub fn fetches_started(&self) -> u64 {
        self.fetches_started
    }

    pub fn settings(&self) -> FetchSettings {
        self.settings
    }
}

impl Drop for LoadCoordinator {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::MockMessageSource;

    fn range(start: i64, end: i64) -> LoadRange {
        LoadRange::new(start, end).unwrap()
    }

    fn coordinator(source: &MockMessageSource) -> LoadCoordinator {
        coordinator_with(source, FetchSettings::default())
    }

    fn coordinator_with(source: &MockMessageSource, settings: FetchSettings) -> LoadCoordinator {
        LoadCoordinator::new(Arc::new(source.clone()), settings)
    }

    #[tokio::test]
    async fn test_idle_request_starts_immediately() {
        let source = MockMessageSource::new();
        let mut coordinator = coordinator(&source);
        assert!(coordinator.is_idle());

        let request = coordinator.request_range(range(1, 20), LoadPurpose::Initial);
        assert_eq!(request.status, RequestStatus::Started);
        assert_eq!(coordinator.active_range(), Some(range(1, 20)));
        assert_eq!(coordinator.active_purpose(), Some(LoadPurpose::Initial));

        let settled = coordinator.settle_next().await.unwrap();
        assert_eq!(settled.range, range(1, 20));
        assert_eq!(settled.outcome.unwrap().len(), 20);
        assert!(coordinator.is_idle());
        assert_eq!(request.ticket.await.unwrap().len(), 20);
    }

    #[tokio::test]
    async fn test_single_flight_with_queued_follow_up() {
        let source = MockMessageSource::new();
        source.hold();
        let mut coordinator = coordinator(&source);

        let first = coordinator.request_range(range(1, 20), LoadPurpose::Initial);
        let second = coordinator.request_range(range(21, 40), LoadPurpose::Append);
        assert_eq!(first.status, RequestStatus::Started);
        assert_eq!(second.status, RequestStatus::Queued { displaced: None });

        source.wait_for_requests(1).await;
        assert_eq!(source.request_count(), 1);
        assert!(coordinator.is_loading());
        assert_eq!(coordinator.pending_range(), Some(range(21, 40)));

        source.release(1);
        let settled = coordinator.settle_next().await.unwrap();
        assert_eq!(settled.range, range(1, 20));
        assert_eq!(
            settled.follow_up,
            Some(QueuedLoad {
                range: range(21, 40),
                purpose: LoadPurpose::Append,
            })
        );
        assert_eq!(coordinator.active_range(), Some(range(21, 40)));
        assert!(coordinator.pending_range().is_none());

        source.release(1);
        let settled = coordinator.settle_next().await.unwrap();
        assert_eq!(settled.range, range(21, 40));
        assert!(coordinator.is_idle());

        assert_eq!(first.ticket.await.unwrap().len(), 20);
        let second_batch = second.ticket.await.unwrap();
        assert_eq!(second_batch.first().map(|m| m.id), Some(21));
        assert_eq!(second_batch.last().map(|m| m.id), Some(40));

        assert_eq!(source.request_count(), 2);
        assert_eq!(source.max_in_flight(), 1);
        assert_eq!(coordinator.fetches_started(), 2);
    }

    #[tokio::test]
    async fn test_newest_pending_request_wins() {
        let source = MockMessageSource::new();
        source.hold();
        let mut coordinator = coordinator(&source);

        let _first = coordinator.request_range(range(1, 20), LoadPurpose::Initial);
        let second = coordinator.request_range(range(21, 40), LoadPurpose::Append);
        let third = coordinator.request_range(range(41, 60), LoadPurpose::Append);

        assert_eq!(
            third.status,
            RequestStatus::Queued {
                displaced: Some(QueuedLoad {
                    range: range(21, 40),
                    purpose: LoadPurpose::Append,
                })
            }
        );
        assert!(matches!(
            second.ticket.await,
            Err(PagerError::Superseded { range: r }) if r == range(21, 40)
        ));

        source.open();
        coordinator.settle_next().await.unwrap();
        let settled = coordinator.settle_next().await.unwrap();
        assert_eq!(settled.range, range(41, 60));
        assert_eq!(third.ticket.await.unwrap().len(), 20);

        let starts: Vec<i64> = source.requests().iter().map(|r| r.start_id).collect();
        assert_eq!(starts, vec![1, 41]);
    }

    #[tokio::test]
    async fn test_failure_drops_pending_request() {
        let source = MockMessageSource::new();
        source.hold();
        source.fail_next(FetchError::Unreachable {
            message: "offline".into(),
        });
        let mut coordinator = coordinator(&source);

        let first = coordinator.request_range(range(1, 20), LoadPurpose::Initial);
        let second = coordinator.request_range(range(21, 40), LoadPurpose::Append);

        source.open();
        let settled = coordinator.settle_next().await.unwrap();
        assert!(matches!(settled.outcome, Err(PagerError::Fetch { .. })));
        assert_eq!(settled.dropped.map(|q| q.range), Some(range(21, 40)));
        assert!(settled.follow_up.is_none());
        assert!(coordinator.is_idle());

        assert!(first.ticket.await.is_err());
        assert!(matches!(
            second.ticket.await,
            Err(PagerError::PendingDropped { .. })
        ));
        assert_eq!(source.request_count(), 1);

        // Recovers on the next request
        let retry = coordinator.request_range(range(1, 20), LoadPurpose::Initial);
        coordinator.settle_next().await.unwrap();
        assert_eq!(retry.ticket.await.unwrap().len(), 20);
    }

    #[tokio::test]
    async fn test_failure_keeps_pending_when_configured() {
        let source = MockMessageSource::new();
        source.hold();
        source.fail_next(FetchError::Cancelled);
        let settings = FetchSettings {
            drop_pending_on_failure: false,
            ..FetchSettings::default()
        };
        let mut coordinator = coordinator_with(&source, settings);

        let _first = coordinator.request_range(range(1, 20), LoadPurpose::Initial);
        let second = coordinator.request_range(range(21, 40), LoadPurpose::Append);

        source.open();
        let settled = coordinator.settle_next().await.unwrap();
        assert!(settled.outcome.is_err());
        assert_eq!(settled.follow_up.map(|q| q.range), Some(range(21, 40)));

        coordinator.settle_next().await.unwrap();
        assert_eq!(second.ticket.await.unwrap().len(), 20);
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let source = MockMessageSource::new();
        source.hold();
        let settings = FetchSettings {
            timeout: Some(Duration::from_millis(20)),
            ..FetchSettings::default()
        };
        let mut coordinator = coordinator_with(&source, settings);

        let request = coordinator.request_range(range(1, 20), LoadPurpose::Initial);
        let settled = coordinator.settle_next().await.unwrap();
        assert!(matches!(
            settled.outcome,
            Err(PagerError::Timeout { timeout_ms: 20, .. })
        ));
        assert!(request.ticket.await.unwrap_err().is_retryable());
        assert_eq!(source.in_flight(), 0);

        source.open();
        let request = coordinator.request_range(range(1, 20), LoadPurpose::Initial);
        coordinator.settle_next().await.unwrap();
        assert_eq!(request.ticket.await.unwrap().len(), 20);
    }

    #[tokio::test]
    async fn test_retries_transient_failure_once() {
        let source = MockMessageSource::new();
        source.fail_next(FetchError::Unreachable {
            message: "blip".into(),
        });
        let settings = FetchSettings {
            retry_transient: true,
            ..FetchSettings::default()
        };
        let mut coordinator = coordinator_with(&source, settings);

        let request = coordinator.request_range(range(1, 5), LoadPurpose::Initial);
        let settled = coordinator.settle_next().await.unwrap();
        assert!(settled.outcome.is_ok());
        assert_eq!(request.ticket.await.unwrap().len(), 5);
        assert_eq!(source.request_count(), 2);
        assert_eq!(coordinator.fetches_started(), 1);
    }

    #[tokio::test]
    async fn test_permanent_failure_not_retried() {
        let source = MockMessageSource::new();
        source.fail_next(FetchError::Malformed {
            message: "garbage".into(),
        });
        let settings = FetchSettings {
            retry_transient: true,
            ..FetchSettings::default()
        };
        let mut coordinator = coordinator_with(&source, settings);

        coordinator.request_range(range(1, 5), LoadPurpose::Initial);
        let settled = coordinator.settle_next().await.unwrap();
        assert!(settled.outcome.is_err());
        assert_eq!(source.request_count(), 1);
    }

    #[tokio::test]
    async fn test_malformed_batch_rejected() {
        let source = MockMessageSource::new();
        source.respond_next(vec![Message::new(500, "stray")]);
        let mut coordinator = coordinator(&source);

        coordinator.request_range(range(1, 20), LoadPurpose::Initial);
        let settled = coordinator.settle_next().await.unwrap();
        assert!(matches!(
            settled.outcome,
            Err(PagerError::Fetch {
                source: FetchError::Malformed { .. },
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_cancel_all_resolves_tickets() {
        let source = MockMessageSource::new();
        source.hold();
        let mut coordinator = coordinator(&source);

        let first = coordinator.request_range(range(1, 20), LoadPurpose::Initial);
        let second = coordinator.request_range(range(21, 40), LoadPurpose::Append);
        source.wait_for_requests(1).await;

        let cancelled = coordinator.cancel_all();
        assert_eq!(cancelled.len(), 2);
        assert!(coordinator.is_idle());
        assert!(coordinator.next_completion().await.is_none());

        assert!(matches!(first.ticket.await, Err(PagerError::Cancelled { .. })));
        assert!(matches!(second.ticket.await, Err(PagerError::Cancelled { .. })));
        assert_eq!(source.request_count(), 1);
    }

    #[tokio::test]
    async fn test_stale_completion_ignored() {
        let source = MockMessageSource::new();
        source.hold();
        let mut coordinator = coordinator(&source);

        coordinator.request_range(range(1, 20), LoadPurpose::Initial);
        let stale = FetchCompletion {
            generation: 999,
            range: range(1, 20),
            result: Ok(Vec::new()),
        };
        assert!(coordinator.complete(stale).is_none());
        assert!(coordinator.is_loading());

        source.open();
        assert!(coordinator.settle_next().await.is_some());
    }

    #[tokio::test]
    async fn test_invalid_request_rejected() {
        let source = MockMessageSource::new();
        let mut coordinator = coordinator(&source);

        assert!(matches!(
            coordinator.request(10, 5, LoadPurpose::Append),
            Err(PagerError::InvalidRange { start: 10, end: 5 })
        ));
        assert!(matches!(
            coordinator.request_count(1, 0, LoadPurpose::Append),
            Err(PagerError::InvalidCount { count: 0 })
        ));
        assert!(coordinator.is_idle());
        assert_eq!(source.request_count(), 0);
    }

    #[tokio::test]
    async fn test_is_requested_and_page_bounds() {
        let source = MockMessageSource::new();
        source.hold();
        let mut coordinator = coordinator(&source);

        coordinator.request_range(range(1, 20), LoadPurpose::Initial);
        coordinator.request_range(range(21, 40), LoadPurpose::Append);
        assert!(coordinator.is_requested(range(1, 20)));
        assert!(coordinator.is_requested(range(21, 40)));
        assert!(!coordinator.is_requested(range(41, 60)));

        coordinator.set_page_bounds(PageBounds::new(0, 2));
        assert_eq!(coordinator.page_bounds(), PageBounds::new(0, 2));
        coordinator.cancel_all();
    }
}
