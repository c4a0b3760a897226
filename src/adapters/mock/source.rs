//! Mock message source for testing.
//!
//! Records every fetch, tracks how many run at once, and can hold fetches in
//! flight or fail them on demand.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{watch, Semaphore};

use crate::adapters::synthetic::generate;
use crate::error::FetchError;
use crate::models::{LoadRange, Message};
use crate::traits::MessageSource;

/// A recorded fetch for verification in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedFetch {
    pub start_id: i64,
    pub count: i64,
}

impl RecordedFetch {
    /// Last id the fetch asked for.
    pub fn end_id(&self) -> i64 {
        self.start_id + self.count - 1
    }
}

/// Scripted result for the next fetch.
#[derive(Debug, Clone)]
pub enum MockFetch {
    /// Fail with this error
    Fail(FetchError),
    /// Return exactly these messages
    Respond(Vec<Message>),
}

#[derive(Debug)]
struct MockState {
    requests: Mutex<Vec<RecordedFetch>>,
    scripted: Mutex<VecDeque<MockFetch>>,
    available: Mutex<Option<LoadRange>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    started_tx: watch::Sender<usize>,
}

/// Mock message source.
///
/// Clones share state, so a test can keep one handle and give another to
/// the coordinator.
///
/// # Example
///
/// ```
/// use chat_pager::adapters::mock::MockMessageSource;
/// use chat_pager::error::FetchError;
/// use chat_pager::traits::MessageSource;
///
/// let runtime = tokio::runtime::Runtime::new().unwrap();
/// let source = MockMessageSource::new();
/// source.fail_next(FetchError::Unreachable { message: "offline".into() });
///
/// assert!(runtime.block_on(source.fetch(1, 5)).is_err());
/// assert_eq!(runtime.block_on(source.fetch(1, 5)).unwrap().len(), 5);
/// assert_eq!(source.request_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct MockMessageSource {
    state: Arc<MockState>,
}

impl MockMessageSource {
    pub fn new() -> Self {
        let (started_tx, _) = watch::channel(0);
        Self {
            state: Arc::new(MockState {
                requests: Mutex::new(Vec::new()),
                scripted: Mutex::new(VecDeque::new()),
                available: Mutex::new(None),
                gate: Mutex::new(None),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                started_tx,
            }),
        }
    }

    /// Only produce ids inside `range`.
    pub fn with_available(self, range: LoadRange) -> Self {
        *self.state.available.lock().unwrap() = Some(range);
        self
    }

    /// Fail the next unscripted fetch with `error`.
    pub fn fail_next(&self, error: FetchError) {
        self.state
            .scripted
            .lock()
            .unwrap()
            .push_back(MockFetch::Fail(error));
    }

    /// Answer the next fetch with `messages` regardless of the request.
    pub fn respond_next(&self, messages: Vec<Message>) {
        self.state
            .scripted
            .lock()
            .unwrap()
            .push_back(MockFetch::Respond(messages));
    }

    /// Hold every subsequent fetch until [`release`](Self::release) is called.
    pub fn hold(&self) {
        *self.state.gate.lock().unwrap() = Some(Arc::new(Semaphore::new(0)));
    }

    /// Let `n` held fetches proceed.
    pub fn release(&self, n: usize) {
        if let Some(gate) = self.state.gate.lock().unwrap().as_ref() {
            gate.add_permits(n);
        }
    }

    /// Stop holding fetches and let any waiting ones through.
    pub fn open(&self) {
        if let Some(gate) = self.state.gate.lock().unwrap().take() {
            gate.add_permits(Semaphore::MAX_PERMITS / 2);
        }
    }

    /// Get all recorded fetches.
    pub fn requests(&self) -> Vec<RecordedFetch> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.lock().unwrap().len()
    }

    /// Fetches currently executing.
    pub fn in_flight(&self) -> usize {
        self.state.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of fetches ever executing at once.
    pub fn max_in_flight(&self) -> usize {
        self.state.max_in_flight.load(Ordering::SeqCst)
    }

    /// Wait until at least `n` fetches have started.
    pub async fn wait_for_requests(&self, n: usize) {
        let mut rx = self.state.started_tx.subscribe();
        let _ = rx.wait_for(|started| *started >= n).await;
    }

    fn record(&self, start_id: i64, count: i64) {
        let total = {
            let mut requests = self.state.requests.lock().unwrap();
            requests.push(RecordedFetch { start_id, count });
            requests.len()
        };
        let now = self.state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.state.started_tx.send_replace(total);
    }
}

impl Default for MockMessageSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Decrements the in-flight counter even when the fetch is aborted.
struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl MessageSource for MockMessageSource {
    async fn fetch(&self, start_id: i64, count: i64) -> Result<Vec<Message>, FetchError> {
        self.record(start_id, count);
        let _guard = InFlightGuard(&self.state.in_flight);

        let gate = self.state.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            match gate.acquire().await {
                Ok(permit) => permit.forget(),
                Err(_) => return Err(FetchError::Cancelled),
            }
        }

        let scripted = self.state.scripted.lock().unwrap().pop_front();
        match scripted {
            Some(MockFetch::Fail(error)) => Err(error),
            Some(MockFetch::Respond(messages)) => Ok(messages),
            None => {
                let mut batch = generate(start_id, count);
                if let Some(available) = *self.state.available.lock().unwrap() {
                    batch.retain(|message| available.contains(message.id));
                }
                Ok(batch)
            }
        }
    }
}
