//! Handle to the result of a requested load.

use futures::future::FusedFuture;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

use crate::error::{PagerError, PagerResult};
use crate::models::{LoadRange, Message};

/// Resolves exactly once with the messages for the requested range, or the
/// reason the load did not happen.
///
/// Dropping a ticket does not cancel the load; the coordinator still fetches
/// and the engine still merges.
///
/// Implements [`FusedFuture`], so it can sit in a `futures::select!` loop.
#[derive(Debug)]
pub struct LoadTicket {
    range: LoadRange,
    receiver: oneshot::Receiver<PagerResult<Vec<Message>>>,
    resolved: bool,
}

impl LoadTicket {
    pub(crate) fn new(
        range: LoadRange,
        receiver: oneshot::Receiver<PagerResult<Vec<Message>>>,
    ) -> Self {
        Self {
            range,
            receiver,
            resolved: false,
        }
    }

    /// Range this ticket was issued for.
    pub fn range(&self) -> LoadRange {
        self.range
    }

    /// Take the result if it has already arrived.
    pub fn try_take(&mut self) -> Option<PagerResult<Vec<Message>>> {
        if self.resolved {
            return None;
        }
        let taken = match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(Err(PagerError::Disconnected { range: self.range })),
        };
        self.resolved = taken.is_some();
        taken
    }
}

impl Future for LoadTicket {
    type Output = PagerResult<Vec<Message>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let range = self.range;
        let polled = Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(PagerError::Disconnected { range })));
        if polled.is_ready() {
            self.resolved = true;
        }
        polled
    }
}

impl FusedFuture for LoadTicket {
    fn is_terminated(&self) -> bool {
        self.resolved
    }
}
