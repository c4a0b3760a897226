//! Messages flowing into and out of the [`Pager`](super::Pager).

use serde::Serialize;

use crate::coordinator::RequestStatus;
use crate::domain::{ScrollInstruction, WindowSnapshot};
use crate::error::PagerError;
use crate::models::{LoadPurpose, LoadRange};

/// Viewport input forwarded by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportSignal {
    /// The bottom edge came close; carries the largest visible id if known
    NearBottom(Option<i64>),
    /// The top edge came close; carries the smallest visible id if known
    NearTop(Option<i64>),
    /// The user asked to jump to a message
    JumpRequested(i64),
}

/// What the pager did with a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalOutcome {
    /// A load for `range` was started or queued
    Requested {
        range: LoadRange,
        status: RequestStatus,
    },
    /// The same range is already running or queued
    AlreadyRequested(LoadRange),
    /// Jump target was loaded; scrolled immediately
    Scrolled(ScrollInstruction),
    /// Nothing left to load in that direction
    NothingToLoad,
    /// Jump target can never be loaded
    Unreachable { target_id: i64 },
}

/// Observable events published by the pager.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PagerEvent {
    /// A fetch started or a request was queued behind one
    LoadRequested {
        range: LoadRange,
        purpose: LoadPurpose,
        queued: bool,
    },
    /// A batch was merged and the presentation told to redraw
    WindowChanged(WindowSnapshot),
    /// The presentation was told to scroll
    ScrollTo(ScrollInstruction),
    /// A jump finished without its target present
    NavigationMiss {
        target_id: i64,
        range: Option<LoadRange>,
    },
    /// A fetch failed; the window is unchanged
    LoadFailed {
        range: LoadRange,
        purpose: LoadPurpose,
        code: &'static str,
        message: String,
    },
    /// A queued request was replaced by a newer one
    RequestSuperseded { range: LoadRange, purpose: LoadPurpose },
    /// A queued request was discarded after the fetch ahead of it failed
    RequestDropped { range: LoadRange, purpose: LoadPurpose },
    /// A load was cancelled before it completed
    LoadCancelled { range: LoadRange, purpose: LoadPurpose },
}

impl PagerEvent {
    pub(crate) fn load_failed(range: LoadRange, purpose: LoadPurpose, error: &PagerError) -> Self {
        PagerEvent::LoadFailed {
            range,
            purpose,
            code: error.error_code(),
            message: error.to_string(),
        }
    }

    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            PagerEvent::LoadRequested { .. } => "load_requested",
            PagerEvent::WindowChanged(_) => "window_changed",
            PagerEvent::ScrollTo(_) => "scroll_to",
            PagerEvent::NavigationMiss { .. } => "navigation_miss",
            PagerEvent::LoadFailed { .. } => "load_failed",
            PagerEvent::RequestSuperseded { .. } => "request_superseded",
            PagerEvent::RequestDropped { .. } => "request_dropped",
            PagerEvent::LoadCancelled { .. } => "load_cancelled",
        }
    }
}
