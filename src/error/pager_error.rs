//! Unified error type for the pager.
//!
//! Every failure a caller can observe travels as a `PagerError`, over the
//! same channel that carries successful results.

use thiserror::Error;

use super::category::ErrorCategory;
use super::fetch::FetchError;
use crate::models::LoadRange;

/// Unified error type for pagination operations.
#[derive(Debug, Clone, Error)]
pub enum PagerError {
    /// Range end lies before its start. Rejected before any fetch.
    #[error("invalid range [{start}, {end}]: end is before start")]
    InvalidRange { start: i64, end: i64 },

    /// Non-positive message count. Rejected before any fetch.
    #[error("invalid count {count}: must be positive")]
    InvalidCount { count: i64 },

    /// The message source failed to produce the range.
    #[error("fetch of {range} failed: {source}")]
    Fetch {
        range: LoadRange,
        #[source]
        source: FetchError,
    },

    /// The fetch did not finish within the configured limit.
    #[error("fetch of {range} timed out after {timeout_ms}ms")]
    Timeout { range: LoadRange, timeout_ms: u64 },

    /// The load was cancelled before it resolved.
    #[error("load of {range} was cancelled")]
    Cancelled { range: LoadRange },

    /// A queued load was replaced by a newer request before it started.
    #[error("queued load of {range} was replaced by a newer request")]
    Superseded { range: LoadRange },

    /// A queued load was dropped because the fetch ahead of it failed.
    #[error("queued load of {range} was dropped after the previous fetch failed")]
    PendingDropped { range: LoadRange },

    /// The coordinator went away before answering.
    #[error("coordinator shut down before {range} resolved")]
    Disconnected { range: LoadRange },

    /// Configuration value out of range.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl PagerError {
    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            PagerError::InvalidRange { .. } | PagerError::InvalidCount { .. } => {
                ErrorCategory::Client
            }
            PagerError::Fetch { source, .. } => source.category(),
            PagerError::Timeout { .. } => ErrorCategory::Network,
            PagerError::Cancelled { .. }
            | PagerError::Superseded { .. }
            | PagerError::PendingDropped { .. }
            | PagerError::Disconnected { .. } => ErrorCategory::Cancelled,
            PagerError::Config(_) => ErrorCategory::User,
        }
    }

    /// Check if the failed load can be retried as-is.
    pub fn is_retryable(&self) -> bool {
        match self {
            PagerError::Fetch { source, .. } => source.is_retryable(),
            PagerError::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            PagerError::InvalidRange { .. } => "E_PAGER_RANGE",
            PagerError::InvalidCount { .. } => "E_PAGER_COUNT",
            PagerError::Fetch { source, .. } => source.error_code(),
            PagerError::Timeout { .. } => "E_PAGER_TIMEOUT",
            PagerError::Cancelled { .. } => "E_PAGER_CANCEL",
            PagerError::Superseded { .. } => "E_PAGER_SUPERSEDED",
            PagerError::PendingDropped { .. } => "E_PAGER_DROPPED",
            PagerError::Disconnected { .. } => "E_PAGER_DISCONNECTED",
            PagerError::Config(_) => "E_PAGER_CONFIG",
        }
    }

    /// Range the failed load covered, when there is one.
    pub fn range(&self) -> Option<LoadRange> {
        match self {
            PagerError::Fetch { range, .. }
            | PagerError::Timeout { range, .. }
            | PagerError::Cancelled { range }
            | PagerError::Superseded { range }
            | PagerError::PendingDropped { range }
            | PagerError::Disconnected { range } => Some(*range),
            _ => None,
        }
    }
}
