//! Message source error types.
//!
//! These are the errors a [`MessageSource`](crate::traits::MessageSource)
//! reports for a single fetch. The coordinator wraps them in
//! [`PagerError::Fetch`](super::PagerError::Fetch) together with the range.

use std::fmt;

use super::category::ErrorCategory;

/// Source-level fetch failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The source could not be reached.
    Unreachable { message: String },

    /// The source gave up waiting on its backend.
    Timeout { duration_ms: u64 },

    /// The source answered with data that does not fit the request.
    Malformed { message: String },

    /// The backend returned an error status.
    Backend { status: u16, message: String },

    /// The fetch was cancelled before it produced a result.
    Cancelled,
}

impl FetchError {
    /// Check if this error is likely transient and can be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Unreachable { .. } => true,
            FetchError::Timeout { .. } => true,
            FetchError::Malformed { .. } => false,
            FetchError::Backend { status, .. } => *status >= 500 || *status == 429,
            FetchError::Cancelled => false,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            FetchError::Unreachable { .. } | FetchError::Timeout { .. } => ErrorCategory::Network,
            FetchError::Malformed { .. } | FetchError::Backend { .. } => ErrorCategory::Server,
            FetchError::Cancelled => ErrorCategory::Cancelled,
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            FetchError::Unreachable { .. } => {
                "Unable to reach the message source. Please check your connection.".to_string()
            }
            FetchError::Timeout { duration_ms } => {
                format!("Loading messages timed out after {} ms.", duration_ms)
            }
            FetchError::Malformed { .. } => {
                "Received an invalid batch of messages. Please try again.".to_string()
            }
            FetchError::Backend { status, .. } => match *status {
                429 => "Too many requests. Please wait a moment and try again.".to_string(),
                500..=599 => "The message source is experiencing issues.".to_string(),
                _ => format!("The message source returned an error (status {}).", status),
            },
            FetchError::Cancelled => "Loading was cancelled.".to_string(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            FetchError::Unreachable { .. } => "E_FETCH_UNREACHABLE",
            FetchError::Timeout { .. } => "E_FETCH_TIMEOUT",
            FetchError::Malformed { .. } => "E_FETCH_MALFORMED",
            FetchError::Backend { .. } => "E_FETCH_BACKEND",
            FetchError::Cancelled => "E_FETCH_CANCEL",
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Unreachable { message } => write!(f, "source unreachable: {}", message),
            FetchError::Timeout { duration_ms } => {
                write!(f, "source timed out after {}ms", duration_ms)
            }
            FetchError::Malformed { message } => write!(f, "malformed batch: {}", message),
            FetchError::Backend { status, message } => {
                write!(f, "backend error ({}): {}", status, message)
            }
            FetchError::Cancelled => write!(f, "fetch cancelled"),
        }
    }
}

impl std::error::Error for FetchError {}
