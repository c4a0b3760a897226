//! Error category classification for unified error handling.
//!
//! Categories drive retry decisions and the hint shown to a host when a load
//! fails.

use std::fmt;

/// High-level categorization of errors for handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Data source unreachable or too slow.
    /// Generally transient and retryable.
    Network,

    /// Data source answered with an error or malformed data.
    Server,

    /// Caller supplied an impossible request (inverted range, zero count).
    /// Not retryable - indicates a programming error.
    Client,

    /// Configuration values out of range.
    User,

    /// Request was cancelled or displaced by a newer one.
    Cancelled,
}

impl ErrorCategory {
    /// Returns true if errors in this category are generally transient
    /// and the operation can be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Network | ErrorCategory::Server)
    }

    /// Returns a short label for the category suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Server => "server",
            ErrorCategory::Client => "client",
            ErrorCategory::User => "user",
            ErrorCategory::Cancelled => "cancelled",
        }
    }

    /// Returns suggested recovery actions for this category.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Check the connection and scroll again to retry",
            ErrorCategory::Server => "The message source is having issues. Try again later",
            ErrorCategory::Client => "This may be a bug. Please report this issue if it persists",
            ErrorCategory::User => "Check your pager configuration",
            ErrorCategory::Cancelled => "No action needed",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
