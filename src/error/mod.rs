//! Error handling for the pager.
//!
//! - **Error Categories**: High-level classification for retry decisions
//! - **Source Errors**: `FetchError`, reported by a message source
//! - **Unified Error Type**: `PagerError`, what callers observe
//! - **Result Type Alias**: `PagerResult<T>`
//!
//! | Category | Description | Retryable |
//! |----------|-------------|-----------|
//! | Network | Source unreachable, timeout | Yes |
//! | Server | Source error status, malformed batch | Yes |
//! | Client | Inverted range, non-positive count | No |
//! | User | Bad configuration | No |
//! | Cancelled | Cancelled, superseded, dropped | No |

mod category;
mod fetch;
mod pager_error;
mod result;

pub use category::ErrorCategory;
pub use fetch::FetchError;
pub use pager_error::PagerError;
pub use result::PagerResult;
