//! Message source trait abstraction.
//!
//! Provides the seam between the loader and whatever produces messages,
//! so the synthetic generator can be swapped for a real backend or a mock.

use async_trait::async_trait;

use crate::error::FetchError;
use crate::models::Message;

/// Trait for fetching a contiguous run of messages.
///
/// Implementations return at most `count` messages with ids inside
/// `start_id..start_id + count`, in ascending order. Returning fewer is
/// allowed (the backend may not have them); returning ids outside the range
/// or out of order is reported by the loader as a malformed batch.
///
/// # Example
///
/// ```
/// use chat_pager::adapters::SyntheticSource;
/// use chat_pager::traits::MessageSource;
/// use std::time::Duration;
///
/// let runtime = tokio::runtime::Runtime::new().unwrap();
/// let source = SyntheticSource::new(Duration::ZERO);
/// let messages = runtime.block_on(source.fetch(1, 3)).unwrap();
/// assert_eq!(messages.len(), 3);
/// assert_eq!(messages[2].id, 3);
/// ```
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Fetch up to `count` messages starting at `start_id`.
    async fn fetch(&self, start_id: i64, count: i64) -> Result<Vec<Message>, FetchError>;
}
