//! A single fetch as it runs on the worker task.
//!
//! Nothing here touches coordinator state: the result is handed back over
//! the completion channel.

use std::time::Duration;

use super::FetchSettings;
use crate::error::{FetchError, PagerError, PagerResult};
use crate::models::{LoadRange, Message};
use crate::traits::MessageSource;

/// Pause before the single retry of a transient failure.
pub(super) const RETRY_DELAY: Duration = Duration::from_millis(100);

/// Fetch `range`, retrying once on a transient failure when enabled.
pub(super) async fn run(
    source: &dyn MessageSource,
    range: LoadRange,
    settings: FetchSettings,
) -> PagerResult<Vec<Message>> {
    let first = fetch_once(source, range, settings.timeout).await;

    let retry = settings.retry_transient
        && first.as_ref().err().is_some_and(|error| error.is_retryable());
    if !retry {
        return first;
    }

    if let Err(error) = &first {
        tracing::debug!(
            range = %range,
            error = %error,
            "Transient fetch error, retrying once"
        );
    }
    tokio::time::sleep(RETRY_DELAY).await;
    fetch_once(source, range, settings.timeout).await
}

async fn fetch_once(
    source: &dyn MessageSource,
    range: LoadRange,
    timeout: Option<Duration>,
) -> PagerResult<Vec<Message>> {
    let fetch = source.fetch(range.start(), range.count());

    let outcome = match timeout {
        Some(limit) => tokio::time::timeout(limit, fetch)
            .await
            .map_err(|_| PagerError::Timeout {
                range,
                timeout_ms: timeout_millis(limit),
            })?,
        None => fetch.await,
    };

    let batch = outcome.map_err(|source| PagerError::Fetch { range, source })?;
    validate_batch(range, batch)
}

/// Whole milliseconds in `limit`, saturating at `u64::MAX`.
fn timeout_millis(limit: Duration) -> u64 {
    u64::try_from(limit.as_millis()).unwrap_or(u64::MAX)
}

/// Reject batches that do not fit the request: too long, ids outside the
/// range, or ids not strictly ascending.
pub(super) fn validate_batch(range: LoadRange, batch: Vec<Message>) -> PagerResult<Vec<Message>> {
    let malformed = |message: String| PagerError::Fetch {
        range,
        source: FetchError::Malformed { message },
    };

    if batch.len() as i64 > range.count() {
        return Err(malformed(format!(
            "returned {} messages for {} ids",
            batch.len(),
            range.count()
        )));
    }
    if let Some(stray) = batch.iter().find(|message| !range.contains(message.id)) {
        return Err(malformed(format!("id {} outside {}", stray.id, range)));
    }
    if !batch.windows(2).all(|pair| pair[0].id < pair[1].id) {
        return Err(malformed("ids not strictly ascending".to_string()));
    }

    Ok(batch)
}
