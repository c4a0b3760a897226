//! Synthetic message source.
//!
//! Stands in for a backend: generates deterministic messages for any id and
//! delays each fetch to model network latency.

use async_trait::async_trait;
use std::time::Duration;

use crate::config::PagerConfig;
use crate::error::FetchError;
use crate::models::{LoadRange, Message};
use crate::traits::MessageSource;

/// Every id divisible by this produces a tall, multi-line message.
pub const TALL_MESSAGE_INTERVAL: i64 = 19;

const TALL_MESSAGE_TEXT: &str =
    "Message with text\nMessage with text\nMessage with text\nMessage with text";

/// Deterministic text for `id`.
pub fn message_text(id: i64) -> String {
    if id % TALL_MESSAGE_INTERVAL == 0 {
        TALL_MESSAGE_TEXT.to_string()
    } else {
        format!("Sample message {}", id)
    }
}

/// Generate `count` consecutive messages starting at `start_id`.
///
/// Pure: the same arguments always give the same messages. A non-positive
/// count yields an empty batch.
pub fn generate(start_id: i64, count: i64) -> Vec<Message> {
    (0..count.max(0))
        .map_while(|offset| start_id.checked_add(offset))
        .map(|id| Message::new(id, message_text(id)))
        .collect()
}

/// Source that generates messages locally after an artificial delay.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    latency: Duration,
    /// Ids outside this range are never produced
    available: Option<LoadRange>,
}

impl SyntheticSource {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            available: None,
        }
    }

    pub fn from_config(config: &PagerConfig) -> Self {
        Self::new(config.fetch_latency())
    }

    /// Limit the ids this source knows about. Fetches outside the range
    /// return a shorter (possibly empty) batch.
    pub fn with_available(mut self, available: LoadRange) -> Self {
        self.available = Some(available);
        self
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::from_config(&PagerConfig::default())
    }
}

#[async_trait]
impl MessageSource for SyntheticSource {
    async fn fetch(&self, start_id: i64, count: i64) -> Result<Vec<Message>, FetchError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let mut batch = generate(start_id, count);
        if let Some(available) = self.available {
            batch.retain(|message| available.contains(message.id));
        }

        tracing::trace!(start_id, count, returned = batch.len(), "Synthetic fetch");
        Ok(batch)
    }
}
