//! Pager configuration.
//!
//! Use the builder methods to customize behavior, or load overrides from the
//! environment / a JSON document.
//!
//! # Example
//!
//! ```
//! use chat_pager::config::PagerConfig;
//!
//! let config = PagerConfig::default()
//!     .with_pagination_load_count(50)
//!     .with_fetch_latency_ms(0);
//! assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{PagerError, PagerResult};

/// Configuration for the pager engine and its synthetic source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagerConfig {
    /// Size of the first range fetched at startup (default: 20)
    pub initial_load_count: i64,
    /// Size of each incremental page (default: 20)
    pub pagination_load_count: i64,
    /// Jump target used when the host does not supply one (default: 1000)
    pub target_message_id: i64,
    /// Ids loaded on each side of a jump target (default: 10)
    pub jump_radius: i64,
    /// Lowest id a jump range may start at (default: 1)
    pub jump_floor: i64,
    /// Page granularity for page bounds (default: 20)
    pub page_size: i64,
    /// Artificial latency of the synthetic source (default: 1000)
    pub fetch_latency_ms: u64,
    /// Fetch timeout; None disables it (default: 10s)
    pub fetch_timeout_ms: Option<u64>,
    /// Optional floor for upward pagination
    pub min_message_id: Option<i64>,
    /// Drop the queued request when the fetch ahead of it fails (default: true)
    pub drop_pending_on_failure: bool,
    /// Retry once when a fetch fails with a transient error (default: false)
    pub retry_transient_failures: bool,
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            initial_load_count: 20,
            pagination_load_count: 20,
            target_message_id: 1000,
            jump_radius: 10,
            jump_floor: 1,
            page_size: 20,
            fetch_latency_ms: 1000,
            fetch_timeout_ms: Some(10_000),
            min_message_id: None,
            drop_pending_on_failure: true,
            retry_transient_failures: false,
        }
    }
}

impl PagerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial_load_count(mut self, count: i64) -> Self {
        self.initial_load_count = count;
        self
    }

    pub fn with_pagination_load_count(mut self, count: i64) -> Self {
        self.pagination_load_count = count;
        self
    }

    pub fn with_target_message_id(mut self, id: i64) -> Self {
        self.target_message_id = id;
        self
    }

    pub fn with_jump_radius(mut self, radius: i64) -> Self {
        self.jump_radius = radius;
        self
    }

    pub fn with_jump_floor(mut self, floor: i64) -> Self {
        self.jump_floor = floor;
        self
    }

    pub fn with_page_size(mut self, size: i64) -> Self {
        self.page_size = size;
        self
    }

    pub fn with_fetch_latency_ms(mut self, latency_ms: u64) -> Self {
        self.fetch_latency_ms = latency_ms;
        self
    }

    /// Set the fetch timeout (`None` disables it).
    pub fn with_fetch_timeout_ms(mut self, timeout_ms: Option<u64>) -> Self {
        self.fetch_timeout_ms = timeout_ms;
        self
    }

    pub fn with_min_message_id(mut self, id: Option<i64>) -> Self {
        self.min_message_id = id;
        self
    }

    pub fn with_drop_pending_on_failure(mut self, drop: bool) -> Self {
        self.drop_pending_on_failure = drop;
        self
    }

    pub fn with_retry_transient_failures(mut self, retry: bool) -> Self {
        self.retry_transient_failures = retry;
        self
    }

    pub fn fetch_latency(&self) -> Duration {
        Duration::from_millis(self.fetch_latency_ms)
    }

    /// Fetch timeout, treating zero as disabled.
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> PagerResult<()> {
        if self.initial_load_count <= 0 {
            return Err(PagerError::Config(format!(
                "initial_load_count must be positive, got {}",
                self.initial_load_count
            )));
        }
        if self.pagination_load_count <= 0 {
            return Err(PagerError::Config(format!(
                "pagination_load_count must be positive, got {}",
                self.pagination_load_count
            )));
        }
        if self.jump_radius < 0 {
            return Err(PagerError::Config(format!(
                "jump_radius must not be negative, got {}",
                self.jump_radius
            )));
        }
        if self.page_size <= 0 {
            return Err(PagerError::Config(format!(
                "page_size must be positive, got {}",
                self.page_size
            )));
        }
        Ok(())
    }

    /// Parse a JSON document; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> PagerResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| PagerError::Config(format!("invalid config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> PagerResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            PagerError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    /// Defaults overridden by `PAGER_*` environment variables.
    ///
    /// Recognized: `PAGER_INITIAL_LOAD_COUNT`, `PAGER_PAGINATION_LOAD_COUNT`,
    /// `PAGER_TARGET_MESSAGE_ID`, `PAGER_FETCH_LATENCY_MS`,
    /// `PAGER_FETCH_TIMEOUT_MS` (0 disables the timeout).
    pub fn from_env() -> PagerResult<Self> {
        let mut config = Self::default();

        if let Some(count) = env_value::<i64>("PAGER_INITIAL_LOAD_COUNT")? {
            config.initial_load_count = count;
        }
        if let Some(count) = env_value::<i64>("PAGER_PAGINATION_LOAD_COUNT")? {
            config.pagination_load_count = count;
        }
        if let Some(id) = env_value::<i64>("PAGER_TARGET_MESSAGE_ID")? {
            config.target_message_id = id;
        }
        if let Some(ms) = env_value::<u64>("PAGER_FETCH_LATENCY_MS")? {
            config.fetch_latency_ms = ms;
        }
        if let Some(ms) = env_value::<u64>("PAGER_FETCH_TIMEOUT_MS")? {
            config.fetch_timeout_ms = if ms == 0 { None } else { Some(ms) };
        }

        config.validate()?;
        Ok(config)
    }
}

fn env_value<T: std::str::FromStr>(key: &str) -> PagerResult<Option<T>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| PagerError::Config(format!("{} is not a valid number: {:?}", key, raw))),
        Err(_) => Ok(None),
    }
}
