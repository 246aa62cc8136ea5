//! Icon system configuration.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use horizon_lattice_icons::IconSystemConfig;
//!
//! let config = IconSystemConfig::default()
//!     .with_cache_capacity(250)
//!     .with_request_timeout(Duration::from_millis(10));
//!
//! assert_eq!(config.cache_capacity, 250);
//! assert_eq!(config.request_timeout(), Duration::from_millis(10));
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default number of decoded icons kept in the cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// Default worker wait before re-checking for shutdown, in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5;

/// Default number of requests the worker takes per wake-up.
pub const DEFAULT_BATCH_SIZE: usize = 1;

/// Default name of the worker thread.
pub const DEFAULT_THREAD_NAME: &str = "horizon-icon-worker";

/// Configuration for an [`IconSystem`](crate::IconSystem).
///
/// Missing fields take their defaults when deserialized, so the struct can be
/// embedded in an application settings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IconSystemConfig {
    /// Maximum number of cached decode results (successes and failures).
    /// Zero disables caching.
    /// Default: 1000.
    pub cache_capacity: usize,
    /// How long the idle worker waits for a request before checking whether
    /// it should stop.
    /// Default: 5 ms.
    pub request_timeout_ms: u64,
    /// Maximum number of queued requests taken per wake-up. Values below one
    /// are treated as one.
    /// Default: 1.
    pub batch_size: usize,
    /// Name given to the worker thread.
    pub thread_name: String,
}

impl Default for IconSystemConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            batch_size: DEFAULT_BATCH_SIZE,
            thread_name: DEFAULT_THREAD_NAME.to_string(),
        }
    }
}

impl IconSystemConfig {
    /// Set the cache capacity.
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Set the worker wait timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the number of requests taken per wake-up.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the worker thread name.
    #[must_use]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Get the worker wait timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Get the effective batch size (at least one).
    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.max(1)
    }
}
