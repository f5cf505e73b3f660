//! Configuration for the background augmentation pipeline.
//!
//! Example:
//! ```
//! use imgaug::background::BackgroundConfig;
//! use std::time::Duration;
//!
//! let config = BackgroundConfig::builder()
//!     .maxlen(4)
//!     .nb_workers(2)
//!     .seed(7)
//!     .poll_interval(Duration::from_millis(20))
//!     .build();
//! assert_eq!(config.maxlen, 4);
//! ```
//!
//! # Memory considerations:
//! - `maxlen` bounds the number of finished batches held in the queue. Each
//!   worker may hold one more batch while it waits for a free slot.

use crate::error::{AugResult, AugmentError};
use std::time::Duration;

/// Configuration for `BackgroundAugmenter`
#[derive(Debug, Clone)]
pub struct BackgroundConfig {
    /// Capacity of the queue of augmented batches (must be > 0)
    pub maxlen: usize,
    /// Number of worker threads (must be > 0)
    pub nb_workers: usize,
    /// Base seed for the workers' random states. `None` draws one from entropy.
    pub seed: Option<u64>,
    /// How often a worker blocked on a full queue checks for shutdown.
    /// Not an error timeout. Default: 100ms.
    pub poll_interval: Duration,
    /// Maximum wait in `get_batch_with_default_timeout` before assuming the
    /// workers are stuck.
    /// Default: 30s
    pub timeout: Duration,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            maxlen: 10,
            nb_workers: 1,
            seed: None,
            poll_interval: Duration::from_millis(100),
            timeout: Duration::from_secs(30),
        }
    }
}

impl BackgroundConfig {
    pub fn builder() -> BackgroundConfigBuilder {
        BackgroundConfigBuilder::default()
    }

    pub(crate) fn validate(&self) -> AugResult<()> {
        if self.maxlen == 0 {
            return Err(AugmentError::invalid(
                "queue capacity must be > 0; a zero-sized queue would block every worker forever",
            ));
        }
        if self.nb_workers == 0 {
            return Err(AugmentError::invalid(
                "cannot start a background pipeline with 0 workers",
            ));
        }
        Ok(())
    }
}

/// Builder for BackgroundConfig with method chaining
#[derive(Debug, Default)]
pub struct BackgroundConfigBuilder {
    config: BackgroundConfig,
}

impl BackgroundConfigBuilder {
    /// Set the queue capacity
    pub fn maxlen(mut self, maxlen: usize) -> Self {
        self.config.maxlen = maxlen;
        self
    }

    /// Set the number of workers
    pub fn nb_workers(mut self, nb_workers: usize) -> Self {
        self.config.nb_workers = nb_workers;
        self
    }

    /// Set the base seed. Worker `i` is seeded with `seed + i`.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Set the worker polling interval
    ///
    /// - Too low: More responsive shutdown, higher CPU usage.
    /// - Too high: Less CPU overhead, slower shutdown response
    pub fn poll_interval(mut self, poll_interval: Duration) -> Self {
        self.config.poll_interval = poll_interval;
        self
    }

    /// Set the timeout used by `get_batch_with_default_timeout`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Build the final configuration.
    pub fn build(self) -> BackgroundConfig {
        self.config
    }
}
