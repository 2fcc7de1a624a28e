//! Configuration types for the paced worker.

use std::time::Duration;

use crate::error::{PaceqError, Result};

/// What to do with an identifier whose processor keeps failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Re-enqueue after every failure, with no cap and no backoff.
    ///
    /// A permanently failing identifier is retried every time it
    /// reaches the head of the queue again.
    Unbounded,

    /// Allow up to the given number of attempts, then move the
    /// identifier to the dead-letter list instead of re-enqueueing it.
    ///
    /// Attempts are counted per identifier in the backend, so the count
    /// survives worker restarts.
    MaxAttempts(u32),
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::Unbounded
    }
}

/// Derive the pacing interval from a target throughput.
///
/// `throughput` is in items per minute; the interval is `60 / throughput`
/// seconds computed with real-valued arithmetic, so a throughput of 7
/// gives ~8.571s rather than a truncated 8s. A throughput of zero is a
/// configuration error.
pub fn pace_interval(throughput: u32) -> Result<Duration> {
    if throughput == 0 {
        return Err(PaceqError::Config(
            "throughput must be positive".to_string(),
        ));
    }
    Ok(Duration::from_secs_f64(60.0 / f64::from(throughput)))
}

/// Configuration for the paced worker.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Name of the durable queue to drain.
    pub name: String,
    /// Target throughput in items per minute. Must be positive.
    pub throughput: u32,
    /// Maximum number of concurrently in-flight dispatches. When the
    /// cap is reached, ticks are skipped without popping.
    pub max_in_flight: usize,
    /// Graceful shutdown drain timeout.
    pub shutdown_timeout: Duration,
    /// Retry policy for failing identifiers.
    pub retry: RetryPolicy,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            name: "paceq".to_string(),
            throughput: 60,
            max_in_flight: 64,
            shutdown_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

/// Builder for WorkerConfig.
#[derive(Debug, Default)]
pub struct WorkerConfigBuilder {
    config: WorkerConfig,
}

impl WorkerConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the queue name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Set the target throughput in items per minute.
    pub fn throughput(mut self, throughput: u32) -> Self {
        self.config.throughput = throughput;
        self
    }

    /// Set the maximum number of in-flight dispatches.
    pub fn max_in_flight(mut self, max: usize) -> Self {
        self.config.max_in_flight = max;
        self
    }

    /// Set the graceful shutdown timeout.
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.config.shutdown_timeout = timeout;
        self
    }

    /// Set the retry policy.
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.config.retry = policy;
        self
    }

    /// Build the WorkerConfig.
    pub fn build(self) -> WorkerConfig {
        self.config
    }
}

impl WorkerConfig {
    /// Create a new builder.
    pub fn builder() -> WorkerConfigBuilder {
        WorkerConfigBuilder::new()
    }

    /// The pacing interval derived from the configured throughput.
    pub fn interval(&self) -> Result<Duration> {
        pace_interval(self.throughput)
    }
}
