//! Paced worker loop for processing queued identifiers.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, Semaphore};

use crate::backend::{QueueBackend, SharedBackend};
use crate::config::{RetryPolicy, WorkerConfig};
use crate::dead::DeadEntry;
use crate::error::{PaceqError, Result};

/// Result type for processor callbacks.
pub type ProcessResult = std::result::Result<(), ProcessError>;

/// Error returned from processor callbacks.
#[derive(Debug)]
pub struct ProcessError {
    /// Error message.
    pub message: String,
    /// Whether the identifier should be retried.
    pub retryable: bool,
}

impl ProcessError {
    /// Create a new retryable error.
    pub fn retryable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: true,
        }
    }

    /// Create a new non-retryable error (identifier goes straight to
    /// the dead-letter list).
    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: false,
        }
    }
}

impl<E: std::error::Error> From<E> for ProcessError {
    fn from(err: E) -> Self {
        Self::retryable(err.to_string())
    }
}

/// Paced worker that drains a named queue at a bounded rate.
///
/// One timer loop pops at most one identifier per interval and hands it
/// to the processor on a spawned task, so processing latency never
/// stalls the ticker. Failed invocations are re-enqueued (or
/// dead-lettered, per [`RetryPolicy`]); every failure the loop detects
/// is surfaced through the reporter callback and never terminates the
/// loop.
pub struct Worker<F, Fut, R, B = SharedBackend>
where
    F: Fn(String) -> Fut + Send + Sync + Clone + 'static,
    Fut: Future<Output = ProcessResult> + Send + 'static,
    R: Fn(PaceqError, &str) + Send + Sync + Clone + 'static,
    B: QueueBackend + Clone + 'static,
{
    config: WorkerConfig,
    interval: Duration,
    backend: B,
    processor: F,
    reporter: R,
    limiter: Arc<Semaphore>,
    running: Arc<AtomicBool>,
    draining: Arc<AtomicBool>,
    in_flight: Arc<AtomicUsize>,
    drain_notify: Arc<Notify>,
}

impl<F, Fut, R> Worker<F, Fut, R, SharedBackend>
where
    F: Fn(String) -> Fut + Send + Sync + Clone + 'static,
    Fut: Future<Output = ProcessResult> + Send + 'static,
    R: Fn(PaceqError, &str) + Send + Sync + Clone + 'static,
{
    /// Create a new builder for Worker.
    pub fn builder() -> WorkerBuilder<F, Fut, R> {
        WorkerBuilder::new()
    }
}

impl<F, Fut, R, B> Worker<F, Fut, R, B>
where
    F: Fn(String) -> Fut + Send + Sync + Clone + 'static,
    Fut: Future<Output = ProcessResult> + Send + 'static,
    R: Fn(PaceqError, &str) + Send + Sync + Clone + 'static,
    B: QueueBackend + Clone + 'static,
{
    /// Create a new worker with the given configuration, backend,
    /// processor, and reporter.
    ///
    /// Fails with a configuration error if the throughput is zero or
    /// `max_in_flight` is zero.
    pub fn new(config: WorkerConfig, backend: B, processor: F, reporter: R) -> Result<Self> {
        let interval = config.interval()?;
        if config.max_in_flight == 0 {
            return Err(PaceqError::Config(
                "max_in_flight must be positive".to_string(),
            ));
        }

        Ok(Self {
            limiter: Arc::new(Semaphore::new(config.max_in_flight)),
            config,
            interval,
            backend,
            processor,
            reporter,
            running: Arc::new(AtomicBool::new(false)),
            draining: Arc::new(AtomicBool::new(false)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            drain_notify: Arc::new(Notify::new()),
        })
    }

    /// The pacing interval derived from the configured throughput.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run the worker until ctrl-c.
    pub async fn run(&self) -> Result<()> {
        self.run_until(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await
    }

    /// Run the worker until the provided shutdown future completes.
    ///
    /// The shutdown signal is observed at the timer wait, so the loop
    /// exits promptly, then in-flight dispatches are drained up to the
    /// configured shutdown timeout. The first tick fires one full
    /// interval after start.
    pub async fn run_until<S>(&self, shutdown: S) -> Result<()>
    where
        S: Future<Output = ()> + Send,
    {
        self.running.store(true, Ordering::SeqCst);

        let mut ticker = tokio::time::interval_at(
            tokio::time::Instant::now() + self.interval,
            self.interval,
        );
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        tracing::info!(
            queue = %self.config.name,
            throughput = self.config.throughput,
            interval_ms = self.interval.as_millis() as u64,
            "Worker started"
        );

        tokio::pin!(shutdown);

        while self.running.load(Ordering::SeqCst) {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!(queue = %self.config.name, "Shutdown requested, draining...");
                    break;
                }
                _ = ticker.tick() => {
                    self.tick().await;
                }
            }
        }

        self.shutdown().await;

        tracing::info!(queue = %self.config.name, "Worker stopped");
        Ok(())
    }

    /// Process one tick: pop at most one identifier and dispatch it.
    async fn tick(&self) {
        if self.draining.load(Ordering::SeqCst) {
            return;
        }

        // Cap on in-flight dispatches. When saturated, skip the tick
        // before popping so the identifier stays in the store.
        let permit = match self.limiter.clone().try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                tracing::debug!(
                    queue = %self.config.name,
                    max_in_flight = self.config.max_in_flight,
                    "In-flight limit reached, skipping tick"
                );
                return;
            }
        };

        let rand_id = match self.backend.pop_head(&self.config.name).await {
            Ok(Some(rand_id)) => rand_id,
            Ok(None) => return, // Queue empty, nothing this tick
            Err(e) => {
                (self.reporter)(e, "");
                return;
            }
        };

        tracing::debug!(rand_id = %rand_id, queue = %self.config.name, "Dispatching identifier");

        self.in_flight.fetch_add(1, Ordering::SeqCst);

        let dispatch = Dispatch {
            backend: self.backend.clone(),
            name: self.config.name.clone(),
            retry: self.config.retry,
            reporter: self.reporter.clone(),
        };
        let processor = self.processor.clone();
        let in_flight = self.in_flight.clone();
        let drain_notify = self.drain_notify.clone();

        tokio::spawn(async move {
            dispatch.run(rand_id, processor).await;
            drop(permit);
            in_flight.fetch_sub(1, Ordering::SeqCst);
            drain_notify.notify_one();
        });
    }

    /// Initiate graceful shutdown.
    ///
    /// This stops popping new identifiers and waits for in-flight
    /// dispatches to complete, up to the configured shutdown timeout.
    pub async fn shutdown(&self) {
        self.draining.store(true, Ordering::SeqCst);

        let deadline = tokio::time::Instant::now() + self.config.shutdown_timeout;

        while self.in_flight.load(Ordering::SeqCst) > 0 {
            if tokio::time::Instant::now() >= deadline {
                tracing::warn!(
                    in_flight = self.in_flight.load(Ordering::SeqCst),
                    "Shutdown timeout reached, abandoning in-flight dispatches"
                );
                break;
            }

            tokio::select! {
                _ = self.drain_notify.notified() => {}
                _ = tokio::time::sleep(Duration::from_millis(100)) => {}
            }
        }

        self.running.store(false, Ordering::SeqCst);
    }

    /// Get the number of dispatches currently in flight.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Check if the worker is draining.
    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::SeqCst)
    }
}

/// One dispatched identifier: processor invocation plus the retry
/// handling that follows a failure.
struct Dispatch<R, B>
where
    R: Fn(PaceqError, &str) + Send + Sync + Clone + 'static,
    B: QueueBackend + Clone + 'static,
{
    backend: B,
    name: String,
    retry: RetryPolicy,
    reporter: R,
}

impl<R, B> Dispatch<R, B>
where
    R: Fn(PaceqError, &str) + Send + Sync + Clone + 'static,
    B: QueueBackend + Clone + 'static,
{
    async fn run<F, Fut>(&self, rand_id: String, processor: F)
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ProcessResult> + Send + 'static,
    {
        let err = match processor(rand_id.clone()).await {
            Ok(()) => {
                tracing::debug!(rand_id = %rand_id, queue = %self.name, "Identifier processed");
                if matches!(self.retry, RetryPolicy::MaxAttempts(_)) {
                    // A stale counter only makes a later run give up
                    // early, so clearing is best-effort.
                    if let Err(e) = self.backend.clear_failures(&self.name, &rand_id).await {
                        tracing::debug!(
                            rand_id = %rand_id,
                            error = %e,
                            "Failed to clear failure count"
                        );
                    }
                }
                return;
            }
            Err(err) => err,
        };

        (self.reporter)(
            PaceqError::Invocation {
                rand_id: rand_id.clone(),
                message: err.message.clone(),
            },
            &rand_id,
        );

        if err.retryable && self.has_retry_budget(&rand_id).await {
            if let Err(e) = self.backend.push_tail(&self.name, &rand_id).await {
                // The one data-loss path: the identifier is now in
                // neither the queue nor the dead list.
                (self.reporter)(
                    PaceqError::PushBack {
                        rand_id: rand_id.clone(),
                        source: Box::new(e),
                    },
                    &rand_id,
                );
            }
        } else {
            self.dead_letter(&rand_id, &err.message).await;
        }
    }

    /// Whether the identifier should be re-enqueued under the policy.
    async fn has_retry_budget(&self, rand_id: &str) -> bool {
        match self.retry {
            RetryPolicy::Unbounded => true,
            RetryPolicy::MaxAttempts(max) => {
                match self.backend.record_failure(&self.name, rand_id).await {
                    Ok(count) => count < u64::from(max),
                    Err(e) => {
                        // Counter unavailable: keep retrying rather
                        // than dropping work.
                        (self.reporter)(e, rand_id);
                        true
                    }
                }
            }
        }
    }

    async fn dead_letter(&self, rand_id: &str, message: &str) {
        let entry = DeadEntry::new(rand_id, message);
        let json = match entry.to_json() {
            Ok(json) => json,
            Err(e) => {
                (self.reporter)(
                    PaceqError::DeadLetter {
                        rand_id: rand_id.to_string(),
                        source: Box::new(e.into()),
                    },
                    rand_id,
                );
                return;
            }
        };

        if let Err(e) = self.backend.push_dead(&self.name, &json).await {
            (self.reporter)(
                PaceqError::DeadLetter {
                    rand_id: rand_id.to_string(),
                    source: Box::new(e),
                },
                rand_id,
            );
            return;
        }

        tracing::warn!(rand_id = %rand_id, queue = %self.name, "Identifier dead-lettered");

        if let Err(e) = self.backend.clear_failures(&self.name, rand_id).await {
            tracing::debug!(rand_id = %rand_id, error = %e, "Failed to clear failure count");
        }
    }
}

/// Builder for Worker.
pub struct WorkerBuilder<F, Fut, R>
where
    F: Fn(String) -> Fut + Send + Sync + Clone + 'static,
    Fut: Future<Output = ProcessResult> + Send + 'static,
    R: Fn(PaceqError, &str) + Send + Sync + Clone + 'static,
{
    config: WorkerConfig,
    backend: Option<SharedBackend>,
    processor: Option<F>,
    reporter: Option<R>,
}

impl<F, Fut, R> WorkerBuilder<F, Fut, R>
where
    F: Fn(String) -> Fut + Send + Sync + Clone + 'static,
    Fut: Future<Output = ProcessResult> + Send + 'static,
    R: Fn(PaceqError, &str) + Send + Sync + Clone + 'static,
{
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            config: WorkerConfig::default(),
            backend: None,
            processor: None,
            reporter: None,
        }
    }

    /// Set the backend.
    pub fn backend(mut self, backend: impl QueueBackend + 'static) -> Self {
        self.backend = Some(SharedBackend::new(backend));
        self
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

    /// Set the processor callback.
    pub fn processor(mut self, processor: F) -> Self {
        self.processor = Some(processor);
        self
    }

    /// Set the error reporter callback.
    pub fn reporter(mut self, reporter: R) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Build the Worker with the configured backend.
    pub fn build(self) -> Result<Worker<F, Fut, R, SharedBackend>> {
        let backend = self
            .backend
            .ok_or_else(|| PaceqError::Config("Backend is required".to_string()))?;
        let processor = self
            .processor
            .ok_or_else(|| PaceqError::Config("Processor is required".to_string()))?;
        let reporter = self
            .reporter
            .ok_or_else(|| PaceqError::Config("Reporter is required".to_string()))?;

        Worker::new(self.config, backend, processor, reporter)
    }

    /// Build the Worker with a custom backend.
    pub fn build_with_backend<B: QueueBackend + Clone + 'static>(
        self,
        backend: B,
    ) -> Result<Worker<F, Fut, R, B>> {
        let processor = self
            .processor
            .ok_or_else(|| PaceqError::Config("Processor is required".to_string()))?;
        let reporter = self
            .reporter
            .ok_or_else(|| PaceqError::Config("Reporter is required".to_string()))?;

        Worker::new(self.config, backend, processor, reporter)
    }
}

impl<F, Fut, R> Default for WorkerBuilder<F, Fut, R>
where
    F: Fn(String) -> Fut + Send + Sync + Clone + 'static,
    Fut: Future<Output = ProcessResult> + Send + 'static,
    R: Fn(PaceqError, &str) + Send + Sync + Clone + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
