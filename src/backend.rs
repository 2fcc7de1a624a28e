//! Backend abstraction for durable queue storage.
//!
//! The queue core treats the durable store as an external collaborator:
//! a named list supporting push-to-tail and pop-from-head, plus the
//! dead-letter list and failure counters used by the retry policy.
//! Implementations must be thread-safe (Send + Sync) and each push or
//! pop call is assumed atomic.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;

pub mod memory;
pub mod redis;

/// Storage operations the paced queue needs from a durable store.
///
/// Every operation takes the queue `name`, so one backend connection
/// can serve any number of named queues. "Queue empty" is a
/// distinguished, non-fatal outcome (`Ok(None)` from [`pop_head`]),
/// never an error.
///
/// [`pop_head`]: QueueBackend::pop_head
#[async_trait]
pub trait QueueBackend: Send + Sync {
    /// Push an identifier onto the tail of the named queue.
    async fn push_tail(&self, name: &str, rand_id: &str) -> Result<()>;

    /// Pop one identifier from the head of the named queue.
    ///
    /// Returns `Ok(None)` when the queue is empty.
    async fn pop_head(&self, name: &str) -> Result<Option<String>>;

    /// Get the number of identifiers waiting in the named queue.
    async fn queue_len(&self, name: &str) -> Result<usize>;

    /// Append a dead-letter record to the named queue's dead list.
    async fn push_dead(&self, name: &str, entry_json: &str) -> Result<()>;

    /// Get the number of records in the named queue's dead list.
    async fn dead_len(&self, name: &str) -> Result<usize>;

    /// List dead-letter records with pagination.
    async fn list_dead(&self, name: &str, limit: usize, offset: usize) -> Result<Vec<String>>;

    /// Increment and return the failure count for an identifier.
    async fn record_failure(&self, name: &str, rand_id: &str) -> Result<u64>;

    /// Clear the failure count for an identifier.
    async fn clear_failures(&self, name: &str, rand_id: &str) -> Result<()>;
}

/// A type-erased backend that can be shared across threads.
pub type DynBackend = Arc<dyn QueueBackend>;

/// Wrapper around `Arc<dyn QueueBackend>` for convenience.
#[derive(Clone)]
pub struct SharedBackend {
    inner: DynBackend,
}

impl SharedBackend {
    /// Create a new SharedBackend from any QueueBackend implementation.
    pub fn new<B: QueueBackend + 'static>(backend: B) -> Self {
        Self {
            inner: Arc::new(backend),
        }
    }

    /// Get a reference to the inner backend.
    pub fn inner(&self) -> &DynBackend {
        &self.inner
    }
}

#[async_trait]
impl QueueBackend for SharedBackend {
    async fn push_tail(&self, name: &str, rand_id: &str) -> Result<()> {
        self.inner.push_tail(name, rand_id).await
    }

    async fn pop_head(&self, name: &str) -> Result<Option<String>> {
        self.inner.pop_head(name).await
    }

    async fn queue_len(&self, name: &str) -> Result<usize> {
        self.inner.queue_len(name).await
    }

    async fn push_dead(&self, name: &str, entry_json: &str) -> Result<()> {
        self.inner.push_dead(name, entry_json).await
    }

    async fn dead_len(&self, name: &str) -> Result<usize> {
        self.inner.dead_len(name).await
    }

    async fn list_dead(&self, name: &str, limit: usize, offset: usize) -> Result<Vec<String>> {
        self.inner.list_dead(name, limit, offset).await
    }

    async fn record_failure(&self, name: &str, rand_id: &str) -> Result<u64> {
        self.inner.record_failure(name, rand_id).await
    }

    async fn clear_failures(&self, name: &str, rand_id: &str) -> Result<()> {
        self.inner.clear_failures(name, rand_id).await
    }
}
