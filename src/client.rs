//! Client for enqueueing work item identifiers.

use crate::backend::{QueueBackend, SharedBackend};
use crate::dead::DeadEntry;
use crate::error::Result;
use crate::item::WorkItem;

/// Client for pushing work item identifiers onto a named queue.
#[derive(Clone)]
pub struct Queue<B: QueueBackend + Clone = SharedBackend> {
    backend: B,
    name: String,
}

impl Queue<SharedBackend> {
    /// Create a new queue client with a shared backend.
    pub fn new(backend: impl QueueBackend + 'static, name: impl Into<String>) -> Self {
        Self {
            backend: SharedBackend::new(backend),
            name: name.into(),
        }
    }
}

impl<B: QueueBackend + Clone> Queue<B> {
    /// Create a new queue client with a specific backend.
    pub fn with_backend(backend: B, name: impl Into<String>) -> Self {
        Self {
            backend,
            name: name.into(),
        }
    }

    /// Get the queue name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Enqueue a work item.
    ///
    /// Pushes the item's identifier onto the queue tail. The item
    /// itself is never stored; only the identifier travels through the
    /// queue. Duplicate identifiers are permitted and will be processed
    /// independently.
    pub async fn add<T: WorkItem>(&self, item: &T) -> Result<()> {
        self.push_id(item.rand_id()).await
    }

    /// Enqueue a raw identifier.
    pub async fn push_id(&self, rand_id: &str) -> Result<()> {
        self.backend.push_tail(&self.name, rand_id).await?;
        tracing::debug!(rand_id = %rand_id, queue = %self.name, "Identifier enqueued");
        Ok(())
    }

    /// Get the number of identifiers waiting in the queue.
    pub async fn queue_len(&self) -> Result<usize> {
        self.backend.queue_len(&self.name).await
    }

    /// Get the number of dead-lettered identifiers.
    pub async fn dead_len(&self) -> Result<usize> {
        self.backend.dead_len(&self.name).await
    }

    /// List dead-letter records with pagination.
    pub async fn list_dead(&self, limit: usize, offset: usize) -> Result<Vec<DeadEntry>> {
        let raw = self.backend.list_dead(&self.name, limit, offset).await?;
        raw.iter()
            .map(|json| DeadEntry::from_json(json).map_err(Into::into))
            .collect()
    }
}
