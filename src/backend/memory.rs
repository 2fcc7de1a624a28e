//! In-process backend for tests and demos.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::backend::QueueBackend;
use crate::error::Result;

/// In-memory queue storage.
///
/// Clones share state, so a clone handed to a worker observes the same
/// queues as the client that enqueued into it. Nothing is persisted;
/// this backend exists for tests and examples.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<State>>,
}

#[derive(Default)]
struct State {
    queues: HashMap<String, VecDeque<String>>,
    dead: HashMap<String, Vec<String>>,
    failures: HashMap<String, HashMap<String, u64>>,
}

impl MemoryBackend {
    /// Create a new empty backend.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QueueBackend for MemoryBackend {
    async fn push_tail(&self, name: &str, rand_id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state
            .queues
            .entry(name.to_string())
            .or_default()
            .push_back(rand_id.to_string());
        Ok(())
    }

    async fn pop_head(&self, name: &str) -> Result<Option<String>> {
        let mut state = self.state.lock().unwrap();
        Ok(state.queues.get_mut(name).and_then(|queue| queue.pop_front()))
    }

    async fn queue_len(&self, name: &str) -> Result<usize> {
        let state = self.state.lock().unwrap();
        Ok(state.queues.get(name).map_or(0, |queue| queue.len()))
    }

    async fn push_dead(&self, name: &str, entry_json: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state
            .dead
            .entry(name.to_string())
            .or_default()
            .push(entry_json.to_string());
        Ok(())
    }

    async fn dead_len(&self, name: &str) -> Result<usize> {
        let state = self.state.lock().unwrap();
        Ok(state.dead.get(name).map_or(0, |entries| entries.len()))
    }

    async fn list_dead(&self, name: &str, limit: usize, offset: usize) -> Result<Vec<String>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .dead
            .get(name)
            .map(|entries| entries.iter().skip(offset).take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn record_failure(&self, name: &str, rand_id: &str) -> Result<u64> {
        let mut state = self.state.lock().unwrap();
        let count = state
            .failures
            .entry(name.to_string())
            .or_default()
            .entry(rand_id.to_string())
            .or_insert(0);
        *count += 1;
        Ok(*count)
    }

    async fn clear_failures(&self, name: &str, rand_id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(counts) = state.failures.get_mut(name) {
            counts.remove(rand_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fifo_order() {
        let backend = MemoryBackend::new();
        backend.push_tail("q", "a").await.unwrap();
        backend.push_tail("q", "b").await.unwrap();
        backend.push_tail("q", "c").await.unwrap();

        assert_eq!(backend.queue_len("q").await.unwrap(), 3);
        assert_eq!(backend.pop_head("q").await.unwrap(), Some("a".to_string()));
        assert_eq!(backend.pop_head("q").await.unwrap(), Some("b".to_string()));
        assert_eq!(backend.pop_head("q").await.unwrap(), Some("c".to_string()));
        assert_eq!(backend.pop_head("q").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_queues_are_isolated_by_name() {
        let backend = MemoryBackend::new();
        backend.push_tail("q1", "a").await.unwrap();

        assert_eq!(backend.queue_len("q2").await.unwrap(), 0);
        assert_eq!(backend.pop_head("q2").await.unwrap(), None);
        assert_eq!(backend.pop_head("q1").await.unwrap(), Some("a".to_string()));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let backend = MemoryBackend::new();
        let clone = backend.clone();
        backend.push_tail("q", "a").await.unwrap();

        assert_eq!(clone.pop_head("q").await.unwrap(), Some("a".to_string()));
    }

    #[tokio::test]
    async fn test_failure_counter() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.record_failure("q", "x").await.unwrap(), 1);
        assert_eq!(backend.record_failure("q", "x").await.unwrap(), 2);
        assert_eq!(backend.record_failure("q", "y").await.unwrap(), 1);

        backend.clear_failures("q", "x").await.unwrap();
        assert_eq!(backend.record_failure("q", "x").await.unwrap(), 1);
        assert_eq!(backend.record_failure("q", "y").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_dead_list_pagination() {
        let backend = MemoryBackend::new();
        for entry in ["e0", "e1", "e2", "e3"] {
            backend.push_dead("q", entry).await.unwrap();
        }

        assert_eq!(backend.dead_len("q").await.unwrap(), 4);
        assert_eq!(
            backend.list_dead("q", 2, 1).await.unwrap(),
            vec!["e1".to_string(), "e2".to_string()]
        );
        assert_eq!(backend.list_dead("q", 10, 3).await.unwrap(), vec!["e3".to_string()]);
        assert!(backend.list_dead("q", 0, 0).await.unwrap().is_empty());
    }
}
