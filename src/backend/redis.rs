//! Redis backend for the paced queue.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::backend::QueueBackend;
use crate::error::{PaceqError, Result};

/// Key prefix for all paceq-created keys.
const PACEQ_KEY_PREFIX: &str = "_paceq_:";

/// Manages Redis keys for a named queue.
#[derive(Debug, Clone)]
pub struct RedisKeys {
    name: String,
}

impl RedisKeys {
    /// Create a new RedisKeys instance for the given queue name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Get the queue name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Key for the pending identifiers (LIST).
    /// Enqueues LPUSH here; the worker RPOPs from the other end.
    pub fn items(&self) -> String {
        format!("{}{}:items", PACEQ_KEY_PREFIX, self.name)
    }

    /// Key for the dead-letter records (LIST).
    pub fn dead(&self) -> String {
        format!("{}{}:dead", PACEQ_KEY_PREFIX, self.name)
    }

    /// Key for the per-identifier failure counts (HASH).
    pub fn failures(&self) -> String {
        format!("{}{}:failures", PACEQ_KEY_PREFIX, self.name)
    }
}

/// Redis backend for queue storage.
///
/// Cloning is cheap; the underlying [`ConnectionManager`] multiplexes a
/// single connection and reconnects automatically.
#[derive(Clone)]
pub struct RedisBackend {
    conn: ConnectionManager,
}

impl RedisBackend {
    /// Create a new Redis backend.
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client =
            redis::Client::open(redis_url).map_err(|e| PaceqError::Backend(e.to_string()))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| PaceqError::Backend(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Create a new Redis backend with an existing connection manager.
    pub fn with_connection(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl QueueBackend for RedisBackend {
    async fn push_tail(&self, name: &str, rand_id: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.lpush::<_, _, ()>(RedisKeys::new(name).items(), rand_id)
            .await
            .map_err(|e| PaceqError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn pop_head(&self, name: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn
            .rpop(RedisKeys::new(name).items(), None)
            .await
            .map_err(|e| PaceqError::Backend(e.to_string()))?;
        Ok(value)
    }

    async fn queue_len(&self, name: &str) -> Result<usize> {
        let mut conn = self.conn.clone();
        let len: usize = conn
            .llen(RedisKeys::new(name).items())
            .await
            .map_err(|e| PaceqError::Backend(e.to_string()))?;
        Ok(len)
    }

    async fn push_dead(&self, name: &str, entry_json: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.lpush::<_, _, ()>(RedisKeys::new(name).dead(), entry_json)
            .await
            .map_err(|e| PaceqError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn dead_len(&self, name: &str) -> Result<usize> {
        let mut conn = self.conn.clone();
        let len: usize = conn
            .llen(RedisKeys::new(name).dead())
            .await
            .map_err(|e| PaceqError::Backend(e.to_string()))?;
        Ok(len)
    }

    async fn list_dead(&self, name: &str, limit: usize, offset: usize) -> Result<Vec<String>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let mut conn = self.conn.clone();
        let entries: Vec<String> = conn
            .lrange(
                RedisKeys::new(name).dead(),
                offset as isize,
                (offset + limit - 1) as isize,
            )
            .await
            .map_err(|e| PaceqError::Backend(e.to_string()))?;
        Ok(entries)
    }

    async fn record_failure(&self, name: &str, rand_id: &str) -> Result<u64> {
        let mut conn = self.conn.clone();
        let count: u64 = conn
            .hincr(RedisKeys::new(name).failures(), rand_id, 1)
            .await
            .map_err(|e| PaceqError::Backend(e.to_string()))?;
        Ok(count)
    }

    async fn clear_failures(&self, name: &str, rand_id: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.hdel::<_, _, ()>(RedisKeys::new(name).failures(), rand_id)
            .await
            .map_err(|e| PaceqError::Backend(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redis_keys() {
        let keys = RedisKeys::new("emails");
        assert_eq!(keys.name(), "emails");
        assert_eq!(keys.items(), "_paceq_:emails:items");
        assert_eq!(keys.dead(), "_paceq_:emails:dead");
        assert_eq!(keys.failures(), "_paceq_:emails:failures");
    }
}
