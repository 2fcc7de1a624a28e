//! Dead-letter records.

use serde::{Deserialize, Serialize};

/// A record written to the dead-letter list when the worker gives up on
/// an identifier: the retry policy was exhausted, or the processor
/// reported a non-retryable failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadEntry {
    /// The identifier that kept failing.
    pub rand_id: String,
    /// Message from the last failed invocation.
    pub error: String,
    /// Unix timestamp (seconds) when the identifier was dead-lettered.
    pub failed_at: i64,
}

impl DeadEntry {
    /// Create a new entry stamped with the current time.
    pub fn new(rand_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            rand_id: rand_id.into(),
            error: error.into(),
            failed_at: current_timestamp(),
        }
    }

    /// Serialize the entry to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize an entry from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Get current Unix timestamp in seconds.
fn current_timestamp() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}
