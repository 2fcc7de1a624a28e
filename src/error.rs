//! Error types for the paceq library.

use thiserror::Error;

/// The main error type for the paceq library.
#[derive(Error, Debug)]
pub enum PaceqError {
    /// Backend connection or operation error.
    #[error("Backend error: {0}")]
    Backend(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A processor invocation failed for an identifier.
    #[error("Invocation of {rand_id} failed: {message}")]
    Invocation {
        /// The identifier that was being processed.
        rand_id: String,
        /// Message from the failed invocation.
        message: String,
    },

    /// Re-enqueueing an identifier after a failed invocation failed.
    ///
    /// The identifier is in neither the queue nor the dead-letter list
    /// at this point; it will not be reprocessed.
    #[error("Failed to push back {rand_id}: {source}")]
    PushBack {
        /// The identifier that could not be re-enqueued.
        rand_id: String,
        /// The underlying store error.
        #[source]
        source: Box<PaceqError>,
    },

    /// Writing a dead-letter record for an identifier failed.
    ///
    /// Like [`PaceqError::PushBack`], the identifier is lost from the
    /// queue when this is reported.
    #[error("Failed to dead-letter {rand_id}: {source}")]
    DeadLetter {
        /// The identifier that could not be dead-lettered.
        rand_id: String,
        /// The underlying error.
        #[source]
        source: Box<PaceqError>,
    },
}

/// Result type alias using PaceqError.
pub type Result<T> = std::result::Result<T, PaceqError>;
