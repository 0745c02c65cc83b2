use thiserror::Error;

use crate::{ExpectedVersion, Version};

/// Errors raised by event store operations.
#[derive(Debug, Error)]
pub enum EventStoreError {
    /// The stream was not at the version the caller expected.
    #[error("Version conflict on {aggregate_id}: expected {expected}, stream is at {actual}")]
    ConcurrencyConflict {
        aggregate_id: String,
        expected: ExpectedVersion,
        actual: Version,
    },

    /// The batch reuses a version already present in the stream.
    #[error("Version {version} of {aggregate_id} is already stored")]
    DuplicateVersion {
        aggregate_id: String,
        version: Version,
    },

    /// The batch handed to `append` was malformed.
    #[error("Invalid batch: {0}")]
    InvalidBatch(String),

    /// A payload could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for event store operations.
pub type Result<T> = std::result::Result<T, EventStoreError>;
