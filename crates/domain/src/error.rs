//! Domain error types.

use event_store::EventStoreError;
use thiserror::Error;

use crate::promotion::{PromotionError, RepositoryError};

/// Errors that can occur during application-service operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A promotion rule or invariant rejected the operation.
    #[error("Promotion error: {0}")]
    Promotion(#[from] PromotionError),

    /// The promotion repository failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// An error occurred in the event store.
    #[error("Event store error: {0}")]
    EventStore(#[from] EventStoreError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DomainError {
    /// Returns true if the error reports a missing promotion.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::Promotion(PromotionError::NotFound { .. }))
    }
}
