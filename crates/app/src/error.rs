//! Application error types.

use domain::{CartError, DomainError};
use thiserror::Error;

/// Errors that can occur while loading input or evaluating promotions.
#[derive(Debug, Error)]
pub enum AppError {
    /// An input file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An input file is not valid JSON for its document type.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration value is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The cart document describes an invalid cart.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// The domain layer rejected an operation.
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}
