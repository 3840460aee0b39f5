//! Stat store error types.

use thiserror::Error;

/// Stat store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backing file or service could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored record could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Store refused the operation
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for stat store operations
pub type StoreResult<T> = Result<T, StoreError>;
