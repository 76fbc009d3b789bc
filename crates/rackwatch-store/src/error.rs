//! Error types for the inventory store.

use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur talking to the inventory store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Endpoint or credential missing — fatal, nothing is attempted.
    #[error("store configuration error: {0}")]
    Config(String),

    #[error("store read failed: {0}")]
    Read(String),

    #[error("store write failed: {0}")]
    Write(String),

    #[error("deserialization error: {0}")]
    Deserialize(String),
}
