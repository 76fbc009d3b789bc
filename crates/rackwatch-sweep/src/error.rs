//! Error types for the sweep engine.

use thiserror::Error;

/// Fatal sweep failures. Per-probe failures are not errors — an
/// unreachable address is a valid `Down` outcome.
#[derive(Debug, Error)]
pub enum SweepError {
    /// Inventory fetch failed; no writes were attempted.
    #[error("{0}")]
    StoreRead(String),

    /// A status write failed; remaining write-backs were aborted and
    /// already-applied writes stay in place.
    #[error("{0}")]
    StoreWrite(String),
}
