use dagwalk_types::Cid;

use crate::context::CancelReason;

/// Errors from block store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested block was not found.
    #[error("block not found: {0}")]
    NotFound(Cid),

    /// The store could not be reached (daemon down, connection reset, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// The caller's context was cancelled or its deadline passed.
    #[error("operation cancelled: {0}")]
    Cancelled(CancelReason),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Storage backend does not accept writes.
    #[error("store is read-only")]
    ReadOnly,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
