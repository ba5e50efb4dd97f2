//! Error types for document model lookups.

use crate::node::Kind;

/// Errors from looking up members of a [`Node`](crate::Node).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// The node is not of the kind the operation needs.
    #[error("wrong kind: expected {expected}, found {actual}")]
    WrongKind { expected: Kind, actual: Kind },

    /// The map has no entry with this key.
    #[error("key not found: {0:?}")]
    KeyNotFound(String),

    /// The list is shorter than the requested index.
    #[error("index {index} out of range for list of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Convenience alias for model results.
pub type ModelResult<T> = Result<T, ModelError>;
