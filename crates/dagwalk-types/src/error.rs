use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid content identifier {value:?}: {reason}")]
    InvalidCid { value: String, reason: &'static str },
}

/// Result alias for type operations.
pub type TypeResult<T> = Result<T, TypeError>;
