//! Error types for traversal.

use std::fmt;

use dagwalk_codec::CodecError;
use dagwalk_model::{Kind, ModelError, Path};
use dagwalk_store::{CancelReason, StoreError};
use dagwalk_types::Cid;

/// Errors that can occur while walking a path.
///
/// Path errors carry the location of the node the failing segment was
/// applied to; link errors carry the identifier being resolved.
#[derive(Debug, thiserror::Error)]
pub enum TraversalError {
    /// The segment cannot be applied to a node of this kind.
    #[error("cannot apply segment {segment:?} to {kind} at {at}")]
    PathNotFound {
        at: Path,
        segment: String,
        kind: Kind,
    },

    /// The map at `at` has no such key.
    #[error("key {key:?} not found in map at {at}")]
    KeyNotFound { at: Path, key: String },

    /// The list at `at` is too short.
    #[error("index {index} out of range for list of length {len} at {at}")]
    IndexOutOfRange { at: Path, index: usize, len: usize },

    /// A lookup was made against a node of the wrong kind.
    #[error("expected {expected} at {at}, found {actual}")]
    WrongKind {
        at: Path,
        expected: Kind,
        actual: Kind,
    },

    /// The store does not have the linked block.
    #[error("block unavailable: {cid}")]
    BlockUnavailable { cid: Cid },

    /// The store could not be reached while resolving `cid`.
    #[error("transport error resolving {cid}: {source}")]
    Transport {
        cid: Cid,
        #[source]
        source: StoreError,
    },

    /// The fetch context was cancelled or its deadline passed.
    #[error("traversal cancelled: {0}")]
    Cancelled(CancelReason),

    /// A fetched block could not be decoded.
    #[error("cannot decode block {cid}: {source}")]
    Decode {
        cid: Cid,
        #[source]
        source: CodecError,
    },

    /// More links were crossed than the configured budget allows.
    #[error("link budget of {limit} exhausted")]
    BudgetExceeded { limit: usize },

    /// A chain of blocks that hold nothing but links leads back to `cid`.
    #[error("link cycle through {cid}")]
    LinkCycle { cid: Cid },

    /// A fetched block does not hash to its identifier.
    #[error("block {cid} does not match its identifier")]
    HashMismatch { cid: Cid },

    /// Verification is on but the identifier carries no digest.
    #[error("block {cid} cannot be verified: identifier carries no digest")]
    Unverifiable { cid: Cid },

    /// The prototype chooser refused to pick a representation for a link.
    #[error("no representation for {cid}: {reason}")]
    UnsupportedRepresentation { cid: Cid, reason: String },
}

impl TraversalError {
    /// Attach a location to a model lookup failure.
    pub fn from_model(err: ModelError, at: &Path) -> Self {
        let at = at.clone();
        match err {
            ModelError::KeyNotFound(key) => Self::KeyNotFound { at, key },
            ModelError::IndexOutOfRange { index, len } => Self::IndexOutOfRange { at, index, len },
            ModelError::WrongKind { expected, actual } => Self::WrongKind {
                at,
                expected,
                actual,
            },
        }
    }

    /// Classify a store failure seen while resolving `cid`.
    ///
    /// A block that vanished between `has` and `get` is reported as
    /// unavailable, cancellation keeps its reason, and everything else is a
    /// transport failure.
    pub fn from_store(err: StoreError, cid: &Cid) -> Self {
        match err {
            StoreError::NotFound(_) => Self::BlockUnavailable { cid: cid.clone() },
            StoreError::Cancelled(reason) => Self::Cancelled(reason),
            source => Self::Transport {
                cid: cid.clone(),
                source,
            },
        }
    }

    /// Which entry of the error taxonomy this is.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PathNotFound { .. } => ErrorKind::PathNotFound,
            Self::KeyNotFound { .. } => ErrorKind::KeyNotFound,
            Self::IndexOutOfRange { .. } => ErrorKind::IndexOutOfRange,
            Self::WrongKind { .. } => ErrorKind::WrongKind,
            Self::BlockUnavailable { .. } => ErrorKind::BlockUnavailable,
            Self::Transport { .. } => ErrorKind::TransportError,
            Self::Cancelled(_) => ErrorKind::Cancelled,
            Self::Decode { source, .. } => match source {
                CodecError::MalformedInput(_) => ErrorKind::MalformedInput,
                CodecError::DuplicateKey(_) => ErrorKind::DuplicateKey,
                CodecError::InvalidLinkIdentifier(_) => ErrorKind::InvalidLinkIdentifier,
                _ => ErrorKind::MalformedInput,
            },
            Self::BudgetExceeded { .. } => ErrorKind::BudgetExceeded,
            Self::LinkCycle { .. } => ErrorKind::LinkCycle,
            Self::HashMismatch { .. } => ErrorKind::HashMismatch,
            Self::Unverifiable { .. } => ErrorKind::Unverifiable,
            Self::UnsupportedRepresentation { .. } => ErrorKind::UnsupportedRepresentation,
        }
    }
}

/// Flat classification of [`TraversalError`], for matching without caring
/// about payloads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MalformedInput,
    DuplicateKey,
    InvalidLinkIdentifier,
    WrongKind,
    KeyNotFound,
    IndexOutOfRange,
    PathNotFound,
    BlockUnavailable,
    TransportError,
    Cancelled,
    BudgetExceeded,
    LinkCycle,
    HashMismatch,
    Unverifiable,
    UnsupportedRepresentation,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Convenience alias for traversal results.
pub type TraversalResult<T> = Result<T, TraversalError>;
