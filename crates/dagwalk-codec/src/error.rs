use dagwalk_types::TypeError;

/// Errors from decoding or encoding documents.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The input is not well-formed JSON, or holds a value the model cannot
    /// represent (e.g. an integer beyond the 64-bit range).
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A map repeats a key.
    #[error("duplicate map key: {0:?}")]
    DuplicateKey(String),

    /// A link marker's value is not a valid content identifier.
    #[error("invalid link identifier: {0}")]
    InvalidLinkIdentifier(#[from] TypeError),

    /// NaN and infinities have no JSON form.
    #[error("cannot encode non-finite float {0}")]
    NonFiniteFloat(f64),

    /// A regular map has the shape reserved for links or bytes and would
    /// decode as something else.
    #[error("map uses the reserved \"/\" shape and cannot be encoded as a plain map")]
    ReservedShape,

    /// Arrays and objects nest deeper than [`MAX_NESTING`](crate::MAX_NESTING).
    #[error("nesting deeper than {limit} levels")]
    NestingTooDeep { limit: usize },

    /// The serializer failed while writing output.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O failure while writing encoded output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
