//! Canonical JSON codec for dagwalk documents.
//!
//! The text format is plain JSON with two reserved map shapes:
//!
//! - `{"/": "<cid>"}` is a [`Node::Link`](dagwalk_model::Node::Link)
//! - `{"/": {"bytes": "<base64>"}}` is a [`Node::Bytes`](dagwalk_model::Node::Bytes)
//!   (standard alphabet, written unpadded, read with or without padding)
//!
//! Everything else follows ordinary JSON semantics. Map key order is kept on
//! decode and re-emitted on encode, so `encode(decode(b))` differs from `b`
//! at most in whitespace.

pub mod decode;
pub mod encode;
pub mod error;

pub use decode::{decode, decode_str, decode_with, Representation};
pub use encode::{encode, encode_pretty, encode_to_writer};
pub use error::{CodecError, CodecResult};

/// The reserved map key marking a link or a bytes wrapper.
pub const LINK_KEY: &str = "/";

/// The key inside a bytes wrapper.
pub const BYTES_KEY: &str = "bytes";

/// Deepest nesting of JSON arrays and objects that decode accepts and
/// encode produces. A link counts as one level and a bytes wrapper as two.
/// Kept below serde_json's own recursion limit so every encodable node
/// decodes again.
pub const MAX_NESTING: usize = 100;

pub(crate) mod b64 {
    use base64::alphabet;
    use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

    pub(crate) const ENGINE: GeneralPurpose = GeneralPurpose::new(
        &alphabet::STANDARD,
        GeneralPurposeConfig::new()
            .with_encode_padding(false)
            .with_decode_padding_mode(DecodePaddingMode::Indifferent),
    );
}
