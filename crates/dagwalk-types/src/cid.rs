use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{TypeError, TypeResult};

/// Longest identifier accepted by [`Cid::parse`].
pub const MAX_CID_LEN: usize = 512;

/// Header of the canonical identifier form, before the digest:
/// multibase `f` (base16), CIDv1, codec `dag-json` (0x0129 as a varint),
/// multihash `blake3` (0x1e) with a 32-byte length.
const CANONICAL_PREFIX: &str = "f01a9021e20";

/// Content identifier of an immutable block.
///
/// A `Cid` is treated as opaque text: any identifier the block store hands
/// out is accepted as long as it is syntactically plausible (ASCII
/// alphanumeric, which covers the base16, base32 and base58 multibase
/// alphabets). Identifiers generated by [`Cid::for_block`] additionally carry
/// a BLAKE3 digest of the block, recoverable with [`Cid::digest`].
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cid(String);

impl Cid {
    /// Parse an identifier, validating its syntax only.
    pub fn parse(s: &str) -> TypeResult<Self> {
        if s.is_empty() {
            return Err(invalid(s, "empty identifier"));
        }
        if s.len() > MAX_CID_LEN {
            return Err(invalid(s, "identifier too long"));
        }
        if !s.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(invalid(s, "identifier must be ASCII alphanumeric"));
        }
        Ok(Self(s.to_owned()))
    }

    /// Build the canonical identifier for a BLAKE3 digest.
    pub fn from_digest(digest: [u8; 32]) -> Self {
        Self(format!("{CANONICAL_PREFIX}{}", hex::encode(digest)))
    }

    /// Compute the canonical identifier of a block's bytes.
    pub fn for_block(data: &[u8]) -> Self {
        Self::from_digest(*blake3::hash(data).as_bytes())
    }

    /// The BLAKE3 digest carried by a canonical identifier.
    ///
    /// Returns `None` for identifiers in any other form; those cannot be
    /// checked against block contents.
    pub fn digest(&self) -> Option<[u8; 32]> {
        let hex_digest = self.0.strip_prefix(CANONICAL_PREFIX)?;
        if hex_digest.len() != 64 || hex_digest.bytes().any(|b| b.is_ascii_uppercase()) {
            return None;
        }
        let mut out = [0u8; 32];
        hex::decode_to_slice(hex_digest, &mut out).ok()?;
        Some(out)
    }

    /// Check a block's bytes against this identifier.
    ///
    /// `None` means the identifier carries no digest.
    pub fn verify(&self, data: &[u8]) -> Option<bool> {
        self.digest()
            .map(|expected| *blake3::hash(data).as_bytes() == expected)
    }

    /// The identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form for logs: the first 8 digest hex digits when a digest is
    /// present, otherwise the first 16 characters.
    pub fn short(&self) -> String {
        match self.digest() {
            Some(d) => hex::encode(&d[..4]),
            None => self.0.chars().take(16).collect(),
        }
    }
}

fn invalid(value: &str, reason: &'static str) -> TypeError {
    TypeError::InvalidCid {
        value: value.chars().take(64).collect(),
        reason,
    }
}

impl fmt::Debug for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cid({})", self.short())
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Cid {
    type Err = TypeError;

    fn from_str(s: &str) -> TypeResult<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Cid {
    type Error = TypeError;

    fn try_from(s: String) -> TypeResult<Self> {
        Self::parse(&s)
    }
}

impl From<Cid> for String {
    fn from(cid: Cid) -> Self {
        cid.0
    }
}

impl AsRef<str> for Cid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
