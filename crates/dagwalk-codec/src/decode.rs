//! Text → [`Node`] decoding.
//!
//! Decoding runs in two passes. serde_json drives a visitor that builds a
//! raw tree keeping every map entry in order (duplicates included); the raw
//! tree is then lowered into a [`Node`], which is where duplicate keys,
//! link markers and bytes wrappers are recognised.

use std::fmt;

use base64::Engine;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};

use dagwalk_model::{Node, NodeMap};
use dagwalk_types::Cid;

use crate::b64;
use crate::error::{CodecError, CodecResult};
use crate::{BYTES_KEY, LINK_KEY, MAX_NESTING};

/// Strategy used to build nodes from decoded text.
///
/// Picked per link by a traversal's prototype chooser. Only the generic
/// representation exists today; new shapes are added as variants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Representation {
    /// The general-purpose [`Node`] tree.
    #[default]
    Generic,
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generic => f.write_str("generic"),
        }
    }
}

/// Decode a document with the generic representation.
pub fn decode(bytes: &[u8]) -> CodecResult<Node> {
    decode_with(bytes, Representation::Generic)
}

/// Decode a document held in a string.
pub fn decode_str(text: &str) -> CodecResult<Node> {
    decode(text.as_bytes())
}

/// Decode a document with an explicit representation.
pub fn decode_with(bytes: &[u8], representation: Representation) -> CodecResult<Node> {
    match representation {
        Representation::Generic => {
            let mut de = serde_json::Deserializer::from_slice(bytes);
            let raw = Raw::deserialize(&mut de).map_err(malformed)?;
            de.end().map_err(malformed)?;
            lower(raw, 0)
        }
    }
}

fn malformed(err: serde_json::Error) -> CodecError {
    CodecError::MalformedInput(err.to_string())
}

/// JSON as parsed, before reserved shapes and duplicates are checked.
enum Raw {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Raw>),
    Map(Vec<(String, Raw)>),
}

impl<'de> Deserialize<'de> for Raw {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RawVisitor)
    }
}

struct RawVisitor;

impl<'de> Visitor<'de> for RawVisitor {
    type Value = Raw;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Raw, E> {
        Ok(Raw::Null)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Raw, E> {
        Ok(Raw::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Raw, E> {
        Ok(Raw::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Raw, E> {
        i64::try_from(v)
            .map(Raw::Int)
            .map_err(|_| E::custom(format!("integer {v} out of range")))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Raw, E> {
        Ok(Raw::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Raw, E> {
        Ok(Raw::String(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Raw, E> {
        Ok(Raw::String(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Raw, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Raw::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Raw, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, Raw>()? {
            entries.push((key, value));
        }
        Ok(Raw::Map(entries))
    }
}

fn lower(raw: Raw, depth: usize) -> CodecResult<Node> {
    Ok(match raw {
        Raw::Null => Node::Null,
        Raw::Bool(b) => Node::Bool(b),
        Raw::Int(i) => Node::Int(i),
        Raw::Float(f) => Node::Float(f),
        Raw::String(s) => Node::String(s),
        Raw::List(items) => {
            let depth = enter(depth)?;
            Node::List(
                items
                    .into_iter()
                    .map(|item| lower(item, depth))
                    .collect::<CodecResult<_>>()?,
            )
        }
        Raw::Map(entries) => lower_map(entries, enter(depth)?)?,
    })
}

/// One level deeper, or an error past [`MAX_NESTING`].
fn enter(depth: usize) -> CodecResult<usize> {
    let depth = depth + 1;
    if depth > MAX_NESTING {
        return Err(CodecError::NestingTooDeep { limit: MAX_NESTING });
    }
    Ok(depth)
}

/// `depth` already counts the map being lowered.
fn lower_map(mut entries: Vec<(String, Raw)>, depth: usize) -> CodecResult<Node> {
    if entries.len() == 1 && entries[0].0 == LINK_KEY {
        let (key, value) = entries.remove(0);
        return match value {
            Raw::String(s) => Ok(Node::Link(Cid::parse(&s)?)),
            Raw::Map(inner) => {
                let inner_depth = enter(depth)?;
                match bytes_payload(inner)? {
                    Ok(bytes) => Ok(Node::Bytes(bytes)),
                    Err(inner) => {
                        let mut map = NodeMap::with_capacity(1);
                        map.insert(key, lower_map(inner, inner_depth)?);
                        Ok(Node::Map(map))
                    }
                }
            }
            other => {
                let mut map = NodeMap::with_capacity(1);
                map.insert(key, lower(other, depth)?);
                Ok(Node::Map(map))
            }
        };
    }

    let mut map = NodeMap::with_capacity(entries.len());
    for (key, value) in entries {
        if map.contains_key(&key) {
            return Err(CodecError::DuplicateKey(key));
        }
        let value = lower(value, depth)?;
        map.insert(key, value);
    }
    Ok(Node::Map(map))
}

/// Recognise the inside of a `{"/": {"bytes": "..."}}` wrapper. Hands the
/// entries back untouched when they are not a bytes payload.
fn bytes_payload(
    inner: Vec<(String, Raw)>,
) -> CodecResult<Result<Vec<u8>, Vec<(String, Raw)>>> {
    match <[(String, Raw); 1]>::try_from(inner) {
        Ok([(key, Raw::String(encoded))]) if key == BYTES_KEY => b64::ENGINE
            .decode(encoded.as_bytes())
            .map(Ok)
            .map_err(|e| {
                CodecError::MalformedInput(format!("invalid base64 in bytes wrapper: {e}"))
            }),
        Ok([entry]) => Ok(Err(vec![entry])),
        Err(inner) => Ok(Err(inner)),
    }
}
