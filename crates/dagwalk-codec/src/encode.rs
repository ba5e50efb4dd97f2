//! [`Node`] → text encoding.

use std::io::Write;

use base64::Engine;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use dagwalk_model::Node;

use crate::b64;
use crate::error::{CodecError, CodecResult};
use crate::{BYTES_KEY, LINK_KEY, MAX_NESTING};

/// Encode a node as compact JSON.
pub fn encode(node: &Node) -> CodecResult<Vec<u8>> {
    check_encodable(node)?;
    serde_json::to_vec(&Encoded(node)).map_err(|e| CodecError::Serialization(e.to_string()))
}

/// Encode a node as indented JSON for display.
pub fn encode_pretty(node: &Node) -> CodecResult<Vec<u8>> {
    check_encodable(node)?;
    serde_json::to_vec_pretty(&Encoded(node)).map_err(|e| CodecError::Serialization(e.to_string()))
}

/// Encode a node straight into a writer.
pub fn encode_to_writer<W: Write>(writer: W, node: &Node, pretty: bool) -> CodecResult<()> {
    check_encodable(node)?;
    let result = if pretty {
        serde_json::to_writer_pretty(writer, &Encoded(node))
    } else {
        serde_json::to_writer(writer, &Encoded(node))
    };
    result.map_err(|e| {
        if e.is_io() {
            CodecError::Io(e.into())
        } else {
            CodecError::Serialization(e.to_string())
        }
    })
}

/// Reject values with no faithful JSON form before anything is written.
fn check_encodable(node: &Node) -> CodecResult<()> {
    // Each entry carries the number of containers enclosing the node.
    let mut stack = vec![(node, 0usize)];
    while let Some((node, depth)) = stack.pop() {
        let own = match node {
            Node::Bytes(_) => 2,
            Node::List(_) | Node::Map(_) | Node::Link(_) => 1,
            _ => 0,
        };
        if depth + own > MAX_NESTING {
            return Err(CodecError::NestingTooDeep { limit: MAX_NESTING });
        }
        match node {
            Node::Float(f) if !f.is_finite() => return Err(CodecError::NonFiniteFloat(*f)),
            Node::List(items) => stack.extend(items.iter().map(|item| (item, depth + 1))),
            Node::Map(map) => {
                if is_reserved_shape(node) {
                    return Err(CodecError::ReservedShape);
                }
                stack.extend(map.values().map(|value| (value, depth + 1)));
            }
            _ => {}
        }
    }
    Ok(())
}

/// A plain map that would read back as a link or a bytes wrapper.
fn is_reserved_shape(node: &Node) -> bool {
    let Node::Map(map) = node else {
        return false;
    };
    if map.len() != 1 {
        return false;
    }
    match map.get(LINK_KEY) {
        Some(Node::String(_)) => true,
        Some(Node::Map(inner)) => {
            inner.len() == 1 && matches!(inner.get(BYTES_KEY), Some(Node::String(_)))
        }
        _ => false,
    }
}

struct Encoded<'a>(&'a Node);

impl Serialize for Encoded<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Node::Null => serializer.serialize_unit(),
            Node::Bool(b) => serializer.serialize_bool(*b),
            Node::Int(i) => serializer.serialize_i64(*i),
            Node::Float(f) => serializer.serialize_f64(*f),
            Node::String(s) => serializer.serialize_str(s),
            Node::Bytes(bytes) => {
                let mut outer = serializer.serialize_map(Some(1))?;
                outer.serialize_entry(LINK_KEY, &BytesPayload(bytes))?;
                outer.end()
            }
            Node::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(&Encoded(item))?;
                }
                seq.end()
            }
            Node::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map.iter() {
                    out.serialize_entry(key, &Encoded(value))?;
                }
                out.end()
            }
            Node::Link(cid) => {
                let mut out = serializer.serialize_map(Some(1))?;
                out.serialize_entry(LINK_KEY, cid.as_str())?;
                out.end()
            }
        }
    }
}

struct BytesPayload<'a>(&'a [u8]);

impl Serialize for BytesPayload<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut out = serializer.serialize_map(Some(1))?;
        out.serialize_entry(BYTES_KEY, &b64::ENGINE.encode(self.0))?;
        out.end()
    }
}
