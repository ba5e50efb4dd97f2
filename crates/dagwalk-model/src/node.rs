//! The universal document value.
//!
//! [`Node`] is a self-describing tree: scalars, ordered lists, key-ordered
//! maps, and links to other blocks. Nodes are plain values; nothing in this
//! crate mutates a node once it has been built and handed out.
//!
//! # Invariants
//!
//! - Map keys are unique ([`NodeMap`] replaces on duplicate insert).
//! - Map entries keep insertion order, so a decoded document re-encodes
//!   with the same key order.
//! - A [`Node::Link`] has no children until a traversal resolves it.

use std::fmt;

use indexmap::IndexMap;

use dagwalk_types::Cid;

use crate::error::{ModelError, ModelResult};

/// Discriminator for the variants of [`Node`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Bool,
    Int,
    Float,
    String,
    Bytes,
    List,
    Map,
    Link,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::List => "list",
            Self::Map => "map",
            Self::Link => "link",
        };
        f.write_str(name)
    }
}

/// A document value.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    List(Vec<Node>),
    Map(NodeMap),
    /// Forward reference to a node stored in another block.
    Link(Cid),
}

impl Node {
    /// The kind of this node.
    pub fn kind(&self) -> Kind {
        match self {
            Self::Null => Kind::Null,
            Self::Bool(_) => Kind::Bool,
            Self::Int(_) => Kind::Int,
            Self::Float(_) => Kind::Float,
            Self::String(_) => Kind::String,
            Self::Bytes(_) => Kind::Bytes,
            Self::List(_) => Kind::List,
            Self::Map(_) => Kind::Map,
            Self::Link(_) => Kind::Link,
        }
    }

    /// Returns `true` for an unresolved link.
    pub fn is_link(&self) -> bool {
        matches!(self, Self::Link(_))
    }

    pub fn as_link(&self) -> Option<&Cid> {
        match self {
            Self::Link(cid) => Some(cid),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Number of members of a list or map; `None` for every other kind.
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::List(items) => Some(items.len()),
            Self::Map(map) => Some(map.len()),
            _ => None,
        }
    }

    /// Look up a map entry by key.
    ///
    /// Fails with [`ModelError::WrongKind`] if this is not a map and with
    /// [`ModelError::KeyNotFound`] if the key is absent.
    pub fn lookup_key(&self, key: &str) -> ModelResult<&Node> {
        match self {
            Self::Map(map) => map
                .get(key)
                .ok_or_else(|| ModelError::KeyNotFound(key.to_owned())),
            other => Err(ModelError::WrongKind {
                expected: Kind::Map,
                actual: other.kind(),
            }),
        }
    }

    /// Look up a list element by position.
    ///
    /// Fails with [`ModelError::WrongKind`] if this is not a list and with
    /// [`ModelError::IndexOutOfRange`] past the end.
    pub fn lookup_index(&self, index: usize) -> ModelResult<&Node> {
        match self {
            Self::List(items) => items.get(index).ok_or(ModelError::IndexOutOfRange {
                index,
                len: items.len(),
            }),
            other => Err(ModelError::WrongKind {
                expected: Kind::List,
                actual: other.kind(),
            }),
        }
    }

    /// Every link reachable from this node without crossing a link, in
    /// document order.
    pub fn links(&self) -> Vec<&Cid> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                Self::Link(cid) => out.push(cid),
                // Pushed in reverse so the stack pops in document order.
                Self::List(items) => stack.extend(items.iter().rev()),
                Self::Map(map) => stack.extend(map.values().rev()),
                _ => {}
            }
        }
        out
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Node {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Node {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Vec<u8>> for Node {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<Vec<Node>> for Node {
    fn from(items: Vec<Node>) -> Self {
        Self::List(items)
    }
}

impl From<NodeMap> for Node {
    fn from(map: NodeMap) -> Self {
        Self::Map(map)
    }
}

impl From<Cid> for Node {
    fn from(cid: Cid) -> Self {
        Self::Link(cid)
    }
}

/// Insertion-ordered map with unique string keys.
///
/// Backed by an [`IndexMap`], so lookups are constant time while entries
/// keep the order they were inserted in. Equality is order-sensitive: two
/// maps with the same entries in a different order encode differently.
#[derive(Clone, Debug, Default)]
pub struct NodeMap {
    entries: IndexMap<String, Node>,
}

impl NodeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Insert an entry. An existing key keeps its position and has its value
    /// replaced; the old value is returned.
    pub fn insert(&mut self, key: impl Into<String>, value: Node) -> Option<Node> {
        self.entries.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl DoubleEndedIterator<Item = &Node> {
        self.entries.values()
    }
}

impl PartialEq for NodeMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len() && self.entries.iter().eq(other.entries.iter())
    }
}

impl<K: Into<String>> FromIterator<(K, Node)> for NodeMap {
    fn from_iter<I: IntoIterator<Item = (K, Node)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl IntoIterator for NodeMap {
    type Item = (String, Node);
    type IntoIter = indexmap::map::IntoIter<String, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
