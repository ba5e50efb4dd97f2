//! Generic document model for dagwalk.
//!
//! A document is a tree of [`Node`] values. Any subtree may be replaced by a
//! [`Node::Link`] naming a separately stored block; links are kept as plain
//! identifiers until something walks through them.
//!
//! [`Path`] is the slash-delimited address of a subtree. How a segment is
//! applied (map key or list index) is decided by the kind of node it is
//! applied to, never by what the segment looks like.

pub mod error;
pub mod node;
pub mod path;

pub use error::{ModelError, ModelResult};
pub use node::{Kind, Node, NodeMap};
pub use path::{Path, PathSegment};

pub use dagwalk_types::Cid;
