//! Path traversal with transparent link following.
//!
//! [`Traversal`] walks a [`Path`] through a document. Whenever the walk has
//! to pass through a [`Node::Link`], the [`LinkSystem`] fetches the named
//! block from its [`BlockStore`], decodes it with the representation picked
//! by its prototype chooser, and the walk carries on inside the fetched
//! subtree. The caller sees one merged document.
//!
//! Links are resolved lazily: only links on the walked path are fetched,
//! and a link at the end of the path is returned as-is unless a final
//! resolve is asked for.
//!
//! ```no_run
//! use std::sync::Arc;
//! use dagwalk_model::Path;
//! use dagwalk_store::{FetchContext, InMemoryBlockStore};
//! use dagwalk_traverse::{LinkSystem, Traversal};
//!
//! let store = Arc::new(InMemoryBlockStore::new());
//! let links = LinkSystem::new(store);
//! let root = dagwalk_codec::decode_str(r#"{"a": {"/": "bafy001"}}"#).unwrap();
//! let node = Traversal::new(&links)
//!     .get(&FetchContext::new(), &root, &Path::parse("/a/1"))
//!     .unwrap();
//! ```
//!
//! [`Path`]: dagwalk_model::Path
//! [`Node::Link`]: dagwalk_model::Node::Link
//! [`BlockStore`]: dagwalk_store::BlockStore

pub mod cache;
pub mod config;
pub mod error;
pub mod link;
pub mod traversal;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::NodeCache;
pub use config::TraversalConfig;
pub use error::{ErrorKind, TraversalError, TraversalResult};
pub use link::{LinkContext, LinkSystem, PrototypeChooser};
pub use traversal::{get, LastBlock, Progress, Traversal, Walked};

pub use dagwalk_codec::Representation;
