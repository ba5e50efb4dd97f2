//! Block storage for dagwalk.
//!
//! A block store is a key/value byte store addressed by [`Cid`]. Traversal
//! needs only two reads from it, [`BlockStore::has`] and
//! [`BlockStore::get`]; writing is optional and used by tooling that builds
//! documents.
//!
//! # Backends
//!
//! All backends implement the [`BlockStore`] trait:
//!
//! - [`InMemoryBlockStore`] -- `HashMap`-based store for tests and embedding
//! - [`FsBlockStore`] -- one file per block in a directory
//!
//! # Design Rules
//!
//! 1. Blocks are immutable once written.
//! 2. Every call takes a [`FetchContext`] and fails with
//!    [`StoreError::Cancelled`] once it is cancelled or past its deadline.
//! 3. Concurrent reads are always safe.
//! 4. The store never interprets block contents.
//! 5. All I/O errors are propagated, never silently ignored.
//!
//! [`Cid`]: dagwalk_types::Cid

pub mod context;
pub mod error;
pub mod fs;
pub mod memory;
pub mod traits;

pub use context::{CancelHandle, CancelReason, FetchContext};
pub use error::{StoreError, StoreResult};
pub use fs::FsBlockStore;
pub use memory::InMemoryBlockStore;
pub use traits::BlockStore;
