use std::sync::Arc;

use dagwalk_types::Cid;

use crate::context::FetchContext;
use crate::error::{StoreError, StoreResult};

/// Content-addressed block store.
///
/// All implementations must satisfy these invariants:
/// - Blocks are immutable once written: a `Cid` always maps to the same bytes.
/// - Concurrent calls are safe (`Send + Sync`).
/// - `ctx` is honoured: a cancelled or expired context fails the call with
///   [`StoreError::Cancelled`].
/// - Connectivity failures are reported as errors, never as "absent".
pub trait BlockStore: Send + Sync {
    /// Check whether a block exists.
    fn has(&self, ctx: &FetchContext, cid: &Cid) -> StoreResult<bool>;

    /// Read a block's bytes.
    ///
    /// Returns [`StoreError::NotFound`] if the block does not exist.
    fn get(&self, ctx: &FetchContext, cid: &Cid) -> StoreResult<Vec<u8>>;

    /// Write a block and return its canonical identifier.
    ///
    /// Writing an existing block is a no-op. Read-only stores keep this
    /// default, which fails with [`StoreError::ReadOnly`].
    fn put(&self, ctx: &FetchContext, data: &[u8]) -> StoreResult<Cid> {
        let _ = (ctx, data);
        Err(StoreError::ReadOnly)
    }
}

impl<S: BlockStore + ?Sized> BlockStore for Arc<S> {
    fn has(&self, ctx: &FetchContext, cid: &Cid) -> StoreResult<bool> {
        (**self).has(ctx, cid)
    }

    fn get(&self, ctx: &FetchContext, cid: &Cid) -> StoreResult<Vec<u8>> {
        (**self).get(ctx, cid)
    }

    fn put(&self, ctx: &FetchContext, data: &[u8]) -> StoreResult<Cid> {
        (**self).put(ctx, data)
    }
}
