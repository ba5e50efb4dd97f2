use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use dagwalk_types::Cid;

use crate::context::FetchContext;
use crate::error::{StoreError, StoreResult};
use crate::traits::BlockStore;

/// In-memory, HashMap-based block store.
///
/// Intended for tests and embedding. Blocks are held behind a `RwLock` for
/// safe concurrent access and cloned on read.
pub struct InMemoryBlockStore {
    blocks: RwLock<HashMap<Cid, Vec<u8>>>,
}

impl InMemoryBlockStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            blocks: RwLock::new(HashMap::new()),
        }
    }

    /// Store bytes under an explicit identifier.
    ///
    /// Unlike [`BlockStore::put`] the identifier is not derived from the
    /// bytes, which lets fixtures use short opaque identifiers. Replaces any
    /// existing block under that identifier.
    pub fn insert(&self, cid: Cid, data: impl Into<Vec<u8>>) {
        self.blocks
            .write()
            .expect("lock poisoned")
            .insert(cid, data.into());
    }

    /// Number of blocks currently stored.
    pub fn len(&self) -> usize {
        self.blocks.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.blocks.read().expect("lock poisoned").is_empty()
    }

    /// Remove all blocks from the store.
    pub fn clear(&self) {
        self.blocks.write().expect("lock poisoned").clear();
    }
}

impl Default for InMemoryBlockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockStore for InMemoryBlockStore {
    fn has(&self, ctx: &FetchContext, cid: &Cid) -> StoreResult<bool> {
        ctx.check()?;
        Ok(self.blocks.read().expect("lock poisoned").contains_key(cid))
    }

    fn get(&self, ctx: &FetchContext, cid: &Cid) -> StoreResult<Vec<u8>> {
        ctx.check()?;
        self.blocks
            .read()
            .expect("lock poisoned")
            .get(cid)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(cid.clone()))
    }

    fn put(&self, ctx: &FetchContext, data: &[u8]) -> StoreResult<Cid> {
        ctx.check()?;
        let cid = Cid::for_block(data);
        let mut map = self.blocks.write().expect("lock poisoned");
        map.entry(cid.clone()).or_insert_with(|| data.to_vec());
        debug!(cid = %cid.short(), size = data.len(), "stored block in memory");
        Ok(cid)
    }
}

impl std::fmt::Debug for InMemoryBlockStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBlockStore")
            .field("block_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CancelReason;

    fn cid(s: &str) -> Cid {
        Cid::parse(s).unwrap()
    }

    #[test]
    fn put_and_get() {
        let store = InMemoryBlockStore::new();
        let ctx = FetchContext::new();
        let id = store.put(&ctx, b"[1,2]").unwrap();
        assert_eq!(id, Cid::for_block(b"[1,2]"));
        assert_eq!(store.get(&ctx, &id).unwrap(), b"[1,2]");
        assert!(store.has(&ctx, &id).unwrap());
    }

    #[test]
    fn put_is_idempotent() {
        let store = InMemoryBlockStore::new();
        let ctx = FetchContext::new();
        let a = store.put(&ctx, b"same").unwrap();
        let b = store.put(&ctx, b"same").unwrap();
        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn insert_with_opaque_identifier() {
        let store = InMemoryBlockStore::new();
        let ctx = FetchContext::new();
        store.insert(cid("bafy001"), br#"["x","y"]"#.to_vec());
        assert_eq!(store.get(&ctx, &cid("bafy001")).unwrap(), br#"["x","y"]"#);
    }

    #[test]
    fn missing_block() {
        let store = InMemoryBlockStore::new();
        let ctx = FetchContext::new();
        assert!(!store.has(&ctx, &cid("bafy404")).unwrap());
        assert!(matches!(
            store.get(&ctx, &cid("bafy404")),
            Err(StoreError::NotFound(c)) if c == cid("bafy404")
        ));
    }

    #[test]
    fn cancelled_context_fails_every_call() {
        let store = InMemoryBlockStore::new();
        store.insert(cid("bafy001"), b"1".to_vec());
        let ctx = FetchContext::new();
        ctx.cancel();
        assert!(matches!(
            store.has(&ctx, &cid("bafy001")),
            Err(StoreError::Cancelled(CancelReason::Requested))
        ));
        assert!(matches!(
            store.get(&ctx, &cid("bafy001")),
            Err(StoreError::Cancelled(_))
        ));
        assert!(matches!(store.put(&ctx, b"2"), Err(StoreError::Cancelled(_))));
    }

    #[test]
    fn insert_replaces_and_clear() {
        let store = InMemoryBlockStore::new();
        store.insert(cid("bafy1"), b"1".to_vec());
        store.insert(cid("bafy1"), b"one".to_vec());
        store.insert(cid("bafy2"), b"2".to_vec());
        assert_eq!(store.len(), 2);
        assert_eq!(
            store.get(&FetchContext::new(), &cid("bafy1")).unwrap(),
            b"one".to_vec()
        );
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn concurrent_reads() {
        use std::sync::Arc;
        let store = Arc::new(InMemoryBlockStore::new());
        let id = store.put(&FetchContext::new(), b"shared").unwrap();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                let id = id.clone();
                std::thread::spawn(move || store.get(&FetchContext::new(), &id).unwrap())
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), b"shared");
        }
    }

    #[test]
    fn debug_format() {
        let store = InMemoryBlockStore::new();
        assert!(format!("{store:?}").contains("block_count"));
    }
}
