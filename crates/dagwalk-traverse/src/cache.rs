//! Shared cache of decoded link targets.

use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::OnceCell;

use dagwalk_codec::Representation;
use dagwalk_model::Node;
use dagwalk_types::Cid;

use crate::error::TraversalResult;

type CacheKey = (Cid, Representation);

/// Concurrency-safe map from `(cid, representation)` to decoded node.
///
/// At most one load per key is in flight: concurrent callers for the same
/// key wait on the first one. Failed loads are not cached, so the next
/// caller tries again.
///
/// Share one cache between [`LinkSystem`]s with `Arc`.
///
/// [`LinkSystem`]: crate::LinkSystem
#[derive(Debug, Default)]
pub struct NodeCache {
    entries: DashMap<CacheKey, Arc<OnceCell<Node>>>,
}

impl NodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached node for `cid`, running `load` on a miss.
    pub fn get_or_try_load<F>(
        &self,
        cid: &Cid,
        representation: Representation,
        load: F,
    ) -> TraversalResult<Node>
    where
        F: FnOnce() -> TraversalResult<Node>,
    {
        // Clone the cell out so the map shard is unlocked while loading.
        let cell = Arc::clone(&*self.entries.entry((cid.clone(), representation)).or_default());
        cell.get_or_try_init(load).cloned()
    }

    /// Whether a decoded node is cached for this key.
    pub fn contains(&self, cid: &Cid, representation: Representation) -> bool {
        self.entries
            .get(&(cid.clone(), representation))
            .is_some_and(|cell| cell.value().get().is_some())
    }

    /// Number of cached nodes.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.value().get().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}
