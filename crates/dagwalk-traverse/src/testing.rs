//! Test doubles shared by the traversal tests.

use std::collections::HashMap;
use std::sync::Mutex;

use dagwalk_store::{BlockStore, FetchContext, InMemoryBlockStore, StoreError, StoreResult};
use dagwalk_types::Cid;

/// In-memory store that records every call and can simulate an
/// unreachable backend.
#[derive(Default)]
pub(crate) struct CountingStore {
    inner: InMemoryBlockStore,
    has_calls: Mutex<HashMap<Cid, usize>>,
    get_calls: Mutex<HashMap<Cid, usize>>,
    offline: Mutex<bool>,
}

impl CountingStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_block(self, cid: &str, json: &str) -> Self {
        self.inner
            .insert(Cid::parse(cid).unwrap(), json.as_bytes().to_vec());
        self
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        *self.offline.lock().unwrap() = offline;
    }

    pub(crate) fn has_count(&self, cid: &str) -> usize {
        let cid = Cid::parse(cid).unwrap();
        self.has_calls.lock().unwrap().get(&cid).copied().unwrap_or(0)
    }

    pub(crate) fn get_count(&self, cid: &str) -> usize {
        let cid = Cid::parse(cid).unwrap();
        self.get_calls.lock().unwrap().get(&cid).copied().unwrap_or(0)
    }

    pub(crate) fn total_calls(&self) -> usize {
        let has: usize = self.has_calls.lock().unwrap().values().sum();
        let get: usize = self.get_calls.lock().unwrap().values().sum();
        has + get
    }

    fn check_online(&self) -> StoreResult<()> {
        if *self.offline.lock().unwrap() {
            Err(StoreError::Transport("connection refused".into()))
        } else {
            Ok(())
        }
    }
}

impl BlockStore for CountingStore {
    fn has(&self, ctx: &FetchContext, cid: &Cid) -> StoreResult<bool> {
        *self.has_calls.lock().unwrap().entry(cid.clone()).or_default() += 1;
        self.check_online()?;
        self.inner.has(ctx, cid)
    }

    fn get(&self, ctx: &FetchContext, cid: &Cid) -> StoreResult<Vec<u8>> {
        *self.get_calls.lock().unwrap().entry(cid.clone()).or_default() += 1;
        self.check_online()?;
        self.inner.get(ctx, cid)
    }
}
