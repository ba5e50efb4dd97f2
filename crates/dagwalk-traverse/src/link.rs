//! Link resolution: block fetch plus representation choice.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use dagwalk_codec::{decode_with, Representation};
use dagwalk_model::{Node, Path};
use dagwalk_store::{BlockStore, FetchContext};
use dagwalk_types::Cid;

use crate::cache::NodeCache;
use crate::error::{TraversalError, TraversalResult};

/// Where a link was met during a walk.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinkContext {
    /// Path from the traversal root to the link.
    pub path: Path,
    /// The block the link was found in; `None` for the caller's root tree.
    pub parent_block: Option<Cid>,
}

/// Picks the representation used to decode a linked block.
pub type PrototypeChooser =
    dyn Fn(&Cid, &LinkContext) -> TraversalResult<Representation> + Send + Sync;

fn generic_chooser(_: &Cid, _: &LinkContext) -> TraversalResult<Representation> {
    Ok(Representation::Generic)
}

/// Everything a traversal needs to follow links: a block store, a prototype
/// chooser, and optionally a shared cache and content verification.
///
/// A `LinkSystem` is an explicit value handed to each traversal; there is no
/// process-wide store connection.
#[derive(Clone)]
pub struct LinkSystem {
    store: Arc<dyn BlockStore>,
    chooser: Arc<PrototypeChooser>,
    cache: Option<Arc<NodeCache>>,
    verify_blocks: bool,
}

impl LinkSystem {
    /// A link system over `store` that decodes every block generically.
    pub fn new(store: Arc<dyn BlockStore>) -> Self {
        Self {
            store,
            chooser: Arc::new(generic_chooser),
            cache: None,
            verify_blocks: false,
        }
    }

    /// Replace the prototype chooser.
    pub fn with_chooser<F>(mut self, chooser: F) -> Self
    where
        F: Fn(&Cid, &LinkContext) -> TraversalResult<Representation> + Send + Sync + 'static,
    {
        self.chooser = Arc::new(chooser);
        self
    }

    /// Serve repeated resolutions from `cache`.
    pub fn with_cache(mut self, cache: Arc<NodeCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Check fetched bytes against their identifier's digest.
    ///
    /// Off by default: the store is trusted to return the right bytes.
    pub fn with_verification(mut self, verify_blocks: bool) -> Self {
        self.verify_blocks = verify_blocks;
        self
    }

    pub fn cache(&self) -> Option<&NodeCache> {
        self.cache.as_deref()
    }

    pub fn verifies_blocks(&self) -> bool {
        self.verify_blocks
    }

    /// Resolve a link to the node stored in its block.
    ///
    /// Asks the store `has` first; `false` fails with
    /// [`TraversalError::BlockUnavailable`] without calling `get`. `ctx` is
    /// passed unchanged to both calls.
    pub fn load(
        &self,
        ctx: &FetchContext,
        cid: &Cid,
        link_ctx: &LinkContext,
    ) -> TraversalResult<Node> {
        let representation = (self.chooser)(cid, link_ctx)?;
        match &self.cache {
            Some(cache) => cache.get_or_try_load(cid, representation, || {
                self.fetch_and_decode(ctx, cid, representation)
            }),
            None => self.fetch_and_decode(ctx, cid, representation),
        }
    }

    fn fetch_and_decode(
        &self,
        ctx: &FetchContext,
        cid: &Cid,
        representation: Representation,
    ) -> TraversalResult<Node> {
        let present = self
            .store
            .has(ctx, cid)
            .map_err(|e| TraversalError::from_store(e, cid))?;
        if !present {
            return Err(TraversalError::BlockUnavailable { cid: cid.clone() });
        }

        let bytes = self
            .store
            .get(ctx, cid)
            .map_err(|e| TraversalError::from_store(e, cid))?;

        if self.verify_blocks {
            match cid.verify(&bytes) {
                Some(true) => {}
                Some(false) => return Err(TraversalError::HashMismatch { cid: cid.clone() }),
                None => return Err(TraversalError::Unverifiable { cid: cid.clone() }),
            }
        }

        debug!(cid = %cid.short(), size = bytes.len(), %representation, "decoding linked block");
        decode_with(&bytes, representation).map_err(|source| TraversalError::Decode {
            cid: cid.clone(),
            source,
        })
    }
}

impl fmt::Debug for LinkSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkSystem")
            .field("cached", &self.cache.is_some())
            .field("verify_blocks", &self.verify_blocks)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testing::CountingStore;
    use dagwalk_store::InMemoryBlockStore;

    fn cid(s: &str) -> Cid {
        Cid::parse(s).unwrap()
    }

    fn system(store: CountingStore) -> (Arc<CountingStore>, LinkSystem) {
        let store = Arc::new(store);
        let links = LinkSystem::new(store.clone());
        (store, links)
    }

    #[test]
    fn load_decodes_block() {
        let (store, links) = system(CountingStore::new().with_block("bafy001", r#"["x","y"]"#));
        let node = links
            .load(&FetchContext::new(), &cid("bafy001"), &LinkContext::default())
            .unwrap();
        assert_eq!(node, Node::List(vec!["x".into(), "y".into()]));
        assert_eq!(store.has_count("bafy001"), 1);
        assert_eq!(store.get_count("bafy001"), 1);
    }

    #[test]
    fn absent_block_skips_get() {
        let (store, links) = system(CountingStore::new());
        let err = links
            .load(&FetchContext::new(), &cid("bafy001"), &LinkContext::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BlockUnavailable);
        assert_eq!(store.get_count("bafy001"), 0);
    }

    #[test]
    fn transport_failure_on_has_is_not_absence() {
        let (store, links) = system(CountingStore::new().with_block("bafy001", "1"));
        store.set_offline(true);
        let err = links
            .load(&FetchContext::new(), &cid("bafy001"), &LinkContext::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransportError);
    }

    #[test]
    fn undecodable_block() {
        let (_store, links) = system(CountingStore::new().with_block("bafy001", "{oops"));
        let err = links
            .load(&FetchContext::new(), &cid("bafy001"), &LinkContext::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
        assert!(matches!(err, TraversalError::Decode { .. }));
    }

    #[test]
    fn chooser_sees_cid_and_context() {
        let (_store, links) = system(CountingStore::new().with_block("bafy001", "true"));
        let links = links.with_chooser(|cid, ctx| {
            assert_eq!(cid.as_str(), "bafy001");
            assert_eq!(ctx.path.to_string(), "/a");
            Ok(Representation::Generic)
        });
        let link_ctx = LinkContext {
            path: Path::parse("/a"),
            parent_block: None,
        };
        let node = links
            .load(&FetchContext::new(), &cid("bafy001"), &link_ctx)
            .unwrap();
        assert_eq!(node, Node::Bool(true));
    }

    #[test]
    fn chooser_refusal_stops_before_fetch() {
        let (store, links) = system(CountingStore::new().with_block("bafy001", "true"));
        let links = links.with_chooser(|cid, _| {
            Err(TraversalError::UnsupportedRepresentation {
                cid: cid.clone(),
                reason: "no shape registered".into(),
            })
        });
        let err = links
            .load(&FetchContext::new(), &cid("bafy001"), &LinkContext::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedRepresentation);
        assert_eq!(store.total_calls(), 0);
    }

    #[test]
    fn cache_serves_repeats() {
        let (store, links) = system(CountingStore::new().with_block("bafy001", "[1]"));
        let links = links.with_cache(Arc::new(NodeCache::new()));
        for _ in 0..3 {
            links
                .load(&FetchContext::new(), &cid("bafy001"), &LinkContext::default())
                .unwrap();
        }
        assert_eq!(store.get_count("bafy001"), 1);
        assert_eq!(links.cache().map(NodeCache::len), Some(1));
    }

    #[test]
    fn verification_accepts_matching_block() {
        let store = Arc::new(InMemoryBlockStore::new());
        let id = store.put(&FetchContext::new(), br#"{"k":1}"#).unwrap();
        let links = LinkSystem::new(store).with_verification(true);
        assert!(links.verifies_blocks());
        let node = links
            .load(&FetchContext::new(), &id, &LinkContext::default())
            .unwrap();
        assert_eq!(node.lookup_key("k").unwrap(), &Node::Int(1));
    }

    #[test]
    fn verification_rejects_tampered_block() {
        let store = Arc::new(InMemoryBlockStore::new());
        let id = Cid::for_block(b"[1]");
        store.insert(id.clone(), b"[2]".to_vec());
        let links = LinkSystem::new(store.clone()).with_verification(true);
        let err = links
            .load(&FetchContext::new(), &id, &LinkContext::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::HashMismatch);

        // Without verification the store is trusted.
        let trusting = LinkSystem::new(store);
        assert_eq!(
            trusting
                .load(&FetchContext::new(), &id, &LinkContext::default())
                .unwrap(),
            Node::List(vec![Node::Int(2)])
        );
    }

    #[test]
    fn verification_rejects_opaque_identifier() {
        let store = Arc::new(InMemoryBlockStore::new());
        store.insert(cid("bafy001"), b"1".to_vec());
        let links = LinkSystem::new(store).with_verification(true);
        let err = links
            .load(&FetchContext::new(), &cid("bafy001"), &LinkContext::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unverifiable);
    }

    #[test]
    fn cancelled_context_propagates() {
        let (_store, links) = system(CountingStore::new().with_block("bafy001", "1"));
        let ctx = FetchContext::new();
        ctx.cancel();
        let err = links
            .load(&ctx, &cid("bafy001"), &LinkContext::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
    }
}
