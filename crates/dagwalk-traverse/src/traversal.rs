//! The path walk.
//!
//! The walk keeps a cursor that starts at the caller's root. For each path
//! segment it applies the segment by the cursor's kind (key for maps, index
//! for lists), then resolves the cursor through the [`LinkSystem`] for as
//! long as it is a link. A link crossing is invisible in the path: `/a/1`
//! reads index 1 of whatever block `a` links to.
//!
//! The caller's tree is only ever borrowed. A resolved block is owned by the
//! walk and dropped as soon as the cursor moves past it.

use std::borrow::Cow;

use tracing::{debug, trace};

use dagwalk_model::{Kind, Node, Path, PathSegment};
use dagwalk_store::FetchContext;
use dagwalk_types::Cid;

use crate::config::TraversalConfig;
use crate::error::{TraversalError, TraversalResult};
use crate::link::{LinkContext, LinkSystem};

/// The most recent block boundary a walk crossed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LastBlock {
    /// Path at which the link was found.
    pub path: Path,
    /// The link that was resolved there.
    pub link: Cid,
}

/// How far a walk got.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Progress {
    /// Segments consumed so far.
    pub path: Path,
    /// The last link resolved, if any.
    pub last_block: Option<LastBlock>,
    /// Number of links resolved.
    pub links_resolved: usize,
}

/// Result of [`Traversal::walk`].
#[derive(Clone, Debug, PartialEq)]
pub struct Walked {
    pub node: Node,
    pub progress: Progress,
}

/// Walks paths through linked documents.
#[derive(Clone, Debug)]
pub struct Traversal<'l> {
    links: &'l LinkSystem,
    config: TraversalConfig,
}

impl<'l> Traversal<'l> {
    /// A traversal with the default configuration.
    pub fn new(links: &'l LinkSystem) -> Self {
        Self::with_config(links, TraversalConfig::default())
    }

    pub fn with_config(links: &'l LinkSystem, config: TraversalConfig) -> Self {
        Self { links, config }
    }

    pub fn config(&self) -> &TraversalConfig {
        &self.config
    }

    /// Resolve `path` against `root`.
    ///
    /// The empty path returns `root` itself, unresolved even when it is a
    /// link, without touching the store.
    pub fn get(&self, ctx: &FetchContext, root: &Node, path: &Path) -> TraversalResult<Node> {
        self.walk(ctx, root, path).map(|walked| walked.node)
    }

    /// Resolve `path` and report how the walk went.
    pub fn walk(&self, ctx: &FetchContext, root: &Node, path: &Path) -> TraversalResult<Walked> {
        let mut progress = Progress::default();
        let mut cursor: Cow<'_, Node> = Cow::Borrowed(root);

        if !path.is_empty() {
            cursor = self.follow(ctx, cursor, &mut progress)?;
        }
        for segment in path {
            cursor = descend(cursor, segment, &progress.path)?;
            progress.path.push(segment.clone());
            cursor = self.follow(ctx, cursor, &mut progress)?;
        }

        trace!(
            path = %progress.path,
            links = progress.links_resolved,
            kind = %cursor.kind(),
            "walk complete"
        );
        Ok(Walked {
            node: cursor.into_owned(),
            progress,
        })
    }

    /// Resolve the cursor until it is no longer a link.
    ///
    /// A block may hold nothing but another link; the chain is followed to
    /// its end and fails if it comes back to an identifier it already
    /// passed.
    fn follow<'a>(
        &self,
        ctx: &FetchContext,
        mut cursor: Cow<'a, Node>,
        progress: &mut Progress,
    ) -> TraversalResult<Cow<'a, Node>> {
        let mut chain: Vec<Cid> = Vec::new();
        while let Node::Link(cid) = cursor.as_ref() {
            let cid = cid.clone();
            if chain.contains(&cid) {
                return Err(TraversalError::LinkCycle { cid });
            }
            let node = self.resolve(ctx, &cid, progress)?;
            chain.push(cid);
            cursor = Cow::Owned(node);
        }
        Ok(cursor)
    }

    fn resolve(
        &self,
        ctx: &FetchContext,
        cid: &Cid,
        progress: &mut Progress,
    ) -> TraversalResult<Node> {
        if let Some(limit) = self.config.link_budget {
            if progress.links_resolved >= limit {
                return Err(TraversalError::BudgetExceeded { limit });
            }
        }
        if let Some(reason) = ctx.done() {
            return Err(TraversalError::Cancelled(reason));
        }

        let link_ctx = LinkContext {
            path: progress.path.clone(),
            parent_block: progress.last_block.as_ref().map(|b| b.link.clone()),
        };
        debug!(cid = %cid.short(), path = %progress.path, "resolving link");
        let node = self.links.load(ctx, cid, &link_ctx)?;

        progress.links_resolved += 1;
        progress.last_block = Some(LastBlock {
            path: progress.path.clone(),
            link: cid.clone(),
        });
        Ok(node)
    }
}

/// Resolve `path` against `root`, following links through `links`.
///
/// Shorthand for `Traversal::new(links).get(ctx, root, path)`.
pub fn get(
    ctx: &FetchContext,
    root: &Node,
    path: &Path,
    links: &LinkSystem,
) -> TraversalResult<Node> {
    Traversal::new(links).get(ctx, root, path)
}

/// Apply one segment to the cursor.
///
/// Borrowed cursors yield borrowed children. An owned cursor (a resolved
/// block) hands out a copy of the selected child and is then dropped.
fn descend<'a>(
    cursor: Cow<'a, Node>,
    segment: &PathSegment,
    at: &Path,
) -> TraversalResult<Cow<'a, Node>> {
    match cursor {
        Cow::Borrowed(node) => select(node, segment, at).map(Cow::Borrowed),
        Cow::Owned(node) => select(&node, segment, at).map(|child| Cow::Owned(child.clone())),
    }
}

/// The node's kind decides how the segment is read: a numeric-looking
/// segment on a map is still a key.
fn select<'n>(node: &'n Node, segment: &PathSegment, at: &Path) -> TraversalResult<&'n Node> {
    let found = match node.kind() {
        Kind::Map => node.lookup_key(segment.as_str()),
        Kind::List => match segment.as_index() {
            Some(index) => node.lookup_index(index),
            None => return Err(not_applicable(node, segment, at)),
        },
        _ => return Err(not_applicable(node, segment, at)),
    };
    found.map_err(|e| TraversalError::from_model(e, at))
}

fn not_applicable(node: &Node, segment: &PathSegment, at: &Path) -> TraversalError {
    TraversalError::PathNotFound {
        at: at.clone(),
        segment: segment.as_str().to_owned(),
        kind: node.kind(),
    }
}
