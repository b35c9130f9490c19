//! # Merge Forest
//!
//! Disjoint-set forest over songs and genres with lazy change counting.
//!
//! Nodes live in one arena and refer to their parent by handle. A root has
//! no parent and is always a genre; songs are never roots.
//!
//! ## Change Accounting
//!
//! Every node carries a `delta`. The number of merges a node has been
//! through since it was created is the sum of `delta` over its path up to
//! and including its root. The rules that keep this true:
//!
//! - A new genre root starts at `delta = 0`.
//! - A new song under root `r` starts at `delta = -r.delta`.
//! - `union` adds one merge event to the absorbing root and rebases the
//!   absorbed root so its subtree also sees exactly one more event.
//! - `find_root` rewires every visited node to the root and rewrites its
//!   delta to the sum it still owes below the root.

use crate::primitives::MERGE_EVENT;
use crate::{CatalogError, GenreId};

/// Handle of a node in the forest arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeHandle(usize);

impl NodeHandle {
    /// Position of the node in the arena.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// What a forest node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A song. Always has a parent.
    Song,
    /// A genre. `label` and `song_count` are only meaningful on roots.
    Genre { label: GenreId, song_count: u64 },
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeHandle>,
    delta: i64,
    kind: NodeKind,
}

/// Arena-backed merge forest.
#[derive(Debug, Clone, Default)]
pub struct Forest {
    nodes: Vec<Node>,
}

impl Forest {
    /// Create an empty forest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of nodes ever created.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no node has been created yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Make room for `additional` nodes so the next creations cannot fail.
    pub fn reserve(&mut self, additional: usize) -> Result<(), CatalogError> {
        self.nodes
            .try_reserve(additional)
            .map_err(|_| CatalogError::AllocationError)
    }

    /// Create a singleton genre root labelled `label`.
    pub fn add_genre(&mut self, label: GenreId) -> Result<NodeHandle, CatalogError> {
        self.push(Node {
            parent: None,
            delta: 0,
            kind: NodeKind::Genre {
                label,
                song_count: 0,
            },
        })
    }

    /// Create a song directly under `root` and count it there.
    pub fn add_song(&mut self, root: NodeHandle) -> Result<NodeHandle, CatalogError> {
        debug_assert!(self.is_root(root), "songs attach to roots only");
        let handle = self.push(Node {
            parent: Some(root),
            delta: -self.nodes[root.0].delta,
            kind: NodeKind::Song,
        })?;
        if let NodeKind::Genre { song_count, .. } = &mut self.nodes[root.0].kind {
            *song_count = song_count.saturating_add(1);
        }
        Ok(handle)
    }

    fn push(&mut self, node: Node) -> Result<NodeHandle, CatalogError> {
        self.reserve(1)?;
        let handle = NodeHandle(self.nodes.len());
        self.nodes.push(node);
        Ok(handle)
    }

    /// Check whether `node` is a root.
    #[must_use]
    pub fn is_root(&self, node: NodeHandle) -> bool {
        self.nodes[node.0].parent.is_none()
    }

    /// Current parent of `node`.
    #[must_use]
    pub fn parent(&self, node: NodeHandle) -> Option<NodeHandle> {
        self.nodes[node.0].parent
    }

    /// Kind of `node`.
    #[must_use]
    pub fn kind(&self, node: NodeHandle) -> NodeKind {
        self.nodes[node.0].kind
    }

    /// Root of the tree containing `node`, compressing the path.
    pub fn find_root(&mut self, node: NodeHandle) -> NodeHandle {
        self.locate(node).0
    }

    /// Number of merges `node` has been through since it was created.
    pub fn changes(&mut self, node: NodeHandle) -> u64 {
        let (_, changes) = self.locate(node);
        debug_assert!(changes >= 0, "negative change count");
        changes.max(0) as u64
    }

    /// Find the root of `node` and its change count in one walk.
    ///
    /// Afterwards every node on the path points directly at the root, and
    /// the per-node sums up to the root are unchanged.
    pub fn locate(&mut self, node: NodeHandle) -> (NodeHandle, i64) {
        let mut below_root = 0i64;
        let mut cursor = node;
        while let Some(parent) = self.nodes[cursor.0].parent {
            below_root += self.nodes[cursor.0].delta;
            cursor = parent;
        }
        let root = cursor;

        let mut owed = below_root;
        let mut cursor = node;
        while let Some(parent) = self.nodes[cursor.0].parent {
            let visited = &mut self.nodes[cursor.0];
            let old = visited.delta;
            visited.parent = Some(root);
            visited.delta = owed;
            owed -= old;
            cursor = parent;
        }

        (root, below_root + self.nodes[root.0].delta)
    }

    /// Song count of the tree containing `node`, read from its root.
    pub fn song_count(&mut self, node: NodeHandle) -> u64 {
        let root = self.find_root(node);
        self.root_song_count(root)
    }

    /// Label of the tree containing `node`, read from its root.
    pub fn label(&mut self, node: NodeHandle) -> Option<GenreId> {
        let root = self.find_root(node);
        match self.nodes[root.0].kind {
            NodeKind::Genre { label, .. } => Some(label),
            NodeKind::Song => None,
        }
    }

    /// Give root `root` a new external label.
    pub fn relabel(&mut self, root: NodeHandle, new_label: GenreId) {
        debug_assert!(self.is_root(root), "only roots carry labels");
        if let NodeKind::Genre { label, .. } = &mut self.nodes[root.0].kind {
            *label = new_label;
        }
    }

    /// Merge two distinct roots by song count and return the surviving root.
    ///
    /// The root with fewer songs goes under the other; on a tie `b` goes
    /// under `a`. Both trees record exactly one merge event. Passing the
    /// same root twice is a no-op returning that root.
    pub fn union(&mut self, a: NodeHandle, b: NodeHandle) -> NodeHandle {
        debug_assert!(self.is_root(a) && self.is_root(b), "union takes roots");
        if a == b {
            return a;
        }

        let (count_a, count_b) = (self.root_song_count(a), self.root_song_count(b));
        let (winner, loser) = if count_a < count_b { (b, a) } else { (a, b) };

        let winner_node = &mut self.nodes[winner.0];
        winner_node.delta += MERGE_EVENT;
        let winner_delta = winner_node.delta;
        if let NodeKind::Genre { song_count, .. } = &mut winner_node.kind {
            *song_count = count_a.saturating_add(count_b);
        }

        // Subtree sums were `path + loser.delta`; they must become one more
        // once `winner.delta` is added on top.
        let loser_node = &mut self.nodes[loser.0];
        loser_node.parent = Some(winner);
        loser_node.delta += MERGE_EVENT - winner_delta;

        tracing::trace!(
            winner = winner.0,
            loser = loser.0,
            song_count = count_a.saturating_add(count_b),
            "forest union"
        );
        winner
    }

    fn root_song_count(&self, root: NodeHandle) -> u64 {
        match self.nodes[root.0].kind {
            NodeKind::Genre { song_count, .. } => song_count,
            NodeKind::Song => 0,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
