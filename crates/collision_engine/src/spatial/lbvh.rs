//! Linear bounding volume hierarchy
//!
//! A binary AABB tree rebuilt from scratch by sorting entries along a
//! Morton curve and halving the sorted array. Updates only record the new
//! bound and mark the tree dirty; the rebuild happens once, at the next
//! [`Lbvh::flush_rebuild`], no matter how many entries moved in between.
//!
//! The tree stores bound snapshots and opaque keys only. It knows nothing
//! about the shapes the keys refer to.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use log::{debug, trace};

use super::aabb::AABB;
use super::morton::morton_code;
use crate::config::DEFAULT_MAX_LEAF_SIZE;

/// Node payload: either a child pair or a range into the sorted entry array
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Internal node with indices of its two children
    Internal {
        /// Index of the left child
        left: usize,
        /// Index of the right child
        right: usize,
    },
    /// Leaf covering `sorted[first..first + count]`
    Leaf {
        /// First entry in the sorted array
        first: usize,
        /// Number of entries
        count: usize,
    },
}

/// Single node of the flattened tree
#[derive(Clone, Copy, Debug)]
pub struct LbvhNode {
    /// Union of every entry bound beneath this node
    pub bounds: AABB,
    /// Leaf or internal payload
    pub kind: NodeKind,
}

impl LbvhNode {
    /// Check if this node is a leaf
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }
}

/// Read-only view of a node for debug rendering
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DebugNode {
    /// Node bound
    pub bounds: AABB,
    /// Whether the node is a leaf
    pub is_leaf: bool,
    /// Distance from the root (root = 0)
    pub depth: u32,
}

/// Linear BVH over keyed bounding boxes
#[derive(Clone, Debug)]
pub struct Lbvh<K> {
    /// Latest bound per key (the source of truth for rebuilds and leaf checks)
    bounds: HashMap<K, AABB>,
    /// Keys in Morton order, as of the last rebuild
    sorted: Vec<K>,
    /// Flattened tree, root at index 0
    nodes: Vec<LbvhNode>,
    /// Union of all bounds, as of the last rebuild
    root_bounds: Option<AABB>,
    max_leaf_size: usize,
    pending_rebuild: bool,
}

impl<K> Default for Lbvh<K>
where
    K: Copy + Eq + Hash + Ord + Debug,
{
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LEAF_SIZE)
    }
}

impl<K> Lbvh<K>
where
    K: Copy + Eq + Hash + Ord + Debug,
{
    /// Create an empty tree whose leaves hold at most `max_leaf_size` entries
    ///
    /// A size of zero is clamped to one.
    pub fn new(max_leaf_size: usize) -> Self {
        Self {
            bounds: HashMap::new(),
            sorted: Vec::new(),
            nodes: Vec::new(),
            root_bounds: None,
            max_leaf_size: max_leaf_size.max(1),
            pending_rebuild: false,
        }
    }

    /// Insert or update the bound stored for `key`; defers the rebuild
    pub fn update(&mut self, key: K, bounds: AABB) {
        self.bounds.insert(key, bounds);
        self.pending_rebuild = true;
    }

    /// Remove `key`; returns false if it was not present
    pub fn remove(&mut self, key: K) -> bool {
        if self.bounds.remove(&key).is_some() {
            self.pending_rebuild = true;
            true
        } else {
            false
        }
    }

    /// Insert or update many entries and rebuild immediately
    ///
    /// Meant for level loads where a large batch arrives at once.
    pub fn bulk_update<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, AABB)>,
    {
        self.bounds.extend(entries);
        self.build();
        self.pending_rebuild = false;
    }

    /// Rebuild if anything changed since the last build
    ///
    /// Returns true when a rebuild actually ran.
    pub fn flush_rebuild(&mut self) -> bool {
        if self.pending_rebuild {
            self.build();
            self.pending_rebuild = false;
            true
        } else {
            false
        }
    }

    /// Whether a rebuild is pending
    pub fn is_dirty(&self) -> bool {
        self.pending_rebuild
    }

    /// Drop every entry and the tree
    pub fn clear(&mut self) {
        self.bounds = HashMap::new();
        self.sorted = Vec::new();
        self.nodes = Vec::new();
        self.root_bounds = None;
        self.pending_rebuild = false;
    }

    /// Latest bound recorded for `key`
    pub fn bounds_of(&self, key: K) -> Option<&AABB> {
        self.bounds.get(&key)
    }

    /// Whether `key` has a recorded bound
    pub fn contains(&self, key: K) -> bool {
        self.bounds.contains_key(&key)
    }

    /// Number of entries with recorded bounds
    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    /// Whether there are no entries
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Configured leaf occupancy
    pub fn max_leaf_size(&self) -> usize {
        self.max_leaf_size
    }

    /// Number of nodes in the built tree
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Union of all entry bounds as of the last build
    pub fn root_bounds(&self) -> Option<AABB> {
        self.root_bounds
    }

    /// Flattened nodes, root first
    pub fn nodes(&self) -> &[LbvhNode] {
        &self.nodes
    }

    /// Number of levels in the built tree (0 when empty)
    pub fn depth(&self) -> u32 {
        self.debug_nodes().map(|n| n.depth + 1).max().unwrap_or(0)
    }

    /// Collect keys whose recorded bound intersects `query`
    pub fn query(&self, query: &AABB) -> Vec<K> {
        let mut results = Vec::new();
        self.query_into(query, &mut results);
        results
    }

    /// Append keys whose recorded bound intersects `query` to `results`
    ///
    /// Reflects the tree as of the last build; callers that need current
    /// state flush first.
    pub fn query_into(&self, query: &AABB, results: &mut Vec<K>) {
        let Some(root) = self.nodes.first() else {
            return;
        };
        if !root.bounds.intersects(query) {
            return;
        }

        let mut stack = vec![0usize];
        while let Some(idx) = stack.pop() {
            debug_assert!(idx < self.nodes.len(), "BVH node index {idx} out of range");
            let Some(node) = self.nodes.get(idx) else {
                continue;
            };

            match node.kind {
                NodeKind::Leaf { first, count } => {
                    debug_assert!(first + count <= self.sorted.len(), "BVH leaf range out of range");
                    let Some(members) = self.sorted.get(first..first + count) else {
                        continue;
                    };
                    // The leaf bound is looser than any single member's bound
                    for key in members {
                        if self.bounds.get(key).is_some_and(|b| b.intersects(query)) {
                            results.push(*key);
                        }
                    }
                }
                NodeKind::Internal { left, right } => {
                    for child in [left, right] {
                        if self.nodes.get(child).is_some_and(|c| c.bounds.intersects(query)) {
                            stack.push(child);
                        }
                    }
                }
            }
        }
    }

    /// Depth-first walk over the built tree for debug rendering
    pub fn debug_nodes(&self) -> impl Iterator<Item = DebugNode> + '_ {
        let mut stack: Vec<(usize, u32)> = if self.nodes.is_empty() {
            Vec::new()
        } else {
            vec![(0, 0)]
        };

        std::iter::from_fn(move || {
            let (idx, depth) = stack.pop()?;
            let node = self.nodes.get(idx)?;
            if let NodeKind::Internal { left, right } = node.kind {
                stack.push((right, depth + 1));
                stack.push((left, depth + 1));
            }
            Some(DebugNode {
                bounds: node.bounds,
                is_leaf: node.is_leaf(),
                depth,
            })
        })
    }

    /// Log every node at debug level
    pub fn dump(&self) {
        debug!("===== LBVH DUMP BEGIN =====");
        debug!("nodes={}, entries={}", self.nodes.len(), self.sorted.len());
        for (i, node) in self.nodes.iter().enumerate() {
            let (min, max) = (node.bounds.min, node.bounds.max);
            debug!(
                "[{i}] {:?} | [({:.1},{:.1},{:.1})-({:.1},{:.1},{:.1})]",
                node.kind, min.x, min.y, min.z, max.x, max.y, max.z
            );
        }
        debug!("===== LBVH DUMP END =====");
    }

    fn build(&mut self) {
        self.nodes = Vec::new();
        self.sorted = Vec::new();
        self.root_bounds = None;

        let Some(global) = self.bounds.values().copied().reduce(|a, b| a.union(&b)) else {
            trace!("LBVH rebuild: empty");
            return;
        };
        self.root_bounds = Some(global);

        // Sort keys first so equal Morton codes keep a deterministic order
        let mut keyed: Vec<(K, u32)> = self
            .bounds
            .iter()
            .map(|(key, bounds)| (*key, morton_code(bounds.center(), &global)))
            .collect();
        keyed.sort_unstable_by_key(|(key, _)| *key);
        keyed.sort_by_key(|(_, code)| *code);
        self.sorted = keyed.into_iter().map(|(key, _)| key).collect();

        let n = self.sorted.len();
        self.nodes.reserve(2 * n);
        self.build_range(0, n);

        trace!(
            "LBVH rebuild: {} entries, {} nodes, leaf size {}",
            n,
            self.nodes.len(),
            self.max_leaf_size
        );
    }

    /// Build the subtree for `sorted[start..end]`, returning its node index
    fn build_range(&mut self, start: usize, end: usize) -> usize {
        let idx = self.nodes.len();
        let count = end - start;

        if count <= self.max_leaf_size {
            let bounds = self.sorted[start..end]
                .iter()
                .filter_map(|key| self.bounds.get(key).copied())
                .reduce(|a, b| a.union(&b))
                .or(self.root_bounds)
                .unwrap_or_else(|| AABB::new(Default::default(), Default::default()));
            self.nodes.push(LbvhNode {
                bounds,
                kind: NodeKind::Leaf { first: start, count },
            });
            return idx;
        }

        // Reserve the slot, fill it once both children exist
        self.nodes.push(LbvhNode {
            bounds: AABB::new(Default::default(), Default::default()),
            kind: NodeKind::Leaf { first: start, count: 0 },
        });

        let mid = (start + end) / 2;
        let left = self.build_range(start, mid);
        let right = self.build_range(mid, end);

        self.nodes[idx] = LbvhNode {
            bounds: self.nodes[left].bounds.union(&self.nodes[right].bounds),
            kind: NodeKind::Internal { left, right },
        };
        idx
    }
}
