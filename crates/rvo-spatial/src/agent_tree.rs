//! Agent k-d tree, rebuilt from current positions every step.
//!
//! # Data layout
//!
//! The tree is two flat arrays and no pointers:
//!
//! - `order`: a permutation of the agent dense indices `0..n`.  Every node
//!   owns the contiguous range `order[begin..end]`.
//! - `nodes`: node records.  The children of node `k` whose left half holds
//!   `l` agents are stored at `k + 1` and `k + 2 * l`, so the whole tree fits
//!   in `2 * n` slots without any allocation during the build.
//!
//! The permutation is kept between builds while the agent count is
//! unchanged; positions move little per step, so the partition passes mostly
//! find the previous order already in place.

use rvo_core::{Vec2, sqr};

/// Ranges of at most this many agents are not split further.
pub const MAX_LEAF_SIZE: usize = 10;

/// Child index of a leaf.
pub const NO_CHILD: usize = usize::MAX;

/// One node of the agent tree.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentTreeNode {
    /// Range into the permutation array.
    pub begin: usize,
    pub end: usize,
    /// Bounding box of every agent in the range.
    pub min: Vec2,
    pub max: Vec2,
    pub left: usize,
    pub right: usize,
}

impl Default for AgentTreeNode {
    fn default() -> Self {
        Self {
            begin: 0,
            end: 0,
            min: Vec2::ZERO,
            max: Vec2::ZERO,
            left: NO_CHILD,
            right: NO_CHILD,
        }
    }
}

impl AgentTreeNode {
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.end - self.begin <= MAX_LEAF_SIZE
    }

    /// Squared distance from `p` to this node's bounding box (zero inside).
    #[inline]
    pub fn dist_sq(&self, p: Vec2) -> f32 {
        sqr((self.min.x - p.x).max(0.0))
            + sqr((p.x - self.max.x).max(0.0))
            + sqr((self.min.y - p.y).max(0.0))
            + sqr((p.y - self.max.y).max(0.0))
    }
}

/// Balanced binary space partition over agent positions.
#[derive(Debug, Default)]
pub struct AgentTree {
    order: Vec<usize>,
    nodes: Vec<AgentTreeNode>,
}

impl AgentTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of agents the tree was last built over.
    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Node storage (including unused slots).  Node 0 is the root.
    pub fn nodes(&self) -> &[AgentTreeNode] {
        &self.nodes
    }

    /// The agent permutation the nodes index into.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Rebuild from `positions`, where `positions[i]` is agent `i`.
    pub fn build(&mut self, positions: &[Vec2]) {
        let n = positions.len();
        if self.order.len() != n {
            self.order.clear();
            self.order.extend(0..n);
            self.nodes.clear();
            self.nodes.resize(2 * n, AgentTreeNode::default());
        }

        if n > 0 {
            self.build_recursive(positions, 0, n, 0);
        }
    }

    /// Drop all storage.
    pub fn clear(&mut self) {
        self.order = Vec::new();
        self.nodes = Vec::new();
    }

    fn build_recursive(&mut self, positions: &[Vec2], begin: usize, end: usize, node: usize) {
        let mut min = positions[self.order[begin]];
        let mut max = min;
        for &a in &self.order[begin + 1..end] {
            min = min.min(positions[a]);
            max = max.max(positions[a]);
        }

        self.nodes[node] = AgentTreeNode {
            begin,
            end,
            min,
            max,
            left: NO_CHILD,
            right: NO_CHILD,
        };

        if end - begin <= MAX_LEAF_SIZE {
            return;
        }

        let vertical = max.x - min.x > max.y - min.y;
        let axis = |p: Vec2| if vertical { p.x } else { p.y };
        let split = 0.5 * (axis(min) + axis(max));

        let mut left = begin;
        let mut right = end;
        while left < right {
            while left < right && axis(positions[self.order[left]]) < split {
                left += 1;
            }
            while right > left && axis(positions[self.order[right - 1]]) >= split {
                right -= 1;
            }
            if left < right {
                self.order.swap(left, right - 1);
                left += 1;
                right -= 1;
            }
        }

        // All positions equal along the split axis: force one agent left.
        if left == begin {
            left += 1;
        }

        let left_size = left - begin;
        let left_node = node + 1;
        let right_node = node + 2 * left_size;
        self.nodes[node].left = left_node;
        self.nodes[node].right = right_node;

        self.build_recursive(positions, begin, left, left_node);
        self.build_recursive(positions, left, end, right_node);
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Visit every agent whose squared distance to `center` is below
    /// `*range_sq`, nearest subtrees first.
    ///
    /// The visitor receives the agent index, its squared distance, and the
    /// current range; it may shrink the range to prune the rest of the
    /// search (used to cap the neighbour count).
    pub fn query<F>(&self, positions: &[Vec2], center: Vec2, range_sq: &mut f32, mut visit: F)
    where
        F: FnMut(usize, f32, &mut f32),
    {
        if self.order.is_empty() {
            return;
        }
        self.query_recursive(positions, center, range_sq, 0, &mut visit);
    }

    fn query_recursive<F>(
        &self,
        positions: &[Vec2],
        center: Vec2,
        range_sq: &mut f32,
        node: usize,
        visit: &mut F,
    ) where
        F: FnMut(usize, f32, &mut f32),
    {
        let n = &self.nodes[node];
        if n.is_leaf() {
            for &a in &self.order[n.begin..n.end] {
                let dist_sq = (positions[a] - center).length_squared();
                if dist_sq < *range_sq {
                    visit(a, dist_sq, range_sq);
                }
            }
            return;
        }

        let (near, far) = {
            let l = self.nodes[n.left].dist_sq(center);
            let r = self.nodes[n.right].dist_sq(center);
            if l < r { ((n.left, l), (n.right, r)) } else { ((n.right, r), (n.left, l)) }
        };

        if near.1 < *range_sq {
            self.query_recursive(positions, center, range_sq, near.0, visit);
            if far.1 < *range_sq {
                self.query_recursive(positions, center, range_sq, far.0, visit);
            }
        }
    }

    /// Append the index of every agent strictly within `radius` of `center`.
    pub fn query_radius(&self, positions: &[Vec2], center: Vec2, radius: f32, out: &mut Vec<usize>) {
        let mut range_sq = sqr(radius);
        self.query(positions, center, &mut range_sq, |a, _, _| out.push(a));
    }
}
