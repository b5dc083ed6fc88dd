//! Obstacle BSP tree over obstacle edges, rebuilt when obstacles change.
//!
//! Every node stores one edge (`vertex → next(vertex)`) whose infinite line
//! splits the remaining edges into a left and a right set.  Edges that cross
//! the line are cut in two at the intersection: the cut inserts a new vertex
//! into the [`ObstacleStore`], so the store grows while the tree is built.
//! All build code therefore carries `VertexId`s and re-reads the store after
//! every split.

use rvo_core::{RVO_EPSILON, Vec2, VertexId, det, dist_sq_point_segment, left_of, sqr};
use rvo_obstacle::ObstacleStore;

/// One node of the obstacle tree.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObstacleTreeNode {
    /// First vertex of the splitting edge.
    pub vertex: VertexId,
    pub left: Option<usize>,
    pub right: Option<usize>,
}

/// Binary space partition over obstacle edges.
#[derive(Debug, Default)]
pub struct ObstacleTree {
    nodes: Vec<ObstacleTreeNode>,
    root: Option<usize>,
}

impl ObstacleTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` if no edges have been processed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of edges in the tree (one per node).
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &[ObstacleTreeNode] {
        &self.nodes
    }

    pub fn root(&self) -> Option<usize> {
        self.root
    }

    pub fn clear(&mut self) {
        self.nodes = Vec::new();
        self.root = None;
    }

    /// Rebuild over every edge currently in `store`.
    ///
    /// Edges that straddle a splitting line are split in `store`, which
    /// therefore may hold more vertices afterwards.
    pub fn build(&mut self, store: &mut ObstacleStore) {
        self.nodes.clear();
        let edges: Vec<VertexId> = store.vertices().iter().map(|v| v.id).collect();
        self.nodes.reserve(edges.len());
        self.root = self.build_recursive(store, edges);
    }

    fn build_recursive(&mut self, store: &mut ObstacleStore, edges: Vec<VertexId>) -> Option<usize> {
        if edges.is_empty() {
            return None;
        }

        let split = choose_split(store, &edges);
        let (i1, i2) = store.segment(edges[split]);

        let mut left = Vec::new();
        let mut right = Vec::new();
        for (j, &edge) in edges.iter().enumerate() {
            if j == split {
                continue;
            }

            let (j1, j2) = store.segment(edge);
            let j1_left = left_of(i1, i2, j1);
            let j2_left = left_of(i1, i2, j2);

            if j1_left >= -RVO_EPSILON && j2_left >= -RVO_EPSILON {
                left.push(edge);
            } else if j1_left <= RVO_EPSILON && j2_left <= RVO_EPSILON {
                right.push(edge);
            } else {
                // The edge straddles the splitting line: cut it there.  The
                // first half keeps `edge`, the second half starts at the new
                // vertex.
                let t = det(i2 - i1, j1 - i1) / det(i2 - i1, j1 - j2);
                let point = j1 + t * (j2 - j1);
                let half = store.split_edge(edge, point);

                if j1_left > 0.0 {
                    left.push(edge);
                    right.push(half);
                } else {
                    right.push(edge);
                    left.push(half);
                }
            }
        }

        let node = self.nodes.len();
        self.nodes.push(ObstacleTreeNode {
            vertex: edges[split],
            left: None,
            right: None,
        });
        let l = self.build_recursive(store, left);
        let r = self.build_recursive(store, right);
        self.nodes[node].left = l;
        self.nodes[node].right = r;
        Some(node)
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Visit every edge within `sqrt(range_sq)` of `position` that faces it,
    /// passing the edge's first vertex and its squared distance.
    ///
    /// Edges whose solid (left) side faces `position` are skipped: an agent
    /// outside an obstacle only ever needs to avoid edges it sees from the
    /// outside.
    pub fn query_neighbors<F>(&self, store: &ObstacleStore, position: Vec2, range_sq: f32, mut visit: F)
    where
        F: FnMut(VertexId, f32),
    {
        self.query_recursive(store, position, range_sq, self.root, &mut visit);
    }

    fn query_recursive<F>(
        &self,
        store: &ObstacleStore,
        position: Vec2,
        range_sq: f32,
        node: Option<usize>,
        visit: &mut F,
    ) where
        F: FnMut(VertexId, f32),
    {
        let Some(node) = node else { return };
        let ObstacleTreeNode { vertex, left, right } = self.nodes[node];
        let (p1, p2) = store.segment(vertex);

        let agent_left = left_of(p1, p2, position);
        let (near, far) = if agent_left >= 0.0 { (left, right) } else { (right, left) };
        self.query_recursive(store, position, range_sq, near, visit);

        let dist_sq_line = sqr(agent_left) / (p2 - p1).length_squared();
        if dist_sq_line < range_sq {
            if agent_left < 0.0 {
                let dist_sq = dist_sq_point_segment(p1, p2, position);
                if dist_sq < range_sq {
                    visit(vertex, dist_sq);
                }
            }
            self.query_recursive(store, position, range_sq, far, visit);
        }
    }

    /// `true` if the segment `q1 → q2`, thickened by `radius`, crosses no
    /// obstacle edge.  Trivially `true` on an empty tree.
    pub fn query_visibility(&self, store: &ObstacleStore, q1: Vec2, q2: Vec2, radius: f32) -> bool {
        self.visibility_recursive(store, q1, q2, radius, self.root)
    }

    fn visibility_recursive(
        &self,
        store: &ObstacleStore,
        q1: Vec2,
        q2: Vec2,
        radius: f32,
        node: Option<usize>,
    ) -> bool {
        let Some(node) = node else { return true };
        let ObstacleTreeNode { vertex, left, right } = self.nodes[node];
        let (p1, p2) = store.segment(vertex);

        let q1_left = left_of(p1, p2, q1);
        let q2_left = left_of(p1, p2, q2);
        let inv_len_sq = 1.0 / (p2 - p1).length_squared();
        let radius_sq = sqr(radius);
        // Both endpoints at least `radius` from the edge's line.
        let clear_of_line =
            sqr(q1_left) * inv_len_sq >= radius_sq && sqr(q2_left) * inv_len_sq >= radius_sq;

        if q1_left >= 0.0 && q2_left >= 0.0 {
            self.visibility_recursive(store, q1, q2, radius, left)
                && (clear_of_line || self.visibility_recursive(store, q1, q2, radius, right))
        } else if q1_left <= 0.0 && q2_left <= 0.0 {
            self.visibility_recursive(store, q1, q2, radius, right)
                && (clear_of_line || self.visibility_recursive(store, q1, q2, radius, left))
        } else if q1_left >= 0.0 && q2_left <= 0.0 {
            // Leaving through the open side of the edge's line.
            self.visibility_recursive(store, q1, q2, radius, left)
                && self.visibility_recursive(store, q1, q2, radius, right)
        } else {
            let p1_left = left_of(q1, q2, p1);
            let p2_left = left_of(q1, q2, p2);
            let inv_len_q = 1.0 / (q2 - q1).length_squared();

            p1_left * p2_left >= 0.0
                && sqr(p1_left) * inv_len_q > radius_sq
                && sqr(p2_left) * inv_len_q > radius_sq
                && self.visibility_recursive(store, q1, q2, radius, left)
                && self.visibility_recursive(store, q1, q2, radius, right)
        }
    }

    /// First vertex of every edge stored in the tree, in node order.
    pub fn edge_vertices(&self) -> Vec<VertexId> {
        self.nodes.iter().map(|n| n.vertex).collect()
    }
}

/// Pick the edge whose line splits `edges` most evenly.
///
/// Minimises `(max(left, right), min(left, right))` lexicographically; the
/// first candidate wins ties.  Counting for a candidate stops as soon as it
/// can no longer beat the current best.
fn choose_split(store: &ObstacleStore, edges: &[VertexId]) -> usize {
    let mut best = 0;
    let mut best_left = edges.len();
    let mut best_right = edges.len();

    for (i, &edge_i) in edges.iter().enumerate() {
        let (i1, i2) = store.segment(edge_i);
        let mut left_size = 0;
        let mut right_size = 0;

        for (j, &edge_j) in edges.iter().enumerate() {
            if i == j {
                continue;
            }
            let (j1, j2) = store.segment(edge_j);
            let j1_left = left_of(i1, i2, j1);
            let j2_left = left_of(i1, i2, j2);

            if j1_left >= -RVO_EPSILON && j2_left >= -RVO_EPSILON {
                left_size += 1;
            } else if j1_left <= RVO_EPSILON && j2_left <= RVO_EPSILON {
                right_size += 1;
            } else {
                left_size += 1;
                right_size += 1;
            }

            if balance(left_size, right_size) >= balance(best_left, best_right) {
                break;
            }
        }

        if balance(left_size, right_size) < balance(best_left, best_right) {
            best = i;
            best_left = left_size;
            best_right = right_size;
        }
    }
    best
}

#[inline]
fn balance(left: usize, right: usize) -> (usize, usize) {
    (left.max(right), left.min(right))
}
