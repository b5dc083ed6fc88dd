//! `ObstacleStore`: dense vertex array forming closed linked polygons.
//!
//! # Data layout
//!
//! Every vertex of every polygon lives in one `Vec<ObstacleVertex>` and is
//! addressed by its dense index (`VertexId`).  Polygons are circular doubly
//! linked lists threaded through that array with `prev` / `next`:
//!
//! ```text
//! vertices: [ a0 a1 a2 a3 | b0 b1 | a4* ]
//!              └─ group A ─┘ └ B ┘   └ split vertex, still group A
//! ```
//!
//! A side table maps each `ObstacleId` to the vertices of that polygon.
//! Vertices synthesised by edge splits are appended at the end of the array
//! and join the group of the edge they split, so removing a group always
//! removes whole cycles.
//!
//! Appending may reallocate the array; callers hold `VertexId`s, never
//! references, across any call that can grow it.

use std::ops::Index;

use rvo_core::{IdMap, ObstacleId, Vec2, VertexId, left_of};

use crate::ObstacleVertex;

#[inline]
fn vid(index: usize) -> VertexId {
    VertexId(index as u32)
}

/// Registry of all obstacle vertices plus the group → vertex multimap.
#[derive(Debug, Default)]
pub struct ObstacleStore {
    vertices: Vec<ObstacleVertex>,
    groups: IdMap<ObstacleId, Vec<VertexId>>,
    next_group: u32,
}

impl ObstacleStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Add a polygon and return its group id.
    ///
    /// Vertices listed counter-clockwise describe a solid obstacle; clockwise
    /// describes a bounding polygon that keeps agents inside.  Two points make
    /// a double-sided segment.  Returns `None` (and adds nothing) for fewer
    /// than two points.
    pub fn add(&mut self, points: &[Vec2]) -> Option<ObstacleId> {
        let n = points.len();
        if n < 2 {
            return None;
        }

        let group = ObstacleId(self.next_group);
        self.next_group += 1;

        let first = self.vertices.len();
        let mut members = Vec::with_capacity(n);
        for (i, &point) in points.iter().enumerate() {
            let prev = if i == 0 { n - 1 } else { i - 1 };
            let next = if i == n - 1 { 0 } else { i + 1 };

            let convex = n == 2 || left_of(points[prev], point, points[next]) >= 0.0;
            let id = vid(first + i);
            self.vertices.push(ObstacleVertex {
                id,
                point,
                direction: (points[next] - point).normalize_or_zero(),
                convex,
                prev: vid(first + prev),
                next: vid(first + next),
                obstacle: group,
            });
            members.push(id);
        }

        self.groups.insert(group, members);
        Some(group)
    }

    /// Remove every vertex of `group`.  Returns `false` if the group is
    /// unknown.
    ///
    /// Vertices are swap-removed in descending index order so that each
    /// removal only ever moves a vertex that is still live and outside the
    /// group.  All other `VertexId`s held by callers may be invalidated.
    pub fn remove(&mut self, group: ObstacleId) -> bool {
        let Some(mut members) = self.groups.remove(&group) else {
            return false;
        };

        members.sort_unstable_by(|a, b| b.cmp(a));
        for v in members {
            self.swap_remove_vertex(v.index());
        }
        true
    }

    /// Insert a new vertex at `point` on the edge `vertex → next(vertex)`.
    ///
    /// The new vertex takes over the second half of the edge, so it inherits
    /// the edge direction and group and is convex by construction.  Returns
    /// the new vertex's id (always the last index).
    pub fn split_edge(&mut self, vertex: VertexId, point: Vec2) -> VertexId {
        let ObstacleVertex { direction, next, obstacle, .. } = self.vertices[vertex.index()];

        let id = vid(self.vertices.len());
        self.vertices.push(ObstacleVertex {
            id,
            point,
            direction,
            convex: true,
            prev: vertex,
            next,
            obstacle,
        });

        self.vertices[vertex.index()].next = id;
        self.vertices[next.index()].prev = id;
        self.groups.entry(obstacle).or_default().push(id);
        id
    }

    /// Remove every obstacle.  Group ids are not reused afterwards.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.groups.clear();
    }

    pub fn shrink_to_fit(&mut self) {
        self.vertices.shrink_to_fit();
        self.groups.shrink_to_fit();
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Total vertex count, including split vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[inline]
    pub fn vertex(&self, id: VertexId) -> Option<&ObstacleVertex> {
        self.vertices.get(id.index())
    }

    pub fn vertices(&self) -> &[ObstacleVertex] {
        &self.vertices
    }

    /// Endpoints of the edge leaving `id`.
    ///
    /// # Panics
    /// Panics if `id` is out of range.
    #[inline]
    pub fn segment(&self, id: VertexId) -> (Vec2, Vec2) {
        let v = &self.vertices[id.index()];
        (v.point, self.vertices[v.next.index()].point)
    }

    /// Number of live groups.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn contains_group(&self, group: ObstacleId) -> bool {
        self.groups.contains_key(&group)
    }

    /// All vertices of `group`, in no particular order.
    pub fn group_vertices(&self, group: ObstacleId) -> Option<&[VertexId]> {
        self.groups.get(&group).map(Vec::as_slice)
    }

    /// A vertex of `group` from which its cycle can be walked with `next`.
    pub fn first_vertex(&self, group: ObstacleId) -> Option<VertexId> {
        self.groups.get(&group).and_then(|m| m.first().copied())
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn swap_remove_vertex(&mut self, index: usize) {
        let this = vid(index);
        let ObstacleVertex { prev, next, .. } = self.vertices[index];

        // Unlink from the cycle.
        if prev != this {
            self.vertices[prev.index()].next = next;
        }
        if next != this {
            self.vertices[next.index()].prev = prev;
        }

        let last = self.vertices.len() - 1;
        self.vertices.swap_remove(index);
        if index == last {
            return;
        }

        // Repoint the neighbours and group entry of the vertex moved from `last`.
        let old = vid(last);
        let moved = &mut self.vertices[index];
        moved.id = this;
        let (p, n, group) = (moved.prev, moved.next, moved.obstacle);

        if p == old {
            self.vertices[index].prev = this;
        } else {
            self.vertices[p.index()].next = this;
        }
        if n == old {
            self.vertices[index].next = this;
        } else {
            self.vertices[n.index()].prev = this;
        }

        if let Some(slot) = self
            .groups
            .get_mut(&group)
            .and_then(|m| m.iter_mut().find(|v| **v == old))
        {
            *slot = this;
        }
    }
}

impl Index<VertexId> for ObstacleStore {
    type Output = ObstacleVertex;

    #[inline]
    fn index(&self, id: VertexId) -> &ObstacleVertex {
        &self.vertices[id.index()]
    }
}
