//! A single obstacle vertex and the edge that leaves it.

use rvo_core::{ObstacleId, Vec2, VertexId};

/// One corner of an obstacle polygon.
///
/// Each vertex also stands for the directed edge `point → next.point`; the
/// obstacle tree and the solver both work edge-by-edge through this record.
/// The solid side of an edge is on its left.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObstacleVertex {
    /// Dense index of this vertex in its [`ObstacleStore`](crate::ObstacleStore).
    pub id: VertexId,
    pub point: Vec2,
    /// Unit vector from `point` towards the next vertex.
    pub direction: Vec2,
    /// `true` when the polygon turns left (or not at all) at this vertex.
    /// Always `true` for both ends of a two-vertex obstacle and for vertices
    /// synthesised by edge splits.
    pub convex: bool,
    pub prev: VertexId,
    pub next: VertexId,
    /// Group id returned by `add`; shared by all vertices of one polygon.
    pub obstacle: ObstacleId,
}
