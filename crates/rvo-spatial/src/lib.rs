//! `rvo-spatial`: spatial indexes for neighbour and visibility queries.
//!
//! # Crate layout
//!
//! | Module            | Contents                                                |
//! |-------------------|---------------------------------------------------------|
//! | [`agent_tree`]    | `AgentTree` (k-d tree over agent positions)             |
//! | [`obstacle_tree`] | `ObstacleTree` (BSP over obstacle edges, splits edges)  |
//! | [`neighbors`]     | `Neighborhood`, `NeighborQuery` (per-agent search)      |
//!
//! Both trees are plain index structures: they own no agent or obstacle data
//! and are queried against the `AgentStore` positions / `ObstacleStore` they
//! were built from.  Using a tree after its source changed without a rebuild
//! gives stale (but memory-safe) answers.

pub mod agent_tree;
pub mod neighbors;
pub mod obstacle_tree;


pub use agent_tree::{AgentTree, AgentTreeNode, MAX_LEAF_SIZE};
pub use neighbors::{NeighborQuery, Neighborhood};
pub use obstacle_tree::{ObstacleTree, ObstacleTreeNode};
