//! `rvo-obstacle`: static polygonal obstacles for the `rvo` simulator.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                   |
//! |------------|------------------------------------------------------------|
//! | [`vertex`] | `ObstacleVertex` (point, edge direction, convexity, links) |
//! | [`store`]  | `ObstacleStore` (dense vertex array + group multimap)      |
//!
//! # Winding
//!
//! The solid side of every edge is to its left: counter-clockwise polygons
//! are solid obstacles, clockwise polygons bound a walkable region.

pub mod store;
pub mod vertex;


pub use store::ObstacleStore;
pub use vertex::ObstacleVertex;
