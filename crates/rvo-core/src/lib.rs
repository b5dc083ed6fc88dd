//! `rvo-core`: foundational types for the `rvo` crowd simulator.
//!
//! This crate is a dependency of every other `rvo-*` crate.  It intentionally
//! has no `rvo-*` dependencies and minimal external ones (`glam` for the 2-D
//! vector type and `thiserror`, plus optional `serde` / `rustc-hash`).
//!
//! # What lives here
//!
//! | Module    | Contents                                                  |
//! |-----------|-----------------------------------------------------------|
//! | [`ids`]   | `AgentId`, `ObstacleId`, `VertexId`, `IdMap`              |
//! | [`geo`]   | `Vec2`, `det`, `left_of`, `dist_sq_point_segment`         |
//! | [`time`]  | `SimClock` (time step, time scale, global time)           |
//! | [`error`] | `RvoError`, `RvoResult`                                   |
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                   |
//! |-----------|----------------------------------------------------------|
//! | `serde`   | Adds `Serialize`/`Deserialize` to all public types.      |
//! | `fx-hash` | `IdMap` uses `FxHashMap` instead of std `HashMap`.       |

pub mod error;
pub mod geo;
pub mod ids;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{RvoError, RvoResult};
pub use geo::{RVO_EPSILON, Vec2, det, dist_sq_point_segment, left_of, sqr};
pub use ids::{AgentId, IdMap, ObstacleId, VertexId};
pub use time::SimClock;
