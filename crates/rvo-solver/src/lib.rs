//! `rvo-solver`: the per-agent velocity solver.
//!
//! # Crate layout
//!
//! | Module             | Contents                                                  |
//! |--------------------|-----------------------------------------------------------|
//! | [`line`]           | `Line`: directed half-plane in velocity space            |
//! | [`context`]        | `SolverContext<'a>`: read-only step snapshot             |
//! | [`model`]          | `VelocitySolver` trait                                    |
//! | [`orca`]           | `OrcaSolver`: reciprocal collision avoidance             |
//! | [`linear_program`] | `linear_program1/2/3`: incremental 2-D LPs               |
//! | [`noop`]           | `PreferredVelocitySolver`: no avoidance                  |
//!
//! # Design notes
//!
//! The step loop in rvo-sim runs in phases separated by barriers:
//!
//! 1. **Solve phase** (parallel): for every agent, gather its
//!    `Neighborhood` and call `VelocitySolver::new_velocity`.  All reads go
//!    through `&SolverContext`; each call writes only its own output slot.
//!
//! 2. **Integrate phase** (parallel): copy the new velocities into the
//!    `AgentStore` and advance positions.
//!
//! A solver never sees a half-updated store, so `VelocitySolver` only needs
//! to be `Send + Sync`.

pub mod context;
pub mod line;
pub mod linear_program;
pub mod model;
pub mod noop;
pub mod orca;


pub use context::SolverContext;
pub use line::Line;
pub use linear_program::{linear_program1, linear_program2, linear_program3};
pub use model::VelocitySolver;
pub use noop::PreferredVelocitySolver;
pub use orca::OrcaSolver;
