//! `rvo-sim`: the crowd simulator facade and its step pipeline.
//!
//! # Step pipeline
//!
//! ```text
//! do_step():
//!   ① Obstacle tree: rebuilt only if obstacles were added or removed
//!                     (single-threaded; may split edges).
//!   ② Agent tree:    rebuilt from current positions.
//!   ③ Solve:         per agent, in parallel: neighbour queries against both
//!                     trees, then VelocitySolver::new_velocity into a
//!                     separate buffer.                          ── barrier ──
//!   ④ Integrate:     per agent, in parallel:
//!                     velocity = new_velocity; position += velocity * dt
//!                                                               ── barrier ──
//!   ⑤ Clock:         global_time += time_step * time_scale
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                       |
//! |------------|--------------------------------------------------------------|
//! | `parallel` | (default) Runs ③ and ④ on a dedicated Rayon thread pool.     |
//! | `serde`    | Derives `Serialize`/`Deserialize` on ids, params, the clock. |
//! | `fx-hash`  | FxHash for the id → index maps.                              |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use rvo_agent::AgentParams;
//! use rvo_core::Vec2;
//! use rvo_sim::SimulatorBuilder;
//!
//! let mut sim = SimulatorBuilder::new()
//!     .time_step(0.25)
//!     .agent_defaults(AgentParams::default())
//!     .build()?;
//! let a = sim.add_agent(Vec2::new(-10.0, 0.0))?;
//! sim.set_agent_pref_velocity(a, Vec2::new(1.0, 0.0))?;
//! sim.do_step();
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod report;
pub mod simulator;
pub mod workers;

#[cfg(test)]
mod tests;

pub use builder::SimulatorBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, StepObserver};
pub use report::AgentReport;
pub use simulator::Simulator;
pub use workers::{WorkerPool, default_workers};
