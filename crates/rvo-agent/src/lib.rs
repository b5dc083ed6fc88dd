//! `rvo-agent`: Structure-of-Arrays agent registry for the `rvo` simulator.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                   |
//! |------------|------------------------------------------------------------|
//! | [`params`] | `AgentParams` (per-agent avoidance parameters)             |
//! | [`store`]  | `AgentStore` (SoA arrays + `AgentId` → index map)          |
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                    |
//! |-----------|-----------------------------------------------------------|
//! | `serde`   | Derives `Serialize`/`Deserialize` on `AgentParams`.       |
//! | `fx-hash` | FxHash for the id → index map.                            |

pub mod params;
pub mod store;

#[cfg(test)]
mod tests;

pub use params::AgentParams;
pub use store::AgentStore;
