//! Framework error type.
//!
//! Sub-crates may define their own error enums and convert `RvoError` into
//! them via `From` impls (see `rvo_sim::SimError`), or return it directly.

use thiserror::Error;

use crate::{AgentId, ObstacleId, VertexId};

/// The base error type shared by the `rvo-*` crates.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RvoError {
    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("obstacle {0} not found")]
    ObstacleNotFound(ObstacleId),

    #[error("obstacle vertex {0} not found")]
    VertexNotFound(VertexId),
}

/// Shorthand result type for all `rvo-*` crates.
pub type RvoResult<T> = Result<T, RvoError>;
