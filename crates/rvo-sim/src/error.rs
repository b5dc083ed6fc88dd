use rvo_core::RvoError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    #[error(transparent)]
    Core(#[from] RvoError),

    #[error("no agent defaults set; call set_agent_defaults or use add_agent_with")]
    NoAgentDefaults,

    #[error("an obstacle needs at least 2 vertices, got {got}")]
    TooFewVertices { got: usize },

    #[error("time step must be finite and positive, got {0}")]
    InvalidTimeStep(f32),

    #[error("time scale must be finite and non-negative, got {0}")]
    InvalidTimeScale(f32),

    #[error("neighbour {index} requested but only {len} were recorded")]
    NeighborOutOfRange { index: usize, len: usize },

    #[error("failed to start worker pool: {0}")]
    ThreadPool(String),
}

pub type SimResult<T> = Result<T, SimError>;
