//! Per-agent avoidance parameters.
//!
//! # Usage
//!
//! ```rust
//! use rvo_agent::AgentParams;
//!
//! let params = AgentParams::default()
//!     .with_radius(0.4)
//!     .with_max_speed(1.5)
//!     .with_neighbor_dist(10.0);
//!
//! assert_eq!(params.radius, 0.4);
//! assert_eq!(params.max_neighbors, 10);
//! ```

use rvo_core::Vec2;

/// Everything needed to create an agent apart from its position.
///
/// The simulator keeps one `AgentParams` as its *agent defaults*; agents added
/// without explicit parameters copy it.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentParams {
    /// Maximum centre-to-centre distance at which other agents are considered.
    pub neighbor_dist: f32,
    /// Cap on the number of agent neighbours fed to the solver.  `0` disables
    /// agent-agent avoidance for this agent.
    pub max_neighbors: usize,
    /// How far ahead (seconds) collisions with other agents are anticipated.
    pub time_horizon: f32,
    /// How far ahead (seconds) collisions with obstacles are anticipated.
    pub time_horizon_obst: f32,
    pub radius: f32,
    pub max_speed: f32,
    /// Initial velocity.
    pub velocity: Vec2,
}

impl Default for AgentParams {
    /// Values from the classic 250-agent circle scenario.
    fn default() -> Self {
        Self {
            neighbor_dist: 15.0,
            max_neighbors: 10,
            time_horizon: 10.0,
            time_horizon_obst: 10.0,
            radius: 1.5,
            max_speed: 2.0,
            velocity: Vec2::ZERO,
        }
    }
}

impl AgentParams {
    pub fn with_neighbor_dist(mut self, neighbor_dist: f32) -> Self {
        self.neighbor_dist = neighbor_dist;
        self
    }

    pub fn with_max_neighbors(mut self, max_neighbors: usize) -> Self {
        self.max_neighbors = max_neighbors;
        self
    }

    pub fn with_time_horizon(mut self, time_horizon: f32) -> Self {
        self.time_horizon = time_horizon;
        self
    }

    pub fn with_time_horizon_obst(mut self, time_horizon_obst: f32) -> Self {
        self.time_horizon_obst = time_horizon_obst;
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_max_speed(mut self, max_speed: f32) -> Self {
        self.max_speed = max_speed;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Radius of the disc searched for obstacle neighbours: the distance the
    /// agent can cover within `time_horizon_obst`, plus its own radius.
    #[inline]
    pub fn obstacle_range(&self) -> f32 {
        obstacle_range(self.time_horizon_obst, self.max_speed, self.radius)
    }
}

#[inline]
pub(crate) fn obstacle_range(time_horizon_obst: f32, max_speed: f32, radius: f32) -> f32 {
    time_horizon_obst * max_speed + radius
}
