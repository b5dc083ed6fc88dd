//! Read-only simulation state passed to the velocity solver.

use rvo_agent::AgentStore;
use rvo_obstacle::ObstacleStore;

/// A read-only snapshot shared by every per-agent solver call of one step.
///
/// Built once per step by rvo-sim after both spatial trees are current.
/// Nothing here is mutated while the solve phase runs, so the solver may be
/// called for many agents in parallel.
pub struct SolverContext<'a> {
    /// Every agent's SoA state.  Positions and velocities are those at the
    /// start of the step.
    pub agents: &'a AgentStore,

    /// Obstacle vertices, including any created by obstacle-tree splits.
    pub obstacles: &'a ObstacleStore,

    /// Effective time step (`time_step * time_scale`) in seconds.
    pub time_step: f32,
}

impl<'a> SolverContext<'a> {
    #[inline]
    pub fn new(agents: &'a AgentStore, obstacles: &'a ObstacleStore, time_step: f32) -> Self {
        Self { agents, obstacles, time_step }
    }
}
