//! What the last step computed for one agent.

use rvo_core::{AgentId, VertexId};
use rvo_solver::Line;
use rvo_spatial::Neighborhood;

/// Neighbours and constraints an agent used during the most recent step.
///
/// Ids are captured when the step runs.  Obstacle vertex ids refer to the
/// obstacle registry at that time and may be stale after an obstacle removal.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AgentReport {
    /// Agent neighbours, nearest first.
    pub agent_neighbors: Vec<AgentId>,
    /// First vertex of each neighbouring obstacle edge, nearest first.
    pub obstacle_neighbors: Vec<VertexId>,
    /// ORCA lines in solver order (obstacle lines first).
    pub orca_lines: Vec<Line>,
}

impl AgentReport {
    pub(crate) fn record(&mut self, neighborhood: &Neighborhood, ids: &[AgentId]) {
        self.agent_neighbors.clear();
        self.agent_neighbors.extend(neighborhood.agents.iter().map(|&(_, i)| ids[i]));
        self.obstacle_neighbors.clear();
        self.obstacle_neighbors.extend(neighborhood.obstacles.iter().map(|&(_, v)| v));
    }

    pub(crate) fn clear(&mut self) {
        self.agent_neighbors.clear();
        self.obstacle_neighbors.clear();
        self.orca_lines.clear();
    }
}
