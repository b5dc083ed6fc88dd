//! Per-agent neighbour sets gathered from both trees.

use rvo_core::{Vec2, VertexId, sqr};
use rvo_obstacle::ObstacleStore;

use crate::{AgentTree, ObstacleTree};

/// Inputs of one neighbour search.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NeighborQuery {
    /// Dense index of the searching agent (excluded from its own result).
    pub index: usize,
    pub position: Vec2,
    pub neighbor_dist: f32,
    pub max_neighbors: usize,
    /// Obstacle search radius, usually `time_horizon_obst * max_speed + radius`.
    pub obstacle_range: f32,
}

/// Neighbours of one agent, each list sorted by ascending squared distance.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Neighborhood {
    /// `(dist_sq, agent index)`, at most `max_neighbors` entries.
    pub agents: Vec<(f32, usize)>,
    /// `(dist_sq, first vertex of the edge)`, uncapped.
    pub obstacles: Vec<(f32, VertexId)>,
}

impl Neighborhood {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.agents.clear();
        self.obstacles.clear();
    }

    /// Refill both lists for `query`.
    ///
    /// The agent search only runs when `max_neighbors > 0`.
    pub fn compute(
        &mut self,
        query: &NeighborQuery,
        agent_tree: &AgentTree,
        positions: &[Vec2],
        obstacle_tree: &ObstacleTree,
        obstacles: &ObstacleStore,
    ) {
        self.clear();

        let obstacle_range_sq = sqr(query.obstacle_range);
        obstacle_tree.query_neighbors(obstacles, query.position, obstacle_range_sq, |v, d| {
            insert_sorted(&mut self.obstacles, (d, v));
        });

        if query.max_neighbors > 0 {
            let mut range_sq = sqr(query.neighbor_dist);
            let cap = query.max_neighbors;
            let agents = &mut self.agents;
            agent_tree.query(positions, query.position, &mut range_sq, |other, d, range| {
                if other == query.index {
                    return;
                }
                if agents.len() < cap {
                    agents.push((d, other));
                } else if d < agents[cap - 1].0 {
                    agents[cap - 1] = (d, other);
                } else {
                    return;
                }
                bubble_last(agents);
                if agents.len() == cap {
                    *range = agents[cap - 1].0;
                }
            });
        }
    }
}

/// Insert keeping ascending order by distance; ties keep arrival order.
fn insert_sorted<T>(list: &mut Vec<(f32, T)>, entry: (f32, T)) {
    list.push(entry);
    bubble_last(list);
}

/// Move the last element left past every element with a larger distance.
fn bubble_last<T>(list: &mut [(f32, T)]) {
    let mut i = list.len();
    while i > 1 && list[i - 1].0 < list[i - 2].0 {
        list.swap(i - 1, i - 2);
        i -= 1;
    }
}
