//! Core agent storage: `AgentStore` (SoA data + stable id map).
//!
//! # Why Structure-of-Arrays?
//!
//! The step pipeline reads positions for every agent while building the
//! spatial tree, then writes velocities and positions in two separate parallel
//! passes.  With one `Vec` per field each pass borrows only the columns it
//! touches, so the integrate phase can hold `&mut velocity` and
//! `&mut position` while the solve phase results sit in a disjoint buffer:
//!
//! ```ignore
//! // rvo-sim integrate phase (simplified):
//! store.velocity.par_iter_mut()
//!     .zip(store.position.par_iter_mut())
//!     .zip(new_velocity.par_iter())
//!     .for_each(|((vel, pos), &nv)| { *vel = nv; *pos += nv * dt; });
//! ```
//!
//! # Ids vs. indices
//!
//! Agents are addressed by [`AgentId`] from the outside and by dense index on
//! the hot paths.  Removal uses swap-remove on every column, so the dense
//! index of the agent that was last is *not* stable; its id is repointed in
//! the map instead.

use rvo_core::{AgentId, IdMap, RvoError, RvoResult, Vec2};

use crate::AgentParams;
use crate::params;

// ── AgentStore ────────────────────────────────────────────────────────────────

/// Structure-of-Arrays storage for all agent state.
///
/// Every `Vec` field has exactly [`len`](Self::len) elements; a dense index
/// obtained from [`index_of`](Self::index_of) addresses all of them:
///
/// ```ignore
/// let i = store.index_of(id)?;
/// let pos = store.position[i];  // O(1), cache-friendly
/// ```
///
/// The columns are `pub` for indexed access on hot paths.  Do not push to or
/// remove from them directly; use [`insert`](Self::insert) and
/// [`remove`](Self::remove), which keep the columns and the id map in step.
#[derive(Debug, Default)]
pub struct AgentStore {
    /// Stable id of the agent at each dense index.
    pub ids: Vec<AgentId>,

    // ── Kinematic state ───────────────────────────────────────────────────
    pub position: Vec<Vec2>,
    pub velocity: Vec<Vec2>,
    /// Velocity the agent would take in the absence of other agents and
    /// obstacles.  Supplied externally every step (path following, steering).
    pub pref_velocity: Vec<Vec2>,

    // ── Avoidance parameters ──────────────────────────────────────────────
    pub radius: Vec<f32>,
    pub max_speed: Vec<f32>,
    pub neighbor_dist: Vec<f32>,
    pub max_neighbors: Vec<usize>,
    pub time_horizon: Vec<f32>,
    pub time_horizon_obst: Vec<f32>,

    index: IdMap<AgentId, usize>,
    next_id: u32,
}

impl AgentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live agents.  Equals the length of every SoA `Vec`.
    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// `true` if there are no agents.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Append an agent and return its freshly assigned id.
    pub fn insert(&mut self, position: Vec2, params: &AgentParams) -> AgentId {
        let id = AgentId(self.next_id);
        self.next_id += 1;

        self.index.insert(id, self.ids.len());
        self.ids.push(id);
        self.position.push(position);
        self.velocity.push(params.velocity);
        self.pref_velocity.push(Vec2::ZERO);
        self.radius.push(params.radius);
        self.max_speed.push(params.max_speed);
        self.neighbor_dist.push(params.neighbor_dist);
        self.max_neighbors.push(params.max_neighbors);
        self.time_horizon.push(params.time_horizon);
        self.time_horizon_obst.push(params.time_horizon_obst);
        id
    }

    /// Remove `id`, moving the last agent into its slot.
    ///
    /// Returns the dense index the agent occupied (which now holds the moved
    /// agent, if any), or `None` if `id` is not live.  Callers that keep
    /// per-agent buffers parallel to this store must `swap_remove` the same
    /// index.
    pub fn remove(&mut self, id: AgentId) -> Option<usize> {
        let index = self.index.remove(&id)?;

        self.ids.swap_remove(index);
        self.position.swap_remove(index);
        self.velocity.swap_remove(index);
        self.pref_velocity.swap_remove(index);
        self.radius.swap_remove(index);
        self.max_speed.swap_remove(index);
        self.neighbor_dist.swap_remove(index);
        self.max_neighbors.swap_remove(index);
        self.time_horizon.swap_remove(index);
        self.time_horizon_obst.swap_remove(index);

        // Repoint whichever agent now occupies the freed slot.
        if let Some(&moved) = self.ids.get(index) {
            self.index.insert(moved, index);
        }
        Some(index)
    }

    /// Dense index of `id`, if live.
    #[inline]
    pub fn index_of(&self, id: AgentId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Dense index of `id`, or [`RvoError::AgentNotFound`].
    #[inline]
    pub fn try_index(&self, id: AgentId) -> RvoResult<usize> {
        self.index_of(id).ok_or(RvoError::AgentNotFound(id))
    }

    #[inline]
    pub fn contains(&self, id: AgentId) -> bool {
        self.index.contains_key(&id)
    }

    /// Ids of all live agents in dense-index order.
    pub fn ids(&self) -> &[AgentId] {
        &self.ids
    }

    /// Reassemble the parameters of the agent at dense index `index`.
    ///
    /// # Panics
    /// Panics if `index >= len()`.
    pub fn params_at(&self, index: usize) -> AgentParams {
        AgentParams {
            neighbor_dist: self.neighbor_dist[index],
            max_neighbors: self.max_neighbors[index],
            time_horizon: self.time_horizon[index],
            time_horizon_obst: self.time_horizon_obst[index],
            radius: self.radius[index],
            max_speed: self.max_speed[index],
            velocity: self.velocity[index],
        }
    }

    /// Obstacle search radius of the agent at dense index `index`
    /// (see [`AgentParams::obstacle_range`]).
    #[inline]
    pub fn obstacle_range(&self, index: usize) -> f32 {
        params::obstacle_range(self.time_horizon_obst[index], self.max_speed[index], self.radius[index])
    }

    /// Remove every agent.  Ids are not reused afterwards.
    pub fn clear(&mut self) {
        self.ids.clear();
        self.position.clear();
        self.velocity.clear();
        self.pref_velocity.clear();
        self.radius.clear();
        self.max_speed.clear();
        self.neighbor_dist.clear();
        self.max_neighbors.clear();
        self.time_horizon.clear();
        self.time_horizon_obst.clear();
        self.index.clear();
    }

    /// Release spare capacity held by every column and the id map.
    pub fn shrink_to_fit(&mut self) {
        self.ids.shrink_to_fit();
        self.position.shrink_to_fit();
        self.velocity.shrink_to_fit();
        self.pref_velocity.shrink_to_fit();
        self.radius.shrink_to_fit();
        self.max_speed.shrink_to_fit();
        self.neighbor_dist.shrink_to_fit();
        self.max_neighbors.shrink_to_fit();
        self.time_horizon.shrink_to_fit();
        self.time_horizon_obst.shrink_to_fit();
        self.index.shrink_to_fit();
    }
}
