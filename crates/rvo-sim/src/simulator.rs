//! The `Simulator` facade and its step pipeline.

use rvo_agent::{AgentParams, AgentStore};
use rvo_core::{AgentId, ObstacleId, RvoError, SimClock, Vec2, VertexId};
use rvo_obstacle::{ObstacleStore, ObstacleVertex};
use rvo_solver::{Line, OrcaSolver, SolverContext, VelocitySolver};
use rvo_spatial::{AgentTree, NeighborQuery, Neighborhood, ObstacleTree};
use tracing::{debug, trace, warn};

use crate::workers::WorkerPool;
use crate::{AgentReport, SimError, SimResult, StepObserver};

// ── Per-agent step buffers ────────────────────────────────────────────────────

/// Scratch and report storage of one agent, kept parallel to the
/// `AgentStore` columns.  Each solve task owns exactly one slot.
#[derive(Debug, Default)]
struct AgentSlot {
    neighborhood: Neighborhood,
    report:       AgentReport,
}

// ── Simulator ─────────────────────────────────────────────────────────────────

/// The crowd simulator.
///
/// `Simulator<S>` owns every agent, every obstacle, both spatial trees, and
/// the worker pool, and drives the step pipeline:
///
/// 1. **Obstacle tree**: rebuilt (single-threaded) if obstacles changed.
/// 2. **Agent tree**: rebuilt from current positions.
/// 3. **Solve phase** (parallel): per agent, gather neighbours from both
///    trees and ask the [`VelocitySolver`] for a new velocity.  Results go to
///    a buffer disjoint from the agent store.
/// 4. **Integrate phase** (parallel): `velocity = new_velocity;
///    position += velocity * dt`.
/// 5. **Clock**: `global_time += time_step * time_scale`.
///
/// # Step barrier
///
/// [`schedule_step`](Self::schedule_step) marks a step as in flight and
/// [`ensure_completed`](Self::ensure_completed) runs it to completion.  Every
/// structural mutation, every setter, and every tree query completes a
/// scheduled step first.  Getters take `&self` and report the state as of the
/// last completed step.
///
/// Create with [`Simulator::new`] or [`SimulatorBuilder`][crate::SimulatorBuilder].
pub struct Simulator<S: VelocitySolver = OrcaSolver> {
    agents:        AgentStore,
    obstacles:     ObstacleStore,
    agent_tree:    AgentTree,
    obstacle_tree: ObstacleTree,
    slots:         Vec<AgentSlot>,
    new_velocity:  Vec<Vec2>,
    clock:         SimClock,
    defaults:      Option<AgentParams>,
    solver:        S,
    workers:       WorkerPool,

    agent_tree_dirty:    bool,
    obstacle_tree_dirty: bool,
    step_pending:        bool,
}

impl Simulator<OrcaSolver> {
    /// An empty ORCA simulator with default settings and no agent defaults.
    /// The worker pool starts on the first step.
    pub fn new() -> Self {
        Self::from_parts(SimClock::default(), None, OrcaSolver, WorkerPool::default())
    }
}

impl Default for Simulator<OrcaSolver> {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-agent get/set pairs over one `AgentStore` column.
macro_rules! agent_accessors {
    ($($(#[$doc:meta])* $field:ident: $ty:ty => $get:ident, $set:ident $(, marks $flag:ident)?;)*) => {
        $(
            $(#[$doc])*
            pub fn $get(&self, id: AgentId) -> SimResult<$ty> {
                let i = self.agents.try_index(id)?;
                Ok(self.agents.$field[i])
            }

            $(#[$doc])*
            pub fn $set(&mut self, id: AgentId, value: $ty) -> SimResult<()> {
                self.ensure_completed();
                let i = self.agents.try_index(id)?;
                self.agents.$field[i] = value;
                $(self.$flag = true;)?
                Ok(())
            }
        )*
    };
}

impl<S: VelocitySolver> Simulator<S> {
    pub(crate) fn from_parts(clock: SimClock, defaults: Option<AgentParams>, solver: S, workers: WorkerPool) -> Self {
        Self {
            agents: AgentStore::new(),
            obstacles: ObstacleStore::new(),
            agent_tree: AgentTree::new(),
            obstacle_tree: ObstacleTree::new(),
            slots: Vec::new(),
            new_velocity: Vec::new(),
            clock,
            defaults,
            solver,
            workers,
            agent_tree_dirty: true,
            obstacle_tree_dirty: false,
            step_pending: false,
        }
    }

    // ── Agents ────────────────────────────────────────────────────────────

    /// Add an agent at `position` using the agent defaults.
    ///
    /// Fails with [`SimError::NoAgentDefaults`] (adding nothing) if
    /// [`set_agent_defaults`](Self::set_agent_defaults) was never called.
    pub fn add_agent(&mut self, position: Vec2) -> SimResult<AgentId> {
        let params = self.defaults.ok_or(SimError::NoAgentDefaults)?;
        Ok(self.add_agent_with(position, &params))
    }

    /// Add an agent at `position` with explicit parameters.
    pub fn add_agent_with(&mut self, position: Vec2, params: &AgentParams) -> AgentId {
        self.ensure_completed();
        let id = self.agents.insert(position, params);
        self.slots.push(AgentSlot::default());
        self.agent_tree_dirty = true;
        debug!(%id, x = position.x, y = position.y, "agent added");
        id
    }

    /// Remove `id`.  Returns `false` (changing nothing) if it is not live.
    pub fn remove_agent(&mut self, id: AgentId) -> bool {
        self.ensure_completed();
        match self.agents.remove(id) {
            Some(index) => {
                self.slots.swap_remove(index);
                self.agent_tree_dirty = true;
                debug!(%id, "agent removed");
                true
            }
            None => false,
        }
    }

    /// Remove every listed agent that is live.  Ids that are unknown, or
    /// repeated within `ids`, are skipped.  Returns the number removed.
    pub fn remove_agents(&mut self, ids: &[AgentId]) -> usize {
        ids.iter().filter(|&&id| self.remove_agent(id)).count()
    }

    agent_accessors! {
        /// Agent position.  Setting it invalidates the agent tree.
        position: Vec2 => agent_position, set_agent_position, marks agent_tree_dirty;
        /// Agent velocity (the one applied in the last step).
        velocity: Vec2 => agent_velocity, set_agent_velocity;
        /// Velocity the agent would take without avoidance.
        pref_velocity: Vec2 => agent_pref_velocity, set_agent_pref_velocity;
        /// Agent radius.  Setting it invalidates the agent tree.
        radius: f32 => agent_radius, set_agent_radius, marks agent_tree_dirty;
        max_speed: f32 => agent_max_speed, set_agent_max_speed;
        neighbor_dist: f32 => agent_neighbor_dist, set_agent_neighbor_dist;
        max_neighbors: usize => agent_max_neighbors, set_agent_max_neighbors;
        time_horizon: f32 => agent_time_horizon, set_agent_time_horizon;
        time_horizon_obst: f32 => agent_time_horizon_obst, set_agent_time_horizon_obst;
    }

    // ── Step reports ──────────────────────────────────────────────────────

    /// Everything the last step recorded for `id`.  Empty for agents added
    /// since.
    pub fn agent_report(&self, id: AgentId) -> SimResult<&AgentReport> {
        let i = self.agents.try_index(id)?;
        Ok(&self.slots[i].report)
    }

    pub fn agent_num_agent_neighbors(&self, id: AgentId) -> SimResult<usize> {
        Ok(self.agent_report(id)?.agent_neighbors.len())
    }

    /// The `k`-th nearest agent neighbour of `id` in the last step.
    pub fn agent_agent_neighbor(&self, id: AgentId, k: usize) -> SimResult<AgentId> {
        nth(&self.agent_report(id)?.agent_neighbors, k)
    }

    pub fn agent_num_obstacle_neighbors(&self, id: AgentId) -> SimResult<usize> {
        Ok(self.agent_report(id)?.obstacle_neighbors.len())
    }

    /// First vertex of the `k`-th nearest obstacle edge of `id` in the last
    /// step.
    pub fn agent_obstacle_neighbor(&self, id: AgentId, k: usize) -> SimResult<VertexId> {
        nth(&self.agent_report(id)?.obstacle_neighbors, k)
    }

    pub fn agent_num_orca_lines(&self, id: AgentId) -> SimResult<usize> {
        Ok(self.agent_report(id)?.orca_lines.len())
    }

    pub fn agent_orca_line(&self, id: AgentId, k: usize) -> SimResult<Line> {
        nth(&self.agent_report(id)?.orca_lines, k)
    }

    // ── Obstacles ─────────────────────────────────────────────────────────

    /// Add a polygon (counter-clockwise for a solid obstacle, clockwise for a
    /// bounding region; two points for a segment).  The obstacle tree is
    /// rebuilt on the next step or visibility query.
    pub fn add_obstacle(&mut self, vertices: &[Vec2]) -> SimResult<ObstacleId> {
        self.ensure_completed();
        let group = self
            .obstacles
            .add(vertices)
            .ok_or(SimError::TooFewVertices { got: vertices.len() })?;
        self.obstacle_tree_dirty = true;
        debug!(%group, vertices = vertices.len(), "obstacle added");
        Ok(group)
    }

    /// Remove every vertex of `group`, including vertices created by edge
    /// splits.  Returns `false` if the group is unknown.
    pub fn remove_obstacle(&mut self, group: ObstacleId) -> bool {
        self.ensure_completed();
        if !self.obstacles.remove(group) {
            return false;
        }
        self.obstacle_tree_dirty = true;
        debug!(%group, remaining = self.obstacles.len(), "obstacle removed");
        true
    }

    /// Number of obstacle vertices, including split vertices once the
    /// obstacle tree has been built.
    pub fn num_obstacle_vertices(&self) -> usize {
        self.obstacles.len()
    }

    pub fn obstacle_vertex(&self, vertex: VertexId) -> SimResult<ObstacleVertex> {
        self.obstacles
            .vertex(vertex)
            .copied()
            .ok_or(SimError::Core(RvoError::VertexNotFound(vertex)))
    }

    pub fn next_obstacle_vertex_id(&self, vertex: VertexId) -> SimResult<VertexId> {
        Ok(self.obstacle_vertex(vertex)?.next)
    }

    pub fn prev_obstacle_vertex_id(&self, vertex: VertexId) -> SimResult<VertexId> {
        Ok(self.obstacle_vertex(vertex)?.prev)
    }

    /// A vertex of `group` from which its cycle can be walked.
    pub fn first_obstacle_vertex_id(&self, group: ObstacleId) -> SimResult<VertexId> {
        self.obstacles
            .first_vertex(group)
            .ok_or(SimError::Core(RvoError::ObstacleNotFound(group)))
    }

    // ── Configuration ─────────────────────────────────────────────────────

    pub fn set_agent_defaults(&mut self, params: AgentParams) {
        self.defaults = Some(params);
    }

    pub fn agent_defaults(&self) -> Option<&AgentParams> {
        self.defaults.as_ref()
    }

    /// Set the unscaled time step.  Non-finite or non-positive values are
    /// rejected and leave the time step unchanged.
    pub fn set_time_step(&mut self, time_step: f32) -> SimResult<()> {
        if !(time_step.is_finite() && time_step > 0.0) {
            warn!(time_step, "ignoring invalid time step");
            return Err(SimError::InvalidTimeStep(time_step));
        }
        self.ensure_completed();
        self.clock.time_step = time_step;
        Ok(())
    }

    pub fn time_step(&self) -> f32 {
        self.clock.time_step
    }

    /// Set the multiplier applied to the time step (`0.0` pauses motion while
    /// steps still run).
    pub fn set_time_scale(&mut self, time_scale: f32) -> SimResult<()> {
        if !(time_scale.is_finite() && time_scale >= 0.0) {
            warn!(time_scale, "ignoring invalid time scale");
            return Err(SimError::InvalidTimeScale(time_scale));
        }
        self.ensure_completed();
        self.clock.time_scale = time_scale;
        Ok(())
    }

    pub fn time_scale(&self) -> f32 {
        self.clock.time_scale
    }

    /// Resize the worker pool (at least one worker).
    pub fn set_num_workers(&mut self, workers: usize) -> SimResult<()> {
        self.ensure_completed();
        self.workers.resize(workers)?;
        debug!(workers = self.workers.workers(), "worker pool resized");
        Ok(())
    }

    pub fn num_workers(&self) -> usize {
        self.workers.workers()
    }

    pub fn set_global_time(&mut self, global_time: f32) {
        self.ensure_completed();
        self.clock.global_time = global_time;
    }

    pub fn global_time(&self) -> f32 {
        self.clock.global_time
    }

    /// Steps completed since construction or the last [`clear`](Self::clear).
    pub fn step_count(&self) -> u64 {
        self.clock.steps
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    // ── Read-only state ───────────────────────────────────────────────────

    pub fn num_agents(&self) -> usize {
        self.agents.len()
    }

    /// Ids of all live agents.
    pub fn agent_ids(&self) -> &[AgentId] {
        self.agents.ids()
    }

    pub fn agents(&self) -> &AgentStore {
        &self.agents
    }

    pub fn obstacles(&self) -> &ObstacleStore {
        &self.obstacles
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Collect into `out` (cleared first) the id of every agent strictly
    /// within `radius` of `point`, and return how many were found.  A
    /// negative or NaN `radius` finds nothing.
    pub fn query_agent(&mut self, point: Vec2, radius: f32, out: &mut Vec<AgentId>) -> usize {
        self.ensure_completed();
        out.clear();
        if radius.is_nan() || radius < 0.0 {
            return 0;
        }
        if self.agent_tree_dirty {
            self.agent_tree.build(&self.agents.position);
            self.agent_tree_dirty = false;
        }

        let mut indices = Vec::new();
        self.agent_tree.query_radius(&self.agents.position, point, radius, &mut indices);
        out.extend(indices.into_iter().map(|i| self.agents.ids[i]));
        out.len()
    }

    /// `true` if the segment `p1 → p2`, thickened by `radius`, crosses no
    /// obstacle edge.  Always `true` without obstacles.
    pub fn query_visibility(&mut self, p1: Vec2, p2: Vec2, radius: f32) -> bool {
        self.ensure_completed();
        self.ensure_obstacle_tree();
        self.obstacle_tree.query_visibility(&self.obstacles, p1, p2, radius)
    }

    // ── Control ───────────────────────────────────────────────────────────

    /// Run one full step.
    pub fn do_step(&mut self) {
        self.schedule_step();
        self.ensure_completed();
    }

    /// Mark a step as in flight.  It runs at the next barrier: an explicit
    /// [`ensure_completed`](Self::ensure_completed) or any call that needs a
    /// consistent state.  A step already in flight is completed first.
    pub fn schedule_step(&mut self) {
        self.ensure_completed();
        self.step_pending = true;
    }

    /// Complete the step in flight, if any.
    pub fn ensure_completed(&mut self) {
        if self.step_pending {
            self.step_pending = false;
            self.run_step();
        }
    }

    /// `true` while a scheduled step has not run yet.
    pub fn is_step_pending(&self) -> bool {
        self.step_pending
    }

    /// Run `n` steps, reporting each to `observer`.
    pub fn run_steps<O: StepObserver>(&mut self, n: u64, observer: &mut O) {
        for _ in 0..n {
            observer.on_step_start(&self.clock);
            self.do_step();
            observer.on_step_end(&self.clock, &self.agents);
        }
        observer.on_run_end(&self.clock);
    }

    /// Remove every agent and obstacle and rewind the clock.  Agent defaults,
    /// time step, time scale, and worker count are kept.
    pub fn clear(&mut self) {
        self.ensure_completed();
        self.agents.clear();
        self.obstacles.clear();
        self.agent_tree.clear();
        self.obstacle_tree.clear();
        self.slots.clear();
        self.new_velocity.clear();
        self.clock.reset();
        self.agent_tree_dirty = true;
        self.obstacle_tree_dirty = false;
        debug!("simulator cleared");
    }

    /// Release all owned storage and stop the worker threads.  A step still
    /// in flight is discarded.  Safe to call more than once; the simulator
    /// stays usable and restarts its workers on the next step.
    pub fn dispose(&mut self) {
        self.step_pending = false;
        self.clear();
        self.agents.shrink_to_fit();
        self.obstacles.shrink_to_fit();
        self.slots.shrink_to_fit();
        self.new_velocity.shrink_to_fit();
        self.workers.shutdown();
    }

    // ── Step pipeline ─────────────────────────────────────────────────────

    fn run_step(&mut self) {
        if !self.workers.is_started() {
            if let Err(e) = self.workers.start() {
                warn!(error = %e, "worker pool unavailable; stepping on the calling thread");
            }
        }

        let dt = self.clock.effective_time_step();
        self.ensure_obstacle_tree();

        self.agent_tree.build(&self.agents.position);
        self.new_velocity.resize(self.agents.len(), Vec2::ZERO);

        self.solve(dt);
        self.integrate(dt);
        self.agent_tree_dirty = true;

        self.clock.advance();
        trace!(clock = %self.clock, agents = self.agents.len(), "step complete");
    }

    fn ensure_obstacle_tree(&mut self) {
        if !self.obstacle_tree_dirty {
            return;
        }
        let before = self.obstacles.len();
        self.obstacle_tree.build(&mut self.obstacles);
        self.obstacle_tree_dirty = false;
        debug!(
            vertices = before,
            after_splits = self.obstacles.len(),
            "obstacle tree rebuilt"
        );
    }

    /// Solve phase: one independent task per agent writing only its own slot
    /// and `new_velocity` entry.
    fn solve(&mut self, dt: f32) {
        let Self { agents, obstacles, agent_tree, obstacle_tree, slots, new_velocity, solver, workers, .. } = self;
        let (agents, obstacles, agent_tree, obstacle_tree, solver) =
            (&*agents, &*obstacles, &*agent_tree, &*obstacle_tree, &*solver);
        let ctx = SolverContext::new(agents, obstacles, dt);

        let solve_one = |i: usize, slot: &mut AgentSlot, out: &mut Vec2| {
            let query = NeighborQuery {
                index: i,
                position: agents.position[i],
                neighbor_dist: agents.neighbor_dist[i],
                max_neighbors: agents.max_neighbors[i],
                obstacle_range: agents.obstacle_range(i),
            };
            slot.neighborhood.compute(&query, agent_tree, &agents.position, obstacle_tree, obstacles);
            slot.report.clear();
            *out = solver.new_velocity(i, &slot.neighborhood, &ctx, &mut slot.report.orca_lines);
            slot.report.record(&slot.neighborhood, &agents.ids);
        };

        #[cfg(not(feature = "parallel"))]
        workers.install(|| {
            slots
                .iter_mut()
                .zip(new_velocity.iter_mut())
                .enumerate()
                .for_each(|(i, (slot, out))| solve_one(i, slot, out));
        });

        #[cfg(feature = "parallel")]
        workers.install(|| {
            use rayon::prelude::*;

            slots
                .par_iter_mut()
                .zip(new_velocity.par_iter_mut())
                .enumerate()
                .for_each(|(i, (slot, out))| solve_one(i, slot, out));
        });
    }

    /// Integrate phase: `velocity = new_velocity; position += velocity * dt`.
    fn integrate(&mut self, dt: f32) {
        let velocity = &mut self.agents.velocity;
        let position = &mut self.agents.position;
        let new_velocity = &self.new_velocity;

        #[cfg(not(feature = "parallel"))]
        self.workers.install(|| {
            velocity
                .iter_mut()
                .zip(position.iter_mut())
                .zip(new_velocity.iter())
                .for_each(|((vel, pos), &nv)| {
                    *vel = nv;
                    *pos += nv * dt;
                });
        });

        #[cfg(feature = "parallel")]
        self.workers.install(|| {
            use rayon::prelude::*;

            velocity
                .par_iter_mut()
                .zip(position.par_iter_mut())
                .zip(new_velocity.par_iter())
                .for_each(|((vel, pos), &nv)| {
                    *vel = nv;
                    *pos += nv * dt;
                });
        });
    }
}

impl<S: VelocitySolver> Drop for Simulator<S> {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn nth<T: Copy>(items: &[T], index: usize) -> SimResult<T> {
    items
        .get(index)
        .copied()
        .ok_or(SimError::NeighborOutOfRange { index, len: items.len() })
}
