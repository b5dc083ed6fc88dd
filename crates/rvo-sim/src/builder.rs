//! Fluent builder for constructing a [`Simulator`].

use rvo_agent::AgentParams;
use rvo_core::SimClock;
use rvo_solver::{OrcaSolver, VelocitySolver};
use tracing::debug;

use crate::workers::{WorkerPool, default_workers};
use crate::{SimError, SimResult, Simulator};

/// Fluent builder for [`Simulator<S>`].
///
/// # Optional inputs (all have defaults)
///
/// | Method                | Default                                 |
/// |-----------------------|-----------------------------------------|
/// | `.time_step(dt)`      | `0.25` s                                |
/// | `.time_scale(k)`      | `1.0`                                   |
/// | `.agent_defaults(p)`  | unset: `add_agent` fails until set      |
/// | `.num_workers(n)`     | available parallelism                   |
/// | `.solver(s)`          | [`OrcaSolver`]                          |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimulatorBuilder::new()
///     .time_step(0.1)
///     .agent_defaults(AgentParams::default().with_radius(0.4))
///     .num_workers(4)
///     .build()?;
/// ```
pub struct SimulatorBuilder<S: VelocitySolver = OrcaSolver> {
    time_step:   f32,
    time_scale:  f32,
    defaults:    Option<AgentParams>,
    num_workers: Option<usize>,
    solver:      S,
}

impl SimulatorBuilder<OrcaSolver> {
    pub fn new() -> Self {
        let clock = SimClock::default();
        Self {
            time_step:   clock.time_step,
            time_scale:  clock.time_scale,
            defaults:    None,
            num_workers: None,
            solver:      OrcaSolver,
        }
    }
}

impl Default for SimulatorBuilder<OrcaSolver> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: VelocitySolver> SimulatorBuilder<S> {
    /// Unscaled seconds per step.  Must be finite and positive.
    pub fn time_step(mut self, time_step: f32) -> Self {
        self.time_step = time_step;
        self
    }

    /// Multiplier applied to the time step.  Must be finite and non-negative.
    pub fn time_scale(mut self, time_scale: f32) -> Self {
        self.time_scale = time_scale;
        self
    }

    /// Parameters copied by every agent added with `add_agent`.
    pub fn agent_defaults(mut self, params: AgentParams) -> Self {
        self.defaults = Some(params);
        self
    }

    pub fn num_workers(mut self, workers: usize) -> Self {
        self.num_workers = Some(workers);
        self
    }

    /// Replace the velocity solver.
    pub fn solver<T: VelocitySolver>(self, solver: T) -> SimulatorBuilder<T> {
        SimulatorBuilder {
            time_step:   self.time_step,
            time_scale:  self.time_scale,
            defaults:    self.defaults,
            num_workers: self.num_workers,
            solver,
        }
    }

    /// Validate the configuration, start the worker pool, and return an
    /// empty simulator.
    pub fn build(self) -> SimResult<Simulator<S>> {
        if !(self.time_step.is_finite() && self.time_step > 0.0) {
            return Err(SimError::InvalidTimeStep(self.time_step));
        }
        if !(self.time_scale.is_finite() && self.time_scale >= 0.0) {
            return Err(SimError::InvalidTimeScale(self.time_scale));
        }

        let mut clock = SimClock::new(self.time_step);
        clock.time_scale = self.time_scale;

        let mut workers = WorkerPool::new(self.num_workers.unwrap_or_else(default_workers));
        workers.start()?;
        debug!(workers = workers.workers(), dt = self.time_step, "simulator built");

        Ok(Simulator::from_parts(clock, self.defaults, self.solver, workers))
    }
}
