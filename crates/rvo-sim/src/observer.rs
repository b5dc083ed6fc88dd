//! Step observer trait for progress reporting and data collection.

use rvo_agent::AgentStore;
use rvo_core::SimClock;

/// Callbacks invoked by [`Simulator::run_steps`][crate::Simulator::run_steps]
/// around every step.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: trajectory recorder
///
/// ```rust,ignore
/// struct Trace(Vec<Vec<Vec2>>);
///
/// impl StepObserver for Trace {
///     fn on_step_end(&mut self, _clock: &SimClock, agents: &AgentStore) {
///         self.0.push(agents.position.clone());
///     }
/// }
/// ```
pub trait StepObserver {
    /// Called before each step; `clock` still shows the previous step.
    fn on_step_start(&mut self, _clock: &SimClock) {}

    /// Called after each step with the integrated agent state.
    fn on_step_end(&mut self, _clock: &SimClock, _agents: &AgentStore) {}

    /// Called once after the last step of the run.
    fn on_run_end(&mut self, _clock: &SimClock) {}
}

/// A [`StepObserver`] that does nothing.
pub struct NoopObserver;

impl StepObserver for NoopObserver {}
