//! The `VelocitySolver` trait: the pluggable avoidance strategy.

use rvo_core::Vec2;
use rvo_spatial::Neighborhood;

use crate::{Line, SolverContext};

/// Computes each agent's collision-avoiding velocity for one step.
///
/// # Thread safety
///
/// The simulator calls [`new_velocity`][Self::new_velocity] for many agents
/// in parallel through rayon, so implementations must be `Send + Sync` and
/// keep no per-call mutable state.  Everything an agent needs is in `ctx`
/// (read-only) and its own `neighborhood`.
///
/// # Example
///
/// ```rust,ignore
/// struct Stop;
///
/// impl VelocitySolver for Stop {
///     fn new_velocity(&self, _: usize, _: &Neighborhood, _: &SolverContext<'_>, _: &mut Vec<Line>) -> Vec2 {
///         Vec2::ZERO
///     }
/// }
/// ```
pub trait VelocitySolver: Send + Sync + 'static {
    /// Return the new velocity of the agent at dense index `agent`.
    ///
    /// `lines` arrives empty.  Solvers that work with half-plane constraints
    /// leave the ones they used in it (obstacle lines first) so the simulator
    /// can report them; others leave it empty.
    fn new_velocity(
        &self,
        agent:        usize,
        neighborhood: &Neighborhood,
        ctx:          &SolverContext<'_>,
        lines:        &mut Vec<Line>,
    ) -> Vec2;
}
