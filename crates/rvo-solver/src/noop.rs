//! A solver that performs no avoidance at all.

use rvo_core::Vec2;
use rvo_spatial::Neighborhood;

use crate::{Line, SolverContext, VelocitySolver};

/// A [`VelocitySolver`] that returns the preferred velocity, clamped to the
/// agent's maximum speed, and ignores every neighbour.
///
/// Useful as a baseline in tests and benchmarks.
pub struct PreferredVelocitySolver;

impl VelocitySolver for PreferredVelocitySolver {
    fn new_velocity(
        &self,
        agent:         usize,
        _neighborhood: &Neighborhood,
        ctx:           &SolverContext<'_>,
        _lines:        &mut Vec<Line>,
    ) -> Vec2 {
        ctx.agents.pref_velocity[agent].clamp_length_max(ctx.agents.max_speed[agent].max(0.0))
    }
}
