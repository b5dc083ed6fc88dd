//! Simulation time model.
//!
//! # Design
//!
//! The simulator advances in fixed steps.  Each step covers the *effective*
//! time step:
//!
//!   effective = time_step * time_scale
//!
//! `time_scale` lets a host application slow down or speed up the crowd (a
//! game's time-scale, a pause at `0.0`) without touching the configured
//! `time_step`.  `global_time` accumulates effective time, never wall-clock
//! time, so it is reproducible regardless of how fast steps are driven.

use std::fmt;

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Tracks the configured time step, the external time scale, the accumulated
/// simulation time, and the number of completed steps.
///
/// `SimClock` is cheap to copy and intentionally holds no heap data.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Seconds covered by one step before scaling.  Default: 0.25.
    pub time_step: f32,
    /// Multiplier applied to `time_step`.  Default: 1.0.
    pub time_scale: f32,
    /// Accumulated effective time in seconds.
    pub global_time: f32,
    /// Number of completed steps since construction or the last reset.
    pub steps: u64,
}

impl SimClock {
    /// Create a clock with the given unscaled time step.
    pub fn new(time_step: f32) -> Self {
        Self {
            time_step,
            time_scale: 1.0,
            global_time: 0.0,
            steps: 0,
        }
    }

    /// The time step actually applied by the next step.
    #[inline]
    pub fn effective_time_step(&self) -> f32 {
        self.time_step * self.time_scale
    }

    /// Advance the clock by one step and return the effective time step used.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        let dt = self.effective_time_step();
        self.global_time += dt;
        self.steps += 1;
        dt
    }

    /// Rewind to time zero, keeping `time_step` and `time_scale`.
    pub fn reset(&mut self) {
        self.global_time = 0.0;
        self.steps = 0;
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(0.25)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "step {} (t = {:.3} s, dt = {:.3} s)",
            self.steps,
            self.global_time,
            self.effective_time_step()
        )
    }
}
