//! circle: agents start evenly spaced on a circle and walk to the antipodal
//! point, so the whole crowd meets in the middle.
//!
//! Set `RUST_LOG=debug` (or `trace`) to see the simulator's own events.

use std::f32::consts::TAU;
use std::time::Instant;

use anyhow::{Result, bail};
use tracing::info;
use tracing_subscriber::EnvFilter;

use rvo_agent::AgentParams;
use rvo_core::{AgentId, Vec2};
use rvo_sim::{Simulator, SimulatorBuilder};

// ── Constants ─────────────────────────────────────────────────────────────────

const AGENT_COUNT:    usize = 250;
const CIRCLE_RADIUS:  f32   = 200.0;
const TIME_STEP:      f32   = 0.25;
const MAX_STEPS:      u64   = 10_000;
const LOG_INTERVAL:   u64   = 100;   // steps between progress lines

// ── Scenario ──────────────────────────────────────────────────────────────────

fn agent_defaults() -> AgentParams {
    AgentParams::default()
        .with_neighbor_dist(15.0)
        .with_max_neighbors(10)
        .with_time_horizon(10.0)
        .with_time_horizon_obst(10.0)
        .with_radius(1.5)
        .with_max_speed(2.0)
}

fn setup(sim: &mut Simulator) -> Result<Vec<(AgentId, Vec2)>> {
    let mut goals = Vec::with_capacity(AGENT_COUNT);
    for i in 0..AGENT_COUNT {
        let angle = i as f32 * TAU / AGENT_COUNT as f32;
        let start = CIRCLE_RADIUS * Vec2::new(angle.cos(), angle.sin());
        let id = sim.add_agent(start)?;
        goals.push((id, -start));
    }
    Ok(goals)
}

/// Point every agent at its goal, at most one unit per second.
fn set_preferred_velocities(sim: &mut Simulator, goals: &[(AgentId, Vec2)]) -> Result<()> {
    for &(id, goal) in goals {
        let to_goal = goal - sim.agent_position(id)?;
        let pref = if to_goal.length_squared() > 1.0 { to_goal.normalize() } else { to_goal };
        sim.set_agent_pref_velocity(id, pref)?;
    }
    Ok(())
}

fn reached_goals(sim: &Simulator, goals: &[(AgentId, Vec2)]) -> Result<bool> {
    for &(id, goal) in goals {
        let radius = sim.agent_radius(id)?;
        if sim.agent_position(id)?.distance_squared(goal) > radius * radius {
            return Ok(false);
        }
    }
    Ok(true)
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut sim = SimulatorBuilder::new()
        .time_step(TIME_STEP)
        .agent_defaults(agent_defaults())
        .build()?;

    let goals = setup(&mut sim)?;
    info!(agents = sim.num_agents(), workers = sim.num_workers(), "scenario ready");

    let t0 = Instant::now();
    loop {
        if reached_goals(&sim, &goals)? {
            break;
        }
        if sim.step_count() >= MAX_STEPS {
            bail!("agents did not reach their goals within {MAX_STEPS} steps");
        }

        set_preferred_velocities(&mut sim, &goals)?;
        sim.do_step();

        if sim.step_count() % LOG_INTERVAL == 0 {
            let avg_speed = sim.agents().velocity.iter().map(|v| v.length()).sum::<f32>()
                / sim.num_agents() as f32;
            info!(step = sim.step_count(), time = sim.global_time(), avg_speed, "progress");
        }
    }

    info!(
        steps = sim.step_count(),
        sim_time = sim.global_time(),
        wall_secs = t0.elapsed().as_secs_f64(),
        "all agents reached their goals"
    );
    Ok(())
}
