//! Integration tests for rvo-sim.

use std::collections::HashMap;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rvo_agent::AgentParams;
use rvo_core::{AgentId, RvoError, Vec2};

use crate::{NoopObserver, SimError, Simulator, SimulatorBuilder, StepObserver};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn defaults() -> AgentParams {
    AgentParams::default()
        .with_radius(0.5)
        .with_max_speed(1.0)
        .with_neighbor_dist(10.0)
        .with_max_neighbors(10)
        .with_time_horizon(2.0)
        .with_time_horizon_obst(2.0)
}

fn sim() -> Simulator {
    SimulatorBuilder::new()
        .time_step(0.25)
        .agent_defaults(defaults())
        .num_workers(2)
        .build()
        .unwrap()
}

/// Steer every agent towards its goal at up to unit speed.
fn steer(sim: &mut Simulator, goals: &[(AgentId, Vec2)]) {
    for &(id, goal) in goals {
        let to_goal = goal - sim.agent_position(id).unwrap();
        sim.set_agent_pref_velocity(id, to_goal.clamp_length_max(1.0)).unwrap();
    }
}

// ── SimulatorBuilder ──────────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use rvo_solver::PreferredVelocitySolver;

    use super::*;

    #[test]
    fn defaults_are_applied() {
        let sim = SimulatorBuilder::new().build().unwrap();
        assert_eq!(sim.time_step(), 0.25);
        assert_eq!(sim.time_scale(), 1.0);
        assert!(sim.agent_defaults().is_none());
        assert!(sim.num_workers() >= 1);
        assert_eq!(sim.num_agents(), 0);
    }

    #[test]
    fn invalid_time_step_errors() {
        for dt in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let result = SimulatorBuilder::new().time_step(dt).build();
            assert!(matches!(result, Err(SimError::InvalidTimeStep(_))), "dt = {dt}");
        }
    }

    #[test]
    fn invalid_time_scale_errors() {
        let result = SimulatorBuilder::new().time_scale(-0.5).build();
        assert_eq!(result.err(), Some(SimError::InvalidTimeScale(-0.5)));
    }

    #[test]
    fn custom_solver() {
        let mut sim = SimulatorBuilder::new()
            .solver(PreferredVelocitySolver)
            .agent_defaults(defaults())
            .time_step(0.5)
            .build()
            .unwrap();
        let a = sim.add_agent(Vec2::ZERO).unwrap();
        let b = sim.add_agent(Vec2::new(0.5, 0.0)).unwrap();
        sim.set_agent_pref_velocity(a, Vec2::new(1.0, 0.0)).unwrap();
        sim.do_step();

        // No avoidance: straight through the overlapping neighbour.
        assert_eq!(sim.agent_position(a).unwrap(), Vec2::new(0.5, 0.0));
        assert_eq!(sim.agent_position(b).unwrap(), Vec2::new(0.5, 0.0));
        assert_eq!(sim.agent_num_orca_lines(a).unwrap(), 0);
    }
}

// ── Agent lifecycle ───────────────────────────────────────────────────────────

#[cfg(test)]
mod agents {
    use super::*;

    #[test]
    fn add_without_defaults_errors() {
        let mut sim = Simulator::new();
        assert_eq!(sim.add_agent(Vec2::ZERO), Err(SimError::NoAgentDefaults));
        assert_eq!(sim.num_agents(), 0);

        let id = sim.add_agent_with(Vec2::ZERO, &defaults());
        assert_eq!(sim.agent_radius(id), Ok(0.5));
    }

    #[test]
    fn ids_are_monotonic_and_never_reused() {
        let mut sim = sim();
        let a = sim.add_agent(Vec2::ZERO).unwrap();
        let b = sim.add_agent(Vec2::X).unwrap();
        assert!(sim.remove_agent(a));
        let c = sim.add_agent(Vec2::Y).unwrap();
        assert!(a < b && b < c);
        assert_eq!(sim.agent_ids().len(), 2);
    }

    #[test]
    fn ids_round_trip_under_interleaved_removal() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut sim = sim();
        let mut live: HashMap<AgentId, Vec2> = HashMap::new();

        for _ in 0..500 {
            if live.is_empty() || rng.gen_bool(0.6) {
                let p = Vec2::new(rng.gen_range(-50.0..50.0), rng.gen_range(-50.0..50.0));
                live.insert(sim.add_agent(p).unwrap(), p);
            } else {
                let ids: Vec<AgentId> = live.keys().copied().collect();
                let victim = ids[rng.gen_range(0..ids.len())];
                assert!(sim.remove_agent(victim));
                live.remove(&victim);
            }

            assert_eq!(sim.num_agents(), live.len());
        }
        for (&id, &p) in &live {
            assert_eq!(sim.agent_position(id), Ok(p));
        }
    }

    #[test]
    fn remove_unknown_returns_false() {
        let mut sim = sim();
        sim.add_agent(Vec2::ZERO).unwrap();
        assert!(!sim.remove_agent(AgentId(99)));
        assert_eq!(sim.num_agents(), 1);
    }

    #[test]
    fn batch_removal_skips_repeats() {
        let mut sim = sim();
        let ids: Vec<AgentId> = (0..5).map(|i| sim.add_agent(Vec2::new(i as f32, 0.0)).unwrap()).collect();
        let removed = sim.remove_agents(&[ids[1], ids[3], ids[1], AgentId(1000)]);
        assert_eq!(removed, 2);
        assert_eq!(sim.num_agents(), 3);
        assert_eq!(sim.agent_position(ids[4]), Ok(Vec2::new(4.0, 0.0)));
    }

    #[test]
    fn accessors_round_trip() {
        let mut sim = sim();
        let id = sim.add_agent(Vec2::ZERO).unwrap();

        sim.set_agent_position(id, Vec2::new(1.0, 2.0)).unwrap();
        sim.set_agent_velocity(id, Vec2::new(0.1, 0.0)).unwrap();
        sim.set_agent_pref_velocity(id, Vec2::new(0.0, 0.3)).unwrap();
        sim.set_agent_radius(id, 0.7).unwrap();
        sim.set_agent_max_speed(id, 3.0).unwrap();
        sim.set_agent_neighbor_dist(id, 4.0).unwrap();
        sim.set_agent_max_neighbors(id, 2).unwrap();
        sim.set_agent_time_horizon(id, 5.0).unwrap();
        sim.set_agent_time_horizon_obst(id, 6.0).unwrap();

        assert_eq!(sim.agent_position(id), Ok(Vec2::new(1.0, 2.0)));
        assert_eq!(sim.agent_velocity(id), Ok(Vec2::new(0.1, 0.0)));
        assert_eq!(sim.agent_pref_velocity(id), Ok(Vec2::new(0.0, 0.3)));
        assert_eq!(sim.agent_radius(id), Ok(0.7));
        assert_eq!(sim.agent_max_speed(id), Ok(3.0));
        assert_eq!(sim.agent_neighbor_dist(id), Ok(4.0));
        assert_eq!(sim.agent_max_neighbors(id), Ok(2));
        assert_eq!(sim.agent_time_horizon(id), Ok(5.0));
        assert_eq!(sim.agent_time_horizon_obst(id), Ok(6.0));
    }

    #[test]
    fn unknown_id_accessors_error() {
        let mut sim = sim();
        let missing = AgentId(7);
        let not_found = Err(SimError::Core(RvoError::AgentNotFound(missing)));
        assert_eq!(sim.agent_position(missing), not_found);
        assert_eq!(sim.set_agent_radius(missing, 1.0), Err(SimError::Core(RvoError::AgentNotFound(missing))));
        assert!(sim.agent_num_agent_neighbors(missing).is_err());
    }
}

// ── Obstacles ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod obstacles {
    use rvo_core::{ObstacleId, VertexId};

    use super::*;

    fn wall() -> Vec<Vec2> {
        vec![
            Vec2::new(2.0, -5.0),
            Vec2::new(3.0, -5.0),
            Vec2::new(3.0, 5.0),
            Vec2::new(2.0, 5.0),
        ]
    }

    #[test]
    fn too_few_vertices_errors() {
        let mut sim = sim();
        assert_eq!(sim.add_obstacle(&[Vec2::ZERO]), Err(SimError::TooFewVertices { got: 1 }));
        assert_eq!(sim.num_obstacle_vertices(), 0);
    }

    #[test]
    fn visibility_through_a_wall() {
        let mut sim = sim();
        sim.add_obstacle(&wall()).unwrap();
        assert!(!sim.query_visibility(Vec2::ZERO, Vec2::new(10.0, 0.0), 0.0));
        assert!(sim.query_visibility(Vec2::ZERO, Vec2::new(1.0, 0.0), 0.0));
    }

    #[test]
    fn visibility_through_a_clockwise_wall() {
        let mut sim = sim();
        sim.add_obstacle(&[
            Vec2::new(2.0, -5.0),
            Vec2::new(2.0, 5.0),
            Vec2::new(3.0, 5.0),
            Vec2::new(3.0, -5.0),
        ])
        .unwrap();
        assert!(!sim.query_visibility(Vec2::ZERO, Vec2::new(10.0, 0.0), 0.0));
        assert!(sim.query_visibility(Vec2::ZERO, Vec2::new(1.0, 0.0), 0.0));
    }

    #[test]
    fn visibility_without_obstacles() {
        let mut sim = sim();
        assert!(sim.query_visibility(Vec2::ZERO, Vec2::new(100.0, 100.0), 3.0));
    }

    #[test]
    fn removal_restores_visibility() {
        let mut sim = sim();
        let group = sim.add_obstacle(&wall()).unwrap();
        assert!(!sim.query_visibility(Vec2::ZERO, Vec2::new(10.0, 0.0), 0.0));
        assert!(sim.remove_obstacle(group));
        assert!(!sim.remove_obstacle(group));
        assert_eq!(sim.num_obstacle_vertices(), 0);
        assert!(sim.query_visibility(Vec2::ZERO, Vec2::new(10.0, 0.0), 0.0));
    }

    #[test]
    fn vertex_navigation_walks_the_cycle() {
        let mut sim = sim();
        let group = sim.add_obstacle(&wall()).unwrap();
        let first = sim.first_obstacle_vertex_id(group).unwrap();

        let mut v = first;
        for _ in 0..4 {
            let next = sim.next_obstacle_vertex_id(v).unwrap();
            assert_eq!(sim.prev_obstacle_vertex_id(next), Ok(v));
            v = next;
        }
        assert_eq!(v, first);
        assert_eq!(sim.obstacle_vertex(first).unwrap().point, Vec2::new(2.0, -5.0));
    }

    #[test]
    fn unknown_vertex_and_group_error() {
        let sim = sim();
        assert_eq!(
            sim.obstacle_vertex(VertexId(3)),
            Err(SimError::Core(RvoError::VertexNotFound(VertexId(3))))
        );
        assert_eq!(
            sim.first_obstacle_vertex_id(ObstacleId(0)),
            Err(SimError::Core(RvoError::ObstacleNotFound(ObstacleId(0))))
        );
    }

    #[test]
    fn agent_never_enters_the_wall() {
        let mut sim = sim();
        sim.add_obstacle(&wall()).unwrap();
        let a = sim.add_agent(Vec2::ZERO).unwrap();

        for _ in 0..60 {
            steer(&mut sim, &[(a, Vec2::new(10.0, 0.0))]);
            sim.do_step();
            let p = sim.agent_position(a).unwrap();
            assert!(p.x + 0.5 <= 2.0 + 1e-2, "agent entered the wall at {p}");
        }
        assert!(sim.agent_num_obstacle_neighbors(a).unwrap() >= 1);
    }
}

// ── Step pipeline ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod stepping {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn empty_scene_step_advances_time() {
        let mut sim = sim();
        sim.do_step();
        assert_abs_diff_eq!(sim.global_time(), 0.25);
        assert_eq!(sim.step_count(), 1);
    }

    #[test]
    fn time_scale_applies_to_global_time_and_motion() {
        let mut sim = sim();
        sim.set_time_scale(0.5).unwrap();
        let a = sim.add_agent(Vec2::ZERO).unwrap();
        sim.set_agent_pref_velocity(a, Vec2::new(1.0, 0.0)).unwrap();
        sim.do_step();
        assert_abs_diff_eq!(sim.global_time(), 0.125);
        assert_abs_diff_eq!(sim.agent_position(a).unwrap().x, 0.125);

        sim.set_time_scale(0.0).unwrap();
        sim.do_step();
        assert_abs_diff_eq!(sim.agent_position(a).unwrap().x, 0.125);
        assert_eq!(sim.step_count(), 2);
    }

    #[test]
    fn invalid_time_step_is_rejected() {
        let mut sim = sim();
        assert_eq!(sim.set_time_step(0.0), Err(SimError::InvalidTimeStep(0.0)));
        assert_eq!(sim.time_step(), 0.25);
        sim.set_time_step(0.1).unwrap();
        assert_eq!(sim.time_step(), 0.1);
    }

    #[test]
    fn global_time_can_be_set() {
        let mut sim = sim();
        sim.set_global_time(10.0);
        sim.do_step();
        assert_abs_diff_eq!(sim.global_time(), 10.25);
    }

    #[test]
    fn scheduled_step_runs_at_the_barrier() {
        let mut sim = sim();
        let a = sim.add_agent(Vec2::ZERO).unwrap();
        sim.set_agent_pref_velocity(a, Vec2::new(1.0, 0.0)).unwrap();

        sim.schedule_step();
        assert!(sim.is_step_pending());
        assert_eq!(sim.step_count(), 0);
        assert_eq!(sim.agent_position(a), Ok(Vec2::ZERO));

        sim.ensure_completed();
        assert!(!sim.is_step_pending());
        assert_eq!(sim.step_count(), 1);
        assert_abs_diff_eq!(sim.agent_position(a).unwrap().x, 0.25);
    }

    #[test]
    fn structural_calls_complete_the_pending_step() {
        let mut sim = sim();
        sim.schedule_step();
        sim.add_agent(Vec2::ZERO).unwrap();
        assert_eq!(sim.step_count(), 1);
    }

    #[test]
    fn neighbours_respect_neighbor_dist() {
        let mut sim = sim();
        let params = defaults().with_neighbor_dist(2.0);
        let a0 = sim.add_agent_with(Vec2::new(0.0, 0.0), &params);
        let a1 = sim.add_agent_with(Vec2::new(1.0, 0.0), &params);
        let a2 = sim.add_agent_with(Vec2::new(5.0, 5.0), &params);
        for id in [a0, a1, a2] {
            let to = Vec2::new(1.0, 0.0) - sim.agent_position(id).unwrap();
            sim.set_agent_pref_velocity(id, to.normalize_or_zero()).unwrap();
        }
        sim.do_step();

        assert_eq!(sim.agent_num_agent_neighbors(a0), Ok(1));
        assert_eq!(sim.agent_agent_neighbor(a0, 0), Ok(a1));
        assert_eq!(sim.agent_num_agent_neighbors(a1), Ok(1));
        assert_eq!(sim.agent_agent_neighbor(a1, 0), Ok(a0));
        assert_eq!(sim.agent_num_agent_neighbors(a2), Ok(0));
        assert_eq!(
            sim.agent_agent_neighbor(a2, 0),
            Err(SimError::NeighborOutOfRange { index: 0, len: 0 })
        );
    }

    #[test]
    fn max_neighbors_caps_the_report() {
        let mut sim = sim();
        let ids: Vec<AgentId> = (0..8)
            .map(|i| sim.add_agent_with(Vec2::new(i as f32 * 1.5, 0.0), &defaults().with_max_neighbors(3)))
            .collect();
        sim.do_step();
        assert_eq!(sim.agent_num_agent_neighbors(ids[0]), Ok(3));
        assert_eq!(sim.agent_agent_neighbor(ids[0], 0), Ok(ids[1]));
        assert_eq!(sim.agent_agent_neighbor(ids[0], 2), Ok(ids[3]));
    }

    #[test]
    fn head_on_agents_pass_without_overlap() {
        let mut sim = sim();
        let a = sim.add_agent(Vec2::new(-5.0, 0.0)).unwrap();
        let b = sim.add_agent(Vec2::new(5.0, 0.05)).unwrap();
        let goals = [(a, Vec2::new(5.0, 0.0)), (b, Vec2::new(-5.0, 0.05))];

        for _ in 0..120 {
            steer(&mut sim, &goals);
            sim.do_step();
            let gap = sim.agent_position(a).unwrap().distance(sim.agent_position(b).unwrap());
            assert!(gap >= 0.95, "agents overlap: gap {gap}");
            assert!(sim.agent_velocity(a).unwrap().length() <= 1.0 + 1e-4);
        }

        assert!(sim.agent_position(a).unwrap().distance(goals[0].1) < 0.5);
        assert!(sim.agent_position(b).unwrap().distance(goals[1].1) < 0.5);
    }

    #[test]
    fn reports_follow_swap_removal() {
        let mut sim = sim();
        let a = sim.add_agent(Vec2::ZERO).unwrap();
        let b = sim.add_agent(Vec2::new(2.0, 0.0)).unwrap();
        let c = sim.add_agent(Vec2::new(4.0, 0.0)).unwrap();
        sim.do_step();

        assert!(sim.remove_agent(a));
        // `c` moved into `a`'s slot; its report must have moved with it.
        assert_eq!(sim.agent_agent_neighbor(c, 0), Ok(b));
        assert_eq!(sim.agent_num_agent_neighbors(c), Ok(2));
    }

    #[test]
    fn query_agent_matches_brute_force() {
        let mut rng = SmallRng::seed_from_u64(9);
        let mut sim = sim();
        for _ in 0..150 {
            let p = Vec2::new(rng.gen_range(-20.0..20.0), rng.gen_range(-20.0..20.0));
            let id = sim.add_agent(p).unwrap();
            let v = Vec2::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
            sim.set_agent_pref_velocity(id, v).unwrap();
        }
        sim.do_step();

        let mut out = Vec::new();
        for _ in 0..20 {
            let center = Vec2::new(rng.gen_range(-20.0..20.0), rng.gen_range(-20.0..20.0));
            let radius = rng.gen_range(0.5..8.0);
            let n = sim.query_agent(center, radius, &mut out);
            assert_eq!(n, out.len());

            let mut expected: Vec<AgentId> = sim
                .agent_ids()
                .iter()
                .copied()
                .filter(|&id| (sim.agent_position(id).unwrap() - center).length_squared() < radius * radius)
                .collect();
            expected.sort();
            out.sort();
            assert_eq!(out, expected);
        }
    }

    #[test]
    fn query_agent_with_negative_radius_finds_nothing() {
        let mut sim = sim();
        sim.add_agent(Vec2::ZERO).unwrap();
        sim.add_agent(Vec2::new(0.5, 0.0)).unwrap();

        let mut out = vec![AgentId(123)];
        assert_eq!(sim.query_agent(Vec2::ZERO, -2.0, &mut out), 0);
        assert!(out.is_empty());
        assert_eq!(sim.query_agent(Vec2::ZERO, f32::NAN, &mut out), 0);
        assert_eq!(sim.query_agent(Vec2::ZERO, 2.0, &mut out), 2);
    }

    #[test]
    fn observer_sees_every_step() {
        #[derive(Default)]
        struct Counter {
            starts: u64,
            ends:   u64,
            done:   bool,
        }
        impl StepObserver for Counter {
            fn on_step_start(&mut self, _: &rvo_core::SimClock) {
                self.starts += 1;
            }
            fn on_step_end(&mut self, clock: &rvo_core::SimClock, _: &rvo_agent::AgentStore) {
                self.ends += 1;
                assert_eq!(clock.steps, self.ends);
            }
            fn on_run_end(&mut self, _: &rvo_core::SimClock) {
                self.done = true;
            }
        }

        let mut sim = sim();
        sim.add_agent(Vec2::ZERO).unwrap();
        let mut counter = Counter::default();
        sim.run_steps(5, &mut counter);
        assert_eq!((counter.starts, counter.ends, counter.done), (5, 5, true));

        sim.run_steps(3, &mut NoopObserver);
        assert_eq!(sim.step_count(), 8);
    }
}

// ── Lifecycle ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod lifecycle {
    use super::*;

    #[test]
    fn clear_keeps_defaults_and_resets_time() {
        let mut sim = sim();
        sim.add_agent(Vec2::ZERO).unwrap();
        sim.add_obstacle(&[Vec2::ZERO, Vec2::X]).unwrap();
        sim.do_step();

        sim.clear();
        assert_eq!(sim.num_agents(), 0);
        assert_eq!(sim.num_obstacle_vertices(), 0);
        assert_eq!(sim.global_time(), 0.0);
        assert_eq!(sim.step_count(), 0);
        assert!(sim.agent_defaults().is_some());
        assert!(sim.add_agent(Vec2::ZERO).is_ok());
    }

    #[test]
    fn dispose_is_idempotent_and_reusable() {
        let mut sim = sim();
        sim.add_agent(Vec2::ZERO).unwrap();
        sim.schedule_step();

        sim.dispose();
        sim.dispose();
        assert_eq!(sim.num_agents(), 0);
        assert_eq!(sim.step_count(), 0);
        assert!(!sim.is_step_pending());

        sim.add_agent(Vec2::ZERO).unwrap();
        sim.do_step();
        assert_eq!(sim.step_count(), 1);
    }

    #[test]
    fn worker_count_change() {
        let mut sim = sim();
        assert_eq!(sim.num_workers(), 2);
        for i in 0..40 {
            sim.add_agent(Vec2::new(i as f32, 0.0)).unwrap();
        }
        sim.do_step();

        sim.set_num_workers(1).unwrap();
        assert_eq!(sim.num_workers(), 1);
        sim.do_step();

        sim.set_num_workers(0).unwrap();
        assert_eq!(sim.num_workers(), 1);
        assert_eq!(sim.step_count(), 2);
    }

    #[test]
    fn drop_runs_dispose() {
        let mut sim = sim();
        sim.add_agent(Vec2::ZERO).unwrap();
        sim.schedule_step();
        drop(sim);
    }
}
