//! Optimal Reciprocal Collision Avoidance.
//!
//! Each neighbour contributes one half-plane of permitted velocities:
//!
//! - **Obstacle edges** (hard): the truncated velocity obstacle of an edge is
//!   bounded by two legs tangent to the agent disc at the edge's endpoints and
//!   a cut-off line `time_horizon_obst` ahead.  The line is placed tangent to
//!   the obstacle at the point nearest the current velocity.
//! - **Agents** (soft): each agent takes half of the smallest velocity change
//!   `u` that resolves the pairwise collision within `time_horizon`.
//!
//! The new velocity is the one closest to the preferred velocity that
//! satisfies all lines within `max_speed`; if none exists, the agent lines are
//! relaxed evenly (minimum maximum violation) while obstacle lines stay hard.

use rvo_core::{RVO_EPSILON, Vec2, VertexId, det, sqr};
use rvo_obstacle::ObstacleVertex;
use rvo_spatial::Neighborhood;

use crate::{Line, SolverContext, VelocitySolver, linear_program2, linear_program3};

/// The standard ORCA velocity solver.
#[derive(Copy, Clone, Debug, Default)]
pub struct OrcaSolver;

impl OrcaSolver {
    pub fn new() -> Self {
        Self
    }
}

/// Perpendicular of `v`, rotated 90° counter-clockwise.
#[inline]
fn perp(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// Direction of the left tangent from the origin-relative point `rel` to a
/// disc of `radius` centred at the origin.
#[inline]
fn left_leg(rel: Vec2, radius: f32, dist_sq: f32) -> Vec2 {
    let leg = (dist_sq - sqr(radius)).max(0.0).sqrt();
    Vec2::new(rel.x * leg - rel.y * radius, rel.x * radius + rel.y * leg) / dist_sq
}

#[inline]
fn right_leg(rel: Vec2, radius: f32, dist_sq: f32) -> Vec2 {
    let leg = (dist_sq - sqr(radius)).max(0.0).sqrt();
    Vec2::new(rel.x * leg + rel.y * radius, -rel.x * radius + rel.y * leg) / dist_sq
}

impl VelocitySolver for OrcaSolver {
    fn new_velocity(
        &self,
        agent:        usize,
        neighborhood: &Neighborhood,
        ctx:          &SolverContext<'_>,
        lines:        &mut Vec<Line>,
    ) -> Vec2 {
        lines.clear();
        let agents = ctx.agents;

        let position = agents.position[agent];
        let velocity = agents.velocity[agent];
        let radius = agents.radius[agent];

        for &(_, vertex) in &neighborhood.obstacles {
            if let Some(line) = obstacle_line(ctx, position, velocity, radius, agents.time_horizon_obst[agent], vertex, lines) {
                lines.push(line);
            }
        }
        let hard = lines.len();

        let inv_time_horizon = 1.0 / agents.time_horizon[agent];
        for &(_, other) in &neighborhood.agents {
            let rel_position = agents.position[other] - position;
            let rel_velocity = velocity - agents.velocity[other];
            let dist_sq = rel_position.length_squared();
            let combined_radius = radius + agents.radius[other];
            let combined_radius_sq = sqr(combined_radius);

            let (direction, u) = if dist_sq > combined_radius_sq {
                // No collision yet.
                let w = rel_velocity - inv_time_horizon * rel_position;
                let w_len_sq = w.length_squared();
                let dot1 = w.dot(rel_position);

                if dot1 < 0.0 && sqr(dot1) > combined_radius_sq * w_len_sq {
                    // Project on the cut-off circle.
                    let w_len = w_len_sq.sqrt();
                    let unit_w = w / w_len;
                    (Vec2::new(unit_w.y, -unit_w.x), (combined_radius * inv_time_horizon - w_len) * unit_w)
                } else {
                    // Project on the nearer leg.
                    let direction = if det(rel_position, w) > 0.0 {
                        left_leg(rel_position, combined_radius, dist_sq)
                    } else {
                        -right_leg(rel_position, combined_radius, dist_sq)
                    };
                    (direction, rel_velocity.dot(direction) * direction - rel_velocity)
                }
            } else {
                // Already overlapping: resolve within one time step.
                let inv_time_step = 1.0 / ctx.time_step;
                let w = rel_velocity - inv_time_step * rel_position;
                let w_len = w.length();
                let unit_w = w.normalize_or_zero();
                (Vec2::new(unit_w.y, -unit_w.x), (combined_radius * inv_time_step - w_len) * unit_w)
            };

            lines.push(Line::new(velocity + 0.5 * u, direction));
        }

        let max_speed = agents.max_speed[agent];
        let pref_velocity = agents.pref_velocity[agent];
        let (failed, result) = linear_program2(lines, max_speed, pref_velocity, false);
        if failed < lines.len() {
            linear_program3(lines, hard, failed, max_speed, result)
        } else {
            result
        }
    }
}

/// ORCA line for the obstacle edge leaving `vertex`, or `None` if the edge
/// adds no constraint (already covered, hidden behind a concave corner, or
/// the velocity projects onto a leg owned by a neighbouring edge).
fn obstacle_line(
    ctx:               &SolverContext<'_>,
    position:          Vec2,
    velocity:          Vec2,
    radius:            f32,
    time_horizon_obst: f32,
    vertex:            VertexId,
    existing:          &[Line],
) -> Option<Line> {
    let obstacles = ctx.obstacles;
    let inv_th = 1.0 / time_horizon_obst;

    let mut v1: ObstacleVertex = obstacles[vertex];
    let mut v2: ObstacleVertex = obstacles[v1.next];

    let rel1 = v1.point - position;
    let rel2 = v2.point - position;

    // Skip the edge if its truncated velocity obstacle is already excluded.
    let covered = existing.iter().any(|line| {
        det(inv_th * rel1 - line.point, line.direction) - inv_th * radius >= -RVO_EPSILON
            && det(inv_th * rel2 - line.point, line.direction) - inv_th * radius >= -RVO_EPSILON
    });
    if covered {
        return None;
    }

    let dist_sq1 = rel1.length_squared();
    let dist_sq2 = rel2.length_squared();
    let radius_sq = sqr(radius);

    let edge = v2.point - v1.point;
    let s = (-rel1).dot(edge) / edge.length_squared();
    let dist_sq_line = (-rel1 - s * edge).length_squared();

    // ── Already colliding ─────────────────────────────────────────────────
    if s < 0.0 && dist_sq1 <= radius_sq {
        // Left vertex.
        return v1.convex.then(|| Line::new(Vec2::ZERO, perp(rel1).normalize_or_zero()));
    }
    if s > 1.0 && dist_sq2 <= radius_sq {
        // Right vertex; a concave corner or the next edge handles it otherwise.
        return (v2.convex && det(rel2, v2.direction) >= 0.0)
            .then(|| Line::new(Vec2::ZERO, perp(rel2).normalize_or_zero()));
    }
    if (0.0..1.0).contains(&s) && dist_sq_line <= radius_sq {
        return Some(Line::new(Vec2::ZERO, -v1.direction));
    }

    // ── Legs ──────────────────────────────────────────────────────────────
    let (mut left_dir, mut right_dir) = if s < 0.0 && dist_sq_line <= radius_sq {
        // Viewed obliquely: both legs come from the left vertex.
        if !v1.convex {
            return None;
        }
        v2 = v1;
        (left_leg(rel1, radius, dist_sq1), right_leg(rel1, radius, dist_sq1))
    } else if s > 1.0 && dist_sq_line <= radius_sq {
        // Both legs come from the right vertex.
        if !v2.convex {
            return None;
        }
        v1 = v2;
        (left_leg(rel2, radius, dist_sq2), right_leg(rel2, radius, dist_sq2))
    } else {
        (
            if v1.convex { left_leg(rel1, radius, dist_sq1) } else { -v1.direction },
            if v2.convex { right_leg(rel2, radius, dist_sq2) } else { v1.direction },
        )
    };
    let same_vertex = v1.id == v2.id;

    // A leg at a convex corner may not point into the neighbouring edge; use
    // that edge's direction instead and mark the leg as foreign.
    let left_neighbor = obstacles[v1.prev];
    let mut left_foreign = false;
    let mut right_foreign = false;
    if v1.convex && det(left_dir, -left_neighbor.direction) >= 0.0 {
        left_dir = -left_neighbor.direction;
        left_foreign = true;
    }
    if v2.convex && det(right_dir, v2.direction) <= 0.0 {
        right_dir = v2.direction;
        right_foreign = true;
    }

    // ── Project the current velocity ──────────────────────────────────────
    let left_cutoff = inv_th * (v1.point - position);
    let right_cutoff = inv_th * (v2.point - position);
    let cutoff_vec = right_cutoff - left_cutoff;

    let t = if same_vertex {
        0.5
    } else {
        (velocity - left_cutoff).dot(cutoff_vec) / cutoff_vec.length_squared()
    };
    let t_left = (velocity - left_cutoff).dot(left_dir);
    let t_right = (velocity - right_cutoff).dot(right_dir);

    let on_cutoff_circle = |center: Vec2| {
        let unit_w = (velocity - center).normalize_or_zero();
        Line::new(center + radius * inv_th * unit_w, Vec2::new(unit_w.y, -unit_w.x))
    };

    if (t < 0.0 && t_left < 0.0) || (same_vertex && t_left < 0.0 && t_right < 0.0) {
        return Some(on_cutoff_circle(left_cutoff));
    }
    if t > 1.0 && t_right < 0.0 {
        return Some(on_cutoff_circle(right_cutoff));
    }

    let dist_sq_cutoff = if t < 0.0 || t > 1.0 || same_vertex {
        f32::INFINITY
    } else {
        (velocity - (left_cutoff + t * cutoff_vec)).length_squared()
    };
    let dist_sq_left = if t_left < 0.0 {
        f32::INFINITY
    } else {
        (velocity - (left_cutoff + t_left * left_dir)).length_squared()
    };
    let dist_sq_right = if t_right < 0.0 {
        f32::INFINITY
    } else {
        (velocity - (right_cutoff + t_right * right_dir)).length_squared()
    };

    let offset = |direction: Vec2| radius * inv_th * perp(direction);

    if dist_sq_cutoff <= dist_sq_left && dist_sq_cutoff <= dist_sq_right {
        let direction = -v1.direction;
        Some(Line::new(left_cutoff + offset(direction), direction))
    } else if dist_sq_left <= dist_sq_right {
        if left_foreign {
            return None;
        }
        Some(Line::new(left_cutoff + offset(left_dir), left_dir))
    } else {
        if right_foreign {
            return None;
        }
        let direction = -right_dir;
        Some(Line::new(right_cutoff + offset(direction), direction))
    }
}
