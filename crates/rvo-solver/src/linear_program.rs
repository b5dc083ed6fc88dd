//! Incremental 2-D linear programs over half-plane constraints, bounded by a
//! speed disc.
//!
//! `linear_program2` adds constraints one at a time; whenever the current
//! optimum violates a new line it re-optimises on that line alone
//! (`linear_program1`).  If the constraints plus the disc are infeasible,
//! `linear_program3` instead minimises the largest violation of the lines it
//! is allowed to soften, keeping the first `hard` lines strict.

use rvo_core::{RVO_EPSILON, Vec2, det, sqr};

use crate::Line;

/// Optimise on `lines[line_no]`, subject to `lines[..line_no]` and the disc of
/// `radius`.  Returns `None` if that segment of the line is empty.
///
/// With `direction_opt` the optimum is the extreme point along `opt`;
/// otherwise it is the point closest to `opt`.
pub fn linear_program1(lines: &[Line], line_no: usize, radius: f32, opt: Vec2, direction_opt: bool) -> Option<Vec2> {
    let Line { point, direction } = lines[line_no];

    let dot = point.dot(direction);
    let discriminant = sqr(dot) + sqr(radius) - point.length_squared();
    if discriminant < 0.0 {
        // The disc misses the line entirely.
        return None;
    }

    let sqrt_disc = discriminant.sqrt();
    let mut t_left = -dot - sqrt_disc;
    let mut t_right = -dot + sqrt_disc;

    for other in &lines[..line_no] {
        let denominator = det(direction, other.direction);
        let numerator = det(other.direction, point - other.point);

        if denominator.abs() <= RVO_EPSILON {
            // Parallel lines.
            if numerator < 0.0 {
                return None;
            }
            continue;
        }

        let t = numerator / denominator;
        if denominator >= 0.0 {
            t_right = t_right.min(t);
        } else {
            t_left = t_left.max(t);
        }

        if t_left > t_right {
            return None;
        }
    }

    let t = if direction_opt {
        if opt.dot(direction) > 0.0 { t_right } else { t_left }
    } else {
        let t = direction.dot(opt - point);
        if t < t_left {
            t_left
        } else if t > t_right {
            t_right
        } else {
            t
        }
    };
    Some(point + t * direction)
}

/// Solve for the velocity closest to `opt` (or furthest along `opt` with
/// `direction_opt`) inside the disc of `radius` and every line.
///
/// Returns the index of the first line that could not be satisfied
/// (`lines.len()` on success) and the best velocity found up to there.
pub fn linear_program2(lines: &[Line], radius: f32, opt: Vec2, direction_opt: bool) -> (usize, Vec2) {
    let mut result = if direction_opt {
        // `opt` is a unit vector here.
        opt * radius
    } else if opt.length_squared() > sqr(radius) {
        opt.normalize_or_zero() * radius
    } else {
        opt
    };

    for (i, line) in lines.iter().enumerate() {
        if line.violation(result) > 0.0 {
            match linear_program1(lines, i, radius, opt, direction_opt) {
                Some(v) => result = v,
                None => return (i, result),
            }
        }
    }
    (lines.len(), result)
}

/// Fallback when [`linear_program2`] fails at `begin`: minimise the maximum
/// violation of `lines[hard..]`, treating `lines[..hard]` as strict.
///
/// `result` is the velocity returned by the failed `linear_program2` call.
pub fn linear_program3(lines: &[Line], hard: usize, begin: usize, radius: f32, mut result: Vec2) -> Vec2 {
    let mut distance = 0.0;
    let mut projected: Vec<Line> = Vec::with_capacity(lines.len());

    for i in begin..lines.len() {
        let line_i = lines[i];
        if line_i.violation(result) <= distance {
            continue;
        }

        projected.clear();
        projected.extend_from_slice(&lines[..hard]);

        for line_j in &lines[hard..i] {
            let determinant = det(line_i.direction, line_j.direction);
            let point = if determinant.abs() <= RVO_EPSILON {
                if line_i.direction.dot(line_j.direction) > 0.0 {
                    // Same direction: `line_j` is implied by `line_i`.
                    continue;
                }
                0.5 * (line_i.point + line_j.point)
            } else {
                line_i.point
                    + (det(line_j.direction, line_i.point - line_j.point) / determinant) * line_i.direction
            };
            projected.push(Line::new(point, (line_j.direction - line_i.direction).normalize_or_zero()));
        }

        let opt = Vec2::new(-line_i.direction.y, line_i.direction.x);
        let (failed, candidate) = linear_program2(&projected, radius, opt, true);
        // Failure can only come from rounding, since `result` is already
        // feasible for the projected problem; keep the previous result then.
        if failed == projected.len() {
            result = candidate;
        }

        distance = line_i.violation(result);
    }
    result
}
