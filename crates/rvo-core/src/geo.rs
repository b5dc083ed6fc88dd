//! Planar geometry helpers shared by the spatial trees and the solver.
//!
//! Positions and velocities are `glam::Vec2` (single precision).  The helpers
//! here are the handful of 2-D predicates the RVO family of algorithms is
//! built from; everything else (`dot`, `length_squared`, `normalize_or_zero`)
//! comes straight from `glam`.

pub use glam::Vec2;

/// Tolerance used by orientation tests and near-parallel checks.
pub const RVO_EPSILON: f32 = 0.00001;

/// 2-D cross product (determinant of the 2×2 matrix `[a b]`).
#[inline]
pub fn det(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Signed orientation of `c` relative to the directed line `a → b`.
///
/// Positive when `c` lies to the left of the line, negative to the right,
/// zero when collinear.  The magnitude is twice the area of triangle `abc`.
#[inline]
pub fn left_of(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    det(a - c, b - a)
}

/// Squared distance from `c` to the segment `a–b`.
///
/// Degenerate segments (`a == b`) fall back to the point distance.
pub fn dist_sq_point_segment(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return (c - a).length_squared();
    }

    let r = (c - a).dot(ab) / len_sq;
    if r < 0.0 {
        (c - a).length_squared()
    } else if r > 1.0 {
        (c - b).length_squared()
    } else {
        (c - (a + r * ab)).length_squared()
    }
}

/// `x²`.
#[inline]
pub fn sqr(x: f32) -> f32 {
    x * x
}
