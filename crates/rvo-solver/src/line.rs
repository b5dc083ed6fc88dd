//! Directed half-plane constraint in velocity space.

use rvo_core::{Vec2, det};

/// A directed line.  The permitted half-plane lies on its left-hand side
/// (looking along `direction`), boundary included.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Line {
    pub point: Vec2,
    /// Unit direction.
    pub direction: Vec2,
}

impl Line {
    #[inline]
    pub fn new(point: Vec2, direction: Vec2) -> Self {
        Self { point, direction }
    }

    /// Signed distance by which `v` violates this constraint; `<= 0` means
    /// `v` is permitted.
    #[inline]
    pub fn violation(&self, v: Vec2) -> f32 {
        det(self.direction, self.point - v)
    }
}
