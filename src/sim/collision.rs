//! Collision detection and response for axis-aligned boxes
//!
//! Entities collide when their resolved boundaries overlap. Touching edges do
//! not count. Soldiers react by pushing themselves away from the collider.

use glam::Vec2;

use super::entity::Rect;

/// Strict AABB overlap test
#[inline]
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    let a_max = a.max();
    let b_max = b.max();
    a.min.x < b_max.x && a_max.x > b.min.x && a.min.y < b_max.y && a_max.y > b.min.y
}

/// Unit vector pointing from the collider to `self_pos`
///
/// Zero when both positions coincide, so a stacked pair never injects NaN
/// into the accelerations.
#[inline]
pub fn push_vector(self_pos: Vec2, collider_pos: Vec2) -> Vec2 {
    (self_pos - collider_pos).normalize_or_zero()
}
