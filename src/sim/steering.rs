//! Steering and damped integration
//!
//! Squads and soldiers move by acceleration: each frame the acceleration is
//! damped and then applied to the position. Seek produces an acceleration along
//! the bearing to the target whose magnitude grows linearly with distance.

use glam::Vec2;

/// Seek acceleration from `position` toward `target`
///
/// Magnitude is `distance * speed_constant`, zero when already on target.
pub fn seek(position: Vec2, target: Vec2, speed_constant: f32) -> Vec2 {
    let direction = target - position;
    let distance = direction.length();
    if distance == 0.0 {
        return Vec2::ZERO;
    }
    let angle = direction.y.atan2(direction.x);
    let speed = distance * speed_constant;
    Vec2::new(angle.cos(), angle.sin()) * speed
}

/// Damp the acceleration, then move the position by it
#[inline]
pub fn integrate(position: &mut Vec2, accel: &mut Vec2, damping: f32, delta: f32) {
    *accel *= damping;
    *position += *accel * delta;
}
