//! Collision detection between the car and pooled entities
//!
//! An axis-aligned box test on the ground plane (x, z). Height is ignored;
//! the car and every entity share the road.

use glam::Vec3;

/// True when `a` and `b` are closer than `threshold` on both ground axes
#[inline]
pub fn collides(a: Vec3, b: Vec3, threshold: f32) -> bool {
    (a.x - b.x).abs() < threshold && (a.z - b.z).abs() < threshold
}
