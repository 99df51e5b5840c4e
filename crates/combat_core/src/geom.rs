//! Small geometry helpers shared by the physics systems.

use glam::{Vec2, Vec3};

/// Swept test of a projectile segment `[p0, p1]` against a unit's collision
/// circle on the ground plane (XZ). Degenerate segments fall back to a point
/// test.
#[inline]
pub fn segment_hits_circle_xz(p0: Vec3, p1: Vec3, center: Vec3, radius: f32) -> bool {
    let a = Vec2::new(p0.x, p0.z);
    let b = Vec2::new(p1.x, p1.z);
    let c = Vec2::new(center.x, center.z);
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 <= 1e-12 {
        return (a - c).length_squared() <= radius * radius;
    }
    let t = ((c - a).dot(ab) / len2).clamp(0.0, 1.0);
    let closest = a + ab * t;
    (closest - c).length_squared() <= radius * radius
}

/// Distance on the ground plane, ignoring height.
#[inline]
pub fn dist_xz(a: Vec3, b: Vec3) -> f32 {
    let dx = b.x - a.x;
    let dz = b.z - a.z;
    (dx * dx + dz * dz).sqrt()
}
