//! Cosmetic debris pieces thrown by explosions.
//!
//! No gameplay effect: no damage, no collision with units. Pieces drag,
//! fall, and bounce off the ground plane until their bounce budget runs
//! out, then rest until their lifetime expires.

use glam::Vec3;
use rand::Rng;
use rand::rngs::SmallRng;
use std::f32::consts::{FRAC_PI_2, TAU};

use super::GRAVITY;

/// Horizontal velocity retained per physics step.
const DRAG: f32 = 0.99;

#[derive(Clone, Debug)]
pub struct Debris {
    pub pos: Vec3,
    pub vel: Vec3,
    pub rotation: Vec3,
    pub angular_vel: Vec3,
    pub size: f32,
    pub bounces: u32,
    pub lifetime: f32,
}

impl Debris {
    /// One randomized piece of an explosion burst; speed scales with the
    /// blast radius.
    pub(crate) fn random_burst(center: Vec3, radius: f32, rng: &mut SmallRng) -> Self {
        let azimuth = rng.random_range(0.0..TAU);
        let elevation = rng.random_range(-FRAC_PI_2..FRAC_PI_2);
        let speed = rng.random_range(1.0..5.0) * radius;
        let vel = Vec3::new(
            speed * elevation.cos() * azimuth.cos(),
            speed * elevation.sin(),
            speed * elevation.cos() * azimuth.sin(),
        );
        Self {
            pos: center,
            vel,
            rotation: Vec3::new(
                rng.random_range(0.0..360.0),
                rng.random_range(0.0..360.0),
                rng.random_range(0.0..360.0),
            ),
            angular_vel: Vec3::new(
                rng.random_range(-180.0..180.0),
                rng.random_range(-180.0..180.0),
                rng.random_range(-180.0..180.0),
            ),
            size: rng.random_range(0.1..0.3),
            bounces: rng.random_range(1..4),
            lifetime: rng.random_range(5.0..15.0),
        }
    }

    /// Advance one fixed step; returns false once the lifetime expired.
    pub(crate) fn integrate(&mut self, dt: f32) -> bool {
        self.pos += self.vel * dt;
        self.rotation += self.angular_vel * dt;
        self.vel.x *= DRAG;
        self.vel.z *= DRAG;
        self.vel.y -= GRAVITY * dt;
        if self.pos.y <= 0.0 {
            if self.bounces > 0 {
                self.vel.x *= 0.8;
                self.vel.z *= 0.8;
                self.vel.y = -self.vel.y * 0.5;
                self.bounces -= 1;
                self.pos.y = 0.1; // keep clear of the plane after a bounce
            } else {
                self.vel = Vec3::ZERO;
                self.pos.y = 0.0;
            }
        }
        self.lifetime -= dt;
        self.lifetime > 0.0
    }
}
