//! Unified projectile representation.
//!
//! One struct parameterized by per-kind behavior flags (gravity, trail,
//! penetration, explode-on-impact) replaces the separate arrow/beam/grenade
//! code paths; homing is just an optional unit target re-resolved each step.

use glam::{Vec2, Vec3};

use super::GRAVITY;
use crate::unit::{Faction, UnitArena, UnitId};

/// Restitution for gravity kinds that hit the ground without exploding.
const GROUND_BOUNCE: f32 = 0.3;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ProjectileKind {
    Arrow,
    PortalArrow,
    EnergyBolt,
    Grenade,
    MegaBomb,
}

impl ProjectileKind {
    pub const ALL: [ProjectileKind; 5] = [
        ProjectileKind::Arrow,
        ProjectileKind::PortalArrow,
        ProjectileKind::EnergyBolt,
        ProjectileKind::Grenade,
        ProjectileKind::MegaBomb,
    ];

    /// Key used by the `data_runtime` projectile table.
    pub fn key(self) -> &'static str {
        match self {
            ProjectileKind::Arrow => "arrow",
            ProjectileKind::PortalArrow => "portal_arrow",
            ProjectileKind::EnergyBolt => "energy_bolt",
            ProjectileKind::Grenade => "grenade",
            ProjectileKind::MegaBomb => "mega_bomb",
        }
    }

    /// Compiled-in parameters used when the data table lacks the key.
    pub fn fallback_params(self) -> ProjectileParams {
        match self {
            ProjectileKind::Arrow => ProjectileParams {
                speed: 20.0,
                life: 5.0,
                gravity: false,
                trail: false,
                penetrates: false,
                explode_radius: None,
            },
            ProjectileKind::PortalArrow => ProjectileParams {
                speed: 20.0,
                life: 5.0,
                gravity: false,
                trail: true,
                penetrates: true,
                explode_radius: None,
            },
            ProjectileKind::EnergyBolt => ProjectileParams {
                speed: 30.0,
                life: 1.0,
                gravity: false,
                trail: true,
                penetrates: false,
                explode_radius: None,
            },
            ProjectileKind::Grenade => ProjectileParams {
                speed: 15.0,
                life: 10.0,
                gravity: true,
                trail: false,
                penetrates: false,
                explode_radius: Some(3.0),
            },
            ProjectileKind::MegaBomb => ProjectileParams {
                speed: 12.0,
                life: 10.0,
                gravity: true,
                trail: false,
                penetrates: false,
                explode_radius: Some(8.0),
            },
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ProjectileParams {
    pub speed: f32,
    pub life: f32,
    pub gravity: bool,
    pub trail: bool,
    pub penetrates: bool,
    pub explode_radius: Option<f32>,
}

/// Aim of a shot: a fixed point, or a unit the projectile keeps chasing.
#[derive(Copy, Clone, Debug)]
pub enum ProjectileTarget {
    Position(Vec3),
    Unit(UnitId),
}

#[derive(Clone, Debug)]
pub struct Projectile {
    pub id: u32,
    pub kind: ProjectileKind,
    pub pos: Vec3,
    /// Unit direction of travel; re-normalized every homing adjustment.
    pub dir: Vec3,
    pub speed: f32,
    pub damage: f32,
    pub owner: Option<UnitId>,
    /// Owning faction, kept separately so the shot outlives its shooter.
    pub faction: Faction,
    pub age: f32,
    pub life: f32,
    pub vertical_vel: f32,
    pub homing: Option<UnitId>,
    pub gravity: bool,
    pub trail: bool,
    pub penetrates: bool,
    pub explode_radius: Option<f32>,
    pub active: bool,
    /// Units already damaged by this projectile (penetrating kinds hit each
    /// victim at most once).
    pub(crate) hit_units: Vec<UnitId>,
}

impl Projectile {
    /// Advance one fixed step. Returns a blast center when the projectile
    /// detonated this step (lifetime expiry or ground contact).
    pub(crate) fn integrate(&mut self, dt: f32, arena: &UnitArena) -> Option<Vec3> {
        self.age += dt;
        if self.age >= self.life {
            self.active = false;
            return self.explode_radius.map(|_| self.pos);
        }
        // Lagged homing: blend 80% previous direction with 20% pursuit on
        // the ground plane, then renormalize. A dead or removed target is
        // a no-op; the last direction is kept.
        if let Some(tid) = self.homing
            && let Some(t) = arena.get(tid)
            && t.is_alive()
        {
            let to = Vec2::new(t.pos.x - self.pos.x, t.pos.z - self.pos.z);
            let d = to.length();
            if d > 1e-6 {
                self.dir.x = 0.8 * self.dir.x + 0.2 * to.x / d;
                self.dir.y *= 0.8;
                self.dir.z = 0.8 * self.dir.z + 0.2 * to.y / d;
                self.dir = self.dir.normalize_or_zero();
            }
        }
        if self.gravity {
            self.vertical_vel -= GRAVITY * dt;
            let new_y = self.pos.y + self.vertical_vel * dt;
            if new_y <= 0.0 {
                if self.explode_radius.is_some() {
                    self.active = false;
                    return Some(Vec3::new(self.pos.x, 0.0, self.pos.z));
                }
                self.vertical_vel = -self.vertical_vel * GROUND_BOUNCE;
                self.pos.y = 0.0;
            } else {
                self.pos.y = new_y;
            }
        }
        self.pos += self.dir * self.speed * dt;
        None
    }
}
