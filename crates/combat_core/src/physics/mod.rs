//! Fixed-timestep physics engine for projectiles, explosions, and debris.
//!
//! Wall-clock `dt` accumulates and is consumed in whole 1/60 s steps (the
//! remainder carries over), so many small `update` calls and one large call
//! cover the same step count. Within one step the order is projectiles →
//! explosions → debris, and effects spawned during a step (impact blasts,
//! debris bursts) are realized before the next step begins.

mod debris;
mod explosion;
mod projectile;

pub use debris::Debris;
pub use explosion::{EXPLOSION_LIFETIME, Explosion};
pub use projectile::{Projectile, ProjectileKind, ProjectileParams, ProjectileTarget};

use glam::Vec3;
use rand::{Rng, SeedableRng, rngs::SmallRng};
use std::collections::HashMap;
use std::f32::consts::TAU;

use crate::combat;
use crate::geom::{dist_xz, segment_hits_circle_xz};
use crate::unit::{Faction, UnitArena, UnitId};
use data_runtime::specs::projectiles::ProjectileSpecDb;

pub const PHYSICS_STEP: f32 = 1.0 / 60.0;
pub const GRAVITY: f32 = 9.8;

/// Pending blast collected while projectiles step.
struct Boom {
    center: Vec3,
    radius: f32,
    damage: f32,
    owner: Option<UnitId>,
    faction: Faction,
}

pub struct PhysicsEngine {
    /// Carried fraction of a step; accumulated in f64 so the step count
    /// depends only on total elapsed time, not on how `dt` was sliced.
    accumulator: f64,
    seed: u64,
    rng: SmallRng,
    params: HashMap<ProjectileKind, ProjectileParams>,
    pub projectiles: Vec<Projectile>,
    pub explosions: Vec<Explosion>,
    pub debris: Vec<Debris>,
    next_projectile_id: u32,
    next_explosion_id: u64,
}

impl PhysicsEngine {
    pub fn new(seed: u64) -> Self {
        match ProjectileSpecDb::load_default() {
            Ok(db) => Self::with_specs(seed, &db),
            Err(e) => {
                log::warn!("physics: failed to load projectile specs: {e:#}; using built-ins");
                Self::from_params(
                    seed,
                    ProjectileKind::ALL
                        .iter()
                        .map(|k| (*k, k.fallback_params()))
                        .collect(),
                )
            }
        }
    }

    pub fn with_specs(seed: u64, db: &ProjectileSpecDb) -> Self {
        let params = ProjectileKind::ALL
            .iter()
            .map(|k| {
                let p = db
                    .kinds
                    .get(k.key())
                    .map(|s| ProjectileParams {
                        speed: s.speed,
                        life: s.life_s,
                        gravity: s.gravity,
                        trail: s.trail,
                        penetrates: s.penetrates,
                        explode_radius: s.explode_radius,
                    })
                    .unwrap_or_else(|| k.fallback_params());
                (*k, p)
            })
            .collect();
        Self::from_params(seed, params)
    }

    fn from_params(seed: u64, params: HashMap<ProjectileKind, ProjectileParams>) -> Self {
        Self {
            accumulator: 0.0,
            seed,
            rng: SmallRng::seed_from_u64(seed ^ 0x9E37_79B9_7F4A_7C15),
            params,
            projectiles: Vec::new(),
            explosions: Vec::new(),
            debris: Vec::new(),
            next_projectile_id: 1,
            next_explosion_id: 1,
        }
    }

    pub fn params(&self, kind: ProjectileKind) -> ProjectileParams {
        self.params
            .get(&kind)
            .copied()
            .unwrap_or_else(|| kind.fallback_params())
    }

    /// Spawn a projectile toward a fixed position or a (homing) unit target.
    /// Gravity kinds get their arc solved so the shell lands on the aim
    /// point; a degenerate aim substitutes a random level direction.
    pub fn fire_projectile(
        &mut self,
        start: Vec3,
        target: ProjectileTarget,
        kind: ProjectileKind,
        owner: Option<UnitId>,
        faction: Faction,
        damage: f32,
        arena: &UnitArena,
    ) -> u32 {
        let p = self.params(kind);
        let (aim, homing) = match target {
            ProjectileTarget::Position(pos) => (pos, None),
            ProjectileTarget::Unit(id) => (arena.get(id).map(|u| u.pos).unwrap_or(start), Some(id)),
        };
        let mut dir = match target {
            ProjectileTarget::Position(_) => aim - start,
            // unit tracking stays level; homing re-aims on the ground plane
            ProjectileTarget::Unit(_) => Vec3::new(aim.x - start.x, 0.0, aim.z - start.z),
        };
        if p.gravity {
            dir.y = 0.0;
        }
        let len = dir.length();
        if len <= 1e-6 {
            let a = self.rng.random_range(0.0..TAU);
            dir = Vec3::new(a.cos(), 0.0, a.sin());
        } else {
            dir /= len;
        }
        let (life, vertical_vel) = if p.gravity {
            let flat = dist_xz(start, aim);
            if flat > 1e-3 {
                let t = flat / p.speed;
                let dy = aim.y - start.y;
                (t.min(p.life), (dy + 0.5 * GRAVITY * t * t) / t)
            } else {
                (p.life, 0.0)
            }
        } else {
            (p.life, 0.0)
        };
        let id = self.next_projectile_id;
        self.next_projectile_id = self.next_projectile_id.wrapping_add(1);
        self.projectiles.push(Projectile {
            id,
            kind,
            pos: start,
            dir,
            speed: p.speed,
            damage,
            owner,
            faction,
            age: 0.0,
            life,
            vertical_vel,
            homing,
            gravity: p.gravity,
            trail: p.trail,
            penetrates: p.penetrates,
            explode_radius: p.explode_radius,
            active: true,
            hit_units: Vec::new(),
        });
        metrics::counter!("physics.projectiles_spawned").increment(1);
        id
    }

    /// Explosion with linear damage falloff (the common case).
    pub fn create_explosion(
        &mut self,
        center: Vec3,
        radius: f32,
        damage: f32,
        owner: Option<UnitId>,
        faction: Faction,
    ) -> u64 {
        self.spawn_explosion(center, radius, damage, owner, faction, true)
    }

    pub fn spawn_explosion(
        &mut self,
        center: Vec3,
        radius: f32,
        damage: f32,
        owner: Option<UnitId>,
        faction: Faction,
        falloff: bool,
    ) -> u64 {
        let id = self.next_explosion_id;
        self.next_explosion_id = self.next_explosion_id.wrapping_add(1);
        self.explosions.push(Explosion::new(
            id, center, radius, damage, owner, faction, falloff,
        ));
        self.spawn_debris_burst(center, radius, id);
        log::debug!("physics: explosion {id} at {center:?} r={radius} dmg={damage}");
        metrics::counter!("physics.explosions_spawned").increment(1);
        id
    }

    /// Advance the simulation by wall-clock `dt`, running zero or more fixed
    /// steps against the unit arena.
    pub fn update(&mut self, dt: f32, arena: &mut UnitArena) {
        const STEP: f64 = 1.0 / 60.0;
        self.accumulator += f64::from(dt);
        while self.accumulator >= STEP {
            self.step_once(arena);
            self.accumulator -= STEP;
        }
    }

    fn step_once(&mut self, arena: &mut UnitArena) {
        let dt = PHYSICS_STEP;
        self.step_projectiles(dt, arena);
        self.step_explosions(dt, arena);
        self.step_debris(dt);
    }

    fn step_projectiles(&mut self, dt: f32, arena: &mut UnitArena) {
        let mut booms: Vec<Boom> = Vec::new();
        let mut segs: Vec<(usize, Vec3, Vec3)> = Vec::with_capacity(self.projectiles.len());
        for (i, p) in self.projectiles.iter_mut().enumerate() {
            if !p.active {
                continue;
            }
            let p0 = p.pos;
            if let Some(center) = p.integrate(dt, arena) {
                booms.push(Boom {
                    center,
                    radius: p.explode_radius.unwrap_or(0.0),
                    damage: p.damage,
                    owner: p.owner,
                    faction: p.faction,
                });
                continue;
            }
            if p.active {
                segs.push((i, p0, p.pos));
            }
        }
        for (i, p0, p1) in segs {
            let (faction, damage, owner, penetrates, blast) = {
                let p = &self.projectiles[i];
                (p.faction, p.damage, p.owner, p.penetrates, p.explode_radius)
            };
            let mut hits: Vec<UnitId> = Vec::new();
            for u in arena.iter() {
                if !u.is_alive() || !combat::projectile_hits(faction, u.faction) {
                    continue;
                }
                if self.projectiles[i].hit_units.contains(&u.id) {
                    continue;
                }
                if segment_hits_circle_xz(p0, p1, u.pos, u.collision_radius) {
                    hits.push(u.id);
                    if !penetrates {
                        break;
                    }
                }
            }
            if hits.is_empty() {
                continue;
            }
            for uid in &hits {
                arena.apply_damage(*uid, damage, owner, &mut self.rng);
                self.projectiles[i].hit_units.push(*uid);
            }
            metrics::counter!("physics.projectile_hits").increment(hits.len() as u64);
            if let Some(radius) = blast {
                let center = self.projectiles[i].pos;
                booms.push(Boom {
                    center,
                    radius,
                    damage,
                    owner,
                    faction,
                });
                self.projectiles[i].active = false;
            } else if !penetrates {
                self.projectiles[i].active = false;
            }
        }
        self.projectiles.retain(|p| p.active);
        for b in booms {
            self.spawn_explosion(b.center, b.radius, b.damage, b.owner, b.faction, true);
        }
    }

    fn step_explosions(&mut self, dt: f32, arena: &mut UnitArena) {
        for e in &mut self.explosions {
            if e.active {
                e.update(dt, arena, &mut self.rng);
            }
        }
        self.explosions.retain(|e| e.active);
    }

    fn step_debris(&mut self, dt: f32) {
        self.debris.retain_mut(|d| d.integrate(dt));
    }

    /// Burst count scales with blast radius; selection and jitter are
    /// deterministic per (engine seed, explosion id).
    fn spawn_debris_burst(&mut self, center: Vec3, radius: f32, explosion_id: u64) {
        let mut rng = SmallRng::seed_from_u64(hash64(self.seed, explosion_id));
        let count = (radius * 5.0) as usize;
        for _ in 0..count {
            self.debris.push(Debris::random_burst(center, radius, &mut rng));
        }
    }
}

#[inline]
fn hash64(a: u64, b: u64) -> u64 {
    // xorshift-like mix; stable across platforms
    let mut x = a ^ 0x9E37_79B9_7F4A_7C15u64;
    x ^= b.wrapping_mul(0xBF58_476D_1CE4_E5B9u64).rotate_left(31);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94D0_49BB_1331_11EBu64);
    x ^ (x >> 31)
}
