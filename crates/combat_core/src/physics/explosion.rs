//! One-shot area damage with optional linear falloff.

use glam::Vec3;
use rand::rngs::SmallRng;
use std::collections::HashSet;

use crate::combat;
use crate::geom::dist_xz;
use crate::unit::{Faction, UnitArena, UnitId};

/// Visual lifetime; the damage pass lands entirely on the first step.
pub const EXPLOSION_LIFETIME: f32 = 0.5;

#[derive(Clone, Debug)]
pub struct Explosion {
    pub id: u64,
    pub center: Vec3,
    pub radius: f32,
    pub damage: f32,
    pub owner: Option<UnitId>,
    pub faction: Faction,
    pub age: f32,
    pub life: f32,
    pub falloff: bool,
    pub active: bool,
    /// Single-hit guarantee: each unit is damaged at most once over the
    /// explosion's lifetime, however many steps it stays active.
    damaged: HashSet<UnitId>,
}

impl Explosion {
    pub(crate) fn new(
        id: u64,
        center: Vec3,
        radius: f32,
        damage: f32,
        owner: Option<UnitId>,
        faction: Faction,
        falloff: bool,
    ) -> Self {
        Self {
            id,
            center,
            radius,
            damage,
            owner,
            faction,
            age: 0.0,
            life: EXPLOSION_LIFETIME,
            falloff,
            active: true,
            damaged: HashSet::new(),
        }
    }

    pub(crate) fn update(&mut self, dt: f32, arena: &mut UnitArena, rng: &mut SmallRng) {
        if self.age == 0.0 {
            self.apply_damage(arena, rng);
        }
        self.age += dt;
        if self.age >= self.life {
            self.active = false;
        }
    }

    fn apply_damage(&mut self, arena: &mut UnitArena, rng: &mut SmallRng) {
        let mut victims: Vec<(UnitId, f32)> = Vec::new();
        for u in arena.iter() {
            if !u.is_alive() || !combat::explosion_hits(self.faction, u.faction) {
                continue;
            }
            if self.damaged.contains(&u.id) {
                continue;
            }
            let d = dist_xz(self.center, u.pos);
            if d <= self.radius {
                let dmg = if self.falloff {
                    self.damage * (1.0 - d / self.radius)
                } else {
                    self.damage
                };
                victims.push((u.id, dmg));
            }
        }
        for (uid, dmg) in victims {
            arena.apply_damage(uid, dmg, self.owner, rng);
            self.damaged.insert(uid);
        }
    }
}
