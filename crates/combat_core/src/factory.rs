//! Unit factory: pure construction of typed units and squads from the
//! `data_runtime` archetype table. No runtime behavior beyond building the
//! object graph.

use glam::{Vec3, vec3};
use rand::Rng;
use rand::rngs::SmallRng;
use std::collections::HashMap;

use crate::archetype::{Archetype, UnitStats};
use crate::squad::Squad;
use crate::unit::{Faction, Unit, UnitArena, UnitId};
use data_runtime::specs::units::UnitSpecDb;

pub struct UnitFactory {
    stats: HashMap<Archetype, UnitStats>,
}

impl Default for UnitFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitFactory {
    pub fn new() -> Self {
        match UnitSpecDb::load_default() {
            Ok(db) => Self::from_specs(&db),
            Err(e) => {
                log::warn!("factory: failed to load unit specs: {e:#}; using built-ins");
                Self::builtin()
            }
        }
    }

    pub fn builtin() -> Self {
        Self {
            stats: Archetype::ALL
                .iter()
                .map(|a| (*a, a.default_stats()))
                .collect(),
        }
    }

    pub fn from_specs(db: &UnitSpecDb) -> Self {
        let stats = Archetype::ALL
            .iter()
            .map(|a| {
                let s = db
                    .units
                    .get(a.key())
                    .map(|s| UnitStats {
                        max_health: s.max_health,
                        speed: s.speed,
                        damage: s.damage,
                        attack_range: s.attack_range,
                        attack_speed: s.attack_speed,
                        ranged: s.ranged,
                        collision_radius: s.collision_radius,
                        knockback_power: s.knockback_power,
                        knockback_resistance: s.knockback_resistance,
                        knockback_recovery: s.knockback_recovery,
                        dodge_chance: s.dodge_chance,
                    })
                    .unwrap_or_else(|| a.default_stats());
                (*a, s)
            })
            .collect();
        Self { stats }
    }

    pub fn stats(&self, archetype: Archetype) -> UnitStats {
        self.stats
            .get(&archetype)
            .copied()
            .unwrap_or_else(|| archetype.default_stats())
    }

    /// Build one unit into the arena. Unknown archetype keys create nothing.
    pub fn create_unit(
        &self,
        kind: &str,
        pos: Vec3,
        faction: Faction,
        arena: &mut UnitArena,
    ) -> Option<UnitId> {
        let archetype = Archetype::parse(kind)?;
        Some(arena.insert(Unit::new(archetype, self.stats(archetype), pos, faction)))
    }

    /// Build a squad of one archetype scattered around `center`, in the
    /// archetype's default formation.
    pub fn create_squad(
        &self,
        kind: &str,
        center: Vec3,
        count: usize,
        faction: Faction,
        name: Option<String>,
        arena: &mut UnitArena,
        rng: &mut SmallRng,
    ) -> Option<Squad> {
        let archetype = Archetype::parse(kind)?;
        let name = name.unwrap_or_else(|| auto_name(faction, archetype.key(), rng));
        let mut squad = Squad::new(name, faction, center);
        squad.formation = archetype.default_formation();
        for _ in 0..count {
            let offset = vec3(
                rng.random_range(-5.0..5.0),
                0.0,
                rng.random_range(-5.0..5.0),
            );
            let id = arena.insert(Unit::new(
                archetype,
                self.stats(archetype),
                center + offset,
                faction,
            ));
            squad.add_unit(arena, id);
        }
        squad.refresh_formation(arena, rng);
        log::info!(
            "factory: created squad '{}' ({} x {})",
            squad.name,
            count,
            archetype.key()
        );
        Some(squad)
    }

    /// Build a squad mixing several archetypes; unknown keys are skipped.
    pub fn create_mixed_squad(
        &self,
        center: Vec3,
        composition: &[(&str, usize)],
        faction: Faction,
        name: Option<String>,
        arena: &mut UnitArena,
        rng: &mut SmallRng,
    ) -> Squad {
        let name = name.unwrap_or_else(|| auto_name(faction, "mixed", rng));
        let mut squad = Squad::new(name, faction, center);
        for (kind, count) in composition {
            for _ in 0..*count {
                let offset = vec3(
                    rng.random_range(-5.0..5.0),
                    0.0,
                    rng.random_range(-5.0..5.0),
                );
                if let Some(id) = self.create_unit(kind, center + offset, faction, arena) {
                    squad.add_unit(arena, id);
                }
            }
        }
        squad.refresh_formation(arena, rng);
        squad
    }
}

fn auto_name(faction: Faction, kind: &str, rng: &mut SmallRng) -> String {
    let prefix = match faction {
        Faction::Player => "Player",
        Faction::Enemy => "Enemy",
        Faction::Neutral => "Neutral",
    };
    let mut kind = kind.to_string();
    if let Some(first) = kind.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    format!("{prefix} {kind} Squad {}", rng.random_range(1..1000))
}
