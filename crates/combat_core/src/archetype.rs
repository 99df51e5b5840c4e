//! Closed set of unit archetypes: stat blocks plus an attack behavior
//! selected through one dispatch function (no trait objects for a fixed,
//! small set of kinds).

use crate::physics::ProjectileKind;
use crate::squad::Formation;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Archetype {
    /// Melee line-breaker with a dodge chance and real knockback.
    Vanguard,
    /// Long-range arrow shooter.
    Archer,
    /// Lobs arcing grenades that detonate on the target.
    Grenadier,
    /// Mid-range energy rifle with imperfect aim.
    Rifleman,
}

/// How an archetype resolves one attack once its timer fires.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum AttackKind {
    /// Direct damage call against the target unit.
    Melee,
    /// Straight projectile at the target's current position.
    Shot { kind: ProjectileKind },
    /// Straight projectile with random aim jitter applied to the direction.
    AimedShot { kind: ProjectileKind, jitter: f32 },
    /// Gravity projectile arced to land on the target's position.
    Lob { kind: ProjectileKind },
}

/// Flat stat block carried by every unit; sourced from `data_runtime` with
/// these compiled-in fallbacks.
#[derive(Copy, Clone, Debug)]
pub struct UnitStats {
    pub max_health: f32,
    pub speed: f32,
    pub damage: f32,
    pub attack_range: f32,
    pub attack_speed: f32,
    pub ranged: bool,
    pub collision_radius: f32,
    pub knockback_power: f32,
    pub knockback_resistance: f32,
    pub knockback_recovery: f32,
    pub dodge_chance: f32,
}

// Special-ability tuning.
pub const SLASH_RANGE: f32 = 5.0;
pub const SLASH_RADIUS: f32 = 2.0;
pub const SLASH_DAMAGE: f32 = 50.0;
pub const VOLLEY_ARROWS: usize = 5;
pub const VOLLEY_SPREAD_DEG: f32 = 30.0;
pub const VOLLEY_DAMAGE_MULT: f32 = 1.5;
pub const MEGA_BOMB_DAMAGE: f32 = 75.0;
pub const REINFORCEMENT_COUNT: usize = 2;

impl Archetype {
    pub const ALL: [Archetype; 4] = [
        Archetype::Vanguard,
        Archetype::Archer,
        Archetype::Grenadier,
        Archetype::Rifleman,
    ];

    /// Key used by `data_runtime` tables and the factory's string interface.
    pub fn key(self) -> &'static str {
        match self {
            Archetype::Vanguard => "vanguard",
            Archetype::Archer => "archer",
            Archetype::Grenadier => "grenadier",
            Archetype::Rifleman => "rifleman",
        }
    }

    /// Unknown keys yield `None`; the factory then creates nothing.
    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|a| a.key() == key)
    }

    pub fn attack_kind(self) -> AttackKind {
        match self {
            Archetype::Vanguard => AttackKind::Melee,
            Archetype::Archer => AttackKind::Shot {
                kind: ProjectileKind::Arrow,
            },
            Archetype::Grenadier => AttackKind::Lob {
                kind: ProjectileKind::Grenade,
            },
            Archetype::Rifleman => AttackKind::AimedShot {
                kind: ProjectileKind::EnergyBolt,
                jitter: 0.05,
            },
        }
    }

    /// Formation a freshly built squad of this archetype starts in.
    pub fn default_formation(self) -> Formation {
        match self {
            Archetype::Vanguard => Formation::Line,
            Archetype::Archer => Formation::Wedge,
            Archetype::Grenadier => Formation::Scattered,
            Archetype::Rifleman => Formation::Line,
        }
    }

    /// Cooldown of the archetype's special ability, in seconds.
    pub fn ability_cooldown(self) -> f32 {
        match self {
            Archetype::Vanguard => 15.0,
            Archetype::Archer => 20.0,
            Archetype::Grenadier => 30.0,
            Archetype::Rifleman => 45.0,
        }
    }

    /// Compiled-in stat block used when the data table is missing a key.
    pub fn default_stats(self) -> UnitStats {
        match self {
            Archetype::Vanguard => UnitStats {
                max_health: 150.0,
                speed: 4.5,
                damage: 25.0,
                attack_range: 2.0,
                attack_speed: 1.2,
                ranged: false,
                collision_radius: 1.0,
                knockback_power: 2.0,
                knockback_resistance: 0.5,
                knockback_recovery: 1.0,
                dodge_chance: 0.1,
            },
            Archetype::Archer => UnitStats {
                max_health: 90.0,
                speed: 5.0,
                damage: 15.0,
                attack_range: 18.0,
                attack_speed: 0.8,
                ranged: true,
                collision_radius: 1.0,
                knockback_power: 0.0,
                knockback_resistance: 0.1,
                knockback_recovery: 1.5,
                dodge_chance: 0.0,
            },
            Archetype::Grenadier => UnitStats {
                max_health: 120.0,
                speed: 3.8,
                damage: 8.0,
                attack_range: 12.0,
                attack_speed: 0.5,
                ranged: true,
                collision_radius: 1.0,
                knockback_power: 0.0,
                knockback_resistance: 0.2,
                knockback_recovery: 2.0,
                dodge_chance: 0.0,
            },
            Archetype::Rifleman => UnitStats {
                max_health: 100.0,
                speed: 4.0,
                damage: 12.0,
                attack_range: 15.0,
                attack_speed: 1.0,
                ranged: true,
                collision_radius: 1.0,
                knockback_power: 0.0,
                knockback_resistance: 0.0,
                knockback_recovery: 2.0,
                dodge_chance: 0.0,
            },
        }
    }
}
