//! Unit archetype stat specifications consumed by the unit factory.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize)]
pub struct UnitSpec {
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

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnitSpecDb {
    /// Map from archetype key (e.g., "vanguard") to stat block
    pub units: HashMap<String, UnitSpec>,
}

fn data_root() -> std::path::PathBuf {
    let here = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    let ws = here.join("../../data");
    if ws.is_dir() { ws } else { here.join("data") }
}

impl UnitSpecDb {
    pub fn load_default() -> Result<Self> {
        let path = data_root().join("config/units.toml");
        if path.is_file() {
            let txt = std::fs::read_to_string(&path)
                .with_context(|| format!("read {}", path.display()))?;
            let db: Self = toml::from_str(&txt).context("parse units TOML")?;
            Ok(db)
        } else {
            let mut db = Self::default();
            db.units.insert(
                "vanguard".into(),
                UnitSpec {
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
            );
            db.units.insert(
                "archer".into(),
                UnitSpec {
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
            );
            db.units.insert(
                "grenadier".into(),
                UnitSpec {
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
            );
            db.units.insert(
                "rifleman".into(),
                UnitSpec {
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
            );
            Ok(db)
        }
    }
}
