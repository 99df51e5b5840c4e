//! Projectile kind specifications: speed, lifetime, and behavior flags.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectileSpec {
    pub speed: f32,
    pub life_s: f32,
    pub gravity: bool,
    pub trail: bool,
    pub penetrates: bool,
    /// Blast radius for kinds that explode (on impact, ground contact, or expiry).
    pub explode_radius: Option<f32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectileSpecDb {
    /// Map from kind key (e.g., "arrow", "grenade") to spec
    pub kinds: HashMap<String, ProjectileSpec>,
}

fn data_root() -> std::path::PathBuf {
    let here = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    let ws = here.join("../../data");
    if ws.is_dir() { ws } else { here.join("data") }
}

impl ProjectileSpecDb {
    pub fn load_default() -> Result<Self> {
        let path = data_root().join("config/projectiles.toml");
        if path.is_file() {
            let txt = std::fs::read_to_string(&path)
                .with_context(|| format!("read {}", path.display()))?;
            let db: Self = toml::from_str(&txt).context("parse projectiles TOML")?;
            Ok(db)
        } else {
            let mut db = Self::default();
            db.kinds.insert(
                "arrow".to_string(),
                ProjectileSpec {
                    speed: 20.0,
                    life_s: 5.0,
                    gravity: false,
                    trail: false,
                    penetrates: false,
                    explode_radius: None,
                },
            );
            db.kinds.insert(
                "portal_arrow".to_string(),
                ProjectileSpec {
                    speed: 20.0,
                    life_s: 5.0,
                    gravity: false,
                    trail: true,
                    penetrates: true,
                    explode_radius: None,
                },
            );
            db.kinds.insert(
                "energy_bolt".to_string(),
                ProjectileSpec {
                    speed: 30.0,
                    life_s: 1.0,
                    gravity: false,
                    trail: true,
                    penetrates: false,
                    explode_radius: None,
                },
            );
            db.kinds.insert(
                "grenade".to_string(),
                ProjectileSpec {
                    speed: 15.0,
                    life_s: 10.0,
                    gravity: true,
                    trail: false,
                    penetrates: false,
                    explode_radius: Some(3.0),
                },
            );
            db.kinds.insert(
                "mega_bomb".to_string(),
                ProjectileSpec {
                    speed: 12.0,
                    life_s: 10.0,
                    gravity: true,
                    trail: false,
                    penetrates: false,
                    explode_radius: Some(8.0),
                },
            );
            Ok(db)
        }
    }
}
