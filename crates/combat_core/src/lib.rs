//! Squad tactical combat core.
//!
//! - Unit state machines (idle/moving/attacking/dead) with melee knockback
//! - Squad formation and command layer (line/wedge/column/scattered/circle)
//! - Fixed-timestep physics engine for projectiles, explosions, and debris
//! - Unit factory building typed units/squads from `data_runtime` tables
//!
//! Everything is single-threaded and tick-based; external layers (rendering,
//! input, missions) drive it through [`Battle`], squad commands, and the
//! physics spawn APIs. Invalid state (stale targets, dead victims, unknown
//! archetype keys) degrades to a no-op rather than an error.

pub mod archetype;
pub mod battle;
pub mod combat;
pub mod factory;
pub mod geom;
pub mod physics;
pub mod squad;
pub mod unit;

pub use archetype::{Archetype, AttackKind, UnitStats};
pub use battle::Battle;
pub use factory::UnitFactory;
pub use physics::{PhysicsEngine, ProjectileKind, ProjectileTarget};
pub use squad::{Formation, Squad};
pub use unit::{AttackEffect, Faction, Unit, UnitArena, UnitId, UnitState};
