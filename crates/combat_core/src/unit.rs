//! Unit state machine, damage/knockback resolution, and the id-indexed
//! arena that owns every live unit.
//!
//! Squads and projectiles never hold references to units — only `UnitId`s,
//! re-resolved (and liveness-checked) through the arena each tick. A unit
//! that dies mid-flight of a homing projectile is therefore just a failed
//! lookup, not a dangling pointer.

use glam::{Vec2, Vec3};
use rand::Rng;
use rand::rngs::SmallRng;
use std::f32::consts::{PI, TAU};

use crate::archetype::{self, Archetype, AttackKind, UnitStats};
use crate::geom::dist_xz;
use crate::physics::{ProjectileKind, ProjectileTarget};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct UnitId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Faction {
    Player,
    Enemy,
    Neutral,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnitState {
    Idle,
    Moving,
    Attacking,
    /// Terminal; entered exactly once, when health reaches zero.
    Dead,
}

/// Waypoint arrival threshold in world units.
const ARRIVE_DIST: f32 = 0.5;
/// Yaw interpolation rate while moving (180 deg/s), independent of speed.
const TURN_RATE: f32 = PI;

/// Snapshot of the attacker needed to resolve damage against a victim
/// without borrowing two units from the arena at once.
#[derive(Copy, Clone, Debug)]
pub struct AttackerProfile {
    pub id: UnitId,
    pub pos: Vec3,
    pub attack_range: f32,
    pub knockback_power: f32,
    pub melee: bool,
}

/// Read-only per-unit snapshot used to resolve target ids while another
/// unit is mutably borrowed.
#[derive(Copy, Clone, Debug)]
pub struct TargetInfo {
    pub pos: Vec3,
    pub faction: Faction,
    pub alive: bool,
}

pub struct TargetIndex(Vec<(UnitId, TargetInfo)>);

impl TargetIndex {
    pub fn get(&self, id: UnitId) -> Option<&TargetInfo> {
        self.0.iter().find(|(i, _)| *i == id).map(|(_, t)| t)
    }
}

/// Effects emitted by unit updates and abilities; realized by [`crate::Battle`]
/// in order, after all squads have updated.
#[derive(Clone, Debug)]
pub enum AttackEffect {
    Melee {
        attacker: UnitId,
        target: UnitId,
    },
    Fire {
        kind: ProjectileKind,
        origin: Vec3,
        target: ProjectileTarget,
        owner: UnitId,
        faction: Faction,
        damage: f32,
    },
    Blast {
        center: Vec3,
        radius: f32,
        damage: f32,
        falloff: bool,
        owner: UnitId,
        faction: Faction,
    },
    Reinforce {
        archetype: Archetype,
        near: Vec3,
        count: usize,
        faction: Faction,
        squad: Option<String>,
    },
}

#[derive(Clone, Debug)]
pub struct Unit {
    pub id: UnitId,
    pub archetype: Archetype,
    pub faction: Faction,
    pub pos: Vec3,
    /// Yaw in radians, `dx.atan2(dz)` bearing on the ground plane.
    pub yaw: f32,
    pub health: f32,
    pub max_health: f32,
    pub state: UnitState,
    pub speed: f32,
    pub attack_range: f32,
    pub attack_speed: f32,
    pub damage: f32,
    pub ranged: bool,
    pub collision_radius: f32,
    pub knockback_power: f32,
    pub knockback_resistance: f32,
    pub knockback_recovery: f32,
    pub knockback_velocity: Vec3,
    pub knockback_timer: f32,
    pub dodge_chance: f32,
    pub target: Option<UnitId>,
    pub path: Vec<Vec3>,
    /// Slot assigned by the owning squad's formation; refreshed every tick.
    pub formation_position: Option<Vec3>,
    /// Name of the owning squad (non-owning back-reference).
    pub squad: Option<String>,
    pub last_attacker: Option<UnitId>,
    pub selected: bool,
    attack_timer: f32,
    ability_timer: f32,
}

impl Unit {
    pub fn new(archetype: Archetype, stats: UnitStats, pos: Vec3, faction: Faction) -> Self {
        Self {
            id: UnitId(0),
            archetype,
            faction,
            pos,
            yaw: 0.0,
            health: stats.max_health,
            max_health: stats.max_health,
            state: UnitState::Idle,
            speed: stats.speed,
            attack_range: stats.attack_range,
            attack_speed: stats.attack_speed,
            damage: stats.damage,
            ranged: stats.ranged,
            collision_radius: stats.collision_radius,
            knockback_power: stats.knockback_power,
            knockback_resistance: stats.knockback_resistance,
            knockback_recovery: stats.knockback_recovery,
            knockback_velocity: Vec3::ZERO,
            knockback_timer: 0.0,
            dodge_chance: stats.dodge_chance,
            target: None,
            path: Vec::new(),
            formation_position: None,
            squad: None,
            last_attacker: None,
            selected: false,
            attack_timer: 0.0,
            ability_timer: 0.0,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.state != UnitState::Dead
    }

    /// Melee units are the only source of knockback.
    #[inline]
    pub fn is_melee(&self) -> bool {
        !self.ranged && self.attack_range <= 2.0
    }

    pub fn attacker_profile(&self) -> AttackerProfile {
        AttackerProfile {
            id: self.id,
            pos: self.pos,
            attack_range: self.attack_range,
            knockback_power: self.knockback_power,
            melee: self.is_melee(),
        }
    }

    /// Command: walk straight to `target`, dropping any attack order.
    pub fn move_to(&mut self, target: Vec3) {
        if !self.is_alive() {
            return;
        }
        self.state = UnitState::Moving;
        self.target = None;
        self.path = vec![target];
    }

    pub fn set_target(&mut self, target: Option<UnitId>) {
        self.target = target;
    }

    pub fn set_attack_mode(&mut self, attacking: bool) {
        if !self.is_alive() {
            return;
        }
        if attacking && self.target.is_some() {
            self.state = UnitState::Attacking;
        } else if !attacking {
            self.state = UnitState::Idle;
        }
    }

    pub fn heal(&mut self, amount: f32) {
        if !self.is_alive() {
            return;
        }
        self.health = (self.health + amount).min(self.max_health);
    }

    /// Resolve incoming damage. Dead victims ignore everything (no negative
    /// health, no second death transition). A melee attacker adds a knockback
    /// impulse directed away from it; coincident positions get a random
    /// direction with the same magnitude formula.
    pub fn take_damage(
        &mut self,
        amount: f32,
        attacker: Option<&AttackerProfile>,
        rng: &mut SmallRng,
    ) {
        if !self.is_alive() {
            return;
        }
        if self.dodge_chance > 0.0 && rng.random::<f32>() < self.dodge_chance {
            return;
        }
        self.health = (self.health - amount).max(0.0);
        if let Some(a) = attacker
            && a.melee
        {
            let mut dir = Vec2::new(self.pos.x - a.pos.x, self.pos.z - a.pos.z);
            let len = dir.length();
            if len <= 1e-6 {
                let angle = rng.random_range(0.0..TAU);
                dir = Vec2::new(angle.cos(), angle.sin());
            } else {
                dir /= len;
            }
            let strength = (a.knockback_power - self.knockback_resistance).max(0.0);
            let magnitude = a.attack_range * 1.2 * strength;
            self.knockback_velocity = Vec3::new(dir.x * magnitude, 0.0, dir.y * magnitude);
            self.knockback_timer = self.knockback_recovery;
            self.path.clear();
        }
        if let Some(a) = attacker {
            self.last_attacker = Some(a.id);
        }
        if self.health <= 0.0 {
            self.health = 0.0;
            self.state = UnitState::Dead;
        }
    }

    /// Per-frame update. Returns an attack effect when the attack timer
    /// fires this frame.
    pub fn update(
        &mut self,
        dt: f32,
        targets: &TargetIndex,
        rng: &mut SmallRng,
    ) -> Option<AttackEffect> {
        if !self.is_alive() {
            return None;
        }
        // Knockback overrides everything else while its timer runs.
        if self.knockback_timer > 0.0 {
            self.pos.x += self.knockback_velocity.x * dt;
            self.pos.z += self.knockback_velocity.z * dt;
            self.knockback_timer -= dt;
            if self.knockback_timer <= 0.0 {
                self.knockback_velocity = Vec3::ZERO;
                self.knockback_timer = 0.0;
                if self.state == UnitState::Idle && self.target.is_some() {
                    self.state = UnitState::Attacking;
                }
            }
            return None;
        }
        if self.ability_timer > 0.0 {
            self.ability_timer = (self.ability_timer - dt).max(0.0);
        }
        match self.state {
            UnitState::Moving => {
                self.update_movement(dt, targets);
                None
            }
            UnitState::Attacking => self.update_attack(dt, targets, rng),
            _ => None,
        }
    }

    fn update_movement(&mut self, dt: f32, targets: &TargetIndex) {
        // Simplified pursuit: while a live hostile target is held, the
        // single chase waypoint is re-issued to the target's current
        // position every tick; once in range, resume attacking.
        if let Some(tid) = self.target
            && let Some(t) = targets.get(tid)
            && t.alive
            && t.faction != self.faction
        {
            if dist_xz(self.pos, t.pos) <= self.attack_range {
                self.path.clear();
                self.state = UnitState::Attacking;
                return;
            }
            self.path = vec![t.pos];
        }
        let Some(first) = self.path.first().copied() else {
            self.state = if self.target.is_some() {
                UnitState::Attacking
            } else {
                UnitState::Idle
            };
            return;
        };
        let mut wp = first;
        let mut to = Vec2::new(wp.x - self.pos.x, wp.z - self.pos.z);
        let mut dist = to.length();
        if dist < ARRIVE_DIST {
            self.path.remove(0);
            match self.path.first().copied() {
                Some(next) => {
                    wp = next;
                    to = Vec2::new(wp.x - self.pos.x, wp.z - self.pos.z);
                    dist = to.length();
                }
                None => {
                    self.state = if self.target.is_some() {
                        UnitState::Attacking
                    } else {
                        UnitState::Idle
                    };
                    return;
                }
            }
        }
        if dist <= 1e-6 {
            return;
        }
        self.turn_toward(to.x.atan2(to.y), dt);
        let step = (self.speed * dt).min(dist);
        self.pos.x += to.x / dist * step;
        self.pos.z += to.y / dist * step;
    }

    fn update_attack(
        &mut self,
        dt: f32,
        targets: &TargetIndex,
        rng: &mut SmallRng,
    ) -> Option<AttackEffect> {
        let Some(tid) = self.target else {
            self.state = UnitState::Idle;
            return None;
        };
        let Some(t) = targets.get(tid).copied() else {
            // Unresolvable id: stale target, revert to idle.
            self.state = UnitState::Idle;
            self.target = None;
            return None;
        };
        if !t.alive || t.faction == self.faction {
            self.state = UnitState::Idle;
            self.target = None;
            return None;
        }
        let to = Vec2::new(t.pos.x - self.pos.x, t.pos.z - self.pos.z);
        let dist = to.length();
        // Face the target directly while attacking.
        if dist > 1e-6 {
            self.yaw = to.x.atan2(to.y).rem_euclid(TAU);
        }
        if dist > self.attack_range {
            self.state = UnitState::Moving;
            self.path = vec![t.pos];
            return None;
        }
        self.attack_timer += dt;
        if self.attack_timer >= 1.0 / self.attack_speed {
            self.attack_timer = 0.0;
            return Some(self.resolve_attack(tid, t.pos, rng));
        }
        None
    }

    /// One attack, resolved through the archetype dispatch table.
    fn resolve_attack(&self, target: UnitId, target_pos: Vec3, rng: &mut SmallRng) -> AttackEffect {
        match self.archetype.attack_kind() {
            AttackKind::Melee => AttackEffect::Melee {
                attacker: self.id,
                target,
            },
            AttackKind::Shot { kind } | AttackKind::Lob { kind } => AttackEffect::Fire {
                kind,
                origin: self.pos,
                target: ProjectileTarget::Position(target_pos),
                owner: self.id,
                faction: self.faction,
                damage: self.damage,
            },
            AttackKind::AimedShot { kind, jitter } => {
                let mut d = Vec2::new(target_pos.x - self.pos.x, target_pos.z - self.pos.z);
                let len = d.length();
                if len > 1e-6 {
                    d /= len;
                }
                d.x += (rng.random::<f32>() - 0.5) * jitter;
                d.y += (rng.random::<f32>() - 0.5) * jitter;
                let d = d.normalize_or_zero();
                let aim = self.pos + Vec3::new(d.x, 0.0, d.y) * len.max(1.0);
                AttackEffect::Fire {
                    kind,
                    origin: self.pos,
                    target: ProjectileTarget::Position(aim),
                    owner: self.id,
                    faction: self.faction,
                    damage: self.damage,
                }
            }
        }
    }

    /// Fire the archetype's special ability at `aim`. Returns no effects
    /// while the cooldown runs or the unit is dead.
    pub fn use_ability(&mut self, aim: Vec3, rng: &mut SmallRng) -> Vec<AttackEffect> {
        if !self.is_alive() || self.ability_timer > 0.0 {
            return Vec::new();
        }
        self.ability_timer = self.archetype.ability_cooldown();
        match self.archetype {
            Archetype::Vanguard => {
                // Slash: instant directed blast, clamped to the unit's reach.
                let mut d = Vec2::new(aim.x - self.pos.x, aim.z - self.pos.z);
                let len = d.length();
                let center = if len <= archetype::SLASH_RANGE {
                    Vec3::new(aim.x, 0.0, aim.z)
                } else {
                    d /= len;
                    self.pos + Vec3::new(d.x, 0.0, d.y) * archetype::SLASH_RANGE
                };
                vec![AttackEffect::Blast {
                    center,
                    radius: archetype::SLASH_RADIUS,
                    damage: archetype::SLASH_DAMAGE,
                    falloff: false,
                    owner: self.id,
                    faction: self.faction,
                }]
            }
            Archetype::Archer => {
                // Volley: fan of penetrating arrows across a fixed spread.
                let d = Vec2::new(aim.x - self.pos.x, aim.z - self.pos.z);
                let base = if d.length_squared() > 1e-6 {
                    d.y.atan2(d.x)
                } else {
                    rng.random_range(0.0..TAU)
                };
                let n = archetype::VOLLEY_ARROWS;
                let spread = archetype::VOLLEY_SPREAD_DEG.to_radians();
                (0..n)
                    .map(|i| {
                        let offset = (i as f32 / (n - 1) as f32 - 0.5) * spread;
                        let a = base + offset;
                        let far = self.pos + Vec3::new(a.cos(), 0.0, a.sin()) * 1000.0;
                        AttackEffect::Fire {
                            kind: ProjectileKind::PortalArrow,
                            origin: self.pos,
                            target: ProjectileTarget::Position(far),
                            owner: self.id,
                            faction: self.faction,
                            damage: self.damage * archetype::VOLLEY_DAMAGE_MULT,
                        }
                    })
                    .collect()
            }
            Archetype::Grenadier => vec![AttackEffect::Fire {
                kind: ProjectileKind::MegaBomb,
                origin: self.pos,
                target: ProjectileTarget::Position(aim),
                owner: self.id,
                faction: self.faction,
                damage: archetype::MEGA_BOMB_DAMAGE,
            }],
            Archetype::Rifleman => vec![AttackEffect::Reinforce {
                archetype: Archetype::Rifleman,
                near: self.pos,
                count: archetype::REINFORCEMENT_COUNT,
                faction: self.faction,
                squad: self.squad.clone(),
            }],
        }
    }

    fn turn_toward(&mut self, bearing: f32, dt: f32) {
        let mut diff = (bearing - self.yaw).rem_euclid(TAU);
        if diff > PI {
            diff -= TAU;
        }
        let max_step = TURN_RATE * dt;
        if diff.abs() <= max_step {
            self.yaw = bearing.rem_euclid(TAU);
        } else {
            self.yaw = (self.yaw + max_step.copysign(diff)).rem_euclid(TAU);
        }
    }
}

/// Id-indexed store owning every unit in the simulation.
#[derive(Default, Debug)]
pub struct UnitArena {
    next_id: u32,
    units: Vec<Unit>,
}

impl UnitArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, mut unit: Unit) -> UnitId {
        let id = UnitId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        unit.id = id;
        self.units.push(unit);
        id
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    #[inline]
    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.iter_mut().find(|u| u.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Unit> {
        self.units.iter_mut()
    }

    pub fn is_alive(&self, id: UnitId) -> bool {
        self.get(id).is_some_and(|u| u.is_alive())
    }

    pub fn player_units(&self) -> impl Iterator<Item = &Unit> {
        self.units
            .iter()
            .filter(|u| u.faction == Faction::Player && u.is_alive())
    }

    pub fn enemy_units(&self) -> impl Iterator<Item = &Unit> {
        self.units
            .iter()
            .filter(|u| u.faction == Faction::Enemy && u.is_alive())
    }

    pub fn target_index(&self) -> TargetIndex {
        TargetIndex(
            self.units
                .iter()
                .map(|u| {
                    (
                        u.id,
                        TargetInfo {
                            pos: u.pos,
                            faction: u.faction,
                            alive: u.is_alive(),
                        },
                    )
                })
                .collect(),
        )
    }

    /// Apply damage through the arena, building the attacker profile from
    /// `attacker` if that unit still exists. Missing victims are a no-op.
    pub fn apply_damage(
        &mut self,
        victim: UnitId,
        amount: f32,
        attacker: Option<UnitId>,
        rng: &mut SmallRng,
    ) {
        let profile = attacker
            .and_then(|id| self.get(id))
            .map(|u| u.attacker_profile());
        if let Some(v) = self.get_mut(victim) {
            v.take_damage(amount, profile.as_ref(), rng);
        }
    }

    pub fn remove_dead(&mut self) {
        self.units.retain(|u| u.is_alive());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use glam::vec3;
    use rand::SeedableRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(7)
    }

    fn plain_stats() -> UnitStats {
        UnitStats {
            dodge_chance: 0.0,
            ..Archetype::Vanguard.default_stats()
        }
    }

    fn unit_at(pos: Vec3, faction: Faction) -> Unit {
        Unit::new(Archetype::Vanguard, plain_stats(), pos, faction)
    }

    fn melee_profile(pos: Vec3, range: f32, power: f32) -> AttackerProfile {
        AttackerProfile {
            id: UnitId(99),
            pos,
            attack_range: range,
            knockback_power: power,
            melee: true,
        }
    }

    #[test]
    fn health_never_leaves_bounds() {
        let mut r = rng();
        let mut u = unit_at(Vec3::ZERO, Faction::Player);
        u.take_damage(5000.0, None, &mut r);
        assert_eq!(u.health, 0.0);
        assert_eq!(u.state, UnitState::Dead);
        // Dead units ignore further damage and healing.
        u.take_damage(10.0, None, &mut r);
        assert_eq!(u.health, 0.0);
        u.heal(10.0);
        assert_eq!(u.health, 0.0);
        assert_eq!(u.state, UnitState::Dead);
    }

    #[test]
    fn heal_clamps_at_max() {
        let mut r = rng();
        let mut u = unit_at(Vec3::ZERO, Faction::Player);
        u.take_damage(30.0, None, &mut r);
        u.heal(1000.0);
        assert_eq!(u.health, u.max_health);
    }

    #[test]
    fn dead_iff_zero_health() {
        let mut r = rng();
        let mut u = unit_at(Vec3::ZERO, Faction::Player);
        u.take_damage(u.max_health - 1.0, None, &mut r);
        assert!(u.is_alive());
        u.take_damage(1.0, None, &mut r);
        assert_eq!(u.health, 0.0);
        assert_eq!(u.state, UnitState::Dead);
    }

    #[test]
    fn melee_knockback_matches_formula() {
        // attack_range 1.5, power 2 vs resistance 0.5 -> 1.5 * 1.2 * 1.5 = 2.7
        let mut r = rng();
        let mut victim = unit_at(vec3(1.0, 0.0, 0.0), Faction::Enemy);
        victim.knockback_resistance = 0.5;
        victim.knockback_recovery = 1.0;
        let attacker = melee_profile(Vec3::ZERO, 1.5, 2.0);
        victim.take_damage(10.0, Some(&attacker), &mut r);
        let v = victim.knockback_velocity;
        assert!((v.x - 2.7).abs() < 1e-5, "got {v:?}");
        assert!(v.y.abs() < 1e-6 && v.z.abs() < 1e-6);
        assert!((victim.knockback_timer - 1.0).abs() < 1e-6);
        assert_eq!(victim.last_attacker, Some(UnitId(99)));
    }

    #[test]
    fn stacked_units_get_a_random_direction_with_formula_magnitude() {
        let mut r = rng();
        let mut victim = unit_at(Vec3::ZERO, Faction::Enemy);
        victim.knockback_resistance = 0.5;
        let attacker = melee_profile(Vec3::ZERO, 1.5, 2.0);
        victim.take_damage(10.0, Some(&attacker), &mut r);
        assert!((victim.knockback_velocity.length() - 2.7).abs() < 1e-4);
    }

    #[test]
    fn ranged_attackers_never_knock_back() {
        let mut r = rng();
        let mut victim = unit_at(vec3(1.0, 0.0, 0.0), Faction::Enemy);
        let attacker = AttackerProfile {
            melee: false,
            ..melee_profile(Vec3::ZERO, 18.0, 3.0)
        };
        victim.take_damage(10.0, Some(&attacker), &mut r);
        assert_eq!(victim.knockback_velocity, Vec3::ZERO);
        assert_eq!(victim.knockback_timer, 0.0);
    }

    #[test]
    fn knockback_overrides_movement_then_resumes_attack() {
        let mut r = rng();
        let arena = UnitArena::new();
        let idx = arena.target_index();
        let mut u = unit_at(Vec3::ZERO, Faction::Player);
        u.target = Some(UnitId(42));
        u.state = UnitState::Idle;
        u.knockback_velocity = vec3(2.0, 0.0, 0.0);
        u.knockback_timer = 0.5;
        u.update(0.25, &idx, &mut r);
        assert!((u.pos.x - 0.5).abs() < 1e-5);
        assert_eq!(u.state, UnitState::Idle);
        u.update(0.3, &idx, &mut r);
        assert_eq!(u.knockback_velocity, Vec3::ZERO);
        assert_eq!(u.state, UnitState::Attacking);
    }

    #[test]
    fn moves_to_waypoint_then_idles() {
        let mut r = rng();
        let arena = UnitArena::new();
        let idx = arena.target_index();
        let mut u = unit_at(Vec3::ZERO, Faction::Player);
        u.move_to(vec3(10.0, 0.0, 0.0));
        assert_eq!(u.state, UnitState::Moving);
        for _ in 0..400 {
            u.update(1.0 / 60.0, &idx, &mut r);
        }
        assert_eq!(u.state, UnitState::Idle);
        assert!(u.path.is_empty());
        assert!(dist_xz(u.pos, vec3(10.0, 0.0, 0.0)) < ARRIVE_DIST + 1e-3);
    }

    #[test]
    fn yaw_turns_at_fixed_rate() {
        let mut r = rng();
        let arena = UnitArena::new();
        let idx = arena.target_index();
        let mut u = unit_at(Vec3::ZERO, Faction::Player);
        // Facing +Z (yaw 0), commanded along +X: bearing pi/2.
        u.move_to(vec3(100.0, 0.0, 0.0));
        u.update(0.1, &idx, &mut r);
        assert!((u.yaw - TURN_RATE * 0.1).abs() < 1e-4);
        // After enough time the bearing is reached exactly.
        for _ in 0..10 {
            u.update(0.1, &idx, &mut r);
        }
        assert!((u.yaw - PI / 2.0).abs() < 1e-4);
    }

    #[test]
    fn attack_pursues_out_of_range_target_each_tick() {
        let mut r = rng();
        let mut arena = UnitArena::new();
        let victim = arena.insert(unit_at(vec3(50.0, 0.0, 0.0), Faction::Enemy));
        let hunter = arena.insert(unit_at(Vec3::ZERO, Faction::Player));
        {
            let u = arena.get_mut(hunter).unwrap();
            u.set_target(Some(victim));
            u.set_attack_mode(true);
        }
        let idx = arena.target_index();
        let u = arena.get_mut(hunter).unwrap();
        u.update(1.0 / 60.0, &idx, &mut r);
        assert_eq!(u.state, UnitState::Moving);
        assert_eq!(u.path, vec![vec3(50.0, 0.0, 0.0)]);
        // Target moved; the chase waypoint is refreshed on the next tick.
        let moved = vec3(50.0, 0.0, 10.0);
        let idx = TargetIndex(vec![(
            victim,
            TargetInfo {
                pos: moved,
                faction: Faction::Enemy,
                alive: true,
            },
        )]);
        u.update(1.0 / 60.0, &idx, &mut r);
        assert_eq!(u.path, vec![moved]);
    }

    #[test]
    fn dead_or_friendly_target_reverts_to_idle() {
        let mut r = rng();
        let mut arena = UnitArena::new();
        let victim = arena.insert(unit_at(vec3(1.0, 0.0, 0.0), Faction::Player));
        let hunter = arena.insert(unit_at(Vec3::ZERO, Faction::Player));
        {
            let u = arena.get_mut(hunter).unwrap();
            u.set_target(Some(victim));
            u.set_attack_mode(true);
        }
        let idx = arena.target_index();
        let u = arena.get_mut(hunter).unwrap();
        u.update(1.0 / 60.0, &idx, &mut r);
        assert_eq!(u.state, UnitState::Idle);
        assert_eq!(u.target, None);
    }

    #[test]
    fn melee_attack_fires_on_timer() {
        let mut r = rng();
        let mut arena = UnitArena::new();
        let victim = arena.insert(unit_at(vec3(1.0, 0.0, 0.0), Faction::Enemy));
        let hunter = arena.insert(unit_at(Vec3::ZERO, Faction::Player));
        {
            let u = arena.get_mut(hunter).unwrap();
            u.set_target(Some(victim));
            u.set_attack_mode(true);
        }
        let idx = arena.target_index();
        let u = arena.get_mut(hunter).unwrap();
        // attack_speed 1.2 -> one swing per 0.833s
        let mut swings = 0;
        let mut t = 0.0;
        while t < 1.0 {
            if let Some(AttackEffect::Melee { target, .. }) = u.update(1.0 / 60.0, &idx, &mut r) {
                assert_eq!(target, victim);
                swings += 1;
            }
            t += 1.0 / 60.0;
        }
        assert_eq!(swings, 1);
    }

    #[test]
    fn dodge_skips_damage_entirely() {
        let mut r = rng();
        let mut u = unit_at(Vec3::ZERO, Faction::Player);
        u.dodge_chance = 1.0;
        u.take_damage(40.0, None, &mut r);
        assert_eq!(u.health, u.max_health);
    }

    #[test]
    fn arena_damage_resolves_attacker_by_id() {
        let mut r = rng();
        let mut arena = UnitArena::new();
        let a = arena.insert(unit_at(Vec3::ZERO, Faction::Player));
        let b = arena.insert(unit_at(vec3(1.0, 0.0, 0.0), Faction::Enemy));
        arena.apply_damage(b, 10.0, Some(a), &mut r);
        let v = arena.get(b).unwrap();
        assert_eq!(v.last_attacker, Some(a));
        assert!(v.knockback_velocity.length() > 0.0);
        // Unknown ids are a silent no-op.
        arena.apply_damage(UnitId(999), 10.0, None, &mut r);
    }
}
