//! Battle orchestrator: one frame of the simulation.
//!
//! Squads update first (pruning dead members, moving and attacking), their
//! attack effects are realized in order (melee damage, projectile and blast
//! spawns, reinforcements), then the physics engine consumes the frame's
//! wall-clock time in fixed steps and the dead are removed. Units and
//! squads deliberately run on wall-clock `dt` rather than the fixed step.

use glam::{Vec3, vec3};
use rand::{Rng, SeedableRng, rngs::SmallRng};

use crate::factory::UnitFactory;
use crate::physics::PhysicsEngine;
use crate::squad::{Formation, Squad};
use crate::unit::{AttackEffect, Faction, UnitArena, UnitId};

pub struct Battle {
    pub arena: UnitArena,
    pub squads: Vec<Squad>,
    pub physics: PhysicsEngine,
    pub factory: UnitFactory,
    pub elapsed: f32,
    rng: SmallRng,
}

impl Battle {
    pub fn new(seed: u64) -> Self {
        Self {
            arena: UnitArena::new(),
            squads: Vec::new(),
            physics: PhysicsEngine::new(seed),
            factory: UnitFactory::new(),
            elapsed: 0.0,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Build a squad through the factory and register it. Returns its index,
    /// or `None` for an unknown archetype key.
    pub fn spawn_squad(
        &mut self,
        kind: &str,
        center: Vec3,
        count: usize,
        faction: Faction,
        name: Option<String>,
    ) -> Option<usize> {
        let squad = self.factory.create_squad(
            kind,
            center,
            count,
            faction,
            name,
            &mut self.arena,
            &mut self.rng,
        )?;
        self.squads.push(squad);
        Some(self.squads.len() - 1)
    }

    pub fn spawn_mixed_squad(
        &mut self,
        center: Vec3,
        composition: &[(&str, usize)],
        faction: Faction,
        name: Option<String>,
    ) -> usize {
        let squad = self.factory.create_mixed_squad(
            center,
            composition,
            faction,
            name,
            &mut self.arena,
            &mut self.rng,
        );
        self.squads.push(squad);
        self.squads.len() - 1
    }

    pub fn squad_move_to(&mut self, squad: usize, target: Vec3) {
        if let Some(s) = self.squads.get_mut(squad) {
            s.move_to(target, &mut self.arena, &mut self.rng);
        }
    }

    pub fn squad_set_formation(&mut self, squad: usize, formation: Formation) {
        if let Some(s) = self.squads.get_mut(squad) {
            s.set_formation(formation, &mut self.arena, &mut self.rng);
        }
    }

    pub fn squad_attack_target(&mut self, squad: usize, target: Vec3) {
        if let Some(s) = self.squads.get_mut(squad) {
            s.attack_target(target, &mut self.arena, &mut self.rng);
        }
    }

    pub fn squad_attack_unit(&mut self, squad: usize, target: UnitId) {
        if let Some(s) = self.squads.get_mut(squad) {
            s.attack_unit(target, &mut self.arena);
        }
    }

    /// Trigger a unit's special ability at `aim`. False when the unit is
    /// missing, dead, or still cooling down.
    pub fn use_ability(&mut self, unit: UnitId, aim: Vec3) -> bool {
        let effects = match self.arena.get_mut(unit) {
            Some(u) => u.use_ability(aim, &mut self.rng),
            None => return false,
        };
        if effects.is_empty() {
            return false;
        }
        self.apply_effects(effects);
        true
    }

    /// Advance one rendered frame.
    pub fn update(&mut self, dt: f32) {
        let t0 = std::time::Instant::now();
        self.elapsed += dt;
        let mut effects: Vec<AttackEffect> = Vec::new();
        for s in &mut self.squads {
            effects.extend(s.update(dt, &mut self.arena, &mut self.rng));
        }
        self.apply_effects(effects);
        self.physics.update(dt, &mut self.arena);
        self.arena.remove_dead();
        self.squads.retain(|s| {
            if s.is_empty() {
                log::info!("battle: squad '{}' wiped out", s.name);
                false
            } else {
                true
            }
        });
        metrics::histogram!("battle.tick.ms").record(t0.elapsed().as_secs_f64() * 1000.0);
    }

    fn apply_effects(&mut self, effects: Vec<AttackEffect>) {
        for e in effects {
            match e {
                AttackEffect::Melee { attacker, target } => {
                    // attacker may have died this frame; its swing dies too
                    let Some(damage) = self.arena.get(attacker).map(|u| u.damage) else {
                        continue;
                    };
                    self.arena
                        .apply_damage(target, damage, Some(attacker), &mut self.rng);
                }
                AttackEffect::Fire {
                    kind,
                    origin,
                    target,
                    owner,
                    faction,
                    damage,
                } => {
                    self.physics.fire_projectile(
                        origin,
                        target,
                        kind,
                        Some(owner),
                        faction,
                        damage,
                        &self.arena,
                    );
                }
                AttackEffect::Blast {
                    center,
                    radius,
                    damage,
                    falloff,
                    owner,
                    faction,
                } => {
                    self.physics
                        .spawn_explosion(center, radius, damage, Some(owner), faction, falloff);
                }
                AttackEffect::Reinforce {
                    archetype,
                    near,
                    count,
                    faction,
                    squad,
                } => {
                    for _ in 0..count {
                        let offset = vec3(
                            self.rng.random_range(-5.0..5.0),
                            0.0,
                            self.rng.random_range(-5.0..5.0),
                        );
                        if let Some(id) = self.factory.create_unit(
                            archetype.key(),
                            near + offset,
                            faction,
                            &mut self.arena,
                        ) && let Some(name) = &squad
                            && let Some(s) = self.squads.iter_mut().find(|s| &s.name == name)
                        {
                            s.add_unit(&mut self.arena, id);
                        }
                    }
                    log::info!("battle: {count} reinforcements called in near {near:?}");
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::unit::UnitState;

    const FRAME: f32 = 1.0 / 60.0;

    #[test]
    fn vanguards_chase_and_kill_a_target() {
        let mut b = Battle::new(5);
        let squad = b
            .spawn_squad("vanguard", Vec3::ZERO, 3, Faction::Player, None)
            .unwrap();
        let victim = b
            .factory
            .create_unit("rifleman", vec3(15.0, 0.0, 0.0), Faction::Enemy, &mut b.arena)
            .unwrap();
        b.squad_attack_unit(squad, victim);
        // knockback keeps shoving the victim out of reach, so give the
        // chase plenty of time
        for _ in 0..(30.0 / FRAME) as usize {
            b.update(FRAME);
            if b.arena.get(victim).is_none() {
                break;
            }
        }
        assert!(b.arena.get(victim).is_none(), "target should die and be removed");
        assert_eq!(b.arena.player_units().count(), 3);
    }

    #[test]
    fn riflemen_wear_a_target_down_with_bolts() {
        let mut b = Battle::new(9);
        let squad = b
            .spawn_squad("rifleman", vec3(10.0, 0.0, 0.0), 3, Faction::Enemy, None)
            .unwrap();
        let victim = b
            .factory
            .create_unit("vanguard", Vec3::ZERO, Faction::Player, &mut b.arena)
            .unwrap();
        // pin dodge so the test is deterministic enough
        b.arena.get_mut(victim).unwrap().dodge_chance = 0.0;
        b.squad_attack_unit(squad, victim);
        for _ in 0..(5.0 / FRAME) as usize {
            b.update(FRAME);
        }
        match b.arena.get(victim) {
            Some(u) => assert!(u.health < u.max_health, "bolts never landed"),
            None => {} // already shot dead
        }
    }

    #[test]
    fn reinforcements_join_the_callers_squad() {
        let mut b = Battle::new(1);
        let squad = b
            .spawn_squad("rifleman", Vec3::ZERO, 2, Faction::Enemy, None)
            .unwrap();
        let caller = b.squads[squad].members[0];
        assert!(b.use_ability(caller, Vec3::ZERO));
        assert_eq!(b.squads[squad].members.len(), 4);
        assert_eq!(b.arena.enemy_units().count(), 4);
        // cooldown gates the second call
        assert!(!b.use_ability(caller, Vec3::ZERO));
    }

    #[test]
    fn mega_bomb_blasts_a_cluster() {
        let mut b = Battle::new(2);
        let squad = b
            .spawn_squad("grenadier", Vec3::ZERO, 1, Faction::Player, None)
            .unwrap();
        let bomber = b.squads[squad].members[0];
        let mut cluster = Vec::new();
        for z in -1..=1 {
            cluster.push(
                b.factory
                    .create_unit(
                        "rifleman",
                        vec3(30.0, 0.0, z as f32 * 2.0),
                        Faction::Enemy,
                        &mut b.arena,
                    )
                    .unwrap(),
            );
        }
        assert!(b.use_ability(bomber, vec3(30.0, 0.0, 0.0)));
        for _ in 0..(4.0 / FRAME) as usize {
            b.update(FRAME);
        }
        // 75 base damage with falloff kills or cripples everything in r=8
        for id in cluster {
            match b.arena.get(id) {
                Some(u) => assert!(u.health < u.max_health),
                None => {}
            }
        }
    }

    #[test]
    fn slash_is_an_instant_no_falloff_blast() {
        let mut b = Battle::new(3);
        let squad = b
            .spawn_squad("vanguard", Vec3::ZERO, 1, Faction::Player, None)
            .unwrap();
        let slasher = b.squads[squad].members[0];
        let slasher_pos = b.arena.get(slasher).unwrap().pos;
        let aim = slasher_pos + vec3(3.0, 0.0, 0.0);
        let victim = b
            .factory
            .create_unit("rifleman", aim, Faction::Enemy, &mut b.arena)
            .unwrap();
        assert!(b.use_ability(slasher, aim));
        b.update(FRAME);
        let u = b.arena.get(victim).unwrap();
        assert_eq!(u.health, u.max_health - 50.0);
        assert_eq!(u.state, UnitState::Idle);
    }

    #[test]
    fn wiped_squads_are_dropped() {
        let mut b = Battle::new(4);
        let squad = b
            .spawn_squad("archer", Vec3::ZERO, 1, Faction::Enemy, None)
            .unwrap();
        let lone = b.squads[squad].members[0];
        let mut rng = SmallRng::seed_from_u64(0);
        b.arena.apply_damage(lone, 1e6, None, &mut rng);
        b.update(FRAME);
        b.update(FRAME);
        assert!(b.squads.is_empty());
    }
}
