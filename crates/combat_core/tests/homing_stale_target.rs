use combat_core::{Battle, Faction, ProjectileKind, ProjectileTarget};
use glam::{Vec3, vec3};

const FRAME: f32 = 1.0 / 60.0;

#[test]
fn homing_shot_survives_its_target_dying_mid_flight() {
    let mut b = Battle::new(0x1234);
    let victim = b
        .factory
        .create_unit("rifleman", vec3(0.0, 0.0, 60.0), Faction::Enemy, &mut b.arena)
        .expect("victim");
    b.physics.fire_projectile(
        Vec3::ZERO,
        ProjectileTarget::Unit(victim),
        ProjectileKind::Arrow,
        None,
        Faction::Player,
        5.0,
        &b.arena,
    );
    // a few frames in, the target dies and is removed from the arena
    for _ in 0..10 {
        b.update(FRAME);
    }
    {
        use rand::SeedableRng;
        let mut rng = rand::rngs::SmallRng::seed_from_u64(0);
        b.arena.apply_damage(victim, 1e6, None, &mut rng);
    }
    b.arena.remove_dead();
    // the projectile keeps its last direction and eventually expires
    for _ in 0..(6.0 / FRAME) as usize {
        b.update(FRAME);
        if b.physics.projectiles.is_empty() {
            break;
        }
    }
    assert!(b.physics.projectiles.is_empty(), "arrow should time out");
}

#[test]
fn homing_shot_runs_down_a_fleeing_target() {
    let mut b = Battle::new(0x4321);
    let squad = b
        .spawn_squad("rifleman", vec3(0.0, 0.0, 30.0), 1, Faction::Enemy, None)
        .expect("squad");
    let runner = b.squads[squad].members[0];
    b.squad_move_to(squad, vec3(0.0, 0.0, 45.0));
    let hp0 = b.arena.get(runner).expect("runner").health;
    b.physics.fire_projectile(
        Vec3::ZERO,
        ProjectileTarget::Unit(runner),
        ProjectileKind::Arrow,
        None,
        Faction::Player,
        5.0,
        &b.arena,
    );
    // arrow speed 20 vs unit speed 4: the lagged tracking still closes
    for _ in 0..(5.0 / FRAME) as usize {
        b.update(FRAME);
        if b.physics.projectiles.is_empty() {
            break;
        }
    }
    let hp1 = b.arena.get(runner).map(|u| u.health).unwrap_or(0.0);
    assert!(hp1 < hp0, "homing arrow never caught the runner");
}
