//! Headless battle runner: builds two forces, orders an assault, and steps
//! the simulation for a fixed number of frames. Stands in for the excluded
//! frame loop when exercising the core from a terminal.

use combat_core::{Battle, Faction};
use glam::vec3;
use std::env;

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();
    let frames: usize = args
        .get(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(60 * 60); // one simulated minute
    let seed: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(0xC0FFEE);

    let mut battle = Battle::new(seed);
    let spearhead = battle
        .spawn_squad(
            "vanguard",
            vec3(-60.0, 0.0, 0.0),
            4,
            Faction::Player,
            Some("Spearhead".into()),
        )
        .expect("spawn vanguards");
    let archers = battle
        .spawn_squad("archer", vec3(-90.0, 0.0, 20.0), 3, Faction::Player, None)
        .expect("spawn archers");
    let patrol = battle
        .spawn_squad(
            "rifleman",
            vec3(60.0, 0.0, 0.0),
            5,
            Faction::Enemy,
            Some("Patrol".into()),
        )
        .expect("spawn riflemen");

    // Both sides pick the first opposing unit they can see and commit.
    let enemy_lead = battle.squads[patrol].members[0];
    let player_lead = battle.squads[spearhead].members[0];
    battle.squad_attack_unit(spearhead, enemy_lead);
    battle.squad_attack_unit(archers, enemy_lead);
    battle.squad_attack_unit(patrol, player_lead);

    let dt = 1.0 / 60.0;
    for frame in 0..frames {
        battle.update(dt);
        if frame % 600 == 0 {
            log::info!(
                "t={:5.1}s player={} enemy={} projectiles={} debris={}",
                battle.elapsed,
                battle.arena.player_units().count(),
                battle.arena.enemy_units().count(),
                battle.physics.projectiles.len(),
                battle.physics.debris.len(),
            );
        }
        if battle.arena.player_units().count() == 0 || battle.arena.enemy_units().count() == 0 {
            break;
        }
    }

    println!(
        "done after {:.1}s: {} player / {} enemy units standing",
        battle.elapsed,
        battle.arena.player_units().count(),
        battle.arena.enemy_units().count(),
    );
}
