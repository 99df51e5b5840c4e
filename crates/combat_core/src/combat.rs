//! Faction hostility rules.

use crate::unit::Faction;

#[inline]
pub fn are_hostile(a: Faction, b: Faction) -> bool {
    use Faction::*;
    matches!((a, b), (Player, Enemy) | (Enemy, Player))
}

/// Which units a projectile owned by `owner` may hit. Neutral projectiles
/// hit nobody (friendly fire stays off).
#[inline]
pub fn projectile_hits(owner: Faction, victim: Faction) -> bool {
    are_hostile(owner, victim)
}

/// Which units an explosion owned by `owner` damages. Neutral blasts hurt
/// both sides.
#[inline]
pub fn explosion_hits(owner: Faction, victim: Faction) -> bool {
    match owner {
        Faction::Neutral => victim != Faction::Neutral,
        _ => are_hostile(owner, victim),
    }
}
