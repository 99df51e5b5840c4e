//! Squad command layer: formation computation, aggregate orders, and
//! membership lifecycle.
//!
//! A squad owns its members only by id; dead members are pruned and the
//! centroid recomputed from survivors at the top of every update, before
//! any formation math runs.

use glam::{Vec2, Vec3};
use rand::Rng;
use rand::rngs::SmallRng;
use std::f32::consts::TAU;

use crate::unit::{AttackEffect, Faction, UnitArena, UnitId};

/// Squad counts as arrived once its centroid is this close to the lead
/// waypoint.
const WAYPOINT_REACHED: f32 = 50.0;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Formation {
    Line,
    Wedge,
    Column,
    Scattered,
    Circle,
}

#[derive(Debug)]
pub struct Squad {
    pub name: String,
    pub faction: Faction,
    /// Centroid of live member positions, refreshed every update.
    pub position: Vec3,
    pub members: Vec<UnitId>,
    pub formation: Formation,
    pub formation_spacing: f32,
    pub formation_width: usize,
    pub target_position: Option<Vec3>,
    pub waypoints: Vec<Vec3>,
    pub selected: bool,
}

impl Squad {
    pub fn new(name: impl Into<String>, faction: Faction, position: Vec3) -> Self {
        Self {
            name: name.into(),
            faction,
            position,
            members: Vec::new(),
            formation: Formation::Line,
            formation_spacing: 30.0,
            formation_width: 5,
            target_position: None,
            waypoints: Vec::new(),
            selected: false,
        }
    }

    pub fn add_unit(&mut self, arena: &mut UnitArena, id: UnitId) {
        if let Some(u) = arena.get_mut(id) {
            u.squad = Some(self.name.clone());
            self.members.push(id);
        }
    }

    pub fn remove_unit(&mut self, arena: &mut UnitArena, id: UnitId) {
        if let Some(i) = self.members.iter().position(|m| *m == id) {
            self.members.remove(i);
            if let Some(u) = arena.get_mut(id) {
                u.squad = None;
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Order the squad to `target`: record it, recompute formation slots,
    /// and issue each member a direct move to its slot. Members do not
    /// avoid each other on the way.
    pub fn move_to(&mut self, target: Vec3, arena: &mut UnitArena, rng: &mut SmallRng) {
        self.target_position = Some(target);
        self.waypoints = vec![target];
        self.refresh_formation(arena, rng);
        for id in self.members.clone() {
            if let Some(u) = arena.get_mut(id)
                && let Some(slot) = u.formation_position
            {
                u.move_to(slot);
            }
        }
    }

    pub fn set_formation(&mut self, formation: Formation, arena: &mut UnitArena, rng: &mut SmallRng) {
        self.formation = formation;
        self.refresh_formation(arena, rng);
        if let Some(target) = self.target_position {
            self.move_to(target, arena, rng);
        }
    }

    /// Move into position at `target`, then flag every member into attack
    /// mode (members with a held target resume it on arrival).
    pub fn attack_target(&mut self, target: Vec3, arena: &mut UnitArena, rng: &mut SmallRng) {
        self.move_to(target, arena, rng);
        for id in self.members.clone() {
            if let Some(u) = arena.get_mut(id) {
                u.set_attack_mode(true);
            }
        }
    }

    /// Every member targets the same unit and enters attack mode.
    pub fn attack_unit(&mut self, target: UnitId, arena: &mut UnitArena) {
        for id in self.members.clone() {
            if let Some(u) = arena.get_mut(id) {
                u.set_target(Some(target));
                u.set_attack_mode(true);
            }
        }
    }

    pub fn select(&mut self, arena: &mut UnitArena) {
        self.selected = true;
        for id in self.members.clone() {
            if let Some(u) = arena.get_mut(id) {
                u.selected = true;
            }
        }
    }

    pub fn deselect(&mut self, arena: &mut UnitArena) {
        self.selected = false;
        for id in self.members.clone() {
            if let Some(u) = arena.get_mut(id) {
                u.selected = false;
            }
        }
    }

    /// Per-tick update: prune the dead, recompute the centroid, refresh
    /// formation slots, update members (collecting their attack effects),
    /// then advance the waypoint queue.
    pub fn update(
        &mut self,
        dt: f32,
        arena: &mut UnitArena,
        rng: &mut SmallRng,
    ) -> Vec<AttackEffect> {
        self.members.retain(|id| arena.is_alive(*id));
        if !self.members.is_empty() {
            let mut sum = Vec3::ZERO;
            for id in &self.members {
                if let Some(u) = arena.get(*id) {
                    sum += u.pos;
                }
            }
            self.position = sum / self.members.len() as f32;
        }
        self.refresh_formation(arena, rng);

        let mut effects = Vec::new();
        let index = arena.target_index();
        for id in self.members.clone() {
            if let Some(u) = arena.get_mut(id)
                && let Some(e) = u.update(dt, &index, rng)
            {
                effects.push(e);
            }
        }

        if let Some(&wp) = self.waypoints.first()
            && !self.members.is_empty()
        {
            let d = Vec2::new(self.position.x - wp.x, self.position.z - wp.z).length();
            if d < WAYPOINT_REACHED {
                self.waypoints.remove(0);
                match self.waypoints.first().copied() {
                    Some(next) => self.move_to(next, arena, rng),
                    // final destination reached; settle into formation
                    None => self.refresh_formation(arena, rng),
                }
            }
        }
        effects
    }

    /// Write the current formation slot into each member.
    pub fn refresh_formation(&mut self, arena: &mut UnitArena, rng: &mut SmallRng) {
        if self.members.is_empty() {
            return;
        }
        let slots = self.formation_slots(self.members.len(), rng);
        for (id, slot) in self.members.clone().into_iter().zip(slots) {
            if let Some(u) = arena.get_mut(id) {
                u.formation_position = Some(slot);
            }
        }
    }

    /// Compute `n` world-space formation slots around the squad target.
    /// Slots are pairwise distinct for line/wedge/column/circle.
    pub fn formation_slots(&self, n: usize, rng: &mut SmallRng) -> Vec<Vec3> {
        let target = self.target_position.unwrap_or(self.position);
        // Travel direction from the centroid toward the target; +Z when the
        // squad is already there.
        let mut dir = Vec2::new(target.x - self.position.x, target.z - self.position.z);
        let len = dir.length();
        if len > 1e-6 {
            dir /= len;
        } else {
            dir = Vec2::new(0.0, 1.0);
        }
        let perp = Vec2::new(-dir.y, dir.x);
        let place = |rel_x: f32, rel_y: f32| {
            Vec3::new(
                target.x + rel_x * perp.x + rel_y * dir.x,
                0.0,
                target.z + rel_x * perp.y + rel_y * dir.y,
            )
        };
        let spacing = self.formation_spacing;
        match self.formation {
            Formation::Line => {
                let per_row = n.min(self.formation_width.max(1));
                let rows = n.div_ceil(per_row);
                let total_height = (rows - 1) as f32 * spacing;
                (0..n)
                    .map(|i| {
                        let row = i / per_row;
                        let col = i % per_row;
                        let in_this_row = per_row.min(n - row * per_row);
                        let row_width = (in_this_row - 1) as f32 * spacing;
                        let rel_x = col as f32 * spacing - row_width / 2.0;
                        let rel_y = row as f32 * spacing - total_height / 2.0;
                        place(rel_x, rel_y)
                    })
                    .collect()
            }
            Formation::Wedge => (0..n)
                .map(|i| {
                    if i == 0 {
                        place(0.0, 0.0)
                    } else {
                        let side = if i % 2 == 1 { 1.0 } else { -1.0 };
                        let row = ((i - 1) / 2 + 1) as f32;
                        place(side * row * spacing * 0.8, row * spacing * 0.8)
                    }
                })
                .collect(),
            Formation::Column => {
                let per_col = 2usize;
                let mut total_length = (n / per_col) as f32 * spacing;
                if n % per_col > 0 {
                    total_length += spacing;
                }
                (0..n)
                    .map(|i| {
                        let col = (i / per_col) as f32;
                        let row = (i % per_col) as f32;
                        let rel_x = (row - 0.5) * spacing;
                        let rel_y = col * spacing - total_length / 2.0;
                        place(rel_x, rel_y)
                    })
                    .collect()
            }
            Formation::Scattered => {
                let radius = spacing * (n as f32).sqrt() * 0.5;
                (0..n)
                    .map(|i| {
                        let angle = TAU * i as f32 / n as f32;
                        let distance = radius * rng.random::<f32>().sqrt();
                        place(distance * angle.cos(), distance * angle.sin())
                    })
                    .collect()
            }
            Formation::Circle => {
                let radius = spacing * 2.0;
                (0..n)
                    .map(|i| {
                        let angle = TAU * i as f32 / n as f32;
                        place(radius * angle.cos(), radius * angle.sin())
                    })
                    .collect()
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::archetype::{Archetype, UnitStats};
    use crate::unit::{Unit, UnitState};
    use glam::vec3;
    use rand::SeedableRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(11)
    }

    fn dummy(pos: Vec3, faction: Faction) -> Unit {
        let stats = UnitStats {
            dodge_chance: 0.0,
            ..Archetype::Vanguard.default_stats()
        };
        Unit::new(Archetype::Vanguard, stats, pos, faction)
    }

    fn squad_of(n: usize, arena: &mut UnitArena) -> Squad {
        let mut s = Squad::new("Test Squad", Faction::Player, Vec3::ZERO);
        for i in 0..n {
            let id = arena.insert(dummy(vec3(i as f32, 0.0, 0.0), Faction::Player));
            s.add_unit(arena, id);
        }
        s
    }

    fn pairwise_distinct(slots: &[Vec3]) -> bool {
        for i in 0..slots.len() {
            for j in (i + 1)..slots.len() {
                if (slots[i] - slots[j]).length() < 1e-3 {
                    return false;
                }
            }
        }
        true
    }

    #[test]
    fn deterministic_formations_have_distinct_slots() {
        let mut r = rng();
        let mut arena = UnitArena::new();
        let mut s = squad_of(7, &mut arena);
        s.target_position = Some(vec3(100.0, 0.0, 40.0));
        for f in [
            Formation::Line,
            Formation::Wedge,
            Formation::Column,
            Formation::Circle,
        ] {
            s.formation = f;
            let slots = s.formation_slots(7, &mut r);
            assert_eq!(slots.len(), 7);
            assert!(pairwise_distinct(&slots), "duplicate slots in {f:?}");
        }
    }

    #[test]
    fn line_rows_respect_width() {
        let mut r = rng();
        let mut arena = UnitArena::new();
        let mut s = squad_of(12, &mut arena);
        s.target_position = Some(vec3(0.0, 0.0, 200.0));
        s.formation = Formation::Line;
        let slots = s.formation_slots(12, &mut r);
        // travel is +Z, so rows separate along Z; 12 units over width 5 = 3 rows
        let mut zs: Vec<i64> = slots.iter().map(|p| p.z.round() as i64).collect();
        zs.sort_unstable();
        zs.dedup();
        assert_eq!(zs.len(), 3);
    }

    #[test]
    fn scattered_stays_inside_disk() {
        let mut r = rng();
        let mut arena = UnitArena::new();
        let mut s = squad_of(9, &mut arena);
        s.formation = Formation::Scattered;
        let radius = s.formation_spacing * 3.0 * 0.5; // sqrt(9) = 3
        let slots = s.formation_slots(9, &mut r);
        for p in slots {
            assert!(Vec2::new(p.x, p.z).length() <= radius + 1e-3);
        }
    }

    #[test]
    fn move_to_issues_member_moves() {
        let mut r = rng();
        let mut arena = UnitArena::new();
        let mut s = squad_of(3, &mut arena);
        s.move_to(vec3(200.0, 0.0, 0.0), &mut arena, &mut r);
        for id in &s.members {
            let u = arena.get(*id).unwrap();
            assert_eq!(u.state, UnitState::Moving);
            assert_eq!(u.path.len(), 1);
            assert_eq!(Some(u.path[0]), u.formation_position);
        }
    }

    #[test]
    fn update_prunes_dead_and_recomputes_centroid() {
        let mut r = rng();
        let mut arena = UnitArena::new();
        let mut s = squad_of(2, &mut arena);
        let dead = s.members[0];
        let alive = s.members[1];
        arena.get_mut(dead).unwrap().health = 0.0;
        arena.get_mut(dead).unwrap().state = UnitState::Dead;
        s.update(1.0 / 60.0, &mut arena, &mut r);
        assert_eq!(s.members, vec![alive]);
        let expect = arena.get(alive).unwrap().pos;
        assert!((s.position - expect).length() < 1e-4);
    }

    #[test]
    fn waypoints_pop_when_centroid_is_close() {
        let mut r = rng();
        let mut arena = UnitArena::new();
        let mut s = squad_of(3, &mut arena);
        // centroid is ~(1, 0, 0); a waypoint 40 away is within the 50 threshold
        s.waypoints = vec![vec3(40.0, 0.0, 0.0), vec3(500.0, 0.0, 0.0)];
        s.target_position = Some(vec3(40.0, 0.0, 0.0));
        s.update(1.0 / 60.0, &mut arena, &mut r);
        assert_eq!(s.waypoints, vec![vec3(500.0, 0.0, 0.0)]);
        assert_eq!(s.target_position, Some(vec3(500.0, 0.0, 0.0)));
    }

    #[test]
    fn attack_unit_targets_every_member() {
        let mut r = rng();
        let mut arena = UnitArena::new();
        let enemy = arena.insert(dummy(vec3(10.0, 0.0, 0.0), Faction::Enemy));
        let mut s = squad_of(3, &mut arena);
        s.attack_unit(enemy, &mut arena);
        for id in &s.members {
            let u = arena.get(*id).unwrap();
            assert_eq!(u.target, Some(enemy));
            assert_eq!(u.state, UnitState::Attacking);
        }
        let _ = r;
    }

    #[test]
    fn select_marks_squad_and_members() {
        let mut arena = UnitArena::new();
        let mut s = squad_of(2, &mut arena);
        s.select(&mut arena);
        assert!(s.selected);
        assert!(s.members.iter().all(|id| arena.get(*id).unwrap().selected));
        s.deselect(&mut arena);
        assert!(!s.selected);
        assert!(s.members.iter().all(|id| !arena.get(*id).unwrap().selected));
    }
}
