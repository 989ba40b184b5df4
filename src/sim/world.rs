//! Entity arena and per-frame mechanics
//!
//! `World` owns every squad, soldier and trigger, plus the collision registry.
//! Entities are stored per kind in `Vec`s sorted by id. Destruction is two
//! phase: `mark_for_destroy` only flags, `prune` unregisters and drops. The
//! sweep tests a snapshot of resolved boundaries and then dispatches contact
//! hooks, so no storage is reshaped while pairs are being visited.

use std::collections::HashMap;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::collision::{overlaps, push_vector};
use super::entity::{Body, EntityId, EntityKind, Faction, Frame, Rect};
use super::registry::CollisionRegistry;
use super::squad::{Soldier, Squad};
use super::steering::seek;
use super::trigger::{GateEffect, Trigger, TriggerAction};
use crate::config::Tunables;

#[inline]
fn index_of<T>(items: &[T], id: EntityId, key: impl Fn(&T) -> EntityId) -> Option<usize> {
    items.binary_search_by_key(&id, key).ok()
}

pub struct World {
    tunables: Tunables,
    registry: CollisionRegistry,
    squads: Vec<Squad>,
    soldiers: Vec<Soldier>,
    triggers: Vec<Trigger>,
    /// Added to lane-frame positions to get view positions
    lane_offset: Vec2,
    rng: Pcg32,
    next_id: u32,
}

impl World {
    pub fn new(tunables: Tunables, seed: u64) -> Self {
        Self {
            tunables,
            registry: CollisionRegistry::new(),
            squads: Vec::new(),
            soldiers: Vec::new(),
            triggers: Vec::new(),
            lane_offset: Vec2::ZERO,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn tunables(&self) -> &Tunables {
        &self.tunables
    }

    pub fn registry(&self) -> &CollisionRegistry {
        &self.registry
    }

    pub fn lane_offset(&self) -> Vec2 {
        self.lane_offset
    }

    pub fn set_lane_offset(&mut self, offset: Vec2) {
        self.lane_offset = offset;
    }

    pub fn squads(&self) -> &[Squad] {
        &self.squads
    }

    pub fn soldiers(&self) -> &[Soldier] {
        &self.soldiers
    }

    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    pub fn squad(&self, id: EntityId) -> Option<&Squad> {
        index_of(&self.squads, id, |s| s.body.id).map(|i| &self.squads[i])
    }

    pub fn squad_mut(&mut self, id: EntityId) -> Option<&mut Squad> {
        index_of(&self.squads, id, |s| s.body.id).map(|i| &mut self.squads[i])
    }

    pub fn soldier(&self, id: EntityId) -> Option<&Soldier> {
        index_of(&self.soldiers, id, |s| s.body.id).map(|i| &self.soldiers[i])
    }

    pub fn soldier_mut(&mut self, id: EntityId) -> Option<&mut Soldier> {
        index_of(&self.soldiers, id, |s| s.body.id).map(|i| &mut self.soldiers[i])
    }

    pub fn trigger(&self, id: EntityId) -> Option<&Trigger> {
        index_of(&self.triggers, id, |t| t.body.id).map(|i| &self.triggers[i])
    }

    pub fn trigger_mut(&mut self, id: EntityId) -> Option<&mut Trigger> {
        index_of(&self.triggers, id, |t| t.body.id).map(|i| &mut self.triggers[i])
    }

    pub fn kind_of(&self, id: EntityId) -> Option<EntityKind> {
        if self.soldier(id).is_some() {
            Some(EntityKind::Soldier)
        } else if self.squad(id).is_some() {
            Some(EntityKind::Squad)
        } else {
            self.trigger(id).map(Trigger::kind)
        }
    }

    pub fn body(&self, id: EntityId) -> Option<&Body> {
        self.soldier(id)
            .map(|s| &s.body)
            .or_else(|| self.squad(id).map(|s| &s.body))
            .or_else(|| self.trigger(id).map(|t| &t.body))
    }

    /// Present and not marked for destruction
    pub fn is_live(&self, id: EntityId) -> bool {
        self.body(id).is_some_and(Body::is_live)
    }

    /// Faction of a squad, or of a soldier's owning squad
    pub fn faction_of(&self, id: EntityId) -> Option<Faction> {
        if let Some(squad) = self.squad(id) {
            return Some(squad.faction);
        }
        let owner = self.soldier(id)?.squad;
        self.squad(owner).map(|s| s.faction)
    }

    // --- Spawning ---

    pub fn spawn_squad(
        &mut self,
        faction: Faction,
        target: Vec2,
        frame: Frame,
        soldiers: i64,
    ) -> EntityId {
        let id = self.next_entity_id();
        self.squads
            .push(Squad::new(id, faction, target, self.tunables.soldier_size, frame));
        self.registry.register(id);
        self.set_cur_soldiers(id, soldiers);
        log::debug!("Spawned {:?} squad {:?} with {} soldiers", faction, id, soldiers.max(0));
        id
    }

    pub fn spawn_trigger(
        &mut self,
        pos: Vec2,
        size: Vec2,
        frame: Frame,
        action: TriggerAction,
    ) -> EntityId {
        let id = self.next_entity_id();
        self.triggers.push(Trigger::new(id, pos, size, frame, action));
        self.registry.register(id);
        id
    }

    pub fn spawn_gate(
        &mut self,
        pos: Vec2,
        size: Vec2,
        frame: Frame,
        effect: GateEffect,
    ) -> EntityId {
        self.spawn_trigger(pos, size, frame, TriggerAction::Gate(effect))
    }

    /// Give an enemy squad a zone that arms it on first player contact
    pub fn attach_activation(&mut self, squad: EntityId, size: Vec2) -> Option<EntityId> {
        let (pos, frame) = {
            let s = self.squad(squad)?;
            (s.target, s.body.frame)
        };
        let zone = self.spawn_trigger(pos, size, frame, TriggerAction::Activation { squad });
        if let Some(s) = self.squad_mut(squad) {
            s.activation = Some(zone);
        }
        Some(zone)
    }

    // --- Roster ---

    /// Resize a squad roster. Growing spawns soldiers around the target,
    /// shrinking destroys them from the tail. Negative values clamp to zero.
    /// Returns the new size, or `None` for an unknown squad.
    pub fn set_cur_soldiers(&mut self, squad_id: EntityId, value: i64) -> Option<usize> {
        let value = value.max(0) as usize;
        let idx = index_of(&self.squads, squad_id, |s| s.body.id)?;
        let before = self.squads[idx].cur_soldiers();
        if value == before {
            return Some(value);
        }

        if value < before {
            let removed = self.squads[idx].roster.split_off(value);
            for id in removed.into_iter().rev() {
                if let Some(soldier) = self.soldier_mut(id) {
                    soldier.body.mark_for_destroy();
                }
            }
        } else {
            let target = self.squads[idx].target;
            let frame = self.squads[idx].body.frame;
            let jitter = self.tunables.spawn_jitter;
            for _ in before..value {
                let id = self.next_entity_id();
                let offset = Vec2::new(
                    self.rng.random_range(-jitter..=jitter),
                    self.rng.random_range(-jitter..=jitter),
                );
                self.soldiers.push(Soldier::new(
                    id,
                    target + offset,
                    self.tunables.soldier_size,
                    self.tunables.soldier_mass,
                    squad_id,
                    frame,
                ));
                self.registry.register(id);
                self.squads[idx].roster.push(id);
            }
        }

        debug_assert_eq!(self.squads[idx].cur_soldiers(), value);
        log::debug!("Squad {:?}: {} -> {} soldiers", squad_id, before, value);
        Some(value)
    }

    /// Remove one specific soldier, shrinking its squad by one
    pub fn eliminate_soldier(&mut self, id: EntityId) {
        let Some(squad_id) = self.soldier(id).filter(|s| s.body.is_live()).map(|s| s.squad) else {
            return;
        };
        let remaining = self
            .squad_mut(squad_id)
            .and_then(|squad| squad.move_to_tail(id).then(|| squad.cur_soldiers() as i64 - 1));
        match remaining {
            Some(n) => {
                self.set_cur_soldiers(squad_id, n);
            }
            // Orphaned soldier: nothing owns it any more
            None => {
                if let Some(soldier) = self.soldier_mut(id) {
                    soldier.body.mark_for_destroy();
                }
            }
        }
    }

    /// Arm an enemy squad and retire its activation zone
    pub fn arm(&mut self, squad_id: EntityId) {
        let Some(squad) = self.squad_mut(squad_id) else {
            return;
        };
        if squad.armed {
            return;
        }
        squad.armed = true;
        let zone = squad.activation;
        log::debug!("Squad {:?} armed", squad_id);
        if let Some(trigger) = zone.and_then(|z| self.trigger_mut(z)) {
            trigger.fire();
        }
    }

    // --- Lifecycle ---

    /// Flag an entity for removal on the next prune. Repeated calls are no-ops.
    pub fn mark_for_destroy(&mut self, id: EntityId) {
        match self.kind_of(id) {
            Some(EntityKind::Soldier) => self.eliminate_soldier(id),
            Some(EntityKind::Squad) => {
                self.set_cur_soldiers(id, 0);
                let zone = self.squad(id).and_then(|s| s.activation);
                if let Some(trigger) = zone.and_then(|z| self.trigger_mut(z)) {
                    trigger.fire();
                }
                if let Some(squad) = self.squad_mut(id) {
                    squad.body.mark_for_destroy();
                }
            }
            Some(EntityKind::Gate | EntityKind::Trigger) => {
                if let Some(trigger) = self.trigger_mut(id) {
                    trigger.fire();
                }
            }
            None => {}
        }
    }

    /// Unregister and drop every marked entity. Returns how many were removed.
    pub fn prune(&mut self) -> usize {
        let removed: Vec<EntityId> = self
            .soldiers
            .iter()
            .map(|s| &s.body)
            .chain(self.squads.iter().map(|s| &s.body))
            .chain(self.triggers.iter().map(|t| &t.body))
            .filter(|b| b.destroyed)
            .map(|b| b.id)
            .collect();
        if removed.is_empty() {
            return 0;
        }

        for id in &removed {
            self.registry.unregister(*id);
        }
        self.soldiers.retain(|s| s.body.is_live());
        self.squads.retain(|s| s.body.is_live());
        self.triggers.retain(|t| t.body.is_live());

        log::debug!("Pruned {} entities", removed.len());
        removed.len()
    }

    // --- Movement ---

    /// Move a squad target and steer its soldiers toward it
    pub fn advance_squad(&mut self, id: EntityId, delta: f32) {
        let Some(idx) = index_of(&self.squads, id, |s| s.body.id) else {
            return;
        };
        let t = &self.tunables;
        let squad = &mut self.squads[idx];
        debug_assert!(squad.body.is_live(), "advancing destroyed squad {:?}", id);
        squad.advance_target(t.squad_damping, delta, t.facing_threshold);

        for soldier_id in &squad.roster {
            if let Some(i) = index_of(&self.soldiers, *soldier_id, |s| s.body.id) {
                self.soldiers[i].advance(
                    squad.target,
                    t.soldier_seek_speed,
                    t.soldier_damping,
                    delta,
                    t.facing_threshold,
                );
            }
        }
    }

    /// Set a squad acceleration to seek a view-space point
    pub fn steer_squad(&mut self, id: EntityId, view_point: Vec2, speed_constant: f32) {
        let offset = self.lane_offset;
        if let Some(squad) = self.squad_mut(id) {
            squad.accel = seek(squad.body.view_pos(offset), view_point, speed_constant);
        }
    }

    /// Keep a squad's soldiers inside `[left, right]`; hitting a border kills
    /// horizontal acceleration
    pub fn clamp_soldiers_x(&mut self, squad_id: EntityId, left: f32, right: f32) {
        let Some(idx) = index_of(&self.squads, squad_id, |s| s.body.id) else {
            return;
        };
        for soldier_id in &self.squads[idx].roster {
            let Some(i) = index_of(&self.soldiers, *soldier_id, |s| s.body.id) else {
                continue;
            };
            let soldier = &mut self.soldiers[i];
            if soldier.body.pos.x < left {
                soldier.body.pos.x = left;
                soldier.accel.x = 0.0;
            }
            if soldier.body.pos.x > right {
                soldier.body.pos.x = right;
                soldier.accel.x = 0.0;
            }
        }
    }

    // --- Collision ---

    /// Test every registered pair and dispatch contact hooks for overlaps.
    /// Returns the number of overlapping pairs.
    pub fn sweep(&mut self) -> usize {
        let offset = self.lane_offset;
        let rects: HashMap<EntityId, Rect> = self
            .soldiers
            .iter()
            .map(|s| &s.body)
            .chain(self.squads.iter().map(|s| &s.body))
            .chain(self.triggers.iter().map(|t| &t.body))
            .filter(|b| b.is_live())
            .map(|b| (b.id, b.view_rect(offset)))
            .collect();

        let contacts: Vec<(EntityId, EntityId)> = self
            .registry
            .pairs()
            .filter(|(a, b)| match (rects.get(a), rects.get(b)) {
                (Some(ra), Some(rb)) => overlaps(ra, rb),
                _ => false,
            })
            .collect();

        for &(a, b) in &contacts {
            // Anything eliminated earlier in this sweep lands no more hits
            if !self.is_live(a) || !self.is_live(b) {
                continue;
            }
            self.on_collide(a, b);
            self.on_collide(b, a);
        }
        contacts.len()
    }

    /// Contact hook of `this`, touched by `other`
    pub fn on_collide(&mut self, this: EntityId, other: EntityId) {
        match self.kind_of(this) {
            Some(EntityKind::Soldier) => self.soldier_contact(this, other),
            Some(EntityKind::Squad) => self.squad_contact(this, other),
            Some(EntityKind::Gate | EntityKind::Trigger) => self.trigger_contact(this, other),
            None => {}
        }
    }

    /// Opposing squads fight only once both are armed
    fn engaged(&self, a: EntityId, b: EntityId) -> bool {
        match (self.squad(a), self.squad(b)) {
            (Some(sa), Some(sb)) => sa.faction.opposes(sb.faction) && sa.armed && sb.armed,
            _ => false,
        }
    }

    fn soldier_contact(&mut self, this: EntityId, other: EntityId) {
        let offset = self.lane_offset;
        let Some((other_pos, other_mass, other_squad)) = self
            .soldier(other)
            .map(|o| (o.body.view_pos(offset), o.mass, o.squad))
        else {
            return;
        };
        let Some(soldier) = self.soldier_mut(this) else {
            return;
        };
        let push = push_vector(soldier.body.view_pos(offset), other_pos);
        soldier.absorb_push(push, other_mass);
        let own_squad = soldier.squad;

        if self.engaged(own_squad, other_squad) {
            log::debug!("Soldier {:?} eliminated by {:?}", this, other);
            self.eliminate_soldier(this);
        }
    }

    /// Squad-level contacts: an enemy squad touched by the player engages
    fn squad_contact(&mut self, this: EntityId, other: EntityId) {
        let Some(squad) = self.squad(this) else {
            return;
        };
        if squad.faction != Faction::Enemy || squad.armed {
            return;
        }
        if self.faction_of(other) == Some(Faction::Player) {
            self.arm(this);
        }
    }

    fn trigger_contact(&mut self, this: EntityId, other: EntityId) {
        let Some(trigger) = self.trigger(this) else {
            return;
        };
        if !trigger.interactive {
            return;
        }

        let action = trigger.action;
        let fired = match action {
            TriggerAction::Gate(effect) => {
                match self.squad(other).map(|s| effect.apply(s.cur_soldiers())) {
                    Some(count) => {
                        log::debug!(
                            "Gate {:?} ({}) hit by squad {:?}",
                            this,
                            effect.label(),
                            other
                        );
                        self.set_cur_soldiers(other, count);
                        true
                    }
                    None => false,
                }
            }
            TriggerAction::Activation { squad } => {
                if self.faction_of(other) == Some(Faction::Player) {
                    self.arm(squad);
                    true
                } else {
                    false
                }
            }
        };

        if fired {
            if let Some(trigger) = self.trigger_mut(this) {
                trigger.fire();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn world() -> World {
        World::new(Tunables::default(), 7)
    }

    fn live_entities(world: &World) -> usize {
        world.soldiers().iter().filter(|s| s.body.is_live()).count()
            + world.squads().iter().filter(|s| s.body.is_live()).count()
            + world.triggers().iter().filter(|t| t.body.is_live()).count()
    }

    #[test]
    fn test_grow_spawns_near_target() {
        let mut world = world();
        let target = Vec2::new(200.0, 300.0);
        let squad = world.spawn_squad(Faction::Player, target, Frame::View, 1);
        let registered = world.registry().len();

        assert_eq!(world.set_cur_soldiers(squad, 5), Some(5));
        assert_eq!(world.registry().len(), registered + 4);

        let s = world.squad(squad).unwrap();
        assert_eq!(s.cur_soldiers(), 5);
        for id in &s.roster {
            let soldier = world.soldier(*id).unwrap();
            assert_eq!(soldier.squad, squad);
            assert!((soldier.body.pos.x - target.x).abs() <= 10.0);
            assert!((soldier.body.pos.y - target.y).abs() <= 10.0);
        }
    }

    #[test]
    fn test_setter_same_value_is_noop() {
        let mut world = world();
        let squad = world.spawn_squad(Faction::Player, Vec2::ZERO, Frame::View, 3);
        let roster = world.squad(squad).unwrap().roster.clone();
        let registered = world.registry().len();

        world.set_cur_soldiers(squad, 3);
        assert_eq!(world.squad(squad).unwrap().roster, roster);
        assert_eq!(world.registry().len(), registered);
        assert!(world.soldiers().iter().all(|s| s.body.is_live()));
    }

    #[test]
    fn test_shrink_destroys_from_tail() {
        let mut world = world();
        let squad = world.spawn_squad(Faction::Player, Vec2::ZERO, Frame::View, 4);
        let roster = world.squad(squad).unwrap().roster.clone();

        world.set_cur_soldiers(squad, 2);
        assert_eq!(world.squad(squad).unwrap().roster, roster[..2].to_vec());
        assert!(world.soldier(roster[2]).unwrap().body.destroyed);
        assert!(world.soldier(roster[3]).unwrap().body.destroyed);
        // Still registered until the prune pass
        assert!(world.registry().contains(roster[3]));

        assert_eq!(world.prune(), 2);
        assert!(!world.registry().contains(roster[3]));
        assert!(world.soldier(roster[3]).is_none());
    }

    #[test]
    fn test_negative_count_clamps_to_zero() {
        let mut world = world();
        let squad = world.spawn_squad(Faction::Player, Vec2::ZERO, Frame::View, 3);
        assert_eq!(world.set_cur_soldiers(squad, -7), Some(0));
        assert_eq!(world.squad(squad).unwrap().cur_soldiers(), 0);
        world.prune();
        assert_eq!(world.registry().len(), 1);
    }

    #[test]
    fn test_multiplier_gate_fires_once() {
        let mut world = world();
        let squad = world.spawn_squad(Faction::Player, Vec2::ZERO, Frame::View, 10);
        let gate = world.spawn_gate(
            Vec2::ZERO,
            Vec2::new(200.0, 100.0),
            Frame::View,
            GateEffect::Multiply(2.0),
        );

        world.sweep();
        assert_eq!(world.squad(squad).unwrap().cur_soldiers(), 20);
        let g = world.trigger(gate).unwrap();
        assert!(!g.interactive);
        assert!(g.body.destroyed);

        // Touch again before the prune pass
        world.on_collide(gate, squad);
        world.sweep();
        assert_eq!(world.squad(squad).unwrap().cur_soldiers(), 20);

        world.prune();
        assert!(world.trigger(gate).is_none());
        assert!(!world.registry().contains(gate));
    }

    #[test]
    fn test_increase_gate_clamps() {
        let mut world = world();
        let squad = world.spawn_squad(Faction::Player, Vec2::ZERO, Frame::View, 10);
        world.spawn_gate(Vec2::ZERO, Vec2::new(200.0, 100.0), Frame::View, GateEffect::Add(-20.0));
        world.sweep();
        assert_eq!(world.squad(squad).unwrap().cur_soldiers(), 0);
    }

    #[test]
    fn test_gate_effect_applies_once_across_frames() {
        let mut world = world();
        let squad = world.spawn_squad(Faction::Player, Vec2::ZERO, Frame::View, 2);
        world.spawn_gate(Vec2::ZERO, Vec2::new(200.0, 100.0), Frame::View, GateEffect::Add(1.0));
        for _ in 0..5 {
            world.prune();
            world.sweep();
        }
        assert_eq!(world.squad(squad).unwrap().cur_soldiers(), 3);
    }

    #[test]
    fn test_soldiers_pass_through_gates() {
        let mut world = world();
        let squad = world.spawn_squad(Faction::Player, Vec2::ZERO, Frame::View, 1);
        let soldier = world.squad(squad).unwrap().roster[0];
        let gate = world.spawn_gate(
            Vec2::new(500.0, 500.0),
            Vec2::splat(50.0),
            Frame::View,
            GateEffect::Add(5.0),
        );
        world.soldier_mut(soldier).unwrap().body.pos = Vec2::new(500.0, 500.0);

        assert_eq!(world.sweep(), 1);
        assert!(world.trigger(gate).unwrap().interactive);
        assert_eq!(world.squad(squad).unwrap().cur_soldiers(), 1);
    }

    #[test]
    fn test_soldiers_push_apart() {
        let mut world = world();
        let squad = world.spawn_squad(Faction::Player, Vec2::new(500.0, 0.0), Frame::View, 2);
        let roster = world.squad(squad).unwrap().roster.clone();
        world.soldier_mut(roster[0]).unwrap().body.pos = Vec2::new(0.0, 0.0);
        world.soldier_mut(roster[1]).unwrap().body.pos = Vec2::new(10.0, 0.0);

        world.sweep();
        let a = world.soldier(roster[0]).unwrap().accel;
        let b = world.soldier(roster[1]).unwrap().accel;
        assert!((a.x + 0.1).abs() < 1e-5);
        assert!((b.x - 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_stacked_soldiers_get_no_push() {
        let mut world = world();
        let squad = world.spawn_squad(Faction::Player, Vec2::new(500.0, 0.0), Frame::View, 2);
        let roster = world.squad(squad).unwrap().roster.clone();
        for id in &roster {
            world.soldier_mut(*id).unwrap().body.pos = Vec2::new(3.0, 3.0);
        }
        world.sweep();
        for id in &roster {
            let accel = world.soldier(*id).unwrap().accel;
            assert_eq!(accel, Vec2::ZERO);
        }
    }

    fn duel(armed: bool) -> (World, EntityId, EntityId, EntityId, EntityId) {
        let mut world = world();
        let player = world.spawn_squad(Faction::Player, Vec2::ZERO, Frame::View, 1);
        let enemy = world.spawn_squad(Faction::Enemy, Vec2::new(200.0, 0.0), Frame::View, 1);
        world.squad_mut(enemy).unwrap().armed = armed;
        let p = world.squad(player).unwrap().roster[0];
        let e = world.squad(enemy).unwrap().roster[0];
        world.soldier_mut(p).unwrap().body.pos = Vec2::new(0.0, 0.0);
        world.soldier_mut(e).unwrap().body.pos = Vec2::new(5.0, 0.0);
        (world, player, enemy, p, e)
    }

    #[test]
    fn test_armed_contact_eliminates_both() {
        let (mut world, player, enemy, p, e) = duel(true);
        world.sweep();
        assert_eq!(world.squad(player).unwrap().cur_soldiers(), 0);
        assert_eq!(world.squad(enemy).unwrap().cur_soldiers(), 0);
        assert!(world.soldier(p).unwrap().body.destroyed);
        assert!(world.soldier(e).unwrap().body.destroyed);
    }

    #[test]
    fn test_unarmed_contact_only_pushes() {
        let (mut world, player, enemy, p, e) = duel(false);
        world.sweep();
        assert_eq!(world.squad(player).unwrap().cur_soldiers(), 1);
        assert_eq!(world.squad(enemy).unwrap().cur_soldiers(), 1);
        assert!(world.soldier(p).unwrap().accel.x < 0.0);
        assert!(world.soldier(e).unwrap().accel.x > 0.0);
    }

    #[test]
    fn test_eliminated_soldier_lands_no_second_hit() {
        let mut world = world();
        let player = world.spawn_squad(Faction::Player, Vec2::ZERO, Frame::View, 2);
        let enemy = world.spawn_squad(Faction::Enemy, Vec2::new(300.0, 0.0), Frame::View, 1);
        world.squad_mut(enemy).unwrap().armed = true;
        let roster = world.squad(player).unwrap().roster.clone();
        let e = world.squad(enemy).unwrap().roster[0];
        world.soldier_mut(roster[0]).unwrap().body.pos = Vec2::new(100.0, 0.0);
        world.soldier_mut(roster[1]).unwrap().body.pos = Vec2::new(108.0, 0.0);
        world.soldier_mut(e).unwrap().body.pos = Vec2::new(104.0, 0.0);

        world.sweep();
        assert_eq!(world.squad(player).unwrap().cur_soldiers(), 1);
        assert_eq!(world.squad(enemy).unwrap().cur_soldiers(), 0);
    }

    #[test]
    fn test_eliminate_removes_that_soldier() {
        let mut world = world();
        let squad = world.spawn_squad(Faction::Player, Vec2::ZERO, Frame::View, 3);
        let roster = world.squad(squad).unwrap().roster.clone();

        world.eliminate_soldier(roster[1]);
        assert_eq!(world.squad(squad).unwrap().roster, vec![roster[0], roster[2]]);
        assert!(world.soldier(roster[1]).unwrap().body.destroyed);
        assert!(world.soldier(roster[2]).unwrap().body.is_live());

        // Already marked: no second shrink
        world.eliminate_soldier(roster[1]);
        assert_eq!(world.squad(squad).unwrap().cur_soldiers(), 2);
        assert_eq!(world.prune(), 1);
    }

    #[test]
    fn test_activation_zone_arms_on_player_contact() {
        let mut world = world();
        let enemy = world.spawn_squad(Faction::Enemy, Vec2::new(1000.0, 1000.0), Frame::View, 0);
        let zone = world.spawn_trigger(
            Vec2::ZERO,
            Vec2::splat(100.0),
            Frame::View,
            TriggerAction::Activation { squad: enemy },
        );
        world.squad_mut(enemy).unwrap().activation = Some(zone);
        world.spawn_squad(Faction::Player, Vec2::ZERO, Frame::View, 0);

        world.sweep();
        assert!(world.squad(enemy).unwrap().armed);
        assert!(world.trigger(zone).unwrap().body.destroyed);
    }

    #[test]
    fn test_activation_zone_ignores_enemies() {
        let mut world = world();
        let enemy = world.spawn_squad(Faction::Enemy, Vec2::ZERO, Frame::View, 2);
        let zone = world.attach_activation(enemy, Vec2::splat(100.0)).unwrap();
        world.sweep();
        assert!(!world.squad(enemy).unwrap().armed);
        assert!(world.trigger(zone).unwrap().interactive);
    }

    #[test]
    fn test_direct_contact_arms_enemy() {
        let mut world = world();
        let enemy = world.spawn_squad(Faction::Enemy, Vec2::new(5.0, 0.0), Frame::View, 0);
        world.spawn_squad(Faction::Player, Vec2::new(-5.0, 0.0), Frame::View, 0);
        assert_eq!(world.sweep(), 1);
        assert!(world.squad(enemy).unwrap().armed);
    }

    #[test]
    fn test_destroyed_squad_releases_roster() {
        let mut world = world();
        let squad = world.spawn_squad(Faction::Enemy, Vec2::ZERO, Frame::Lane, 3);
        let zone = world.attach_activation(squad, Vec2::splat(100.0)).unwrap();
        world.mark_for_destroy(squad);
        world.mark_for_destroy(squad);
        assert_eq!(world.prune(), 5);
        assert!(world.registry().is_empty());
        assert!(world.trigger(zone).is_none());
        assert_eq!(world.faction_of(squad), None);
    }

    #[test]
    fn test_marked_entity_gets_no_callbacks_after_prune() {
        let mut world = world();
        let squad = world.spawn_squad(Faction::Player, Vec2::ZERO, Frame::View, 10);
        let gate =
            world.spawn_gate(Vec2::ZERO, Vec2::splat(100.0), Frame::View, GateEffect::Add(5.0));
        world.mark_for_destroy(gate);
        world.prune();
        assert!(!world.registry().contains(gate));
        assert!(world.sweep() > 0);
        assert_eq!(world.squad(squad).unwrap().cur_soldiers(), 10);
    }

    #[test]
    fn test_lane_frame_resolves_through_offset() {
        let mut world = world();
        let squad = world.spawn_squad(Faction::Player, Vec2::new(0.0, 500.0), Frame::View, 0);
        let gate = world.spawn_gate(
            Vec2::new(0.0, -100.0),
            Vec2::splat(50.0),
            Frame::Lane,
            GateEffect::Add(3.0),
        );

        world.sweep();
        assert!(world.trigger(gate).unwrap().interactive);

        world.set_lane_offset(Vec2::new(0.0, 600.0));
        world.sweep();
        assert_eq!(world.squad(squad).unwrap().cur_soldiers(), 3);
    }

    #[test]
    fn test_clamp_zeroes_horizontal_accel() {
        let mut world = world();
        let squad = world.spawn_squad(Faction::Player, Vec2::new(100.0, 0.0), Frame::View, 2);
        let roster = world.squad(squad).unwrap().roster.clone();
        {
            let s = world.soldier_mut(roster[0]).unwrap();
            s.body.pos.x = 10.0;
            s.accel = Vec2::new(-4.0, 2.0);
        }
        {
            let s = world.soldier_mut(roster[1]).unwrap();
            s.body.pos.x = 900.0;
            s.accel = Vec2::new(4.0, 2.0);
        }
        world.clamp_soldiers_x(squad, 50.0, 150.0);
        let a = world.soldier(roster[0]).unwrap();
        let b = world.soldier(roster[1]).unwrap();
        assert_eq!((a.body.pos.x, a.accel), (50.0, Vec2::new(0.0, 2.0)));
        assert_eq!((b.body.pos.x, b.accel), (150.0, Vec2::new(0.0, 2.0)));
    }

    proptest! {
        #[test]
        fn roster_matches_count(values in proptest::collection::vec(-20i64..60, 1..12)) {
            let mut world = world();
            let squad = world.spawn_squad(Faction::Player, Vec2::ZERO, Frame::View, 0);
            for value in values {
                let size = world.set_cur_soldiers(squad, value).unwrap();
                prop_assert_eq!(size, value.max(0) as usize);
                prop_assert_eq!(world.squad(squad).unwrap().roster.len(), size);
                world.prune();
                prop_assert_eq!(world.registry().len(), live_entities(&world));
            }
        }
    }
}
