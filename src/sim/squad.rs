//! Squads and their soldiers
//!
//! A squad owns an ordered roster of soldier ids (spawn order) and a target
//! point the soldiers converge on. The target itself has inertia: the squad
//! acceleration is damped and applied to it every frame. Roster size changes go
//! through `World::set_cur_soldiers`, which spawns and destroys soldiers.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Body, Boundary, EntityId, Facing, Faction, Frame};
use super::steering::{integrate, seek};

/// A single unit of a squad
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Soldier {
    pub body: Body,
    pub accel: Vec2,
    pub mass: f32,
    /// Owning squad. A lookup link only; the squad may be gone.
    pub squad: EntityId,
    pub facing: Facing,
}

impl Soldier {
    pub fn new(
        id: EntityId,
        pos: Vec2,
        size: f32,
        mass: f32,
        squad: EntityId,
        frame: Frame,
    ) -> Self {
        debug_assert!(mass > 0.0, "soldier mass must be positive");
        Self {
            body: Body::new(id, pos, Boundary::centered(Vec2::splat(size)), frame),
            accel: Vec2::ZERO,
            mass,
            squad,
            facing: Facing::Forward,
        }
    }

    /// Seek the squad target, then damp and integrate
    pub fn advance(
        &mut self,
        target: Vec2,
        seek_speed: f32,
        damping: f32,
        delta: f32,
        facing_threshold: f32,
    ) {
        debug_assert!(self.body.is_live(), "advancing destroyed soldier {:?}", self.body.id);
        self.accel += seek(self.body.pos, target, seek_speed);
        integrate(&mut self.body.pos, &mut self.accel, damping, delta);
        self.facing = Facing::from_accel(self.accel.x, facing_threshold);
    }

    /// Collision response: get pushed away from the collider, scaled by its mass
    pub fn absorb_push(&mut self, push: Vec2, collider_mass: f32) {
        self.accel += push * collider_mass;
    }
}

/// A group of soldiers steering toward a shared target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Squad {
    /// Boundary follows the target
    pub body: Body,
    pub faction: Faction,
    /// Soldier ids in spawn order
    pub roster: Vec<EntityId>,
    pub target: Vec2,
    pub accel: Vec2,
    /// Enemy squads turn aggressive once armed; player squads are always armed
    pub armed: bool,
    /// Zone that arms this squad on first player contact
    pub activation: Option<EntityId>,
    pub facing: Facing,
}

impl Squad {
    pub fn new(id: EntityId, faction: Faction, target: Vec2, size: f32, frame: Frame) -> Self {
        Self {
            body: Body::new(id, target, Boundary::centered(Vec2::splat(size)), frame),
            faction,
            roster: Vec::new(),
            target,
            accel: Vec2::ZERO,
            armed: faction == Faction::Player,
            activation: None,
            facing: Facing::Forward,
        }
    }

    /// Number of soldiers in the roster
    #[inline]
    pub fn cur_soldiers(&self) -> usize {
        self.roster.len()
    }

    /// Damp the squad acceleration and move the target; the boundary follows
    pub fn advance_target(&mut self, damping: f32, delta: f32, facing_threshold: f32) {
        integrate(&mut self.target, &mut self.accel, damping, delta);
        self.body.pos = self.target;
        self.facing = Facing::from_accel(self.accel.x, facing_threshold);
    }

    /// Move `soldier` to the roster tail, keeping the order of the others
    pub(crate) fn move_to_tail(&mut self, soldier: EntityId) -> bool {
        match self.roster.iter().position(|&id| id == soldier) {
            Some(pos) => {
                let id = self.roster.remove(pos);
                self.roster.push(id);
                true
            }
            None => false,
        }
    }
}
