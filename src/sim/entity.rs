//! Collidable entity basics
//!
//! Every collidable carries a [`Body`]: an id, a position, a rectangular
//! boundary relative to that position, the coordinate frame it lives in and a
//! destroyed flag. Kind-specific data (soldier mass, trigger action...) lives
//! in the owning struct.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Stable entity handle. Allocated from a monotonic counter, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Discriminant used by contact handlers instead of runtime type checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Squad,
    Soldier,
    Gate,
    Trigger,
}

/// Which side a squad (and its soldiers) fights for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Faction {
    Player,
    Enemy,
}

impl Faction {
    pub fn opposes(self, other: Faction) -> bool {
        self != other
    }
}

/// Coordinate frame of an entity position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Frame {
    /// Fixed to the screen (player squad and soldiers)
    #[default]
    View,
    /// Fixed to the scrolling lane (gates, enemies); shifted by the lane offset
    Lane,
}

/// Facing tag handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    Left,
    Right,
    #[default]
    Forward,
}

impl Facing {
    /// Derive facing from horizontal acceleration
    pub fn from_accel(accel_x: f32, threshold: f32) -> Self {
        if accel_x > threshold {
            Facing::Right
        } else if accel_x < -threshold {
            Facing::Left
        } else {
            Facing::Forward
        }
    }
}

/// Axis-aligned rectangle in view space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }
}

/// Collision boundary relative to the entity origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    /// Offset of the top-left corner from the entity position
    pub offset: Vec2,
    pub size: Vec2,
}

impl Boundary {
    /// Boundary centred on the entity position
    pub fn centered(size: Vec2) -> Self {
        Self {
            offset: -size * 0.5,
            size,
        }
    }
}

/// Shared state of every collidable entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub id: EntityId,
    pub pos: Vec2,
    pub boundary: Boundary,
    pub frame: Frame,
    /// Set by `mark_for_destroy`; the entity is removed on the next prune pass
    pub destroyed: bool,
}

impl Body {
    pub fn new(id: EntityId, pos: Vec2, boundary: Boundary, frame: Frame) -> Self {
        Self {
            id,
            pos,
            boundary,
            frame,
            destroyed: false,
        }
    }

    /// Position in view space given the current lane offset
    #[inline]
    pub fn view_pos(&self, lane_offset: Vec2) -> Vec2 {
        match self.frame {
            Frame::View => self.pos,
            Frame::Lane => self.pos + lane_offset,
        }
    }

    /// Resolved boundary in view space
    pub fn view_rect(&self, lane_offset: Vec2) -> Rect {
        Rect::new(
            self.view_pos(lane_offset) + self.boundary.offset,
            self.boundary.size,
        )
    }

    pub fn mark_for_destroy(&mut self) {
        self.destroyed = true;
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        !self.destroyed
    }
}
