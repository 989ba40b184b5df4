//! One-shot triggers and gates
//!
//! A trigger runs its action on the first qualifying contact, then goes
//! non-interactive and marks itself for destruction. Later contacts are
//! ignored even if the prune pass has not removed it yet.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Body, Boundary, EntityId, EntityKind, Frame};

/// Squad size change applied by a gate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GateEffect {
    Multiply(f32),
    Add(f32),
}

impl GateEffect {
    /// New soldier count, rounded to the nearest integer. May be negative;
    /// the roster setter clamps.
    pub fn apply(self, count: usize) -> i64 {
        let count = count as f32;
        let value = match self {
            GateEffect::Multiply(factor) => count * factor,
            GateEffect::Add(delta) => count + delta,
        };
        value.round() as i64
    }

    /// Label painted on the gate
    pub fn label(self) -> String {
        match self {
            GateEffect::Multiply(factor) if factor >= 1.0 => format!("* {factor}"),
            GateEffect::Multiply(factor) => format!("/ {}", 1.0 / factor),
            GateEffect::Add(delta) if delta >= 0.0 => format!("+{delta}"),
            GateEffect::Add(delta) => format!("{delta}"),
        }
    }
}

/// What a trigger does when touched
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TriggerAction {
    /// Resize the touching squad; soldiers and other entities pass through
    Gate(GateEffect),
    /// Arm the given enemy squad on first player contact
    Activation { squad: EntityId },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trigger {
    pub body: Body,
    /// True until the trigger has fired
    pub interactive: bool,
    pub action: TriggerAction,
}

impl Trigger {
    pub fn new(id: EntityId, pos: Vec2, size: Vec2, frame: Frame, action: TriggerAction) -> Self {
        Self {
            body: Body::new(id, pos, Boundary::centered(size), frame),
            interactive: true,
            action,
        }
    }

    pub fn gate(id: EntityId, pos: Vec2, size: Vec2, frame: Frame, effect: GateEffect) -> Self {
        Self::new(id, pos, size, frame, TriggerAction::Gate(effect))
    }

    pub fn kind(&self) -> EntityKind {
        match self.action {
            TriggerAction::Gate(_) => EntityKind::Gate,
            TriggerAction::Activation { .. } => EntityKind::Trigger,
        }
    }

    /// Consume the trigger after its action reported success
    pub fn fire(&mut self) {
        self.interactive = false;
        self.body.mark_for_destroy();
    }

    pub fn label(&self) -> Option<String> {
        match self.action {
            TriggerAction::Gate(effect) => Some(effect.label()),
            TriggerAction::Activation { .. } => None,
        }
    }
}
