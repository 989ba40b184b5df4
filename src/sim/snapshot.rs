//! Read-only views for the renderer and UI

use glam::Vec2;
use serde::Serialize;

use super::entity::{EntityId, EntityKind, Facing, Faction, Rect};
use super::lane::LaneState;
use super::world::World;

/// One live entity, resolved to view space
#[derive(Debug, Clone, Serialize)]
pub struct EntityView {
    pub id: EntityId,
    pub kind: EntityKind,
    pub faction: Option<Faction>,
    pub pos: Vec2,
    pub rect: Rect,
    pub facing: Facing,
    /// Gate label, e.g. `* 2` or `-20`
    pub label: Option<String>,
}

/// Everything a host needs to draw one frame
#[derive(Debug, Clone, Serialize)]
pub struct LaneSnapshot {
    pub state: LaneState,
    pub scroll: f32,
    pub length: f32,
    /// Lane-to-view offset; add to lane-space positions such as tile tops
    pub offset: Vec2,
    pub squad_size: usize,
    pub entities: Vec<EntityView>,
}

impl World {
    /// Views of every live entity, in id order per kind
    pub fn entity_views(&self) -> Vec<EntityView> {
        let offset = self.lane_offset();
        let mut views = Vec::with_capacity(
            self.squads().len() + self.soldiers().len() + self.triggers().len(),
        );

        for squad in self.squads().iter().filter(|s| s.body.is_live()) {
            views.push(EntityView {
                id: squad.body.id,
                kind: EntityKind::Squad,
                faction: Some(squad.faction),
                pos: squad.body.view_pos(offset),
                rect: squad.body.view_rect(offset),
                facing: squad.facing,
                label: None,
            });
        }
        for soldier in self.soldiers().iter().filter(|s| s.body.is_live()) {
            views.push(EntityView {
                id: soldier.body.id,
                kind: EntityKind::Soldier,
                faction: self.faction_of(soldier.body.id),
                pos: soldier.body.view_pos(offset),
                rect: soldier.body.view_rect(offset),
                facing: soldier.facing,
                label: None,
            });
        }
        for trigger in self.triggers().iter().filter(|t| t.body.is_live()) {
            views.push(EntityView {
                id: trigger.body.id,
                kind: trigger.kind(),
                faction: None,
                pos: trigger.body.view_pos(offset),
                rect: trigger.body.view_rect(offset),
                facing: Facing::Forward,
                label: trigger.label(),
            });
        }
        views
    }
}
