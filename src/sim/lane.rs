//! Lane progression controller
//!
//! Builds the world from a [`LaneConfig`], owns the player and enemy squads and
//! runs the per-frame update while the lane is in the `Way` state.
//!
//! Frame order: enemies move, the lane scrolls, the player squad moves, marked
//! entities are pruned, the collision sweep runs, player soldiers are clamped
//! to the lane borders, and finally the player squad is steered toward the
//! pointer for the next frame.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{EntityId, Faction, Frame};
use super::snapshot::LaneSnapshot;
use super::trigger::GateEffect;
use super::world::World;
use crate::config::{ConfigError, LaneConfig, ObjectKind, Tunables};
use crate::consts::SCROLL_EPSILON;

/// Lane progression state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaneState {
    /// Built, waiting for the start command
    #[default]
    Start,
    /// Scrolling; the only state that advances the simulation
    Way,
    /// Frozen until resumed
    Pause,
    /// Terminal
    End,
}

/// Placement of one background tile in lane space
#[derive(Debug, Clone, Serialize)]
pub struct TileSpan {
    pub background: String,
    /// Lane-space y of the tile's top edge
    pub top: f32,
    pub size: Vec2,
}

pub struct Lane {
    world: World,
    state: LaneState,
    scroll: f32,
    length: f32,
    view: Vec2,
    /// Absolute x range for player soldiers
    borders: (f32, f32),
    tiles: Vec<TileSpan>,
    player: EntityId,
    enemies: Vec<EntityId>,
    /// Last pointer position reported by the host, in view space
    pointer: Vec2,
}

impl Lane {
    /// Build the lane and everything placed on it
    pub fn new(config: &LaneConfig, tunables: Tunables, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        tunables.validate()?;

        let gate_height = tunables.gate_height;
        let activation = Vec2::new(config.view.x, tunables.activation_height);
        let mut world = World::new(tunables, seed);
        let mut tiles = Vec::with_capacity(config.tiles.len());
        let mut enemies = Vec::new();
        let mut gates = 0;

        let mut tile_offset = 0.0;
        for (index, tile) in config.tiles.iter().enumerate() {
            for object in &tile.objects {
                let pos = Vec2::new(
                    tile.size.x * object.pos.x,
                    -tile.size.y * object.pos.y - tile_offset,
                );
                let gate_size = Vec2::new(tile.size.x * object.width, gate_height);
                match object.kind {
                    ObjectKind::Multiplier => {
                        let effect = GateEffect::Multiply(object.value);
                        world.spawn_gate(pos, gate_size, Frame::Lane, effect);
                        gates += 1;
                    }
                    ObjectKind::Increase => {
                        let effect = GateEffect::Add(object.value);
                        world.spawn_gate(pos, gate_size, Frame::Lane, effect);
                        gates += 1;
                    }
                    ObjectKind::Enemy => {
                        let squad = world.spawn_squad(
                            Faction::Enemy,
                            pos,
                            Frame::Lane,
                            object.value.round() as i64,
                        );
                        world.attach_activation(squad, activation);
                        enemies.push(squad);
                    }
                    ObjectKind::Unknown => {
                        log::warn!("Tile {}: skipping object of unknown type", index);
                    }
                }
            }

            tiles.push(TileSpan {
                background: tile.background.clone(),
                top: -(tile_offset + tile.size.y),
                size: tile.size,
            });
            tile_offset += tile.size.y;
        }

        let start = config.view * 0.5;
        let player = world.spawn_squad(
            Faction::Player,
            start,
            Frame::View,
            i64::from(config.player_soldiers),
        );

        let mut lane = Self {
            world,
            state: LaneState::Start,
            scroll: 0.0,
            length: tile_offset,
            view: config.view,
            borders: config.pointer_band(),
            tiles,
            player,
            enemies,
            pointer: start,
        };
        lane.world.set_lane_offset(lane.lane_offset());

        log::info!(
            "Lane built: {} tiles, length {}, {} gates, {} enemy squads",
            lane.tiles.len(),
            lane.length,
            gates,
            lane.enemies.len()
        );
        Ok(lane)
    }

    // --- Commands ---

    fn transition(&mut self, from: LaneState, to: LaneState) -> bool {
        if self.state != from {
            log::warn!("Ignoring {:?} -> {:?} while {:?}", from, to, self.state);
            return false;
        }
        log::info!("Lane {:?} -> {:?}", from, to);
        self.state = to;
        true
    }

    pub fn start(&mut self) -> bool {
        self.transition(LaneState::Start, LaneState::Way)
    }

    pub fn pause(&mut self) -> bool {
        self.transition(LaneState::Way, LaneState::Pause)
    }

    pub fn resume(&mut self) -> bool {
        self.transition(LaneState::Pause, LaneState::Way)
    }

    /// External end condition
    pub fn end(&mut self) -> bool {
        if self.state == LaneState::End {
            return false;
        }
        log::info!("Lane {:?} -> End", self.state);
        self.state = LaneState::End;
        true
    }

    /// Record the latest pointer position (view space). Last write wins.
    pub fn set_pointer(&mut self, pointer: Vec2) {
        self.pointer = pointer;
    }

    // --- Frame ---

    /// Advance the simulation by `delta` (frame-relative, not seconds)
    pub fn update(&mut self, delta: f32) {
        if self.state != LaneState::Way {
            return;
        }
        debug_assert!(delta.is_finite() && delta >= 0.0, "bad frame delta {delta}");

        let (scroll_speed, seek_speed) = {
            let t = self.world.tunables();
            (t.scroll_speed, t.squad_seek_speed)
        };

        // Enemy targets hold still in lane space; only their soldiers move
        for &enemy in &self.enemies {
            self.world.advance_squad(enemy, delta);
        }

        self.scroll = (self.scroll + scroll_speed * delta).min(self.length);
        self.world.set_lane_offset(self.lane_offset());

        self.world.advance_squad(self.player, delta);

        self.world.prune();
        self.world.sweep();

        let (left, right) = self.borders;
        self.world.clamp_soldiers_x(self.player, left, right);
        self.retire_defeated_enemies();

        self.world.steer_squad(self.player, self.pointer, seek_speed);

        if self.length - self.scroll <= SCROLL_EPSILON {
            self.scroll = self.length;
            log::info!("Lane end reached with {} soldiers", self.squad_size());
            self.state = LaneState::End;
        }
    }

    /// Armed enemy squads with no soldiers left are destroyed
    fn retire_defeated_enemies(&mut self) {
        let defeated: Vec<EntityId> = self
            .enemies
            .iter()
            .copied()
            .filter(|&id| {
                self.world
                    .squad(id)
                    .is_some_and(|s| s.armed && s.cur_soldiers() == 0)
            })
            .collect();
        for id in defeated {
            log::debug!("Enemy squad {:?} defeated", id);
            self.world.mark_for_destroy(id);
        }
        let world = &self.world;
        self.enemies.retain(|&id| world.is_live(id));
    }

    // --- Queries ---

    /// Offset from lane space to view space
    pub fn lane_offset(&self) -> Vec2 {
        Vec2::new(0.0, self.view.y + self.scroll)
    }

    pub fn state(&self) -> LaneState {
        self.state
    }

    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    pub fn player(&self) -> EntityId {
        self.player
    }

    pub fn enemies(&self) -> &[EntityId] {
        &self.enemies
    }

    pub fn tiles(&self) -> &[TileSpan] {
        &self.tiles
    }

    /// Player squad size for UI/score
    pub fn squad_size(&self) -> usize {
        self.world.squad(self.player).map_or(0, |s| s.cur_soldiers())
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn snapshot(&self) -> LaneSnapshot {
        LaneSnapshot {
            state: self.state,
            scroll: self.scroll,
            length: self.length,
            offset: self.lane_offset(),
            squad_size: self.squad_size(),
            entities: self.world.entity_views(),
        }
    }
}
