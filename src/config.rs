//! Tunables and level configuration
//!
//! Both are plain serde data so hosts can ship them as JSON. Level layout is
//! data, not code: a lane is an ordered list of tiles, each carrying the gates
//! and enemy squads placed on it in fractional tile coordinates.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Errors raised while loading or validating configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Malformed JSON
    Parse(serde_json::Error),
    /// Reading a level file failed
    Io(std::io::Error),
    InvalidView { width: f32, height: f32 },
    InvalidTile { index: usize, reason: &'static str },
    InvalidBorders { left: f32, right: f32 },
    InvalidTunable { name: &'static str, value: f32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid config JSON: {err}"),
            Self::Io(err) => write!(f, "cannot read config: {err}"),
            Self::InvalidView { width, height } => {
                write!(f, "view size must be positive, got {width}x{height}")
            }
            Self::InvalidTile { index, reason } => write!(f, "tile {index}: {reason}"),
            Self::InvalidBorders { left, right } => {
                write!(f, "borders must satisfy 0 <= left < right <= 1, got [{left}, {right}]")
            }
            Self::InvalidTunable { name, value } => {
                write!(f, "tunable {name} out of range: {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

/// Gameplay tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tunables {
    // === Steering ===
    /// Soldiers seeking their squad target
    pub soldier_seek_speed: f32,
    /// Player squad target seeking the pointer
    pub squad_seek_speed: f32,
    pub soldier_damping: f32,
    pub squad_damping: f32,

    // === Units ===
    pub soldier_mass: f32,
    pub soldier_size: f32,
    pub spawn_jitter: f32,

    // === Lane ===
    pub scroll_speed: f32,
    pub gate_height: f32,
    pub activation_height: f32,

    // === Presentation ===
    pub facing_threshold: f32,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            soldier_seek_speed: SOLDIER_SEEK_SPEED,
            squad_seek_speed: SQUAD_SEEK_SPEED,
            soldier_damping: SOLDIER_DAMPING,
            squad_damping: SQUAD_DAMPING,

            soldier_mass: SOLDIER_MASS,
            soldier_size: SOLDIER_SIZE,
            spawn_jitter: SPAWN_JITTER,

            scroll_speed: SCROLL_SPEED,
            gate_height: GATE_HEIGHT,
            activation_height: ACTIVATION_HEIGHT,

            facing_threshold: FACING_THRESHOLD,
        }
    }
}

impl Tunables {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tunables: Self = serde_json::from_str(json)?;
        tunables.validate()?;
        Ok(tunables)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("soldier_mass", self.soldier_mass),
            ("soldier_size", self.soldier_size),
            ("gate_height", self.gate_height),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::InvalidTunable { name, value });
            }
        }

        let non_negative = [
            ("soldier_seek_speed", self.soldier_seek_speed),
            ("squad_seek_speed", self.squad_seek_speed),
            ("spawn_jitter", self.spawn_jitter),
            ("scroll_speed", self.scroll_speed),
            ("activation_height", self.activation_height),
            ("facing_threshold", self.facing_threshold),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0) {
                return Err(ConfigError::InvalidTunable { name, value });
            }
        }

        for (name, value) in [
            ("soldier_damping", self.soldier_damping),
            ("squad_damping", self.squad_damping),
        ] {
            if !(value > 0.0 && value < 1.0) {
                return Err(ConfigError::InvalidTunable { name, value });
            }
        }
        Ok(())
    }
}

/// Kind of object placed on a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// Gate multiplying the squad size by `value`
    Multiplier,
    /// Gate adding `value` soldiers (negative removes)
    Increase,
    /// Enemy squad of `value` soldiers
    Enemy,
    /// Anything else; skipped when the lane is built
    #[serde(other)]
    Unknown,
}

/// An object placed on a tile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedObject {
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    pub value: f32,
    /// Fraction of the tile size; `y` counts up from the tile bottom
    pub pos: Vec2,
    /// Fraction of the tile width (gates only)
    #[serde(default)]
    pub width: f32,
}

impl PlacedObject {
    pub fn new(kind: ObjectKind, value: f32, pos: Vec2, width: f32) -> Self {
        Self {
            kind,
            value,
            pos,
            width,
        }
    }
}

/// One background segment of the lane
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileConfig {
    /// Background reference for the renderer
    pub background: String,
    /// Tile size in lane units
    pub size: Vec2,
    #[serde(default)]
    pub objects: Vec<PlacedObject>,
}

/// Declarative lane description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaneConfig {
    /// Visible area in lane units; the player lives in this space
    pub view: Vec2,
    /// Horizontal containment for player soldiers, as fractions of the view width
    pub borders: [f32; 2],
    /// Starting size of the player squad
    #[serde(default = "default_player_soldiers")]
    pub player_soldiers: u32,
    pub tiles: Vec<TileConfig>,
}

fn default_player_soldiers() -> u32 {
    1
}

impl LaneConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.view.x > 0.0 && self.view.y > 0.0) {
            return Err(ConfigError::InvalidView {
                width: self.view.x,
                height: self.view.y,
            });
        }
        let [left, right] = self.borders;
        if !(0.0 <= left && left < right && right <= 1.0) {
            return Err(ConfigError::InvalidBorders { left, right });
        }
        for (index, tile) in self.tiles.iter().enumerate() {
            if !(tile.size.x > 0.0 && tile.size.y > 0.0) {
                return Err(ConfigError::InvalidTile {
                    index,
                    reason: "size must be positive",
                });
            }
        }
        Ok(())
    }

    /// Sum of tile heights
    pub fn length(&self) -> f32 {
        self.tiles.iter().map(|t| t.size.y).sum()
    }

    /// Horizontal band the host should clamp the pointer to
    pub fn pointer_band(&self) -> (f32, f32) {
        (self.view.x * self.borders[0], self.view.x * self.borders[1])
    }
}

impl Default for LaneConfig {
    /// Demo level: start tile, two road tiles, end tile
    fn default() -> Self {
        use ObjectKind::*;

        let size = Vec2::new(600.0, 900.0);
        let tile = |background: &str, objects: Vec<PlacedObject>| TileConfig {
            background: background.to_string(),
            size,
            objects,
        };

        Self {
            view: Vec2::new(600.0, 1000.0),
            borders: [0.2, 0.8],
            player_soldiers: 1,
            tiles: vec![
                tile(
                    "start",
                    vec![
                        PlacedObject::new(Multiplier, 0.5, Vec2::new(0.75, 1.0), 0.5),
                        PlacedObject::new(Multiplier, 2.0, Vec2::new(0.75, 0.75), 0.5),
                    ],
                ),
                tile(
                    "way",
                    vec![
                        PlacedObject::new(Multiplier, 2.0, Vec2::new(0.25, 0.0), 0.5),
                        PlacedObject::new(Enemy, 40.0, Vec2::new(0.5, 0.5), 0.0),
                        PlacedObject::new(Multiplier, 2.0, Vec2::new(0.25, 1.0), 0.5),
                    ],
                ),
                tile(
                    "way",
                    vec![
                        PlacedObject::new(Increase, 50.0, Vec2::new(0.25, 0.0), 0.5),
                        PlacedObject::new(Increase, -20.0, Vec2::new(0.25, 0.5), 0.5),
                        PlacedObject::new(Increase, 10.0, Vec2::new(0.25, 1.0), 0.5),
                    ],
                ),
                tile(
                    "end",
                    vec![
                        PlacedObject::new(Multiplier, 2.0, Vec2::new(0.75, 0.0), 0.5),
                        PlacedObject::new(Multiplier, 2.0, Vec2::new(0.75, 0.5), 0.5),
                    ],
                ),
            ],
        }
    }
}
