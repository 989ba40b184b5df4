//! Horde Run - gameplay core for a scrolling horde-runner
//!
//! Core modules:
//! - `sim`: Simulation (collision registry, steering, squads, triggers, lane progression)
//! - `config`: Data-driven tunables and lane/tile level descriptions
//!
//! Rendering, asset loading and input devices live in the host. The core only
//! consumes a pointer position, a per-frame delta and a [`config::LaneConfig`].

pub mod config;
pub mod sim;

pub use config::{ConfigError, LaneConfig, Tunables};
pub use sim::{Lane, LaneSnapshot, LaneState};

/// Default gameplay constants
pub mod consts {
    /// Steering constant for soldiers tracking their squad target
    pub const SOLDIER_SEEK_SPEED: f32 = 0.005;
    /// Steering constant for the player squad tracking the pointer
    pub const SQUAD_SEEK_SPEED: f32 = 0.05;

    /// Per-frame acceleration damping
    pub const SOLDIER_DAMPING: f32 = 0.9;
    pub const SQUAD_DAMPING: f32 = 0.99;

    /// Soldier defaults
    pub const SOLDIER_MASS: f32 = 0.1;
    pub const SOLDIER_SIZE: f32 = 20.0;
    /// Max spawn offset from the squad target, per axis
    pub const SPAWN_JITTER: f32 = 10.0;

    /// Lane scroll speed (units per unit delta)
    pub const SCROLL_SPEED: f32 = 3.0;
    /// Gate boundary height
    pub const GATE_HEIGHT: f32 = 100.0;
    /// Height of the zone that arms an enemy squad
    pub const ACTIVATION_HEIGHT: f32 = 400.0;

    /// |accel.x| above this switches the facing tag away from forward
    pub const FACING_THRESHOLD: f32 = 1.5;

    /// Remaining scroll below this counts as the end of the lane
    pub const SCROLL_EPSILON: f32 = 1e-3;
}
