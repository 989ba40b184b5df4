//! Simulation module
//!
//! All gameplay logic lives here:
//! - Single writer: one `Lane::update` runs to completion before the next
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod entity;
pub mod lane;
pub mod registry;
pub mod snapshot;
pub mod squad;
pub mod steering;
pub mod trigger;
pub mod world;

pub use collision::{overlaps, push_vector};
pub use entity::{Body, Boundary, EntityId, EntityKind, Facing, Faction, Frame, Rect};
pub use lane::{Lane, LaneState, TileSpan};
pub use registry::CollisionRegistry;
pub use snapshot::{EntityView, LaneSnapshot};
pub use squad::{Soldier, Squad};
pub use steering::{integrate, seek};
pub use trigger::{GateEffect, Trigger, TriggerAction};
pub use world::World;
