//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One discrete step per tick, no elapsed-time integration
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies

pub mod anim;
pub mod camera;
pub mod collision;
pub mod physics;
pub mod state;
pub mod steering;
pub mod tick;
pub mod tilemap;

pub use anim::{Animation, Clip, SpriteSet};
pub use camera::{Camera, CameraMode};
pub use collision::Rect;
pub use physics::{Intent, LiftModel, MotionState, PhysicsBody, PhysicsStep, Vertical};
pub use state::{
    Enemy, Entity, GameEvent, GamePhase, GameState, Item, Player, Projectile, Sheet, Sheets,
    TickContext, Updatable, View,
};
pub use steering::{Steer, step, steer};
pub use tick::{TickInput, tick};
pub use tilemap::{FloorCheck, LevelLayout, TileCode, TileMap};
