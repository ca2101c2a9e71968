//! Snowdrift - camera-relative movement and tile platformer logic
//!
//! Core modules:
//! - `sim`: Deterministic frame-stepped simulation (steering, camera, physics, tile map)
//! - `assets`: Animation clip tables, preloaded frame arena, level files
//! - `config`: Startup configuration from `key=value` tokens
//! - `render`: Draw list handed to the external render service
//! - `audio`: Fire-and-forget sound effects
//! - `game`: Level loading and progression on top of the simulation

pub mod assets;
pub mod audio;
pub mod config;
pub mod error;
pub mod game;
pub mod render;
pub mod sim;

pub use config::{Config, GameMode};
pub use error::{AssetLoadError, ConfigError, Error};
pub use game::Game;

use glam::Vec2;

/// World/screen coordinate
pub type Point2D = Vec2;

/// Game tuning constants
pub mod consts {
    /// Distance below which a steered entity counts as arrived
    pub const ARRIVAL_THRESHOLD: f32 = 10.0;
    /// Steering speed is `distance / STEER_EASE_DIVISOR` until clamped
    pub const STEER_EASE_DIVISOR: f32 = 10.0;
    /// Player steering speed cap (top-down)
    pub const PLAYER_MAX_SPEED: f32 = 5.0;

    /// Horizontal walk delta per tick (platformer)
    pub const WALK_DELTA: f32 = 4.0;
    /// Vertical speed at jump start
    pub const INITIAL_JUMP_SPEED: i32 = 7;
    /// Downward movement per falling tick
    pub const GRAVITY: f32 = 5.0;

    /// Projectile speed per tick
    pub const PROJECTILE_SPEED: f32 = 10.0;

    /// Default top-down world bounds
    pub const WORLD_WIDTH: f32 = 1920.0;
    pub const WORLD_HEIGHT: f32 = 1080.0;

    /// Sound effect volume
    pub const SFX_VOLUME: f32 = 0.5;
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Point2D, b: Point2D) -> f32 {
    let d = b - a;
    (d.x * d.x + d.y * d.y).sqrt()
}

/// Angle (radians) of the vector from `from` to `to`, measured from +x.
///
/// `atan2(0, 0)` is 0, so coincident points give angle 0.
#[inline]
pub fn angle_between(from: Point2D, to: Point2D) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Unit vector for an angle
#[inline]
pub fn angle_to_vector(angle: f32) -> Vec2 {
    let (s, c) = angle.sin_cos();
    Vec2::new(c, s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_pythagorean() {
        assert_eq!(distance(Vec2::new(0.0, 0.0), Vec2::new(3.0, 4.0)), 5.0);
        assert_eq!(distance(Vec2::new(3.0, 4.0), Vec2::new(0.0, 0.0)), 5.0);
    }

    #[test]
    fn test_angle_of_coincident_points_is_zero() {
        let p = Vec2::new(100.0, 100.0);
        assert_eq!(angle_between(p, p), 0.0);
    }

    #[test]
    fn test_angle_quadrants() {
        use std::f32::consts::FRAC_PI_2;
        let o = Vec2::ZERO;
        assert!((angle_between(o, Vec2::new(0.0, 1.0)) - FRAC_PI_2).abs() < 1e-6);
        assert!((angle_between(o, Vec2::new(-1.0, 0.0)).abs() - std::f32::consts::PI).abs() < 1e-6);
    }
}
