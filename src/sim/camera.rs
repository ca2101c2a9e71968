//! Scrolling camera
//!
//! The camera is just a screen-space offset. Every tick it is recomputed from
//! the tracked entity's current world position so the entity lands on the
//! window center; it is never accumulated. World positions are never touched,
//! `apply` only derives screen positions.

use glam::Vec2;

use crate::Point2D;

/// How the camera reacts to the tracked entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraMode {
    /// Keep the tracked entity centered
    #[default]
    Follow,
    /// Zero offset; world and screen coordinates coincide
    Fixed,
}

impl CameraMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CameraMode::Follow => "follow",
            CameraMode::Fixed => "fixed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "follow" => Some(CameraMode::Follow),
            "fixed" | "static" => Some(CameraMode::Fixed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Camera {
    pub mode: CameraMode,
    /// Current world-to-screen offset
    offset: Vec2,
    /// World size to keep the view inside, if clamping is enabled
    bounds: Option<Vec2>,
}

impl Camera {
    pub fn new(mode: CameraMode) -> Self {
        Self {
            mode,
            offset: Vec2::ZERO,
            bounds: None,
        }
    }

    /// Clamp the view to `[0, world_size]`.
    ///
    /// Off by default: an unclamped camera happily shows the void past the
    /// edge of a finite background. With clamping the tracked entity is no
    /// longer guaranteed to sit on the window center near the edges.
    pub fn with_bounds(mut self, world_size: Vec2) -> Self {
        self.bounds = Some(world_size);
        self
    }

    /// Recompute the offset from the tracked entity's position
    pub fn update(&mut self, tracked: Point2D, half_viewport: Vec2) {
        self.offset = match self.mode {
            CameraMode::Follow => half_viewport - tracked,
            CameraMode::Fixed => Vec2::ZERO,
        };

        if let Some(world) = self.bounds {
            // Viewport spans [-offset, -offset + 2 * half]
            let min = (half_viewport * 2.0 - world).min(Vec2::ZERO);
            self.offset = self.offset.clamp(min, Vec2::ZERO);
        }
    }

    #[inline]
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Screen position of a world position
    #[inline]
    pub fn apply(&self, world: Point2D) -> Point2D {
        world + self.offset
    }
}
