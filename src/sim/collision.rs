//! Axis-aligned rectangle overlap
//!
//! Entities collide by their image rectangles. Edges that merely touch do
//! not count, so a sprite standing exactly on a tile edge is not inside it.

use glam::Vec2;

use crate::Point2D;

/// Axis-aligned rectangle, top-left origin, y down
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub pos: Point2D,
    pub size: Vec2,
}

impl Rect {
    pub fn new(pos: Point2D, size: Vec2) -> Self {
        Self { pos, size }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    #[inline]
    pub fn bottom_left(&self) -> Point2D {
        Vec2::new(self.left(), self.bottom())
    }

    #[inline]
    pub fn bottom_right(&self) -> Point2D {
        Vec2::new(self.right(), self.bottom())
    }

    /// Strict overlap test; empty rectangles never collide
    pub fn collides(&self, other: &Rect) -> bool {
        if self.size.x <= 0.0 || self.size.y <= 0.0 || other.size.x <= 0.0 || other.size.y <= 0.0
        {
            return false;
        }
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: f32, y: f32, w: f32, h: f32) -> Rect {
        Rect::new(Vec2::new(x, y), Vec2::new(w, h))
    }

    #[test]
    fn test_overlap() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        assert!(a.collides(&rect(5.0, 5.0, 10.0, 10.0)));
        assert!(a.collides(&rect(2.0, 2.0, 2.0, 2.0)));
        assert!(!a.collides(&rect(20.0, 0.0, 5.0, 5.0)));
    }

    #[test]
    fn test_touching_edges_do_not_collide() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        assert!(!a.collides(&rect(10.0, 0.0, 10.0, 10.0)));
        assert!(!a.collides(&rect(0.0, 10.0, 10.0, 10.0)));
    }

    #[test]
    fn test_empty_rect_never_collides() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        assert!(!a.collides(&rect(5.0, 5.0, 0.0, 3.0)));
    }

    #[test]
    fn test_edges() {
        let r = rect(3.0, 4.0, 10.0, 20.0);
        assert_eq!(r.bottom_left(), Vec2::new(3.0, 24.0));
        assert_eq!(r.bottom_right(), Vec2::new(13.0, 24.0));
    }
}
