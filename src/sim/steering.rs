//! Bounded-speed steering toward a target
//!
//! Speed eases out linearly as the entity closes in: `distance / 10`, capped
//! at the caller's max speed. Inside the arrival threshold the position is
//! left alone.

use glam::Vec2;

use crate::consts::{ARRIVAL_THRESHOLD, STEER_EASE_DIVISOR};
use crate::{Point2D, angle_between, angle_to_vector, distance};

/// Result of one steering step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Steer {
    /// New position
    pub pos: Point2D,
    /// Distance to the target before the step
    pub distance: f32,
    /// Within the arrival threshold; position unchanged
    pub arrived: bool,
}

/// Advance `current` one tick toward `target`
pub fn steer(current: Point2D, target: Point2D, max_speed: f32) -> Steer {
    let distance = distance(current, target);
    if distance <= ARRIVAL_THRESHOLD {
        return Steer {
            pos: current,
            distance,
            arrived: true,
        };
    }

    let speed = max_speed.min(distance / STEER_EASE_DIVISOR);
    let dir = angle_to_vector(angle_between(current, target));
    Steer {
        pos: current + dir * speed,
        distance,
        arrived: false,
    }
}

/// New position after one step toward `target`
#[inline]
pub fn step(current: Point2D, target: Point2D, max_speed: f32) -> Point2D {
    steer(current, target, max_speed).pos
}

/// World-space target for a window-space mouse position.
///
/// The tracked entity is drawn at the window center, so the mouse's offset
/// from the center is the offset from the entity in world space.
#[inline]
pub fn mouse_target(mouse: Vec2, half_window: Vec2, entity_pos: Point2D) -> Point2D {
    mouse - half_window + entity_pos
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::PLAYER_MAX_SPEED;
    use proptest::prelude::*;

    #[test]
    fn test_zero_distance_is_unchanged() {
        let p = Vec2::new(100.0, 100.0);
        let s = steer(p, p, PLAYER_MAX_SPEED);
        assert_eq!(s.pos, p);
        assert!(s.arrived);
        assert!(s.pos.x.is_finite() && s.pos.y.is_finite());
    }

    #[test]
    fn test_far_target_moves_at_max_speed() {
        let s = steer(Vec2::ZERO, Vec2::new(500.0, 0.0), 5.0);
        assert!((s.pos.x - 5.0).abs() < 1e-5);
        assert!(s.pos.y.abs() < 1e-5);
        assert!(!s.arrived);
    }

    #[test]
    fn test_near_target_eases_out() {
        // distance 20 -> speed 2
        let s = steer(Vec2::ZERO, Vec2::new(0.0, 20.0), 5.0);
        assert!(s.pos.x.abs() < 1e-5);
        assert!((s.pos.y - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_inside_threshold_is_arrived() {
        let s = steer(Vec2::ZERO, Vec2::new(6.0, 8.0), 5.0);
        assert!(s.arrived);
        assert_eq!(s.pos, Vec2::ZERO);
    }

    #[test]
    fn test_mouse_target_at_center_is_entity() {
        let half = Vec2::new(640.0, 360.0);
        let pos = Vec2::new(900.0, 20.0);
        assert_eq!(mouse_target(half, half, pos), pos);
        assert_eq!(
            mouse_target(Vec2::new(700.0, 300.0), half, pos),
            Vec2::new(960.0, -40.0)
        );
    }

    proptest! {
        #[test]
        fn step_strictly_approaches_target(
            cx in -2000.0f32..2000.0, cy in -2000.0f32..2000.0,
            tx in -2000.0f32..2000.0, ty in -2000.0f32..2000.0,
            max_speed in 0.5f32..20.0,
        ) {
            let current = Vec2::new(cx, cy);
            let target = Vec2::new(tx, ty);
            let before = distance(current, target);
            prop_assume!(before > ARRIVAL_THRESHOLD);
            let after = distance(step(current, target, max_speed), target);
            prop_assert!(after < before, "{after} !< {before}");
        }

        #[test]
        fn repeated_steps_converge_then_hold(
            cx in -1000.0f32..1000.0, cy in -1000.0f32..1000.0,
            tx in -1000.0f32..1000.0, ty in -1000.0f32..1000.0,
        ) {
            let target = Vec2::new(tx, ty);
            let mut pos = Vec2::new(cx, cy);
            let mut ticks = 0;
            while !steer(pos, target, PLAYER_MAX_SPEED).arrived {
                pos = step(pos, target, PLAYER_MAX_SPEED);
                ticks += 1;
                prop_assert!(ticks < 10_000, "did not converge");
            }
            prop_assert!(distance(pos, target) <= ARRIVAL_THRESHOLD);
            let held = step(pos, target, PLAYER_MAX_SPEED);
            prop_assert_eq!(held, pos);
        }
    }
}
