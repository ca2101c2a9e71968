//! Platformer physics state machine
//!
//! Discrete, frame-counted motion. A jump lifts the body by the square of its
//! vertical speed each tick (a kinetic-energy flavoured approximation, not
//! real kinematics) while the speed counts down by one; falling moves down by
//! a constant gravity step until the floor is reached.

use super::collision::Rect;
use crate::consts::{GRAVITY, INITIAL_JUMP_SPEED, WALK_DELTA};

/// Horizontal movement requested by input this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Intent {
    #[default]
    Idle,
    Left,
    Right,
}

/// Vertical state. One value, so jumping and falling can never both be set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Vertical {
    #[default]
    Grounded,
    Jumping,
    Falling,
}

/// Externally visible motion state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionState {
    Idle,
    MovingLeft,
    MovingRight,
    Jumping,
    Falling,
    Dying,
}

/// Upward displacement per jump tick as a function of vertical speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LiftModel {
    /// `speed²`
    #[default]
    Squared,
    /// `speed`
    Linear,
}

impl LiftModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LiftModel::Squared => "squared",
            LiftModel::Linear => "linear",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "squared" | "square" => Some(LiftModel::Squared),
            "linear" => Some(LiftModel::Linear),
            _ => None,
        }
    }

    #[inline]
    pub fn lift(&self, speed: i32) -> f32 {
        match self {
            LiftModel::Squared => (speed * speed) as f32,
            LiftModel::Linear => speed as f32,
        }
    }
}

/// What one physics step did
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PhysicsStep {
    /// Horizontal displacement (signed)
    pub dx: f32,
    /// Upward displacement from jumping
    pub lift: f32,
    /// Downward displacement from falling
    pub fall: f32,
    /// Reached the floor this tick
    pub landed: bool,
}

#[derive(Debug, Clone)]
pub struct PhysicsBody {
    pub intent: Intent,
    vertical: Vertical,
    vertical_speed: i32,
    initial_speed: i32,
    gravity: f32,
    walk_delta: f32,
    lift_model: LiftModel,
    dying: bool,
}

impl Default for PhysicsBody {
    fn default() -> Self {
        Self {
            intent: Intent::Idle,
            vertical: Vertical::Grounded,
            vertical_speed: INITIAL_JUMP_SPEED,
            initial_speed: INITIAL_JUMP_SPEED,
            gravity: GRAVITY,
            walk_delta: WALK_DELTA,
            lift_model: LiftModel::Squared,
            dying: false,
        }
    }
}

impl PhysicsBody {
    pub fn with_lift_model(mut self, model: LiftModel) -> Self {
        self.lift_model = model;
        self
    }

    #[inline]
    pub fn vertical(&self) -> Vertical {
        self.vertical
    }

    #[inline]
    pub fn vertical_speed(&self) -> i32 {
        self.vertical_speed
    }

    #[inline]
    pub fn is_dying(&self) -> bool {
        self.dying
    }

    #[inline]
    pub fn is_airborne(&self) -> bool {
        self.vertical != Vertical::Grounded
    }

    pub fn state(&self) -> MotionState {
        if self.dying {
            return MotionState::Dying;
        }
        match (self.vertical, self.intent) {
            (Vertical::Jumping, _) => MotionState::Jumping,
            (Vertical::Falling, _) => MotionState::Falling,
            (Vertical::Grounded, Intent::Idle) => MotionState::Idle,
            (Vertical::Grounded, Intent::Left) => MotionState::MovingLeft,
            (Vertical::Grounded, Intent::Right) => MotionState::MovingRight,
        }
    }

    /// Start a jump from the ground. Ignored while airborne or dying.
    pub fn request_jump(&mut self) -> bool {
        if self.dying || self.vertical != Vertical::Grounded {
            log::trace!("jump ignored in state {:?}", self.state());
            return false;
        }
        self.vertical = Vertical::Jumping;
        self.vertical_speed = self.initial_speed;
        true
    }

    /// Hit by something hostile. Walking and lifting stop for good; a body
    /// in the air still falls to the floor.
    pub fn kill(&mut self) {
        self.dying = true;
        self.intent = Intent::Idle;
    }

    /// Advance one tick.
    ///
    /// `floor_y` is the pixel y of the floor under the body's footprint at the
    /// start of the tick; `viewport_width` bounds horizontal movement.
    pub fn advance(&mut self, rect: &mut Rect, floor_y: f32, viewport_width: f32) -> PhysicsStep {
        let mut step = PhysicsStep::default();
        if self.dying {
            // No more lift; gravity still applies
            if self.vertical == Vertical::Jumping {
                self.vertical = Vertical::Falling;
            }
        } else {
            self.walk_and_lift(rect, viewport_width, &mut step);
        }

        if self.vertical == Vertical::Falling {
            if rect.bottom() + self.gravity <= floor_y {
                rect.pos.y += self.gravity;
                step.fall = self.gravity;
            } else {
                step.fall = (floor_y - rect.bottom()).max(0.0);
                rect.pos.y = floor_y - rect.size.y;
                self.vertical_speed = self.initial_speed;
                self.vertical = Vertical::Grounded;
                self.intent = Intent::Idle;
                step.landed = true;
            }
        }

        // Walked off a ledge
        if self.vertical == Vertical::Grounded && rect.bottom() < floor_y {
            self.vertical = Vertical::Falling;
        }

        step
    }

    fn walk_and_lift(&mut self, rect: &mut Rect, viewport_width: f32, step: &mut PhysicsStep) {
        match self.intent {
            Intent::Right if rect.right() + self.walk_delta <= viewport_width => {
                rect.pos.x += self.walk_delta;
                step.dx = self.walk_delta;
            }
            Intent::Left if rect.left() - self.walk_delta >= 0.0 => {
                rect.pos.x -= self.walk_delta;
                step.dx = -self.walk_delta;
            }
            _ => {}
        }

        if self.vertical == Vertical::Jumping {
            // Never rise past the top of the world
            let lift = self.lift_model.lift(self.vertical_speed).min(rect.top()).max(0.0);
            rect.pos.y -= lift;
            step.lift = lift;
            self.vertical_speed -= 1;
            if self.vertical_speed <= 0 || rect.top() <= 0.0 {
                self.vertical = Vertical::Falling;
            }
        }
    }
}
