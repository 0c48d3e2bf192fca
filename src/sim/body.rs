//! Kinematic bodies: the courier and the package
//!
//! Integration is split into small steps so the player and the free package
//! can apply them in their own order.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{Rect, rects_overlap, rests_on};
use crate::consts::*;

/// Generic kinematic AABB entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsBody {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Fixed for the lifetime of the body
    size: Vec2,
    pub grounded: bool,
}

impl PhysicsBody {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size,
            grounded: false,
        }
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.size
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    /// Add horizontal acceleration for an intent in {-1, 0, +1}
    pub fn apply_intent(&mut self, intent: f32, accel: f32, dt: f32) {
        self.vel.x += intent * accel * dt;
    }

    pub fn apply_friction(&mut self, factor: f32) {
        self.vel.x *= factor;
    }

    /// Jump only from the ground. Returns true if the jump happened.
    pub fn try_jump(&mut self, jump_velocity: f32) -> bool {
        if self.grounded {
            self.vel.y = jump_velocity;
            self.grounded = false;
            true
        } else {
            false
        }
    }

    pub fn apply_gravity(&mut self, gravity: f32, dt: f32) {
        self.vel.y += gravity * dt;
    }

    /// Integrate position by velocity
    pub fn advance(&mut self) {
        self.pos += self.vel;
    }

    /// Keep the body inside [0, field_width - width]
    pub fn clamp_to_field(&mut self, field_width: f32) {
        let max_x = (field_width - self.size.x).max(0.0);
        self.pos.x = self.pos.x.clamp(0.0, max_x);
    }

    /// Move instantly and drop all momentum
    pub fn teleport(&mut self, pos: Vec2) {
        self.pos = pos;
        self.vel = Vec2::ZERO;
    }

    /// Land on a platform if falling into it from above.
    ///
    /// A body already standing exactly on the platform top counts as grounded
    /// without being moved, so repeated passes agree.
    pub fn resolve_platform(&mut self, platform: &Rect) {
        let rect = self.rect();
        if rects_overlap(&rect, platform) {
            if self.vel.y > 0.0 && self.pos.y < platform.y {
                self.pos.y = platform.y - self.size.y;
                self.vel.y = 0.0;
                self.grounded = true;
            }
        } else if self.vel.y >= 0.0 && rests_on(&rect, platform) {
            self.grounded = true;
        }
    }
}

/// The courier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub body: PhysicsBody,
    pub carrying: bool,
}

impl Player {
    pub fn new(spawn: Vec2) -> Self {
        Self {
            body: PhysicsBody::new(spawn, Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT)),
            carrying: false,
        }
    }
}

/// The fragile package being delivered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub body: PhysicsBody,
    pub carried: bool,
    pub fragile: bool,
}

impl Package {
    pub fn new(spawn: Vec2) -> Self {
        Self {
            body: PhysicsBody::new(spawn, Vec2::new(PACKAGE_WIDTH, PACKAGE_HEIGHT)),
            carried: false,
            fragile: true,
        }
    }

    /// Lock to the carrier's offset with no momentum of its own
    pub fn follow(&mut self, carrier: &PhysicsBody, offset: Vec2) {
        self.body.pos = carrier.pos + offset;
        self.body.vel = Vec2::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_at(x: f32, y: f32) -> PhysicsBody {
        PhysicsBody::new(Vec2::new(x, y), Vec2::new(16.0, 24.0))
    }

    #[test]
    fn test_jump_requires_ground() {
        let mut body = body_at(0.0, 0.0);
        assert!(!body.try_jump(-12.0));
        assert_eq!(body.vel.y, 0.0);

        body.grounded = true;
        assert!(body.try_jump(-12.0));
        assert_eq!(body.vel.y, -12.0);
        assert!(!body.grounded);
    }

    #[test]
    fn test_clamp_to_field() {
        let mut body = body_at(-5.0, 0.0);
        body.clamp_to_field(1000.0);
        assert_eq!(body.pos.x, 0.0);

        body.pos.x = 995.0;
        body.clamp_to_field(1000.0);
        assert_eq!(body.pos.x, 984.0);
    }

    #[test]
    fn test_lands_when_falling_from_above() {
        let platform = Rect::new(0.0, 580.0, 1000.0, 20.0);
        let mut body = body_at(100.0, 560.0);
        body.vel.y = 3.0;
        body.resolve_platform(&platform);
        assert!(body.grounded);
        assert_eq!(body.pos.y, 556.0);
        assert_eq!(body.vel.y, 0.0);
    }

    #[test]
    fn test_rising_through_platform_is_not_caught() {
        let platform = Rect::new(0.0, 500.0, 100.0, 20.0);
        let mut body = body_at(10.0, 490.0);
        body.vel.y = -5.0;
        body.resolve_platform(&platform);
        assert!(!body.grounded);
        assert_eq!(body.pos.y, 490.0);
    }

    #[test]
    fn test_side_clip_below_top_is_not_caught() {
        // Top edge already under the platform top: a side hit, not a landing
        let platform = Rect::new(100.0, 500.0, 100.0, 20.0);
        let mut body = body_at(90.0, 505.0);
        body.vel.y = 1.0;
        body.resolve_platform(&platform);
        assert!(!body.grounded);
        assert_eq!(body.pos.y, 505.0);
    }

    #[test]
    fn test_package_follow_pins_velocity() {
        let carrier = body_at(300.0, 200.0);
        let mut package = Package::new(Vec2::ZERO);
        package.body.vel = Vec2::new(7.0, -3.0);
        package.follow(&carrier, Vec2::new(0.0, -20.0));
        assert_eq!(package.body.pos, Vec2::new(300.0, 180.0));
        assert_eq!(package.body.vel, Vec2::ZERO);
    }
}
