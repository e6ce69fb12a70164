//! Reference kart physics for headless races.
//!
//! Velocity-vector model: throttle and brake change the velocity along the
//! heading, steering rotates both heading and velocity (full grip), and each
//! physics step applies friction, snaps tiny components to zero, caps the
//! speed and integrates the position.

use kart_bot_core::constants::SPEED_NOMINAL;
use kart_bot_core::{BinaryAngle, Fixed, ItemKind, Vec2, Vehicle};

pub const ACCEL_RATE: Fixed = Fixed::ONE;
/// Velocity multiplier per step (240/256).
pub const FRICTION: Fixed = Fixed::from_raw(240);
/// Velocity components at or below one raw unit are dropped.
const VELOCITY_SNAP_RAW: i32 = 1;
/// Speed cap multiplier while a boost is running.
pub const BOOST_MULT: i32 = 2;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KinematicCar {
    position: Vec2,
    velocity: Vec2,
    heading: BinaryAngle,
    max_speed: Fixed,
    held: ItemKind,
    rank: u8,
    boost_ticks: u32,
    confused_ticks: u32,
}

impl KinematicCar {
    pub fn new(position: Vec2, heading: BinaryAngle) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            heading,
            max_speed: SPEED_NOMINAL,
            held: ItemKind::None,
            rank: 1,
            boost_ticks: 0,
            confused_ticks: 0,
        }
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn set_rank(&mut self, rank: u8) {
        self.rank = rank;
    }

    /// Spin-out from a shell or hazard hit.
    pub fn stop(&mut self) {
        self.velocity = Vec2::ZERO;
    }

    /// Halves the current speed.
    pub fn slow(&mut self) {
        self.velocity = self.velocity.scale(Fixed::HALF);
    }

    /// Raises the speed cap for `ticks` physics steps and jumps to it.
    pub fn start_boost(&mut self, ticks: u32) {
        self.boost_ticks = ticks;
        self.velocity = Vec2::from_angle(self.heading).scale(self.speed_cap());
    }

    pub fn is_boosting(&self) -> bool {
        self.boost_ticks > 0
    }

    /// Mirrors steering input for `ticks` physics steps.
    pub fn confuse(&mut self, ticks: u32) {
        self.confused_ticks = ticks;
    }

    pub fn is_confused(&self) -> bool {
        self.confused_ticks > 0
    }

    /// Mirrors velocity heading into a wall whose surface faces `normal`,
    /// keeping half of it. Velocity already leaving the wall is untouched.
    pub fn bounce(&mut self, normal: Vec2) -> bool {
        let normal = normal.normalize();
        if normal.is_zero() || self.velocity.dot(normal) >= Fixed::ZERO {
            return false;
        }
        self.velocity = self.velocity.reflect(normal).scale(Fixed::HALF);
        true
    }

    fn speed_cap(&self) -> Fixed {
        if self.boost_ticks > 0 {
            self.max_speed.mul_int(BOOST_MULT)
        } else {
            self.max_speed
        }
    }

    pub fn step(&mut self) {
        self.velocity = self.velocity.scale(FRICTION);
        if self.velocity.x.raw().abs() <= VELOCITY_SNAP_RAW {
            self.velocity.x = Fixed::ZERO;
        }
        if self.velocity.y.raw().abs() <= VELOCITY_SNAP_RAW {
            self.velocity.y = Fixed::ZERO;
        }
        self.velocity = self.velocity.clamp_len(self.speed_cap());
        self.position += self.velocity;
        self.boost_ticks = self.boost_ticks.saturating_sub(1);
        self.confused_ticks = self.confused_ticks.saturating_sub(1);
    }
}

impl Vehicle for KinematicCar {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn heading(&self) -> BinaryAngle {
        self.heading
    }

    fn speed(&self) -> Fixed {
        self.velocity.len()
    }

    fn max_speed(&self) -> Fixed {
        self.max_speed
    }

    fn held_item(&self) -> ItemKind {
        self.held
    }

    fn rank(&self) -> u8 {
        self.rank
    }

    fn accelerate(&mut self) {
        let boosted = self.velocity + Vec2::from_angle(self.heading).scale(ACCEL_RATE);
        self.velocity = boosted.clamp_len(self.speed_cap());
    }

    fn brake(&mut self) {
        let speed = self.velocity.len();
        if speed <= ACCEL_RATE {
            self.velocity = Vec2::ZERO;
            return;
        }
        self.velocity = self.velocity - self.velocity.normalize().scale(ACCEL_RATE);
    }

    fn steer(&mut self, delta: i32) {
        let delta = if self.is_confused() { -delta } else { delta };
        self.heading = self.heading.wrapping_add(delta);
        if !self.velocity.is_zero() {
            self.velocity = self.velocity.rotate(BinaryAngle::new(delta));
        }
    }

    fn set_max_speed(&mut self, max_speed: Fixed) {
        self.max_speed = max_speed;
    }

    fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    fn set_heading(&mut self, heading: BinaryAngle) {
        self.heading = heading;
    }

    fn set_speed(&mut self, speed: Fixed) {
        self.velocity = if speed <= Fixed::ZERO {
            Vec2::ZERO
        } else {
            Vec2::from_angle(self.heading).scale(speed)
        };
    }

    fn set_held_item(&mut self, item: ItemKind) {
        self.held = item;
    }
}
