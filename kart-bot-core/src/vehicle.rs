//! Control surface a bot drives through.

use crate::fixed_point::{BinaryAngle, Fixed};
use crate::geometry::Vec2;
use crate::world::ItemKind;

/// The kart a bot drives. Physics integration stays on the implementor's
/// side; the engine only reads state and issues commands.
pub trait Vehicle {
    fn position(&self) -> Vec2;
    fn heading(&self) -> BinaryAngle;
    fn speed(&self) -> Fixed;
    fn max_speed(&self) -> Fixed;
    fn held_item(&self) -> ItemKind;
    /// 1-based race position.
    fn rank(&self) -> u8;

    fn accelerate(&mut self);
    fn brake(&mut self);
    /// Rotate the heading by `delta` binary-angle steps.
    fn steer(&mut self, delta: i32);

    fn set_max_speed(&mut self, max_speed: Fixed);
    fn set_position(&mut self, position: Vec2);
    fn set_heading(&mut self, heading: BinaryAngle);
    fn set_speed(&mut self, speed: Fixed);
    /// Used by the item service to hand out or consume items.
    fn set_held_item(&mut self, item: ItemKind);
}
