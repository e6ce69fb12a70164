//! Read-only views of the race and the collaborator services the engine
//! queries each tick.

use serde::{Deserialize, Serialize};

use crate::constants::QUAD_OFFSET_PX;
use crate::fixed_point::{BinaryAngle, Fixed};
use crate::geometry::Vec2;
use crate::vehicle::Vehicle;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    #[default]
    None,
    Banana,
    Oil,
    Bomb,
    GreenShell,
    RedShell,
    Missile,
    Mushroom,
    SpeedBoost,
}

impl ItemKind {
    pub const HELD: [Self; 8] = [
        Self::Banana,
        Self::Oil,
        Self::Bomb,
        Self::GreenShell,
        Self::RedShell,
        Self::Missile,
        Self::Mushroom,
        Self::SpeedBoost,
    ];

    #[inline]
    pub const fn is_none(self) -> bool {
        matches!(self, Self::None)
    }

    /// Items that stay on the track once deployed.
    #[inline]
    pub const fn is_hazard(self) -> bool {
        matches!(self, Self::Banana | Self::Oil | Self::Bomb)
    }
}

/// A pickup box location. Inactive boxes are respawning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickupSpawn {
    pub position: Vec2,
    pub active: bool,
}

/// An item lying on or travelling along the track.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackItem {
    pub kind: ItemKind,
    pub position: Vec2,
    pub active: bool,
}

/// One car as seen by every other car this tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarSnapshot {
    pub position: Vec2,
    pub heading: BinaryAngle,
    pub speed: Fixed,
    pub rank: u8,
}

impl CarSnapshot {
    pub fn of<V: Vehicle + ?Sized>(vehicle: &V) -> Self {
        Self {
            position: vehicle.position(),
            heading: vehicle.heading(),
            speed: vehicle.speed(),
            rank: vehicle.rank(),
        }
    }

    /// Unit vector along the heading.
    pub fn forward(&self) -> Vec2 {
        Vec2::from_angle(self.heading)
    }
}

/// Immutable race-wide view shared by all bots during one tick.
#[derive(Clone, Copy, Debug)]
pub struct RaceSnapshot<'a> {
    pub cars: &'a [CarSnapshot],
    /// Slot of the human player, if any.
    pub player_slot: Option<usize>,
}

impl<'a> RaceSnapshot<'a> {
    pub fn new(cars: &'a [CarSnapshot], player_slot: Option<usize>) -> Self {
        Self { cars, player_slot }
    }

    pub fn car_count(&self) -> usize {
        self.cars.len()
    }

    pub fn player(&self) -> Option<&CarSnapshot> {
        self.player_slot.and_then(|slot| self.cars.get(slot))
    }

    /// Every car except `slot`, with its slot index.
    pub fn rivals(&self, slot: usize) -> impl Iterator<Item = (usize, &CarSnapshot)> + '_ {
        self.cars
            .iter()
            .enumerate()
            .filter(move |(other, _)| *other != slot)
    }
}

/// Cell of the 3x3 grid the map is split into for collision lookups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quadrant {
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    MiddleCenter,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl Quadrant {
    const GRID: [Self; 9] = [
        Self::TopLeft,
        Self::TopCenter,
        Self::TopRight,
        Self::MiddleLeft,
        Self::MiddleCenter,
        Self::MiddleRight,
        Self::BottomLeft,
        Self::BottomCenter,
        Self::BottomRight,
    ];

    /// Quadrant containing a whole-pixel position. Anything past the second
    /// offset falls into the last row or column.
    pub fn at(x: i32, y: i32) -> Self {
        let band = |v: i32| {
            if v < QUAD_OFFSET_PX {
                0
            } else if v < 2 * QUAD_OFFSET_PX {
                1
            } else {
                2
            }
        };
        Self::GRID[band(y) * 3 + band(x)]
    }
}

/// Wall collision queries, in whole pixels.
pub trait CollisionQuery {
    /// Whether a circle at (x, y) overlaps a wall.
    fn collides(&self, x: i32, y: i32, radius: i32, quadrant: Quadrant) -> bool;

    /// Direction pointing away from the nearest wall, any magnitude.
    /// (0, 0) when the direction is unknown.
    fn surface_normal(&self, x: i32, y: i32, quadrant: Quadrant) -> (i32, i32);
}

/// The pickup and projectile subsystem.
pub trait ItemService {
    fn pickup_spawns(&self) -> &[PickupSpawn];
    fn track_items(&self) -> &[TrackItem];
    /// Deploy the vehicle's held item. Hazards go behind the kart when
    /// `fire_forward` is false.
    fn use_item(&mut self, slot: usize, vehicle: &mut dyn Vehicle, fire_forward: bool);
}
