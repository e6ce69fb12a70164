#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod bot;
pub mod constants;
pub mod error;
pub mod fixed_point;
pub mod geometry;
pub mod personality;
pub mod racing_line;
pub mod rng;
pub mod track;
pub mod tracks;
pub mod vehicle;
pub mod world;

pub use bot::{BotEngine, Recovery, RecoveryKind, Stage, StuckReason, Throttle, TickReport};
pub use error::{PersonalityError, TrackError};
pub use fixed_point::{BinaryAngle, Fixed};
pub use geometry::Vec2;
pub use personality::{Personality, SkillLevel};
pub use rng::SeededRng;
pub use track::{TrackDefinition, TrackGeometry, TrackSource, Waypoint, WaypointTrack};
pub use vehicle::Vehicle;
pub use world::{
    CarSnapshot, CollisionQuery, ItemKind, ItemService, PickupSpawn, Quadrant, RaceSnapshot,
    TrackItem,
};
