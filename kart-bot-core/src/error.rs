use alloc::string::String;
use core::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrackError {
    TooManyWaypoints { count: usize, max: usize },
    NoWaypoints,
    BoundaryTooShort { inner: usize, outer: usize, min: usize },
    TargetSpeedNotPositive { index: usize },
}

impl fmt::Display for TrackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyWaypoints { count, max } => {
                write!(f, "too many waypoints: got {count}, capacity is {max}")
            }
            Self::NoWaypoints => write!(f, "waypoint list is empty"),
            Self::BoundaryTooShort { inner, outer, min } => write!(
                f,
                "track boundaries too short: inner {inner}, outer {outer} (need at least {min} each)"
            ),
            Self::TargetSpeedNotPositive { index } => {
                write!(f, "waypoint {index} has a non-positive target speed")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TrackError {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PersonalityError {
    TraitOutOfRange { name: &'static str, percent: i32 },
    ReactionDelayOutOfRange { ticks: u16, max: u16 },
    UnknownSkill { name: String },
}

impl fmt::Display for PersonalityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TraitOutOfRange { name, percent } => {
                write!(f, "{name} out of range: {percent}% (allowed 0..=100)")
            }
            Self::ReactionDelayOutOfRange { ticks, max } => {
                write!(f, "reaction delay out of range: {ticks} ticks (allowed 0..={max})")
            }
            Self::UnknownSkill { name } => {
                write!(f, "unknown skill level: {name:?} (expected easy, medium or hard)")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PersonalityError {}
