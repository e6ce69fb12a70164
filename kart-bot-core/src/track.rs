//! Waypoint track: the circular racing line the bots follow.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constants::{
    MAP_SIZE_PX, MAX_RACING_LINE_POINTS, MAX_WAYPOINTS, STRAIGHT_ANGLE_TOLERANCE,
    STRAIGHT_LOOKAHEAD,
};
use crate::error::TrackError;
use crate::fixed_point::{BinaryAngle, Fixed};
use crate::geometry::Vec2;
use crate::racing_line::RacingLine;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Waypoint {
    pub position: Vec2,
    pub target_speed: Fixed,
    pub corner_angle: BinaryAngle,
    pub checkpoint: bool,
}

impl Waypoint {
    pub const fn new(
        position: Vec2,
        target_speed: Fixed,
        corner_angle: BinaryAngle,
        checkpoint: bool,
    ) -> Self {
        Self {
            position,
            target_speed,
            corner_angle,
            checkpoint,
        }
    }
}

/// Where the active waypoints came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackSource {
    RacingLine,
    Fallback,
    Empty,
}

/// Rectangle (inclusive, whole pixels) where karts are known to wedge, and
/// the spot they get moved to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RescueZone {
    pub min: (i32, i32),
    pub max: (i32, i32),
    pub rescue_position: Vec2,
    pub rescue_heading: BinaryAngle,
}

impl RescueZone {
    pub fn contains(&self, position: Vec2) -> bool {
        let (x, y) = position.to_int();
        (self.min.0..=self.max.0).contains(&x) && (self.min.1..=self.max.1).contains(&y)
    }
}

/// Per-track geometry the behaviors need besides the waypoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackGeometry {
    pub map_size_px: i32,
    pub center: Vec2,
    pub rescue: Option<RescueZone>,
}

impl Default for TrackGeometry {
    fn default() -> Self {
        Self {
            map_size_px: MAP_SIZE_PX,
            center: Vec2::from_int(MAP_SIZE_PX / 2, MAP_SIZE_PX / 2),
            rescue: None,
        }
    }
}

/// Everything needed to load a track into the engine.
#[derive(Clone, Copy, Debug)]
pub struct TrackDefinition<'a> {
    pub name: &'a str,
    pub inner_boundary: &'a [Vec2],
    pub outer_boundary: &'a [Vec2],
    pub fallback: &'a [Waypoint],
    pub geometry: TrackGeometry,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WaypointTrack {
    points: [Waypoint; MAX_WAYPOINTS],
    count: usize,
}

impl Default for WaypointTrack {
    fn default() -> Self {
        Self::empty()
    }
}

impl WaypointTrack {
    pub const fn empty() -> Self {
        Self {
            points: [Waypoint::new(Vec2::ZERO, Fixed::ZERO, BinaryAngle::RIGHT, false);
                MAX_WAYPOINTS],
            count: 0,
        }
    }

    /// Strict constructor for caller-provided tables.
    pub fn from_waypoints(waypoints: &[Waypoint]) -> Result<Self, TrackError> {
        if waypoints.is_empty() {
            return Err(TrackError::NoWaypoints);
        }
        if waypoints.len() > MAX_WAYPOINTS {
            return Err(TrackError::TooManyWaypoints {
                count: waypoints.len(),
                max: MAX_WAYPOINTS,
            });
        }
        if let Some(index) = waypoints.iter().position(|wp| wp.target_speed <= Fixed::ZERO) {
            return Err(TrackError::TargetSpeedNotPositive { index });
        }
        Ok(Self::truncated(waypoints))
    }

    /// Copies up to `MAX_WAYPOINTS` entries, dropping the rest.
    pub fn truncated(waypoints: &[Waypoint]) -> Self {
        let mut track = Self::empty();
        let count = waypoints.len().min(MAX_WAYPOINTS);
        track.points[..count].copy_from_slice(&waypoints[..count]);
        track.count = count;
        track
    }

    pub fn from_racing_line(line: &RacingLine) -> Self {
        let mut track = Self::empty();
        for (slot, point) in track.points.iter_mut().zip(line.points()) {
            *slot = point.to_waypoint();
        }
        track.count = line.len().min(MAX_WAYPOINTS);
        track
    }

    /// Generated racing line first, then the fallback table, then nothing.
    pub fn load(def: &TrackDefinition<'_>) -> (Self, TrackSource) {
        let has_boundaries = !def.inner_boundary.is_empty() || !def.outer_boundary.is_empty();
        if has_boundaries {
            match RacingLine::generate(
                def.inner_boundary,
                def.outer_boundary,
                MAX_RACING_LINE_POINTS,
            ) {
                Ok(line) => {
                    debug!(track = def.name, points = line.len(), "loaded generated racing line");
                    return (Self::from_racing_line(&line), TrackSource::RacingLine);
                }
                Err(err) => {
                    warn!(track = def.name, error = %err, "racing line generation failed");
                }
            }
        }

        if !def.fallback.is_empty() {
            if def.fallback.len() > MAX_WAYPOINTS {
                warn!(
                    track = def.name,
                    count = def.fallback.len(),
                    max = MAX_WAYPOINTS,
                    "fallback table truncated"
                );
            }
            debug!(track = def.name, points = def.fallback.len(), "loaded fallback waypoints");
            return (Self::truncated(def.fallback), TrackSource::Fallback);
        }

        warn!(track = def.name, "no waypoints available; bots will hold station");
        (Self::empty(), TrackSource::Empty)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[Waypoint] {
        &self.points[..self.count]
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Waypoint> {
        self.as_slice().get(index)
    }

    /// Index following `index` on the circuit. Zero for an empty track.
    #[inline]
    pub fn next_index(&self, index: usize) -> usize {
        if self.count == 0 {
            0
        } else {
            (index + 1) % self.count
        }
    }

    /// Index of the checkpoint closest to `position`, or `None` when the
    /// track has no checkpoints.
    pub fn nearest_checkpoint(&self, position: Vec2) -> Option<usize> {
        self.as_slice()
            .iter()
            .enumerate()
            .filter(|(_, wp)| wp.checkpoint)
            .min_by_key(|(_, wp)| position.distance_sq(wp.position))
            .map(|(index, _)| index)
    }

    /// True when the corner angles of the next few waypoints after `index`
    /// stay within a small tolerance of each other.
    pub fn is_straight_at(&self, index: usize) -> bool {
        if self.count < STRAIGHT_LOOKAHEAD {
            return true;
        }
        let angle_at = |offset: usize| self.points[(index + offset) % self.count].corner_angle;
        (0..STRAIGHT_LOOKAHEAD - 1).all(|offset| {
            angle_at(offset).delta_to(angle_at(offset + 1)).abs() < STRAIGHT_ANGLE_TOLERANCE
        })
    }
}
