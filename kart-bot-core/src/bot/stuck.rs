//! Stuck detection and the teleport recovery ladder.
//!
//! Two detectors:
//! - a low-speed timer checked during the decision tick, answered with an
//!   in-place brake and hard steer
//! - a displacement and wall-bounce tracker run after physics, answered by
//!   moving the kart to a rescue spot or the nearest checkpoint

use serde::{Deserialize, Serialize};

use crate::constants::{
    SPEED_NOMINAL, STUCK_MOVE_THRESHOLD, STUCK_SPEED_THRESHOLD, STUCK_STILL_FRAMES,
    STUCK_TIMER_LIMIT, WALL_BOUNCE_COOLDOWN, WALL_BOUNCE_LIMIT,
};
use crate::fixed_point::{BinaryAngle, Fixed};
use crate::geometry::Vec2;
use crate::track::{TrackGeometry, WaypointTrack};
use crate::vehicle::Vehicle;

use super::state::{BotState, StuckState};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StuckReason {
    StillFrames,
    WallBounces,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryKind {
    RescueSpot,
    Checkpoint,
    /// No waypoints to go to: speed and counters are cleared in place.
    InPlace,
}

/// Where a stuck kart was sent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recovery {
    pub reason: StuckReason,
    pub kind: RecoveryKind,
    pub waypoint: usize,
    pub position: Vec2,
    pub heading: BinaryAngle,
}

/// Counts ticks below the crawl threshold. True on the tick the nudge
/// fires, which also restarts the count.
pub fn low_speed_tick(state: &mut StuckState, speed: Fixed) -> bool {
    if speed >= STUCK_SPEED_THRESHOLD {
        state.low_speed_ticks = 0;
        return false;
    }
    state.low_speed_ticks = state.low_speed_ticks.saturating_add(1);
    if state.low_speed_ticks > STUCK_TIMER_LIMIT {
        state.low_speed_ticks = 0;
        return true;
    }
    false
}

/// Post-physics bookkeeping. Returns why the kart needs rescuing, if it does.
pub fn track_progress(
    state: &mut StuckState,
    position: Vec2,
    speed: Fixed,
    touching_wall: bool,
) -> Option<StuckReason> {
    state.bounce_cooldown = state.bounce_cooldown.saturating_sub(1);

    if touching_wall && speed < SPEED_NOMINAL {
        if state.bounce_cooldown == 0 {
            state.bounce_count = state.bounce_count.saturating_add(1);
            state.bounce_cooldown = WALL_BOUNCE_COOLDOWN;
        }
    } else {
        state.bounce_count = 0;
    }

    let Some(anchor) = state.anchor else {
        state.anchor = Some(position);
        return None;
    };

    if position.distance(anchor) < STUCK_MOVE_THRESHOLD {
        state.still_frames = state.still_frames.saturating_add(1);
    } else {
        state.still_frames = 0;
        state.anchor = Some(position);
    }

    let reason = if state.still_frames >= STUCK_STILL_FRAMES {
        StuckReason::StillFrames
    } else if state.bounce_count >= WALL_BOUNCE_LIMIT {
        StuckReason::WallBounces
    } else {
        return None;
    };

    state.still_frames = 0;
    state.bounce_count = 0;
    state.bounce_cooldown = 0;
    Some(reason)
}

/// Known rescue spot first, then the nearest checkpoint (waypoint 0 when
/// the track has none), then nothing at all on an empty track.
pub fn plan_recovery(
    reason: StuckReason,
    position: Vec2,
    heading: BinaryAngle,
    track: &WaypointTrack,
    geometry: &TrackGeometry,
) -> Recovery {
    if let Some(zone) = geometry.rescue.filter(|zone| zone.contains(position)) {
        return Recovery {
            reason,
            kind: RecoveryKind::RescueSpot,
            waypoint: track.nearest_checkpoint(zone.rescue_position).unwrap_or(0),
            position: zone.rescue_position,
            heading: zone.rescue_heading,
        };
    }

    let waypoint = track.nearest_checkpoint(position).unwrap_or(0);
    match track.get(waypoint) {
        Some(wp) => Recovery {
            reason,
            kind: RecoveryKind::Checkpoint,
            waypoint,
            position: wp.position,
            heading: wp.corner_angle,
        },
        None => Recovery {
            reason,
            kind: RecoveryKind::InPlace,
            waypoint: 0,
            position,
            heading,
        },
    }
}

/// Moves the kart, stops it and points navigation at the recovery waypoint.
pub fn apply_recovery<V: Vehicle + ?Sized>(
    vehicle: &mut V,
    state: &mut BotState,
    track: &WaypointTrack,
    recovery: &Recovery,
) {
    if recovery.kind != RecoveryKind::InPlace {
        vehicle.set_position(recovery.position);
        vehicle.set_heading(recovery.heading);
    }
    vehicle.set_speed(Fixed::ZERO);

    state.nav.target_waypoint = recovery.waypoint;
    state.nav.next_waypoint = track.next_index(recovery.waypoint);
    state.nav.steering_target = track
        .get(recovery.waypoint)
        .map_or(recovery.position, |wp| wp.position);
    state.stuck = StuckState {
        anchor: Some(recovery.position),
        ..StuckState::default()
    };
    state.hazard.countdown = 0;
}
