//! Path following along the waypoint track.

use crate::constants::{
    LOOKAHEAD_DISTANCE, LOOKAHEAD_SCALE_MAX, LOOKAHEAD_SCALE_MIN, LOOKAHEAD_WINDOW,
    SPEED_NOMINAL, WAYPOINT_REACH_THRESHOLD,
};
use crate::fixed_point::Fixed;
use crate::geometry::Vec2;
use crate::track::WaypointTrack;

use super::state::NavState;

/// Base lookahead scaled by speed / nominal speed, clamped to 0.5x..1.2x.
/// Stationary or reversing karts use the base distance.
pub fn lookahead_distance(speed: Fixed) -> Fixed {
    if speed <= Fixed::ZERO {
        return LOOKAHEAD_DISTANCE;
    }
    let scale = (speed / SPEED_NOMINAL).clamp(LOOKAHEAD_SCALE_MIN, LOOKAHEAD_SCALE_MAX);
    LOOKAHEAD_DISTANCE * scale
}

/// Advances the target waypoint once it is reached, then picks the furthest
/// waypoint of the next few that is still inside the lookahead radius.
/// An empty track holds the kart where it is.
pub fn steering_target(
    position: Vec2,
    speed: Fixed,
    nav: &mut NavState,
    track: &WaypointTrack,
) -> Vec2 {
    let count = track.len();
    if count == 0 {
        nav.target_waypoint = 0;
        nav.next_waypoint = 0;
        return position;
    }
    nav.target_waypoint %= count;
    nav.next_waypoint %= count;

    let waypoints = track.as_slice();
    let reach_sq = WAYPOINT_REACH_THRESHOLD * WAYPOINT_REACH_THRESHOLD;
    if position.distance_sq(waypoints[nav.target_waypoint].position) < reach_sq {
        nav.target_waypoint = track.next_index(nav.target_waypoint);
    }

    let lookahead = lookahead_distance(speed);
    let lookahead_sq = lookahead * lookahead;
    let mut target = waypoints[nav.target_waypoint].position;

    for offset in 0..LOOKAHEAD_WINDOW {
        let index = (nav.target_waypoint + offset) % count;
        let candidate = waypoints[index].position;
        if position.distance_sq(candidate) > lookahead_sq {
            break;
        }
        target = candidate;
        nav.next_waypoint = index;
    }

    target
}
