//! Turning the blended target into steer and throttle commands.

use serde::{Deserialize, Serialize};

use crate::constants::{EASY_SPEED_BONUS, THROTTLE_COAST_BAND, TURN_STEP};
use crate::fixed_point::{BinaryAngle, Fixed};
use crate::geometry::Vec2;
use crate::personality::SkillLevel;
use crate::track::WaypointTrack;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Throttle {
    Accelerate,
    Brake,
    #[default]
    Coast,
}

/// Signed turn toward `target`, at most `TURN_STEP` either way.
/// Zero when already aligned or when the target is the kart's own position.
pub fn steering_delta(position: Vec2, heading: BinaryAngle, target: Vec2) -> i32 {
    let to_target = target - position;
    if to_target.is_zero() {
        return 0;
    }
    heading
        .delta_to(to_target.to_angle())
        .clamp(-TURN_STEP, TURN_STEP)
}

/// Target speed of the waypoint being driven to. Easy bots carry 10% more
/// into corners.
pub fn target_speed(track: &WaypointTrack, waypoint: usize, skill: SkillLevel) -> Fixed {
    let Some(wp) = track.get(waypoint) else {
        return Fixed::ZERO;
    };
    if skill == SkillLevel::Easy {
        wp.target_speed * EASY_SPEED_BONUS
    } else {
        wp.target_speed
    }
}

pub fn throttle(speed: Fixed, target: Fixed) -> Throttle {
    if speed < target {
        Throttle::Accelerate
    } else if speed > target + THROTTLE_COAST_BAND {
        Throttle::Brake
    } else {
        Throttle::Coast
    }
}
