//! Dodging stationary hazards (dropped bananas, oil, bombs).

use crate::constants::{
    HAZARD_AVOIDANCE_DURATION, HAZARD_CONE_DOT, HAZARD_DETECT_RANGE, HAZARD_DODGE_DISTANCE,
    HAZARD_FADE_TICKS,
};
use crate::geometry::Vec2;
use crate::world::{CarSnapshot, TrackItem};

use super::blend::{Layer, Weight};
use super::state::HazardState;

/// Nearest active hazard within range and inside the ~60 degree forward cone.
pub fn hazard_ahead(car: &CarSnapshot, items: &[TrackItem]) -> Option<Vec2> {
    let forward = car.forward();
    let range_sq = HAZARD_DETECT_RANGE * HAZARD_DETECT_RANGE;

    items
        .iter()
        .filter(|item| item.active && item.kind.is_hazard())
        .map(|item| (item.position, car.position.distance_sq(item.position)))
        .filter(|(pos, dist_sq)| {
            *dist_sq <= range_sq
                && (*pos - car.position).normalize().dot(forward) > HAZARD_CONE_DOT
        })
        .min_by_key(|(_, dist_sq)| *dist_sq)
        .map(|(pos, _)| pos)
}

/// Side-step point perpendicular to the hazard, on whichever side lands
/// closer to the track centre.
pub fn dodge_target(position: Vec2, hazard: Vec2, center: Vec2) -> Vec2 {
    let to_hazard = hazard - position;
    let left = position + to_hazard.perp().normalize().scale(HAZARD_DODGE_DISTANCE);
    let right = position + to_hazard.perp_cw().normalize().scale(HAZARD_DODGE_DISTANCE);

    if left.distance_sq(center) < right.distance_sq(center) {
        left
    } else {
        right
    }
}

/// Full avoidance above the fade threshold, then `countdown / 15`.
pub fn avoidance_weight(countdown: u16) -> Weight {
    if countdown > HAZARD_FADE_TICKS {
        Weight::FULL
    } else {
        Weight::new(i32::from(countdown), i32::from(HAZARD_FADE_TICKS))
    }
}

pub fn avoid(
    state: &mut HazardState,
    car: &CarSnapshot,
    items: &[TrackItem],
    center: Vec2,
) -> Layer {
    if let Some(hazard) = hazard_ahead(car, items) {
        state.hazard_position = hazard;
        if state.countdown == 0 {
            state.countdown = HAZARD_AVOIDANCE_DURATION;
        }
    }

    if state.countdown == 0 {
        return Layer::PassThrough;
    }

    let layer = Layer::Blend {
        target: dodge_target(car.position, state.hazard_position, center),
        weight: avoidance_weight(state.countdown),
    };
    state.countdown -= 1;
    layer
}
