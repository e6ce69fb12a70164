//! Passing a slower car that blocks the line ahead.

use crate::constants::{
    OVERTAKE_CONE_DOT, OVERTAKE_DISTANCE, OVERTAKE_RELEASE_DISTANCE, OVERTAKE_SIDE_OFFSET,
};
use crate::geometry::Vec2;
use crate::rng::SeededRng;
use crate::world::{CarSnapshot, RaceSnapshot};

use super::blend::Layer;
use super::state::OvertakeState;

/// Nearest slower car close and almost dead ahead.
pub fn find_blocker(slot: usize, car: &CarSnapshot, race: &RaceSnapshot<'_>) -> Option<Vec2> {
    let forward = car.forward();
    race.rivals(slot)
        .map(|(_, other)| (other, other.position - car.position))
        .map(|(other, offset)| (other, offset, offset.len()))
        .filter(|(other, offset, dist)| {
            *dist < OVERTAKE_DISTANCE
                && offset.normalize().dot(forward) > OVERTAKE_CONE_DOT
                && other.speed < car.speed
        })
        .min_by_key(|(_, _, dist)| *dist)
        .map(|(other, _, _)| other.position)
}

/// Tracks a blocker with a pass point beside it. The side is picked once
/// when the pass starts and kept until it ends.
pub fn update(
    state: &mut OvertakeState,
    slot: usize,
    car: &CarSnapshot,
    race: &RaceSnapshot<'_>,
    rng: &mut SeededRng,
) -> Layer {
    if let Some(blocker) = find_blocker(slot, car, race) {
        if !state.active || state.side == 0 {
            state.side = rng.sign();
        }
        state.active = true;
        let offset = OVERTAKE_SIDE_OFFSET.mul_int(state.side);
        state.target = blocker + car.forward().perp().scale(offset);
    } else if state.active
        && car.position.distance(state.target) < OVERTAKE_RELEASE_DISTANCE
    {
        state.active = false;
        state.side = 0;
    }

    if state.active {
        Layer::Override(state.target)
    } else {
        Layer::PassThrough
    }
}
