//! Periodic, short-lived steering errors.

use crate::constants::{
    MISTAKE_DURATION_MAX, MISTAKE_DURATION_MIN, MISTAKE_INTERVAL_BASE,
    MISTAKE_INTERVAL_CONSISTENCY_SPAN, MISTAKE_INTERVAL_JITTER, MISTAKE_OFFSET_MAX_PX,
    MISTAKE_OFFSET_MIN_PX,
};
use crate::fixed_point::Fixed;
use crate::geometry::Vec2;
use crate::personality::Personality;
use crate::rng::SeededRng;

use super::blend::Layer;
use super::state::MistakeState;

/// Mean gap between mistakes grows with consistency.
pub fn mistake_interval(consistency: Fixed, rng: &mut SeededRng) -> i32 {
    let average = MISTAKE_INTERVAL_BASE
        + (consistency * Fixed::from_int(MISTAKE_INTERVAL_CONSISTENCY_SPAN)).to_int();
    average + rng.below(MISTAKE_INTERVAL_JITTER as u32) as i32 - MISTAKE_INTERVAL_JITTER / 2
}

/// Ticks the mistake timer and, while a mistake is running, returns a
/// wobble offset for this tick.
pub fn inject(state: &mut MistakeState, personality: &Personality, rng: &mut SeededRng) -> Layer {
    if state.mistake_timer <= 0 {
        state.correction_timer = rng.next_range(MISTAKE_DURATION_MIN, MISTAKE_DURATION_MAX);
        state.mistake_timer = mistake_interval(personality.consistency, rng);
    } else {
        state.mistake_timer -= 1;
    }

    if state.correction_timer <= 0 {
        return Layer::PassThrough;
    }
    state.correction_timer -= 1;

    let amount = rng.next_range(MISTAKE_OFFSET_MIN_PX, MISTAKE_OFFSET_MAX_PX) * rng.sign();
    // Mostly lateral with a smaller forward component.
    Layer::Offset(Vec2::from_int(amount / 2, amount / 3))
}
