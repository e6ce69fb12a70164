//! Rank-driven adjustments: rubber-banding against the human player and
//! per-tick personality tweaks.

use crate::constants::{
    BACK_PACK_RANK_MIN, LEADER_RANK_MAX, RUBBERBAND_BOOST_MULT, RUBBERBAND_BOOST_THRESHOLD,
    RUBBERBAND_SLOW_MULT, RUBBERBAND_SLOW_THRESHOLD, SPEED_NOMINAL,
};
use crate::fixed_point::Fixed;
use crate::personality::Personality;
use crate::world::CarSnapshot;

/// Speed cap for a bot given where the player is.
pub fn rubber_band_max_speed(car: &CarSnapshot, player: &CarSnapshot) -> Fixed {
    let distance = car.position.distance(player.position);
    if distance > RUBBERBAND_BOOST_THRESHOLD && car.rank > player.rank {
        SPEED_NOMINAL * RUBBERBAND_BOOST_MULT
    } else if distance > RUBBERBAND_SLOW_THRESHOLD && car.rank < player.rank {
        SPEED_NOMINAL * RUBBERBAND_SLOW_MULT
    } else {
        SPEED_NOMINAL
    }
}

/// Personality for this tick. Leaders play safe with items; the back of
/// the pack gets twice the aggression and goes for every item.
pub fn effective_personality(base: &Personality, rank: u8) -> Personality {
    let mut adjusted = *base;
    if rank <= LEADER_RANK_MAX {
        adjusted.item_priority = base.item_priority.div_int(2);
    } else if rank >= BACK_PACK_RANK_MIN {
        adjusted.aggression = base.aggression.mul_int(2).min(Fixed::ONE);
        adjusted.item_priority = Fixed::ONE;
    }
    adjusted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed_point::BinaryAngle;
    use crate::geometry::Vec2;
    use crate::personality::SkillLevel;

    fn at(x: i32, rank: u8) -> CarSnapshot {
        CarSnapshot {
            position: Vec2::from_int(x, 0),
            heading: BinaryAngle::RIGHT,
            speed: Fixed::ZERO,
            rank,
        }
    }

    #[test]
    fn test_rubber_band_ranges() {
        let player = at(0, 4);
        let boosted = SPEED_NOMINAL * RUBBERBAND_BOOST_MULT;
        let slowed = SPEED_NOMINAL * RUBBERBAND_SLOW_MULT;

        assert_eq!(rubber_band_max_speed(&at(350, 6), &player), boosted);
        assert_eq!(rubber_band_max_speed(&at(250, 6), &player), SPEED_NOMINAL);
        assert_eq!(rubber_band_max_speed(&at(350, 2), &player), SPEED_NOMINAL);
        assert_eq!(rubber_band_max_speed(&at(450, 2), &player), slowed);
        assert_eq!(rubber_band_max_speed(&at(450, 6), &player), boosted);
        assert!(boosted > SPEED_NOMINAL && slowed < SPEED_NOMINAL);
    }

    #[test]
    fn test_effective_personality_is_pure() {
        let base = Personality::new(SkillLevel::Medium, 70, 60, 50, 10).expect("valid");

        let leader = effective_personality(&base, 1);
        assert_eq!(leader.item_priority, base.item_priority.div_int(2));
        assert_eq!(leader.aggression, base.aggression);

        let mid = effective_personality(&base, 4);
        assert_eq!(mid, base);

        let back = effective_personality(&base, 7);
        assert_eq!(back.aggression, Fixed::ONE);
        assert_eq!(back.item_priority, Fixed::ONE);
        assert_eq!(back.consistency, base.consistency);

        // Computed from the base every time, so ticks never compound.
        assert_eq!(effective_personality(&base, 1), leader);
    }

    #[test]
    fn test_back_pack_aggression_doubles_below_cap() {
        let base = Personality::new(SkillLevel::Easy, 50, 30, 60, 20).expect("valid");
        let back = effective_personality(&base, 8);
        assert_eq!(back.aggression, base.aggression.mul_int(2));
    }
}
