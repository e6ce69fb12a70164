//! Item strategy: detouring for pickups and deciding when to fire.

use crate::constants::{
    GREEN_SHELL_RANGE, HAZARD_DROP_LEADER_PERCENT, HAZARD_DROP_PACK_PERCENT,
    ITEM_SEARCH_RADIUS, ITEM_USE_COOLDOWN_MIN, ITEM_USE_COOLDOWN_SPAN, LEADER_RANK_MAX,
    LEADER_SEEK_RADIUS, MUSHROOM_RANGE,
};
use crate::fixed_point::Fixed;
use crate::geometry::Vec2;
use crate::personality::Personality;
use crate::rng::SeededRng;
use crate::track::WaypointTrack;
use crate::vehicle::Vehicle;
use crate::world::{CarSnapshot, ItemKind, ItemService, PickupSpawn, RaceSnapshot};

use super::blend::{Layer, Weight};
use super::state::ItemState;

/// Nearest active pickup within the search radius that lies ahead.
pub fn nearest_pickup_ahead(car: &CarSnapshot, spawns: &[PickupSpawn]) -> Option<Vec2> {
    let forward = car.forward();
    let radius_sq = ITEM_SEARCH_RADIUS * ITEM_SEARCH_RADIUS;

    spawns
        .iter()
        .filter(|spawn| spawn.active)
        .map(|spawn| (spawn.position, car.position.distance_sq(spawn.position)))
        .filter(|(pos, dist_sq)| {
            *dist_sq < radius_sq && (*pos - car.position).normalize().dot(forward) > Fixed::ZERO
        })
        .min_by_key(|(_, dist_sq)| *dist_sq)
        .map(|(pos, _)| pos)
}

/// Whether to divert toward a pickup `distance` away.
///
/// Never while holding an item. Otherwise a roll in 0..256 must land under
/// `item_priority`. Leaders only go for pickups very close by; everyone else
/// goes. Leadership wins over the back-half rule, so rank 2 in a two-car
/// field still counts as a leader.
pub fn should_seek(
    held: ItemKind,
    rank: u8,
    car_count: usize,
    distance: Fixed,
    item_priority: Fixed,
    rng: &mut SeededRng,
) -> bool {
    if !held.is_none() {
        return false;
    }
    if rng.roll_256() >= item_priority.raw() {
        return false;
    }

    let back_half = usize::from(rank) > (car_count / 2).max(usize::from(LEADER_RANK_MAX));
    let leader = !back_half && rank <= LEADER_RANK_MAX;
    !leader || distance < LEADER_SEEK_RADIUS
}

/// Pull toward the pickup, 1 at the pickup fading to 0 at the search radius.
pub fn intercept_weight(distance: Fixed) -> Weight {
    let weight = Fixed::ONE - distance / ITEM_SEARCH_RADIUS;
    Weight::from_fixed(weight.max(Fixed::ZERO))
}

pub fn seek(
    state: &mut ItemState,
    car: &CarSnapshot,
    held: ItemKind,
    spawns: &[PickupSpawn],
    personality: &Personality,
    car_count: usize,
    rng: &mut SeededRng,
) -> Layer {
    state.seeking = false;
    let Some(pickup) = nearest_pickup_ahead(car, spawns) else {
        return Layer::PassThrough;
    };
    state.pickup_position = pickup;

    let distance = car.position.distance(pickup);
    if !should_seek(
        held,
        car.rank,
        car_count,
        distance,
        personality.item_priority,
        rng,
    ) {
        return Layer::PassThrough;
    }

    state.seeking = true;
    Layer::Blend {
        target: pickup,
        weight: intercept_weight(distance),
    }
}

/// A car ranked ahead of `slot` that is within `range` and in front.
pub fn rival_ahead_within(
    slot: usize,
    car: &CarSnapshot,
    race: &RaceSnapshot<'_>,
    range: Fixed,
) -> bool {
    let forward = car.forward();
    race.rivals(slot).any(|(_, other)| {
        other.rank < car.rank
            && car.position.distance(other.position) < range
            && (other.position - car.position).dot(forward) > Fixed::ZERO
    })
}

/// Firing decision for a held item: `Some(fire_forward)` to use it now.
pub fn decide_use(
    held: ItemKind,
    slot: usize,
    car: &CarSnapshot,
    race: &RaceSnapshot<'_>,
    on_straight: bool,
    aggression: Fixed,
    rng: &mut SeededRng,
) -> Option<bool> {
    let fire = match held {
        ItemKind::None => false,
        ItemKind::SpeedBoost => on_straight,
        ItemKind::Banana | ItemKind::Oil | ItemKind::Bomb => {
            let percent = if car.rank <= LEADER_RANK_MAX {
                HAZARD_DROP_LEADER_PERCENT
            } else {
                HAZARD_DROP_PACK_PERCENT
            };
            return rng.chance_percent(percent).then_some(false);
        }
        ItemKind::GreenShell => rival_ahead_within(slot, car, race, GREEN_SHELL_RANGE),
        ItemKind::RedShell | ItemKind::Missile => rng.roll_256() < aggression.raw(),
        ItemKind::Mushroom => rival_ahead_within(slot, car, race, MUSHROOM_RANGE),
    };
    fire.then_some(true)
}

/// Runs after control each tick. Returns the item deployed, if any.
#[allow(clippy::too_many_arguments)]
pub fn update_usage<V, I>(
    state: &mut ItemState,
    vehicle: &mut V,
    slot: usize,
    personality: &Personality,
    race: &RaceSnapshot<'_>,
    track: &WaypointTrack,
    target_waypoint: usize,
    items: &mut I,
    rng: &mut SeededRng,
) -> Option<ItemKind>
where
    V: Vehicle,
    I: ItemService + ?Sized,
{
    let held = vehicle.held_item();
    state.held_ticks = if held.is_none() {
        0
    } else {
        state.held_ticks.saturating_add(1)
    };

    if state.use_cooldown > 0 {
        state.use_cooldown -= 1;
        return None;
    }
    if held.is_none() || state.held_ticks <= personality.reaction_delay {
        return None;
    }

    let car = CarSnapshot::of(vehicle);
    let fire_forward = decide_use(
        held,
        slot,
        &car,
        race,
        track.is_straight_at(target_waypoint),
        personality.aggression,
        rng,
    )?;

    items.use_item(slot, vehicle, fire_forward);
    state.use_cooldown = ITEM_USE_COOLDOWN_MIN + rng.below(ITEM_USE_COOLDOWN_SPAN as u32) as i32;
    Some(held)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed_point::BinaryAngle;

    fn car_at(x: i32, y: i32, heading: BinaryAngle, rank: u8) -> CarSnapshot {
        CarSnapshot {
            position: Vec2::from_int(x, y),
            heading,
            speed: Fixed::from_int(2),
            rank,
        }
    }

    fn spawn(x: i32, y: i32, active: bool) -> PickupSpawn {
        PickupSpawn {
            position: Vec2::from_int(x, y),
            active,
        }
    }

    #[test]
    fn test_nearest_pickup_ahead_filters() {
        let car = car_at(100, 100, BinaryAngle::RIGHT, 4);
        let spawns = [
            spawn(40, 100, true),   // behind
            spawn(190, 100, false), // inactive
            spawn(230, 100, true),  // ahead
            spawn(170, 120, true),  // ahead and nearer
            spawn(400, 100, true),  // out of range
        ];
        assert_eq!(nearest_pickup_ahead(&car, &spawns), Some(Vec2::from_int(170, 120)));
        assert_eq!(nearest_pickup_ahead(&car, &spawns[..2]), None);
    }

    #[test]
    fn test_zero_priority_never_seeks() {
        let mut rng = SeededRng::new(1);
        for _ in 0..2_000 {
            assert!(!should_seek(
                ItemKind::None,
                8,
                8,
                Fixed::from_int(10),
                Fixed::ZERO,
                &mut rng
            ));
        }
    }

    #[test]
    fn test_seek_gates_by_rank() {
        let mut rng = SeededRng::new(2);
        let far = Fixed::from_int(100);
        let near = Fixed::from_int(20);
        for _ in 0..200 {
            assert!(should_seek(ItemKind::None, 6, 8, far, Fixed::ONE, &mut rng));
            assert!(should_seek(ItemKind::None, 3, 8, far, Fixed::ONE, &mut rng));
            assert!(!should_seek(ItemKind::None, 1, 8, far, Fixed::ONE, &mut rng));
            assert!(should_seek(ItemKind::None, 2, 8, near, Fixed::ONE, &mut rng));
            assert!(!should_seek(ItemKind::Banana, 8, 8, near, Fixed::ONE, &mut rng));
        }
    }

    #[test]
    fn test_small_field_leaders_stay_on_line() {
        let mut rng = SeededRng::new(0x2CA2);
        let just_off_line = Fixed::from_int(120);
        let close = Fixed::from_int(30);
        for _ in 0..200 {
            assert!(!should_seek(ItemKind::None, 2, 2, just_off_line, Fixed::ONE, &mut rng));
            assert!(!should_seek(ItemKind::None, 2, 4, just_off_line, Fixed::ONE, &mut rng));
            assert!(!should_seek(ItemKind::None, 1, 3, just_off_line, Fixed::ONE, &mut rng));
            assert!(should_seek(ItemKind::None, 2, 2, close, Fixed::ONE, &mut rng));
            assert!(should_seek(ItemKind::None, 3, 4, just_off_line, Fixed::ONE, &mut rng));
        }
    }

    #[test]
    fn test_intercept_weight_fades_with_distance() {
        assert!(intercept_weight(Fixed::ZERO).is_full());
        assert!(intercept_weight(ITEM_SEARCH_RADIUS).is_none());
        assert!(intercept_weight(Fixed::from_int(400)).is_none());
        assert_eq!(intercept_weight(Fixed::from_int(75)), Weight::new(128, 256));
    }

    #[test]
    fn test_rival_ahead_needs_better_rank_and_forward_position() {
        let cars = [
            car_at(100, 100, BinaryAngle::RIGHT, 3),
            car_at(140, 100, BinaryAngle::RIGHT, 2),
            car_at(60, 100, BinaryAngle::RIGHT, 1),
        ];
        let race = RaceSnapshot::new(&cars, None);
        assert!(rival_ahead_within(0, &cars[0], &race, GREEN_SHELL_RANGE));
        assert!(rival_ahead_within(0, &cars[0], &race, MUSHROOM_RANGE));
        assert!(!rival_ahead_within(0, &cars[0], &race, Fixed::from_int(30)));
        // Car 2 leads on rank but sits behind car 1 on the road.
        assert!(!rival_ahead_within(1, &cars[1], &race, GREEN_SHELL_RANGE));
    }

    #[test]
    fn test_decide_use_rules() {
        let cars = [car_at(100, 100, BinaryAngle::RIGHT, 5)];
        let race = RaceSnapshot::new(&cars, None);
        let mut rng = SeededRng::new(11);
        let me = cars[0];

        assert_eq!(
            decide_use(ItemKind::SpeedBoost, 0, &me, &race, true, Fixed::ZERO, &mut rng),
            Some(true)
        );
        assert_eq!(
            decide_use(ItemKind::SpeedBoost, 0, &me, &race, false, Fixed::ZERO, &mut rng),
            None
        );
        assert_eq!(
            decide_use(ItemKind::GreenShell, 0, &me, &race, true, Fixed::ONE, &mut rng),
            None
        );
        assert_eq!(
            decide_use(ItemKind::RedShell, 0, &me, &race, true, Fixed::ZERO, &mut rng),
            None
        );
        for _ in 0..50 {
            assert_eq!(
                decide_use(ItemKind::Missile, 0, &me, &race, true, Fixed::from_raw(256), &mut rng),
                Some(true)
            );
        }

        let mut drops = 0;
        for _ in 0..1_000 {
            if let Some(fire_forward) =
                decide_use(ItemKind::Banana, 0, &me, &race, true, Fixed::ZERO, &mut rng)
            {
                assert!(!fire_forward);
                drops += 1;
            }
        }
        assert!((200..400).contains(&drops), "pack drop rate {drops}");
    }
}
