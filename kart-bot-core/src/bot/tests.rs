use super::*;
use crate::constants::{
    HAZARD_AVOIDANCE_DURATION, OVERTAKE_SIDE_OFFSET, RUBBERBAND_BOOST_MULT, SPEED_NOMINAL,
    STUCK_STILL_FRAMES, TURN_STEP, WALL_AVOID_DISTANCE, WALL_AVOID_WEIGHT_DEN,
    WALL_AVOID_WEIGHT_NUM,
};
use crate::fixed_point::BinaryAngle;
use crate::track::Waypoint;
use crate::tracks::{scorching_sands, OvalTrack};
use crate::world::{PickupSpawn, TrackItem};

const ACCEL_STEP: Fixed = Fixed::from_raw(64);

#[derive(Clone, Debug)]
struct TestKart {
    position: Vec2,
    heading: BinaryAngle,
    speed: Fixed,
    max_speed: Fixed,
    held: ItemKind,
    rank: u8,
    /// Commands are recorded but never change speed or position.
    frozen: bool,
    accelerations: u32,
    brakes: u32,
    steers: Vec<i32>,
}

impl TestKart {
    fn at(x: i32, y: i32, heading: BinaryAngle) -> Self {
        Self {
            position: Vec2::from_int(x, y),
            heading,
            speed: Fixed::ZERO,
            max_speed: SPEED_NOMINAL,
            held: ItemKind::None,
            rank: 4,
            frozen: false,
            accelerations: 0,
            brakes: 0,
            steers: Vec::new(),
        }
    }

    fn frozen(mut self) -> Self {
        self.frozen = true;
        self
    }

    fn integrate(&mut self) {
        if !self.frozen {
            self.position = self.position + Vec2::from_angle(self.heading).scale(self.speed);
        }
    }

    fn snapshot(&self) -> CarSnapshot {
        CarSnapshot::of(self)
    }
}

impl Vehicle for TestKart {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn heading(&self) -> BinaryAngle {
        self.heading
    }

    fn speed(&self) -> Fixed {
        self.speed
    }

    fn max_speed(&self) -> Fixed {
        self.max_speed
    }

    fn held_item(&self) -> ItemKind {
        self.held
    }

    fn rank(&self) -> u8 {
        self.rank
    }

    fn accelerate(&mut self) {
        self.accelerations += 1;
        if !self.frozen {
            self.speed = (self.speed + ACCEL_STEP).min(self.max_speed);
        }
    }

    fn brake(&mut self) {
        self.brakes += 1;
        if !self.frozen {
            self.speed = (self.speed - ACCEL_STEP).max(Fixed::ZERO);
        }
    }

    fn steer(&mut self, delta: i32) {
        self.steers.push(delta);
        self.heading = self.heading.wrapping_add(delta);
    }

    fn set_max_speed(&mut self, max_speed: Fixed) {
        self.max_speed = max_speed;
    }

    fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    fn set_heading(&mut self, heading: BinaryAngle) {
        self.heading = heading;
    }

    fn set_speed(&mut self, speed: Fixed) {
        self.speed = speed;
    }

    fn set_held_item(&mut self, item: ItemKind) {
        self.held = item;
    }
}

struct OpenRoad;

impl CollisionQuery for OpenRoad {
    fn collides(&self, _x: i32, _y: i32, _radius: i32, _quadrant: Quadrant) -> bool {
        false
    }

    fn surface_normal(&self, _x: i32, _y: i32, _quadrant: Quadrant) -> (i32, i32) {
        (0, 0)
    }
}

/// Solid from `wall_x` rightward; the surface faces up the screen.
struct WallAhead {
    wall_x: i32,
}

impl CollisionQuery for WallAhead {
    fn collides(&self, x: i32, _y: i32, radius: i32, _quadrant: Quadrant) -> bool {
        x + radius >= self.wall_x
    }

    fn surface_normal(&self, _x: i32, _y: i32, _quadrant: Quadrant) -> (i32, i32) {
        (0, -1)
    }
}

#[derive(Default)]
struct TestItems {
    spawns: Vec<PickupSpawn>,
    hazards: Vec<TrackItem>,
    used: Vec<(usize, ItemKind, bool)>,
}

impl ItemService for TestItems {
    fn pickup_spawns(&self) -> &[PickupSpawn] {
        &self.spawns
    }

    fn track_items(&self) -> &[TrackItem] {
        &self.hazards
    }

    fn use_item(&mut self, slot: usize, vehicle: &mut dyn Vehicle, fire_forward: bool) {
        self.used.push((slot, vehicle.held_item(), fire_forward));
        vehicle.set_held_item(ItemKind::None);
    }
}

fn straight_track() -> [Waypoint; 4] {
    [100, 300, 500, 700].map(|x| {
        Waypoint::new(Vec2::from_int(x, 300), SPEED_NOMINAL, BinaryAngle::RIGHT, x == 500)
    })
}

fn straight_definition(fallback: &[Waypoint]) -> TrackDefinition<'_> {
    TrackDefinition {
        name: "straight",
        inner_boundary: &[],
        outer_boundary: &[],
        fallback,
        geometry: TrackGeometry::default(),
    }
}

fn tick(engine: &mut BotEngine, kart: &mut TestKart, items: &mut TestItems) -> TickReport {
    let cars = [kart.snapshot()];
    let race = RaceSnapshot::new(&cars, None);
    engine
        .update(kart, 0, &race, &OpenRoad, items)
        .expect("slot 0 is valid")
}

#[test]
fn test_invalid_slot_is_silent_no_op() {
    let mut engine = BotEngine::with_track(&scorching_sands(), 7);
    let mut kart = TestKart::at(300, 300, BinaryAngle::RIGHT);
    let mut items = TestItems::default();
    let cars = [kart.snapshot()];
    let race = RaceSnapshot::new(&cars, None);

    assert!(engine
        .update(&mut kart, MAX_CARS, &race, &OpenRoad, &mut items)
        .is_none());
    assert!(engine.post_physics_update(&mut kart, 99, &OpenRoad).is_none());
    engine.reset(MAX_CARS);
    engine.set_personality(usize::MAX, Personality::default());

    assert!(engine.state(MAX_CARS).is_none());
    assert_eq!(kart.accelerations + kart.brakes, 0);
    assert!(kart.steers.is_empty());
}

#[test]
fn test_init_picks_waypoint_source() {
    let mut engine = BotEngine::new(1);
    assert_eq!(engine.source(), TrackSource::Empty);

    assert_eq!(engine.init(&scorching_sands()), TrackSource::Fallback);
    assert_eq!(engine.track().len(), 80);
    assert_eq!(engine.state(3).map(|s| s.nav.next_waypoint), Some(1));

    let oval = OvalTrack::<32>::new(300, 200, 60);
    assert_eq!(engine.init(&oval.definition()), TrackSource::RacingLine);
    assert!(!engine.track().is_empty());
}

#[test]
fn test_empty_track_holds_station() {
    let mut engine = BotEngine::with_track(&straight_definition(&[]), 3);
    assert_eq!(engine.source(), TrackSource::Empty);

    let mut kart = TestKart::at(300, 300, BinaryAngle::RIGHT);
    let mut items = TestItems::default();
    let report = tick(&mut engine, &mut kart, &mut items);

    assert_eq!(report.target, kart.position);
    assert_eq!(report.steer, 0);
    assert_eq!(report.throttle, Throttle::Coast);
    assert_eq!(report.target_waypoint, 0);
    assert!(report.layers.is_empty());
}

#[test]
fn test_zero_speed_nudges_once_on_tick_61() {
    let mut engine = BotEngine::with_track(&scorching_sands(), 11);
    let start = engine.track().as_slice()[0];
    let (x, y) = start.position.to_int();
    let mut kart = TestKart::at(x, y, start.corner_angle).frozen();
    let mut items = TestItems::default();

    let nudges: Vec<usize> = (1..=61)
        .filter(|_| tick(&mut engine, &mut kart, &mut items).stuck_nudge)
        .collect();

    assert_eq!(nudges, vec![61]);
    assert!(kart.steers.contains(&STUCK_NUDGE_STEER));
    assert_eq!(engine.state(0).map(|s| s.stuck.low_speed_ticks), Some(0));
}

#[test]
fn test_laps_the_oval_with_indices_in_range() {
    let oval = OvalTrack::<32>::new(300, 200, 60);
    let mut engine = BotEngine::with_track(&oval.definition(), 21);
    let count = engine.track().len();
    let start = engine.track().as_slice()[0];
    let (x, y) = start.position.to_int();
    let mut kart = TestKart::at(x, y, start.corner_angle);
    let mut items = TestItems::default();

    let mut wrapped = false;
    let mut last = 0;
    for _ in 0..3_000 {
        let report = tick(&mut engine, &mut kart, &mut items);
        kart.integrate();
        assert!(engine.post_physics_update(&mut kart, 0, &OpenRoad).is_none());

        let nav = engine.state(0).map(|s| s.nav).expect("slot 0");
        assert!(nav.target_waypoint < count);
        assert!(nav.next_waypoint < count);
        assert_eq!(report.target_waypoint, nav.target_waypoint);
        if nav.target_waypoint < last {
            wrapped = true;
        }
        last = nav.target_waypoint;
    }
    assert!(wrapped, "kart never completed a lap");
}

#[test]
fn test_still_kart_is_sent_to_checkpoint() {
    let mut engine = BotEngine::with_track(&scorching_sands(), 5);
    let mut kart = TestKart::at(600, 300, BinaryAngle::UP).frozen();
    kart.speed = Fixed::ONE;

    let mut recovery = None;
    let mut calls = 0;
    while recovery.is_none() && calls < 200 {
        recovery = engine.post_physics_update(&mut kart, 0, &OpenRoad);
        calls += 1;
    }
    let recovery = recovery.expect("still kart must be recovered");

    assert_eq!(calls, usize::from(STUCK_STILL_FRAMES) + 1);
    assert_eq!(recovery.reason, StuckReason::StillFrames);
    assert_eq!(recovery.kind, RecoveryKind::Checkpoint);
    let waypoint = engine.track().get(recovery.waypoint).copied().expect("valid");
    assert!(waypoint.checkpoint);
    assert_eq!(kart.position, waypoint.position);
    assert_eq!(kart.speed, Fixed::ZERO);
    assert_eq!(
        engine.state(0).map(|s| s.nav.target_waypoint),
        Some(recovery.waypoint)
    );
}

#[test]
fn test_kart_in_rescue_zone_uses_rescue_spot() {
    let mut engine = BotEngine::with_track(&scorching_sands(), 5);
    let mut kart = TestKart::at(150, 600, BinaryAngle::UP).frozen();

    let recovery = (0..200)
        .find_map(|_| engine.post_physics_update(&mut kart, 0, &OpenRoad))
        .expect("recovered");

    assert_eq!(recovery.kind, RecoveryKind::RescueSpot);
    assert_eq!(kart.position, Vec2::from_int(265, 697));
    assert_eq!(kart.heading, BinaryAngle::RIGHT);
}

#[test]
fn test_same_seed_same_decisions() {
    let oval = OvalTrack::<32>::new(300, 200, 60);
    let run = |seed: u32| {
        let mut engine = BotEngine::with_track(&oval.definition(), seed);
        let start = engine.track().as_slice()[0];
        let (x, y) = start.position.to_int();
        let mut kart = TestKart::at(x, y, start.corner_angle);
        let mut items = TestItems::default();
        (0..600)
            .map(|_| {
                let report = tick(&mut engine, &mut kart, &mut items);
                kart.integrate();
                report
            })
            .collect::<Vec<_>>()
    };

    assert_eq!(run(0xC0FFEE), run(0xC0FFEE));
}

#[test]
fn test_reseed_restarts_personality_stream() {
    let mut engine = BotEngine::new(99);
    let first = engine.generate_personality(SkillLevel::Hard);
    let _ = engine.generate_personality(SkillLevel::Hard);

    engine.reseed(99);
    assert_eq!(engine.generate_personality(SkillLevel::Hard), first);
    assert_eq!(engine.seed(), 99);
}

#[test]
fn test_rubber_band_only_for_bots() {
    let fallback = straight_track();
    let mut engine = BotEngine::with_track(&straight_definition(&fallback), 2);
    let mut items = TestItems::default();

    let mut bot = TestKart::at(150, 300, BinaryAngle::RIGHT);
    bot.rank = 5;
    let mut player = TestKart::at(650, 300, BinaryAngle::RIGHT);
    player.rank = 1;
    let cars = [bot.snapshot(), player.snapshot()];
    let race = RaceSnapshot::new(&cars, Some(1));

    let report = engine
        .update(&mut bot, 0, &race, &OpenRoad, &mut items)
        .expect("bot slot");
    assert_eq!(report.max_speed, SPEED_NOMINAL * RUBBERBAND_BOOST_MULT);
    assert_eq!(bot.max_speed, report.max_speed);

    let report = engine
        .update(&mut player, 1, &race, &OpenRoad, &mut items)
        .expect("player slot");
    assert_eq!(report.max_speed, SPEED_NOMINAL);
}

#[test]
fn test_item_waits_for_reaction_delay() {
    let fallback = straight_track();
    let mut engine = BotEngine::with_track(&straight_definition(&fallback), 4);
    let personality =
        Personality::new(SkillLevel::Medium, 80, 60, 50, 10).expect("valid personality");
    engine.set_personality(0, personality);

    let mut kart = TestKart::at(150, 300, BinaryAngle::RIGHT).frozen();
    kart.held = ItemKind::SpeedBoost;
    let mut items = TestItems::default();

    let used_on: Vec<usize> = (1..=30)
        .filter(|_| tick(&mut engine, &mut kart, &mut items).item_used.is_some())
        .collect();

    assert_eq!(used_on, vec![11]);
    assert_eq!(items.used, vec![(0, ItemKind::SpeedBoost, true)]);
    assert_eq!(kart.held, ItemKind::None);
}

#[test]
fn test_hazard_ahead_bends_the_target() {
    let fallback = straight_track();
    let mut engine = BotEngine::with_track(&straight_definition(&fallback), 6);
    let mut kart = TestKart::at(150, 300, BinaryAngle::RIGHT);
    kart.speed = Fixed::from_int(2);
    let mut items = TestItems {
        hazards: vec![TrackItem {
            kind: ItemKind::Banana,
            position: Vec2::from_int(220, 300),
            active: true,
        }],
        ..TestItems::default()
    };

    let report = tick(&mut engine, &mut kart, &mut items);

    assert!(report.layers.contains(Stage::Hazard));
    assert_ne!(report.target.y, Fixed::from_int(300));
    assert_eq!(
        engine.state(0).map(|s| s.hazard.countdown),
        Some(HAZARD_AVOIDANCE_DURATION - 1)
    );
}

#[test]
fn test_wall_ahead_brakes_and_turns_away() {
    let fallback = straight_track();
    let definition = straight_definition(&fallback);
    let wall = WallAhead { wall_x: 360 };
    let mut items = TestItems::default();

    let mut open_engine = BotEngine::with_track(&definition, 12);
    let mut open_kart = TestKart::at(300, 300, BinaryAngle::RIGHT).frozen();
    open_kart.speed = Fixed::from_int(3);
    let open = tick(&mut open_engine, &mut open_kart, &mut items);
    assert!(open.layers.is_empty());
    assert!(!open.wall_brake);

    let mut engine = BotEngine::with_track(&definition, 12);
    let mut kart = TestKart::at(300, 300, BinaryAngle::RIGHT).frozen();
    kart.speed = Fixed::from_int(3);
    let cars = [kart.snapshot()];
    let race = RaceSnapshot::new(&cars, None);
    let report = engine
        .update(&mut kart, 0, &race, &wall, &mut items)
        .expect("slot 0 is valid");

    let away = Vec2::new(Fixed::from_int(300), Fixed::from_int(300) - WALL_AVOID_DISTANCE);
    let expected = blend::mix(
        open.target,
        away,
        Weight::new(WALL_AVOID_WEIGHT_NUM, WALL_AVOID_WEIGHT_DEN),
    );
    assert!(report.layers.contains(Stage::Wall));
    assert_eq!(report.layers.iter().collect::<Vec<_>>(), vec![Stage::Wall]);
    assert_eq!(report.target, expected);
    assert!(report.wall_brake);
    assert_eq!(kart.brakes, open_kart.brakes + 1);
    assert_eq!(report.steer, -TURN_STEP);
    assert_eq!(kart.steers, vec![-TURN_STEP]);

    // Crawling into the same wall steers away without braking.
    let mut slow_engine = BotEngine::with_track(&definition, 12);
    let mut slow = TestKart::at(300, 300, BinaryAngle::RIGHT).frozen();
    slow.speed = Fixed::from_int(2);
    let cars = [slow.snapshot()];
    let race = RaceSnapshot::new(&cars, None);
    let report = slow_engine
        .update(&mut slow, 0, &race, &wall, &mut items)
        .expect("slot 0 is valid");
    assert!(report.layers.contains(Stage::Wall));
    assert!(!report.wall_brake);
    assert_eq!(report.steer, -TURN_STEP);
}

#[test]
fn test_slower_rival_ahead_sets_the_pass_point() {
    let fallback = straight_track();
    let definition = straight_definition(&fallback);
    let mut items = TestItems::default();

    let mut kart = TestKart::at(300, 300, BinaryAngle::RIGHT).frozen();
    kart.speed = Fixed::from_int(3);
    let mut rival = TestKart::at(340, 300, BinaryAngle::RIGHT);
    rival.speed = Fixed::ONE;
    rival.rank = 3;
    let cars = [kart.snapshot(), rival.snapshot()];
    let race = RaceSnapshot::new(&cars, None);
    let mut walled_kart = kart.clone();

    let mut engine = BotEngine::with_track(&definition, 31);
    let report = engine
        .update(&mut kart, 0, &race, &OpenRoad, &mut items)
        .expect("slot 0 is valid");

    let overtake = engine.state(0).map(|s| s.overtake).expect("slot 0");
    assert!(overtake.active);
    assert!(report.layers.contains(Stage::Overtake));
    assert_eq!(report.target, overtake.target);
    assert_eq!(report.target.x, Fixed::from_int(340));
    assert_eq!(
        (report.target.y - Fixed::from_int(300)).abs(),
        OVERTAKE_SIDE_OFFSET
    );

    // The pass point outranks a wall blend on the same tick.
    let mut walled = BotEngine::with_track(&definition, 31);
    let report = walled
        .update(&mut walled_kart, 0, &race, &WallAhead { wall_x: 360 }, &mut items)
        .expect("slot 0 is valid");
    let overtake = walled.state(0).map(|s| s.overtake).expect("slot 0");
    assert!(report.layers.contains(Stage::Wall));
    assert!(report.layers.contains(Stage::Overtake));
    assert!(report.wall_brake);
    assert_eq!(report.target, overtake.target);
}
