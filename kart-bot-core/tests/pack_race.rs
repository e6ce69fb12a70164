//! Several bots sharing one track through the public API.

use kart_bot_core::constants::{MAX_CARS, SPEED_NOMINAL};
use kart_bot_core::tracks::OvalTrack;
use kart_bot_core::{
    BinaryAngle, BotEngine, CarSnapshot, CollisionQuery, Fixed, ItemKind, ItemService,
    PickupSpawn, Quadrant, RaceSnapshot, SkillLevel, TickReport, TrackItem, TrackSource, Vec2,
    Vehicle,
};

const ACCEL: Fixed = Fixed::from_raw(48);

#[derive(Clone, Debug)]
struct Kart {
    position: Vec2,
    heading: BinaryAngle,
    speed: Fixed,
    max_speed: Fixed,
    held: ItemKind,
    rank: u8,
}

impl Kart {
    fn new(position: Vec2, heading: BinaryAngle) -> Self {
        Self {
            position,
            heading,
            speed: Fixed::ZERO,
            max_speed: SPEED_NOMINAL,
            held: ItemKind::None,
            rank: 1,
        }
    }

    fn step(&mut self) {
        self.position += Vec2::from_angle(self.heading).scale(self.speed);
    }
}

impl Vehicle for Kart {
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
        self.speed = (self.speed + ACCEL).min(self.max_speed);
    }
    fn brake(&mut self) {
        self.speed = (self.speed - ACCEL).max(Fixed::ZERO);
    }
    fn steer(&mut self, delta: i32) {
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

struct NoWalls;

impl CollisionQuery for NoWalls {
    fn collides(&self, _x: i32, _y: i32, _radius: i32, _quadrant: Quadrant) -> bool {
        false
    }
    fn surface_normal(&self, _x: i32, _y: i32, _quadrant: Quadrant) -> (i32, i32) {
        (0, 0)
    }
}

#[derive(Default)]
struct NoItems {
    uses: usize,
}

impl ItemService for NoItems {
    fn pickup_spawns(&self) -> &[PickupSpawn] {
        &[]
    }
    fn track_items(&self) -> &[TrackItem] {
        &[]
    }
    fn use_item(&mut self, _slot: usize, vehicle: &mut dyn Vehicle, _fire_forward: bool) {
        self.uses += 1;
        vehicle.set_held_item(ItemKind::None);
    }
}

/// Runs four bots of mixed skill for `ticks` and returns every report.
fn run_pack(seed: u32, ticks: usize) -> (Vec<Vec<TickReport>>, Vec<Kart>) {
    let oval = OvalTrack::<48>::new(360, 280, 60);
    let mut engine = BotEngine::with_track(&oval.definition(), seed);
    assert_eq!(engine.source(), TrackSource::RacingLine);

    let skills = [
        SkillLevel::Easy,
        SkillLevel::Medium,
        SkillLevel::Hard,
        SkillLevel::Medium,
    ];
    for (slot, skill) in skills.iter().enumerate() {
        let personality = engine.generate_personality(*skill);
        engine.set_personality(slot, personality);
    }

    let waypoints = engine.track().as_slice();
    let start = waypoints[0].position;
    let heading = (waypoints[1].position - start).to_angle();
    let mut karts: Vec<Kart> = (0..skills.len())
        .map(|slot| {
            let back = Vec2::from_angle(heading).scale(Fixed::from_int(20 * slot as i32 + 20));
            Kart::new(start - back, heading)
        })
        .collect();

    let mut reports = vec![Vec::with_capacity(ticks); karts.len()];
    let mut items = NoItems::default();
    for _ in 0..ticks {
        let cars: Vec<CarSnapshot> = karts.iter().map(CarSnapshot::of).collect();
        let race = RaceSnapshot::new(&cars, None);
        for (slot, kart) in karts.iter_mut().enumerate() {
            let report = engine
                .update(kart, slot, &race, &NoWalls, &mut items)
                .expect("slot in range");
            reports[slot].push(report);
        }
        for (slot, kart) in karts.iter_mut().enumerate() {
            kart.step();
            engine.post_physics_update(kart, slot, &NoWalls);
        }
    }
    assert_eq!(items.uses, 0);
    (reports, karts)
}

#[test]
fn pack_is_deterministic_per_seed() {
    let (first, karts_a) = run_pack(0x5EED, 800);
    let (second, karts_b) = run_pack(0x5EED, 800);
    assert_eq!(first, second);
    for (a, b) in karts_a.iter().zip(&karts_b) {
        assert_eq!(a.position, b.position);
        assert_eq!(a.heading, b.heading);
    }
}

#[test]
fn every_bot_works_its_way_around_the_oval() {
    let (reports, _) = run_pack(0xC0FFEE, 2_000);
    for per_car in &reports {
        let mut visited: Vec<usize> = per_car.iter().map(|report| report.target_waypoint).collect();
        visited.sort_unstable();
        visited.dedup();
        assert!(visited.len() > 10, "bot stalled on {} waypoints", visited.len());
    }
}

#[test]
fn slots_past_the_grid_are_ignored() {
    let oval = OvalTrack::<48>::new(360, 280, 60);
    let mut engine = BotEngine::with_track(&oval.definition(), 1);
    let mut kart = Kart::new(Vec2::from_int(500, 500), BinaryAngle::RIGHT);
    let cars = [CarSnapshot::of(&kart)];
    let race = RaceSnapshot::new(&cars, None);
    let mut items = NoItems::default();

    assert!(engine
        .update(&mut kart, MAX_CARS, &race, &NoWalls, &mut items)
        .is_none());
    assert!(engine
        .post_physics_update(&mut kart, MAX_CARS, &NoWalls)
        .is_none());
    assert_eq!(kart.speed, Fixed::ZERO);
    assert_eq!(kart.heading, BinaryAngle::RIGHT);
}
