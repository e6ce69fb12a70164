//! The per-car decision engine.
//!
//! `BotEngine` owns one [`BotState`] and one random stream per car slot and
//! runs every behavior layer for a car once per tick. Layers only propose
//! steering targets; the [`Pipeline`] decides how they combine.

pub mod blend;
pub mod control;
pub mod hazard;
pub mod items;
pub mod mistakes;
pub mod navigation;
pub mod overtake;
pub mod state;
pub mod stuck;
pub mod tactics;
pub mod walls;

use serde::{Deserialize, Serialize};
use tracing::{info, trace};

use crate::constants::{CAR_RADIUS_PX, MAX_CARS, STUCK_NUDGE_STEER};
use crate::fixed_point::Fixed;
use crate::geometry::Vec2;
use crate::personality::{Personality, SkillLevel};
use crate::rng::SeededRng;
use crate::track::{TrackDefinition, TrackGeometry, TrackSource, WaypointTrack};
use crate::vehicle::Vehicle;
use crate::world::{CarSnapshot, CollisionQuery, ItemKind, ItemService, Quadrant, RaceSnapshot};

pub use blend::{Layer, Pipeline, Stage, StageSet, Weight};
pub use control::Throttle;
pub use state::BotState;
pub use stuck::{Recovery, RecoveryKind, StuckReason};

/// What one call to [`BotEngine::update`] decided.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    /// Final blended steering target.
    pub target: Vec2,
    pub target_waypoint: usize,
    /// Stages that changed the target this tick.
    pub layers: StageSet,
    pub steer: i32,
    pub throttle: Throttle,
    pub stuck_nudge: bool,
    pub wall_brake: bool,
    pub item_used: Option<ItemKind>,
    pub max_speed: Fixed,
}

pub struct BotEngine {
    track: WaypointTrack,
    source: TrackSource,
    geometry: TrackGeometry,
    states: [BotState; MAX_CARS],
    rngs: [SeededRng; MAX_CARS],
    session_rng: SeededRng,
    seed: u32,
}

impl BotEngine {
    /// Engine with no track loaded. Every bot holds station until
    /// [`BotEngine::init`] is called.
    pub fn new(seed: u32) -> Self {
        Self {
            track: WaypointTrack::empty(),
            source: TrackSource::Empty,
            geometry: TrackGeometry::default(),
            states: [BotState::new(Personality::default()); MAX_CARS],
            rngs: core::array::from_fn(|slot| SeededRng::for_slot(seed, slot)),
            session_rng: SeededRng::new(seed),
            seed,
        }
    }

    pub fn with_track(def: &TrackDefinition<'_>, seed: u32) -> Self {
        let mut engine = Self::new(seed);
        engine.init(def);
        engine
    }

    /// Loads the track's waypoints and resets every slot. Personalities
    /// already configured are kept.
    pub fn init(&mut self, def: &TrackDefinition<'_>) -> TrackSource {
        let (track, source) = WaypointTrack::load(def);
        self.track = track;
        self.source = source;
        self.geometry = def.geometry;
        for slot in 0..MAX_CARS {
            self.reset(slot);
        }
        info!(
            track = def.name,
            source = ?source,
            waypoints = self.track.len(),
            "bot engine initialised"
        );
        source
    }

    pub fn reset(&mut self, slot: usize) {
        let Some(state) = self.states.get_mut(slot) else {
            trace!(slot, "reset ignored for invalid slot");
            return;
        };
        state.reset();
        state.nav.next_waypoint = self.track.next_index(0);
    }

    pub fn set_personality(&mut self, slot: usize, personality: Personality) {
        let Some(state) = self.states.get_mut(slot) else {
            trace!(slot, "set_personality ignored for invalid slot");
            return;
        };
        state.base_personality = personality;
        state.personality = personality;
    }

    /// Samples a personality for `skill` from the session stream.
    pub fn generate_personality(&mut self, skill: SkillLevel) -> Personality {
        Personality::generate(skill, &mut self.session_rng)
    }

    /// Restarts every random stream from `seed`. Bot state is untouched.
    pub fn reseed(&mut self, seed: u32) {
        self.seed = seed;
        self.session_rng = SeededRng::new(seed);
        for (slot, rng) in self.rngs.iter_mut().enumerate() {
            *rng = SeededRng::for_slot(seed, slot);
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn state(&self, slot: usize) -> Option<&BotState> {
        self.states.get(slot)
    }

    pub fn track(&self) -> &WaypointTrack {
        &self.track
    }

    pub fn source(&self) -> TrackSource {
        self.source
    }

    pub fn geometry(&self) -> &TrackGeometry {
        &self.geometry
    }

    /// Decision tick for the car in `slot`: issues steer and throttle
    /// commands to `vehicle` and may fire its held item through `item_service`.
    pub fn update<V, C, I>(
        &mut self,
        vehicle: &mut V,
        slot: usize,
        race: &RaceSnapshot<'_>,
        collision: &C,
        item_service: &mut I,
    ) -> Option<TickReport>
    where
        V: Vehicle,
        C: CollisionQuery + ?Sized,
        I: ItemService + ?Sized,
    {
        let Self {
            track,
            geometry,
            states,
            rngs,
            ..
        } = self;
        let (Some(state), Some(rng)) = (states.get_mut(slot), rngs.get_mut(slot)) else {
            trace!(slot, "update ignored for invalid slot");
            return None;
        };

        let car = CarSnapshot::of(vehicle);

        if race.player_slot.is_some_and(|player| player != slot) {
            if let Some(player) = race.player() {
                vehicle.set_max_speed(tactics::rubber_band_max_speed(&car, player));
            }
        }
        let personality = tactics::effective_personality(&state.base_personality, car.rank);
        state.personality = personality;

        let racing_target =
            navigation::steering_target(car.position, car.speed, &mut state.nav, track);

        let mut pipeline = Pipeline::new(racing_target);
        pipeline.set(
            Stage::Mistake,
            mistakes::inject(&mut state.mistakes, &personality, rng),
        );
        pipeline.set(
            Stage::ItemSeek,
            items::seek(
                &mut state.items,
                &car,
                vehicle.held_item(),
                item_service.pickup_spawns(),
                &personality,
                race.car_count(),
                rng,
            ),
        );
        pipeline.set(
            Stage::Hazard,
            hazard::avoid(&mut state.hazard, &car, item_service.track_items(), geometry.center),
        );
        let wall = walls::avoid(&car, geometry, collision);
        if wall.brake {
            vehicle.brake();
        }
        pipeline.set(Stage::Wall, wall.layer);
        pipeline.set(
            Stage::Overtake,
            overtake::update(&mut state.overtake, slot, &car, race, rng),
        );
        let target = pipeline.resolve();

        let stuck_nudge = stuck::low_speed_tick(&mut state.stuck, car.speed);
        if stuck_nudge {
            vehicle.brake();
            vehicle.steer(STUCK_NUDGE_STEER);
        }

        let steer = control::steering_delta(vehicle.position(), vehicle.heading(), target);
        if steer != 0 {
            vehicle.steer(steer);
        }
        let target_waypoint = state.nav.target_waypoint;
        let throttle = control::throttle(
            vehicle.speed(),
            control::target_speed(track, target_waypoint, personality.skill),
        );
        match throttle {
            Throttle::Accelerate => vehicle.accelerate(),
            Throttle::Brake => vehicle.brake(),
            Throttle::Coast => {}
        }

        let item_used = items::update_usage(
            &mut state.items,
            vehicle,
            slot,
            &personality,
            race,
            track,
            target_waypoint,
            item_service,
            rng,
        );

        state.nav.steering_target = target;

        Some(TickReport {
            target,
            target_waypoint,
            layers: pipeline.active(),
            steer,
            throttle,
            stuck_nudge,
            wall_brake: wall.brake,
            item_used,
            max_speed: vehicle.max_speed(),
        })
    }

    /// Runs after physics has moved the car. Teleports it out when it has
    /// been stuck in place or kept grinding a wall.
    pub fn post_physics_update<V, C>(
        &mut self,
        vehicle: &mut V,
        slot: usize,
        collision: &C,
    ) -> Option<Recovery>
    where
        V: Vehicle + ?Sized,
        C: CollisionQuery + ?Sized,
    {
        let Some(state) = self.states.get_mut(slot) else {
            trace!(slot, "post-physics update ignored for invalid slot");
            return None;
        };

        let position = vehicle.position();
        let (x, y) = position.to_int();
        let touching_wall = collision.collides(x, y, CAR_RADIUS_PX, Quadrant::at(x, y));

        let reason =
            stuck::track_progress(&mut state.stuck, position, vehicle.speed(), touching_wall)?;
        let recovery =
            stuck::plan_recovery(reason, position, vehicle.heading(), &self.track, &self.geometry);
        stuck::apply_recovery(vehicle, state, &self.track, &recovery);

        info!(
            slot,
            reason = ?recovery.reason,
            kind = ?recovery.kind,
            waypoint = recovery.waypoint,
            "recovered stuck kart"
        );
        Some(recovery)
    }
}

#[cfg(test)]
mod tests;
