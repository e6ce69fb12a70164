//! Pickup boxes, dropped hazards and projectile hits for headless races.
//!
//! Projectiles are not simulated in flight: a shot picks its victim when it
//! is fired and lands after a fixed travel time.

use kart_bot_core::{
    CarSnapshot, Fixed, ItemKind, ItemService, PickupSpawn, SeededRng, TrackItem, Vec2, Vehicle,
    Waypoint,
};
use serde::Serialize;

use crate::car::KinematicCar;

pub const ITEM_BOX_RESPAWN_TICKS: u32 = 180;
pub const ITEM_BOX_HITBOX_PX: i32 = 16;
pub const HAZARD_HITBOX_PX: i32 = 16;
pub const OIL_HITBOX_PX: i32 = 32;
pub const HAZARD_DROP_OFFSET_PX: i32 = 40;
pub const HAZARD_LIFETIME_TICKS: u32 = 600;
pub const SPEED_BOOST_TICKS: u32 = 150;
pub const CONFUSION_TICKS: u32 = 210;
pub const PROJECTILE_TRAVEL_TICKS: u32 = 20;
pub const GREEN_SHELL_RANGE_PX: i32 = 200;
pub const MAX_TRACK_ITEMS: usize = 32;

/// Weights per rank (1st..8th) in `ItemKind::HELD` order:
/// banana, oil, bomb, green shell, red shell, missile, mushroom, speed boost.
const ITEM_WEIGHTS: [[u32; 8]; 8] = [
    [17, 18, 5, 15, 10, 0, 15, 20],
    [17, 17, 5, 16, 12, 0, 13, 20],
    [15, 15, 5, 15, 15, 0, 12, 23],
    [13, 13, 5, 17, 17, 0, 10, 25],
    [12, 12, 5, 18, 18, 0, 10, 25],
    [10, 10, 5, 18, 18, 0, 14, 25],
    [8, 8, 5, 18, 18, 0, 18, 25],
    [7, 7, 5, 17, 17, 5, 17, 25],
];

/// Rolls a held item from the weight row for `rank`.
pub fn roll_item(rank: u8, rng: &mut SeededRng) -> ItemKind {
    let row = &ITEM_WEIGHTS[usize::from(rank.clamp(1, 8)) - 1];
    let total: u32 = row.iter().sum();
    let mut roll = rng.below(total);
    for (kind, weight) in ItemKind::HELD.iter().zip(row) {
        if roll < *weight {
            return *kind;
        }
        roll -= weight;
    }
    ItemKind::SpeedBoost
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Effect {
    Hit,
    Confuse,
    Boost,
}

#[derive(Clone, Copy, Debug)]
struct PendingEffect {
    slot: usize,
    ticks_left: u32,
    effect: Effect,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ItemStats {
    pub pickups: u32,
    pub uses: u32,
    pub projectile_hits: u32,
    pub hazard_hits: u32,
}

pub struct RaceItems {
    spawns: Vec<PickupSpawn>,
    respawn_timers: Vec<u32>,
    hazards: Vec<TrackItem>,
    hazard_ttl: Vec<u32>,
    pending: Vec<PendingEffect>,
    cars: Vec<CarSnapshot>,
    rng: SeededRng,
    stats: ItemStats,
}

impl RaceItems {
    /// One item box on every `stride`-th waypoint. A stride of zero places none.
    pub fn new(waypoints: &[Waypoint], stride: usize, seed: u32) -> Self {
        let spawns: Vec<PickupSpawn> = if stride == 0 {
            Vec::new()
        } else {
            waypoints
                .iter()
                .step_by(stride)
                .map(|wp| PickupSpawn {
                    position: wp.position,
                    active: true,
                })
                .collect()
        };
        Self {
            respawn_timers: vec![0; spawns.len()],
            spawns,
            hazards: Vec::with_capacity(MAX_TRACK_ITEMS),
            hazard_ttl: Vec::with_capacity(MAX_TRACK_ITEMS),
            pending: Vec::new(),
            cars: Vec::new(),
            rng: SeededRng::new(seed),
            stats: ItemStats::default(),
        }
    }

    pub fn stats(&self) -> ItemStats {
        self.stats
    }

    /// Latest positions used to aim projectiles fired this tick.
    pub fn observe(&mut self, cars: &[CarSnapshot]) {
        self.cars.clear();
        self.cars.extend_from_slice(cars);
    }

    pub fn place_hazard(&mut self, kind: ItemKind, position: Vec2) {
        if self.hazards.len() == MAX_TRACK_ITEMS {
            self.hazards.remove(0);
            self.hazard_ttl.remove(0);
        }
        self.hazards.push(TrackItem {
            kind,
            position,
            active: true,
        });
        self.hazard_ttl.push(HAZARD_LIFETIME_TICKS);
    }

    fn schedule(&mut self, slot: usize, ticks_left: u32, effect: Effect) {
        self.pending.push(PendingEffect {
            slot,
            ticks_left,
            effect,
        });
    }

    fn shell_target(&self, shooter: usize, origin: &CarSnapshot, forward: bool) -> Option<usize> {
        let facing = origin.forward();
        let range = Fixed::from_int(GREEN_SHELL_RANGE_PX);
        let range_sq = range * range;
        self.cars
            .iter()
            .enumerate()
            .filter(|(slot, _)| *slot != shooter)
            .filter(|(_, car)| {
                let along = (car.position - origin.position).dot(facing);
                (along > Fixed::ZERO) == forward
            })
            .map(|(slot, car)| (slot, origin.position.distance_sq(car.position)))
            .filter(|(_, dist_sq)| *dist_sq <= range_sq)
            .min_by_key(|(_, dist_sq)| *dist_sq)
            .map(|(slot, _)| slot)
    }

    fn ranked_target(&self, shooter: usize, rank: u8) -> Option<usize> {
        self.cars
            .iter()
            .position(|car| car.rank == rank)
            .filter(|slot| *slot != shooter)
    }

    /// Advances boxes, hazards and pending hits by one tick.
    pub fn tick(&mut self, karts: &mut [KinematicCar]) {
        for (spawn, timer) in self.spawns.iter_mut().zip(&mut self.respawn_timers) {
            if !spawn.active {
                *timer = timer.saturating_sub(1);
                spawn.active = *timer == 0;
            }
        }

        let box_reach_sq = Fixed::from_int(ITEM_BOX_HITBOX_PX * ITEM_BOX_HITBOX_PX);
        for kart in karts.iter_mut() {
            if !kart.held_item().is_none() {
                continue;
            }
            let position = kart.position();
            let Some(index) = self
                .spawns
                .iter()
                .position(|spawn| {
                    spawn.active && position.distance_sq(spawn.position) <= box_reach_sq
                })
            else {
                continue;
            };
            self.spawns[index].active = false;
            self.respawn_timers[index] = ITEM_BOX_RESPAWN_TICKS;
            kart.set_held_item(roll_item(kart.rank(), &mut self.rng));
            self.stats.pickups += 1;
        }

        for hazard in self.hazards.iter_mut().filter(|hazard| hazard.active) {
            let reach = if hazard.kind == ItemKind::Oil {
                OIL_HITBOX_PX
            } else {
                HAZARD_HITBOX_PX
            };
            let reach_sq = Fixed::from_int(reach * reach);
            for kart in karts.iter_mut() {
                if kart.position().distance_sq(hazard.position) > reach_sq {
                    continue;
                }
                self.stats.hazard_hits += 1;
                if hazard.kind == ItemKind::Oil {
                    kart.slow();
                } else {
                    kart.stop();
                    hazard.active = false;
                    break;
                }
            }
        }

        for ttl in &mut self.hazard_ttl {
            *ttl = ttl.saturating_sub(1);
        }
        let mut index = 0;
        while index < self.hazards.len() {
            if self.hazards[index].active && self.hazard_ttl[index] > 0 {
                index += 1;
            } else {
                self.hazards.remove(index);
                self.hazard_ttl.remove(index);
            }
        }

        let mut still_pending = Vec::with_capacity(self.pending.len());
        for mut pending in self.pending.drain(..) {
            if pending.ticks_left > 0 {
                pending.ticks_left -= 1;
                still_pending.push(pending);
                continue;
            }
            let Some(kart) = karts.get_mut(pending.slot) else {
                continue;
            };
            match pending.effect {
                Effect::Hit => {
                    kart.stop();
                    self.stats.projectile_hits += 1;
                }
                Effect::Confuse => kart.confuse(CONFUSION_TICKS),
                Effect::Boost => kart.start_boost(SPEED_BOOST_TICKS),
            }
        }
        self.pending = still_pending;
    }
}

impl ItemService for RaceItems {
    fn pickup_spawns(&self) -> &[PickupSpawn] {
        &self.spawns
    }

    fn track_items(&self) -> &[TrackItem] {
        &self.hazards
    }

    fn use_item(&mut self, slot: usize, vehicle: &mut dyn Vehicle, fire_forward: bool) {
        let held = vehicle.held_item();
        if held.is_none() {
            return;
        }
        vehicle.set_held_item(ItemKind::None);
        self.stats.uses += 1;

        let origin = CarSnapshot::of(&*vehicle);
        match held {
            ItemKind::None => {}
            ItemKind::Banana | ItemKind::Oil | ItemKind::Bomb => {
                let behind = origin
                    .forward()
                    .scale(Fixed::from_int(-HAZARD_DROP_OFFSET_PX));
                self.place_hazard(held, origin.position + behind);
            }
            ItemKind::GreenShell => {
                if let Some(victim) = self.shell_target(slot, &origin, fire_forward) {
                    self.schedule(victim, PROJECTILE_TRAVEL_TICKS, Effect::Hit);
                }
            }
            ItemKind::RedShell => {
                if let Some(victim) = self.ranked_target(slot, origin.rank.saturating_sub(1)) {
                    self.schedule(victim, PROJECTILE_TRAVEL_TICKS, Effect::Hit);
                }
            }
            ItemKind::Missile => {
                if let Some(victim) = self.ranked_target(slot, 1) {
                    self.schedule(victim, PROJECTILE_TRAVEL_TICKS, Effect::Hit);
                }
            }
            ItemKind::Mushroom => {
                if let Some(victim) = self.shell_target(slot, &origin, true) {
                    self.schedule(victim, 0, Effect::Confuse);
                }
            }
            ItemKind::SpeedBoost => self.schedule(slot, 0, Effect::Boost),
        }
    }
}
