use crate::arena::CorridorArena;
use crate::car::KinematicCar;
use crate::config::{HarnessConfig, TrackChoice};
use crate::items::{ItemStats, RaceItems};
use crate::util::seed_to_hex;
use anyhow::{anyhow, Context, Result};
use kart_bot_core::bot::StageSet;
use kart_bot_core::constants::{CAR_RADIUS_PX, MAX_RACING_LINE_POINTS};
use kart_bot_core::racing_line::RacingLine;
use kart_bot_core::tracks::{scorching_sands, OvalTrack};
use kart_bot_core::{
    BinaryAngle, BotEngine, CarSnapshot, CollisionQuery, Fixed, Personality, Quadrant,
    RaceSnapshot, SkillLevel, Stage, StuckReason, TrackSource, Vec2, Vehicle, Waypoint,
};
use serde::Serialize;
use std::cmp::Ordering;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

const OVAL_SAMPLES: usize = 48;
const OVAL_RADIUS_X: i32 = 380;
const OVAL_RADIUS_Y: i32 = 300;
const GRID_ROW_GAP_PX: i32 = 32;
const GRID_LANE_OFFSET_PX: i32 = 18;
const ITEM_SEED_SALT: u32 = 0x17E5_5EED;

#[derive(Clone, Debug, Serialize)]
pub struct CarMetrics {
    pub slot: usize,
    pub skill: SkillLevel,
    pub player: bool,
    pub personality: Personality,
    pub laps: u32,
    pub finish_tick: Option<u32>,
    pub final_rank: u8,
    pub recoveries: u32,
    pub wall_recoveries: u32,
    pub stuck_nudges: u32,
    pub wall_brakes: u32,
    pub mistake_ticks: u32,
    pub seek_ticks: u32,
    pub hazard_ticks: u32,
    pub wall_ticks: u32,
    pub overtake_ticks: u32,
    pub items_used: u32,
    pub wall_bounces: u32,
    /// Ticks spent past the track edges. Only tracks with boundaries report it.
    pub off_track_ticks: u32,
    /// Closest the kart came to an edge, in pixels; negative when it left.
    pub min_edge_clearance_px: Option<i32>,
}

impl CarMetrics {
    fn count_layers(&mut self, layers: StageSet) {
        for stage in layers.iter() {
            let counter = match stage {
                Stage::Mistake => &mut self.mistake_ticks,
                Stage::ItemSeek => &mut self.seek_ticks,
                Stage::Hazard => &mut self.hazard_ticks,
                Stage::Wall => &mut self.wall_ticks,
                Stage::Overtake => &mut self.overtake_ticks,
            };
            *counter += 1;
        }
    }

    fn observe_edges(&mut self, line: &RacingLine, position: Vec2) {
        if !line.is_on_track(position) {
            self.off_track_ticks += 1;
        }
        let clearance = line.distance_to_edge(position).to_int();
        self.min_edge_clearance_px = Some(
            self.min_edge_clearance_px
                .map_or(clearance, |best| best.min(clearance)),
        );
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct RaceReport {
    pub seed: u32,
    pub seed_hex: String,
    pub track: String,
    pub track_source: TrackSource,
    pub waypoints: usize,
    pub laps: u32,
    pub max_ticks: u32,
    pub ticks: u32,
    pub finished: usize,
    pub winner: Option<usize>,
    /// Hash of every kart's final position and heading.
    pub state_digest: u32,
    pub items: ItemStats,
    pub cars: Vec<CarMetrics>,
}

#[derive(Clone, Copy, Debug, Default)]
struct Progress {
    laps: u32,
    waypoint: usize,
    finish_tick: Option<u32>,
}

pub fn run_race(config: &HarnessConfig, seed: u32) -> Result<RaceReport> {
    config.validate()?;

    let oval = OvalTrack::<OVAL_SAMPLES>::new(
        OVAL_RADIUS_X,
        OVAL_RADIUS_Y,
        config.corridor_half_width_px,
    );
    let def = match config.track {
        TrackChoice::ScorchingSands => scorching_sands(),
        TrackChoice::Oval => oval.definition(),
    };

    let mut engine = BotEngine::with_track(&def, seed);
    let waypoints: Vec<Waypoint> = engine.track().as_slice().to_vec();
    if waypoints.is_empty() {
        return Err(anyhow!("track '{}' produced no waypoints", def.name));
    }

    let arena = CorridorArena::new(
        &waypoints,
        config.corridor_half_width_px,
        def.geometry.map_size_px,
    );
    let mut items = RaceItems::new(&waypoints, config.pickup_stride, seed ^ ITEM_SEED_SALT);
    let edges = RacingLine::generate(
        def.inner_boundary,
        def.outer_boundary,
        MAX_RACING_LINE_POINTS,
    )
    .ok();

    let mut cars = Vec::with_capacity(config.bot_count);
    let mut metrics = Vec::with_capacity(config.bot_count);
    for slot in 0..config.bot_count {
        let skill = config.skill_for(slot);
        let personality = engine.generate_personality(skill);
        engine.set_personality(slot, personality);

        let (position, heading) = grid_position(&waypoints, slot);
        cars.push(KinematicCar::new(position, heading));
        metrics.push(CarMetrics {
            slot,
            skill,
            player: config.player_slot == Some(slot),
            personality,
            laps: 0,
            finish_tick: None,
            final_rank: 0,
            recoveries: 0,
            wall_recoveries: 0,
            stuck_nudges: 0,
            wall_brakes: 0,
            mistake_ticks: 0,
            seek_ticks: 0,
            hazard_ticks: 0,
            wall_ticks: 0,
            overtake_ticks: 0,
            items_used: 0,
            wall_bounces: 0,
            off_track_ticks: 0,
            min_edge_clearance_px: None,
        });
    }

    let mut progress = vec![Progress::default(); config.bot_count];
    let mut snapshots = Vec::with_capacity(config.bot_count);
    let mut ticks = 0u32;

    while ticks < config.max_ticks {
        let ranks = standings(&progress, &cars, &waypoints);
        for (car, rank) in cars.iter_mut().zip(&ranks) {
            car.set_rank(*rank);
        }

        snapshots.clear();
        snapshots.extend(cars.iter().map(CarSnapshot::of));
        items.observe(&snapshots);
        let race = RaceSnapshot::new(&snapshots, config.player_slot);

        for (slot, car) in cars.iter_mut().enumerate() {
            let Some(report) = engine.update(car, slot, &race, &arena, &mut items) else {
                continue;
            };
            let tally = &mut metrics[slot];
            tally.stuck_nudges += u32::from(report.stuck_nudge);
            tally.wall_brakes += u32::from(report.wall_brake);
            tally.items_used += u32::from(report.item_used.is_some());
            tally.count_layers(report.layers);
        }

        for (slot, car) in cars.iter_mut().enumerate() {
            car.step();
            if bounce_off_walls(car, &arena) {
                metrics[slot].wall_bounces += 1;
            }
            if let Some(line) = &edges {
                metrics[slot].observe_edges(line, car.position());
            }
            if let Some(recovery) = engine.post_physics_update(car, slot, &arena) {
                metrics[slot].recoveries += 1;
                if recovery.reason == StuckReason::WallBounces {
                    metrics[slot].wall_recoveries += 1;
                }
            }
        }

        items.tick(&mut cars);
        ticks += 1;

        for (slot, entry) in progress.iter_mut().enumerate() {
            let Some(state) = engine.state(slot) else {
                continue;
            };
            let waypoint = state.nav.target_waypoint;
            advance_progress(entry, waypoint, waypoints.len());
            if entry.finish_tick.is_none() && entry.laps >= config.laps {
                entry.finish_tick = Some(ticks);
                debug!(slot, tick = ticks, "kart finished");
            }
        }

        if progress.iter().all(|entry| entry.finish_tick.is_some()) {
            break;
        }
    }

    let ranks = standings(&progress, &cars, &waypoints);
    for ((tally, entry), rank) in metrics.iter_mut().zip(&progress).zip(&ranks) {
        tally.laps = entry.laps;
        tally.finish_tick = entry.finish_tick;
        tally.final_rank = *rank;
    }
    let finished = progress
        .iter()
        .filter(|entry| entry.finish_tick.is_some())
        .count();
    let winner = ranks
        .iter()
        .position(|rank| *rank == 1)
        .filter(|slot| progress[*slot].finish_tick.is_some());

    info!(
        seed = %seed_to_hex(seed),
        track = def.name,
        ticks,
        finished,
        winner = ?winner,
        "race complete"
    );

    Ok(RaceReport {
        seed,
        seed_hex: seed_to_hex(seed),
        track: def.name.to_string(),
        track_source: engine.source(),
        waypoints: waypoints.len(),
        laps: config.laps,
        max_ticks: config.max_ticks,
        ticks,
        finished,
        winner,
        state_digest: state_digest(&cars),
        items: items.stats(),
        cars: metrics,
    })
}

pub fn write_report(path: &Path, report: &RaceReport) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating directory {}", parent.display()))?;
    }
    let encoded = serde_json::to_vec_pretty(report).context("failed to serialize race report")?;
    fs::write(path, encoded).with_context(|| format!("failed writing {}", path.display()))
}

/// Pushes a kart that has run into the corridor edge back off it.
fn bounce_off_walls<C: CollisionQuery + ?Sized>(car: &mut KinematicCar, walls: &C) -> bool {
    let (x, y) = car.position().to_int();
    let quadrant = Quadrant::at(x, y);
    if !walls.collides(x, y, CAR_RADIUS_PX, quadrant) {
        return false;
    }
    let (nx, ny) = walls.surface_normal(x, y, quadrant);
    car.bounce(Vec2::from_int(nx, ny))
}

/// Two karts per row behind the first waypoint, facing the second.
fn grid_position(waypoints: &[Waypoint], slot: usize) -> (Vec2, BinaryAngle) {
    let start = waypoints[0].position;
    let towards = waypoints[1 % waypoints.len()].position - start;
    let forward = towards.normalize();
    let row = (slot / 2 + 1) as i32;
    let lane = if slot % 2 == 0 { 1 } else { -1 };
    let position = start - forward.scale(Fixed::from_int(GRID_ROW_GAP_PX * row))
        + forward.perp().scale(Fixed::from_int(GRID_LANE_OFFSET_PX * lane));
    (position, towards.to_angle())
}

/// Counts a lap when the target waypoint wraps forward past the start, and
/// takes it back when a teleport wraps it backwards.
fn advance_progress(entry: &mut Progress, waypoint: usize, count: usize) {
    let half = count / 2;
    if waypoint + half < entry.waypoint {
        entry.laps += 1;
    } else if entry.waypoint + half < waypoint {
        entry.laps = entry.laps.saturating_sub(1);
    }
    entry.waypoint = waypoint;
}

/// Rank per slot: finishers by finish tick, then everyone else by laps,
/// waypoint and distance to that waypoint.
fn standings(progress: &[Progress], cars: &[KinematicCar], waypoints: &[Waypoint]) -> Vec<u8> {
    let distance = |slot: usize| {
        let target = waypoints[progress[slot].waypoint % waypoints.len()].position;
        cars[slot].position().distance_sq(target)
    };

    let mut order: Vec<usize> = (0..progress.len()).collect();
    order.sort_by(|&a, &b| {
        let (pa, pb) = (&progress[a], &progress[b]);
        match (pa.finish_tick, pb.finish_tick) {
            (Some(ta), Some(tb)) => ta.cmp(&tb),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => pb
                .laps
                .cmp(&pa.laps)
                .then_with(|| pb.waypoint.cmp(&pa.waypoint))
                .then_with(|| distance(a).cmp(&distance(b))),
        }
        .then_with(|| a.cmp(&b))
    });

    let mut ranks = vec![0u8; progress.len()];
    for (place, slot) in order.into_iter().enumerate() {
        ranks[slot] = (place + 1) as u8;
    }
    ranks
}

fn state_digest(cars: &[KinematicCar]) -> u32 {
    cars.iter().fold(0x811C_9DC5u32, |hash, car| {
        let position = car.position();
        [position.x.raw(), position.y.raw(), car.heading().raw()]
            .iter()
            .fold(hash, |hash, value| {
                (hash ^ (*value as u32)).wrapping_mul(0x0100_0193)
            })
    })
}
