use crate::config::HarnessConfig;
use crate::runner::{run_race, RaceReport};
use crate::util::seed_to_hex;
use anyhow::{anyhow, Context, Result};
use kart_bot_core::SkillLevel;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

#[derive(Clone, Debug)]
pub struct BenchmarkConfig {
    pub harness: HarnessConfig,
    pub seeds: Vec<u32>,
    pub out_dir: PathBuf,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RaceRecord {
    pub seed: u32,
    pub seed_hex: String,
    pub ticks: u32,
    pub finished: usize,
    pub winner: Option<usize>,
    pub winner_skill: Option<SkillLevel>,
    pub state_digest: u32,
    pub pickups: u32,
    pub projectile_hits: u32,
    pub hazard_hits: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SkillAggregate {
    pub skill: SkillLevel,
    pub entries: usize,
    pub wins: usize,
    pub win_rate: f64,
    pub finish_rate: f64,
    pub avg_rank: f64,
    pub best_finish_tick: Option<u32>,
    pub avg_finish_tick: Option<f64>,
    pub avg_laps: f64,
    pub avg_recoveries: f64,
    pub avg_stuck_nudges: f64,
    pub avg_wall_brakes: f64,
    pub avg_items_used: f64,
    pub avg_mistake_ticks: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub generated_unix_s: u64,
    pub track: String,
    pub laps: u32,
    pub max_ticks: u32,
    pub bot_count: usize,
    pub jobs: Option<usize>,
    pub seeds: Vec<u32>,
    pub race_count: usize,
    pub skill_rankings: Vec<SkillAggregate>,
    pub races: Vec<RaceRecord>,
}

pub fn run_benchmark(config: BenchmarkConfig) -> Result<BenchmarkReport> {
    if config.seeds.is_empty() {
        return Err(anyhow!("benchmark requires at least one seed"));
    }
    config.harness.validate()?;
    fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("failed creating {}", config.out_dir.display()))?;

    let harness = &config.harness;
    let run_one = |seed: &u32| -> Result<RaceReport> {
        run_race(harness, *seed)
            .with_context(|| format!("benchmark race failed for seed={seed:#x}"))
    };

    let results: Vec<Result<RaceReport>> = if let Some(jobs) = harness.jobs {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .context("failed to build rayon threadpool")?;
        pool.install(|| config.seeds.par_iter().map(run_one).collect())
    } else {
        config.seeds.par_iter().map(run_one).collect()
    };

    let mut races = Vec::with_capacity(results.len());
    for result in results {
        races.push(result?);
    }

    let skill_rankings = aggregate_skills(&races);

    let records: Vec<RaceRecord> = races
        .iter()
        .map(|race| RaceRecord {
            seed: race.seed,
            seed_hex: seed_to_hex(race.seed),
            ticks: race.ticks,
            finished: race.finished,
            winner: race.winner,
            winner_skill: race.winner.map(|slot| race.cars[slot].skill),
            state_digest: race.state_digest,
            pickups: race.items.pickups,
            projectile_hits: race.items.projectile_hits,
            hazard_hits: race.items.hazard_hits,
        })
        .collect();

    write_cars_csv(&config.out_dir.join("cars.csv"), &races)?;
    write_skills_csv(&config.out_dir.join("skills.csv"), &skill_rankings)?;

    let report = BenchmarkReport {
        generated_unix_s: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs(),
        track: harness.track.as_str().to_string(),
        laps: harness.laps,
        max_ticks: harness.max_ticks,
        bot_count: harness.bot_count,
        jobs: harness.jobs,
        seeds: config.seeds,
        race_count: records.len(),
        skill_rankings,
        races: records,
    };

    let report_path = config.out_dir.join("summary.json");
    fs::write(
        &report_path,
        serde_json::to_vec_pretty(&report).context("failed to serialize summary json")?,
    )
    .with_context(|| format!("failed writing {}", report_path.display()))?;

    info!(
        races = report.race_count,
        out_dir = %config.out_dir.display(),
        "benchmark complete"
    );
    Ok(report)
}

/// Per-skill aggregates over every car in every race, best average rank first.
pub fn aggregate_skills(races: &[RaceReport]) -> Vec<SkillAggregate> {
    let mut grouped: HashMap<SkillLevel, Vec<(&RaceReport, usize)>> = HashMap::new();
    for race in races {
        for car in &race.cars {
            grouped.entry(car.skill).or_default().push((race, car.slot));
        }
    }

    let mut rankings = Vec::new();
    for (skill, entries) in grouped {
        let count = entries.len();
        let cars: Vec<_> = entries.iter().map(|(race, slot)| &race.cars[*slot]).collect();
        let wins = entries
            .iter()
            .filter(|(race, slot)| race.winner == Some(*slot))
            .count();
        let finish_ticks: Vec<u32> = cars.iter().filter_map(|car| car.finish_tick).collect();
        let avg = |sum: u64| sum as f64 / count as f64;

        rankings.push(SkillAggregate {
            skill,
            entries: count,
            wins,
            win_rate: wins as f64 / count as f64,
            finish_rate: finish_ticks.len() as f64 / count as f64,
            avg_rank: avg(cars.iter().map(|car| car.final_rank as u64).sum()),
            best_finish_tick: finish_ticks.iter().copied().min(),
            avg_finish_tick: (!finish_ticks.is_empty()).then(|| {
                finish_ticks.iter().map(|tick| *tick as f64).sum::<f64>()
                    / finish_ticks.len() as f64
            }),
            avg_laps: avg(cars.iter().map(|car| car.laps as u64).sum()),
            avg_recoveries: avg(cars.iter().map(|car| car.recoveries as u64).sum()),
            avg_stuck_nudges: avg(cars.iter().map(|car| car.stuck_nudges as u64).sum()),
            avg_wall_brakes: avg(cars.iter().map(|car| car.wall_brakes as u64).sum()),
            avg_items_used: avg(cars.iter().map(|car| car.items_used as u64).sum()),
            avg_mistake_ticks: avg(cars.iter().map(|car| car.mistake_ticks as u64).sum()),
        });
    }

    rankings.sort_by(|a, b| {
        a.avg_rank
            .total_cmp(&b.avg_rank)
            .then_with(|| b.win_rate.total_cmp(&a.win_rate))
            .then_with(|| a.skill.as_str().cmp(b.skill.as_str()))
    });
    rankings
}

fn write_cars_csv(path: &Path, races: &[RaceReport]) -> Result<()> {
    let mut csv = String::from(
        "seed_hex,slot,skill,player,laps,finish_tick,final_rank,recoveries,wall_recoveries,stuck_nudges,wall_brakes,mistake_ticks,seek_ticks,hazard_ticks,wall_ticks,overtake_ticks,items_used,wall_bounces,off_track_ticks,min_edge_clearance_px\n",
    );
    for race in races {
        for car in &race.cars {
            csv.push_str(&format!(
                "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}\n",
                race.seed_hex,
                car.slot,
                car.skill.as_str(),
                car.player,
                car.laps,
                car.finish_tick.map(|tick| tick.to_string()).unwrap_or_default(),
                car.final_rank,
                car.recoveries,
                car.wall_recoveries,
                car.stuck_nudges,
                car.wall_brakes,
                car.mistake_ticks,
                car.seek_ticks,
                car.hazard_ticks,
                car.wall_ticks,
                car.overtake_ticks,
                car.items_used,
                car.wall_bounces,
                car.off_track_ticks,
                car.min_edge_clearance_px
                    .map(|px| px.to_string())
                    .unwrap_or_default()
            ));
        }
    }
    fs::write(path, csv).with_context(|| format!("failed writing {}", path.display()))
}

fn write_skills_csv(path: &Path, rows: &[SkillAggregate]) -> Result<()> {
    let mut csv = String::from(
        "rank,skill,entries,wins,win_rate,finish_rate,avg_rank,avg_laps,avg_recoveries,avg_stuck_nudges,avg_wall_brakes,avg_items_used\n",
    );
    for (idx, row) in rows.iter().enumerate() {
        csv.push_str(&format!(
            "{},{},{},{},{:.4},{:.4},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2}\n",
            idx + 1,
            row.skill.as_str(),
            row.entries,
            row.wins,
            row.win_rate,
            row.finish_rate,
            row.avg_rank,
            row.avg_laps,
            row.avg_recoveries,
            row.avg_stuck_nudges,
            row.avg_wall_brakes,
            row.avg_items_used
        ));
    }
    fs::write(path, csv).with_context(|| format!("failed writing {}", path.display()))
}
