use anyhow::Result;
use clap::{Parser, Subcommand};
use kart_autopilot::benchmark::{run_benchmark, BenchmarkConfig};
use kart_autopilot::config::{HarnessConfig, TrackChoice};
use kart_autopilot::runner::{run_race, write_report};
use kart_autopilot::util::{parse_seed, resolve_seeds, seed_to_hex};
use kart_bot_core::SkillLevel;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Parser, Debug)]
#[command(name = "kart-autopilot")]
#[command(about = "Headless kart races driven by the bot engine, for tuning and benchmarking")]
struct Cli {
    /// JSON harness config; flags below override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug, Default)]
struct RaceOverrides {
    #[arg(long, value_enum)]
    track: Option<TrackChoice>,
    #[arg(long)]
    laps: Option<u32>,
    #[arg(long)]
    max_ticks: Option<u32>,
    #[arg(long)]
    bots: Option<usize>,
    /// Slot treated as the human player for rubber-banding
    #[arg(long)]
    player_slot: Option<usize>,
    /// Comma-separated skills assigned round-robin to slots
    #[arg(long, value_delimiter = ',', value_parser = str::parse::<SkillLevel>)]
    skills: Option<Vec<SkillLevel>>,
    /// One item box every N waypoints (0 disables items)
    #[arg(long)]
    pickup_stride: Option<usize>,
}

impl RaceOverrides {
    fn apply(self, config: &mut HarnessConfig) -> Result<()> {
        if let Some(track) = self.track {
            config.track = track;
        }
        if let Some(laps) = self.laps {
            config.laps = laps;
        }
        if let Some(max_ticks) = self.max_ticks {
            config.max_ticks = max_ticks;
        }
        if let Some(bots) = self.bots {
            config.bot_count = bots;
        }
        if self.player_slot.is_some() {
            config.player_slot = self.player_slot;
        }
        if let Some(skills) = self.skills {
            config.skills = skills;
        }
        if let Some(stride) = self.pickup_stride {
            config.pickup_stride = stride;
        }
        config.validate()
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List skill tiers and their personality ranges
    ListSkills,
    /// Run one seeded race and print a per-car summary
    Race {
        #[arg(long)]
        seed: String,
        #[command(flatten)]
        overrides: RaceOverrides,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Run many seeded races in parallel and aggregate per skill tier
    Benchmark {
        #[arg(long)]
        seeds: Option<String>,
        #[arg(long)]
        seed_file: Option<PathBuf>,
        #[arg(long)]
        seed_start: Option<String>,
        #[arg(long, default_value_t = 12)]
        seed_count: u32,
        #[command(flatten)]
        overrides: RaceOverrides,
        #[arg(long)]
        out_dir: Option<PathBuf>,
        #[arg(long)]
        jobs: Option<usize>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let Cli { config, command } = Cli::parse();

    match command {
        Commands::ListSkills => {
            for skill in SkillLevel::ALL {
                let profile = skill.profile();
                println!(
                    "{:8} consistency={}..{}% aggression={}..{}% item_priority={}..{}% reaction_delay={}..{}",
                    skill.as_str(),
                    profile.consistency.base,
                    profile.consistency.max(),
                    profile.aggression.base,
                    profile.aggression.max(),
                    profile.item_priority.base,
                    profile.item_priority.max(),
                    profile.reaction_delay.base,
                    profile.reaction_delay.max(),
                );
            }
        }
        Commands::Race {
            seed,
            overrides,
            output,
        } => {
            let mut harness = HarnessConfig::load(config.as_deref())?;
            overrides.apply(&mut harness)?;
            let seed = parse_seed(&seed)?;
            let report = run_race(&harness, seed)?;

            println!("seed={}", seed_to_hex(seed));
            println!("track={}", report.track);
            println!("track_source={:?}", report.track_source);
            println!("waypoints={}", report.waypoints);
            println!("ticks={}", report.ticks);
            println!("finished={}/{}", report.finished, report.cars.len());
            match report.winner {
                Some(slot) => println!("winner=slot{slot}"),
                None => println!("winner=none"),
            }
            println!("state_digest={:#010x}", report.state_digest);
            for car in &report.cars {
                println!(
                    "slot={} skill={} rank={} laps={} finish_tick={} recoveries={} nudges={} items_used={}",
                    car.slot,
                    car.skill.as_str(),
                    car.final_rank,
                    car.laps,
                    car.finish_tick
                        .map(|tick| tick.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    car.recoveries,
                    car.stuck_nudges,
                    car.items_used,
                );
            }
            if let Some(path) = output {
                write_report(&path, &report)?;
                println!("output={}", path.display());
            }
        }
        Commands::Benchmark {
            seeds,
            seed_file,
            seed_start,
            seed_count,
            overrides,
            out_dir,
            jobs,
        } => {
            let mut harness = HarnessConfig::load(config.as_deref())?;
            if jobs.is_some() {
                harness.jobs = jobs;
            }
            overrides.apply(&mut harness)?;
            let seeds = resolve_seeds(
                seeds.as_deref(),
                seed_file.as_deref(),
                seed_start.as_deref(),
                seed_count,
            )?;
            let out_dir = out_dir.unwrap_or_else(|| {
                PathBuf::from(format!("benchmarks/{}", timestamp_suffix()))
            });

            let report = run_benchmark(BenchmarkConfig {
                harness,
                seeds,
                out_dir: out_dir.clone(),
            })?;

            println!("races={}", report.race_count);
            println!("track={}", report.track);
            println!("out_dir={}", out_dir.display());
            for (idx, row) in report.skill_rankings.iter().enumerate() {
                println!(
                    "{}. skill={} avg_rank={:.2} win_rate={:.1}% finish_rate={:.1}% avg_recoveries={:.2}",
                    idx + 1,
                    row.skill.as_str(),
                    row.avg_rank,
                    row.win_rate * 100.0,
                    row.finish_rate * 100.0,
                    row.avg_recoveries,
                );
            }
        }
    }

    Ok(())
}

fn timestamp_suffix() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("{now}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skills_flag_parses_each_tier() {
        let cli = Cli::try_parse_from([
            "kart-autopilot",
            "race",
            "--seed",
            "1",
            "--skills",
            "hard, Easy",
        ])
        .unwrap();
        let Commands::Race { overrides, .. } = cli.command else {
            panic!("expected race command");
        };
        assert_eq!(
            overrides.skills,
            Some(vec![SkillLevel::Hard, SkillLevel::Easy])
        );

        let unknown = Cli::try_parse_from([
            "kart-autopilot",
            "race",
            "--seed",
            "1",
            "--skills",
            "expert",
        ]);
        assert!(unknown.is_err());
    }
}
