use anyhow::{anyhow, Context, Result};
use kart_bot_core::constants::{MAP_SIZE_PX, MAX_CARS};
use kart_bot_core::SkillLevel;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

pub const DEFAULT_LAPS: u32 = 3;
/// Five minutes at 60 ticks per second.
pub const DEFAULT_MAX_TICKS: u32 = 18_000;
pub const DEFAULT_BOT_COUNT: usize = 8;
pub const DEFAULT_PICKUP_STRIDE: usize = 10;
pub const DEFAULT_CORRIDOR_HALF_WIDTH_PX: i32 = 72;

pub const ENV_MAX_TICKS: &str = "KART_MAX_TICKS";
pub const ENV_BOT_COUNT: &str = "KART_BOT_COUNT";
pub const ENV_JOBS: &str = "KART_JOBS";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TrackChoice {
    #[default]
    ScorchingSands,
    Oval,
}

impl TrackChoice {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ScorchingSands => "scorching_sands",
            Self::Oval => "oval",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub track: TrackChoice,
    pub laps: u32,
    pub max_ticks: u32,
    pub bot_count: usize,
    /// Slot treated as the human player for rubber-banding. The harness
    /// still drives it with the engine.
    pub player_slot: Option<usize>,
    /// Skill per slot, repeated when shorter than `bot_count`.
    pub skills: Vec<SkillLevel>,
    /// One item box every this many waypoints; 0 disables items.
    pub pickup_stride: usize,
    pub corridor_half_width_px: i32,
    pub jobs: Option<usize>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            track: TrackChoice::default(),
            laps: DEFAULT_LAPS,
            max_ticks: DEFAULT_MAX_TICKS,
            bot_count: DEFAULT_BOT_COUNT,
            player_slot: None,
            skills: SkillLevel::ALL.to_vec(),
            pickup_stride: DEFAULT_PICKUP_STRIDE,
            corridor_half_width_px: DEFAULT_CORRIDOR_HALF_WIDTH_PX,
            jobs: None,
        }
    }
}

impl HarnessConfig {
    /// Defaults, then the JSON file when given, then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let data = fs::read(path)
                    .with_context(|| format!("failed reading config {}", path.display()))?;
                serde_json::from_slice::<Self>(&data)
                    .with_context(|| format!("failed parsing config {}", path.display()))?
            }
            None => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        self.max_ticks = read_env_u32(ENV_MAX_TICKS, self.max_ticks);
        self.bot_count = read_env_usize(ENV_BOT_COUNT, self.bot_count);
        if let Some(jobs) = read_env_optional_usize(ENV_JOBS) {
            self.jobs = Some(jobs);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.laps == 0 {
            return Err(anyhow!("laps must be > 0"));
        }
        if self.max_ticks == 0 {
            return Err(anyhow!("max_ticks must be > 0"));
        }
        if self.bot_count == 0 || self.bot_count > MAX_CARS {
            return Err(anyhow!("bot_count must be between 1 and {MAX_CARS}"));
        }
        if let Some(slot) = self.player_slot {
            if slot >= self.bot_count {
                return Err(anyhow!(
                    "player_slot {slot} is outside the {} racing slots",
                    self.bot_count
                ));
            }
        }
        if self.skills.is_empty() {
            return Err(anyhow!("skills must list at least one skill level"));
        }
        if self.corridor_half_width_px <= 0 || self.corridor_half_width_px >= MAP_SIZE_PX / 4 {
            return Err(anyhow!(
                "corridor_half_width_px must be between 1 and {}",
                MAP_SIZE_PX / 4 - 1
            ));
        }
        if self.jobs == Some(0) {
            return Err(anyhow!("jobs must be >= 1 when provided"));
        }
        Ok(())
    }

    pub fn skill_for(&self, slot: usize) -> SkillLevel {
        if self.skills.is_empty() {
            return SkillLevel::default();
        }
        self.skills[slot % self.skills.len()]
    }
}

pub fn read_env_usize(name: &str, default: usize) -> usize {
    read_env_optional_usize(name).unwrap_or(default)
}

pub fn read_env_optional_usize(name: &str) -> Option<usize> {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|value| *value > 0)
}

pub fn read_env_u32(name: &str, default: u32) -> u32 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}
