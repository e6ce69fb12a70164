//! Bot personalities and the skill-tier table they are sampled from.

use core::fmt;
use core::str::FromStr;

use alloc::string::ToString;
use serde::{Deserialize, Serialize};

use crate::error::PersonalityError;
use crate::fixed_point::Fixed;
use crate::rng::SeededRng;

/// Longest accepted reaction delay, in ticks.
pub const MAX_REACTION_DELAY: u16 = 120;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillLevel {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl SkillLevel {
    pub const ALL: [Self; 3] = [Self::Easy, Self::Medium, Self::Hard];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    pub fn profile(self) -> &'static SkillProfile {
        match self {
            Self::Easy => &SKILL_PROFILES[0],
            Self::Medium => &SKILL_PROFILES[1],
            Self::Hard => &SKILL_PROFILES[2],
        }
    }
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkillLevel {
    type Err = PersonalityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|skill| skill.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PersonalityError::UnknownSkill {
                name: s.to_string(),
            })
    }
}

/// `base + rand % span`. Percent for traits, ticks for reaction delay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitRange {
    pub base: i32,
    pub span: i32,
}

impl TraitRange {
    pub const fn new(base: i32, span: i32) -> Self {
        Self { base, span }
    }

    /// Inclusive upper bound of sampled values.
    pub const fn max(self) -> i32 {
        if self.span > 0 {
            self.base + self.span - 1
        } else {
            self.base
        }
    }

    pub const fn midpoint(self) -> i32 {
        self.base + self.span / 2
    }

    pub fn sample(self, rng: &mut SeededRng) -> i32 {
        self.base + rng.below(self.span.max(0) as u32) as i32
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillProfile {
    pub skill: SkillLevel,
    pub consistency: TraitRange,
    pub aggression: TraitRange,
    pub item_priority: TraitRange,
    pub reaction_delay: TraitRange,
}

pub const SKILL_PROFILES: [SkillProfile; 3] = [
    SkillProfile {
        skill: SkillLevel::Easy,
        consistency: TraitRange::new(40, 40),
        aggression: TraitRange::new(30, 30),
        item_priority: TraitRange::new(60, 30),
        reaction_delay: TraitRange::new(15, 15),
    },
    SkillProfile {
        skill: SkillLevel::Medium,
        consistency: TraitRange::new(60, 30),
        aggression: TraitRange::new(50, 40),
        item_priority: TraitRange::new(40, 40),
        reaction_delay: TraitRange::new(8, 10),
    },
    SkillProfile {
        skill: SkillLevel::Hard,
        consistency: TraitRange::new(80, 20),
        aggression: TraitRange::new(70, 30),
        item_priority: TraitRange::new(20, 40),
        reaction_delay: TraitRange::new(3, 8),
    },
];

/// Behavior profile. Traits are Q16.8 fractions in 0..=1 (raw 0..=256).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Personality {
    pub skill: SkillLevel,
    pub consistency: Fixed,
    pub aggression: Fixed,
    pub item_priority: Fixed,
    pub reaction_delay: u16,
}

impl Default for Personality {
    fn default() -> Self {
        Self::typical(SkillLevel::Medium)
    }
}

fn percent_trait(name: &'static str, percent: i32) -> Result<Fixed, PersonalityError> {
    if !(0..=100).contains(&percent) {
        return Err(PersonalityError::TraitOutOfRange { name, percent });
    }
    Ok(Fixed::from_ratio(percent, 100))
}

impl Personality {
    /// Explicit personality from whole percentages.
    pub fn new(
        skill: SkillLevel,
        consistency_pct: i32,
        aggression_pct: i32,
        item_priority_pct: i32,
        reaction_delay: u16,
    ) -> Result<Self, PersonalityError> {
        if reaction_delay > MAX_REACTION_DELAY {
            return Err(PersonalityError::ReactionDelayOutOfRange {
                ticks: reaction_delay,
                max: MAX_REACTION_DELAY,
            });
        }
        Ok(Self {
            skill,
            consistency: percent_trait("consistency", consistency_pct)?,
            aggression: percent_trait("aggression", aggression_pct)?,
            item_priority: percent_trait("item_priority", item_priority_pct)?,
            reaction_delay,
        })
    }

    /// Random personality within the tier's ranges.
    pub fn generate(skill: SkillLevel, rng: &mut SeededRng) -> Self {
        let profile = skill.profile();
        Self {
            skill,
            consistency: Fixed::from_ratio(profile.consistency.sample(rng), 100),
            aggression: Fixed::from_ratio(profile.aggression.sample(rng), 100),
            item_priority: Fixed::from_ratio(profile.item_priority.sample(rng), 100),
            reaction_delay: profile.reaction_delay.sample(rng) as u16,
        }
    }

    /// Centre of each of the tier's ranges.
    pub fn typical(skill: SkillLevel) -> Self {
        let profile = skill.profile();
        Self {
            skill,
            consistency: Fixed::from_ratio(profile.consistency.midpoint(), 100),
            aggression: Fixed::from_ratio(profile.aggression.midpoint(), 100),
            item_priority: Fixed::from_ratio(profile.item_priority.midpoint(), 100),
            reaction_delay: profile.reaction_delay.midpoint() as u16,
        }
    }
}
