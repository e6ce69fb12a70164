//! Steering-target arbitration.
//!
//! Every behavior stage reports a `Layer`; the pipeline folds them over the
//! navigation target in `STAGE_ORDER`, so later stages win.

use serde::{Deserialize, Serialize};

use crate::fixed_point::{Fixed, FIXED_ONE};
use crate::geometry::Vec2;

/// Share of a blend that goes to the layer's target: `num / den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Weight {
    num: i32,
    den: i32,
}

impl Weight {
    pub const FULL: Self = Self { num: 1, den: 1 };
    pub const NONE: Self = Self { num: 0, den: 1 };

    /// Clamped into 0..=1. A non-positive denominator yields `NONE`.
    pub const fn new(num: i32, den: i32) -> Self {
        if den <= 0 || num <= 0 {
            return Self::NONE;
        }
        if num >= den {
            return Self::FULL;
        }
        Self { num, den }
    }

    pub fn from_fixed(weight: Fixed) -> Self {
        Self::new(weight.raw(), FIXED_ONE)
    }

    pub const fn num(self) -> i32 {
        self.num
    }

    pub const fn den(self) -> i32 {
        self.den
    }

    pub const fn is_full(self) -> bool {
        self.num == self.den
    }

    pub const fn is_none(self) -> bool {
        self.num == 0
    }
}

/// `(target * num + base * (den - num)) / den`, per component.
pub fn mix(base: Vec2, target: Vec2, weight: Weight) -> Vec2 {
    if weight.is_full() {
        return target;
    }
    if weight.is_none() {
        return base;
    }
    let lerp = |b: Fixed, t: Fixed| {
        let num = weight.num as i64;
        let den = weight.den as i64;
        let raw = (t.raw() as i64 * num + b.raw() as i64 * (den - num)) / den;
        Fixed::from_raw(raw as i32)
    };
    Vec2::new(lerp(base.x, target.x), lerp(base.y, target.y))
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Layer {
    #[default]
    PassThrough,
    /// Shift the current target.
    Offset(Vec2),
    Blend { target: Vec2, weight: Weight },
    Override(Vec2),
}

impl Layer {
    pub fn apply(self, current: Vec2) -> Vec2 {
        match self {
            Self::PassThrough => current,
            Self::Offset(delta) => current + delta,
            Self::Blend { target, weight } => mix(current, target, weight),
            Self::Override(target) => target,
        }
    }

    pub fn is_active(self) -> bool {
        !matches!(self, Self::PassThrough)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Mistake,
    ItemSeek,
    Hazard,
    Wall,
    Overtake,
}

/// Lowest priority first.
pub const STAGE_ORDER: [Stage; 5] = [
    Stage::Mistake,
    Stage::ItemSeek,
    Stage::Hazard,
    Stage::Wall,
    Stage::Overtake,
];

impl Stage {
    const fn slot(self) -> usize {
        match self {
            Self::Mistake => 0,
            Self::ItemSeek => 1,
            Self::Hazard => 2,
            Self::Wall => 3,
            Self::Overtake => 4,
        }
    }
}

/// Which stages changed the target on a tick, as a bitset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageSet(u8);

impl StageSet {
    pub fn contains(self, stage: Stage) -> bool {
        self.0 & (1 << stage.slot()) != 0
    }

    pub fn insert(&mut self, stage: Stage) {
        self.0 |= 1 << stage.slot();
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Stage> {
        STAGE_ORDER.into_iter().filter(move |stage| self.contains(*stage))
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Pipeline {
    base: Vec2,
    layers: [Layer; 5],
}

impl Pipeline {
    pub fn new(base: Vec2) -> Self {
        Self {
            base,
            layers: [Layer::PassThrough; 5],
        }
    }

    pub fn base(&self) -> Vec2 {
        self.base
    }

    pub fn set(&mut self, stage: Stage, layer: Layer) {
        self.layers[stage.slot()] = layer;
    }

    pub fn layer(&self, stage: Stage) -> Layer {
        self.layers[stage.slot()]
    }

    pub fn active(&self) -> StageSet {
        let mut set = StageSet::default();
        for stage in STAGE_ORDER {
            if self.layer(stage).is_active() {
                set.insert(stage);
            }
        }
        set
    }

    pub fn resolve(&self) -> Vec2 {
        STAGE_ORDER
            .iter()
            .fold(self.base, |current, stage| self.layer(*stage).apply(current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_clamps() {
        assert_eq!(Weight::new(20, 15), Weight::FULL);
        assert_eq!(Weight::new(-1, 15), Weight::NONE);
        assert_eq!(Weight::new(3, 0), Weight::NONE);
        assert_eq!(Weight::from_fixed(Fixed::HALF), Weight::new(128, 256));
    }

    #[test]
    fn test_mix_fractions() {
        let base = Vec2::from_int(0, 0);
        let target = Vec2::from_int(150, -150);
        assert_eq!(mix(base, target, Weight::new(7, 15)), Vec2::from_int(70, -70));
        assert_eq!(mix(base, target, Weight::FULL), target);
        assert_eq!(mix(base, target, Weight::NONE), base);
        assert_eq!(
            mix(Vec2::from_int(10, 10), Vec2::from_int(110, 10), Weight::new(7, 10)),
            Vec2::from_int(80, 10)
        );
    }

    #[test]
    fn test_later_stages_win() {
        let mut pipeline = Pipeline::new(Vec2::from_int(100, 100));
        pipeline.set(Stage::Mistake, Layer::Offset(Vec2::from_int(5, -5)));
        assert_eq!(pipeline.resolve(), Vec2::from_int(105, 95));

        pipeline.set(
            Stage::Hazard,
            Layer::Blend {
                target: Vec2::from_int(205, 95),
                weight: Weight::new(1, 2),
            },
        );
        assert_eq!(pipeline.resolve(), Vec2::from_int(155, 95));

        pipeline.set(Stage::Overtake, Layer::Override(Vec2::from_int(1, 2)));
        assert_eq!(pipeline.resolve(), Vec2::from_int(1, 2));

        let active: Vec<Stage> = pipeline.active().iter().collect();
        assert_eq!(active, vec![Stage::Mistake, Stage::Hazard, Stage::Overtake]);
        assert_eq!(pipeline.base(), Vec2::from_int(100, 100));
    }
}
