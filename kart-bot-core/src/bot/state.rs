use crate::constants::MISTAKE_INTERVAL_BASE;
use crate::geometry::Vec2;
use crate::personality::Personality;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NavState {
    pub target_waypoint: usize,
    pub next_waypoint: usize,
    pub steering_target: Vec2,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MistakeState {
    /// Ticks until the next mistake starts.
    pub mistake_timer: i32,
    /// Ticks left in the current mistake.
    pub correction_timer: i32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ItemState {
    pub seeking: bool,
    pub pickup_position: Vec2,
    pub use_cooldown: i32,
    /// Ticks the current item has been held, saturating.
    pub held_ticks: u16,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HazardState {
    pub countdown: u16,
    pub hazard_position: Vec2,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OvertakeState {
    pub active: bool,
    pub target: Vec2,
    /// +1 passes on the counter-clockwise side of the blocker, -1 on the other.
    pub side: i32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StuckState {
    pub low_speed_ticks: u16,
    pub still_frames: u16,
    pub anchor: Option<Vec2>,
    pub bounce_count: u8,
    pub bounce_cooldown: u8,
}

/// Everything a bot remembers between ticks. Owned by one slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BotState {
    pub nav: NavState,
    pub mistakes: MistakeState,
    pub items: ItemState,
    pub hazard: HazardState,
    pub overtake: OvertakeState,
    pub stuck: StuckState,
    pub base_personality: Personality,
    /// Recomputed from `base_personality` and rank every tick.
    pub personality: Personality,
}

impl BotState {
    pub fn new(personality: Personality) -> Self {
        Self {
            base_personality: personality,
            personality,
            mistakes: MistakeState {
                mistake_timer: MISTAKE_INTERVAL_BASE,
                correction_timer: 0,
            },
            ..Self::default()
        }
    }

    /// Back to defaults, keeping the configured personality.
    pub fn reset(&mut self) {
        *self = Self::new(self.base_personality);
    }
}
