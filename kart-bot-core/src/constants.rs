use crate::fixed_point::Fixed;

// Race layout
pub const MAX_CARS: usize = 8;
pub const MAX_WAYPOINTS: usize = 96;
pub const MAX_RACING_LINE_POINTS: usize = 64;
pub const CHECKPOINT_STRIDE: usize = 16;

// World (pixels)
pub const MAP_SIZE_PX: i32 = 1024;
pub const QUAD_OFFSET_PX: i32 = 256;
pub const CAR_RADIUS_PX: i32 = 16;
pub const CAR_SPRITE_PX: i32 = 32;

// Kart dynamics (Q16.8 px/frame)
pub const SPEED_NOMINAL: Fixed = Fixed::from_int(3);
pub const TURN_STEP: i32 = 3;

// Navigation
pub const LOOKAHEAD_DISTANCE: Fixed = Fixed::from_int(80);
pub const LOOKAHEAD_SCALE_MIN: Fixed = Fixed::HALF;
pub const LOOKAHEAD_SCALE_MAX: Fixed = Fixed::from_ratio(120, 100);
pub const LOOKAHEAD_WINDOW: usize = 5;
pub const WAYPOINT_REACH_THRESHOLD: Fixed = Fixed::from_int(30);

// Mistakes
pub const MISTAKE_INTERVAL_BASE: i32 = 200;
pub const MISTAKE_INTERVAL_CONSISTENCY_SPAN: i32 = 200;
pub const MISTAKE_INTERVAL_JITTER: i32 = 100;
pub const MISTAKE_DURATION_MIN: i32 = 15;
pub const MISTAKE_DURATION_MAX: i32 = 45;
/// Half-amplitude band for the per-tick wobble (px).
pub const MISTAKE_OFFSET_MIN_PX: i32 = 10;
pub const MISTAKE_OFFSET_MAX_PX: i32 = 30;

// Items
pub const ITEM_SEARCH_RADIUS: Fixed = Fixed::from_int(150);
pub const LEADER_SEEK_RADIUS: Fixed = Fixed::from_int(40);
pub const ITEM_USE_COOLDOWN_MIN: i32 = 60;
pub const ITEM_USE_COOLDOWN_SPAN: i32 = 120;
pub const GREEN_SHELL_RANGE: Fixed = Fixed::from_int(80);
pub const MUSHROOM_RANGE: Fixed = Fixed::from_int(50);
pub const STRAIGHT_LOOKAHEAD: usize = 3;
pub const STRAIGHT_ANGLE_TOLERANCE: i32 = 30;
pub const HAZARD_DROP_LEADER_PERCENT: u32 = 70;
pub const HAZARD_DROP_PACK_PERCENT: u32 = 30;

// Hazard avoidance
pub const HAZARD_DETECT_RANGE: Fixed = Fixed::from_int(100);
pub const HAZARD_CONE_DOT: Fixed = Fixed::HALF;
pub const HAZARD_AVOIDANCE_DURATION: u16 = 30;
pub const HAZARD_FADE_TICKS: u16 = 15;
pub const HAZARD_DODGE_DISTANCE: Fixed = Fixed::from_int(60);

// Wall avoidance
pub const WALL_PROBE_DISTANCE: Fixed = Fixed::from_int(50);
pub const WALL_PROBE_RADIUS_PAD_PX: i32 = 8;
pub const WALL_BOUNDS_MARGIN_PX: i32 = 10;
pub const WALL_AVOID_DISTANCE: Fixed = Fixed::from_int(80);
pub const WALL_AVOID_WEIGHT_NUM: i32 = 7;
pub const WALL_AVOID_WEIGHT_DEN: i32 = 10;
pub const WALL_BRAKE_SPEED: Fixed = Fixed::from_int(2);

// Overtaking
pub const OVERTAKE_DISTANCE: Fixed = Fixed::from_int(50);
pub const OVERTAKE_CONE_DOT: Fixed = Fixed::from_raw(180);
pub const OVERTAKE_SIDE_OFFSET: Fixed = Fixed::from_int(50);
pub const OVERTAKE_RELEASE_DISTANCE: Fixed = Fixed::from_int(30);

// Adaptive tactics
pub const RUBBERBAND_BOOST_THRESHOLD: Fixed = Fixed::from_int(300);
pub const RUBBERBAND_SLOW_THRESHOLD: Fixed = Fixed::from_int(400);
pub const RUBBERBAND_BOOST_MULT: Fixed = Fixed::from_ratio(110, 100);
pub const RUBBERBAND_SLOW_MULT: Fixed = Fixed::from_ratio(90, 100);
pub const LEADER_RANK_MAX: u8 = 2;
pub const BACK_PACK_RANK_MIN: u8 = 6;

// Stuck detection
pub const STUCK_SPEED_THRESHOLD: Fixed = Fixed::ONE;
pub const STUCK_TIMER_LIMIT: u16 = 60;
pub const STUCK_NUDGE_STEER: i32 = 128;
pub const STUCK_MOVE_THRESHOLD: Fixed = Fixed::from_int(12);
pub const STUCK_STILL_FRAMES: u16 = 90;
pub const WALL_BOUNCE_LIMIT: u8 = 3;
pub const WALL_BOUNCE_COOLDOWN: u8 = 12;

// Control
pub const EASY_SPEED_BONUS: Fixed = Fixed::from_ratio(110, 100);
pub const THROTTLE_COAST_BAND: Fixed = Fixed::ONE;
