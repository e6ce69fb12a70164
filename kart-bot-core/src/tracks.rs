//! Built-in track data: the Scorching Sands racing line and a parametric
//! oval used by tests and the harness.

use crate::constants::{MAP_SIZE_PX, SPEED_NOMINAL};
use crate::fixed_point::{cos_bin, sin_bin, BinaryAngle, Fixed, ANGLE_FULL};
use crate::geometry::Vec2;
use crate::track::{RescueZone, TrackDefinition, TrackGeometry, Waypoint};

const FULL: Fixed = SPEED_NOMINAL;
const THREE_QUARTER: Fixed = Fixed::from_raw(576);
const TWO_THIRDS: Fixed = Fixed::from_raw(512);
const HALF: Fixed = Fixed::from_raw(384);

const RIGHT: BinaryAngle = BinaryAngle::RIGHT;
const DOWN_RIGHT: BinaryAngle = BinaryAngle::DOWN_RIGHT;
const DOWN: BinaryAngle = BinaryAngle::DOWN;
const DOWN_LEFT: BinaryAngle = BinaryAngle::DOWN_LEFT;
const LEFT: BinaryAngle = BinaryAngle::LEFT;
const UP_LEFT: BinaryAngle = BinaryAngle::UP_LEFT;
const UP: BinaryAngle = BinaryAngle::UP;
const UP_RIGHT: BinaryAngle = BinaryAngle::UP_RIGHT;

const fn wp(x: i32, y: i32, speed: Fixed, angle: BinaryAngle, checkpoint: bool) -> Waypoint {
    Waypoint::new(Vec2::from_int(x, y), speed, angle, checkpoint)
}

pub const SCORCHING_SANDS_NAME: &str = "scorching_sands";

/// Hand-placed racing line, counter-clockwise from the start straight.
/// Checkpoints sit at indices 14, 29 and 49.
pub static SCORCHING_SANDS_WAYPOINTS: [Waypoint; 80] = [
    wp(948, 524, FULL, UP, false),
    wp(946, 480, FULL, UP, false),
    wp(945, 467, FULL, UP, false),
    wp(942, 441, FULL, UP, false),
    wp(923, 413, FULL, UP, false),
    wp(886, 400, THREE_QUARTER, UP_LEFT, false),
    wp(829, 355, THREE_QUARTER, UP_LEFT, false),
    wp(766, 339, TWO_THIRDS, LEFT, false),
    wp(717, 312, TWO_THIRDS, LEFT, false),
    wp(662, 275, TWO_THIRDS, LEFT, false),
    wp(608, 249, TWO_THIRDS, LEFT, false),
    wp(566, 231, TWO_THIRDS, LEFT, false),
    wp(518, 206, TWO_THIRDS, LEFT, false),
    wp(467, 177, TWO_THIRDS, LEFT, false),
    wp(417, 145, TWO_THIRDS, LEFT, true),
    wp(355, 128, TWO_THIRDS, LEFT, false),
    wp(308, 102, TWO_THIRDS, LEFT, false),
    wp(269, 81, TWO_THIRDS, LEFT, false),
    wp(236, 75, TWO_THIRDS, LEFT, false),
    wp(192, 60, HALF, LEFT, false),
    wp(169, 62, HALF, DOWN_LEFT, false),
    wp(119, 81, HALF, DOWN, false),
    wp(95, 154, THREE_QUARTER, DOWN, false),
    wp(88, 175, THREE_QUARTER, DOWN, false),
    wp(88, 206, FULL, DOWN, false),
    wp(88, 247, FULL, DOWN, false),
    wp(53, 325, FULL, DOWN, false),
    wp(65, 373, FULL, DOWN, false),
    wp(65, 416, FULL, DOWN, false),
    wp(65, 470, FULL, DOWN, true),
    wp(65, 531, FULL, DOWN, false),
    wp(65, 582, FULL, DOWN, false),
    wp(70, 641, FULL, DOWN, false),
    wp(71, 688, FULL, DOWN, false),
    wp(71, 708, THREE_QUARTER, DOWN, false),
    wp(121, 731, HALF, DOWN_RIGHT, false),
    wp(144, 732, HALF, RIGHT, false),
    wp(154, 732, TWO_THIRDS, RIGHT, false),
    wp(187, 732, TWO_THIRDS, RIGHT, false),
    wp(207, 710, TWO_THIRDS, RIGHT, false),
    wp(221, 710, TWO_THIRDS, RIGHT, false),
    wp(243, 704, TWO_THIRDS, RIGHT, false),
    wp(275, 685, TWO_THIRDS, RIGHT, false),
    wp(277, 682, TWO_THIRDS, RIGHT, false),
    wp(301, 675, TWO_THIRDS, RIGHT, false),
    wp(347, 656, TWO_THIRDS, RIGHT, false),
    wp(402, 620, TWO_THIRDS, RIGHT, false),
    wp(446, 600, TWO_THIRDS, RIGHT, false),
    wp(481, 595, TWO_THIRDS, RIGHT, false),
    wp(503, 594, THREE_QUARTER, RIGHT, true),
    wp(527, 591, THREE_QUARTER, RIGHT, false),
    wp(541, 595, THREE_QUARTER, RIGHT, false),
    wp(548, 610, THREE_QUARTER, RIGHT, false),
    wp(552, 623, THREE_QUARTER, RIGHT, false),
    wp(560, 632, THREE_QUARTER, DOWN_RIGHT, false),
    wp(600, 681, HALF, DOWN, false),
    wp(607, 717, HALF, DOWN, false),
    wp(631, 767, HALF, DOWN_RIGHT, false),
    wp(693, 837, HALF, DOWN_RIGHT, false),
    wp(708, 861, HALF, RIGHT, false),
    wp(743, 872, TWO_THIRDS, RIGHT, false),
    wp(769, 884, TWO_THIRDS, RIGHT, false),
    wp(797, 884, TWO_THIRDS, RIGHT, false),
    wp(807, 898, TWO_THIRDS, RIGHT, false),
    wp(840, 907, TWO_THIRDS, RIGHT, false),
    wp(892, 907, THREE_QUARTER, RIGHT, false),
    wp(908, 893, HALF, UP_RIGHT, false),
    wp(915, 880, HALF, UP, false),
    wp(920, 859, TWO_THIRDS, UP, false),
    wp(922, 830, THREE_QUARTER, UP, false),
    wp(923, 790, FULL, UP, false),
    wp(923, 771, FULL, UP, false),
    wp(923, 733, FULL, UP, false),
    wp(935, 689, FULL, UP, false),
    wp(935, 648, FULL, UP, false),
    wp(935, 638, FULL, UP, false),
    wp(935, 610, FULL, UP, false),
    wp(935, 584, FULL, UP, false),
    wp(938, 560, FULL, UP, false),
    wp(941, 541, FULL, UP, false),];

/// Off-track pocket near the bottom-left hairpin where karts wedge.
pub const SCORCHING_SANDS_RESCUE: RescueZone = RescueZone {
    min: (120, 540),
    max: (230, 700),
    rescue_position: Vec2::from_int(265, 697),
    rescue_heading: BinaryAngle::RIGHT,
};

pub fn scorching_sands() -> TrackDefinition<'static> {
    TrackDefinition {
        name: SCORCHING_SANDS_NAME,
        inner_boundary: &[],
        outer_boundary: &[],
        fallback: &SCORCHING_SANDS_WAYPOINTS,
        geometry: TrackGeometry {
            map_size_px: MAP_SIZE_PX,
            center: Vec2::from_int(MAP_SIZE_PX / 2, MAP_SIZE_PX / 2),
            rescue: Some(SCORCHING_SANDS_RESCUE),
        },
    }
}

/// Inner and outer edges of an elliptical loop with `N` samples per edge.
/// `rx`/`ry` are the centreline radii and `half_width` the distance from
/// the centreline to either edge, all in pixels.
pub fn oval_boundaries<const N: usize>(
    cx: i32,
    cy: i32,
    rx: i32,
    ry: i32,
    half_width: i32,
) -> ([Vec2; N], [Vec2; N]) {
    let centre = Vec2::from_int(cx, cy);
    let edge = |i: usize, grow: i32| {
        let angle = (i as i32 * ANGLE_FULL) / N.max(1) as i32;
        let x = Fixed::from_int(rx + grow) * cos_bin(angle);
        let y = Fixed::from_int(ry + grow) * sin_bin(angle);
        centre + Vec2::new(x, y)
    };
    (
        core::array::from_fn(|i| edge(i, -half_width)),
        core::array::from_fn(|i| edge(i, half_width)),
    )
}

/// Owned oval layout that can lend a `TrackDefinition`.
#[derive(Clone, Debug)]
pub struct OvalTrack<const N: usize> {
    pub inner: [Vec2; N],
    pub outer: [Vec2; N],
    pub geometry: TrackGeometry,
}

impl<const N: usize> OvalTrack<N> {
    pub fn new(rx: i32, ry: i32, half_width: i32) -> Self {
        let geometry = TrackGeometry::default();
        let (cx, cy) = geometry.center.to_int();
        let (inner, outer) = oval_boundaries::<N>(cx, cy, rx, ry, half_width);
        Self {
            inner,
            outer,
            geometry,
        }
    }

    pub fn definition(&self) -> TrackDefinition<'_> {
        TrackDefinition {
            name: "oval",
            inner_boundary: &self.inner,
            outer_boundary: &self.outer,
            fallback: &[],
            geometry: self.geometry,
        }
    }
}
