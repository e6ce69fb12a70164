//! Racing line generated from a track's inner and outer boundary polylines.
//!
//! Boundaries are resampled onto at most `MAX_RACING_LINE_POINTS` points
//! placed midway between the edges. Each point then gets a corner sharpness
//! from its neighbours, a target speed bucketed from that sharpness, and a
//! tangent heading toward the next point.

use serde::{Deserialize, Serialize};

use crate::constants::{CHECKPOINT_STRIDE, MAX_RACING_LINE_POINTS, SPEED_NOMINAL};
use crate::error::TrackError;
use crate::fixed_point::{BinaryAngle, Fixed, ANGLE_FULL, ANGLE_HALF, ANGLE_QUARTER};
use crate::geometry::Vec2;
use crate::track::Waypoint;

/// Minimum boundary points needed to describe a closed loop.
pub const MIN_BOUNDARY_POINTS: usize = 3;

/// Where the line sits between the edges: 0 = inner, 256 = outer.
const APEX_BIAS: Fixed = Fixed::HALF;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RacingLinePoint {
    pub position: Vec2,
    pub inner_bound: Vec2,
    pub outer_bound: Vec2,
    pub track_width: Fixed,
    /// 0 = straight, 100 = hairpin (values above 100 are U-turns).
    pub corner_sharpness: i32,
    pub target_speed: Fixed,
    pub tangent_angle: BinaryAngle,
    pub checkpoint: bool,
}

impl RacingLinePoint {
    pub fn to_waypoint(&self) -> Waypoint {
        Waypoint::new(
            self.position,
            self.target_speed,
            self.tangent_angle,
            self.checkpoint,
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RacingLine {
    points: [RacingLinePoint; MAX_RACING_LINE_POINTS],
    count: usize,
}

/// 0..=100 sharpness from the heading change across `current`.
pub fn corner_sharpness(prev: Vec2, current: Vec2, next: Vec2) -> i32 {
    let incoming = current - prev;
    let outgoing = next - current;
    if incoming.is_zero() || outgoing.is_zero() {
        return 0;
    }

    let mut diff = (outgoing.to_angle().raw() - incoming.to_angle().raw()).abs();
    if diff > ANGLE_HALF {
        diff = ANGLE_FULL - diff;
    }
    (diff * 100) / ANGLE_QUARTER
}

/// Nominal speed scaled down for sharper corners.
pub fn speed_for_sharpness(sharpness: i32) -> Fixed {
    let percent = match sharpness {
        s if s < 20 => return SPEED_NOMINAL,
        s if s < 50 => 80,
        s if s < 75 => 65,
        _ => 50,
    };
    SPEED_NOMINAL * Fixed::from_ratio(percent, 100)
}

impl RacingLine {
    pub fn generate(
        inner: &[Vec2],
        outer: &[Vec2],
        target_count: usize,
    ) -> Result<Self, TrackError> {
        if inner.len() < MIN_BOUNDARY_POINTS || outer.len() < MIN_BOUNDARY_POINTS {
            return Err(TrackError::BoundaryTooShort {
                inner: inner.len(),
                outer: outer.len(),
                min: MIN_BOUNDARY_POINTS,
            });
        }

        let mut line = Self {
            points: [RacingLinePoint::default(); MAX_RACING_LINE_POINTS],
            count: 0,
        };

        // Resample against the shorter boundary.
        let reference = inner.len().min(outer.len());
        let target = target_count.clamp(1, MAX_RACING_LINE_POINTS);
        let step = (reference / target).max(1);

        for i in (0..reference).step_by(step) {
            if line.count == MAX_RACING_LINE_POINTS {
                break;
            }
            let inner_pt = inner[i * inner.len() / reference];
            let outer_pt = outer[i * outer.len() / reference];

            line.points[line.count] = RacingLinePoint {
                position: inner_pt.lerp(outer_pt, APEX_BIAS),
                inner_bound: inner_pt,
                outer_bound: outer_pt,
                track_width: inner_pt.distance(outer_pt),
                checkpoint: line.count % CHECKPOINT_STRIDE == 0,
                ..RacingLinePoint::default()
            };
            line.count += 1;
        }

        let count = line.count;
        for i in 0..count {
            let prev = line.points[(i + count - 1) % count].position;
            let next = line.points[(i + 1) % count].position;
            let point = &mut line.points[i];

            point.corner_sharpness = corner_sharpness(prev, point.position, next);
            point.target_speed = speed_for_sharpness(point.corner_sharpness);
            point.tangent_angle = (next - point.position).to_angle();
        }

        Ok(line)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn points(&self) -> &[RacingLinePoint] {
        &self.points[..self.count]
    }

    pub fn nearest_point(&self, position: Vec2) -> Option<(usize, &RacingLinePoint)> {
        self.points()
            .iter()
            .enumerate()
            .min_by_key(|(_, point)| position.distance_sq(point.position))
    }

    /// Sum of distances to the nearest point's two edges stays within the
    /// track width plus a quarter.
    pub fn is_on_track(&self, position: Vec2) -> bool {
        let Some((_, nearest)) = self.nearest_point(position) else {
            return false;
        };
        let to_inner = position.distance(nearest.inner_bound);
        let to_outer = position.distance(nearest.outer_bound);
        let width = nearest.track_width;
        to_inner + to_outer <= width + width.div_int(4)
    }

    /// Positive while on track, negative once past an edge.
    pub fn distance_to_edge(&self, position: Vec2) -> Fixed {
        let Some((_, nearest)) = self.nearest_point(position) else {
            return Fixed::ZERO;
        };
        let to_inner = position.distance(nearest.inner_bound);
        let to_outer = position.distance(nearest.outer_bound);
        nearest.track_width.div_int(2) - to_inner.min(to_outer)
    }
}
