//! Steering off walls before the kart grinds into them.

use crate::constants::{
    CAR_RADIUS_PX, CAR_SPRITE_PX, WALL_AVOID_DISTANCE, WALL_AVOID_WEIGHT_DEN,
    WALL_AVOID_WEIGHT_NUM, WALL_BOUNDS_MARGIN_PX, WALL_BRAKE_SPEED, WALL_PROBE_DISTANCE,
    WALL_PROBE_RADIUS_PAD_PX,
};
use crate::geometry::Vec2;
use crate::track::TrackGeometry;
use crate::world::{CarSnapshot, CollisionQuery, Quadrant};

use super::blend::{Layer, Weight};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WallResponse {
    pub layer: Layer,
    pub brake: bool,
}

/// Whether a whole-pixel point is outside the drivable map area.
pub fn outside_bounds(x: i32, y: i32, map_size_px: i32) -> bool {
    let min = CAR_RADIUS_PX + WALL_BOUNDS_MARGIN_PX;
    let max = map_size_px - CAR_SPRITE_PX - WALL_BOUNDS_MARGIN_PX;
    x < min || y < min || x > max || y > max
}

/// Probes a point ahead of the kart. On a likely hit, pulls the target
/// toward a point along the wall normal (or toward the track centre when
/// the wall gives no normal) and asks for a brake above a small speed.
pub fn avoid<C>(car: &CarSnapshot, geometry: &TrackGeometry, collision: &C) -> WallResponse
where
    C: CollisionQuery + ?Sized,
{
    let forward = car.forward();
    let ahead = car.position + forward.scale(WALL_PROBE_DISTANCE);
    let (ax, ay) = ahead.to_int();
    let quadrant = Quadrant::at(ax, ay);

    let hit = collision.collides(ax, ay, CAR_RADIUS_PX + WALL_PROBE_RADIUS_PAD_PX, quadrant)
        || outside_bounds(ax, ay, geometry.map_size_px);
    if !hit {
        return WallResponse::default();
    }

    let (nx, ny) = collision.surface_normal(ax, ay, quadrant);
    let direction = if nx == 0 && ny == 0 {
        let to_center = geometry.center - car.position;
        if to_center.is_zero() {
            forward.perp()
        } else {
            to_center
        }
    } else {
        Vec2::from_int(nx, ny)
    };

    let target = car.position + direction.normalize().scale(WALL_AVOID_DISTANCE);
    WallResponse {
        layer: Layer::Blend {
            target,
            weight: Weight::new(WALL_AVOID_WEIGHT_NUM, WALL_AVOID_WEIGHT_DEN),
        },
        brake: car.speed > WALL_BRAKE_SPEED,
    }
}
