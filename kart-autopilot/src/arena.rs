//! Collision world for headless races: a closed corridor of fixed half width
//! around the waypoint loop, inside the square map.

use kart_bot_core::{CollisionQuery, Fixed, Quadrant, Vec2, Waypoint};

#[derive(Clone, Debug)]
pub struct CorridorArena {
    centreline: Vec<Vec2>,
    half_width: Fixed,
    map_size_px: i32,
}

impl CorridorArena {
    pub fn new(waypoints: &[Waypoint], half_width_px: i32, map_size_px: i32) -> Self {
        Self {
            centreline: waypoints.iter().map(|wp| wp.position).collect(),
            half_width: Fixed::from_int(half_width_px),
            map_size_px,
        }
    }

    /// Closest point on the centreline loop. `None` when the loop is empty.
    pub fn nearest_centreline_point(&self, point: Vec2) -> Option<Vec2> {
        let count = self.centreline.len();
        if count == 1 {
            return self.centreline.first().copied();
        }
        (0..count)
            .map(|i| {
                let a = self.centreline[i];
                let b = self.centreline[(i + 1) % count];
                closest_on_segment(point, a, b)
            })
            .min_by_key(|candidate| point.distance_sq(*candidate))
    }

    /// Signed distance from the centreline to the nearest corridor edge;
    /// negative once outside the corridor.
    pub fn clearance(&self, point: Vec2) -> Fixed {
        match self.nearest_centreline_point(point) {
            Some(nearest) => self.half_width - point.distance(nearest),
            None => Fixed::ZERO,
        }
    }

    fn outside_map(&self, x: i32, y: i32, radius: i32) -> bool {
        x - radius < 0
            || y - radius < 0
            || x + radius > self.map_size_px
            || y + radius > self.map_size_px
    }
}

fn closest_on_segment(point: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let ab = b - a;
    let len_sq = ab.len_sq();
    if len_sq.is_zero() {
        return a;
    }
    let t = ((point - a).dot(ab) / len_sq).clamp(Fixed::ZERO, Fixed::ONE);
    a + ab.scale(t)
}

impl CollisionQuery for CorridorArena {
    fn collides(&self, x: i32, y: i32, radius: i32, _quadrant: Quadrant) -> bool {
        if self.outside_map(x, y, radius) {
            return true;
        }
        if self.centreline.is_empty() {
            return false;
        }
        self.clearance(Vec2::from_int(x, y)) < Fixed::from_int(radius)
    }

    fn surface_normal(&self, x: i32, y: i32, _quadrant: Quadrant) -> (i32, i32) {
        let point = Vec2::from_int(x, y);
        let Some(nearest) = self.nearest_centreline_point(point) else {
            return (0, 0);
        };
        let inward = (nearest - point).normalize().scale(Fixed::from_int(16));
        inward.to_int()
    }
}
