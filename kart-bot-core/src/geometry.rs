//! Q16.8 2D vectors.

use core::ops::{Add, AddAssign, Neg, Sub};

use serde::{Deserialize, Serialize};

use crate::fixed_point::{
    asin_first_quadrant, cos_bin, sin_bin, sqrt_fixed, BinaryAngle, Fixed, ANGLE_FULL,
    ANGLE_HALF,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: Fixed,
    pub y: Fixed,
}

impl Vec2 {
    pub const ZERO: Self = Self::new(Fixed::ZERO, Fixed::ZERO);

    #[inline]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Whole-pixel coordinates.
    #[inline]
    pub const fn from_int(x: i32, y: i32) -> Self {
        Self::new(Fixed::from_int(x), Fixed::from_int(y))
    }

    #[inline]
    pub const fn to_int(self) -> (i32, i32) {
        (self.x.to_int(), self.y.to_int())
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.x.is_zero() && self.y.is_zero()
    }

    #[inline]
    pub fn scale(self, factor: Fixed) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    #[inline]
    pub fn dot(self, rhs: Self) -> Fixed {
        (self.x * rhs.x).saturating_add(self.y * rhs.y)
    }

    /// Squared length in Q16.8 px^2. Saturates instead of wrapping for
    /// vectors longer than ~2900 px.
    #[inline]
    pub fn len_sq(self) -> Fixed {
        self.dot(self)
    }

    pub fn len(self) -> Fixed {
        sqrt_fixed(self.len_sq())
    }

    #[inline]
    pub fn distance(self, other: Self) -> Fixed {
        (other - self).len()
    }

    #[inline]
    pub fn distance_sq(self, other: Self) -> Fixed {
        (other - self).len_sq()
    }

    /// Unit vector in the same direction. The zero vector stays zero.
    pub fn normalize(self) -> Self {
        let len = self.len();
        if len.is_zero() {
            return Self::ZERO;
        }
        Self::new(self.x / len, self.y / len)
    }

    /// Same direction, length capped at `max_len`.
    pub fn clamp_len(self, max_len: Fixed) -> Self {
        let len = self.len();
        if len <= max_len || len.is_zero() {
            return self;
        }
        self.normalize().scale(max_len)
    }

    /// Counter-clockwise perpendicular, (-y, x).
    #[inline]
    pub fn perp(self) -> Self {
        Self::new(-self.y, self.x)
    }

    /// Clockwise perpendicular, (y, -x).
    #[inline]
    pub fn perp_cw(self) -> Self {
        Self::new(self.y, -self.x)
    }

    pub fn rotate(self, angle: BinaryAngle) -> Self {
        let c = angle.cos();
        let s = angle.sin();
        Self::new(self.x * c - self.y * s, self.x * s + self.y * c)
    }

    /// Mirror across a unit surface normal: v - 2(v.n)n.
    pub fn reflect(self, normal: Self) -> Self {
        let d = self.dot(normal);
        self - normal.scale(d + d)
    }

    /// `self + (other - self) * t`, t in Q16.8.
    pub fn lerp(self, other: Self, t: Fixed) -> Self {
        self + (other - self).scale(t)
    }

    /// Unit vector pointing along a binary angle.
    #[inline]
    pub fn from_angle(angle: BinaryAngle) -> Self {
        Self::new(cos_bin(angle.raw()), sin_bin(angle.raw()))
    }

    /// Heading of this vector as a binary angle. The zero vector maps to 0.
    ///
    /// The first-quadrant angle is recovered from |y| / len by searching the
    /// sine table, then reflected into the quadrant of (x, y).
    pub fn to_angle(self) -> BinaryAngle {
        if self.is_zero() {
            return BinaryAngle::RIGHT;
        }
        let len = self.len();
        if len.is_zero() {
            return BinaryAngle::RIGHT;
        }

        let sin_val = self.y.abs() / len;
        let a = asin_first_quadrant(sin_val);

        let neg_x = self.x.is_negative();
        let neg_y = self.y.is_negative();
        let angle = match (neg_x, neg_y) {
            (false, false) => a,
            (true, false) => ANGLE_HALF - a,
            (true, true) => ANGLE_HALF + a,
            (false, true) => ANGLE_FULL - a,
        };
        BinaryAngle::new(angle)
    }
}

impl Add for Vec2 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Vec2 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Vec2 {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}
