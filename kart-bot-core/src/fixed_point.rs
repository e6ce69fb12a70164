//! Fixed-point math for deterministic bot decisions.
//!
//! Formats:
//! - Q16.8 scalars: positions, speeds and distances multiplied by 256
//! - 9-bit binary angles: 512 steps per full rotation, wrapped with `& 511`
//! - Q16.8 trig: quarter-wave sine table, values in -256..=256

use core::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

pub const FIXED_SHIFT: u32 = 8;
pub const FIXED_ONE: i32 = 1 << FIXED_SHIFT;

pub const ANGLE_FULL: i32 = 512;
pub const ANGLE_HALF: i32 = 256;
pub const ANGLE_QUARTER: i32 = 128;
pub const ANGLE_MASK: i32 = ANGLE_FULL - 1;

/// Quarter-wave sin table in Q16.8 (129 entries).
/// SIN_LUT[i] = round(sin(i * pi / 256) * 256), so SIN_LUT[128] = 256 = 1.0.
static SIN_LUT: [i16; 129] = [
    0, 3, 6, 9, 13, 16, 19, 22, 25, 28, 31, 34, 38, 41, 44, 47, 50, 53, 56, 59, 62, 65, 68, 71,
    74, 77, 80, 83, 86, 89, 92, 95, 98, 101, 104, 107, 109, 112, 115, 118, 121, 123, 126, 129,
    132, 134, 137, 140, 142, 145, 147, 150, 152, 155, 157, 160, 162, 165, 167, 170, 172, 174,
    177, 179, 181, 183, 185, 188, 190, 192, 194, 196, 198, 200, 202, 204, 206, 207, 209, 211,
    213, 215, 216, 218, 220, 221, 223, 224, 226, 227, 229, 230, 231, 233, 234, 235, 237, 238,
    239, 240, 241, 242, 243, 244, 245, 246, 247, 248, 248, 249, 250, 250, 251, 252, 252, 253,
    253, 254, 254, 254, 255, 255, 255, 256, 256, 256, 256, 256, 256,
];

#[inline]
fn saturate(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Signed Q16.8 scalar.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Fixed(i32);

impl Fixed {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(FIXED_ONE);
    pub const HALF: Self = Self(FIXED_ONE / 2);
    pub const MAX: Self = Self(i32::MAX);
    pub const MIN: Self = Self(i32::MIN);

    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    #[inline]
    pub const fn from_int(value: i32) -> Self {
        Self(value << FIXED_SHIFT)
    }

    /// Truncates toward negative infinity, like an arithmetic shift.
    #[inline]
    pub const fn to_int(self) -> i32 {
        self.0 >> FIXED_SHIFT
    }

    /// `num / den` as Q16.8, computed as `(num << 8) / den`.
    /// `from_ratio(110, 100)` is the 1.10x multiplier (281 raw).
    #[inline]
    pub const fn from_ratio(num: i32, den: i32) -> Self {
        if den == 0 {
            return Self::ZERO;
        }
        Self((num << FIXED_SHIFT) / den)
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub const fn abs(self) -> Self {
        Self(self.0.wrapping_abs())
    }

    #[inline]
    pub fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    /// Division that returns `None` for a zero divisor instead of panicking.
    #[inline]
    pub fn checked_div(self, rhs: Self) -> Option<Self> {
        if rhs.0 == 0 {
            return None;
        }
        Some(Self(saturate(((self.0 as i64) << FIXED_SHIFT) / rhs.0 as i64)))
    }

    /// Multiply by an integer without rescaling.
    #[inline]
    pub fn mul_int(self, rhs: i32) -> Self {
        Self(saturate(self.0 as i64 * rhs as i64))
    }

    /// Divide by an integer without rescaling. Zero divisors yield zero.
    #[inline]
    pub fn div_int(self, rhs: i32) -> Self {
        if rhs == 0 {
            return Self::ZERO;
        }
        Self(self.0 / rhs)
    }
}

impl Add for Fixed {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0.wrapping_add(rhs.0))
    }
}

impl AddAssign for Fixed {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Fixed {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(self.0.wrapping_sub(rhs.0))
    }
}

impl SubAssign for Fixed {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for Fixed {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self(self.0.wrapping_neg())
    }
}

/// `(a * b) >> 8` with a 64-bit intermediate.
impl Mul for Fixed {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self(saturate((self.0 as i64 * rhs.0 as i64) >> FIXED_SHIFT))
    }
}

/// `(a << 8) / b` with a 64-bit intermediate. A zero divisor saturates
/// toward the sign of the dividend (zero stays zero) rather than panicking.
impl Div for Fixed {
    type Output = Self;

    #[inline]
    fn div(self, rhs: Self) -> Self {
        match self.checked_div(rhs) {
            Some(value) => value,
            None if self.0 > 0 => Self::MAX,
            None if self.0 < 0 => Self::MIN,
            None => Self::ZERO,
        }
    }
}

/// Binary angle: 0..512 covers a full turn, 0 = +x, 128 = +y (screen down).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BinaryAngle(u16);

impl BinaryAngle {
    pub const RIGHT: Self = Self(0);
    pub const DOWN_RIGHT: Self = Self(64);
    pub const DOWN: Self = Self(128);
    pub const DOWN_LEFT: Self = Self(192);
    pub const LEFT: Self = Self(256);
    pub const UP_LEFT: Self = Self(320);
    pub const UP: Self = Self(384);
    pub const UP_RIGHT: Self = Self(448);

    /// Wraps any integer into 0..512 with the angle mask.
    #[inline]
    pub const fn new(raw: i32) -> Self {
        Self((raw & ANGLE_MASK) as u16)
    }

    #[inline]
    pub const fn raw(self) -> i32 {
        self.0 as i32
    }

    #[inline]
    pub const fn wrapping_add(self, delta: i32) -> Self {
        Self::new(self.0 as i32 + delta)
    }

    /// Signed shortest rotation from `self` to `target`, in -255..=256.
    /// A difference of exactly half a turn stays positive.
    #[inline]
    pub const fn delta_to(self, target: Self) -> i32 {
        let diff = (target.0 as i32 - self.0 as i32) & ANGLE_MASK;
        if diff > ANGLE_HALF {
            diff - ANGLE_FULL
        } else {
            diff
        }
    }

    #[inline]
    pub fn sin(self) -> Fixed {
        sin_bin(self.raw())
    }

    #[inline]
    pub fn cos(self) -> Fixed {
        cos_bin(self.raw())
    }
}

/// Sine of a binary angle from the quarter-wave table.
/// Quadrants 1 and 3 mirror the index, quadrants 2 and 3 negate.
pub fn sin_bin(angle: i32) -> Fixed {
    let a = angle & ANGLE_MASK;
    let quadrant = a >> 7;
    let idx = a & (ANGLE_QUARTER - 1);

    let val = if quadrant & 1 != 0 {
        SIN_LUT[(ANGLE_QUARTER - idx) as usize]
    } else {
        SIN_LUT[idx as usize]
    } as i32;

    Fixed::from_raw(if quadrant >= 2 { -val } else { val })
}

/// cos(x) = sin(x + 90deg)
#[inline]
pub fn cos_bin(angle: i32) -> Fixed {
    sin_bin(angle + ANGLE_QUARTER)
}

/// First-quadrant angle (0..=128) whose table sine is the largest value not
/// exceeding `sin_val`. Binary search over the same LUT used by `sin_bin`.
pub(crate) fn asin_first_quadrant(sin_val: Fixed) -> i32 {
    let target = sin_val.raw();
    let mut lo = 0i32;
    let mut hi = ANGLE_QUARTER;
    while lo < hi {
        let mid = (lo + hi + 1) >> 1;
        if (SIN_LUT[mid as usize] as i32) <= target {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    lo
}

/// floor(sqrt(n)), bit-by-bit.
pub fn isqrt_u64(mut n: u64) -> u32 {
    let mut res = 0u64;
    let mut bit = 1u64 << 62;

    while bit > n {
        bit >>= 2;
    }

    while bit != 0 {
        if n >= res + bit {
            n -= res + bit;
            res = (res >> 1) + bit;
        } else {
            res >>= 1;
        }
        bit >>= 2;
    }

    res as u32
}

/// Square root of a non-negative Q16.8 value, returned as Q16.8.
pub fn sqrt_fixed(value: Fixed) -> Fixed {
    if value.raw() <= 0 {
        return Fixed::ZERO;
    }
    let shifted = (value.raw() as u64) << FIXED_SHIFT;
    Fixed::from_raw(isqrt_u64(shifted) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trig_cardinal_points() {
        assert_eq!(sin_bin(0).raw(), 0);
        assert_eq!(cos_bin(0).raw(), 256);

        assert_eq!(sin_bin(128).raw(), 256);
        assert_eq!(cos_bin(128).raw(), 0);

        assert_eq!(sin_bin(256).raw(), 0);
        assert_eq!(cos_bin(256).raw(), -256);

        assert_eq!(sin_bin(384).raw(), -256);
        assert_eq!(cos_bin(384).raw(), 0);
    }

    #[test]
    fn test_trig_symmetry_and_wrap() {
        for a in 0..ANGLE_FULL {
            assert_eq!(sin_bin(a), -sin_bin(a + ANGLE_HALF), "angle {a}");
            assert_eq!(sin_bin(a), sin_bin(a + ANGLE_FULL), "angle {a}");
            assert_eq!(sin_bin(a), sin_bin(-(ANGLE_FULL - a)), "angle {a}");
        }
        // 45 degrees
        assert_eq!(sin_bin(64).raw(), 181);
        assert_eq!(cos_bin(64).raw(), 181);
    }

    #[test]
    fn test_fixed_mul_div_scaling() {
        let a = Fixed::from_int(3);
        let b = Fixed::from_ratio(110, 100);
        assert_eq!(b.raw(), 281);
        assert_eq!((a * b).raw(), (768 * 281) >> 8);
        assert_eq!((Fixed::from_int(6) / Fixed::from_int(4)).raw(), 384);
        assert_eq!(Fixed::from_int(-5).to_int(), -5);
    }

    #[test]
    fn test_fixed_mul_uses_wide_intermediate() {
        let big = Fixed::from_int(1000);
        assert_eq!((big * big).to_int(), 1_000_000);
    }

    #[test]
    fn test_div_by_zero_saturates() {
        assert_eq!(Fixed::ONE / Fixed::ZERO, Fixed::MAX);
        assert_eq!(-Fixed::ONE / Fixed::ZERO, Fixed::MIN);
        assert_eq!(Fixed::ZERO / Fixed::ZERO, Fixed::ZERO);
        assert!(Fixed::ONE.checked_div(Fixed::ZERO).is_none());
    }

    #[test]
    fn test_isqrt() {
        assert_eq!(isqrt_u64(0), 0);
        assert_eq!(isqrt_u64(1), 1);
        assert_eq!(isqrt_u64(15), 3);
        assert_eq!(isqrt_u64(16), 4);
        assert_eq!(isqrt_u64(u64::from(u32::MAX) * u64::from(u32::MAX)), u32::MAX);
        assert_eq!(sqrt_fixed(Fixed::from_int(9)), Fixed::from_int(3));
        assert_eq!(sqrt_fixed(Fixed::from_int(-9)), Fixed::ZERO);
    }

    #[test]
    fn test_angle_wrap_and_delta() {
        assert_eq!(BinaryAngle::new(-1).raw(), 511);
        assert_eq!(BinaryAngle::new(512 + 7).raw(), 7);
        assert_eq!(BinaryAngle::new(10).delta_to(BinaryAngle::new(500)), -22);
        assert_eq!(BinaryAngle::new(500).delta_to(BinaryAngle::new(10)), 22);
        assert_eq!(BinaryAngle::RIGHT.delta_to(BinaryAngle::LEFT), 256);
        assert_eq!(BinaryAngle::UP.wrapping_add(200), BinaryAngle::new(72));
    }

    #[test]
    fn test_asin_first_quadrant_matches_table() {
        assert_eq!(asin_first_quadrant(Fixed::ZERO), 0);
        assert_eq!(asin_first_quadrant(Fixed::from_raw(4)), 1);
        assert_eq!(asin_first_quadrant(Fixed::ONE), 128);
        assert_eq!(asin_first_quadrant(Fixed::from_raw(181)), 64);
    }
}
