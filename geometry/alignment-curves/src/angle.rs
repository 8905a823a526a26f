//! Binary angles and planar direction helpers.
//!
//! Bearings are stored as integers where a full turn is 2³¹ units, so an
//! `i32` holds two turns (±360°). Wrapping arithmetic is exact modulo a
//! whole number of turns, which is what makes bearing subtraction safe
//! without any explicit normalization.

use nalgebra::{Point2, Vector2};
use std::f64::consts::PI;
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Units per radian.
const UNITS_PER_RADIAN: f64 = (1u64 << 30) as f64 / PI;

/// An angle or bearing in binary units (2³¹ units per turn).
///
/// Bearings are measured counterclockwise from east.
///
/// # Example
///
/// ```
/// use alignment_curves::BinaryAngle;
///
/// let a = BinaryAngle::from_degrees(350.0);
/// let b = BinaryAngle::from_degrees(10.0);
///
/// // Folding the difference gives the short way around.
/// assert!(((b - a).fold().to_degrees() - 20.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BinaryAngle(i32);

impl BinaryAngle {
    /// Zero angle; also the bearing of due east.
    pub const ZERO: Self = Self(0);
    /// The smallest representable step.
    pub const UNIT: Self = Self(1);
    /// 30 degrees, rounded to the nearest unit.
    pub const DEG30: Self = Self(0x0aaa_aaab);
    /// 60 degrees, rounded to the nearest unit.
    pub const DEG60: Self = Self(0x1555_5555);
    /// 90 degrees.
    pub const DEG90: Self = Self(0x2000_0000);
    /// 180 degrees.
    pub const DEG180: Self = Self(0x4000_0000);
    /// 270 degrees.
    pub const DEG270: Self = Self(0x6000_0000);
    /// 360 degrees. Equal to `i32::MIN`; adding it toggles the sign bit.
    pub const DEG360: Self = Self(i32::MIN);

    /// Wrap a raw binary value.
    #[must_use]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// The raw binary value.
    #[must_use]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Convert radians, rounding to the nearest unit.
    ///
    /// Values beyond ±360° wrap by whole turns.
    #[must_use]
    pub fn from_radians(radians: f64) -> Self {
        // i64 saturates far outside the range; the i32 truncation then wraps
        // by multiples of two turns.
        Self((radians * UNITS_PER_RADIAN).round() as i64 as i32)
    }

    /// Convert degrees, rounding to the nearest unit.
    #[must_use]
    pub fn from_degrees(degrees: f64) -> Self {
        Self::from_radians(degrees.to_radians())
    }

    /// The angle in radians.
    #[must_use]
    pub fn to_radians(self) -> f64 {
        f64::from(self.0) / UNITS_PER_RADIAN
    }

    /// The angle in degrees.
    #[must_use]
    pub fn to_degrees(self) -> f64 {
        self.to_radians().to_degrees()
    }

    /// Reinterpret the angle in the principal range (−180°, 180°].
    ///
    /// Bit 30 is sign-extended over bit 31, which removes any whole turn
    /// without a modulo computation. `fold(fold(x)) == fold(x)`.
    #[must_use]
    pub const fn fold(self) -> Self {
        let folded = self.0.wrapping_shl(1) >> 1;
        if folded == -Self::DEG180.0 {
            Self::DEG180
        } else {
            Self(folded)
        }
    }

    /// Magnitude in units. Never overflows, unlike `i32::abs`.
    #[must_use]
    pub const fn unsigned_abs(self) -> u32 {
        self.0.unsigned_abs()
    }

    /// Unit vector pointing along this bearing.
    #[must_use]
    pub fn unit_vector(self) -> Vector2<f64> {
        let (sin, cos) = self.to_radians().sin_cos();
        Vector2::new(cos, sin)
    }
}

impl Add for BinaryAngle {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.wrapping_add(rhs.0))
    }
}

impl AddAssign for BinaryAngle {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.wrapping_add(rhs.0);
    }
}

impl Sub for BinaryAngle {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.wrapping_sub(rhs.0))
    }
}

impl SubAssign for BinaryAngle {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 = self.0.wrapping_sub(rhs.0);
    }
}

impl Neg for BinaryAngle {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.wrapping_neg())
    }
}

impl Mul<i32> for BinaryAngle {
    type Output = Self;

    fn mul(self, rhs: i32) -> Self {
        Self(self.0.wrapping_mul(rhs))
    }
}

impl Div<i32> for BinaryAngle {
    type Output = Self;

    fn div(self, rhs: i32) -> Self {
        Self(self.0.wrapping_div(rhs))
    }
}

impl fmt::Display for BinaryAngle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}°", self.to_degrees())
    }
}

/// Bearing from `a` to `b`.
#[must_use]
pub fn dir(a: &Point2<f64>, b: &Point2<f64>) -> BinaryAngle {
    let d = b - a;
    BinaryAngle::from_radians(d.y.atan2(d.x))
}

/// Rotate a vector counterclockwise by `angle`.
#[must_use]
pub fn turn(v: &Vector2<f64>, angle: BinaryAngle) -> Vector2<f64> {
    let (sin, cos) = angle.to_radians().sin_cos();
    Vector2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Bearing at `b` of the circular arc through `a`, `b`, `c`.
///
/// May be off by a whole turn; callers fold it against a nearby bearing.
#[must_use]
pub fn mid_arc_dir(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> BinaryAngle {
    dir(a, b) + dir(b, c) - dir(a, c)
}

/// Signed area of the triangle `a`, `b`, `c` (positive if counterclockwise).
#[must_use]
pub fn area3(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    let ab = b - a;
    let ac = c - a;
    (ab.x * ac.y - ab.y * ac.x) / 2.0
}
