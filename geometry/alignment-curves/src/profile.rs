//! Cubic vertical profiles.
//!
//! Every curve carries its elevation as a cubic Bézier in the arc-length
//! fraction `p = along / length`, defined by four values: the start
//! elevation, two control values and the end elevation.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A cubic Bézier elevation profile over `p ∈ [0, 1]`.
///
/// Values outside `[0, 1]` extrapolate the same cubic.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CubicProfile {
    /// Elevation at `p = 0`.
    pub start: f64,
    /// First control value.
    pub control1: f64,
    /// Second control value.
    pub control2: f64,
    /// Elevation at `p = 1`.
    pub end: f64,
}

impl CubicProfile {
    /// Create a profile from its four Bézier values.
    #[must_use]
    pub const fn new(start: f64, control1: f64, control2: f64, end: f64) -> Self {
        Self {
            start,
            control1,
            control2,
            end,
        }
    }

    /// A straight grade between two elevations.
    #[must_use]
    pub fn linear(start: f64, end: f64) -> Self {
        Self::new(
            start,
            (2.0 * start + end) / 3.0,
            (start + 2.0 * end) / 3.0,
            end,
        )
    }

    /// Elevation at fraction `p`, by de Casteljau.
    #[must_use]
    pub fn elevation(&self, p: f64) -> f64 {
        let ab = lerp(self.start, self.control1, p);
        let bc = lerp(self.control1, self.control2, p);
        let cd = lerp(self.control2, self.end, p);
        let abc = lerp(ab, bc, p);
        let bcd = lerp(bc, cd, p);
        lerp(abc, bcd, p)
    }

    /// Derivative of elevation with respect to `p`.
    #[must_use]
    pub fn derivative(&self, p: f64) -> f64 {
        let q = 1.0 - p;
        3.0 * (q * q * (self.control1 - self.start)
            + 2.0 * q * p * (self.control2 - self.control1)
            + p * p * (self.end - self.control2))
    }

    /// Split at fraction `p` into the profiles of `[0, p]` and `[p, 1]`.
    #[must_use]
    pub fn split(&self, p: f64) -> (Self, Self) {
        let ab = lerp(self.start, self.control1, p);
        let bc = lerp(self.control1, self.control2, p);
        let cd = lerp(self.control2, self.end, p);
        let abc = lerp(ab, bc, p);
        let bcd = lerp(bc, cd, p);
        let abcd = lerp(abc, bcd, p);

        (
            Self::new(self.start, ab, abc, abcd),
            Self::new(abcd, bcd, cd, self.end),
        )
    }

    /// Fractions in `[0, 1]` where the derivative vanishes, ascending.
    ///
    /// A constant profile has no isolated extrema and yields none.
    #[must_use]
    pub fn extrema(&self) -> Vec<f64> {
        let u = self.control1 - self.start;
        let v = self.control2 - self.control1;
        let w = self.end - self.control2;

        // derivative / 3 = a p² + b p + c
        let a = u - 2.0 * v + w;
        let b = 2.0 * (v - u);
        let c = u;
        let scale = u.abs() + v.abs() + w.abs();

        let mut roots = Vec::with_capacity(2);
        if scale == 0.0 {
            return roots;
        }

        if a.abs() <= 1e-12 * scale {
            if b != 0.0 {
                roots.push(-c / b);
            }
        } else {
            let disc = b * b - 4.0 * a * c;
            if disc >= 0.0 {
                let q = -0.5 * (b + b.signum() * disc.sqrt());
                roots.push(q / a);
                if q != 0.0 {
                    roots.push(c / q);
                }
            }
        }

        roots.retain(|p| (0.0..=1.0).contains(p));
        roots.sort_by(f64::total_cmp);
        roots.dedup();
        roots
    }
}

fn lerp(a: f64, b: f64, p: f64) -> f64 {
    a + (b - a) * p
}
