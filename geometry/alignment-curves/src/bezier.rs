//! Cubic Bézier output of curve flattening.
//!
//! [`Curve::approx3d`](crate::Curve::approx3d) renders lines, arcs and
//! spirals as sequences of cubic Béziers for display and export. This
//! module holds the Bézier type and the closed-form bound on how far such
//! a Bézier strays from the curve it stands for.

use crate::angle::BinaryAngle;
use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A cubic Bézier curve defined by 4 control points.
///
/// The curve passes through P₀ and P₃, and is tangent to P₀P₁ at the
/// start and P₂P₃ at the end.
///
/// # Equation
///
/// ```text
/// B(t) = (1-t)³P₀ + 3(1-t)²tP₁ + 3(1-t)t²P₂ + t³P₃
/// ```
///
/// # Example
///
/// ```
/// use alignment_curves::CubicBezier;
/// use nalgebra::Point3;
///
/// let curve = CubicBezier::new(
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 2.0, 0.0),
///     Point3::new(3.0, 2.0, 0.0),
///     Point3::new(4.0, 0.0, 0.0),
/// );
///
/// let end = curve.point_at(1.0);
/// assert!((end.x - 4.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CubicBezier {
    /// Start point.
    pub p0: Point3<f64>,
    /// First control point (affects start tangent).
    pub p1: Point3<f64>,
    /// Second control point (affects end tangent).
    pub p2: Point3<f64>,
    /// End point.
    pub p3: Point3<f64>,
}

impl CubicBezier {
    /// Create a new cubic Bézier curve.
    #[must_use]
    pub const fn new(p0: Point3<f64>, p1: Point3<f64>, p2: Point3<f64>, p3: Point3<f64>) -> Self {
        Self { p0, p1, p2, p3 }
    }

    /// Create a cubic Bézier from endpoints, horizontal bearings and
    /// elevation control values.
    ///
    /// The horizontal handles have length `length / 3` along the bearings,
    /// which makes the Bézier's speed match an arc-length parameterization
    /// at both ends. `control1` and `control2` are the elevations of the
    /// inner control points.
    #[must_use]
    pub fn from_bearings(
        start: Point3<f64>,
        start_bearing: BinaryAngle,
        end: Point3<f64>,
        end_bearing: BinaryAngle,
        length: f64,
        control1: f64,
        control2: f64,
    ) -> Self {
        let handle = length / 3.0;
        let s = start_bearing.unit_vector() * handle;
        let e = end_bearing.unit_vector() * handle;

        let p1 = Point3::new(start.x + s.x, start.y + s.y, control1);
        let p2 = Point3::new(end.x - e.x, end.y - e.y, control2);

        Self::new(start, p1, p2, end)
    }

    /// Evaluate the curve at `t`, clamped to `[0, 1]`.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point3<f64> {
        let t = t.clamp(0.0, 1.0);
        let s = 1.0 - t;
        let s2 = s * s;
        let t2 = t * t;

        Point3::from(
            self.p0.coords * (s2 * s)
                + self.p1.coords * (3.0 * s2 * t)
                + self.p2.coords * (3.0 * s * t2)
                + self.p3.coords * (t2 * t),
        )
    }

    /// Tangent `dB/dt` at `t`, clamped to `[0, 1]`.
    ///
    /// Evaluated on the hodograph, the quadratic through the three
    /// control-point differences.
    #[must_use]
    pub fn derivative_at(&self, t: f64) -> Vector3<f64> {
        let t = t.clamp(0.0, 1.0);
        let s = 1.0 - t;
        let near = (self.p1 - self.p0) * s + (self.p2 - self.p1) * t;
        let far = (self.p2 - self.p1) * s + (self.p3 - self.p2) * t;
        (near * s + far * t) * 3.0
    }

    /// Sample `n` points (at least 2) uniformly in parameter space.
    #[must_use]
    pub fn sample_uniform(&self, n: usize) -> Vec<Point3<f64>> {
        let n = n.max(2);
        (0..n)
            .map(|i| self.point_at(i as f64 / (n - 1) as f64))
            .collect()
    }
}

/// Upper estimate of the horizontal distance between a gently turning
/// curve and the Bézier built by [`CubicBezier::from_bearings`].
///
/// `alpha` and `beta` are the start and end bearings relative to the chord.
/// The deviation grows with the cube of the turn; the coefficient keeps a
/// margin over the worst case measured for clothoids with both bearings
/// under 30° from the chord.
#[must_use]
pub fn bezier_deviation_estimate(length: f64, alpha: BinaryAngle, beta: BinaryAngle) -> f64 {
    let a = alpha.fold().to_radians().abs();
    let b = beta.fold().to_radians().abs();
    length * (a.powi(3) + b.powi(3)) / 16.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cubic_bezier() {
        let curve = CubicBezier::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
            Point3::new(3.0, 0.0, 0.0),
        );

        assert_relative_eq!(curve.point_at(0.0).coords, curve.p0.coords, epsilon = 1e-10);
        assert_relative_eq!(curve.point_at(1.0).coords, curve.p3.coords, epsilon = 1e-10);
        assert_relative_eq!(curve.point_at(0.5).y, 0.75, epsilon = 1e-10);

        let d = curve.derivative_at(0.0);
        assert_relative_eq!(d, Vector3::new(3.0, 3.0, 0.0), epsilon = 1e-10);
        let d = curve.derivative_at(0.5);
        assert_relative_eq!(d, Vector3::new(3.0, 0.0, 0.0), epsilon = 1e-10);
        let d = curve.derivative_at(1.0);
        assert_relative_eq!(d, Vector3::new(3.0, -3.0, 0.0), epsilon = 1e-10);
    }

    #[test]
    fn test_from_bearings() {
        let start = Point3::new(0.0, 0.0, 1.0);
        let end = Point3::new(6.0, 0.0, 4.0);
        let curve =
            CubicBezier::from_bearings(start, BinaryAngle::ZERO, end, BinaryAngle::ZERO, 6.0, 2.0, 3.0);

        assert_relative_eq!(curve.p1.coords, Vector3::new(2.0, 0.0, 2.0), epsilon = 1e-10);
        assert_relative_eq!(curve.p2.coords, Vector3::new(4.0, 0.0, 3.0), epsilon = 1e-10);

        // Evenly spaced handles on a straight line give uniform speed.
        assert_relative_eq!(curve.point_at(0.25).x, 1.5, epsilon = 1e-10);
        assert_relative_eq!(curve.point_at(0.5).z, 2.5, epsilon = 1e-10);
    }

    #[test]
    fn test_deviation_estimate() {
        assert_eq!(
            bezier_deviation_estimate(100.0, BinaryAngle::ZERO, BinaryAngle::ZERO),
            0.0
        );

        let small = bezier_deviation_estimate(100.0, BinaryAngle::from_degrees(5.0), -BinaryAngle::from_degrees(5.0));
        let double = bezier_deviation_estimate(100.0, BinaryAngle::from_degrees(10.0), -BinaryAngle::from_degrees(10.0));
        assert_relative_eq!(double / small, 8.0, epsilon = 1e-6);
    }

    #[test]
    fn test_sample_uniform() {
        let curve = CubicBezier::new(
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(3.0, 0.0, 0.0),
        );
        let samples = curve.sample_uniform(4);
        assert_eq!(samples.len(), 4);
        assert_relative_eq!(samples[1].x, 1.0, epsilon = 1e-10);
    }
}
