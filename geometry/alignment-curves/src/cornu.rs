//! Cornu (Euler spiral) integrals.
//!
//! Two series evaluators:
//!
//! - [`cornu`]: `∫₀ᵗ cis(s²) ds`, the unit clothoid.
//! - [`cornu_general`]: `∫₀ᵗ cis(clothance·s²/2 + curvature·s) ds`, which
//!   covers lines, circles and clothoids with an arbitrary curvature offset.
//!
//! Both sum their power series only while the largest term is small enough
//! for `f64` to carry the result to about 1e-6. Past that the simple form
//! returns its asymptotic limit and the general form returns NaN.
//!
//! Iteration counts can be observed through a [`SeriesRecorder`]; the plain
//! functions use [`NoopRecorder`].

use crate::angle::BinaryAngle;
use crate::sum::pairwise_sum;
use nalgebra::Vector2;
use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::fmt;
use tracing::warn;

/// Degree cap of the general series.
pub const MAX_SERIES_DEGREE: usize = 64;

/// Beyond this `|t|` the simple series is useless and the limit is returned.
const CORNU_T_LIMIT: f64 = 6.0;

/// Worst acceptable unit in the last place of the largest term.
const PRECISION_LIMIT: f64 = 1e-6;

/// Observer of series iteration counts.
pub trait SeriesRecorder {
    /// Called once per evaluation with the number of iterations it took.
    fn record(&mut self, iterations: usize);
}

/// Recorder that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRecorder;

impl SeriesRecorder for NoopRecorder {
    fn record(&mut self, _iterations: usize) {}
}

/// Histogram of iteration counts.
///
/// # Example
///
/// ```
/// use alignment_curves::{cornu_recorded, IterationHistogram};
///
/// let mut histogram = IterationHistogram::new();
/// for i in 0..10 {
///     cornu_recorded(f64::from(i) * 0.3, &mut histogram);
/// }
/// assert_eq!(histogram.total(), 10);
/// println!("{histogram}");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IterationHistogram {
    counts: BTreeMap<usize, u64>,
}

impl IterationHistogram {
    /// Create an empty histogram.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// How many evaluations took exactly `iterations`.
    #[must_use]
    pub fn count(&self, iterations: usize) -> u64 {
        self.counts.get(&iterations).copied().unwrap_or(0)
    }

    /// Total number of recorded evaluations.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Largest iteration count seen.
    #[must_use]
    pub fn max_iterations(&self) -> Option<usize> {
        self.counts.keys().next_back().copied()
    }

    /// Mean iteration count, or NaN if nothing was recorded.
    #[must_use]
    pub fn mean(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return f64::NAN;
        }
        let weighted: f64 = self
            .counts
            .iter()
            .map(|(&iterations, &count)| iterations as f64 * count as f64)
            .sum();
        weighted / total as f64
    }
}

impl SeriesRecorder for IterationHistogram {
    fn record(&mut self, iterations: usize) {
        *self.counts.entry(iterations).or_insert(0) += 1;
    }
}

impl fmt::Display for IterationHistogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cornu statistics")?;
        for (iterations, count) in &self.counts {
            writeln!(f, "{iterations:>4} {count}")?;
        }
        Ok(())
    }
}

/// Distance from `x` to the next larger representable value.
fn ulp(x: f64) -> f64 {
    let x = x.abs();
    f64::from_bits(x.to_bits() + 1) - x
}

/// `∫₀ᵗ cis(s²) ds`.
///
/// Odd in `t`, zero at zero, and tends to `±√(π/8)·(1, 1)`.
#[must_use]
pub fn cornu(t: f64) -> Vector2<f64> {
    cornu_recorded(t, &mut NoopRecorder)
}

/// [`cornu`] reporting its iteration count to `recorder`.
pub fn cornu_recorded<R: SeriesRecorder + ?Sized>(t: f64, recorder: &mut R) -> Vector2<f64> {
    if t.is_nan() {
        return Vector2::new(f64::NAN, f64::NAN);
    }
    let limit = (PI / 8.0).sqrt().copysign(t);
    if t.abs() >= CORNU_T_LIMIT {
        return Vector2::new(limit, limit);
    }

    let t2 = t * t;
    let mut real = Vec::new();
    let mut imag = Vec::new();
    let mut fp = t;
    let mut i = 0usize;
    loop {
        let k = (4 * i) as f64;
        let d = (8 * i) as f64;

        real.push(fp / (d + 1.0));
        fp *= t2 / (k + 1.0);
        imag.push(fp / (d + 3.0));
        fp *= t2 / (k + 2.0);
        real.push(-fp / (d + 5.0));
        fp *= t2 / (k + 3.0);
        imag.push(-fp / (d + 7.0));
        fp *= t2 / (k + 4.0);
        i += 1;

        if !fp.is_finite() || 0.9 + fp == 0.9 {
            break;
        }
    }
    recorder.record(i);

    let big = real
        .iter()
        .chain(&imag)
        .fold(0.0_f64, |acc, x| acc.max(x.abs()));
    if !big.is_finite() || ulp(big) > PRECISION_LIMIT {
        return Vector2::new(limit, limit);
    }

    // Smallest terms first.
    let re: f64 = real.iter().rev().sum();
    let im: f64 = imag.iter().rev().sum();
    Vector2::new(re, im)
}

/// `∫₀ᵗ cis(clothance·s²/2 + curvature·s) ds`.
///
/// With `clothance == 0` this traces a circle of radius `1/curvature`; with
/// `curvature == 0, clothance == 2` it equals [`cornu`]. Returns NaN when
/// the series cannot deliver about 1e-6 precision.
#[must_use]
pub fn cornu_general(t: f64, curvature: f64, clothance: f64) -> Vector2<f64> {
    cornu_general_recorded(t, curvature, clothance, &mut NoopRecorder)
}

/// [`cornu_general`] reporting its series degree to `recorder`.
pub fn cornu_general_recorded<R: SeriesRecorder + ?Sized>(
    t: f64,
    curvature: f64,
    clothance: f64,
    recorder: &mut R,
) -> Vector2<f64> {
    let mut cu_power = [0.0; MAX_SERIES_DEGREE + 1];
    let mut cl_power = [0.0; MAX_SERIES_DEGREE + 1];
    cu_power[0] = 1.0;
    cl_power[0] = 1.0;
    let clo_t = clothance * t / 2.0;

    let mut real = Vec::new();
    let mut imag = Vec::new();
    let mut big_part = 0.0_f64;
    let mut fp = t;
    let mut i = 0usize;

    while i < MAX_SERIES_DEGREE {
        let mut big_term = 0.0_f64;
        let mut binom = 1.0;
        for j in 0..=i {
            let term = cl_power[j] * cu_power[i - j] * binom * fp / (i + j + 1) as f64;
            big_term = big_term.max(term.abs());
            match i & 3 {
                0 => real.push(term),
                1 => imag.push(term),
                2 => real.push(-term),
                _ => imag.push(-term),
            }
            binom = binom * (i - j) as f64 / (j + 1) as f64;
        }
        big_part = big_part.max(big_term);
        cu_power[i + 1] = cu_power[i] * curvature;
        cl_power[i + 1] = cl_power[i] * clo_t;
        fp *= t / (i + 1) as f64;
        i += 1;

        if 0.9 + big_term == 0.9 || big_term.is_nan() {
            break;
        }
    }
    recorder.record(i);

    if i >= MAX_SERIES_DEGREE {
        warn!(t, curvature, clothance, "cornu series reached its degree cap");
    }

    let re = pairwise_sum(&mut real);
    let im = pairwise_sum(&mut imag);
    if !big_part.is_finite() || ulp(big_part) > PRECISION_LIMIT {
        return Vector2::new(f64::NAN, f64::NAN);
    }
    Vector2::new(re, im)
}

/// Bearing change in radians at distance `t` from a spiral's midpoint.
#[must_use]
pub fn spiral_bearing(t: f64, curvature: f64, clothance: f64) -> f64 {
    clothance * t * t / 2.0 + curvature * t
}

/// [`spiral_bearing`] as a [`BinaryAngle`].
#[must_use]
pub fn spiral_bearing_bin(t: f64, curvature: f64, clothance: f64) -> BinaryAngle {
    BinaryAngle::from_radians(spiral_bearing(t, curvature, clothance))
}

/// Curvature at distance `t` from a spiral's midpoint.
#[must_use]
pub fn spiral_curvature(t: f64, curvature: f64, clothance: f64) -> f64 {
    clothance * t + curvature
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cornu_zero() {
        let z = cornu(0.0);
        assert_eq!(z.x, 0.0);
        assert_eq!(z.y, 0.0);
    }

    #[test]
    fn test_cornu_small_t() {
        // Leading terms: t - t⁵/10, t³/3.
        let t = 0.1;
        let z = cornu(t);
        assert_relative_eq!(z.x, t - t.powi(5) / 10.0, epsilon = 1e-10);
        assert_relative_eq!(z.y, t.powi(3) / 3.0 - t.powi(7) / 42.0, epsilon = 1e-12);
    }

    #[test]
    fn test_cornu_odd_symmetry() {
        for &t in &[0.3, 1.0, 1.7, 2.5, 3.2] {
            let a = cornu(t);
            let b = cornu(-t);
            assert_relative_eq!(a.x, -b.x, epsilon = 1e-12);
            assert_relative_eq!(a.y, -b.y, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_cornu_limit() {
        let limit = (PI / 8.0).sqrt();
        let z = cornu(10.0);
        assert_relative_eq!(z.x, limit);
        assert_relative_eq!(z.y, limit);

        let z = cornu(f64::NEG_INFINITY);
        assert_relative_eq!(z.x, -limit);

        assert!(cornu(f64::NAN).x.is_nan());
    }

    #[test]
    fn test_cornu_general_matches_cornu() {
        for &t in &[-3.0, -1.2, 0.0, 0.5, 1.0, 2.2, 3.0] {
            let a = cornu(t);
            let b = cornu_general(t, 0.0, 2.0);
            assert_relative_eq!(a.x, b.x, epsilon = 1e-10);
            assert_relative_eq!(a.y, b.y, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_cornu_general_line_and_circle() {
        let line = cornu_general(5.0, 0.0, 0.0);
        assert_relative_eq!(line.x, 5.0);
        assert_relative_eq!(line.y, 0.0);

        // Quarter circle of radius 2.
        let k = 0.5;
        let t = std::f64::consts::FRAC_PI_2 / k;
        let arc = cornu_general(t, k, 0.0);
        assert_relative_eq!(arc.x, 2.0, epsilon = 1e-9);
        assert_relative_eq!(arc.y, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_cornu_general_imprecise_is_nan() {
        let z = cornu_general(40.0, 1.0, 0.0);
        assert!(z.x.is_nan());
        assert!(z.y.is_nan());
    }

    #[test]
    fn test_spiral_helpers() {
        assert_relative_eq!(spiral_bearing(2.0, 0.1, 0.05), 0.3);
        assert_relative_eq!(spiral_curvature(2.0, 0.1, 0.05), 0.2);
        assert_eq!(spiral_bearing_bin(0.0, 1.0, 1.0), BinaryAngle::ZERO);
    }

    #[test]
    fn test_histogram() {
        let mut histogram = IterationHistogram::new();
        histogram.record(3);
        histogram.record(3);
        histogram.record(5);

        assert_eq!(histogram.count(3), 2);
        assert_eq!(histogram.count(4), 0);
        assert_eq!(histogram.total(), 3);
        assert_eq!(histogram.max_iterations(), Some(5));
        assert_relative_eq!(histogram.mean(), 11.0 / 3.0);

        let report = histogram.to_string();
        assert!(report.starts_with("Cornu statistics"));
        assert!(report.contains("   5 1"));
    }

    #[test]
    fn test_recorded_variants_record() {
        let mut histogram = IterationHistogram::new();
        let _ = cornu_recorded(1.0, &mut histogram);
        let _ = cornu_general_recorded(1.0, 0.2, 0.4, &mut histogram);
        assert_eq!(histogram.total(), 2);
    }
}
