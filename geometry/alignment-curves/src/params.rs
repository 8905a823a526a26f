//! Parameters for spiral fitting.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters for [`SpiralArc::fit`](crate::SpiralArc::fit).
///
/// The fit is a damped fixed-point iteration. Iteration `i` applies the
/// fraction `1 - i / damping_span` of each bearing correction, so later
/// iterations move more cautiously and oscillating cases settle.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FitParams {
    /// Iterations before the fit is declared non-convergent. Default: 256
    pub max_iterations: usize,

    /// Damping span; should exceed `max_iterations` so the correction
    /// fraction stays positive. Default: 257.0
    pub damping_span: f64,

    /// Largest change of mid bearing, in binary angle units, that still
    /// counts as converged. Default: 1
    pub bearing_tolerance: u32,

    /// Largest movement of the midpoint that still counts as converged.
    /// Default: 1e-6
    pub position_tolerance: f64,
}

impl Default for FitParams {
    fn default() -> Self {
        Self {
            max_iterations: 256,
            damping_span: 257.0,
            bearing_tolerance: 1,
            position_tolerance: 1e-6,
        }
    }
}

impl FitParams {
    /// Create params that stop early with looser tolerances.
    ///
    /// Suited to interactive previews where a fit within a few millimetres
    /// over a long alignment is good enough.
    #[must_use]
    pub fn coarse() -> Self {
        Self {
            max_iterations: 64,
            damping_span: 65.0,
            bearing_tolerance: 64,
            position_tolerance: 1e-3,
        }
    }

    /// Set the iteration cap, keeping the damping span one past it.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self.damping_span = max_iterations as f64 + 1.0;
        self
    }

    /// Set the damping span.
    #[must_use]
    pub const fn with_damping_span(mut self, damping_span: f64) -> Self {
        self.damping_span = damping_span;
        self
    }

    /// Set the bearing tolerance in binary angle units.
    #[must_use]
    pub const fn with_bearing_tolerance(mut self, units: u32) -> Self {
        self.bearing_tolerance = units;
        self
    }

    /// Set the position tolerance.
    #[must_use]
    pub const fn with_position_tolerance(mut self, tolerance: f64) -> Self {
        self.position_tolerance = tolerance;
        self
    }

    /// Fraction of the bearing correction applied in iteration `i`.
    #[must_use]
    pub fn damping(&self, iteration: usize) -> f64 {
        1.0 - iteration as f64 / self.damping_span
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = FitParams::default();
        assert_eq!(params.max_iterations, 256);
        assert!((params.damping_span - 257.0).abs() < 1e-12);
        assert_eq!(params.bearing_tolerance, 1);
        assert!((params.position_tolerance - 1e-6).abs() < 1e-18);
    }

    #[test]
    fn test_damping_schedule() {
        let params = FitParams::default();
        assert!((params.damping(0) - 1.0).abs() < 1e-12);
        assert!((params.damping(256) - 1.0 / 257.0).abs() < 1e-12);
        assert!(params.damping(255) > params.damping(256));
    }

    #[test]
    fn test_with_max_iterations() {
        let params = FitParams::default().with_max_iterations(100);
        assert_eq!(params.max_iterations, 100);
        assert!((params.damping_span - 101.0).abs() < 1e-12);
        assert!(params.damping(100) > 0.0);
    }

    #[test]
    fn test_builders() {
        let params = FitParams::default()
            .with_damping_span(500.0)
            .with_bearing_tolerance(4)
            .with_position_tolerance(1e-9);
        assert!((params.damping_span - 500.0).abs() < 1e-12);
        assert_eq!(params.bearing_tolerance, 4);
        assert!((params.position_tolerance - 1e-9).abs() < 1e-21);
    }

    #[test]
    fn test_coarse() {
        let params = FitParams::coarse();
        assert!(params.max_iterations < FitParams::default().max_iterations);
        assert!(params.position_tolerance > FitParams::default().position_tolerance);
    }
}
