//! Spiral arcs: Cornu spirals with a curvature offset.
//!
//! A [`SpiralArc`] is positioned by its midpoint, the bearing there, the
//! curvature there, the clothance (rate of change of curvature) and its
//! length. Its endpoints are the *target* the shape was fitted to: after a
//! successful [`SpiralArc::fit`] the curve starts and ends within a
//! micrometre of them.
//!
//! # Fitting
//!
//! Given the total turn `delta` (end bearing minus start bearing) and
//! `delta2` (sum of the end bearings relative to the chord), `fit` finds
//! curvature, clothance and length by damped fixed-point iteration:
//!
//! 1. Set curvature and clothance from the angles and the current length.
//! 2. Evaluate both ends, rotate the spiral about its midpoint so the
//!    achieved chord points along the target chord.
//! 3. Scale it so the achieved chord has the target length.
//! 4. Move the midpoint by the mean endpoint error.
//!
//! The loop stops when the mid bearing and midpoint stop moving.

use crate::angle::{BinaryAngle, dir, turn};
use crate::arc::Arc;
use crate::cornu::{cornu_general, spiral_bearing_bin, spiral_curvature};
use crate::error::AlignmentError;
use crate::params::FitParams;
use crate::segment::Segment;
use crate::traits::Curve;
use crate::Result;
use nalgebra::{Point2, Point3};
use tracing::{debug, trace};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 300°, the largest total turn `fit` accepts.
const MAX_DELTA: BinaryAngle = BinaryAngle::from_raw(0x6aaa_aaab);

/// 253°, the largest `delta2` `fit` accepts.
const MAX_DELTA2: BinaryAngle = BinaryAngle::from_raw(0x59f4_9f4a);

/// A Cornu spiral arc with a cubic vertical profile.
///
/// # Example
///
/// ```
/// use alignment_curves::{BinaryAngle, Curve, FitParams, SpiralArc};
/// use nalgebra::Point3;
///
/// let mut spiral = SpiralArc::new(Point3::new(0.0, 0.0, 0.0), Point3::new(100.0, 0.0, 0.0));
/// let delta = BinaryAngle::from_degrees(20.0);
/// let delta2 = BinaryAngle::from_degrees(10.0);
///
/// let iterations = spiral.fit(delta, delta2, &FitParams::default()).unwrap();
/// assert!(iterations > 1);
///
/// let end = spiral.station(spiral.length());
/// assert!((end.x - 100.0).abs() < 1e-6 && end.y.abs() < 1e-6);
/// assert!((spiral.delta() - delta).fold().unsigned_abs() < 1000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpiralArc {
    segment: Segment,
    mid: Point2<f64>,
    mid_bearing: BinaryAngle,
    cur: f64,
    clo: f64,
    len: f64,
}

impl Default for SpiralArc {
    fn default() -> Self {
        Self::new(Point3::origin(), Point3::origin())
    }
}

impl SpiralArc {
    /// A straight spiral from `start` to `end` with a uniform grade.
    ///
    /// This is the starting estimate for [`Self::fit`].
    #[must_use]
    pub fn new(start: Point3<f64>, end: Point3<f64>) -> Self {
        Self::from_segment(&Segment::new(start, end))
    }

    /// A straight spiral along a segment, keeping its profile.
    #[must_use]
    pub fn from_segment(segment: &Segment) -> Self {
        Self {
            segment: *segment,
            mid: nalgebra::center(&segment.start_xy(), &segment.end_xy()),
            mid_bearing: segment.chord_bearing(),
            cur: 0.0,
            clo: 0.0,
            len: segment.chord_length(),
        }
    }

    /// A spiral with zero clothance tracing an arc, keeping its profile.
    #[must_use]
    pub fn from_arc(arc: &Arc) -> Self {
        Self {
            segment: *arc.segment(),
            mid: arc.midpoint().xy(),
            mid_bearing: arc.chord_bearing(),
            cur: arc.curvature_value(),
            clo: 0.0,
            len: arc.length(),
        }
    }

    /// Assemble a spiral from already-known parts, without any checking.
    ///
    /// The profile has a uniform grade.
    #[must_use]
    pub fn from_parts(
        start: Point3<f64>,
        mid: Point2<f64>,
        end: Point3<f64>,
        mid_bearing: BinaryAngle,
        curvature: f64,
        clothance: f64,
        length: f64,
    ) -> Self {
        Self {
            segment: Segment::new(start, end),
            mid,
            mid_bearing,
            cur: curvature,
            clo: clothance,
            len: length,
        }
    }

    /// Horizontal position of the midpoint.
    #[must_use]
    pub const fn mid(&self) -> Point2<f64> {
        self.mid
    }

    /// Bearing at the midpoint.
    #[must_use]
    pub const fn mid_bearing(&self) -> BinaryAngle {
        self.mid_bearing
    }

    /// Curvature at the midpoint.
    #[must_use]
    pub const fn mid_curvature(&self) -> f64 {
        self.cur
    }

    /// Rate of change of curvature per unit length.
    #[must_use]
    pub const fn clothance(&self) -> f64 {
        self.clo
    }

    /// Radius at `along`; infinite where the spiral is straight.
    #[must_use]
    pub fn radius(&self, along: f64) -> f64 {
        1.0 / self.curvature(along)
    }

    /// Total turn, end bearing minus start bearing.
    #[must_use]
    pub fn delta(&self) -> BinaryAngle {
        BinaryAngle::from_radians(self.cur * self.len)
    }

    /// Sum of the end bearings relative to the chord.
    ///
    /// Zero for arcs and straight lines; nonzero values mean the spiral is
    /// tighter at one end than the other.
    #[must_use]
    pub fn delta2(&self) -> BinaryAngle {
        self.start_bearing() + self.end_bearing() - self.chord_bearing() * 2
    }

    /// Whether curvature, clothance and length are all finite.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.cur.is_finite() && self.clo.is_finite() && self.len.is_finite()
    }

    fn invalidate(&mut self) {
        self.cur = f64::NAN;
        self.clo = f64::NAN;
        self.len = f64::NAN;
    }

    fn station_xy(&self, along: f64) -> Point2<f64> {
        let rel = cornu_general(along - self.len / 2.0, self.cur, self.clo);
        self.mid + turn(&rel, self.mid_bearing)
    }

    fn fix_ends(&mut self, damping: f64) {
        let start = self.segment.start_xy();
        let end = self.segment.end_xy();

        let kra = self.station_xy(0.0);
        let fam = self.station_xy(self.len);
        // Never rotate more than half a turn either way.
        let turn_angle = (dir(&start, &end) - dir(&kra, &fam)).fold();
        let step = (f64::from(turn_angle.raw()) * damping).round();
        self.mid_bearing += BinaryAngle::from_raw(step as i32);

        let scale = (end - start).norm() / (fam - kra).norm();
        self.len *= scale;
        self.cur /= scale;
        self.clo /= scale * scale;

        let kra = self.station_xy(0.0);
        let fam = self.station_xy(self.len);
        self.mid += ((end - fam) + (start - kra)) / 2.0;
    }

    /// Fit curvature, clothance and length so the spiral turns by `delta`
    /// with end bearings summing to `delta2` relative to the chord, while
    /// running from the start to the end point.
    ///
    /// A valid spiral is used as the starting estimate; an invalid one is
    /// reset to the straight estimate first. Returns the number of
    /// iterations taken.
    ///
    /// # Errors
    ///
    /// - [`AlignmentError::AngleOutOfRange`] if `|delta| > 300°` or
    ///   `|delta2| > 253°`.
    /// - [`AlignmentError::Degenerate`] if start and end coincide.
    /// - [`AlignmentError::NoConvergence`] if the iteration does not settle
    ///   within `params.max_iterations` or leaves the finite range.
    ///
    /// On every error the spiral is left invalid.
    pub fn fit(
        &mut self,
        delta: BinaryAngle,
        delta2: BinaryAngle,
        params: &FitParams,
    ) -> Result<usize> {
        if delta.unsigned_abs() > MAX_DELTA.unsigned_abs() {
            self.invalidate();
            return Err(AlignmentError::AngleOutOfRange {
                name: "delta",
                degrees: delta.to_degrees(),
                limit: 300,
            });
        }
        if delta2.unsigned_abs() > MAX_DELTA2.unsigned_abs() {
            self.invalidate();
            return Err(AlignmentError::AngleOutOfRange {
                name: "delta2",
                degrees: delta2.to_degrees(),
                limit: 253,
            });
        }
        let chord_length = self.segment.chord_length();
        if chord_length == 0.0 {
            self.invalidate();
            return Err(AlignmentError::degenerate("spiral chord has zero length"));
        }

        let chord_bearing = self.segment.chord_bearing();
        if !self.is_valid() || !self.mid.coords.iter().all(|c| c.is_finite()) {
            let restart = Self::from_segment(&self.segment);
            self.mid = restart.mid;
            self.mid_bearing = restart.mid_bearing;
            self.cur = 0.0;
            self.clo = 0.0;
            self.len = chord_length;
        }

        let mut iterations = 0;
        loop {
            let rot = (chord_bearing - self.mid_bearing) * 2;
            let last_bearing = self.mid_bearing;
            let last_mid = self.mid;

            self.cur = delta.to_radians() / self.len;
            self.clo = 4.0 * (delta2 + rot).to_radians() / (self.len * self.len);
            self.fix_ends(params.damping(iterations));
            iterations += 1;

            trace!(
                iterations,
                mid_bearing = self.mid_bearing.raw(),
                cur = self.cur,
                clo = self.clo,
                len = self.len,
                "spiral fit step"
            );

            let settled = self.is_valid()
                && (self.mid_bearing - last_bearing).unsigned_abs() <= params.bearing_tolerance
                && (self.mid - last_mid).norm() <= params.position_tolerance;
            if settled {
                debug!(iterations, "spiral fit converged");
                return Ok(iterations);
            }

            if iterations >= params.max_iterations || !self.is_valid() {
                self.invalidate();
                debug!(iterations, "spiral fit failed to converge");
                return Err(AlignmentError::no_convergence(iterations));
            }
        }
    }
}

impl Curve for SpiralArc {
    fn segment(&self) -> &Segment {
        &self.segment
    }

    fn segment_mut(&mut self) -> &mut Segment {
        &mut self.segment
    }

    fn length(&self) -> f64 {
        self.len
    }

    fn station(&self, along: f64) -> Point3<f64> {
        let p = self.station_xy(along);
        Point3::new(p.x, p.y, self.elev(along))
    }

    fn bearing(&self, along: f64) -> BinaryAngle {
        self.mid_bearing + spiral_bearing_bin(along - self.len / 2.0, self.cur, self.clo)
    }

    fn curvature(&self, along: f64) -> f64 {
        spiral_curvature(along - self.len / 2.0, self.cur, self.clo)
    }

    fn start_bearing(&self) -> BinaryAngle {
        self.bearing(0.0)
    }

    fn end_bearing(&self) -> BinaryAngle {
        self.bearing(self.len)
    }

    fn split(&self, along: f64) -> (Self, Self) {
        let at = self.station_xy(along);
        let (seg_a, seg_b) = self.segment.split_profile(along, self.len, at);

        let mid_a = along / 2.0;
        let mid_b = (along + self.len) / 2.0;
        let a = Self {
            segment: seg_a,
            mid: self.station_xy(mid_a),
            mid_bearing: self.bearing(mid_a),
            cur: self.curvature(mid_a),
            clo: self.clo,
            len: along,
        };
        let b = Self {
            segment: seg_b,
            mid: self.station_xy(mid_b),
            mid_bearing: self.bearing(mid_b),
            cur: self.curvature(mid_b),
            clo: self.clo,
            len: self.len - along,
        };
        (a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn chord() -> SpiralArc {
        SpiralArc::new(Point3::new(0.0, 0.0, 0.0), Point3::new(100.0, 0.0, 0.0))
    }

    fn fitted() -> SpiralArc {
        let mut spiral = chord();
        let result = spiral.fit(
            BinaryAngle::from_radians(0.5),
            BinaryAngle::from_radians(0.3),
            &FitParams::default(),
        );
        assert!(result.is_ok(), "fit failed: {result:?}");
        spiral
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_straight_fit() {
        let mut spiral = chord();
        let iterations = spiral
            .fit(BinaryAngle::ZERO, BinaryAngle::ZERO, &FitParams::default())
            .unwrap();
        assert_eq!(iterations, 1);
        assert_relative_eq!(spiral.mid_curvature(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(spiral.clothance(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(spiral.length(), 100.0, epsilon = 1e-9);
        assert_eq!(spiral.delta2(), BinaryAngle::ZERO);
    }

    #[test]
    fn test_curved_fit_hits_targets() {
        let spiral = fitted();

        let start = spiral.station(0.0);
        let end = spiral.station(spiral.length());
        assert_relative_eq!(start.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(start.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(end.x, 100.0, epsilon = 1e-6);
        assert_relative_eq!(end.y, 0.0, epsilon = 1e-6);

        assert_relative_eq!(spiral.delta().to_radians(), 0.5, epsilon = 1e-6);
        assert_relative_eq!(spiral.delta2().fold().to_radians(), 0.3, epsilon = 1e-6);

        // End bearings relative to the chord are (s ∓ d) / 2.
        assert_relative_eq!(spiral.start_bearing().fold().to_radians(), -0.1, epsilon = 1e-6);
        assert_relative_eq!(spiral.end_bearing().fold().to_radians(), 0.4, epsilon = 1e-6);
        assert!(spiral.length() > 100.0);
    }

    #[test]
    fn test_curvature_is_linear() {
        let spiral = fitted();
        let len = spiral.length();
        let k0 = spiral.curvature(0.0);
        let k1 = spiral.curvature(len);
        assert_relative_eq!(spiral.curvature(len / 2.0), (k0 + k1) / 2.0, epsilon = 1e-12);
        assert_relative_eq!((k1 - k0) / len, spiral.clothance(), epsilon = 1e-12);
        assert_relative_eq!(spiral.radius(len / 2.0), 1.0 / spiral.mid_curvature());
    }

    #[test]
    fn test_angle_out_of_range() {
        let mut spiral = chord();
        let err = spiral
            .fit(BinaryAngle::from_degrees(310.0), BinaryAngle::ZERO, &FitParams::default())
            .unwrap_err();
        assert!(err.is_angle_out_of_range());
        assert!(!spiral.is_valid());

        let mut spiral = chord();
        let err = spiral
            .fit(BinaryAngle::ZERO, BinaryAngle::from_degrees(-260.0), &FitParams::default())
            .unwrap_err();
        assert!(matches!(err, AlignmentError::AngleOutOfRange { name: "delta2", .. }));
    }

    #[test]
    fn test_zero_chord_is_degenerate() {
        let p = Point3::new(5.0, 5.0, 0.0);
        let mut spiral = SpiralArc::new(p, p);
        let err = spiral
            .fit(BinaryAngle::DEG90, BinaryAngle::ZERO, &FitParams::default())
            .unwrap_err();
        assert!(err.is_degenerate());
        assert!(!spiral.is_valid());
        assert!(spiral.length().is_nan());
    }

    #[test]
    fn test_no_convergence_then_recover() {
        let mut spiral = chord();
        let delta = BinaryAngle::from_radians(0.5);
        let delta2 = BinaryAngle::from_radians(0.3);

        let params = FitParams::default().with_max_iterations(1);
        let err = spiral.fit(delta, delta2, &params).unwrap_err();
        assert_eq!(err, AlignmentError::no_convergence(1));
        assert!(!spiral.is_valid());
        assert!(spiral.mid_curvature().is_nan());

        // An invalid spiral restarts from the straight estimate.
        assert!(spiral.fit(delta, delta2, &FitParams::default()).is_ok());
        assert!(spiral.is_valid());
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_refit_from_valid_state() {
        let mut spiral = fitted();
        let iterations = spiral
            .fit(
                BinaryAngle::from_radians(0.5),
                BinaryAngle::from_radians(0.3),
                &FitParams::default(),
            )
            .unwrap();
        assert!(iterations < 10);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_arc_fit_matches_arc() {
        let arc = Arc::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(60.0, 80.0, 0.0),
            BinaryAngle::from_degrees(40.0),
        );
        let mut spiral = SpiralArc::new(arc.start(), arc.end());
        spiral
            .fit(arc.delta(), BinaryAngle::ZERO, &FitParams::default())
            .unwrap();

        assert_relative_eq!(spiral.clothance(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(spiral.mid_curvature(), arc.curvature_value(), epsilon = 1e-8);
        assert_relative_eq!(spiral.length(), arc.length(), epsilon = 1e-5);
    }

    #[test]
    fn test_from_arc() {
        let arc = Arc::new(
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(10.0, 50.0, 5.0),
            -BinaryAngle::from_degrees(70.0),
        );
        let spiral = SpiralArc::from_arc(&arc);
        assert!(spiral.is_valid());
        for i in 0..=4 {
            let along = arc.length() * f64::from(i) / 4.0;
            let a = arc.station(along);
            let s = spiral.station(along);
            assert_relative_eq!(a.coords, s.coords, epsilon = 1e-6);
        }
        assert!(spiral.delta2().fold().unsigned_abs() < 16);
    }

    #[test]
    fn test_spiral_split() {
        let spiral = fitted();
        let along = 37.0;
        let (a, b) = spiral.split(along);

        assert_relative_eq!(a.length() + b.length(), spiral.length(), epsilon = 1e-12);
        assert_relative_eq!(a.end().coords, b.start().coords);
        assert_relative_eq!(a.end().coords, spiral.station(along).coords, epsilon = 1e-12);
        assert_relative_eq!(a.clothance(), spiral.clothance());
        assert_relative_eq!(b.clothance(), spiral.clothance());

        // Each half traces the same curve.
        let pa = a.station(a.length());
        let pb = b.station(0.0);
        let ps = spiral.station(along);
        assert_relative_eq!(pa.xy().coords, ps.xy().coords, epsilon = 1e-6);
        assert_relative_eq!(pb.xy().coords, ps.xy().coords, epsilon = 1e-6);
        assert_relative_eq!(a.curvature(0.0), spiral.curvature(0.0), epsilon = 1e-12);
        assert_relative_eq!(b.curvature(b.length()), spiral.curvature(spiral.length()), epsilon = 1e-12);
    }

    #[test]
    fn test_from_parts() {
        let spiral = SpiralArc::from_parts(
            Point3::new(0.0, 0.0, 0.0),
            Point2::new(50.0, 0.0),
            Point3::new(100.0, 0.0, 10.0),
            BinaryAngle::ZERO,
            0.0,
            0.0,
            100.0,
        );
        assert!(spiral.is_valid());
        assert_relative_eq!(spiral.station(25.0).coords, Point3::new(25.0, 0.0, 2.5).coords, epsilon = 1e-9);
        assert_relative_eq!(spiral.segment().control1, 10.0 / 3.0, epsilon = 1e-12);
    }
}
