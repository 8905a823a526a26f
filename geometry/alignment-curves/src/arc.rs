//! Circular arcs.
//!
//! An arc is stored as its chord (a [`Segment`]) plus `delta`, the total
//! change of bearing from start to end. Positive delta turns left. Center,
//! radius and length are derived, so an arc with zero delta is exactly its
//! chord and no special straight-line case leaks into callers.

use crate::angle::{BinaryAngle, turn};
use crate::segment::Segment;
use crate::traits::Curve;
use nalgebra::{Point2, Point3, Vector2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Below this turn (radians), closed forms lose precision and series are used.
const SMALL_DELTA: f64 = 1e-4;

/// A circular arc between two 3D points with a cubic vertical profile.
///
/// # Example
///
/// ```
/// use alignment_curves::{Arc, BinaryAngle, Curve};
/// use nalgebra::Point3;
///
/// // Half circle of radius 50, bulging to the right of its chord.
/// let arc = Arc::new(
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(100.0, 0.0, 0.0),
///     BinaryAngle::DEG180,
/// );
///
/// assert!((arc.length() - 50.0 * std::f64::consts::PI).abs() < 1e-9);
/// let mid = arc.midpoint();
/// assert!((mid.y + 50.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Arc {
    segment: Segment,
    delta: BinaryAngle,
}

impl Arc {
    /// Create an arc from its endpoints and total turn, with a uniform grade.
    #[must_use]
    pub fn new(start: Point3<f64>, end: Point3<f64>, delta: BinaryAngle) -> Self {
        Self::from_segment(Segment::new(start, end), delta)
    }

    /// Bend a segment into an arc, keeping its endpoints and profile.
    #[must_use]
    pub const fn from_segment(segment: Segment, delta: BinaryAngle) -> Self {
        Self { segment, delta }
    }

    /// Total turn from start to end.
    #[must_use]
    pub const fn delta(&self) -> BinaryAngle {
        self.delta
    }

    /// Change the total turn, keeping the endpoints.
    pub fn set_delta(&mut self, delta: BinaryAngle) {
        self.delta = delta;
    }

    fn half_delta(&self) -> f64 {
        self.delta.to_radians() / 2.0
    }

    /// Signed curvature (constant along the arc).
    #[must_use]
    pub fn curvature_value(&self) -> f64 {
        let chord = self.segment.chord_length();
        if chord == 0.0 {
            return 0.0;
        }
        2.0 * self.half_delta().sin() / chord
    }

    /// Radius, infinite for a straight arc. Negative when turning right.
    #[must_use]
    pub fn radius(&self) -> f64 {
        1.0 / self.curvature_value()
    }

    /// Center of the circle, or `None` when the arc is straight.
    #[must_use]
    pub fn center(&self) -> Option<Point2<f64>> {
        let k = self.curvature_value();
        if k == 0.0 {
            return None;
        }
        let offset = turn(&Vector2::new(0.0, 1.0 / k), self.start_bearing());
        Some(self.segment.start_xy() + offset)
    }

    /// Area between the arc and its chord.
    ///
    /// Positive when delta is positive, which puts the arc to the right of
    /// the chord; a counterclockwise closed chain of such arcs encloses
    /// more than its polygon.
    #[must_use]
    pub fn diffarea(&self) -> f64 {
        let chord = self.segment.chord_length();
        let d = self.delta.to_radians();
        if d.abs() < SMALL_DELTA {
            return chord * chord * d / 12.0;
        }
        let s = (d / 2.0).sin();
        chord * chord * (d - d.sin()) / (8.0 * s * s)
    }

    /// Horizontal offset from the start at `along`, in the frame where the
    /// start bearing is east.
    fn local_offset(&self, along: f64) -> Vector2<f64> {
        let k = self.curvature_value();
        let phi = along * k;
        if phi.abs() < SMALL_DELTA {
            // sin φ/κ and (1 − cos φ)/κ to third order.
            let x = along * (1.0 - phi * phi / 6.0);
            let y = along * phi / 2.0 * (1.0 - phi * phi / 12.0);
            Vector2::new(x, y)
        } else {
            let half = (phi / 2.0).sin();
            Vector2::new(phi.sin() / k, 2.0 * half * half / k)
        }
    }
}

impl Curve for Arc {
    fn segment(&self) -> &Segment {
        &self.segment
    }

    fn segment_mut(&mut self) -> &mut Segment {
        &mut self.segment
    }

    fn length(&self) -> f64 {
        let chord = self.segment.chord_length();
        let half = self.half_delta();
        if half.abs() < SMALL_DELTA {
            chord * (1.0 + half * half / 6.0)
        } else {
            chord * half / half.sin()
        }
    }

    fn station(&self, along: f64) -> Point3<f64> {
        let p = self.segment.start_xy() + turn(&self.local_offset(along), self.start_bearing());
        Point3::new(p.x, p.y, self.elev(along))
    }

    fn bearing(&self, along: f64) -> BinaryAngle {
        self.start_bearing() + BinaryAngle::from_radians(along * self.curvature_value())
    }

    fn curvature(&self, _along: f64) -> f64 {
        self.curvature_value()
    }

    fn start_bearing(&self) -> BinaryAngle {
        self.segment.chord_bearing() - self.delta / 2
    }

    fn end_bearing(&self) -> BinaryAngle {
        self.segment.chord_bearing() + self.delta / 2
    }

    fn split(&self, along: f64) -> (Self, Self) {
        let delta_a = BinaryAngle::from_radians(along * self.curvature_value());
        let delta_b = self.delta - delta_a;
        let at = self.station(along).xy();
        let (a, b) = self.segment.split_profile(along, self.length(), at);
        (Self::from_segment(a, delta_a), Self::from_segment(b, delta_b))
    }
}
