//! Straight segments.

use crate::angle::{BinaryAngle, dir};
use crate::profile::CubicProfile;
use crate::traits::Curve;
use nalgebra::{Point2, Point3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A straight line between two 3D points with a cubic vertical profile.
///
/// The profile is a cubic Bézier in `along / length()` with values
/// `start.z`, `control1`, `control2`, `end.z`. [`Arc`](crate::Arc) and
/// [`SpiralArc`](crate::SpiralArc) embed a `Segment` for their endpoints
/// and profile.
///
/// # Example
///
/// ```
/// use alignment_curves::{Curve, Segment};
/// use nalgebra::Point3;
///
/// let segment = Segment::new(Point3::new(0.0, 0.0, 10.0), Point3::new(3.0, 4.0, 20.0));
/// assert_eq!(segment.length(), 5.0);
///
/// let p = segment.station(2.5);
/// assert!((p.z - 15.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Segment {
    /// Start point.
    pub start: Point3<f64>,
    /// End point.
    pub end: Point3<f64>,
    /// Vertical control value near the start.
    pub control1: f64,
    /// Vertical control value near the end.
    pub control2: f64,
}

impl Default for Segment {
    fn default() -> Self {
        Self::new(Point3::origin(), Point3::origin())
    }
}

impl Segment {
    /// Create a segment with a uniform grade.
    #[must_use]
    pub fn new(start: Point3<f64>, end: Point3<f64>) -> Self {
        let profile = CubicProfile::linear(start.z, end.z);
        Self::with_profile(start, end, profile)
    }

    /// Create a segment with explicit control values.
    #[must_use]
    pub const fn with_controls(start: Point3<f64>, control1: f64, control2: f64, end: Point3<f64>) -> Self {
        Self {
            start,
            end,
            control1,
            control2,
        }
    }

    /// Create a segment whose elevations come from `profile`.
    ///
    /// The profile's end values replace the z coordinates of `start` and
    /// `end`.
    #[must_use]
    pub fn with_profile(start: Point3<f64>, end: Point3<f64>, profile: CubicProfile) -> Self {
        Self {
            start: Point3::new(start.x, start.y, profile.start),
            end: Point3::new(end.x, end.y, profile.end),
            control1: profile.control1,
            control2: profile.control2,
        }
    }

    /// The vertical profile.
    #[must_use]
    pub fn profile(&self) -> CubicProfile {
        CubicProfile::new(self.start.z, self.control1, self.control2, self.end.z)
    }

    /// Planar start point.
    #[must_use]
    pub fn start_xy(&self) -> Point2<f64> {
        self.start.xy()
    }

    /// Planar end point.
    #[must_use]
    pub fn end_xy(&self) -> Point2<f64> {
        self.end.xy()
    }

    /// Horizontal distance between the endpoints.
    #[must_use]
    pub fn chord_length(&self) -> f64 {
        (self.end_xy() - self.start_xy()).norm()
    }

    /// Bearing from start to end.
    #[must_use]
    pub fn chord_bearing(&self) -> BinaryAngle {
        dir(&self.start_xy(), &self.end_xy())
    }

    /// Horizontal point at `along` on the chord.
    pub(crate) fn chord_point(&self, along: f64) -> Point2<f64> {
        let length = self.chord_length();
        if length == 0.0 {
            return self.start_xy();
        }
        let p = along / length;
        self.start_xy() + (self.end_xy() - self.start_xy()) * p
    }

    /// Split the profile at `along` out of `length` and attach it to new
    /// endpoints. Shared by every curve kind.
    pub(crate) fn split_profile(
        &self,
        along: f64,
        length: f64,
        at: Point2<f64>,
    ) -> (Self, Self) {
        let p = if length == 0.0 { 0.0 } else { along / length };
        let (left, right) = self.profile().split(p);
        let mid = Point3::new(at.x, at.y, left.end);
        (
            Self::with_profile(self.start, mid, left),
            Self::with_profile(mid, self.end, right),
        )
    }
}

impl Curve for Segment {
    fn segment(&self) -> &Segment {
        self
    }

    fn segment_mut(&mut self) -> &mut Segment {
        self
    }

    fn length(&self) -> f64 {
        self.chord_length()
    }

    fn station(&self, along: f64) -> Point3<f64> {
        let p = self.chord_point(along);
        Point3::new(p.x, p.y, self.elev(along))
    }

    fn bearing(&self, _along: f64) -> BinaryAngle {
        self.chord_bearing()
    }

    fn curvature(&self, _along: f64) -> f64 {
        0.0
    }

    fn start_bearing(&self) -> BinaryAngle {
        self.chord_bearing()
    }

    fn end_bearing(&self) -> BinaryAngle {
        self.chord_bearing()
    }

    fn split(&self, along: f64) -> (Self, Self) {
        self.split_profile(along, self.chord_length(), self.chord_point(along))
    }
}
