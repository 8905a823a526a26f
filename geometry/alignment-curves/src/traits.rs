//! Core curve traits.
//!
//! Every horizontal alignment element ([`Segment`], [`Arc`](crate::Arc),
//! [`SpiralArc`](crate::SpiralArc)) implements [`Curve`]. All of them are
//! parameterized by `along`, the horizontal arc length from the start, and
//! all carry a cubic vertical profile over `along / length()`.

use crate::angle::BinaryAngle;
use crate::bezier::{CubicBezier, bezier_deviation_estimate};
use crate::profile::CubicProfile;
use crate::segment::Segment;
use nalgebra::Point3;
use tracing::warn;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default subdivision depth limit of [`Approx3d`].
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Finest precision [`Approx3d`] works to, relative to the curve length.
const MIN_RELATIVE_PRECISION: f64 = 1e-12;

/// Step limit of [`Curve::contourcept`].
const CONTOURCEPT_MAX_STEPS: usize = 1100;

/// Which end of a curve a vertical control applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EndSide {
    /// The start of the curve (`control1`).
    Start,
    /// The end of the curve (`control2`).
    End,
}

/// A horizontal alignment element with a vertical profile.
///
/// # Implementors
///
/// - [`Segment`] - Straight line
/// - [`Arc`](crate::Arc) - Circular arc
/// - [`SpiralArc`](crate::SpiralArc) - Cornu spiral with curvature offset
pub trait Curve {
    /// The underlying endpoints and vertical controls.
    fn segment(&self) -> &Segment;

    /// Mutable access to the endpoints and vertical controls.
    fn segment_mut(&mut self) -> &mut Segment;

    /// Horizontal length along the curve.
    fn length(&self) -> f64;

    /// Position at `along`, with the profile elevation.
    ///
    /// Values outside `[0, length()]` extrapolate the curve's own geometry.
    fn station(&self, along: f64) -> Point3<f64>;

    /// Bearing at `along`.
    fn bearing(&self, along: f64) -> BinaryAngle;

    /// Signed curvature at `along` (positive turns left).
    fn curvature(&self, along: f64) -> f64;

    /// Bearing at the start.
    fn start_bearing(&self) -> BinaryAngle;

    /// Bearing at the end.
    fn end_bearing(&self) -> BinaryAngle;

    /// Split into the pieces `[0, along]` and `[along, length()]`.
    ///
    /// Both pieces are the same kind of curve, meet at `station(along)`,
    /// and their lengths add up to `length()`.
    fn split(&self, along: f64) -> (Self, Self)
    where
        Self: Sized;

    /// Bearing of the straight line from start to end.
    fn chord_bearing(&self) -> BinaryAngle {
        self.segment().chord_bearing()
    }

    /// Starting point.
    fn start(&self) -> Point3<f64> {
        self.segment().start
    }

    /// Ending point.
    fn end(&self) -> Point3<f64> {
        self.segment().end
    }

    /// The vertical profile.
    fn profile(&self) -> CubicProfile {
        self.segment().profile()
    }

    /// Elevation at `along`.
    fn elev(&self, along: f64) -> f64 {
        self.profile().elevation(fraction(along, self.length()))
    }

    /// Grade (rise over horizontal run) at `along`.
    fn slope(&self, along: f64) -> f64 {
        let length = self.length();
        if length == 0.0 {
            return 0.0;
        }
        self.profile().derivative(along / length) / length
    }

    /// Grade at the start.
    fn start_slope(&self) -> f64 {
        self.slope(0.0)
    }

    /// Grade at the end.
    fn end_slope(&self) -> f64 {
        self.slope(self.length())
    }

    /// Set the grade at one end by moving that end's control value.
    fn set_slope(&mut self, end: EndSide, slope: f64) {
        let third = self.length() / 3.0;
        let segment = self.segment_mut();
        match end {
            EndSide::Start => segment.control1 = segment.start.z + slope * third,
            EndSide::End => segment.control2 = segment.end.z - slope * third,
        }
    }

    /// Set one end's control value directly.
    fn set_ctrl(&mut self, end: EndSide, value: f64) {
        let segment = self.segment_mut();
        match end {
            EndSide::Start => segment.control1 = value,
            EndSide::End => segment.control2 = value,
        }
    }

    /// Point halfway along the curve.
    fn midpoint(&self) -> Point3<f64> {
        self.station(self.length() / 2.0)
    }

    /// Positions along the curve where the profile has a local extremum.
    ///
    /// With `with_ends`, the two ends are included as well.
    fn vertical_extrema(&self, with_ends: bool) -> Vec<f64> {
        let length = self.length();
        let mut result = Vec::new();
        if with_ends {
            result.push(0.0);
        }
        result.extend(self.profile().extrema().into_iter().map(|p| p * length));
        if with_ends {
            result.push(length);
        }
        result
    }

    /// Find `along` in `[0, length()]` where the elevation equals `target`.
    ///
    /// Combines bisection with false position. When both ends lie on the
    /// same side of `target`, the search first brackets against the
    /// profile's extrema: a target equal to an extremum returns that
    /// extremum, a crest or sag that crosses the target yields the first
    /// crossing, and a target the profile never reaches yields the end or
    /// extremum closest to it.
    fn contourcept(&self, target: f64) -> f64 {
        let mut beg = 0.0_f64;
        let mut lst = self.length();
        let mut beg_dev = self.elev(beg) - target;
        let mut lst_dev = self.elev(lst) - target;

        if beg_dev * lst_dev > 0.0 {
            let mut closest = if beg_dev.abs() <= lst_dev.abs() {
                (beg, beg_dev)
            } else {
                (lst, lst_dev)
            };
            let mut crossing = None;
            for along in self.vertical_extrema(false) {
                let dev = self.elev(along) - target;
                if dev == 0.0 {
                    return along;
                }
                if dev.signum() != beg_dev.signum() {
                    crossing = Some((along, dev));
                    break;
                }
                if dev.abs() < closest.1.abs() {
                    closest = (along, dev);
                }
            }
            match crossing {
                Some((along, dev)) => {
                    lst = along;
                    lst_dev = dev;
                }
                None => return closest.0,
            }
        }

        for _ in 0..CONTOURCEPT_MAX_STEPS {
            let width = lst - beg;
            let magnitude = beg.abs() + lst.abs();
            if width <= 5.0 * f64::EPSILON * magnitude {
                break;
            }

            let opposite = (beg_dev < 0.0 && lst_dev > 0.0) || (beg_dev > 0.0 && lst_dev < 0.0);
            let comparable = beg_dev.abs() <= 10.0 * lst_dev.abs()
                && lst_dev.abs() <= 10.0 * beg_dev.abs();
            let mdp = if opposite && comparable && width > 30.0 * f64::EPSILON * magnitude {
                beg + width * beg_dev / (beg_dev - lst_dev)
            } else {
                beg + width / 2.0
            };

            let mdp_dev = self.elev(mdp) - target;
            if mdp_dev == 0.0 {
                return mdp;
            }
            let mut crit = mdp_dev / (lst_dev - beg_dev);
            if crit.is_nan() {
                crit = 0.0;
            }
            if crit >= 0.0 {
                lst = mdp;
                lst_dev = mdp_dev;
            }
            if crit <= 0.0 {
                beg = mdp;
                beg_dev = mdp_dev;
            }
        }

        if beg_dev.abs() <= lst_dev.abs() { beg } else { lst }
    }

    /// Flatten into cubic Béziers that stay within `precision` of the curve.
    fn approx3d(&self, precision: f64) -> Approx3d<Self>
    where
        Self: Sized + Clone,
    {
        Approx3d::new(self.clone(), precision)
    }
}

/// `along / length`, with zero-length curves evaluated at their start.
fn fraction(along: f64, length: f64) -> f64 {
    if length == 0.0 { 0.0 } else { along / length }
}

/// Lazy subdivision of a curve into cubic Béziers.
///
/// Produced by [`Curve::approx3d`]. Pieces come out in order from the start
/// of the curve. A piece is emitted once it is nearly straight (both end
/// bearings and their sum within 30° of the chord) and its estimated
/// deviation is within the precision; otherwise it is split in half.
///
/// The precision is raised to at least `1e-12` times the curve length, so
/// zero, negative or NaN precision still ends after a bounded number of
/// pieces.
#[derive(Debug, Clone)]
pub struct Approx3d<C> {
    stack: Vec<(C, usize)>,
    precision: f64,
    max_depth: usize,
    capped: bool,
}

impl<C: Curve + Clone> Approx3d<C> {
    /// Start flattening `curve`.
    #[must_use]
    pub fn new(curve: C, precision: f64) -> Self {
        let floor = curve.length().abs() * MIN_RELATIVE_PRECISION;
        // NaN fails the comparison and takes the floor too.
        let precision = if precision >= floor { precision } else { floor };
        Self {
            stack: vec![(curve, 0)],
            precision,
            max_depth: DEFAULT_MAX_DEPTH,
            capped: false,
        }
    }

    /// Precision in effect after raising it to the floor.
    #[must_use]
    pub fn precision(&self) -> f64 {
        self.precision
    }

    /// Set the subdivision depth limit.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn needs_split(&self, curve: &C) -> bool {
        let length = curve.length();
        if length == 0.0 {
            return false;
        }
        let chord = curve.chord_bearing();
        let alpha = (curve.start_bearing() - chord).fold();
        let beta = (curve.end_bearing() - chord).fold();
        let skew = (alpha + beta).fold();

        let nearly_straight = [alpha, beta, skew]
            .iter()
            .all(|a| a.unsigned_abs() < BinaryAngle::DEG30.unsigned_abs());
        !nearly_straight || bezier_deviation_estimate(length, alpha, beta) > self.precision
    }
}

impl<C: Curve + Clone> Iterator for Approx3d<C> {
    type Item = CubicBezier;

    fn next(&mut self) -> Option<CubicBezier> {
        while let Some((curve, depth)) = self.stack.pop() {
            let length = curve.length();
            if !length.is_finite() {
                warn!("skipping curve with non-finite length in approx3d");
                continue;
            }

            if self.needs_split(&curve) {
                if depth < self.max_depth {
                    let (a, b) = curve.split(length / 2.0);
                    self.stack.push((b, depth + 1));
                    self.stack.push((a, depth + 1));
                    continue;
                }
                if !self.capped {
                    self.capped = true;
                    warn!(depth, length, "approx3d reached its subdivision limit");
                }
            }

            let segment = curve.segment();
            return Some(CubicBezier::from_bearings(
                segment.start,
                curve.start_bearing(),
                segment.end,
                curve.end_bearing(),
                length,
                segment.control1,
                segment.control2,
            ));
        }
        None
    }
}
