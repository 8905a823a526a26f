//! Horizontal alignment curves for surveying and road design.
//!
//! This crate provides the curve primitives a surveyor strings together to
//! describe a road or boundary in plan, each carrying a cubic vertical
//! profile:
//!
//! - [`Segment`] - Straight line between two 3D points
//! - [`Arc`] - Circular arc, stored as chord plus total turn
//! - [`SpiralArc`] - Cornu spiral with a curvature offset, fitted to end bearings
//!
//! and the chains built from them:
//!
//! - [`Polyline`] - Straight edges
//! - [`Polyarc`] - Circular edges with per-edge delta
//! - [`Polyspiral`] - Spiral edges with smooth bearings through every vertex
//!
//! # Core Traits
//!
//! All curve types implement the [`Curve`] trait, which provides:
//!
//! - **Evaluation**: Station, bearing and curvature at a distance along
//! - **Profile**: Elevation, slope, vertical extrema and contour crossings
//! - **Splitting**: Two pieces meeting at a distance along
//! - **Flattening**: Cubic Bézier approximation to a given precision
//!
//! All chains implement the [`Chain`] trait.
//!
//! # Angles
//!
//! Bearings are [`BinaryAngle`]s: 2³¹ units per turn, counterclockwise from
//! east. Integer arithmetic wraps, so differences of bearings are exact
//! and never need normalizing.
//!
//! # Example
//!
//! ```
//! use alignment_curves::{Chain, Polyspiral};
//! use nalgebra::Point2;
//!
//! let mut road = Polyspiral::new(100.0);
//! for (x, y) in [(0.0, 0.0), (200.0, 40.0), (400.0, 0.0), (600.0, 60.0)] {
//!     road.push(Point2::new(x, y));
//! }
//! let result = road.smooth();
//! assert!(result.is_success());
//!
//! // Flatten for display.
//! let pieces = road.approx3d(0.01);
//! assert!(pieces.len() >= road.size());
//! ```
//!
//! # Coordinate System
//!
//! Points are (east, north) in plan and (east, north, elevation) in 3D.
//!
//! # Feature Flags
//!
//! - `serde`: Enable serialization/deserialization for all value types
//!
//! # Diagnostics
//!
//! Fit progress and failures are reported through [`tracing`]. No
//! subscriber is installed here.

#![doc(html_root_url = "https://docs.rs/alignment-curves/0.3.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::many_single_char_names,
    clippy::similar_names,
    clippy::cast_possible_truncation,
    clippy::too_many_lines,
    clippy::too_many_arguments,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::suboptimal_flops,
    clippy::missing_const_for_fn,
    clippy::cast_lossless,
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::option_if_let_else,
    clippy::items_after_statements,
    clippy::uninlined_format_args,
    clippy::manual_midpoint,
    clippy::cast_precision_loss,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::needless_range_loop,
    clippy::float_cmp,
    clippy::imprecise_flops,
    clippy::return_self_not_must_use
)]

mod angle;
mod arc;
mod bezier;
mod chain;
mod cornu;
mod error;
mod params;
mod polyline;
mod polyspiral;
mod profile;
mod segment;
mod spiral;
mod sum;
mod traits;

// Re-export core types
pub use angle::{BinaryAngle, area3, dir, mid_arc_dir, turn};
pub use arc::Arc;
pub use bezier::{CubicBezier, bezier_deviation_estimate};
pub use chain::Chain;
pub use cornu::{
    IterationHistogram, MAX_SERIES_DEGREE, NoopRecorder, SeriesRecorder, cornu, cornu_general,
    cornu_general_recorded, cornu_recorded, spiral_bearing, spiral_bearing_bin, spiral_curvature,
};
pub use error::AlignmentError;
pub use params::FitParams;
pub use polyline::{ArcEdge, LineEdge, Polyarc, Polyline};
pub use polyspiral::{Polyspiral, SmoothResult, SpiralEdge, SpiralVertex};
pub use profile::CubicProfile;
pub use segment::Segment;
pub use spiral::SpiralArc;
pub use sum::{ManySum, pairwise_sum};
pub use traits::{Approx3d, Curve, DEFAULT_MAX_DEPTH, EndSide};

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector2};

/// Result type for alignment operations.
pub type Result<T> = std::result::Result<T, AlignmentError>;

#[cfg(test)]
mod integration_tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Test that all curve types implement the Curve trait consistently.
    #[test]
    fn test_curve_trait_consistency() {
        let start = Point3::new(0.0, 0.0, 10.0);
        let end = Point3::new(100.0, 0.0, 20.0);

        let segment = Segment::new(start, end);
        verify_curve_basics(&segment);

        let arc = Arc::new(start, end, BinaryAngle::from_degrees(40.0));
        verify_curve_basics(&arc);

        let mut spiral = SpiralArc::new(start, end);
        let fitted = spiral.fit(
            BinaryAngle::from_degrees(30.0),
            BinaryAngle::from_degrees(10.0),
            &FitParams::default(),
        );
        assert!(fitted.is_ok());
        verify_curve_basics(&spiral);
    }

    fn verify_curve_basics<C: Curve + Clone>(curve: &C) {
        let length = curve.length();
        assert!(length >= curve.segment().chord_length() - 1e-9);

        // Ends land on the stored endpoints.
        let a = curve.station(0.0);
        let b = curve.station(length);
        assert_relative_eq!(a.coords, curve.start().coords, epsilon = 1e-5);
        assert_relative_eq!(b.coords, curve.end().coords, epsilon = 1e-5);

        // Bearings at the ends agree with the named accessors.
        let drift = (curve.bearing(length) - curve.end_bearing()).fold();
        assert!(drift.to_degrees().abs() < 1e-4);

        // The profile interpolates the end elevations.
        assert_relative_eq!(curve.elev(0.0), curve.start().z, epsilon = 1e-9);
        assert_relative_eq!(curve.elev(length), curve.end().z, epsilon = 1e-9);

        // Flattening starts and ends on the curve.
        let pieces: Vec<CubicBezier> = curve.approx3d(0.01).collect();
        assert!(!pieces.is_empty());
        let first = pieces.first().map_or_else(Point3::origin, |p| p.p0);
        let last = pieces.last().map_or_else(Point3::origin, |p| p.p3);
        assert_relative_eq!(first.coords, a.coords, epsilon = 1e-5);
        assert_relative_eq!(last.coords, b.coords, epsilon = 1e-5);
    }

    /// Test the three chain kinds agree on a straight-edged square.
    #[test]
    fn test_chains_agree_when_straight() {
        let mut line = Polyline::from_points(
            &[
                Point2::new(0.0, 0.0),
                Point2::new(50.0, 0.0),
                Point2::new(50.0, 50.0),
                Point2::new(0.0, 50.0),
            ],
            0.0,
        );
        line.close();
        let arcs = Polyarc::from(&line);
        let spirals = Polyspiral::from(&line);

        assert_relative_eq!(line.length(), arcs.length());
        assert_relative_eq!(line.length(), spirals.length());
        assert_relative_eq!(line.area(), 2500.0);
        assert_relative_eq!(arcs.area(), 2500.0);
        assert_relative_eq!(spirals.area(), 2500.0);
    }

    /// Test splitting a smoothed chain's edge.
    #[test]
    fn test_split_smoothed_edge() {
        let mut chain = Polyspiral::new(0.0);
        for (x, y) in [(0.0, 0.0), (100.0, 20.0), (200.0, 0.0)] {
            chain.push(Point2::new(x, y));
        }
        assert!(chain.smooth().is_success());

        let Some(spiral) = chain.curve(0) else {
            panic!("chain has edges");
        };
        let along = spiral.length() / 2.0;
        let (a, b) = spiral.split(along);
        assert_relative_eq!(a.length() + b.length(), spiral.length(), epsilon = 1e-9);
        assert_relative_eq!(a.station(a.length()).coords, b.station(0.0).coords, epsilon = 1e-6);
    }
}
