//! Polyspirals: chains of spiral arcs with smooth bearings.
//!
//! Each vertex carries a bearing. Each edge is the spiral arc that leaves
//! its start vertex on that vertex's bearing and arrives at its end vertex
//! on that vertex's bearing, so the chain has no kinks. [`Polyspiral::smooth`]
//! picks the bearings from the vertex positions and refits every edge.
//!
//! Bearings are not reduced modulo a turn. Around a closed counterclockwise
//! chain they climb by a full turn, and the closing edge adds 360° back.

use crate::angle::{BinaryAngle, dir, mid_arc_dir};
use crate::arc::Arc;
use crate::chain::{Chain, ChainStore, Vertex};
use crate::error::AlignmentError;
use crate::params::FitParams;
use crate::polyline::Polyline;
use crate::spiral::SpiralArc;
use crate::sum::ManySum;
use crate::traits::Curve;
use crate::Result;
use nalgebra::Point2;
use tracing::{debug, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A polyspiral vertex: position and bearing.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpiralVertex {
    /// Horizontal position.
    pub point: Point2<f64>,
    /// Bearing of the chain through this vertex.
    pub bearing: BinaryAngle,
}

impl Vertex for SpiralVertex {
    fn position(&self) -> Point2<f64> {
        self.point
    }
}

/// Per-edge data of a [`Polyspiral`]: the fitted spiral's shape.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpiralEdge {
    /// Length along the spiral. NaN if the fit failed.
    pub length: f64,
    /// Total turn.
    pub delta: BinaryAngle,
    /// Sum of the end bearings relative to the chord.
    pub delta2: BinaryAngle,
    /// Bearing at the midpoint.
    pub mid_bearing: BinaryAngle,
    /// Horizontal position of the midpoint.
    pub midpoint: Point2<f64>,
    /// Curvature at the midpoint.
    pub curvature: f64,
    /// Rate of change of curvature.
    pub clothance: f64,
    /// Outcome of the last fit, `None` if the edge was never fitted.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub fit: Option<Result<usize>>,
}

impl Default for SpiralEdge {
    fn default() -> Self {
        Self {
            length: 0.0,
            delta: BinaryAngle::ZERO,
            delta2: BinaryAngle::ZERO,
            mid_bearing: BinaryAngle::ZERO,
            midpoint: Point2::origin(),
            curvature: 0.0,
            clothance: 0.0,
            fit: None,
        }
    }
}

impl SpiralEdge {
    /// The straight estimate between two points.
    fn straight(a: &Point2<f64>, b: &Point2<f64>, bearing: BinaryAngle) -> Self {
        Self {
            length: (b - a).norm(),
            mid_bearing: bearing,
            midpoint: nalgebra::center(a, b),
            ..Self::default()
        }
    }
}

/// Outcome of [`Polyspiral::smooth`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SmoothResult {
    /// Number of edges refitted.
    pub edges: usize,
    /// Number of edges whose fit converged.
    pub converged: usize,
    /// Edges whose fit failed, with the reason.
    pub failures: Vec<(usize, AlignmentError)>,
    /// Fit iterations summed over converged edges.
    pub total_iterations: usize,
}

impl SmoothResult {
    /// Whether every edge was fitted.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Mean iterations per converged edge.
    #[must_use]
    pub fn mean_iterations(&self) -> f64 {
        if self.converged == 0 {
            0.0
        } else {
            self.total_iterations as f64 / self.converged as f64
        }
    }
}

impl std::fmt::Display for SmoothResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Smoothing: {}/{} spirals fitted ({:.1} iterations each, {} failed)",
            self.converged,
            self.edges,
            self.mean_iterations(),
            self.failures.len()
        )
    }
}

/// A chain of spiral arcs meeting with matching bearings.
///
/// # Example
///
/// ```
/// use alignment_curves::{Chain, Polyspiral};
/// use nalgebra::Point2;
///
/// let mut square = Polyspiral::new(0.0);
/// for (x, y) in [(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)] {
///     square.push(Point2::new(x, y));
/// }
/// square.close();
///
/// let result = square.smooth();
/// assert!(result.is_success());
///
/// // Four quarter circles through the corners.
/// let r = 100.0 / 2f64.sqrt();
/// assert!((square.length() - 2.0 * std::f64::consts::PI * r).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Polyspiral {
    store: ChainStore<SpiralVertex, SpiralEdge>,
    elevation: f64,
    fit_params: FitParams,
}

impl Polyspiral {
    /// Create an empty polyspiral at the given elevation.
    #[must_use]
    pub fn new(elevation: f64) -> Self {
        Self {
            store: ChainStore::default(),
            elevation,
            fit_params: FitParams::default(),
        }
    }

    /// Use `params` for every later fit.
    #[must_use]
    pub fn with_fit_params(mut self, params: FitParams) -> Self {
        self.fit_params = params;
        self
    }

    /// Parameters used for fitting edges.
    #[must_use]
    pub fn fit_params(&self) -> &FitParams {
        &self.fit_params
    }

    /// Bearing at vertex `i`.
    #[must_use]
    pub fn bearing(&self, i: usize) -> Option<BinaryAngle> {
        self.store.vertices().get(i).map(|v| v.bearing)
    }

    /// All vertices.
    #[must_use]
    pub fn vertices(&self) -> &[SpiralVertex] {
        self.store.vertices()
    }

    /// Per-edge records.
    #[must_use]
    pub fn edges(&self) -> &[SpiralEdge] {
        self.store.edges()
    }

    /// Edge `i` as a spiral arc. Indices wrap.
    #[must_use]
    pub fn spiral(&self, i: isize) -> Option<SpiralArc> {
        let i = self.store.wrap_edge(i)?;
        let (start, end) = self.store.edge_points3(i, self.elevation);
        let edge = &self.store.edges()[i];
        Some(SpiralArc::from_parts(
            start,
            edge.midpoint,
            end,
            edge.mid_bearing,
            edge.curvature,
            edge.clothance,
            edge.length,
        ))
    }

    /// Set the bearing at vertex `i` (wrapping) from the circle through it
    /// and its neighbours, folded toward the neighbours' mean bearing.
    ///
    /// The ends of an open chain use the circle through the first or last
    /// three vertices. With two vertices an open chain points both along
    /// the chord; a closed one sets up a circle of two half turns.
    pub fn set_bear(&mut self, i: isize) {
        let n = self.store.vertex_count();
        if n < 2 {
            return;
        }
        let i = i.rem_euclid(n as isize) as usize;
        let open = self.store.is_open();
        let vertices = self.store.vertices();
        let p = |k: usize| vertices[k].point;

        let bearing = if n == 2 {
            if open {
                dir(&p(0), &p(1))
            } else {
                dir(&p(i), &p(1 - i)) - BinaryAngle::DEG90
            }
        } else {
            let h = match (i, open) {
                (0, true) => 2,
                (0, false) => n - 1,
                _ => i - 1,
            };
            let j = match (i + 1 == n, open) {
                (true, true) => n - 3,
                (true, false) => 0,
                _ => i + 1,
            };
            let circle = mid_arc_dir(&p(h), &p(i), &p(j));
            let mut prev = vertices[h].bearing;
            let mut next = vertices[j].bearing;
            if i == 0 {
                if open {
                    prev = next;
                } else {
                    prev += BinaryAngle::DEG360;
                }
            }
            if i == n - 1 {
                if open {
                    next = prev;
                } else {
                    next += BinaryAngle::DEG360;
                }
            }
            let mean = prev + (next - prev) / 2;
            mean + (circle - mean).fold()
        };
        self.store.vertices_mut()[i].bearing = bearing;
    }

    /// Refit edge `i` (wrapping) to the bearings at its ends.
    ///
    /// The outcome is stored in the edge record as well as returned. On
    /// failure the record's length, curvature and clothance are NaN and its
    /// angles are the requested ones.
    ///
    /// # Errors
    ///
    /// Any error of [`SpiralArc::fit`]. A zero-length edge is
    /// [`AlignmentError::Degenerate`]. A chain with no edges is also
    /// degenerate.
    pub fn set_spiral(&mut self, i: isize) -> Result<usize> {
        let Some(i) = self.store.wrap_edge(i) else {
            return Err(AlignmentError::degenerate("chain has no edges"));
        };
        let (a, b) = self.store.edge_ends(i);
        let from = self.store.vertices()[a];
        let to = self.store.vertices()[b];
        let wrap = if b < a {
            BinaryAngle::DEG360
        } else {
            BinaryAngle::ZERO
        };
        let delta = to.bearing - from.bearing + wrap;
        let delta2 = to.bearing + from.bearing + wrap - dir(&from.point, &to.point) * 2;

        let (start, end) = self.store.edge_points3(i, self.elevation);
        let mut spiral = SpiralArc::new(start, end);
        let fit = spiral.fit(delta, delta2, &self.fit_params);

        let (delta, delta2) = match &fit {
            Ok(_) => (spiral.delta(), spiral.delta2()),
            Err(err) => {
                warn!(edge = i, error = %err, "spiral fit failed");
                (delta, delta2)
            }
        };
        if let Some(edge) = self.store.edge_mut(i) {
            *edge = SpiralEdge {
                length: spiral.length(),
                delta,
                delta2,
                mid_bearing: spiral.mid_bearing(),
                midpoint: spiral.mid(),
                curvature: spiral.mid_curvature(),
                clothance: spiral.clothance(),
                fit: Some(fit.clone()),
            };
        }
        fit
    }

    /// Set every vertex bearing, then refit every edge.
    ///
    /// Running it again without moving any vertex changes nothing.
    pub fn smooth(&mut self) -> SmoothResult {
        for i in 0..self.store.vertex_count() {
            self.set_bear(i as isize);
        }
        let mut result = SmoothResult {
            edges: self.store.edge_count(),
            ..SmoothResult::default()
        };
        for i in 0..result.edges {
            match self.set_spiral(i as isize) {
                Ok(iterations) => {
                    result.converged += 1;
                    result.total_iterations += iterations;
                }
                Err(err) => result.failures.push((i, err)),
            }
        }
        debug!(
            edges = result.edges,
            converged = result.converged,
            iterations = result.total_iterations,
            "polyspiral smoothed"
        );
        result
    }

    /// Bearing for a new vertex at `pos`, aimed at its next neighbour if
    /// it has one and from its previous one otherwise, kept near that
    /// neighbour's bearing.
    fn initial_bearing(&self, pos: usize) -> BinaryAngle {
        let n = self.store.vertex_count();
        let vertices = self.store.vertices();
        let point = vertices[pos].point;
        let (next, prev) = if self.store.is_open() {
            ((pos + 1 < n).then_some(pos + 1), pos.checked_sub(1))
        } else if n > 1 {
            (Some((pos + 1) % n), Some((pos + n - 1) % n))
        } else {
            (None, None)
        };
        let (neighbour, raw) = match (next, prev) {
            (Some(j), _) => (vertices[j], dir(&point, &vertices[j].point)),
            (None, Some(h)) => (vertices[h], dir(&vertices[h].point, &point)),
            (None, None) => return BinaryAngle::ZERO,
        };
        neighbour.bearing + (raw - neighbour.bearing).fold()
    }

    /// Refit edges whose result is ignored beyond what the record keeps.
    fn refit(&mut self, edges: impl IntoIterator<Item = usize>) {
        for i in edges {
            // Failures are stored on the edge and logged.
            let _ = self.set_spiral(i as isize);
        }
    }
}

impl Chain for Polyspiral {
    type Edge = SpiralArc;

    fn is_open(&self) -> bool {
        self.store.is_open()
    }

    fn size(&self) -> usize {
        self.store.edge_count()
    }

    fn vertex_count(&self) -> usize {
        self.store.vertex_count()
    }

    fn vertex(&self, i: usize) -> Option<Point2<f64>> {
        self.store.position(i)
    }

    fn elevation(&self) -> f64 {
        self.elevation
    }

    fn set_elevation(&mut self, elevation: f64) {
        self.elevation = elevation;
    }

    fn insert(&mut self, point: Point2<f64>, pos: usize) {
        let vertex = SpiralVertex {
            point,
            bearing: BinaryAngle::ZERO,
        };
        let pos = self.store.insert(vertex, pos).pos;
        let bearing = self.initial_bearing(pos);
        self.store.vertices_mut()[pos].bearing = bearing;

        let n = self.store.vertex_count();
        let m = self.store.edge_count();
        match n {
            0 | 1 => {}
            2 => {
                self.set_bear(0);
                self.set_bear(1);
                self.refit(0..m);
            }
            _ => {
                let open = self.store.is_open();
                self.set_bear(pos as isize);
                if !open || pos > 0 {
                    self.set_bear(pos as isize - 1);
                }
                if !open || pos + 1 < n {
                    self.set_bear(pos as isize + 1);
                }

                let mut edges: Vec<usize> = Vec::with_capacity(4);
                for k in pos as isize - 2..=pos as isize + 1 {
                    let edge = if open {
                        if k < 0 || k >= m as isize {
                            continue;
                        }
                        k as usize
                    } else {
                        k.rem_euclid(m as isize) as usize
                    };
                    if !edges.contains(&edge) {
                        edges.push(edge);
                    }
                }
                self.refit(edges);
            }
        }
    }

    fn open(&mut self) {
        self.store.open();
    }

    fn close(&mut self) {
        if let Some(i) = self.store.close() {
            let (a, b) = self.store.edge_points(i);
            let straight = SpiralEdge::straight(&a, &b, dir(&a, &b));
            if let Some(edge) = self.store.edge_mut(i) {
                *edge = straight;
            }
        }
    }

    fn length(&self) -> f64 {
        self.store.edges().iter().map(|e| e.length).sum()
    }

    fn area(&self) -> f64 {
        if self.is_open() {
            return f64::NAN;
        }
        let mut sum = ManySum::new();
        self.store.polygon_area(&mut sum);
        for (i, edge) in self.store.edges().iter().enumerate() {
            let (start, end) = self.store.edge_points3(i, self.elevation);
            sum.push(Arc::new(start, end, edge.delta).diffarea());
        }
        sum.total()
    }

    fn curve(&self, i: isize) -> Option<SpiralArc> {
        self.spiral(i)
    }
}

impl From<&Polyline> for Polyspiral {
    /// Straight spirals along every edge. Bearings follow the chords,
    /// unwrapped so consecutive chords differ by less than half a turn.
    fn from(line: &Polyline) -> Self {
        let points = line.points();
        let mut store = ChainStore::default();
        for &point in points {
            store.insert(
                SpiralVertex {
                    point,
                    bearing: BinaryAngle::ZERO,
                },
                usize::MAX,
            );
        }
        if !line.is_open() {
            store.close();
        }

        let mut previous: Option<BinaryAngle> = None;
        for i in 0..store.edge_count() {
            let (a, b) = store.edge_points(i);
            let raw = dir(&a, &b);
            let bearing = previous.map_or(raw, |p| p + (raw - p).fold());
            previous = Some(bearing);
            if let Some(edge) = store.edge_mut(i) {
                *edge = SpiralEdge::straight(&a, &b, bearing);
            }
            store.vertices_mut()[i].bearing = bearing;
        }
        if store.is_open() {
            if let (Some(bearing), Some(last)) = (previous, store.vertices_mut().last_mut()) {
                last.bearing = bearing;
            }
        }

        Self {
            store,
            elevation: line.elevation(),
            fit_params: FitParams::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn build(points: &[(f64, f64)], closed: bool) -> Polyspiral {
        let mut chain = Polyspiral::new(0.0);
        for &(x, y) in points {
            chain.push(Point2::new(x, y));
        }
        if closed {
            chain.close();
        }
        chain
    }

    fn square() -> Polyspiral {
        build(
            &[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)],
            true,
        )
    }

    #[test]
    fn test_square_smooths_to_circle() {
        let mut chain = square();
        let result = chain.smooth();
        assert!(result.is_success(), "{result}");
        assert_eq!(result.edges, 4);

        let expected = [-45.0, 45.0, 135.0, 225.0];
        for (v, deg) in chain.vertices().iter().zip(expected) {
            assert_relative_eq!(v.bearing.to_degrees(), deg, epsilon = 1e-6);
        }
        for edge in chain.edges() {
            assert_relative_eq!(edge.curvature, 0.014_142_1, epsilon = 1e-7);
            assert_relative_eq!(edge.length, 111.072, epsilon = 1e-3);
            assert!(edge.clothance.abs() < 1e-9);
            assert_relative_eq!(edge.delta.to_degrees(), 90.0, epsilon = 1e-4);
        }
        let r = 100.0 / 2f64.sqrt();
        assert_relative_eq!(chain.area(), PI * r * r, max_relative = 1e-6);
    }

    #[test]
    fn test_two_vertex_circle() {
        let mut chain = build(&[(0.0, 0.0), (100.0, 0.0)], true);
        assert!(!chain.is_open());
        assert_eq!(chain.size(), 2);

        assert!(chain.smooth().is_success());
        assert_relative_eq!(chain.bearing(0).unwrap_or_default().to_degrees(), -90.0);
        assert_relative_eq!(chain.bearing(1).unwrap_or_default().to_degrees(), 90.0);
        for edge in chain.edges() {
            assert_relative_eq!(edge.delta.to_degrees(), 180.0, epsilon = 1e-4);
            assert_relative_eq!(edge.length, 50.0 * PI, epsilon = 1e-4);
        }
        assert_relative_eq!(chain.area(), 2500.0 * PI, max_relative = 1e-6);
    }

    #[test]
    fn test_smooth_idempotent() {
        let mut chain = square();
        chain.smooth();
        let once = chain.clone();
        chain.smooth();
        assert_eq!(chain, once);
    }

    #[test]
    fn test_open_zigzag_is_smooth() {
        let mut chain = build(
            &[(0.0, 0.0), (100.0, 50.0), (200.0, 0.0), (300.0, 50.0)],
            false,
        );
        let result = chain.smooth();
        assert!(result.is_success(), "{result}");
        assert_eq!(result.edges, 3);

        for i in 0..2 {
            let a = chain.spiral(i).unwrap_or_default();
            let b = chain.spiral(i + 1).unwrap_or_default();
            let kink = (a.end_bearing() - b.start_bearing()).fold();
            assert!(kink.to_degrees().abs() < 1e-4, "kink {kink} at vertex {}", i + 1);
            assert_relative_eq!(a.end().coords, b.start().coords, epsilon = 1e-5);
        }
        // The middle edge is an S-bend: no net turn, opposite end bearings.
        let middle = &chain.edges()[1];
        assert!(middle.delta.to_degrees().abs() < 1e-4);
        assert!(middle.delta2.to_degrees() > 10.0);
    }

    #[test]
    fn test_spiral_ends_hit_vertices() {
        let mut chain = square();
        chain.smooth();
        for i in 0..4 {
            let spiral = chain.spiral(i).unwrap_or_default();
            let start = spiral.station(0.0);
            let end = spiral.station(spiral.length());
            let p = chain.vertex(i as usize).unwrap_or_else(Point2::origin);
            let q = chain.vertex((i as usize + 1) % 4).unwrap_or_else(Point2::origin);
            assert_relative_eq!(start.xy().coords, p.coords, epsilon = 1e-5);
            assert_relative_eq!(end.xy().coords, q.coords, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_insert_refits_neighbourhood() {
        let mut chain = square();
        chain.smooth();
        chain.insert(Point2::new(50.0, -20.0), 1);
        assert_eq!(chain.size(), 5);
        assert!(!chain.is_open());
        // Every edge touched by the insertion has a fresh, successful fit.
        for edge in chain.edges() {
            assert!(matches!(edge.fit, Some(Ok(_))), "{edge:?}");
        }
        let result = chain.smooth();
        assert!(result.is_success(), "{result}");
    }

    #[test]
    fn test_push_builds_open_chain() {
        let mut chain = Polyspiral::new(5.0);
        chain.push(Point2::new(0.0, 0.0));
        assert_eq!(chain.size(), 1);
        assert!(!chain.is_open());

        chain.push(Point2::new(3.0, 4.0));
        assert!(chain.is_open());
        assert_relative_eq!(chain.length(), 5.0, epsilon = 1e-9);
        assert!(chain.area().is_nan());

        chain.push(Point2::new(6.0, 0.0));
        assert_eq!(chain.size(), 2);
        assert!(chain.edges().iter().all(|e| matches!(e.fit, Some(Ok(_)))));
        let spiral = chain.spiral(-1).unwrap_or_default();
        assert_relative_eq!(spiral.start().z, 5.0);
    }

    #[test]
    fn test_zero_length_edge_is_degenerate() {
        let mut chain = build(&[(0.0, 0.0), (0.0, 0.0)], false);
        let result = chain.smooth();
        assert!(!result.is_success());
        assert_eq!(result.failures.len(), 1);
        assert!(result.failures[0].1.is_degenerate());
        assert!(chain.edges()[0].length.is_nan());
        assert!(result.to_string().contains("0/1"));
    }

    #[test]
    fn test_close_adds_straight_edge() {
        let mut chain = build(&[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0)], false);
        chain.close();
        let closing = &chain.edges()[2];
        assert_relative_eq!(closing.length, 100.0 * 2f64.sqrt());
        assert!(closing.fit.is_none());
        assert_relative_eq!(closing.midpoint.coords, Point2::new(50.0, 50.0).coords);

        let before = chain.clone();
        chain.open();
        chain.close();
        assert_eq!(chain, before);
    }

    #[test]
    fn test_from_polyline() {
        let mut line = Polyline::from_points(
            &[
                Point2::new(0.0, 0.0),
                Point2::new(10.0, 0.0),
                Point2::new(10.0, 10.0),
                Point2::new(0.0, 10.0),
            ],
            2.0,
        );
        line.close();
        let mut chain = Polyspiral::from(&line);
        assert_eq!(chain.size(), 4);
        assert_relative_eq!(chain.length(), 40.0);
        assert_relative_eq!(chain.area(), 100.0);
        assert_relative_eq!(chain.elevation(), 2.0);

        // Bearings climb without jumping back.
        let degrees: Vec<f64> = chain.vertices().iter().map(|v| v.bearing.to_degrees()).collect();
        for (deg, expected) in degrees.iter().zip([0.0, 90.0, 180.0, 270.0]) {
            assert_relative_eq!(*deg, expected, epsilon = 1e-6);
        }

        assert!(chain.smooth().is_success());
        assert!(chain.area() > 100.0);
    }

    #[test]
    fn test_from_open_polyline_last_bearing() {
        let line = Polyline::from_points(&[Point2::new(0.0, 0.0), Point2::new(0.0, 10.0)], 0.0);
        let chain = Polyspiral::from(&line);
        assert!(chain.is_open());
        assert_eq!(chain.bearing(1), chain.bearing(0));
        assert_relative_eq!(chain.bearing(1).unwrap_or_default().to_degrees(), 90.0, epsilon = 1e-6);
    }

    #[test]
    fn test_fit_params_are_used() {
        let params = FitParams::default().with_max_iterations(1);
        let mut chain = square().with_fit_params(params);
        assert_eq!(chain.fit_params().max_iterations, 1);
        let result = chain.smooth();
        assert_eq!(result.failures.len(), 4);
        assert!(result.failures.iter().all(|(_, e)| e.is_no_convergence()));
    }

    #[test]
    fn test_approx3d_follows_spirals() {
        let mut chain = square();
        chain.smooth();
        let pieces = chain.approx3d(0.01);
        assert!(pieces.len() >= 4);
        let first = pieces.first().map(|b| b.p0.xy()).unwrap_or_else(Point2::origin);
        assert_relative_eq!(first.coords, Point2::new(0.0, 0.0).coords, epsilon = 1e-5);
    }

    #[test]
    fn test_smooth_result_display() {
        let result = SmoothResult {
            edges: 4,
            converged: 3,
            failures: vec![(2, AlignmentError::no_convergence(256))],
            total_iterations: 30,
        };
        assert!(!result.is_success());
        assert_relative_eq!(result.mean_iterations(), 10.0);
        let text = result.to_string();
        assert!(text.contains("3/4"));
        assert!(text.contains("1 failed"));
    }
}
