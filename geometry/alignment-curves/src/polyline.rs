//! Polylines and polyarcs.
//!
//! A [`Polyline`] joins its vertices with straight segments. A [`Polyarc`]
//! joins them with circular arcs, each edge carrying its own delta. Both
//! keep every vertex at one elevation.

use crate::angle::BinaryAngle;
use crate::arc::Arc;
use crate::chain::{Chain, ChainStore, Insertion};
use crate::segment::Segment;
use crate::sum::ManySum;
use crate::traits::Curve;
use nalgebra::Point2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Per-edge data of a [`Polyline`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LineEdge {
    /// Horizontal length.
    pub length: f64,
}

/// Per-edge data of a [`Polyarc`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ArcEdge {
    /// Horizontal length along the arc.
    pub length: f64,
    /// Total turn of the arc.
    pub delta: BinaryAngle,
}

/// A chain of straight segments.
///
/// # Example
///
/// ```
/// use alignment_curves::{Chain, Polyline};
/// use nalgebra::Point2;
///
/// let mut line = Polyline::new(0.0);
/// line.push(Point2::new(0.0, 0.0));
/// line.push(Point2::new(3.0, 4.0));
///
/// assert!(line.is_open());
/// assert_eq!(line.length(), 5.0);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Polyline {
    store: ChainStore<Point2<f64>, LineEdge>,
    elevation: f64,
}

impl Polyline {
    /// Create an empty polyline at the given elevation.
    #[must_use]
    pub fn new(elevation: f64) -> Self {
        Self {
            store: ChainStore::default(),
            elevation,
        }
    }

    /// Build an open polyline through `points`.
    #[must_use]
    pub fn from_points(points: &[Point2<f64>], elevation: f64) -> Self {
        let mut line = Self::new(elevation);
        for &p in points {
            line.push(p);
        }
        line
    }

    /// Edge `i` as a segment. Indices wrap.
    #[must_use]
    pub fn segment(&self, i: isize) -> Option<Segment> {
        let i = self.store.wrap_edge(i)?;
        let (a, b) = self.store.edge_points3(i, self.elevation);
        Some(Segment::new(a, b))
    }

    /// Per-edge records.
    #[must_use]
    pub fn edges(&self) -> &[LineEdge] {
        self.store.edges()
    }

    /// All vertex positions.
    #[must_use]
    pub fn points(&self) -> &[Point2<f64>] {
        self.store.vertices()
    }

    /// Recompute every edge length.
    pub fn set_lengths(&mut self) {
        for i in 0..self.store.edge_count() {
            self.update_length(i);
        }
    }

    fn update_length(&mut self, i: usize) {
        let (a, b) = self.store.edge_points(i);
        if let Some(edge) = self.store.edge_mut(i) {
            edge.length = (b - a).norm();
        }
    }

    fn touch(&mut self, insertion: &Insertion<LineEdge>) {
        for i in [insertion.prev_edge, insertion.next_edge].into_iter().flatten() {
            self.update_length(i);
        }
    }
}

impl Chain for Polyline {
    type Edge = Segment;

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
        let insertion = self.store.insert(point, pos);
        self.touch(&insertion);
    }

    fn open(&mut self) {
        self.store.open();
    }

    fn close(&mut self) {
        if let Some(i) = self.store.close() {
            self.update_length(i);
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
        sum.total()
    }

    fn curve(&self, i: isize) -> Option<Segment> {
        self.segment(i)
    }
}

/// A chain of circular arcs.
///
/// Inserting a vertex into an arc divides the arc's delta between the two
/// new arcs in proportion to the distances from the new vertex to its
/// neighbours.
///
/// # Example
///
/// ```
/// use alignment_curves::{BinaryAngle, Chain, Polyarc};
/// use nalgebra::Point2;
///
/// // Two half circles of radius 1 make a full circle.
/// let mut circle = Polyarc::new(0.0);
/// circle.push(Point2::new(-1.0, 0.0));
/// circle.push(Point2::new(1.0, 0.0));
/// circle.close();
/// circle.set_delta(0, BinaryAngle::DEG180);
/// circle.set_delta(1, BinaryAngle::DEG180);
///
/// assert!((circle.area() - std::f64::consts::PI).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Polyarc {
    store: ChainStore<Point2<f64>, ArcEdge>,
    elevation: f64,
}

impl Polyarc {
    /// Create an empty polyarc at the given elevation.
    #[must_use]
    pub fn new(elevation: f64) -> Self {
        Self {
            store: ChainStore::default(),
            elevation,
        }
    }

    /// Edge `i` as an arc. Indices wrap.
    #[must_use]
    pub fn arc(&self, i: isize) -> Option<Arc> {
        let i = self.store.wrap_edge(i)?;
        let (a, b) = self.store.edge_points3(i, self.elevation);
        Some(Arc::new(a, b, self.store.edges()[i].delta))
    }

    /// Per-edge records.
    #[must_use]
    pub fn edges(&self) -> &[ArcEdge] {
        self.store.edges()
    }

    /// All vertex positions.
    #[must_use]
    pub fn points(&self) -> &[Point2<f64>] {
        self.store.vertices()
    }

    /// Set the delta of edge `i` (wrapping) and update its length.
    pub fn set_delta(&mut self, i: isize, delta: BinaryAngle) {
        let Some(i) = self.store.wrap_edge(i) else {
            return;
        };
        if let Some(edge) = self.store.edge_mut(i) {
            edge.delta = delta;
        }
        self.update_length(i);
    }

    /// Recompute every edge length from its arc.
    pub fn set_lengths(&mut self) {
        for i in 0..self.store.edge_count() {
            self.update_length(i);
        }
    }

    fn update_length(&mut self, i: usize) {
        let length = self.arc(i as isize).map_or(0.0, |arc| arc.length());
        if let Some(edge) = self.store.edge_mut(i) {
            edge.length = length;
        }
    }

    /// Share a split arc's delta between the edges on either side of the
    /// new vertex, keeping the sum exact.
    fn share_delta(&mut self, insertion: &Insertion<ArcEdge>) {
        let (Some(split), Some(prev), Some(next)) =
            (insertion.split, insertion.prev_edge, insertion.next_edge)
        else {
            return;
        };
        let (before, new) = self.store.edge_points(prev);
        let (_, after) = self.store.edge_points(next);
        let d_before = (new - before).norm();
        let d_after = (after - new).norm();
        let total = d_before + d_after;
        let share = if total == 0.0 { 0.5 } else { d_before / total };

        let delta_prev =
            BinaryAngle::from_raw((f64::from(split.delta.raw()) * share).round() as i32);
        if let Some(edge) = self.store.edge_mut(prev) {
            edge.delta = delta_prev;
        }
        if let Some(edge) = self.store.edge_mut(next) {
            edge.delta = split.delta - delta_prev;
        }
    }
}

impl Chain for Polyarc {
    type Edge = Arc;

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
        let insertion = self.store.insert(point, pos);
        self.share_delta(&insertion);
        for i in [insertion.prev_edge, insertion.next_edge].into_iter().flatten() {
            self.update_length(i);
        }
    }

    fn open(&mut self) {
        self.store.open();
    }

    fn close(&mut self) {
        if let Some(i) = self.store.close() {
            self.update_length(i);
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
        for i in 0..self.store.edge_count() {
            if let Some(arc) = self.arc(i as isize) {
                sum.push(arc.diffarea());
            }
        }
        sum.total()
    }

    fn curve(&self, i: isize) -> Option<Arc> {
        self.arc(i)
    }
}

impl From<&Polyline> for Polyarc {
    /// Straight arcs along every edge.
    fn from(line: &Polyline) -> Self {
        let mut store = ChainStore::default();
        for &p in line.points() {
            store.insert(p, usize::MAX);
        }
        if !line.is_open() {
            store.close();
        }
        let mut arcs = Self {
            store,
            elevation: line.elevation,
        };
        arcs.set_lengths();
        arcs
    }
}
