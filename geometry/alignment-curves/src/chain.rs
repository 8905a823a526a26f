//! Chains of curves.
//!
//! A chain is a sequence of vertices joined by edges. Edge `i` runs from
//! vertex `i` to vertex `(i + 1) mod n`. A chain is open when it has one
//! more vertex than edges and closed when the counts are equal; an empty
//! chain is closed.
//!
//! All three chain kinds share [`ChainStore`], which keeps one vertex
//! record and one edge record per slot so the per-edge data can never fall
//! out of step with the topology.

use crate::angle::area3;
use crate::bezier::CubicBezier;
use crate::sum::ManySum;
use crate::traits::Curve;
use nalgebra::{Point2, Point3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Common interface of [`Polyline`](crate::Polyline),
/// [`Polyarc`](crate::Polyarc) and [`Polyspiral`](crate::Polyspiral).
pub trait Chain {
    /// The curve kind of each edge.
    type Edge: Curve + Clone;

    /// Whether the chain has one more vertex than edges.
    fn is_open(&self) -> bool;

    /// Number of edges.
    fn size(&self) -> usize;

    /// Number of vertices.
    fn vertex_count(&self) -> usize;

    /// Horizontal position of vertex `i`.
    fn vertex(&self, i: usize) -> Option<Point2<f64>>;

    /// Elevation given to every vertex.
    fn elevation(&self) -> f64;

    /// Change the elevation of every vertex.
    fn set_elevation(&mut self, elevation: f64);

    /// Insert a vertex before position `pos`.
    ///
    /// Any `pos` at or past the vertex count appends. Inserting into an
    /// empty chain makes a closed chain of one vertex joined to itself;
    /// inserting into that makes an open chain of two vertices. Otherwise
    /// the chain stays open or closed.
    fn insert(&mut self, point: Point2<f64>, pos: usize);

    /// Append a vertex.
    fn push(&mut self, point: Point2<f64>) {
        self.insert(point, usize::MAX);
    }

    /// Drop the closing edge. Does nothing to an open or empty chain.
    fn open(&mut self);

    /// Add the closing edge. Does nothing to a closed chain.
    fn close(&mut self);

    /// Sum of edge lengths.
    fn length(&self) -> f64;

    /// Enclosed area, positive when counterclockwise. NaN for open chains.
    fn area(&self) -> f64;

    /// Edge `i` as a curve. Indices wrap, so `-1` is the last edge.
    ///
    /// Returns `None` only when the chain has no edges.
    fn curve(&self, i: isize) -> Option<Self::Edge>;

    /// Flatten every edge into cubic Béziers, in order.
    fn approx3d(&self, precision: f64) -> Vec<CubicBezier> {
        (0..self.size())
            .filter_map(|i| self.curve(i as isize))
            .flat_map(|c| c.approx3d(precision).collect::<Vec<_>>())
            .collect()
    }
}

/// Anything stored as a chain vertex.
pub(crate) trait Vertex: Clone {
    fn position(&self) -> Point2<f64>;
}

impl Vertex for Point2<f64> {
    fn position(&self) -> Point2<f64> {
        *self
    }
}

/// Edge slots touched by an insertion, in post-insertion indexing.
#[derive(Debug, Clone)]
pub(crate) struct Insertion<E> {
    /// Index the vertex landed at.
    pub pos: usize,
    /// Edge ending at the new vertex.
    pub prev_edge: Option<usize>,
    /// Edge starting at the new vertex.
    pub next_edge: Option<usize>,
    /// Record of the edge the new vertex was dropped into, if any. That
    /// record now sits at `prev_edge`.
    pub split: Option<E>,
}

/// Vertex and edge records of a chain.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub(crate) struct ChainStore<V, E> {
    vertices: Vec<V>,
    edges: Vec<E>,
}

impl<V, E> Default for ChainStore<V, E> {
    fn default() -> Self {
        Self {
            vertices: Vec::new(),
            edges: Vec::new(),
        }
    }
}

impl<V: Vertex, E: Clone + Default> ChainStore<V, E> {
    pub fn is_open(&self) -> bool {
        self.vertices.len() > self.edges.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn vertices(&self) -> &[V] {
        &self.vertices
    }

    pub fn vertices_mut(&mut self) -> &mut [V] {
        &mut self.vertices
    }

    pub fn edges(&self) -> &[E] {
        &self.edges
    }

    pub fn edge_mut(&mut self, i: usize) -> Option<&mut E> {
        self.edges.get_mut(i)
    }

    pub fn position(&self, i: usize) -> Option<Point2<f64>> {
        self.vertices.get(i).map(Vertex::position)
    }

    /// Wrap a possibly negative edge index.
    pub fn wrap_edge(&self, i: isize) -> Option<usize> {
        let n = self.edges.len();
        if n == 0 {
            return None;
        }
        Some(i.rem_euclid(n as isize) as usize)
    }

    /// Vertex indices at the two ends of edge `i`.
    pub fn edge_ends(&self, i: usize) -> (usize, usize) {
        let n = self.vertices.len();
        (i, (i + 1) % n.max(1))
    }

    /// Horizontal endpoints of edge `i`.
    pub fn edge_points(&self, i: usize) -> (Point2<f64>, Point2<f64>) {
        let (a, b) = self.edge_ends(i);
        (
            self.vertices[a].position(),
            self.vertices[b].position(),
        )
    }

    /// 3D endpoints of edge `i` at a uniform elevation.
    pub fn edge_points3(&self, i: usize, elevation: f64) -> (Point3<f64>, Point3<f64>) {
        let (a, b) = self.edge_points(i);
        (
            Point3::new(a.x, a.y, elevation),
            Point3::new(b.x, b.y, elevation),
        )
    }

    /// Insert a vertex with a default edge record and report which edges
    /// now touch it.
    pub fn insert(&mut self, vertex: V, pos: usize) -> Insertion<E> {
        let n = self.vertices.len();
        let was_open = self.is_open();
        let pos = pos.min(n);

        let split_index = if !was_open && n >= 2 {
            Some((pos + n - 1) % n)
        } else if was_open && pos > 0 && pos < n {
            Some(pos - 1)
        } else {
            None
        };
        let split = split_index.map(|i| self.edges[i].clone());

        self.vertices.insert(pos, vertex);
        if !was_open && n == 1 {
            // The self-loop becomes the single edge of an open pair.
            self.edges[0] = E::default();
        } else {
            let at = pos.min(self.edges.len());
            self.edges.insert(at, E::default());
        }

        let m = self.edges.len();
        let open = self.is_open();
        let prev_edge = if open {
            pos.checked_sub(1)
        } else {
            Some((pos + m - 1) % m)
        };
        let next_edge = (pos < m).then_some(pos);

        debug_assert!(self.vertices.len() == m || self.vertices.len() == m + 1);
        Insertion {
            pos,
            prev_edge,
            next_edge,
            split,
        }
    }

    pub fn open(&mut self) {
        if !self.is_open() && !self.vertices.is_empty() {
            self.edges.truncate(self.vertices.len() - 1);
        }
    }

    /// Returns the index of the new closing edge, if one was added.
    pub fn close(&mut self) -> Option<usize> {
        if self.is_open() {
            self.edges.push(E::default());
            Some(self.edges.len() - 1)
        } else {
            None
        }
    }

    /// Shoelace triangles from vertex 0 over every edge, into `sum`.
    pub fn polygon_area(&self, sum: &mut ManySum) {
        let Some(origin) = self.position(0) else {
            return;
        };
        for i in 0..self.edges.len() {
            let (a, b) = self.edge_points(i);
            sum.push(area3(&origin, &a, &b));
        }
    }
}
