//! Delaunay triangulation and point location
//!
//! Triangles are built incrementally with the Bowyer-Watson algorithm:
//! each new point removes every triangle whose circumcircle contains it and
//! re-triangulates the resulting star-shaped cavity. A bucketed
//! [`TriFinder`] then answers "which triangle contains this point" without
//! scanning every triangle.
//!
//! [`scaled_triangulation`] triangulates in whitened coordinates so that
//! triangle shapes follow the sample's correlation structure.

use std::collections::HashSet;

use nalgebra::{Matrix2, Vector2};
use thiserror::Error;

use crate::error::{PosteriorError, PosteriorResult};

/// Barycentric slack when testing whether a point lies inside a triangle
const CONTAINMENT_EPSILON: f64 = 1e-10;

/// Size of the enclosing super-triangle relative to the point extent
const SUPER_TRIANGLE_SCALE: f64 = 20.0;

/// Errors raised while building a triangulation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TriangulationError {
    #[error("Coordinate arrays differ in length: {x} x values, {y} y values")]
    LengthMismatch { x: usize, y: usize },

    #[error("At least 3 distinct points are required, got {got}")]
    TooFewPoints { got: usize },

    #[error("Non-finite coordinate at index {0}")]
    NonFinite(usize),

    #[error("All points are collinear")]
    Collinear,
}

#[derive(Clone, Copy, Debug)]
struct Circumcircle {
    cx: f64,
    cy: f64,
    r2: f64,
}

impl Circumcircle {
    fn of(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> Self {
        let d = 2.0 * (a[0] * (b[1] - c[1]) + b[0] * (c[1] - a[1]) + c[0] * (a[1] - b[1]));
        if d == 0.0 {
            return Self {
                cx: f64::NAN,
                cy: f64::NAN,
                r2: f64::INFINITY,
            };
        }
        let (a2, b2, c2) = (
            a[0] * a[0] + a[1] * a[1],
            b[0] * b[0] + b[1] * b[1],
            c[0] * c[0] + c[1] * c[1],
        );
        let cx = (a2 * (b[1] - c[1]) + b2 * (c[1] - a[1]) + c2 * (a[1] - b[1])) / d;
        let cy = (a2 * (c[0] - b[0]) + b2 * (a[0] - c[0]) + c2 * (b[0] - a[0])) / d;
        let r2 = (a[0] - cx).powi(2) + (a[1] - cy).powi(2);
        Self { cx, cy, r2 }
    }

    fn contains(&self, p: [f64; 2]) -> bool {
        if self.r2.is_infinite() {
            return true;
        }
        (p[0] - self.cx).powi(2) + (p[1] - self.cy).powi(2) < self.r2
    }
}

fn orient(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

/// Barycentric coordinates of `p` in triangle `abc`, or None if degenerate
fn barycentric(a: [f64; 2], b: [f64; 2], c: [f64; 2], p: [f64; 2]) -> Option<[f64; 3]> {
    let det = (b[1] - c[1]) * (a[0] - c[0]) + (c[0] - b[0]) * (a[1] - c[1]);
    if det == 0.0 {
        return None;
    }
    let l1 = ((b[1] - c[1]) * (p[0] - c[0]) + (c[0] - b[0]) * (p[1] - c[1])) / det;
    let l2 = ((c[1] - a[1]) * (p[0] - c[0]) + (a[0] - c[0]) * (p[1] - c[1])) / det;
    Some([l1, l2, 1.0 - l1 - l2])
}

/// Run Bowyer-Watson over the given points, returning CCW triangles
fn delaunay(points: &[[f64; 2]], order: &[usize]) -> Vec<[usize; 3]> {
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for &i in order {
        let [px, py] = points[i];
        min_x = min_x.min(px);
        max_x = max_x.max(px);
        min_y = min_y.min(py);
        max_y = max_y.max(py);
    }
    let extent = (max_x - min_x).max(max_y - min_y).max(f64::MIN_POSITIVE);
    let (mid_x, mid_y) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);

    let n = points.len();
    let mut vertices = points.to_vec();
    vertices.push([mid_x - SUPER_TRIANGLE_SCALE * extent, mid_y - extent]);
    vertices.push([mid_x + SUPER_TRIANGLE_SCALE * extent, mid_y - extent]);
    vertices.push([mid_x, mid_y + SUPER_TRIANGLE_SCALE * extent]);

    let super_tri = [n, n + 1, n + 2];
    let mut triangles = vec![super_tri];
    let mut circles = vec![Circumcircle::of(vertices[n], vertices[n + 1], vertices[n + 2])];

    for &p in order {
        let point = vertices[p];

        let mut edges = Vec::new();
        let mut kept_triangles = Vec::with_capacity(triangles.len());
        let mut kept_circles = Vec::with_capacity(circles.len());
        for (tri, circle) in triangles.into_iter().zip(circles) {
            if circle.contains(point) {
                edges.extend([(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])]);
            } else {
                kept_triangles.push(tri);
                kept_circles.push(circle);
            }
        }

        // An edge shared by two removed triangles appears in both directions
        let directed: HashSet<(usize, usize)> = edges.iter().copied().collect();
        for &(a, b) in &edges {
            if directed.contains(&(b, a)) {
                continue;
            }
            kept_triangles.push([a, b, p]);
            kept_circles.push(Circumcircle::of(vertices[a], vertices[b], point));
        }

        triangles = kept_triangles;
        circles = kept_circles;
    }

    triangles
        .into_iter()
        .filter(|tri| tri.iter().all(|&v| v < n))
        .filter(|tri| orient(points[tri[0]], points[tri[1]], points[tri[2]]) > 0.0)
        .collect()
}

/// Uniform bucket grid over triangle bounding boxes
#[derive(Clone, Debug)]
pub struct TriFinder {
    origin: [f64; 2],
    cell: [f64; 2],
    shape: [usize; 2],
    buckets: Vec<Vec<usize>>,
}

impl TriFinder {
    /// Index the triangles of a point set
    pub fn new(points: &[[f64; 2]], triangles: &[[usize; 3]]) -> Self {
        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for tri in triangles {
            for &v in tri {
                let [px, py] = points[v];
                min_x = min_x.min(px);
                max_x = max_x.max(px);
                min_y = min_y.min(py);
                max_y = max_y.max(py);
            }
        }

        let side = ((triangles.len() as f64).sqrt().ceil() as usize).max(1);
        let cell = [
            ((max_x - min_x) / side as f64).max(f64::MIN_POSITIVE),
            ((max_y - min_y) / side as f64).max(f64::MIN_POSITIVE),
        ];
        let mut finder = Self {
            origin: [min_x, min_y],
            cell,
            shape: [side, side],
            buckets: vec![Vec::new(); side * side],
        };

        for (t, tri) in triangles.iter().enumerate() {
            let xs = tri.map(|v| points[v][0]);
            let ys = tri.map(|v| points[v][1]);
            let (i0, j0) = finder.cell_of(
                xs.iter().copied().fold(f64::INFINITY, f64::min),
                ys.iter().copied().fold(f64::INFINITY, f64::min),
            );
            let (i1, j1) = finder.cell_of(
                xs.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                ys.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            );
            for j in j0..=j1 {
                for i in i0..=i1 {
                    finder.buckets[j * side + i].push(t);
                }
            }
        }

        finder
    }

    fn cell_of(&self, x: f64, y: f64) -> (usize, usize) {
        let i = ((x - self.origin[0]) / self.cell[0]).floor().max(0.0) as usize;
        let j = ((y - self.origin[1]) / self.cell[1]).floor().max(0.0) as usize;
        (i.min(self.shape[0] - 1), j.min(self.shape[1] - 1))
    }

    /// Index of the triangle containing `(x, y)`, if any
    pub fn find(&self, points: &[[f64; 2]], triangles: &[[usize; 3]], x: f64, y: f64) -> Option<usize> {
        if triangles.is_empty() || !x.is_finite() || !y.is_finite() {
            return None;
        }
        let width = self.cell[0] * self.shape[0] as f64;
        let height = self.cell[1] * self.shape[1] as f64;
        let slack_x = width * CONTAINMENT_EPSILON;
        let slack_y = height * CONTAINMENT_EPSILON;
        if x < self.origin[0] - slack_x
            || x > self.origin[0] + width + slack_x
            || y < self.origin[1] - slack_y
            || y > self.origin[1] + height + slack_y
        {
            return None;
        }

        let (i, j) = self.cell_of(x, y);
        self.buckets[j * self.shape[0] + i].iter().copied().find(|&t| {
            let [a, b, c] = triangles[t];
            barycentric(points[a], points[b], points[c], [x, y])
                .map_or(false, |l| l.iter().all(|&v| v >= -CONTAINMENT_EPSILON))
        })
    }
}

/// Delaunay triangulation of a planar point set
#[derive(Clone, Debug)]
pub struct Triangulation {
    points: Vec<[f64; 2]>,
    triangles: Vec<[usize; 3]>,
    finder: TriFinder,
}

impl Triangulation {
    /// Triangulate points given as parallel coordinate arrays
    ///
    /// Exact duplicate points are kept in the vertex list but take part in
    /// no triangle.
    pub fn new(x: &[f64], y: &[f64]) -> Result<Self, TriangulationError> {
        if x.len() != y.len() {
            return Err(TriangulationError::LengthMismatch {
                x: x.len(),
                y: y.len(),
            });
        }
        if let Some(i) = (0..x.len()).find(|&i| !x[i].is_finite() || !y[i].is_finite()) {
            return Err(TriangulationError::NonFinite(i));
        }

        let points: Vec<[f64; 2]> = x.iter().zip(y).map(|(&px, &py)| [px, py]).collect();

        // -0.0 and 0.0 are the same point
        let mut seen = HashSet::with_capacity(points.len());
        let distinct: Vec<usize> = (0..points.len())
            .filter(|&i| seen.insert(((points[i][0] + 0.0).to_bits(), (points[i][1] + 0.0).to_bits())))
            .collect();
        if distinct.len() < 3 {
            return Err(TriangulationError::TooFewPoints { got: distinct.len() });
        }

        let triangles = delaunay(&points, &distinct);
        if triangles.is_empty() {
            return Err(TriangulationError::Collinear);
        }

        tracing::trace!(
            points = points.len(),
            distinct = distinct.len(),
            triangles = triangles.len(),
            "Built Delaunay triangulation"
        );

        let finder = TriFinder::new(&points, &triangles);
        Ok(Self {
            points,
            triangles,
            finder,
        })
    }

    /// Vertex x coordinates
    pub fn x(&self) -> Vec<f64> {
        self.points.iter().map(|p| p[0]).collect()
    }

    /// Vertex y coordinates
    pub fn y(&self) -> Vec<f64> {
        self.points.iter().map(|p| p[1]).collect()
    }

    pub fn points(&self) -> &[[f64; 2]] {
        &self.points
    }

    /// Vertex indices of each triangle, counter-clockwise
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Index of the triangle containing `(x, y)`; None outside the hull
    pub fn find_triangle(&self, x: f64, y: f64) -> Option<usize> {
        self.finder.find(&self.points, &self.triangles, x, y)
    }
}

/// Triangulation built in whitened coordinates
///
/// Topology comes from the whitened points; vertex coordinates are the
/// original ones. Point location whitens the query before searching.
#[derive(Clone, Debug)]
pub struct ScaledTriangulation {
    whitened: Triangulation,
    points: Vec<[f64; 2]>,
    whitening: Matrix2<f64>,
}

impl ScaledTriangulation {
    /// Original x coordinates of the vertices
    pub fn x(&self) -> Vec<f64> {
        self.points.iter().map(|p| p[0]).collect()
    }

    /// Original y coordinates of the vertices
    pub fn y(&self) -> Vec<f64> {
        self.points.iter().map(|p| p[1]).collect()
    }

    pub fn points(&self) -> &[[f64; 2]] {
        &self.points
    }

    pub fn triangles(&self) -> &[[usize; 3]] {
        self.whitened.triangles()
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    /// The triangulation in whitened coordinates
    pub fn whitened(&self) -> &Triangulation {
        &self.whitened
    }

    /// Map a point into whitened coordinates
    pub fn whiten(&self, x: f64, y: f64) -> (f64, f64) {
        let w = self.whitening * Vector2::new(x, y);
        (w[0], w[1])
    }

    /// Index of the triangle containing the (unwhitened) point `(x, y)`
    pub fn find_triangle(&self, x: f64, y: f64) -> Option<usize> {
        let (wx, wy) = self.whiten(x, y);
        self.whitened.find_triangle(wx, wy)
    }
}

/// Triangulate after whitening by the Cholesky factor of `cov`
///
/// With `L Lᵀ = cov`, points are mapped through `L⁻¹` before triangulating.
pub fn scaled_triangulation(x: &[f64], y: &[f64], cov: &Matrix2<f64>) -> PosteriorResult<ScaledTriangulation> {
    let cholesky = cov
        .cholesky()
        .ok_or_else(|| PosteriorError::InvalidCovariance(format!("{:?}", cov.as_slice())))?;
    let whitening = cholesky
        .l()
        .try_inverse()
        .ok_or_else(|| PosteriorError::InvalidCovariance("singular Cholesky factor".to_string()))?;

    if x.len() != y.len() {
        return Err(TriangulationError::LengthMismatch {
            x: x.len(),
            y: y.len(),
        }
        .into());
    }

    let (wx, wy): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y)
        .map(|(&px, &py)| {
            let w = whitening * Vector2::new(px, py);
            (w[0], w[1])
        })
        .unzip();

    let whitened = Triangulation::new(&wx, &wy)?;
    let points = x.iter().zip(y).map(|(&px, &py)| [px, py]).collect();

    Ok(ScaledTriangulation {
        whitened,
        points,
        whitening,
    })
}
