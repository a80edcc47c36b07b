//! Triangulated surface over a rectilinear height grid.
//!
//! Vertex `(i, j)` sits at `(axis1[i], axis2[j], height)` with flat index
//! `i * N + j`, where `N = axis2.len()`. Each grid cell is split along the
//! same diagonal:
//!
//! ```text
//!   v(i, j+1) ──── v(i+1, j+1)
//!       │  ╲    T2     │
//!       │    ╲         │
//!       │  T1  ╲       │
//!   v(i, j) ────── v(i+1, j)
//! ```
//!
//! T1 = (v(i,j), v(i,j+1), v(i+1,j)) and T2 = (v(i,j+1), v(i+1,j+1), v(i+1,j)).

use tracing::debug;

use ocean_common::{Axis, Field2D, OceanError, OceanResult, Sample};

use crate::colormap::{normalize, viridis, Color};

/// Heights over two axes, stored axis1-major.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightGrid {
    axis1: Axis,
    axis2: Axis,
    heights: Vec<Sample>,
}

impl HeightGrid {
    /// `heights[i * axis2.len() + j]` is the height at `(axis1[i], axis2[j])`.
    pub fn new(axis1: Axis, axis2: Axis, heights: Vec<Sample>) -> OceanResult<Self> {
        let expected = axis1.len() * axis2.len();
        if heights.len() != expected {
            return Err(OceanError::shape_mismatch(
                "height grid",
                format!("{} x {} = {}", axis1.len(), axis2.len(), expected),
                heights.len(),
            ));
        }
        Ok(Self {
            axis1,
            axis2,
            heights,
        })
    }

    /// Build from a (lat, lon) bathymetry field and its projected axes.
    ///
    /// The result is x-major: axis1 is `x` (one per longitude) and axis2 is
    /// `y` (one per latitude).
    pub fn from_bathymetry(field: &Field2D, x: &Axis, y: &Axis) -> OceanResult<Self> {
        if field.shape() != (y.len(), x.len()) {
            return Err(OceanError::shape_mismatch(
                "bathymetry for mesh",
                format!("(lat, lon) = ({}, {})", y.len(), x.len()),
                format!("{:?}", field.shape()),
            ));
        }
        let transposed = field.transpose();
        Self::new(x.clone(), y.clone(), transposed.values().to_vec())
    }

    pub fn axis1(&self) -> &Axis {
        &self.axis1
    }

    pub fn axis2(&self) -> &Axis {
        &self.axis2
    }

    pub fn heights(&self) -> &[Sample] {
        &self.heights
    }

    /// (len(axis1), len(axis2))
    pub fn shape(&self) -> (usize, usize) {
        (self.axis1.len(), self.axis2.len())
    }

    pub fn undefined_count(&self) -> usize {
        self.heights.iter().filter(|h| h.is_none()).count()
    }

    /// Replace every undefined height with `value`.
    pub fn substitute_undefined(mut self, value: f64) -> Self {
        for h in self.heights.iter_mut().filter(|h| h.is_none()) {
            *h = Some(value);
        }
        self
    }
}

/// Indexed triangle mesh with per-vertex colors and normals.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceMesh {
    pub vertices: Vec<[f64; 3]>,
    pub triangles: Vec<[usize; 3]>,
    pub colors: Vec<Color>,
    pub normals: Vec<[f64; 3]>,
}

impl SurfaceMesh {
    /// Triangulate a height grid. Fails on the first undefined height.
    pub fn build(grid: &HeightGrid) -> OceanResult<Self> {
        let (m, n) = grid.shape();

        let mut heights = Vec::with_capacity(m * n);
        for (idx, h) in grid.heights.iter().enumerate() {
            match h {
                Some(v) => heights.push(*v),
                None => return Err(OceanError::undefined_value("mesh heights", idx)),
            }
        }

        let mut vertices = Vec::with_capacity(m * n);
        for &a in grid.axis1.values() {
            for &b in grid.axis2.values() {
                vertices.push([a, b, 0.0]);
            }
        }
        for (v, h) in vertices.iter_mut().zip(&heights) {
            v[2] = *h;
        }

        let cells = m.saturating_sub(1) * n.saturating_sub(1);
        let mut triangles = Vec::with_capacity(2 * cells);
        for i in 0..m.saturating_sub(1) {
            for j in 0..n.saturating_sub(1) {
                let v00 = i * n + j;
                let v01 = v00 + 1;
                let v10 = (i + 1) * n + j;
                let v11 = v10 + 1;
                triangles.push([v00, v01, v10]);
                triangles.push([v01, v11, v10]);
            }
        }

        let colors = normalize(&heights).into_iter().map(viridis).collect();
        let normals = vertex_normals(&vertices, &triangles);

        debug!(
            vertices = vertices.len(),
            triangles = triangles.len(),
            "Built surface mesh"
        );

        Ok(Self {
            vertices,
            triangles,
            colors,
            normals,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }
}

/// Area-weighted vertex normals. Vertices touched by no triangle get +z.
fn vertex_normals(vertices: &[[f64; 3]], triangles: &[[usize; 3]]) -> Vec<[f64; 3]> {
    let mut acc = vec![[0.0_f64; 3]; vertices.len()];
    for tri in triangles {
        let [a, b, c] = tri.map(|i| vertices[i]);
        // |e1 x e2| is twice the triangle area, which gives the weighting
        let face = cross(sub(b, a), sub(c, a));
        for &i in tri {
            for k in 0..3 {
                acc[i][k] += face[k];
            }
        }
    }
    acc.into_iter()
        .map(|v| {
            let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
            if len > 0.0 {
                [v[0] / len, v[1] / len, v[2] / len]
            } else {
                [0.0, 0.0, 1.0]
            }
        })
        .collect()
}

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}
