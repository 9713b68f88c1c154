//! Piecewise cubic, C1 scattered interpolation (Clough-Tocher).
//!
//! Each Delaunay triangle is split at its centroid into three sub-triangles
//! carrying cubic Bézier patches. Vertex values and gradients fix the corner
//! control points; the edge-interior control points make the cross-edge
//! normal derivative linear along every triangle edge, which is what makes
//! neighbouring triangles join with continuous first derivatives.

use ndarray::Array2;

use super::gradient::{estimate_gradients, GradientOptions};
use super::mesh::Mesh;
use super::Interpolator;
use crate::grid::UniformGrid;

/// Clough-Tocher interpolator
#[derive(Debug, Clone, Default)]
pub struct CloughTocherInterpolator {
    pub gradient_options: GradientOptions,
}

impl CloughTocherInterpolator {
    pub fn new(gradient_options: GradientOptions) -> Self {
        Self { gradient_options }
    }
}

impl Interpolator for CloughTocherInterpolator {
    fn interpolate(&self, mesh: &Mesh, values: &[f64], grid: &UniformGrid) -> Array2<f64> {
        let gradients = estimate_gradients(mesh, values, &self.gradient_options);
        let points = mesh.points();

        let mut out = Array2::from_elem(grid.shape(), f64::NAN);
        for (row, col, lon, lat) in grid.points() {
            if let Some(location) = mesh.locate(lon, lat) {
                let t = mesh.triangles()[location.triangle];
                let patch = TrianglePatch::new(
                    t.map(|v| points[v]),
                    t.map(|v| values[v]),
                    t.map(|v| gradients[v]),
                );
                out[[row, col]] = patch.evaluate(location.weights);
            }
        }
        out
    }

    fn name(&self) -> &str {
        "cubic"
    }
}

/// Bézier control points of one macro-triangle.
///
/// Names follow `c<i><j><k><l>` where i, j, k count towards the three
/// vertices and l towards the centroid.
#[derive(Debug, Clone, Copy)]
struct TrianglePatch {
    c3000: f64,
    c0300: f64,
    c0030: f64,
    c2100: f64,
    c1200: f64,
    c0210: f64,
    c0120: f64,
    c1020: f64,
    c2010: f64,
    c2001: f64,
    c0201: f64,
    c0021: f64,
    c1101: f64,
    c0111: f64,
    c1011: f64,
    c1002: f64,
    c0102: f64,
    c0012: f64,
    c0003: f64,
}

impl TrianglePatch {
    fn new(p: [[f64; 2]; 3], f: [f64; 3], df: [[f64; 2]; 3]) -> Self {
        let along = |from: usize, to: usize| {
            let ex = p[to][0] - p[from][0];
            let ey = p[to][1] - p[from][1];
            f[from] + (df[from][0] * ex + df[from][1] * ey) / 3.0
        };

        let c3000 = f[0];
        let c0300 = f[1];
        let c0030 = f[2];
        let c2100 = along(0, 1);
        let c2010 = along(0, 2);
        let c1200 = along(1, 0);
        let c0210 = along(1, 2);
        let c1020 = along(2, 0);
        let c0120 = along(2, 1);

        let c2001 = (c2100 + c2010 + c3000) / 3.0;
        let c0201 = (c1200 + c0300 + c0210) / 3.0;
        let c0021 = (c1020 + c0120 + c0030) / 3.0;

        let centroid = [
            (p[0][0] + p[1][0] + p[2][0]) / 3.0,
            (p[0][1] + p[1][1] + p[2][1]) / 3.0,
        ];

        let c0111 = edge_interior(
            projection(p[1], p[2], centroid),
            [c0300, c0210, c0120, c0030],
            c0201,
            c0021,
        );
        let c1011 = edge_interior(
            projection(p[2], p[0], centroid),
            [c0030, c1020, c2010, c3000],
            c0021,
            c2001,
        );
        let c1101 = edge_interior(
            projection(p[0], p[1], centroid),
            [c3000, c2100, c1200, c0300],
            c2001,
            c0201,
        );

        let c1002 = (c1101 + c1011 + c2001) / 3.0;
        let c0102 = (c1101 + c0111 + c0201) / 3.0;
        let c0012 = (c1011 + c0111 + c0021) / 3.0;
        let c0003 = (c1002 + c0102 + c0012) / 3.0;

        Self {
            c3000,
            c0300,
            c0030,
            c2100,
            c1200,
            c0210,
            c0120,
            c1020,
            c2010,
            c2001,
            c0201,
            c0021,
            c1101,
            c0111,
            c1011,
            c1002,
            c0102,
            c0012,
            c0003,
        }
    }

    /// Evaluate at macro-triangle barycentric weights `b`.
    fn evaluate(&self, b: [f64; 3]) -> f64 {
        // The sub-triangle opposite the vertex with the smallest weight
        // contains the point; its weights follow from b and the centroid.
        let (min_index, min_weight) = if b[0] <= b[1] && b[0] <= b[2] {
            (0, b[0])
        } else if b[1] <= b[2] {
            (1, b[1])
        } else {
            (2, b[2])
        };
        let w = 3.0 * min_weight;

        match min_index {
            0 => cubic_bezier(
                [b[1] - min_weight, b[2] - min_weight, w],
                [
                    self.c0300, self.c0030, self.c0003, self.c0210, self.c0201, self.c0120,
                    self.c0021, self.c0102, self.c0012, self.c0111,
                ],
            ),
            1 => cubic_bezier(
                [b[2] - min_weight, b[0] - min_weight, w],
                [
                    self.c0030, self.c3000, self.c0003, self.c1020, self.c0021, self.c2010,
                    self.c2001, self.c0012, self.c1002, self.c1011,
                ],
            ),
            _ => cubic_bezier(
                [b[0] - min_weight, b[1] - min_weight, w],
                [
                    self.c3000, self.c0300, self.c0003, self.c2100, self.c2001, self.c1200,
                    self.c0201, self.c1002, self.c0102, self.c1101,
                ],
            ),
        }
    }
}

/// Parameter of the orthogonal projection of `point` onto the line `a`→`b`.
fn projection(a: [f64; 2], b: [f64; 2], point: [f64; 2]) -> f64 {
    let ex = b[0] - a[0];
    let ey = b[1] - a[1];
    ((point[0] - a[0]) * ex + (point[1] - a[1]) * ey) / (ex * ex + ey * ey)
}

/// Edge-interior control point that keeps the normal derivative along the
/// edge `edge[0]..edge[3]` linear. `inner_a`/`inner_b` are the control points
/// one row towards the centroid next to each end.
fn edge_interior(s: f64, edge: [f64; 4], inner_a: f64, inner_b: f64) -> f64 {
    let [a0, a1, a2, a3] = edge;
    (-s * (-a0 + 3.0 * a1 - 3.0 * a2 + a3) + (-a0 + 2.0 * a1 - a2) + inner_a + inner_b) / 2.0
}

/// Cubic Bézier triangle at weights `(u, v, w)`.
///
/// Control points ordered `[c300, c030, c003, c210, c201, c120, c021, c102,
/// c012, c111]`.
fn cubic_bezier(b: [f64; 3], c: [f64; 10]) -> f64 {
    let [u, v, w] = b;
    u * u * u * c[0]
        + v * v * v * c[1]
        + w * w * w * c[2]
        + 3.0 * u * u * v * c[3]
        + 3.0 * u * u * w * c[4]
        + 3.0 * u * v * v * c[5]
        + 3.0 * v * v * w * c[6]
        + 3.0 * u * w * w * c[7]
        + 3.0 * v * w * w * c[8]
        + 6.0 * u * v * w * c[9]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patch_for(f: impl Fn(f64, f64) -> f64, grad: impl Fn(f64, f64) -> [f64; 2]) -> TrianglePatch {
        let p = [[0.0, 0.0], [3.0, 0.5], [1.0, 2.5]];
        TrianglePatch::new(
            p,
            p.map(|q| f(q[0], q[1])),
            p.map(|q| grad(q[0], q[1])),
        )
    }

    #[test]
    fn test_patch_interpolates_vertices() {
        let patch = patch_for(|x, y| x * x + y, |x, _| [2.0 * x, 1.0]);
        assert!((patch.evaluate([1.0, 0.0, 0.0]) - 0.0).abs() < 1e-12);
        assert!((patch.evaluate([0.0, 1.0, 0.0]) - 9.5).abs() < 1e-12);
        assert!((patch.evaluate([0.0, 0.0, 1.0]) - 3.5).abs() < 1e-12);
    }

    #[test]
    fn test_patch_reproduces_quadratics() {
        // Cubic patches with exact vertex gradients reproduce quadratics
        let f = |x: f64, y: f64| 1.0 + 2.0 * x - y + 0.5 * x * x + x * y - 0.25 * y * y;
        let grad = |x: f64, y: f64| [2.0 + x + y, -1.0 + x - 0.5 * y];
        let patch = patch_for(f, grad);
        let p = [[0.0, 0.0], [3.0, 0.5], [1.0, 2.5]];

        for b in [
            [1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0],
            [0.6, 0.3, 0.1],
            [0.1, 0.2, 0.7],
            [0.05, 0.9, 0.05],
        ] {
            let x = b[0] * p[0][0] + b[1] * p[1][0] + b[2] * p[2][0];
            let y = b[0] * p[0][1] + b[1] * p[1][1] + b[2] * p[2][1];
            let got = patch.evaluate(b);
            assert!((got - f(x, y)).abs() < 1e-9, "at {:?}: {} vs {}", b, got, f(x, y));
        }
    }

    #[test]
    fn test_sub_triangles_agree_on_shared_edges() {
        let patch = patch_for(|x, y| (x * 1.3).sin() + y * y, |x, y| [1.3 * (x * 1.3).cos(), 2.0 * y]);
        // Points on the segment from vertex 0 to the centroid are shared by
        // the sub-triangles opposite vertices 1 and 2.
        for t in [0.1, 0.4, 0.8] {
            let b0 = 1.0 - 2.0 * t / 3.0;
            let b = (1.0 - b0) / 2.0;
            let left = patch.evaluate([b0, b + 1e-13, b]);
            let right = patch.evaluate([b0, b, b + 1e-13]);
            assert!((left - right).abs() < 1e-9);
        }
    }

    #[test]
    fn test_edge_interior_symmetry() {
        let forward = edge_interior(0.5, [1.0, 2.0, 4.0, 3.0], 0.5, 1.5);
        let backward = edge_interior(0.5, [3.0, 4.0, 2.0, 1.0], 1.5, 0.5);
        assert!((forward - backward).abs() < 1e-12);
    }
}
