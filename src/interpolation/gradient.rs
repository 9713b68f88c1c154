//! Vertex gradient estimation for the cubic interpolant.
//!
//! Gradients are chosen to minimize the summed squared second derivative of
//! the cubic edge curves over the whole triangulation (Nielson's global
//! method), solved by Gauss-Seidel sweeps over the vertices in index order.

use super::mesh::Mesh;

/// Stopping criteria for the gradient iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientOptions {
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for GradientOptions {
    fn default() -> Self {
        Self {
            max_iterations: 400,
            tolerance: 1e-6,
        }
    }
}

/// Estimate `[df/dx, df/dy]` at every mesh vertex.
///
/// Vertices that are not part of any triangle (duplicates dropped by the
/// triangulation) keep a zero gradient.
pub fn estimate_gradients(mesh: &Mesh, values: &[f64], options: &GradientOptions) -> Vec<[f64; 2]> {
    let points = mesh.points();
    let neighbors = mesh.vertex_neighbors();
    let mut gradients = vec![[0.0f64; 2]; points.len()];

    for _ in 0..options.max_iterations {
        let mut max_change = 0.0f64;

        for (i, adjacent) in neighbors.iter().enumerate() {
            if adjacent.is_empty() {
                continue;
            }

            let mut q = [[0.0f64; 2]; 2];
            let mut s = [0.0f64; 2];
            for &j in adjacent {
                let ex = points[j][0] - points[i][0];
                let ey = points[j][1] - points[i][1];
                let length = (ex * ex + ey * ey).sqrt();
                if length == 0.0 {
                    continue;
                }
                let l3 = length * length * length;

                let df_j = -ex * gradients[j][0] - ey * gradients[j][1];
                let rhs = 6.0 * (values[i] - values[j]) - 2.0 * df_j;

                q[0][0] += 4.0 * ex * ex / l3;
                q[0][1] += 4.0 * ex * ey / l3;
                q[1][1] += 4.0 * ey * ey / l3;
                s[0] += rhs * ex / l3;
                s[1] += rhs * ey / l3;
            }
            q[1][0] = q[0][1];

            let det = q[0][0] * q[1][1] - q[0][1] * q[1][0];
            if det.abs() <= f64::EPSILON * (q[0][0].abs() + q[1][1].abs()).max(f64::MIN_POSITIVE) {
                continue;
            }
            let r0 = (q[1][1] * s[0] - q[0][1] * s[1]) / det;
            let r1 = (-q[1][0] * s[0] + q[0][0] * s[1]) / det;

            let change = (gradients[i][0] + r0).abs().max((gradients[i][1] + r1).abs())
                / 1.0f64.max(r0.abs()).max(r1.abs());
            gradients[i] = [-r0, -r1];
            max_change = max_change.max(change);
        }

        if max_change < options.tolerance {
            break;
        }
    }

    gradients
}
