//! Piecewise linear interpolation over the triangulation.
//!
//! Continuous but not smooth; mostly useful as a cheap preview and as a
//! reference for the cubic method.

use ndarray::Array2;

use super::mesh::Mesh;
use super::Interpolator;
use crate::grid::UniformGrid;

/// Barycentric (linear) interpolator
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearInterpolator;

impl Interpolator for LinearInterpolator {
    fn interpolate(&self, mesh: &Mesh, values: &[f64], grid: &UniformGrid) -> Array2<f64> {
        let mut out = Array2::from_elem(grid.shape(), f64::NAN);
        for (row, col, lon, lat) in grid.points() {
            if let Some(location) = mesh.locate(lon, lat) {
                let t = mesh.triangles()[location.triangle];
                out[[row, col]] = (0..3).map(|k| location.weights[k] * values[t[k]]).sum();
            }
        }
        out
    }

    fn name(&self) -> &str {
        "linear"
    }
}
