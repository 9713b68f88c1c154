//! Scattered-data regridding onto the uniform target grid.
//!
//! Samples are Delaunay-triangulated in lon/lat space and an interpolant is
//! evaluated at every grid point. Grid points outside the convex hull of the
//! samples are left as NaN; nothing is extrapolated.

pub mod clough_tocher;
pub mod gradient;
pub mod linear;
pub mod mesh;

use ndarray::Array2;
use tracing::debug;

use crate::error::{Result, SynopticError};
use crate::field::ScatteredField;
use crate::grid::{RegriddedField, UniformGrid};

pub use clough_tocher::CloughTocherInterpolator;
pub use gradient::{estimate_gradients, GradientOptions};
pub use linear::LinearInterpolator;
pub use mesh::Mesh;

/// Minimum number of usable samples for any interpolation
pub const MIN_SAMPLES: usize = 4;

/// Trait for triangulation-based interpolation methods
pub trait Interpolator: Send + Sync {
    /// Evaluate the interpolant of `values` (one per mesh vertex) on every
    /// grid point. Points outside the mesh must be NaN.
    fn interpolate(&self, mesh: &Mesh, values: &[f64], grid: &UniformGrid) -> Array2<f64>;

    /// Get the name of this interpolation method
    fn name(&self) -> &str;
}

/// Get an interpolator by name
pub fn get_interpolator(name: &str, gradient_options: GradientOptions) -> Result<Box<dyn Interpolator>> {
    match name.to_lowercase().as_str() {
        "cubic" => Ok(Box::new(CloughTocherInterpolator::new(gradient_options))),
        "linear" => Ok(Box::new(LinearInterpolator)),
        _ => Err(SynopticError::InvalidParameter {
            param: "interpolation".to_string(),
            message: format!("Unknown interpolation method: {}", name),
        }),
    }
}

/// Resample one scattered field onto `grid`.
///
/// Fails with `InsufficientSamples` when fewer than [`MIN_SAMPLES`] distinct
/// finite samples remain or when they do not span any triangle. Coincident
/// samples count once and only one of their values is used.
pub fn regrid(
    field: &ScatteredField,
    grid: &UniformGrid,
    interpolator: &dyn Interpolator,
) -> Result<RegriddedField> {
    let mut points = Vec::with_capacity(field.len());
    let mut values = Vec::with_capacity(field.len());
    for ((&lon, &lat), &value) in field.lons.iter().zip(&field.lats).zip(&field.values) {
        if lon.is_finite() && lat.is_finite() && value.is_finite() {
            points.push([lon, lat]);
            values.push(value);
        }
    }

    let insufficient = |message: String| SynopticError::InsufficientSamples {
        quantity: field.quantity,
        message,
    };

    if points.len() < MIN_SAMPLES {
        return Err(insufficient(format!(
            "{} usable samples, at least {} required",
            points.len(),
            MIN_SAMPLES
        )));
    }

    let sample_count = points.len();
    let mesh = Mesh::new(points)
        .ok_or_else(|| insufficient(format!("{} samples are collinear or coincident", sample_count)))?;

    let vertex_count = mesh.vertex_count();
    if vertex_count < MIN_SAMPLES {
        return Err(insufficient(format!(
            "{} distinct non-collinear samples out of {}, at least {} required",
            vertex_count, sample_count, MIN_SAMPLES
        )));
    }

    debug!(
        quantity = %field.quantity,
        samples = sample_count,
        vertices = vertex_count,
        triangles = mesh.triangles().len(),
        method = interpolator.name(),
        "Triangulated samples"
    );

    let values = interpolator.interpolate(&mesh, &values, grid);

    Ok(RegriddedField {
        quantity: field.quantity,
        unit: field.unit.clone(),
        values,
    })
}
