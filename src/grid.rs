//! The uniform target grid and fields resampled onto it.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SynopticError};
use crate::field::Quantity;

/// Geographic bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }

    /// Grow the box by `margin` degrees on every side.
    pub fn expanded(&self, margin: f64) -> Self {
        Self {
            min_lon: self.min_lon - margin,
            min_lat: self.min_lat - margin,
            max_lon: self.max_lon + margin,
            max_lat: self.max_lat + margin,
        }
    }

    pub fn center_lon(&self) -> f64 {
        (self.min_lon + self.max_lon) / 2.0
    }
}

/// A fixed rectangular lattice of lon/lat points.
///
/// Both axes include their bounding-box edges. Built once per run and shared
/// read-only by every regridding call so that all panels of all frames line
/// up cell for cell.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformGrid {
    bbox: BoundingBox,
    lons: Vec<f64>,
    lats: Vec<f64>,
}

impl UniformGrid {
    pub fn new(bbox: BoundingBox, nx: usize, ny: usize) -> Result<Self> {
        if nx < 2 || ny < 2 {
            return Err(SynopticError::Config {
                message: format!("Grid needs at least 2 points per axis, got {}x{}", nx, ny),
            });
        }
        if !(bbox.min_lon < bbox.max_lon) || !(bbox.min_lat < bbox.max_lat) {
            return Err(SynopticError::Config {
                message: format!("Invalid grid bounding box: {:?}", bbox),
            });
        }

        Ok(Self {
            bbox,
            lons: linspace(bbox.min_lon, bbox.max_lon, nx),
            lats: linspace(bbox.min_lat, bbox.max_lat, ny),
        })
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    /// Longitudes of the grid columns, ascending
    pub fn lons(&self) -> &[f64] {
        &self.lons
    }

    /// Latitudes of the grid rows, ascending
    pub fn lats(&self) -> &[f64] {
        &self.lats
    }

    pub fn nx(&self) -> usize {
        self.lons.len()
    }

    pub fn ny(&self) -> usize {
        self.lats.len()
    }

    /// Array shape `(rows, cols)` = `(ny, nx)`
    pub fn shape(&self) -> (usize, usize) {
        (self.ny(), self.nx())
    }

    /// Iterate `(row, col, lon, lat)` in row-major order.
    pub fn points(&self) -> impl Iterator<Item = (usize, usize, f64, f64)> + '_ {
        self.lats.iter().enumerate().flat_map(move |(row, &lat)| {
            self.lons
                .iter()
                .enumerate()
                .map(move |(col, &lon)| (row, col, lon, lat))
        })
    }
}

fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    let step = (end - start) / (n - 1) as f64;
    (0..n)
        .map(|i| {
            if i == n - 1 {
                end
            } else {
                start + step * i as f64
            }
        })
        .collect()
}

/// A scalar field on a [`UniformGrid`]; NaN marks cells with no value.
#[derive(Debug, Clone, PartialEq)]
pub struct RegriddedField {
    pub quantity: Quantity,
    pub unit: String,
    pub values: Array2<f64>,
}

impl RegriddedField {
    /// Value at `(row, col)`, or None where interpolation was undefined
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.values
            .get((row, col))
            .copied()
            .filter(|v| !v.is_nan())
    }

    /// Number of cells holding a value
    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_nan()).count()
    }

    /// Minimum and maximum of the defined cells
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}
