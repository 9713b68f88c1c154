//! Synthetic GFS-like fields.
//!
//! Every field is linear in lon/lat so interpolated values can be checked
//! exactly. Raw units match the GRIB2 products (gpm, K, Pa).

use chrono::{DateTime, TimeZone, Utc};
use synoptic::config::{Config, GridConfig};
use synoptic::{BoundingBox, Panels, Quantity, ScatteredField};

/// Fixed anchor run used throughout the tests
pub fn anchor() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap()
}

/// Small target grid: 120..130°E, 30..40°N at 1°
pub fn test_grid_config() -> GridConfig {
    GridConfig {
        bbox: BoundingBox::new(120.0, 30.0, 130.0, 40.0),
        nx: 11,
        ny: 11,
    }
}

/// Default configuration shrunk to the test grid
pub fn test_config() -> Config {
    Config {
        grid: test_grid_config(),
        ..Config::default()
    }
}

/// Sample area comfortably covering the test grid and its crop margin
pub fn full_coverage() -> BoundingBox {
    BoundingBox::new(116.0, 26.0, 134.0, 44.0)
}

/// Raw value of `quantity` at a point. `hours` shifts the field so that
/// different snapshots are distinguishable.
pub fn raw_value(quantity: Quantity, lon: f64, lat: f64, hours: f64) -> f64 {
    match quantity {
        // gpm
        Quantity::Height500 => 5600.0 + 4.0 * (lon - 120.0) - 12.0 * (lat - 30.0) + hours,
        // K
        Quantity::Temperature850 => 283.15 + 0.2 * (lon - 120.0) - 1.5 * (lat - 30.0) + 0.1 * hours,
        // Pa
        Quantity::Mslp => 101200.0 + 30.0 * (lon - 120.0) - 50.0 * (lat - 30.0) + hours,
    }
}

pub fn raw_unit(quantity: Quantity) -> &'static str {
    match quantity {
        Quantity::Height500 => "gpm",
        Quantity::Temperature850 => "K",
        Quantity::Mslp => "Pa",
    }
}

/// A 0.5° lattice of samples over `coverage`.
pub fn lattice_field(
    quantity: Quantity,
    coverage: &BoundingBox,
    hours: f64,
) -> ScatteredField {
    let spacing = 0.5;
    let nx = ((coverage.max_lon - coverage.min_lon) / spacing).round() as usize + 1;
    let ny = ((coverage.max_lat - coverage.min_lat) / spacing).round() as usize + 1;

    let mut lons = Vec::with_capacity(nx * ny);
    let mut lats = Vec::with_capacity(nx * ny);
    let mut values = Vec::with_capacity(nx * ny);
    // GFS files run north to south
    for j in (0..ny).rev() {
        let lat = coverage.min_lat + j as f64 * spacing;
        for i in 0..nx {
            let lon = coverage.min_lon + i as f64 * spacing;
            lons.push(lon);
            lats.push(lat);
            values.push(raw_value(quantity, lon, lat, hours));
        }
    }

    ScatteredField::new(quantity, raw_unit(quantity), lons, lats, values).unwrap()
}

/// All three fields for one snapshot.
pub fn snapshot(coverage: &BoundingBox, hours: f64) -> Panels<ScatteredField> {
    Panels::from_fn(|quantity| lattice_field(quantity, coverage, hours))
}

/// Three samples only, too few to triangulate.
pub fn sparse_field(quantity: Quantity) -> ScatteredField {
    ScatteredField::new(
        quantity,
        raw_unit(quantity),
        vec![121.0, 125.0, 129.0],
        vec![31.0, 35.0, 31.0],
        vec![1.0, 2.0, 3.0],
    )
    .unwrap()
}
