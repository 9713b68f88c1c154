//! Quantities, per-panel containers and scattered source fields.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::grid::BoundingBox;

/// The three visualized quantities, in panel order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    /// 500 hPa geopotential height
    Height500,
    /// 850 hPa air temperature
    Temperature850,
    /// Mean sea level pressure
    Mslp,
}

impl Quantity {
    /// All quantities in panel order (top to bottom).
    pub const ALL: [Quantity; 3] = [Quantity::Height500, Quantity::Temperature850, Quantity::Mslp];

    /// Short machine-friendly key
    pub fn key(&self) -> &'static str {
        match self {
            Quantity::Height500 => "height_500",
            Quantity::Temperature850 => "temperature_850",
            Quantity::Mslp => "mslp",
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Quantity::Height500 => "500hPa geopotential height",
            Quantity::Temperature850 => "850hPa temperature",
            Quantity::Mslp => "mean sea level pressure",
        };
        f.write_str(name)
    }
}

/// One value per quantity.
///
/// Panels keep the three quantities in lock-step so that a frame, a set of
/// conversions or a set of color domains can never be partially populated.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Panels<T> {
    pub height_500: T,
    pub temperature_850: T,
    pub mslp: T,
}

impl<T> Panels<T> {
    pub fn new(height_500: T, temperature_850: T, mslp: T) -> Self {
        Self {
            height_500,
            temperature_850,
            mslp,
        }
    }

    /// Build panels by evaluating `f` for each quantity in panel order.
    pub fn from_fn(mut f: impl FnMut(Quantity) -> T) -> Self {
        Self {
            height_500: f(Quantity::Height500),
            temperature_850: f(Quantity::Temperature850),
            mslp: f(Quantity::Mslp),
        }
    }

    pub fn get(&self, quantity: Quantity) -> &T {
        match quantity {
            Quantity::Height500 => &self.height_500,
            Quantity::Temperature850 => &self.temperature_850,
            Quantity::Mslp => &self.mslp,
        }
    }

    pub fn get_mut(&mut self, quantity: Quantity) -> &mut T {
        match quantity {
            Quantity::Height500 => &mut self.height_500,
            Quantity::Temperature850 => &mut self.temperature_850,
            Quantity::Mslp => &mut self.mslp,
        }
    }

    /// Transform each panel, passing along its quantity.
    pub fn map<U>(self, mut f: impl FnMut(Quantity, T) -> U) -> Panels<U> {
        Panels {
            height_500: f(Quantity::Height500, self.height_500),
            temperature_850: f(Quantity::Temperature850, self.temperature_850),
            mslp: f(Quantity::Mslp, self.mslp),
        }
    }

    pub fn as_ref(&self) -> Panels<&T> {
        Panels {
            height_500: &self.height_500,
            temperature_850: &self.temperature_850,
            mslp: &self.mslp,
        }
    }

    /// Iterate `(quantity, value)` pairs in panel order.
    pub fn iter(&self) -> impl Iterator<Item = (Quantity, &T)> {
        [
            (Quantity::Height500, &self.height_500),
            (Quantity::Temperature850, &self.temperature_850),
            (Quantity::Mslp, &self.mslp),
        ]
        .into_iter()
    }
}

impl<T> Panels<Option<T>> {
    /// All three panels, or the quantities that are missing.
    pub fn transpose(self) -> std::result::Result<Panels<T>, Vec<Quantity>> {
        match (self.height_500, self.temperature_850, self.mslp) {
            (Some(height_500), Some(temperature_850), Some(mslp)) => Ok(Panels {
                height_500,
                temperature_850,
                mslp,
            }),
            (h, t, m) => {
                let mut missing = Vec::new();
                if h.is_none() {
                    missing.push(Quantity::Height500);
                }
                if t.is_none() {
                    missing.push(Quantity::Temperature850);
                }
                if m.is_none() {
                    missing.push(Quantity::Mslp);
                }
                Err(missing)
            }
        }
    }
}

impl<T, E> Panels<std::result::Result<T, E>> {
    /// All three values, or the first error in panel order.
    pub fn transpose_result(self) -> std::result::Result<Panels<T>, E> {
        Ok(Panels {
            height_500: self.height_500?,
            temperature_850: self.temperature_850?,
            mslp: self.mslp?,
        })
    }
}

/// Affine unit conversion `value * scale + offset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitConversion {
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default)]
    pub offset: f64,
    /// Unit label after conversion
    pub unit: String,
}

impl UnitConversion {
    pub fn identity(unit: &str) -> Self {
        Self {
            scale: 1.0,
            offset: 0.0,
            unit: unit.to_string(),
        }
    }

    pub fn apply(&self, value: f64) -> f64 {
        value * self.scale + self.offset
    }
}

fn default_scale() -> f64 {
    1.0
}

/// Scalar samples on an irregular (or flattened native) grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatteredField {
    pub quantity: Quantity,
    pub unit: String,
    pub lons: Vec<f64>,
    pub lats: Vec<f64>,
    pub values: Vec<f64>,
}

impl ScatteredField {
    /// Create a field, checking that the sample arrays are parallel.
    pub fn new(
        quantity: Quantity,
        unit: impl Into<String>,
        lons: Vec<f64>,
        lats: Vec<f64>,
        values: Vec<f64>,
    ) -> crate::Result<Self> {
        if lons.len() != lats.len() || lons.len() != values.len() {
            return Err(crate::SynopticError::InvalidParameter {
                param: quantity.key().to_string(),
                message: format!(
                    "Sample arrays differ in length: {} lons, {} lats, {} values",
                    lons.len(),
                    lats.len(),
                    values.len()
                ),
            });
        }
        Ok(Self {
            quantity,
            unit: unit.into(),
            lons,
            lats,
            values,
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Apply a unit conversion to every sample value.
    pub fn converted(self, conversion: &UnitConversion) -> Self {
        let values = self.values.iter().map(|&v| conversion.apply(v)).collect();
        Self {
            unit: conversion.unit.clone(),
            values,
            ..self
        }
    }

    /// Keep only the samples inside `bbox` (edges inclusive).
    pub fn cropped(self, bbox: &BoundingBox) -> Self {
        let mut lons = Vec::new();
        let mut lats = Vec::new();
        let mut values = Vec::new();
        for ((&lon, &lat), &value) in self.lons.iter().zip(&self.lats).zip(&self.values) {
            if bbox.contains(lon, lat) {
                lons.push(lon);
                lats.push(lat);
                values.push(value);
            }
        }
        Self {
            lons,
            lats,
            values,
            ..self
        }
    }
}

/// Wrap a longitude into `[center - 180, center + 180)`.
pub fn normalize_longitude(lon: f64, center: f64) -> f64 {
    let lower = center - 180.0;
    let wrapped = (lon - lower).rem_euclid(360.0) + lower;
    // rem_euclid can round up to exactly 360 for tiny negatives
    if wrapped >= center + 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}
