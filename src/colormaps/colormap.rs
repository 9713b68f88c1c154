//! Colormap trait and utilities.
//!
//! This module defines the common interface for all colormaps.

use colorgrad::{CustomGradient, Gradient};

use crate::config::ColorDomain;
use crate::error::{Result, SynopticError};

/// Trait for color mapping implementations
pub trait Colormap {
    /// Map a normalized value (0.0 to 1.0) to an RGBA color
    fn map_normalized(&self, value: f64) -> [u8; 4];

    /// Map a value to an RGBA color given the data range
    fn map(&self, value: f64, min: f64, max: f64) -> [u8; 4] {
        let normalized = if max > min {
            ((value - min) / (max - min)).clamp(0.0, 1.0)
        } else {
            0.5
        };
        self.map_normalized(normalized)
    }

    /// Get the name of this colormap
    fn name(&self) -> &str;
}

/// A colormap backed by a `colorgrad` gradient over `0..=1`.
pub struct GradientColormap {
    name: String,
    gradient: Gradient,
    reversed: bool,
}

impl GradientColormap {
    pub fn new(name: &str, gradient: Gradient, reversed: bool) -> Self {
        Self {
            name: name.to_string(),
            gradient,
            reversed,
        }
    }
}

impl Colormap for GradientColormap {
    fn map_normalized(&self, value: f64) -> [u8; 4] {
        let t = value.clamp(0.0, 1.0);
        let t = if self.reversed { 1.0 - t } else { t };
        self.gradient.at(t).to_rgba8()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Get the colormap for a color domain.
///
/// Names ending in `_r` are reversed. `pressure` is a dark-blue / white /
/// gold scale whose white point sits at the domain midpoint.
pub fn get_colormap(domain: &ColorDomain) -> Result<Box<dyn Colormap>> {
    let name = domain.colormap.to_lowercase();
    let (base, reversed) = match name.strip_suffix("_r") {
        Some(base) => (base.to_string(), true),
        None => (name.clone(), false),
    };

    let gradient = match base.as_str() {
        "viridis" => colorgrad::viridis(),
        "plasma" => colorgrad::plasma(),
        "inferno" => colorgrad::inferno(),
        "magma" => colorgrad::magma(),
        "cividis" => colorgrad::cividis(),
        "turbo" => colorgrad::turbo(),
        "rdbu" => colorgrad::rd_bu(),
        "spectral" => colorgrad::spectral(),
        "pressure" => pressure_gradient(domain)?,
        _ => {
            return Err(SynopticError::InvalidParameter {
                param: "colormap".to_string(),
                message: format!("Unknown colormap: {}", domain.colormap),
            })
        }
    };

    Ok(Box::new(GradientColormap::new(&name, gradient, reversed)))
}

fn pressure_gradient(domain: &ColorDomain) -> Result<Gradient> {
    let mid = domain.midpoint.unwrap_or((domain.min + domain.max) / 2.0);
    let mid_norm = ((mid - domain.min) / (domain.max - domain.min)).clamp(0.0, 1.0);

    CustomGradient::new()
        .html_colors(&["darkblue", "white", "gold"])
        .domain(&[0.0, mid_norm, 1.0])
        .build()
        .map_err(|e| SynopticError::InvalidParameter {
            param: "colormap".to_string(),
            message: format!("Cannot build pressure colormap: {}", e),
        })
}

/// Snap a value down to its contour band, so filled panels show discrete
/// steps of `step` starting at `min`.
pub fn contour_band(value: f64, min: f64, step: f64) -> f64 {
    if step > 0.0 {
        min + ((value - min) / step).floor() * step
    } else {
        value
    }
}
