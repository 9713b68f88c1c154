//! Colormap implementations for image generation.
//!
//! Matplotlib-style gradients from `colorgrad`, plus the custom pressure
//! scale.

pub mod colormap;

pub use colormap::{contour_band, get_colormap, Colormap, GradientColormap};
