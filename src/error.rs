//! Error types for synoptic.
//!
//! Per-offset failures (`Fetch`, `InsufficientSamples`, `IncompleteFrame`,
//! `DuplicateFrameLabel`) are isolated by the sequence builder and only ever
//! show up as skipped offsets. `InsufficientData` is the run-level failure.

use thiserror::Error;

use crate::field::Quantity;

/// The main error type for synoptic operations.
#[derive(Error, Debug)]
pub enum SynopticError {
    /// Raw data for one offset could not be retrieved or decoded
    #[error("Fetch error: {message}")]
    Fetch { message: String },

    /// Too few (or degenerate) scattered samples to interpolate
    #[error("Insufficient samples for {quantity}: {message}")]
    InsufficientSamples { quantity: Quantity, message: String },

    /// One or more panels of a frame are missing
    #[error("Incomplete frame {label}: missing {}", format_quantities(.missing))]
    IncompleteFrame {
        label: String,
        missing: Vec<Quantity>,
    },

    /// Two frames resolved to the same display label
    #[error("Duplicate frame label: {label}")]
    DuplicateFrameLabel { label: String },

    /// A concurrent per-offset task did not complete
    #[error("Worker error: {message}")]
    Worker { message: String },

    /// Fewer frames succeeded than the configured threshold
    #[error("Insufficient data: {succeeded} of {requested} frames succeeded, at least {required} required")]
    InsufficientData {
        succeeded: usize,
        requested: usize,
        required: usize,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Invalid parameter errors
    #[error("Invalid parameter: {param} - {message}")]
    InvalidParameter { param: String, message: String },

    /// GRIB2 decoding errors
    #[error("GRIB error: {message}")]
    Grib { message: String },

    /// Rendering errors
    #[error("Render error: {message}")]
    Render { message: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Image encoding errors
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl SynopticError {
    /// Whether this error only affects a single offset.
    pub fn is_per_offset(&self) -> bool {
        matches!(
            self,
            SynopticError::Fetch { .. }
                | SynopticError::InsufficientSamples { .. }
                | SynopticError::IncompleteFrame { .. }
                | SynopticError::DuplicateFrameLabel { .. }
                | SynopticError::Worker { .. }
        )
    }
}

fn format_quantities(quantities: &[Quantity]) -> String {
    quantities
        .iter()
        .map(|q| q.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Convenience type alias for Results with SynopticError
pub type Result<T> = std::result::Result<T, SynopticError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incomplete_frame_message() {
        let err = SynopticError::IncompleteFrame {
            label: "01/02(火) 09:00 JST".to_string(),
            missing: vec![Quantity::Temperature850, Quantity::Mslp],
        };
        assert_eq!(
            err.to_string(),
            "Incomplete frame 01/02(火) 09:00 JST: missing 850hPa temperature, mean sea level pressure"
        );
    }

    #[test]
    fn test_per_offset_classification() {
        assert!(SynopticError::Fetch {
            message: "404".to_string()
        }
        .is_per_offset());
        assert!(!SynopticError::InsufficientData {
            succeeded: 1,
            requested: 9,
            required: 2
        }
        .is_per_offset());
    }
}
