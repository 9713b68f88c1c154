//! Output sinks for finished frame sequences.

pub mod json;
pub mod png;

use crate::config::OutputConfig;
use crate::error::{Result, SynopticError};
use crate::sequence::FrameSequence;

pub use json::JsonSink;
pub use png::PngSink;

/// Trait for anything that consumes a finished sequence
pub trait FrameSink {
    fn write(&mut self, sequence: &FrameSequence) -> Result<()>;

    /// Get the name of this sink
    fn name(&self) -> &str;
}

/// Get the sink for the configured output format
pub fn sink_for(config: &OutputConfig) -> Result<Box<dyn FrameSink>> {
    match config.format.to_lowercase().as_str() {
        "json" => Ok(Box::new(JsonSink::new(&config.path))),
        "png" => Ok(Box::new(PngSink::new(&config.path, config.pixel_scale))),
        _ => Err(SynopticError::InvalidParameter {
            param: "format".to_string(),
            message: format!("Unsupported output format: {}", config.format),
        }),
    }
}
