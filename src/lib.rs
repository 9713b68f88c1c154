//! # synoptic
//!
//! Regrids GFS forecast fields onto a fixed lon/lat grid and assembles them
//! into a time-ordered animation sequence.
//!
//! For each hour offset around an anchor model run the pipeline fetches the
//! 500 hPa geopotential height, 850 hPa temperature and mean sea level
//! pressure, resamples them onto one shared uniform grid, and bundles the
//! three panels into a labelled frame.
//!
//! ## Key Features
//!
//! - **Past and future in one strip**: negative offsets use the analysis of an
//!   earlier run, positive offsets use forecast hours of the anchor run
//! - **Smooth regridding**: Clough–Tocher cubic interpolation over a Delaunay
//!   triangulation, never extrapolating past the sample hull
//! - **Failure isolation**: a missing or broken snapshot drops one frame, not
//!   the run
//! - **Fixed color domains**: every frame of a quantity shares one color scale
//!
//! ## Architecture
//!
//! - **Time index**: offsets to (issue-time, lead-hour) requests
//! - **Source**: GRIB2 retrieval and decoding
//! - **Interpolation**: scattered samples to the uniform grid
//! - **Sequence**: per-offset pipelines, ordering and threshold checks
//! - **Render**: JSON and PNG sinks

pub mod colormaps;
pub mod config;
pub mod error;
pub mod field;
pub mod frame;
pub mod grid;
pub mod interpolation;
pub mod logging;
pub mod render;
pub mod sequence;
pub mod source;
pub mod time_index;

pub use config::Config;
pub use error::{Result, SynopticError};
pub use field::{Panels, Quantity, ScatteredField, UnitConversion};
pub use frame::{Frame, FrameAssembler, LabelFormatter};
pub use grid::{BoundingBox, RegriddedField, UniformGrid};
pub use logging::{
    generate_run_id, init_tracing, log_error, log_offset_skipped, log_operation_end,
    log_operation_start, log_sequence_stats, log_timed_operation,
};
pub use sequence::{FrameSequence, OffsetOutcome, PipelineSettings, SequenceBuilder, SkippedOffset};
pub use time_index::ForecastRequest;
