//! Single-document JSON output.
//!
//! Field values are written row-major, south to north, with NaN as `null`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use super::FrameSink;
use crate::config::ColorDomain;
use crate::error::Result;
use crate::field::Panels;
use crate::frame::Frame;
use crate::grid::{BoundingBox, RegriddedField};
use crate::sequence::{FrameSequence, SkippedOffset};

#[derive(Serialize)]
struct SequenceDocument<'a> {
    anchor: DateTime<Utc>,
    bbox: &'a BoundingBox,
    lons: &'a [f64],
    lats: &'a [f64],
    color_domains: &'a Panels<ColorDomain>,
    frames: Vec<FrameDocument<'a>>,
    skipped: &'a [SkippedOffset],
}

#[derive(Serialize)]
struct FrameDocument<'a> {
    label: &'a str,
    offset: i32,
    issue_time: DateTime<Utc>,
    lead_hours: u32,
    valid_time: DateTime<Utc>,
    fields: Panels<FieldDocument<'a>>,
}

#[derive(Serialize)]
struct FieldDocument<'a> {
    unit: &'a str,
    values: Vec<Vec<Option<f64>>>,
}

impl<'a> FrameDocument<'a> {
    fn new(frame: &'a Frame) -> Self {
        Self {
            label: &frame.label,
            offset: frame.offset,
            issue_time: frame.issue_time,
            lead_hours: frame.lead_hours,
            valid_time: frame.valid_time,
            fields: frame.fields.as_ref().map(|_, field| FieldDocument::new(field)),
        }
    }
}

impl<'a> FieldDocument<'a> {
    fn new(field: &'a RegriddedField) -> Self {
        let values = field
            .values
            .rows()
            .into_iter()
            .map(|row| row.iter().map(|&v| v.is_finite().then_some(v)).collect())
            .collect();
        Self {
            unit: &field.unit,
            values,
        }
    }
}

/// Writes the whole sequence to one JSON file.
pub struct JsonSink {
    path: PathBuf,
}

impl JsonSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

/// Serialize a sequence to any writer.
pub fn write_sequence<W: Write>(writer: W, sequence: &FrameSequence) -> Result<()> {
    let document = SequenceDocument {
        anchor: sequence.anchor,
        bbox: sequence.grid.bbox(),
        lons: sequence.grid.lons(),
        lats: sequence.grid.lats(),
        color_domains: &sequence.color_domains,
        frames: sequence.frames.iter().map(FrameDocument::new).collect(),
        skipped: &sequence.skipped,
    };
    serde_json::to_writer(writer, &document)?;
    Ok(())
}

impl FrameSink for JsonSink {
    fn write(&mut self, sequence: &FrameSequence) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(&self.path)?);
        write_sequence(&mut writer, sequence)?;
        writer.flush()?;

        info!(
            path = %self.path.display(),
            frames = sequence.frames.len(),
            "Wrote JSON frame sequence"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "json"
    }
}
