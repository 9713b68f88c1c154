//! Ordered frame sequences across a list of hour offsets.
//!
//! Each offset runs fetch, unit conversion, crop, regrid ×3 and assembly in
//! isolation. A failing offset becomes an [`OffsetOutcome::Skipped`] and the
//! remaining offsets keep going; only the final frame count can fail a run.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::config::{ColorDomain, Config};
use crate::error::{Result, SynopticError};
use crate::field::{Panels, UnitConversion};
use crate::frame::{Frame, FrameAssembler, LabelFormatter};
use crate::grid::UniformGrid;
use crate::interpolation::{get_interpolator, regrid, GradientOptions, Interpolator};
use crate::logging::{log_offset_skipped, log_sequence_stats};
use crate::source::SourceLoader;
use crate::time_index::{forecast_requests, ForecastRequest};

/// Result of processing a single offset.
#[derive(Debug)]
pub enum OffsetOutcome {
    Built(Frame),
    Skipped {
        request: ForecastRequest,
        reason: SynopticError,
    },
}

/// Record of an offset that produced no frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedOffset {
    pub offset: i32,
    pub issue_time: DateTime<Utc>,
    pub lead_hours: u32,
    pub reason: String,
}

/// Frames in offset order plus everything a renderer needs.
#[derive(Debug, Clone)]
pub struct FrameSequence {
    pub anchor: DateTime<Utc>,
    /// The builder's grid, shared rather than copied
    pub grid: Arc<UniformGrid>,
    pub frames: Vec<Frame>,
    /// Copied from configuration, never derived from frame data
    pub color_domains: Panels<ColorDomain>,
    pub skipped: Vec<SkippedOffset>,
}

impl FrameSequence {
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.frames.iter().map(|f| f.label.as_str())
    }
}

/// Pipeline settings that do not depend on the data source.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub conversions: Panels<UnitConversion>,
    pub color_domains: Panels<ColorDomain>,
    pub min_frames: usize,
    pub sample_margin_deg: f64,
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            conversions: config.conversions.clone(),
            color_domains: config.color_domains.clone(),
            min_frames: config.min_frames,
            sample_margin_deg: config.source.sample_margin_deg,
        }
    }
}

/// Collects outcomes in offset order and enforces label uniqueness.
struct FrameAccumulator {
    labels: HashSet<String>,
    frames: Vec<Frame>,
    skipped: Vec<SkippedOffset>,
}

impl FrameAccumulator {
    fn new() -> Self {
        Self {
            labels: HashSet::new(),
            frames: Vec::new(),
            skipped: Vec::new(),
        }
    }

    fn push(&mut self, outcome: OffsetOutcome) {
        match outcome {
            OffsetOutcome::Built(frame) => {
                if self.labels.insert(frame.label.clone()) {
                    self.frames.push(frame);
                } else {
                    let request = ForecastRequest {
                        offset: frame.offset,
                        issue_time: frame.issue_time,
                        lead_hours: frame.lead_hours,
                    };
                    self.skip(request, SynopticError::DuplicateFrameLabel { label: frame.label });
                }
            }
            OffsetOutcome::Skipped { request, reason } => self.skip(request, reason),
        }
    }

    fn skip(&mut self, request: ForecastRequest, reason: SynopticError) {
        log_offset_skipped(&request, &reason);
        self.skipped.push(SkippedOffset {
            offset: request.offset,
            issue_time: request.issue_time,
            lead_hours: request.lead_hours,
            reason: reason.to_string(),
        });
    }

    fn finish(
        self,
        anchor: DateTime<Utc>,
        grid: &Arc<UniformGrid>,
        settings: &PipelineSettings,
        requested: usize,
    ) -> Result<FrameSequence> {
        log_sequence_stats(
            requested,
            self.frames.len(),
            self.skipped.len(),
            settings.min_frames,
        );

        if self.frames.len() < settings.min_frames {
            return Err(SynopticError::InsufficientData {
                succeeded: self.frames.len(),
                requested,
                required: settings.min_frames,
            });
        }

        Ok(FrameSequence {
            anchor,
            grid: Arc::clone(grid),
            frames: self.frames,
            color_domains: settings.color_domains.clone(),
            skipped: self.skipped,
        })
    }
}

/// Builds frame sequences from a source loader onto one shared grid.
pub struct SequenceBuilder {
    loader: Arc<dyn SourceLoader>,
    grid: Arc<UniformGrid>,
    interpolator: Arc<dyn Interpolator>,
    assembler: FrameAssembler,
    settings: PipelineSettings,
}

impl SequenceBuilder {
    pub fn new(
        loader: Arc<dyn SourceLoader>,
        grid: UniformGrid,
        interpolator: Arc<dyn Interpolator>,
        assembler: FrameAssembler,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            loader,
            grid: Arc::new(grid),
            interpolator,
            assembler,
            settings,
        }
    }

    /// Wire a builder from validated configuration.
    pub fn from_config(config: &Config, loader: Arc<dyn SourceLoader>) -> Result<Self> {
        let grid = UniformGrid::new(config.grid.bbox, config.grid.nx, config.grid.ny)?;
        let interpolator: Arc<dyn Interpolator> = Arc::from(get_interpolator(
            &config.regrid.method,
            GradientOptions {
                max_iterations: config.regrid.max_iterations,
                tolerance: config.regrid.tolerance,
            },
        )?);
        let assembler = FrameAssembler::new(LabelFormatter::new(&config.labels)?);

        Ok(Self::new(
            loader,
            grid,
            interpolator,
            assembler,
            PipelineSettings::from_config(config),
        ))
    }

    pub fn grid(&self) -> &Arc<UniformGrid> {
        &self.grid
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Produce the frame for one request.
    pub fn process_offset(&self, request: &ForecastRequest) -> Result<Frame> {
        let start = Instant::now();
        let raw = self
            .loader
            .fetch(request.issue_time, request.lead_hours)
            .map_err(|e| match e {
                fetch @ SynopticError::Fetch { .. } => fetch,
                other => SynopticError::Fetch {
                    message: other.to_string(),
                },
            })?;

        let sample_bbox = self.grid.bbox().expanded(self.settings.sample_margin_deg);
        let fields = raw.map(|quantity, field| {
            let field = field
                .converted(self.settings.conversions.get(quantity))
                .cropped(&sample_bbox);
            match regrid(&field, &self.grid, self.interpolator.as_ref()) {
                Ok(regridded) => Some(regridded),
                Err(e) => {
                    warn!(
                        offset = request.offset,
                        quantity = %quantity,
                        error = %e,
                        "Regridding failed"
                    );
                    None
                }
            }
        });

        let frame = self.assembler.assemble(request, fields)?;
        debug!(
            offset = request.offset,
            label = %frame.label,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Frame assembled"
        );
        Ok(frame)
    }

    fn outcome(&self, request: ForecastRequest) -> OffsetOutcome {
        match self.process_offset(&request) {
            Ok(frame) => OffsetOutcome::Built(frame),
            Err(reason) => OffsetOutcome::Skipped { request, reason },
        }
    }

    /// Process every offset in order on the calling thread.
    pub fn build(&self, anchor: DateTime<Utc>, offsets: &[i32]) -> Result<FrameSequence> {
        let requests = forecast_requests(anchor, offsets);
        let mut accumulator = FrameAccumulator::new();
        for request in requests {
            accumulator.push(self.outcome(request));
        }
        accumulator.finish(anchor, &self.grid, &self.settings, offsets.len())
    }

    /// Process offsets on up to `workers` blocking tasks at once.
    ///
    /// Frames come out in the same order as `build` would produce them.
    pub async fn build_concurrent(
        self: Arc<Self>,
        anchor: DateTime<Utc>,
        offsets: &[i32],
        workers: usize,
    ) -> Result<FrameSequence> {
        let requests = forecast_requests(anchor, offsets);
        let semaphore = Arc::new(Semaphore::new(workers.max(1)));
        let mut tasks = Vec::with_capacity(requests.len());

        for (index, request) in requests.into_iter().enumerate() {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| SynopticError::Worker {
                    message: e.to_string(),
                })?;
            let builder = Arc::clone(&self);
            let handle = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                builder.outcome(request)
            });
            tasks.push((index, request, handle));
        }

        let mut outcomes = Vec::with_capacity(tasks.len());
        for (index, request, handle) in tasks {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                Err(e) => OffsetOutcome::Skipped {
                    request,
                    reason: SynopticError::Worker {
                        message: e.to_string(),
                    },
                },
            };
            outcomes.push((index, outcome));
        }
        outcomes.sort_by_key(|(index, _)| *index);

        let mut accumulator = FrameAccumulator::new();
        for (_, outcome) in outcomes {
            accumulator.push(outcome);
        }
        accumulator.finish(anchor, &self.grid, &self.settings, offsets.len())
    }
}
