//! synoptic - GFS forecast regridding and animation frame assembly
//!
//! This is the main entry point for the synoptic application.

use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use synoptic::render::sink_for;
use synoptic::source::{GfsHttpLoader, LocalGribLoader, SourceLoader};
use synoptic::time_index::anchor_time;
use synoptic::{
    init_tracing, log_error, log_operation_end, log_operation_start, log_timed_operation, Config,
    SequenceBuilder,
};

// The blocking HTTP client owns its own runtime and must not be dropped
// inside an async context, so the tokio runtime is only entered for the
// concurrent build and the builder outlives it.
fn main() -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    init_tracing(&config.log_level);
    info!("Starting synoptic v{}", env!("CARGO_PKG_VERSION"));

    let anchor = config.anchor.fixed.unwrap_or_else(|| {
        anchor_time(
            Utc::now(),
            config.anchor.cycle_hours,
            config.anchor.latency_hours,
        )
    });

    let center_lon = config.grid.bbox.center_lon();
    let loader: Arc<dyn SourceLoader> = match &config.source.local_dir {
        Some(dir) => Arc::new(LocalGribLoader::new(
            dir,
            &config.source.url_template,
            center_lon,
        )),
        None => Arc::new(
            GfsHttpLoader::new(&config.source, center_lon)
                .context("Failed to create HTTP client")?,
        ),
    };
    info!(
        loader = loader.name(),
        anchor = %anchor,
        offsets = ?config.offsets,
        workers = config.workers,
        "Configured pipeline"
    );

    let builder = Arc::new(
        SequenceBuilder::from_config(&config, loader).context("Failed to set up pipeline")?,
    );

    let start = Instant::now();
    log_operation_start("build_sequence", Some(&anchor.to_rfc3339()));
    let result = if config.workers > 1 {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("Failed to start tokio runtime")?;
        runtime.block_on(Arc::clone(&builder).build_concurrent(
            anchor,
            &config.offsets,
            config.workers,
        ))
    } else {
        builder.build(anchor, &config.offsets)
    };
    log_operation_end("build_sequence", start, result.is_ok());

    let sequence = match result {
        Ok(sequence) => sequence,
        Err(e) => {
            log_error(&e, "build_sequence");
            return Err(e).context("No animation produced");
        }
    };

    let mut sink = sink_for(&config.output)?;
    log_timed_operation("write_output", || sink.write(&sequence))
        .with_context(|| format!("Failed to write {}", config.output.path.display()))?;

    info!(
        frames = sequence.frames.len(),
        skipped = sequence.skipped.len(),
        output = %config.output.path.display(),
        "Done"
    );
    Ok(())
}
