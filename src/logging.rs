//! Logging utilities for the synoptic pipeline.
//!
//! Structured `tracing` helpers so that runs, skipped offsets and sequence
//! outcomes are searchable by field rather than by message text.

use std::time::Instant;
use tracing::{debug, error, info, warn};

use uuid::Uuid;

use crate::error::SynopticError;
use crate::time_index::ForecastRequest;

/// Initialize the tracing subscriber with the given log level
pub fn init_tracing(log_level: &str) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(val) => val,
        Err(_) => log_level.to_string(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();
}

/// Log a start message for a significant operation
pub fn log_operation_start(operation: &str, details: Option<&str>) {
    if let Some(details) = details {
        info!(
            operation = operation,
            details = details,
            "Starting operation"
        );
    } else {
        info!(operation = operation, "Starting operation");
    }
}

/// Log the completion of a significant operation
pub fn log_operation_end(operation: &str, start_time: Instant, success: bool) {
    let duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;

    if success {
        info!(
            operation = operation,
            duration_ms = duration_ms,
            "Operation completed successfully"
        );
    } else {
        warn!(
            operation = operation,
            duration_ms = duration_ms,
            "Operation failed"
        );
    }
}

/// Run `f`, logging its duration under a fresh run id.
pub fn log_timed_operation<F, R>(operation: &str, f: F) -> R
where
    F: FnOnce() -> R,
{
    let start = Instant::now();
    let run_id = generate_run_id();

    debug!(
        operation = operation,
        run_id = %run_id,
        "Starting operation"
    );

    let result = f();

    info!(
        operation = operation,
        run_id = %run_id,
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Operation completed"
    );

    result
}

/// Log an offset that produced no frame
pub fn log_offset_skipped(request: &ForecastRequest, reason: &SynopticError) {
    warn!(
        offset = request.offset,
        issue_time = %request.issue_time,
        lead_hours = request.lead_hours,
        reason = %reason,
        "Skipping offset"
    );
}

/// Log the outcome of sequence building
pub fn log_sequence_stats(requested: usize, built: usize, skipped: usize, required: usize) {
    if built >= required {
        info!(
            operation = "build_sequence",
            requested = requested,
            built = built,
            skipped = skipped,
            required = required,
            "Frame sequence built"
        );
    } else {
        error!(
            operation = "build_sequence",
            requested = requested,
            built = built,
            skipped = skipped,
            required = required,
            "Too few frames built"
        );
    }
}

/// Log an error with context
pub fn log_error(error: &SynopticError, context: &str) {
    error!(
        error = %error,
        context = context,
        per_offset = error.is_per_offset(),
        "Error occurred"
    );
}

/// Generate a unique run ID
pub fn generate_run_id() -> String {
    Uuid::new_v4().to_string()
}
