//! Logging utilities
//!
//! Consistent message shapes for store access and pipeline stages.

use std::path::Path;
use std::time::Duration;

/// Log an operation start with consistent format
///
/// # Arguments
/// * `operation` - Description of the operation
/// * `path` - Path of the store file being operated on
pub fn log_operation_start(operation: &str, path: &Path) {
    log::info!("{} {}", operation, path.display());
}

/// Log an operation completion with consistent format
///
/// # Arguments
/// * `operation` - Past-tense description of the operation
/// * `path` - Path of the store file that was operated on
/// * `rows` - Number of records involved
/// * `elapsed` - Optional elapsed time
pub fn log_operation_complete(operation: &str, path: &Path, rows: usize, elapsed: Option<Duration>) {
    if let Some(duration) = elapsed {
        log::info!(
            "Successfully {} {} records at {} in {:?}",
            operation,
            rows,
            path.display(),
            duration
        );
    } else {
        log::info!(
            "Successfully {} {} records at {}",
            operation,
            rows,
            path.display()
        );
    }
}

/// Log a warning, optionally tied to a path
pub fn log_warning(message: &str, path: Option<&Path>) {
    if let Some(path) = path {
        log::warn!("{}: {}", message, path.display());
    } else {
        log::warn!("{message}");
    }
}

/// Log how many records a pipeline stage kept
pub fn log_stage(stage: &str, rows_in: usize, rows_out: usize) {
    if rows_in == rows_out {
        log::debug!("{stage}: {rows_out} records");
    } else {
        log::debug!(
            "{stage}: kept {rows_out} of {rows_in} records ({} dropped)",
            rows_in - rows_out
        );
    }
}
