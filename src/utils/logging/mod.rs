//! Logging and console output
//!
//! Structured log messages for store access and pipeline stages, spinners for
//! blocking work, and plain-text summaries for the command line.

pub mod console;
pub mod log;
pub mod progress;

// Re-export commonly used functions
pub use self::log::{log_operation_complete, log_operation_start, log_stage, log_warning};
pub use progress::{create_spinner, finish_spinner};
