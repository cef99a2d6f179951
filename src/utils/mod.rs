//! Utility functions shared by the pipeline stages
//!
//! Arrow column helpers, store I/O and logging/progress reporting.

pub mod arrow;
pub mod io;
pub mod logging;

pub use io::{read_parquet, replace_file, write_parquet};
