//! Error handling for the LCA pipeline.
//!
//! Value-level problems (an unparseable wage, an unknown pay unit) are never
//! errors: they turn into nulls that the record filter drops. The variants
//! below cover structural and I/O failures that abort a resolution attempt.

pub mod util;

use std::io;

use arrow::error::ArrowError;
use parquet::errors::ParquetError;

/// Specialized error type for the LCA pipeline
#[derive(Debug, thiserror::Error)]
pub enum LcaError {
    /// Error opening, reading or writing a store file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error reading or writing the processed Parquet artifact
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    /// Error building or transforming Arrow data
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Error decoding a spreadsheet extract
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::XlsxError),

    /// The remote extract could not be downloaded
    #[error("Download failed: {0}")]
    Fetch(String),

    /// A record set is missing columns the next stage needs
    #[error("Schema error: {0}")]
    Schema(String),

    /// Processed output broke one of the record set invariants
    #[error("Validation error: {0}")]
    Validation(String),

    /// The pipeline or the raw decoder failed unexpectedly
    #[error("Processing failed: {0}")]
    Processing(String),

    /// Invalid configuration value or file
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LcaError {
    /// Wrap any error as a single processing failure
    pub fn processing(error: impl std::fmt::Display) -> Self {
        Self::Processing(error.to_string())
    }

    /// Whether this error came from the network tier
    #[must_use]
    pub const fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch(_))
    }
}

impl From<reqwest::Error> for LcaError {
    fn from(error: reqwest::Error) -> Self {
        Self::Fetch(error.to_string())
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, LcaError>;
