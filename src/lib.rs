//! Acquisition, normalization and validation of DOL LCA (H-1B) disclosure
//! data.
//!
//! A [`DataSource`] resolves the published record set from a processed
//! Parquet store, a raw extract on disk, or a fresh download, running the
//! [`Pipeline`] and the [`DatasetValidator`] as needed.

pub mod config;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod normalize;
pub mod pipeline;
pub mod reader;
pub mod schema;
pub mod source;
pub mod summary;
pub mod utils;
pub mod validation;

// Re-export the most common types for easier use
pub use config::PipelineConfig;
pub use dataset::{LcaDataset, LcaRecord};
pub use error::{LcaError, Result};
pub use filter::{BatchFilter, DisplayFilters, FilterThresholds, RecordFilter};
pub use normalize::{WageUnit, annualize, canonical_soc_code, clean_wage};
pub use pipeline::{Pipeline, PipelineOutput, PipelineReport};
pub use reader::{read_raw_extract, read_raw_file};
pub use schema::{SchemaCompatibilityReport, SchemaIssue, processed_schema};
pub use source::{DataSource, HttpSource, RemoteSource, Tier};
pub use summary::SummaryReport;
pub use validation::{DatasetValidator, RecordSetValidator, ValidationMode, ValidationReport};

// Arrow types
pub use arrow::datatypes::Schema as ArrowSchema;
pub use arrow::record_batch::RecordBatch;
