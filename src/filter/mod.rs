//! Filtering of LCA record batches
//!
//! Filters are composable [`BatchFilter`]s that compute a boolean mask over a
//! record batch. [`record`] holds the business rules the pipeline applies
//! before publishing a record set; [`display`] holds the narrowing predicates
//! a consumer applies to an already published set.

pub mod core;
pub mod display;
pub mod record;

pub use self::core::{AndFilter, BatchFilter, IncludeAllFilter, filter_record_batch};
pub use display::{DisplayFilters, EqualsFilter};
pub use record::{ContainsFilter, FilterThresholds, RangeFilter, RecordFilter};
