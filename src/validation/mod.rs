//! Structural and statistical checks on LCA record sets.
//!
//! The validator only judges; it never removes rows. A `false` verdict means
//! the record set must not be trusted or persisted.

use arrow::array::{Array, AsArray};
use arrow::datatypes::Float64Type;
use arrow::record_batch::RecordBatch;
use serde::Serialize;

use crate::config::{MIN_ROWS, PipelineConfig};
use crate::filter::FilterThresholds;
use crate::schema::{
    ANNUAL_PREVAILING_WAGE, ANNUAL_WAGE, RAW_REQUIRED_COLUMNS, REQUIRED_NON_EMPTY, SchemaIssue,
    WAGE_RATIO, check_processed_schema, check_required_columns,
};
use crate::utils::arrow::array_utils::{count_null_or_blank, string_column};

/// Which stage's expectations a record set is checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Input to the pipeline: every input column is present
    Raw,
    /// Output of the pipeline: the published invariants hold
    Processed,
}

impl std::fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Raw => f.write_str("raw"),
            Self::Processed => f.write_str("processed"),
        }
    }
}

/// One broken expectation
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    Schema(SchemaIssue),
    TooFewRows { actual: usize, required: usize },
    MissingRequiredValues { column: String, rows: usize },
    OutOfRange { column: String, rows: usize, min: f64, max: f64 },
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Schema(issue) => write!(f, "{issue}"),
            Self::TooFewRows { actual, required } => {
                write!(f, "{actual} records, at least {required} required")
            }
            Self::MissingRequiredValues { column, rows } => {
                write!(f, "{rows} records have no value for '{column}'")
            }
            Self::OutOfRange {
                column,
                rows,
                min,
                max,
            } => write!(f, "{rows} records have '{column}' outside [{min}, {max}]"),
        }
    }
}

/// Every issue found in one validation pass
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub mode: ValidationMode,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// Issues joined into one line for error messages
    #[must_use]
    pub fn summary(&self) -> String {
        if self.issues.is_empty() {
            return format!("{} record set is valid", self.mode);
        }
        let issues = self
            .issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        format!("{} record set is invalid: {issues}", self.mode)
    }
}

/// The seam between record set producers and the checks that gate them
pub trait RecordSetValidator: Send + Sync {
    /// Check `batch`; never panics or errors, `false` means do not trust it
    fn validate(&self, batch: &RecordBatch, mode: ValidationMode) -> bool;
}

/// Thresholds the processed checks enforce
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationRules {
    pub min_rows: usize,
    pub thresholds: FilterThresholds,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            min_rows: MIN_ROWS,
            thresholds: FilterThresholds::default(),
        }
    }
}

/// Checks raw input completeness and processed output invariants
#[derive(Debug, Clone, Default)]
pub struct DatasetValidator {
    rules: ValidationRules,
}

impl DatasetValidator {
    #[must_use]
    pub const fn new(rules: ValidationRules) -> Self {
        Self { rules }
    }

    #[must_use]
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(ValidationRules {
            min_rows: config.min_rows,
            thresholds: config.thresholds,
        })
    }

    #[must_use]
    pub const fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    /// Run every check for `mode` and collect the issues
    #[must_use]
    pub fn report(&self, batch: &RecordBatch, mode: ValidationMode) -> ValidationReport {
        let issues = match mode {
            ValidationMode::Raw => self.raw_issues(batch),
            ValidationMode::Processed => self.processed_issues(batch),
        };
        ValidationReport { mode, issues }
    }

    fn raw_issues(&self, batch: &RecordBatch) -> Vec<ValidationIssue> {
        check_required_columns(&batch.schema(), &RAW_REQUIRED_COLUMNS)
            .issues
            .into_iter()
            .map(ValidationIssue::Schema)
            .collect()
    }

    fn processed_issues(&self, batch: &RecordBatch) -> Vec<ValidationIssue> {
        let schema_report = check_processed_schema(&batch.schema());
        if !schema_report.compatible {
            // Value checks need the published types
            return schema_report
                .issues
                .into_iter()
                .map(ValidationIssue::Schema)
                .collect();
        }

        let mut issues = Vec::new();
        if batch.num_rows() < self.rules.min_rows {
            issues.push(ValidationIssue::TooFewRows {
                actual: batch.num_rows(),
                required: self.rules.min_rows,
            });
        }

        let thresholds = &self.rules.thresholds;
        for (column, min, max) in [
            (ANNUAL_WAGE, thresholds.min_wage, thresholds.max_wage),
            (ANNUAL_PREVAILING_WAGE, thresholds.min_wage, thresholds.max_wage),
            (WAGE_RATIO, thresholds.min_ratio, thresholds.max_ratio),
        ] {
            let rows = out_of_range_rows(batch, column, min, max);
            if rows > 0 {
                issues.push(ValidationIssue::OutOfRange {
                    column: column.to_string(),
                    rows,
                    min,
                    max,
                });
            }
        }

        for column in REQUIRED_NON_EMPTY {
            let rows = match string_column(batch, column) {
                Ok(values) => count_null_or_blank(&values),
                Err(_) => batch.num_rows(),
            };
            if rows > 0 {
                issues.push(ValidationIssue::MissingRequiredValues {
                    column: column.to_string(),
                    rows,
                });
            }
        }

        issues
    }
}

/// Rows whose value is null or outside `[min, max]`
fn out_of_range_rows(batch: &RecordBatch, column: &str, min: f64, max: f64) -> usize {
    let Some(values) = batch
        .column_by_name(column)
        .and_then(|array| array.as_primitive_opt::<Float64Type>())
    else {
        return batch.num_rows();
    };
    (0..values.len())
        .filter(|&row| values.is_null(row) || !(min..=max).contains(&values.value(row)))
        .count()
}

impl RecordSetValidator for DatasetValidator {
    fn validate(&self, batch: &RecordBatch, mode: ValidationMode) -> bool {
        let report = self.report(batch, mode);
        for issue in &report.issues {
            log::warn!("{mode} validation: {issue}");
        }
        report.is_valid()
    }
}
