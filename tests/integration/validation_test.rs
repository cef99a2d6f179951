use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array};
use arrow::datatypes::Schema;
use arrow::record_batch::RecordBatch;
use lca_pipeline::schema::{
    ANNUAL_WAGE, EMPLOYER_NAME, RAW_REQUIRED_COLUMNS, SOC_TITLE, SchemaIssue, WAGE_RATIO,
    WORKSITE_STATE,
};
use lca_pipeline::validation::{ValidationIssue, ValidationRules};
use lca_pipeline::{DatasetValidator, LcaRecord, RecordSetValidator, ValidationMode};

use crate::utils::{RAW_COLUMNS, raw_batch, raw_batch_with_columns, record, valid_raw_rows};

fn processed(n: usize) -> RecordBatch {
    let records = (0..n)
        .map(|i| record(&format!("Employer {i}"), "CA", "15-1252", 110_000.0 + i as f64))
        .collect::<Vec<_>>();
    LcaRecord::to_batch(&records).unwrap()
}

fn replace_column(batch: &RecordBatch, name: &str, array: ArrayRef) -> RecordBatch {
    let index = batch.schema().index_of(name).unwrap();
    let mut columns = batch.columns().to_vec();
    columns[index] = array;
    RecordBatch::try_new(batch.schema(), columns).unwrap()
}

fn validator(min_rows: usize) -> DatasetValidator {
    DatasetValidator::new(ValidationRules {
        min_rows,
        ..ValidationRules::default()
    })
}

#[test]
fn test_raw_mode_only_needs_input_columns() {
    let batch = raw_batch(&valid_raw_rows(2));
    let report = DatasetValidator::default().report(&batch, ValidationMode::Raw);
    assert!(report.is_valid(), "{}", report.summary());

    // Optional columns may be absent
    let columns = RAW_COLUMNS
        .iter()
        .copied()
        .filter(|c| *c != SOC_TITLE)
        .collect::<Vec<_>>();
    let without_title = raw_batch_with_columns(&valid_raw_rows(2), &columns);
    assert!(DatasetValidator::default().validate(&without_title, ValidationMode::Raw));
}

#[test]
fn test_raw_mode_reports_each_missing_column() {
    let batch = raw_batch_with_columns(&valid_raw_rows(2), &[EMPLOYER_NAME, WORKSITE_STATE]);
    let report = DatasetValidator::default().report(&batch, ValidationMode::Raw);
    assert_eq!(report.issues.len(), RAW_REQUIRED_COLUMNS.len() - 2);
    assert!(!DatasetValidator::default().validate(&batch, ValidationMode::Raw));
}

#[test]
fn test_processed_mode_accepts_a_clean_set() {
    assert!(DatasetValidator::default().validate(&processed(100), ValidationMode::Processed));
}

#[test]
fn test_processed_mode_enforces_row_floor() {
    let report = DatasetValidator::default().report(&processed(99), ValidationMode::Processed);
    assert_eq!(
        report.issues,
        vec![ValidationIssue::TooFewRows {
            actual: 99,
            required: 100
        }]
    );
}

#[test]
fn test_processed_mode_flags_out_of_band_values() {
    let batch = processed(5);
    let ratios = Arc::new(Float64Array::from(vec![1.0, 1.1, 6.0, 0.4, 1.2])) as ArrayRef;
    let batch = replace_column(&batch, WAGE_RATIO, ratios);

    let report = validator(1).report(&batch, ValidationMode::Processed);
    assert_eq!(report.issues.len(), 1);
    assert!(matches!(
        &report.issues[0],
        ValidationIssue::OutOfRange { column, rows: 2, .. } if column == WAGE_RATIO
    ));
}

#[test]
fn test_processed_mode_counts_null_wages_as_out_of_range() {
    let batch = processed(3);
    let wages = Arc::new(Float64Array::from(vec![Some(100_000.0), None, Some(5_000.0)])) as ArrayRef;
    let batch = replace_column(&batch, ANNUAL_WAGE, wages);

    let report = validator(1).report(&batch, ValidationMode::Processed);
    assert!(matches!(
        &report.issues[0],
        ValidationIssue::OutOfRange { column, rows: 2, .. } if column == ANNUAL_WAGE
    ));
}

#[test]
fn test_processed_mode_requires_every_published_column() {
    let batch = processed(3);
    let keep = (0..batch.num_columns())
        .filter(|&i| batch.schema().field(i).name() != WORKSITE_STATE)
        .collect::<Vec<_>>();
    let batch = batch.project(&keep).unwrap();

    let report = validator(1).report(&batch, ValidationMode::Processed);
    assert_eq!(
        report.issues,
        vec![ValidationIssue::Schema(SchemaIssue::MissingColumn(
            WORKSITE_STATE.to_string()
        ))]
    );
}

#[test]
fn test_empty_batch_is_never_valid_with_a_row_floor() {
    let batch = RecordBatch::new_empty(Arc::new(Schema::empty()));
    assert!(!DatasetValidator::default().validate(&batch, ValidationMode::Processed));
    assert!(!DatasetValidator::default().validate(&batch, ValidationMode::Raw));
}
