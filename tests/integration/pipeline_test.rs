use arrow::array::{Array, Float64Array, StringArray};
use arrow::record_batch::RecordBatch;
use lca_pipeline::error::LcaError;
use lca_pipeline::schema::{
    ANNUAL_PREVAILING_WAGE, ANNUAL_WAGE, EMPLOYER_NAME, PREVAILING_WAGE, SOC_CODE, SOC_TITLE, WAGE_RATIO,
    WORKSITE_STATE, processed_schema,
};
use lca_pipeline::utils::{read_parquet, write_parquet};
use lca_pipeline::validation::ValidationRules;
use lca_pipeline::{
    DatasetValidator, FilterThresholds, LcaRecord, Pipeline, ValidationMode, read_raw_extract,
};

use crate::utils::{RAW_COLUMNS, RawRow, raw_batch, raw_batch_with_columns, raw_csv, valid_raw_rows};

fn strings<'a>(batch: &'a RecordBatch, column: &str) -> &'a StringArray {
    batch
        .column_by_name(column)
        .unwrap()
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap()
}

fn floats<'a>(batch: &'a RecordBatch, column: &str) -> &'a Float64Array {
    batch
        .column_by_name(column)
        .unwrap()
        .as_any()
        .downcast_ref::<Float64Array>()
        .unwrap()
}

fn lenient_validator() -> DatasetValidator {
    DatasetValidator::new(ValidationRules {
        min_rows: 1,
        ..ValidationRules::default()
    })
}

/// Three rows: kept, dropped for ratio, dropped for status
#[test]
fn test_three_row_extract_keeps_only_the_first() {
    let raw = raw_batch(&[
        RawRow::new("Acme", "$80,000", "Year").with_prevailing("$75,000", "Year"),
        RawRow::new("Globex", "$10,000", "Year").with_prevailing("$75,000", "Year"),
        RawRow::new("Initech", "$90,000", "Year")
            .with_prevailing("$75,000", "Year")
            .with_case_status("Denied"),
    ]);

    let output = Pipeline::default()
        .transform(&raw, &lenient_validator())
        .unwrap();

    assert!(output.valid);
    assert_eq!(output.batch.num_rows(), 1);
    assert_eq!(output.report.rows_in, 3);
    assert_eq!(output.report.rows_out, 1);
    assert_eq!(strings(&output.batch, EMPLOYER_NAME).value(0), "Acme");

    let ratio = floats(&output.batch, WAGE_RATIO).value(0);
    assert!((ratio - 80_000.0 / 75_000.0).abs() < 1e-12);
}

#[test]
fn test_output_has_published_schema_even_when_empty() {
    let raw = raw_batch(&[RawRow::new("Acme", "5", "Year")]);
    let (batch, _) = Pipeline::default().run(&raw).unwrap();
    assert_eq!(batch.num_rows(), 0);
    assert_eq!(batch.schema(), processed_schema());
}

#[test]
fn test_soc_codes_are_canonical_and_titles_first_seen() {
    let raw = raw_batch(&[
        RawRow::new("Acme", "120000", "Year").with_soc(Some("11-1011.00"), Some("Chief Executives")),
        RawRow::new("Acme", "120000", "Year").with_soc(Some("11-1011"), Some("CEOs")),
        RawRow::new("Acme", "120000", "Year").with_soc(Some(" 15-1132.01 "), None),
        RawRow::new("Acme", "120000", "Year").with_soc(Some("15-1132.01"), Some("Software Developers, Applications")),
    ]);

    let (batch, report) = Pipeline::default().run(&raw).unwrap();
    let codes = strings(&batch, SOC_CODE);
    let titles = strings(&batch, SOC_TITLE);

    assert_eq!(codes.value(0), "11-1011");
    assert_eq!(codes.value(1), "11-1011");
    assert_eq!(codes.value(2), "15-1132.01");
    assert_eq!(titles.value(0), "Chief Executives");
    assert_eq!(titles.value(1), "Chief Executives");
    // First non-null title wins, even when it appears on a later row
    assert_eq!(titles.value(2), "Software Developers, Applications");
    assert_eq!(report.soc_titles, 2);
}

#[test]
fn test_hourly_and_monthly_wages_are_annualized() {
    let raw = raw_batch(&[
        RawRow::new("Acme", "$55.00", "Hour"),
        RawRow::new("Acme", "9,000", "Month").with_prevailing("8000", "Month"),
    ]);

    let (batch, _) = Pipeline::default().run(&raw).unwrap();
    let annual = floats(&batch, ANNUAL_WAGE);
    let prevailing = floats(&batch, ANNUAL_PREVAILING_WAGE);

    assert_eq!(annual.value(0), 114_400.0);
    assert_eq!(prevailing.value(0), 100_000.0);
    assert_eq!(annual.value(1), 108_000.0);
    assert_eq!(prevailing.value(1), 96_000.0);
}

#[test]
fn test_every_published_record_is_in_bounds() {
    let mut rows = valid_raw_rows(40);
    rows.push(RawRow::new("Tiny", "9000", "Year").with_prevailing("9500", "Year"));
    rows.push(RawRow::new("Huge", "20000000", "Year").with_prevailing("15000000", "Year"));
    rows.push(RawRow::new("Generous", "600000", "Year"));
    rows.push(RawRow::new("PartTime", "100000", "Year").with_full_time(Some("N")));
    rows.push(RawRow::new("Unknown", "100000", "Year").with_full_time(None));
    rows.push(RawRow::new("NoWage", "", "Year"));

    let thresholds = FilterThresholds::default();
    let (batch, report) = Pipeline::new(thresholds).run(&raw_batch(&rows)).unwrap();
    assert_eq!(report.rows_out, 40);

    for record in LcaRecord::from_batch(&batch).unwrap() {
        assert!(thresholds.wage_in_bounds(record.annual_wage));
        assert!(thresholds.wage_in_bounds(record.annual_prevailing_wage));
        assert!(thresholds.ratio_in_bounds(record.wage_ratio));
    }
}

#[test]
fn test_runs_are_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let raw = raw_batch(&valid_raw_rows(120));
    let first = dir.path().join("first.parquet");
    let second = dir.path().join("second.parquet");

    let (batch, _) = Pipeline::default().run(&raw).unwrap();
    write_parquet(&first, &batch).unwrap();
    let (batch, _) = Pipeline::default().run(&raw).unwrap();
    write_parquet(&second, &batch).unwrap();

    assert_eq!(std::fs::read(&first).unwrap(), std::fs::read(&second).unwrap());
    assert_eq!(read_parquet(&first).unwrap().num_rows(), 120);
}

#[test]
fn test_csv_extract_runs_end_to_end() {
    let rows = valid_raw_rows(150);
    let raw = read_raw_extract(&raw_csv(&rows)).unwrap();

    let validator = DatasetValidator::default();
    assert!(validator.report(&raw, ValidationMode::Raw).is_valid());

    let output = Pipeline::default().transform(&raw, &validator).unwrap();
    assert!(output.valid, "{}", validator.report(&output.batch, ValidationMode::Processed).summary());
    assert_eq!(output.batch.num_rows(), 150);
    assert!(strings(&output.batch, WORKSITE_STATE).iter().all(|s| s.is_some()));
}

#[test]
fn test_missing_input_column_aborts_with_processing_error() {
    let columns = RAW_COLUMNS
        .iter()
        .copied()
        .filter(|c| *c != PREVAILING_WAGE)
        .collect::<Vec<_>>();
    let raw = raw_batch_with_columns(&valid_raw_rows(3), &columns);

    let err = Pipeline::default().run(&raw).unwrap_err();
    assert!(matches!(err, LcaError::Processing(_)));
}

#[test]
fn test_null_required_values_fail_processed_validation() {
    let mut rows = valid_raw_rows(3);
    rows.push(RawRow::new("x", "100000", "Year").without_employer());

    let output = Pipeline::default()
        .transform(&raw_batch(&rows), &lenient_validator())
        .unwrap();

    // The pipeline keeps the row; only validation rejects it
    assert_eq!(output.batch.num_rows(), 4);
    assert!(output.batch.column_by_name(EMPLOYER_NAME).unwrap().is_null(3));
    assert!(!output.valid);
}
