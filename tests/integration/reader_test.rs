use arrow::array::{Array, Float64Array, StringArray};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use lca_pipeline::schema::{
    ANNUAL_WAGE, CASE_STATUS, EMPLOYER_NAME, PREVAILING_WAGE, SOC_CODE, WAGE_RATE_OF_PAY_FROM,
};
use lca_pipeline::{DatasetValidator, Pipeline, ValidationMode, read_raw_extract, read_raw_file};
use tempfile::TempDir;

use crate::utils::{Cell, RawRow, raw_csv, raw_xlsx, valid_raw_rows, xlsx};

fn column_type(batch: &RecordBatch, column: &str) -> DataType {
    batch
        .schema()
        .field_with_name(column)
        .unwrap()
        .data_type()
        .clone()
}

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

#[test]
fn test_workbook_headers_are_trimmed_and_unknown_columns_dropped() {
    let bytes = xlsx(&[
        vec![
            Cell::text(" CASE_STATUS "),
            Cell::text("NOTES"),
            Cell::text("EMPLOYER_NAME\t"),
        ],
        vec![Cell::text("Certified"), Cell::text("x"), Cell::text("Acme")],
        vec![Cell::text("Denied"), Cell::Empty, Cell::Empty],
    ]);

    let batch = read_raw_extract(&bytes).unwrap();

    let names = batch
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect::<Vec<_>>();
    assert_eq!(names, [CASE_STATUS, EMPLOYER_NAME]);
    assert_eq!(batch.num_rows(), 2);
    assert_eq!(strings(&batch, CASE_STATUS).value(1), "Denied");
    assert_eq!(strings(&batch, EMPLOYER_NAME).value(0), "Acme");
    assert!(strings(&batch, EMPLOYER_NAME).is_null(1));
}

#[test]
fn test_all_numeric_wage_column_stays_numeric() {
    let bytes = xlsx(&[
        vec![Cell::text(WAGE_RATE_OF_PAY_FROM), Cell::text(SOC_CODE)],
        vec![Cell::Number(85_000.0), Cell::text("15-1252.00")],
        vec![Cell::Empty, Cell::Number(151_252.0)],
        vec![Cell::Number(42.5), Cell::text("11-1011")],
    ]);

    let batch = read_raw_extract(&bytes).unwrap();

    assert_eq!(column_type(&batch, WAGE_RATE_OF_PAY_FROM), DataType::Float64);
    let wages = floats(&batch, WAGE_RATE_OF_PAY_FROM);
    assert_eq!(wages.value(0), 85_000.0);
    assert!(wages.is_null(1));
    assert_eq!(wages.value(2), 42.5);

    // Non-wage columns are text whatever the cell type
    assert_eq!(column_type(&batch, SOC_CODE), DataType::Utf8);
    assert_eq!(strings(&batch, SOC_CODE).value(1), "151252");
}

#[test]
fn test_mixed_wage_column_falls_back_to_text() {
    let bytes = xlsx(&[
        vec![Cell::text(PREVAILING_WAGE)],
        vec![Cell::text("$85,000")],
        vec![Cell::Number(85_000.0)],
    ]);

    let batch = read_raw_extract(&bytes).unwrap();

    assert_eq!(column_type(&batch, PREVAILING_WAGE), DataType::Utf8);
    let wages = strings(&batch, PREVAILING_WAGE);
    assert_eq!(wages.value(0), "$85,000");
    assert_eq!(wages.value(1), "85000");
}

#[test]
fn test_header_only_workbook_has_no_rows() {
    let bytes = xlsx(&[vec![Cell::text(CASE_STATUS), Cell::text(EMPLOYER_NAME)]]);

    let batch = read_raw_extract(&bytes).unwrap();

    assert_eq!(batch.num_rows(), 0);
    assert_eq!(batch.num_columns(), 2);
}

#[test]
fn test_workbook_extract_runs_end_to_end() {
    let mut rows = valid_raw_rows(120);
    rows.push(RawRow::new("Acme", "$45.00", "Hour"));
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("raw_h1b_data.xlsx");
    std::fs::write(&path, raw_xlsx(&rows)).unwrap();

    let raw = read_raw_file(&path).unwrap();
    // One text wage among numbers keeps the whole column as text
    assert_eq!(column_type(&raw, WAGE_RATE_OF_PAY_FROM), DataType::Utf8);
    assert_eq!(column_type(&raw, PREVAILING_WAGE), DataType::Float64);

    let validator = DatasetValidator::default();
    assert!(validator.report(&raw, ValidationMode::Raw).is_valid());
    let output = Pipeline::default().transform(&raw, &validator).unwrap();

    assert!(output.valid, "{}", validator.report(&output.batch, ValidationMode::Processed).summary());
    assert_eq!(output.batch.num_rows(), 121);
    assert_eq!(output.report.invalid_wages, 0);
    assert_eq!(floats(&output.batch, ANNUAL_WAGE).value(120), 93_600.0);
}

#[test]
fn test_workbook_and_csv_publish_the_same_records() {
    let rows = valid_raw_rows(110);
    let validator = DatasetValidator::default();

    let from_xlsx = Pipeline::default()
        .transform(&read_raw_extract(&raw_xlsx(&rows)).unwrap(), &validator)
        .unwrap();
    let from_csv = Pipeline::default()
        .transform(&read_raw_extract(&raw_csv(&rows)).unwrap(), &validator)
        .unwrap();

    assert!(from_xlsx.valid);
    assert_eq!(from_xlsx.batch, from_csv.batch);
}

#[test]
fn test_csv_header_byte_order_mark_is_ignored() {
    let mut bytes = "\u{feff}".as_bytes().to_vec();
    bytes.extend(raw_csv(&valid_raw_rows(2)));

    let batch = read_raw_extract(&bytes).unwrap();

    assert_eq!(batch.schema().field(0).name(), CASE_STATUS);
    assert_eq!(strings(&batch, CASE_STATUS).value(0), "Certified");
    assert!(
        DatasetValidator::default()
            .report(&batch, ValidationMode::Raw)
            .is_valid()
    );
}
