//! Module for decoding raw LCA extracts into record batches.
//!
//! The DOL publishes the disclosure data as an `.xlsx` workbook; CSV exports
//! of the same table are accepted too. The format is decided by content, not
//! file name: a ZIP signature means a workbook, anything else is read as CSV.
//!
//! Only the known LCA columns are kept. Text columns are decoded as text
//! whatever the cell type. Wage columns stay numeric when every cell in the
//! workbook is a number and fall back to text otherwise, so the wage
//! normalizer sees the values exactly as the extract stored them.

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::compute::concat_batches;
use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use calamine::{Data, Reader, Xlsx};
use itertools::Itertools;

use crate::error::util::safe_read_bytes;
use crate::error::{LcaError, Result};
use crate::schema::{RAW_OPTIONAL_COLUMNS, RAW_REQUIRED_COLUMNS, WAGE_COLUMNS};
use crate::utils::logging::{log_operation_complete, log_operation_start, log_warning};

/// Rows sampled when sniffing CSV headers
const CSV_SCHEMA_SAMPLE: usize = 100;

const ZIP_SIGNATURE: [u8; 4] = [0x50, 0x4b, 0x03, 0x04];

/// Encoding of a raw extract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractFormat {
    Xlsx,
    Csv,
}

impl ExtractFormat {
    /// Detect the format from the leading bytes
    #[must_use]
    pub fn detect(bytes: &[u8]) -> Self {
        if bytes.starts_with(&ZIP_SIGNATURE) {
            Self::Xlsx
        } else {
            Self::Csv
        }
    }
}

/// A single decoded cell
#[derive(Debug, Clone, PartialEq)]
enum RawCell {
    Text(String),
    Number(f64),
}

impl RawCell {
    fn from_data(cell: &Data) -> Option<Self> {
        match cell {
            Data::Empty | Data::Error(_) => None,
            Data::String(s) if s.trim().is_empty() => None,
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
                Some(Self::Text(s.clone()))
            }
            Data::Int(i) => Some(Self::Number(*i as f64)),
            Data::Float(f) => Some(Self::Number(*f)),
            Data::DateTime(dt) => Some(Self::Number(dt.as_f64())),
            Data::Bool(b) => Some(Self::Text(if *b { "True" } else { "False" }.to_string())),
        }
    }

    fn to_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => n.to_string(),
        }
    }
}

/// Header text as matched against column names: without a leading byte order
/// mark or surrounding whitespace
fn header_name(header: &str) -> &str {
    header.trim_start_matches('\u{feff}').trim()
}

/// Every known raw column, required ones first
fn known_columns() -> impl Iterator<Item = &'static str> {
    RAW_REQUIRED_COLUMNS
        .iter()
        .chain(RAW_OPTIONAL_COLUMNS.iter())
        .copied()
}

/// Positions of the known columns within `headers`, in known-column order
///
/// Absent columns are logged and skipped; raw validation decides whether the
/// extract is usable without them.
fn project_known_columns(headers: &[String]) -> Vec<(&'static str, usize)> {
    known_columns()
        .filter_map(|name| {
            match headers.iter().position(|header| header_name(header) == name) {
                Some(index) => Some((name, index)),
                None => {
                    log_warning(&format!("Column {name} not found in raw extract, skipping"), None);
                    None
                }
            }
        })
        .collect_vec()
}

/// Decode a raw extract held in memory
pub fn read_raw_extract(bytes: &[u8]) -> Result<RecordBatch> {
    match ExtractFormat::detect(bytes) {
        ExtractFormat::Xlsx => read_xlsx(bytes),
        ExtractFormat::Csv => read_csv(bytes),
    }
}

/// Decode the raw extract stored at `path`
pub fn read_raw_file(path: &Path) -> Result<RecordBatch> {
    let start = Instant::now();
    log_operation_start("Reading raw extract", path);

    let bytes = safe_read_bytes(path, "reading the raw store")?;
    let batch = read_raw_extract(&bytes)?;

    log_operation_complete("decoded", path, batch.num_rows(), Some(start.elapsed()));
    Ok(batch)
}

/// Decode the first worksheet of an `.xlsx` workbook; its first row is the header
fn read_xlsx(bytes: &[u8]) -> Result<RecordBatch> {
    let mut workbook = Xlsx::new(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| LcaError::Processing("workbook has no worksheets".to_string()))??;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(RecordBatch::new_empty(Arc::new(Schema::empty())));
    };
    let headers = header_row
        .iter()
        .map(|cell| RawCell::from_data(cell).map(|c| c.to_text()).unwrap_or_default())
        .collect_vec();
    let projection = project_known_columns(&headers);

    let height = range.height().saturating_sub(1);
    let mut cells: Vec<Vec<Option<RawCell>>> =
        vec![Vec::with_capacity(height); projection.len()];
    for row in rows {
        for (slot, (_, index)) in projection.iter().enumerate() {
            cells[slot].push(row.get(*index).and_then(RawCell::from_data));
        }
    }

    let mut fields = Vec::with_capacity(projection.len());
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(projection.len());
    for ((name, _), column) in projection.iter().zip(cells) {
        let all_numeric = column
            .iter()
            .flatten()
            .all(|cell| matches!(cell, RawCell::Number(_)));

        if WAGE_COLUMNS.contains(name) && all_numeric {
            fields.push(Field::new(*name, DataType::Float64, true));
            columns.push(Arc::new(
                column
                    .iter()
                    .map(|cell| match cell {
                        Some(RawCell::Number(n)) => Some(*n),
                        _ => None,
                    })
                    .collect::<Float64Array>(),
            ));
        } else {
            fields.push(Field::new(*name, DataType::Utf8, true));
            columns.push(Arc::new(
                column
                    .iter()
                    .map(|cell| cell.as_ref().map(RawCell::to_text))
                    .collect::<StringArray>(),
            ));
        }
    }

    Ok(RecordBatch::try_new_with_options(
        Arc::new(Schema::new(fields)),
        columns,
        &arrow::record_batch::RecordBatchOptions::new().with_row_count(Some(height)),
    )?)
}

/// Decode a CSV extract with a header row; every column is read as text
fn read_csv(bytes: &[u8]) -> Result<RecordBatch> {
    let format = Format::default().with_header(true);
    let (inferred, _) = format.infer_schema(Cursor::new(bytes), Some(CSV_SCHEMA_SAMPLE))?;
    let schema = Arc::new(Schema::new(
        inferred
            .fields()
            .iter()
            .map(|f| Field::new(header_name(f.name()), DataType::Utf8, true))
            .collect_vec(),
    ));

    let reader = ReaderBuilder::new(schema.clone())
        .with_header(true)
        .build(Cursor::new(bytes))?;
    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    let table = concat_batches(&schema, &batches)?;

    let headers = schema.fields().iter().map(|f| f.name().clone()).collect_vec();
    let projection = project_known_columns(&headers);
    let indices = projection.iter().map(|(_, index)| *index).collect_vec();
    Ok(table.project(&indices)?)
}
