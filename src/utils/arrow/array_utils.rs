//! Utilities for extracting typed columns from record batches.
//!
//! Raw extracts do not agree on encodings: a spreadsheet may store a state
//! code as text in one file and a status flag as a boolean in another. These
//! helpers cast to the type a stage works with instead of failing on the
//! first unexpected encoding.

use arrow::array::{Array, ArrayRef, AsArray, Float64Array, StringArray};
use arrow::compute::kernels::cast;
use arrow::datatypes::{DataType, Float64Type};
use arrow::record_batch::RecordBatch;

use crate::error::{LcaError, Result};

fn column<'a>(batch: &'a RecordBatch, column_name: &str) -> Result<&'a ArrayRef> {
    batch
        .column_by_name(column_name)
        .ok_or_else(|| LcaError::Schema(format!("column '{column_name}' not found")))
}

/// Cast any array to a Utf8 `StringArray`
pub fn to_string_array(array: &ArrayRef) -> Result<StringArray> {
    if array.data_type() == &DataType::Utf8 {
        return Ok(array.as_string::<i32>().clone());
    }
    let converted = cast::cast(array, &DataType::Utf8)?;
    Ok(converted.as_string::<i32>().clone())
}

/// Get a required column as text
///
/// # Errors
/// Returns `LcaError::Schema` when the column is absent, or an Arrow error
/// when it cannot be represented as text.
pub fn string_column(batch: &RecordBatch, column_name: &str) -> Result<StringArray> {
    to_string_array(column(batch, column_name)?)
}

/// Get a column as text, or an all-null column when it is absent
pub fn optional_string_column(batch: &RecordBatch, column_name: &str) -> Result<StringArray> {
    match batch.column_by_name(column_name) {
        Some(array) => to_string_array(array),
        None => {
            log::debug!("Column '{column_name}' not present, using nulls");
            Ok(StringArray::new_null(batch.num_rows()))
        }
    }
}

/// Get a required column as `Float64`
pub fn float_column(batch: &RecordBatch, column_name: &str) -> Result<Float64Array> {
    let array = column(batch, column_name)?;
    if array.data_type() == &DataType::Float64 {
        return Ok(array.as_primitive::<Float64Type>().clone());
    }
    let converted = cast::cast(array, &DataType::Float64)?;
    Ok(converted.as_primitive::<Float64Type>().clone())
}

/// Number of null or blank values in a text column
#[must_use]
pub fn count_null_or_blank(array: &StringArray) -> usize {
    array
        .iter()
        .filter(|value| value.is_none_or(|s| s.trim().is_empty()))
        .count()
}
