//! Wage parsing and annualization.
//!
//! Pay units in the disclosure data are free text ("Hour", "Bi-Weekly",
//! "Year", ...). They are classified by ordered substring rules rather than
//! exact matching, and the first matching rule wins. Two consequences are
//! kept on purpose:
//!
//! * `"Bi-Weekly"` contains `week`, which is checked before `bi`, so it is
//!   annualized at 52 periods per year.
//! * `"Bi-Monthly"` matches `bi` and is annualized at 24 periods, the same as
//!   semi-monthly.
//!
//! A missing or unrecognized unit means the amount is already annual.

use arrow::array::{Array, ArrayRef, AsArray, Float64Array, StringArray};
use arrow::compute::kernels::cast;
use arrow::datatypes::{DataType, Float64Type};
use serde::Serialize;

use crate::error::{LcaError, Result};

/// Standard full-time hours per year (40 hours x 52 weeks)
pub const HOURS_PER_YEAR: f64 = 40.0 * 52.0;

/// A single raw wage cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WageInput<'a> {
    /// Empty cell
    Missing,
    /// Cell already stored as a number
    Number(f64),
    /// Cell stored as text, possibly with `$` and thousands separators
    Text(&'a str),
}

impl<'a> From<Option<&'a str>> for WageInput<'a> {
    fn from(value: Option<&'a str>) -> Self {
        value.map_or(Self::Missing, Self::Text)
    }
}

impl From<Option<f64>> for WageInput<'_> {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::Missing, Self::Number)
    }
}

/// Parse a raw wage cell into a number
///
/// Text has `$` and `,` removed and surrounding whitespace trimmed before
/// parsing. Numbers pass through unchanged. Missing, unparseable or
/// non-finite text yields `None`.
#[must_use]
pub fn clean_wage(input: WageInput<'_>) -> Option<f64> {
    match input {
        WageInput::Missing => None,
        WageInput::Number(value) => (!value.is_nan()).then_some(value),
        WageInput::Text(text) => {
            let cleaned = text.replace(['$', ','], "");
            cleaned
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
        }
    }
}

/// Pay period classification of a unit text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WageUnit {
    Hour,
    Week,
    BiWeek,
    Month,
    Year,
    Unknown,
}

/// Substring rules in priority order
const UNIT_RULES: [(&str, WageUnit); 6] = [
    ("hour", WageUnit::Hour),
    ("week", WageUnit::Week),
    ("bi", WageUnit::BiWeek),
    ("semi", WageUnit::BiWeek),
    ("month", WageUnit::Month),
    ("year", WageUnit::Year),
];

impl WageUnit {
    /// Classify a free-text pay unit; first matching rule wins
    #[must_use]
    pub fn classify(unit: Option<&str>) -> Self {
        let Some(unit) = unit else {
            return Self::Unknown;
        };
        let unit = unit.to_lowercase();
        UNIT_RULES
            .iter()
            .find(|(needle, _)| unit.contains(needle))
            .map_or(Self::Unknown, |(_, kind)| *kind)
    }

    /// Pay periods per year
    #[must_use]
    pub const fn multiplier(self) -> f64 {
        match self {
            Self::Hour => HOURS_PER_YEAR,
            Self::Week => 52.0,
            Self::BiWeek => 24.0,
            Self::Month => 12.0,
            Self::Year | Self::Unknown => 1.0,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Week => "week",
            Self::BiWeek => "bi-week",
            Self::Month => "month",
            Self::Year => "year",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for WageUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Convert a per-unit amount to an annual figure
#[must_use]
pub fn annualize(amount: Option<f64>, unit: Option<&str>) -> Option<f64> {
    amount.map(|value| value * WageUnit::classify(unit).multiplier())
}

/// Offered wage over prevailing wage; `None` when either side is missing
/// or the prevailing wage is zero
#[must_use]
pub fn wage_ratio(annual_wage: Option<f64>, annual_prevailing: Option<f64>) -> Option<f64> {
    match (annual_wage, annual_prevailing) {
        (Some(wage), Some(prevailing)) if prevailing != 0.0 => Some(wage / prevailing),
        _ => None,
    }
}

/// Apply [`clean_wage`] to a whole raw column
///
/// Text columns are parsed value by value; numeric columns are cast to
/// `Float64` unchanged; an all-null column stays all null.
///
/// # Errors
/// Returns `LcaError::Processing` for column types that can hold neither text
/// nor numbers.
pub fn clean_wage_column(array: &ArrayRef) -> Result<Float64Array> {
    let cleaned = match array.data_type() {
        DataType::Utf8 => array
            .as_string::<i32>()
            .iter()
            .map(|value| clean_wage(value.into()))
            .collect(),
        DataType::LargeUtf8 => array
            .as_string::<i64>()
            .iter()
            .map(|value| clean_wage(value.into()))
            .collect(),
        DataType::Null => Float64Array::new_null(array.len()),
        data_type if data_type.is_numeric() => {
            let numbers = cast::cast(array, &DataType::Float64)?;
            numbers
                .as_primitive::<Float64Type>()
                .iter()
                .map(|value| clean_wage(value.into()))
                .collect()
        }
        other => {
            return Err(LcaError::Processing(format!(
                "wage column has unsupported type {other:?}"
            )));
        }
    };
    Ok(cleaned)
}

/// Annualize a cleaned wage column against its unit column
#[must_use]
pub fn annualize_column(amounts: &Float64Array, units: &StringArray) -> Float64Array {
    amounts
        .iter()
        .zip(units.iter())
        .map(|(amount, unit)| annualize(amount, unit))
        .collect()
}

/// Row-wise [`wage_ratio`]
#[must_use]
pub fn wage_ratio_column(annual_wage: &Float64Array, annual_prevailing: &Float64Array) -> Float64Array {
    annual_wage
        .iter()
        .zip(annual_prevailing.iter())
        .map(|(wage, prevailing)| wage_ratio(wage, prevailing))
        .collect()
}
