//! Business rules that decide which LCA records are published.
//!
//! A record is kept only if it is certified, full time, has both annualized
//! wages inside the wage bounds and a wage ratio inside the ratio band. The
//! rules are a pure conjunction; a failing record is dropped, never repaired.

use std::collections::HashSet;

use arrow::array::{Array, BooleanArray};
use arrow::record_batch::RecordBatch;
use serde::Serialize;

use crate::error::{LcaError, Result};
use crate::filter::core::{AndFilter, BatchFilter};
use crate::schema::{
    ANNUAL_PREVAILING_WAGE, ANNUAL_WAGE, CASE_STATUS, FULL_TIME_POSITION, WAGE_RATIO,
};
use crate::utils::arrow::{float_column, string_column};

/// Lowest plausible annual wage
pub const MIN_WAGE: f64 = 10_000.0;
/// Highest plausible annual wage
pub const MAX_WAGE: f64 = 10_000_000.0;
/// Lowest accepted offered/prevailing ratio
pub const MIN_RATIO: f64 = 0.5;
/// Highest accepted offered/prevailing ratio
pub const MAX_RATIO: f64 = 5.0;

/// Inclusive bounds applied to annualized wages and the wage ratio
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FilterThresholds {
    pub min_wage: f64,
    pub max_wage: f64,
    pub min_ratio: f64,
    pub max_ratio: f64,
}

impl Default for FilterThresholds {
    fn default() -> Self {
        Self {
            min_wage: MIN_WAGE,
            max_wage: MAX_WAGE,
            min_ratio: MIN_RATIO,
            max_ratio: MAX_RATIO,
        }
    }
}

impl FilterThresholds {
    /// Reject bounds that can never admit a record
    pub fn check(&self) -> Result<()> {
        let ordered = |min: f64, max: f64| min.is_finite() && max.is_finite() && min <= max;
        if !ordered(self.min_wage, self.max_wage) {
            return Err(LcaError::Config(format!(
                "wage bounds [{}, {}] are not an ordered finite range",
                self.min_wage, self.max_wage
            )));
        }
        if !ordered(self.min_ratio, self.max_ratio) {
            return Err(LcaError::Config(format!(
                "ratio bounds [{}, {}] are not an ordered finite range",
                self.min_ratio, self.max_ratio
            )));
        }
        Ok(())
    }

    /// Whether an annual wage lies inside the wage bounds
    #[must_use]
    pub fn wage_in_bounds(&self, value: f64) -> bool {
        (self.min_wage..=self.max_wage).contains(&value)
    }

    /// Whether a wage ratio lies inside the ratio band
    #[must_use]
    pub fn ratio_in_bounds(&self, value: f64) -> bool {
        (self.min_ratio..=self.max_ratio).contains(&value)
    }
}

/// Keeps rows whose text column contains a token, ignoring case
///
/// Null values never match.
#[derive(Debug, Clone)]
pub struct ContainsFilter {
    column: String,
    needle: String,
}

impl ContainsFilter {
    #[must_use]
    pub fn new(column: impl Into<String>, needle: &str) -> Self {
        Self {
            column: column.into(),
            needle: needle.to_lowercase(),
        }
    }

    /// Case status mentions certification ("Certified", "Certified - Withdrawn")
    #[must_use]
    pub fn certified() -> Self {
        Self::new(CASE_STATUS, "certified")
    }

    /// Position is flagged full time
    #[must_use]
    pub fn full_time() -> Self {
        Self::new(FULL_TIME_POSITION, "y")
    }
}

impl BatchFilter for ContainsFilter {
    fn mask(&self, batch: &RecordBatch) -> Result<BooleanArray> {
        let values = string_column(batch, &self.column)?;
        Ok(values
            .iter()
            .map(|value| Some(value.is_some_and(|v| v.to_lowercase().contains(&self.needle))))
            .collect())
    }

    fn required_columns(&self) -> HashSet<String> {
        HashSet::from([self.column.clone()])
    }
}

/// Keeps rows where every listed numeric column lies in `[min, max]`
///
/// Null values never match.
#[derive(Debug, Clone)]
pub struct RangeFilter {
    columns: Vec<String>,
    min: f64,
    max: f64,
}

impl RangeFilter {
    #[must_use]
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>, min: f64, max: f64) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            min,
            max,
        }
    }

    /// Both annualized wages inside the wage bounds
    #[must_use]
    pub fn annual_wages(thresholds: &FilterThresholds) -> Self {
        Self::new(
            [ANNUAL_WAGE, ANNUAL_PREVAILING_WAGE],
            thresholds.min_wage,
            thresholds.max_wage,
        )
    }

    /// Wage ratio inside the ratio band
    #[must_use]
    pub fn wage_ratio(thresholds: &FilterThresholds) -> Self {
        Self::new([WAGE_RATIO], thresholds.min_ratio, thresholds.max_ratio)
    }
}

impl BatchFilter for RangeFilter {
    fn mask(&self, batch: &RecordBatch) -> Result<BooleanArray> {
        let mut keep = vec![true; batch.num_rows()];
        for column in &self.columns {
            let values = float_column(batch, column)?;
            for (row, slot) in keep.iter_mut().enumerate() {
                *slot = *slot
                    && values.is_valid(row)
                    && (self.min..=self.max).contains(&values.value(row));
            }
        }
        Ok(BooleanArray::from(keep))
    }

    fn required_columns(&self) -> HashSet<String> {
        self.columns.iter().cloned().collect()
    }
}

/// The publication rules: certified, full time, wage bounds, ratio band
#[derive(Debug, Clone)]
pub struct RecordFilter {
    thresholds: FilterThresholds,
    rules: AndFilter,
}

impl Default for RecordFilter {
    fn default() -> Self {
        Self::new(FilterThresholds::default())
    }
}

impl RecordFilter {
    #[must_use]
    pub fn new(thresholds: FilterThresholds) -> Self {
        let rules = AndFilter::default()
            .and(ContainsFilter::certified())
            .and(ContainsFilter::full_time())
            .and(RangeFilter::annual_wages(&thresholds))
            .and(RangeFilter::wage_ratio(&thresholds));
        Self { thresholds, rules }
    }

    #[must_use]
    pub const fn thresholds(&self) -> &FilterThresholds {
        &self.thresholds
    }
}

impl BatchFilter for RecordFilter {
    fn mask(&self, batch: &RecordBatch) -> Result<BooleanArray> {
        self.rules.mask(batch)
    }

    fn required_columns(&self) -> HashSet<String> {
        self.rules.required_columns()
    }

    fn filter(&self, batch: &RecordBatch) -> Result<RecordBatch> {
        self.rules.filter(batch)
    }
}
