//! Display-time narrowing of a published record set.
//!
//! These filters run on output that already passed validation; they never
//! clean or re-check values.

use std::collections::HashSet;

use arrow::array::BooleanArray;
use arrow::record_batch::RecordBatch;

use crate::error::Result;
use crate::filter::core::{AndFilter, BatchFilter};
use crate::filter::record::RangeFilter;
use crate::schema::{ANNUAL_WAGE, SOC_CODE, WORKSITE_STATE};
use crate::utils::arrow::string_column;

/// Keeps rows whose text column equals a value exactly
#[derive(Debug, Clone)]
pub struct EqualsFilter {
    column: String,
    value: String,
}

impl EqualsFilter {
    #[must_use]
    pub fn new(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

impl BatchFilter for EqualsFilter {
    fn mask(&self, batch: &RecordBatch) -> Result<BooleanArray> {
        let values = string_column(batch, &self.column)?;
        Ok(values
            .iter()
            .map(|value| Some(value == Some(self.value.as_str())))
            .collect())
    }

    fn required_columns(&self) -> HashSet<String> {
        HashSet::from([self.column.clone()])
    }
}

/// Independently optional consumer selections
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayFilters {
    /// Keep one SOC code
    pub soc_code: Option<String>,
    /// Keep one worksite state
    pub state: Option<String>,
    /// Keep annual wages inside `[min, max]`
    pub wage_range: Option<(f64, f64)>,
}

impl DisplayFilters {
    #[must_use]
    pub fn with_soc_code(mut self, code: impl Into<String>) -> Self {
        self.soc_code = Some(code.into());
        self
    }

    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    #[must_use]
    pub fn with_wage_range(mut self, min: f64, max: f64) -> Self {
        self.wage_range = Some((min, max));
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.soc_code.is_none() && self.state.is_none() && self.wage_range.is_none()
    }

    /// The selections as one conjunctive filter
    #[must_use]
    pub fn to_filter(&self) -> AndFilter {
        let mut filter = AndFilter::default();
        if let Some(code) = &self.soc_code {
            filter = filter.and(EqualsFilter::new(SOC_CODE, code.as_str()));
        }
        if let Some(state) = &self.state {
            filter = filter.and(EqualsFilter::new(WORKSITE_STATE, state.as_str()));
        }
        if let Some((min, max)) = self.wage_range {
            filter = filter.and(RangeFilter::new([ANNUAL_WAGE], min, max));
        }
        filter
    }

    /// Narrow a published batch
    pub fn apply(&self, batch: &RecordBatch) -> Result<RecordBatch> {
        self.to_filter().filter(batch)
    }
}
