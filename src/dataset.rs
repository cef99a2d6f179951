//! Typed access to a published record set.

use arrow::datatypes::FieldRef;
use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};

use crate::error::{LcaError, Result};
use crate::filter::DisplayFilters;
use crate::normalize::WageUnit;
use crate::schema::processed_schema;
use crate::source::Tier;

/// One published LCA record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct LcaRecord {
    pub employer_name: String,
    pub job_title: Option<String>,
    pub soc_code: String,
    pub soc_title: Option<String>,
    pub wage_rate_of_pay_from: f64,
    pub prevailing_wage: f64,
    pub wage_unit_of_pay: Option<String>,
    pub pw_unit_of_pay: Option<String>,
    pub annual_wage: f64,
    pub annual_prevailing_wage: f64,
    pub wage_ratio: f64,
    pub worksite_state: String,
}

impl LcaRecord {
    /// Classification of the offered wage's pay unit
    #[must_use]
    pub fn wage_unit(&self) -> WageUnit {
        WageUnit::classify(self.wage_unit_of_pay.as_deref())
    }

    /// Classification of the prevailing wage's pay unit
    #[must_use]
    pub fn prevailing_wage_unit(&self) -> WageUnit {
        WageUnit::classify(self.pw_unit_of_pay.as_deref())
    }

    /// Deserialize every row of a published batch
    pub fn from_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        serde_arrow::from_record_batch(batch)
            .map_err(|e| LcaError::Processing(format!("failed to read records: {e}")))
    }

    /// Build a published batch from records
    pub fn to_batch(records: &[Self]) -> Result<RecordBatch> {
        let fields: Vec<FieldRef> = processed_schema()
            .fields()
            .iter()
            .map(std::sync::Arc::clone)
            .collect();
        serde_arrow::to_record_batch(&fields, &records)
            .map_err(|e| LcaError::Processing(format!("failed to build record batch: {e}")))
    }
}

/// A resolved record set and the tier that produced it
#[derive(Debug, Clone)]
pub struct LcaDataset {
    batch: RecordBatch,
    origin: Tier,
}

impl LcaDataset {
    #[must_use]
    pub const fn new(batch: RecordBatch, origin: Tier) -> Self {
        Self { batch, origin }
    }

    #[must_use]
    pub const fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Where the record set came from in this resolution
    #[must_use]
    pub const fn origin(&self) -> Tier {
        self.origin
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn records(&self) -> Result<Vec<LcaRecord>> {
        LcaRecord::from_batch(&self.batch)
    }

    /// Narrow the record set with display selections
    ///
    /// Selections only remove rows; nothing is re-cleaned or re-validated.
    pub fn filtered(&self, filters: &DisplayFilters) -> Result<Self> {
        if filters.is_empty() {
            return Ok(self.clone());
        }
        Ok(Self::new(filters.apply(&self.batch)?, self.origin))
    }
}
