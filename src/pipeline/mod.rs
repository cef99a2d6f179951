//! The normalization pipeline: raw extract in, published record set out.
//!
//! Stages run in a fixed order over one in-memory batch:
//! SOC canonicalization, SOC title lookup, wage cleaning, annualization,
//! wage ratio, publication rules, projection to the published columns.
//! Nothing here reads a clock or draws random numbers, so the same raw input
//! always produces the same output.

use std::sync::Arc;
use std::time::Instant;

use arrow::array::{Array, ArrayRef, Float64Array};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use serde::Serialize;

use crate::config::PipelineConfig;
use crate::error::{LcaError, Result};
use crate::filter::{BatchFilter, FilterThresholds, RecordFilter};
use crate::normalize::{
    SocTitleLookup, annualize_column, canonicalize_soc_column, clean_wage_column,
    wage_ratio_column,
};
use crate::schema::{
    ANNUAL_PREVAILING_WAGE, ANNUAL_WAGE, CASE_STATUS, EMPLOYER_NAME, FULL_TIME_POSITION,
    JOB_TITLE, PREVAILING_WAGE, PUBLISHED_COLUMNS, PW_UNIT_OF_PAY, SOC_CODE, SOC_TITLE,
    WAGE_RATE_OF_PAY_FROM, WAGE_RATIO, WAGE_UNIT_OF_PAY, WORKSITE_STATE, processed_schema,
};
use crate::utils::arrow::{optional_string_column, string_column};
use crate::utils::logging::{create_spinner, finish_spinner, log_stage};
use crate::validation::{RecordSetValidator, ValidationMode};

/// Row accounting for one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    /// Records in the raw extract
    pub rows_in: usize,
    /// Records published
    pub rows_out: usize,
    /// Offered wages that could not be parsed
    pub invalid_wages: usize,
    /// Prevailing wages that could not be parsed
    pub invalid_prevailing_wages: usize,
    /// Distinct SOC codes that received a title
    pub soc_titles: usize,
}

impl PipelineReport {
    /// Records removed by the publication rules
    #[must_use]
    pub const fn rows_dropped(&self) -> usize {
        self.rows_in.saturating_sub(self.rows_out)
    }
}

/// Result of [`Pipeline::transform`]
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Published record set
    pub batch: RecordBatch,
    /// Verdict of the processed validation
    pub valid: bool,
    pub report: PipelineReport,
}

/// Turns a raw extract into the published record set
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    filter: RecordFilter,
    show_progress: bool,
}

impl Pipeline {
    #[must_use]
    pub fn new(thresholds: FilterThresholds) -> Self {
        Self {
            filter: RecordFilter::new(thresholds),
            show_progress: false,
        }
    }

    #[must_use]
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.thresholds).with_progress(config.show_progress)
    }

    #[must_use]
    pub const fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    #[must_use]
    pub const fn thresholds(&self) -> &FilterThresholds {
        self.filter.thresholds()
    }

    /// Run the pipeline and validate the output once as processed
    ///
    /// The verdict is returned alongside the batch; persisting an invalid
    /// batch is the caller's decision.
    pub fn transform(
        &self,
        raw: &RecordBatch,
        validator: &dyn RecordSetValidator,
    ) -> Result<PipelineOutput> {
        let (batch, report) = self.run(raw)?;
        let valid = validator.validate(&batch, ValidationMode::Processed);
        Ok(PipelineOutput {
            batch,
            valid,
            report,
        })
    }

    /// Run every stage without validating
    ///
    /// # Errors
    /// Any failure, including a missing input column, is reported as a single
    /// `LcaError::Processing`; no partial output is returned.
    pub fn run(&self, raw: &RecordBatch) -> Result<(RecordBatch, PipelineReport)> {
        let start = Instant::now();
        let pb = create_spinner("Processing LCA records...", self.show_progress);

        let result = self.run_stages(raw).map_err(|e| match e {
            LcaError::Processing(_) => e,
            other => LcaError::processing(other),
        });

        match &result {
            Ok((_, report)) => {
                finish_spinner(&pb, None);
                log::info!(
                    "Pipeline published {} of {} records in {:?}",
                    report.rows_out,
                    report.rows_in,
                    start.elapsed()
                );
            }
            Err(e) => {
                finish_spinner(&pb, None);
                log::error!("Pipeline failed: {e}");
            }
        }
        result
    }

    fn run_stages(&self, raw: &RecordBatch) -> Result<(RecordBatch, PipelineReport)> {
        let rows_in = raw.num_rows();

        let soc_codes = canonicalize_soc_column(&string_column(raw, SOC_CODE)?);
        let titles = SocTitleLookup::from_columns(&soc_codes, &optional_string_column(raw, SOC_TITLE)?);
        let soc_titles = titles.apply(&soc_codes);

        let wages = clean_wage_column(input_column(raw, WAGE_RATE_OF_PAY_FROM)?)?;
        let prevailing = clean_wage_column(input_column(raw, PREVAILING_WAGE)?)?;

        let wage_units = string_column(raw, WAGE_UNIT_OF_PAY)?;
        let pw_units = string_column(raw, PW_UNIT_OF_PAY)?;
        let annual_wages = annualize_column(&wages, &wage_units);
        let annual_prevailing = annualize_column(&prevailing, &pw_units);
        let ratios = wage_ratio_column(&annual_wages, &annual_prevailing);

        let mut report = PipelineReport {
            rows_in,
            invalid_wages: invalid_count(raw, WAGE_RATE_OF_PAY_FROM, &wages),
            invalid_prevailing_wages: invalid_count(raw, PREVAILING_WAGE, &prevailing),
            soc_titles: titles.len(),
            ..PipelineReport::default()
        };

        let mut columns: Vec<(&str, ArrayRef)> = Vec::with_capacity(PUBLISHED_COLUMNS.len() + 2);
        for name in PUBLISHED_COLUMNS {
            let array: ArrayRef = match name {
                EMPLOYER_NAME | WORKSITE_STATE => Arc::new(string_column(raw, name)?),
                JOB_TITLE => Arc::new(optional_string_column(raw, name)?),
                SOC_CODE => Arc::new(soc_codes.clone()),
                SOC_TITLE => Arc::new(soc_titles.clone()),
                WAGE_RATE_OF_PAY_FROM => Arc::new(wages.clone()),
                PREVAILING_WAGE => Arc::new(prevailing.clone()),
                WAGE_UNIT_OF_PAY => Arc::new(wage_units.clone()),
                PW_UNIT_OF_PAY => Arc::new(pw_units.clone()),
                ANNUAL_WAGE => Arc::new(annual_wages.clone()),
                ANNUAL_PREVAILING_WAGE => Arc::new(annual_prevailing.clone()),
                WAGE_RATIO => Arc::new(ratios.clone()),
                other => {
                    return Err(LcaError::Processing(format!(
                        "no stage produces column {other}"
                    )));
                }
            };
            columns.push((name, array));
        }
        // Filter inputs only; dropped by the projection below
        columns.push((CASE_STATUS, Arc::new(string_column(raw, CASE_STATUS)?)));
        columns.push((
            FULL_TIME_POSITION,
            Arc::new(string_column(raw, FULL_TIME_POSITION)?),
        ));

        let working = working_batch(columns, rows_in)?;
        check_filter_inputs(&working, &self.filter)?;
        let kept = self.filter.filter(&working)?;
        log_stage("Publication rules", rows_in, kept.num_rows());

        let published = kept.project(&(0..PUBLISHED_COLUMNS.len()).collect::<Vec<_>>())?;
        let published = RecordBatch::try_new(processed_schema(), published.columns().to_vec())?;

        report.rows_out = published.num_rows();
        Ok((published, report))
    }
}

/// Every column read by `filter` must be present in `batch`
fn check_filter_inputs(batch: &RecordBatch, filter: &dyn BatchFilter) -> Result<()> {
    let schema = batch.schema();
    let mut missing = filter
        .required_columns()
        .into_iter()
        .filter(|name| schema.column_with_name(name).is_none())
        .collect::<Vec<_>>();
    if missing.is_empty() {
        return Ok(());
    }
    missing.sort();
    Err(LcaError::Schema(format!(
        "publication rules need missing columns: {}",
        missing.join(", ")
    )))
}

fn input_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    batch
        .column_by_name(name)
        .ok_or_else(|| LcaError::Schema(format!("column {name} not found in raw record set")))
}

/// Values present in the raw column that cleaned to null
fn invalid_count(raw: &RecordBatch, name: &str, cleaned: &Float64Array) -> usize {
    let raw_nulls = raw
        .column_by_name(name)
        .map_or(0, |array| array.logical_null_count());
    cleaned.null_count().saturating_sub(raw_nulls)
}

fn working_batch(columns: Vec<(&str, ArrayRef)>, num_rows: usize) -> Result<RecordBatch> {
    let fields = columns
        .iter()
        .map(|(name, array)| Field::new(*name, array.data_type().clone(), true))
        .collect::<Vec<_>>();
    let arrays = columns.into_iter().map(|(_, array)| array).collect();
    let options = arrow::record_batch::RecordBatchOptions::new().with_row_count(Some(num_rows));
    Ok(RecordBatch::try_new_with_options(
        Arc::new(Schema::new(fields)),
        arrays,
        &options,
    )?)
}
