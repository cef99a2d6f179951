//! Aggregate views over published records.
//!
//! These are the figures a dashboard shows next to its charts: headline
//! metrics, employer and state tables, job title counts and the employer size
//! histogram. All of them are pure functions of the records they are given,
//! so display filters are applied first and the summaries follow.

use std::cmp::Ordering;

use itertools::Itertools;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

use crate::dataset::LcaRecord;
use crate::normalize::canonical_soc_code;

/// Employer size buckets by certification count; the last one is open-ended
pub const SIZE_BUCKETS: [(usize, Option<usize>); 5] = [
    (1, Some(10)),
    (10, Some(50)),
    (50, Some(100)),
    (100, Some(500)),
    (500, None),
];

/// Headline figures for a record set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyMetrics {
    pub total_certifications: usize,
    pub unique_employers: usize,
    pub mean_annual_wage: Option<f64>,
    pub median_annual_wage: Option<f64>,
    pub mean_prevailing_wage: Option<f64>,
    pub median_prevailing_wage: Option<f64>,
    /// Share of records paying above the prevailing wage, in percent
    pub percent_above_prevailing: Option<f64>,
}

impl KeyMetrics {
    #[must_use]
    pub fn from_records(records: &[LcaRecord]) -> Self {
        let wages = records.iter().map(|r| r.annual_wage).collect_vec();
        let prevailing = records.iter().map(|r| r.annual_prevailing_wage).collect_vec();
        let above = records.iter().filter(|r| r.wage_ratio > 1.0).count();

        Self {
            total_certifications: records.len(),
            unique_employers: records
                .iter()
                .map(|r| r.employer_name.as_str())
                .collect::<FxHashSet<_>>()
                .len(),
            mean_annual_wage: mean(&wages),
            median_annual_wage: median(&wages),
            mean_prevailing_wage: mean(&prevailing),
            median_prevailing_wage: median(&prevailing),
            percent_above_prevailing: percent(above, records.len()),
        }
    }
}

/// One row of the employer ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployerStats {
    pub employer: String,
    pub certifications: usize,
    pub mean_wage: f64,
    pub median_wage: f64,
    /// Sample standard deviation; undefined below two records
    pub wage_std_dev: Option<f64>,
    pub avg_wage_ratio: f64,
    pub primary_state: String,
    pub primary_soc: String,
    /// Share of certifications among the ranked employers, in percent
    pub market_share: f64,
}

/// One row of the per-state breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateStats {
    pub state: String,
    pub certifications: usize,
    pub mean_wage: f64,
    pub median_wage: f64,
    pub wage_std_dev: Option<f64>,
    pub avg_wage_ratio: f64,
    pub unique_employers: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobTitleStats {
    pub job_title: String,
    pub count: usize,
    pub mean_wage: f64,
    pub median_wage: f64,
}

/// Number of employers whose certification count falls in `[min, max)`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeBucket {
    pub label: String,
    pub min: usize,
    pub max: Option<usize>,
    pub employers: usize,
    /// Share of all employers, in percent
    pub percent: f64,
}

/// Every summary view of one record set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryReport {
    pub metrics: KeyMetrics,
    pub employers: Vec<EmployerStats>,
    pub states: Vec<StateStats>,
    pub job_titles: Vec<JobTitleStats>,
    pub employer_sizes: Vec<SizeBucket>,
}

impl SummaryReport {
    /// Build all views, keeping `top_n` rows in the ranked ones
    #[must_use]
    pub fn build(records: &[LcaRecord], top_n: usize) -> Self {
        Self {
            metrics: KeyMetrics::from_records(records),
            employers: employer_ranking(records, top_n),
            states: state_breakdown(records),
            job_titles: top_job_titles(records, top_n),
            employer_sizes: employer_size_distribution(records),
        }
    }
}

/// Employers with the most certifications, largest first
///
/// Ties on count are ordered by employer name. Market share is computed
/// within the returned rows only.
#[must_use]
pub fn employer_ranking(records: &[LcaRecord], top_n: usize) -> Vec<EmployerStats> {
    let mut ranking = group_by_key(records, |r| r.employer_name.as_str())
        .into_iter()
        .map(|(employer, group)| {
            let wages = group.iter().map(|r| r.annual_wage).collect_vec();
            EmployerStats {
                employer: employer.to_string(),
                certifications: group.len(),
                mean_wage: mean(&wages).unwrap_or_default(),
                median_wage: median(&wages).unwrap_or_default(),
                wage_std_dev: sample_std_dev(&wages),
                avg_wage_ratio: mean(&group.iter().map(|r| r.wage_ratio).collect_vec())
                    .unwrap_or_default(),
                primary_state: mode(group.iter().map(|r| r.worksite_state.as_str())),
                primary_soc: mode(group.iter().map(|r| r.soc_code.as_str())),
                market_share: 0.0,
            }
        })
        .sorted_by(|a, b| {
            b.certifications
                .cmp(&a.certifications)
                .then_with(|| a.employer.cmp(&b.employer))
        })
        .take(top_n)
        .collect_vec();

    let ranked_total = ranking.iter().map(|e| e.certifications).sum::<usize>();
    for employer in &mut ranking {
        employer.market_share = percent(employer.certifications, ranked_total).unwrap_or_default();
    }
    ranking
}

/// Per-state figures, busiest state first
#[must_use]
pub fn state_breakdown(records: &[LcaRecord]) -> Vec<StateStats> {
    group_by_key(records, |r| r.worksite_state.as_str())
        .into_iter()
        .map(|(state, group)| {
            let wages = group.iter().map(|r| r.annual_wage).collect_vec();
            StateStats {
                state: state.to_string(),
                certifications: group.len(),
                mean_wage: mean(&wages).unwrap_or_default(),
                median_wage: median(&wages).unwrap_or_default(),
                wage_std_dev: sample_std_dev(&wages),
                avg_wage_ratio: mean(&group.iter().map(|r| r.wage_ratio).collect_vec())
                    .unwrap_or_default(),
                unique_employers: group
                    .iter()
                    .map(|r| r.employer_name.as_str())
                    .collect::<FxHashSet<_>>()
                    .len(),
            }
        })
        .sorted_by(|a, b| {
            b.certifications
                .cmp(&a.certifications)
                .then_with(|| a.state.cmp(&b.state))
        })
        .collect()
}

/// Most frequent job titles; records without a title are not counted
#[must_use]
pub fn top_job_titles(records: &[LcaRecord], top_n: usize) -> Vec<JobTitleStats> {
    let mut groups: FxHashMap<&str, Vec<f64>> = FxHashMap::default();
    for record in records {
        if let Some(title) = record.job_title.as_deref() {
            groups.entry(title).or_default().push(record.annual_wage);
        }
    }

    groups
        .into_iter()
        .map(|(title, wages)| JobTitleStats {
            job_title: title.to_string(),
            count: wages.len(),
            mean_wage: mean(&wages).unwrap_or_default(),
            median_wage: median(&wages).unwrap_or_default(),
        })
        .sorted_by(|a, b| b.count.cmp(&a.count).then_with(|| a.job_title.cmp(&b.job_title)))
        .take(top_n)
        .collect()
}

/// Employers bucketed by how many certifications they hold
#[must_use]
pub fn employer_size_distribution(records: &[LcaRecord]) -> Vec<SizeBucket> {
    let sizes = group_by_key(records, |r| r.employer_name.as_str())
        .into_values()
        .map(|group| group.len())
        .collect_vec();

    SIZE_BUCKETS
        .iter()
        .map(|&(min, max)| {
            let employers = sizes
                .iter()
                .filter(|&&size| size >= min && max.is_none_or(|max| size < max))
                .count();
            let label = match max {
                Some(max) => format!("{min}-{}", max - 1),
                None => format!("{min}+"),
            };
            SizeBucket {
                label,
                min,
                max,
                employers,
                percent: percent(employers, sizes.len()).unwrap_or_default(),
            }
        })
        .collect()
}

/// Title published for a SOC code, or an empty string when none is known
#[must_use]
pub fn soc_title(records: &[LcaRecord], code: &str) -> String {
    let code = canonical_soc_code(code);
    records
        .iter()
        .filter(|r| r.soc_code == code)
        .find_map(|r| r.soc_title.clone())
        .unwrap_or_default()
}

fn group_by_key<'a, F>(records: &'a [LcaRecord], key: F) -> FxHashMap<&'a str, Vec<&'a LcaRecord>>
where
    F: Fn(&'a LcaRecord) -> &'a str,
{
    let mut groups: FxHashMap<&str, Vec<&LcaRecord>> = FxHashMap::default();
    for record in records {
        groups.entry(key(record)).or_default().push(record);
    }
    groups
}

/// Most frequent value; ties go to the smallest
fn mode<'a>(values: impl Iterator<Item = &'a str>) -> String {
    values
        .counts()
        .into_iter()
        .max_by(|(a, a_count), (b, b_count)| a_count.cmp(b_count).then_with(|| b.cmp(a)))
        .map(|(value, _)| value.to_string())
        .unwrap_or_default()
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sorted = values
        .iter()
        .copied()
        .sorted_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
        .collect_vec();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let avg = mean(values)?;
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

fn percent(part: usize, whole: usize) -> Option<f64> {
    (whole > 0).then(|| part as f64 / whole as f64 * 100.0)
}
