//! Console output utilities
//!
//! Plain-text tables for the command line summaries.

use crate::dataset::LcaDataset;
use crate::pipeline::PipelineReport;
use crate::summary::{EmployerStats, JobTitleStats, KeyMetrics, SizeBucket, StateStats};

/// Format a dollar amount with thousands separators and no cents
#[must_use]
pub fn format_dollars(amount: f64) -> String {
    let whole = amount.round().abs() as u64;
    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if amount < 0.0 && whole > 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

fn dollars_or_dash(amount: Option<f64>) -> String {
    amount.map_or_else(|| "-".to_string(), format_dollars)
}

/// Print where a dataset came from and its size
pub fn print_dataset_info(dataset: &LcaDataset) {
    println!(
        "Loaded {} records from the {}",
        dataset.num_rows(),
        dataset.origin()
    );
}

/// Print row accounting for one pipeline run
pub fn print_pipeline_report(report: &PipelineReport) {
    println!("Records in:               {}", report.rows_in);
    println!("Records published:        {}", report.rows_out);
    println!("Records dropped:          {}", report.rows_dropped());
    println!("Unparseable wages:        {}", report.invalid_wages);
    println!("Unparseable prevailing:   {}", report.invalid_prevailing_wages);
    println!("SOC codes with a title:   {}", report.soc_titles);
}

pub fn print_key_metrics(metrics: &KeyMetrics) {
    println!("Total DOL certifications: {}", metrics.total_certifications);
    println!("Unique employers:         {}", metrics.unique_employers);
    println!(
        "Median annual wage:       {}",
        dollars_or_dash(metrics.median_annual_wage)
    );
    println!(
        "Mean annual wage:         {}",
        dollars_or_dash(metrics.mean_annual_wage)
    );
    println!(
        "Median prevailing wage:   {}",
        dollars_or_dash(metrics.median_prevailing_wage)
    );
    if let Some(pct) = metrics.percent_above_prevailing {
        println!("Paid above prevailing:    {pct:.1}%");
    }
}

pub fn print_employer_ranking(employers: &[EmployerStats]) {
    println!("Top {} employers:", employers.len());
    for (rank, e) in employers.iter().enumerate() {
        println!(
            "{:>3}. {} - {} certifications ({:.1}%), median {}, ratio {:.2}, mostly {} / {}",
            rank + 1,
            e.employer,
            e.certifications,
            e.market_share,
            format_dollars(e.median_wage),
            e.avg_wage_ratio,
            e.primary_state,
            e.primary_soc
        );
    }
}

pub fn print_state_breakdown(states: &[StateStats]) {
    println!("By worksite state:");
    for s in states {
        println!(
            "  {:<4} {:>7} certifications, median {}, ratio {:.2}, {} employers",
            s.state,
            s.certifications,
            format_dollars(s.median_wage),
            s.avg_wage_ratio,
            s.unique_employers
        );
    }
}

pub fn print_job_titles(titles: &[JobTitleStats]) {
    println!("Top job titles:");
    for t in titles {
        println!(
            "  {:>7}  {} (median {})",
            t.count,
            t.job_title,
            format_dollars(t.median_wage)
        );
    }
}

pub fn print_size_distribution(buckets: &[SizeBucket]) {
    println!("Employers by certification count:");
    for b in buckets {
        println!("  {:<8} {:>7} ({:.1}%)", b.label, b.employers, b.percent);
    }
}
