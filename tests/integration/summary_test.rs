use lca_pipeline::summary::{
    KeyMetrics, SummaryReport, employer_ranking, employer_size_distribution, soc_title,
    state_breakdown, top_job_titles,
};

use crate::utils::record;

fn sample() -> Vec<lca_pipeline::LcaRecord> {
    vec![
        record("Acme", "CA", "15-1252", 100_000.0),
        record("Acme", "CA", "15-1252", 120_000.0),
        record("Acme", "NY", "11-1011", 140_000.0),
        record("Globex", "NY", "15-1252", 90_000.0),
        record("Globex", "TX", "15-1252", 110_000.0),
        record("Initech", "TX", "13-2011", 80_000.0),
    ]
}

#[test]
fn test_key_metrics() {
    let metrics = KeyMetrics::from_records(&sample());
    assert_eq!(metrics.total_certifications, 6);
    assert_eq!(metrics.unique_employers, 3);
    assert_eq!(metrics.median_annual_wage, Some(105_000.0));
    assert_eq!(metrics.mean_prevailing_wage, Some(100_000.0));
    // 120k, 140k and 110k pay above the 100k prevailing wage
    assert_eq!(metrics.percent_above_prevailing, Some(50.0));

    let empty = KeyMetrics::from_records(&[]);
    assert_eq!(empty.total_certifications, 0);
    assert_eq!(empty.median_annual_wage, None);
    assert_eq!(empty.percent_above_prevailing, None);
}

#[test]
fn test_employer_ranking_orders_by_count_then_name() {
    let ranking = employer_ranking(&sample(), 10);
    let names = ranking.iter().map(|e| e.employer.as_str()).collect::<Vec<_>>();
    assert_eq!(names, ["Acme", "Globex", "Initech"]);

    let acme = &ranking[0];
    assert_eq!(acme.certifications, 3);
    assert_eq!(acme.mean_wage, 120_000.0);
    assert_eq!(acme.median_wage, 120_000.0);
    assert_eq!(acme.wage_std_dev, Some(20_000.0));
    assert_eq!(acme.primary_state, "CA");
    assert_eq!(acme.primary_soc, "15-1252");
    assert_eq!(acme.market_share, 50.0);

    // Tied states go to the alphabetically first one
    assert_eq!(ranking[1].primary_state, "NY");
    assert_eq!(ranking[2].wage_std_dev, None);
}

#[test]
fn test_market_share_is_within_the_top_n() {
    let ranking = employer_ranking(&sample(), 2);
    assert_eq!(ranking.len(), 2);
    assert_eq!(ranking[0].market_share, 60.0);
    assert_eq!(ranking[1].market_share, 40.0);
}

#[test]
fn test_state_breakdown() {
    let states = state_breakdown(&sample());
    let order = states.iter().map(|s| s.state.as_str()).collect::<Vec<_>>();
    assert_eq!(order, ["CA", "NY", "TX"]);
    assert_eq!(states[1].unique_employers, 2);
    assert_eq!(states[0].median_wage, 110_000.0);
}

#[test]
fn test_top_job_titles_skip_missing_titles() {
    let mut records = sample();
    records[0].job_title = None;
    records[5].job_title = Some("Accountant".to_string());

    let titles = top_job_titles(&records, 5);
    assert_eq!(titles.len(), 2);
    assert_eq!(titles[0].job_title, "Software Engineer");
    assert_eq!(titles[0].count, 4);
    assert_eq!(titles[1].job_title, "Accountant");
}

#[test]
fn test_employer_size_buckets() {
    let mut records = sample();
    for _ in 0..10 {
        records.push(record("BigCo", "WA", "15-1252", 150_000.0));
    }

    let buckets = employer_size_distribution(&records);
    let counts = buckets.iter().map(|b| b.employers).collect::<Vec<_>>();
    assert_eq!(counts, [3, 1, 0, 0, 0]);
    assert_eq!(buckets[0].label, "1-9");
    assert_eq!(buckets[4].label, "500+");
    assert_eq!(buckets[1].percent, 25.0);
}

#[test]
fn test_soc_title_uses_canonical_code() {
    let records = sample();
    assert_eq!(soc_title(&records, "15-1252.00"), "Software Developers");
    assert_eq!(soc_title(&records, "99-9999"), "");
}

#[test]
fn test_summary_report_serializes() {
    let report = SummaryReport::build(&sample(), 2);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["metrics"]["total_certifications"], 6);
    assert_eq!(json["employers"].as_array().unwrap().len(), 2);
}
