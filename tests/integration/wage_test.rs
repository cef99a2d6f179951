//! Wage cleaning and annualization across representative inputs

use lca_pipeline::normalize::{WageInput, WageUnit, annualize, clean_wage, wage_ratio};
use proptest::prelude::*;

/// Insert a comma every three digits from the right
fn group_thousands(digits: &str) -> String {
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

#[test]
fn test_clean_wage_examples() {
    assert_eq!(clean_wage(WageInput::Text("$120,000")), Some(120_000.0));
    assert_eq!(clean_wage(WageInput::Text("  85000.50 ")), Some(85_000.5));
    assert_eq!(clean_wage(WageInput::Number(72_000.0)), Some(72_000.0));
    assert_eq!(clean_wage(WageInput::Text("")), None);
    assert_eq!(clean_wage(WageInput::Text("TBD")), None);
    assert_eq!(clean_wage(WageInput::Missing), None);
}

#[test]
fn test_annualize_examples() {
    assert_eq!(annualize(Some(2000.0), Some("Month")), Some(24_000.0));
    assert_eq!(annualize(Some(50.0), Some("Hour")), Some(104_000.0));
    assert_eq!(annualize(Some(1000.0), Some("Week")), Some(52_000.0));
    assert_eq!(annualize(Some(100_000.0), None), Some(100_000.0));
    assert_eq!(annualize(Some(0.0), Some("Hour")), Some(0.0));
    assert_eq!(annualize(None, Some("Year")), None);
}

#[test]
fn test_unit_rules_keep_their_order() {
    // "week" is checked before "bi"
    assert_eq!(WageUnit::classify(Some("Bi-Weekly")), WageUnit::Week);
    assert_eq!(WageUnit::classify(Some("bi-monthly")), WageUnit::BiWeek);
    assert_eq!(WageUnit::classify(Some("Semi-Monthly")), WageUnit::BiWeek);
    assert_eq!(WageUnit::classify(Some("per annum")), WageUnit::Unknown);
    assert_eq!(annualize(Some(1000.0), Some("per annum")), Some(1000.0));
}

#[test]
fn test_wage_ratio_needs_both_sides() {
    assert_eq!(wage_ratio(Some(80_000.0), Some(80_000.0)), Some(1.0));
    assert_eq!(wage_ratio(Some(80_000.0), Some(0.0)), None);
    assert_eq!(wage_ratio(None, Some(80_000.0)), None);
}

proptest! {
    /// Dollar signs, thousands separators and padding never change the amount
    #[test]
    fn prop_punctuation_is_ignored(whole in 0u64..100_000_000, cents in 0u32..100, pad in 0usize..3) {
        let plain = format!("{whole}.{cents:02}");
        let decorated = format!(
            "{}${}.{cents:02}{}",
            " ".repeat(pad),
            group_thousands(&whole.to_string()),
            " ".repeat(pad)
        );
        prop_assert_eq!(
            clean_wage(WageInput::Text(&decorated)),
            plain.parse::<f64>().ok()
        );
    }

    /// Every recognised unit scales by its multiplier
    #[test]
    fn prop_annualize_scales_by_unit(amount in 0.0f64..1_000_000.0, unit in prop::sample::select(vec!["Hour", "Week", "Month", "Year"])) {
        let expected = amount * WageUnit::classify(Some(unit)).multiplier();
        prop_assert_eq!(annualize(Some(amount), Some(unit)), Some(expected));
    }
}
