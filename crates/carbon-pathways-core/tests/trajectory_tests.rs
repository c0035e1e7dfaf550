use carbon_pathways_core::trajectory::{
    calculate_bau, calculate_target, compute_bau, compute_bau_by_scope, compute_target,
    sbti_checkpoints, BauInput, TargetInput,
};
use carbon_pathways_core::{GrowthRates, ScopeSplit};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// BAU tests
// ===========================================================================

#[test]
fn test_bau_is_monotonic_for_positive_growth() {
    for base_year in [2020, 2024, 2031, 2045] {
        let t = compute_bau(dec!(3212.02074), &GrowthRates::default(), base_year);
        assert!(t.values.windows(2).all(|w| w[1] >= w[0]));
        assert_eq!(t.years.first(), Some(&base_year));
        assert_eq!(t.years.last(), Some(&2050));
    }
}

#[test]
fn test_bau_default_growth_compounds_by_period() {
    // 2024..=2030 at 2%, 2031..=2040 at 1.5%, 2041..=2049 at 1%
    let t = compute_bau(dec!(100), &GrowthRates::default(), 2024);
    let mut expected = dec!(100);
    for year in 2024..2050 {
        let rate = if year <= 2030 {
            dec!(1.02)
        } else if year <= 2040 {
            dec!(1.015)
        } else {
            dec!(1.01)
        };
        expected *= rate;
    }
    let last = t.last_value().unwrap();
    assert!((last - expected).abs() < dec!(0.0000001));
}

#[test]
fn test_bau_by_scope_sums_to_envelope_total() {
    let input = BauInput {
        baseline_by_scope: ScopeSplit::new(dec!(2609.72824), dec!(602.2925)),
        base_year: 2024,
        growth: GrowthRates::default(),
    };
    let out = calculate_bau(&input).unwrap();
    let split = compute_bau_by_scope(&input.baseline_by_scope, &input.growth, 2024);
    assert_eq!(out.result.total, split.combined());
    assert!(out.result.growth_to_horizon_pct > dec!(40));
}

#[test]
fn test_bau_serialises_two_decimal_numbers() {
    let t = compute_bau(dec!(3212.02074), &GrowthRates::default(), 2024);
    let json = serde_json::to_value(&t).unwrap();
    assert_eq!(json["years"][0], serde_json::json!(2024));
    assert_eq!(json["values"][0], serde_json::json!(3212.02));
    assert_eq!(json["values"].as_array().unwrap().len(), 27);
}

// ===========================================================================
// Target tests
// ===========================================================================

#[test]
fn test_target_manual_endpoints() {
    for reduction in [dec!(0), dec!(30), dec!(50), dec!(100)] {
        let t = compute_target(dec!(1000), 2024, reduction, false);
        assert_eq!(t.values[0], dec!(1000));
        let expected = dec!(1000) * (Decimal::ONE - reduction / dec!(100));
        assert_eq!(t.last_value(), Some(expected));
    }
}

#[test]
fn test_sbti_path_hits_checkpoints() {
    let baseline = dec!(3212.02074);
    let t = compute_target(baseline, 2024, dec!(50), true);
    let cp = sbti_checkpoints(baseline, 2024);
    assert_eq!(t.value_at(cp.near_term_year), Some(cp.near_term_level));
    assert_eq!(t.value_at(2050), Some(cp.long_term_level));
    assert_eq!(cp.near_term_level, baseline * dec!(0.58));
    assert_eq!(cp.long_term_level, baseline * dec!(0.10));
}

#[test]
fn test_target_envelope_is_idempotent() {
    let input = TargetInput {
        baseline: dec!(1000),
        base_year: 2026,
        reduction_pct: dec!(42),
        sbti_aligned: true,
    };
    let a = calculate_target(&input).unwrap();
    let b = calculate_target(&input).unwrap();
    assert_eq!(a.result.trajectory, b.result.trajectory);
    assert_eq!(a.result.checkpoints, b.result.checkpoints);
    assert!(a.result.checkpoints.is_some());
}
