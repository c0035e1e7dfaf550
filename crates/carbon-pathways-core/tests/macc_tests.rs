use carbon_pathways_core::macc::{bau_growth_factor, calculate_macc, compute_macc, MaccInput};
use carbon_pathways_core::payoff::{calculate_payoff, PayoffInput};
use carbon_pathways_core::scenarios::Scenario;
use carbon_pathways_core::trajectory::compute_bau;
use carbon_pathways_core::{GrowthRates, ScopeSplit};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn scenario(measures: serde_json::Value) -> Scenario {
    serde_json::from_value(serde_json::json!({
        "id": "sc",
        "name": "Test",
        "measures": measures
    }))
    .unwrap()
}

fn three_measures() -> Scenario {
    scenario(serde_json::json!([
        {"id": "a", "name": "LED", "scope": "scope2", "reduction_pct": 10, "start_year": 2024,
         "is_instant": true, "is_permanent": true, "capex": 990, "opex": 50},
        {"id": "b", "name": "Heat pumps", "scope": "scope1", "reduction_pct": 20, "start_year": 2024,
         "is_instant": true, "lifecycle_years": 10, "capex": 1000},
        {"id": "c", "name": "Fleet", "scope": "scope1", "reduction_pct": 30, "start_year": 2035,
         "is_instant": true, "is_permanent": true, "capex": 5}
    ]))
}

// ===========================================================================
// MACC
// ===========================================================================

#[test]
fn test_macc_orders_blocks_by_cost_per_tonne() {
    let input = MaccInput {
        scenario: three_measures(),
        baseline_total: dec!(1000),
        base_year: 2024,
        analysis_year: 2030,
        growth: GrowthRates::flat(),
        bau: None,
    };
    let curve = calculate_macc(&input).unwrap().result;

    let ids: Vec<&str> = curve.blocks.iter().map(|b| b.measure_id.as_str()).collect();
    assert_eq!(ids, vec!["b", "a"]);
    assert_eq!(curve.bau_growth_factor, Decimal::ONE);

    let b = &curve.blocks[0];
    assert_eq!(b.annualized_cost, dec!(100));
    assert_eq!(b.marginal_cost, dec!(0.5));
    assert_eq!((b.x_start, b.x_end), (dec!(0), dec!(200)));

    let a = &curve.blocks[1];
    // 990 over 99 years plus 50 opex
    assert_eq!(a.annualized_cost, dec!(60));
    assert_eq!(a.marginal_cost, dec!(0.6));
    assert_eq!((a.x_start, a.x_end), (dec!(200), dec!(300)));
    assert_eq!(curve.total_abatement, dec!(300));
}

#[test]
fn test_macc_blocks_are_contiguous_and_sorted() {
    let measures: Vec<serde_json::Value> = (1..=8)
        .map(|i| {
            serde_json::json!({
                "id": format!("m{i}"), "reduction_pct": 3 * i, "start_year": 2024,
                "is_instant": true, "lifecycle_years": 10 + i,
                "capex": 1000 * ((i * 7) % 5 + 1), "opex": 10 * i
            })
        })
        .collect();
    let s = scenario(serde_json::Value::Array(measures));
    let bau = compute_bau(dec!(2500), &GrowthRates::default(), 2024);
    let curve = compute_macc(&s, 2030, dec!(2500), &bau);

    assert_eq!(curve.blocks.len(), 8);
    assert!(curve
        .blocks
        .windows(2)
        .all(|w| w[0].marginal_cost <= w[1].marginal_cost && w[0].x_end == w[1].x_start));
    assert_eq!(curve.blocks[0].x_start, Decimal::ZERO);
    assert_eq!(curve.blocks.last().map(|b| b.x_end), Some(curve.total_abatement));
}

#[test]
fn test_macc_scales_by_bau_growth() {
    let bau = compute_bau(dec!(1000), &GrowthRates::new(dec!(10), dec!(0), dec!(0)), 2024);
    let factor = bau_growth_factor(&bau, 2030);
    assert!(factor > Decimal::ONE);

    let curve = compute_macc(&three_measures(), 2030, dec!(1000), &bau);
    let a = curve.blocks.iter().find(|b| b.measure_id == "a").unwrap();
    assert_eq!(a.annual_abatement, dec!(100) * factor);
}

#[test]
fn test_macc_zero_baseline_has_no_blocks() {
    let bau = compute_bau(Decimal::ZERO, &GrowthRates::default(), 2024);
    let curve = compute_macc(&three_measures(), 2030, Decimal::ZERO, &bau);
    assert!(curve.blocks.is_empty());
    assert_eq!(curve.total_abatement, Decimal::ZERO);
}

// ===========================================================================
// Payoff
// ===========================================================================

#[test]
fn test_payoff_points_follow_scenario_order() {
    let input = PayoffInput {
        scenario: three_measures(),
        baseline_by_scope: ScopeSplit::new(dec!(800), dec!(200)),
        base_year: 2024,
        discount_rate: dec!(0.07),
    };
    let out = calculate_payoff(&input).unwrap();
    let points = &out.result;

    let ids: Vec<&str> = points.iter().map(|p| p.measure_id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);

    // a: 20 t over 2024..=2050
    assert_eq!(points[0].cumulative_abatement_to_2050, dec!(540));
    assert_eq!(points[0].label, "LED");
    // b: 160 t over ten years, no opex
    assert_eq!(points[1].cumulative_abatement_to_2050, dec!(1600));
    assert_eq!(points[1].npv_cost, dec!(1000));
    // c: 240 t over 2035..=2050
    assert_eq!(points[2].cumulative_abatement_to_2050, dec!(3840));
    assert_eq!(points[2].avg_annual_abatement_during_build, dec!(240));
}

#[test]
fn test_payoff_opex_is_discounted() {
    let input = PayoffInput {
        scenario: three_measures(),
        baseline_by_scope: ScopeSplit::new(dec!(800), dec!(200)),
        base_year: 2024,
        discount_rate: dec!(0.07),
    };
    let a = &calculate_payoff(&input).unwrap().result[0];
    let undiscounted = dec!(990) + dec!(50) * dec!(27);
    assert!(a.npv_cost > dec!(990) + dec!(50));
    assert!(a.npv_cost < undiscounted);
}
