use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::config::{DEFAULT_DISCOUNT_RATE, HORIZON_YEAR};
use crate::scenarios::{AbatementMeasure, Scenario};
use crate::time_value::{discount_factor, validate_discount_rate};
use crate::types::{with_metadata, ComputationOutput, Money, Rate, ScopeSplit, Tonnes, Year};
use crate::PathwayResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Bubble-chart coordinates for one measure: x is cumulative abatement,
/// y is NPV cost, radius is the average abatement while ramping up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoffPoint {
    pub measure_id: String,
    pub label: String,
    pub cumulative_abatement_to_2050: Tonnes,
    /// capex + discounted opex
    pub npv_cost: Money,
    pub avg_annual_abatement_during_build: Tonnes,
}

fn default_discount_rate() -> Rate {
    DEFAULT_DISCOUNT_RATE
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoffInput {
    pub scenario: Scenario,
    pub baseline_by_scope: ScopeSplit,
    pub base_year: Year,
    #[serde(default = "default_discount_rate")]
    pub discount_rate: Rate,
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

fn payoff_point(
    measure: &AbatementMeasure,
    baseline_by_scope: &ScopeSplit,
    base_year: Year,
    discount_rate: Rate,
) -> PayoffPoint {
    let window = measure.window(base_year);
    let reduction = measure.reduction_pct.max(Decimal::ZERO).min(dec!(100));
    let full_abatement = baseline_by_scope.get(measure.scope) * (reduction / dec!(100));

    let mut cumulative = Decimal::ZERO;
    let mut discounted_opex = Decimal::ZERO;
    let mut build_total = Decimal::ZERO;
    let mut build_years = 0u32;

    let first = window.start.max(base_year);
    let last = window.end().saturating_sub(1).min(HORIZON_YEAR);
    for year in first..=last {
        let abatement = window.ramped(full_abatement, year);
        cumulative = cumulative.saturating_add(abatement);
        if !measure.opex.is_zero() {
            let periods = u32::try_from(i64::from(year) - i64::from(window.start)).unwrap_or(u32::MAX);
            let opex = measure.opex.saturating_mul(discount_factor(discount_rate, periods));
            discounted_opex = discounted_opex.saturating_add(opex);
        }
        if window.is_ramping(year) {
            build_total = build_total.saturating_add(abatement);
            build_years += 1;
        }
    }

    let avg_annual_abatement_during_build = if build_years > 0 {
        build_total / Decimal::from(build_years)
    } else {
        full_abatement
    };

    PayoffPoint {
        measure_id: measure.id.clone(),
        label: measure.label().to_string(),
        cumulative_abatement_to_2050: cumulative,
        npv_cost: measure.capex.saturating_add(discounted_opex),
        avg_annual_abatement_during_build,
    }
}

/// One payoff point per measure, in scenario order.
///
/// Each measure is evaluated alone against its own scope's baseline, over its
/// active years clamped to `[base_year, 2050]`. Opex in year Y is discounted
/// by `(1 + rate)^(Y - start)`. A rate at or below -100% is replaced by 0.
pub fn compute_payoff(
    scenario: &Scenario,
    baseline_by_scope: &ScopeSplit,
    base_year: Year,
    discount_rate: Rate,
) -> Vec<PayoffPoint> {
    let rate = if validate_discount_rate(discount_rate).is_ok() {
        discount_rate
    } else {
        warn!(%discount_rate, "discount rate at or below -100%; using 0");
        Decimal::ZERO
    };

    scenario
        .measures
        .iter()
        .map(|m| payoff_point(m, baseline_by_scope, base_year, rate))
        .collect()
}

pub fn calculate_payoff(input: &PayoffInput) -> PathwayResult<ComputationOutput<Vec<PayoffPoint>>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_discount_rate(input.discount_rate)?;
    crate::trajectory::bau::validate_baseline(&input.baseline_by_scope)?;

    for m in &input.scenario.measures {
        let start_year = m.start_or(input.base_year);
        if start_year < input.base_year {
            warnings.push(format!(
                "Measure '{}' starts before {}; only years from the base year are counted",
                m.label(),
                input.base_year
            ));
        }
        if start_year > HORIZON_YEAR {
            warnings.push(format!(
                "Measure '{}' starts after {HORIZON_YEAR}; payoff is capex only",
                m.label()
            ));
        }
    }

    let points = compute_payoff(
        &input.scenario,
        &input.baseline_by_scope,
        input.base_year,
        input.discount_rate,
    );

    debug!(scenario = %input.scenario.id, points = points.len(), "payoff computed");

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Per-measure cumulative abatement to 2050 and NPV of capex plus discounted opex",
        &serde_json::json!({
            "base_year": input.base_year,
            "discount_rate": input.discount_rate.to_string(),
            "horizon_year": HORIZON_YEAR,
            "site_apportionment": false,
        }),
        warnings,
        elapsed,
        points,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Scope;

    fn measure(id: &str) -> AbatementMeasure {
        AbatementMeasure {
            id: id.into(),
            name: String::new(),
            scope: Scope::Scope1,
            reduction_pct: dec!(50),
            start_year: Some(2048),
            is_permanent: true,
            lifecycle_years: 1,
            is_instant: true,
            ramp_years: 1,
            capex: dec!(10000),
            opex: dec!(0),
            applies_to_whole_org: true,
            target_node_id: None,
            exclusive_with: vec![],
        }
    }

    fn scenario(measures: Vec<AbatementMeasure>) -> Scenario {
        Scenario {
            id: "s".into(),
            name: String::new(),
            use_bau_growth: true,
            custom_growth: None,
            measures,
        }
    }

    fn baseline() -> ScopeSplit {
        ScopeSplit::new(dec!(1000), dec!(400))
    }

    #[test]
    fn test_permanent_instant_runs_to_horizon() {
        let pts = compute_payoff(&scenario(vec![measure("m")]), &baseline(), 2024, dec!(0.07));
        // 2048, 2049, 2050 at 500 t
        assert_eq!(pts[0].cumulative_abatement_to_2050, dec!(1500));
        assert_eq!(pts[0].npv_cost, dec!(10000));
        assert_eq!(pts[0].avg_annual_abatement_during_build, dec!(500));
        assert_eq!(pts[0].label, "m");
    }

    #[test]
    fn test_opex_discounted_from_start() {
        let mut m = measure("m");
        m.opex = dec!(1070);
        m.start_year = Some(2049);
        m.capex = Decimal::ZERO;
        let pts = compute_payoff(&scenario(vec![m]), &baseline(), 2024, dec!(0.07));
        // 1070 + 1070 / 1.07
        assert!((pts[0].npv_cost - dec!(2070)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_ramp_average_and_scope_baseline() {
        let mut m = measure("m");
        m.scope = Scope::Scope2;
        m.is_instant = false;
        m.ramp_years = 4;
        m.is_permanent = false;
        m.lifecycle_years = 10;
        m.start_year = Some(2030);
        let pts = compute_payoff(&scenario(vec![m]), &baseline(), 2024, dec!(0.07));
        // full = 200 t; ramp 50, 100, 150, 200 then six years at 200
        assert_eq!(pts[0].avg_annual_abatement_during_build, dec!(125));
        assert_eq!(pts[0].cumulative_abatement_to_2050, dec!(1700));
    }

    #[test]
    fn test_start_before_base_year_is_clamped() {
        let mut m = measure("m");
        m.is_permanent = false;
        m.lifecycle_years = 5;
        m.start_year = Some(2020);
        m.is_instant = false;
        m.ramp_years = 2;
        let pts = compute_payoff(&scenario(vec![m]), &baseline(), 2024, dec!(0.07));
        // only 2024 counts, ramp finished
        assert_eq!(pts[0].cumulative_abatement_to_2050, dec!(500));
        assert_eq!(pts[0].avg_annual_abatement_during_build, dec!(500));
    }

    #[test]
    fn test_huge_lifecycle_and_ramp_are_clamped() {
        let mut m = measure("m");
        m.is_permanent = false;
        m.lifecycle_years = 2_147_483_000;
        m.is_instant = false;
        m.ramp_years = u32::MAX;
        m.opex = dec!(100);
        let pts = compute_payoff(&scenario(vec![m]), &baseline(), 2024, dec!(0.07));
        // 2048..=2050, each a sliver of the 500 t full abatement
        assert!(pts[0].cumulative_abatement_to_2050 > Decimal::ZERO);
        assert!(pts[0].cumulative_abatement_to_2050 < dec!(0.001));
        assert!((pts[0].npv_cost - dec!(10280.80)).abs() < dec!(0.01));
    }

    #[test]
    fn test_degenerate_rate_falls_back_to_zero() {
        let mut m = measure("m");
        m.opex = dec!(100);
        m.capex = Decimal::ZERO;
        let pts = compute_payoff(&scenario(vec![m]), &baseline(), 2024, dec!(-2));
        assert_eq!(pts[0].npv_cost, dec!(300));
    }

    #[test]
    fn test_calculate_payoff_rejects_degenerate_rate() {
        let input = PayoffInput {
            scenario: scenario(vec![measure("m")]),
            baseline_by_scope: baseline(),
            base_year: 2024,
            discount_rate: dec!(-1),
        };
        assert!(calculate_payoff(&input).is_err());
    }

    #[test]
    fn test_input_default_rate() {
        let input: PayoffInput = serde_json::from_value(serde_json::json!({
            "scenario": {"id": "s", "measures": []},
            "baseline_by_scope": {"scope1": 10, "scope2": 0},
            "base_year": 2024
        }))
        .unwrap();
        assert_eq!(input.discount_rate, dec!(0.07));
        assert!(calculate_payoff(&input).unwrap().result.is_empty());
    }
}
