use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::config::{HORIZON_YEAR, PERIOD_ONE_END, PERIOD_TWO_END};
use crate::error::PathwayError;
use crate::types::{
    with_metadata, ComputationOutput, EmissionsTrajectory, GrowthRates, Percent, Scope,
    ScopeSplit, Tonnes, Year,
};
use crate::PathwayResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One trajectory per scope over the same years.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeTrajectories {
    pub scope1: EmissionsTrajectory,
    pub scope2: EmissionsTrajectory,
}

impl ScopeTrajectories {
    pub fn get(&self, scope: Scope) -> &EmissionsTrajectory {
        match scope {
            Scope::Scope1 => &self.scope1,
            Scope::Scope2 => &self.scope2,
        }
    }

    /// Scope 1 + Scope 2, year by year.
    pub fn combined(&self) -> EmissionsTrajectory {
        self.scope1.combine(&self.scope2)
    }
}

/// Input for a BAU projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BauInput {
    /// Baseline emissions per scope (tCO2e)
    pub baseline_by_scope: ScopeSplit,
    /// First projected year, normally the inventory year
    pub base_year: Year,
    #[serde(default)]
    pub growth: GrowthRates,
}

/// BAU projection output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BauOutput {
    /// Scope 1 + Scope 2
    pub total: EmissionsTrajectory,
    pub by_scope: ScopeTrajectories,
    /// Total emissions in the horizon year
    pub horizon_value: Tonnes,
    /// Growth from base year to horizon, in percent
    pub growth_to_horizon_pct: Percent,
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Annual growth (percent) applied after emitting `year`.
pub fn growth_rate_for(year: Year, growth: &GrowthRates) -> Percent {
    if year <= PERIOD_ONE_END {
        growth.p1
    } else if year <= PERIOD_TWO_END {
        growth.p2
    } else {
        growth.p3
    }
}

/// Project `baseline` forward from `base_year` through the horizon.
///
/// The value for a year is the running carry; the carry then grows by that
/// year's period rate. Base years past the horizon give an empty trajectory.
/// Rates below -100% would turn the carry negative; it is held at zero
/// instead. A carry that would overflow is held at its last value.
pub fn compute_bau(baseline: Tonnes, growth: &GrowthRates, base_year: Year) -> EmissionsTrajectory {
    project_bau(baseline, growth, base_year).0
}

/// [`compute_bau`], also reporting whether growth overflowed.
pub(crate) fn project_bau(
    baseline: Tonnes,
    growth: &GrowthRates,
    base_year: Year,
) -> (EmissionsTrajectory, bool) {
    if base_year > HORIZON_YEAR {
        return (EmissionsTrajectory::default(), false);
    }

    let span = usize::try_from(i64::from(HORIZON_YEAR) - i64::from(base_year) + 1).unwrap_or(0);
    let mut trajectory = EmissionsTrajectory::with_capacity(span);
    let mut carry = baseline.max(Decimal::ZERO);
    let mut overflowed = false;

    for year in base_year..=HORIZON_YEAR {
        trajectory.push(year, carry);
        let multiplier = Decimal::ONE.saturating_add(growth_rate_for(year, growth) / dec!(100));
        match carry.checked_mul(multiplier) {
            Some(next) => carry = next.max(Decimal::ZERO),
            None => {
                if !overflowed {
                    warn!(year, carry = %carry, "bau growth overflowed; holding carry");
                }
                overflowed = true;
            }
        }
    }

    (trajectory, overflowed)
}

/// Project each scope's baseline independently.
pub fn compute_bau_by_scope(
    baseline: &ScopeSplit,
    growth: &GrowthRates,
    base_year: Year,
) -> ScopeTrajectories {
    ScopeTrajectories {
        scope1: compute_bau(baseline.scope1, growth, base_year),
        scope2: compute_bau(baseline.scope2, growth, base_year),
    }
}

/// Per-scope BAU projection wrapped in the standard output envelope.
pub fn calculate_bau(input: &BauInput) -> PathwayResult<ComputationOutput<BauOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_baseline(&input.baseline_by_scope)?;

    if input.base_year > HORIZON_YEAR {
        warnings.push(format!(
            "Base year {} is after {HORIZON_YEAR}; trajectory is empty",
            input.base_year
        ));
    }
    for (label, rate) in [
        ("p1", input.growth.p1),
        ("p2", input.growth.p2),
        ("p3", input.growth.p3),
    ] {
        if rate < dec!(-100) {
            warnings.push(format!(
                "Growth rate {label} = {rate}% is below -100%; emissions are held at zero"
            ));
        }
    }

    let (scope1, scope1_overflowed) =
        project_bau(input.baseline_by_scope.scope1, &input.growth, input.base_year);
    let (scope2, scope2_overflowed) =
        project_bau(input.baseline_by_scope.scope2, &input.growth, input.base_year);
    if scope1_overflowed || scope2_overflowed {
        warnings.push(
            "Growth overflowed the representable range; emissions are held at the last value".into(),
        );
    }
    let by_scope = ScopeTrajectories { scope1, scope2 };
    let total = by_scope.combined();
    let horizon_value = total.last_value().unwrap_or(Decimal::ZERO);
    let base_total = input.baseline_by_scope.total();
    let growth_to_horizon_pct = if base_total > Decimal::ZERO && !total.is_empty() {
        horizon_value
            .checked_div(base_total)
            .map(|ratio| (ratio - Decimal::ONE).saturating_mul(dec!(100)))
            .unwrap_or(Decimal::MAX)
    } else {
        Decimal::ZERO
    };

    debug!(
        base_year = input.base_year,
        years = total.len(),
        horizon = %horizon_value,
        "bau projected"
    );

    let output = BauOutput {
        total,
        by_scope,
        horizon_value,
        growth_to_horizon_pct,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Compound growth by period: p1 to 2030, p2 2031-2040, p3 2041-2050",
        &serde_json::json!({
            "base_year": input.base_year,
            "horizon_year": HORIZON_YEAR,
            "growth_pct": input.growth,
        }),
        warnings,
        elapsed,
        output,
    ))
}

pub(crate) fn validate_baseline(baseline: &ScopeSplit) -> PathwayResult<()> {
    for (field, value) in [
        ("baseline_by_scope.scope1", baseline.scope1),
        ("baseline_by_scope.scope2", baseline.scope2),
    ] {
        if value < Decimal::ZERO {
            return Err(PathwayError::InvalidInput {
                field: field.into(),
                reason: "Baseline emissions cannot be negative".into(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_years_cover_base_to_horizon() {
        let t = compute_bau(dec!(1000), &GrowthRates::default(), 2024);
        assert_eq!(t.len(), 27);
        assert_eq!(t.first_year(), Some(2024));
        assert_eq!(t.years.last(), Some(&2050));
        assert_eq!(t.values[0], dec!(1000));
    }

    #[test]
    fn test_value_is_carry_before_growth() {
        let growth = GrowthRates::new(dec!(10), dec!(0), dec!(0));
        let t = compute_bau(dec!(100), &growth, 2029);
        assert_eq!(t.value_at(2029), Some(dec!(100)));
        assert_eq!(t.value_at(2030), Some(dec!(110)));
        // growth applied after emitting 2030 is still p1
        assert_eq!(t.value_at(2031), Some(dec!(121)));
        assert_eq!(t.value_at(2032), Some(dec!(121)));
    }

    #[test]
    fn test_period_boundaries() {
        let growth = GrowthRates::new(dec!(0), dec!(10), dec!(50));
        let t = compute_bau(dec!(100), &growth, 2039);
        assert_eq!(t.value_at(2040), Some(dec!(110)));
        assert_eq!(t.value_at(2041), Some(dec!(121)));
        assert_eq!(t.value_at(2042), Some(dec!(181.5)));
    }

    #[test]
    fn test_monotonic_for_positive_growth() {
        let t = compute_bau(dec!(523.7), &GrowthRates::default(), 2022);
        for pair in t.values.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
    }

    #[test]
    fn test_base_year_after_horizon_is_empty() {
        assert!(compute_bau(dec!(10), &GrowthRates::default(), 2051).is_empty());
        assert_eq!(compute_bau(dec!(10), &GrowthRates::default(), 2050).len(), 1);
    }

    #[test]
    fn test_collapse_rate_clamps_at_zero() {
        let growth = GrowthRates::new(dec!(-150), dec!(-150), dec!(-150));
        let t = compute_bau(dec!(10), &growth, 2048);
        assert_eq!(t.values, vec![dec!(10), dec!(0), dec!(0)]);
    }

    #[test]
    fn test_runaway_growth_holds_last_value() {
        let growth = GrowthRates::new(dec!(1000), dec!(1000), dec!(1000));
        let (t, overflowed) = project_bau(dec!(1000), &growth, 2024);
        assert!(overflowed);
        assert_eq!(t.len(), 27);
        assert_eq!(t.value_at(2025), Some(dec!(11000)));
        for pair in t.values.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
        assert_eq!(t.value_at(2050), t.value_at(2049));
    }

    #[test]
    fn test_calculate_bau_warns_on_runaway_growth() {
        let input = BauInput {
            baseline_by_scope: ScopeSplit::new(dec!(1000), dec!(1000)),
            base_year: 2024,
            growth: GrowthRates::new(dec!(1000), dec!(1000), dec!(1000)),
        };
        let out = calculate_bau(&input).unwrap();
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("overflowed"));
        assert!(out.result.horizon_value > dec!(1000));
        assert!(out.result.growth_to_horizon_pct > Decimal::ZERO);
    }

    #[test]
    fn test_calculate_bau_envelope() {
        let input = BauInput {
            baseline_by_scope: ScopeSplit::new(dec!(600), dec!(400)),
            base_year: 2024,
            growth: GrowthRates::flat(),
        };
        let out = calculate_bau(&input).unwrap();
        assert_eq!(out.result.horizon_value, dec!(1000));
        assert_eq!(out.result.growth_to_horizon_pct, Decimal::ZERO);
        assert_eq!(out.result.by_scope.scope1.values[3], dec!(600));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_calculate_bau_rejects_negative_baseline() {
        let input = BauInput {
            baseline_by_scope: ScopeSplit::new(dec!(-1), dec!(0)),
            base_year: 2024,
            growth: GrowthRates::default(),
        };
        assert!(calculate_bau(&input).is_err());
    }
}
