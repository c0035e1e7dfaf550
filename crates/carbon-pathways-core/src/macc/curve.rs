//! Marginal abatement cost curve.
//!
//! Covers:
//! 1. **Annualised cost** -- capex spread over the amortisation period plus opex.
//! 2. **Annual abatement** -- each measure on its own at the analysis year,
//!    scaled by BAU growth since the base year.
//! 3. **Curve layout** -- blocks sorted by cost per tonne and laid end to end.
//!
//! Exclusivity between measures is not applied: every block
//! answers "what if this measure alone were active".

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::config::{DEFAULT_BASE_YEAR, DEFAULT_MACC_YEAR};
use crate::error::PathwayError;
use crate::scenarios::{AbatementMeasure, Scenario};
use crate::trajectory::compute_bau;
use crate::types::{
    with_metadata, ComputationOutput, EmissionsTrajectory, GrowthRates, Money, Tonnes, Year,
};
use crate::PathwayResult;

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

/// One rectangle of the curve: width is abatement, height is cost per tonne.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaccBlock {
    pub measure_id: String,
    pub label: String,
    /// Cost per tonne abated (currency/tCO2e).
    pub marginal_cost: Money,
    pub x_start: Tonnes,
    pub x_end: Tonnes,
    /// capex / amortisation years + opex.
    pub annualized_cost: Money,
    /// Tonnes abated in the analysis year.
    pub annual_abatement: Tonnes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaccCurve {
    pub analysis_year: Year,
    /// BAU in the analysis year relative to the base year.
    pub bau_growth_factor: Decimal,
    /// Sorted ascending by marginal cost.
    pub blocks: Vec<MaccBlock>,
    /// Right edge of the last block.
    pub total_abatement: Tonnes,
}

fn default_macc_year() -> Year {
    DEFAULT_MACC_YEAR
}

/// Input for a stand-alone MACC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaccInput {
    pub scenario: Scenario,
    /// Total baseline emissions (tCO2e).
    pub baseline_total: Tonnes,
    pub base_year: Year,
    #[serde(default = "default_macc_year")]
    pub analysis_year: Year,
    /// Global BAU growth, used when `bau` is not supplied.
    #[serde(default)]
    pub growth: GrowthRates,
    /// Precomputed BAU trajectory; derived from the baseline when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bau: Option<EmissionsTrajectory>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `bau[analysis_year] / bau[base_year]`: 0 when the base value is zero, 1
/// when the analysis year is not covered.
pub fn bau_growth_factor(bau: &EmissionsTrajectory, analysis_year: Year) -> Decimal {
    let Some(at_year) = bau.value_at(analysis_year) else {
        return Decimal::ONE;
    };
    match bau.values.first() {
        Some(base) if !base.is_zero() => at_year.checked_div(*base).unwrap_or(Decimal::MAX),
        _ => Decimal::ZERO,
    }
}

fn annualized_cost(measure: &AbatementMeasure) -> Money {
    (measure.capex / Decimal::from(measure.amortisation_years())).saturating_add(measure.opex)
}

/// Cost per tonne, saturating when a sliver of abatement carries the cost.
fn marginal_cost(annualized_cost: Money, annual_abatement: Tonnes) -> Money {
    annualized_cost.checked_div(annual_abatement).unwrap_or(
        if annualized_cost.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        },
    )
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Build the curve for a scenario's measures at `analysis_year`.
///
/// The base year is the first year of `bau`. Measures with no abatement in
/// the analysis year are left off the curve. Ties in marginal cost keep the
/// scenario's measure order.
pub fn compute_macc(
    scenario: &Scenario,
    analysis_year: Year,
    baseline_total: Tonnes,
    bau: &EmissionsTrajectory,
) -> MaccCurve {
    let base_year = bau.first_year().unwrap_or(DEFAULT_BASE_YEAR);
    let growth_factor = bau_growth_factor(bau, analysis_year);

    let mut blocks: Vec<MaccBlock> = scenario
        .measures
        .iter()
        .filter(|m| m.reduction_pct > Decimal::ZERO)
        .filter_map(|m| {
            let window = m.window(base_year);
            let effectiveness = m
                .effectiveness_at(analysis_year, &window)
                .min(dec!(100));
            let annual_abatement =
                (baseline_total * (effectiveness / dec!(100))).saturating_mul(growth_factor);
            if annual_abatement <= Decimal::ZERO {
                return None;
            }
            let annualized_cost = annualized_cost(m);
            Some(MaccBlock {
                measure_id: m.id.clone(),
                label: m.label().to_string(),
                marginal_cost: marginal_cost(annualized_cost, annual_abatement),
                x_start: Decimal::ZERO,
                x_end: Decimal::ZERO,
                annualized_cost,
                annual_abatement,
            })
        })
        .collect();

    // sort_by is stable
    blocks.sort_by(|a, b| a.marginal_cost.cmp(&b.marginal_cost));

    let mut cursor = Decimal::ZERO;
    for block in &mut blocks {
        block.x_start = cursor;
        cursor = cursor.saturating_add(block.annual_abatement);
        block.x_end = cursor;
    }

    debug!(
        analysis_year,
        blocks = blocks.len(),
        total = %cursor,
        "macc built"
    );

    MaccCurve {
        analysis_year,
        bau_growth_factor: growth_factor,
        blocks,
        total_abatement: cursor,
    }
}

pub fn calculate_macc(input: &MaccInput) -> PathwayResult<ComputationOutput<MaccCurve>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    // -- Validation --
    if input.baseline_total < Decimal::ZERO {
        return Err(PathwayError::InvalidInput {
            field: "baseline_total".into(),
            reason: "Baseline emissions cannot be negative".into(),
        });
    }
    for (i, m) in input.scenario.measures.iter().enumerate() {
        if m.capex < Decimal::ZERO || m.opex < Decimal::ZERO {
            warnings.push(format!(
                "measures[{i}] '{}' has negative costs; its marginal cost is a saving",
                m.label()
            ));
        }
    }

    let bau = match &input.bau {
        Some(bau) => {
            if let Some(first) = bau.first_year().filter(|y| *y != input.base_year) {
                warn!(base_year = input.base_year, bau_start = first, "bau does not start at the base year");
                warnings.push(format!(
                    "Supplied BAU starts in {first}, not the base year {}; {first} is used as the base year",
                    input.base_year
                ));
            }
            bau.clone()
        }
        None => compute_bau(
            input.baseline_total,
            &input.scenario.resolve_growth(&input.growth),
            input.base_year,
        ),
    };
    if bau.value_at(input.analysis_year).is_none() {
        warnings.push(format!(
            "Analysis year {} is outside the BAU trajectory; growth factor set to 1",
            input.analysis_year
        ));
    }

    let curve = compute_macc(&input.scenario, input.analysis_year, input.baseline_total, &bau);

    let on_curve = curve.blocks.len();
    let candidates = input
        .scenario
        .measures
        .iter()
        .filter(|m| m.reduction_pct > Decimal::ZERO)
        .count();
    if on_curve < candidates {
        warnings.push(format!(
            "{} measure(s) have no abatement in {} and are left off the curve",
            candidates - on_curve,
            input.analysis_year
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "MACC: (capex / lifecycle + opex) / annual abatement, sorted ascending",
        &serde_json::json!({
            "analysis_year": input.analysis_year,
            "base_year": bau.first_year().unwrap_or(input.base_year),
            "permanent_amortisation_years": crate::config::PERMANENT_MACC_LIFECYCLE,
            "exclusivity_applied": false,
        }),
        warnings,
        elapsed,
        curve,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
