//! End-to-end dashboard analysis: baseline, BAU, target, every scenario, the
//! MACC for one scenario and payoff points for all of them, from a single
//! request.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::config::{AnalysisSettings, DEFAULT_BASE_YEAR, HORIZON_YEAR, MILESTONE_YEARS};
use crate::inventory::baseline::aggregate_with_warnings;
use crate::inventory::{
    ActivityStore, BaselineSnapshot, InventoryYear, NodeIndicatorMapping, OrgIndex, OrgNode,
    ReferenceTables,
};
use crate::macc::{compute_macc, MaccCurve};
use crate::payoff::{compute_payoff, PayoffPoint};
use crate::scenarios::engine::measure_warnings;
use crate::scenarios::{compute_scenario_detailed, ExclusionEvent, Scenario, ScenarioContext};
use crate::time_value::validate_discount_rate;
use crate::trajectory::{
    compute_bau_by_scope, compute_target, sbti_checkpoints, SbtiCheckpoints, ScopeTrajectories,
};
use crate::types::{
    deserialize_id, with_metadata, ComputationOutput, EmissionsTrajectory, GrowthRates, Tonnes,
    Year,
};
use crate::PathwayResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisInput {
    #[serde(default)]
    pub inventory_years: Vec<InventoryYear>,
    /// Inventory year whose activity data is the baseline
    #[serde(deserialize_with = "deserialize_id")]
    pub inventory_year_id: String,
    pub org_tree: Vec<OrgNode>,
    #[serde(default)]
    pub reference: ReferenceTables,
    #[serde(default)]
    pub activity: ActivityStore,
    #[serde(default)]
    pub node_indicators: NodeIndicatorMapping,
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
    #[serde(default)]
    pub settings: AnalysisSettings,
}

/// Scenario, BAU and target values in one reporting year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub year: Year,
    pub scenario: Tonnes,
    pub bau: Tonnes,
    pub target: Tonnes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub milestones: Vec<Milestone>,
    /// Sum over all years of BAU minus scenario (tonne-years)
    pub cumulative_abatement: Tonnes,
    /// Scenario minus target in 2050; positive means above target
    pub gap_to_target_2050: Tonnes,
    pub on_track: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub scenario_id: String,
    pub name: String,
    pub growth: GrowthRates,
    pub trajectory: EmissionsTrajectory,
    pub by_scope: ScopeTrajectories,
    pub exclusions: Vec<ExclusionEvent>,
    pub summary: ScenarioSummary,
    pub payoff: Vec<PayoffPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutput {
    pub base_year: Year,
    pub baseline: BaselineSnapshot,
    pub bau: EmissionsTrajectory,
    pub bau_by_scope: ScopeTrajectories,
    pub target: EmissionsTrajectory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sbti_checkpoints: Option<SbtiCheckpoints>,
    pub scenarios: Vec<ScenarioOutcome>,
    /// Absent when there are no scenarios
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macc_scenario_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macc: Option<MaccCurve>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn resolve_base_year(input: &AnalysisInput, warnings: &mut Vec<String>) -> Year {
    match input
        .inventory_years
        .iter()
        .find(|y| y.id == input.inventory_year_id)
    {
        Some(year) => year.calendar_year,
        None => {
            warn!(inventory_year_id = %input.inventory_year_id, "unknown inventory year");
            warnings.push(format!(
                "Inventory year '{}' not found; base year defaults to {DEFAULT_BASE_YEAR}",
                input.inventory_year_id
            ));
            DEFAULT_BASE_YEAR
        }
    }
}

fn value_or_zero(trajectory: &EmissionsTrajectory, year: Year) -> Tonnes {
    trajectory.value_at(year).unwrap_or(Decimal::ZERO)
}

fn summarise(
    trajectory: &EmissionsTrajectory,
    bau: &EmissionsTrajectory,
    target: &EmissionsTrajectory,
) -> ScenarioSummary {
    let milestones = MILESTONE_YEARS
        .iter()
        .filter(|&&year| trajectory.value_at(year).is_some())
        .map(|&year| Milestone {
            year,
            scenario: value_or_zero(trajectory, year),
            bau: value_or_zero(bau, year),
            target: value_or_zero(target, year),
        })
        .collect();

    let gap = value_or_zero(trajectory, HORIZON_YEAR) - value_or_zero(target, HORIZON_YEAR);

    ScenarioSummary {
        milestones,
        cumulative_abatement: bau.cumulative().saturating_sub(trajectory.cumulative()),
        gap_to_target_2050: gap,
        on_track: gap <= Decimal::ZERO,
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

pub fn run_analysis(input: &AnalysisInput) -> PathwayResult<ComputationOutput<AnalysisOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let settings = &input.settings;

    validate_discount_rate(settings.discount_rate)?;

    // -- Baseline --
    let base_year = resolve_base_year(input, &mut warnings);
    let org = OrgIndex::build(&input.org_tree);
    let (baseline, baseline_warnings) = aggregate_with_warnings(
        &input.inventory_year_id,
        &org,
        &input.reference,
        &input.activity,
        &input.node_indicators,
    );
    warnings.extend(baseline_warnings);
    let baseline_by_scope = baseline.by_scope();

    // -- BAU and target --
    let bau_by_scope = compute_bau_by_scope(&baseline_by_scope, &settings.growth, base_year);
    let bau = bau_by_scope.combined();
    let target = compute_target(
        baseline.total(),
        base_year,
        settings.target.reduction_pct,
        settings.target.sbti_aligned,
    );
    let checkpoints = settings
        .target
        .sbti_aligned
        .then(|| sbti_checkpoints(baseline.total(), base_year));

    // -- Scenarios --
    let ctx = ScenarioContext::from_baseline(&baseline, base_year).with_policy(settings.exclusion_policy);
    let mut outcomes = Vec::with_capacity(input.scenarios.len());
    for scenario in &input.scenarios {
        let growth = scenario.resolve_growth(&settings.growth);
        for w in measure_warnings(&ctx, scenario) {
            warnings.push(format!("{}: {w}", scenario.id));
        }

        let detail = compute_scenario_detailed(&ctx, &growth, &scenario.measures);
        let scenario_bau = if growth == settings.growth {
            bau.clone()
        } else {
            compute_bau_by_scope(&baseline_by_scope, &growth, base_year).combined()
        };
        let summary = summarise(&detail.total, &scenario_bau, &target);
        let payoff = compute_payoff(scenario, &baseline_by_scope, base_year, settings.discount_rate);

        outcomes.push(ScenarioOutcome {
            scenario_id: scenario.id.clone(),
            name: scenario.name.clone(),
            growth,
            trajectory: detail.total,
            by_scope: detail.by_scope,
            exclusions: detail.exclusions,
            summary,
            payoff,
        });
    }

    // -- MACC --
    let macc_scenario = match settings.macc_scenario_id.as_deref() {
        Some(id) => match input.scenarios.iter().find(|s| s.id == id) {
            Some(s) => Some(s),
            None => {
                warnings.push(format!(
                    "MACC scenario '{id}' not found; using the first scenario"
                ));
                input.scenarios.first()
            }
        },
        None => input.scenarios.first(),
    };
    let macc = macc_scenario.map(|scenario| {
        let growth = scenario.resolve_growth(&settings.growth);
        let scenario_bau = compute_bau_by_scope(&baseline_by_scope, &growth, base_year).combined();
        compute_macc(scenario, settings.macc_year, baseline.total(), &scenario_bau)
    });

    debug!(
        base_year,
        scenarios = outcomes.len(),
        baseline = %baseline.total(),
        "analysis complete"
    );

    let output = AnalysisOutput {
        base_year,
        baseline,
        bau,
        bau_by_scope,
        target,
        sbti_checkpoints: checkpoints,
        scenarios: outcomes,
        macc_scenario_id: macc_scenario.map(|s| s.id.clone()),
        macc,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Baseline aggregation, BAU and target paths, scenario trajectories, MACC and payoff",
        &serde_json::json!({
            "inventory_year_id": input.inventory_year_id,
            "base_year": base_year,
            "settings": settings,
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn flat(value: Decimal, from: Year) -> EmissionsTrajectory {
        let mut t = EmissionsTrajectory::default();
        for year in from..=HORIZON_YEAR {
            t.push(year, value);
        }
        t
    }

    #[test]
    fn test_summary_milestones_and_gap() {
        let scenario = flat(dec!(600), 2024);
        let bau = flat(dec!(1000), 2024);
        let target = flat(dec!(500), 2024);
        let s = summarise(&scenario, &bau, &target);
        assert_eq!(s.milestones.len(), 3);
        assert_eq!(s.milestones[1].year, 2040);
        assert_eq!(s.milestones[1].bau, dec!(1000));
        assert_eq!(s.cumulative_abatement, dec!(10800));
        assert_eq!(s.gap_to_target_2050, dec!(100));
        assert!(!s.on_track);
    }

    #[test]
    fn test_summary_skips_years_before_base() {
        let t = flat(dec!(10), 2035);
        let s = summarise(&t, &t, &t);
        let years: Vec<Year> = s.milestones.iter().map(|m| m.year).collect();
        assert_eq!(years, vec![2040, 2050]);
        assert!(s.on_track);
    }
}
