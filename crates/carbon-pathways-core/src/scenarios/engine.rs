use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Instant;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::measure::{AbatementMeasure, Scenario};
use crate::config::{ExclusionPolicy, HORIZON_YEAR};
use crate::inventory::BaselineSnapshot;
use crate::trajectory::{compute_bau_by_scope, ScopeTrajectories};
use crate::types::{
    with_metadata, ComputationOutput, EmissionsTrajectory, GrowthRates, Percent, ScopeSplit,
    Tonnes, Year,
};
use crate::PathwayResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Baseline facts a scenario is projected from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioContext {
    pub base_year: Year,
    pub baseline_by_scope: ScopeSplit,
    /// Baseline per organisation node (sites and their ancestors)
    #[serde(default)]
    pub baseline_by_node: BTreeMap<String, ScopeSplit>,
    #[serde(default)]
    pub exclusion_policy: ExclusionPolicy,
}

impl ScenarioContext {
    pub fn from_baseline(snapshot: &BaselineSnapshot, base_year: Year) -> Self {
        Self {
            base_year,
            baseline_by_scope: snapshot.by_scope(),
            baseline_by_node: snapshot.by_node.clone(),
            exclusion_policy: ExclusionPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ExclusionPolicy) -> Self {
        self.exclusion_policy = policy;
        self
    }

    /// Fraction of the scope baseline a node-targeted measure acts on.
    /// Zero when the node is unknown or the scope has no baseline.
    fn node_share(&self, measure: &AbatementMeasure) -> Decimal {
        let Some(node_id) = measure.target_node_id.as_deref() else {
            return Decimal::ZERO;
        };
        let Some(node) = self.baseline_by_node.get(node_id) else {
            return Decimal::ZERO;
        };
        let total = self.baseline_by_scope.get(measure.scope);
        if total <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        node.get(measure.scope).checked_div(total).unwrap_or(Decimal::ONE)
    }
}

/// A measure skipped in a year because of mutual exclusivity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionEvent {
    pub year: Year,
    pub measure_id: String,
    /// The earlier measure that blocked it
    pub excluded_by: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioDetail {
    /// Scope 1 + Scope 2 residual
    pub total: EmissionsTrajectory,
    pub by_scope: ScopeTrajectories,
    pub exclusions: Vec<ExclusionEvent>,
}

/// Input for a single scenario projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioInput {
    pub context: ScenarioContext,
    /// Global BAU growth; scenarios may override it
    #[serde(default)]
    pub growth: GrowthRates,
    pub scenario: Scenario,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioOutput {
    pub scenario_id: String,
    pub scenario_name: String,
    pub growth: GrowthRates,
    pub trajectory: EmissionsTrajectory,
    pub by_scope: ScopeTrajectories,
    /// BAU under the same growth, for comparison
    pub bau: EmissionsTrajectory,
    pub exclusions: Vec<ExclusionEvent>,
    pub horizon_value: Tonnes,
    /// Sum over all years of BAU minus scenario (tonne-years)
    pub cumulative_abatement: Tonnes,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Project a scenario: per-scope BAU with the measures applied in declaration
/// order to each year's residual.
pub fn compute_scenario(
    ctx: &ScenarioContext,
    growth: &GrowthRates,
    measures: &[AbatementMeasure],
) -> EmissionsTrajectory {
    compute_scenario_detailed(ctx, growth, measures).total
}

/// As [`compute_scenario`], also returning per-scope residuals and the
/// exclusivity decisions taken each year.
pub fn compute_scenario_detailed(
    ctx: &ScenarioContext,
    growth: &GrowthRates,
    measures: &[AbatementMeasure],
) -> ScenarioDetail {
    let bau = compute_bau_by_scope(&ctx.baseline_by_scope, growth, ctx.base_year);
    let windows: Vec<_> = measures.iter().map(|m| m.window(ctx.base_year)).collect();
    let shares: Vec<Decimal> = measures
        .iter()
        .map(|m| {
            if m.is_node_targeted() {
                ctx.node_share(m)
            } else {
                Decimal::ONE
            }
        })
        .collect();

    let mut detail = ScenarioDetail {
        total: EmissionsTrajectory::with_capacity(bau.scope1.len()),
        by_scope: ScopeTrajectories {
            scope1: EmissionsTrajectory::with_capacity(bau.scope1.len()),
            scope2: EmissionsTrajectory::with_capacity(bau.scope2.len()),
        },
        exclusions: Vec::new(),
    };

    for ((year, bau1), bau2) in bau.scope1.iter().zip(bau.scope2.values.iter().copied()) {
        let mut residual = ScopeSplit::new(bau1, bau2);
        let mut applied: HashSet<&str> = HashSet::new();
        // excluded id -> first applied measure listing it
        let mut listed_by: HashMap<&str, &str> = HashMap::new();

        for ((measure, window), share) in measures.iter().zip(&windows).zip(&shares) {
            if !window.is_active(year) {
                continue;
            }

            let blocker = measure
                .exclusive_with
                .iter()
                .map(String::as_str)
                .find(|id| applied.contains(id))
                .or_else(|| match ctx.exclusion_policy {
                    ExclusionPolicy::Symmetric => listed_by.get(measure.id.as_str()).copied(),
                    ExclusionPolicy::Sequential => None,
                });

            if let Some(blocker) = blocker {
                detail.exclusions.push(ExclusionEvent {
                    year,
                    measure_id: measure.id.clone(),
                    excluded_by: blocker.to_string(),
                });
            } else {
                let effectiveness =
                    clamp_pct(measure.effectiveness_at(year, window).saturating_mul(*share));
                let current = residual.get(measure.scope);
                if current > Decimal::ZERO {
                    let reduced = (current - current * (effectiveness / dec!(100))).max(Decimal::ZERO);
                    residual.add(measure.scope, reduced - current);
                }
            }

            // Skipped measures still count as applied.
            applied.insert(measure.id.as_str());
            for excluded in &measure.exclusive_with {
                listed_by.entry(excluded.as_str()).or_insert(measure.id.as_str());
            }
        }

        detail.by_scope.scope1.push(year, residual.scope1);
        detail.by_scope.scope2.push(year, residual.scope2);
        detail.total.push(year, residual.total());
    }

    detail
}

fn clamp_pct(value: Percent) -> Percent {
    value.max(Decimal::ZERO).min(dec!(100))
}

/// Human-readable notes on measures the engine will degrade silently.
pub(crate) fn measure_warnings(ctx: &ScenarioContext, scenario: &Scenario) -> Vec<String> {
    let mut warnings = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for m in &scenario.measures {
        if !seen.insert(m.id.as_str()) {
            warnings.push(format!("Measure id '{}' appears more than once", m.id));
        }
        if m.reduction_pct < Decimal::ZERO || m.reduction_pct > dec!(100) {
            warnings.push(format!(
                "Measure '{}' reduction {}% is clamped to 0-100%",
                m.label(),
                m.reduction_pct
            ));
        }
        let start = m.start_or(ctx.base_year);
        if start < ctx.base_year {
            warnings.push(format!(
                "Measure '{}' starts in {start}, before the base year {}; earlier years are not projected",
                m.label(),
                ctx.base_year
            ));
        } else if start > HORIZON_YEAR {
            warnings.push(format!(
                "Measure '{}' starts after {HORIZON_YEAR} and has no effect",
                m.label()
            ));
        }
        if m.is_node_targeted() {
            match m.target_node_id.as_deref() {
                None => {
                    warn!(measure = %m.id, "node-targeted measure without a node");
                    warnings.push(format!(
                        "Measure '{}' targets a single node but names none; it has no effect",
                        m.label()
                    ));
                }
                Some(node) if !ctx.baseline_by_node.contains_key(node) => {
                    warn!(measure = %m.id, node, "measure targets unknown node");
                    warnings.push(format!(
                        "Measure '{}' targets unknown node '{node}'; it has no effect",
                        m.label()
                    ));
                }
                Some(_) => {}
            }
        }
    }
    warnings
}

pub fn calculate_scenario(input: &ScenarioInput) -> PathwayResult<ComputationOutput<ScenarioOutput>> {
    let start = Instant::now();

    crate::trajectory::bau::validate_baseline(&input.context.baseline_by_scope)?;

    let ctx = &input.context;
    let scenario = &input.scenario;
    let growth = scenario.resolve_growth(&input.growth);
    let mut warnings = measure_warnings(ctx, scenario);

    let detail = compute_scenario_detailed(ctx, &growth, &scenario.measures);
    let bau = compute_bau_by_scope(&ctx.baseline_by_scope, &growth, ctx.base_year).combined();

    for event in &detail.exclusions {
        warn!(year = event.year, measure = %event.measure_id, by = %event.excluded_by, "measure excluded");
    }
    if !detail.exclusions.is_empty() {
        let mut reported: HashSet<(&str, &str)> = HashSet::new();
        for event in &detail.exclusions {
            let pair = (event.measure_id.as_str(), event.excluded_by.as_str());
            if reported.insert(pair) {
                warnings.push(format!(
                    "Measure '{}' is excluded by '{}' in some years",
                    pair.0, pair.1
                ));
            }
        }
    }

    let cumulative_abatement = bau.cumulative().saturating_sub(detail.total.cumulative());
    let horizon_value = detail.total.last_value().unwrap_or(Decimal::ZERO);

    debug!(
        scenario = %scenario.id,
        measures = scenario.measures.len(),
        horizon = %horizon_value,
        "scenario projected"
    );

    let output = ScenarioOutput {
        scenario_id: scenario.id.clone(),
        scenario_name: scenario.name.clone(),
        growth,
        trajectory: detail.total,
        by_scope: detail.by_scope,
        bau,
        exclusions: detail.exclusions,
        horizon_value,
        cumulative_abatement,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Per-scope BAU with measures applied in order to the yearly residual",
        &serde_json::json!({
            "base_year": ctx.base_year,
            "exclusion_policy": ctx.exclusion_policy,
            "use_bau_growth": scenario.use_bau_growth,
            "node_apportionment": "initial baseline share applied to live residual",
        }),
        warnings,
        elapsed,
        output,
    ))
}
