use std::collections::BTreeMap;
use std::time::Instant;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::activity::{ActivityStore, NodeIndicatorMapping};
use super::conversion::convert_to_co2e;
use super::org::{OrgIndex, OrgNode};
use super::reference::ReferenceTables;
use crate::config::KG_PER_TONNE;
use crate::types::{deserialize_id, with_metadata, ComputationOutput, Scope, ScopeSplit, Tonnes};
use crate::PathwayResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Emissions per indicator name, split by scope (tCO2e).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorBreakdown {
    pub scope1: BTreeMap<String, Tonnes>,
    pub scope2: BTreeMap<String, Tonnes>,
}

impl IndicatorBreakdown {
    fn add(&mut self, scope: Scope, name: &str, amount: Tonnes) {
        let bucket = match scope {
            Scope::Scope1 => &mut self.scope1,
            Scope::Scope2 => &mut self.scope2,
        };
        let total = bucket.entry(name.to_string()).or_insert(Decimal::ZERO);
        *total = total.saturating_add(amount);
    }
}

/// Baseline emissions for one inventory year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineSnapshot {
    pub inventory_year_id: String,
    pub scope1_total: Tonnes,
    pub scope2_total: Tonnes,
    pub by_indicator: IndicatorBreakdown,
    /// Every site in the tree, including sites without data.
    pub by_site: BTreeMap<String, ScopeSplit>,
    /// Subtree totals for every node (groups and legal entities included).
    pub by_node: BTreeMap<String, ScopeSplit>,
}

impl BaselineSnapshot {
    pub fn by_scope(&self) -> ScopeSplit {
        ScopeSplit::new(self.scope1_total, self.scope2_total)
    }

    pub fn total(&self) -> Tonnes {
        self.scope1_total.saturating_add(self.scope2_total)
    }
}

/// Input for a stand-alone baseline computation.
#[derive(Debug, Clone, Deserialize)]
pub struct BaselineInput {
    #[serde(deserialize_with = "deserialize_id")]
    pub inventory_year_id: String,
    pub org_tree: Vec<OrgNode>,
    #[serde(default)]
    pub reference: ReferenceTables,
    #[serde(default)]
    pub activity: ActivityStore,
    #[serde(default)]
    pub node_indicators: NodeIndicatorMapping,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Sum converted emissions over every site of the organisation for one
/// inventory year.
///
/// Only indicators mapped to a site are read. Indicators tagged `general`
/// contribute to neither scope; unknown indicator ids are skipped.
pub fn aggregate_baseline(
    inventory_year_id: &str,
    org: &OrgIndex,
    tables: &ReferenceTables,
    activity: &ActivityStore,
    mapping: &NodeIndicatorMapping,
) -> BaselineSnapshot {
    aggregate_with_warnings(inventory_year_id, org, tables, activity, mapping).0
}

pub(crate) fn aggregate_with_warnings(
    inventory_year_id: &str,
    org: &OrgIndex,
    tables: &ReferenceTables,
    activity: &ActivityStore,
    mapping: &NodeIndicatorMapping,
) -> (BaselineSnapshot, Vec<String>) {
    let mut warnings = Vec::new();
    let mut snapshot = BaselineSnapshot {
        inventory_year_id: inventory_year_id.to_string(),
        ..Default::default()
    };

    let sites = org.site_ids();
    if sites.is_empty() {
        warnings.push("Organisation tree has no Site nodes; baseline is zero".to_string());
    }

    for site in sites {
        let mut site_split = ScopeSplit::default();
        for indicator_id in mapping.get(site).map(Vec::as_slice).unwrap_or_default() {
            let Some(indicator) = tables.indicator(indicator_id) else {
                warn!(site, indicator_id = %indicator_id, "mapped indicator not in reference tables");
                warnings.push(format!(
                    "Site '{site}' maps unknown indicator '{indicator_id}'; skipped"
                ));
                continue;
            };
            let Some(record) = activity.get(inventory_year_id, site, indicator_id) else {
                continue;
            };
            let Some(scope) = indicator.scope_tag.scope() else {
                continue;
            };
            let kg = record
                .value
                .as_ref()
                .map(|raw| convert_to_co2e(indicator, raw, &record.unit, tables))
                .unwrap_or(Decimal::ZERO);
            let tonnes = kg / KG_PER_TONNE;
            site_split.add(scope, tonnes);
            snapshot.by_indicator.add(scope, &indicator.name, tonnes);
        }
        snapshot
            .by_site
            .entry(site.to_string())
            .or_default()
            .accumulate(&site_split);
        snapshot.scope1_total = snapshot.scope1_total.saturating_add(site_split.scope1);
        snapshot.scope2_total = snapshot.scope2_total.saturating_add(site_split.scope2);
    }

    for node_id in org.node_ids() {
        let mut rollup = ScopeSplit::default();
        for site in org.sites_under(node_id) {
            if let Some(split) = snapshot.by_site.get(site) {
                rollup.accumulate(split);
            }
        }
        snapshot.by_node.insert(node_id.to_string(), rollup);
    }

    debug!(
        inventory_year_id,
        scope1 = %snapshot.scope1_total,
        scope2 = %snapshot.scope2_total,
        sites = snapshot.by_site.len(),
        "baseline aggregated"
    );
    (snapshot, warnings)
}

/// Aggregate the baseline and wrap it in the standard output envelope.
pub fn calculate_baseline(input: &BaselineInput) -> PathwayResult<ComputationOutput<BaselineSnapshot>> {
    let start = Instant::now();

    let org = OrgIndex::build(&input.org_tree);
    let (snapshot, warnings) = aggregate_with_warnings(
        &input.inventory_year_id,
        &org,
        &input.reference,
        &input.activity,
        &input.node_indicators,
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Activity x conversion factor x emission factor, summed over sites (tCO2e)",
        &serde_json::json!({
            "inventory_year_id": input.inventory_year_id,
            "org_nodes": org.len(),
            "activity_records": input.activity.len(),
            "activity_version": input.activity.version(),
        }),
        warnings,
        elapsed,
        snapshot,
    ))
}

// ---------------------------------------------------------------------------
// Memoisation
// ---------------------------------------------------------------------------

/// Single-slot memo for the baseline, keyed by inventory year and activity
/// store version. A new key evicts the previous snapshot.
#[derive(Debug, Default)]
pub struct BaselineMemo {
    entry: Option<((String, u64), BaselineSnapshot)>,
    computations: u64,
}

impl BaselineMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compute<F>(&mut self, inventory_year_id: &str, version: u64, compute: F) -> &BaselineSnapshot
    where
        F: FnOnce() -> BaselineSnapshot,
    {
        let stale = !matches!(
            &self.entry,
            Some(((year, v), _)) if year == inventory_year_id && *v == version
        );
        if stale {
            self.entry = None;
            self.computations += 1;
        }
        let (_, snapshot) = self
            .entry
            .get_or_insert_with(|| ((inventory_year_id.to_string(), version), compute()));
        snapshot
    }

    /// Number of times the memo had to recompute.
    pub fn computations(&self) -> u64 {
        self.computations
    }
}
