use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{HORIZON_YEAR, PERMANENT_MACC_LIFECYCLE};
use crate::inventory::RawQuantity;
use crate::types::{
    deserialize_id, deserialize_id_list, deserialize_opt_id, GrowthRates, Money, Percent, Scope, Year,
};

// ---------------------------------------------------------------------------
// Abatement measure
// ---------------------------------------------------------------------------

/// A discrete intervention that reduces one scope's emissions by a
/// percentage over an activation window.
///
/// Deserialisation accepts both the canonical field names and the legacy
/// form-editor shape (`reduction`, `permanent: "Yes"`, `groupLevel`, ...),
/// normalising flags to `bool` and lenient numbers to values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "MeasureRecord")]
pub struct AbatementMeasure {
    pub id: String,
    pub name: String,
    pub scope: Scope,
    /// Full effectiveness, percent of the scope residual
    pub reduction_pct: Percent,
    /// First active year; the base year when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_year: Option<Year>,
    pub is_permanent: bool,
    pub lifecycle_years: u32,
    pub is_instant: bool,
    pub ramp_years: u32,
    pub capex: Money,
    /// Annual operating cost
    pub opex: Money,
    pub applies_to_whole_org: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_node_id: Option<String>,
    pub exclusive_with: Vec<String>,
}

/// Resolved activation window of a measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivationWindow {
    pub start: Year,
    /// Active years, `start..start + lifecycle`
    pub lifecycle: i32,
    /// Years to reach full effectiveness, at least 1
    pub ramp: i32,
}

impl ActivationWindow {
    pub fn is_active(&self, year: Year) -> bool {
        self.start <= year && year < self.end()
    }

    /// Exclusive end year.
    pub fn end(&self) -> Year {
        self.start.saturating_add(self.lifecycle)
    }

    pub fn is_ramping(&self, year: Year) -> bool {
        year < self.start.saturating_add(self.ramp)
    }

    fn ramp_reached(&self, year: Year) -> Decimal {
        Decimal::from(i64::from(year) - i64::from(self.start) + 1)
    }

    /// Share of full effectiveness reached in `year`: `(year - start + 1) / ramp`
    /// during the ramp, 1 afterwards.
    pub fn ramp_factor(&self, year: Year) -> Decimal {
        if self.is_ramping(year) {
            self.ramp_reached(year) / Decimal::from(self.ramp)
        } else {
            Decimal::ONE
        }
    }

    /// `full` scaled by the ramp factor, multiplying before dividing so whole
    /// fractions stay exact.
    pub fn ramped(&self, full: Decimal, year: Year) -> Decimal {
        if !self.is_ramping(year) {
            return full;
        }
        full.checked_mul(self.ramp_reached(year))
            .map(|scaled| scaled / Decimal::from(self.ramp))
            .unwrap_or_else(|| full * self.ramp_factor(year))
    }
}

impl AbatementMeasure {
    pub fn start_or(&self, base_year: Year) -> Year {
        self.start_year.unwrap_or(base_year)
    }

    /// Active years on the trajectory, never past the horizon. Permanent
    /// measures run to the horizon.
    pub fn trajectory_lifecycle(&self, start: Year) -> i32 {
        let to_horizon = (HORIZON_YEAR + 1).saturating_sub(start);
        if self.is_permanent {
            to_horizon
        } else {
            let lifecycle = i32::try_from(self.lifecycle_years.max(1)).unwrap_or(i32::MAX);
            lifecycle.min(to_horizon)
        }
    }

    pub fn amortisation_years(&self) -> u32 {
        if self.is_permanent {
            PERMANENT_MACC_LIFECYCLE
        } else {
            self.lifecycle_years.max(1)
        }
    }

    pub fn effective_ramp_years(&self) -> u32 {
        if self.is_instant {
            1
        } else {
            self.ramp_years.max(1)
        }
    }

    pub fn window(&self, base_year: Year) -> ActivationWindow {
        let start = self.start_or(base_year);
        ActivationWindow {
            start,
            lifecycle: self.trajectory_lifecycle(start),
            ramp: i32::try_from(self.effective_ramp_years()).unwrap_or(i32::MAX),
        }
    }

    /// Ramp-scaled effectiveness in `year`, before node scaling and clamping.
    /// Zero outside the activation window.
    pub fn effectiveness_at(&self, year: Year, window: &ActivationWindow) -> Percent {
        if !window.is_active(year) {
            return Decimal::ZERO;
        }
        window.ramped(self.reduction_pct, year)
    }

    pub fn is_node_targeted(&self) -> bool {
        !self.applies_to_whole_org
    }

    /// Name for charts; falls back to the id.
    pub fn label(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

// ---------------------------------------------------------------------------
// Scenario
// ---------------------------------------------------------------------------

fn default_true() -> bool {
    true
}

/// A named, ordered list of measures. Measure order decides the outcome
/// when measures overlap and is preserved as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Project with the global BAU growth rates
    #[serde(default = "default_true", alias = "useBAUGrowth", alias = "useBauGrowth")]
    pub use_bau_growth: bool,
    #[serde(
        default,
        alias = "growth",
        alias = "customGrowth",
        skip_serializing_if = "Option::is_none"
    )]
    pub custom_growth: Option<GrowthRates>,
    #[serde(default)]
    pub measures: Vec<AbatementMeasure>,
}

impl Scenario {
    /// Growth rates this scenario projects with. Custom growth falls back to
    /// the global rates when none are given.
    pub fn resolve_growth(&self, global: &GrowthRates) -> GrowthRates {
        if self.use_bau_growth {
            *global
        } else {
            self.custom_growth.unwrap_or(*global)
        }
    }
}

// ---------------------------------------------------------------------------
// Wire shape
// ---------------------------------------------------------------------------

/// `true`/`false` or the legacy `"Yes"`/`"No"` strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Text(String),
}

impl Flag {
    fn is_set(&self) -> bool {
        match self {
            Flag::Bool(b) => *b,
            Flag::Text(s) => {
                let s = s.trim();
                s.eq_ignore_ascii_case("yes") || s.eq_ignore_ascii_case("true")
            }
        }
    }
}

fn any_set(flags: &[&Option<Flag>]) -> Option<bool> {
    let present: Vec<bool> = flags.iter().filter_map(|f| f.as_ref().map(Flag::is_set)).collect();
    if present.is_empty() {
        None
    } else {
        Some(present.into_iter().any(|b| b))
    }
}

/// Integer fields are read like the form editor did: truncated, with zero
/// and anything unparseable treated as absent.
fn whole_number(raw: &Option<RawQuantity>) -> Option<i64> {
    raw.as_ref()?
        .as_decimal()
        .trunc()
        .to_i64()
        .filter(|n| *n != 0)
}

fn amount(raw: &Option<RawQuantity>) -> Decimal {
    raw.as_ref().map(RawQuantity::as_decimal).unwrap_or(Decimal::ZERO)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MeasureRecord {
    #[serde(deserialize_with = "deserialize_opt_id")]
    id: Option<String>,
    name: Option<String>,
    scope: Option<Scope>,

    #[serde(alias = "reductionPct")]
    reduction_pct: Option<RawQuantity>,
    reduction: Option<RawQuantity>,

    start_year: Option<RawQuantity>,
    #[serde(rename = "startYear")]
    legacy_start_year: Option<RawQuantity>,

    is_permanent: Option<Flag>,
    #[serde(rename = "isPermanent")]
    legacy_is_permanent: Option<Flag>,
    permanent: Option<Flag>,

    #[serde(alias = "lifecycleYears")]
    lifecycle_years: Option<RawQuantity>,
    lifecycle: Option<RawQuantity>,

    is_instant: Option<Flag>,
    #[serde(rename = "isInstant")]
    legacy_is_instant: Option<Flag>,
    instant: Option<Flag>,

    ramp_years: Option<RawQuantity>,
    #[serde(rename = "rampYears")]
    legacy_ramp_years: Option<RawQuantity>,

    capex: Option<RawQuantity>,
    opex: Option<RawQuantity>,

    #[serde(alias = "appliesToWholeOrg")]
    applies_to_whole_org: Option<Flag>,
    #[serde(rename = "groupLevel")]
    group_level: Option<Flag>,

    #[serde(alias = "targetNodeId", deserialize_with = "deserialize_opt_id")]
    target_node_id: Option<String>,
    #[serde(deserialize_with = "deserialize_opt_id")]
    node: Option<String>,

    #[serde(deserialize_with = "deserialize_id_list")]
    exclusive_with: Vec<String>,
    #[serde(rename = "exclusiveWith", deserialize_with = "deserialize_id_list")]
    legacy_exclusive_with: Vec<String>,
}

impl From<MeasureRecord> for AbatementMeasure {
    fn from(r: MeasureRecord) -> Self {
        let reduction_pct = if r.reduction_pct.is_some() {
            amount(&r.reduction_pct)
        } else {
            amount(&r.reduction)
        };
        let start_year = whole_number(&r.start_year)
            .or_else(|| whole_number(&r.legacy_start_year))
            .and_then(|y| Year::try_from(y).ok());
        let lifecycle_years = whole_number(&r.lifecycle_years)
            .or_else(|| whole_number(&r.lifecycle))
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(1);
        let ramp_years = whole_number(&r.ramp_years)
            .or_else(|| whole_number(&r.legacy_ramp_years))
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(1);

        let mut exclusive_with = r.exclusive_with;
        for id in r.legacy_exclusive_with {
            if !exclusive_with.contains(&id) {
                exclusive_with.push(id);
            }
        }

        AbatementMeasure {
            id: r.id.unwrap_or_default(),
            name: r.name.unwrap_or_default(),
            scope: r.scope.unwrap_or(Scope::Scope1),
            reduction_pct,
            start_year,
            is_permanent: any_set(&[&r.is_permanent, &r.legacy_is_permanent, &r.permanent]).unwrap_or(false),
            lifecycle_years,
            is_instant: any_set(&[&r.is_instant, &r.legacy_is_instant, &r.instant]).unwrap_or(false),
            ramp_years,
            capex: amount(&r.capex),
            opex: amount(&r.opex),
            applies_to_whole_org: any_set(&[&r.applies_to_whole_org, &r.group_level]).unwrap_or(true),
            target_node_id: r.target_node_id.or(r.node),
            exclusive_with,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn parse(json: serde_json::Value) -> AbatementMeasure {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_legacy_form_shape() {
        let m = parse(serde_json::json!({
            "id": 1717000000000_i64,
            "name": "LED retrofit",
            "reduction": "30",
            "scope": "Scope 2",
            "startYear": 2026,
            "permanent": "No",
            "lifecycle": "12",
            "instant": "Yes",
            "capex": "",
            "opex": "1500",
            "groupLevel": false,
            "node": "s1",
            "exclusiveWith": ["m2"]
        }));
        assert_eq!(m.id, "1717000000000");
        assert_eq!(m.scope, Scope::Scope2);
        assert_eq!(m.reduction_pct, dec!(30));
        assert_eq!(m.start_year, Some(2026));
        assert!(!m.is_permanent);
        assert_eq!(m.lifecycle_years, 12);
        assert!(m.is_instant);
        assert_eq!(m.capex, Decimal::ZERO);
        assert_eq!(m.opex, dec!(1500));
        assert!(m.is_node_targeted());
        assert_eq!(m.target_node_id.as_deref(), Some("s1"));
        assert_eq!(m.exclusive_with, vec!["m2".to_string()]);
    }

    #[test]
    fn test_camel_case_shape() {
        let m = parse(serde_json::json!({
            "id": "m1", "name": "Site PV", "scope": "scope2", "reductionPct": 50,
            "startYear": 2027, "isPermanent": false, "lifecycleYears": 10,
            "isInstant": false, "rampYears": 2, "capex": 1000, "opex": 10,
            "appliesToWholeOrg": false, "targetNodeId": "s1", "exclusiveWith": ["m0"]
        }));
        assert_eq!(m.reduction_pct, dec!(50));
        assert_eq!(m.start_year, Some(2027));
        assert_eq!(m.lifecycle_years, 10);
        assert_eq!(m.ramp_years, 2);
        assert!(!m.is_instant);
        assert!(!m.applies_to_whole_org);
        assert_eq!(m.target_node_id.as_deref(), Some("s1"));
        assert_eq!(m.exclusive_with, vec!["m0".to_string()]);

        let s: Scenario = serde_json::from_value(serde_json::json!({
            "id": "s", "useBauGrowth": false, "customGrowth": {"p1": 1, "p2": 1, "p3": 1}
        }))
        .unwrap();
        let one = Decimal::ONE;
        assert_eq!(s.resolve_growth(&GrowthRates::default()), GrowthRates::new(one, one, one));
    }

    #[test]
    fn test_huge_lifecycle_and_ramp_stay_in_range() {
        let m = parse(serde_json::json!({
            "id": "m", "reduction_pct": 50, "start_year": 2030,
            "lifecycle_years": 2147483000_i64, "ramp_years": 4294967295_u64
        }));
        let w = m.window(2024);
        assert_eq!(w.lifecycle, 21);
        assert!(w.is_active(2050));
        assert!(w.is_ramping(2050));
        assert!(m.effectiveness_at(2030, &w) > Decimal::ZERO);
        assert!(m.effectiveness_at(2050, &w) < dec!(0.0001));
    }

    #[test]
    fn test_extreme_start_years_do_not_overflow() {
        let early = AbatementMeasure {
            start_year: Some(i32::MIN),
            ..parse(serde_json::json!({"id": "m", "reduction_pct": 50, "lifecycle_years": 10, "ramp_years": 3}))
        };
        let w = early.window(2024);
        assert_eq!(w.end(), i32::MIN + 10);
        assert_eq!(early.effectiveness_at(2024, &w), Decimal::ZERO);

        let late = AbatementMeasure { start_year: Some(i32::MAX), is_permanent: true, ..early };
        let w = late.window(2024);
        assert!(w.lifecycle <= 0);
        assert!(!w.is_active(2050));
        assert_eq!(late.effectiveness_at(2050, &w), Decimal::ZERO);
    }

    #[test]
    fn test_either_permanent_flag_counts() {
        let m = parse(serde_json::json!({"id": "m", "permanent": "No", "isPermanent": true}));
        assert!(m.is_permanent);
        let m = parse(serde_json::json!({"id": "m", "is_permanent": "yes"}));
        assert!(m.is_permanent);
    }

    #[test]
    fn test_defaults_for_sparse_record() {
        let m = parse(serde_json::json!({"id": "m"}));
        assert_eq!(m.scope, Scope::Scope1);
        assert_eq!(m.start_year, None);
        assert_eq!(m.lifecycle_years, 1);
        assert_eq!(m.ramp_years, 1);
        assert!(m.applies_to_whole_org);
        assert!(m.exclusive_with.is_empty());
    }

    #[test]
    fn test_garbage_start_year_falls_back_to_base() {
        let m = parse(serde_json::json!({"id": "m", "startYear": "soon"}));
        assert_eq!(m.start_or(2024), 2024);
    }

    #[test]
    fn test_canonical_round_trip() {
        let m = parse(serde_json::json!({
            "id": "m1", "name": "Heat pumps", "scope": "scope1", "reduction_pct": 40,
            "start_year": 2027, "is_permanent": true, "lifecycle_years": 15,
            "is_instant": false, "ramp_years": 3, "capex": 250000, "opex": 4000,
            "applies_to_whole_org": true, "exclusive_with": []
        }));
        let back: AbatementMeasure = serde_json::from_value(serde_json::to_value(&m).unwrap()).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn test_window_for_permanent_measure_runs_to_horizon() {
        let m = parse(serde_json::json!({"id": "m", "start_year": 2030, "is_permanent": true}));
        let w = m.window(2024);
        assert_eq!(w.lifecycle, 21);
        assert!(w.is_active(2050));
        assert!(!w.is_active(2029));
        assert_eq!(m.amortisation_years(), 99);
    }

    #[test]
    fn test_ramp_factor() {
        let m = parse(serde_json::json!({
            "id": "m", "reduction_pct": 60, "start_year": 2025, "lifecycle_years": 10, "ramp_years": 3
        }));
        let w = m.window(2024);
        assert_eq!(m.effectiveness_at(2025, &w), dec!(20));
        assert_eq!(m.effectiveness_at(2026, &w), dec!(40));
        assert_eq!(m.effectiveness_at(2027, &w), dec!(60));
        assert_eq!(m.effectiveness_at(2034, &w), dec!(60));
        assert_eq!(m.effectiveness_at(2035, &w), Decimal::ZERO);
    }

    #[test]
    fn test_instant_ignores_ramp_years() {
        let m = parse(serde_json::json!({
            "id": "m", "reduction_pct": 50, "start_year": 2025, "is_instant": true, "ramp_years": 4,
            "lifecycle_years": 5
        }));
        assert_eq!(m.effectiveness_at(2025, &m.window(2024)), dec!(50));
    }

    #[test]
    fn test_scenario_growth_resolution() {
        let global = GrowthRates::default();
        let s: Scenario = serde_json::from_value(serde_json::json!({
            "id": 1, "name": "Custom", "useBAUGrowth": false,
            "growth": {"p1": 0, "p2": 0, "p3": 0}
        }))
        .unwrap();
        assert_eq!(s.id, "1");
        assert_eq!(s.resolve_growth(&global), GrowthRates::flat());

        let s: Scenario = serde_json::from_value(serde_json::json!({
            "id": "s2", "use_bau_growth": false
        }))
        .unwrap();
        assert_eq!(s.resolve_growth(&global), global);
    }
}
