//! Engine constants and the caller-facing analysis settings.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{GrowthRates, Percent, Rate, Year};

/// Last projected year of every trajectory.
pub const HORIZON_YEAR: Year = 2050;

/// Last year of growth period 1 (`p1`).
pub const PERIOD_ONE_END: Year = 2030;

/// Last year of growth period 2 (`p2`). Period 3 runs to the horizon.
pub const PERIOD_TWO_END: Year = 2040;

/// Base year used when the selected inventory year cannot be resolved.
pub const DEFAULT_BASE_YEAR: Year = 2024;

/// Reduction reached at the end of the SBTi near-term window.
pub const SBTI_NEAR_TERM_REDUCTION: Percent = dec!(42);

/// Length of the SBTi near-term window, in years after the base year.
pub const SBTI_NEAR_TERM_YEARS: Year = 10;

/// Reduction reached by the horizon year on the SBTi path.
pub const SBTI_LONG_TERM_REDUCTION: Percent = dec!(90);

/// Discount rate applied to measure opex in the payoff view.
pub const DEFAULT_DISCOUNT_RATE: Rate = dec!(0.07);

/// Amortisation period for the capex of a permanent measure on the MACC.
pub const PERMANENT_MACC_LIFECYCLE: u32 = 99;

/// Year the MACC is evaluated at unless the caller picks another.
pub const DEFAULT_MACC_YEAR: Year = 2030;

/// Default manual reduction target (percent below baseline by the horizon).
pub const DEFAULT_TARGET_REDUCTION: Percent = dec!(50);

/// Kilograms per tonne.
pub const KG_PER_TONNE: Decimal = dec!(1000);

/// Years a scenario summary reports explicitly.
pub const MILESTONE_YEARS: [Year; 3] = [2030, 2040, 2050];

/// How mutual exclusivity between measures is resolved within a year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionPolicy {
    /// A measure is skipped when a measure it lists in `exclusive_with` was
    /// already processed earlier in the same year. Order-dependent and
    /// one-directional.
    #[default]
    Sequential,
    /// As `Sequential`, and additionally skipped when an already processed
    /// measure lists this one.
    Symmetric,
}

/// Target path settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetSettings {
    /// Reduction below baseline reached by the horizon (manual mode).
    pub reduction_pct: Percent,
    /// Use the two-segment SBTi 1.5°C path instead of the manual target.
    pub sbti_aligned: bool,
}

impl Default for TargetSettings {
    fn default() -> Self {
        Self {
            reduction_pct: DEFAULT_TARGET_REDUCTION,
            sbti_aligned: false,
        }
    }
}

/// Assumptions shared by every scenario in an analysis request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Global BAU growth, used by scenarios with `use_bau_growth`.
    pub growth: GrowthRates,
    pub target: TargetSettings,
    /// Year the MACC is evaluated at.
    pub macc_year: Year,
    /// Scenario the MACC is built for; the first scenario when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macc_scenario_id: Option<String>,
    pub discount_rate: Rate,
    pub exclusion_policy: ExclusionPolicy,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            growth: GrowthRates::default(),
            target: TargetSettings::default(),
            macc_year: DEFAULT_MACC_YEAR,
            macc_scenario_id: None,
            discount_rate: DEFAULT_DISCOUNT_RATE,
            exclusion_policy: ExclusionPolicy::default(),
        }
    }
}
