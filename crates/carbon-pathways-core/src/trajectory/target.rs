use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::config::{
    DEFAULT_TARGET_REDUCTION, HORIZON_YEAR, SBTI_LONG_TERM_REDUCTION, SBTI_NEAR_TERM_REDUCTION,
    SBTI_NEAR_TERM_YEARS,
};
use crate::error::PathwayError;
use crate::types::{with_metadata, ComputationOutput, EmissionsTrajectory, Percent, Tonnes, Year};
use crate::PathwayResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Flat reference levels of the SBTi 1.5°C pathway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SbtiCheckpoints {
    pub near_term_year: Year,
    /// baseline x 0.58
    pub near_term_level: Tonnes,
    pub long_term_year: Year,
    /// baseline x 0.10
    pub long_term_level: Tonnes,
}

fn default_reduction() -> Percent {
    DEFAULT_TARGET_REDUCTION
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetInput {
    /// Total baseline emissions (tCO2e)
    pub baseline: Tonnes,
    pub base_year: Year,
    /// Reduction below baseline by the horizon, manual mode only
    #[serde(default = "default_reduction")]
    pub reduction_pct: Percent,
    #[serde(default)]
    pub sbti_aligned: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetOutput {
    pub trajectory: EmissionsTrajectory,
    /// Present on SBTi-aligned paths
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkpoints: Option<SbtiCheckpoints>,
    pub horizon_value: Tonnes,
}

// ---------------------------------------------------------------------------
// Path
// ---------------------------------------------------------------------------

fn pct(value: Percent) -> Decimal {
    value / dec!(100)
}

/// Share of the baseline the target allows in `year`.
fn target_factor(year: Year, base_year: Year, reduction_pct: Percent, sbti_aligned: bool) -> Decimal {
    let elapsed = Decimal::from(i64::from(year) - i64::from(base_year));

    if sbti_aligned {
        let near_end = base_year + SBTI_NEAR_TERM_YEARS;
        if year <= near_end {
            Decimal::ONE
                - pct(SBTI_NEAR_TERM_REDUCTION) * elapsed / Decimal::from(SBTI_NEAR_TERM_YEARS)
        } else {
            // year > near_end implies HORIZON_YEAR > near_end, so the span is positive
            let span = Decimal::from(HORIZON_YEAR - near_end);
            let drop = pct(SBTI_LONG_TERM_REDUCTION) - pct(SBTI_NEAR_TERM_REDUCTION);
            Decimal::ONE - pct(SBTI_NEAR_TERM_REDUCTION)
                - drop * Decimal::from(year - near_end) / span
        }
    } else {
        let span = i64::from(HORIZON_YEAR) - i64::from(base_year);
        if span <= 0 {
            return Decimal::ONE;
        }
        Decimal::ONE.saturating_sub(pct(reduction_pct).saturating_mul(elapsed) / Decimal::from(span))
    }
}

/// Linear target path from `baseline` in `base_year` to the horizon.
///
/// With `sbti_aligned` the path has two segments: -42% over the ten years
/// after the base year, then on to -90% in 2050. Otherwise it is a single
/// line to `-reduction_pct`. Values never drop below zero.
pub fn compute_target(
    baseline: Tonnes,
    base_year: Year,
    reduction_pct: Percent,
    sbti_aligned: bool,
) -> EmissionsTrajectory {
    if base_year > HORIZON_YEAR {
        return EmissionsTrajectory::default();
    }

    let span = usize::try_from(i64::from(HORIZON_YEAR) - i64::from(base_year) + 1).unwrap_or(0);
    let mut trajectory = EmissionsTrajectory::with_capacity(span);
    for year in base_year..=HORIZON_YEAR {
        let factor = target_factor(year, base_year, reduction_pct, sbti_aligned);
        trajectory.push(year, baseline.saturating_mul(factor).max(Decimal::ZERO));
    }
    trajectory
}

pub fn sbti_checkpoints(baseline: Tonnes, base_year: Year) -> SbtiCheckpoints {
    SbtiCheckpoints {
        near_term_year: base_year.saturating_add(SBTI_NEAR_TERM_YEARS),
        near_term_level: baseline * (Decimal::ONE - pct(SBTI_NEAR_TERM_REDUCTION)),
        long_term_year: HORIZON_YEAR,
        long_term_level: baseline * (Decimal::ONE - pct(SBTI_LONG_TERM_REDUCTION)),
    }
}

pub fn calculate_target(input: &TargetInput) -> PathwayResult<ComputationOutput<TargetOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.baseline < Decimal::ZERO {
        return Err(PathwayError::InvalidInput {
            field: "baseline".into(),
            reason: "Baseline emissions cannot be negative".into(),
        });
    }

    if input.sbti_aligned {
        if input.base_year + SBTI_NEAR_TERM_YEARS >= HORIZON_YEAR {
            warnings.push(format!(
                "Base year {} leaves no long-term segment before {HORIZON_YEAR}",
                input.base_year
            ));
        }
    } else if input.reduction_pct < Decimal::ZERO || input.reduction_pct > dec!(100) {
        warnings.push(format!(
            "Reduction target {}% is outside 0-100%; values are floored at zero",
            input.reduction_pct
        ));
    }

    let trajectory = compute_target(
        input.baseline,
        input.base_year,
        input.reduction_pct,
        input.sbti_aligned,
    );
    let checkpoints = input
        .sbti_aligned
        .then(|| sbti_checkpoints(input.baseline, input.base_year));
    let horizon_value = trajectory.last_value().unwrap_or(Decimal::ZERO);

    debug!(
        base_year = input.base_year,
        sbti = input.sbti_aligned,
        horizon = %horizon_value,
        "target path built"
    );

    let methodology = if input.sbti_aligned {
        "SBTi 1.5C: linear -42% over ten years, then linear to -90% by 2050"
    } else {
        "Linear reduction from baseline to the horizon target"
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        methodology,
        &serde_json::json!({
            "base_year": input.base_year,
            "reduction_pct": input.reduction_pct.to_string(),
            "sbti_aligned": input.sbti_aligned,
        }),
        warnings,
        elapsed,
        TargetOutput {
            trajectory,
            checkpoints,
            horizon_value,
        },
    ))
}
