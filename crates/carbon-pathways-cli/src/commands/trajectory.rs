use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use carbon_pathways_core::config::{DEFAULT_BASE_YEAR, DEFAULT_TARGET_REDUCTION};
use carbon_pathways_core::trajectory::{self, BauInput, TargetInput};
use carbon_pathways_core::{GrowthRates, ScopeSplit, Year};

use crate::input;

/// Arguments for a BAU projection
#[derive(Args)]
pub struct BauArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,

    /// Scope 1 baseline (tCO2e)
    #[arg(long)]
    pub scope1: Option<Decimal>,

    /// Scope 2 baseline (tCO2e)
    #[arg(long)]
    pub scope2: Option<Decimal>,

    /// First projected year
    #[arg(long, default_value_t = DEFAULT_BASE_YEAR)]
    pub base_year: Year,

    /// Annual growth % up to 2030
    #[arg(long, allow_hyphen_values = true)]
    pub p1: Option<Decimal>,

    /// Annual growth % for 2031-2040
    #[arg(long, allow_hyphen_values = true)]
    pub p2: Option<Decimal>,

    /// Annual growth % for 2041-2050
    #[arg(long, allow_hyphen_values = true)]
    pub p3: Option<Decimal>,
}

/// Arguments for a target path
#[derive(Args)]
pub struct TargetArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,

    /// Total baseline emissions (tCO2e)
    #[arg(long)]
    pub baseline: Option<Decimal>,

    /// First year of the path
    #[arg(long, default_value_t = DEFAULT_BASE_YEAR)]
    pub base_year: Year,

    /// Reduction below baseline by 2050, in percent
    #[arg(long, default_value_t = DEFAULT_TARGET_REDUCTION)]
    pub reduction: Decimal,

    /// Use the SBTi 1.5°C path (42% in ten years, 90% by 2050)
    #[arg(long)]
    pub sbti: bool,
}

pub fn run_bau(args: BauArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let bau_input = if args.input.is_some() || (args.scope1.is_none() && args.scope2.is_none()) {
        input::load::<BauInput>(args.input.as_deref(), "BAU projection")?
    } else {
        let defaults = GrowthRates::default();
        BauInput {
            baseline_by_scope: ScopeSplit::new(
                args.scope1.unwrap_or(Decimal::ZERO),
                args.scope2.unwrap_or(Decimal::ZERO),
            ),
            base_year: args.base_year,
            growth: GrowthRates::new(
                args.p1.unwrap_or(defaults.p1),
                args.p2.unwrap_or(defaults.p2),
                args.p3.unwrap_or(defaults.p3),
            ),
        }
    };
    let result = trajectory::calculate_bau(&bau_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_target(args: TargetArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let target_input = match args.baseline {
        Some(baseline) if args.input.is_none() => TargetInput {
            baseline,
            base_year: args.base_year,
            reduction_pct: args.reduction,
            sbti_aligned: args.sbti,
        },
        _ => input::load::<TargetInput>(args.input.as_deref(), "target path")?,
    };
    let result = trajectory::calculate_target(&target_input)?;
    Ok(serde_json::to_value(result)?)
}
