use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use carbon_pathways_core::analysis::{self, AnalysisInput};
use carbon_pathways_core::Year;

use super::PolicyArg;
use crate::input;

/// Arguments for the full dashboard analysis
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,

    /// Inventory year to use as the baseline
    #[arg(long)]
    pub inventory_year: Option<String>,

    /// Year the MACC is evaluated at
    #[arg(long)]
    pub macc_year: Option<Year>,

    /// Scenario the MACC is built for
    #[arg(long)]
    pub macc_scenario: Option<String>,

    /// Annual discount rate for opex in the payoff view
    #[arg(long, allow_hyphen_values = true)]
    pub discount_rate: Option<Decimal>,

    /// Use the SBTi-aligned target path
    #[arg(long)]
    pub sbti: bool,

    /// How exclusive measures are resolved
    #[arg(long, value_enum)]
    pub exclusion_policy: Option<PolicyArg>,
}

pub fn run_analyze(args: AnalyzeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut request: AnalysisInput = input::load(args.input.as_deref(), "analysis")?;

    // -- Flag overrides --
    if let Some(year) = args.inventory_year {
        request.inventory_year_id = year;
    }
    let settings = &mut request.settings;
    if let Some(year) = args.macc_year {
        settings.macc_year = year;
    }
    if args.macc_scenario.is_some() {
        settings.macc_scenario_id = args.macc_scenario;
    }
    if let Some(rate) = args.discount_rate {
        settings.discount_rate = rate;
    }
    if args.sbti {
        settings.target.sbti_aligned = true;
    }
    if let Some(policy) = args.exclusion_policy {
        settings.exclusion_policy = policy.into();
    }

    let result = analysis::run_analysis(&request)?;
    Ok(serde_json::to_value(result)?)
}
