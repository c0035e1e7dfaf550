use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use carbon_pathways_core::macc::{self, MaccInput};
use carbon_pathways_core::payoff::{self, PayoffInput};
use carbon_pathways_core::Year;

use crate::input;

/// Arguments for a marginal abatement cost curve
#[derive(Args)]
pub struct MaccArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,

    /// Year the curve is evaluated at
    #[arg(long)]
    pub year: Option<Year>,
}

/// Arguments for the measure payoff chart
#[derive(Args)]
pub struct PayoffArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,

    /// Annual discount rate for opex (e.g. 0.07)
    #[arg(long, allow_hyphen_values = true)]
    pub discount_rate: Option<Decimal>,
}

pub fn run_macc(args: MaccArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut macc_input: MaccInput = input::load(args.input.as_deref(), "MACC")?;
    if let Some(year) = args.year {
        macc_input.analysis_year = year;
    }
    let result = macc::calculate_macc(&macc_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_payoff(args: PayoffArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut payoff_input: PayoffInput = input::load(args.input.as_deref(), "payoff analysis")?;
    if let Some(rate) = args.discount_rate {
        payoff_input.discount_rate = rate;
    }
    let result = payoff::calculate_payoff(&payoff_input)?;
    Ok(serde_json::to_value(result)?)
}
