use clap::Args;
use serde_json::Value;

use carbon_pathways_core::inventory::{self, BaselineInput};

use crate::input;

/// Arguments for baseline aggregation
#[derive(Args)]
pub struct BaselineArgs {
    /// Path to JSON input file (org tree, reference tables, activity data)
    #[arg(long)]
    pub input: Option<String>,

    /// Override the inventory year to aggregate
    #[arg(long)]
    pub inventory_year: Option<String>,
}

pub fn run_baseline(args: BaselineArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut baseline_input: BaselineInput =
        input::load(args.input.as_deref(), "baseline aggregation")?;
    if let Some(year) = args.inventory_year {
        baseline_input.inventory_year_id = year;
    }
    let result = inventory::calculate_baseline(&baseline_input)?;
    Ok(serde_json::to_value(result)?)
}
