use clap::Args;
use serde_json::Value;

use carbon_pathways_core::scenarios::{self, ScenarioInput};

use super::PolicyArg;
use crate::input;

/// Arguments for a scenario projection
#[derive(Args)]
pub struct ScenarioArgs {
    /// Path to JSON input file (context, growth, scenario)
    #[arg(long)]
    pub input: Option<String>,

    /// How exclusive measures are resolved
    #[arg(long, value_enum)]
    pub exclusion_policy: Option<PolicyArg>,
}

pub fn run_scenario(args: ScenarioArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut scenario_input: ScenarioInput =
        input::load(args.input.as_deref(), "scenario projection")?;
    if let Some(policy) = args.exclusion_policy {
        scenario_input.context.exclusion_policy = policy.into();
    }
    let result = scenarios::calculate_scenario(&scenario_input)?;
    Ok(serde_json::to_value(result)?)
}
