use napi::Result as NapiResult;
use napi_derive::napi;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_baseline(input_json: String) -> NapiResult<String> {
    let input: carbon_pathways_core::inventory::BaselineInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        carbon_pathways_core::inventory::calculate_baseline(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Trajectories
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_bau(input_json: String) -> NapiResult<String> {
    let input: carbon_pathways_core::trajectory::BauInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = carbon_pathways_core::trajectory::calculate_bau(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn calculate_target(input_json: String) -> NapiResult<String> {
    let input: carbon_pathways_core::trajectory::TargetInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        carbon_pathways_core::trajectory::calculate_target(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_scenario(input_json: String) -> NapiResult<String> {
    let input: carbon_pathways_core::scenarios::ScenarioInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        carbon_pathways_core::scenarios::calculate_scenario(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// MACC & Payoff
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_macc(input_json: String) -> NapiResult<String> {
    let input: carbon_pathways_core::macc::MaccInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = carbon_pathways_core::macc::calculate_macc(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn calculate_payoff(input_json: String) -> NapiResult<String> {
    let input: carbon_pathways_core::payoff::PayoffInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = carbon_pathways_core::payoff::calculate_payoff(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[napi]
pub fn run_analysis(input_json: String) -> NapiResult<String> {
    let input: carbon_pathways_core::analysis::AnalysisInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = carbon_pathways_core::analysis::run_analysis(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
