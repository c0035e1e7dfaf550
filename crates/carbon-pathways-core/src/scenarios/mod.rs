pub mod engine;
pub mod measure;

pub use engine::{
    calculate_scenario, compute_scenario, compute_scenario_detailed, ExclusionEvent,
    ScenarioContext, ScenarioDetail, ScenarioInput, ScenarioOutput,
};
pub use measure::{AbatementMeasure, ActivationWindow, Scenario};
