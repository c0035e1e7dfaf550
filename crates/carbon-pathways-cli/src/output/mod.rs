pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// A named emissions series found in a result object.
pub struct Series<'a> {
    pub name: String,
    pub years: &'a [Value],
    pub values: &'a [Value],
}

impl Series<'_> {
    pub fn value_for(&self, year: &Value) -> Option<&Value> {
        self.years
            .iter()
            .position(|y| y == year)
            .and_then(|i| self.values.get(i))
    }
}

/// `{"years": [...], "values": [...]}` as serialised by the engine.
pub fn as_trajectory(value: &Value) -> Option<(&[Value], &[Value])> {
    let map = value.as_object()?;
    if map.len() != 2 {
        return None;
    }
    let years = map.get("years")?.as_array()?;
    let values = map.get("values")?.as_array()?;
    Some((years.as_slice(), values.as_slice()))
}

/// Trajectories at the top of a result, one level down (`by_scope.scope1`),
/// and the `trajectory` of each scenario in a `scenarios` list.
pub fn collect_series(result: &Map<String, Value>) -> Vec<Series<'_>> {
    let mut series = Vec::new();
    for (key, val) in result {
        if let Some((years, values)) = as_trajectory(val) {
            series.push(Series { name: key.clone(), years, values });
        } else if let Value::Object(inner) = val {
            for (sub, sub_val) in inner {
                if let Some((years, values)) = as_trajectory(sub_val) {
                    series.push(Series { name: format!("{key}.{sub}"), years, values });
                }
            }
        }
    }

    if let Some(Value::Array(scenarios)) = result.get("scenarios") {
        for s in scenarios {
            let traj = s.get("trajectory").and_then(as_trajectory);
            let id = s.get("scenario_id").map(scalar_text);
            if let (Some((years, values)), Some(id)) = (traj, id) {
                series.push(Series { name: id, years, values });
            }
        }
    }
    series
}

/// True for arrays of flat objects, which render as their own table.
pub fn is_record_list(value: &Value) -> bool {
    match value {
        Value::Array(items) => {
            !items.is_empty()
                && items.iter().all(|item| match item {
                    Value::Object(map) => map.values().all(|v| !v.is_object() && !v.is_array()),
                    _ => false,
                })
        }
        _ => false,
    }
}

pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
