use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{as_trajectory, collect_series, is_record_list, scalar_text, Series};

/// Render a computation envelope as tables: a year-by-series grid for any
/// trajectories, scalar fields, then record lists such as MACC blocks.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => {
                print_result(result);
                print_envelope_notes(map);
            }
            Some(Value::Array(items)) => {
                print_array_table(items);
                print_envelope_notes(map);
            }
            _ => print_fields(map),
        },
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", value),
    }
}

fn print_result(result: &Map<String, Value>) {
    let series = collect_series(result);
    if !series.is_empty() {
        println!("{}", year_table(&series));
    }

    let scalars: Map<String, Value> = result
        .iter()
        .filter(|(_, v)| !v.is_object() && !v.is_array())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    if !scalars.is_empty() {
        println!();
        print_fields(&scalars);
    }

    for (key, val) in result {
        if let Value::Object(inner) = val {
            let is_series_group =
                as_trajectory(val).is_some() || inner.values().any(|v| as_trajectory(v).is_some());
            if !is_series_group && !inner.is_empty() && inner.values().all(|v| !v.is_array()) {
                println!("\n{}:", key);
                print_fields(inner);
            }
        } else if is_record_list(val) {
            println!("\n{}:", key);
            if let Value::Array(items) = val {
                print_array_table(items);
            }
        }
    }
}

fn year_table(series: &[Series<'_>]) -> Table {
    let mut builder = Builder::default();
    let mut header = vec!["Year".to_string()];
    header.extend(series.iter().map(|s| s.name.clone()));
    builder.push_record(header);

    let years = series
        .iter()
        .max_by_key(|s| s.years.len())
        .map(|s| s.years)
        .unwrap_or_default();
    for year in years {
        let mut row = vec![scalar_text(year)];
        row.extend(
            series
                .iter()
                .map(|s| s.value_for(year).map(scalar_text).unwrap_or_default()),
        );
        builder.push_record(row);
    }
    Table::from(builder)
}

fn print_envelope_notes(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_fields(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        _ => scalar_text(value),
    }
}
