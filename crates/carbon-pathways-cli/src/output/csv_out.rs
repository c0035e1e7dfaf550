use serde_json::{Map, Value};
use std::io;

use super::{collect_series, is_record_list, scalar_text, Series};

type StdoutCsv<'a> = csv::Writer<io::StdoutLock<'a>>;

/// Write output as CSV to stdout.
///
/// Results carrying trajectories become one row per year with a column per
/// series; list results (payoff points, MACC blocks) one row per item;
/// anything else a two-column `field,value` listing.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => write_result(&mut wtr, result),
            Some(Value::Array(items)) => write_array_csv(&mut wtr, items),
            _ => write_fields(&mut wtr, map),
        },
        Value::Array(arr) => write_array_csv(&mut wtr, arr),
        _ => {
            let _ = wtr.write_record([&scalar_text(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_result(wtr: &mut StdoutCsv<'_>, result: &Map<String, Value>) {
    let series = collect_series(result);
    if !series.is_empty() {
        write_series(wtr, &series);
        return;
    }

    if let Some((_, list)) = result.iter().find(|(_, v)| is_record_list(v)) {
        if let Value::Array(items) = list {
            write_array_csv(wtr, items);
            return;
        }
    }

    write_fields(wtr, result);
}

fn write_series(wtr: &mut StdoutCsv<'_>, series: &[Series<'_>]) {
    let mut header = vec!["year".to_string()];
    header.extend(series.iter().map(|s| s.name.clone()));
    let _ = wtr.write_record(&header);

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
        let _ = wtr.write_record(&row);
    }
}

fn write_fields(wtr: &mut StdoutCsv<'_>, map: &Map<String, Value>) {
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in map {
        let _ = wtr.write_record([key.as_str(), &scalar_text(val)]);
    }
}

fn write_array_csv(wtr: &mut StdoutCsv<'_>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        let _ = wtr.write_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(scalar_text).unwrap_or_default())
                    .collect();
                let _ = wtr.write_record(&row);
            }
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&scalar_text(item)]);
        }
    }
}
