use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::scalar_text;

/// Format output as tables using the tabled crate.
///
/// Scalars go into a Field/Value table; per-scenario objects become one table
/// with a row per scenario; per-scenario year series become one table per
/// scenario with a column per year.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result(result, map);
            } else {
                print_section(None, map);
            }
        }
        Value::Array(arr) => print_array_table(None, arr),
        _ => println!("{}", value),
    }
}

fn print_result(result: &Value, envelope: &Map<String, Value>) {
    match result {
        Value::Object(res_map) => print_section(None, res_map),
        other => println!("{}", format_value(other)),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(|w| w.as_str()) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_section(title: Option<&str>, map: &Map<String, Value>) {
    let mut scalars = Builder::default();
    let mut has_scalars = false;
    scalars.push_record(["Field", "Value"]);

    let mut nested: Vec<(&String, &Value)> = Vec::new();
    for (key, val) in map {
        match val {
            Value::Object(_) => nested.push((key, val)),
            Value::Array(arr) if arr.iter().any(Value::is_object) => nested.push((key, val)),
            _ => {
                has_scalars = true;
                scalars.push_record([key.as_str(), &format_value(val)]);
            }
        }
    }

    if has_scalars {
        print_title(title);
        println!("{}", Table::from(scalars));
    }

    for (key, val) in nested {
        let label = qualified(title, key);
        match val {
            Value::Object(inner) => print_object(&label, inner),
            Value::Array(arr) => print_array_table(Some(&label), arr),
            _ => {}
        }
    }
}

fn print_object(label: &str, map: &Map<String, Value>) {
    let all_objects = !map.is_empty() && map.values().all(Value::is_object);
    let all_scalars = map.values().all(|v| !v.is_object() && !v.is_array());

    if all_objects {
        let rows: Vec<(&String, &Map<String, Value>)> = map
            .iter()
            .filter_map(|(k, v)| v.as_object().map(|o| (k, o)))
            .collect();
        let series_like = rows
            .iter()
            .all(|(_, o)| !o.is_empty() && o.values().all(Value::is_array));
        if series_like {
            for (row_key, inner) in rows {
                print_series_table(&format!("{label}: {row_key}"), inner);
            }
        } else {
            print_matrix_table(label, &rows);
        }
    } else if all_scalars {
        print_title(Some(label));
        let mut builder = Builder::default();
        builder.push_record(map.keys().map(String::as_str));
        builder.push_record(map.values().map(format_value));
        println!("{}", Table::from(builder));
    } else {
        print_section(Some(label), map);
    }
}

/// Rows are metrics, columns are years.
fn print_series_table(label: &str, metrics: &Map<String, Value>) {
    let years = metrics
        .values()
        .filter_map(|v| v.as_array().map(Vec::len))
        .max()
        .unwrap_or(0);

    let mut builder = Builder::default();
    let mut header = vec!["Metric".to_string()];
    header.extend((1..=years).map(|y| format!("Year {y}")));
    builder.push_record(header);

    for (metric, val) in metrics {
        if let Value::Array(points) = val {
            let mut row = vec![metric.clone()];
            row.extend(points.iter().map(format_value));
            builder.push_record(row);
        }
    }

    print_title(Some(label));
    println!("{}", Table::from(builder));
}

/// Rows are the outer keys (e.g. scenarios), columns the inner fields.
fn print_matrix_table(label: &str, rows: &[(&String, &Map<String, Value>)]) {
    let Some((_, first)) = rows.first() else {
        return;
    };
    let columns: Vec<String> = first.keys().cloned().collect();

    let mut builder = Builder::default();
    let mut header = vec![String::new()];
    header.extend(columns.iter().cloned());
    builder.push_record(header);

    for (row_key, inner) in rows {
        let mut row = vec![(*row_key).clone()];
        row.extend(
            columns
                .iter()
                .map(|c| inner.get(c).map(format_value).unwrap_or_default()),
        );
        builder.push_record(row);
    }

    print_title(Some(label));
    println!("{}", Table::from(builder));
}

fn print_array_table(title: Option<&str>, arr: &[Value]) {
    print_title(title);
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

fn print_title(title: Option<&str>) {
    if let Some(t) = title {
        println!("\n{t}");
    }
}

fn qualified(parent: Option<&str>, key: &str) -> String {
    match parent {
        Some(p) => format!("{p}.{key}"),
        None => key.to_string(),
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "n/a".to_string(),
        Value::Array(arr) => arr.iter().map(format_value).collect::<Vec<_>>().join(", "),
        other => scalar_text(other, "n/a"),
    }
}
