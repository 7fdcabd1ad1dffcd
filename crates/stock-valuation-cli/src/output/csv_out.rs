use serde_json::Value;
use std::io;

use super::scalar_text;

/// Write output as CSV to stdout.
///
/// The result object is flattened into `field,value` rows. Nested keys are
/// joined with `.` and array positions are 1-based, so a projection yields
/// rows like `series.base.eps_by_year.5,15.87`.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let target = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let mut rows = Vec::new();
    flatten(String::new(), target, &mut rows);

    let _ = wtr.write_record(["field", "value"]);
    for (field, val) in rows {
        let _ = wtr.write_record([field.as_str(), val.as_str()]);
    }

    let _ = wtr.flush();
}

fn flatten(prefix: String, value: &Value, rows: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                flatten(join(&prefix, key), val, rows);
            }
        }
        Value::Array(arr) => {
            for (i, val) in arr.iter().enumerate() {
                flatten(join(&prefix, &(i + 1).to_string()), val, rows);
            }
        }
        scalar => rows.push((prefix, scalar_text(scalar, ""))),
    }
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_flatten_series_and_sentinels() {
        let value = json!({
            "series": {"base": {"eps_by_year": ["8.185", "9.6583"]}},
            "cagr_low": {"bear": null},
            "shares_outstanding_used": 962000000
        });
        let mut rows = Vec::new();
        flatten(String::new(), &value, &mut rows);
        assert_eq!(
            rows,
            vec![
                ("series.base.eps_by_year.1".to_string(), "8.185".to_string()),
                ("series.base.eps_by_year.2".to_string(), "9.6583".to_string()),
                ("cagr_low.bear".to_string(), String::new()),
                ("shares_outstanding_used".to_string(), "962000000".to_string()),
            ]
        );
    }
}
