use serde_json::Value;

use super::scalar_text;

/// Print just the key answer from the output.
///
/// Looks for well-known result fields in priority order. Per-scenario objects
/// print as `bear=… base=… bull=…`.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let priority_keys = [
        "weighted_target",
        "intrinsic_value",
        "cagr_high",
        "cagr_low",
    ];

    if let Value::Object(map) = result_obj {
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::Object(map) if map.values().all(|v| !v.is_object() && !v.is_array()) => map
            .iter()
            .map(|(k, v)| format!("{}={}", k, scalar_text(v, "n/a")))
            .collect::<Vec<_>>()
            .join(" "),
        other => scalar_text(other, "null"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scenario_object_is_one_line() {
        let v = json!({"bear": "0.01", "base": "0.05", "bull": null});
        assert_eq!(format_minimal(&v), "bear=0.01 base=0.05 bull=n/a");
    }

    #[test]
    fn test_scalar() {
        assert_eq!(format_minimal(&json!("36.31")), "36.31");
        assert_eq!(format_minimal(&Value::Null), "null");
    }
}
