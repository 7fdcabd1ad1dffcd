use serde::de::DeserializeOwned;
use std::io::{self, Read};

use super::file::{parse_value, InputFormat};

/// Deserialise a request piped on stdin, JSON or YAML.
///
/// `Ok(None)` when stdin is a terminal or the pipe carried only whitespace, so
/// callers fall through to their flag-built input.
pub fn read_stdin<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut piped = String::new();
    io::stdin().read_to_string(&mut piped)?;
    decode_piped(&piped)
}

fn decode_piped<T: DeserializeOwned>(piped: &str) -> Result<Option<T>, Box<dyn std::error::Error>> {
    let body = piped.trim();
    if body.is_empty() {
        return Ok(None);
    }

    let format = sniff_format(body);
    tracing::debug!(bytes = body.len(), ?format, "Decoding request from stdin");
    let value = parse_value(body, format).map_err(|e| format!("Failed to parse stdin: {e}"))?;
    Ok(Some(serde_json::from_value(value)?))
}

/// JSON documents open with a brace or bracket; anything else is read as YAML.
fn sniff_format(body: &str) -> InputFormat {
    match body.as_bytes().first() {
        Some(b'{') | Some(b'[') => InputFormat::Json,
        _ => InputFormat::Yaml,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_sniff_format() {
        assert_eq!(sniff_format(r#"{"a": 1}"#), InputFormat::Json);
        assert_eq!(sniff_format("[1, 2]"), InputFormat::Json);
        assert_eq!(sniff_format("financials:\n  revenue: \"1\"\n"), InputFormat::Yaml);
    }

    #[test]
    fn test_blank_pipe_is_no_input() {
        let decoded: Option<Value> = decode_piped("  \n\t").unwrap();
        assert!(decoded.is_none());
    }

    #[test]
    fn test_yaml_pipe_decodes() {
        let decoded: Option<Value> = decode_piped("stock_price: \"250\"\n").unwrap();
        assert_eq!(decoded.unwrap()["stock_price"], "250");
    }

    #[test]
    fn test_malformed_json_pipe_is_an_error() {
        let err = decode_piped::<Value>("{not json").unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse stdin"));
    }
}
