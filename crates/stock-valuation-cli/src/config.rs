//! CLI configuration
//!
//! Optional YAML file holding the log level, preferred output format and the
//! default bear/base/bull assumptions used when an input omits them.
//! Precedence: command-line flag, then config file, then built-in default.

use serde::{Deserialize, Deserializer};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use stock_valuation_core::projection::scenarios::{ScenarioMap, ScenarioSet};
use stock_valuation_core::Rate;

use crate::OutputFormat;

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Configuration file error: {path}: {reason}")]
    FileError { path: PathBuf, reason: String },

    #[error("Configuration parse error: {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },
}

/// Log levels accepted by `--log-level` and the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_filter_str())
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        LogLevel::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Contents of the YAML config file. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub log_level: Option<LogLevel>,
    pub output: Option<OutputFormat>,
    /// Used when a projection input has no `scenarios` block
    pub default_scenarios: Option<ScenarioSet>,
    /// Used by `summary` when no weights are given
    pub default_weights: Option<ScenarioMap<Rate>>,
}

impl CliConfig {
    /// Load from `path`, or return the empty config when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                let contents = fs::read_to_string(p).map_err(|e| ConfigError::FileError {
                    path: p.to_path_buf(),
                    reason: e.to_string(),
                })?;
                Self::from_yaml_str(&contents).map_err(|reason| ConfigError::ParseError {
                    path: p.to_path_buf(),
                    reason,
                })
            }
            None => Ok(Self::default()),
        }
    }

    fn from_yaml_str(contents: &str) -> Result<Self, String> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents).map_err(|e| e.to_string())
    }
}

/// Pick the effective log level: flag, then config, then default.
pub fn resolve_log_level(
    flag: Option<&str>,
    config: &CliConfig,
) -> Result<LogLevel, ConfigError> {
    match flag {
        Some(s) => LogLevel::from_str(s),
        None => Ok(config.log_level.unwrap_or_default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const SAMPLE: &str = r#"
log_level: debug
output: table
default_scenarios:
  bear: { revenue_growth_rate: "0.03", net_income_growth_rate: "0.05", pe_low: "12", pe_high: "15" }
  base: { revenue_growth_rate: "0.08", net_income_growth_rate: "0.10", pe_low: "16", pe_high: "20" }
  bull: { revenue_growth_rate: "0.12", net_income_growth_rate: "0.15", pe_low: "20", pe_high: "25" }
default_weights: { bear: "0.25", base: "0.5", bull: "0.25" }
"#;

    #[test]
    fn test_parse_full_config() {
        let config = CliConfig::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(config.log_level, Some(LogLevel::Debug));
        assert!(matches!(config.output, Some(OutputFormat::Table)));
        let scenarios = config.default_scenarios.unwrap();
        assert_eq!(scenarios.base.pe_high.to_string(), "20");
        assert_eq!(scenarios.bear.revenue_growth_rate.to_string(), "0.03");
        assert_eq!(config.default_weights.unwrap().base.to_string(), "0.5");
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = CliConfig::from_yaml_str("   \n").unwrap();
        assert!(config.log_level.is_none());
        assert!(config.default_scenarios.is_none());
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        assert!(CliConfig::from_yaml_str("log_level: loud").is_err());
        assert!(matches!(
            LogLevel::from_str("loud"),
            Err(ConfigError::InvalidLogLevel(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let config = CliConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.log_level, Some(LogLevel::Debug));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = CliConfig::load(Some(Path::new("/nonexistent/sval.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::FileError { .. }));
    }

    #[test]
    fn test_flag_overrides_config_level() {
        let config = CliConfig {
            log_level: Some(LogLevel::Error),
            ..CliConfig::default()
        };
        assert_eq!(resolve_log_level(Some("info"), &config).unwrap(), LogLevel::Info);
        assert_eq!(resolve_log_level(None, &config).unwrap(), LogLevel::Error);
        assert_eq!(
            resolve_log_level(None, &CliConfig::default()).unwrap(),
            LogLevel::Warn
        );
    }
}
