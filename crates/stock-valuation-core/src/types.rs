use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Currency amounts: revenue, net income, share prices.
pub type Money = Decimal;

/// Fractional rates, so 0.12 means 12%.
pub type Rate = Decimal;

/// Valuation multiples such as P/E.
pub type Multiple = Decimal;

/// Amounts per share: EPS, dividends, price targets.
pub type PerShare = Decimal;

/// Envelope returned by every calculation.
///
/// `result` is the payload; `assumptions` echoes the input that produced it
/// and `warnings` carries conditions that did not stop the calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Bookkeeping attached to a result. Nothing in here affects the numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computed_at: DateTime<Utc>,
    pub computation_time_us: u64,
    pub precision: String,
}

pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    let assumptions = serde_json::to_value(assumptions).unwrap_or(serde_json::Value::Null);
    ComputationOutput {
        result,
        methodology: methodology.to_owned(),
        assumptions,
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_owned(),
            computed_at: Utc::now(),
            computation_time_us: elapsed_us,
            precision: "decimal128".to_owned(),
        },
    }
}
