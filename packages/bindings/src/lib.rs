use napi::Result as NapiResult;
use napi_derive::napi;

use stock_valuation_core::projection::{scenarios, summary};
use stock_valuation_core::valuation::ddm;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Scenario projection
// ---------------------------------------------------------------------------

/// Project bear/base/bull scenarios. Called on every edit of the valuation
/// form, so it stays a plain synchronous call.
#[napi]
pub fn project_scenarios(input_json: String) -> NapiResult<String> {
    let input: scenarios::ProjectionInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        scenarios::project(&input.financials, &input.scenarios).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn summarize_scenarios(input_json: String) -> NapiResult<String> {
    let input: summary::SummaryInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = summary::summarize(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Dividend discount model
// ---------------------------------------------------------------------------

#[napi]
pub fn dividend_discount(input_json: String) -> NapiResult<String> {
    let input: ddm::DdmInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = ddm::calculate_ddm(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
