//! Two-stage Dividend Discount Model.
//!
//! Dividends grow at a high rate for `high_growth_years`, then at a stable
//! terminal rate forever. The terminal value is a Gordon growth perpetuity on
//! the first post-forecast dividend:
//!
//!   P = Σ D₀(1+g_H)^t / (1+r)^t  +  [D_N (1+g_T) / (r - g_T)] / (1+r)^N
//!
//! With `high_growth_years = 0` this is the single-stage Gordon model.
//!
//! All arithmetic uses `rust_decimal::Decimal`. No `f64`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::ValuationError;
use crate::time_value::{compound, discount};
use crate::types::{with_metadata, ComputationOutput, Money, PerShare, Rate};
use crate::ValuationResult;

const MAX_HIGH_GROWTH_YEARS: u32 = 100;

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

/// Input for the two-stage dividend discount model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DdmInput {
    /// Current annual dividend per share (D₀)
    pub current_dividend: PerShare,
    /// Required rate of return (cost of equity)
    pub required_return: Rate,
    /// Dividend growth during the high-growth stage
    pub high_growth_rate: Rate,
    /// Length of the high-growth stage in years
    pub high_growth_years: u32,
    /// Perpetual growth after the high-growth stage
    pub terminal_growth_rate: Rate,
    /// Current share price, for upside / margin of safety
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_price: Option<Money>,
}

/// Year-by-year dividend detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DividendYear {
    pub year: u32,
    pub dividend: PerShare,
    pub pv: PerShare,
}

/// Output of the two-stage DDM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DdmOutput {
    /// Intrinsic value per share
    pub intrinsic_value: PerShare,
    /// PV of the explicit high-growth dividends
    pub pv_of_dividends: PerShare,
    /// Undiscounted terminal value at the end of the high-growth stage
    pub terminal_value: PerShare,
    /// Terminal value discounted to today
    pub pv_of_terminal: PerShare,
    /// PV of terminal as a fraction of intrinsic value
    pub terminal_value_pct: Rate,
    pub year_by_year: Vec<DividendYear>,
    /// intrinsic_value / price - 1
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upside: Option<Rate>,
    /// 1 - price / intrinsic_value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_of_safety: Option<Rate>,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Value a dividend stream with a high-growth stage and a Gordon terminal.
pub fn calculate_ddm(input: &DdmInput) -> ValuationResult<ComputationOutput<DdmOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input)?;

    let r = input.required_return;
    let n = input.high_growth_years;

    let mut year_by_year = Vec::with_capacity(n as usize);
    let mut pv_of_dividends = Decimal::ZERO;
    let mut last_dividend = input.current_dividend;

    for year in 1..=n {
        let dividend = compound(input.current_dividend, input.high_growth_rate, year)?;
        let pv = discount(dividend, r, year)?;
        pv_of_dividends = pv_of_dividends
            .checked_add(pv)
            .ok_or_else(|| ValuationError::overflow(format!("PV of dividends in year {year}")))?;
        last_dividend = dividend;
        year_by_year.push(DividendYear { year, dividend, pv });
    }

    let next_dividend = compound(last_dividend, input.terminal_growth_rate, 1)?;
    let terminal_value = next_dividend
        .checked_div(r - input.terminal_growth_rate)
        .ok_or_else(|| {
            ValuationError::overflow(format!(
                "terminal value (spread r - g of {})",
                r - input.terminal_growth_rate
            ))
        })?;
    let pv_of_terminal = discount(terminal_value, r, n)?;

    let intrinsic_value = pv_of_dividends
        .checked_add(pv_of_terminal)
        .ok_or_else(|| ValuationError::overflow("intrinsic value"))?;

    let terminal_value_pct = if intrinsic_value.is_zero() {
        Decimal::ZERO
    } else {
        pv_of_terminal / intrinsic_value
    };
    if n > 0 && terminal_value_pct > dec!(0.75) {
        warnings.push(format!(
            "Terminal value represents {:.1}% of intrinsic value; consider a longer high-growth stage",
            terminal_value_pct * dec!(100)
        ));
    }
    if input.high_growth_rate < input.terminal_growth_rate {
        warnings.push(format!(
            "High-growth rate ({}) is below terminal growth ({})",
            input.high_growth_rate, input.terminal_growth_rate
        ));
    }

    let (upside, margin_of_safety) = match input.stock_price {
        Some(price) if price > Decimal::ZERO => {
            let upside = intrinsic_value
                .checked_div(price)
                .map(|ratio| ratio - Decimal::ONE);
            let mos = if intrinsic_value > Decimal::ZERO {
                price
                    .checked_div(intrinsic_value)
                    .map(|ratio| Decimal::ONE - ratio)
            } else {
                None
            };
            if upside.is_none() || (intrinsic_value > Decimal::ZERO && mos.is_none()) {
                warnings.push(format!(
                    "Stock price {price} is out of range against intrinsic value {intrinsic_value}; \
                     upside or margin of safety not computable"
                ));
            }
            (upside, mos)
        }
        Some(price) => {
            warnings.push(format!(
                "Stock price is {price}; upside and margin of safety not computable"
            ));
            (None, None)
        }
        None => (None, None),
    };

    let output = DdmOutput {
        intrinsic_value,
        pv_of_dividends,
        terminal_value,
        pv_of_terminal,
        terminal_value_pct,
        year_by_year,
        upside,
        margin_of_safety,
    };

    let methodology = if n == 0 {
        "Gordon growth DDM"
    } else {
        "Two-stage DDM (high growth + Gordon terminal)"
    };
    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(methodology, input, warnings, elapsed, output))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_input(input: &DdmInput) -> ValuationResult<()> {
    if input.current_dividend < Decimal::ZERO {
        return Err(ValuationError::InvalidInput {
            field: "current_dividend".into(),
            reason: "Current dividend must be non-negative.".into(),
        });
    }
    if input.required_return <= Decimal::ZERO {
        return Err(ValuationError::InvalidInput {
            field: "required_return".into(),
            reason: "Required rate of return must be positive.".into(),
        });
    }
    if input.required_return <= input.terminal_growth_rate {
        return Err(ValuationError::FinancialImpossibility(
            "Required return must exceed terminal growth rate for convergent valuation.".into(),
        ));
    }
    if input.high_growth_years > MAX_HIGH_GROWTH_YEARS {
        return Err(ValuationError::InvalidInput {
            field: "high_growth_years".into(),
            reason: format!("High-growth stage exceeds {MAX_HIGH_GROWTH_YEARS} years"),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
