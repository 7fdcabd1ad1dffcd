use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use stock_valuation_core::valuation::ddm::{self, DdmInput};

use crate::input;

/// Arguments for the dividend discount model
#[derive(Args)]
pub struct DdmArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Current annual dividend per share (D0)
    #[arg(long)]
    pub current_dividend: Option<Decimal>,

    /// Required rate of return (e.g. 0.09 for 9%)
    #[arg(long)]
    pub required_return: Option<Decimal>,

    /// Dividend growth during the high-growth stage
    #[arg(long, allow_hyphen_values = true)]
    pub high_growth_rate: Option<Decimal>,

    /// Length of the high-growth stage in years (0 = Gordon growth)
    #[arg(long, default_value = "5")]
    pub high_growth_years: u32,

    /// Perpetual growth after the high-growth stage
    #[arg(long, allow_hyphen_values = true)]
    pub terminal_growth_rate: Option<Decimal>,

    /// Current share price for upside / margin of safety
    #[arg(long)]
    pub stock_price: Option<Decimal>,
}

pub fn run_ddm(args: DdmArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let ddm_input: DdmInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(piped) = input::stdin::read_stdin()? {
        piped
    } else {
        let terminal_growth_rate = args
            .terminal_growth_rate
            .ok_or("--terminal-growth-rate is required (or provide --input)")?;
        DdmInput {
            current_dividend: args
                .current_dividend
                .ok_or("--current-dividend is required (or provide --input)")?,
            required_return: args
                .required_return
                .ok_or("--required-return is required (or provide --input)")?,
            // Without an explicit high-growth rate the stage grows at the terminal rate
            high_growth_rate: args.high_growth_rate.unwrap_or(terminal_growth_rate),
            high_growth_years: args.high_growth_years,
            terminal_growth_rate,
            stock_price: args.stock_price,
        }
    };

    tracing::debug!(
        current_dividend = %ddm_input.current_dividend,
        required_return = %ddm_input.required_return,
        high_growth_years = ddm_input.high_growth_years,
        "Running dividend discount model"
    );
    let result = ddm::calculate_ddm(&ddm_input)?;
    Ok(serde_json::to_value(result)?)
}
