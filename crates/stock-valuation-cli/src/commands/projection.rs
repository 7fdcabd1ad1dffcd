use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use stock_valuation_core::projection::scenarios::{
    self, CompanyFinancials, ProjectionInput, ScenarioMap, ScenarioSet,
};
use stock_valuation_core::projection::summary::{self, SummaryInput};
use stock_valuation_core::Rate;

use crate::config::CliConfig;
use crate::input;

/// Company snapshot flags shared by `project` and `summary`
#[derive(Args)]
pub struct FinancialsArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Trailing revenue
    #[arg(long, allow_hyphen_values = true)]
    pub revenue: Option<Decimal>,

    /// Trailing net income (may be negative)
    #[arg(long, allow_hyphen_values = true)]
    pub net_income: Option<Decimal>,

    /// Shares outstanding (default 50,000,000 when absent or non-positive)
    #[arg(long, allow_hyphen_values = true)]
    pub shares_outstanding: Option<i64>,

    /// Reported EPS; seeds the EPS trajectory when positive
    #[arg(long, allow_hyphen_values = true)]
    pub current_eps: Option<Decimal>,

    /// Current share price
    #[arg(long, allow_hyphen_values = true)]
    pub stock_price: Option<Decimal>,
}

/// Arguments for a scenario projection
#[derive(Args)]
pub struct ProjectArgs {
    #[command(flatten)]
    pub financials: FinancialsArgs,
}

/// Arguments for a projection summary
#[derive(Args)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub financials: FinancialsArgs,

    /// Bear scenario probability
    #[arg(long)]
    pub weight_bear: Option<Decimal>,

    /// Base scenario probability
    #[arg(long)]
    pub weight_base: Option<Decimal>,

    /// Bull scenario probability
    #[arg(long)]
    pub weight_bull: Option<Decimal>,
}

/// Projection input as read from a file or stdin; scenarios may come from config.
#[derive(Debug, Deserialize)]
struct ProjectionRequest {
    financials: CompanyFinancials,
    #[serde(default)]
    scenarios: Option<ScenarioSet>,
    #[serde(default)]
    weights: Option<ScenarioMap<Rate>>,
}

pub fn run_project(
    args: ProjectArgs,
    config: &CliConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let request = read_request(&args.financials)?;
    let input = resolve_projection_input(request.financials, request.scenarios, config)?;

    tracing::debug!(
        revenue = %input.financials.revenue,
        net_income = %input.financials.net_income,
        stock_price = %input.financials.stock_price,
        "Projecting scenarios"
    );
    let result = scenarios::project(&input.financials, &input.scenarios)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_summary(
    args: SummaryArgs,
    config: &CliConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let request = read_request(&args.financials)?;
    let flag_weights = weights_from_flags(&args)?;
    let weights = flag_weights
        .or(request.weights)
        .or_else(|| config.default_weights.clone());
    let projection = resolve_projection_input(request.financials, request.scenarios, config)?;

    let result = summary::summarize(&SummaryInput {
        projection,
        weights,
    })?;
    Ok(serde_json::to_value(result)?)
}

fn read_request(args: &FinancialsArgs) -> Result<ProjectionRequest, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        return input::file::read_input(path);
    }
    if let Some(piped) = input::stdin::read_stdin()? {
        return Ok(piped);
    }
    request_from_flags(args)
}

fn request_from_flags(
    args: &FinancialsArgs,
) -> Result<ProjectionRequest, Box<dyn std::error::Error>> {
    Ok(ProjectionRequest {
        financials: CompanyFinancials {
            revenue: args
                .revenue
                .ok_or("--revenue is required (or provide --input)")?,
            net_income: args
                .net_income
                .ok_or("--net-income is required (or provide --input)")?,
            shares_outstanding: args.shares_outstanding,
            current_eps: args.current_eps,
            stock_price: args
                .stock_price
                .ok_or("--stock-price is required (or provide --input)")?,
        },
        scenarios: None,
        weights: None,
    })
}

fn resolve_projection_input(
    financials: CompanyFinancials,
    scenarios: Option<ScenarioSet>,
    config: &CliConfig,
) -> Result<ProjectionInput, Box<dyn std::error::Error>> {
    let scenarios = match scenarios {
        Some(s) => s,
        None => {
            tracing::debug!("Input has no scenarios; using config default_scenarios");
            config.default_scenarios.clone().ok_or(
                "No scenarios given: add a `scenarios` block to the input or `default_scenarios` to the config file",
            )?
        }
    };
    Ok(ProjectionInput {
        financials,
        scenarios,
    })
}

fn weights_from_flags(
    args: &SummaryArgs,
) -> Result<Option<ScenarioMap<Rate>>, Box<dyn std::error::Error>> {
    match (args.weight_bear, args.weight_base, args.weight_bull) {
        (Some(bear), Some(base), Some(bull)) => Ok(Some(ScenarioMap { bear, base, bull })),
        (None, None, None) => Ok(None),
        _ => Err("--weight-bear, --weight-base and --weight-bull must be given together".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use stock_valuation_core::projection::scenarios::ScenarioAssumptions;

    fn flat(pe: Decimal) -> ScenarioAssumptions {
        ScenarioAssumptions {
            revenue_growth_rate: Decimal::ZERO,
            net_income_growth_rate: Decimal::ZERO,
            pe_low: pe,
            pe_high: pe,
        }
    }

    fn financials() -> CompanyFinancials {
        CompanyFinancials {
            revenue: Decimal::ONE_HUNDRED,
            net_income: Decimal::TEN,
            shares_outstanding: Some(10),
            current_eps: None,
            stock_price: Decimal::TEN,
        }
    }

    #[test]
    fn test_config_scenarios_fill_missing_block() {
        let config = CliConfig {
            default_scenarios: Some(ScenarioMap {
                bear: flat(Decimal::ONE),
                base: flat(Decimal::TWO),
                bull: flat(Decimal::TEN),
            }),
            ..CliConfig::default()
        };
        let input = resolve_projection_input(financials(), None, &config).unwrap();
        assert_eq!(input.scenarios.base.pe_low, Decimal::TWO);
    }

    #[test]
    fn test_input_scenarios_win_over_config() {
        let config = CliConfig {
            default_scenarios: Some(ScenarioMap {
                bear: flat(Decimal::ONE),
                base: flat(Decimal::ONE),
                bull: flat(Decimal::ONE),
            }),
            ..CliConfig::default()
        };
        let given = ScenarioMap {
            bear: flat(Decimal::TEN),
            base: flat(Decimal::TEN),
            bull: flat(Decimal::TEN),
        };
        let input = resolve_projection_input(financials(), Some(given), &config).unwrap();
        assert_eq!(input.scenarios.bull.pe_high, Decimal::TEN);
    }

    #[test]
    fn test_missing_scenarios_everywhere_is_an_error() {
        let err = resolve_projection_input(financials(), None, &CliConfig::default()).unwrap_err();
        assert!(err.to_string().contains("No scenarios given"));
    }

    fn flag_args() -> FinancialsArgs {
        FinancialsArgs {
            input: None,
            revenue: Some(dec!(40195000000)),
            net_income: Some(dec!(-12.5)),
            shares_outstanding: None,
            current_eps: Some(dec!(8.19)),
            stock_price: Some(dec!(250)),
        }
    }

    #[test]
    fn test_request_from_flags() {
        let request = request_from_flags(&flag_args()).unwrap();
        assert_eq!(request.financials.revenue, dec!(40195000000));
        assert_eq!(request.financials.net_income, dec!(-12.5));
        assert_eq!(request.financials.current_eps, Some(dec!(8.19)));
        assert!(request.financials.shares_outstanding.is_none());
        assert!(request.scenarios.is_none());
        assert!(request.weights.is_none());
    }

    #[test]
    fn test_missing_required_flag_is_named() {
        let mut args = flag_args();
        args.net_income = None;
        let err = request_from_flags(&args).unwrap_err();
        assert_eq!(err.to_string(), "--net-income is required (or provide --input)");

        let mut args = flag_args();
        args.stock_price = None;
        let err = request_from_flags(&args).unwrap_err();
        assert!(err.to_string().starts_with("--stock-price"));
    }

    #[test]
    fn test_partial_weight_flags_rejected() {
        let args = SummaryArgs {
            financials: flag_args(),
            weight_bear: Some(dec!(0.2)),
            weight_base: Some(dec!(0.8)),
            weight_bull: None,
        };
        assert!(weights_from_flags(&args).is_err());
    }

    #[test]
    fn test_request_without_scenarios_parses() {
        let request: ProjectionRequest = serde_json::from_str(
            r#"{"financials": {"revenue": "1", "net_income": "1", "stock_price": "1"}}"#,
        )
        .unwrap();
        assert!(request.scenarios.is_none());
        assert!(request.financials.shares_outstanding.is_none());
    }
}
