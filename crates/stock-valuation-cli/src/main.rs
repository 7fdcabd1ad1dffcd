mod commands;
mod config;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde::Deserialize;
use std::path::PathBuf;
use std::process;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::dividend::DdmArgs;
use commands::projection::{ProjectArgs, SummaryArgs};
use config::CliConfig;

/// Scenario projections and equity valuation
#[derive(Parser)]
#[command(
    name = "sval",
    version,
    about = "Scenario projections and equity valuation with decimal precision",
    long_about = "Project bear/base/bull revenue, earnings and P/E price bands over five \
                  years, summarise year-5 targets against the current price, and value \
                  dividend payers with a two-stage dividend discount model."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (defaults to the config file value, then json)
    #[arg(long, global = true)]
    output: Option<OutputFormat>,

    /// YAML configuration file
    #[arg(long, global = true, env = "SVAL_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, global = true, env = "SVAL_LOG_LEVEL")]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Project bear/base/bull scenarios over five years
    Project(ProjectArgs),
    /// Year-5 targets, upside and weighted target from a projection
    Summary(SummaryArgs),
    /// Two-stage dividend discount model
    Ddm(DdmArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn fail(e: impl std::fmt::Display) -> ! {
    eprintln!("{}: {}", "error".red().bold(), e);
    process::exit(1);
}

fn main() {
    let cli = Cli::parse();

    let config = CliConfig::load(cli.config.as_deref()).unwrap_or_else(|e| fail(e));
    let log_level =
        config::resolve_log_level(cli.log_level.as_deref(), &config).unwrap_or_else(|e| fail(e));
    init_tracing(log_level.as_filter_str());

    if let Some(ref path) = cli.config {
        tracing::debug!(path = %path.display(), "Loaded configuration");
    }

    let start = Instant::now();
    let (name, result): (&str, Result<serde_json::Value, Box<dyn std::error::Error>>) =
        match cli.command {
            Commands::Project(args) => {
                ("project", commands::projection::run_project(args, &config))
            }
            Commands::Summary(args) => {
                ("summary", commands::projection::run_summary(args, &config))
            }
            Commands::Ddm(args) => ("ddm", commands::dividend::run_ddm(args)),
            Commands::Version => {
                println!("sval {}", env!("CARGO_PKG_VERSION"));
                return;
            }
        };

    match result {
        Ok(value) => {
            log_warnings(&value);
            tracing::info!(
                command = name,
                elapsed_us = start.elapsed().as_micros() as u64,
                "Calculation complete"
            );
            let format = cli.output.or(config.output).unwrap_or(OutputFormat::Json);
            output::format_output(&format, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(command = name, error = %e, "Calculation failed");
            fail(e);
        }
    }
}

fn log_warnings(value: &serde_json::Value) {
    if let Some(warnings) = value.get("warnings").and_then(|w| w.as_array()) {
        for w in warnings.iter().filter_map(|w| w.as_str()) {
            tracing::warn!("{w}");
        }
    }
}
