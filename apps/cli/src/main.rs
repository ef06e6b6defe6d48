//! # margin
//!
//! Unit-economics calculator for marketplace sellers.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              margin CLI                                 │
//! │                                                                         │
//! │  args ──► CliConfig::load ──► tracing (stderr)                         │
//! │                 │                                                       │
//! │                 ▼                                                       │
//! │  scenario.toml / .json / stdin ──► overrides ──► validate              │
//! │                                                     │                   │
//! │                        strict + errors ◄────────────┤                   │
//! │                        (exit 1)                     ▼                   │
//! │                                         margin_core::calculate         │
//! │                                                     │                   │
//! │                                                     ▼                   │
//! │                                      text / JSON report (stdout)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```bash
//! margin listing.toml
//! margin --format json --regime USN_15 listing.toml
//! cat listing.json | margin --price 2490 -
//! MARGIN_LOG=margin_core=trace margin listing.toml
//! ```

mod config;
mod error;
mod report;
mod scenario;

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use margin_core::{calculate_checked, calculate_metrics_with, validate_calculation_input};

use crate::config::{CliConfig, OutputFormat};
use crate::error::{CliError, CliResult};
use crate::report::Report;
use crate::scenario::ScenarioOverrides;

/// Env var holding an EnvFilter directive; wins over `[log] level`.
const LOG_ENV: &str = "MARGIN_LOG";

// =============================================================================
// Arguments
// =============================================================================

#[derive(Debug, Default, PartialEq)]
struct Args {
    scenario: String,
    config_path: Option<PathBuf>,
    format: Option<OutputFormat>,
    strict: bool,
    overrides: ScenarioOverrides,
}

#[derive(Debug, PartialEq)]
enum Command {
    Help,
    Run(Args),
}

fn print_usage() {
    println!("margin - marketplace unit-economics calculator");
    println!();
    println!("Usage: margin [OPTIONS] <SCENARIO>");
    println!();
    println!("Arguments:");
    println!("  <SCENARIO>           Scenario file (.toml or .json), or - for JSON on stdin");
    println!();
    println!("Options:");
    println!("  -c, --config <PATH>  Config file (default: platform config dir/margin.toml)");
    println!("  -f, --format <FMT>   Output format: text, json");
    println!("  -r, --regime <TAX>   Tax regime override: USN_6, USN_15, OSNO");
    println!("  -p, --price <PRICE>  Retail price override");
    println!("      --strict         Refuse to calculate invalid scenarios");
    println!("  -h, --help           Show this help message");
}

/// Takes the value following flag `args[i]`.
fn flag_value<'a>(args: &'a [String], i: usize) -> CliResult<&'a str> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| CliError::Usage(format!("{} requires a value", args[i])))
}

/// Parses `args` (without the program name).
fn parse_args(args: &[String]) -> CliResult<Command> {
    let mut parsed = Args::default();
    let mut scenario = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => return Ok(Command::Help),
            "--config" | "-c" => {
                parsed.config_path = Some(PathBuf::from(flag_value(args, i)?));
                i += 1;
            }
            "--format" | "-f" => {
                parsed.format = Some(flag_value(args, i)?.parse().map_err(|e: CliError| {
                    CliError::Usage(e.to_string())
                })?);
                i += 1;
            }
            "--regime" | "-r" => {
                let value = flag_value(args, i)?;
                parsed.overrides.tax_regime = Some(
                    value
                        .parse()
                        .map_err(|e: margin_core::tax::UnknownTaxRegime| {
                            CliError::Usage(e.to_string())
                        })?,
                );
                i += 1;
            }
            "--price" | "-p" => {
                let value = flag_value(args, i)?;
                let price: f64 = value.parse().map_err(|_| {
                    CliError::Usage(format!("--price expects a number, got '{}'", value))
                })?;
                parsed.overrides.retail_price = Some(price);
                i += 1;
            }
            "--strict" => parsed.strict = true,
            flag if flag.starts_with('-') && flag != scenario::STDIN_PATH => {
                return Err(CliError::Usage(format!(
                    "Unknown option '{}'. Run with --help for usage",
                    flag
                )));
            }
            path => {
                if scenario.is_some() {
                    return Err(CliError::Usage(format!(
                        "Unexpected extra argument '{}'",
                        path
                    )));
                }
                scenario = Some(path.to_string());
            }
        }
        i += 1;
    }

    parsed.scenario = scenario.ok_or_else(|| {
        CliError::Usage("Missing <SCENARIO>. Run with --help for usage".to_string())
    })?;

    Ok(Command::Run(parsed))
}

// =============================================================================
// Entry Point
// =============================================================================

/// Resolves the log filter: `MARGIN_LOG` first, then `level`.
fn log_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}

fn init_logging(config: &CliConfig) {
    FmtSubscriber::builder()
        .with_env_filter(log_filter(&config.log.level))
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

/// Loads config under a temporary subscriber, since the global one
/// depends on the `[log]` section being read.
fn load_config(path: Option<&std::path::Path>) -> CliResult<CliConfig> {
    let bootstrap = FmtSubscriber::builder()
        .with_env_filter(log_filter("warn"))
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();
    tracing::subscriber::with_default(bootstrap, || CliConfig::load(path))
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut config = load_config(args.config_path.as_deref())?;
    if let Some(format) = args.format {
        config.output.format = format;
    }
    config.output.strict |= args.strict;

    init_logging(&config);
    debug!(?config, "Configuration loaded");

    let mut input = scenario::load_scenario(&args.scenario)?;
    if !args.overrides.is_empty() {
        debug!(overrides = ?args.overrides, "Applying command-line overrides");
        input = args.overrides.apply(input);
    }
    info!(
        scenario = %args.scenario,
        regime = %input.tax_regime,
        retail_price = input.retail_price,
        "Calculating"
    );

    let warnings = validate_calculation_input(&input);
    for message in &warnings {
        warn!(%message, "Invalid scenario input");
    }

    let results = if config.output.strict {
        calculate_checked(&input, &config.solver).map_err(CliError::from)?
    } else {
        calculate_metrics_with(&input, &config.solver)
    };

    if !results.break_even_price_converged {
        warn!(
            price = results.break_even_price,
            strategy = %config.solver.strategy,
            "Break-even price search did not converge"
        );
    }

    let report = Report::new(input.tax_regime, warnings, results);
    let rendered = report::render(&report, config.output.format, config.output.precision)?;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", rendered).context("Failed to write report to stdout")?;

    Ok(())
}

fn main() -> ExitCode {
    let raw: Vec<String> = std::env::args().skip(1).collect();

    let args = match parse_args(&raw) {
        Ok(Command::Help) => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        Ok(Command::Run(args)) => args,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(e.exit_code() as u8);
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            let code = e
                .downcast_ref::<CliError>()
                .map(CliError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code as u8)
        }
    }
}
