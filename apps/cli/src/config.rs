//! # CLI Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Command-line flags (highest priority, applied in main)             │
//! │     --format json --strict                                             │
//! │                                                                         │
//! │  2. Environment Variables                                              │
//! │     MARGIN_SOLVER_STRATEGY=fixed_step                                  │
//! │     MARGIN_OUTPUT_FORMAT=json                                          │
//! │                                                                         │
//! │  3. TOML Config File                                                   │
//! │     --config <PATH>, or                                                │
//! │     ~/.config/margin/margin.toml (Linux)                               │
//! │     ~/Library/Application Support/com.margin.margin/margin.toml (macOS)│
//! │                                                                         │
//! │  4. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # margin.toml
//! [solver]
//! strategy = "bisection"   # bisection | fixed_step
//! seed_price = 1000.0
//! step = 50.0              # fixed_step only
//! max_iterations = 100
//! tolerance = 0.01
//!
//! [output]
//! format = "text"          # text | json
//! precision = 2
//! strict = false           # refuse to calculate invalid scenarios
//!
//! [log]
//! level = "warn"           # overridden by MARGIN_LOG (EnvFilter syntax)
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use margin_core::{SolverSettings, SolverStrategy};

use crate::error::{CliError, CliResult};

// =============================================================================
// Output Settings
// =============================================================================

/// How the report is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Labelled, human-readable report.
    #[default]
    Text,
    /// JSON envelope for scripts and spreadsheets.
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "pretty" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(CliError::InvalidConfig(format!(
                "Unknown output format: '{}'. Valid options: text, json",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(default)]
    pub format: OutputFormat,

    /// Decimal places in the text report.
    #[serde(default = "default_precision")]
    pub precision: usize,

    /// Abort on validation errors instead of warning.
    #[serde(default)]
    pub strict: bool,
}

fn default_precision() -> usize {
    2
}

impl Default for OutputSettings {
    fn default() -> Self {
        OutputSettings {
            format: OutputFormat::default(),
            precision: default_precision(),
            strict: false,
        }
    }
}

// =============================================================================
// Log Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    /// Default filter directive when `MARGIN_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LogSettings {
    fn default() -> Self {
        LogSettings {
            level: default_log_level(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Break-even price search settings.
    #[serde(default)]
    pub solver: SolverSettings,

    #[serde(default)]
    pub output: OutputSettings,

    #[serde(default)]
    pub log: LogSettings,
}

/// Upper bound on report precision; beyond this f64 prints noise.
const MAX_PRECISION: usize = 10;

impl CliConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (margin.toml)
    /// 3. Environment variables
    ///
    /// An explicit `config_path` that does not exist is an error; a missing
    /// default config file is not.
    pub fn load(config_path: Option<&Path>) -> CliResult<Self> {
        let mut config = match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::ConfigLoadFailed(format!(
                        "{} does not exist",
                        path.display()
                    )));
                }
                Self::from_file(path)?
            }
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                Some(path) => {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
                None => Self::default(),
            },
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML config file.
    pub fn from_file(path: &Path) -> CliResult<Self> {
        debug!(?path, "Loading config from file");
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CliError::ConfigLoadFailed(format!("{}: {}", path.display(), e)))?;
        Ok(toml::from_str(&contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CliResult<()> {
        let solver = &self.solver;

        if solver.max_iterations == 0 {
            return Err(CliError::InvalidConfig(
                "solver.max_iterations must be greater than 0".into(),
            ));
        }

        if !(solver.tolerance > 0.0) || !solver.tolerance.is_finite() {
            return Err(CliError::InvalidConfig(
                "solver.tolerance must be a finite number greater than 0".into(),
            ));
        }

        if solver.strategy == SolverStrategy::FixedStep && !(solver.step > 0.0) {
            return Err(CliError::InvalidConfig(
                "solver.step must be greater than 0".into(),
            ));
        }

        if !solver.seed_price.is_finite() || solver.seed_price < 0.0 {
            return Err(CliError::InvalidConfig(format!(
                "solver.seed_price must be a non-negative number, got {}",
                solver.seed_price
            )));
        }

        if self.output.precision > MAX_PRECISION {
            return Err(CliError::InvalidConfig(format!(
                "output.precision must be at most {}",
                MAX_PRECISION
            )));
        }

        Ok(())
    }

    /// Applies `MARGIN_*` overrides looked up through `lookup`.
    ///
    /// Unparseable values are an error rather than silently ignored: a typo
    /// in `MARGIN_SOLVER_STRATEGY` should not quietly change the answer.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> CliResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(strategy) = lookup("MARGIN_SOLVER_STRATEGY") {
            debug!(strategy = %strategy, "Overriding solver strategy from environment");
            self.solver.strategy = strategy
                .parse()
                .map_err(|e: margin_core::breakeven::UnknownSolverStrategy| {
                    CliError::InvalidConfig(e.to_string())
                })?;
        }

        if let Some(iterations) = lookup("MARGIN_SOLVER_MAX_ITERATIONS") {
            self.solver.max_iterations = iterations.parse().map_err(|_| {
                CliError::InvalidConfig(format!(
                    "MARGIN_SOLVER_MAX_ITERATIONS must be a positive integer, got '{}'",
                    iterations
                ))
            })?;
        }

        if let Some(format) = lookup("MARGIN_OUTPUT_FORMAT") {
            debug!(format = %format, "Overriding output format from environment");
            self.output.format = format.parse()?;
        }

        if let Some(strict) = lookup("MARGIN_STRICT") {
            match strict.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.output.strict = true,
                "0" | "false" | "no" => self.output.strict = false,
                _ => {
                    return Err(CliError::InvalidConfig(format!(
                        "MARGIN_STRICT must be true or false, got '{}'",
                        strict
                    )))
                }
            }
        }

        if let Some(level) = lookup("MARGIN_LOG_LEVEL") {
            self.log.level = level;
        }

        Ok(())
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "margin", "margin")
            .map(|dirs| dirs.config_dir().join("margin.toml"))
    }
}
