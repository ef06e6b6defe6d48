//! Scenario loading.
//!
//! A scenario is a [`CalculationInput`] stored as TOML or JSON. Omitted
//! fields take the engine defaults, so a scenario only needs the numbers the
//! seller actually knows.

use std::io::Read;
use std::path::Path;

use margin_core::{CalculationInput, TaxRegime};
use tracing::debug;

use crate::error::{CliError, CliResult};

/// Path argument that means "read JSON from stdin".
pub const STDIN_PATH: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioFormat {
    Toml,
    Json,
}

impl ScenarioFormat {
    /// Picks the format from the file extension. `-` is JSON on stdin.
    pub fn detect(path: &str) -> CliResult<Self> {
        if path == STDIN_PATH {
            return Ok(ScenarioFormat::Json);
        }

        let extension = Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "toml" => Ok(ScenarioFormat::Toml),
            "json" => Ok(ScenarioFormat::Json),
            _ => Err(CliError::UnsupportedFormat(path.to_string())),
        }
    }
}

/// Reads and parses the scenario at `path`.
pub fn load_scenario(path: &str) -> CliResult<CalculationInput> {
    let format = ScenarioFormat::detect(path)?;

    let contents = if path == STDIN_PATH {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| CliError::ScenarioReadFailed(format!("stdin: {}", e)))?;
        buffer
    } else {
        std::fs::read_to_string(path)
            .map_err(|e| CliError::ScenarioReadFailed(format!("{}: {}", path, e)))?
    };

    debug!(path, ?format, bytes = contents.len(), "Scenario read");
    parse_scenario(&contents, format)
}

pub fn parse_scenario(contents: &str, format: ScenarioFormat) -> CliResult<CalculationInput> {
    match format {
        ScenarioFormat::Toml => {
            toml::from_str(contents).map_err(|e| CliError::ScenarioParseFailed(e.to_string()))
        }
        ScenarioFormat::Json => serde_json::from_str(contents)
            .map_err(|e| CliError::ScenarioParseFailed(e.to_string())),
    }
}

/// Command-line values that replace fields of the loaded scenario.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenarioOverrides {
    pub tax_regime: Option<TaxRegime>,
    pub retail_price: Option<f64>,
}

impl ScenarioOverrides {
    pub fn is_empty(&self) -> bool {
        self.tax_regime.is_none() && self.retail_price.is_none()
    }

    pub fn apply(&self, input: CalculationInput) -> CalculationInput {
        let mut input = input;
        if let Some(regime) = self.tax_regime {
            debug!(%regime, "Overriding tax regime");
            input.tax_regime = regime;
        }
        if let Some(price) = self.retail_price {
            debug!(price, "Overriding retail price");
            input.retail_price = price;
        }
        input
    }
}
