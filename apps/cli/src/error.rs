//! # CLI Error Types
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  std::io / toml / serde_json errors ──┐                                 │
//! │  margin_core::CoreError ──────────────┼──► CliError ──► exit code       │
//! │  bad flags / bad config values ───────┘                                 │
//! │                                                                         │
//! │  exit 2: usage or configuration problem (fix the invocation)            │
//! │  exit 1: everything else (fix the scenario)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Convenience type alias for Results with CliError.
pub type CliResult<T> = Result<T, CliError>;

/// Errors raised by the `margin` binary.
#[derive(Debug, Error)]
pub enum CliError {
    // =========================================================================
    // Invocation Errors
    // =========================================================================
    /// Bad command-line arguments.
    #[error("{0}")]
    Usage(String),

    /// Config value out of range or unparseable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Config file exists but could not be read or parsed.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    // =========================================================================
    // Scenario Errors
    // =========================================================================
    /// Scenario file could not be read.
    #[error("Failed to read scenario: {0}")]
    ScenarioReadFailed(String),

    /// Scenario file is not a valid CalculationInput.
    #[error("Failed to parse scenario: {0}")]
    ScenarioParseFailed(String),

    /// Scenario file extension is neither .toml nor .json.
    #[error("Unsupported scenario format '{0}'. Use a .toml or .json file")]
    UnsupportedFormat(String),

    /// Strict mode refused invalid input.
    #[error(transparent)]
    Calculation(#[from] margin_core::CoreError),

    // =========================================================================
    // Output Errors
    // =========================================================================
    /// Report could not be serialized.
    #[error("Failed to render report: {0}")]
    RenderFailed(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::RenderFailed(err.to_string())
    }
}

impl From<toml::de::Error> for CliError {
    fn from(err: toml::de::Error) -> Self {
        CliError::ConfigLoadFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl CliError {
    /// Returns true if the invocation itself is wrong rather than the data.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            CliError::Usage(_)
                | CliError::InvalidConfig(_)
                | CliError::ConfigLoadFailed(_)
                | CliError::UnsupportedFormat(_)
        )
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        if self.is_usage_error() {
            2
        } else {
            1
        }
    }
}
