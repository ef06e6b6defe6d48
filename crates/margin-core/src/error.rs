//! # Error Types
//!
//! Domain-specific error types for margin-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  margin-core errors (this file)                                        │
//! │  ├── ValidationError  - One violated input rule                        │
//! │  └── CoreError        - Checked calculation refused                    │
//! │                                                                         │
//! │  CLI errors (apps/cli)                                                 │
//! │  └── CliError         - Config, scenario file, and output failures     │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CliError → exit code              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Numeric edge cases (zero revenue, unreachable break-even, ...) are NOT
//! errors. The engine normalizes them inside the result so a UI can render
//! an impossible scenario instead of failing.

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// A single violated input rule.
///
/// The `Display` output of each variant is the human-readable message
/// returned by [`crate::validation::validate_calculation_input`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Retail price is zero or negative.
    #[error("Retail price must be positive")]
    RetailPriceNotPositive,

    /// Purchase price is negative.
    #[error("Purchase price cannot be negative")]
    NegativePurchasePrice,

    /// A percentage field lies outside [0, 100].
    #[error("{field} must be between 0 and 100%")]
    PercentOutOfRange { field: &'static str },

    /// Pickup rate does not exceed return rate.
    ///
    /// ## When This Occurs
    /// ```text
    /// pickup 60%, returns 60%  →  0% of shipped units end up sold
    ///      │
    ///      ▼
    /// revenue per shipped unit is zero, every ratio collapses
    /// ```
    #[error("Effective pickup rate must be positive (pickup rate must exceed return rate)")]
    EffectivePickupNotPositive,

    /// Seller discount and promo together wipe out the price.
    #[error("Total discount cannot reach 100%")]
    TotalDiscountTooHigh,
}

// =============================================================================
// Core Error
// =============================================================================

/// Errors returned by the checked entry points.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Input failed validation; carries every violation, in rule order.
    #[error("Invalid calculation input: {}", join_messages(.0))]
    InvalidInput(Vec<ValidationError>),
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
