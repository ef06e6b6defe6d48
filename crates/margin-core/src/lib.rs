//! # margin-core: Unit-Economics Engine for Marketplace Sellers
//!
//! This crate is the **heart** of Margin. It answers one question per call:
//! *does this SKU make money on this marketplace, and at what price or
//! volume would it break even?* Everything is a pure function with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Margin Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │          UI / CLI (apps/cli, or any TypeScript frontend)        │   │
//! │  │    form state ──► CalculationInput     results ──► display     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ margin-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │validation │  │ breakdown │  │  metrics  │  │ breakeven │  │   │
//! │  │   │  rules    │  │ COGS/fees │  │ cm1, cm2  │  │ price     │  │   │
//! │  │   │  messages │  │   tax ◄───┼──┤ ratios    │  │ volume    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STATE • SAFE TO CALL FROM ANY THREAD             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Input, breakdown, and result records
//! - [`tax`] - Tax regimes and tax-base selection
//! - [`breakdown`] - Per-unit cost breakdown
//! - [`metrics`] - Profit chain and ratios
//! - [`breakeven`] - Break-even price search and volume
//! - [`validation`] - Input rule checks
//! - [`error`] - Error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input = bit-identical output
//! 2. **Total**: any numeric input yields a complete result; edge cases are
//!    normalized (ratios → 0, unreachable volume → +∞), never raised
//! 3. **Validation is separate**: callers choose whether to enforce it
//!
//! ## Example Usage
//!
//! ```rust
//! use margin_core::{calculate_metrics, CalculationInput, ProfitStatus, TaxRegime};
//!
//! let input = CalculationInput {
//!     purchase_price: 300.0,
//!     commission: 15.0,
//!     logistics: 80.0,
//!     tax_regime: TaxRegime::Usn6,
//!     retail_price: 1200.0,
//!     ..Default::default()
//! };
//!
//! let results = calculate_metrics(&input);
//! assert_eq!(results.status, ProfitStatus::Profit);
//! assert!(results.break_even_price < input.retail_price);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod breakdown;
pub mod breakeven;
pub mod error;
pub mod metrics;
pub mod tax;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use breakeven::{BreakEvenPrice, SolverSettings, SolverStrategy};
pub use error::{CoreError, CoreResult, ValidationError};
pub use tax::TaxRegime;
pub use types::*;
pub use validation::{has_calculation_errors, validate_calculation_input};

// =============================================================================
// Public Surface
// =============================================================================

/// Computes the full unit-economics result.
///
/// Never fails, even for input that [`validate_calculation_input`] rejects.
pub fn calculate_metrics(input: &CalculationInput) -> CalculationResults {
    metrics::calculate(input)
}

/// Same as [`calculate_metrics`], with explicit break-even solver settings.
pub fn calculate_metrics_with(
    input: &CalculationInput,
    solver: &SolverSettings,
) -> CalculationResults {
    metrics::calculate_with(input, solver)
}

/// Validates first, then calculates.
///
/// ## Errors
/// [`CoreError::InvalidInput`] with every violated rule, in rule order.
pub fn calculate_checked(
    input: &CalculationInput,
    solver: &SolverSettings,
) -> CoreResult<CalculationResults> {
    let errors = validation::validate(input);
    if !errors.is_empty() {
        return Err(CoreError::InvalidInput(errors));
    }
    Ok(metrics::calculate_with(input, solver))
}

// =============================================================================
// Unit Tests
// =============================================================================
