//! # Validation Module
//!
//! Business-rule checks on a [`CalculationInput`].
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation vs. Calculation                         │
//! │                                                                         │
//! │  UI form ──► validate_calculation_input() ──► list of messages          │
//! │     │                                                                   │
//! │     └──────► calculate_metrics() ──► ALWAYS a complete result           │
//! │                                                                         │
//! │  The two are independent: the UI decides whether a result computed    │
//! │  from invalid input is worth showing. calculate_checked() couples      │
//! │  them for callers that want enforcement.                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every rule is evaluated; nothing short-circuits, so the user sees all
//! problems at once, in a stable order.
//!
//! ## Usage
//! ```rust
//! use margin_core::validation::{has_calculation_errors, validate_calculation_input};
//! use margin_core::CalculationInput;
//!
//! let input = CalculationInput {
//!     retail_price: 0.0,
//!     seller_discount: 60.0,
//!     additional_promo: 40.0,
//!     ..Default::default()
//! };
//!
//! assert!(has_calculation_errors(&input));
//! assert_eq!(
//!     validate_calculation_input(&input),
//!     vec!["Retail price must be positive", "Total discount cannot reach 100%"],
//! );
//! ```

use crate::error::ValidationError;
use crate::types::CalculationInput;

/// Returns true if `value` is a percentage in [0, 100].
#[inline]
fn is_percent(value: f64) -> bool {
    (0.0..=100.0).contains(&value)
}

fn check_percent(errors: &mut Vec<ValidationError>, field: &'static str, value: f64) {
    if !is_percent(value) {
        errors.push(ValidationError::PercentOutOfRange { field });
    }
}

/// Checks every rule and returns the violations, in rule order.
///
/// An empty vector means the input is valid.
pub fn validate(input: &CalculationInput) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    // Negated comparisons so NaN fails each rule.
    if !(input.retail_price > 0.0) {
        errors.push(ValidationError::RetailPriceNotPositive);
    }

    if !(input.purchase_price >= 0.0) {
        errors.push(ValidationError::NegativePurchasePrice);
    }

    check_percent(&mut errors, "Pickup rate", input.pickup_rate);
    check_percent(&mut errors, "Return rate", input.return_rate);

    if !(input.pickup_rate - input.return_rate > 0.0) {
        errors.push(ValidationError::EffectivePickupNotPositive);
    }

    check_percent(&mut errors, "Seller discount", input.seller_discount);
    check_percent(&mut errors, "Additional promo", input.additional_promo);

    if !(input.seller_discount + input.additional_promo < 100.0) {
        errors.push(ValidationError::TotalDiscountTooHigh);
    }

    errors
}

/// Human-readable violation messages; empty means valid.
pub fn validate_calculation_input(input: &CalculationInput) -> Vec<String> {
    validate(input).iter().map(ToString::to_string).collect()
}

/// Returns true if [`validate`] reports at least one violation.
pub fn has_calculation_errors(input: &CalculationInput) -> bool {
    !validate(input).is_empty()
}

// =============================================================================
// Unit Tests
// =============================================================================
