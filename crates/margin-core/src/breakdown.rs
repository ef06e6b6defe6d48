//! # Cost Breakdown
//!
//! Per-unit cost structure at a given effective price.
//!
//! ```text
//! effective price ──┬──► commission  = price × commission%
//!                   ├──► returns     = price × return% × processing%
//!                   └──► tax base (see crate::tax)
//!
//! totalCosts = COGS + marketplace fees + additional costs + tax
//! ```

use crate::tax::compute_tax;
use crate::types::{AdditionalCosts, CalculationInput, CostBreakdown, MarketplaceFees};

/// Computes the cost breakdown of one unit sold at `effective_price`.
///
/// Tolerates unvalidated input: the only division is guarded, so zero or
/// negative fields never produce NaN.
pub fn compute_breakdown(input: &CalculationInput, effective_price: f64) -> CostBreakdown {
    let total_cogs =
        input.purchase_price + input.delivery_to_warehouse + input.packaging + input.other_cogs;

    let marketplace_fees = marketplace_fees(input, effective_price);
    let additional_costs = additional_costs(input);

    let taxes = compute_tax(
        input.tax_regime,
        effective_price,
        total_cogs,
        marketplace_fees.total,
        additional_costs.total,
    );

    CostBreakdown {
        total_cogs,
        marketplace_fees,
        additional_costs,
        taxes,
        total_costs: total_cogs + marketplace_fees.total + additional_costs.total + taxes.amount,
    }
}

fn marketplace_fees(input: &CalculationInput, effective_price: f64) -> MarketplaceFees {
    let commission = effective_price * input.commission / 100.0;
    // Processing is charged as a share of the revenue at risk, not per return.
    let returns = effective_price * input.return_rate / 100.0 * input.return_processing / 100.0;

    MarketplaceFees {
        commission,
        logistics: input.logistics,
        storage: input.storage,
        returns,
        total: commission + input.logistics + input.storage + returns,
    }
}

fn additional_costs(input: &CalculationInput) -> AdditionalCosts {
    let fixed_per_unit = fixed_cost_per_unit(input);

    AdditionalCosts {
        advertising: input.advertising,
        other_variable: input.other_variable_costs,
        fixed_per_unit,
        total: input.advertising + input.other_variable_costs + fixed_per_unit,
    }
}

/// Monthly fixed costs spread over expected monthly sales; zero when no
/// sales are expected.
pub fn fixed_cost_per_unit(input: &CalculationInput) -> f64 {
    if input.expected_sales_per_month > 0.0 {
        input.fixed_costs_per_month / input.expected_sales_per_month
    } else {
        0.0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
