//! # Metrics Engine
//!
//! Turns one [`CalculationInput`] into a complete [`CalculationResults`].
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  retail price ─► effective price ─► revenue (× effective pickup rate)  │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                 cost breakdown (COGS, fees, additional, tax)            │
//! │                        │                                                │
//! │                        ▼                                                │
//! │  cm1 = revenue − COGS − marketplace fees                                │
//! │  cm2 = cm1 − advertising                                                │
//! │  net = cm2 − other variable − fixed per unit − tax                      │
//! │                        │                                                │
//! │                        ▼                                                │
//! │  ratios (margin, ROI, ad ROI, ACOS) ─► status ─► break-even             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every ratio is guarded: a non-positive denominator yields `0`, never NaN
//! or infinity.

use crate::breakdown::compute_breakdown;
use crate::breakeven::{calculate_break_even_price_with, calculate_break_even_volume, SolverSettings};
use crate::types::{CalculationInput, CalculationResults, CostBreakdown, ProfitStatus};

/// Price after seller discount and promo, floored at zero.
///
/// ## Example
/// ```rust
/// use margin_core::metrics::effective_price;
/// use margin_core::CalculationInput;
///
/// let input = CalculationInput {
///     retail_price: 2000.0,
///     seller_discount: 10.0,
///     additional_promo: 5.0,
///     ..Default::default()
/// };
/// assert!((effective_price(&input) - 1710.0).abs() < 1e-9);
/// ```
pub fn effective_price(input: &CalculationInput) -> f64 {
    let price = input.retail_price
        * (1.0 - input.seller_discount / 100.0)
        * (1.0 - input.additional_promo / 100.0);
    price.max(0.0)
}

/// Share of shipped units that end up sold, in percent, floored at zero.
pub fn effective_pickup_rate(input: &CalculationInput) -> f64 {
    (input.pickup_rate - input.return_rate).max(0.0)
}

/// `numerator / denominator × 100`, or `0` when the denominator is not
/// positive.
#[inline]
fn guarded_percent(numerator: f64, denominator: f64) -> f64 {
    if denominator <= 0.0 {
        0.0
    } else {
        numerator / denominator * 100.0
    }
}

// =============================================================================
// Unit Projection
// =============================================================================

/// Profit chain of one unit, before ratios and break-even analysis.
///
/// Shared by [`calculate_with`] and the break-even search so that a trial
/// price is evaluated bit-for-bit the same way as a real calculation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct UnitProjection {
    pub effective_price: f64,
    pub effective_pickup_rate: f64,
    pub revenue: f64,
    pub breakdown: CostBreakdown,
    pub cm1: f64,
    pub cm2: f64,
    pub net_profit: f64,
}

impl UnitProjection {
    pub(crate) fn of(input: &CalculationInput) -> Self {
        let effective_price = effective_price(input);
        let effective_pickup_rate = effective_pickup_rate(input);
        let revenue = effective_price * effective_pickup_rate / 100.0;

        let breakdown = compute_breakdown(input, effective_price);
        let fees = &breakdown.marketplace_fees;
        let additional = &breakdown.additional_costs;

        let cm1 = revenue - breakdown.total_cogs - fees.total;
        let cm2 = cm1 - additional.advertising;
        let net_profit = cm2
            - additional.other_variable
            - additional.fixed_per_unit
            - breakdown.taxes.amount;

        UnitProjection {
            effective_price,
            effective_pickup_rate,
            revenue,
            breakdown,
            cm1,
            cm2,
            net_profit,
        }
    }
}

// =============================================================================
// Calculation
// =============================================================================

/// Computes the full result with the default solver settings.
pub fn calculate(input: &CalculationInput) -> CalculationResults {
    calculate_with(input, &SolverSettings::default())
}

/// Computes the full result, tuning the break-even price search.
///
/// Never fails: invalid input still yields a complete record so the caller
/// can decide whether to trust it.
pub fn calculate_with(input: &CalculationInput, solver: &SolverSettings) -> CalculationResults {
    let unit = UnitProjection::of(input);
    let breakdown = unit.breakdown;
    let advertising = breakdown.additional_costs.advertising;

    let break_even = calculate_break_even_price_with(input, solver);

    CalculationResults {
        revenue: unit.revenue,
        cm1: unit.cm1,
        cm2: unit.cm2,
        net_profit: unit.net_profit,
        margin_percent: guarded_percent(unit.net_profit, unit.revenue),
        roi: guarded_percent(unit.net_profit, breakdown.total_cogs),
        // Attributes the whole profit to advertising spend.
        ad_roi: guarded_percent(unit.net_profit, advertising),
        acos: guarded_percent(advertising, unit.revenue),
        status: ProfitStatus::from_net_profit(unit.net_profit),
        break_even_price: break_even.price,
        break_even_price_converged: break_even.converged,
        break_even_volume: calculate_break_even_volume(input),
        breakdown,
        effective_price: unit.effective_price,
        effective_pickup_rate: unit.effective_pickup_rate,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
