//! # Break-Even Solver
//!
//! Two independent questions about one SKU:
//!
//! 1. **Price**: the lowest retail price at which net profit is ~zero.
//! 2. **Volume**: how many units per month cover the fixed costs at the
//!    current price.
//!
//! ## Why the price needs a search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  price ──► commission, return fee ──► tax base ──► tax ──► profit      │
//! │    ▲                                                          │         │
//! │    └──────────────── depends on ──────────────────────────────┘         │
//! │                                                                         │
//! │  Under USN_15 / OSNO the tax is max(0, rate × profit-before-tax), so    │
//! │  profit(price) is piecewise linear and has no single closed form.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Strategies
//! - [`SolverStrategy::Bisection`] (default): brackets the root by doubling
//!   from the seed price, then bisects. Profit is concave in price (linear
//!   revenue minus a clamped tax), so the first bracket holds the lowest
//!   root.
//! - [`SolverStrategy::FixedStep`]: walks ±`step` from the seed. Kept for
//!   parity with older results; it often oscillates around the root without
//!   ever landing inside the tolerance.
//!
//! Both are bounded and report `converged = false` instead of pretending a
//! trial price is the answer.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::metrics::UnitProjection;
use crate::types::{CalculationInput, PROFIT_TOLERANCE};

/// Upper bound on bracket doublings; 1000 × 2^64 is far beyond any price.
const MAX_BRACKET_DOUBLINGS: u32 = 64;

// =============================================================================
// Solver Settings
// =============================================================================

/// How the break-even price is searched for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverStrategy {
    /// Bracket-and-bisect.
    #[default]
    Bisection,
    /// Fixed ±step walk from the seed price.
    FixedStep,
}

impl std::fmt::Display for SolverStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverStrategy::Bisection => write!(f, "bisection"),
            SolverStrategy::FixedStep => write!(f, "fixed_step"),
        }
    }
}

/// Error returned when a strategy name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown solver strategy: '{0}'. Valid options: bisection, fixed_step")]
pub struct UnknownSolverStrategy(pub String);

impl std::str::FromStr for SolverStrategy {
    type Err = UnknownSolverStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bisection" | "bisect" => Ok(SolverStrategy::Bisection),
            "fixed_step" | "fixed-step" | "step" | "legacy" => Ok(SolverStrategy::FixedStep),
            _ => Err(UnknownSolverStrategy(s.to_string())),
        }
    }
}

/// Tuning knobs for the break-even price search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    pub strategy: SolverStrategy,
    /// First trial price.
    pub seed_price: f64,
    /// Price increment of the fixed-step walk.
    pub step: f64,
    /// Iteration cap (walk steps, or bisection halvings).
    pub max_iterations: u32,
    /// Profit magnitude accepted as zero.
    pub tolerance: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        SolverSettings {
            strategy: SolverStrategy::default(),
            seed_price: 1000.0,
            step: 50.0,
            max_iterations: 100,
            tolerance: PROFIT_TOLERANCE,
        }
    }
}

// =============================================================================
// Break-Even Price
// =============================================================================

/// Outcome of the break-even price search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreakEvenPrice {
    /// Retail price, never negative.
    pub price: f64,
    /// Trial prices evaluated after the seed.
    pub iterations: u32,
    /// True if net profit at `price` is within the tolerance.
    pub converged: bool,
}

/// Net profit of the input re-priced at `retail_price`.
fn profit_at(input: &CalculationInput, retail_price: f64) -> f64 {
    UnitProjection::of(&input.with_retail_price(retail_price)).net_profit
}

/// Searches for the break-even retail price with default settings.
pub fn calculate_break_even_price(input: &CalculationInput) -> BreakEvenPrice {
    calculate_break_even_price_with(input, &SolverSettings::default())
}

/// Searches for the break-even retail price.
///
/// ## Example
/// ```rust
/// use margin_core::breakeven::calculate_break_even_price;
/// use margin_core::CalculationInput;
///
/// // 6% tax on revenue, 400 of costs: 0.94 × price = 400
/// let input = CalculationInput {
///     purchase_price: 400.0,
///     ..Default::default()
/// };
/// let result = calculate_break_even_price(&input);
/// assert!(result.converged);
/// assert!((result.price - 400.0 / 0.94).abs() < 0.05);
/// ```
pub fn calculate_break_even_price_with(
    input: &CalculationInput,
    settings: &SolverSettings,
) -> BreakEvenPrice {
    let result = match settings.strategy {
        SolverStrategy::Bisection => bisection_search(input, settings),
        SolverStrategy::FixedStep => fixed_step_search(input, settings),
    };

    if result.converged {
        trace!(
            strategy = %settings.strategy,
            price = result.price,
            iterations = result.iterations,
            "Break-even price found"
        );
    } else {
        debug!(
            strategy = %settings.strategy,
            price = result.price,
            iterations = result.iterations,
            "Break-even price search did not converge"
        );
    }

    result
}

fn fixed_step_search(input: &CalculationInput, settings: &SolverSettings) -> BreakEvenPrice {
    let mut price = settings.seed_price;
    let mut iterations = 0;
    let mut profit = profit_at(input, price);

    while profit.abs() >= settings.tolerance && iterations < settings.max_iterations {
        price += if profit < 0.0 {
            settings.step
        } else {
            -settings.step
        };
        iterations += 1;
        profit = profit_at(input, price);
    }

    BreakEvenPrice {
        price: price.max(0.0),
        iterations,
        converged: price >= 0.0 && profit.abs() < settings.tolerance,
    }
}

fn bisection_search(input: &CalculationInput, settings: &SolverSettings) -> BreakEvenPrice {
    let floor_profit = profit_at(input, 0.0);
    if floor_profit.abs() < settings.tolerance {
        return BreakEvenPrice {
            price: 0.0,
            iterations: 0,
            converged: true,
        };
    }
    // Profitable even when given away: the root sits below zero.
    if floor_profit > 0.0 || floor_profit.is_nan() {
        return BreakEvenPrice {
            price: 0.0,
            iterations: 0,
            converged: false,
        };
    }

    let mut low = 0.0;
    let mut high = if settings.seed_price > 0.0 {
        settings.seed_price
    } else {
        1.0
    };
    let mut high_profit = profit_at(input, high);
    let mut iterations = 0;

    while high_profit < 0.0 {
        if iterations == MAX_BRACKET_DOUBLINGS {
            // No price recovers the costs (e.g. fees eat the whole price).
            return BreakEvenPrice {
                price: high,
                iterations,
                converged: false,
            };
        }
        low = high;
        high *= 2.0;
        iterations += 1;
        high_profit = profit_at(input, high);
    }
    if high_profit.is_nan() {
        return BreakEvenPrice {
            price: high,
            iterations,
            converged: false,
        };
    }

    let mut halvings = 0;
    while high_profit.abs() >= settings.tolerance && halvings < settings.max_iterations {
        let mid = low + (high - low) / 2.0;
        if mid <= low || mid >= high {
            break;
        }
        halvings += 1;

        let profit = profit_at(input, mid);
        if profit < 0.0 {
            low = mid;
        } else {
            high = mid;
            high_profit = profit;
        }
    }

    BreakEvenPrice {
        price: high,
        iterations: iterations + halvings,
        converged: high_profit.abs() < settings.tolerance,
    }
}

// =============================================================================
// Break-Even Volume
// =============================================================================

/// Units per month needed to cover fixed costs at the current price.
///
/// Fixed cost per unit is left out of the variable costs since it is the
/// quantity being solved for.
///
/// ## Returns
/// - `0` if nothing is sold per unit (zero price or pickup) or there are no
///   fixed costs to cover.
/// - `+inf` if each unit loses money before fixed costs; no volume helps.
pub fn calculate_break_even_volume(input: &CalculationInput) -> f64 {
    let unit = UnitProjection::of(input);
    if unit.effective_price <= 0.0 || unit.effective_pickup_rate <= 0.0 {
        return 0.0;
    }

    let breakdown = &unit.breakdown;
    let variable_costs_per_unit = breakdown.total_cogs
        + breakdown.marketplace_fees.total
        + breakdown.additional_costs.advertising
        + breakdown.additional_costs.other_variable;
    let contribution_margin_per_unit = unit.revenue - variable_costs_per_unit;

    if contribution_margin_per_unit <= 0.0 {
        return f64::INFINITY;
    }
    if input.fixed_costs_per_month <= 0.0 {
        return 0.0;
    }

    input.fixed_costs_per_month / contribution_margin_per_unit
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::TaxRegime;

    /// Profit slope 0.4104 per unit of retail price, 925 of costs.
    fn no_fixed_cost_input() -> CalculationInput {
        CalculationInput {
            purchase_price: 500.0,
            delivery_to_warehouse: 50.0,
            packaging: 30.0,
            other_cogs: 20.0,
            commission: 15.0,
            logistics: 100.0,
            storage: 50.0,
            return_processing: 10.0,
            pickup_rate: 80.0,
            return_rate: 10.0,
            advertising: 150.0,
            other_variable_costs: 25.0,
            fixed_costs_per_month: 0.0,
            expected_sales_per_month: 100.0,
            tax_regime: TaxRegime::Usn6,
            retail_price: 2000.0,
            seller_discount: 10.0,
            additional_promo: 5.0,
        }
    }

    #[test]
    fn test_bisection_finds_root() {
        let input = no_fixed_cost_input();
        let result = calculate_break_even_price(&input);

        assert!(result.converged);
        assert!((result.price - 925.0 / 0.4104).abs() < 0.1);
        assert!(profit_at(&input, result.price).abs() < PROFIT_TOLERANCE);
    }

    #[test]
    fn test_bisection_under_profit_tax() {
        for regime in [TaxRegime::Usn15, TaxRegime::Osno] {
            let input = no_fixed_cost_input().with_tax_regime(regime);
            let result = calculate_break_even_price(&input);

            assert!(result.converged, "{regime} did not converge");
            assert!(profit_at(&input, result.price).abs() < PROFIT_TOLERANCE);
            // Just below the root the unit still loses money.
            assert!(profit_at(&input, result.price - 1.0) < 0.0);
        }
    }

    #[test]
    fn test_fixed_step_oscillates_near_root() {
        let settings = SolverSettings {
            strategy: SolverStrategy::FixedStep,
            ..Default::default()
        };
        let result = calculate_break_even_price_with(&no_fixed_cost_input(), &settings);

        // Root ≈ 2253.9 is not a multiple of 50 away from the seed.
        assert!(!result.converged);
        assert_eq!(result.iterations, 100);
        assert!((result.price - 925.0 / 0.4104).abs() <= 50.0);
    }

    #[test]
    fn test_fixed_step_converges_on_grid() {
        // 0.94 × price − 940 = 0 at exactly 1000, the seed.
        let input = CalculationInput {
            purchase_price: 940.0,
            ..Default::default()
        };
        let settings = SolverSettings {
            strategy: SolverStrategy::FixedStep,
            ..Default::default()
        };
        let result = calculate_break_even_price_with(&input, &settings);
        assert!(result.converged);
        assert_eq!(result.iterations, 0);
        assert!((result.price - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_unreachable_price_is_reported() {
        // Commission eats the whole price: profit never turns positive.
        let input = CalculationInput {
            purchase_price: 100.0,
            commission: 100.0,
            ..Default::default()
        };
        let result = calculate_break_even_price(&input);
        assert!(!result.converged);
        assert!(result.price >= 0.0);
    }

    #[test]
    fn test_profitable_at_zero_price_is_not_converged() {
        // A negative purchase price pays the seller 100 per unit even for free.
        let input = CalculationInput {
            purchase_price: -100.0,
            ..Default::default()
        };
        let result = calculate_break_even_price(&input);
        assert_eq!(result.price, 0.0);
        assert_eq!(result.iterations, 0);
        assert!(!result.converged);
    }

    #[test]
    fn test_no_costs_breaks_even_at_zero() {
        let result = calculate_break_even_price(&CalculationInput::default());
        assert!(result.converged);
        assert_eq!(result.price, 0.0);
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("bisection".parse::<SolverStrategy>().unwrap(), SolverStrategy::Bisection);
        assert_eq!("fixed-step".parse::<SolverStrategy>().unwrap(), SolverStrategy::FixedStep);
        assert!("newton".parse::<SolverStrategy>().is_err());
    }

    #[test]
    fn test_volume_covers_fixed_costs() {
        let input = CalculationInput {
            fixed_costs_per_month: 50_000.0,
            retail_price: 5000.0,
            ..no_fixed_cost_input()
        };
        // revenue 2992.5, variable 600 + 834 + 150 + 25 = 1609
        let volume = calculate_break_even_volume(&input);
        assert!((volume - 50_000.0 / 1383.5).abs() < 1e-6);
    }

    #[test]
    fn test_volume_edge_cases() {
        let base = CalculationInput {
            fixed_costs_per_month: 50_000.0,
            retail_price: 5000.0,
            ..no_fixed_cost_input()
        };

        let free = CalculationInput {
            retail_price: 0.0,
            ..base.clone()
        };
        assert_eq!(calculate_break_even_volume(&free), 0.0);

        let all_returned = CalculationInput {
            return_rate: 80.0,
            ..base.clone()
        };
        assert_eq!(calculate_break_even_volume(&all_returned), 0.0);

        let losing = CalculationInput {
            retail_price: 2000.0,
            ..base.clone()
        };
        assert_eq!(calculate_break_even_volume(&losing), f64::INFINITY);

        let no_fixed = CalculationInput {
            fixed_costs_per_month: 0.0,
            ..base
        };
        assert_eq!(calculate_break_even_volume(&no_fixed), 0.0);
    }
}
