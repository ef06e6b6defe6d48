//! # Domain Types
//!
//! Records exchanged between the engine and its callers.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────────┐        ┌──────────────────────────────────┐      │
//! │  │ CalculationInput │ ─────► │ CalculationResults               │      │
//! │  │  ──────────────  │        │  ──────────────────────────────  │      │
//! │  │  costs           │        │  revenue, cm1, cm2, netProfit    │      │
//! │  │  marketplace fees│        │  marginPercent, roi, adRoi, acos │      │
//! │  │  additional costs│        │  status, break-even price/volume │      │
//! │  │  tax regime      │        │  breakdown ─┐                    │      │
//! │  │  pricing         │        └─────────────┼────────────────────┘      │
//! │  └──────────────────┘                      ▼                           │
//! │                          ┌──────────────────────────────────┐          │
//! │                          │ CostBreakdown                    │          │
//! │                          │  totalCOGS                       │          │
//! │                          │  MarketplaceFees  (…, total)     │          │
//! │                          │  AdditionalCosts  (…, total)     │          │
//! │                          │  TaxBreakdown (amount,rate,base) │          │
//! │                          │  totalCosts                      │          │
//! │                          └──────────────────────────────────┘          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Units
//! Money fields are plain `f64` amounts in the seller's currency, per unit
//! shipped. Commission, return processing, rates, and discounts are
//! percentages in 0..=100, never fractions. Everything is created fresh per calculation and never
//! mutated afterwards.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::tax::TaxRegime;

/// Net profit magnitude below which a unit counts as break-even.
///
/// Absorbs floating-point noise; it is not a business threshold.
pub const PROFIT_TOLERANCE: f64 = 0.01;

// =============================================================================
// Calculation Input
// =============================================================================

/// Everything the engine needs to price one SKU.
///
/// Built by the UI layer from form state plus marketplace defaults. The
/// engine never assumes it was validated; see [`crate::validation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct CalculationInput {
    // --- Cost of goods -----------------------------------------------------
    /// Price paid to the supplier per unit.
    pub purchase_price: f64,
    /// Inbound delivery to the marketplace warehouse, per unit.
    pub delivery_to_warehouse: f64,
    pub packaging: f64,
    /// Any other per-unit cost of goods (labeling, certification, ...).
    #[serde(rename = "otherCOGS")]
    pub other_cogs: f64,

    // --- Marketplace fees --------------------------------------------------
    /// Marketplace commission, percent of the effective price.
    pub commission: f64,
    /// Outbound logistics fee per unit.
    pub logistics: f64,
    /// Storage fee per unit.
    pub storage: f64,
    /// Return handling, percent of the revenue at risk of return.
    pub return_processing: f64,
    /// Share of shipped units picked up by buyers.
    pub pickup_rate: f64,
    /// Share of shipped units returned after pickup.
    pub return_rate: f64,

    // --- Additional costs --------------------------------------------------
    /// Advertising spend per unit.
    pub advertising: f64,
    pub other_variable_costs: f64,
    /// Monthly fixed costs (rent, salaries, subscriptions).
    pub fixed_costs_per_month: f64,
    /// Units expected to sell per month; spreads the fixed costs.
    pub expected_sales_per_month: f64,

    // --- Tax ----------------------------------------------------------------
    pub tax_regime: TaxRegime,

    // --- Pricing ------------------------------------------------------------
    /// List price before any discount.
    pub retail_price: f64,
    /// Seller-funded discount, percent.
    pub seller_discount: f64,
    /// Extra promo discount on top of the seller discount, percent.
    pub additional_promo: f64,
}

impl Default for CalculationInput {
    /// An empty form: no costs, no discounts, every shipped unit picked up.
    fn default() -> Self {
        CalculationInput {
            purchase_price: 0.0,
            delivery_to_warehouse: 0.0,
            packaging: 0.0,
            other_cogs: 0.0,
            commission: 0.0,
            logistics: 0.0,
            storage: 0.0,
            return_processing: 0.0,
            pickup_rate: 100.0,
            return_rate: 0.0,
            advertising: 0.0,
            other_variable_costs: 0.0,
            fixed_costs_per_month: 0.0,
            expected_sales_per_month: 0.0,
            tax_regime: TaxRegime::default(),
            retail_price: 0.0,
            seller_discount: 0.0,
            additional_promo: 0.0,
        }
    }
}

impl CalculationInput {
    /// Returns a copy priced at `retail_price`, everything else unchanged.
    ///
    /// Used by the break-even search to evaluate trial prices through the
    /// exact same code path as a regular calculation.
    pub fn with_retail_price(&self, retail_price: f64) -> Self {
        CalculationInput {
            retail_price,
            ..self.clone()
        }
    }

    /// Returns a copy under a different tax regime.
    pub fn with_tax_regime(&self, tax_regime: TaxRegime) -> Self {
        CalculationInput {
            tax_regime,
            ..self.clone()
        }
    }
}

// =============================================================================
// Profit Status
// =============================================================================

/// Sign of the net profit, with a ±[`PROFIT_TOLERANCE`] deadband.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ProfitStatus {
    Profit,
    Loss,
    Breakeven,
}

impl ProfitStatus {
    /// Classifies a net profit value.
    ///
    /// ## Example
    /// ```rust
    /// use margin_core::ProfitStatus;
    ///
    /// assert_eq!(ProfitStatus::from_net_profit(12.0), ProfitStatus::Profit);
    /// assert_eq!(ProfitStatus::from_net_profit(-0.005), ProfitStatus::Breakeven);
    /// assert_eq!(ProfitStatus::from_net_profit(-3.0), ProfitStatus::Loss);
    /// ```
    pub fn from_net_profit(net_profit: f64) -> Self {
        if net_profit > PROFIT_TOLERANCE {
            ProfitStatus::Profit
        } else if net_profit < -PROFIT_TOLERANCE {
            ProfitStatus::Loss
        } else {
            ProfitStatus::Breakeven
        }
    }
}

impl std::fmt::Display for ProfitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfitStatus::Profit => write!(f, "profit"),
            ProfitStatus::Loss => write!(f, "loss"),
            ProfitStatus::Breakeven => write!(f, "breakeven"),
        }
    }
}

// =============================================================================
// Cost Breakdown
// =============================================================================

/// Per-unit fees charged by the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceFees {
    pub commission: f64,
    pub logistics: f64,
    pub storage: f64,
    pub returns: f64,
    /// Sum of the four fields above.
    pub total: f64,
}

/// Seller-side costs outside COGS and marketplace fees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalCosts {
    pub advertising: f64,
    pub other_variable: f64,
    /// Monthly fixed costs spread over expected monthly sales.
    pub fixed_per_unit: f64,
    pub total: f64,
}

/// Tax owed per unit and how it was derived.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TaxBreakdown {
    /// Never negative.
    pub amount: f64,
    /// Fraction, e.g. 0.06.
    pub rate: f64,
    /// Taxable base; negative when the unit loses money on a profit regime.
    pub base: f64,
}

/// Full per-unit cost structure.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    #[serde(rename = "totalCOGS")]
    pub total_cogs: f64,
    pub marketplace_fees: MarketplaceFees,
    pub additional_costs: AdditionalCosts,
    pub taxes: TaxBreakdown,
    /// COGS + marketplace fees + additional costs + tax.
    pub total_costs: f64,
}

// =============================================================================
// Calculation Results
// =============================================================================

/// The engine's sole output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResults {
    /// Expected revenue per shipped unit (effective price × pickup share).
    pub revenue: f64,
    /// Contribution margin after COGS and marketplace fees.
    pub cm1: f64,
    /// Contribution margin after advertising.
    pub cm2: f64,
    pub net_profit: f64,
    pub margin_percent: f64,
    pub roi: f64,
    pub ad_roi: f64,
    pub acos: f64,
    pub status: ProfitStatus,
    pub break_even_price: f64,
    /// False when the price search ran out of iterations or no price makes
    /// the unit break even; `break_even_price` is then the last trial.
    pub break_even_price_converged: bool,
    /// Units per month covering fixed costs; `+inf` when unreachable.
    #[serde(with = "unbounded")]
    #[ts(type = "number | null")]
    pub break_even_volume: f64,
    pub breakdown: CostBreakdown,
    pub effective_price: f64,
    pub effective_pickup_rate: f64,
}

/// JSON has no infinity: `+inf` travels as `null`.
mod unbounded {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profit_status_deadband() {
        assert_eq!(ProfitStatus::from_net_profit(0.011), ProfitStatus::Profit);
        assert_eq!(ProfitStatus::from_net_profit(0.01), ProfitStatus::Breakeven);
        assert_eq!(ProfitStatus::from_net_profit(0.0), ProfitStatus::Breakeven);
        assert_eq!(ProfitStatus::from_net_profit(-0.01), ProfitStatus::Breakeven);
        assert_eq!(ProfitStatus::from_net_profit(-0.011), ProfitStatus::Loss);
    }

    #[test]
    fn test_input_field_names() {
        let json = serde_json::to_value(CalculationInput::default()).unwrap();
        assert!(json.get("otherCOGS").is_some());
        assert!(json.get("expectedSalesPerMonth").is_some());
        assert_eq!(json["taxRegime"], "USN_6");
    }

    #[test]
    fn test_partial_input_uses_defaults() {
        let input: CalculationInput =
            serde_json::from_str(r#"{"retailPrice": 990, "taxRegime": "OSNO"}"#).unwrap();
        assert_eq!(input.retail_price, 990.0);
        assert_eq!(input.tax_regime, TaxRegime::Osno);
        assert_eq!(input.pickup_rate, 100.0);
    }

    #[test]
    fn test_with_retail_price_keeps_other_fields() {
        let input = CalculationInput {
            purchase_price: 300.0,
            retail_price: 1000.0,
            ..Default::default()
        };
        let repriced = input.with_retail_price(1500.0);
        assert_eq!(repriced.retail_price, 1500.0);
        assert_eq!(repriced.purchase_price, 300.0);
    }
}
