//! # Tax Engine
//!
//! Simplified small-business tax regimes and per-unit tax calculation.
//!
//! ## Base Selection
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Regime   Rate   Base                                                   │
//! │  ───────  ─────  ─────────────────────────────────────────────────────  │
//! │  USN_6    6%     effective price           (tax on gross revenue)       │
//! │  USN_15   15%    price − COGS − fees − additional costs   (profit)      │
//! │  OSNO     20%    price − COGS − fees − additional costs   (profit)      │
//! │                                                                         │
//! │  amount = max(0, base × rate)   ← a loss never produces a refund        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The rates are a flat approximation, not real VAT or profit-tax law.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::TaxBreakdown;

// =============================================================================
// Tax Regime
// =============================================================================

/// Tax regime of the seller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum TaxRegime {
    /// Simplified system, 6% of revenue.
    #[default]
    #[serde(rename = "USN_6")]
    Usn6,
    /// Simplified system, 15% of revenue minus expenses.
    #[serde(rename = "USN_15")]
    Usn15,
    /// General system, approximated as 20% of profit.
    #[serde(rename = "OSNO")]
    Osno,
}

impl TaxRegime {
    /// All regimes, in display order.
    pub const ALL: [TaxRegime; 3] = [TaxRegime::Usn6, TaxRegime::Usn15, TaxRegime::Osno];

    /// Flat tax rate as a fraction.
    #[inline]
    pub const fn rate(&self) -> f64 {
        match self {
            TaxRegime::Usn6 => 0.06,
            TaxRegime::Usn15 => 0.15,
            TaxRegime::Osno => 0.20,
        }
    }

    /// Returns true if the base is revenue rather than profit.
    #[inline]
    pub const fn taxes_revenue(&self) -> bool {
        matches!(self, TaxRegime::Usn6)
    }

    /// Wire code, as used in JSON.
    pub const fn code(&self) -> &'static str {
        match self {
            TaxRegime::Usn6 => "USN_6",
            TaxRegime::Usn15 => "USN_15",
            TaxRegime::Osno => "OSNO",
        }
    }
}

impl std::fmt::Display for TaxRegime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned when a regime name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown tax regime: '{0}'. Valid options: USN_6, USN_15, OSNO")]
pub struct UnknownTaxRegime(pub String);

impl std::str::FromStr for TaxRegime {
    type Err = UnknownTaxRegime;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "usn6" | "6" => Ok(TaxRegime::Usn6),
            "usn15" | "15" => Ok(TaxRegime::Usn15),
            "osno" | "general" => Ok(TaxRegime::Osno),
            _ => Err(UnknownTaxRegime(s.to_string())),
        }
    }
}

// =============================================================================
// Tax Calculation
// =============================================================================

/// Computes the per-unit tax for `regime`.
///
/// The profit regimes tax the effective price minus every non-tax cost.
/// Note that the base uses the full effective price, not the pickup-adjusted
/// revenue.
///
/// ## Example
/// ```rust
/// use margin_core::tax::{compute_tax, TaxRegime};
///
/// let tax = compute_tax(TaxRegime::Usn15, 1710.0, 600.0, 423.6, 675.0);
/// assert!((tax.base - 11.4).abs() < 1e-9);
/// assert!((tax.amount - 1.71).abs() < 1e-9);
///
/// // Loss-making unit: no negative tax.
/// let tax = compute_tax(TaxRegime::Osno, 500.0, 600.0, 100.0, 0.0);
/// assert_eq!(tax.amount, 0.0);
/// ```
pub fn compute_tax(
    regime: TaxRegime,
    effective_price: f64,
    cogs: f64,
    marketplace_fees_total: f64,
    additional_costs_total: f64,
) -> TaxBreakdown {
    let rate = regime.rate();
    let base = match regime {
        TaxRegime::Usn6 => effective_price,
        TaxRegime::Usn15 | TaxRegime::Osno => {
            effective_price - cogs - marketplace_fees_total - additional_costs_total
        }
    };

    TaxBreakdown {
        amount: (base * rate).max(0.0),
        rate,
        base,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
