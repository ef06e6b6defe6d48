//! # Report Rendering
//!
//! ```text
//! ┌───────────────────────┐     ┌──────────────────────────────────────┐
//! │ Report                │     │ --format json                        │
//! │  calculatedAt         │ ──► │  { "calculatedAt": ..., "warnings":  │
//! │  taxRegime            │     │    [...], "results": {...} }         │
//! │  warnings             │     ├──────────────────────────────────────┤
//! │  results              │ ──► │ --format text                        │
//! └───────────────────────┘     │  labelled table, fixed precision     │
//!                               └──────────────────────────────────────┘
//! ```

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use margin_core::{CalculationResults, ProfitStatus, TaxRegime};
use serde::Serialize;

use crate::config::OutputFormat;
use crate::error::CliResult;

/// Everything printed for one calculation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub calculated_at: DateTime<Utc>,
    pub tax_regime: TaxRegime,
    /// Validation messages; empty when the input was clean.
    pub warnings: Vec<String>,
    pub results: CalculationResults,
}

impl Report {
    pub fn new(tax_regime: TaxRegime, warnings: Vec<String>, results: CalculationResults) -> Self {
        Report {
            calculated_at: Utc::now(),
            tax_regime,
            warnings,
            results,
        }
    }
}

pub fn render(report: &Report, format: OutputFormat, precision: usize) -> CliResult<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Text => Ok(render_text(report, precision)),
    }
}

// =============================================================================
// Text Layout
// =============================================================================

const LABEL_WIDTH: usize = 28;

fn render_text(report: &Report, p: usize) -> String {
    let r = &report.results;
    let b = &r.breakdown;
    let mut out = String::new();

    // Writing to a String cannot fail.
    let mut line = |label: &str, value: String| {
        let _ = writeln!(out, "  {:<width$}{:>16}", label, value, width = LABEL_WIDTH);
    };

    line("Effective price", money(r.effective_price, p));
    line("Effective pickup rate", percent(r.effective_pickup_rate, p));
    line("Revenue per unit", money(r.revenue, p));
    line("", String::new());

    line("COGS", money(b.total_cogs, p));
    line("Marketplace fees", money(b.marketplace_fees.total, p));
    line("  commission", money(b.marketplace_fees.commission, p));
    line("  logistics", money(b.marketplace_fees.logistics, p));
    line("  storage", money(b.marketplace_fees.storage, p));
    line("  returns", money(b.marketplace_fees.returns, p));
    line("Additional costs", money(b.additional_costs.total, p));
    line("  advertising", money(b.additional_costs.advertising, p));
    line("  other variable", money(b.additional_costs.other_variable, p));
    line("  fixed per unit", money(b.additional_costs.fixed_per_unit, p));

    let tax_label = format!(
        "Tax {} ({:.0}% of {})",
        report.tax_regime.code(),
        b.taxes.rate * 100.0,
        if report.tax_regime.taxes_revenue() {
            "revenue"
        } else {
            "profit"
        }
    );
    line(&tax_label, money(b.taxes.amount, p));
    line("Total costs", money(b.total_costs, p));
    line("", String::new());

    line("CM1", money(r.cm1, p));
    line("CM2", money(r.cm2, p));
    line("Net profit", money(r.net_profit, p));
    line("Margin", percent(r.margin_percent, p));
    line("ROI", percent(r.roi, p));
    line("Ad ROI", percent(r.ad_roi, p));
    line("ACoS", percent(r.acos, p));
    line("", String::new());

    let break_even_price = if r.break_even_price_converged {
        money(r.break_even_price, p)
    } else {
        format!("~{}", money(r.break_even_price, p))
    };
    line("Break-even price", break_even_price);
    let break_even_volume = if r.break_even_volume.is_finite() {
        format!("{:.1$} units", r.break_even_volume, p)
    } else {
        "unreachable".to_string()
    };
    line("Break-even volume", break_even_volume);

    let mut text = format!("Status: {}\n", status_label(r.status));
    text.push_str(&out);

    if !report.warnings.is_empty() {
        text.push_str("\nWarnings:\n");
        for warning in &report.warnings {
            let _ = writeln!(text, "  - {}", warning);
        }
    }

    text
}

fn money(value: f64, precision: usize) -> String {
    format!("{:.1$}", value, precision)
}

fn percent(value: f64, precision: usize) -> String {
    format!("{:.1$}%", value, precision)
}

fn status_label(status: ProfitStatus) -> &'static str {
    match status {
        ProfitStatus::Profit => "PROFIT",
        ProfitStatus::Loss => "LOSS",
        ProfitStatus::Breakeven => "BREAKEVEN",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use margin_core::{calculate_metrics, CalculationInput};

    fn loss_report() -> Report {
        let input = CalculationInput {
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
            fixed_costs_per_month: 50_000.0,
            expected_sales_per_month: 100.0,
            tax_regime: TaxRegime::Usn6,
            retail_price: 2000.0,
            seller_discount: 10.0,
            additional_promo: 5.0,
        };
        Report::new(input.tax_regime, Vec::new(), calculate_metrics(&input))
    }

    #[test]
    fn test_json_envelope() {
        let report = loss_report();
        let json = render(&report, OutputFormat::Json, 2).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!(value["calculatedAt"].is_string());
        assert_eq!(value["taxRegime"], "USN_6");
        assert!(value["warnings"].as_array().unwrap().is_empty());
        assert_eq!(value["results"]["status"], "loss");
        assert!(value["results"]["breakEvenVolume"].is_null());
    }

    #[test]
    fn test_text_report() {
        let text = render(&loss_report(), OutputFormat::Text, 2).unwrap();

        assert!(text.starts_with("Status: LOSS"));
        assert!(text.contains("1710.00"));
        assert!(text.contains("-604.20"));
        assert!(text.contains("Tax USN_6 (6% of revenue)"));
        assert!(text.contains("unreachable"));
        assert!(!text.contains("Warnings:"));
    }

    #[test]
    fn test_text_report_lists_warnings() {
        let mut report = loss_report();
        report.warnings = vec!["Retail price must be positive".to_string()];
        let text = render(&report, OutputFormat::Text, 0).unwrap();

        assert!(text.contains("Warnings:"));
        assert!(text.contains("  - Retail price must be positive"));
        assert!(text.contains("-604"));
    }

    #[test]
    fn test_profit_tax_label() {
        let mut report = loss_report();
        report.tax_regime = TaxRegime::Usn15;
        report.results.breakdown.taxes.rate = 0.15;
        let text = render(&report, OutputFormat::Text, 2).unwrap();
        assert!(text.contains("Tax USN_15 (15% of profit)"));
    }
}
