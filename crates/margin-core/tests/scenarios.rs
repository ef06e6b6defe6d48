//! End-to-end scenarios through the public surface of margin-core.

use margin_core::{
    calculate_metrics, calculate_metrics_with, CalculationInput, CalculationResults,
    ProfitStatus, SolverSettings, SolverStrategy, TaxRegime,
};

fn assert_close(actual: f64, expected: f64, eps: f64) {
    assert!(
        (actual - expected).abs() < eps,
        "expected {expected} ± {eps}, got {actual}"
    );
}

/// A typical loss-making listing: heavy fixed costs over 100 units a month.
fn scenario_a() -> CalculationInput {
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
        fixed_costs_per_month: 50_000.0,
        expected_sales_per_month: 100.0,
        tax_regime: TaxRegime::Usn6,
        retail_price: 2000.0,
        seller_discount: 10.0,
        additional_promo: 5.0,
    }
}

fn assert_group_totals(results: &CalculationResults) {
    let fees = &results.breakdown.marketplace_fees;
    assert_close(
        fees.total,
        fees.commission + fees.logistics + fees.storage + fees.returns,
        1e-9,
    );

    let additional = &results.breakdown.additional_costs;
    assert_close(
        additional.total,
        additional.advertising + additional.other_variable + additional.fixed_per_unit,
        1e-9,
    );

    let breakdown = &results.breakdown;
    assert_close(
        breakdown.total_costs,
        breakdown.total_cogs + fees.total + additional.total + breakdown.taxes.amount,
        1e-9,
    );
}

// =============================================================================
// Concrete Scenarios
// =============================================================================

#[test]
fn scenario_a_usn6_loss() {
    let results = calculate_metrics(&scenario_a());

    assert_close(results.effective_price, 1710.0, 1e-9);
    assert_close(results.effective_pickup_rate, 70.0, 1e-9);
    assert_close(results.revenue, 1197.0, 1e-9);
    assert_close(results.breakdown.total_cogs, 600.0, 1e-9);
    assert_close(results.breakdown.marketplace_fees.commission, 256.5, 1e-9);
    assert_close(results.breakdown.marketplace_fees.total, 423.6, 1e-9);
    assert_close(results.breakdown.additional_costs.total, 675.0, 1e-9);
    assert_close(results.breakdown.taxes.base, 1710.0, 1e-9);
    assert_close(results.breakdown.taxes.amount, 102.6, 1e-9);
    assert_close(results.cm1, 173.4, 1e-6);
    assert_close(results.cm2, 23.4, 1e-6);
    assert_close(results.net_profit, -604.2, 1e-6);
    assert_close(results.margin_percent, -50.48, 0.01);
    assert_close(results.roi, -100.7, 0.01);
    assert_close(results.ad_roi, -402.8, 0.01);
    assert_close(results.acos, 12.53, 0.01);
    assert_eq!(results.status, ProfitStatus::Loss);

    // 1197 of revenue against 1198.6 of variable costs.
    assert_eq!(results.break_even_volume, f64::INFINITY);
    assert_group_totals(&results);
}

#[test]
fn scenario_b_usn15_taxes_profit() {
    let input = scenario_a().with_tax_regime(TaxRegime::Usn15);
    let results = calculate_metrics(&input);

    assert_close(results.breakdown.taxes.base, 11.4, 1e-6);
    assert_close(results.breakdown.taxes.amount, 1.71, 1e-6);
    assert_eq!(results.breakdown.taxes.rate, 0.15);
}

#[test]
fn scenario_c_break_even_price_round_trips() {
    for regime in TaxRegime::ALL {
        let input = CalculationInput {
            fixed_costs_per_month: 0.0,
            ..scenario_a().with_tax_regime(regime)
        };
        let results = calculate_metrics(&input);
        assert!(results.break_even_price_converged, "{regime} did not converge");

        let at_break_even = calculate_metrics(&input.with_retail_price(results.break_even_price));
        assert!(at_break_even.net_profit.abs() < 1.0);
        assert_eq!(at_break_even.status, ProfitStatus::Breakeven);
    }
}

#[test]
fn scenario_c_with_fixed_costs_spread_per_unit() {
    let input = scenario_a();
    let results = calculate_metrics(&input);
    assert!(results.break_even_price_converged);

    // 0.4104 × price = 1425 once 500 of fixed cost per unit is included.
    assert_close(results.break_even_price, 1425.0 / 0.4104, 0.1);
    let at_break_even = calculate_metrics(&input.with_retail_price(results.break_even_price));
    assert_eq!(at_break_even.status, ProfitStatus::Breakeven);
}

#[test]
fn legacy_fixed_step_search_reports_non_convergence() {
    let settings = SolverSettings {
        strategy: SolverStrategy::FixedStep,
        ..Default::default()
    };
    let results = calculate_metrics_with(&scenario_a(), &settings);

    assert!(!results.break_even_price_converged);
    assert!(results.break_even_price >= 0.0);
    // Everything except the break-even price matches the default solver.
    let default = calculate_metrics(&scenario_a());
    assert_eq!(results.net_profit, default.net_profit);
    assert_eq!(results.breakdown, default.breakdown);
}

// =============================================================================
// Boundaries
// =============================================================================

#[test]
fn full_pickup_without_returns() {
    let input = CalculationInput {
        pickup_rate: 100.0,
        return_rate: 0.0,
        ..scenario_a()
    };
    let results = calculate_metrics(&input);

    assert_eq!(results.breakdown.marketplace_fees.returns, 0.0);
    assert_eq!(results.effective_pickup_rate, 100.0);
}

#[test]
fn profitable_listing_reaches_finite_volume() {
    let input = CalculationInput {
        retail_price: 5000.0,
        ..scenario_a()
    };
    let results = calculate_metrics(&input);

    assert_eq!(results.status, ProfitStatus::Profit);
    assert!(results.break_even_volume.is_finite());
    assert!(results.break_even_volume > 0.0);
    assert!(results.break_even_price < input.retail_price);
}

#[test]
fn invalid_input_still_yields_complete_result() {
    let input = CalculationInput {
        retail_price: -100.0,
        pickup_rate: 10.0,
        return_rate: 90.0,
        seller_discount: 80.0,
        additional_promo: 40.0,
        ..scenario_a()
    };
    assert!(margin_core::has_calculation_errors(&input));

    let results = calculate_metrics(&input);
    assert_eq!(results.effective_price, 0.0);
    assert_eq!(results.effective_pickup_rate, 0.0);
    assert_eq!(results.revenue, 0.0);
    assert_eq!(results.margin_percent, 0.0);
    assert_eq!(results.acos, 0.0);
    assert_eq!(results.break_even_volume, 0.0);
    assert!(results.net_profit.is_finite());
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn calculation_is_idempotent() {
    for regime in TaxRegime::ALL {
        let input = scenario_a().with_tax_regime(regime);
        let first = calculate_metrics(&input);
        let second = calculate_metrics(&input);

        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        assert_eq!(first.net_profit.to_bits(), second.net_profit.to_bits());
        assert_eq!(
            first.break_even_price.to_bits(),
            second.break_even_price.to_bits()
        );
    }
}

#[test]
fn revenue_and_price_invariants_hold_across_prices() {
    for step in 0..40 {
        let price = step as f64 * 125.0;
        let input = scenario_a().with_retail_price(price);
        let results = calculate_metrics(&input);

        assert!(results.effective_price >= 0.0);
        assert!(results.effective_price <= input.retail_price.max(0.0));
        assert_eq!(
            results.revenue,
            results.effective_price * results.effective_pickup_rate / 100.0
        );
        assert_eq!(
            results.status == ProfitStatus::Profit,
            results.net_profit > 0.01
        );
        assert_eq!(results.status == ProfitStatus::Loss, results.net_profit < -0.01);
        assert_group_totals(&results);
    }
}

#[test]
fn net_profit_increases_with_price() {
    for regime in TaxRegime::ALL {
        let mut previous = f64::NEG_INFINITY;
        for step in 1..=30 {
            let input = scenario_a()
                .with_tax_regime(regime)
                .with_retail_price(step as f64 * 200.0);
            let net_profit = calculate_metrics(&input).net_profit;
            assert!(net_profit > previous, "{regime}: profit fell at step {step}");
            previous = net_profit;
        }
    }
}

#[test]
fn unreachable_volume_serializes_as_null() {
    let results = calculate_metrics(&scenario_a());
    let json = serde_json::to_value(&results).unwrap();
    assert!(json["breakEvenVolume"].is_null());
    assert_eq!(json["status"], "loss");
    assert!(json["breakdown"]["totalCOGS"].is_number());

    let back: CalculationResults = serde_json::from_value(json).unwrap();
    assert_eq!(back.break_even_volume, f64::INFINITY);
}
