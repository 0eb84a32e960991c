use auto_finance_core::credit_tier::{self, CreditTier, CreditTierInput};
use auto_finance_core::financing::amortization::{self, FinancingInput};
use auto_finance_core::financing::breakdown::{self, PaymentBreakdownInput};
use auto_finance_core::financing::equity::{self, EquityTimelineInput};
use auto_finance_core::{AutoFinanceError, EngineConfig, VehicleType};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Reference shopper: $30,000 new car, $3,000 down, 720 score
// ===========================================================================

fn reference_purchase() -> FinancingInput {
    FinancingInput {
        vehicle_price: dec!(30000),
        down_payment: dec!(3000),
        credit_score: Some(720),
        vehicle_type: VehicleType::New,
        apr: None,
        terms: None,
    }
}

#[test]
fn test_reference_shopper_gets_good_tier() {
    let out = credit_tier::resolve_credit_tier(
        &CreditTierInput {
            credit_score: Some(720),
            vehicle_type: VehicleType::New,
        },
        &EngineConfig::default(),
    )
    .unwrap();
    assert_eq!(out.result.tier, CreditTier::Good);
    assert_eq!(out.result.apr, dec!(0.055));
}

#[test]
fn test_reference_shopper_48_month_payment_matches_closed_form() {
    let out =
        amortization::calculate_financing_options(&reference_purchase(), &EngineConfig::default())
            .unwrap();
    let option = out
        .result
        .options
        .iter()
        .find(|o| o.term_months == 48)
        .unwrap();
    assert_eq!(option.loan_amount, dec!(27000));

    // P * r(1+r)^n / ((1+r)^n - 1), computed independently
    let r = dec!(0.055) / dec!(12);
    let mut growth = Decimal::ONE;
    for _ in 0..48 {
        growth *= Decimal::ONE + r;
    }
    let expected = dec!(27000) * r * growth / (growth - Decimal::ONE);
    assert!((option.monthly_payment - expected).abs() <= dec!(0.01));
}

#[test]
fn test_zero_apr_12000_over_36() {
    let option = amortization::amortize(dec!(12000), Decimal::ZERO, Decimal::ZERO, 36).unwrap();
    assert_eq!(option.monthly_payment, dec!(333.33));
    assert_eq!(option.total_interest, Decimal::ZERO);
}

#[test]
fn test_used_vehicle_financing_costs_more() {
    let config = EngineConfig::default();
    let new = amortization::calculate_financing_options(&reference_purchase(), &config).unwrap();
    let mut used_input = reference_purchase();
    used_input.vehicle_type = VehicleType::Used;
    let used = amortization::calculate_financing_options(&used_input, &config).unwrap();
    assert_eq!(used.result.apr, dec!(0.065));
    for (n, u) in new.result.options.iter().zip(&used.result.options) {
        assert!(u.total_interest > n.total_interest);
    }
}

#[test]
fn test_custom_terms_from_config() {
    let mut config = EngineConfig::default();
    config.financing.terms = vec![84, 24];
    let out = amortization::calculate_financing_options(&reference_purchase(), &config).unwrap();
    let terms: Vec<u32> = out.result.options.iter().map(|o| o.term_months).collect();
    assert_eq!(terms, vec![24, 84]);
}

#[test]
fn test_down_payment_above_price_is_contract_violation() {
    let mut input = reference_purchase();
    input.down_payment = dec!(30001);
    let err = amortization::calculate_financing_options(&input, &EngineConfig::default())
        .unwrap_err();
    match err {
        AutoFinanceError::InvalidInput { field, .. } => assert_eq!(field, "down_payment"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_zero_term_in_request_rejected() {
    let mut input = reference_purchase();
    input.terms = Some(vec![0, 36]);
    assert!(amortization::calculate_financing_options(&input, &EngineConfig::default()).is_err());
}

#[test]
fn test_centuries_long_term_is_rejected_not_overflowed() {
    let mut input = reference_purchase();
    input.terms = Some(vec![6000]);
    let err =
        amortization::calculate_financing_options(&input, &EngineConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        AutoFinanceError::InvalidInput { ref field, .. } if field == "term_months"
    ));
}

// ===========================================================================
// Projections over time
// ===========================================================================

#[test]
fn test_equity_timeline_for_reference_shopper() {
    let config = EngineConfig::default();
    let option = amortization::calculate_financing_options(&reference_purchase(), &config)
        .unwrap()
        .result
        .options
        .into_iter()
        .find(|o| o.term_months == 60)
        .unwrap();

    let out = equity::project_equity_timeline(
        &EquityTimelineInput {
            option,
            vehicle_price: dec!(30000),
        },
        &config,
    )
    .unwrap();
    let points = &out.result.points;

    assert_eq!(points.len(), 61);
    assert!(points.windows(2).all(|w| w[1].month == w[0].month + 1));
    for p in points {
        let expected = (p.vehicle_value - p.remaining_balance).max(Decimal::ZERO);
        assert!((p.equity - expected).abs() <= dec!(0.01));
    }
    assert!(out.warnings.is_empty());
}

#[test]
fn test_equity_non_decreasing_after_breakeven() {
    let config = EngineConfig::default();
    let option = amortization::amortize(dec!(30000), Decimal::ZERO, dec!(0.185), 72).unwrap();
    let out = equity::project_equity_timeline(
        &EquityTimelineInput {
            option,
            vehicle_price: dec!(30000),
        },
        &config,
    )
    .unwrap()
    .result;

    let breakeven = out.breakeven_month.expect("should break even");
    let after: Vec<Decimal> = out
        .points
        .iter()
        .filter(|p| p.month >= breakeven)
        .map(|p| p.equity)
        .collect();
    assert!(after.windows(2).all(|w| w[1] >= w[0]));
}

#[test]
fn test_breakdown_full_run_sums_to_loan() {
    let config = EngineConfig::default();
    for term in [36, 48, 60, 72] {
        let option = amortization::amortize(dec!(27000), dec!(3000), dec!(0.085), term).unwrap();
        let out = breakdown::project_payment_breakdown(
            &PaymentBreakdownInput {
                option,
                horizon_months: Some(term),
            },
            &config,
        )
        .unwrap()
        .result;
        assert_eq!(out.points.len() as u32, term);
        assert!(
            (out.total_principal - dec!(27000)).abs() <= dec!(1),
            "term {term}: principal {}",
            out.total_principal
        );
        assert!(out.points.last().unwrap().remaining_balance <= dec!(1));
    }
}

#[test]
fn test_breakdown_horizon_from_config() {
    let mut config = EngineConfig::default();
    config.financing.breakdown_horizon_months = 6;
    let option = amortization::amortize(dec!(27000), dec!(3000), dec!(0.055), 48).unwrap();
    let out = breakdown::project_payment_breakdown(
        &PaymentBreakdownInput {
            option,
            horizon_months: None,
        },
        &config,
    )
    .unwrap();
    assert_eq!(out.result.points.len(), 6);
}
