use auto_finance_core::scenario::{self, ScenarioInput};
use auto_finance_core::credit_tier::CreditTier;
use auto_finance_core::{AutoFinanceError, EngineConfig, VehicleType};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

fn minimal_shopper() -> ScenarioInput {
    serde_json::from_str(r#"{ "vehicle_price": "30000", "down_payment": "3000", "credit_score": 720 }"#)
        .unwrap()
}

#[test]
fn test_minimal_json_input_builds() {
    let out = scenario::build_scenario(&minimal_shopper(), &EngineConfig::default()).unwrap();
    let r = &out.result;
    assert_eq!(r.financing_options.len(), 4);
    assert_eq!(r.lease_options.len(), 3);
    assert_eq!(r.selected_financing.term_months, 60);
    assert_eq!(r.equity_timeline.points.len(), 61);
    assert_eq!(r.payment_breakdown.points.len(), 24);
    // 36 and 48 month leases have same-term loans, 24 does not
    let compared: Vec<u32> = r.lease_vs_buy.iter().map(|c| c.term_months).collect();
    assert_eq!(compared, vec![36, 48]);
    assert!(r.mileage.is_empty());
    assert!(r.lump_sum.is_none());
    assert!(r.affordability.is_none());
    assert!(out.warnings.is_empty());
}

#[test]
fn test_selected_term_override() {
    let mut input = minimal_shopper();
    input.selected_finance_term = Some(36);
    let out = scenario::build_scenario(&input, &EngineConfig::default()).unwrap();
    assert_eq!(out.result.equity_timeline.points.len(), 37);
}

#[test]
fn test_custom_config_shapes_scenario() {
    let config = EngineConfig::from_json(
        r#"{
            "financing": { "terms": [24, 36], "breakdown_horizon_months": 12 },
            "lease": { "residuals": [ { "term_months": 24, "residual_fraction": "0.6" } ] }
        }"#,
    )
    .unwrap();
    let mut input = minimal_shopper();
    input.selected_finance_term = Some(24);
    let out = scenario::build_scenario(&input, &config).unwrap();
    assert_eq!(out.result.financing_options.len(), 2);
    assert_eq!(out.result.lease_options.len(), 1);
    assert_eq!(out.result.payment_breakdown.points.len(), 12);
    assert_eq!(out.result.lease_vs_buy.len(), 1);
    assert_eq!(out.result.lease_options[0].residual_value, dec!(18000));
}

#[test]
fn test_missing_score_warns_once_through_financing() {
    let mut input = minimal_shopper();
    input.credit_score = None;
    input.vehicle_type = VehicleType::Used;
    let out = scenario::build_scenario(&input, &EngineConfig::default()).unwrap();
    assert_eq!(out.result.credit.apr, dec!(0.195));
    let credit_warnings = out
        .warnings
        .iter()
        .filter(|w| w.starts_with("[financing]"))
        .count();
    assert_eq!(credit_warnings, 1);
}

#[test]
fn test_unreadable_score_builds_with_fallback_tier() {
    let input: ScenarioInput = serde_json::from_str(
        r#"{ "vehicle_price": "30000", "down_payment": "3000", "credit_score": "unknown" }"#,
    )
    .unwrap();
    assert_eq!(input.credit_score, None);
    let out = scenario::build_scenario(&input, &EngineConfig::default()).unwrap();
    assert_eq!(out.result.credit.tier, CreditTier::Bad);
    assert!(out.warnings.iter().any(|w| w.starts_with("[financing]")));

    for raw in [r#""720""#, "720"] {
        let json = format!(
            r#"{{ "vehicle_price": "30000", "down_payment": "3000", "credit_score": {raw} }}"#
        );
        let input: ScenarioInput = serde_json::from_str(&json).unwrap();
        assert_eq!(input.credit_score, Some(720));
    }

    for raw in ["-1", "712.5"] {
        let json = format!(
            r#"{{ "vehicle_price": "30000", "down_payment": "3000", "credit_score": {raw} }}"#
        );
        let input: ScenarioInput = serde_json::from_str(&json).unwrap();
        assert_eq!(input.credit_score, None);
    }
}

#[test]
fn test_invalid_price_propagates() {
    let mut input = minimal_shopper();
    input.vehicle_price = dec!(-1);
    let err = scenario::build_scenario(&input, &EngineConfig::default()).unwrap_err();
    assert!(matches!(err, AutoFinanceError::InvalidInput { .. }));
}
