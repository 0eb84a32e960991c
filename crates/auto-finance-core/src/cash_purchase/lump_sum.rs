//! Paying cash: liquidity impact and opportunity cost.
//!
//! The cash path is judged two ways. First, how much of the buyer's cash
//! survives the purchase relative to an emergency fund of N months of
//! expenses. Second, what that cash would have earned had the buyer
//! financed instead: a reference loan (720 score, 48 months, 20% down by
//! default) is priced, the financed amount is assumed invested at the
//! expected return for the loan term, and the foregone gain is set against
//! the interest the loan would have cost.

use log::debug;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::credit_tier;
use crate::error::AutoFinanceError;
use crate::financing::amortization::{amortize, FinancingOption};
use crate::time_value;
use crate::types::{round_cents, with_metadata, ComputationOutput, Money, Rate, VehicleType};
use crate::AutoFinanceResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LumpSumInput {
    pub vehicle_price: Money,
    pub available_cash: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_income: Option<Money>,
    #[serde(default)]
    pub monthly_expenses: Money,
    /// Annual return on invested cash; defaults to the configured assumption
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_return: Option<Rate>,
    #[serde(default)]
    pub vehicle_type: VehicleType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinancialHealth {
    /// Emergency fund fully intact after the purchase
    Excellent,
    /// At least half the emergency fund intact
    Good,
    Concerning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpportunityCost {
    /// The financing the buyer would otherwise have taken
    pub reference_option: FinancingOption,
    /// Cash kept (and invested) by financing instead of paying in full
    pub cash_to_invest: Money,
    pub projected_value: Money,
    /// Investment gain foregone by paying cash
    pub opportunity_loss: Money,
    /// Interest avoided by paying cash
    pub interest_saved: Money,
    /// `interest_saved - opportunity_loss`
    pub net_benefit: Money,
    pub is_lump_sum_better: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LumpSumAnalysis {
    pub taxes_and_fees: Money,
    pub total_cash_needed: Money,
    /// May be negative when the cash on hand does not cover the purchase
    pub remaining_cash: Money,
    pub emergency_fund_needed: Money,
    pub financial_health: FinancialHealth,
    pub monthly_surplus: Option<Money>,
    /// Months of surplus needed to restore the emergency fund
    pub months_to_rebuild_emergency_fund: Option<u32>,
    pub opportunity_cost: OpportunityCost,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn analyze_lump_sum(
    input: &LumpSumInput,
    config: &EngineConfig,
) -> AutoFinanceResult<ComputationOutput<LumpSumAnalysis>> {
    validate_input(input)?;
    debug!(
        "lump sum analysis: price {} with {} available",
        input.vehicle_price, input.available_cash
    );

    let cash = &config.cash;
    let mut warnings = Vec::new();

    let taxes_and_fees = round_cents(input.vehicle_price * cash.taxes_and_fees_rate);
    let total_cash_needed = input.vehicle_price + taxes_and_fees;
    let remaining_cash = input.available_cash - total_cash_needed;
    let emergency_fund_needed =
        input.monthly_expenses * Decimal::from(cash.emergency_fund_months);

    if remaining_cash < Decimal::ZERO {
        warnings.push(format!(
            "Available cash falls {} short of the total needed.",
            -remaining_cash
        ));
    }

    let financial_health = classify_health(remaining_cash, emergency_fund_needed);

    let monthly_surplus = input.monthly_income.map(|income| income - input.monthly_expenses);
    let shortfall = emergency_fund_needed - remaining_cash.max(Decimal::ZERO);
    let months_to_rebuild_emergency_fund = match monthly_surplus {
        Some(surplus) if shortfall > Decimal::ZERO && surplus > Decimal::ZERO => {
            (shortfall / surplus).ceil().to_u32()
        }
        Some(surplus) if shortfall > Decimal::ZERO && surplus <= Decimal::ZERO => {
            warnings.push(
                "Monthly expenses meet or exceed income; the emergency fund cannot be rebuilt."
                    .into(),
            );
            None
        }
        _ => None,
    };

    let expected_return = input.expected_return.unwrap_or(cash.expected_return);
    let opportunity_cost =
        opportunity_cost(input.vehicle_price, input.vehicle_type, expected_return, config)?;

    let assumptions = serde_json::json!({
        "cash": cash,
        "expected_return_used": expected_return,
    });

    Ok(with_metadata(
        "Cash purchase liquidity check with opportunity cost vs reference financing",
        &assumptions,
        warnings,
        LumpSumAnalysis {
            taxes_and_fees,
            total_cash_needed,
            remaining_cash,
            emergency_fund_needed,
            financial_health,
            monthly_surplus,
            months_to_rebuild_emergency_fund,
            opportunity_cost,
        },
    ))
}

/// Compare paying cash against the configured reference financing.
pub fn opportunity_cost(
    vehicle_price: Money,
    vehicle_type: VehicleType,
    expected_return: Rate,
    config: &EngineConfig,
) -> AutoFinanceResult<OpportunityCost> {
    let cash = &config.cash;
    let apr = credit_tier::resolve_apr(
        Some(cash.reference_credit_score),
        vehicle_type,
        &config.rates,
    );
    let down_payment = round_cents(vehicle_price * cash.reference_down_payment_ratio);
    let reference_option = amortize(
        vehicle_price - down_payment,
        down_payment,
        apr,
        cash.reference_term_months,
    )?;

    let cash_to_invest = reference_option.loan_amount;
    let monthly_return = expected_return / Decimal::from(12);
    let projected_value = round_cents(time_value::future_value(
        cash_to_invest,
        monthly_return,
        reference_option.term_months,
    )?);
    let opportunity_loss = projected_value - cash_to_invest;
    let interest_saved = reference_option.total_interest;
    let net_benefit = interest_saved - opportunity_loss;

    Ok(OpportunityCost {
        reference_option,
        cash_to_invest,
        projected_value,
        opportunity_loss,
        interest_saved,
        net_benefit,
        is_lump_sum_better: net_benefit > Decimal::ZERO,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn classify_health(remaining_cash: Money, emergency_fund_needed: Money) -> FinancialHealth {
    if remaining_cash >= emergency_fund_needed {
        FinancialHealth::Excellent
    } else if remaining_cash >= emergency_fund_needed / Decimal::TWO {
        FinancialHealth::Good
    } else {
        FinancialHealth::Concerning
    }
}

fn validate_input(input: &LumpSumInput) -> AutoFinanceResult<()> {
    if input.vehicle_price <= Decimal::ZERO {
        return Err(AutoFinanceError::invalid(
            "vehicle_price",
            "Vehicle price must be positive",
        ));
    }
    if input.available_cash < Decimal::ZERO {
        return Err(AutoFinanceError::invalid(
            "available_cash",
            "Available cash cannot be negative",
        ));
    }
    if input.monthly_expenses < Decimal::ZERO {
        return Err(AutoFinanceError::invalid(
            "monthly_expenses",
            "Monthly expenses cannot be negative",
        ));
    }
    if input.monthly_income.is_some_and(|i| i < Decimal::ZERO) {
        return Err(AutoFinanceError::invalid(
            "monthly_income",
            "Monthly income cannot be negative",
        ));
    }
    if input.expected_return.is_some_and(|r| r <= -Decimal::ONE) {
        return Err(AutoFinanceError::invalid(
            "expected_return",
            "Expected return must exceed -100%",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn buyer(cash: Money, expenses: Money) -> LumpSumInput {
        LumpSumInput {
            vehicle_price: dec!(30000),
            available_cash: cash,
            monthly_income: Some(dec!(6000)),
            monthly_expenses: expenses,
            expected_return: None,
            vehicle_type: VehicleType::New,
        }
    }

    fn analyze(input: &LumpSumInput) -> ComputationOutput<LumpSumAnalysis> {
        analyze_lump_sum(input, &EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_cash_needed_includes_taxes_and_fees() {
        let out = analyze(&buyer(dec!(60000), dec!(3000))).result;
        assert_eq!(out.taxes_and_fees, dec!(2400));
        assert_eq!(out.total_cash_needed, dec!(32400));
        assert_eq!(out.remaining_cash, dec!(27600));
        assert_eq!(out.emergency_fund_needed, dec!(18000));
    }

    #[test]
    fn test_health_classification_boundaries() {
        // Emergency fund 18,000; half is 9,000.
        assert_eq!(
            analyze(&buyer(dec!(50400), dec!(3000))).result.financial_health,
            FinancialHealth::Excellent
        );
        assert_eq!(
            analyze(&buyer(dec!(41400), dec!(3000))).result.financial_health,
            FinancialHealth::Good
        );
        assert_eq!(
            analyze(&buyer(dec!(41399.99), dec!(3000))).result.financial_health,
            FinancialHealth::Concerning
        );
    }

    #[test]
    fn test_rebuild_months() {
        // remaining 9,000, fund 18,000, surplus 3,000 -> 3 months
        let out = analyze(&buyer(dec!(41400), dec!(3000))).result;
        assert_eq!(out.monthly_surplus, Some(dec!(3000)));
        assert_eq!(out.months_to_rebuild_emergency_fund, Some(3));
    }

    #[test]
    fn test_insufficient_cash_warns() {
        let out = analyze(&buyer(dec!(20000), dec!(3000)));
        assert!(out.result.remaining_cash < Decimal::ZERO);
        assert_eq!(out.result.financial_health, FinancialHealth::Concerning);
        assert!(!out.warnings.is_empty());
    }

    #[test]
    fn test_reference_financing_terms() {
        let out = analyze(&buyer(dec!(60000), dec!(3000))).result;
        let reference = &out.opportunity_cost.reference_option;
        assert_eq!(reference.term_months, 48);
        assert_eq!(reference.apr, dec!(0.055));
        assert_eq!(reference.down_payment, dec!(6000));
        assert_eq!(reference.loan_amount, dec!(24000));
        assert_eq!(out.opportunity_cost.cash_to_invest, dec!(24000));
    }

    #[test]
    fn test_opportunity_cost_identities() {
        let oc = analyze(&buyer(dec!(60000), dec!(3000))).result.opportunity_cost;
        assert_eq!(oc.opportunity_loss, oc.projected_value - oc.cash_to_invest);
        assert_eq!(oc.net_benefit, oc.interest_saved - oc.opportunity_loss);
        assert_eq!(oc.is_lump_sum_better, oc.net_benefit > Decimal::ZERO);
        // 7% invested beats 5.5% borrowed
        assert!(!oc.is_lump_sum_better);
    }

    #[test]
    fn test_low_expected_return_favours_cash() {
        let mut input = buyer(dec!(60000), dec!(3000));
        input.expected_return = Some(dec!(0.01));
        let oc = analyze(&input).result.opportunity_cost;
        assert!(oc.is_lump_sum_better);
    }

    #[test]
    fn test_zero_return_has_no_opportunity_loss() {
        let mut input = buyer(dec!(60000), dec!(3000));
        input.expected_return = Some(Decimal::ZERO);
        let oc = analyze(&input).result.opportunity_cost;
        assert!(oc.opportunity_loss.is_zero());
        assert_eq!(oc.net_benefit, oc.interest_saved);
    }

    #[test]
    fn test_rejects_negative_cash() {
        let result = analyze_lump_sum(&buyer(dec!(-1), dec!(0)), &EngineConfig::default());
        assert!(result.is_err());
    }
}
