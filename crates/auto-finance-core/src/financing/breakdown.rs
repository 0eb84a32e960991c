//! Principal / interest split of each loan payment.

use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::AutoFinanceError;
use crate::financing::amortization::{amortization_steps, validate_option, FinancingOption};
use crate::types::{round_cents, round_whole, with_metadata, ComputationOutput, Money, Percentage};
use crate::AutoFinanceResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentBreakdownInput {
    pub option: FinancingOption,
    /// Months to project; defaults to the configured horizon, capped at the term
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizon_months: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentBreakdownPoint {
    pub month: u32,
    pub payment: Money,
    pub principal_payment: Money,
    pub interest_payment: Money,
    pub remaining_balance: Money,
    /// Share of the payment going to principal, whole percent
    pub principal_percentage: Percentage,
    /// `100 - principal_percentage`
    pub interest_percentage: Percentage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentBreakdownOutput {
    pub months_projected: u32,
    pub points: Vec<PaymentBreakdownPoint>,
    pub total_principal: Money,
    pub total_interest: Money,
}

pub fn project_payment_breakdown(
    input: &PaymentBreakdownInput,
    config: &EngineConfig,
) -> AutoFinanceResult<ComputationOutput<PaymentBreakdownOutput>> {
    let option = &input.option;
    validate_option(option)?;
    if input.horizon_months == Some(0) {
        return Err(AutoFinanceError::invalid(
            "horizon_months",
            "Horizon must be greater than zero",
        ));
    }

    let horizon = input
        .horizon_months
        .unwrap_or(config.financing.breakdown_horizon_months)
        .min(option.term_months);
    debug!("payment breakdown for {horizon} of {} months", option.term_months);

    let mut warnings = Vec::new();
    if option.monthly_payment.is_zero() {
        warnings.push("Nothing is financed; every payment is zero.".into());
    }

    let steps = amortization_steps(
        option.loan_amount,
        option.monthly_rate(),
        option.monthly_payment,
        option.term_months,
    );

    let points: Vec<PaymentBreakdownPoint> = steps
        .iter()
        .take(horizon as usize)
        .map(|step| {
            let payment = step.principal + step.interest;
            let principal_percentage = if payment.is_zero() {
                Decimal::ZERO
            } else {
                round_whole(step.principal / payment * dec!(100))
            };
            PaymentBreakdownPoint {
                month: step.month,
                payment: round_cents(payment),
                principal_payment: round_cents(step.principal),
                interest_payment: round_cents(step.interest),
                remaining_balance: round_cents(step.balance),
                principal_percentage,
                interest_percentage: if payment.is_zero() {
                    Decimal::ZERO
                } else {
                    dec!(100) - principal_percentage
                },
            }
        })
        .collect();

    let total_principal: Money = points.iter().map(|p| p.principal_payment).sum();
    let total_interest: Money = points.iter().map(|p| p.interest_payment).sum();

    Ok(with_metadata(
        "Recursive interest/principal split on the amortizing balance",
        &serde_json::json!({ "horizon_months": horizon }),
        warnings,
        PaymentBreakdownOutput {
            months_projected: horizon,
            points,
            total_principal,
            total_interest,
        },
    ))
}
