//! Lease versus finance, measured over the lease term.
//!
//! The lease path costs its payments plus acquisition fees. The buy path
//! costs the down payment and the loan payments made during the lease term,
//! less the equity the buyer holds at that point. Vehicle value at term end
//! is proxied by the lease residual, so both paths are judged against the
//! same end-of-term valuation. This reports magnitudes only.

use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{BalanceMethod, EngineConfig, MAX_TERM_MONTHS};
use crate::error::AutoFinanceError;
use crate::financing::amortization::{validate_option, FinancingOption};
use crate::leasing::lease::LeaseOption;
use crate::time_value;
use crate::types::{round_cents, with_metadata, ComputationOutput, Money};
use crate::AutoFinanceResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaseVsBuyInput {
    pub lease: LeaseOption,
    pub financing: FinancingOption,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostPath {
    Lease,
    Buy,
    Even,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaseVsBuyOutput {
    /// Comparison horizon (the lease term)
    pub term_months: u32,
    pub lease_total_cost: Money,
    /// Down payment plus loan payments made within the horizon
    pub buy_cash_out: Money,
    pub buy_remaining_balance: Money,
    pub vehicle_value_at_term_end: Money,
    pub buy_equity: Money,
    /// Cash out less equity retained
    pub buy_net_cost: Money,
    pub cost_difference: Money,
    pub lower_cost_path: CostPath,
    pub balance_method: BalanceMethod,
}

/// Loan balance after `months` payments under the chosen method.
pub fn balance_after(
    option: &FinancingOption,
    months: u32,
    method: BalanceMethod,
) -> AutoFinanceResult<Money> {
    let months = months.min(option.term_months);
    match method {
        BalanceMethod::Exact => time_value::remaining_balance(
            option.loan_amount,
            option.monthly_rate(),
            option.monthly_payment,
            months,
        ),
        BalanceMethod::LinearInterest => {
            let elapsed = Decimal::from(months);
            let interest_paid =
                option.total_interest * elapsed / Decimal::from(option.term_months);
            let principal_paid = option.monthly_payment * elapsed - interest_paid;
            Ok((option.loan_amount - principal_paid).max(Decimal::ZERO))
        }
    }
}

pub fn compare_lease_vs_buy(
    input: &LeaseVsBuyInput,
    config: &EngineConfig,
) -> AutoFinanceResult<ComputationOutput<LeaseVsBuyOutput>> {
    let lease = &input.lease;
    let financing = &input.financing;
    validate_option(financing)?;
    if lease.term_months == 0 || lease.term_months > MAX_TERM_MONTHS {
        return Err(AutoFinanceError::invalid(
            "lease.term_months",
            format!("Lease term must lie in 1..={MAX_TERM_MONTHS} months"),
        ));
    }
    if lease.residual_value <= Decimal::ZERO {
        return Err(AutoFinanceError::invalid(
            "lease.residual_value",
            "Residual value must be positive",
        ));
    }

    let method = config.financing.balance_method;
    let horizon = lease.term_months;
    debug!(
        "lease vs buy over {horizon} months against a {}-month loan ({method:?})",
        financing.term_months
    );

    let mut warnings = Vec::new();
    if financing.term_months != horizon {
        warnings.push(format!(
            "Financing term ({} months) differs from lease term ({horizon} months); \
             buy path measured at month {horizon}.",
            financing.term_months
        ));
    }

    let payments_made = horizon.min(financing.term_months);
    let buy_cash_out =
        financing.down_payment + financing.monthly_payment * Decimal::from(payments_made);
    let remaining = round_cents(balance_after(financing, horizon, method)?);
    let vehicle_value = lease.residual_value;
    let buy_equity = (vehicle_value - remaining).max(Decimal::ZERO);
    let buy_net_cost = buy_cash_out - buy_equity;
    let lease_total_cost = lease.total_lease_cost;

    let cost_difference = (lease_total_cost - buy_net_cost).abs();
    let lower_cost_path = if cost_difference.is_zero() {
        CostPath::Even
    } else if lease_total_cost < buy_net_cost {
        CostPath::Lease
    } else {
        CostPath::Buy
    };

    Ok(with_metadata(
        "Out-of-pocket cost over the lease term, residual value as end-of-term vehicle value",
        &serde_json::json!({ "balance_method": method }),
        warnings,
        LeaseVsBuyOutput {
            term_months: horizon,
            lease_total_cost,
            buy_cash_out,
            buy_remaining_balance: remaining,
            vehicle_value_at_term_end: vehicle_value,
            buy_equity,
            buy_net_cost,
            cost_difference,
            lower_cost_path,
            balance_method: method,
        },
    ))
}
