//! Vehicle value against loan balance, month by month.
//!
//! Depreciation is linear across the first year (15% by default), then
//! compounds annually (10% by default) with fractional years interpolated
//! geometrically. The loan balance is folded forward one payment at a time.

use log::debug;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::config::{DepreciationModel, EngineConfig};
use crate::error::AutoFinanceError;
use crate::financing::amortization::{amortization_steps, validate_option, FinancingOption};
use crate::time_value::compound;
use crate::types::{round_cents, with_metadata, ComputationOutput, Money};
use crate::AutoFinanceResult;

const FIRST_YEAR_MONTHS: u32 = 12;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquityTimelineInput {
    pub option: FinancingOption,
    pub vehicle_price: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub month: u32,
    pub vehicle_value: Money,
    pub remaining_balance: Money,
    /// Floored at zero
    pub equity: Money,
    /// First month equity turns positive after being zero
    pub is_breakeven: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityTimelineOutput {
    /// Months 0..=term, ascending
    pub points: Vec<EquityPoint>,
    pub breakeven_month: Option<u32>,
    /// Months (after signing) in which the balance meets or exceeds the value
    pub months_underwater: u32,
    pub ending_equity: Money,
    pub total_depreciation: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Market value of a vehicle bought at `price`, `month` months after purchase.
pub fn vehicle_value(
    price: Money,
    month: u32,
    model: &DepreciationModel,
) -> AutoFinanceResult<Money> {
    if month <= FIRST_YEAR_MONTHS {
        let elapsed = Decimal::from(month) / dec!(12);
        return Ok(price * (Decimal::ONE - model.first_year_loss * elapsed));
    }

    let after_first_year = price * (Decimal::ONE - model.first_year_loss);
    let months_after = month - FIRST_YEAR_MONTHS;
    let whole_years = months_after / 12;
    let remainder = months_after % 12;

    let decline = -model.annual_rate_after_first_year;
    let mut factor = compound(decline, whole_years)?;
    if remainder > 0 {
        let partial = Decimal::from(remainder) / dec!(12);
        factor *= (Decimal::ONE + decline).powd(partial);
    }
    Ok(after_first_year * factor)
}

pub fn project_equity_timeline(
    input: &EquityTimelineInput,
    config: &EngineConfig,
) -> AutoFinanceResult<ComputationOutput<EquityTimelineOutput>> {
    let option = &input.option;
    validate_option(option)?;
    if input.vehicle_price <= Decimal::ZERO {
        return Err(AutoFinanceError::invalid(
            "vehicle_price",
            "Vehicle price must be positive",
        ));
    }
    debug!(
        "equity timeline over {} months for price {}",
        option.term_months, input.vehicle_price
    );

    let mut warnings = Vec::new();
    if option.loan_amount + option.down_payment != input.vehicle_price {
        warnings.push(format!(
            "Loan amount plus down payment ({}) differs from vehicle price ({}).",
            option.loan_amount + option.down_payment,
            input.vehicle_price
        ));
    }

    let model = &config.depreciation;
    let steps = amortization_steps(
        option.loan_amount,
        option.monthly_rate(),
        option.monthly_payment,
        option.term_months,
    );

    let balances = std::iter::once((0, option.loan_amount))
        .chain(steps.iter().map(|s| (s.month, s.balance)));

    let raw: Vec<(u32, Money, Money, Money)> = balances
        .map(|(month, balance)| {
            let value = vehicle_value(input.vehicle_price, month, model)?;
            let equity = (value - balance).max(Decimal::ZERO);
            Ok((month, value, balance, equity))
        })
        .collect::<AutoFinanceResult<_>>()?;

    let breakeven_month = raw
        .windows(2)
        .find(|w| w[0].3 <= Decimal::ZERO && w[1].3 > Decimal::ZERO)
        .map(|w| w[1].0);

    let months_underwater = raw
        .iter()
        .filter(|(month, _, _, equity)| *month > 0 && equity.is_zero())
        .count() as u32;

    let points: Vec<EquityPoint> = raw
        .iter()
        .map(|&(month, value, balance, equity)| EquityPoint {
            month,
            vehicle_value: round_cents(value),
            remaining_balance: round_cents(balance),
            equity: round_cents(equity),
            is_breakeven: breakeven_month == Some(month),
        })
        .collect();

    let last = points.last().cloned().ok_or_else(|| {
        AutoFinanceError::InsufficientData("equity timeline produced no points".into())
    })?;

    let output = EquityTimelineOutput {
        ending_equity: last.equity,
        total_depreciation: round_cents(input.vehicle_price) - last.vehicle_value,
        breakeven_month,
        months_underwater,
        points,
    };

    Ok(with_metadata(
        "Linear first-year depreciation then compounding annual decline vs amortized balance",
        model,
        warnings,
        output,
    ))
}
