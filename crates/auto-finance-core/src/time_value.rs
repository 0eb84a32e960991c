use rust_decimal::Decimal;

use crate::error::AutoFinanceError;
use crate::types::{Money, Rate};
use crate::AutoFinanceResult;

fn overflow(context: &str) -> AutoFinanceError {
    AutoFinanceError::invalid("rate", format!("{context} overflows for this rate and term"))
}

/// Compute (1 + r)^n via iterative multiplication (avoids Decimal::powd drift).
///
/// Fails instead of panicking when the factor leaves Decimal's range.
pub fn compound(rate: Rate, n: u32) -> AutoFinanceResult<Decimal> {
    let mut result = Decimal::ONE;
    let factor = Decimal::ONE + rate;
    for _ in 0..n {
        result = result
            .checked_mul(factor)
            .ok_or_else(|| overflow("compound factor"))?;
    }
    Ok(result)
}

/// Level payment that fully amortizes `principal` over `nper` periods.
///
/// `rate` is the periodic rate. A zero rate degenerates to straight-line
/// repayment `principal / nper`.
pub fn annuity_payment(principal: Money, rate: Rate, nper: u32) -> AutoFinanceResult<Money> {
    if nper == 0 {
        return Err(AutoFinanceError::InvalidInput {
            field: "nper".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if rate.is_zero() {
        return Ok(principal / Decimal::from(nper));
    }

    let factor = compound(rate, nper)?;
    let denominator = factor - Decimal::ONE;

    if denominator.is_zero() {
        return Err(AutoFinanceError::DivisionByZero {
            context: "annuity payment factor".into(),
        });
    }

    let numerator = principal
        .checked_mul(rate)
        .and_then(|v| v.checked_mul(factor))
        .ok_or_else(|| overflow("annuity payment"))?;
    Ok(numerator / denominator)
}

/// Outstanding balance after `periods` level payments, floored at zero.
pub fn remaining_balance(
    principal: Money,
    rate: Rate,
    payment: Money,
    periods: u32,
) -> AutoFinanceResult<Money> {
    let balance = if rate.is_zero() {
        principal - payment * Decimal::from(periods)
    } else {
        let factor = compound(rate, periods)?;
        let grown = principal
            .checked_mul(factor)
            .ok_or_else(|| overflow("remaining balance"))?;
        let repaid = payment
            .checked_mul(factor - Decimal::ONE)
            .ok_or_else(|| overflow("remaining balance"))?
            / rate;
        grown - repaid
    };
    Ok(balance.max(Decimal::ZERO))
}

/// Future value of a single lump sum compounded for `nper` periods.
pub fn future_value(present_value: Money, rate: Rate, nper: u32) -> AutoFinanceResult<Money> {
    present_value
        .checked_mul(compound(rate, nper)?)
        .ok_or_else(|| overflow("future value"))
}
