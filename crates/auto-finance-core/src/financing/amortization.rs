//! Fixed-rate auto loan amortization across a set of term lengths.
//!
//! `payment = P * r(1+r)^n / ((1+r)^n - 1)` with `r = apr / 12`; a zero APR
//! degenerates to `P / n`. Totals are derived from the unrounded payment and
//! only then rounded to cents, so `total_cost` equals the sum of its rounded
//! parts exactly.

use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::config::{EngineConfig, MAX_TERM_MONTHS};
use crate::credit_tier::{self, CreditTierResolution};
use crate::error::AutoFinanceError;
use crate::time_value;
use crate::types::{round_cents, with_metadata, ComputationOutput, Money, Rate, VehicleType};
use crate::AutoFinanceResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One loan offer at a fixed term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancingOption {
    pub term_months: u32,
    /// Annual rate as a decimal
    pub apr: Rate,
    pub monthly_payment: Money,
    pub total_interest: Money,
    /// Down payment + amount financed + interest
    pub total_cost: Money,
    pub loan_amount: Money,
    pub down_payment: Money,
}

impl FinancingOption {
    pub fn monthly_rate(&self) -> Rate {
        monthly_rate(self.apr)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancingInput {
    pub vehicle_price: Money,
    #[serde(default)]
    pub down_payment: Money,
    #[serde(
        default,
        deserialize_with = "crate::parse::lenient_score",
        skip_serializing_if = "Option::is_none"
    )]
    pub credit_score: Option<u32>,
    #[serde(default)]
    pub vehicle_type: VehicleType,
    /// Explicit APR; bypasses credit tier resolution when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apr: Option<Rate>,
    /// Terms to quote instead of the configured set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms: Option<Vec<u32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancingOutput {
    /// Present unless an explicit APR was supplied
    pub credit: Option<CreditTierResolution>,
    pub apr: Rate,
    pub loan_amount: Money,
    /// Ascending by term
    pub options: Vec<FinancingOption>,
}

/// A single month of a loan's amortization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct AmortizationStep {
    pub month: u32,
    pub interest: Money,
    pub principal: Money,
    pub balance: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn monthly_rate(apr: Rate) -> Rate {
    apr / MONTHS_PER_YEAR
}

/// Build the financing option for one term.
pub fn amortize(
    loan_amount: Money,
    down_payment: Money,
    apr: Rate,
    term_months: u32,
) -> AutoFinanceResult<FinancingOption> {
    check_term(term_months)?;
    if apr < Decimal::ZERO {
        return Err(AutoFinanceError::invalid("apr", "APR cannot be negative"));
    }
    if loan_amount < Decimal::ZERO {
        return Err(AutoFinanceError::invalid(
            "loan_amount",
            "Loan amount cannot be negative",
        ));
    }

    let payment = time_value::annuity_payment(loan_amount, monthly_rate(apr), term_months)?;
    let total_paid = payment
        .checked_mul(Decimal::from(term_months))
        .ok_or_else(|| AutoFinanceError::invalid("loan_amount", "Loan amount is too large"))?;
    let total_interest = round_cents(total_paid - loan_amount);
    let loan_amount = round_cents(loan_amount);
    let down_payment = round_cents(down_payment);

    Ok(FinancingOption {
        term_months,
        apr,
        monthly_payment: round_cents(payment),
        total_interest,
        total_cost: total_interest + loan_amount + down_payment,
        loan_amount,
        down_payment,
    })
}

/// Quote every configured (or requested) term for a purchase.
pub fn calculate_financing_options(
    input: &FinancingInput,
    config: &EngineConfig,
) -> AutoFinanceResult<ComputationOutput<FinancingOutput>> {
    validate_purchase(input.vehicle_price, input.down_payment)?;
    debug!(
        "financing options for price {} with down payment {}",
        input.vehicle_price, input.down_payment
    );

    let mut warnings = Vec::new();
    let (credit, apr) = match input.apr {
        Some(apr) => (None, apr),
        None => {
            let resolution = credit_tier::resolve(
                input.credit_score,
                input.vehicle_type,
                &config.rates,
                &mut warnings,
            );
            let apr = resolution.apr;
            (Some(resolution), apr)
        }
    };

    let terms = normalise_terms(input.terms.as_deref().unwrap_or(&config.financing.terms));
    let loan_amount = input.vehicle_price - input.down_payment;
    if loan_amount.is_zero() {
        warnings.push("Down payment covers the full price; nothing is financed.".into());
    }

    let options = terms
        .iter()
        .map(|&term| amortize(loan_amount, input.down_payment, apr, term))
        .collect::<AutoFinanceResult<Vec<_>>>()?;

    let apr_source = if input.apr.is_some() {
        "explicit"
    } else {
        "credit_tier"
    };
    let assumptions = serde_json::json!({
        "terms": terms,
        "rates": config.rates,
        "apr_source": apr_source,
    });

    Ok(with_metadata(
        "Fixed-rate amortizing loan, monthly compounding",
        &assumptions,
        warnings,
        FinancingOutput {
            credit,
            apr,
            loan_amount: round_cents(loan_amount),
            options,
        },
    ))
}

// ---------------------------------------------------------------------------
// Crate helpers
// ---------------------------------------------------------------------------

pub(crate) fn validate_purchase(vehicle_price: Money, down_payment: Money) -> AutoFinanceResult<()> {
    if vehicle_price <= Decimal::ZERO {
        return Err(AutoFinanceError::invalid(
            "vehicle_price",
            "Vehicle price must be positive",
        ));
    }
    if down_payment < Decimal::ZERO {
        return Err(AutoFinanceError::invalid(
            "down_payment",
            "Down payment cannot be negative",
        ));
    }
    if down_payment > vehicle_price {
        return Err(AutoFinanceError::invalid(
            "down_payment",
            "Down payment cannot exceed the vehicle price",
        ));
    }
    Ok(())
}

/// Reject financing options that could not have come from [`amortize`].
pub(crate) fn validate_option(option: &FinancingOption) -> AutoFinanceResult<()> {
    check_term(option.term_months)?;
    if option.apr < Decimal::ZERO {
        return Err(AutoFinanceError::invalid("apr", "APR cannot be negative"));
    }
    if option.loan_amount < Decimal::ZERO || option.down_payment < Decimal::ZERO {
        return Err(AutoFinanceError::invalid(
            "loan_amount",
            "Loan amount and down payment cannot be negative",
        ));
    }
    if option.loan_amount > Decimal::ZERO && option.monthly_payment <= Decimal::ZERO {
        return Err(AutoFinanceError::invalid(
            "monthly_payment",
            "A financed balance needs a positive monthly payment",
        ));
    }
    Ok(())
}

/// Terms must be positive and no longer than [`MAX_TERM_MONTHS`].
pub(crate) fn check_term(term_months: u32) -> AutoFinanceResult<()> {
    if term_months == 0 {
        return Err(AutoFinanceError::invalid(
            "term_months",
            "Term must be greater than zero",
        ));
    }
    if term_months > MAX_TERM_MONTHS {
        return Err(AutoFinanceError::invalid(
            "term_months",
            format!("Term cannot exceed {MAX_TERM_MONTHS} months"),
        ));
    }
    Ok(())
}

fn normalise_terms(terms: &[u32]) -> Vec<u32> {
    let mut terms = terms.to_vec();
    terms.sort_unstable();
    terms.dedup();
    terms
}

/// Month-by-month interest/principal split, folded from the opening balance.
///
/// Principal is capped at the outstanding balance so the final month
/// absorbs cent-level rounding in the quoted payment.
pub(crate) fn amortization_steps(
    loan_amount: Money,
    monthly_rate: Rate,
    payment: Money,
    months: u32,
) -> Vec<AmortizationStep> {
    (1..=months)
        .scan(loan_amount, |balance, month| {
            let interest = *balance * monthly_rate;
            let principal = (payment - interest).min(*balance);
            *balance = (*balance - principal).max(Decimal::ZERO);
            Some(AmortizationStep {
                month,
                interest,
                principal,
                balance: *balance,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn purchase(price: Money, down: Money, score: Option<u32>) -> FinancingInput {
        FinancingInput {
            vehicle_price: price,
            down_payment: down,
            credit_score: score,
            vehicle_type: VehicleType::New,
            apr: None,
            terms: None,
        }
    }

    #[test]
    fn test_zero_apr_straight_line() {
        let opt = amortize(dec!(12000), Decimal::ZERO, Decimal::ZERO, 36).unwrap();
        assert_eq!(opt.monthly_payment, dec!(333.33));
        assert_eq!(opt.total_interest, dec!(0));
        assert_eq!(opt.total_cost, dec!(12000));
    }

    #[test]
    fn test_good_tier_48_month_known_answer() {
        // 27,000 at 5.5% over 48 months = 627.93/mo
        let opt = amortize(dec!(27000), dec!(3000), dec!(0.055), 48).unwrap();
        assert_eq!(opt.loan_amount, dec!(27000));
        assert!((opt.monthly_payment - dec!(627.93)).abs() <= dec!(0.01));
        assert_eq!(
            opt.total_cost,
            opt.total_interest + opt.loan_amount + opt.down_payment
        );
    }

    #[test]
    fn test_options_ascending_and_complete() {
        let out = calculate_financing_options(
            &purchase(dec!(30000), dec!(3000), Some(720)),
            &EngineConfig::default(),
        )
        .unwrap();
        let terms: Vec<u32> = out.result.options.iter().map(|o| o.term_months).collect();
        assert_eq!(terms, vec![36, 48, 60, 72]);
        assert_eq!(out.result.apr, dec!(0.055));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_longer_terms_cost_more_interest() {
        let out = calculate_financing_options(
            &purchase(dec!(30000), dec!(3000), Some(720)),
            &EngineConfig::default(),
        )
        .unwrap();
        let opts = &out.result.options;
        for pair in opts.windows(2) {
            assert!(pair[1].monthly_payment < pair[0].monthly_payment);
            assert!(pair[1].total_interest > pair[0].total_interest);
        }
    }

    #[test]
    fn test_explicit_apr_skips_credit_resolution() {
        let mut input = purchase(dec!(20000), dec!(0), None);
        input.apr = Some(dec!(0.049));
        input.terms = Some(vec![60, 36, 60]);
        let out = calculate_financing_options(&input, &EngineConfig::default()).unwrap();
        assert!(out.result.credit.is_none());
        assert_eq!(out.result.options.len(), 2);
        assert_eq!(out.result.options[0].term_months, 36);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_missing_score_degrades_to_bad_tier() {
        let out = calculate_financing_options(
            &purchase(dec!(20000), dec!(2000), None),
            &EngineConfig::default(),
        )
        .unwrap();
        assert_eq!(out.result.apr, dec!(0.185));
        assert!(!out.warnings.is_empty());
    }

    #[test]
    fn test_rejects_contract_violations() {
        let config = EngineConfig::default();
        assert!(calculate_financing_options(&purchase(dec!(0), dec!(0), Some(700)), &config).is_err());
        assert!(
            calculate_financing_options(&purchase(dec!(10000), dec!(-1), Some(700)), &config)
                .is_err()
        );
        assert!(
            calculate_financing_options(&purchase(dec!(10000), dec!(10001), Some(700)), &config)
                .is_err()
        );
        assert!(amortize(dec!(1000), dec!(0), dec!(0.05), 0).is_err());
        assert!(amortize(dec!(1000), dec!(0), dec!(-0.01), 12).is_err());
        assert!(amortize(dec!(1000), dec!(0), dec!(0.05), MAX_TERM_MONTHS + 1).is_err());
        assert!(amortize(dec!(1000), dec!(0), dec!(0.05), MAX_TERM_MONTHS).is_ok());
    }

    #[test]
    fn test_fully_paid_down_payment() {
        let out = calculate_financing_options(
            &purchase(dec!(15000), dec!(15000), Some(800)),
            &EngineConfig::default(),
        )
        .unwrap();
        assert!(out.result.options.iter().all(|o| o.monthly_payment.is_zero()));
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_amortization_steps_end_at_zero() {
        let opt = amortize(dec!(10000), dec!(0), dec!(0.06), 24).unwrap();
        let steps = amortization_steps(
            opt.loan_amount,
            opt.monthly_rate(),
            opt.monthly_payment,
            opt.term_months,
        );
        assert_eq!(steps.len(), 24);
        assert!(steps.last().unwrap().balance < dec!(1));
        let principal: Money = steps.iter().map(|s| s.principal).sum();
        assert!((principal - dec!(10000)).abs() < dec!(1));
    }
}
