//! Closed-end consumer lease pricing.
//!
//! The monthly payment is the depreciation fee `(price - residual) / n` plus
//! the finance fee `(price + residual) * money_factor`, where the money
//! factor is `apr / 24`. Residuals are a fixed fraction of price keyed by
//! term (65% / 55% / 45% for 24 / 36 / 48 months by default).

use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::config::{EngineConfig, LeaseConfig};
use crate::credit_tier::{self, CreditTierResolution};
use crate::error::AutoFinanceError;
use crate::financing::amortization::check_term;
use crate::types::{
    round_cents, round_whole, with_metadata, ComputationOutput, Money, Percentage, Rate,
    VehicleType,
};
use crate::AutoFinanceResult;

/// APR to money factor divisor (APR as a decimal).
const MONEY_FACTOR_DIVISOR: Decimal = dec!(24);
const RATE_DP: u32 = 6;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaseOption {
    pub term_months: u32,
    pub residual_value: Money,
    /// Residual as a whole percentage of price
    pub residual_percentage: Percentage,
    pub monthly_payment: Money,
    /// Portion of the payment covering depreciation
    pub depreciation_fee: Money,
    /// Portion of the payment covering the lessor's financing
    pub finance_fee: Money,
    pub money_factor: Rate,
    /// Money factor expressed back as an annual rate
    pub apr_equivalent: Rate,
    /// First payment + security deposit + acquisition fees
    pub upfront_costs: Money,
    /// Miles per year
    pub mileage_allowance: Decimal,
    /// Per mile over the allowance
    pub excess_mileage_fee: Money,
    /// All payments plus acquisition fees; the deposit is refundable
    pub total_lease_cost: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaseInput {
    pub vehicle_price: Money,
    #[serde(
        default,
        deserialize_with = "crate::parse::lenient_score",
        skip_serializing_if = "Option::is_none"
    )]
    pub credit_score: Option<u32>,
    #[serde(default)]
    pub vehicle_type: VehicleType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apr: Option<Rate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms: Option<Vec<u32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaseOutput {
    pub credit: Option<CreditTierResolution>,
    pub apr: Rate,
    /// Ascending by term
    pub options: Vec<LeaseOption>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn money_factor(apr: Rate) -> Rate {
    apr / MONEY_FACTOR_DIVISOR
}

/// Price one lease term.
pub fn lease_option(
    vehicle_price: Money,
    apr: Rate,
    term_months: u32,
    lease: &LeaseConfig,
) -> AutoFinanceResult<LeaseOption> {
    if vehicle_price <= Decimal::ZERO {
        return Err(AutoFinanceError::invalid(
            "vehicle_price",
            "Vehicle price must be positive",
        ));
    }
    if apr < Decimal::ZERO {
        return Err(AutoFinanceError::invalid("apr", "APR cannot be negative"));
    }
    check_term(term_months)?;
    let residual_fraction = lease.residual_fraction(term_months).ok_or_else(|| {
        AutoFinanceError::invalid(
            "term_months",
            format!("No residual schedule configured for a {term_months}-month lease"),
        )
    })?;

    let n = Decimal::from(term_months);
    let mf = money_factor(apr);
    let residual = vehicle_price * residual_fraction;
    let residual_value = round_cents(residual);
    if residual_value <= Decimal::ZERO || residual_value >= vehicle_price {
        return Err(AutoFinanceError::invalid(
            "vehicle_price",
            format!("Price {vehicle_price} is too small to carry a residual value"),
        ));
    }
    let depreciation_fee = (vehicle_price - residual) / n;
    let finance_fee = (vehicle_price + residual) * mf;
    let monthly_payment = round_cents(depreciation_fee + finance_fee);

    Ok(LeaseOption {
        term_months,
        residual_value,
        residual_percentage: round_whole(residual_fraction * dec!(100)),
        monthly_payment,
        depreciation_fee: round_cents(depreciation_fee),
        finance_fee: round_cents(finance_fee),
        money_factor: mf,
        apr_equivalent: (mf * MONEY_FACTOR_DIVISOR).round_dp(RATE_DP),
        upfront_costs: monthly_payment + lease.security_deposit + lease.acquisition_fees,
        mileage_allowance: lease.mileage_allowance,
        excess_mileage_fee: lease.excess_mileage_fee,
        total_lease_cost: monthly_payment * n + lease.acquisition_fees,
    })
}

pub fn calculate_lease_options(
    input: &LeaseInput,
    config: &EngineConfig,
) -> AutoFinanceResult<ComputationOutput<LeaseOutput>> {
    debug!("lease options for price {}", input.vehicle_price);
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

    let mut terms: Vec<u32> = match &input.terms {
        Some(terms) => terms.clone(),
        None => config.lease.residuals.iter().map(|r| r.term_months).collect(),
    };
    terms.sort_unstable();
    terms.dedup();

    let options = terms
        .iter()
        .map(|&term| lease_option(input.vehicle_price, apr, term, &config.lease))
        .collect::<AutoFinanceResult<Vec<_>>>()?;

    Ok(with_metadata(
        "Closed-end lease: depreciation fee + (price + residual) x money factor",
        &config.lease,
        warnings,
        LeaseOutput {
            credit,
            apr,
            options,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_residuals_by_term() {
        let lease = LeaseConfig::default();
        let residual = |term| {
            lease_option(dec!(30000), dec!(0.055), term, &lease)
                .unwrap()
                .residual_value
        };
        assert_eq!(residual(24), dec!(19500));
        assert_eq!(residual(36), dec!(16500));
        assert_eq!(residual(48), dec!(13500));
    }

    #[test]
    fn test_36_month_payment_known_answer() {
        // dep fee = 13500 / 36 = 375.00
        // mf = 0.055 / 24 = 0.0022916...; finance fee = 46500 * mf = 106.5625
        let opt = lease_option(dec!(30000), dec!(0.055), 36, &LeaseConfig::default()).unwrap();
        assert_eq!(opt.depreciation_fee, dec!(375));
        assert_eq!(opt.finance_fee, dec!(106.56));
        assert_eq!(opt.monthly_payment, dec!(481.56));
        assert_eq!(opt.upfront_costs, dec!(1231.56));
        assert_eq!(opt.apr_equivalent, dec!(0.055));
        assert_eq!(opt.mileage_allowance, dec!(12000));
        assert_eq!(opt.excess_mileage_fee, dec!(0.25));
        assert_eq!(opt.total_lease_cost, dec!(481.56) * dec!(36) + dec!(250));
    }

    #[test]
    fn test_zero_apr_is_pure_depreciation() {
        let opt = lease_option(dec!(24000), Decimal::ZERO, 24, &LeaseConfig::default()).unwrap();
        assert!(opt.finance_fee.is_zero());
        assert_eq!(opt.monthly_payment, dec!(350));
    }

    #[test]
    fn test_residual_strictly_inside_price() {
        let out = calculate_lease_options(
            &LeaseInput {
                vehicle_price: dec!(41999.99),
                credit_score: Some(680),
                vehicle_type: VehicleType::New,
                apr: None,
                terms: None,
            },
            &EngineConfig::default(),
        )
        .unwrap();
        assert_eq!(out.result.options.len(), 3);
        for opt in &out.result.options {
            assert!(opt.residual_value > Decimal::ZERO);
            assert!(opt.residual_value < dec!(41999.99));
        }
    }

    #[test]
    fn test_sub_cent_residual_rejected() {
        let result = lease_option(dec!(0.01), dec!(0.05), 48, &LeaseConfig::default());
        assert!(matches!(
            result,
            Err(AutoFinanceError::InvalidInput { ref field, .. }) if field == "vehicle_price"
        ));
        let result = lease_option(dec!(0.01), dec!(0.05), 24, &LeaseConfig::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_term_beyond_limit_rejected() {
        let mut lease = LeaseConfig::default();
        lease.residuals[0].term_months = 6000;
        let result = lease_option(dec!(30000), dec!(0.05), 6000, &lease);
        assert!(matches!(
            result,
            Err(AutoFinanceError::InvalidInput { ref field, .. }) if field == "term_months"
        ));
    }

    #[test]
    fn test_unconfigured_term_rejected() {
        let result = lease_option(dec!(30000), dec!(0.05), 30, &LeaseConfig::default());
        assert!(matches!(
            result,
            Err(AutoFinanceError::InvalidInput { ref field, .. }) if field == "term_months"
        ));
    }

    #[test]
    fn test_used_vehicle_lease_priced_higher() {
        let config = EngineConfig::default();
        let price = |vehicle_type| {
            calculate_lease_options(
                &LeaseInput {
                    vehicle_price: dec!(30000),
                    credit_score: Some(720),
                    vehicle_type,
                    apr: None,
                    terms: Some(vec![36]),
                },
                &config,
            )
            .unwrap()
            .result
            .options[0]
                .monthly_payment
        };
        assert!(price(VehicleType::Used) > price(VehicleType::New));
    }
}
