//! Lease mileage against the contract allowance.
//!
//! Allowed and projected miles scale the annual figures by `term / 12`.
//! Miles beyond the allowance are charged at the lease's excess fee, and the
//! smallest standard allowance covering the estimate is suggested.

use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::AutoFinanceError;
use crate::leasing::lease::LeaseOption;
use crate::types::{round_cents, round_whole, with_metadata, ComputationOutput, Money, Percentage};
use crate::AutoFinanceResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MileageInput {
    pub estimated_annual_miles: Decimal,
    pub lease: LeaseOption,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MileageAnalysis {
    pub term_months: u32,
    pub allowed_miles: Decimal,
    pub projected_miles: Decimal,
    pub excess_miles: Decimal,
    pub excess_fees: Money,
    pub is_overage: bool,
    /// Projected over allowed, whole percent; `None` when nothing is allowed
    pub utilization_percentage: Option<Percentage>,
    /// Smallest standard annual allowance covering the estimate
    pub suggested_annual_allowance: Option<Decimal>,
}

/// Project lease-term mileage against the allowance.
pub fn analyze_mileage(
    input: &MileageInput,
    config: &EngineConfig,
) -> AutoFinanceResult<ComputationOutput<MileageAnalysis>> {
    let lease = &input.lease;
    if input.estimated_annual_miles < Decimal::ZERO {
        return Err(AutoFinanceError::invalid(
            "estimated_annual_miles",
            "Annual mileage cannot be negative",
        ));
    }
    if lease.term_months == 0 {
        return Err(AutoFinanceError::invalid(
            "lease.term_months",
            "Lease term must be greater than zero",
        ));
    }
    debug!(
        "mileage analysis: {} mi/yr over {} months",
        input.estimated_annual_miles, lease.term_months
    );

    let mut warnings = Vec::new();
    let years = Decimal::from(lease.term_months) / dec!(12);
    let allowed_miles = lease.mileage_allowance * years;
    let projected_miles = input.estimated_annual_miles * years;
    let excess_miles = (projected_miles - allowed_miles).max(Decimal::ZERO);

    let utilization_percentage = if allowed_miles.is_zero() {
        warnings.push("Lease includes no mileage; utilization is undefined.".into());
        None
    } else {
        Some(round_whole(projected_miles / allowed_miles * dec!(100)))
    };

    let suggested_annual_allowance = config
        .lease
        .standard_allowances
        .iter()
        .copied()
        .filter(|a| *a >= input.estimated_annual_miles)
        .min();

    Ok(with_metadata(
        "Allowance x term years vs projected miles",
        &serde_json::json!({
            "mileage_allowance": lease.mileage_allowance,
            "excess_mileage_fee": lease.excess_mileage_fee,
        }),
        warnings,
        MileageAnalysis {
            term_months: lease.term_months,
            allowed_miles,
            projected_miles,
            excess_miles,
            excess_fees: round_cents(excess_miles * lease.excess_mileage_fee),
            is_overage: excess_miles > Decimal::ZERO,
            utilization_percentage,
            suggested_annual_allowance,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LeaseConfig;
    use crate::leasing::lease::lease_option;
    use rust_decimal_macros::dec;

    fn analyze(miles: Decimal, term: u32) -> ComputationOutput<MileageAnalysis> {
        let lease = lease_option(dec!(30000), dec!(0.055), term, &LeaseConfig::default()).unwrap();
        analyze_mileage(
            &MileageInput {
                estimated_annual_miles: miles,
                lease,
            },
            &EngineConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_heavy_driver_36_months() {
        let out = analyze(dec!(18000), 36).result;
        assert_eq!(out.allowed_miles, dec!(36000));
        assert_eq!(out.projected_miles, dec!(54000));
        assert_eq!(out.excess_miles, dec!(18000));
        assert_eq!(out.excess_fees, dec!(4500));
        assert!(out.is_overage);
        assert_eq!(out.utilization_percentage, Some(dec!(150)));
        assert_eq!(out.suggested_annual_allowance, Some(dec!(18000)));
    }

    #[test]
    fn test_light_driver_has_no_overage() {
        let out = analyze(dec!(9000), 24).result;
        assert_eq!(out.excess_miles, Decimal::ZERO);
        assert!(out.excess_fees.is_zero());
        assert!(!out.is_overage);
        assert_eq!(out.utilization_percentage, Some(dec!(75)));
        assert_eq!(out.suggested_annual_allowance, Some(dec!(10000)));
    }

    #[test]
    fn test_exactly_at_allowance() {
        let out = analyze(dec!(12000), 48).result;
        assert!(!out.is_overage);
        assert_eq!(out.utilization_percentage, Some(dec!(100)));
    }

    #[test]
    fn test_beyond_every_standard_allowance() {
        let out = analyze(dec!(25000), 36).result;
        assert!(out.suggested_annual_allowance.is_none());
    }

    #[test]
    fn test_zero_allowance_guarded() {
        let mut lease =
            lease_option(dec!(30000), dec!(0.055), 36, &LeaseConfig::default()).unwrap();
        lease.mileage_allowance = Decimal::ZERO;
        let out = analyze_mileage(
            &MileageInput {
                estimated_annual_miles: dec!(5000),
                lease,
            },
            &EngineConfig::default(),
        )
        .unwrap();
        assert_eq!(out.result.utilization_percentage, None);
        assert!(out.result.is_overage);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_negative_mileage_rejected() {
        let lease = lease_option(dec!(30000), dec!(0.055), 36, &LeaseConfig::default()).unwrap();
        let result = analyze_mileage(
            &MileageInput {
                estimated_annual_miles: dec!(-1),
                lease,
            },
            &EngineConfig::default(),
        );
        assert!(result.is_err());
    }
}
