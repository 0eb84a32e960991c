//! One-call composition of every calculation for a single shopper.
//!
//! Each component is run independently on the same inputs; warnings from
//! all of them are gathered into the outer envelope, prefixed by the
//! component that raised them.

use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::affordability::scoring::{self, AffordabilityInput, AffordabilityScore};
use crate::cash_purchase::lump_sum::{self, LumpSumAnalysis, LumpSumInput};
use crate::config::EngineConfig;
use crate::credit_tier::{self, CreditTierResolution};
use crate::error::AutoFinanceError;
use crate::financing::amortization::{self, FinancingInput, FinancingOption};
use crate::financing::breakdown::{self, PaymentBreakdownInput, PaymentBreakdownOutput};
use crate::financing::equity::{self, EquityTimelineInput, EquityTimelineOutput};
use crate::leasing::comparison::{self, LeaseVsBuyInput, LeaseVsBuyOutput};
use crate::leasing::lease::{self, LeaseInput, LeaseOption};
use crate::leasing::mileage::{self, MileageAnalysis, MileageInput};
use crate::parse::NumericInput;
use crate::types::{with_metadata, ComputationOutput, Money, VehicleType};
use crate::AutoFinanceResult;

pub const DEFAULT_SELECTED_FINANCE_TERM: u32 = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioInput {
    pub vehicle_price: Money,
    #[serde(default)]
    pub down_payment: Money,
    #[serde(
        default,
        deserialize_with = "crate::parse::lenient_score",
        skip_serializing_if = "Option::is_none"
    )]
    pub credit_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_income: Option<Money>,
    #[serde(default)]
    pub vehicle_type: VehicleType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employment_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_annual_miles: Option<Decimal>,
    /// Enables the cash-purchase analysis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_cash: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_income: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_expenses: Option<Money>,
    /// Financing term projected over time; defaults to 60 months
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_finance_term: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutput {
    pub credit: CreditTierResolution,
    pub financing_options: Vec<FinancingOption>,
    pub lease_options: Vec<LeaseOption>,
    pub selected_financing: FinancingOption,
    pub equity_timeline: EquityTimelineOutput,
    pub payment_breakdown: PaymentBreakdownOutput,
    /// One entry per lease term that has a same-term financing option
    pub lease_vs_buy: Vec<LeaseVsBuyOutput>,
    /// One entry per lease option when a mileage estimate is given
    pub mileage: Vec<MileageAnalysis>,
    pub lump_sum: Option<LumpSumAnalysis>,
    pub affordability: Option<AffordabilityScore>,
}

pub fn build_scenario(
    input: &ScenarioInput,
    config: &EngineConfig,
) -> AutoFinanceResult<ComputationOutput<ScenarioOutput>> {
    debug!("building scenario for price {}", input.vehicle_price);
    let mut warnings = Vec::new();

    let credit = credit_tier::resolve(
        input.credit_score,
        input.vehicle_type,
        &config.rates,
        &mut Vec::new(),
    );

    let financing = amortization::calculate_financing_options(
        &FinancingInput {
            vehicle_price: input.vehicle_price,
            down_payment: input.down_payment,
            credit_score: input.credit_score,
            vehicle_type: input.vehicle_type,
            apr: None,
            terms: None,
        },
        config,
    )?;
    collect("financing", &financing.warnings, &mut warnings);
    let financing_options = financing.result.options;

    let leases = lease::calculate_lease_options(
        &LeaseInput {
            vehicle_price: input.vehicle_price,
            credit_score: input.credit_score,
            vehicle_type: input.vehicle_type,
            apr: None,
            terms: None,
        },
        config,
    )?;
    // Lease warnings only repeat the credit-tier notice already collected.
    let lease_options = leases.result.options;

    let selected_term = input
        .selected_finance_term
        .unwrap_or(DEFAULT_SELECTED_FINANCE_TERM);
    let selected_financing = financing_options
        .iter()
        .find(|o| o.term_months == selected_term)
        .cloned()
        .ok_or_else(|| {
            AutoFinanceError::invalid(
                "selected_finance_term",
                format!("No {selected_term}-month financing option is offered"),
            )
        })?;

    let equity_timeline = equity::project_equity_timeline(
        &EquityTimelineInput {
            option: selected_financing.clone(),
            vehicle_price: input.vehicle_price,
        },
        config,
    )?;
    collect("equity", &equity_timeline.warnings, &mut warnings);

    let payment_breakdown = breakdown::project_payment_breakdown(
        &PaymentBreakdownInput {
            option: selected_financing.clone(),
            horizon_months: None,
        },
        config,
    )?;
    collect("breakdown", &payment_breakdown.warnings, &mut warnings);

    let mut lease_vs_buy = Vec::new();
    for lease_option in &lease_options {
        let Some(financing_option) = financing_options
            .iter()
            .find(|o| o.term_months == lease_option.term_months)
        else {
            continue;
        };
        let compared = comparison::compare_lease_vs_buy(
            &LeaseVsBuyInput {
                lease: lease_option.clone(),
                financing: financing_option.clone(),
            },
            config,
        )?;
        collect("lease_vs_buy", &compared.warnings, &mut warnings);
        lease_vs_buy.push(compared.result);
    }

    let mut mileage_analyses = Vec::new();
    if let Some(miles) = input.estimated_annual_miles {
        for lease_option in &lease_options {
            let analysis = mileage::analyze_mileage(
                &MileageInput {
                    estimated_annual_miles: miles,
                    lease: lease_option.clone(),
                },
                config,
            )?;
            collect("mileage", &analysis.warnings, &mut warnings);
            mileage_analyses.push(analysis.result);
        }
    }

    let lump_sum = match input.available_cash {
        Some(available_cash) => {
            let analysis = lump_sum::analyze_lump_sum(
                &LumpSumInput {
                    vehicle_price: input.vehicle_price,
                    available_cash,
                    monthly_income: input.monthly_income,
                    monthly_expenses: input.monthly_expenses.unwrap_or_default(),
                    expected_return: None,
                    vehicle_type: input.vehicle_type,
                },
                config,
            )?;
            collect("lump_sum", &analysis.warnings, &mut warnings);
            Some(analysis.result)
        }
        None => None,
    };

    let affordability = match input.annual_income {
        Some(income) => {
            let scored = scoring::score_affordability(
                &AffordabilityInput {
                    vehicle_price: Some(NumericInput::Amount(input.vehicle_price)),
                    monthly_price: Some(NumericInput::Amount(selected_financing.monthly_payment)),
                    annual_income: Some(NumericInput::Amount(income)),
                    credit_rating: None,
                    credit_score: input.credit_score,
                    employment_status: input.employment_status.clone(),
                },
                config,
            )?;
            collect("affordability", &scored.warnings, &mut warnings);
            Some(scored.result)
        }
        None => None,
    };

    Ok(with_metadata(
        "Financing, lease, cash and affordability scenarios for one vehicle",
        config,
        warnings,
        ScenarioOutput {
            credit,
            financing_options,
            lease_options,
            selected_financing,
            equity_timeline: equity_timeline.result,
            payment_breakdown: payment_breakdown.result,
            lease_vs_buy,
            mileage: mileage_analyses,
            lump_sum,
            affordability,
        },
    ))
}

fn collect(component: &str, from: &[String], into: &mut Vec<String>) {
    into.extend(from.iter().map(|w| format!("[{component}] {w}")));
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn shopper() -> ScenarioInput {
        ScenarioInput {
            vehicle_price: dec!(30000),
            down_payment: dec!(3000),
            credit_score: Some(720),
            annual_income: Some(dec!(85000)),
            vehicle_type: VehicleType::New,
            employment_status: Some("full-time".into()),
            estimated_annual_miles: Some(dec!(15000)),
            available_cash: Some(dec!(50000)),
            monthly_income: Some(dec!(7000)),
            monthly_expenses: Some(dec!(3500)),
            selected_finance_term: None,
        }
    }

    #[test]
    fn test_full_scenario_shape() {
        let out = build_scenario(&shopper(), &EngineConfig::default()).unwrap();
        let r = &out.result;
        assert_eq!(r.financing_options.len(), 4);
        assert_eq!(r.lease_options.len(), 3);
        assert_eq!(r.selected_financing.term_months, 60);
        assert_eq!(r.equity_timeline.points.len(), 61);
        assert_eq!(r.payment_breakdown.points.len(), 24);
        // 36 and 48 month leases have matching loans; 24 does not
        assert_eq!(r.lease_vs_buy.len(), 2);
        assert_eq!(r.mileage.len(), 3);
        assert!(r.lump_sum.is_some());
        assert!(r.affordability.is_some());
    }

    #[test]
    fn test_optional_sections_absent_without_inputs() {
        let mut input = shopper();
        input.annual_income = None;
        input.available_cash = None;
        input.estimated_annual_miles = None;
        let r = build_scenario(&input, &EngineConfig::default()).unwrap().result;
        assert!(r.lump_sum.is_none());
        assert!(r.affordability.is_none());
        assert!(r.mileage.is_empty());
    }

    #[test]
    fn test_unknown_selected_term_rejected() {
        let mut input = shopper();
        input.selected_finance_term = Some(84);
        assert!(build_scenario(&input, &EngineConfig::default()).is_err());
    }

    #[test]
    fn test_warnings_are_prefixed_by_component() {
        let mut input = shopper();
        input.credit_score = None;
        let out = build_scenario(&input, &EngineConfig::default()).unwrap();
        assert!(out.warnings.iter().any(|w| w.starts_with("[financing]")));
    }

    #[test]
    fn test_scenario_is_deterministic() {
        let config = EngineConfig::default();
        let a = build_scenario(&shopper(), &config).unwrap();
        let b = build_scenario(&shopper(), &config).unwrap();
        assert_eq!(a, b);
    }
}
