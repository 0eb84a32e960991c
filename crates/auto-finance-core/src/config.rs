//! Engine-wide assumptions.
//!
//! Every constant the calculations depend on (tier APRs, term sets,
//! residual schedules, fees, the reference financing used for
//! opportunity-cost analysis, the affordability brackets) lives here and is passed explicitly into each
//! operation. `EngineConfig::default()` reproduces the standard consumer
//! assumptions; callers override individual fields from JSON or YAML.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::AutoFinanceError;
use crate::types::{Money, Rate};
use crate::AutoFinanceResult;

/// Longest loan or lease term the engine will price, in months.
pub const MAX_TERM_MONTHS: u32 = 120;

// ---------------------------------------------------------------------------
// Top level
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub rates: RateTable,
    pub financing: FinancingConfig,
    pub depreciation: DepreciationModel,
    pub lease: LeaseConfig,
    pub cash: CashPurchaseConfig,
    pub affordability: AffordabilityConfig,
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON configuration and validate it.
    pub fn from_json(json: &str) -> AutoFinanceResult<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AutoFinanceResult<()> {
        self.rates.validate()?;
        self.financing.validate()?;
        self.depreciation.validate()?;
        self.lease.validate()?;
        self.cash.validate()?;
        self.affordability.validate()?;
        Ok(())
    }
}

fn config_error(msg: impl Into<String>) -> AutoFinanceError {
    AutoFinanceError::ConfigError(msg.into())
}

// ---------------------------------------------------------------------------
// Credit tier APRs
// ---------------------------------------------------------------------------

/// New-vehicle base APR per credit tier, plus the flat used-vehicle premium.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateTable {
    pub excellent: Rate,
    pub good: Rate,
    pub fair: Rate,
    pub poor: Rate,
    pub bad: Rate,
    pub used_vehicle_premium: Rate,
}

impl Default for RateTable {
    fn default() -> Self {
        RateTable {
            excellent: dec!(0.035),
            good: dec!(0.055),
            fair: dec!(0.085),
            poor: dec!(0.135),
            bad: dec!(0.185),
            used_vehicle_premium: dec!(0.01),
        }
    }
}

impl RateTable {
    fn validate(&self) -> AutoFinanceResult<()> {
        let ordered = [self.excellent, self.good, self.fair, self.poor, self.bad];
        if ordered.iter().any(|r| *r < Decimal::ZERO) || self.used_vehicle_premium < Decimal::ZERO
        {
            return Err(config_error("rates must be non-negative"));
        }
        if ordered.windows(2).any(|w| w[0] > w[1]) {
            return Err(config_error(
                "tier rates must not decrease from excellent to bad",
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Financing
// ---------------------------------------------------------------------------

/// How the lease-vs-buy comparison estimates the financed buyer's loan
/// balance at the end of the lease term.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceMethod {
    /// Closed-form amortization balance.
    #[default]
    Exact,
    /// Assumes interest accrues evenly across the loan:
    /// `loan - (payment * t - total_interest * t / term)`.
    LinearInterest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancingConfig {
    /// Loan terms offered, in months
    pub terms: Vec<u32>,
    /// Default number of months shown by the payment breakdown
    pub breakdown_horizon_months: u32,
    pub balance_method: BalanceMethod,
}

impl Default for FinancingConfig {
    fn default() -> Self {
        FinancingConfig {
            terms: vec![36, 48, 60, 72],
            breakdown_horizon_months: 24,
            balance_method: BalanceMethod::Exact,
        }
    }
}

impl FinancingConfig {
    fn validate(&self) -> AutoFinanceResult<()> {
        if self.terms.is_empty() {
            return Err(config_error("financing.terms must not be empty"));
        }
        if self.terms.iter().any(|&t| t == 0 || t > MAX_TERM_MONTHS) {
            return Err(config_error(format!(
                "financing.terms must lie in 1..={MAX_TERM_MONTHS}"
            )));
        }
        if self.breakdown_horizon_months == 0 {
            return Err(config_error(
                "financing.breakdown_horizon_months must be positive",
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Depreciation
// ---------------------------------------------------------------------------

/// Linear loss across the first year, then compounding annual decline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepreciationModel {
    pub first_year_loss: Rate,
    pub annual_rate_after_first_year: Rate,
}

impl Default for DepreciationModel {
    fn default() -> Self {
        DepreciationModel {
            first_year_loss: dec!(0.15),
            annual_rate_after_first_year: dec!(0.10),
        }
    }
}

impl DepreciationModel {
    fn validate(&self) -> AutoFinanceResult<()> {
        let in_unit = |r: Rate| r >= Decimal::ZERO && r < Decimal::ONE;
        if !in_unit(self.first_year_loss) || !in_unit(self.annual_rate_after_first_year) {
            return Err(config_error("depreciation rates must lie in [0, 1)"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Leasing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidualSchedule {
    pub term_months: u32,
    /// Residual value as a fraction of the vehicle price
    pub residual_fraction: Rate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaseConfig {
    pub residuals: Vec<ResidualSchedule>,
    /// Refundable security deposit collected at signing
    pub security_deposit: Money,
    /// Acquisition and documentation fees collected at signing
    pub acquisition_fees: Money,
    /// Miles per year included in the lease
    pub mileage_allowance: Decimal,
    /// Charge per mile driven beyond the allowance
    pub excess_mileage_fee: Money,
    /// Annual allowances dealers commonly offer, ascending
    pub standard_allowances: Vec<Decimal>,
}

impl Default for LeaseConfig {
    fn default() -> Self {
        LeaseConfig {
            residuals: vec![
                ResidualSchedule {
                    term_months: 24,
                    residual_fraction: dec!(0.65),
                },
                ResidualSchedule {
                    term_months: 36,
                    residual_fraction: dec!(0.55),
                },
                ResidualSchedule {
                    term_months: 48,
                    residual_fraction: dec!(0.45),
                },
            ],
            security_deposit: dec!(500),
            acquisition_fees: dec!(250),
            mileage_allowance: dec!(12000),
            excess_mileage_fee: dec!(0.25),
            standard_allowances: vec![dec!(10000), dec!(12000), dec!(15000), dec!(18000)],
        }
    }
}

impl LeaseConfig {
    pub fn residual_fraction(&self, term_months: u32) -> Option<Rate> {
        self.residuals
            .iter()
            .find(|r| r.term_months == term_months)
            .map(|r| r.residual_fraction)
    }

    fn validate(&self) -> AutoFinanceResult<()> {
        if self.residuals.is_empty() {
            return Err(config_error("lease.residuals must not be empty"));
        }
        for schedule in &self.residuals {
            if schedule.term_months == 0 || schedule.term_months > MAX_TERM_MONTHS {
                return Err(config_error(format!(
                    "lease residual terms must lie in 1..={MAX_TERM_MONTHS}"
                )));
            }
            if schedule.residual_fraction <= Decimal::ZERO
                || schedule.residual_fraction >= Decimal::ONE
            {
                return Err(config_error(format!(
                    "residual fraction for {}-month lease must lie in (0, 1)",
                    schedule.term_months
                )));
            }
        }
        if self.security_deposit < Decimal::ZERO
            || self.acquisition_fees < Decimal::ZERO
            || self.excess_mileage_fee < Decimal::ZERO
            || self.mileage_allowance < Decimal::ZERO
        {
            return Err(config_error("lease fees and allowances must be non-negative"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Cash purchase
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CashPurchaseConfig {
    /// Sales tax plus registration, as a fraction of price
    pub taxes_and_fees_rate: Rate,
    /// Months of expenses to hold back as an emergency fund
    pub emergency_fund_months: u32,
    /// Annual return assumed on cash that is invested instead
    pub expected_return: Rate,
    /// Credit score used to price the reference financing option
    pub reference_credit_score: u32,
    pub reference_term_months: u32,
    /// Down payment of the reference financing option, as a fraction of price
    pub reference_down_payment_ratio: Rate,
}

impl Default for CashPurchaseConfig {
    fn default() -> Self {
        CashPurchaseConfig {
            taxes_and_fees_rate: dec!(0.08),
            emergency_fund_months: 6,
            expected_return: dec!(0.07),
            reference_credit_score: 720,
            reference_term_months: 48,
            reference_down_payment_ratio: dec!(0.20),
        }
    }
}

impl CashPurchaseConfig {
    fn validate(&self) -> AutoFinanceResult<()> {
        if self.taxes_and_fees_rate < Decimal::ZERO {
            return Err(config_error("cash.taxes_and_fees_rate must be non-negative"));
        }
        if self.expected_return <= dec!(-1) {
            return Err(config_error("cash.expected_return must exceed -100%"));
        }
        if self.reference_term_months == 0 || self.reference_term_months > MAX_TERM_MONTHS {
            return Err(config_error(format!(
                "cash.reference_term_months must lie in 1..={MAX_TERM_MONTHS}"
            )));
        }
        if self.reference_down_payment_ratio < Decimal::ZERO
            || self.reference_down_payment_ratio >= Decimal::ONE
        {
            return Err(config_error(
                "cash.reference_down_payment_ratio must lie in [0, 1)",
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Affordability scoring
// ---------------------------------------------------------------------------

/// One scoring band: ratios up to `max_ratio` (inclusive) earn `points`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioBracket {
    pub max_ratio: Rate,
    pub points: u32,
}

impl RatioBracket {
    const fn new(max_ratio: Rate, points: u32) -> Self {
        RatioBracket { max_ratio, points }
    }
}

/// Minimum 0-100 score for each fit rating; lower scores are high risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingThresholds {
    pub excellent_fit: u32,
    pub good_fit: u32,
    pub fair_fit: u32,
}

impl Default for RatingThresholds {
    fn default() -> Self {
        RatingThresholds {
            excellent_fit: 80,
            good_fit: 65,
            fair_fit: 50,
        }
    }
}

/// Point tables for the affordability score.
///
/// Three-entry tables run excellent, good, fair. Anything below the last
/// entry earns `floor_points`. A criterion's maximum is its first entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AffordabilityConfig {
    /// Vehicle price over annual income
    pub income_to_price: [RatioBracket; 3],
    /// Monthly payment over monthly income
    pub payment_to_income: [RatioBracket; 3],
    /// Excellent, good and fair credit tiers
    pub credit_points: [u32; 3],
    /// Full-time, self-employed and part-time work
    pub employment_points: [u32; 3],
    pub floor_points: u32,
    pub rating_thresholds: RatingThresholds,
}

impl Default for AffordabilityConfig {
    fn default() -> Self {
        AffordabilityConfig {
            income_to_price: [
                RatioBracket::new(dec!(0.50), 30),
                RatioBracket::new(dec!(0.75), 22),
                RatioBracket::new(dec!(1.00), 15),
            ],
            payment_to_income: [
                RatioBracket::new(dec!(0.10), 25),
                RatioBracket::new(dec!(0.15), 20),
                RatioBracket::new(dec!(0.20), 12),
            ],
            credit_points: [25, 20, 12],
            employment_points: [20, 15, 10],
            floor_points: 5,
            rating_thresholds: RatingThresholds::default(),
        }
    }
}

impl AffordabilityConfig {
    fn validate(&self) -> AutoFinanceResult<()> {
        for (name, brackets) in [
            ("income_to_price", &self.income_to_price),
            ("payment_to_income", &self.payment_to_income),
        ] {
            if brackets[0].max_ratio <= Decimal::ZERO
                || brackets.windows(2).any(|w| w[0].max_ratio >= w[1].max_ratio)
            {
                return Err(config_error(format!(
                    "affordability.{name} ratios must be positive and ascending"
                )));
            }
            let points = brackets.map(|b| b.points);
            self.check_points(name, &points)?;
        }
        self.check_points("credit_points", &self.credit_points)?;
        self.check_points("employment_points", &self.employment_points)?;

        let t = &self.rating_thresholds;
        if !(0 < t.fair_fit && t.fair_fit < t.good_fit && t.good_fit < t.excellent_fit)
            || t.excellent_fit > 100
        {
            return Err(config_error(
                "affordability.rating_thresholds must satisfy 0 < fair < good < excellent <= 100",
            ));
        }
        Ok(())
    }

    fn check_points(&self, name: &str, points: &[u32; 3]) -> AutoFinanceResult<()> {
        if points[0] == 0
            || points.windows(2).any(|w| w[0] < w[1])
            || points[2] < self.floor_points
        {
            return Err(config_error(format!(
                "affordability.{name} points must be positive, non-increasing and at least floor_points"
            )));
        }
        Ok(())
    }
}
