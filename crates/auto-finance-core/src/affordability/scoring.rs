//! Weighted 0-100 fit score for a specific vehicle.
//!
//! Four criteria contribute capped points, by default income-to-price (30),
//! credit (25), employment stability (20) and payment-to-income (25); the
//! tables live in [`AffordabilityConfig`]. A criterion
//! whose inputs are missing or unparsable is skipped rather than zeroed,
//! and the final score is normalised over the points that were actually
//! available.

use std::collections::BTreeMap;

use log::{debug, warn};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::config::{AffordabilityConfig, EngineConfig, RatingThresholds, RatioBracket};
use crate::credit_tier::{self, CreditTier};
use crate::parse::{parse_optional, NumericInput, ParseResult};
use crate::types::{round_whole, with_metadata, ComputationOutput, Money};
use crate::AutoFinanceResult;

/// Status earned by each entry of a three-entry point table.
const TABLE_STATUSES: [CriterionStatus; 3] = [
    CriterionStatus::Excellent,
    CriterionStatus::Good,
    CriterionStatus::Fair,
];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AffordabilityInput {
    /// Sticker price, e.g. `"$26,420 - $28,500"` (first bound is used)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_price: Option<NumericInput>,
    /// Quoted monthly finance price, e.g. `"$450/mo"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_price: Option<NumericInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_income: Option<NumericInput>,
    /// Tier label such as `"Good (700-749)"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_rating: Option<String>,
    /// Used when no tier label is supplied
    #[serde(
        default,
        deserialize_with = "crate::parse::lenient_score",
        skip_serializing_if = "Option::is_none"
    )]
    pub credit_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employment_status: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    IncomeToPrice,
    CreditScore,
    EmploymentStability,
    PaymentToIncome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionStatus {
    Excellent,
    Good,
    Fair,
    Poor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentStatus {
    FullTime,
    SelfEmployed,
    PartTime,
    Other,
}

impl EmploymentStatus {
    pub fn from_label(label: &str) -> Self {
        let normalised: String = label
            .to_ascii_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect();
        if normalised.contains("self") {
            EmploymentStatus::SelfEmployed
        } else if normalised.contains("fulltime") {
            EmploymentStatus::FullTime
        } else if normalised.contains("parttime") {
            EmploymentStatus::PartTime
        } else {
            EmploymentStatus::Other
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitRating {
    #[serde(rename = "Excellent Fit")]
    ExcellentFit,
    #[serde(rename = "Good Fit")]
    GoodFit,
    #[serde(rename = "Fair Fit")]
    FairFit,
    #[serde(rename = "High Risk")]
    HighRisk,
}

impl FitRating {
    pub fn from_score(score: u32, thresholds: &RatingThresholds) -> Self {
        match score {
            s if s >= thresholds.excellent_fit => FitRating::ExcellentFit,
            s if s >= thresholds.good_fit => FitRating::GoodFit,
            s if s >= thresholds.fair_fit => FitRating::FairFit,
            _ => FitRating::HighRisk,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionScore {
    pub score: u32,
    pub max_score: u32,
    pub status: CriterionStatus,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffordabilityScore {
    /// 0..=100
    pub score: u32,
    pub rating: FitRating,
    pub points_earned: u32,
    /// Sum of maxima for the criteria that could be scored
    pub points_possible: u32,
    pub breakdown: BTreeMap<Criterion, CriterionScore>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn score_affordability(
    input: &AffordabilityInput,
    config: &EngineConfig,
) -> AutoFinanceResult<ComputationOutput<AffordabilityScore>> {
    let table = &config.affordability;
    let mut warnings = Vec::new();
    let mut breakdown = BTreeMap::new();

    let price = positive_amount("vehicle_price", input.vehicle_price.as_ref(), &mut warnings);
    let monthly = positive_amount("monthly_price", input.monthly_price.as_ref(), &mut warnings);
    let income = positive_amount("annual_income", input.annual_income.as_ref(), &mut warnings);
    debug!("affordability: price {price:?}, monthly {monthly:?}, income {income:?}");

    match (price, income) {
        (Some(price), Some(income)) => {
            breakdown.insert(Criterion::IncomeToPrice, income_to_price(price, income, table));
        }
        _ => skip(Criterion::IncomeToPrice, "vehicle price and annual income", &mut warnings),
    }

    match credit_tier_from(input) {
        Some(tier) => {
            breakdown.insert(Criterion::CreditScore, credit_points(tier, table));
        }
        None => skip(Criterion::CreditScore, "credit rating", &mut warnings),
    }

    match input.employment_status.as_deref().map(str::trim) {
        Some(label) if !label.is_empty() => {
            breakdown.insert(
                Criterion::EmploymentStability,
                employment_points(EmploymentStatus::from_label(label), table),
            );
        }
        _ => skip(Criterion::EmploymentStability, "employment status", &mut warnings),
    }

    match (monthly, income) {
        (Some(monthly), Some(income)) => {
            breakdown.insert(
                Criterion::PaymentToIncome,
                payment_to_income(monthly, income, table),
            );
        }
        _ => skip(Criterion::PaymentToIncome, "monthly price and annual income", &mut warnings),
    }

    let points_earned: u32 = breakdown.values().map(|c| c.score).sum();
    let points_possible: u32 = breakdown.values().map(|c| c.max_score).sum();

    let score = if points_possible == 0 {
        warnings.push("No criterion could be scored; reporting 0.".into());
        0
    } else {
        let ratio = Decimal::from(points_earned) / Decimal::from(points_possible);
        round_whole(ratio * dec!(100)).to_u32().unwrap_or(0).min(100)
    };

    let assumptions = serde_json::json!({ "affordability": table });

    Ok(with_metadata(
        "Weighted affordability score normalised over available criteria",
        &assumptions,
        warnings,
        AffordabilityScore {
            score,
            rating: FitRating::from_score(score, &table.rating_thresholds),
            points_earned,
            points_possible,
            breakdown,
        },
    ))
}

// ---------------------------------------------------------------------------
// Criteria
// ---------------------------------------------------------------------------

fn income_to_price(price: Money, income: Money, table: &AffordabilityConfig) -> CriterionScore {
    let ratio = price / income;
    let (score, status) = bracket(ratio, &table.income_to_price, table.floor_points);
    CriterionScore {
        score,
        max_score: table.income_to_price[0].points,
        status,
        detail: format!(
            "Vehicle price is {}% of annual income",
            round_whole(ratio * dec!(100))
        ),
    }
}

fn payment_to_income(
    monthly: Money,
    annual_income: Money,
    table: &AffordabilityConfig,
) -> CriterionScore {
    let ratio = monthly / (annual_income / dec!(12));
    let (score, status) = bracket(ratio, &table.payment_to_income, table.floor_points);
    CriterionScore {
        score,
        max_score: table.payment_to_income[0].points,
        status,
        detail: format!(
            "Monthly payment is {}% of monthly income",
            round_whole(ratio * dec!(100))
        ),
    }
}

fn credit_points(tier: CreditTier, table: &AffordabilityConfig) -> CriterionScore {
    let rank = match tier {
        CreditTier::Excellent => Some(0),
        CreditTier::Good => Some(1),
        CreditTier::Fair => Some(2),
        CreditTier::Poor | CreditTier::Bad => None,
    };
    let (score, status) = ranked(rank, &table.credit_points, table.floor_points);
    CriterionScore {
        score,
        max_score: table.credit_points[0],
        status,
        detail: format!("Credit tier: {}", tier.label()),
    }
}

fn employment_points(status: EmploymentStatus, table: &AffordabilityConfig) -> CriterionScore {
    let (rank, label) = match status {
        EmploymentStatus::FullTime => (Some(0), "full-time"),
        EmploymentStatus::SelfEmployed => (Some(1), "self-employed"),
        EmploymentStatus::PartTime => (Some(2), "part-time"),
        EmploymentStatus::Other => (None, "other"),
    };
    let (score, criterion_status) = ranked(rank, &table.employment_points, table.floor_points);
    CriterionScore {
        score,
        max_score: table.employment_points[0],
        status: criterion_status,
        detail: format!("Employment: {label}"),
    }
}

fn bracket(ratio: Decimal, brackets: &[RatioBracket; 3], floor: u32) -> (u32, CriterionStatus) {
    let rank = brackets.iter().position(|b| ratio <= b.max_ratio);
    let points = brackets.map(|b| b.points);
    ranked(rank, &points, floor)
}

/// Points and status for a table entry; `None` falls to the floor.
fn ranked(rank: Option<usize>, points: &[u32; 3], floor: u32) -> (u32, CriterionStatus) {
    match rank {
        Some(i) => (points[i], TABLE_STATUSES[i]),
        None => (floor, CriterionStatus::Poor),
    }
}

// ---------------------------------------------------------------------------
// Input handling
// ---------------------------------------------------------------------------

/// Tier from the label if one is given; an unrecognised label scores as the
/// lowest bracket. Falls back to the numeric score, then to nothing.
fn credit_tier_from(input: &AffordabilityInput) -> Option<CreditTier> {
    match input.credit_rating.as_deref().map(str::trim) {
        Some(label) if !label.is_empty() => {
            Some(CreditTier::from_label(label).unwrap_or(CreditTier::Bad))
        }
        _ => input.credit_score.map(|s| credit_tier::tier_for_score(Some(s))),
    }
}

fn positive_amount(
    field: &str,
    raw: Option<&NumericInput>,
    warnings: &mut Vec<String>,
) -> Option<Money> {
    match parse_optional(raw) {
        ParseResult::Parsed { value } if value > Decimal::ZERO => Some(value),
        ParseResult::Parsed { value } => {
            warn!("{field} is not positive ({value}); ignoring");
            warnings.push(format!("{field} must be positive; got {value}."));
            None
        }
        ParseResult::Invalid { raw, reason } => {
            warn!("{field} could not be parsed from '{raw}': {reason}");
            warnings.push(format!("{field} could not be parsed from '{raw}'."));
            None
        }
        ParseResult::Missing => None,
    }
}

fn skip(criterion: Criterion, needs: &str, warnings: &mut Vec<String>) {
    debug!("skipping {criterion:?}: needs {needs}");
    warnings.push(format!("{criterion:?} not scored: requires {needs}."));
}
