//! Credit score to APR tier resolution.
//!
//! Scores are bucketed at 750 / 700 / 650 / 600. A missing score, or one
//! outside the bureau range 300..=850, resolves to the worst tier rather
//! than failing.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::{EngineConfig, RateTable};
use crate::types::{with_metadata, ComputationOutput, Rate, VehicleType};
use crate::AutoFinanceResult;

pub const MIN_CREDIT_SCORE: u32 = 300;
pub const MAX_CREDIT_SCORE: u32 = 850;

const EXCELLENT_THRESHOLD: u32 = 750;
const GOOD_THRESHOLD: u32 = 700;
const FAIR_THRESHOLD: u32 = 650;
const POOR_THRESHOLD: u32 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditTier {
    Excellent,
    Good,
    Fair,
    Poor,
    Bad,
}

impl CreditTier {
    pub fn label(&self) -> &'static str {
        match self {
            CreditTier::Excellent => "excellent",
            CreditTier::Good => "good",
            CreditTier::Fair => "fair",
            CreditTier::Poor => "poor",
            CreditTier::Bad => "bad",
        }
    }

    /// Lenient parse of a tier label as entered in a profile form, e.g.
    /// `"Excellent (750+)"` or `"GOOD"`. Returns `None` when no tier name
    /// is present.
    pub fn from_label(label: &str) -> Option<Self> {
        let lower = label.trim().to_ascii_lowercase();
        [
            CreditTier::Excellent,
            CreditTier::Good,
            CreditTier::Fair,
            CreditTier::Poor,
            CreditTier::Bad,
        ]
        .into_iter()
        .find(|tier| lower.contains(tier.label()))
    }

    /// New-vehicle base APR for this tier.
    pub fn base_apr(&self, rates: &RateTable) -> Rate {
        match self {
            CreditTier::Excellent => rates.excellent,
            CreditTier::Good => rates.good,
            CreditTier::Fair => rates.fair,
            CreditTier::Poor => rates.poor,
            CreditTier::Bad => rates.bad,
        }
    }
}

/// Whether the score is within the bureau range.
pub fn is_recognised_score(score: u32) -> bool {
    (MIN_CREDIT_SCORE..=MAX_CREDIT_SCORE).contains(&score)
}

/// Bucket a credit score. Unknown or out-of-range scores are `Bad`.
pub fn tier_for_score(score: Option<u32>) -> CreditTier {
    match score.filter(|s| is_recognised_score(*s)) {
        Some(s) if s >= EXCELLENT_THRESHOLD => CreditTier::Excellent,
        Some(s) if s >= GOOD_THRESHOLD => CreditTier::Good,
        Some(s) if s >= FAIR_THRESHOLD => CreditTier::Fair,
        Some(s) if s >= POOR_THRESHOLD => CreditTier::Poor,
        _ => CreditTier::Bad,
    }
}

/// APR for a score and vehicle type.
pub fn resolve_apr(score: Option<u32>, vehicle_type: VehicleType, rates: &RateTable) -> Rate {
    let base = tier_for_score(score).base_apr(rates);
    match vehicle_type {
        VehicleType::New => base,
        VehicleType::Used => base + rates.used_vehicle_premium,
    }
}

// ---------------------------------------------------------------------------
// Enveloped operation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditTierInput {
    #[serde(
        default,
        deserialize_with = "crate::parse::lenient_score",
        skip_serializing_if = "Option::is_none"
    )]
    pub credit_score: Option<u32>,
    #[serde(default)]
    pub vehicle_type: VehicleType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditTierResolution {
    pub credit_score: Option<u32>,
    pub score_recognised: bool,
    pub tier: CreditTier,
    pub base_apr: Rate,
    pub used_vehicle_premium: Rate,
    pub apr: Rate,
}

/// Resolve a score into its tier and APR, warning when the score had to be
/// treated as unknown.
pub fn resolve(
    credit_score: Option<u32>,
    vehicle_type: VehicleType,
    rates: &RateTable,
    warnings: &mut Vec<String>,
) -> CreditTierResolution {
    let score_recognised = credit_score.is_some_and(is_recognised_score);
    match credit_score {
        None => {
            warn!("credit score missing; using worst tier");
            warnings.push("Credit score not provided; priced at the worst tier.".into());
        }
        Some(s) if !score_recognised => {
            warn!("credit score {s} outside {MIN_CREDIT_SCORE}..={MAX_CREDIT_SCORE}; using worst tier");
            warnings.push(format!(
                "Credit score {s} is outside {MIN_CREDIT_SCORE}-{MAX_CREDIT_SCORE}; priced at the worst tier."
            ));
        }
        Some(_) => {}
    }

    let tier = tier_for_score(credit_score);
    let base_apr = tier.base_apr(rates);
    let used_vehicle_premium = match vehicle_type {
        VehicleType::New => Rate::ZERO,
        VehicleType::Used => rates.used_vehicle_premium,
    };

    CreditTierResolution {
        credit_score,
        score_recognised,
        tier,
        base_apr,
        used_vehicle_premium,
        apr: base_apr + used_vehicle_premium,
    }
}

pub fn resolve_credit_tier(
    input: &CreditTierInput,
    config: &EngineConfig,
) -> AutoFinanceResult<ComputationOutput<CreditTierResolution>> {
    debug!("resolving credit tier for {:?}", input.credit_score);
    let mut warnings = Vec::new();
    let resolution = resolve(
        input.credit_score,
        input.vehicle_type,
        &config.rates,
        &mut warnings,
    );

    Ok(with_metadata(
        "Credit tier lookup (750/700/650/600 thresholds)",
        &config.rates,
        warnings,
        resolution,
    ))
}
