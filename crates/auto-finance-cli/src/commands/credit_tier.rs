use clap::Args;
use serde_json::Value;

use auto_finance_core::credit_tier::{self, CreditTierInput};
use auto_finance_core::EngineConfig;

use crate::input;

/// Arguments for credit tier resolution
#[derive(Args)]
pub struct CreditTierArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// FICO-style credit score (300-850)
    #[arg(long)]
    pub credit_score: Option<u32>,

    /// Price a used vehicle
    #[arg(long)]
    pub used: bool,
}

pub fn run_credit_tier(
    args: CreditTierArgs,
    config: &EngineConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let tier_input = match input::read_structured(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => CreditTierInput {
            credit_score: args.credit_score,
            vehicle_type: super::vehicle_type(args.used),
        },
    };

    let result = credit_tier::resolve_credit_tier(&tier_input, config)?;
    Ok(serde_json::to_value(result)?)
}
