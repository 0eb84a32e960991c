use clap::Args;
use serde_json::Value;

use auto_finance_core::affordability::scoring::{self, AffordabilityInput};
use auto_finance_core::parse::NumericInput;
use auto_finance_core::EngineConfig;

use crate::input;

/// Arguments for affordability scoring.
///
/// Amounts are accepted as free text (`"$26,420 - $28,500"`, `"$450/mo"`).
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct AffordabilityArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Vehicle price or price range
    #[arg(long)]
    pub vehicle_price: Option<String>,

    /// Quoted monthly payment
    #[arg(long)]
    pub monthly_price: Option<String>,

    /// Annual income
    #[arg(long)]
    pub annual_income: Option<String>,

    /// Credit tier label, e.g. "Good (700-749)"
    #[arg(long)]
    pub credit_rating: Option<String>,

    /// Numeric credit score, used when no tier label is given
    #[arg(long)]
    pub credit_score: Option<u32>,

    /// Employment status, e.g. "full-time"
    #[arg(long)]
    pub employment_status: Option<String>,
}

pub fn run_affordability(
    args: AffordabilityArgs,
    config: &EngineConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let text = |raw: Option<String>| raw.map(|s| NumericInput::from(s.as_str()));
    let score_input = match input::read_structured(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => AffordabilityInput {
            vehicle_price: text(args.vehicle_price),
            monthly_price: text(args.monthly_price),
            annual_income: text(args.annual_income),
            credit_rating: args.credit_rating,
            credit_score: args.credit_score,
            employment_status: args.employment_status,
        },
    };

    let result = scoring::score_affordability(&score_input, config)?;
    Ok(serde_json::to_value(result)?)
}
