use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use auto_finance_core::scenario::{self, ScenarioInput};
use auto_finance_core::EngineConfig;

use crate::input;

/// Arguments for a full vehicle scenario
#[derive(Args)]
pub struct ScenarioArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Vehicle price
    #[arg(long)]
    pub vehicle_price: Option<Decimal>,

    /// Down payment
    #[arg(long, default_value = "0")]
    pub down_payment: Decimal,

    /// Credit score
    #[arg(long)]
    pub credit_score: Option<u32>,

    /// Annual income; enables affordability scoring
    #[arg(long)]
    pub annual_income: Option<Decimal>,

    /// Price a used vehicle
    #[arg(long)]
    pub used: bool,

    /// Employment status, e.g. "full-time"
    #[arg(long)]
    pub employment_status: Option<String>,

    /// Estimated annual miles; enables lease mileage analysis
    #[arg(long)]
    pub annual_miles: Option<Decimal>,

    /// Cash on hand; enables cash purchase analysis
    #[arg(long)]
    pub available_cash: Option<Decimal>,

    /// Monthly take-home income
    #[arg(long)]
    pub monthly_income: Option<Decimal>,

    /// Monthly expenses
    #[arg(long)]
    pub monthly_expenses: Option<Decimal>,

    /// Financing term projected for equity and payment breakdown
    #[arg(long)]
    pub term: Option<u32>,
}

pub fn run_scenario(
    args: ScenarioArgs,
    config: &EngineConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let scenario_input = match input::read_structured(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => ScenarioInput {
            vehicle_price: args
                .vehicle_price
                .ok_or("--vehicle-price is required (or provide --input)")?,
            down_payment: args.down_payment,
            credit_score: args.credit_score,
            annual_income: args.annual_income,
            vehicle_type: super::vehicle_type(args.used),
            employment_status: args.employment_status,
            estimated_annual_miles: args.annual_miles,
            available_cash: args.available_cash,
            monthly_income: args.monthly_income,
            monthly_expenses: args.monthly_expenses,
            selected_finance_term: args.term,
        },
    };

    let result = scenario::build_scenario(&scenario_input, config)?;
    Ok(serde_json::to_value(result)?)
}
