use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use auto_finance_core::cash_purchase::lump_sum::{self, LumpSumInput};
use auto_finance_core::EngineConfig;

use crate::input;

/// Arguments for cash purchase analysis
#[derive(Args)]
pub struct LumpSumArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Vehicle price
    #[arg(long)]
    pub vehicle_price: Option<Decimal>,

    /// Cash available for the purchase
    #[arg(long)]
    pub available_cash: Option<Decimal>,

    /// Monthly take-home income
    #[arg(long)]
    pub monthly_income: Option<Decimal>,

    /// Monthly expenses
    #[arg(long, default_value = "0")]
    pub monthly_expenses: Decimal,

    /// Expected annual return on invested cash (decimal)
    #[arg(long)]
    pub expected_return: Option<Decimal>,

    /// Price a used vehicle
    #[arg(long)]
    pub used: bool,
}

pub fn run_lump_sum(
    args: LumpSumArgs,
    config: &EngineConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let cash_input = match input::read_structured(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => LumpSumInput {
            vehicle_price: args
                .vehicle_price
                .ok_or("--vehicle-price is required (or provide --input)")?,
            available_cash: args
                .available_cash
                .ok_or("--available-cash is required (or provide --input)")?,
            monthly_income: args.monthly_income,
            monthly_expenses: args.monthly_expenses,
            expected_return: args.expected_return,
            vehicle_type: super::vehicle_type(args.used),
        },
    };

    let result = lump_sum::analyze_lump_sum(&cash_input, config)?;
    Ok(serde_json::to_value(result)?)
}
