use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use auto_finance_core::leasing::comparison::{self, LeaseVsBuyInput};
use auto_finance_core::leasing::lease::{self, LeaseInput};
use auto_finance_core::leasing::mileage::{self, MileageInput};
use auto_finance_core::EngineConfig;

use crate::input;

/// Arguments for lease quotes
#[derive(Args)]
pub struct LeaseArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Vehicle price
    #[arg(long)]
    pub vehicle_price: Option<Decimal>,

    /// Credit score used to look up the APR
    #[arg(long)]
    pub credit_score: Option<u32>,

    /// Price a used vehicle
    #[arg(long)]
    pub used: bool,

    /// Explicit APR (decimal); skips the credit tier lookup
    #[arg(long)]
    pub apr: Option<Decimal>,

    /// Lease terms in months (comma-separated); each needs a configured residual
    #[arg(long, value_delimiter = ',')]
    pub terms: Option<Vec<u32>>,
}

/// Arguments for lease-vs-buy comparison (JSON input only)
#[derive(Args)]
pub struct LeaseVsBuyArgs {
    /// Path to JSON/YAML input file with `lease` and `financing` options
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for lease mileage analysis (JSON input only)
#[derive(Args)]
pub struct MileageArgs {
    /// Path to JSON/YAML input file
    #[arg(long)]
    pub input: Option<String>,

    /// Estimated annual miles (overrides the input file)
    #[arg(long)]
    pub annual_miles: Option<Decimal>,
}

pub fn run_lease(args: LeaseArgs, config: &EngineConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let lease_input = match input::read_structured(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => LeaseInput {
            vehicle_price: args
                .vehicle_price
                .ok_or("--vehicle-price is required (or provide --input)")?,
            credit_score: args.credit_score,
            vehicle_type: super::vehicle_type(args.used),
            apr: args.apr,
            terms: args.terms,
        },
    };

    let result = lease::calculate_lease_options(&lease_input, config)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_lease_vs_buy(
    args: LeaseVsBuyArgs,
    config: &EngineConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let comparison_input: LeaseVsBuyInput =
        input::require_structured(args.input.as_deref(), "lease vs buy")?;
    let result = comparison::compare_lease_vs_buy(&comparison_input, config)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_mileage(
    args: MileageArgs,
    config: &EngineConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut mileage_input: MileageInput =
        input::require_structured(args.input.as_deref(), "mileage analysis")?;
    if let Some(miles) = args.annual_miles {
        mileage_input.estimated_annual_miles = miles;
    }
    let result = mileage::analyze_mileage(&mileage_input, config)?;
    Ok(serde_json::to_value(result)?)
}
