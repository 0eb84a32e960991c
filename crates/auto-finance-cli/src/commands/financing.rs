use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use auto_finance_core::financing::amortization::{self, FinancingInput};
use auto_finance_core::financing::breakdown::{self, PaymentBreakdownInput};
use auto_finance_core::financing::equity::{self, EquityTimelineInput};
use auto_finance_core::EngineConfig;

use crate::input;

/// Arguments for financing option quotes
#[derive(Args)]
pub struct FinancingArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Vehicle price
    #[arg(long)]
    pub vehicle_price: Option<Decimal>,

    /// Down payment
    #[arg(long, default_value = "0")]
    pub down_payment: Decimal,

    /// Credit score used to look up the APR
    #[arg(long)]
    pub credit_score: Option<u32>,

    /// Price a used vehicle
    #[arg(long)]
    pub used: bool,

    /// Explicit APR (decimal, e.g. 0.055); skips the credit tier lookup
    #[arg(long)]
    pub apr: Option<Decimal>,

    /// Loan terms in months (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub terms: Option<Vec<u32>>,
}

/// Arguments for the equity timeline (JSON input only)
#[derive(Args)]
pub struct EquityTimelineArgs {
    /// Path to JSON/YAML input file
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the payment breakdown (JSON input only)
#[derive(Args)]
pub struct PaymentBreakdownArgs {
    /// Path to JSON/YAML input file
    #[arg(long)]
    pub input: Option<String>,

    /// Months to project (overrides the input and configured horizon)
    #[arg(long)]
    pub horizon_months: Option<u32>,
}

pub fn run_financing(
    args: FinancingArgs,
    config: &EngineConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let financing_input = match input::read_structured(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => FinancingInput {
            vehicle_price: args
                .vehicle_price
                .ok_or("--vehicle-price is required (or provide --input)")?,
            down_payment: args.down_payment,
            credit_score: args.credit_score,
            vehicle_type: super::vehicle_type(args.used),
            apr: args.apr,
            terms: args.terms,
        },
    };

    let result = amortization::calculate_financing_options(&financing_input, config)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_equity_timeline(
    args: EquityTimelineArgs,
    config: &EngineConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let timeline_input: EquityTimelineInput =
        input::require_structured(args.input.as_deref(), "the equity timeline")?;
    let result = equity::project_equity_timeline(&timeline_input, config)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_payment_breakdown(
    args: PaymentBreakdownArgs,
    config: &EngineConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut breakdown_input: PaymentBreakdownInput =
        input::require_structured(args.input.as_deref(), "the payment breakdown")?;
    if args.horizon_months.is_some() {
        breakdown_input.horizon_months = args.horizon_months;
    }
    let result = breakdown::project_payment_breakdown(&breakdown_input, config)?;
    Ok(serde_json::to_value(result)?)
}
