mod commands;
mod input;
mod output;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use env_logger::Env;
use std::process;

use commands::affordability::AffordabilityArgs;
use commands::cash_purchase::LumpSumArgs;
use commands::credit_tier::CreditTierArgs;
use commands::financing::{EquityTimelineArgs, FinancingArgs, PaymentBreakdownArgs};
use commands::leasing::{LeaseArgs, LeaseVsBuyArgs, MileageArgs};
use commands::scenario::ScenarioArgs;

/// Vehicle financing, leasing and cash purchase scenarios
#[derive(Parser)]
#[command(
    name = "afe",
    version,
    about = "Vehicle financing, leasing and cash purchase scenarios",
    long_about = "A CLI for comparing how to pay for a vehicle with decimal precision. \
                  Quotes loans and leases by credit tier, projects equity and payment \
                  splits, compares leasing against buying, and scores affordability."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Engine configuration file (JSON or YAML) overriding the defaults
    #[arg(long, global = true)]
    config: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve credit tier and APR for a score
    CreditTier(CreditTierArgs),
    /// Quote financing options across loan terms
    Financing(FinancingArgs),
    /// Project vehicle value against loan balance month by month
    EquityTimeline(EquityTimelineArgs),
    /// Split each payment into principal and interest
    PaymentBreakdown(PaymentBreakdownArgs),
    /// Quote lease options across lease terms
    Lease(LeaseArgs),
    /// Compare a lease against financing over the lease term
    LeaseVsBuy(LeaseVsBuyArgs),
    /// Project lease mileage against the allowance
    Mileage(MileageArgs),
    /// Analyse paying cash, including opportunity cost
    LumpSum(LumpSumArgs),
    /// Score how well a vehicle fits a buyer's finances
    Affordability(AffordabilityArgs),
    /// Run every analysis for one vehicle and buyer
    Scenario(ScenarioArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_logging(verbose: u8) {
    // Default level from -v, overridden by RUST_LOG
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Commands::Version = cli.command {
        println!("afe {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let result = input::config::load_config(cli.config.as_deref()).and_then(|config| {
        match cli.command {
            Commands::CreditTier(args) => commands::credit_tier::run_credit_tier(args, &config),
            Commands::Financing(args) => commands::financing::run_financing(args, &config),
            Commands::EquityTimeline(args) => {
                commands::financing::run_equity_timeline(args, &config)
            }
            Commands::PaymentBreakdown(args) => {
                commands::financing::run_payment_breakdown(args, &config)
            }
            Commands::Lease(args) => commands::leasing::run_lease(args, &config),
            Commands::LeaseVsBuy(args) => commands::leasing::run_lease_vs_buy(args, &config),
            Commands::Mileage(args) => commands::leasing::run_mileage(args, &config),
            Commands::LumpSum(args) => commands::cash_purchase::run_lump_sum(args, &config),
            Commands::Affordability(args) => {
                commands::affordability::run_affordability(args, &config)
            }
            Commands::Scenario(args) => commands::scenario::run_scenario(args, &config),
            Commands::Version => Ok(serde_json::json!({ "version": env!("CARGO_PKG_VERSION") })),
        }
    });

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
