mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use commands::apv::ProjectArgs;
use commands::parity::SpotRateArgs;

/// Adjusted present value of a foreign capital project
#[derive(Parser)]
#[command(
    name = "apv",
    version,
    about = "Adjusted present value of a foreign capital project",
    long_about = "Values a foreign capital expenditure with the adjusted present value model: \
                  PPP-forecast spot rates, operating cash flows, depreciation and interest \
                  tax shields, a concessional loan subsidy and repatriation arbitrage, all in \
                  decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log computation detail to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Full APV with every component and per-period schedule
    Apv(ProjectArgs),
    /// PV of the project's operating cash flows
    Operating(ProjectArgs),
    /// PV of the depreciation tax shields
    Depreciation(ProjectArgs),
    /// Benefit of the concessional loan
    LoanBenefit(ProjectArgs),
    /// PV of the λ-scaled interest tax shields
    InterestShield(ProjectArgs),
    /// Leverage factor λ
    Leverage(ProjectArgs),
    /// Repatriation arbitrage on freed-up affiliate funds
    Repatriation(ProjectArgs),
    /// Expected spot rates under relative purchasing power parity
    SpotRates(SpotRateArgs),
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

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Apv(args) => commands::apv::run_apv(args),
        Commands::Operating(args) => commands::apv::run_operating(args),
        Commands::Depreciation(args) => commands::apv::run_depreciation(args),
        Commands::LoanBenefit(args) => commands::apv::run_loan_benefit(args),
        Commands::InterestShield(args) => commands::apv::run_interest_shield(args),
        Commands::Leverage(args) => commands::apv::run_leverage(args),
        Commands::Repatriation(args) => commands::apv::run_repatriation(args),
        Commands::SpotRates(args) => commands::parity::run_spot_rates(args),
        Commands::Version => {
            println!("apv {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

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
