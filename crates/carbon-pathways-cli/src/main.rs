mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing::Level;

use commands::analysis::AnalyzeArgs;
use commands::inventory::BaselineArgs;
use commands::macc::{MaccArgs, PayoffArgs};
use commands::scenario::ScenarioArgs;
use commands::trajectory::{BauArgs, TargetArgs};

/// GHG scenario trajectories and marginal abatement cost curves
#[derive(Parser)]
#[command(
    name = "cpw",
    version,
    about = "GHG scenario trajectories and marginal abatement cost curves",
    long_about = "A CLI for projecting Scope 1 and Scope 2 emissions to 2050 with \
                  decimal precision. Aggregates an activity-data baseline, projects \
                  BAU and target paths, applies abatement scenarios, and builds \
                  marginal abatement cost curves and measure payoff charts."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log engine diagnostics to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate activity data into a Scope 1 / Scope 2 baseline
    Baseline(BaselineArgs),
    /// Project business-as-usual emissions to 2050
    Bau(BauArgs),
    /// Build a manual or SBTi-aligned reduction target path
    Target(TargetArgs),
    /// Project a scenario with its abatement measures applied
    Scenario(ScenarioArgs),
    /// Build a marginal abatement cost curve for a scenario
    Macc(MaccArgs),
    /// Per-measure cumulative abatement and NPV cost
    Payoff(PayoffArgs),
    /// Run the full dashboard analysis from one request
    Analyze(AnalyzeArgs),
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
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Baseline(args) => commands::inventory::run_baseline(args),
        Commands::Bau(args) => commands::trajectory::run_bau(args),
        Commands::Target(args) => commands::trajectory::run_target(args),
        Commands::Scenario(args) => commands::scenario::run_scenario(args),
        Commands::Macc(args) => commands::macc::run_macc(args),
        Commands::Payoff(args) => commands::macc::run_payoff(args),
        Commands::Analyze(args) => commands::analysis::run_analyze(args),
        Commands::Version => {
            println!("cpw {}", env!("CARGO_PKG_VERSION"));
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
