//! # ddpack CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use std::process::ExitCode;

use clap::Parser;

/// DadDeck pack engine harness.
///
/// Generates, validates and simulates card packs, and opens a pack through
/// the reveal lifecycle.
#[derive(Parser, Debug)]
#[command(name = "ddpack", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Generate one pack or a batch as JSON.
    Generate(dd_cli::generate::GenerateArgs),
    /// Validate pack documents.
    Validate(dd_cli::validate::ValidateArgs),
    /// Report rarity and holo frequencies over many packs.
    Simulate(dd_cli::simulate::SimulateArgs),
    /// Open one pack with timed auto-reveal.
    Open(dd_cli::open::OpenArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => dd_cli::generate::run_generate(&args)?,
        Commands::Validate(args) => {
            if !dd_cli::validate::run_validate(&args)? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Simulate(args) => dd_cli::simulate::run_simulate(&args)?,
        Commands::Open(args) => dd_cli::open::run_open(&args).await?,
    }

    Ok(ExitCode::SUCCESS)
}
