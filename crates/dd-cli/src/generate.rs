//! # Generate Subcommand
//!
//! `ddpack generate [--seed N] [--count N] [--output FILE]`
//!
//! One pack prints as a JSON object, a batch as a JSON array. Packs are not
//! validated here; pipe them into `ddpack validate` for that.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use dd_core::Pack;
use dd_pack::PackGenerator;

use crate::input::PackSource;

/// Arguments for the generate subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub source: PackSource,

    /// Seed for reproducible output. Pack `i` of a batch uses `seed + i`.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of packs, 1 to 10.
    #[arg(long, default_value_t = 1)]
    pub count: usize,

    /// Write to this file instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Generate the packs described by `args`.
pub fn generate_packs(args: &GenerateArgs) -> anyhow::Result<Vec<Pack>> {
    let config = args.source.load_config()?;
    let catalog = args.source.load_catalog()?;
    let packs = PackGenerator::new(&catalog)
        .generate_batch(&config, args.count, args.seed)
        .context("generating packs")?;
    Ok(packs)
}

pub fn render(packs: &[Pack]) -> anyhow::Result<String> {
    let text = match packs {
        [single] => serde_json::to_string_pretty(single)?,
        _ => serde_json::to_string_pretty(packs)?,
    };
    Ok(text)
}

pub fn run_generate(args: &GenerateArgs) -> anyhow::Result<()> {
    let packs = generate_packs(args)?;
    let text = render(&packs)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, text + "\n")
                .with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(count = packs.len(), path = %path.display(), "packs written");
        }
        None => println!("{text}"),
    }
    Ok(())
}
