//! # Simulate Subcommand
//!
//! `ddpack simulate [--packs N] [--seed N] [--slot I]`
//!
//! Generates seeded packs `seed, seed+1, ...` and reports observed tier
//! and holo frequencies per slot next to the configured probabilities.
//! With `--slot` only that slot's rarity table is sampled, without a
//! catalog.

use std::collections::BTreeMap;

use anyhow::{bail, Context};
use clap::Args;
use dd_core::{PackConfig, Rarity, RaritySlot};
use dd_pack::{
    sample_slot, FingerprintHistory, PackGenerator, PackValidator, RarityTally, ValidationContext,
};
use serde::Serialize;

use crate::input::PackSource;

/// Arguments for the simulate subcommand.
#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub source: PackSource,

    /// Packs to generate (or draws, with `--slot`).
    #[arg(long, default_value_t = 10_000)]
    pub packs: u64,

    /// First seed.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Sample a single slot's rarity table.
    #[arg(long)]
    pub slot: Option<usize>,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotReport {
    pub slot: usize,
    pub expected: BTreeMap<Rarity, f64>,
    pub observed: RarityTally,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub packs: u64,
    pub expected_holo_rate: f64,
    pub overall: RarityTally,
    pub slots: Vec<SlotReport>,
    /// Packs the anomaly check would have flagged.
    pub anomalies: u64,
}

fn expected(slot: &RaritySlot) -> BTreeMap<Rarity, f64> {
    Rarity::ALL
        .into_iter()
        .map(|r| (r, slot.probability(r)))
        .filter(|(_, p)| *p > 0.0)
        .collect()
}

pub fn simulate(args: &SimulateArgs) -> anyhow::Result<SimulationReport> {
    let config = args.source.load_config()?;
    config.validate()?;
    if args.packs == 0 {
        bail!("--packs must be at least 1");
    }
    match args.slot {
        Some(index) => simulate_slot(&config, index, args.packs, args.seed),
        None => simulate_packs(args, &config),
    }
}

fn simulate_slot(
    config: &PackConfig,
    index: usize,
    draws: u64,
    seed: u64,
) -> anyhow::Result<SimulationReport> {
    let Some(slot) = config.slots.get(index) else {
        bail!("slot {index} out of range (config has {} slots)", config.card_count());
    };
    let tally = sample_slot(slot, draws, seed);
    Ok(SimulationReport {
        packs: draws,
        expected_holo_rate: config.holo_chance,
        overall: tally.clone(),
        slots: vec![SlotReport {
            slot: index,
            expected: expected(slot),
            observed: tally,
        }],
        anomalies: 0,
    })
}

fn simulate_packs(args: &SimulateArgs, config: &PackConfig) -> anyhow::Result<SimulationReport> {
    let catalog = args.source.load_catalog()?;
    let generator = PackGenerator::new(&catalog);
    let history = FingerprintHistory::default();
    let validator = PackValidator::new(ValidationContext::new(&history, config, &catalog));

    let mut overall = RarityTally::new();
    let mut slots: Vec<RarityTally> = vec![RarityTally::new(); config.card_count()];
    let mut anomalies = 0;

    for i in 0..args.packs {
        let seed = args.seed.wrapping_add(i);
        let pack = generator
            .generate(config, Some(seed))
            .with_context(|| format!("generating pack with seed {seed}"))?;
        overall.record_pack(&pack);
        for (tally, card) in slots.iter_mut().zip(pack.cards()) {
            tally.record_card(card);
        }
        if !validator.check_anomalies(&pack).valid {
            anomalies += 1;
        }
    }

    Ok(SimulationReport {
        packs: args.packs,
        expected_holo_rate: config.holo_chance,
        overall,
        slots: config
            .slots
            .iter()
            .zip(slots)
            .enumerate()
            .map(|(slot, (rule, observed))| SlotReport {
                slot,
                expected: expected(rule),
                observed,
            })
            .collect(),
        anomalies,
    })
}

fn print_text(report: &SimulationReport) {
    println!("{} samples", report.packs);
    for slot in &report.slots {
        println!("slot {}:", slot.slot);
        for rarity in Rarity::ALL {
            let want = slot.expected.get(&rarity).copied().unwrap_or(0.0);
            let got = slot.observed.frequency(rarity);
            if want > 0.0 || got > 0.0 {
                println!(
                    "  {:<10} {:>7.3}%  (expected {:>7.3}%)",
                    rarity.as_str(),
                    got * 100.0,
                    want * 100.0
                );
            }
        }
    }
    println!(
        "holo rate {:.3}% (expected {:.3}%)",
        report.overall.holo_rate() * 100.0,
        report.expected_holo_rate * 100.0
    );
    if report.anomalies > 0 {
        println!("{} packs flagged as statistical anomalies", report.anomalies);
    }
}

pub fn run_simulate(args: &SimulateArgs) -> anyhow::Result<()> {
    let report = simulate(args)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_text(&report);
    }
    Ok(())
}
