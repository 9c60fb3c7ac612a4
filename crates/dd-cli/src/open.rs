//! # Open Subcommand
//!
//! `ddpack open [--seed N] [--delay-ms N]`
//!
//! Runs one pack through the full lifecycle: generate and validate, skip
//! the pack animation, then auto-reveal every card on a real timer. Ctrl-C
//! cancels the auto-reveal the same way leaving the reveal screen does.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use clap::Args;
use dd_core::{CardCatalog, Pack, PackCard};
use dd_state::{
    LifecycleOptions, MemoryArchive, PackLifecycle, PackLifecycleState, TransitionRecord,
};

use crate::input::PackSource;

/// Arguments for the open subcommand.
#[derive(Args, Debug, Clone)]
pub struct OpenArgs {
    #[command(flatten)]
    pub source: PackSource,

    #[arg(long)]
    pub seed: Option<u64>,

    /// Milliseconds between automatic reveals.
    #[arg(long, default_value_t = 800)]
    pub delay_ms: u64,

    /// Print the finished pack as JSON.
    #[arg(long)]
    pub json: bool,
}

/// What happened while opening.
#[derive(Debug, Clone)]
pub struct OpenOutcome {
    /// The archived pack, fully revealed.
    pub pack: Pack,
    /// Card indices in the order they were revealed.
    pub reveal_order: Vec<usize>,
    pub transitions: Vec<TransitionRecord>,
}

/// Open one pack, calling `on_reveal` as each card turns face up.
pub async fn open_pack(
    args: &OpenArgs,
    mut on_reveal: impl FnMut(usize, &PackCard),
) -> anyhow::Result<OpenOutcome> {
    let config = args.source.load_config()?;
    let catalog: Arc<dyn CardCatalog + Send + Sync> = Arc::new(args.source.load_catalog()?);
    let options = LifecycleOptions {
        reveal_delay: Duration::from_millis(args.delay_ms),
        ..LifecycleOptions::default()
    };
    let mut lifecycle = PackLifecycle::with_options(catalog, MemoryArchive::new(), options);

    lifecycle.start(config, args.seed).context("opening pack")?;
    lifecycle.animation_complete()?;
    lifecycle.start_auto_reveal(Instant::now())?;

    let mut reveal_order = Vec::new();
    while let (Some(token), Some(due)) = (
        lifecycle.auto_reveal_token(),
        lifecycle.next_auto_reveal_due(),
    ) {
        tokio::select! {
            _ = tokio::time::sleep_until(tokio::time::Instant::from_std(due)) => {}
            _ = tokio::signal::ctrl_c() => {
                lifecycle.navigate_away();
                bail!(
                    "interrupted after {} of {} cards",
                    lifecycle.revealed_count(),
                    lifecycle.pack().map_or(0, Pack::len)
                );
            }
        }
        for index in lifecycle.poll_task(token, Instant::now()) {
            if let Some(card) = lifecycle.pack().and_then(|p| p.card(index)) {
                on_reveal(index, card);
            }
            reveal_order.push(index);
        }
    }

    if lifecycle.state() != PackLifecycleState::Results {
        bail!("auto-reveal stopped in state {}", lifecycle.state());
    }
    let pack = lifecycle
        .sink()
        .packs()
        .last()
        .cloned()
        .context("finished pack was not archived")?;
    Ok(OpenOutcome {
        pack,
        reveal_order,
        transitions: lifecycle.transitions().to_vec(),
    })
}

fn describe(index: usize, card: &PackCard) -> String {
    let holo = match card.holo_variant {
        Some(variant) => format!(" [{} holo]", variant.as_str()),
        None => String::new(),
    };
    format!(
        "#{} {:<10} {}{holo}",
        index + 1,
        card.rarity().as_str(),
        card.card.name
    )
}

pub async fn run_open(args: &OpenArgs) -> anyhow::Result<()> {
    let quiet = args.json;
    let outcome = open_pack(args, |index, card| {
        if !quiet {
            println!("{}", describe(index, card));
        }
    })
    .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome.pack)?);
    } else if let Some(best) = outcome.pack.best_rarity() {
        println!("best pull: {best}");
    }
    tracing::info!(
        pack = %outcome.pack.id(),
        transitions = outcome.transitions.len(),
        "pack opened"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dd_core::PackConfig;
    use dd_pack::generate_pack;

    fn args(seed: u64, delay_ms: u64) -> OpenArgs {
        OpenArgs {
            source: PackSource::default(),
            seed: Some(seed),
            delay_ms,
            json: true,
        }
    }

    #[tokio::test]
    async fn test_open_reveals_in_order_and_archives() {
        let mut seen = Vec::new();
        let outcome = open_pack(&args(11, 1), |i, _| seen.push(i)).await.unwrap();
        assert_eq!(outcome.reveal_order, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(seen, outcome.reveal_order);
        assert!(outcome.pack.is_fully_revealed());
        assert_eq!(
            outcome.transitions.last().map(|t| t.to),
            Some(PackLifecycleState::Results)
        );
    }

    #[tokio::test]
    async fn test_open_matches_direct_generation() {
        let outcome = open_pack(&args(77, 0), |_, _| {}).await.unwrap();
        let catalog = PackSource::default().load_catalog().unwrap();
        let direct = generate_pack(&catalog, &PackConfig::standard(), Some(77)).unwrap();
        assert_eq!(
            outcome.pack.content_digest().unwrap(),
            direct.content_digest().unwrap()
        );
    }

    #[test]
    fn test_describe_marks_holo() {
        let card = dd_core::Card::new("epic-001", "Epic Dad", dd_core::Rarity::Epic);
        let line = describe(2, &PackCard::new(card, Some(dd_core::HoloVariant::Reverse)));
        assert!(line.starts_with("#3 epic"));
        assert!(line.ends_with("[reverse holo]"));
    }
}
