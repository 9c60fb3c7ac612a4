//! Frequency counts over many generated cards, for simulation and tests.

use std::collections::BTreeMap;

use dd_core::{HoloVariant, Pack, PackCard, Rarity, RaritySlot};
use serde::Serialize;

use crate::random::SeededRandom;
use crate::resolve::RarityResolver;

/// Tier, holo and variant counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RarityTally {
    pub total: u64,
    pub rarities: BTreeMap<Rarity, u64>,
    pub holo: u64,
    pub variants: BTreeMap<HoloVariant, u64>,
}

impl RarityTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_rarity(&mut self, rarity: Rarity) {
        self.total += 1;
        *self.rarities.entry(rarity).or_default() += 1;
    }

    pub fn record_card(&mut self, card: &PackCard) {
        self.record_rarity(card.rarity());
        if let Some(variant) = card.holo_variant {
            self.holo += 1;
            *self.variants.entry(variant).or_default() += 1;
        }
    }

    pub fn record_pack(&mut self, pack: &Pack) {
        for card in pack.cards() {
            self.record_card(card);
        }
    }

    pub fn count(&self, rarity: Rarity) -> u64 {
        self.rarities.get(&rarity).copied().unwrap_or(0)
    }

    /// Share of recorded cards with `rarity`; zero when empty.
    pub fn frequency(&self, rarity: Rarity) -> f64 {
        ratio(self.count(rarity), self.total)
    }

    pub fn holo_rate(&self) -> f64 {
        ratio(self.holo, self.total)
    }

    /// Share of holo cards with `variant`.
    pub fn variant_frequency(&self, variant: HoloVariant) -> f64 {
        ratio(self.variants.get(&variant).copied().unwrap_or(0), self.holo)
    }
}

fn ratio(n: u64, d: u64) -> f64 {
    if d == 0 {
        0.0
    } else {
        n as f64 / d as f64
    }
}

/// Resolve `slot` `trials` times from a fresh seeded stream, without a
/// catalog.
pub fn sample_slot(slot: &RaritySlot, trials: u64, seed: u64) -> RarityTally {
    let mut rng = SeededRandom::from_seed(seed);
    let mut tally = RarityTally::new();
    for _ in 0..trials {
        if let Some(rarity) = RarityResolver::resolve(slot, rng.next_f64()) {
            tally.record_rarity(rarity);
        }
    }
    tally
}
