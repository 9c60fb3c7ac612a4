//! # Pack Generator
//!
//! Composes the random source, resolvers and selector into one [`Pack`].
//!
//! ## Draw order
//!
//! For each slot, in order:
//!
//! 1. one rarity draw (consumed even for fixed slots),
//! 2. one card draw,
//! 3. one holo draw, plus one variant draw only if the card is holo.
//!
//! This order is what makes a seeded pack reproducible; changing it changes
//! every seeded pack ever generated.

use std::collections::HashSet;

use dd_core::{
    check_batch_size, CardCatalog, CardId, ConfigError, Pack, PackCard, PackConfig, PackType,
    RaritySlot, WeightError,
};

use crate::error::GenerationError;
use crate::random::SeededRandom;
use crate::resolve::{HoloResolver, RarityResolver};
use crate::select::CardSelector;

/// Builds packs against one catalog.
#[derive(Clone, Copy)]
pub struct PackGenerator<'a> {
    catalog: &'a dyn CardCatalog,
}

impl<'a> PackGenerator<'a> {
    pub fn new(catalog: &'a dyn CardCatalog) -> Self {
        Self { catalog }
    }

    /// Generate one pack. The configuration is validated before any draw.
    pub fn generate(&self, config: &PackConfig, seed: Option<u64>) -> Result<Pack, GenerationError> {
        let mut rng = SeededRandom::new(seed);
        config.validate()?;
        let cards = self.draw_cards(config, &mut rng)?;
        let pack = Pack::new(cards, rng.seed());
        tracing::debug!(
            pack = %pack.id(),
            seed = ?pack.seed(),
            cards = pack.len(),
            best = ?pack.best_rarity(),
            holo = pack.holo_count(),
            "generated pack"
        );
        Ok(pack)
    }

    /// Draw the cards of one pack from `rng`. `config` must already be
    /// validated.
    pub fn draw_cards(
        &self,
        config: &PackConfig,
        rng: &mut SeededRandom,
    ) -> Result<Vec<PackCard>, GenerationError> {
        let selector = CardSelector::new(self.catalog);
        let holo = HoloResolver::from_config(config);
        let mut used: HashSet<CardId> = HashSet::with_capacity(config.card_count());
        let mut cards = Vec::with_capacity(config.card_count());

        for (slot, rule) in config.slots.iter().enumerate() {
            let rarity = RarityResolver::resolve(rule, rng.next_f64())
                .ok_or_else(|| unreachable_slot(slot, rule))?;
            let card = selector
                .select(rarity, &used, rng)
                .ok_or(GenerationError::CatalogExhausted { slot, rarity })?;
            used.insert(card.id.clone());
            let roll = holo.resolve(rng);
            cards.push(PackCard::new(card.clone(), roll.variant()));
        }
        Ok(cards)
    }

    /// Generate `count` packs (1 to [`dd_core::MAX_BATCH_SIZE`]). When
    /// seeded, pack `i` uses `seed + i` (wrapping).
    pub fn generate_batch(
        &self,
        config: &PackConfig,
        count: usize,
        seed: Option<u64>,
    ) -> Result<Vec<Pack>, GenerationError> {
        check_batch_size(count)?;
        (0..count as u64)
            .map(|i| self.generate(config, seed.map(|s| s.wrapping_add(i))))
            .collect()
    }

    /// Generate one pack from a preset.
    pub fn generate_pack_type(
        &self,
        pack_type: PackType,
        seed: Option<u64>,
    ) -> Result<Pack, GenerationError> {
        self.generate(&pack_type.config(), seed)
    }
}

// A weighted slot with no positive weight cannot pass `validate()`; report
// it as the configuration error it is rather than panicking.
fn unreachable_slot(slot: usize, rule: &RaritySlot) -> GenerationError {
    let sum = match rule {
        RaritySlot::Weighted(table) => table.total(),
        RaritySlot::Fixed(_) => 1.0,
    };
    GenerationError::Config(ConfigError::SlotWeights {
        slot,
        source: WeightError::BadSum {
            sum,
            epsilon: dd_core::WEIGHT_EPSILON,
        },
    })
}

/// Generate one pack from `config` against `catalog`.
pub fn generate_pack(
    catalog: &dyn CardCatalog,
    config: &PackConfig,
    seed: Option<u64>,
) -> Result<Pack, GenerationError> {
    PackGenerator::new(catalog).generate(config, seed)
}
