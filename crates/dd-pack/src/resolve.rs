//! # Rarity and Holo Resolution
//!
//! Both resolvers use the same cumulative walk over a [`WeightTable`] in key
//! order: the first key whose running sum exceeds the draw wins. When float
//! rounding leaves the draw at or above the final sum, the last key with a
//! nonzero weight is returned, so a validated table always yields a key.

use std::fmt;

use dd_core::{HoloVariant, HoloWeights, PackConfig, Rarity, RaritySlot, WeightTable};

use crate::random::SeededRandom;

/// Cumulative-weight walk. `None` only when no key has a positive weight.
pub fn cumulative_pick<K: Ord + Copy + fmt::Display>(table: &WeightTable<K>, draw: f64) -> Option<K> {
    let mut cumulative = 0.0;
    let mut last_nonzero = None;
    for (key, weight) in table.iter() {
        if weight <= 0.0 {
            continue;
        }
        cumulative += weight;
        last_nonzero = Some(key);
        if draw < cumulative {
            return Some(key);
        }
    }
    last_nonzero
}

/// Resolves a slot rule to a concrete tier.
#[derive(Debug, Clone, Copy, Default)]
pub struct RarityResolver;

impl RarityResolver {
    /// Tier for `slot` given `draw`. Fixed slots ignore the draw, but the
    /// caller still consumes it so that stream positions do not depend on
    /// slot kind.
    pub fn resolve(slot: &RaritySlot, draw: f64) -> Option<Rarity> {
        match slot {
            RaritySlot::Fixed(rarity) => Some(*rarity),
            RaritySlot::Weighted(table) => cumulative_pick(table, draw),
        }
    }
}

/// Outcome of a holo roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HoloRoll(Option<HoloVariant>);

impl HoloRoll {
    /// A non-holo card.
    pub const PLAIN: HoloRoll = HoloRoll(None);

    pub fn holo(variant: HoloVariant) -> Self {
        Self(Some(variant))
    }

    pub fn is_holo(&self) -> bool {
        self.0.is_some()
    }

    pub fn variant(&self) -> Option<HoloVariant> {
        self.0
    }
}

/// Decides whether a card is holographic, and which variant.
#[derive(Debug, Clone, Copy)]
pub struct HoloResolver<'a> {
    chance: f64,
    variants: &'a HoloWeights,
}

impl<'a> HoloResolver<'a> {
    pub fn new(chance: f64, variants: &'a HoloWeights) -> Self {
        Self { chance, variants }
    }

    pub fn from_config(config: &'a PackConfig) -> Self {
        Self::new(config.holo_chance, &config.holo_variants)
    }

    /// One draw decides holo (`draw < chance`). Only a holo card consumes a
    /// second draw for the variant.
    pub fn resolve(&self, rng: &mut SeededRandom) -> HoloRoll {
        if rng.next_f64() >= self.chance {
            return HoloRoll::PLAIN;
        }
        let draw = rng.next_f64();
        match cumulative_pick(self.variants, draw) {
            Some(variant) => HoloRoll::holo(variant),
            // Unreachable for validated configs: a holo card without a
            // variant would break the pack invariant.
            None => HoloRoll::PLAIN,
        }
    }
}
