//! # Pack Configuration
//!
//! A [`PackConfig`] is the only externally authored input to generation
//! besides the optional seed. It is plain data:
//!
//! ```yaml
//! name: standard
//! slots:
//!   - fixed: common
//!   - weighted: { rare: 0.88, epic: 0.10, legendary: 0.019, mythic: 0.001 }
//! holo_chance: 0.1666667
//! holo_variants: { standard: 0.5, reverse: 0.3, full_art: 0.15, prismatic: 0.05 }
//! ```
//!
//! [`PackConfig::validate()`] is the structural gate. The generator calls it
//! before drawing any randomness, so a weight table that does not sum to 1.0
//! is reported once as a configuration error rather than per draw.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::rarity::{HoloVariant, HoloWeights, Rarity, RarityWeights};

/// Largest number of packs one batch request may generate.
pub const MAX_BATCH_SIZE: usize = 10;

/// One position in a pack template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaritySlot {
    /// Guaranteed tier.
    Fixed(Rarity),
    /// Tier drawn from a probability table.
    Weighted(RarityWeights),
}

impl RaritySlot {
    /// Whether the slot has a guaranteed tier.
    pub fn is_fixed(&self) -> bool {
        matches!(self, Self::Fixed(_))
    }

    /// Probability of `rarity` landing in this slot.
    pub fn probability(&self, rarity: Rarity) -> f64 {
        match self {
            Self::Fixed(r) if *r == rarity => 1.0,
            Self::Fixed(_) => 0.0,
            Self::Weighted(table) => table.weight(rarity),
        }
    }

    /// Whether `rarity` is legally reachable from this slot.
    pub fn allows(&self, rarity: Rarity) -> bool {
        self.probability(rarity) > 0.0
    }
}

/// Template for one pack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackConfig {
    /// Display name, e.g. `standard`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Ordered slots; the length is the number of cards per pack.
    pub slots: Vec<RaritySlot>,
    /// Independent per-card probability of a holo variant.
    pub holo_chance: f64,
    /// Variant weights, consulted only for holo cards.
    pub holo_variants: HoloWeights,
}

impl PackConfig {
    /// Number of cards a pack built from this template contains.
    pub fn card_count(&self) -> usize {
        self.slots.len()
    }

    /// Structural validation: at least one slot, every weighted slot sums to
    /// 1.0 within tolerance with finite non-negative weights, holo chance in
    /// `[0, 1]`, and a well-formed variant table whenever holo is possible.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slots.is_empty() {
            return Err(ConfigError::NoSlots);
        }
        for (slot, rule) in self.slots.iter().enumerate() {
            if let RaritySlot::Weighted(table) = rule {
                table
                    .check()
                    .map_err(|source| ConfigError::SlotWeights { slot, source })?;
            }
        }
        if !self.holo_chance.is_finite() || !(0.0..=1.0).contains(&self.holo_chance) {
            return Err(ConfigError::HoloChanceOutOfRange(self.holo_chance));
        }
        if self.holo_chance > 0.0 {
            self.holo_variants
                .check()
                .map_err(ConfigError::HoloVariants)?;
        }
        Ok(())
    }

    /// Preset for a named pack type.
    pub fn preset(pack_type: PackType) -> Self {
        match pack_type {
            PackType::Standard => Self::standard(),
            PackType::Premium => Self::premium(),
        }
    }

    /// Six cards: three guaranteed commons, two mid slots, one rare-or-better.
    pub fn standard() -> Self {
        let mut slots = vec![RaritySlot::Fixed(Rarity::Common); 3];
        slots.push(RaritySlot::Weighted(RarityWeights::from_pairs([
            (Rarity::Uncommon, 0.74),
            (Rarity::Rare, 0.20),
            (Rarity::Epic, 0.05),
            (Rarity::Legendary, 0.009),
            (Rarity::Mythic, 0.001),
        ])));
        slots.push(RaritySlot::Weighted(RarityWeights::from_pairs([
            (Rarity::Uncommon, 0.65),
            (Rarity::Rare, 0.25),
            (Rarity::Epic, 0.08),
            (Rarity::Legendary, 0.018),
            (Rarity::Mythic, 0.002),
        ])));
        slots.push(RaritySlot::Weighted(RarityWeights::from_pairs([
            (Rarity::Rare, 0.88),
            (Rarity::Epic, 0.10),
            (Rarity::Legendary, 0.019),
            (Rarity::Mythic, 0.001),
        ])));
        Self {
            name: Some(PackType::Standard.to_string()),
            slots,
            holo_chance: 1.0 / 6.0,
            holo_variants: Self::default_holo_variants(),
        }
    }

    /// Six cards with no commons and an epic-or-better final slot.
    pub fn premium() -> Self {
        let rare_heavy = RaritySlot::Weighted(RarityWeights::from_pairs([
            (Rarity::Rare, 0.70),
            (Rarity::Epic, 0.22),
            (Rarity::Legendary, 0.07),
            (Rarity::Mythic, 0.01),
        ]));
        let slots = vec![
            RaritySlot::Fixed(Rarity::Uncommon),
            RaritySlot::Fixed(Rarity::Uncommon),
            rare_heavy.clone(),
            rare_heavy,
            RaritySlot::Fixed(Rarity::Rare),
            RaritySlot::Weighted(RarityWeights::from_pairs([
                (Rarity::Epic, 0.70),
                (Rarity::Legendary, 0.25),
                (Rarity::Mythic, 0.05),
            ])),
        ];
        Self {
            name: Some(PackType::Premium.to_string()),
            slots,
            holo_chance: 1.0 / 3.0,
            holo_variants: Self::default_holo_variants(),
        }
    }

    /// Variant weights shared by the presets.
    pub fn default_holo_variants() -> HoloWeights {
        HoloWeights::from_pairs([
            (HoloVariant::Standard, 0.50),
            (HoloVariant::Reverse, 0.30),
            (HoloVariant::FullArt, 0.15),
            (HoloVariant::Prismatic, 0.05),
        ])
    }
}

/// Check a batch request size against [`MAX_BATCH_SIZE`].
pub fn check_batch_size(requested: usize) -> Result<(), ConfigError> {
    if requested == 0 || requested > MAX_BATCH_SIZE {
        return Err(ConfigError::BatchSize {
            requested,
            max: MAX_BATCH_SIZE,
        });
    }
    Ok(())
}

/// Named pack product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackType {
    /// Everyday booster.
    Standard,
    /// Higher floor, better odds.
    Premium,
}

impl PackType {
    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Premium => "premium",
        }
    }

    /// Preset configuration for this pack type.
    pub fn config(&self) -> PackConfig {
        PackConfig::preset(*self)
    }
}

impl fmt::Display for PackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Self::Standard),
            "premium" => Ok(Self::Premium),
            other => Err(format!("unknown pack type {other:?} (expected standard or premium)")),
        }
    }
}
