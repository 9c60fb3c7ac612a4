//! # Rarity Tiers, Holo Variants and Weight Tables
//!
//! Both enums derive `Ord` in their documented order. That order is the
//! tie-break rule for every cumulative-weight walk in the engine:
//!
//! ```text
//! Rarity:      common < uncommon < rare < epic < legendary < mythic
//! HoloVariant: standard < reverse < full_art < prismatic
//! ```
//!
//! A [`WeightTable`] is a `BTreeMap` keyed by one of these enums, so
//! iteration always follows the order above regardless of how the table was
//! authored or deserialized.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WeightError;

/// Tolerance applied when checking that a weight table sums to 1.0.
pub const WEIGHT_EPSILON: f64 = 1e-6;

/// Card rarity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    /// Most frequent tier.
    Common,
    /// Second tier.
    Uncommon,
    /// Third tier.
    Rare,
    /// Fourth tier.
    Epic,
    /// Fifth tier.
    Legendary,
    /// Rarest tier.
    Mythic,
}

impl Rarity {
    /// All tiers in walk order.
    pub const ALL: [Rarity; 6] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
        Rarity::Mythic,
    ];

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Uncommon => "uncommon",
            Self::Rare => "rare",
            Self::Epic => "epic",
            Self::Legendary => "legendary",
            Self::Mythic => "mythic",
        }
    }

    /// Zero-based position in walk order.
    pub fn index(&self) -> usize {
        match self {
            Self::Common => 0,
            Self::Uncommon => 1,
            Self::Rare => 2,
            Self::Epic => 3,
            Self::Legendary => 4,
            Self::Mythic => 5,
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rarity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rarity::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| format!("unknown rarity {s:?}"))
    }
}

/// Cosmetic holographic overlay applied to a drawn card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoloVariant {
    /// Plain holographic foil.
    Standard,
    /// Reverse foil: background shines, art does not.
    Reverse,
    /// Full-art foil.
    FullArt,
    /// Prismatic rainbow foil.
    Prismatic,
}

impl HoloVariant {
    /// All variants in walk order.
    pub const ALL: [HoloVariant; 4] = [
        HoloVariant::Standard,
        HoloVariant::Reverse,
        HoloVariant::FullArt,
        HoloVariant::Prismatic,
    ];

    /// Canonical snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Reverse => "reverse",
            Self::FullArt => "full_art",
            Self::Prismatic => "prismatic",
        }
    }
}

impl fmt::Display for HoloVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A probability table over an ordered key set.
///
/// Serialized transparently as a map, e.g. `{"rare": 0.9, "epic": 0.1}`.
/// Missing keys have weight zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightTable<K: Ord>(BTreeMap<K, f64>);

/// Weight table over rarity tiers.
pub type RarityWeights = WeightTable<Rarity>;

/// Weight table over holo variants.
pub type HoloWeights = WeightTable<HoloVariant>;

impl<K: Ord + Copy + fmt::Display> WeightTable<K> {
    /// Build a table from `(key, weight)` pairs. Later duplicates overwrite
    /// earlier ones.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (K, f64)>) -> Self {
        Self(pairs.into_iter().collect())
    }

    /// Weight of `key`, zero when absent.
    pub fn weight(&self, key: K) -> f64 {
        self.0.get(&key).copied().unwrap_or(0.0)
    }

    /// Whether `key` can ever be drawn from this table.
    pub fn is_reachable(&self, key: K) -> bool {
        self.weight(key) > 0.0
    }

    /// Sum of all weights.
    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (K, f64)> + '_ {
        self.0.iter().map(|(k, w)| (*k, *w))
    }

    /// Number of entries (including zero-weight ones).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Structural check: non-empty, every weight finite and non-negative,
    /// sum equal to 1.0 within [`WEIGHT_EPSILON`].
    pub fn check(&self) -> Result<(), WeightError> {
        if self.0.is_empty() {
            return Err(WeightError::Empty);
        }
        for (key, weight) in self.iter() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(WeightError::InvalidWeight {
                    key: key.to_string(),
                    weight,
                });
            }
        }
        let sum = self.total();
        if (sum - 1.0).abs() > WEIGHT_EPSILON {
            return Err(WeightError::BadSum {
                sum,
                epsilon: WEIGHT_EPSILON,
            });
        }
        Ok(())
    }
}
