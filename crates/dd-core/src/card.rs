//! # Catalog Cards
//!
//! A [`Card`] is an immutable catalog entry. The engine only looks at its id
//! and rarity; name, stats, flavor text and art reference are payload carried
//! through to the pack.

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::rarity::Rarity;

/// Unique catalog identifier of a card.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub String);

impl CardId {
    /// Wrap a string identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Access the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CardId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The eight numeric attributes every card carries, each in `0..=100`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardStats {
    pub dad_joke: u8,
    pub grill_skill: u8,
    pub fix_it: u8,
    pub nap_power: u8,
    pub remote_control: u8,
    pub thermostat: u8,
    pub sock_sandal: u8,
    pub beer_snob: u8,
}

impl CardStats {
    /// Upper bound of every attribute.
    pub const MAX: u8 = 100;

    /// Attribute names paired with values, in declaration order.
    pub fn entries(&self) -> [(&'static str, u8); 8] {
        [
            ("dad_joke", self.dad_joke),
            ("grill_skill", self.grill_skill),
            ("fix_it", self.fix_it),
            ("nap_power", self.nap_power),
            ("remote_control", self.remote_control),
            ("thermostat", self.thermostat),
            ("sock_sandal", self.sock_sandal),
            ("beer_snob", self.beer_snob),
        ]
    }

    /// Sum of all attributes.
    pub fn total(&self) -> u32 {
        self.entries().iter().map(|(_, v)| u32::from(*v)).sum()
    }
}

/// Immutable catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    /// Unique identifier.
    pub id: CardId,
    /// Display name.
    pub name: String,
    /// Rarity tier; selects the draw pool.
    pub rarity: Rarity,
    /// Numeric attributes.
    #[serde(default)]
    pub stats: CardStats,
    /// Flavor text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flavor: Option<String>,
    /// Art asset reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub art: Option<String>,
}

impl Card {
    /// Build a card with default stats and no metadata.
    pub fn new(id: impl Into<String>, name: impl Into<String>, rarity: Rarity) -> Self {
        Self {
            id: CardId::new(id),
            name: name.into(),
            rarity,
            stats: CardStats::default(),
            flavor: None,
            art: None,
        }
    }

    /// Replace the stats block.
    pub fn with_stats(mut self, stats: CardStats) -> Self {
        self.stats = stats;
        self
    }

    /// Check catalog invariants on this card: non-empty id and every
    /// attribute within `0..=100`.
    pub fn check(&self) -> Result<(), CatalogError> {
        if self.id.0.is_empty() {
            return Err(CatalogError::EmptyCardId);
        }
        for (attribute, value) in self.stats.entries() {
            if value > CardStats::MAX {
                return Err(CatalogError::StatOutOfRange {
                    card: self.id.clone(),
                    attribute,
                    value,
                });
            }
        }
        Ok(())
    }
}
