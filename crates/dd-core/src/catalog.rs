//! # Card Catalog
//!
//! Read-only lookup of all available cards, indexed by rarity tier. The
//! generator only needs [`CardCatalog::query`]; the returned slice order is
//! part of the determinism contract, so implementations must return cards in
//! a stable order (load order for [`InMemoryCatalog`]).

use std::collections::{BTreeMap, HashMap};

use crate::card::{Card, CardId, CardStats};
use crate::error::CatalogError;
use crate::rarity::Rarity;

/// Query contract consumed by the pack engine.
pub trait CardCatalog {
    /// All cards of `rarity`, in stable order. Empty when the tier has none.
    fn query(&self, rarity: Rarity) -> &[Card];

    /// Look up a card by id.
    fn get(&self, id: &CardId) -> Option<&Card> {
        Rarity::ALL
            .iter()
            .flat_map(|r| self.query(*r).iter())
            .find(|c| &c.id == id)
    }

    /// Total number of cards across all tiers.
    fn card_count(&self) -> usize {
        Rarity::ALL.iter().map(|r| self.query(*r).len()).sum()
    }
}

/// Catalog held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    by_rarity: BTreeMap<Rarity, Vec<Card>>,
    index: HashMap<CardId, (Rarity, usize)>,
}

impl InMemoryCatalog {
    /// Build a catalog, rejecting duplicate ids and out-of-range stats.
    pub fn new(cards: impl IntoIterator<Item = Card>) -> Result<Self, CatalogError> {
        let mut catalog = Self::default();
        for card in cards {
            card.check()?;
            if catalog.index.contains_key(&card.id) {
                return Err(CatalogError::DuplicateCardId(card.id));
            }
            let pool = catalog.by_rarity.entry(card.rarity).or_default();
            catalog
                .index
                .insert(card.id.clone(), (card.rarity, pool.len()));
            pool.push(card);
        }
        Ok(catalog)
    }

    /// Deterministic placeholder catalog with `per_tier` cards in every
    /// tier. Ids look like `rare-007`.
    pub fn synthetic(per_tier: usize) -> Self {
        let mut catalog = Self::default();
        for rarity in Rarity::ALL {
            let pool: Vec<Card> = (0..per_tier)
                .map(|n| synthetic_card(rarity, n))
                .collect();
            for (pos, card) in pool.iter().enumerate() {
                catalog.index.insert(card.id.clone(), (rarity, pos));
            }
            catalog.by_rarity.insert(rarity, pool);
        }
        catalog
    }

    /// Cards of `rarity` matching `predicate`, in catalog order.
    pub fn filter<'a>(
        &'a self,
        rarity: Rarity,
        predicate: impl Fn(&Card) -> bool + 'a,
    ) -> impl Iterator<Item = &'a Card> + 'a {
        self.query(rarity).iter().filter(move |c| predicate(*c))
    }

    /// Every card, tier by tier.
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.by_rarity.values().flat_map(|pool| pool.iter())
    }
}

impl CardCatalog for InMemoryCatalog {
    fn query(&self, rarity: Rarity) -> &[Card] {
        self.by_rarity
            .get(&rarity)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn get(&self, id: &CardId) -> Option<&Card> {
        let (rarity, pos) = self.index.get(id)?;
        self.by_rarity.get(rarity)?.get(*pos)
    }

    fn card_count(&self) -> usize {
        self.index.len()
    }
}

fn synthetic_card(rarity: Rarity, n: usize) -> Card {
    let tier = rarity.index();
    // Spread stats over 0..=100 with a fixed stride; higher tiers skew up.
    let stat = |k: usize| ((n * 37 + k * 11 + tier * 13) % 81 + tier * 4) as u8;
    Card::new(
        format!("{rarity}-{n:03}"),
        format!("{} Dad #{}", capitalize(rarity.as_str()), n + 1),
        rarity,
    )
    .with_stats(CardStats {
        dad_joke: stat(0),
        grill_skill: stat(1),
        fix_it: stat(2),
        nap_power: stat(3),
        remote_control: stat(4),
        thermostat: stat(5),
        sock_sandal: stat(6),
        beer_snob: stat(7),
    })
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
