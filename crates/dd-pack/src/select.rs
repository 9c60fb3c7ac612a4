//! Card selection within one resolved tier.

use std::collections::HashSet;

use dd_core::{Card, CardCatalog, CardId, Rarity};

use crate::random::SeededRandom;

/// Draws one unused card of a given tier.
#[derive(Clone, Copy)]
pub struct CardSelector<'a> {
    catalog: &'a dyn CardCatalog,
}

impl<'a> CardSelector<'a> {
    pub fn new(catalog: &'a dyn CardCatalog) -> Self {
        Self { catalog }
    }

    /// Cards of `rarity` not in `used`, in catalog order.
    pub fn eligible<'s>(
        &self,
        rarity: Rarity,
        used: &'s HashSet<CardId>,
    ) -> impl Iterator<Item = &'a Card> + 's
    where
        'a: 's,
    {
        let catalog: &'a dyn CardCatalog = self.catalog;
        catalog
            .query(rarity)
            .iter()
            .filter(move |card| !used.contains(&card.id))
    }

    /// Consumes one draw and picks index `floor(draw * n)` (clamped) from the
    /// eligible pool. `None` when the pool is empty; no draw is taken then.
    ///
    /// `used` is not modified; the caller records the chosen id.
    pub fn select(
        &self,
        rarity: Rarity,
        used: &HashSet<CardId>,
        rng: &mut SeededRandom,
    ) -> Option<&'a Card> {
        let pool_size = self.eligible(rarity, used).count();
        if pool_size == 0 {
            return None;
        }
        let draw = rng.next_f64();
        let index = ((draw * pool_size as f64).floor() as usize).min(pool_size - 1);
        self.eligible(rarity, used).nth(index)
    }
}
