//! # Generated Packs
//!
//! A [`Pack`] is created once by the generator. Afterwards only the
//! per-card `is_revealed` flags change, and only through the lifecycle,
//! which hands out shared references to everyone else.
//!
//! ## Digests
//!
//! - [`Pack::fingerprint()`] identifies the card-id multiset regardless of
//!   order. Used for duplicate-pack detection.
//! - [`Pack::content_digest()`] covers the ordered `(card, is_holo, variant)`
//!   entries, full card payload included: exactly what a seed reproduces.
//!   Pack id, timestamp and reveal flags are excluded.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::canonical::CanonicalBytes;
use crate::card::{Card, CardId};
use crate::digest::{sha256_digest, ContentDigest};
use crate::error::CanonicalizationError;
use crate::rarity::{HoloVariant, Rarity};
use crate::temporal::Timestamp;

/// Unique identifier of a generated pack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackId(pub Uuid);

impl PackId {
    /// Generate a new random pack identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PackId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pack:{}", self.0)
    }
}

/// Order-independent identifier of a pack's card-id multiset (hex SHA-256).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackFingerprint(pub String);

impl std::fmt::Display for PackFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A catalog card as it appears inside a pack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackCard {
    /// The drawn catalog card.
    pub card: Card,
    /// Whether the card rolled holographic.
    pub is_holo: bool,
    /// Variant, present iff `is_holo`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holo_variant: Option<HoloVariant>,
    /// Set by the lifecycle when the card is flipped.
    #[serde(default)]
    pub is_revealed: bool,
}

impl PackCard {
    /// Unrevealed pack card; `holo` is the resolved variant, if any.
    pub fn new(card: Card, holo: Option<HoloVariant>) -> Self {
        Self {
            card,
            is_holo: holo.is_some(),
            holo_variant: holo,
            is_revealed: false,
        }
    }

    /// Catalog id of the underlying card.
    pub fn id(&self) -> &CardId {
        &self.card.id
    }

    /// Rarity of the underlying card.
    pub fn rarity(&self) -> Rarity {
        self.card.rarity
    }
}

#[derive(Serialize)]
struct ContentEntry<'a> {
    card: &'a Card,
    is_holo: bool,
    holo_variant: Option<HoloVariant>,
}

/// One generated pack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pack {
    id: PackId,
    cards: Vec<PackCard>,
    created_at: Timestamp,
    /// `None` means the pack was generated from entropy and is not
    /// reproducible.
    seed: Option<u64>,
}

impl Pack {
    /// Fresh pack with a new id and the current time.
    pub fn new(cards: Vec<PackCard>, seed: Option<u64>) -> Self {
        Self::from_parts(PackId::new(), cards, Timestamp::now(), seed)
    }

    /// Reassemble a pack from stored parts.
    pub fn from_parts(
        id: PackId,
        cards: Vec<PackCard>,
        created_at: Timestamp,
        seed: Option<u64>,
    ) -> Self {
        Self {
            id,
            cards,
            created_at,
            seed,
        }
    }

    pub fn id(&self) -> PackId {
        self.id
    }

    pub fn cards(&self) -> &[PackCard] {
        &self.cards
    }

    pub fn card(&self, index: usize) -> Option<&PackCard> {
        self.cards.get(index)
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Card ids in pack order.
    pub fn card_ids(&self) -> impl Iterator<Item = &CardId> {
        self.cards.iter().map(PackCard::id)
    }

    /// Whether two entries share a catalog id. Always false for generated
    /// packs; a true result on a received pack means tampering.
    pub fn has_duplicate_cards(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.cards.len());
        !self.card_ids().all(|id| seen.insert(id))
    }

    /// Highest tier in the pack (the "best pull").
    pub fn best_rarity(&self) -> Option<Rarity> {
        self.cards.iter().map(PackCard::rarity).max()
    }

    /// Number of holographic cards.
    pub fn holo_count(&self) -> usize {
        self.cards.iter().filter(|c| c.is_holo).count()
    }

    /// Number of revealed cards.
    pub fn revealed_count(&self) -> usize {
        self.cards.iter().filter(|c| c.is_revealed).count()
    }

    /// Whether every card has been revealed.
    pub fn is_fully_revealed(&self) -> bool {
        self.cards.iter().all(|c| c.is_revealed)
    }

    /// Whether the card at `index` is revealed. `None` when out of range.
    pub fn is_revealed(&self, index: usize) -> Option<bool> {
        self.cards.get(index).map(|c| c.is_revealed)
    }

    /// Lowest index that is still face down.
    pub fn next_unrevealed(&self) -> Option<usize> {
        self.cards.iter().position(|c| !c.is_revealed)
    }

    /// Flip the card at `index`. Returns `false` if the index is out of
    /// range or the card was already revealed; the flag is untouched then.
    pub fn mark_revealed(&mut self, index: usize) -> bool {
        match self.cards.get_mut(index) {
            Some(card) if !card.is_revealed => {
                card.is_revealed = true;
                true
            }
            _ => false,
        }
    }

    /// Order-independent fingerprint of the card-id multiset.
    ///
    /// SHA-256 over the sorted ids, each prefixed by its byte length as a
    /// big-endian `u64` so that no two distinct multisets share an input.
    pub fn fingerprint(&self) -> PackFingerprint {
        let mut ids: Vec<&str> = self.card_ids().map(CardId::as_str).collect();
        ids.sort_unstable();
        let mut hasher = Sha256::new();
        for id in ids {
            hasher.update((id.len() as u64).to_be_bytes());
            hasher.update(id.as_bytes());
        }
        let hash = hasher.finalize();
        PackFingerprint(hash.iter().map(|b| format!("{b:02x}")).collect())
    }

    /// Digest of the determinism-relevant content.
    pub fn content_digest(&self) -> Result<ContentDigest, CanonicalizationError> {
        let entries: Vec<ContentEntry<'_>> = self
            .cards
            .iter()
            .map(|c| ContentEntry {
                card: &c.card,
                is_holo: c.is_holo,
                holo_variant: c.holo_variant,
            })
            .collect();
        Ok(sha256_digest(&CanonicalBytes::new(&entries)?))
    }
}
