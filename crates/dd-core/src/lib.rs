//! # dd-core: Foundational Types for the DadDeck Pack Engine
//!
//! Every other crate in the workspace depends on `dd-core`; it depends on
//! nothing internal. It defines the data model the generator, validator and
//! lifecycle share.
//!
//! ## Key Design Principles
//!
//! 1. **Ordered enums for tiers.** `Rarity` and `HoloVariant` derive `Ord` in
//!    their documented order (common → mythic, standard → prismatic). Weight
//!    tables are `BTreeMap`s keyed by them, so every cumulative walk visits
//!    keys in the same order on every platform.
//!
//! 2. **Structural validation up front.** `PackConfig::validate()` rejects a
//!    malformed configuration before a single random draw is made.
//!
//! 3. **`CanonicalBytes` for digests.** The determinism digest of a pack is
//!    computed over JCS-canonical bytes, never over ad hoc serializations.
//!
//! 4. **UTC-only timestamps** with seconds precision.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `dd-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod card;
pub mod catalog;
pub mod config;
pub mod digest;
pub mod error;
pub mod pack;
pub mod rarity;
pub mod temporal;

pub use canonical::CanonicalBytes;
pub use card::{Card, CardId, CardStats};
pub use catalog::{CardCatalog, InMemoryCatalog};
pub use config::{check_batch_size, PackConfig, PackType, RaritySlot, MAX_BATCH_SIZE};
pub use digest::{sha256_digest, ContentDigest};
pub use error::{CanonicalizationError, CatalogError, ConfigError, CoreError, WeightError};
pub use pack::{Pack, PackCard, PackFingerprint, PackId};
pub use rarity::{HoloVariant, HoloWeights, Rarity, RarityWeights, WeightTable, WEIGHT_EPSILON};
pub use temporal::Timestamp;
