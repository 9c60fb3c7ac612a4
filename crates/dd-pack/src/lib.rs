//! # dd-pack: Pack Generation and Validation
//!
//! The algorithmic heart of the engine:
//!
//! - [`random`]: `SeededRandom`, the reproducible float stream.
//! - [`resolve`]: `RarityResolver` and `HoloResolver`, both cumulative
//!   weight walks in fixed key order.
//! - [`select`]: `CardSelector`, one unused card from a tier.
//! - [`generator`]: `PackGenerator`, the orchestrator, plus batch and
//!   preset helpers.
//! - [`validation`]: `PackValidator`, the four post-generation checks.
//! - [`stats`]: frequency tallies for simulation.
//!
//! ## Determinism
//!
//! A seeded pack is a pure function of `(seed, config, catalog order)`. The
//! validator's entropy check relies on this by regenerating the pack and
//! comparing content digests.

pub mod error;
pub mod generator;
pub mod random;
pub mod resolve;
pub mod select;
pub mod stats;
pub mod validation;

pub use error::GenerationError;
pub use generator::{generate_pack, PackGenerator};
pub use random::SeededRandom;
pub use resolve::{cumulative_pick, HoloResolver, HoloRoll, RarityResolver};
pub use select::CardSelector;
pub use stats::{sample_slot, RarityTally};
pub use validation::{
    binomial_upper_tail, rarity_likelihood, validate_pack, AnomalyThresholds, FingerprintHistory,
    PackValidator, Severity, ValidationContext, ValidationResult, Violation, ViolationKind,
    DEFAULT_HISTORY_CAPACITY,
};
