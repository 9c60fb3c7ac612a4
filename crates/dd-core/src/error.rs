//! # Error Types
//!
//! Structured errors for the foundational layer. All errors use `thiserror`
//! for derive-based `Display` and `Error` implementations.
//!
//! - Configuration errors name the offending slot and the offending value.
//! - Catalog errors name the offending card.
//! - Nothing here is retried; every error is a precondition failure the
//!   caller must fix.

use thiserror::Error;

use crate::card::CardId;

/// Top-level error type for `dd-core`.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// Pack configuration is malformed.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Catalog data is malformed.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// A timestamp could not be parsed.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// A weight table failed its structural check.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WeightError {
    /// The table has no entries.
    #[error("weight table is empty")]
    Empty,

    /// A weight is negative, NaN or infinite.
    #[error("weight for {key} must be finite and non-negative, got {weight}")]
    InvalidWeight {
        /// Key carrying the bad weight.
        key: String,
        /// The offending weight.
        weight: f64,
    },

    /// Weights do not sum to 1 within tolerance.
    #[error("weights must sum to 1.0 (±{epsilon}), got {sum}")]
    BadSum {
        /// Actual sum.
        sum: f64,
        /// Tolerance applied.
        epsilon: f64,
    },
}

/// Malformed `PackConfig` or generation request.
///
/// Fatal and never retried: the caller must fix the configuration before
/// generation is attempted again.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The pack template has no slots.
    #[error("pack config must contain at least one slot")]
    NoSlots,

    /// A probabilistic slot has a bad weight table.
    #[error("slot {slot}: {source}")]
    SlotWeights {
        /// Zero-based slot index.
        slot: usize,
        /// Underlying weight-table error.
        #[source]
        source: WeightError,
    },

    /// Holo chance is outside `[0, 1]` or not finite.
    #[error("holo chance must be within [0, 1], got {0}")]
    HoloChanceOutOfRange(f64),

    /// Holo variant table is malformed while holo cards are possible.
    #[error("holo variants: {0}")]
    HoloVariants(#[source] WeightError),

    /// Batch size outside the supported range.
    #[error("batch size must be between 1 and {max}, got {requested}")]
    BatchSize {
        /// Requested pack count.
        requested: usize,
        /// Maximum supported pack count.
        max: usize,
    },
}

/// Malformed catalog contents.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Two cards share an id.
    #[error("duplicate card id {0}")]
    DuplicateCardId(CardId),

    /// A card attribute exceeds 100.
    #[error("card {card}: attribute {attribute} is {value}, maximum is 100")]
    StatOutOfRange {
        /// Offending card.
        card: CardId,
        /// Attribute name.
        attribute: &'static str,
        /// Offending value.
        value: u8,
    },

    /// A card has an empty id.
    #[error("card ids must not be empty")]
    EmptyCardId,
}
