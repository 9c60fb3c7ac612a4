//! Errors raised while generating packs.

use dd_core::{ConfigError, Rarity};
use thiserror::Error;

/// Generation failure. Never retried internally.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    /// The configuration (or batch request) is malformed.
    #[error("invalid pack configuration: {0}")]
    Config(#[from] ConfigError),

    /// No unused card of the resolved tier is left in the catalog. The
    /// configuration is well-formed; the catalog is too small for it.
    #[error("catalog exhausted: no unused {rarity} card available for slot {slot}")]
    CatalogExhausted {
        /// Zero-based slot index.
        slot: usize,
        /// Tier the slot resolved to.
        rarity: Rarity,
    },
}
