//! # dd-cli: `ddpack` Command-Line Harness
//!
//! A thin clap front end over the engine crates.
//!
//! ## Subcommands
//!
//! - `generate`: one pack or a batch, printed as JSON
//! - `validate`: run the pack validator over pack documents
//! - `simulate`: rarity and holo frequencies over many seeded packs
//! - `open`: take one pack through the lifecycle with timed auto-reveal
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from the handlers.
//! - Handlers delegate to `dd-pack`, `dd-state` and `dd-schema`; no pack
//!   logic lives here.
//! - Handlers return `anyhow::Result`; library errors are wrapped with
//!   context, never unwrapped.

pub mod generate;
pub mod input;
pub mod open;
pub mod simulate;
pub mod validate;
