//! Where the configuration and catalog come from.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use dd_core::{InMemoryCatalog, PackConfig, PackType};

/// Arguments shared by every subcommand that needs a config and catalog.
#[derive(Args, Debug, Clone)]
pub struct PackSource {
    /// Preset used when no config file is given.
    #[arg(long, default_value = "standard", value_parser = parse_pack_type)]
    pub pack_type: PackType,

    /// Pack configuration document (JSON, or YAML by extension).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Catalog document. Defaults to a synthetic catalog.
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Cards per tier in the synthetic catalog.
    #[arg(long, default_value_t = 20)]
    pub synthetic_per_tier: usize,
}

impl PackSource {
    pub fn load_config(&self) -> anyhow::Result<PackConfig> {
        match &self.config {
            Some(path) => dd_schema::load_pack_config_file(path)
                .with_context(|| format!("loading pack config {}", path.display())),
            None => Ok(self.pack_type.config()),
        }
    }

    pub fn load_catalog(&self) -> anyhow::Result<InMemoryCatalog> {
        match &self.catalog {
            Some(path) => dd_schema::load_catalog_file(path)
                .with_context(|| format!("loading catalog {}", path.display())),
            None => Ok(InMemoryCatalog::synthetic(self.synthetic_per_tier)),
        }
    }
}

impl Default for PackSource {
    fn default() -> Self {
        Self {
            pack_type: PackType::Standard,
            config: None,
            catalog: None,
            synthetic_per_tier: 20,
        }
    }
}

pub fn parse_pack_type(s: &str) -> Result<PackType, String> {
    [PackType::Standard, PackType::Premium]
        .into_iter()
        .find(|t| t.as_str().eq_ignore_ascii_case(s))
        .ok_or_else(|| format!("unknown pack type {s:?} (expected standard or premium)"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pack_type() {
        assert_eq!(parse_pack_type("premium"), Ok(PackType::Premium));
        assert_eq!(parse_pack_type("Standard"), Ok(PackType::Standard));
        assert!(parse_pack_type("deluxe").is_err());
    }

    #[test]
    fn test_defaults_use_preset_and_synthetic_catalog() {
        let source = PackSource::default();
        assert_eq!(source.load_config().unwrap(), PackConfig::standard());
        assert_eq!(
            dd_core::CardCatalog::card_count(&source.load_catalog().unwrap()),
            120
        );
    }
}
