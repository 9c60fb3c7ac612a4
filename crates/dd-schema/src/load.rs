//! Typed loaders: parse, schema-check, deserialize, then apply the checks
//! the schema cannot express.

use std::fmt;
use std::path::Path;

use dd_core::{Card, InMemoryCatalog, Pack, PackConfig};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::validate::{SchemaError, SchemaValidator, CATALOG_SCHEMA, PACK_CONFIG_SCHEMA, PACK_SCHEMA};

/// Surface syntax of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// `.yaml` and `.yml` are YAML; everything else is read as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "JSON",
            Self::Yaml => "YAML",
        })
    }
}

/// Parse `text` into a JSON value. YAML documents go through the same
/// value model so one set of schemas covers both.
pub fn parse_document(text: &str, format: DocumentFormat) -> Result<Value, SchemaError> {
    let parsed: Result<Value, String> = match format {
        DocumentFormat::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
        DocumentFormat::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
    };
    parsed.map_err(|reason| SchemaError::Parse { format, reason })
}

fn checked<T: DeserializeOwned>(
    value: Value,
    schema_name: &str,
    target: &'static str,
) -> Result<T, SchemaError> {
    SchemaValidator::new()?.validate_document(&value, schema_name)?;
    serde_json::from_value(value).map_err(|e| SchemaError::Deserialize {
        target,
        reason: e.to_string(),
    })
}

/// Load a pack configuration. Weight sums and the other structural rules
/// are checked after the schema passes.
pub fn load_pack_config(text: &str, format: DocumentFormat) -> Result<PackConfig, SchemaError> {
    let config: PackConfig = checked(parse_document(text, format)?, PACK_CONFIG_SCHEMA, "PackConfig")?;
    config.validate()?;
    tracing::debug!(slots = config.card_count(), %format, "loaded pack config");
    Ok(config)
}

/// Load a pack from its JSON form.
pub fn load_pack(text: &str) -> Result<Pack, SchemaError> {
    let pack: Pack = checked(parse_document(text, DocumentFormat::Json)?, PACK_SCHEMA, "Pack")?;
    if pack.has_duplicate_cards() {
        return Err(SchemaError::InvalidPack(format!(
            "{} contains the same card twice",
            pack.id()
        )));
    }
    Ok(pack)
}

#[derive(Deserialize)]
struct CatalogDocument {
    cards: Vec<Card>,
}

/// Load a catalog document (`{"cards": [...]}`). Catalog order is the
/// document order.
pub fn load_catalog(text: &str, format: DocumentFormat) -> Result<InMemoryCatalog, SchemaError> {
    let doc: CatalogDocument = checked(parse_document(text, format)?, CATALOG_SCHEMA, "catalog")?;
    let count = doc.cards.len();
    let catalog = InMemoryCatalog::new(doc.cards)?;
    tracing::debug!(cards = count, %format, "loaded catalog");
    Ok(catalog)
}

fn read(path: &Path) -> Result<String, SchemaError> {
    std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
        path: path.display().to_string(),
        source,
    })
}

pub fn load_pack_config_file(path: &Path) -> Result<PackConfig, SchemaError> {
    load_pack_config(&read(path)?, DocumentFormat::from_path(path))
}

pub fn load_catalog_file(path: &Path) -> Result<InMemoryCatalog, SchemaError> {
    load_catalog(&read(path)?, DocumentFormat::from_path(path))
}

pub fn load_pack_file(path: &Path) -> Result<Pack, SchemaError> {
    load_pack(&read(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dd_core::{CardCatalog, ConfigError, Rarity};

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DocumentFormat::from_path(Path::new("a.yaml")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("a.YML")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("a.json")), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path(Path::new("config")), DocumentFormat::Json);
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = parse_document("{\"slots\": [", DocumentFormat::Json).unwrap_err();
        assert!(matches!(err, SchemaError::Parse { format: DocumentFormat::Json, .. }));
    }

    #[test]
    fn test_weight_sum_checked_after_schema() {
        let text = r#"{
            "slots": [{"weighted": {"common": 0.5, "rare": 0.4}}],
            "holo_chance": 0.1,
            "holo_variants": {"standard": 1.0}
        }"#;
        let err = load_pack_config(text, DocumentFormat::Json).unwrap_err();
        assert!(matches!(err, SchemaError::Config(ConfigError::SlotWeights { slot: 0, .. })));
    }

    #[test]
    fn test_yaml_catalog_keeps_document_order() {
        let text = "
cards:
  - id: rare-002
    name: Grill Master
    rarity: rare
  - id: rare-001
    name: Lawn Whisperer
    rarity: rare
";
        let catalog = load_catalog(text, DocumentFormat::Yaml).unwrap();
        let ids: Vec<&str> = catalog
            .query(Rarity::Rare)
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(ids, vec!["rare-002", "rare-001"]);
    }

    #[test]
    fn test_duplicate_catalog_ids_rejected() {
        let text = r#"{"cards": [
            {"id": "c-1", "name": "A", "rarity": "common"},
            {"id": "c-1", "name": "B", "rarity": "common"}
        ]}"#;
        assert!(matches!(
            load_catalog(text, DocumentFormat::Json),
            Err(SchemaError::Catalog(_))
        ));
    }
}
