//! # Schema Validation
//!
//! Runtime validation of documents against the embedded JSON Schemas
//! (Draft 2020-12).
//!
//! Schema validation is a trust boundary. A document that fails is rejected
//! with every violation listed, each carrying the JSON pointer of the
//! offending field and the schema keyword that rejected it.
//!
//! All schemas are compiled into the binary with `include_str!` and are
//! self-contained (internal `#/$defs/...` references only), so no retriever
//! or network access is involved.

use std::collections::BTreeMap;
use std::fmt;

use dd_core::{CatalogError, ConfigError};
use jsonschema::Validator;
use serde_json::Value;
use thiserror::Error;

use crate::load::DocumentFormat;

/// Schema for [`dd_core::PackConfig`] documents.
pub const PACK_CONFIG_SCHEMA: &str = "pack-config.schema.json";
/// Schema for [`dd_core::Pack`] documents.
pub const PACK_SCHEMA: &str = "pack.schema.json";
/// Schema for catalog documents (`{"cards": [...]}`).
pub const CATALOG_SCHEMA: &str = "catalog.schema.json";

const EMBEDDED: [(&str, &str); 3] = [
    (
        PACK_CONFIG_SCHEMA,
        include_str!("../schemas/pack-config.schema.json"),
    ),
    (PACK_SCHEMA, include_str!("../schemas/pack.schema.json")),
    (CATALOG_SCHEMA, include_str!("../schemas/catalog.schema.json")),
];

/// Error at the document boundary.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The document did not conform to the schema.
    #[error("validation failed against schema '{schema_name}':\n{violations}")]
    ValidationFailed {
        schema_name: String,
        violations: ValidationViolations,
    },

    /// An embedded schema is not valid JSON.
    #[error("schema load error for '{schema_name}': {reason}")]
    SchemaLoad { schema_name: String, reason: String },

    /// A schema could not be compiled.
    #[error("validator build error for schema '{schema_name}': {reason}")]
    ValidatorBuild { schema_name: String, reason: String },

    /// The document is not well-formed JSON or YAML.
    #[error("invalid {format} document: {reason}")]
    Parse {
        format: DocumentFormat,
        reason: String,
    },

    /// The document passed the schema but does not map onto the target type.
    #[error("document does not deserialize as {target}: {reason}")]
    Deserialize {
        target: &'static str,
        reason: String,
    },

    /// Well-formed configuration with inconsistent weights.
    #[error("invalid pack configuration: {0}")]
    Config(#[from] ConfigError),

    /// Well-formed catalog with duplicate ids or bad stats.
    #[error("invalid catalog: {0}")]
    Catalog(#[from] CatalogError),

    /// Well-formed pack that breaks a pack invariant.
    #[error("invalid pack: {0}")]
    InvalidPack(String),

    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl SchemaError {
    /// Schema violations, when this is a validation failure.
    pub fn violations(&self) -> Option<&[Violation]> {
        match self {
            Self::ValidationFailed { violations, .. } => Some(violations.violations()),
            _ => None,
        }
    }
}

/// A single validation violation with structured context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer path to the violating field in the instance.
    pub instance_path: String,
    /// JSON Pointer path within the schema that triggered the error.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// Collection of validation violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// Validator over the embedded schemas.
#[derive(Debug, Clone)]
pub struct SchemaValidator {
    schemas: BTreeMap<&'static str, Value>,
}

impl SchemaValidator {
    /// Parse every embedded schema.
    pub fn new() -> Result<Self, SchemaError> {
        let mut schemas = BTreeMap::new();
        for (name, text) in EMBEDDED {
            let value: Value =
                serde_json::from_str(text).map_err(|e| SchemaError::SchemaLoad {
                    schema_name: name.to_string(),
                    reason: format!("invalid JSON: {e}"),
                })?;
            schemas.insert(name, value);
        }
        Ok(Self { schemas })
    }

    /// Names of all embedded schemas, sorted.
    pub fn schema_names(&self) -> Vec<&'static str> {
        self.schemas.keys().copied().collect()
    }

    pub fn get_schema(&self, name: &str) -> Option<&Value> {
        self.schemas.get(name)
    }

    /// Compile the named schema.
    pub fn build_validator(&self, schema_name: &str) -> Result<Validator, SchemaError> {
        let schema = self
            .schemas
            .get(schema_name)
            .ok_or_else(|| SchemaError::SchemaLoad {
                schema_name: schema_name.to_string(),
                reason: "no such embedded schema".to_string(),
            })?;

        let mut opts = jsonschema::options();
        opts.with_draft(jsonschema::Draft::Draft202012);
        opts.build(schema).map_err(|e| SchemaError::ValidatorBuild {
            schema_name: schema_name.to_string(),
            reason: e.to_string(),
        })
    }

    /// Validate `instance` against the named schema, collecting every
    /// violation.
    pub fn validate_document(&self, instance: &Value, schema_name: &str) -> Result<(), SchemaError> {
        let validator = self.build_validator(schema_name)?;

        let errors: Vec<Violation> = validator
            .iter_errors(instance)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            tracing::debug!(schema = schema_name, count = errors.len(), "document rejected");
            Err(SchemaError::ValidationFailed {
                schema_name: schema_name.to_string(),
                violations: ValidationViolations { violations: errors },
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_embedded_schemas_compile() {
        let validator = SchemaValidator::new().unwrap();
        assert_eq!(
            validator.schema_names(),
            vec![CATALOG_SCHEMA, PACK_CONFIG_SCHEMA, PACK_SCHEMA]
        );
        for name in validator.schema_names() {
            validator.build_validator(name).unwrap();
        }
    }

    #[test]
    fn test_unknown_schema_is_load_error() {
        let validator = SchemaValidator::new().unwrap();
        assert!(matches!(
            validator.build_validator("nope.schema.json"),
            Err(SchemaError::SchemaLoad { .. })
        ));
    }

    #[test]
    fn test_preset_configs_conform() {
        let validator = SchemaValidator::new().unwrap();
        for config in [dd_core::PackConfig::standard(), dd_core::PackConfig::premium()] {
            let doc = serde_json::to_value(&config).unwrap();
            validator.validate_document(&doc, PACK_CONFIG_SCHEMA).unwrap();
        }
    }

    #[test]
    fn test_every_violation_is_reported_with_pointer() {
        let validator = SchemaValidator::new().unwrap();
        let doc = json!({
            "slots": [{"fixed": "shiny"}, {"weighted": {"rare": -0.5}}],
            "holo_chance": 1.5,
            "holo_variants": {"standard": 1.0}
        });
        let err = validator
            .validate_document(&doc, PACK_CONFIG_SCHEMA)
            .unwrap_err();
        let paths: Vec<&str> = err
            .violations()
            .unwrap()
            .iter()
            .map(|v| v.instance_path.as_str())
            .collect();
        assert!(paths.contains(&"/holo_chance"), "{paths:?}");
        assert!(paths.iter().any(|p| p.starts_with("/slots/0")), "{paths:?}");
        assert!(paths.iter().any(|p| p.starts_with("/slots/1")), "{paths:?}");
    }

    #[test]
    fn test_holo_variant_required_iff_holo() {
        let validator = SchemaValidator::new().unwrap();
        let card = json!({"id": "rare-001", "name": "Rare Dad", "rarity": "rare"});
        let pack = |entry: Value| {
            json!({
                "id": "6f1c2a0e-8b7d-4c3e-9f2a-1b2c3d4e5f60",
                "cards": [entry],
                "created_at": "2026-01-15T12:30:45Z",
                "seed": null
            })
        };
        let holo_without = pack(json!({"card": card, "is_holo": true}));
        let plain_with = pack(json!({"card": card, "is_holo": false, "holo_variant": "reverse"}));
        let ok = pack(json!({"card": card, "is_holo": true, "holo_variant": "reverse"}));
        assert!(validator.validate_document(&holo_without, PACK_SCHEMA).is_err());
        assert!(validator.validate_document(&plain_with, PACK_SCHEMA).is_err());
        validator.validate_document(&ok, PACK_SCHEMA).unwrap();
    }
}
