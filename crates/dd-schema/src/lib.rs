//! # dd-schema: Boundary Validation
//!
//! Every externally authored document (pack config, pack, catalog) passes
//! through here exactly once:
//!
//! 1. parse JSON or YAML into a `serde_json::Value`,
//! 2. validate against the embedded Draft 2020-12 schema, collecting every
//!    violation with its JSON pointer,
//! 3. deserialize into the typed `dd-core` value,
//! 4. run the semantic checks a schema cannot express (weight sums, unique
//!    card ids).
//!
//! Downstream code only ever sees typed, checked values.

pub mod load;
pub mod validate;

pub use load::{
    load_catalog, load_catalog_file, load_pack, load_pack_config, load_pack_config_file,
    load_pack_file, parse_document, DocumentFormat,
};
pub use validate::{
    SchemaError, SchemaValidator, ValidationViolations, Violation, CATALOG_SCHEMA,
    PACK_CONFIG_SCHEMA, PACK_SCHEMA,
};
