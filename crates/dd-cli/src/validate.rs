//! # Validate Subcommand
//!
//! `ddpack validate PACK...`
//!
//! Each file holds one pack or a JSON array of packs, as written by
//! `ddpack generate`. Packs are validated in argument order against one
//! shared fingerprint history, so a pack repeated across inputs is reported
//! as a duplicate.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use dd_core::Pack;
use dd_pack::{
    FingerprintHistory, PackValidator, ValidationContext, ValidationResult, DEFAULT_HISTORY_CAPACITY,
};
use dd_schema::{load_pack, parse_document, DocumentFormat};
use serde::Serialize;

use crate::input::PackSource;

/// Arguments for the validate subcommand.
#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Pack documents to check.
    #[arg(required = true)]
    pub packs: Vec<PathBuf>,

    /// Configuration and catalog the packs were generated from.
    #[command(flatten)]
    pub source: PackSource,

    /// Recent fingerprints kept for duplicate detection.
    #[arg(long, default_value_t = DEFAULT_HISTORY_CAPACITY)]
    pub history: usize,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Outcome for one pack.
#[derive(Debug, Clone, Serialize)]
pub struct PackReport {
    pub pack: String,
    pub source: String,
    #[serde(flatten)]
    pub result: ValidationResult,
}

/// Read every pack from `path`.
pub fn read_packs(path: &Path) -> anyhow::Result<Vec<Pack>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let doc = parse_document(&text, DocumentFormat::Json)
        .with_context(|| format!("parsing {}", path.display()))?;
    let packs = match doc.as_array() {
        Some(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                load_pack(&item.to_string())
                    .with_context(|| format!("{} [{i}]", path.display()))
            })
            .collect::<anyhow::Result<Vec<_>>>()?,
        None => vec![load_pack(&text).with_context(|| path.display().to_string())?],
    };
    Ok(packs)
}

/// Validate `packs` in order, recording each fingerprint after its check.
pub fn validate_all<'p>(
    packs: impl IntoIterator<Item = (&'p Pack, String)>,
    source: &PackSource,
    history_capacity: usize,
) -> anyhow::Result<Vec<PackReport>> {
    let config = source.load_config()?;
    let catalog = source.load_catalog()?;
    let mut history = FingerprintHistory::new(history_capacity);
    let mut reports = Vec::new();

    for (pack, origin) in packs {
        let result = {
            let ctx = ValidationContext::new(&history, &config, &catalog);
            PackValidator::new(ctx).validate(pack)
        };
        history.record(pack.fingerprint());
        reports.push(PackReport {
            pack: pack.id().to_string(),
            source: origin,
            result,
        });
    }
    Ok(reports)
}

/// Returns `true` when every pack passed.
pub fn run_validate(args: &ValidateArgs) -> anyhow::Result<bool> {
    let mut loaded = Vec::new();
    for path in &args.packs {
        for pack in read_packs(path)? {
            loaded.push((pack, path.display().to_string()));
        }
    }
    let reports = validate_all(
        loaded.iter().map(|(pack, origin)| (pack, origin.clone())),
        &args.source,
        args.history,
    )?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            let verdict = if report.result.valid { "ok" } else { "REJECTED" };
            println!("{} ({}): {verdict}", report.pack, report.source);
            for violation in &report.result.violations {
                println!("  {violation}");
            }
        }
    }
    Ok(reports.iter().all(|r| r.result.valid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dd_core::PackConfig;
    use dd_pack::{generate_pack, ViolationKind};

    #[test]
    fn test_repeated_pack_flagged_on_second_sight() {
        let source = PackSource::default();
        let catalog = source.load_catalog().unwrap();
        let pack = generate_pack(&catalog, &PackConfig::standard(), Some(42)).unwrap();
        let reports = validate_all(
            [(&pack, "a".to_string()), (&pack, "b".to_string())],
            &source,
            DEFAULT_HISTORY_CAPACITY,
        )
        .unwrap();
        assert!(!reports[0].result.has(ViolationKind::DuplicatePack));
        assert!(reports[1].result.has(ViolationKind::DuplicatePack));
    }
}
