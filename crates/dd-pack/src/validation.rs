//! # Pack Validation
//!
//! Post-generation anti-cheat and sanity layer. Four independent checks,
//! all of which always run so that the result lists every problem at once:
//!
//! 1. **Duplicate pack**: the pack's fingerprint is already in the recent
//!    history.
//! 2. **Distribution conformance**: the pack has one card per slot, every
//!    card is a catalog card of a tier its slot can produce, and the holo
//!    variant is present exactly on holo cards.
//! 3. **Statistical anomaly**: the pack is implausible under the config's
//!    own odds (see [`AnomalyThresholds`]).
//! 4. **Entropy verification**: a pack that declares a seed regenerates to
//!    the same content digest.
//!
//! Violations are data. Deciding what to do with a warning is the caller's
//! business; only an entropy failure is logged at error level here.

use std::collections::{HashSet, VecDeque};

use dd_core::{CardCatalog, Pack, PackConfig, PackFingerprint, RaritySlot};
use serde::{Deserialize, Serialize};

use crate::generator::PackGenerator;

/// Default number of fingerprints kept for duplicate detection.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

// ---------------------------------------------------------------------------
// Violations
// ---------------------------------------------------------------------------

/// Which check produced a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    DuplicatePack,
    DistributionMismatch,
    StatisticalAnomaly,
    EntropyFailure,
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::DuplicatePack => "duplicate-pack",
            Self::DistributionMismatch => "distribution-mismatch",
            Self::StatisticalAnomaly => "statistical-anomaly",
            Self::EntropyFailure => "entropy-failure",
        };
        f.write_str(s)
    }
}

/// How seriously a caller should take a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

/// One failed check with diagnostic detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,
    /// Slot the violation concerns, when it concerns a single slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<usize>,
    pub message: String,
}

impl Violation {
    pub fn new(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            slot: None,
            message: message.into(),
        }
    }

    pub fn at_slot(kind: ViolationKind, slot: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            slot: Some(slot),
            message: message.into(),
        }
    }

    /// Entropy failures are errors; everything else is a warning.
    pub fn severity(&self) -> Severity {
        match self.kind {
            ViolationKind::EntropyFailure => Severity::Error,
            _ => Severity::Warning,
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.slot {
            Some(slot) => write!(f, "[{}] slot {slot}: {}", self.kind, self.message),
            None => write!(f, "[{}] {}", self.kind, self.message),
        }
    }
}

/// Outcome of validating one pack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// `true` iff `violations` is empty.
    pub valid: bool,
    pub violations: Vec<Violation>,
}

impl ValidationResult {
    /// A passing result.
    pub fn ok() -> Self {
        Self {
            valid: true,
            violations: Vec::new(),
        }
    }

    /// Record a violation. Marks the result invalid.
    pub fn add(&mut self, violation: Violation) {
        self.valid = false;
        self.violations.push(violation);
    }

    /// Merge another result into this one.
    pub fn merge(&mut self, other: ValidationResult) {
        if !other.valid {
            self.valid = false;
        }
        self.violations.extend(other.violations);
    }

    /// Whether any violation of `kind` was recorded.
    pub fn has(&self, kind: ViolationKind) -> bool {
        self.violations.iter().any(|v| v.kind == kind)
    }

    /// Highest severity present, if any.
    pub fn max_severity(&self) -> Option<Severity> {
        self.violations.iter().map(Violation::severity).max()
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::ok()
    }
}

// ---------------------------------------------------------------------------
// Fingerprint history
// ---------------------------------------------------------------------------

/// Bounded FIFO set of recently seen pack fingerprints.
#[derive(Debug, Clone)]
pub struct FingerprintHistory {
    capacity: usize,
    order: VecDeque<PackFingerprint>,
    members: HashSet<PackFingerprint>,
}

impl FingerprintHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            members: HashSet::with_capacity(capacity),
        }
    }

    pub fn contains(&self, fingerprint: &PackFingerprint) -> bool {
        self.members.contains(fingerprint)
    }

    /// Insert `fingerprint`, evicting the oldest entry when full. Returns
    /// `false` if it was already present (its position is not refreshed).
    pub fn record(&mut self, fingerprint: PackFingerprint) -> bool {
        if self.capacity == 0 || self.members.contains(&fingerprint) {
            return false;
        }
        if self.order.len() == self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.members.remove(&oldest);
            }
        }
        self.members.insert(fingerprint.clone());
        self.order.push_back(fingerprint);
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }
}

impl Default for FingerprintHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Anomaly thresholds
// ---------------------------------------------------------------------------

/// Tunable bounds for the statistical-anomaly check.
///
/// Both checks flag an outcome whose probability under the config is below
/// a threshold, so the false-positive rate on legitimate packs is bounded:
///
/// - `min_rarity_likelihood`: the product, over weighted slots, of the drawn
///   tier's weight. At most `threshold × (number of tier combinations)` of
///   legitimate packs fall below it. With the standard preset (100
///   combinations) and the default `1e-7`, that is under `1e-5`.
/// - `min_holo_tail_probability`: the binomial upper tail `P(X ≥ k)` for `k`
///   holo cards out of `n` at the configured holo chance. The tail is
///   monotone in `k`, so the false-positive rate is at most the threshold
///   (default `1e-4`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnomalyThresholds {
    pub min_rarity_likelihood: f64,
    pub min_holo_tail_probability: f64,
}

impl Default for AnomalyThresholds {
    fn default() -> Self {
        Self {
            min_rarity_likelihood: 1e-7,
            min_holo_tail_probability: 1e-4,
        }
    }
}

/// Product over weighted slots of the drawn tier's probability. Fixed slots
/// contribute nothing; slots beyond the pack length are skipped.
pub fn rarity_likelihood(pack: &Pack, config: &PackConfig) -> f64 {
    config
        .slots
        .iter()
        .zip(pack.cards())
        .filter(|(rule, _)| !rule.is_fixed())
        .map(|(rule, card)| rule.probability(card.rarity()))
        .product()
}

/// Binomial upper tail `P(X ≥ k)` for `X ~ Binomial(n, p)`.
pub fn binomial_upper_tail(n: usize, k: usize, p: f64) -> f64 {
    if k == 0 {
        return 1.0;
    }
    if k > n {
        return 0.0;
    }
    let q = 1.0 - p;
    let mut coefficient = 1.0_f64;
    let mut tail = 0.0;
    for j in 0..=n {
        if j > 0 {
            coefficient = coefficient * (n - j + 1) as f64 / j as f64;
        }
        if j >= k {
            tail += coefficient * p.powi(j as i32) * q.powi((n - j) as i32);
        }
    }
    tail.min(1.0)
}

// ---------------------------------------------------------------------------
// Validator
// ---------------------------------------------------------------------------

/// Everything a validation run consults.
#[derive(Clone, Copy)]
pub struct ValidationContext<'a> {
    pub recent: &'a FingerprintHistory,
    pub config: &'a PackConfig,
    pub catalog: &'a dyn CardCatalog,
    pub thresholds: AnomalyThresholds,
}

impl<'a> ValidationContext<'a> {
    pub fn new(
        recent: &'a FingerprintHistory,
        config: &'a PackConfig,
        catalog: &'a dyn CardCatalog,
    ) -> Self {
        Self {
            recent,
            config,
            catalog,
            thresholds: AnomalyThresholds::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: AnomalyThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }
}

/// Runs the four pack checks against a context.
#[derive(Clone, Copy)]
pub struct PackValidator<'a> {
    ctx: ValidationContext<'a>,
}

impl<'a> PackValidator<'a> {
    pub fn new(ctx: ValidationContext<'a>) -> Self {
        Self { ctx }
    }

    /// Run every check and collect all violations.
    pub fn validate(&self, pack: &Pack) -> ValidationResult {
        let mut result = ValidationResult::ok();
        result.merge(self.check_duplicate(pack));
        result.merge(self.check_distribution(pack));
        result.merge(self.check_anomalies(pack));
        result.merge(self.check_entropy(pack));

        for violation in &result.violations {
            match violation.severity() {
                Severity::Error => tracing::error!(
                    pack = %pack.id(),
                    kind = %violation.kind,
                    "{}", violation.message
                ),
                Severity::Warning => tracing::warn!(
                    pack = %pack.id(),
                    kind = %violation.kind,
                    slot = ?violation.slot,
                    "{}", violation.message
                ),
            }
        }
        result
    }

    pub fn check_duplicate(&self, pack: &Pack) -> ValidationResult {
        let mut result = ValidationResult::ok();
        let fingerprint = pack.fingerprint();
        if self.ctx.recent.contains(&fingerprint) {
            result.add(Violation::new(
                ViolationKind::DuplicatePack,
                format!("fingerprint {fingerprint} matches a recent pack"),
            ));
        }
        result
    }

    pub fn check_distribution(&self, pack: &Pack) -> ValidationResult {
        let mut result = ValidationResult::ok();
        let slots = &self.ctx.config.slots;
        if pack.len() != slots.len() {
            result.add(Violation::new(
                ViolationKind::DistributionMismatch,
                format!("pack has {} cards, config has {} slots", pack.len(), slots.len()),
            ));
        }
        if pack.has_duplicate_cards() {
            result.add(Violation::new(
                ViolationKind::DistributionMismatch,
                "pack contains the same card more than once",
            ));
        }

        for (slot, (rule, entry)) in slots.iter().zip(pack.cards()).enumerate() {
            let rarity = entry.rarity();
            match rule {
                RaritySlot::Fixed(expected) if *expected != rarity => {
                    result.add(Violation::at_slot(
                        ViolationKind::DistributionMismatch,
                        slot,
                        format!("fixed slot requires {expected}, found {rarity}"),
                    ));
                }
                RaritySlot::Weighted(_) if !rule.allows(rarity) => {
                    result.add(Violation::at_slot(
                        ViolationKind::DistributionMismatch,
                        slot,
                        format!("{rarity} has zero weight in this slot"),
                    ));
                }
                _ => {}
            }

            match self.ctx.catalog.get(entry.id()) {
                None => result.add(Violation::at_slot(
                    ViolationKind::DistributionMismatch,
                    slot,
                    format!("card {} is not in the catalog", entry.id()),
                )),
                Some(known) if known.rarity != rarity => result.add(Violation::at_slot(
                    ViolationKind::DistributionMismatch,
                    slot,
                    format!(
                        "card {} is {} in the catalog, pack claims {rarity}",
                        entry.id(),
                        known.rarity
                    ),
                )),
                Some(known) if known != &entry.card => result.add(Violation::at_slot(
                    ViolationKind::DistributionMismatch,
                    slot,
                    format!("card {} differs from its catalog entry", entry.id()),
                )),
                Some(_) => {}
            }

            if entry.is_holo != entry.holo_variant.is_some() {
                result.add(Violation::at_slot(
                    ViolationKind::DistributionMismatch,
                    slot,
                    "holo variant must be present exactly when the card is holo",
                ));
            }
        }
        result
    }

    pub fn check_anomalies(&self, pack: &Pack) -> ValidationResult {
        let mut result = ValidationResult::ok();
        let thresholds = self.ctx.thresholds;

        let likelihood = rarity_likelihood(pack, self.ctx.config);
        if likelihood == 0.0 || likelihood < thresholds.min_rarity_likelihood {
            result.add(Violation::new(
                ViolationKind::StatisticalAnomaly,
                format!(
                    "rarity combination likelihood {likelihood:e} is below {:e}",
                    thresholds.min_rarity_likelihood
                ),
            ));
        }

        let holo = pack.holo_count();
        let tail = binomial_upper_tail(pack.len(), holo, self.ctx.config.holo_chance);
        if tail < thresholds.min_holo_tail_probability {
            result.add(Violation::new(
                ViolationKind::StatisticalAnomaly,
                format!(
                    "{holo} holo cards out of {} has tail probability {tail:e}, below {:e}",
                    pack.len(),
                    thresholds.min_holo_tail_probability
                ),
            ));
        }
        result
    }

    /// Regenerate a seeded pack and compare content digests. Unseeded packs
    /// are not reproducible and pass trivially.
    pub fn check_entropy(&self, pack: &Pack) -> ValidationResult {
        let mut result = ValidationResult::ok();
        let Some(seed) = pack.seed() else {
            return result;
        };

        let generator = PackGenerator::new(self.ctx.catalog);
        let regenerated = match generator.generate(self.ctx.config, Some(seed)) {
            Ok(p) => p,
            Err(e) => {
                result.add(Violation::new(
                    ViolationKind::EntropyFailure,
                    format!("seed {seed} does not regenerate: {e}"),
                ));
                return result;
            }
        };

        match (pack.content_digest(), regenerated.content_digest()) {
            (Ok(claimed), Ok(expected)) if claimed == expected => {}
            (Ok(claimed), Ok(expected)) => result.add(Violation::new(
                ViolationKind::EntropyFailure,
                format!("seed {seed} regenerates to {expected}, pack digest is {claimed}"),
            )),
            (Err(e), _) | (_, Err(e)) => result.add(Violation::new(
                ViolationKind::EntropyFailure,
                format!("content digest failed: {e}"),
            )),
        }
        result
    }
}

/// Validate `pack` with default anomaly thresholds.
pub fn validate_pack(
    pack: &Pack,
    recent: &FingerprintHistory,
    config: &PackConfig,
    catalog: &dyn CardCatalog,
) -> ValidationResult {
    PackValidator::new(ValidationContext::new(recent, config, catalog)).validate(pack)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::generate_pack;
    use dd_core::{Card, InMemoryCatalog, PackCard, Rarity};

    fn fixture() -> (InMemoryCatalog, PackConfig) {
        (InMemoryCatalog::synthetic(20), PackConfig::standard())
    }

    fn find_seed_with(
        catalog: &InMemoryCatalog,
        config: &PackConfig,
        predicate: impl Fn(&Pack) -> bool,
    ) -> Pack {
        (0..10_000)
            .map(|seed| generate_pack(catalog, config, Some(seed)).unwrap())
            .find(|p| predicate(p))
            .unwrap()
    }

    #[test]
    fn test_generated_pack_passes() {
        let (catalog, config) = fixture();
        let pack = generate_pack(&catalog, &config, Some(99)).unwrap();
        let result = validate_pack(&pack, &FingerprintHistory::default(), &config, &catalog);
        assert!(result.valid, "{:?}", result.violations);
        assert_eq!(result.max_severity(), None);
    }

    #[test]
    fn test_duplicate_pack_detected() {
        let (catalog, config) = fixture();
        let pack = generate_pack(&catalog, &config, Some(99)).unwrap();
        let mut history = FingerprintHistory::default();
        history.record(pack.fingerprint());
        let result = validate_pack(&pack, &history, &config, &catalog);
        assert!(!result.valid);
        assert!(result.has(ViolationKind::DuplicatePack));
        assert_eq!(result.max_severity(), Some(Severity::Warning));
    }

    #[test]
    fn test_fixed_slot_mismatch_detected() {
        let (catalog, config) = fixture();
        let pack = generate_pack(&catalog, &config, None).unwrap();
        let mut cards = pack.cards().to_vec();
        let rare = catalog.query(Rarity::Rare)[0].clone();
        cards[0] = PackCard::new(rare, None);
        let tampered = Pack::new(cards, None);
        let result = validate_pack(&tampered, &FingerprintHistory::default(), &config, &catalog);
        assert!(result
            .violations
            .iter()
            .any(|v| v.kind == ViolationKind::DistributionMismatch && v.slot == Some(0)));
    }

    #[test]
    fn test_wrong_length_and_unknown_card_detected() {
        let (catalog, config) = fixture();
        let cards = vec![PackCard::new(
            Card::new("counterfeit", "Counterfeit Dad", Rarity::Common),
            None,
        )];
        let pack = Pack::new(cards, None);
        let result = validate_pack(&pack, &FingerprintHistory::default(), &config, &catalog);
        let mismatches: Vec<&Violation> = result
            .violations
            .iter()
            .filter(|v| v.kind == ViolationKind::DistributionMismatch)
            .collect();
        assert_eq!(mismatches.len(), 2);
    }

    #[test]
    fn test_holo_flag_without_variant_detected() {
        let (catalog, config) = fixture();
        let pack = generate_pack(&catalog, &config, None).unwrap();
        let mut cards = pack.cards().to_vec();
        cards[3].is_holo = true;
        cards[3].holo_variant = None;
        let tampered = Pack::new(cards, None);
        let result = validate_pack(&tampered, &FingerprintHistory::default(), &config, &catalog);
        assert!(result
            .violations
            .iter()
            .any(|v| v.slot == Some(3) && v.message.contains("holo variant")));
    }

    #[test]
    fn test_entropy_tamper_detected() {
        let (catalog, config) = fixture();
        let pack = generate_pack(&catalog, &config, Some(4242)).unwrap();
        let mut cards = pack.cards().to_vec();
        let replacement = catalog
            .query(Rarity::Common)
            .iter()
            .find(|c| !pack.card_ids().any(|id| id == &c.id))
            .unwrap()
            .clone();
        cards[1] = PackCard::new(replacement, cards[1].holo_variant);
        let tampered = Pack::from_parts(pack.id(), cards, pack.created_at(), pack.seed());

        let result = validate_pack(&tampered, &FingerprintHistory::default(), &config, &catalog);
        assert!(result.has(ViolationKind::EntropyFailure));
        assert_eq!(result.max_severity(), Some(Severity::Error));
        assert!(!result.has(ViolationKind::DistributionMismatch));
    }

    #[test]
    fn test_entropy_skipped_for_unseeded_pack() {
        let (catalog, config) = fixture();
        let pack = generate_pack(&catalog, &config, None).unwrap();
        let history = FingerprintHistory::default();
        let validator = PackValidator::new(ValidationContext::new(&history, &config, &catalog));
        assert!(validator.check_entropy(&pack).valid);
    }

    #[test]
    fn test_entropy_failure_when_catalog_cannot_regenerate() {
        let (catalog, config) = fixture();
        let pack = generate_pack(&catalog, &config, Some(8)).unwrap();
        let tiny = InMemoryCatalog::synthetic(1);
        let history = FingerprintHistory::default();
        let validator = PackValidator::new(ValidationContext::new(&history, &config, &tiny));
        let result = validator.check_entropy(&pack);
        assert!(result.has(ViolationKind::EntropyFailure));
        assert!(result.violations[0].message.contains("does not regenerate"));
    }

    #[test]
    fn test_all_holo_pack_is_anomalous() {
        let (catalog, mut config) = fixture();
        config.holo_chance = 1.0;
        let pack = generate_pack(&catalog, &config, Some(1)).unwrap();
        config.holo_chance = 1.0 / 6.0;
        let history = FingerprintHistory::default();
        let validator = PackValidator::new(ValidationContext::new(&history, &config, &catalog));
        let result = validator.check_anomalies(&pack);
        assert!(result
            .violations
            .iter()
            .any(|v| v.kind == ViolationKind::StatisticalAnomaly && v.message.contains("holo")));
    }

    #[test]
    fn test_triple_mythic_is_anomalous() {
        let (catalog, config) = fixture();
        let mut cards = generate_pack(&catalog, &config, Some(5)).unwrap().cards().to_vec();
        cards[3] = PackCard::new(catalog.query(Rarity::Mythic)[0].clone(), None);
        cards[4] = PackCard::new(catalog.query(Rarity::Mythic)[1].clone(), None);
        cards[5] = PackCard::new(catalog.query(Rarity::Mythic)[2].clone(), None);
        let pack = Pack::new(cards, None);
        let history = FingerprintHistory::default();
        let validator = PackValidator::new(ValidationContext::new(&history, &config, &catalog));
        assert!(rarity_likelihood(&pack, &config) < 1e-8);
        assert!(validator.check_anomalies(&pack).has(ViolationKind::StatisticalAnomaly));
    }

    #[test]
    fn test_likely_pack_is_not_anomalous() {
        let (catalog, config) = fixture();
        let pack = find_seed_with(&catalog, &config, |p| {
            p.holo_count() == 0
                && p.cards()[3].rarity() == Rarity::Uncommon
                && p.cards()[5].rarity() == Rarity::Rare
        });
        let history = FingerprintHistory::default();
        let validator = PackValidator::new(ValidationContext::new(&history, &config, &catalog));
        assert!(validator.check_anomalies(&pack).valid);
    }

    #[test]
    fn test_thresholds_are_tunable() {
        let (catalog, config) = fixture();
        let pack = generate_pack(&catalog, &config, Some(17)).unwrap();
        let history = FingerprintHistory::default();
        let strict = AnomalyThresholds {
            min_rarity_likelihood: 1.1,
            min_holo_tail_probability: 0.0,
        };
        let validator = PackValidator::new(
            ValidationContext::new(&history, &config, &catalog).with_thresholds(strict),
        );
        assert!(validator.check_anomalies(&pack).has(ViolationKind::StatisticalAnomaly));
    }

    #[test]
    fn test_binomial_tail_values() {
        assert_eq!(binomial_upper_tail(6, 0, 0.3), 1.0);
        assert_eq!(binomial_upper_tail(6, 7, 0.3), 0.0);
        let all_six = binomial_upper_tail(6, 6, 1.0 / 6.0);
        assert!((all_six - (1.0f64 / 6.0).powi(6)).abs() < 1e-15);
        let at_least_one = binomial_upper_tail(6, 1, 1.0 / 6.0);
        assert!((at_least_one - (1.0 - (5.0f64 / 6.0).powi(6))).abs() < 1e-12);
        assert_eq!(binomial_upper_tail(6, 3, 0.0), 0.0);
    }

    #[test]
    fn test_history_evicts_oldest() {
        let mut history = FingerprintHistory::new(2);
        let fp = |s: &str| PackFingerprint(s.to_string());
        assert!(history.record(fp("a")));
        assert!(history.record(fp("b")));
        assert!(!history.record(fp("a")));
        assert!(history.record(fp("c")));
        assert!(!history.contains(&fp("a")));
        assert!(history.contains(&fp("b")));
        assert!(history.contains(&fp("c")));
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_zero_capacity_history_records_nothing() {
        let mut history = FingerprintHistory::new(0);
        assert!(!history.record(PackFingerprint("a".into())));
        assert!(history.is_empty());
    }

    #[test]
    fn test_violation_display_and_serde() {
        let v = Violation::at_slot(ViolationKind::DistributionMismatch, 2, "bad");
        assert_eq!(v.to_string(), "[distribution-mismatch] slot 2: bad");
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["kind"], "distribution_mismatch");
    }
}
