//! End-to-end validator behavior over generated packs.

use dd_core::{InMemoryCatalog, Pack, PackCard, PackConfig};
use dd_pack::{
    generate_pack, validate_pack, FingerprintHistory, PackValidator, Severity,
    ValidationContext, ViolationKind,
};

// ---------------------------------------------------------------------------
// Entropy verification
// ---------------------------------------------------------------------------

#[test]
fn unmodified_seeded_pack_passes_entropy_check() {
    let catalog = InMemoryCatalog::synthetic(20);
    let config = PackConfig::standard();
    let history = FingerprintHistory::default();
    let validator = PackValidator::new(ValidationContext::new(&history, &config, &catalog));
    for seed in 0..100 {
        let pack = generate_pack(&catalog, &config, Some(seed)).unwrap();
        assert!(validator.check_entropy(&pack).valid, "seed {seed}");
    }
}

#[test]
fn altering_one_card_id_fails_entropy_check() {
    let catalog = InMemoryCatalog::synthetic(20);
    let config = PackConfig::standard();
    let pack = generate_pack(&catalog, &config, Some(31337)).unwrap();

    let mut cards = pack.cards().to_vec();
    let original = cards[5].card.clone();
    let swap = catalog
        .filter(original.rarity, |c| !pack.card_ids().any(|id| id == &c.id))
        .next()
        .unwrap()
        .clone();
    cards[5] = PackCard::new(swap, cards[5].holo_variant);
    let forged = Pack::from_parts(pack.id(), cards, pack.created_at(), pack.seed());

    let result = validate_pack(&forged, &FingerprintHistory::default(), &config, &catalog);
    assert!(!result.valid);
    assert!(result.has(ViolationKind::EntropyFailure));
    assert_eq!(result.max_severity(), Some(Severity::Error));
}

#[test]
fn forged_card_payload_fails_entropy_and_distribution() {
    let catalog = InMemoryCatalog::synthetic(20);
    let config = PackConfig::standard();
    let pack = generate_pack(&catalog, &config, Some(4242)).unwrap();
    let history = FingerprintHistory::default();
    assert!(validate_pack(&pack, &history, &config, &catalog).valid);

    let mut cards = pack.cards().to_vec();
    cards[5].card.stats.dad_joke = 100;
    cards[5].card.name = "Forged Legend".to_string();
    let forged = Pack::from_parts(pack.id(), cards, pack.created_at(), pack.seed());

    let result = validate_pack(&forged, &history, &config, &catalog);
    assert!(!result.valid);
    assert!(result.has(ViolationKind::EntropyFailure));
    assert!(result
        .violations
        .iter()
        .any(|v| v.kind == ViolationKind::DistributionMismatch && v.slot == Some(5)));
}

// ---------------------------------------------------------------------------
// Duplicate detection across a session
// ---------------------------------------------------------------------------

#[test]
fn replayed_pack_is_flagged_until_evicted() {
    let catalog = InMemoryCatalog::synthetic(20);
    let config = PackConfig::standard();
    let mut history = FingerprintHistory::new(3);

    let first = generate_pack(&catalog, &config, Some(1)).unwrap();
    history.record(first.fingerprint());
    assert!(validate_pack(&first, &history, &config, &catalog).has(ViolationKind::DuplicatePack));

    for seed in 2..5 {
        let pack = generate_pack(&catalog, &config, Some(seed)).unwrap();
        history.record(pack.fingerprint());
    }
    assert!(!validate_pack(&first, &history, &config, &catalog).has(ViolationKind::DuplicatePack));
}

// ---------------------------------------------------------------------------
// Anomaly false-positive rate
// ---------------------------------------------------------------------------

#[test]
fn anomaly_false_positive_rate_stays_below_bound() {
    let catalog = InMemoryCatalog::synthetic(20);
    let config = PackConfig::standard();
    let history = FingerprintHistory::default();
    let validator = PackValidator::new(ValidationContext::new(&history, &config, &catalog));

    let trials = 20_000;
    let flagged = (0..trials)
        .map(|seed| generate_pack(&catalog, &config, Some(seed)).unwrap())
        .filter(|pack| !validator.check_anomalies(pack).valid)
        .count();
    // Expected false positives are about 0.5 at these thresholds.
    assert!(flagged <= 10, "{flagged} of {trials} legitimate packs flagged");
}

#[test]
fn all_checks_report_together() {
    let catalog = InMemoryCatalog::synthetic(20);
    let config = PackConfig::standard();
    let pack = generate_pack(&catalog, &config, Some(7)).unwrap();
    let mut cards = pack.cards().to_vec();
    cards.pop();
    let truncated = Pack::from_parts(pack.id(), cards, pack.created_at(), pack.seed());

    let mut history = FingerprintHistory::default();
    history.record(truncated.fingerprint());
    let result = validate_pack(&truncated, &history, &config, &catalog);
    assert!(result.has(ViolationKind::DuplicatePack));
    assert!(result.has(ViolationKind::DistributionMismatch));
    assert!(result.has(ViolationKind::EntropyFailure));
}
