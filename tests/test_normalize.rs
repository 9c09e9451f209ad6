//! Raw record normalization across feed shapes.

mod common;

use common::{hours_from_now, now};
use serde_json::json;
use signal_intel::application::normalize::{Normalizer, UNMAPPED_CATEGORY};
use signal_intel::domain::error::NormalizationError;
use signal_intel::domain::values::category::Category;
use signal_intel::domain::values::source_kind::SourceKind;

fn normalizer() -> Normalizer {
    Normalizer::new(Some(Category::NarrativeGap))
}

#[test]
fn test_competitor_record_maps_fields() {
    let raw = json!({
        "id": "c-17",
        "competitor": "Rival Corp",
        "headline": "  Rival Corp cuts   pricing ",
        "details": "Entry tier now free",
        "observed_at": now().to_rfc3339(),
        "threat_level": "high",
        "region": "EMEA",
    });

    let signal = normalizer().normalize(&raw, SourceKind::Competitor).unwrap();
    assert_eq!(signal.id, "competitor:c-17");
    assert_eq!(signal.category, Category::CompetitorMove);
    assert_eq!(signal.title, "Rival Corp cuts pricing");
    assert_eq!(signal.subject_entities, vec!["Rival Corp"]);
    assert_eq!(signal.source_timestamp, now());
    assert_eq!(signal.attribute("severity"), Some(75.0));
    // Non-core fields are kept as-is.
    assert_eq!(signal.raw_attributes.get("region"), Some(&json!("EMEA")));
}

#[test]
fn test_media_record_with_deadline_and_reach() {
    let raw = json!({
        "outlet": "Trade Weekly",
        "journalist": {"name": "J. Doe"},
        "headline": "Seeking comment on supply chains",
        "summary": "Feature piece, quotes wanted",
        "published_at": 1717243200,
        "deadline": hours_from_now(30).to_rfc3339(),
        "reach": 0.6,
    });

    let signal = normalizer().normalize(&raw, SourceKind::Media).unwrap();
    assert_eq!(signal.category, Category::MediaOpportunity);
    assert_eq!(signal.subject_entities, vec!["Trade Weekly", "J. Doe"]);
    assert_eq!(signal.source_timestamp, now());
    assert_eq!(signal.window_end, Some(hours_from_now(30)));
    assert_eq!(signal.attribute("reach"), Some(60.0));
}

#[test]
fn test_explicit_category_beats_feed_default() {
    let raw = json!({
        "stakeholder": "Shareholder group",
        "activity": "Letter on new disclosure rules",
        "description": "Asks about compliance timelines",
        "timestamp": "2024-05-30",
        "category": "regulatory_change",
    });
    let signal = normalizer().normalize(&raw, SourceKind::Stakeholder).unwrap();
    assert_eq!(signal.category, Category::RegulatoryChange);
}

#[test]
fn test_unknown_explicit_category_is_kept_as_attribute() {
    let raw = json!({
        "id": "c-9",
        "competitor": "Rival Corp",
        "headline": "Rival Corp opens new office",
        "details": "Second site in the region",
        "category": "weather",
        "observed_at": now().to_rfc3339(),
    });

    let signal = normalizer().normalize(&raw, SourceKind::Competitor).unwrap();
    assert_eq!(signal.category, Category::CompetitorMove);
    assert_eq!(
        signal.raw_attributes.get(UNMAPPED_CATEGORY),
        Some(&json!("weather"))
    );
}

#[test]
fn test_intel_record_infers_category_deterministically() {
    let raw = json!({
        "title": "Data breach reported at supplier",
        "description": "Customers notified",
        "timestamp": now().to_rfc3339(),
    });
    for _ in 0..3 {
        let signal = normalizer().normalize(&raw, SourceKind::Intel).unwrap();
        assert_eq!(signal.category, Category::RiskAlert);
    }
}

#[test]
fn test_unrecognised_text_uses_fallback() {
    let raw = json!({
        "title": "Quarterly offsite agenda",
        "description": "Nothing notable",
        "timestamp": now().to_rfc3339(),
    });
    let signal = normalizer().normalize(&raw, SourceKind::Intel).unwrap();
    assert_eq!(signal.category, Category::NarrativeGap);

    let strict = Normalizer::new(None);
    assert_eq!(
        strict.normalize(&raw, SourceKind::Intel),
        Err(NormalizationError::UnknownCategory)
    );
}

#[test]
fn test_missing_timestamp_is_rejected() {
    let raw = json!({"title": "No time", "description": "x"});
    assert_eq!(
        normalizer().normalize(&raw, SourceKind::Intel),
        Err(NormalizationError::MissingField("timestamp"))
    );
}

#[test]
fn test_bad_timestamp_is_invalid_field() {
    let raw = json!({"title": "Bad", "description": "x", "timestamp": "yesterday"});
    assert!(matches!(
        normalizer().normalize(&raw, SourceKind::Intel),
        Err(NormalizationError::InvalidField { field: "timestamp", .. })
    ));
}

#[test]
fn test_non_object_is_rejected() {
    assert_eq!(
        normalizer().normalize(&json!([1, 2]), SourceKind::Risk),
        Err(NormalizationError::NotAnObject)
    );
}

#[test]
fn test_derived_id_is_stable() {
    let raw = json!({
        "alert": "Outage at data centre",
        "description": "Status page red",
        "detected_at": now().to_rfc3339(),
    });
    let a = normalizer().normalize(&raw, SourceKind::Risk).unwrap();
    let b = normalizer().normalize(&raw, SourceKind::Risk).unwrap();
    assert_eq!(a.id, b.id);
    assert!(!a.id.starts_with("risk:"));
}

#[test]
fn test_entities_trimmed_and_deduplicated() {
    let raw = json!({
        "title": "Analyst note",
        "description": "x",
        "timestamp": now().to_rfc3339(),
        "entities": [" Acme ", "Acme", "", "Globex"],
    });
    let signal = normalizer().normalize(&raw, SourceKind::Intel).unwrap();
    assert_eq!(signal.subject_entities, vec!["Acme", "Globex"]);
}

#[test]
fn test_nested_attributes_are_merged() {
    let raw = json!({
        "title": "Trending sentiment shift",
        "description": "x",
        "timestamp": now().to_rfc3339(),
        "attributes": {"relevance_hint": 8, "confidence": "medium"},
    });
    let signal = normalizer().normalize(&raw, SourceKind::Intel).unwrap();
    assert_eq!(signal.attribute("relevance_hint"), Some(80.0));
    assert_eq!(signal.attribute("confidence"), Some(50.0));
}
