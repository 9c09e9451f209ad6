//! Shared test helpers.
#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Value};
use signal_intel::domain::entities::scored_signal::ScoredSignal;
use signal_intel::domain::entities::signal::Signal;
use signal_intel::domain::values::category::Category;
use signal_intel::domain::values::score::Score;
use signal_intel::domain::values::source_kind::SourceKind;
use signal_intel::domain::values::urgency::UrgencyBucket;
use signal_intel::infrastructure::config::memory::InMemoryConfigStore;
use signal_intel::SignalIntel;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Fixed evaluation time for every test.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

pub fn hours_from_now(hours: i64) -> DateTime<Utc> {
    now() + Duration::hours(hours)
}

pub fn setup() -> (SignalIntel, Arc<InMemoryConfigStore>) {
    let store = Arc::new(InMemoryConfigStore::new());
    (SignalIntel::with_store(store.clone()), store)
}

/// Raw `intel` record with an explicit category.
pub fn intel_record(
    id: &str,
    category: Category,
    title: &str,
    entities: &[&str],
    observed_hours_ago: i64,
) -> Value {
    json!({
        "id": id,
        "category": category.as_str(),
        "title": title,
        "description": format!("{title} (details)"),
        "timestamp": hours_from_now(-observed_hours_ago).to_rfc3339(),
        "entities": entities,
    })
}

/// Same as [`intel_record`] with a window end `hours` from now.
pub fn intel_record_with_window(
    id: &str,
    category: Category,
    title: &str,
    entities: &[&str],
    observed_hours_ago: i64,
    window_hours: i64,
) -> Value {
    let mut record = intel_record(id, category, title, entities, observed_hours_ago);
    record["window_end"] = json!(hours_from_now(window_hours).to_rfc3339());
    record
}

pub fn make_signal(id: &str, category: Category, entities: &[&str], observed_hours_ago: i64) -> Signal {
    Signal {
        id: id.to_string(),
        category,
        source_kind: SourceKind::Intel,
        title: format!("Signal {id}"),
        description: String::new(),
        source_timestamp: hours_from_now(-observed_hours_ago),
        window_end: None,
        raw_attributes: BTreeMap::new(),
        subject_entities: entities.iter().map(|e| e.to_string()).collect(),
    }
}

pub fn make_scored(
    id: &str,
    category: Category,
    entities: &[&str],
    priority: f64,
    observed_hours_ago: i64,
) -> ScoredSignal {
    ScoredSignal {
        signal: make_signal(id, category, entities, observed_hours_ago),
        relevance_score: Score::clamped(50.0),
        newsworthiness_score: Score::clamped(50.0),
        priority_score: Score::clamped(priority),
        urgency_bucket: UrgencyBucket::Low,
    }
}
