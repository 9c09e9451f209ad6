//! End-to-end pipeline runs over fixture feeds.

mod common;

use async_trait::async_trait;
use common::{hours_from_now, intel_record, intel_record_with_window, now, setup};
use serde_json::json;
use signal_intel::application::pipeline::{run, AggregationPipeline, CancelHandle};
use signal_intel::domain::error::{DomainError, PipelineError, SourceError};
use signal_intel::domain::ports::config_store::{ConfigRepository, ConfigStore};
use signal_intel::domain::ports::signal_source::{FilterHints, RawRecord, SignalSource};
use signal_intel::domain::values::category::Category;
use signal_intel::domain::values::category_config::{CategoryConfig, EngineSettings};
use signal_intel::domain::values::pipeline_stage::PipelineStage;
use signal_intel::domain::values::source_kind::SourceKind;
use signal_intel::infrastructure::config::memory::InMemoryConfigStore;
use signal_intel::infrastructure::feeds::fixture::FixtureSource;
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

fn mixed_source() -> FixtureSource {
    FixtureSource::new()
        .with_records(
            SourceKind::Competitor,
            vec![
                json!({
                    "id": "c1",
                    "competitor": "Rival Corp",
                    "headline": "Rival Corp launches budget tier",
                    "details": "Aggressive pricing move",
                    "observed_at": hours_from_now(-6).to_rfc3339(),
                    "threat_level": 8,
                }),
                json!({
                    "id": "c2",
                    "competitor": "Rival Corp",
                    "headline": "Rival Corp pricing page updated",
                    "details": "Same launch, second sighting",
                    "observed_at": hours_from_now(-2).to_rfc3339(),
                    "threat_level": 3,
                }),
            ],
        )
        .with_records(
            SourceKind::Media,
            vec![json!({
                "id": "m1",
                "outlet": "Trade Weekly",
                "headline": "Journalist seeks interview on industry outlook",
                "summary": "Podcast segment",
                "published_at": hours_from_now(-1).to_rfc3339(),
                "deadline": hours_from_now(20).to_rfc3339(),
                "reach": 0.9,
            })],
        )
        .with_records(
            SourceKind::Intel,
            vec![
                intel_record("n1", Category::NarrativeGap, "Sustainability narrative unaddressed", &["Industry"], 24),
                json!({"title": "no timestamp", "description": "broken"}),
            ],
        )
}

#[tokio::test]
async fn test_run_produces_ranked_set() {
    let (si, _store) = setup();
    let set = si.run(&mixed_source(), now()).await.unwrap();

    assert_eq!(set.computed_at, now());
    assert_eq!(set.stage_counts.records_fetched, 5);
    assert_eq!(set.stage_counts.normalization_failed, 1);
    assert_eq!(set.stage_counts.duplicates_merged, 1);
    assert_eq!(set.len(), 3);
    assert_eq!(set.diagnostics.skipped_records.len(), 1);
    assert_eq!(set.diagnostics.skipped_records[0].source, SourceKind::Intel);
    assert_eq!(set.diagnostics.skipped_records[0].index, 1);

    for pair in set.opportunities.windows(2) {
        assert!(pair[0].priority_score.value() >= pair[1].priority_score.value());
    }
}

#[tokio::test]
async fn test_runs_are_deterministic() {
    let (si, store) = setup();
    store.track_entity("Rival Corp").unwrap();
    let first = si.run(&mixed_source(), now()).await.unwrap();
    let second = si.run(&mixed_source(), now()).await.unwrap();
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[tokio::test]
async fn test_duplicate_sightings_keep_the_stronger() {
    let (si, _store) = setup();
    let set = si.run(&mixed_source(), now()).await.unwrap();
    let competitor: Vec<_> = set
        .opportunities
        .iter()
        .filter(|o| o.signal.category == Category::CompetitorMove)
        .collect();
    assert_eq!(competitor.len(), 1);
    // c1 carries the higher threat level.
    assert_eq!(competitor[0].id(), "competitor:c1");
}

#[tokio::test]
async fn test_disabled_category_is_excluded() {
    let (si, store) = setup();
    store
        .set_category_config(Category::MediaOpportunity, CategoryConfig::disabled())
        .unwrap();
    let set = si.run(&mixed_source(), now()).await.unwrap();
    assert!(set
        .opportunities
        .iter()
        .all(|o| o.signal.category != Category::MediaOpportunity));
    assert_eq!(set.stage_counts.disabled_category, 1);
}

#[tokio::test]
async fn test_weight_changes_order() {
    let source = FixtureSource::new().with_records(
        SourceKind::Intel,
        vec![
            intel_record("a", Category::RiskAlert, "Item a", &["A"], 1),
            intel_record("b", Category::NarrativeGap, "Item b", &["B"], 1),
        ],
    );
    let store = InMemoryConfigStore::new()
        .with_category(Category::RiskAlert, CategoryConfig::new(true, 0.0).unwrap())
        .with_category(Category::NarrativeGap, CategoryConfig::new(true, 100.0).unwrap());
    let set = run(&source, &store, now()).await.unwrap();
    assert_eq!(set.opportunities[0].id(), "intel:b");

    let store = InMemoryConfigStore::new()
        .with_category(Category::RiskAlert, CategoryConfig::new(true, 100.0).unwrap())
        .with_category(Category::NarrativeGap, CategoryConfig::new(true, 0.0).unwrap());
    let set = run(&source, &store, now()).await.unwrap();
    assert_eq!(set.opportunities[0].id(), "intel:a");
}

#[tokio::test]
async fn test_expired_signals_are_dropped() {
    let source = FixtureSource::new().with_records(
        SourceKind::Intel,
        vec![
            intel_record_with_window("gone", Category::MediaOpportunity, "Closed call", &["A"], 48, -2),
            intel_record_with_window("open", Category::MediaOpportunity, "Open call", &["B"], 2, 30),
            intel_record_with_window("gap", Category::NarrativeGap, "Old gap", &["C"], 48, -2),
        ],
    );
    let store = InMemoryConfigStore::new();
    let set = run(&source, &store, now()).await.unwrap();
    let ids: HashSet<_> = set.opportunities.iter().map(|o| o.id().to_string()).collect();
    assert!(!ids.contains("intel:gone"));
    assert!(ids.contains("intel:open"));
    assert!(ids.contains("intel:gap"));
    assert_eq!(set.stage_counts.expired, 1);
}

#[tokio::test]
async fn test_expired_duplicate_does_not_hide_live_one() {
    let source = FixtureSource::new().with_records(
        SourceKind::Intel,
        vec![
            intel_record_with_window("old", Category::MediaOpportunity, "Old call", &["Acme Corp"], 1, -24),
            intel_record_with_window("live", Category::MediaOpportunity, "Live call", &["Acme Corp"], 48, 480),
        ],
    );
    let store = InMemoryConfigStore::new();
    let set = run(&source, &store, now()).await.unwrap();
    assert_eq!(set.len(), 1);
    assert_eq!(set.opportunities[0].id(), "intel:live");
    assert_eq!(set.stage_counts.expired, 1);
}

#[tokio::test]
async fn test_entity_case_variants_merge_in_a_run() {
    let source = FixtureSource::new().with_records(
        SourceKind::Intel,
        vec![
            intel_record("upper", Category::RiskAlert, "Outage reported", &["Acme Corp"], 2),
            intel_record("lower", Category::RiskAlert, "Outage confirmed", &["acme corp"], 1),
        ],
    );
    let store = InMemoryConfigStore::new();
    let set = run(&source, &store, now()).await.unwrap();
    assert_eq!(set.len(), 1);
}

#[tokio::test]
async fn test_minimum_score_filters() {
    let store = InMemoryConfigStore::new().with_minimum_score(101.0);
    let set = run(&mixed_source(), &store, now()).await.unwrap();
    assert!(set.is_empty());
    assert_eq!(set.stage_counts.below_minimum, 3);
}

#[tokio::test]
async fn test_failing_source_does_not_fail_the_run() {
    let source = mixed_source()
        .with_failure(SourceKind::Risk, "feed returned 503")
        .with_failure(SourceKind::Stakeholder, "dns failure");
    let store = InMemoryConfigStore::new();
    let set = run(&source, &store, now()).await.unwrap();

    assert_eq!(set.len(), 3);
    assert_eq!(set.diagnostics.source_failures.len(), 2);
    let failed: Vec<_> = set.diagnostics.source_failures.iter().map(|f| f.source).collect();
    assert!(failed.contains(&SourceKind::Risk));
    assert!(failed.contains(&SourceKind::Stakeholder));
    assert!(set.diagnostics.source_failures.iter().all(|f| !f.timed_out));
}

#[tokio::test]
async fn test_one_of_three_sources_unavailable() {
    let source = FixtureSource::new()
        .with_records(
            SourceKind::Competitor,
            vec![json!({
                "id": "c9",
                "competitor": "Globex",
                "headline": "Globex acquisition announced",
                "details": "Deal closes next quarter",
                "observed_at": hours_from_now(-3).to_rfc3339(),
            })],
        )
        .with_records(
            SourceKind::Stakeholder,
            vec![json!({
                "id": "s9",
                "stakeholder": "Employee council",
                "activity": "Town hall requested",
                "description": "Questions on the merger",
                "timestamp": hours_from_now(-4).to_rfc3339(),
            })],
        )
        .with_failure(SourceKind::Media, "feed returned 502");
    let store = InMemoryConfigStore::new();

    let set = run(&source, &store, now()).await.unwrap();
    assert_eq!(set.len(), 2);
    assert_eq!(set.diagnostics.source_failures.len(), 1);
    assert_eq!(set.diagnostics.source_failures[0].source, SourceKind::Media);
    assert!(set.diagnostics.source_failures[0].reason.contains("502"));
}

#[tokio::test]
async fn test_slow_source_times_out() {
    let source = FixtureSource::new()
        .with_records(
            SourceKind::Intel,
            vec![intel_record("fast", Category::RiskAlert, "Outage", &["A"], 1)],
        )
        .with_delay(
            SourceKind::Media,
            Duration::from_secs(5),
            vec![intel_record("slow", Category::MediaOpportunity, "Late", &["B"], 1)],
        );
    let store = InMemoryConfigStore::new().with_settings(EngineSettings {
        feed_timeout_ms: 50,
        ..EngineSettings::default()
    });

    let set = run(&source, &store, now()).await.unwrap();
    assert_eq!(set.len(), 1);
    assert_eq!(set.opportunities[0].id(), "intel:fast");
    let failure = &set.diagnostics.source_failures[0];
    assert_eq!(failure.source, SourceKind::Media);
    assert!(failure.timed_out);
}

#[tokio::test]
async fn test_all_sources_failing_gives_empty_set() {
    let source = FixtureSource::new()
        .with_failure(SourceKind::Competitor, "down")
        .with_failure(SourceKind::Media, "down");
    let store = InMemoryConfigStore::new();
    let set = run(&source, &store, now()).await.unwrap();
    assert!(set.is_empty());
    assert_eq!(set.diagnostics.source_failures.len(), 2);
}

#[tokio::test]
async fn test_empty_source_gives_empty_set() {
    let store = InMemoryConfigStore::new();
    let set = run(&FixtureSource::new(), &store, now()).await.unwrap();
    assert!(set.is_empty());
    assert!(set.diagnostics.is_clean());
}

struct UnreachableStore;

impl ConfigStore for UnreachableStore {
    fn category_config(&self, _category: Category) -> Result<CategoryConfig, DomainError> {
        Err(DomainError::Database("connection refused".into()))
    }

    fn settings(&self) -> Result<EngineSettings, DomainError> {
        Err(DomainError::Database("connection refused".into()))
    }
}

#[tokio::test]
async fn test_unreachable_config_fails_the_run() {
    let err = run(&mixed_source(), &UnreachableStore, now()).await.unwrap_err();
    assert!(matches!(err, PipelineError::ConfigUnavailable { .. }));
    assert_eq!(err.stage(), PipelineStage::Fetching);
}

#[tokio::test]
async fn test_cancel_before_start() {
    let cancel = CancelHandle::new();
    cancel.cancel();
    let pipeline = AggregationPipeline::with_cancel(cancel);
    let store = InMemoryConfigStore::new();
    let err = pipeline.run(&mixed_source(), &store, now()).await.unwrap_err();
    assert!(matches!(err, PipelineError::Cancelled { stage: PipelineStage::Fetching }));
}

#[tokio::test]
async fn test_cancel_during_fetch_stops_at_next_boundary() {
    let source = FixtureSource::new().with_delay(
        SourceKind::Media,
        Duration::from_millis(200),
        vec![intel_record("m", Category::MediaOpportunity, "Call", &["A"], 1)],
    );
    let pipeline = AggregationPipeline::new();
    let handle = pipeline.cancel_handle();
    let store = InMemoryConfigStore::new();

    let (result, _) = tokio::join!(pipeline.run(&source, &store, now()), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.cancel();
    });
    assert!(matches!(
        result,
        Err(PipelineError::Cancelled { stage: PipelineStage::Normalizing })
    ));
}

#[tokio::test]
async fn test_facade_runs_again_after_cancel() {
    let (si, _store) = setup();
    let cancel = CancelHandle::new();
    cancel.cancel();
    let err = si
        .run_with_cancel(&mixed_source(), now(), cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Cancelled { stage: PipelineStage::Fetching }));

    let set = si.run(&mixed_source(), now()).await.unwrap();
    assert!(!set.is_empty());
}

/// Remembers the hints it was given.
#[derive(Default)]
struct RecordingSource {
    seen: Mutex<Vec<FilterHints>>,
}

#[async_trait]
impl SignalSource for RecordingSource {
    fn name(&self) -> &str {
        "recording"
    }

    fn kinds(&self) -> Vec<SourceKind> {
        vec![SourceKind::Risk]
    }

    async fn fetch(
        &self,
        _kind: SourceKind,
        hints: &FilterHints,
    ) -> Result<Vec<RawRecord>, SourceError> {
        self.seen.lock().unwrap().push(hints.clone());
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_sources_receive_filter_hints() {
    let store = InMemoryConfigStore::new()
        .with_tracked_entities(["Acme"])
        .with_category(Category::RiskAlert, CategoryConfig::disabled());
    let source = RecordingSource::default();
    run(&source, &store, now()).await.unwrap();

    let seen = source.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].since, Some(hours_from_now(-720)));
    assert_eq!(seen[0].tracked_entities, vec!["Acme"]);
    assert!(!seen[0].categories.contains(&Category::RiskAlert));
    assert_eq!(seen[0].categories.len(), 5);
}

#[tokio::test]
async fn test_records_are_flat_and_ranked() {
    let (si, _store) = setup();
    let set = si.run(&mixed_source(), now()).await.unwrap();
    let records = set.records();
    assert_eq!(records.len(), set.len());
    for (i, r) in records.iter().enumerate() {
        assert_eq!(r.rank, i + 1);
        assert_eq!(r.id, set.opportunities[i].id());
    }
    let media = records
        .iter()
        .find(|r| r.category == Category::MediaOpportunity)
        .unwrap();
    assert_eq!(media.source, SourceKind::Media);
    assert_eq!(media.entities, vec!["Trade Weekly"]);
}
