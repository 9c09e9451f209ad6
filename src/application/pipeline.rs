//! Aggregation pipeline: fetches every source kind, then normalizes,
//! scores, deduplicates and ranks into a [`RankedOpportunitySet`].
//!
//! Stages run in order `Fetching → Normalizing → Scoring → Deduplicating →
//! Ranking → Done`. Per-record and per-source problems become diagnostics on
//! the result; config store failures, cancellation and invariant breaches end
//! the run with a [`PipelineError`].

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::application::dedup::deduplicate;
use crate::application::normalize::Normalizer;
use crate::application::rank::{rank_and_filter, RankPolicy};
use crate::application::scoring::{score, ScoringContext};
use crate::domain::entities::opportunity_set::{
    Diagnostics, RankedOpportunitySet, SkippedRecord, SourceFailure, StageCounts,
};
use crate::domain::entities::scored_signal::ScoredSignal;
use crate::domain::entities::signal::Signal;
use crate::domain::error::{DomainError, PipelineError, SourceError};
use crate::domain::ports::config_store::ConfigStore;
use crate::domain::ports::signal_source::{FilterHints, RawRecord, SignalSource};
use crate::domain::values::category::Category;
use crate::domain::values::category_config::{CategoryConfig, EngineSettings};
use crate::domain::values::pipeline_stage::PipelineStage;
use crate::domain::values::source_kind::SourceKind;

/// Cooperative cancellation, checked at every stage boundary. Cloning shares
/// the flag.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Run the pipeline once with no cancellation.
pub async fn run<C>(
    source: &dyn SignalSource,
    config: &C,
    now: DateTime<Utc>,
) -> Result<RankedOpportunitySet, PipelineError>
where
    C: ConfigStore + ?Sized,
{
    AggregationPipeline::new().run(source, config, now).await
}

#[derive(Debug, Clone, Default)]
pub struct AggregationPipeline {
    cancel: CancelHandle,
}

/// Configuration resolved once at the start of a run.
struct RunConfig {
    settings: EngineSettings,
    categories: BTreeMap<Category, CategoryConfig>,
}

impl AggregationPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancel(cancel: CancelHandle) -> Self {
        Self { cancel }
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Compute a ranked opportunity set. `now` is the only clock the run uses,
    /// so equal inputs give equal outputs.
    pub async fn run<C>(
        &self,
        source: &dyn SignalSource,
        config: &C,
        now: DateTime<Utc>,
    ) -> Result<RankedOpportunitySet, PipelineError>
    where
        C: ConfigStore + ?Sized,
    {
        let result = self.run_stages(source, config, now).await;
        if let Err(e) = &result {
            warn!(
                state = %PipelineStage::Errored,
                stage = %e.stage(),
                error = %e,
                "opportunity run failed"
            );
        }
        result
    }

    async fn run_stages<C>(
        &self,
        source: &dyn SignalSource,
        config: &C,
        now: DateTime<Utc>,
    ) -> Result<RankedOpportunitySet, PipelineError>
    where
        C: ConfigStore + ?Sized,
    {
        let mut counts = StageCounts::default();
        let mut diagnostics = Diagnostics::default();

        // Fetching
        self.enter(PipelineStage::Fetching)?;
        let run_config = load_config(config, PipelineStage::Fetching)?;
        let batches = fetch_all(source, &run_config, now, &mut diagnostics).await;
        counts.records_fetched = batches.iter().map(|(_, records)| records.len()).sum();

        // Normalizing
        self.enter(PipelineStage::Normalizing)?;
        let normalizer = Normalizer::new(run_config.settings.fallback_category);
        let mut signals: Vec<Signal> = Vec::with_capacity(counts.records_fetched);
        for (kind, records) in &batches {
            for (index, raw) in records.iter().enumerate() {
                match normalizer.normalize(raw, *kind) {
                    Ok(signal) => signals.push(signal),
                    Err(e) => {
                        debug!(source = %kind, index, reason = %e, "skipping raw record");
                        diagnostics.skipped_records.push(SkippedRecord {
                            source: *kind,
                            index,
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }
        counts.normalization_failed = diagnostics.skipped_records.len();
        if counts.normalization_failed > 0 {
            warn!(
                skipped = counts.normalization_failed,
                "raw records failed normalization"
            );
        }

        // Scoring
        self.enter(PipelineStage::Scoring)?;
        let before = signals.len();
        signals.retain(|s| run_config.config_for(s.category).enabled);
        counts.disabled_category = before - signals.len();
        let before = signals.len();
        signals.retain(|s| !s.is_expired(&now));
        counts.expired = before - signals.len();
        let ctx = ScoringContext::new(now, &run_config.settings.tracked_entities, &signals);
        let scored: Vec<ScoredSignal> = signals
            .iter()
            .map(|s| score(s, &run_config.config_for(s.category), &ctx))
            .collect();
        counts.scored = scored.len();

        // Deduplicating
        self.enter(PipelineStage::Deduplicating)?;
        let unique = deduplicate(scored);
        counts.duplicates_merged = counts.scored - unique.len();
        check_unique_keys(&unique)?;

        // Ranking
        self.enter(PipelineStage::Ranking)?;
        let policy = RankPolicy {
            minimum_score: run_config.settings.minimum_score,
            max_results: run_config.settings.max_results,
        };
        let outcome = rank_and_filter(unique, &policy, now);
        counts.expired += outcome.expired;
        counts.below_minimum = outcome.below_minimum;
        counts.over_limit = outcome.over_limit;
        check_ranked(&outcome.ranked, &run_config, now)?;
        counts.returned = outcome.ranked.len();

        info!(
            stage = %PipelineStage::Done,
            fetched = counts.records_fetched,
            returned = counts.returned,
            failed_sources = diagnostics.source_failures.len(),
            skipped_records = counts.normalization_failed,
            "opportunity run complete"
        );

        Ok(RankedOpportunitySet {
            computed_at: now,
            opportunities: outcome.ranked,
            stage_counts: counts,
            diagnostics,
        })
    }

    fn enter(&self, stage: PipelineStage) -> Result<(), PipelineError> {
        if self.cancel.is_cancelled() {
            info!(stage = %stage, "run cancelled at stage boundary");
            return Err(PipelineError::Cancelled { stage });
        }
        debug!(stage = %stage, "entering stage");
        Ok(())
    }
}

impl RunConfig {
    fn config_for(&self, category: Category) -> CategoryConfig {
        self.categories.get(&category).copied().unwrap_or_default()
    }
}

fn config_unavailable(stage: PipelineStage) -> impl Fn(DomainError) -> PipelineError {
    move |e| PipelineError::ConfigUnavailable {
        stage,
        reason: e.to_string(),
    }
}

fn load_config<C>(config: &C, stage: PipelineStage) -> Result<RunConfig, PipelineError>
where
    C: ConfigStore + ?Sized,
{
    let settings = config.settings().map_err(config_unavailable(stage))?;
    let mut categories = BTreeMap::new();
    for category in Category::ALL {
        let cfg = config
            .category_config(category)
            .map_err(config_unavailable(stage))?;
        categories.insert(category, cfg);
    }
    Ok(RunConfig {
        settings,
        categories,
    })
}

/// Fan out one fetch per source kind, each bounded by the feed timeout.
/// Failed or slow kinds contribute no records and leave a diagnostic.
async fn fetch_all(
    source: &dyn SignalSource,
    run_config: &RunConfig,
    now: DateTime<Utc>,
    diagnostics: &mut Diagnostics,
) -> Vec<(SourceKind, Vec<RawRecord>)> {
    let mut kinds = source.kinds();
    kinds.sort();
    kinds.dedup();

    let hints = FilterHints {
        since: Some(now - chrono::Duration::hours(run_config.settings.lookback_hours as i64)),
        tracked_entities: run_config.settings.tracked_entities.clone(),
        categories: run_config
            .categories
            .iter()
            .filter(|(_, cfg)| cfg.enabled)
            .map(|(cat, _)| *cat)
            .collect(),
    };
    let timeout_ms = run_config.settings.feed_timeout_ms;
    let budget = Duration::from_millis(timeout_ms);

    let fetches = kinds.iter().map(|kind| {
        let hints = &hints;
        async move {
            let result = match tokio::time::timeout(budget, source.fetch(*kind, hints)).await {
                Ok(result) => result,
                Err(_) => Err(SourceError::Timeout {
                    kind: *kind,
                    timeout_ms,
                }),
            };
            (*kind, result)
        }
    });
    let results = futures::future::join_all(fetches).await;

    let mut batches = Vec::with_capacity(results.len());
    for (kind, result) in results {
        match result {
            Ok(records) => {
                debug!(source = %kind, records = records.len(), "fetched");
                batches.push((kind, records));
            }
            Err(e) => {
                warn!(source = %kind, feed = source.name(), error = %e, "source unavailable");
                diagnostics.source_failures.push(SourceFailure {
                    source: kind,
                    timed_out: matches!(e, SourceError::Timeout { .. }),
                    reason: e.to_string(),
                });
            }
        }
    }
    batches
}

fn check_unique_keys(signals: &[ScoredSignal]) -> Result<(), PipelineError> {
    let mut keys: Vec<_> = signals.iter().map(|s| s.merge_key()).collect();
    keys.sort();
    if let Some(pair) = keys.windows(2).find(|w| w[0] == w[1]) {
        return Err(PipelineError::InvariantViolation {
            stage: PipelineStage::Deduplicating,
            detail: format!(
                "merge key ({}, {:?}) survived deduplication twice",
                pair[0].category, pair[0].entities
            ),
        });
    }
    Ok(())
}

fn check_ranked(
    ranked: &[ScoredSignal],
    run_config: &RunConfig,
    now: DateTime<Utc>,
) -> Result<(), PipelineError> {
    let violation = |detail: String| PipelineError::InvariantViolation {
        stage: PipelineStage::Ranking,
        detail,
    };
    for s in ranked {
        if !run_config.config_for(s.signal.category).enabled {
            return Err(violation(format!("{} belongs to a disabled category", s.id())));
        }
        if s.priority_score.value() < run_config.settings.minimum_score {
            return Err(violation(format!("{} is below the minimum score", s.id())));
        }
        if s.signal.is_expired(&now) {
            return Err(violation(format!("{} is expired", s.id())));
        }
    }
    if let Some(pair) = ranked.windows(2).find(|w| w[0].rank_cmp(&w[1]).is_gt()) {
        return Err(violation(format!(
            "{} is ranked above {} out of order",
            pair[0].id(),
            pair[1].id()
        )));
    }
    Ok(())
}
