use crate::domain::entities::scored_signal::ScoredSignal;
use crate::domain::values::category::Category;
use crate::domain::values::source_kind::SourceKind;
use crate::domain::values::urgency::UrgencyBucket;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Number of signals seen or dropped at each stage of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StageCounts {
    pub records_fetched: usize,
    pub normalization_failed: usize,
    pub disabled_category: usize,
    pub scored: usize,
    pub duplicates_merged: usize,
    pub expired: usize,
    pub below_minimum: usize,
    pub over_limit: usize,
    pub returned: usize,
}

/// A source kind that contributed no records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFailure {
    pub source: SourceKind,
    pub timed_out: bool,
    pub reason: String,
}

/// A raw record the normalizer rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    pub source: SourceKind,
    /// Position of the record in its source's batch.
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub source_failures: Vec<SourceFailure>,
    pub skipped_records: Vec<SkippedRecord>,
}

impl Diagnostics {
    pub fn is_clean(&self) -> bool {
        self.source_failures.is_empty() && self.skipped_records.is_empty()
    }
}

/// Output of one pipeline run. A value: recomputed on every run, never patched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedOpportunitySet {
    pub computed_at: DateTime<Utc>,
    pub opportunities: Vec<ScoredSignal>,
    pub stage_counts: StageCounts,
    pub diagnostics: Diagnostics,
}

/// Flat, display-ready row. Field names are stable for a given crate version.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpportunityRecord {
    pub rank: usize,
    pub id: String,
    pub category: Category,
    pub source: SourceKind,
    pub title: String,
    pub description: String,
    pub priority_score: f64,
    pub relevance_score: f64,
    pub newsworthiness_score: f64,
    pub urgency: UrgencyBucket,
    pub source_timestamp: DateTime<Utc>,
    pub window_end: Option<DateTime<Utc>>,
    pub entities: Vec<String>,
}

impl RankedOpportunitySet {
    pub fn len(&self) -> usize {
        self.opportunities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.opportunities.is_empty()
    }

    pub fn records(&self) -> Vec<OpportunityRecord> {
        self.opportunities
            .iter()
            .enumerate()
            .map(|(i, o)| OpportunityRecord {
                rank: i + 1,
                id: o.signal.id.clone(),
                category: o.signal.category,
                source: o.signal.source_kind,
                title: o.signal.title.clone(),
                description: o.signal.description.clone(),
                priority_score: o.priority_score.value(),
                relevance_score: o.relevance_score.value(),
                newsworthiness_score: o.newsworthiness_score.value(),
                urgency: o.urgency_bucket,
                source_timestamp: o.signal.source_timestamp,
                window_end: o.signal.window_end,
                entities: o.signal.subject_entities.clone(),
            })
            .collect()
    }
}
