use crate::domain::entities::signal::{MergeKey, Signal};
use crate::domain::values::score::Score;
use crate::domain::values::urgency::UrgencyBucket;
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredSignal {
    pub signal: Signal,
    pub relevance_score: Score,
    pub newsworthiness_score: Score,
    /// Composite used for ranking; always a whole number.
    pub priority_score: Score,
    pub urgency_bucket: UrgencyBucket,
}

impl ScoredSignal {
    pub fn id(&self) -> &str {
        &self.signal.id
    }

    pub fn merge_key(&self) -> MergeKey {
        self.signal.merge_key()
    }

    /// Output order: priority descending, then more recent first, then id
    /// ascending. Total, so sorting is deterministic.
    pub fn rank_cmp(&self, other: &ScoredSignal) -> Ordering {
        other
            .priority_score
            .total_cmp(&self.priority_score)
            .then_with(|| other.signal.source_timestamp.cmp(&self.signal.source_timestamp))
            .then_with(|| self.signal.id.cmp(&other.signal.id))
    }
}
