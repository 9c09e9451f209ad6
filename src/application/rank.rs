//! Ranker and window filter.

use chrono::{DateTime, Utc};

use crate::domain::entities::scored_signal::ScoredSignal;
use crate::domain::values::urgency::UrgencyBucket;

/// Filtering policy for one ranking pass.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RankPolicy {
    pub minimum_score: f64,
    pub max_results: Option<usize>,
}

/// Ranked survivors plus what each filter removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankOutcome {
    pub ranked: Vec<ScoredSignal>,
    pub expired: usize,
    pub below_minimum: usize,
    pub over_limit: usize,
}

/// Drop expired and below-floor signals, recompute urgency against `now`,
/// sort by the output order and apply the result cap.
pub fn rank_and_filter(
    scored: Vec<ScoredSignal>,
    policy: &RankPolicy,
    now: DateTime<Utc>,
) -> RankOutcome {
    let mut outcome = RankOutcome::default();

    let mut ranked: Vec<ScoredSignal> = Vec::with_capacity(scored.len());
    for mut s in scored {
        if s.signal.is_expired(&now) {
            outcome.expired += 1;
            continue;
        }
        if s.priority_score.value() < policy.minimum_score {
            outcome.below_minimum += 1;
            continue;
        }
        s.urgency_bucket = UrgencyBucket::classify(s.signal.category, s.signal.window_end, now);
        ranked.push(s);
    }

    ranked.sort_by(|a, b| a.rank_cmp(b));

    if let Some(max) = policy.max_results {
        if ranked.len() > max {
            outcome.over_limit = ranked.len() - max;
            ranked.truncate(max);
        }
    }

    outcome.ranked = ranked;
    outcome
}
