//! Deduplicator: one survivor per merge key.
//!
//! Sort by `(merge key, rank order)` and keep the first of each run, so the
//! whole pass is O(n log n). Survivors are returned untouched; nothing from a
//! discarded duplicate is folded into them.

use crate::domain::entities::scored_signal::ScoredSignal;

/// Collapse signals sharing `(category, sorted entities)`. The survivor has
/// the highest priority, then the most recent timestamp, then the smallest id.
/// Output is in merge-key order; ranking happens downstream.
pub fn deduplicate(scored: Vec<ScoredSignal>) -> Vec<ScoredSignal> {
    let mut keyed: Vec<_> = scored.into_iter().map(|s| (s.merge_key(), s)).collect();
    keyed.sort_by(|(ka, a), (kb, b)| ka.cmp(kb).then_with(|| a.rank_cmp(b)));

    let mut out: Vec<ScoredSignal> = Vec::with_capacity(keyed.len());
    let mut last_key = None;
    for (key, signal) in keyed {
        if last_key.as_ref() == Some(&key) {
            continue;
        }
        last_key = Some(key);
        out.push(signal);
    }
    out
}
