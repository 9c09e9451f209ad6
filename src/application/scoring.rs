//! Scoring rubric.
//!
//! One rubric for every category. What differs per category is data: the
//! relevance factor table returned by [`relevance_factors`] and the
//! timeliness horizon in [`crate::domain::values::decay`].
//!
//! ```text
//! relevance      = Σ factor_i × weight_i                 (per-category table)
//! newsworthiness = timeliness×0.40 + impact×0.35 + uniqueness×0.25
//! priority       = round(relevance×0.4 + newsworthiness×0.4 + urgency×0.2)
//! final          = clamp(base × (0.5 + weight/100), 0, 100)   for all three
//! ```

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::domain::entities::scored_signal::ScoredSignal;
use crate::domain::entities::signal::Signal;
use crate::domain::values::category::Category;
use crate::domain::values::category_config::CategoryConfig;
use crate::domain::values::decay::{timeliness, urgency_factor};
use crate::domain::values::score::Score;
use crate::domain::values::urgency::UrgencyBucket;

/// Value used for any factor whose input is absent.
pub const NEUTRAL: f64 = 50.0;

const TIMELINESS_WEIGHT: f64 = 0.40;
const IMPACT_WEIGHT: f64 = 0.35;
const UNIQUENESS_WEIGHT: f64 = 0.25;

/// Uniqueness lost per other batch signal about the same entity set.
const UNIQUENESS_PENALTY_PER_PEER: f64 = 10.0;
const UNIQUENESS_PENALTY_CAP: f64 = 50.0;

/// Keyword hits needed for full keyword strength.
const KEYWORD_SATURATION: f64 = 3.0;

const PRIORITY_RELEVANCE: f64 = 0.4;
const PRIORITY_NEWSWORTHINESS: f64 = 0.4;
const PRIORITY_URGENCY: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelevanceFactor {
    /// Share of the signal's entities the organisation tracks.
    EntityOverlap,
    /// `relevance_hint` attribute from the source.
    RelevanceHint,
    /// Category keyword hits in title and description.
    KeywordStrength,
    Severity,
    Reach,
    Influence,
}

/// Relevance factor table per category. Weights in each row sum to 1.
pub fn relevance_factors(category: Category) -> &'static [(RelevanceFactor, f64)] {
    use RelevanceFactor::*;
    match category {
        Category::CompetitorMove => &[(EntityOverlap, 0.4), (RelevanceHint, 0.3), (KeywordStrength, 0.3)],
        Category::StakeholderActivity => &[(Influence, 0.4), (EntityOverlap, 0.3), (RelevanceHint, 0.3)],
        Category::MediaOpportunity => &[(KeywordStrength, 0.4), (Reach, 0.3), (RelevanceHint, 0.3)],
        Category::NarrativeGap => &[(KeywordStrength, 0.5), (RelevanceHint, 0.5)],
        Category::RegulatoryChange => &[(Severity, 0.4), (KeywordStrength, 0.3), (RelevanceHint, 0.3)],
        Category::RiskAlert => &[(Severity, 0.5), (EntityOverlap, 0.3), (RelevanceHint, 0.2)],
    }
}

/// Batch-wide inputs to the rubric. Built once per run; `now` is the only
/// clock the rubric ever sees.
#[derive(Debug, Clone)]
pub struct ScoringContext {
    now: DateTime<Utc>,
    tracked_entities: HashSet<String>,
    entity_set_counts: HashMap<Vec<String>, usize>,
}

impl ScoringContext {
    pub fn new(now: DateTime<Utc>, tracked_entities: &[String], batch: &[Signal]) -> Self {
        let mut entity_set_counts: HashMap<Vec<String>, usize> = HashMap::new();
        for signal in batch {
            let set = signal.entity_set();
            if !set.is_empty() {
                *entity_set_counts.entry(set).or_default() += 1;
            }
        }
        Self {
            now,
            tracked_entities: tracked_entities.iter().map(|e| e.trim().to_lowercase()).collect(),
            entity_set_counts,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// How many other signals in the batch concern exactly the same entities.
    fn peers(&self, signal: &Signal) -> usize {
        let set = signal.entity_set();
        if set.is_empty() {
            return 0;
        }
        self.entity_set_counts
            .get(&set)
            .map(|n| n.saturating_sub(1))
            .unwrap_or(0)
    }
}

fn factor_value(factor: RelevanceFactor, signal: &Signal, ctx: &ScoringContext) -> f64 {
    match factor {
        RelevanceFactor::EntityOverlap => {
            if ctx.tracked_entities.is_empty() {
                return NEUTRAL;
            }
            if signal.subject_entities.is_empty() {
                return 0.0;
            }
            let hits = signal
                .subject_entities
                .iter()
                .filter(|e| ctx.tracked_entities.contains(&e.to_lowercase()))
                .count();
            100.0 * hits as f64 / signal.subject_entities.len() as f64
        }
        RelevanceFactor::RelevanceHint => signal.attribute("relevance_hint").unwrap_or(NEUTRAL),
        RelevanceFactor::KeywordStrength => {
            let text = signal.searchable_text();
            let hits = signal
                .category
                .keywords()
                .iter()
                .filter(|kw| text.contains(*kw))
                .count();
            100.0 * hits as f64 / KEYWORD_SATURATION
        }
        RelevanceFactor::Severity => signal.attribute("severity").unwrap_or(NEUTRAL),
        RelevanceFactor::Reach => signal.attribute("reach").unwrap_or(NEUTRAL),
        RelevanceFactor::Influence => signal.attribute("influence").unwrap_or(NEUTRAL),
    }
}

fn clamp100(x: f64) -> f64 {
    Score::clamped(x).value()
}

/// Unweighted relevance: each factor clamped, weighted sum clamped again.
pub fn base_relevance(signal: &Signal, ctx: &ScoringContext) -> f64 {
    let sum: f64 = relevance_factors(signal.category)
        .iter()
        .map(|(factor, weight)| clamp100(factor_value(*factor, signal, ctx)) * weight)
        .sum();
    clamp100(sum)
}

/// Mean of the confidence and severity attributes that are present.
fn impact(signal: &Signal) -> f64 {
    let present: Vec<f64> = ["confidence", "severity"]
        .iter()
        .filter_map(|name| signal.attribute(name))
        .map(clamp100)
        .collect();
    if present.is_empty() {
        NEUTRAL
    } else {
        present.iter().sum::<f64>() / present.len() as f64
    }
}

fn uniqueness(signal: &Signal, ctx: &ScoringContext) -> f64 {
    let penalty = (ctx.peers(signal) as f64 * UNIQUENESS_PENALTY_PER_PEER).min(UNIQUENESS_PENALTY_CAP);
    100.0 - penalty
}

/// Unweighted newsworthiness.
pub fn base_newsworthiness(signal: &Signal, ctx: &ScoringContext) -> f64 {
    let t = timeliness(&signal.category, &signal.source_timestamp, &ctx.now);
    clamp100(
        clamp100(t) * TIMELINESS_WEIGHT
            + impact(signal) * IMPACT_WEIGHT
            + clamp100(uniqueness(signal, ctx)) * UNIQUENESS_WEIGHT,
    )
}

/// Composite before category weighting, rounded to a whole number.
pub fn base_priority(relevance: f64, newsworthiness: f64, urgency: f64) -> f64 {
    (relevance * PRIORITY_RELEVANCE + newsworthiness * PRIORITY_NEWSWORTHINESS + urgency * PRIORITY_URGENCY)
        .round()
}

/// Apply the category weight: `base × (0.5 + weight/100)`, clamped to [0, 100].
pub fn weighted(base: f64, config: &CategoryConfig) -> Score {
    Score::clamped(base * config.multiplier())
}

/// Score one signal. Callers filter disabled categories before this point.
pub fn score(signal: &Signal, config: &CategoryConfig, ctx: &ScoringContext) -> ScoredSignal {
    let relevance = base_relevance(signal, ctx);
    let newsworthiness = base_newsworthiness(signal, ctx);
    let window_end = if signal.category.is_window_less() {
        None
    } else {
        signal.window_end.as_ref()
    };
    let urgency = urgency_factor(window_end, &ctx.now);
    let priority = base_priority(relevance, newsworthiness, urgency);

    ScoredSignal {
        signal: signal.clone(),
        relevance_score: weighted(relevance, config),
        newsworthiness_score: weighted(newsworthiness, config),
        priority_score: Score::clamped(weighted(priority, config).value().round()),
        urgency_bucket: UrgencyBucket::classify(signal.category, signal.window_end, ctx.now),
    }
}
