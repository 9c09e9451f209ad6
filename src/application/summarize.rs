use crate::domain::entities::opportunity_set::RankedOpportunitySet;
use crate::domain::values::category::Category;
use crate::domain::values::urgency::UrgencyBucket;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Insight view over a ranked set: what kinds of opportunity dominate, how
/// urgent they are, and which entities keep coming up.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpportunityDigest {
    pub computed_at: DateTime<Utc>,
    pub total_opportunities: usize,
    pub by_category: Vec<CategorySummary>,
    pub by_urgency: Vec<UrgencyCount>,
    pub top_entities: Vec<EntityMention>,
    pub degraded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub category: Category,
    pub count: usize,
    pub top_id: String,
    pub top_title: String,
    pub top_priority: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UrgencyCount {
    pub urgency: UrgencyBucket,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityMention {
    pub entity: String,
    pub count: usize,
}

const TOP_ENTITIES: usize = 10;

/// Build a digest. The set is already ranked, so the first opportunity seen
/// for each category is its strongest.
pub fn summarize(set: &RankedOpportunitySet) -> OpportunityDigest {
    let mut cat_map: BTreeMap<Category, CategorySummary> = BTreeMap::new();
    for o in &set.opportunities {
        cat_map
            .entry(o.signal.category)
            .and_modify(|c| c.count += 1)
            .or_insert_with(|| CategorySummary {
                category: o.signal.category,
                count: 1,
                top_id: o.signal.id.clone(),
                top_title: o.signal.title.clone(),
                top_priority: o.priority_score.value(),
            });
    }
    let mut by_category: Vec<CategorySummary> = cat_map.into_values().collect();
    by_category.sort_by(|a, b| b.count.cmp(&a.count).then(a.category.cmp(&b.category)));

    let by_urgency = UrgencyBucket::ALL
        .into_iter()
        .map(|urgency| UrgencyCount {
            urgency,
            count: set
                .opportunities
                .iter()
                .filter(|o| o.urgency_bucket == urgency)
                .count(),
        })
        .collect();

    let mut entity_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for o in &set.opportunities {
        for entity in &o.signal.subject_entities {
            *entity_counts.entry(entity.as_str()).or_default() += 1;
        }
    }
    let mut top_entities: Vec<EntityMention> = entity_counts
        .into_iter()
        .map(|(entity, count)| EntityMention {
            entity: entity.to_string(),
            count,
        })
        .collect();
    // BTreeMap order makes the tie-break alphabetical; the sort is stable.
    top_entities.sort_by(|a, b| b.count.cmp(&a.count));
    top_entities.truncate(TOP_ENTITIES);

    OpportunityDigest {
        computed_at: set.computed_at,
        total_opportunities: set.opportunities.len(),
        by_category,
        by_urgency,
        top_entities,
        degraded: !set.diagnostics.source_failures.is_empty(),
    }
}
