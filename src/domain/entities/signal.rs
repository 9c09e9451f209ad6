use crate::domain::values::category::Category;
use crate::domain::values::source_kind::SourceKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A normalized unit of intelligence, rebuilt from the raw feeds on every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub id: String,
    pub category: Category,
    pub source_kind: SourceKind,
    pub title: String,
    pub description: String,
    pub source_timestamp: DateTime<Utc>,
    pub window_end: Option<DateTime<Utc>>,
    /// Source-specific fields kept for scoring and explanation. Canonical
    /// scoring inputs (`relevance_hint`, `confidence`, `severity`, `reach`,
    /// `influence`) are stored as 0–100 numbers.
    pub raw_attributes: BTreeMap<String, serde_json::Value>,
    /// Ordered, duplicate-free list of the entities the signal concerns.
    pub subject_entities: Vec<String>,
}

/// `(category, entity set)`: two signals with the same key describe the
/// same underlying event.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MergeKey {
    pub category: Category,
    pub entities: Vec<String>,
}

impl Signal {
    /// Lowercased, sorted, duplicate-free entity names. The one notion of
    /// "same entities" used by both merging and uniqueness scoring.
    pub fn entity_set(&self) -> Vec<String> {
        let mut set: Vec<String> = self
            .subject_entities
            .iter()
            .map(|e| e.to_lowercase())
            .collect();
        set.sort();
        set.dedup();
        set
    }

    pub fn merge_key(&self) -> MergeKey {
        MergeKey {
            category: self.category,
            entities: self.entity_set(),
        }
    }

    /// Numeric attribute lookup. Non-numeric values read as absent.
    pub fn attribute(&self, name: &str) -> Option<f64> {
        self.raw_attributes.get(name).and_then(|v| v.as_f64())
    }

    /// Lowercased title and description for keyword matching.
    pub fn searchable_text(&self) -> String {
        format!("{} {}", self.title, self.description).to_lowercase()
    }

    pub fn is_expired(&self, now: &DateTime<Utc>) -> bool {
        if self.category.is_window_less() {
            return false;
        }
        matches!(self.window_end, Some(end) if end < *now)
    }
}
