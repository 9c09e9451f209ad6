use crate::domain::error::SourceError;
use crate::domain::values::category::Category;
use crate::domain::values::source_kind::SourceKind;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// One record as delivered by a feed, before normalization.
pub type RawRecord = serde_json::Value;

/// Hints a source may use to narrow what it returns. Sources are free to
/// ignore them; the pipeline filters again downstream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterHints {
    pub since: Option<DateTime<Utc>>,
    pub tracked_entities: Vec<String>,
    pub categories: Vec<Category>,
}

/// Supplies raw records per source kind.
#[async_trait]
pub trait SignalSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Source kinds this source serves. The pipeline fetches them in parallel.
    fn kinds(&self) -> Vec<SourceKind>;

    /// Fetch raw records for one kind.
    async fn fetch(
        &self,
        kind: SourceKind,
        hints: &FilterHints,
    ) -> Result<Vec<RawRecord>, SourceError>;
}
