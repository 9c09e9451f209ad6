use crate::domain::error::SourceError;
use crate::domain::ports::signal_source::{FilterHints, RawRecord, SignalSource};
use crate::domain::values::source_kind::SourceKind;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug, Clone)]
enum FixtureFeed {
    Records(Vec<RawRecord>),
    Delayed(Duration, Vec<RawRecord>),
    Unavailable(String),
}

/// In-memory source with canned per-kind behaviour. Used by tests and for
/// replaying captured feeds.
#[derive(Debug, Clone, Default)]
pub struct FixtureSource {
    feeds: BTreeMap<SourceKind, FixtureFeed>,
}

impl FixtureSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(mut self, kind: SourceKind, records: Vec<RawRecord>) -> Self {
        self.feeds.insert(kind, FixtureFeed::Records(records));
        self
    }

    /// Records that only arrive after `delay`.
    pub fn with_delay(mut self, kind: SourceKind, delay: Duration, records: Vec<RawRecord>) -> Self {
        self.feeds.insert(kind, FixtureFeed::Delayed(delay, records));
        self
    }

    pub fn with_failure(mut self, kind: SourceKind, reason: &str) -> Self {
        self.feeds
            .insert(kind, FixtureFeed::Unavailable(reason.to_string()));
        self
    }
}

#[async_trait]
impl SignalSource for FixtureSource {
    fn name(&self) -> &str {
        "fixture"
    }

    fn kinds(&self) -> Vec<SourceKind> {
        self.feeds.keys().copied().collect()
    }

    async fn fetch(
        &self,
        kind: SourceKind,
        _hints: &FilterHints,
    ) -> Result<Vec<RawRecord>, SourceError> {
        match self.feeds.get(&kind) {
            Some(FixtureFeed::Records(records)) => Ok(records.clone()),
            Some(FixtureFeed::Delayed(delay, records)) => {
                tokio::time::sleep(*delay).await;
                Ok(records.clone())
            }
            Some(FixtureFeed::Unavailable(reason)) => Err(SourceError::Unavailable {
                kind,
                reason: reason.clone(),
            }),
            None => Err(SourceError::Unavailable {
                kind,
                reason: "no fixture registered".into(),
            }),
        }
    }
}
