use super::records_from_value;
use crate::domain::error::SourceError;
use crate::domain::ports::signal_source::{FilterHints, RawRecord, SignalSource};
use crate::domain::values::source_kind::SourceKind;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;

/// Environment variable prefix for per-kind endpoints, e.g.
/// `SIGNAL_INTEL_FEED_COMPETITOR=https://feeds.example.com/competitors`.
pub const FEED_ENV_PREFIX: &str = "SIGNAL_INTEL_FEED_";

/// REST feeds returning JSON arrays of raw records, one endpoint per kind.
pub struct HttpFeedSource {
    endpoints: BTreeMap<SourceKind, String>,
    /// Optional bearer token sent with every request.
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpFeedSource {
    pub fn new(endpoints: BTreeMap<SourceKind, String>, api_key: Option<String>) -> Self {
        Self {
            endpoints,
            api_key,
            client: reqwest::Client::builder()
                .user_agent("signal-intel/0.1")
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Build from `SIGNAL_INTEL_FEED_<KIND>` variables and an optional
    /// `SIGNAL_INTEL_FEED_API_KEY`. Kinds without a variable are not fetched.
    pub fn from_env() -> Self {
        let endpoints = SourceKind::ALL
            .into_iter()
            .filter_map(|kind| {
                let var = format!("{FEED_ENV_PREFIX}{}", kind.as_str().to_uppercase());
                std::env::var(var).ok().map(|url| (kind, url))
            })
            .collect();
        let api_key = std::env::var(format!("{FEED_ENV_PREFIX}API_KEY")).ok();
        Self::new(endpoints, api_key)
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

#[async_trait]
impl SignalSource for HttpFeedSource {
    fn name(&self) -> &str {
        "http"
    }

    fn kinds(&self) -> Vec<SourceKind> {
        self.endpoints.keys().copied().collect()
    }

    async fn fetch(
        &self,
        kind: SourceKind,
        hints: &FilterHints,
    ) -> Result<Vec<RawRecord>, SourceError> {
        let url = self.endpoints.get(&kind).ok_or_else(|| SourceError::Unavailable {
            kind,
            reason: "no endpoint configured".into(),
        })?;

        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(since) = hints.since {
            query.push(("since", since.to_rfc3339()));
        }
        if !hints.tracked_entities.is_empty() {
            query.push(("entities", hints.tracked_entities.join(",")));
        }

        let mut req = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .query(&query);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await.map_err(|e| SourceError::Unavailable {
            kind,
            reason: e.to_string(),
        })?;

        if !resp.status().is_success() {
            return Err(SourceError::Unavailable {
                kind,
                reason: format!("feed returned {}", resp.status()),
            });
        }

        let value: serde_json::Value = resp.json().await.map_err(|e| SourceError::Parse {
            kind,
            reason: e.to_string(),
        })?;
        records_from_value(kind, value)
    }
}
