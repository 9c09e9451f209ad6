pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;

use crate::application::pipeline::{AggregationPipeline, CancelHandle};
use crate::application::summarize::{summarize, OpportunityDigest};
use crate::domain::entities::opportunity_set::RankedOpportunitySet;
use crate::domain::error::{DomainError, PipelineError};
use crate::domain::ports::config_store::ConfigRepository;
use crate::domain::ports::signal_source::SignalSource;
use crate::domain::values::category::Category;
use crate::domain::values::category_config::{CategoryConfig, EngineSettings};
use crate::infrastructure::config::file::from_json_file;
use crate::infrastructure::sqlite::config_repo::SqliteConfigStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// Current configuration as shown by `config show`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigSnapshot {
    pub settings: EngineSettings,
    pub categories: Vec<CategoryEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryEntry {
    pub category: Category,
    pub enabled: bool,
    pub weight: f64,
    pub window_less: bool,
}

pub struct SignalIntel {
    config: Arc<dyn ConfigRepository>,
}

impl SignalIntel {
    /// Open with a SQLite-backed config store at `db_path`.
    pub fn new(db_path: &str) -> Result<Self, DomainError> {
        let store = SqliteConfigStore::open(db_path)?;
        Ok(Self::with_store(Arc::new(store)))
    }

    /// Load configuration from a JSON file instead of the database. Changes
    /// made through the returned instance are not written back.
    pub fn from_config_file(path: &Path) -> Result<Self, DomainError> {
        Ok(Self::with_store(Arc::new(from_json_file(path)?)))
    }

    pub fn with_store(config: Arc<dyn ConfigRepository>) -> Self {
        Self { config }
    }

    pub async fn run(
        &self,
        source: &dyn SignalSource,
        now: DateTime<Utc>,
    ) -> Result<RankedOpportunitySet, PipelineError> {
        self.run_with_cancel(source, now, CancelHandle::new()).await
    }

    /// Run once under `cancel`. The handle only affects this run; later runs
    /// start uncancelled.
    pub async fn run_with_cancel(
        &self,
        source: &dyn SignalSource,
        now: DateTime<Utc>,
        cancel: CancelHandle,
    ) -> Result<RankedOpportunitySet, PipelineError> {
        AggregationPipeline::with_cancel(cancel)
            .run(source, self.config.as_ref(), now)
            .await
    }

    pub async fn digest(
        &self,
        source: &dyn SignalSource,
        now: DateTime<Utc>,
    ) -> Result<OpportunityDigest, PipelineError> {
        let set = self.run(source, now).await?;
        Ok(summarize(&set))
    }

    pub fn settings(&self) -> Result<EngineSettings, DomainError> {
        self.config.settings()
    }

    pub fn categories(&self) -> Result<Vec<CategoryEntry>, DomainError> {
        Category::ALL
            .into_iter()
            .map(|category| {
                let cfg = self.config.category_config(category)?;
                Ok(CategoryEntry {
                    category,
                    enabled: cfg.enabled,
                    weight: cfg.weight,
                    window_less: category.is_window_less(),
                })
            })
            .collect()
    }

    pub fn snapshot(&self) -> Result<ConfigSnapshot, DomainError> {
        Ok(ConfigSnapshot {
            settings: self.settings()?,
            categories: self.categories()?,
        })
    }

    /// Update one category. Fields left as `None` keep their current value.
    pub fn configure_category(
        &self,
        category: Category,
        enabled: Option<bool>,
        weight: Option<f64>,
    ) -> Result<CategoryConfig, DomainError> {
        let current = self.config.category_config(category)?;
        let updated = CategoryConfig::new(
            enabled.unwrap_or(current.enabled),
            weight.unwrap_or(current.weight),
        )
        .map_err(DomainError::InvalidInput)?;
        self.config.set_category_config(category, updated)?;
        Ok(updated)
    }

    pub fn set_minimum_score(&self, score: f64) -> Result<(), DomainError> {
        self.config.set_minimum_score(score)
    }

    pub fn set_fallback_category(&self, category: Option<Category>) -> Result<(), DomainError> {
        self.config.set_fallback_category(category)
    }

    pub fn set_max_results(&self, max: Option<usize>) -> Result<(), DomainError> {
        self.config.set_max_results(max)
    }

    pub fn set_feed_timeout_ms(&self, timeout_ms: u64) -> Result<(), DomainError> {
        self.config.set_feed_timeout_ms(timeout_ms)
    }

    pub fn set_lookback_hours(&self, hours: u32) -> Result<(), DomainError> {
        self.config.set_lookback_hours(hours)
    }

    pub fn track_entity(&self, entity: &str) -> Result<bool, DomainError> {
        self.config.track_entity(entity)
    }

    pub fn untrack_entity(&self, entity: &str) -> Result<bool, DomainError> {
        self.config.untrack_entity(entity)
    }
}
