use crate::domain::error::DomainError;
use crate::domain::values::category::Category;
use crate::domain::values::category_config::{CategoryConfig, EngineSettings};

/// Read side of configuration. Any error here makes the run fail with
/// `ConfigUnavailable`; stores must return defaults, not errors, for
/// categories nobody customised.
pub trait ConfigStore: Send + Sync {
    fn category_config(&self, category: Category) -> Result<CategoryConfig, DomainError>;

    fn settings(&self) -> Result<EngineSettings, DomainError>;

    fn minimum_score(&self) -> Result<f64, DomainError> {
        Ok(self.settings()?.minimum_score)
    }
}

/// Write side, used by the CLI and the facade.
pub trait ConfigRepository: ConfigStore {
    fn set_category_config(
        &self,
        category: Category,
        config: CategoryConfig,
    ) -> Result<(), DomainError>;

    fn set_minimum_score(&self, score: f64) -> Result<(), DomainError>;

    fn set_fallback_category(&self, category: Option<Category>) -> Result<(), DomainError>;

    fn set_max_results(&self, max: Option<usize>) -> Result<(), DomainError>;

    fn set_feed_timeout_ms(&self, timeout_ms: u64) -> Result<(), DomainError>;

    /// How far back sources are asked to look. Must be positive.
    fn set_lookback_hours(&self, hours: u32) -> Result<(), DomainError>;

    /// Returns false when the entity was already tracked.
    fn track_entity(&self, entity: &str) -> Result<bool, DomainError>;

    /// Returns false when the entity was not tracked.
    fn untrack_entity(&self, entity: &str) -> Result<bool, DomainError>;
}
