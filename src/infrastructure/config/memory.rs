use crate::domain::error::DomainError;
use crate::domain::ports::config_store::{ConfigRepository, ConfigStore};
use crate::domain::values::category::Category;
use crate::domain::values::category_config::{CategoryConfig, EngineSettings};
use std::collections::BTreeMap;
use std::sync::RwLock;

#[derive(Debug, Default)]
struct State {
    categories: BTreeMap<Category, CategoryConfig>,
    settings: EngineSettings,
}

/// Process-local config store. Used by tests, by `--config` files and as the
/// store behind one-off library runs.
#[derive(Debug, Default)]
pub struct InMemoryConfigStore {
    state: RwLock<State>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(self, category: Category, config: CategoryConfig) -> Self {
        if let Ok(mut state) = self.state.write() {
            state.categories.insert(category, config);
        }
        self
    }

    pub fn with_settings(self, settings: EngineSettings) -> Self {
        if let Ok(mut state) = self.state.write() {
            state.settings = settings;
        }
        self
    }

    pub fn with_minimum_score(self, score: f64) -> Self {
        if let Ok(mut state) = self.state.write() {
            state.settings.minimum_score = score;
        }
        self
    }

    pub fn with_tracked_entities<I, S>(self, entities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Ok(mut state) = self.state.write() {
            state.settings.tracked_entities = entities.into_iter().map(Into::into).collect();
        }
        self
    }

    /// Every category config that differs from the default.
    pub fn customised_categories(&self) -> Result<BTreeMap<Category, CategoryConfig>, DomainError> {
        Ok(self.read()?.categories.clone())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, State>, DomainError> {
        self.state
            .read()
            .map_err(|e| DomainError::Database(format!("config lock poisoned: {e}")))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, State>, DomainError> {
        self.state
            .write()
            .map_err(|e| DomainError::Database(format!("config lock poisoned: {e}")))
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn category_config(&self, category: Category) -> Result<CategoryConfig, DomainError> {
        Ok(self
            .read()?
            .categories
            .get(&category)
            .copied()
            .unwrap_or_default())
    }

    fn settings(&self) -> Result<EngineSettings, DomainError> {
        Ok(self.read()?.settings.clone())
    }
}

impl ConfigRepository for InMemoryConfigStore {
    fn set_category_config(
        &self,
        category: Category,
        config: CategoryConfig,
    ) -> Result<(), DomainError> {
        let config = CategoryConfig::new(config.enabled, config.weight)
            .map_err(DomainError::InvalidInput)?;
        self.write()?.categories.insert(category, config);
        Ok(())
    }

    fn set_minimum_score(&self, score: f64) -> Result<(), DomainError> {
        if !(0.0..=100.0).contains(&score) {
            return Err(DomainError::InvalidInput(format!(
                "Minimum score must be between 0 and 100, got {score}"
            )));
        }
        self.write()?.settings.minimum_score = score;
        Ok(())
    }

    fn set_fallback_category(&self, category: Option<Category>) -> Result<(), DomainError> {
        self.write()?.settings.fallback_category = category;
        Ok(())
    }

    fn set_max_results(&self, max: Option<usize>) -> Result<(), DomainError> {
        self.write()?.settings.max_results = max;
        Ok(())
    }

    fn set_feed_timeout_ms(&self, timeout_ms: u64) -> Result<(), DomainError> {
        if timeout_ms == 0 {
            return Err(DomainError::InvalidInput("Feed timeout must be positive".into()));
        }
        self.write()?.settings.feed_timeout_ms = timeout_ms;
        Ok(())
    }

    fn set_lookback_hours(&self, hours: u32) -> Result<(), DomainError> {
        if hours == 0 {
            return Err(DomainError::InvalidInput("Lookback must be at least one hour".into()));
        }
        self.write()?.settings.lookback_hours = hours;
        Ok(())
    }

    fn track_entity(&self, entity: &str) -> Result<bool, DomainError> {
        let entity = entity.trim();
        if entity.is_empty() {
            return Err(DomainError::InvalidInput("Entity name must not be empty".into()));
        }
        let mut state = self.write()?;
        let tracked = &mut state.settings.tracked_entities;
        if tracked.iter().any(|e| e.eq_ignore_ascii_case(entity)) {
            return Ok(false);
        }
        tracked.push(entity.to_string());
        Ok(true)
    }

    fn untrack_entity(&self, entity: &str) -> Result<bool, DomainError> {
        let entity = entity.trim();
        let mut state = self.write()?;
        let tracked = &mut state.settings.tracked_entities;
        let before = tracked.len();
        tracked.retain(|e| !e.eq_ignore_ascii_case(entity));
        Ok(tracked.len() != before)
    }
}
