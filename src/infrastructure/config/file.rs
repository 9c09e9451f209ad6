//! JSON config files.
//!
//! ```json
//! {
//!   "categories": { "media_opportunity": { "enabled": true, "weight": 80 } },
//!   "settings": { "minimum_score": 40, "tracked_entities": ["Acme"] }
//! }
//! ```
//!
//! Both sections are optional; anything left out keeps its default.

use super::memory::InMemoryConfigStore;
use crate::domain::error::DomainError;
use crate::domain::values::category::Category;
use crate::domain::values::category_config::{CategoryConfig, EngineSettings};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    categories: BTreeMap<Category, CategoryConfig>,
    settings: EngineSettings,
}

pub fn from_json_str(json: &str) -> Result<InMemoryConfigStore, DomainError> {
    let file: ConfigFile =
        serde_json::from_str(json).map_err(|e| DomainError::Parse(format!("config file: {e}")))?;

    let mut store = InMemoryConfigStore::new().with_settings(file.settings);
    for (category, cfg) in file.categories {
        let cfg = CategoryConfig::new(cfg.enabled, cfg.weight)
            .map_err(|e| DomainError::InvalidInput(format!("{category}: {e}")))?;
        store = store.with_category(category, cfg);
    }
    Ok(store)
}

pub fn from_json_file(path: &Path) -> Result<InMemoryConfigStore, DomainError> {
    let json = std::fs::read_to_string(path).map_err(|e| {
        DomainError::NotFound(format!("config file {}: {e}", path.display()))
    })?;
    from_json_str(&json)
}
