use crate::domain::error::DomainError;
use crate::domain::ports::config_store::{ConfigRepository, ConfigStore};
use crate::domain::values::category::Category;
use crate::domain::values::category_config::{CategoryConfig, EngineSettings};
use crate::infrastructure::sqlite::migrations::run_migrations;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::Mutex;

const KEY_MINIMUM_SCORE: &str = "minimum_score";
const KEY_FALLBACK_CATEGORY: &str = "fallback_category";
const KEY_FEED_TIMEOUT_MS: &str = "feed_timeout_ms";
const KEY_MAX_RESULTS: &str = "max_results";
const KEY_LOOKBACK_HOURS: &str = "lookback_hours";

/// Config store persisted in SQLite. Rows only exist for what a user
/// customised; everything else reads as the default.
pub struct SqliteConfigStore {
    conn: Mutex<Connection>,
}

impl SqliteConfigStore {
    /// Wrap an open connection and make sure the schema exists.
    pub fn new(conn: Connection) -> Result<Self, DomainError> {
        run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open (or create) a database file. `":memory:"` gives a private
    /// in-memory database.
    pub fn open(db_path: &str) -> Result<Self, DomainError> {
        let conn = Connection::open(db_path)
            .map_err(|e| DomainError::Database(format!("DB error: {e}")))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| DomainError::Database(format!("WAL error: {e}")))?;
        Self::new(conn)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, DomainError> {
        self.conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))
    }

    fn put_setting(&self, key: &str, value: &serde_json::Value) -> Result<(), DomainError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO engine_settings (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value.to_string(), Utc::now().to_rfc3339()],
        )
        .map_err(|e| DomainError::Database(format!("Failed to store setting {key}: {e}")))?;
        Ok(())
    }

    fn tracked_entities(conn: &Connection) -> Result<Vec<String>, DomainError> {
        let mut stmt = conn
            .prepare("SELECT entity FROM tracked_entities ORDER BY entity COLLATE NOCASE")
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let entities = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| DomainError::Database(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(entities)
    }
}

fn parse_setting<T: serde::de::DeserializeOwned>(key: &str, raw: &str) -> Result<T, DomainError> {
    serde_json::from_str(raw)
        .map_err(|e| DomainError::Parse(format!("setting {key} has invalid value '{raw}': {e}")))
}

impl ConfigStore for SqliteConfigStore {
    fn category_config(&self, category: Category) -> Result<CategoryConfig, DomainError> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT enabled, weight FROM category_configs WHERE category = ?1",
                params![category.to_string()],
                |row| Ok((row.get::<_, i32>(0)?, row.get::<_, f64>(1)?)),
            )
            .optional()
            .map_err(|e| DomainError::Database(e.to_string()))?;

        match row {
            Some((enabled, weight)) => CategoryConfig::new(enabled != 0, weight).map_err(|e| {
                DomainError::Parse(format!("stored config for {category} is invalid: {e}"))
            }),
            None => Ok(CategoryConfig::default()),
        }
    }

    fn settings(&self) -> Result<EngineSettings, DomainError> {
        let conn = self.lock()?;
        let mut settings = EngineSettings::default();

        let mut stmt = conn
            .prepare("SELECT key, value FROM engine_settings")
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
            .map_err(|e| DomainError::Database(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DomainError::Database(e.to_string()))?;

        for (key, raw) in rows {
            match key.as_str() {
                KEY_MINIMUM_SCORE => settings.minimum_score = parse_setting(&key, &raw)?,
                KEY_FALLBACK_CATEGORY => settings.fallback_category = parse_setting(&key, &raw)?,
                KEY_FEED_TIMEOUT_MS => settings.feed_timeout_ms = parse_setting(&key, &raw)?,
                KEY_MAX_RESULTS => settings.max_results = parse_setting(&key, &raw)?,
                KEY_LOOKBACK_HOURS => settings.lookback_hours = parse_setting(&key, &raw)?,
                _ => {}
            }
        }
        settings.tracked_entities = Self::tracked_entities(&conn)?;
        Ok(settings)
    }
}

impl ConfigRepository for SqliteConfigStore {
    fn set_category_config(
        &self,
        category: Category,
        config: CategoryConfig,
    ) -> Result<(), DomainError> {
        let config = CategoryConfig::new(config.enabled, config.weight)
            .map_err(DomainError::InvalidInput)?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO category_configs (category, enabled, weight, updated_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(category) DO UPDATE SET enabled = excluded.enabled, weight = excluded.weight, updated_at = excluded.updated_at",
            params![
                category.to_string(),
                config.enabled as i32,
                config.weight,
                Utc::now().to_rfc3339(),
            ],
        )
        .map_err(|e| DomainError::Database(format!("Failed to store config for {category}: {e}")))?;
        Ok(())
    }

    fn set_minimum_score(&self, score: f64) -> Result<(), DomainError> {
        if !(0.0..=100.0).contains(&score) {
            return Err(DomainError::InvalidInput(format!(
                "Minimum score must be between 0 and 100, got {score}"
            )));
        }
        self.put_setting(KEY_MINIMUM_SCORE, &serde_json::json!(score))
    }

    fn set_fallback_category(&self, category: Option<Category>) -> Result<(), DomainError> {
        self.put_setting(KEY_FALLBACK_CATEGORY, &serde_json::json!(category))
    }

    fn set_max_results(&self, max: Option<usize>) -> Result<(), DomainError> {
        self.put_setting(KEY_MAX_RESULTS, &serde_json::json!(max))
    }

    fn set_feed_timeout_ms(&self, timeout_ms: u64) -> Result<(), DomainError> {
        if timeout_ms == 0 {
            return Err(DomainError::InvalidInput("Feed timeout must be positive".into()));
        }
        self.put_setting(KEY_FEED_TIMEOUT_MS, &serde_json::json!(timeout_ms))
    }

    fn set_lookback_hours(&self, hours: u32) -> Result<(), DomainError> {
        if hours == 0 {
            return Err(DomainError::InvalidInput("Lookback must be at least one hour".into()));
        }
        self.put_setting(KEY_LOOKBACK_HOURS, &serde_json::json!(hours))
    }

    fn track_entity(&self, entity: &str) -> Result<bool, DomainError> {
        let entity = entity.trim();
        if entity.is_empty() {
            return Err(DomainError::InvalidInput("Entity name must not be empty".into()));
        }
        let conn = self.lock()?;
        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO tracked_entities (entity, added_at) VALUES (?1, ?2)",
                params![entity, Utc::now().to_rfc3339()],
            )
            .map_err(|e| DomainError::Database(format!("Failed to track {entity}: {e}")))?;
        Ok(inserted == 1)
    }

    fn untrack_entity(&self, entity: &str) -> Result<bool, DomainError> {
        let conn = self.lock()?;
        let removed = conn
            .execute(
                "DELETE FROM tracked_entities WHERE entity = ?1",
                params![entity.trim()],
            )
            .map_err(|e| DomainError::Database(format!("Failed to untrack {entity}: {e}")))?;
        Ok(removed > 0)
    }
}
