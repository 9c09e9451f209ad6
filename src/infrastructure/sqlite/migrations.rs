use crate::domain::error::DomainError;
use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<(), DomainError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS category_configs (
            category TEXT PRIMARY KEY,
            enabled INTEGER NOT NULL DEFAULT 1,
            weight REAL NOT NULL DEFAULT 50,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS engine_settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS tracked_entities (
            entity TEXT PRIMARY KEY COLLATE NOCASE,
            added_at TEXT NOT NULL
        );
        "
    ).map_err(|e| DomainError::Database(format!("Migration failed: {e}")))
}
