use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, OptionalExtension};

use super::DurableStore;
use crate::error::AuthError;

/// Key/value store kept in a single SQLite table.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

const MIGRATE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS console_store (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

impl SqliteStore {
    pub fn new(conn: Connection) -> Result<Self, AuthError> {
        conn.execute_batch(MIGRATE_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open(path: &str) -> Result<Self, AuthError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::new(conn)
    }

    pub fn open_in_memory() -> Result<Self, AuthError> {
        Self::new(Connection::open_in_memory()?)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, AuthError> {
        self.conn
            .lock()
            .map_err(|_| AuthError::Internal("sqlite store lock poisoned".into()))
    }
}

impl DurableStore for SqliteStore {
    fn read(&self, key: &str) -> Result<Option<String>, AuthError> {
        let conn = self.conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM console_store WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), AuthError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO console_store (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = datetime('now')",
            rusqlite::params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AuthError> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM console_store WHERE key = ?1", [key])?;
        Ok(())
    }
}
