//! Small key-value state table backed by SQLite.
//!
//! The bot keeps its Telegram update offset here so a restart does not
//! replay messages that were already answered.

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;

/// Key under which the next `getUpdates` offset is stored.
pub const TELEGRAM_OFFSET_KEY: &str = "telegram_offset";

pub struct StateStore {
    conn: Mutex<Connection>,
}

impl StateStore {
    /// Open or create the state table. Use `":memory:"` for tests.
    pub fn open(path: &str) -> Result<Self> {
        if path != ":memory:"
            && let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let conn = Connection::open(path).context("failed to open state database")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS state (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        )
        .context("failed to create state table")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn in_memory() -> Result<Self> {
        Self::open(":memory:")
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT value FROM state WHERE key = ?1")?;
        let mut rows = stmt.query([key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    /// Upsert.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO state (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [key, value],
        )?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM state WHERE key = ?1", [key])?;
        Ok(())
    }

    /// Read an integer value. A stored value that is not an integer is an error.
    pub fn get_i64(&self, key: &str) -> Result<Option<i64>> {
        self.get(key)?
            .map(|v| {
                v.parse::<i64>()
                    .with_context(|| format!("state key {key} holds non-integer {v:?}"))
            })
            .transpose()
    }

    pub fn set_i64(&self, key: &str, value: i64) -> Result<()> {
        self.set(key, &value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_returns_none_for_missing_key() {
        let store = StateStore::in_memory().unwrap();
        assert!(store.get("nonexistent").unwrap().is_none());
        assert!(store.get_i64("nonexistent").unwrap().is_none());
    }

    #[test]
    fn set_overwrites_existing() {
        let store = StateStore::in_memory().unwrap();
        store.set("k", "old").unwrap();
        store.set("k", "new").unwrap();
        assert_eq!(store.get("k").unwrap().unwrap(), "new");
    }

    #[test]
    fn remove_deletes_key() {
        let store = StateStore::in_memory().unwrap();
        store.set("k", "v").unwrap();
        store.remove("k").unwrap();
        assert!(store.get("k").unwrap().is_none());
        store.remove("k").unwrap();
    }

    #[test]
    fn integer_round_trip() {
        let store = StateStore::in_memory().unwrap();
        store.set_i64(TELEGRAM_OFFSET_KEY, 812_345_678).unwrap();
        assert_eq!(store.get_i64(TELEGRAM_OFFSET_KEY).unwrap(), Some(812_345_678));
    }

    #[test]
    fn non_integer_value_is_an_error() {
        let store = StateStore::in_memory().unwrap();
        store.set(TELEGRAM_OFFSET_KEY, "abc").unwrap();
        let err = store.get_i64(TELEGRAM_OFFSET_KEY).unwrap_err();
        assert!(err.to_string().contains("non-integer"));
    }

    #[test]
    fn persists_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state-test.db");
        let path_str = path.to_str().unwrap();

        {
            let store = StateStore::open(path_str).unwrap();
            store.set_i64(TELEGRAM_OFFSET_KEY, 42).unwrap();
        }

        {
            let store = StateStore::open(path_str).unwrap();
            assert_eq!(store.get_i64(TELEGRAM_OFFSET_KEY).unwrap(), Some(42));
        }
    }
}
