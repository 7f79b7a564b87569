//! Persistent lookup settings backed by SQLite.
//!
//! [`Config`] is the raw key-value table; [`Settings`] resolves it into
//! typed values with command-line overrides and built-in defaults.

pub mod settings;

pub use settings::{Overrides, SettingKey, Settings};

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;

/// Persistent key-value settings store.
pub struct Config {
    conn: Mutex<Connection>,
}

impl Config {
    /// Open or create the settings table in the given database.
    /// Use `":memory:"` for tests.
    pub fn open(path: &str) -> Result<Self> {
        if path != ":memory:"
            && let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let conn = Connection::open(path).context("failed to open settings database")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS settings (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        )
        .context("failed to create settings table")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Get a stored value by key.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT value FROM settings WHERE key = ?1")?;
        let mut rows = stmt.query([key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    /// Set a value (upsert). Validates the key and value first.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let key = Settings::validate_entry(key, value)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [key.as_str(), value.trim()],
        )?;
        Ok(())
    }

    /// Remove a key, restoring its default.
    pub fn remove(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM settings WHERE key = ?1", [key])?;
        Ok(())
    }

    /// All stored entries, sorted by key.
    pub fn entries(&self) -> Result<Vec<(String, String)>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT key, value FROM settings ORDER BY key ASC")?;
        let entries = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mem_config() -> Config {
        Config::open(":memory:").unwrap()
    }

    #[test]
    fn get_returns_none_for_missing_key() {
        let config = mem_config();
        assert!(config.get("user_agent").unwrap().is_none());
    }

    #[test]
    fn set_and_get() {
        let config = mem_config();
        config.set("max_meanings", "5").unwrap();
        assert_eq!(config.get("max_meanings").unwrap().unwrap(), "5");
    }

    #[test]
    fn set_trims_value() {
        let config = mem_config();
        config.set("wait_timeout_secs", " 15 ").unwrap();
        assert_eq!(config.get("wait_timeout_secs").unwrap().unwrap(), "15");
    }

    #[test]
    fn set_overwrites_existing() {
        let config = mem_config();
        config.set("max_meanings", "2").unwrap();
        config.set("max_meanings", "4").unwrap();
        assert_eq!(config.get("max_meanings").unwrap().unwrap(), "4");
    }

    #[test]
    fn set_rejects_unknown_key() {
        let config = mem_config();
        let err = config.set("theme", "dark").unwrap_err();
        assert!(err.to_string().contains("unknown setting"));
        assert!(config.get("theme").unwrap().is_none());
    }

    #[test]
    fn set_rejects_invalid_value() {
        let config = mem_config();
        assert!(config.set("max_meanings", "lots").is_err());
        assert!(config.set("wait_timeout_secs", "0").is_err());
        assert!(config.set("search_url", "https://example.com/").is_err());
    }

    #[test]
    fn remove_deletes_key() {
        let config = mem_config();
        config.set("max_meanings", "1").unwrap();
        config.remove("max_meanings").unwrap();
        assert!(config.get("max_meanings").unwrap().is_none());
    }

    #[test]
    fn remove_nonexistent_is_ok() {
        let config = mem_config();
        config.remove("nonexistent").unwrap();
    }

    #[test]
    fn entries_are_sorted() {
        let config = mem_config();
        config.set("wait_timeout_secs", "3").unwrap();
        config.set("max_meanings", "2").unwrap();
        assert_eq!(
            config.entries().unwrap(),
            vec![
                ("max_meanings".to_string(), "2".to_string()),
                ("wait_timeout_secs".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn open_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("engdict.db");
        Config::open(path.to_str().unwrap()).unwrap();
        assert!(path.exists());
    }
}
