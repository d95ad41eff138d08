//! Durable key/value storage behind the state store.
//!
//! [`Storage`] is the port the store writes through. [`SqliteStorage`] is the
//! on-disk adapter; [`MemoryStorage`] keeps everything in a `HashMap` and is
//! what the tests run against.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;

pub const HABITS_KEY: &str = "elevate_habits";
pub const TASKS_KEY: &str = "elevate_tasks";
pub const AI_MEMORY_KEY: &str = "elevate_ai_memory";
pub const AI_SETTINGS_KEY: &str = "elevate_ai_settings";
pub const USER_PROFILE_KEY: &str = "elevate_user_profile";
pub const CHAT_HISTORY_KEY: &str = "elevate_chat_history";

/// Every key the application writes, in display order.
pub const ALL_KEYS: [&str; 6] = [
    HABITS_KEY,
    TASKS_KEY,
    AI_MEMORY_KEY,
    AI_SETTINGS_KEY,
    USER_PROFILE_KEY,
    CHAT_HISTORY_KEY,
];

/// A flat string-to-string store. Each write replaces the whole value.
pub trait Storage: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// SQLite-backed storage, one row per key.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Open (or create) the database file and wrap it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = crate::db::open_database(path)?;
        Ok(Self { conn })
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl Storage for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("failed to read key {key}"))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3) \
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, now],
            )
            .with_context(|| format!("failed to write key {key}"))?;
        tracing::debug!(key, bytes = value.len(), "persisted");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv_store WHERE key = ?1", params![key])
            .with_context(|| format!("failed to remove key {key}"))?;
        tracing::debug!(key, "removed");
        Ok(())
    }
}

/// In-process storage. Nothing survives the value being dropped.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}
