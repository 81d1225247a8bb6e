//! Key-value blob storage backed by SQLite
//!
//! One JSON blob per key, under the exact key names earlier clients used in
//! browser localStorage. Parse failures on read fall back to a default value
//! instead of propagating, so a corrupted blob can never take down
//! rendering.

use rusqlite::{Connection, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::Result;

/// Registered user list
pub const KEY_USERS: &str = "users";
/// Email of the active session's user
pub const KEY_LOGGED_IN_USER: &str = "loggedInUser";
/// Chat panel message log
pub const KEY_CHAT_MESSAGES: &str = "chatMessages";
/// Chat endpoint URL override
pub const KEY_CHAT_API_URL: &str = "chatApiUrl";
/// "true" when the chat panel should skip the remote endpoint
pub const KEY_USE_FALLBACK_CHAT: &str = "useFallbackChat";

/// Per-user event collection key
pub fn events_key(email: &str) -> String {
    format!("events_{}", email)
}

/// SQLite-backed key-value store
pub struct KvStore {
    conn: Mutex<Connection>,
}

impl KvStore {
    /// Open (or create) the store at the given database path
    pub fn open(db_path: &str) -> Result<Self> {
        debug!("Opening kv store at: {}", db_path);
        if let Some(parent) = std::path::Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(db_path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_tables()?;
        Ok(store)
    }

    /// Create an in-memory store (useful for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_tables()?;
        Ok(store)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Initialize database tables
    fn init_tables(&self) -> Result<()> {
        self.conn().execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// Read the raw string stored under a key
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write a raw string under a key
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Delete a key; returns whether it existed
    pub fn remove(&self, key: &str) -> Result<bool> {
        let removed = self
            .conn()
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(removed > 0)
    }

    /// Read and deserialize the JSON blob under a key.
    ///
    /// Missing keys and corrupted payloads both yield `T::default()`;
    /// corruption is logged but never propagated.
    pub fn get_json<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T> {
        match self.get(key)? {
            None => Ok(T::default()),
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(value) => Ok(value),
                Err(e) => {
                    warn!("Corrupted JSON under key '{}', using default: {}", key, e);
                    Ok(T::default())
                }
            },
        }
    }

    /// Serialize and write a JSON blob under a key
    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.set(key, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_missing_key() {
        let store = KvStore::in_memory().unwrap();
        assert_eq!(store.get("nope").unwrap(), None);
    }

    #[test]
    fn test_set_and_get() {
        let store = KvStore::in_memory().unwrap();
        store.set(KEY_LOGGED_IN_USER, "ada@example.com").unwrap();
        assert_eq!(
            store.get(KEY_LOGGED_IN_USER).unwrap(),
            Some("ada@example.com".to_string())
        );
    }

    #[test]
    fn test_set_overwrites() {
        let store = KvStore::in_memory().unwrap();
        store.set("k", "one").unwrap();
        store.set("k", "two").unwrap();
        assert_eq!(store.get("k").unwrap(), Some("two".to_string()));
    }

    #[test]
    fn test_remove() {
        let store = KvStore::in_memory().unwrap();
        store.set("k", "v").unwrap();
        assert!(store.remove("k").unwrap());
        assert!(!store.remove("k").unwrap());
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_get_json_default_on_missing() {
        let store = KvStore::in_memory().unwrap();
        let list: Vec<String> = store.get_json("absent").unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn test_get_json_default_on_corrupt() {
        let store = KvStore::in_memory().unwrap();
        store.set(KEY_CHAT_MESSAGES, "{not valid json").unwrap();
        let list: Vec<serde_json::Value> = store.get_json(KEY_CHAT_MESSAGES).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn test_json_round_trip() {
        let store = KvStore::in_memory().unwrap();
        store.set_json("nums", &vec![1, 2, 3]).unwrap();
        let nums: Vec<i32> = store.get_json("nums").unwrap();
        assert_eq!(nums, vec![1, 2, 3]);
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("dayplan.db");
        let store = KvStore::open(path.to_str().unwrap()).unwrap();
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap(), Some("v".to_string()));
    }

    #[test]
    fn test_events_key_is_namespaced_by_email() {
        assert_eq!(events_key("ada@example.com"), "events_ada@example.com");
    }
}
