// 🗄️ Snapshot Store Adapter
// A single mutable slot holding the previous snapshot under a fixed key
//
// Two layers:
// - KeyValueStore: get/set of strings (SQLite or in-memory)
// - SnapshotStore: load_previous/save_previous of a Snapshot
//
// Last writer wins. There is no lock and no versioning; callers must not
// run overlapping refresh cycles against the same slot.

use crate::error::{RankingError, Result};
use crate::snapshot::Snapshot;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

// ============================================================================
// KEY-VALUE COLLABORATOR
// ============================================================================

/// Minimal persistence surface the engine needs
pub trait KeyValueStore {
    /// Stored value, or `None` when the key has never been written
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite the value unconditionally
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// In-process store, lost on exit
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// SQLite-backed store (one `kv_store` table, WAL journal)
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref()).map_err(|e| {
            RankingError::StorageUnavailable(format!(
                "Failed to open database {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_connection(conn)
    }

    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        setup_database(&conn)?;
        Ok(SqliteStore { conn })
    }

    /// When the key was last written (RFC 3339)
    pub fn updated_at(&self, key: &str) -> Result<Option<String>> {
        let updated = self
            .conn
            .query_row(
                "SELECT updated_at FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(updated)
    }
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

// ============================================================================
// SNAPSHOT SLOT
// ============================================================================

/// Previous-snapshot persistence as seen by the engine
pub trait SnapshotStore {
    /// Last persisted snapshot, or empty
    ///
    /// Never fails: a missing key is the first-run state, and an unreadable
    /// or undecodable slot degrades to "no previous snapshot".
    fn load_previous(&self) -> Snapshot;

    /// Replace the stored snapshot
    fn save_previous(&mut self, snapshot: &Snapshot) -> Result<()>;
}

/// SnapshotStore over any KeyValueStore, bound to one key
pub struct SnapshotSlot<S: KeyValueStore> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> SnapshotSlot<S> {
    pub fn new(store: S, key: &str) -> Self {
        SnapshotSlot {
            store,
            key: key.to_string(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn inner(&self) -> &S {
        &self.store
    }
}

impl<S: KeyValueStore> SnapshotStore for SnapshotSlot<S> {
    fn load_previous(&self) -> Snapshot {
        let blob = match self.store.get(&self.key) {
            Ok(Some(blob)) => blob,
            Ok(None) => return Snapshot::empty(),
            Err(e) => {
                warn!(key = %self.key, error = %e, "previous snapshot unreadable, treating as empty");
                return Snapshot::empty();
            }
        };

        match serde_json::from_str::<Snapshot>(&blob) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(key = %self.key, error = %e, "previous snapshot undecodable, treating as empty");
                Snapshot::empty()
            }
        }
    }

    fn save_previous(&mut self, snapshot: &Snapshot) -> Result<()> {
        let blob = serde_json::to_string(snapshot)?;
        self.store.set(&self.key, &blob)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Entity;

    /// Store whose reads and writes always fail
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(RankingError::StorageUnavailable("disk gone".to_string()))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(RankingError::StorageUnavailable("disk gone".to_string()))
        }
    }

    fn sample() -> Snapshot {
        Snapshot::new(vec![Entity::new("B", 9.0, 1), Entity::new("A", 5.0, 3)])
    }

    #[test]
    fn test_memory_store_get_set() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "v1").unwrap();
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap(), Some("v2".to_string()));
    }

    #[test]
    fn test_sqlite_store_get_set() {
        let mut store = SqliteStore::in_memory().unwrap();
        assert_eq!(store.get("k").unwrap(), None);
        assert_eq!(store.updated_at("k").unwrap(), None);

        store.set("k", "v1").unwrap();
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap(), Some("v2".to_string()));
        assert!(store.updated_at("k").unwrap().is_some());
    }

    #[test]
    fn test_sqlite_store_persists_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ranking.db");

        {
            let mut slot = SnapshotSlot::new(SqliteStore::open(&path).unwrap(), "board");
            slot.save_previous(&sample()).unwrap();
        }

        let slot = SnapshotSlot::new(SqliteStore::open(&path).unwrap(), "board");
        assert_eq!(slot.load_previous(), sample());
    }

    #[test]
    fn test_load_missing_key_is_empty() {
        let slot = SnapshotSlot::new(MemoryStore::new(), "board");
        assert!(slot.load_previous().is_empty());
    }

    #[test]
    fn test_save_then_load_preserves_order() {
        let mut slot = SnapshotSlot::new(MemoryStore::new(), "board");
        slot.save_previous(&sample()).unwrap();

        let loaded = slot.load_previous();
        let names: Vec<&str> = loaded.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn test_save_overwrites() {
        let mut slot = SnapshotSlot::new(MemoryStore::new(), "board");
        slot.save_previous(&sample()).unwrap();
        slot.save_previous(&Snapshot::empty()).unwrap();

        assert!(slot.load_previous().is_empty());
    }

    #[test]
    fn test_slots_are_keyed() {
        let mut store = MemoryStore::new();
        store.set("other", "[]").unwrap();

        let mut slot = SnapshotSlot::new(store, "board");
        slot.save_previous(&sample()).unwrap();

        assert_eq!(slot.inner().get("other").unwrap(), Some("[]".to_string()));
        assert_eq!(slot.key(), "board");
    }

    #[test]
    fn test_unreadable_store_loads_empty() {
        let slot = SnapshotSlot::new(BrokenStore, "board");
        assert!(slot.load_previous().is_empty());
    }

    #[test]
    fn test_corrupt_blob_loads_empty() {
        let mut store = MemoryStore::new();
        store.set("board", "{not json").unwrap();

        let slot = SnapshotSlot::new(store, "board");
        assert!(slot.load_previous().is_empty());
    }

    #[test]
    fn test_broken_store_save_errors() {
        let mut slot = SnapshotSlot::new(BrokenStore, "board");
        assert!(slot.save_previous(&sample()).is_err());
    }
}
