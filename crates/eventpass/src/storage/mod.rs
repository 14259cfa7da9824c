//! Storage layer for eventpass.
//!
//! This module provides the `SQLite`-backed key-value document that holds
//! serialized collections under named keys, plus a quarantine area for
//! values that could no longer be decoded.
//!
//! Every read-modify-write goes through [`Storage::transaction`], which opens
//! an immediate (write-locking) transaction, so at most one writer mutates
//! the document at a time, including across processes sharing the file.

pub mod migrations;
pub mod schema;
mod shared;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

pub use shared::SharedStorage;

/// Path reported for in-memory databases.
const MEMORY_PATH: &str = ":memory:";

/// Storage engine for the preferences document.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        // Concurrent writers from other processes wait instead of failing fast.
        conn.busy_timeout(std::time::Duration::from_secs(5))?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(MEMORY_PATH),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(MEMORY_PATH),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A non-transactional view of the document.
    #[must_use]
    pub fn document(&self) -> Document<'_> {
        Document { conn: &self.conn }
    }

    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        self.document().get(key)
    }

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.document().set(key, value)
    }

    /// Remove `key`. Returns `true` if a value was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn remove(&self, key: &str) -> Result<bool> {
        self.document().remove(key)
    }

    /// All keys currently present, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn keys(&self) -> Result<Vec<String>> {
        self.document().keys()
    }

    /// Run `f` inside an immediate transaction.
    ///
    /// The transaction commits when `f` returns `Ok` and rolls back when it
    /// returns `Err` (the error is passed through unchanged).
    ///
    /// # Errors
    ///
    /// Returns the error from `f`, or an error if the transaction cannot be
    /// started or committed.
    pub fn transaction<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&Document<'_>) -> Result<T>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = {
            let document = Document { conn: &*tx };
            f(&document)?
        };
        tx.commit()?;
        Ok(value)
    }

    /// Values quarantined from `key`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn quarantined(&self, key: &str) -> Result<Vec<QuarantinedValue>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT id, key, value, reason, quarantined_at
            FROM quarantine WHERE key = ?1 ORDER BY id ASC
            ",
        )?;

        let values = stmt
            .query_map([key], Self::row_to_quarantined)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(values)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let total_keys: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM preferences", [], |row| row.get(0))?;
        let quarantined_values: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM quarantine", [], |row| row.get(0))?;

        let db_size_bytes = if self.path.to_string_lossy() == MEMORY_PATH {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            total_keys,
            quarantined_values,
            db_size_bytes,
        })
    }

    fn row_to_quarantined(row: &rusqlite::Row) -> rusqlite::Result<QuarantinedValue> {
        let quarantined_at: String = row.get(4)?;
        let quarantined_at = DateTime::parse_from_rfc3339(&quarantined_at)
            .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc));

        Ok(QuarantinedValue {
            id: row.get(0)?,
            key: row.get(1)?,
            value: row.get(2)?,
            reason: row.get(3)?,
            quarantined_at,
        })
    }
}

/// A view of the key-value document bound to a connection or transaction.
#[derive(Debug)]
pub struct Document<'conn> {
    conn: &'conn Connection,
}

impl Document<'_> {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Replace the value stored under `key` in full.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            r"
            INSERT INTO preferences (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            ",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        debug!("Wrote {} bytes to '{}'", value.len(), key);
        Ok(())
    }

    /// Remove `key`. Returns `true` if a value was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn remove(&self, key: &str) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM preferences WHERE key = ?1", [key])?;
        Ok(affected > 0)
    }

    /// All keys currently present, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM preferences ORDER BY key ASC")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(keys)
    }

    /// Copy `value` into the quarantine table before it gets replaced.
    ///
    /// Returns the quarantine row id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn quarantine(&self, key: &str, value: &str, reason: &str) -> Result<i64> {
        self.conn.execute(
            r"
            INSERT INTO quarantine (key, value, reason, quarantined_at)
            VALUES (?1, ?2, ?3, ?4)
            ",
            params![key, value, reason, Utc::now().to_rfc3339()],
        )?;
        let id = self.conn.last_insert_rowid();
        warn!("Quarantined undecodable value of '{}' as #{}", key, id);
        Ok(id)
    }

    /// The underlying connection, for tables other than the document.
    #[must_use]
    pub fn connection(&self) -> &Connection {
        self.conn
    }
}

/// A value moved aside because it could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuarantinedValue {
    /// Row id.
    pub id: i64,
    /// Key the value was stored under.
    pub key: String,
    /// The raw stored value.
    pub value: String,
    /// Why it was quarantined.
    pub reason: String,
    /// When it was quarantined.
    pub quarantined_at: DateTime<Utc>,
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageStats {
    /// Number of keys in the document.
    pub total_keys: i64,
    /// Number of quarantined values.
    pub quarantined_values: i64,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_storage() -> Storage {
        Storage::open_in_memory().expect("failed to create test storage")
    }

    fn temp_db_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("eventpass_{name}_{}.db", std::process::id()))
    }

    fn remove_db(path: &Path) {
        let _ = std::fs::remove_file(path);
        let _ = std::fs::remove_file(path.with_extension("db-wal"));
        let _ = std::fs::remove_file(path.with_extension("db-shm"));
    }

    #[test]
    fn test_open_in_memory() {
        assert!(Storage::open_in_memory().is_ok());
    }

    #[test]
    fn test_get_missing_key() {
        let storage = create_test_storage();
        assert!(storage.get("registered_events").unwrap().is_none());
    }

    #[test]
    fn test_set_and_get() {
        let storage = create_test_storage();
        storage.set("notifications", "[]").unwrap();
        assert_eq!(storage.get("notifications").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_set_replaces_value_in_full() {
        let storage = create_test_storage();
        storage.set("k", "first value").unwrap();
        storage.set("k", "2").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("2"));
        assert_eq!(storage.keys().unwrap(), vec!["k".to_string()]);
    }

    #[test]
    fn test_remove() {
        let storage = create_test_storage();
        storage.set("auth_session", "{}").unwrap();

        assert!(storage.remove("auth_session").unwrap());
        assert!(!storage.remove("auth_session").unwrap());
        assert!(storage.get("auth_session").unwrap().is_none());
    }

    #[test]
    fn test_keys_sorted() {
        let storage = create_test_storage();
        storage.set("b", "1").unwrap();
        storage.set("a", "1").unwrap();
        assert_eq!(storage.keys().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_transaction_commits_on_ok() {
        let mut storage = create_test_storage();
        let len = storage
            .transaction(|doc| {
                doc.set("k", "v")?;
                Ok(doc.keys()?.len())
            })
            .unwrap();

        assert_eq!(len, 1);
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_transaction_rolls_back_on_err() {
        let mut storage = create_test_storage();
        storage.set("k", "before").unwrap();

        let result: Result<()> = storage.transaction(|doc| {
            doc.set("k", "after")?;
            doc.quarantine("k", "before", "test")?;
            Err(Error::internal("abort"))
        });

        assert!(matches!(result, Err(Error::Internal(_))));
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("before"));
        assert!(storage.quarantined("k").unwrap().is_empty());
    }

    #[test]
    fn test_quarantine_and_list() {
        let storage = create_test_storage();
        let doc = storage.document();
        let first = doc.quarantine("registered_events", "garbage", "bad json").unwrap();
        let second = doc.quarantine("registered_events", "{", "eof").unwrap();
        doc.quarantine("notifications", "x", "bad").unwrap();

        let values = storage.quarantined("registered_events").unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].id, first);
        assert_eq!(values[0].value, "garbage");
        assert_eq!(values[0].reason, "bad json");
        assert_eq!(values[1].id, second);
    }

    #[test]
    fn test_stats() {
        let storage = create_test_storage();
        storage.set("a", "1").unwrap();
        storage.set("b", "2").unwrap();
        storage.document().quarantine("a", "0", "old").unwrap();

        let stats = storage.stats().unwrap();
        assert_eq!(stats.total_keys, 2);
        assert_eq!(stats.quarantined_values, 1);
        assert_eq!(stats.db_size_bytes, 0);
    }

    #[test]
    fn test_path() {
        let storage = create_test_storage();
        assert_eq!(storage.path().to_string_lossy(), ":memory:");
    }

    #[test]
    fn test_unicode_value() {
        let storage = create_test_storage();
        storage.set("title", "You're going to Marathon! 🎉").unwrap();
        assert_eq!(
            storage.get("title").unwrap().as_deref(),
            Some("You're going to Marathon! 🎉")
        );
    }

    #[test]
    fn test_open_file_based_persists() {
        let db_path = temp_db_path("persist");
        remove_db(&db_path);

        {
            let storage = Storage::open(&db_path).unwrap();
            storage.set("registered_events", "[]").unwrap();
            assert_eq!(storage.path(), db_path);
        }
        {
            let storage = Storage::open(&db_path).unwrap();
            assert_eq!(
                storage.get("registered_events").unwrap().as_deref(),
                Some("[]")
            );
            assert!(storage.stats().unwrap().db_size_bytes > 0);
        }

        remove_db(&db_path);
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let root = std::env::temp_dir().join(format!("eventpass_test_{}", std::process::id()));
        let nested_path = root.join("nested/eventpass.db");
        let _ = std::fs::remove_dir_all(&root);

        let storage = Storage::open(&nested_path).unwrap();
        assert!(nested_path.exists());

        drop(storage);
        let _ = std::fs::remove_dir_all(&root);
    }
}
