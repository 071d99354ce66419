//! SQLite-backed implementation of [`Adapter`]
//!
//! Items live in a single `kv_items` table. A write may carry an expiry
//! hint ([`SqliteConfig::ttl`]); an expired item reads as absent and is
//! deleted on that read.

use super::Adapter;
use crate::backends::Platform;
use crate::error::StorageError;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Per-write configuration for [`SqliteAdapter`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SqliteConfig {
    /// Drop the item once this much time has passed since the write
    pub ttl: Option<Duration>,
}

impl SqliteConfig {
    #[must_use]
    pub fn expires_in(ttl: Duration) -> Self {
        Self { ttl: Some(ttl) }
    }
}

/// SQLite-backed key/value storage
///
/// The connection sits behind a mutex so the adapter can be shared across
/// threads (see [`super::Blocking`]).
#[derive(Debug)]
pub struct SqliteAdapter {
    conn: Mutex<Connection>,
}

impl SqliteAdapter {
    /// Open (or create) the database file at `path`.
    ///
    /// # Errors
    ///
    /// Returns error if the database cannot be opened or the table cannot
    /// be created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, rusqlite::Error> {
        Self::with_connection(Connection::open(path)?)
    }

    /// Private in-memory database, dropped together with the adapter.
    ///
    /// # Errors
    ///
    /// Returns error if table creation fails.
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, rusqlite::Error> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv_items (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                expires_at INTEGER
            )",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

/// Milliseconds since the Unix epoch, saturating.
fn now_millis() -> i64 {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
}

impl Adapter for SqliteAdapter {
    type Config = SqliteConfig;
    type Error = rusqlite::Error;

    fn get_item(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        let conn = self.conn.lock();
        let row = conn
            .query_row(
                "SELECT value, expires_at FROM kv_items WHERE key = ?1",
                params![key],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, Option<i64>>(1)?)),
            )
            .optional()?;

        match row {
            Some((_, Some(expires_at))) if expires_at <= now_millis() => {
                debug!(key, expires_at, "discarding expired item");
                conn.execute("DELETE FROM kv_items WHERE key = ?1", params![key])?;
                Ok(None)
            }
            Some((value, _)) => Ok(Some(value)),
            None => Ok(None),
        }
    }

    fn set_item(
        &self,
        key: &str,
        value: &str,
        config: Option<&SqliteConfig>,
    ) -> Result<(), rusqlite::Error> {
        let expires_at = config.and_then(|c| c.ttl).map(|ttl| {
            let ttl = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
            now_millis().saturating_add(ttl)
        });

        self.conn.lock().execute(
            "INSERT OR REPLACE INTO kv_items (key, value, expires_at) VALUES (?1, ?2, ?3)",
            params![key, value, expires_at],
        )?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), rusqlite::Error> {
        self.conn
            .lock()
            .execute("DELETE FROM kv_items WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn clear(&self) -> Result<(), rusqlite::Error> {
        self.conn.lock().execute("DELETE FROM kv_items", [])?;
        Ok(())
    }
}

/// Native platform backed by SQLite
///
/// The persistent backend is the database file at `path`; every call to
/// [`Platform::persistent`] opens a new connection to it, so facades with
/// different prefixes share one keyspace. The session backend is a private
/// in-memory database.
#[derive(Debug, Clone)]
pub struct SqlitePlatform {
    path: PathBuf,
}

impl SqlitePlatform {
    #[must_use]
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl Platform for SqlitePlatform {
    type Persistent = SqliteAdapter;
    type Session = SqliteAdapter;

    fn persistent(&self) -> Result<SqliteAdapter, StorageError> {
        SqliteAdapter::open(&self.path).map_err(|e| StorageError::Unavailable {
            backend: "persistent",
            reason: e.to_string(),
        })
    }

    fn session(&self) -> Result<SqliteAdapter, StorageError> {
        SqliteAdapter::open_in_memory().map_err(|e| StorageError::Unavailable {
            backend: "session",
            reason: e.to_string(),
        })
    }
}
