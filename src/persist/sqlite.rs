//! SQLite-backed blob store.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use super::{KvStore, PersistResult};

/// SQLite implementation of [`crate::persist::KvStore`].
pub struct SqliteKv {
    conn: Connection,
}

impl SqliteKv {
    /// Opens or creates a SQLite-backed store at `path`.
    ///
    /// Enables WAL mode and sets `synchronous=NORMAL`.
    pub fn open(path: impl AsRef<Path>) -> PersistResult<Self> {
        let conn = Connection::open(path)?;
        Self::init_connection(conn)
    }

    /// Opens an in-memory SQLite store.
    pub fn open_in_memory() -> PersistResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_connection(conn)
    }

    fn init_connection(conn: Connection) -> PersistResult<Self> {
        conn.execute_batch(include_str!("schema.sql"))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        Ok(Self { conn })
    }

    /// Returns the last write time recorded for `key`.
    pub fn updated_ms(&self, key: &str) -> PersistResult<Option<u64>> {
        let ts: Option<i64> = self
            .conn
            .query_row("SELECT updated_ms FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(ts.map(|v| v as u64))
    }

    /// Lists stored keys in lexical order.
    pub fn keys(&self) -> PersistResult<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT key FROM kv ORDER BY key ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

impl KvStore for SqliteKv {
    fn get(&self, key: &str) -> PersistResult<Option<Vec<u8>>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn put(&mut self, key: &str, value: &[u8]) -> PersistResult<()> {
        self.conn.execute(
            "INSERT INTO kv(key, updated_ms, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET updated_ms = excluded.updated_ms, value = excluded.value",
            params![key, now_ms() as i64, value],
        )?;
        debug!(key, bytes = value.len(), "Wrote blob");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> PersistResult<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn flush(&mut self) -> PersistResult<()> {
        self.conn.execute_batch("PRAGMA wal_checkpoint(PASSIVE);")?;
        Ok(())
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
