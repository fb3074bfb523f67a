//! SQLite-backed stores.
//!
//! Documents are kept as JSON text in a `documents` table keyed by path. The
//! key-value store shares the same database file through its own `kv` table.
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use async_trait::async_trait;
use folio_core::{DocumentStore, Fields, FolioError, KeyValueStore};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use serde_json::Value;
use tracing::{debug, info};

use crate::next_counter_value;

const DOCUMENTS_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS documents (
    path   TEXT PRIMARY KEY,
    fields TEXT NOT NULL
);";

const KV_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS kv (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);";

fn open_connection(path: &Path) -> anyhow::Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open SQLite database at {}", path.display()))?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")
        .context("Failed to enable WAL journal")?;
    Ok(conn)
}

fn parse_fields(path: &str, raw: &str) -> Result<Fields, FolioError> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(FolioError::CorruptDocument {
            path: path.to_string(),
            reason: "stored document is not a JSON object".into(),
        }),
        Err(e) => Err(FolioError::CorruptDocument {
            path: path.to_string(),
            reason: e.to_string(),
        }),
    }
}

fn encode_fields(fields: &Fields) -> Result<String, FolioError> {
    serde_json::to_string(fields).map_err(FolioError::storage)
}

fn read_document(conn: &Connection, path: &str) -> Result<Option<Fields>, FolioError> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT fields FROM documents WHERE path = ?1",
            params![path],
            |row| row.get(0),
        )
        .optional()
        .map_err(FolioError::storage)?;
    raw.map(|raw| parse_fields(path, &raw)).transpose()
}

fn write_document(conn: &Connection, path: &str, fields: &Fields) -> Result<(), FolioError> {
    conn.execute(
        "INSERT INTO documents (path, fields) VALUES (?1, ?2)
         ON CONFLICT(path) DO UPDATE SET fields = excluded.fields",
        params![path, encode_fields(fields)?],
    )
    .map_err(FolioError::storage)?;
    Ok(())
}

/// Durable document store.
pub struct SqliteDocumentStore {
    conn: tokio::sync::Mutex<Connection>,
}

impl SqliteDocumentStore {
    /// Create or open a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let conn = open_connection(path.as_ref())?;
        conn.execute_batch(DOCUMENTS_SCHEMA)
            .context("Failed to initialize documents schema")?;
        info!(path = %path.as_ref().display(), "Document store opened");
        Ok(Self {
            conn: tokio::sync::Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for tests).
    pub fn in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(DOCUMENTS_SCHEMA)?;
        Ok(Self {
            conn: tokio::sync::Mutex::new(conn),
        })
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn get(&self, path: &str) -> Result<Option<Fields>, FolioError> {
        let conn = self.conn.lock().await;
        read_document(&conn, path)
    }

    async fn set(&self, path: &str, fields: Fields) -> Result<(), FolioError> {
        let conn = self.conn.lock().await;
        write_document(&conn, path, &fields)?;
        debug!(path, "Document set");
        Ok(())
    }

    async fn update(&self, path: &str, fields: Fields) -> Result<(), FolioError> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction().map_err(FolioError::storage)?;
        let mut existing = read_document(&tx, path)?
            .ok_or_else(|| FolioError::DocumentNotFound(path.to_string()))?;
        existing.extend(fields);
        write_document(&tx, path, &existing)?;
        tx.commit().map_err(FolioError::storage)?;
        debug!(path, "Document updated");
        Ok(())
    }

    async fn increment(&self, path: &str, field: &str, delta: i64) -> Result<i64, FolioError> {
        let mut conn = self.conn.lock().await;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(FolioError::storage)?;
        let existing = read_document(&tx, path)?;
        // Returning early drops `tx`, which rolls back.
        let next = next_counter_value(path, existing.as_ref(), field, delta)?;
        let mut fields = existing.unwrap_or_default();
        fields.insert(field.to_string(), Value::from(next));
        write_document(&tx, path, &fields)?;
        tx.commit().map_err(FolioError::storage)?;
        debug!(path, field, value = next, "Document field incremented");
        Ok(next)
    }
}

/// Durable key-value store, the on-disk stand-in for browser local storage.
pub struct SqliteKeyValueStore {
    conn: Mutex<Connection>,
}

impl SqliteKeyValueStore {
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let conn = open_connection(path.as_ref())?;
        conn.execute_batch(KV_SCHEMA)
            .context("Failed to initialize kv schema")?;
        info!(path = %path.as_ref().display(), "Key-value store opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(KV_SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, FolioError> {
        let conn = self.conn.lock().map_err(FolioError::storage)?;
        conn.query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
            row.get(0)
        })
        .optional()
        .map_err(FolioError::storage)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), FolioError> {
        let conn = self.conn.lock().map_err(FolioError::storage)?;
        conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )
        .map_err(FolioError::storage)?;
        Ok(())
    }
}
