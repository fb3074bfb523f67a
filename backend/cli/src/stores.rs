//! Store and service wiring from config.

use std::sync::Arc;

use anyhow::{Context, Result};
use folio_config::defaults::{DEFAULT_COUNTER_PATH, DEFAULT_DB_PATH};
use folio_config::{FolioConfig, StorageBackend};
use folio_core::{DocumentStore, KeyValueStore};
use folio_counter::VisitorCounter;
use folio_storage::{
    InMemoryDocumentStore, InMemoryKeyValueStore, SqliteDocumentStore, SqliteKeyValueStore,
};
use tracing::debug;

fn backend(config: &FolioConfig) -> (StorageBackend, String) {
    let storage = config.storage.as_ref();
    let backend = storage.and_then(|s| s.backend).unwrap_or_default();
    let path = storage
        .and_then(|s| s.path.clone())
        .unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
    (backend, path)
}

pub fn document_store(config: &FolioConfig) -> Result<Arc<dyn DocumentStore>> {
    let (backend, path) = backend(config);
    debug!(?backend, path = %path, "Opening document store");
    Ok(match backend {
        StorageBackend::Memory => Arc::new(InMemoryDocumentStore::new()),
        StorageBackend::Sqlite => Arc::new(
            SqliteDocumentStore::open(&path)
                .with_context(|| format!("Failed to open document store at {path}"))?,
        ),
    })
}

pub fn key_value_store(config: &FolioConfig) -> Result<Arc<dyn KeyValueStore>> {
    let (backend, path) = backend(config);
    debug!(?backend, path = %path, "Opening key-value store");
    Ok(match backend {
        StorageBackend::Memory => Arc::new(InMemoryKeyValueStore::new()),
        StorageBackend::Sqlite => Arc::new(
            SqliteKeyValueStore::open(&path)
                .with_context(|| format!("Failed to open key-value store at {path}"))?,
        ),
    })
}

pub fn visitor_counter(config: &FolioConfig) -> Result<VisitorCounter> {
    let counter = config.counter.as_ref();
    let path = counter
        .and_then(|c| c.document_path.clone())
        .unwrap_or_else(|| DEFAULT_COUNTER_PATH.to_string());
    let strategy = counter.and_then(|c| c.strategy).unwrap_or_default();
    Ok(VisitorCounter::new(document_store(config)?, path).with_strategy(strategy))
}
