use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use folio_core::{DocumentStore, Fields, FolioError, KeyValueStore};
use serde_json::Value;
use tracing::debug;

use crate::next_counter_value;

/// Process-local key-value store.
#[derive(Clone, Default)]
pub struct InMemoryKeyValueStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, FolioError> {
        let entries = self.entries.read().map_err(FolioError::storage)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), FolioError> {
        let mut entries = self.entries.write().map_err(FolioError::storage)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Process-local document store.
///
/// `increment` holds the write lock across read and write, so it is atomic
/// with respect to every other operation on the store.
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    documents: Arc<tokio::sync::RwLock<HashMap<String, Fields>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, path: &str) -> Result<Option<Fields>, FolioError> {
        Ok(self.documents.read().await.get(path).cloned())
    }

    async fn set(&self, path: &str, fields: Fields) -> Result<(), FolioError> {
        self.documents.write().await.insert(path.to_string(), fields);
        debug!(path, "Document set");
        Ok(())
    }

    async fn update(&self, path: &str, fields: Fields) -> Result<(), FolioError> {
        let mut documents = self.documents.write().await;
        let existing = documents
            .get_mut(path)
            .ok_or_else(|| FolioError::DocumentNotFound(path.to_string()))?;
        existing.extend(fields);
        debug!(path, "Document updated");
        Ok(())
    }

    async fn increment(&self, path: &str, field: &str, delta: i64) -> Result<i64, FolioError> {
        let mut documents = self.documents.write().await;
        let next = next_counter_value(path, documents.get(path), field, delta)?;
        documents
            .entry(path.to_string())
            .or_default()
            .insert(field.to_string(), Value::from(next));
        debug!(path, field, value = next, "Document field incremented");
        Ok(next)
    }
}
