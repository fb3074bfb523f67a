use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::FolioError;

/// Field map of a stored document.
pub type Fields = Map<String, Value>;

/// Small string key-value store, the backing for client-local persisted state.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, FolioError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), FolioError>;
}

/// Remote document store addressed by slash-separated paths.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch the document at `path`.
    async fn get(&self, path: &str) -> Result<Option<Fields>, FolioError>;

    /// Create or overwrite the document at `path`.
    async fn set(&self, path: &str, fields: Fields) -> Result<(), FolioError>;

    /// Merge `fields` into an existing document. Fails with
    /// [`FolioError::DocumentNotFound`] if nothing is stored at `path`.
    async fn update(&self, path: &str, fields: Fields) -> Result<(), FolioError>;

    /// Atomically add `delta` to the integer `field` and return the new value.
    ///
    /// A missing document counts as zero, so the first call creates it. A
    /// present document whose field is missing, not a non-negative integer or
    /// would overflow is [`FolioError::CorruptDocument`] and is left unchanged.
    async fn increment(&self, path: &str, field: &str, delta: i64) -> Result<i64, FolioError>;
}
