//! Visitor counter: bump one document, return the new count.

use std::sync::Arc;

use folio_config::IncrementStrategy;
use folio_core::{DocumentStore, FolioError};
use folio_logging::{SiteEvent, SiteEventLogger};
use tracing::debug;

use crate::document::{CounterDocument, COUNT_FIELD};

#[derive(Clone)]
pub struct VisitorCounter {
    store: Arc<dyn DocumentStore>,
    path: String,
    strategy: IncrementStrategy,
}

impl VisitorCounter {
    pub fn new(store: Arc<dyn DocumentStore>, path: impl Into<String>) -> Self {
        Self {
            store,
            path: path.into(),
            strategy: IncrementStrategy::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: IncrementStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn strategy(&self) -> IncrementStrategy {
        self.strategy
    }

    /// Count one visit and return the new total.
    ///
    /// The first call creates the document with `count = 1`. Store failures
    /// are returned as-is; nothing is retried.
    pub async fn increment_and_get(&self) -> Result<u64, FolioError> {
        let count = match self.strategy {
            IncrementStrategy::Atomic => self.increment_atomic().await?,
            IncrementStrategy::ReadModifyWrite => self.increment_read_modify_write().await?,
        };
        debug!(path = %self.path, count, strategy = ?self.strategy, "Visitor counted");
        SiteEventLogger::log_event(SiteEvent::VisitorCounted { count });
        Ok(count)
    }

    async fn increment_atomic(&self) -> Result<u64, FolioError> {
        let count = self.store.increment(&self.path, COUNT_FIELD, 1).await?;
        u64::try_from(count).map_err(|_| FolioError::CorruptDocument {
            path: self.path.clone(),
            reason: format!("`{COUNT_FIELD}` is out of range: {count}"),
        })
    }

    /// Read, then write. Two overlapping calls can both read `n` and both
    /// write `n + 1`.
    async fn increment_read_modify_write(&self) -> Result<u64, FolioError> {
        match self.store.get(&self.path).await? {
            None => {
                let doc = CounterDocument { count: 1 };
                self.store.set(&self.path, doc.to_fields()).await?;
                Ok(doc.count)
            }
            Some(fields) => {
                let current = CounterDocument::from_fields(&self.path, &fields)?;
                let count = current.count.checked_add(1).ok_or_else(|| {
                    FolioError::CorruptDocument {
                        path: self.path.clone(),
                        reason: format!("`{COUNT_FIELD}` overflows at {}", current.count),
                    }
                })?;
                let next = CounterDocument { count };
                self.store.update(&self.path, next.to_fields()).await?;
                Ok(next.count)
            }
        }
    }
}
