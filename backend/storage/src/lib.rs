//! Storage backends for Folio.
//!
//! Both the client-local key-value store and the remote document store come in
//! an in-memory flavour (tests, ephemeral deployments) and a SQLite flavour.

pub mod memory;
pub mod sqlite;

pub use memory::{InMemoryDocumentStore, InMemoryKeyValueStore};
pub use sqlite::{SqliteDocumentStore, SqliteKeyValueStore};

use folio_core::{FolioError, Fields};
use serde_json::Value;

/// Compute the incremented value of a counter field.
///
/// Only a missing document counts as zero. A present document whose field is
/// missing, not an integer or negative is corrupt, as is a result that would
/// overflow or drop below zero. Nothing is written on error.
pub(crate) fn next_counter_value(
    path: &str,
    fields: Option<&Fields>,
    field: &str,
    delta: i64,
) -> Result<i64, FolioError> {
    let corrupt = |reason: String| FolioError::CorruptDocument {
        path: path.to_string(),
        reason,
    };
    let current = match fields {
        None => 0,
        Some(fields) => match fields.get(field) {
            None | Some(Value::Null) => return Err(corrupt(format!("missing `{field}` field"))),
            Some(value) => value
                .as_i64()
                .filter(|n| *n >= 0)
                .ok_or_else(|| corrupt(format!("`{field}` is not a non-negative integer: {value}")))?,
        },
    };
    match current.checked_add(delta) {
        Some(next) if next >= 0 => Ok(next),
        Some(next) => Err(corrupt(format!("`{field}` would become negative: {next}"))),
        None => Err(corrupt(format!("`{field}` overflows at {current} + {delta}"))),
    }
}
