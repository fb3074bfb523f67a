use folio_core::{Fields, FolioError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const COUNT_FIELD: &str = "count";

/// The stored counter, `{ "count": n }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterDocument {
    pub count: u64,
}

impl CounterDocument {
    /// Parse stored fields. A missing or non-integer `count` is corrupt.
    pub fn from_fields(path: &str, fields: &Fields) -> Result<Self, FolioError> {
        let count = match fields.get(COUNT_FIELD) {
            Some(value) => value.as_u64().ok_or_else(|| corrupt(path, value))?,
            None => {
                return Err(FolioError::CorruptDocument {
                    path: path.to_string(),
                    reason: format!("missing `{COUNT_FIELD}` field"),
                })
            }
        };
        Ok(Self { count })
    }

    pub fn to_fields(self) -> Fields {
        let mut fields = Fields::new();
        fields.insert(COUNT_FIELD.to_string(), Value::from(self.count));
        fields
    }
}

fn corrupt(path: &str, value: &Value) -> FolioError {
    FolioError::CorruptDocument {
        path: path.to_string(),
        reason: format!("`{COUNT_FIELD}` is not a non-negative integer: {value}"),
    }
}
