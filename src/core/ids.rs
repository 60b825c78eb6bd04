use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CacheError;

/// Identifier of a cached record.
///
/// Records arrive with string or numeric ids; both are stored under their
/// decimal/string form so `1` and `"1"` address the same row.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        RecordId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Coerce a JSON id (string or number) into a record id.
    pub fn from_value(value: &Value) -> Result<Self, CacheError> {
        match value {
            Value::String(s) => Ok(RecordId(s.clone())),
            Value::Number(n) => Ok(RecordId(n.to_string())),
            other => Err(CacheError::InvalidRecordId(other.to_string())),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        RecordId(id.to_string())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        RecordId(id)
    }
}

impl From<&String> for RecordId {
    fn from(id: &String) -> Self {
        RecordId(id.clone())
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        RecordId(id.to_string())
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        RecordId(id.to_string())
    }
}

impl From<u32> for RecordId {
    fn from(id: u32) -> Self {
        RecordId(id.to_string())
    }
}

impl From<i32> for RecordId {
    fn from(id: i32) -> Self {
        RecordId(id.to_string())
    }
}

impl From<&RecordId> for RecordId {
    fn from(id: &RecordId) -> Self {
        id.clone()
    }
}

/// Correlation token linking a mutation's start event to its completion.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    pub fn new(id: impl Into<String>) -> Self {
        RequestId(id.into())
    }

    /// Random v4 UUID. Uniqueness per logical operation is what keeps
    /// out-of-order completions correlated correctly.
    pub fn generate() -> Self {
        RequestId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RequestId {
    fn from(id: &str) -> Self {
        RequestId(id.to_string())
    }
}

impl From<String> for RequestId {
    fn from(id: String) -> Self {
        RequestId(id)
    }
}
