use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::RecordId;
use crate::error::CacheError;

/// Field name -> validation messages, as returned by a failed mutation.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// A server record: a JSON object that is guaranteed to carry an `id`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Record {
    id: RecordId,
    value: Value,
}

impl Record {
    pub fn from_value(value: Value) -> Result<Self, CacheError> {
        let id = match value.as_object() {
            Some(object) => match object.get("id") {
                Some(id) => RecordId::from_value(id)?,
                None => return Err(CacheError::MissingRecordId(value.to_string())),
            },
            None => return Err(CacheError::MissingRecordId(value.to_string())),
        };
        Ok(Record { id, value })
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.value.get(field)
    }

    /// Replace one field, returning the previous value. The `id` field is
    /// not replaceable.
    pub(crate) fn replace_field(&mut self, field: &str, value: Value) -> Option<Value> {
        if field == "id" {
            return None;
        }
        self.value
            .as_object_mut()
            .and_then(|object| object.insert(field.to_string(), value))
    }
}

impl TryFrom<Value> for Record {
    type Error = CacheError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Record::from_value(value)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        record.value
    }
}

/// One page of a collection response, split into the ordered records and
/// everything else the server sent alongside them (pagination, totals).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionPage {
    pub data: Vec<Record>,
    pub other_info: Map<String, Value>,
}

impl CollectionPage {
    pub fn new(data: Vec<Record>) -> Self {
        CollectionPage {
            data,
            other_info: Map::new(),
        }
    }

    pub fn with_info(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.other_info.insert(key.into(), value.into());
        self
    }

    /// Split a `{ data: [...], ...rest }` response body.
    pub fn from_response(response: Value) -> Result<Self, CacheError> {
        let mut object = match response {
            Value::Object(object) => object,
            other => {
                return Err(CacheError::MalformedResponse(format!(
                    "expected an object with a data array, got {}",
                    other
                )))
            }
        };
        let data = match object.remove("data") {
            Some(Value::Array(items)) => items
                .into_iter()
                .map(Record::from_value)
                .collect::<Result<Vec<_>, _>>()?,
            Some(other) => {
                return Err(CacheError::MalformedResponse(format!(
                    "data must be an array, got {}",
                    other
                )))
            }
            None => {
                return Err(CacheError::MalformedResponse(
                    "collection response has no data field".into(),
                ))
            }
        };
        Ok(CollectionPage {
            data,
            other_info: object,
        })
    }

    pub fn ids(&self) -> Vec<RecordId> {
        self.data.iter().map(|r| r.id().clone()).collect()
    }
}

/// Failure body of a create/update/delete request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationFailure {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: FieldErrors,
}

impl MutationFailure {
    pub fn new(message: impl Into<String>) -> Self {
        MutationFailure {
            message: Some(message.into()),
            errors: FieldErrors::new(),
        }
    }

    pub fn with_field_error(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
        self
    }

    /// Lenient parse of an error body. Bodies that are not objects, or whose
    /// `errors` is null, become a failure with whatever could be read.
    pub fn from_value(body: Value) -> Self {
        let Value::Object(mut object) = body else {
            return MutationFailure::default();
        };
        let message = match object.remove("message") {
            Some(Value::String(message)) => Some(message),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        };
        let errors = object
            .remove("errors")
            .and_then(|errors| serde_json::from_value::<FieldErrors>(errors).ok())
            .unwrap_or_default();
        MutationFailure { message, errors }
    }
}
