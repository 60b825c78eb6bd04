//! Typed views over cached records.
//!
//! ## Example
//!
//! ```ignore
//! use crud_cache::{Resource, Selectors};
//!
//! #[derive(Deserialize, Resource)]
//! #[resource(model = "users")]
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! let read = Selectors::new(&state, &config).record_as::<User>(7u64)?;
//! ```

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::core::RecordId;
use crate::error::CacheError;

/// A record type stored under one model name.
pub trait Resource: DeserializeOwned {
    /// Model name the records are cached under (e.g. "users").
    const MODEL: &'static str;

    /// The record's id, as the cache keys it.
    fn record_id(&self) -> RecordId;
}

pub(crate) fn decode<T: Resource>(value: &Value) -> Result<T, CacheError> {
    T::deserialize(value).map_err(|e| CacheError::Decode {
        model: T::MODEL.to_string(),
        message: e.to_string(),
    })
}
