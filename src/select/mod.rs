//! Read selectors: decide, for a query against a snapshot, whether cached
//! data can be served or a fetch is needed.
//!
//! ## Example
//!
//! ```ignore
//! let select = Selectors::new(&state, &config);
//! match select.collection("users", &params) {
//!     CollectionRead::Ready { data, .. } => render(data),
//!     CollectionRead::Loading { needs_fetch: true } => dispatch(fetch_users()),
//!     CollectionRead::Loading { needs_fetch: false } => spinner(),
//! }
//! ```

mod collection;
mod freshness;
mod status;

pub use freshness::{Freshness, Staleness};
pub use status::ActionOutcome;

use serde_json::{Map, Value};

use crate::config::CacheConfig;
use crate::core::{Params, RecordId, RequestId, Timestamp};
use crate::error::CacheError;
use crate::event::Operation;
use crate::resource::{decode, Resource};
use crate::state::{ActionBucket, CrudState, ModelState, RecordError, RequestStatus};

/// Result of reading one query's collection.
#[derive(Clone, Debug, PartialEq)]
pub enum CollectionRead<T = Value> {
    Loading { needs_fetch: bool },
    Ready {
        data: Vec<T>,
        other_info: Map<String, Value>,
    },
}

impl<T> CollectionRead<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, CollectionRead::Loading { .. })
    }

    pub fn needs_fetch(&self) -> bool {
        matches!(self, CollectionRead::Loading { needs_fetch: true })
    }

    /// The records, or an empty slice while loading.
    pub fn data(&self) -> &[T] {
        match self {
            CollectionRead::Ready { data, .. } => data,
            CollectionRead::Loading { .. } => &[],
        }
    }

    pub fn other_info(&self) -> Option<&Map<String, Value>> {
        match self {
            CollectionRead::Ready { other_info, .. } => Some(other_info),
            CollectionRead::Loading { .. } => None,
        }
    }
}

/// Result of reading one record.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordRead<'a, T = &'a Value> {
    Loading { needs_fetch: bool },
    Failed(&'a RecordError),
    Ready(T),
}

impl<'a, T> RecordRead<'a, T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, RecordRead::Loading { .. })
    }

    pub fn needs_fetch(&self) -> bool {
        matches!(self, RecordRead::Loading { needs_fetch: true })
    }

    pub fn ready(self) -> Option<T> {
        match self {
            RecordRead::Ready(record) => Some(record),
            _ => None,
        }
    }
}

/// Selectors bound to one snapshot, one configuration and one instant.
///
/// The instant defaults to the system clock when the selectors are built;
/// [`Selectors::at`] pins it explicitly.
#[derive(Clone, Copy, Debug)]
pub struct Selectors<'a> {
    state: &'a CrudState,
    config: &'a CacheConfig,
    freshness: Freshness,
}

impl<'a> Selectors<'a> {
    pub fn new(state: &'a CrudState, config: &'a CacheConfig) -> Self {
        Selectors {
            state,
            config,
            freshness: Freshness::new(config.freshness_window(), Timestamp::now()),
        }
    }

    pub fn at(mut self, now: Timestamp) -> Self {
        self.freshness = Freshness::new(self.config.freshness_window(), now);
        self
    }

    pub fn freshness(&self) -> Freshness {
        self.freshness
    }

    fn model(&self, model: &str) -> Option<&'a ModelState> {
        self.state.model(model)
    }

    /// Read the collection cached for `params`. Serves data only when the
    /// collection and every record it references are fresh, with declared
    /// relations joined in from their models.
    pub fn collection(&self, model: &str, params: &Params) -> CollectionRead {
        collection::select(self.state, self.config, &self.freshness, model, params)
    }

    /// Read one record.
    pub fn record(&self, model: &str, id: impl Into<RecordId>) -> RecordRead<'a> {
        let id = id.into();
        let Some(entry) = self.model(model).and_then(|m| m.by_id.get(&id)) else {
            return RecordRead::Loading { needs_fetch: true };
        };
        match self.freshness.staleness(entry.fetch_time) {
            Staleness::InFlight => return RecordRead::Loading { needs_fetch: false },
            Staleness::Stale => return RecordRead::Loading { needs_fetch: true },
            Staleness::Fresh => {}
        }
        if let Some(error) = &entry.error {
            return RecordRead::Failed(error);
        }
        match &entry.record {
            Some(record) => RecordRead::Ready(record),
            None => RecordRead::Loading { needs_fetch: true },
        }
    }

    /// The record when it can be served as-is, otherwise `None`.
    pub fn record_or_empty(&self, model: &str, id: impl Into<RecordId>) -> Option<&'a Value> {
        self.record(model, id).ready()
    }

    /// [`Selectors::record`] decoded into a typed resource.
    pub fn record_as<T: Resource>(
        &self,
        id: impl Into<RecordId>,
    ) -> Result<RecordRead<'a, T>, CacheError> {
        Ok(match self.record(T::MODEL, id) {
            RecordRead::Loading { needs_fetch } => RecordRead::Loading { needs_fetch },
            RecordRead::Failed(error) => RecordRead::Failed(error),
            RecordRead::Ready(value) => RecordRead::Ready(decode::<T>(value)?),
        })
    }

    /// [`Selectors::collection`] decoded into typed resources.
    pub fn collection_as<T: Resource>(
        &self,
        params: &Params,
    ) -> Result<CollectionRead<T>, CacheError> {
        Ok(match self.collection(T::MODEL, params) {
            CollectionRead::Loading { needs_fetch } => CollectionRead::Loading { needs_fetch },
            CollectionRead::Ready { data, other_info } => CollectionRead::Ready {
                data: data.iter().map(decode::<T>).collect::<Result<_, _>>()?,
                other_info,
            },
        })
    }

    /// Status of one request, or an inert status if the cache has none.
    pub fn action_status(
        &self,
        model: &str,
        operation: Operation,
        req_id: &RequestId,
    ) -> RequestStatus {
        self.model(model)
            .and_then(|m| m.action_status.get(operation, req_id))
            .cloned()
            .unwrap_or_else(|| RequestStatus::inert(req_id.clone()))
    }

    /// Every status recorded for one operation.
    pub fn all_action_statuses(&self, model: &str, operation: Operation) -> Vec<&'a RequestStatus> {
        self.bucket(model, operation)
            .map(|bucket| bucket.iter().map(|(_, status)| status).collect())
            .unwrap_or_default()
    }

    /// The most recently touched request of an operation, shaped for display.
    pub fn nice_action_status(&self, model: &str, operation: Operation) -> ActionOutcome<'a> {
        let status = self.bucket(model, operation).and_then(ActionBucket::latest);
        status::outcome(self.model(model), status)
    }

    /// Like [`Selectors::nice_action_status`] for one specific request.
    pub fn nice_action_status_for(
        &self,
        model: &str,
        operation: Operation,
        req_id: &RequestId,
    ) -> ActionOutcome<'a> {
        let status = self.bucket(model, operation).and_then(|b| b.get(req_id));
        status::outcome(self.model(model), status)
    }

    fn bucket(&self, model: &str, operation: Operation) -> Option<&'a ActionBucket> {
        self.model(model).map(|m| m.action_status.bucket(operation))
    }
}
