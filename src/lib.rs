//! Normalized, staleness-aware cache for resources fetched from a REST API.
//!
//! Per model the cache keeps a canonical by-id record table, the list
//! queries that have been run (keyed by their params), and the status of
//! in-flight create/update/delete requests. [`CrudState::apply`] folds
//! events into new immutable snapshots; [`Selectors`] decide whether a
//! snapshot can serve a query or a fetch is needed.

mod config;
mod core;
mod error;
mod event;
mod resource;
mod select;
mod state;
mod store;

pub mod requests;

pub use config::{CacheConfig, Relation, DEFAULT_FRESHNESS_WINDOW};
pub use self::core::{
    CollectionPage, FetchTime, FieldErrors, MutationFailure, Params, Record, RecordId,
    RequestId, Timestamp,
};
pub use error::CacheError;
pub use event::{
    ApiCall, ApiRequest, ClearStatus, CollectionMeta, CrudEvent, EventType, Method,
    MutationMeta, Operation, Phase, RecordMeta, TargetMeta,
};
pub use requests::PendingCall;
pub use resource::Resource;
pub use select::{
    ActionOutcome, CollectionRead, Freshness, RecordRead, Selectors, Staleness,
};
pub use state::{
    ActionBucket, ActionStatusTable, Collection, CollectionTable, CrudState, ModelState,
    RecordEntry, RecordError, RecordTable, RequestStatus,
};
pub use store::{CacheStore, StoreNotice};

// Derive macro for typed resources
pub use crud_cache_macros::Resource;
