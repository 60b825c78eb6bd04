//! The closed event vocabulary consumed by the cache.
//!
//! Every event names its target model and carries strongly typed
//! correlation data (`meta`). Start/success/failure of one request share the
//! same meta and differ only in their [`Phase`].

mod request;

pub use request::{ApiCall, ApiRequest, Method};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{CollectionPage, MutationFailure, Params, Record, RecordId, RequestId, Timestamp};

/// Lifecycle position of a request. Completions carry the time they were
/// observed so that folding an event never has to read a clock.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "phase")]
pub enum Phase<T, E> {
    Started,
    Succeeded { fetch_time: Timestamp, payload: T },
    Failed { fetch_time: Timestamp, error: E },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollectionMeta {
    pub model: String,
    pub params: Params,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordMeta {
    pub model: String,
    pub id: RecordId,
}

/// Meta of a create: the id is only known once the server answers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MutationMeta {
    pub model: String,
    pub req_id: RequestId,
}

/// Meta of an update or delete against an existing record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetMeta {
    pub model: String,
    pub req_id: RequestId,
    pub id: RecordId,
}

/// Mutation kinds that have a request-status bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

/// Wipes one operation's status bucket. `req_id` is informational; the whole
/// bucket is cleared either way.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClearStatus {
    pub model: String,
    pub operation: Operation,
    #[serde(default)]
    pub req_id: Option<RequestId>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum CrudEvent {
    FetchCollection {
        meta: CollectionMeta,
        #[serde(flatten)]
        phase: Phase<CollectionPage, Value>,
    },
    FetchRecord {
        meta: RecordMeta,
        #[serde(flatten)]
        phase: Phase<Value, Value>,
    },
    Create {
        meta: MutationMeta,
        #[serde(flatten)]
        phase: Phase<Record, MutationFailure>,
    },
    Update {
        meta: TargetMeta,
        #[serde(flatten)]
        phase: Phase<Value, MutationFailure>,
    },
    Delete {
        meta: TargetMeta,
        #[serde(flatten)]
        phase: Phase<Value, MutationFailure>,
    },
    ClearActionStatus(ClearStatus),
    ApiCall(ApiCall),
}

/// Stable names for every event kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventType {
    Fetch,
    FetchSuccess,
    FetchError,
    FetchOne,
    FetchOneSuccess,
    FetchOneError,
    Create,
    CreateSuccess,
    CreateError,
    Update,
    UpdateSuccess,
    UpdateError,
    Delete,
    DeleteSuccess,
    DeleteError,
    ClearActionStatus,
    ApiCall,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Fetch => "FETCH",
            EventType::FetchSuccess => "FETCH_SUCCESS",
            EventType::FetchError => "FETCH_ERROR",
            EventType::FetchOne => "FETCH_ONE",
            EventType::FetchOneSuccess => "FETCH_ONE_SUCCESS",
            EventType::FetchOneError => "FETCH_ONE_ERROR",
            EventType::Create => "CREATE",
            EventType::CreateSuccess => "CREATE_SUCCESS",
            EventType::CreateError => "CREATE_ERROR",
            EventType::Update => "UPDATE",
            EventType::UpdateSuccess => "UPDATE_SUCCESS",
            EventType::UpdateError => "UPDATE_ERROR",
            EventType::Delete => "DELETE",
            EventType::DeleteSuccess => "DELETE_SUCCESS",
            EventType::DeleteError => "DELETE_ERROR",
            EventType::ClearActionStatus => "CLEAR_ACTION_STATUS",
            EventType::ApiCall => "API_CALL",
        }
    }
}

fn phased<T, E>(phase: &Phase<T, E>, started: EventType, ok: EventType, err: EventType) -> EventType {
    match phase {
        Phase::Started => started,
        Phase::Succeeded { .. } => ok,
        Phase::Failed { .. } => err,
    }
}

impl CrudEvent {
    pub fn event_type(&self) -> EventType {
        use EventType as T;
        match self {
            CrudEvent::FetchCollection { phase, .. } => {
                phased(phase, T::Fetch, T::FetchSuccess, T::FetchError)
            }
            CrudEvent::FetchRecord { phase, .. } => {
                phased(phase, T::FetchOne, T::FetchOneSuccess, T::FetchOneError)
            }
            CrudEvent::Create { phase, .. } => {
                phased(phase, T::Create, T::CreateSuccess, T::CreateError)
            }
            CrudEvent::Update { phase, .. } => {
                phased(phase, T::Update, T::UpdateSuccess, T::UpdateError)
            }
            CrudEvent::Delete { phase, .. } => {
                phased(phase, T::Delete, T::DeleteSuccess, T::DeleteError)
            }
            CrudEvent::ClearActionStatus(_) => T::ClearActionStatus,
            CrudEvent::ApiCall(_) => T::ApiCall,
        }
    }

    /// The model this event targets; `None` for passthrough calls.
    pub fn model(&self) -> Option<&str> {
        match self {
            CrudEvent::FetchCollection { meta, .. } => Some(&meta.model),
            CrudEvent::FetchRecord { meta, .. } => Some(&meta.model),
            CrudEvent::Create { meta, .. } => Some(&meta.model),
            CrudEvent::Update { meta, .. } | CrudEvent::Delete { meta, .. } => Some(&meta.model),
            CrudEvent::ClearActionStatus(clear) => Some(&clear.model),
            CrudEvent::ApiCall(_) => None,
        }
    }

    // Collection queries

    pub fn collection_started(model: impl Into<String>, params: Params) -> Self {
        CrudEvent::FetchCollection {
            meta: CollectionMeta { model: model.into(), params },
            phase: Phase::Started,
        }
    }

    pub fn collection_loaded(
        model: impl Into<String>,
        params: Params,
        page: CollectionPage,
        fetch_time: Timestamp,
    ) -> Self {
        CrudEvent::FetchCollection {
            meta: CollectionMeta { model: model.into(), params },
            phase: Phase::Succeeded { fetch_time, payload: page },
        }
    }

    pub fn collection_failed(
        model: impl Into<String>,
        params: Params,
        error: Value,
        fetch_time: Timestamp,
    ) -> Self {
        CrudEvent::FetchCollection {
            meta: CollectionMeta { model: model.into(), params },
            phase: Phase::Failed { fetch_time, error },
        }
    }

    // Single records

    pub fn record_started(model: impl Into<String>, id: impl Into<RecordId>) -> Self {
        CrudEvent::FetchRecord {
            meta: RecordMeta { model: model.into(), id: id.into() },
            phase: Phase::Started,
        }
    }

    pub fn record_loaded(
        model: impl Into<String>,
        id: impl Into<RecordId>,
        record: Value,
        fetch_time: Timestamp,
    ) -> Self {
        CrudEvent::FetchRecord {
            meta: RecordMeta { model: model.into(), id: id.into() },
            phase: Phase::Succeeded { fetch_time, payload: record },
        }
    }

    pub fn record_failed(
        model: impl Into<String>,
        id: impl Into<RecordId>,
        error: Value,
        fetch_time: Timestamp,
    ) -> Self {
        CrudEvent::FetchRecord {
            meta: RecordMeta { model: model.into(), id: id.into() },
            phase: Phase::Failed { fetch_time, error },
        }
    }

    // Mutations

    pub fn create_started(model: impl Into<String>, req_id: impl Into<RequestId>) -> Self {
        CrudEvent::Create {
            meta: MutationMeta { model: model.into(), req_id: req_id.into() },
            phase: Phase::Started,
        }
    }

    pub fn create_succeeded(
        model: impl Into<String>,
        req_id: impl Into<RequestId>,
        record: Record,
        fetch_time: Timestamp,
    ) -> Self {
        CrudEvent::Create {
            meta: MutationMeta { model: model.into(), req_id: req_id.into() },
            phase: Phase::Succeeded { fetch_time, payload: record },
        }
    }

    pub fn create_failed(
        model: impl Into<String>,
        req_id: impl Into<RequestId>,
        failure: MutationFailure,
        fetch_time: Timestamp,
    ) -> Self {
        CrudEvent::Create {
            meta: MutationMeta { model: model.into(), req_id: req_id.into() },
            phase: Phase::Failed { fetch_time, error: failure },
        }
    }

    pub fn update_started(
        model: impl Into<String>,
        req_id: impl Into<RequestId>,
        id: impl Into<RecordId>,
    ) -> Self {
        CrudEvent::Update {
            meta: TargetMeta { model: model.into(), req_id: req_id.into(), id: id.into() },
            phase: Phase::Started,
        }
    }

    pub fn update_succeeded(
        model: impl Into<String>,
        req_id: impl Into<RequestId>,
        id: impl Into<RecordId>,
        record: Value,
        fetch_time: Timestamp,
    ) -> Self {
        CrudEvent::Update {
            meta: TargetMeta { model: model.into(), req_id: req_id.into(), id: id.into() },
            phase: Phase::Succeeded { fetch_time, payload: record },
        }
    }

    pub fn update_failed(
        model: impl Into<String>,
        req_id: impl Into<RequestId>,
        id: impl Into<RecordId>,
        failure: MutationFailure,
        fetch_time: Timestamp,
    ) -> Self {
        CrudEvent::Update {
            meta: TargetMeta { model: model.into(), req_id: req_id.into(), id: id.into() },
            phase: Phase::Failed { fetch_time, error: failure },
        }
    }

    pub fn delete_started(
        model: impl Into<String>,
        req_id: impl Into<RequestId>,
        id: impl Into<RecordId>,
    ) -> Self {
        CrudEvent::Delete {
            meta: TargetMeta { model: model.into(), req_id: req_id.into(), id: id.into() },
            phase: Phase::Started,
        }
    }

    pub fn delete_succeeded(
        model: impl Into<String>,
        req_id: impl Into<RequestId>,
        id: impl Into<RecordId>,
        fetch_time: Timestamp,
    ) -> Self {
        CrudEvent::Delete {
            meta: TargetMeta { model: model.into(), req_id: req_id.into(), id: id.into() },
            phase: Phase::Succeeded { fetch_time, payload: Value::Null },
        }
    }

    pub fn delete_failed(
        model: impl Into<String>,
        req_id: impl Into<RequestId>,
        id: impl Into<RecordId>,
        failure: MutationFailure,
        fetch_time: Timestamp,
    ) -> Self {
        CrudEvent::Delete {
            meta: TargetMeta { model: model.into(), req_id: req_id.into(), id: id.into() },
            phase: Phase::Failed { fetch_time, error: failure },
        }
    }

    pub fn clear_action_status(
        model: impl Into<String>,
        operation: Operation,
        req_id: Option<RequestId>,
    ) -> Self {
        CrudEvent::ClearActionStatus(ClearStatus {
            model: model.into(),
            operation,
            req_id,
        })
    }
}
