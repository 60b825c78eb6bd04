//! Request builders and response preparation.
//!
//! These sit between the transport and the cache: a builder describes the
//! outgoing request together with its start event, and the returned
//! [`PendingCall`] turns the eventual response (or error body) into the
//! completion events to dispatch. Nothing here touches cache state.
//!
//! ## Example
//!
//! ```ignore
//! let call = requests::fetch_collection("posts", "/posts", Params::new().with("page", 1));
//! store.dispatch(call.start_event())?;
//! let response = transport.send(call.request())?;
//! store.dispatch_all(call.succeed(response, Timestamp::now(), store.config())?)?;
//! ```

use std::collections::BTreeMap;

use serde_json::Value;

use crate::config::CacheConfig;
use crate::core::{CollectionPage, MutationFailure, Params, Record, RecordId, RequestId, Timestamp};
use crate::error::CacheError;
use crate::event::{
    ApiCall, ApiRequest, CollectionMeta, CrudEvent, Method, MutationMeta, Operation, Phase,
    RecordMeta, TargetMeta,
};

#[derive(Clone, Debug, PartialEq)]
enum CallKind {
    FetchCollection(CollectionMeta),
    FetchRecord(RecordMeta),
    Create(MutationMeta),
    Update(TargetMeta),
    Delete(TargetMeta),
}

/// A request that has been described but not yet answered.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingCall {
    kind: CallKind,
    request: ApiRequest,
}

pub fn fetch_collection(model: impl Into<String>, path: impl Into<String>, params: Params) -> PendingCall {
    PendingCall {
        request: ApiRequest::new(Method::Get, path).with_params(params.clone()),
        kind: CallKind::FetchCollection(CollectionMeta {
            model: model.into(),
            params,
        }),
    }
}

pub fn fetch_record(
    model: impl Into<String>,
    id: impl Into<RecordId>,
    path: impl Into<String>,
) -> PendingCall {
    PendingCall {
        request: ApiRequest::new(Method::Get, path),
        kind: CallKind::FetchRecord(RecordMeta {
            model: model.into(),
            id: id.into(),
        }),
    }
}

pub fn create_record(model: impl Into<String>, path: impl Into<String>, data: Value) -> PendingCall {
    PendingCall {
        request: ApiRequest::new(Method::Post, path).with_data(data),
        kind: CallKind::Create(MutationMeta {
            model: model.into(),
            req_id: RequestId::generate(),
        }),
    }
}

pub fn update_record(
    model: impl Into<String>,
    id: impl Into<RecordId>,
    path: impl Into<String>,
    data: Value,
) -> PendingCall {
    PendingCall {
        request: ApiRequest::new(Method::Put, path).with_data(data),
        kind: CallKind::Update(TargetMeta {
            model: model.into(),
            req_id: RequestId::generate(),
            id: id.into(),
        }),
    }
}

pub fn delete_record(
    model: impl Into<String>,
    id: impl Into<RecordId>,
    path: impl Into<String>,
) -> PendingCall {
    PendingCall {
        request: ApiRequest::new(Method::Delete, path),
        kind: CallKind::Delete(TargetMeta {
            model: model.into(),
            req_id: RequestId::generate(),
            id: id.into(),
        }),
    }
}

/// Passthrough request whose response the cache ignores.
pub fn api_call(
    success: impl Into<String>,
    failure: impl Into<String>,
    method: Method,
    path: impl Into<String>,
    params: Params,
    data: Option<Value>,
) -> CrudEvent {
    let mut request = ApiRequest::new(method, path).with_params(params);
    if let Some(data) = data {
        request = request.with_data(data);
    }
    CrudEvent::ApiCall(ApiCall {
        success: success.into(),
        failure: failure.into(),
        request,
    })
}

pub fn clear_action_status(
    model: impl Into<String>,
    operation: Operation,
    req_id: Option<RequestId>,
) -> CrudEvent {
    CrudEvent::clear_action_status(model, operation, req_id)
}

impl PendingCall {
    /// Replace the generated request id. Has no effect on fetches, which
    /// are correlated by params or record id instead.
    pub fn with_request_id(mut self, req_id: impl Into<RequestId>) -> Self {
        match &mut self.kind {
            CallKind::Create(meta) => meta.req_id = req_id.into(),
            CallKind::Update(meta) | CallKind::Delete(meta) => meta.req_id = req_id.into(),
            CallKind::FetchCollection(_) | CallKind::FetchRecord(_) => {}
        }
        self
    }

    /// Extra query-string parameters for the outgoing request. A collection
    /// fetch is identified by its params, so they are kept in sync.
    pub fn with_params(mut self, params: Params) -> Self {
        if let CallKind::FetchCollection(meta) = &mut self.kind {
            meta.params = params.clone();
        }
        self.request.params = params;
        self
    }

    pub fn request(&self) -> &ApiRequest {
        &self.request
    }

    pub fn model(&self) -> &str {
        match &self.kind {
            CallKind::FetchCollection(meta) => &meta.model,
            CallKind::FetchRecord(meta) => &meta.model,
            CallKind::Create(meta) => &meta.model,
            CallKind::Update(meta) | CallKind::Delete(meta) => &meta.model,
        }
    }

    pub fn req_id(&self) -> Option<&RequestId> {
        match &self.kind {
            CallKind::Create(meta) => Some(&meta.req_id),
            CallKind::Update(meta) | CallKind::Delete(meta) => Some(&meta.req_id),
            CallKind::FetchCollection(_) | CallKind::FetchRecord(_) => None,
        }
    }

    pub fn start_event(&self) -> CrudEvent {
        self.event(Phase::Started, Phase::Started, Phase::Started, Phase::Started)
    }

    /// Completion events for a successful response, in dispatch order.
    ///
    /// For fetches, objects embedded at a declared relation field are split
    /// out: the field is replaced by the embedded id and the object itself is
    /// emitted first as a record fetch of the related model.
    pub fn succeed(
        &self,
        response: Value,
        fetch_time: Timestamp,
        config: &CacheConfig,
    ) -> Result<Vec<CrudEvent>, CacheError> {
        let mut nested = NestedRecords::default();
        let event = match &self.kind {
            CallKind::FetchCollection(meta) => {
                let mut page = CollectionPage::from_response(response)?;
                for record in &mut page.data {
                    nested.split(config, &meta.model, record)?;
                }
                CrudEvent::FetchCollection {
                    meta: meta.clone(),
                    phase: Phase::Succeeded { fetch_time, payload: page },
                }
            }
            CallKind::FetchRecord(meta) => {
                let payload = match Record::from_value(response.clone()) {
                    Ok(mut record) => {
                        nested.split(config, &meta.model, &mut record)?;
                        record.into_value()
                    }
                    // Single-record bodies are keyed by the requested id and
                    // need not repeat it.
                    Err(_) => response,
                };
                CrudEvent::FetchRecord {
                    meta: meta.clone(),
                    phase: Phase::Succeeded { fetch_time, payload },
                }
            }
            CallKind::Create(meta) => CrudEvent::Create {
                meta: meta.clone(),
                phase: Phase::Succeeded {
                    fetch_time,
                    payload: Record::from_value(response)?,
                },
            },
            CallKind::Update(meta) => CrudEvent::Update {
                meta: meta.clone(),
                phase: Phase::Succeeded { fetch_time, payload: response },
            },
            CallKind::Delete(meta) => CrudEvent::Delete {
                meta: meta.clone(),
                phase: Phase::Succeeded { fetch_time, payload: response },
            },
        };

        let mut events = nested.into_events(fetch_time);
        events.push(event);
        Ok(events)
    }

    /// Completion event for a failed request.
    pub fn fail(&self, body: Value, fetch_time: Timestamp) -> CrudEvent {
        let failure = || MutationFailure::from_value(body.clone());
        self.event(
            Phase::Failed { fetch_time, error: body.clone() },
            Phase::Failed { fetch_time, error: body.clone() },
            Phase::Failed { fetch_time, error: failure() },
            Phase::Failed { fetch_time, error: failure() },
        )
    }

    fn event(
        &self,
        collection: Phase<CollectionPage, Value>,
        record: Phase<Value, Value>,
        create: Phase<Record, MutationFailure>,
        mutation: Phase<Value, MutationFailure>,
    ) -> CrudEvent {
        match &self.kind {
            CallKind::FetchCollection(meta) => CrudEvent::FetchCollection {
                meta: meta.clone(),
                phase: collection,
            },
            CallKind::FetchRecord(meta) => CrudEvent::FetchRecord {
                meta: meta.clone(),
                phase: record,
            },
            CallKind::Create(meta) => CrudEvent::Create {
                meta: meta.clone(),
                phase: create,
            },
            CallKind::Update(meta) => CrudEvent::Update {
                meta: meta.clone(),
                phase: mutation,
            },
            CallKind::Delete(meta) => CrudEvent::Delete {
                meta: meta.clone(),
                phase: mutation,
            },
        }
    }
}

/// Embedded records collected while normalizing a response, per model.
#[derive(Default)]
struct NestedRecords {
    by_model: BTreeMap<String, BTreeMap<RecordId, Value>>,
}

impl NestedRecords {
    fn split(&mut self, config: &CacheConfig, model: &str, record: &mut Record) -> Result<(), CacheError> {
        for relation in config.relations_for(model) {
            let Some(embedded) = record.get(&relation.field).filter(|v| v.is_object()).cloned()
            else {
                continue;
            };
            let mut related = Record::from_value(embedded)?;
            self.split(config, &relation.target, &mut related)?;

            let raw_id = related.get("id").cloned().unwrap_or(Value::Null);
            record.replace_field(&relation.field, raw_id);
            self.by_model
                .entry(relation.target.clone())
                .or_default()
                .insert(related.id().clone(), related.into_value());
        }
        Ok(())
    }

    fn into_events(self, fetch_time: Timestamp) -> Vec<CrudEvent> {
        self.by_model
            .into_iter()
            .flat_map(|(model, records)| {
                records.into_iter().map(move |(id, value)| {
                    CrudEvent::record_loaded(model.clone(), id, value, fetch_time)
                })
            })
            .collect()
    }
}
