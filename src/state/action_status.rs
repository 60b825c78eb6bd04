use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::{FieldErrors, MutationFailure, RecordId, RequestId};
use crate::event::{CrudEvent, Operation, Phase};

/// Lifecycle of one create/update/delete request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestStatus {
    pub pending: bool,
    pub is_success: Option<bool>,
    pub message: Option<String>,
    pub errors: FieldErrors,
    pub id: Option<RecordId>,
    pub req_id: RequestId,
}

impl RequestStatus {
    pub fn pending(req_id: RequestId, id: Option<RecordId>) -> Self {
        RequestStatus {
            pending: true,
            is_success: None,
            message: None,
            errors: FieldErrors::new(),
            id,
            req_id,
        }
    }

    pub fn succeeded(req_id: RequestId, id: RecordId) -> Self {
        RequestStatus {
            pending: false,
            is_success: Some(true),
            message: None,
            errors: FieldErrors::new(),
            id: Some(id),
            req_id,
        }
    }

    pub fn failed(req_id: RequestId, failure: &MutationFailure) -> Self {
        RequestStatus {
            pending: false,
            is_success: Some(false),
            message: failure.message.clone(),
            errors: failure.errors.clone(),
            id: None,
            req_id,
        }
    }

    /// Status reported for a request the cache has never seen.
    pub fn inert(req_id: RequestId) -> Self {
        RequestStatus {
            pending: false,
            is_success: None,
            message: None,
            errors: FieldErrors::new(),
            id: None,
            req_id,
        }
    }
}

/// Statuses of one operation, keyed by request id.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ActionBucket {
    statuses: Arc<BTreeMap<RequestId, Arc<RequestStatus>>>,
    /// Request id written most recently.
    latest: Option<RequestId>,
}

impl ActionBucket {
    pub fn get(&self, req_id: &RequestId) -> Option<&RequestStatus> {
        self.statuses.get(req_id).map(Arc::as_ref)
    }

    pub fn latest(&self) -> Option<&RequestStatus> {
        self.latest.as_ref().and_then(|req_id| self.get(req_id))
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RequestId, &RequestStatus)> {
        self.statuses.iter().map(|(req_id, status)| (req_id, status.as_ref()))
    }

    fn set(&mut self, status: RequestStatus) {
        self.latest = Some(status.req_id.clone());
        Arc::make_mut(&mut self.statuses).insert(status.req_id.clone(), Arc::new(status));
    }
}

/// Per-model request-status table, one bucket per mutation kind.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ActionStatusTable {
    create: ActionBucket,
    update: ActionBucket,
    delete: ActionBucket,
}

impl ActionStatusTable {
    pub fn bucket(&self, operation: Operation) -> &ActionBucket {
        match operation {
            Operation::Create => &self.create,
            Operation::Update => &self.update,
            Operation::Delete => &self.delete,
        }
    }

    fn bucket_mut(&mut self, operation: Operation) -> &mut ActionBucket {
        match operation {
            Operation::Create => &mut self.create,
            Operation::Update => &mut self.update,
            Operation::Delete => &mut self.delete,
        }
    }

    pub fn get(&self, operation: Operation, req_id: &RequestId) -> Option<&RequestStatus> {
        self.bucket(operation).get(req_id)
    }

    /// Fold one event. Start events open a pending status; the completion
    /// with the same request id replaces it with a terminal one, whatever
    /// order requests finish in. Entries stay until a clear-status event.
    pub fn reduce(mut self, event: &CrudEvent) -> Self {
        match event {
            CrudEvent::Create { meta, phase } => {
                let req_id = meta.req_id.clone();
                let status = match phase {
                    Phase::Started => RequestStatus::pending(req_id, None),
                    Phase::Succeeded { payload, .. } => {
                        RequestStatus::succeeded(req_id, payload.id().clone())
                    }
                    Phase::Failed { error, .. } => RequestStatus::failed(req_id, error),
                };
                self.create.set(status);
            }
            CrudEvent::Update { meta, phase } | CrudEvent::Delete { meta, phase } => {
                let operation = match event {
                    CrudEvent::Update { .. } => Operation::Update,
                    _ => Operation::Delete,
                };
                let req_id = meta.req_id.clone();
                let status = match phase {
                    Phase::Started => RequestStatus::pending(req_id, Some(meta.id.clone())),
                    Phase::Succeeded { .. } => RequestStatus::succeeded(req_id, meta.id.clone()),
                    Phase::Failed { error, .. } => RequestStatus::failed(req_id, error),
                };
                self.bucket_mut(operation).set(status);
            }
            CrudEvent::ClearActionStatus(clear) => {
                tracing::debug!(
                    model = clear.model.as_str(),
                    operation = clear.operation.as_str(),
                    "clearing action status bucket"
                );
                *self.bucket_mut(clear.operation) = ActionBucket::default();
            }
            _ => {}
        }
        self
    }
}
