//! The normalized cache state and its transition function.
//!
//! [`CrudState`] is an immutable snapshot. [`CrudState::apply`] folds one
//! event into a new snapshot and is the only way state changes. Untouched
//! parts of the tree are shared between the old and new snapshot, so older
//! snapshots stay valid and cheap to keep around.

mod action_status;
mod collections;
mod records;

pub use action_status::{ActionBucket, ActionStatusTable, RequestStatus};
pub use collections::{Collection, CollectionTable};
pub use records::{RecordEntry, RecordError, RecordTable};

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::event::{CrudEvent, Phase};

/// Everything cached for one model.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ModelState {
    pub by_id: RecordTable,
    pub collections: CollectionTable,
    pub action_status: ActionStatusTable,
}

impl ModelState {
    fn reduce(&self, model: &str, event: &CrudEvent) -> ModelState {
        let mut next = self.clone();
        match event {
            CrudEvent::FetchCollection { .. } => {
                next.collections = next.collections.reduce(event);
                next.by_id = next.by_id.reduce(model, event);
            }
            CrudEvent::FetchRecord { .. } => {
                next.by_id = next.by_id.reduce(model, event);
            }
            CrudEvent::Create { phase, .. } => {
                if let Phase::Succeeded { .. } = phase {
                    next.by_id = next.by_id.reduce(model, event);
                    next.collections = next.collections.reduce(event);
                }
                next.action_status = next.action_status.reduce(event);
            }
            // Updates cannot change collection membership.
            CrudEvent::Update { .. } => {
                next.by_id = next.by_id.reduce(model, event);
                next.action_status = next.action_status.reduce(event);
            }
            CrudEvent::Delete { .. } => {
                next.by_id = next.by_id.reduce(model, event);
                next.collections = next.collections.reduce(event);
                next.action_status = next.action_status.reduce(event);
            }
            CrudEvent::ClearActionStatus(_) => {
                next.action_status = next.action_status.reduce(event);
            }
            CrudEvent::ApiCall(_) => {}
        }
        next
    }
}

/// Snapshot of the whole cache: model name -> [`ModelState`].
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CrudState {
    models: Arc<BTreeMap<String, Arc<ModelState>>>,
}

impl CrudState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(&self, name: &str) -> Option<&ModelState> {
        self.models.get(name).map(Arc::as_ref)
    }

    pub fn models(&self) -> impl Iterator<Item = (&str, &ModelState)> {
        self.models
            .iter()
            .map(|(name, model)| (name.as_str(), model.as_ref()))
    }

    /// Fold one event into a new snapshot.
    ///
    /// Pure and total: models are created on first mention, and events
    /// that do not concern the cache return an identical snapshot.
    pub fn apply(&self, event: &CrudEvent) -> CrudState {
        let Some(model) = event.model() else {
            tracing::trace!(event = event.event_type().as_str(), "ignoring passthrough event");
            return self.clone();
        };

        let next = match self.models.get(model) {
            Some(current) => current.reduce(model, event),
            None => ModelState::default().reduce(model, event),
        };

        let mut models = Arc::clone(&self.models);
        Arc::make_mut(&mut models).insert(model.to_string(), Arc::new(next));
        CrudState { models }
    }

    /// Fold a sequence of events in order.
    pub fn apply_all<'a>(&self, events: impl IntoIterator<Item = &'a CrudEvent>) -> CrudState {
        events
            .into_iter()
            .fold(self.clone(), |state, event| state.apply(event))
    }
}
