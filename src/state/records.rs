use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{FetchTime, MutationFailure, RecordId, Timestamp};
use crate::event::{CrudEvent, Phase};

/// Last error recorded against a single record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "body")]
pub enum RecordError {
    /// The fetch itself failed; the record pointer was cleared.
    Fetch(Value),
    /// An update was rejected; the previous record is still cached.
    Update(MutationFailure),
}

/// One row of a model's by-id table.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordEntry {
    pub record: Option<Value>,
    pub fetch_time: FetchTime,
    pub error: Option<RecordError>,
}

impl RecordEntry {
    fn loaded(record: Value, fetch_time: Timestamp) -> Self {
        RecordEntry {
            record: Some(record),
            fetch_time: FetchTime::At(fetch_time),
            error: None,
        }
    }

    fn in_flight() -> Self {
        RecordEntry {
            record: None,
            fetch_time: FetchTime::InFlight,
            error: None,
        }
    }
}

/// Canonical by-id table of one model.
///
/// Rows are shared between snapshots; folding an event copies the map only
/// when the event touches it.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RecordTable {
    entries: Arc<BTreeMap<RecordId, Arc<RecordEntry>>>,
}

impl RecordTable {
    pub fn get(&self, id: &RecordId) -> Option<&RecordEntry> {
        self.entries.get(id).map(Arc::as_ref)
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RecordId, &RecordEntry)> {
        self.entries.iter().map(|(id, entry)| (id, entry.as_ref()))
    }

    /// Fold one event into the table. Server data is canonical: every
    /// success replaces the row wholesale rather than merging fields.
    pub fn reduce(mut self, model: &str, event: &CrudEvent) -> Self {
        match event {
            CrudEvent::FetchCollection {
                phase: Phase::Succeeded { fetch_time, payload },
                ..
            } => {
                let entries = Arc::make_mut(&mut self.entries);
                for record in &payload.data {
                    entries.insert(
                        record.id().clone(),
                        Arc::new(RecordEntry::loaded(record.value().clone(), *fetch_time)),
                    );
                }
            }
            CrudEvent::FetchRecord { meta, phase } => {
                let entry = match phase {
                    Phase::Started => RecordEntry::in_flight(),
                    Phase::Succeeded { fetch_time, payload } => {
                        RecordEntry::loaded(payload.clone(), *fetch_time)
                    }
                    Phase::Failed { fetch_time, error } => RecordEntry {
                        record: None,
                        fetch_time: FetchTime::At(*fetch_time),
                        error: Some(RecordError::Fetch(error.clone())),
                    },
                };
                self.insert(meta.id.clone(), entry);
            }
            CrudEvent::Create {
                phase: Phase::Succeeded { fetch_time, payload },
                ..
            } => {
                if self.contains(payload.id()) {
                    tracing::warn!(
                        model,
                        id = %payload.id(),
                        "created record collides with an existing id, overwriting"
                    );
                }
                self.insert(
                    payload.id().clone(),
                    RecordEntry::loaded(payload.value().clone(), *fetch_time),
                );
            }
            CrudEvent::Update { meta, phase } => match phase {
                // Keep showing the old record while the update is in flight.
                Phase::Started => self.modify(&meta.id, |entry| {
                    entry.fetch_time = FetchTime::InFlight;
                }),
                Phase::Succeeded { fetch_time, payload } => {
                    self.insert(meta.id.clone(), RecordEntry::loaded(payload.clone(), *fetch_time));
                }
                Phase::Failed { error, .. } => self.modify(&meta.id, |entry| {
                    entry.error = Some(RecordError::Update(error.clone()));
                }),
            },
            CrudEvent::Delete {
                meta,
                phase: Phase::Succeeded { .. },
            } => {
                if self.contains(&meta.id) {
                    Arc::make_mut(&mut self.entries).remove(&meta.id);
                }
            }
            _ => {}
        }
        self
    }

    fn insert(&mut self, id: RecordId, entry: RecordEntry) {
        Arc::make_mut(&mut self.entries).insert(id, Arc::new(entry));
    }

    fn modify(&mut self, id: &RecordId, f: impl FnOnce(&mut RecordEntry)) {
        let entries = Arc::make_mut(&mut self.entries);
        let entry = entries.entry(id.clone()).or_default();
        f(Arc::make_mut(entry));
    }
}
