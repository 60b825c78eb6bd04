use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::{FetchTime, Params, RecordId};
use crate::event::{CrudEvent, Phase};

/// Cached result of one list query.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub params: Params,
    /// Response fields other than `data` (pagination, totals).
    pub other_info: Map<String, Value>,
    /// Ids of the last successful result, in server order.
    pub ids: Vec<RecordId>,
    pub fetch_time: FetchTime,
    pub error: Option<Value>,
}

impl Collection {
    fn new(params: Params) -> Self {
        Collection {
            params,
            ..Collection::default()
        }
    }

    fn reduce(&mut self, event: &CrudEvent) {
        let CrudEvent::FetchCollection { meta, phase } = event else {
            return;
        };
        self.params = meta.params.clone();
        match phase {
            Phase::Started => {
                self.fetch_time = FetchTime::InFlight;
                self.error = None;
            }
            Phase::Succeeded { fetch_time, payload } => {
                self.ids = payload.ids();
                self.other_info = payload.other_info.clone();
                self.error = None;
                self.fetch_time = FetchTime::At(*fetch_time);
            }
            // fetch_time is left as-is: a query that failed shortly after a
            // good fetch keeps serving the cached ids until the window ends.
            Phase::Failed { error, .. } => {
                self.error = Some(error.clone());
            }
        }
    }
}

/// The ordered list of queries run against one model, first-seen order.
///
/// Each distinct `Params` value appears at most once. Lookups go through an
/// index keyed by [`Params::canonical_key`] and fall back to a scan.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CollectionTable {
    entries: Arc<Vec<Arc<Collection>>>,
    #[serde(skip)]
    index: Arc<BTreeMap<String, usize>>,
}

impl CollectionTable {
    pub fn find(&self, params: &Params) -> Option<&Collection> {
        self.position(params).map(|i| self.entries[i].as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Collection> {
        self.entries.iter().map(Arc::as_ref)
    }

    /// Index first; on a miss, scan, since deep-equal params can still
    /// spell different keys (`0.0` and `-0.0`).
    fn position(&self, params: &Params) -> Option<usize> {
        self.index
            .get(&params.canonical_key())
            .copied()
            .filter(|&i| self.entries.get(i).is_some_and(|c| &c.params == params))
            .or_else(|| self.entries.iter().position(|c| &c.params == params))
    }

    /// Fold one event. Fetch events update (or first create) the collection
    /// whose params match; a successful create or delete marks every
    /// collection of the model as never fetched, since any query's
    /// membership may have changed.
    pub fn reduce(mut self, event: &CrudEvent) -> Self {
        match event {
            CrudEvent::FetchCollection { meta, .. } => {
                let index = match self.position(&meta.params) {
                    Some(index) => index,
                    None => self.push(Collection::new(meta.params.clone())),
                };
                let entries = Arc::make_mut(&mut self.entries);
                Arc::make_mut(&mut entries[index]).reduce(event);
            }
            CrudEvent::Create {
                phase: Phase::Succeeded { .. },
                ..
            }
            | CrudEvent::Delete {
                phase: Phase::Succeeded { .. },
                ..
            } => self.invalidate_all(),
            _ => {}
        }
        self
    }

    fn push(&mut self, collection: Collection) -> usize {
        let index = self.entries.len();
        Arc::make_mut(&mut self.index).insert(collection.params.canonical_key(), index);
        Arc::make_mut(&mut self.entries).push(Arc::new(collection));
        index
    }

    fn invalidate_all(&mut self) {
        if self.entries.iter().all(|c| c.fetch_time == FetchTime::Never) {
            return;
        }
        for collection in Arc::make_mut(&mut self.entries).iter_mut() {
            if collection.fetch_time != FetchTime::Never {
                Arc::make_mut(collection).fetch_time = FetchTime::Never;
            }
        }
    }
}
