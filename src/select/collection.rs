use serde_json::Value;

use super::{CollectionRead, Freshness, Staleness};
use crate::config::{CacheConfig, Relation};
use crate::core::{Params, RecordId};
use crate::state::{CrudState, ModelState};

pub(super) fn select(
    state: &CrudState,
    config: &CacheConfig,
    freshness: &Freshness,
    model: &str,
    params: &Params,
) -> CollectionRead {
    let Some(model_state) = state.model(model) else {
        return CollectionRead::Loading { needs_fetch: true };
    };
    let Some(collection) = model_state.collections.find(params) else {
        return CollectionRead::Loading { needs_fetch: true };
    };

    if let Some(read) = loading(freshness.staleness(collection.fetch_time)) {
        return read;
    }

    // Every referenced row must be fresh too; the first one that is not
    // decides between "already loading" and "needs fetch".
    for id in &collection.ids {
        let Some(entry) = model_state.by_id.get(id) else {
            return CollectionRead::Loading { needs_fetch: true };
        };
        if let Some(read) = loading(freshness.staleness(entry.fetch_time)) {
            return read;
        }
    }

    let relations: Vec<&Relation> = config.relations_for(model).collect();
    let data = collection
        .ids
        .iter()
        .map(|id| {
            let record = model_state
                .by_id
                .get(id)
                .and_then(|entry| entry.record.clone())
                .unwrap_or(Value::Null);
            join(state, &relations, record)
        })
        .collect();

    CollectionRead::Ready {
        data,
        other_info: collection.other_info.clone(),
    }
}

fn loading(staleness: Staleness) -> Option<CollectionRead> {
    match staleness {
        Staleness::Fresh => None,
        Staleness::InFlight => Some(CollectionRead::Loading { needs_fetch: false }),
        Staleness::Stale => Some(CollectionRead::Loading { needs_fetch: true }),
    }
}

/// Replace foreign-key fields with the related record when it is cached.
/// Ids whose target is missing are left in place.
fn join(state: &CrudState, relations: &[&Relation], mut record: Value) -> Value {
    let Some(object) = record.as_object_mut() else {
        return record;
    };
    for relation in relations {
        let Some(id) = object
            .get(&relation.field)
            .and_then(|v| RecordId::from_value(v).ok())
        else {
            continue;
        };
        if let Some(related) = lookup(state.model(&relation.target), &id) {
            object.insert(relation.field.clone(), related.clone());
        }
    }
    record
}

fn lookup<'a>(model: Option<&'a ModelState>, id: &RecordId) -> Option<&'a Value> {
    model?.by_id.get(id)?.record.as_ref()
}
