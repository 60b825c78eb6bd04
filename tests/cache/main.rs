//! Integration tests for the cache: transitions, selectors and request status.

mod fixtures;
mod nesting;
mod selectors;

use crud_cache::{CacheStore, CollectionRead, CrudEvent, CrudState, FetchTime, Params, RecordId};
use fixtures::{at, page, MINUTE};
use serde_json::json;

#[test]
fn collection_in_flight_never_asks_for_fetch() {
    let params = Params::new().with("page", 1);
    let state = CrudState::new().apply(&CrudEvent::collection_started("users", params.clone()));

    for now in [0, 1, 11 * MINUTE, 1_000 * MINUTE] {
        assert_eq!(
            fixtures::select(&state, now).collection("users", &params),
            CollectionRead::Loading { needs_fetch: false }
        );
    }
}

#[test]
fn collection_round_trip_within_window() {
    let params = Params::new().with("page", 1);
    let state = CrudState::new()
        .apply(&CrudEvent::collection_started("users", params.clone()))
        .apply(&CrudEvent::collection_loaded(
            "users",
            params.clone(),
            page(vec![json!({"id": 1, "name": "a"}), json!({"id": 2, "name": "b"})]),
            at(0),
        ));

    let read = fixtures::select(&state, 5 * MINUTE).collection("users", &params);
    assert!(!read.is_loading());
    assert_eq!(
        read.data(),
        &[json!({"id": 1, "name": "a"}), json!({"id": 2, "name": "b"})]
    );
}

#[test]
fn collection_goes_stale_after_ten_minutes() {
    let params = Params::new().with("page", 1);
    let state = CrudState::new().apply(&CrudEvent::collection_loaded(
        "users",
        params.clone(),
        page(vec![json!({"id": 1, "name": "a"})]),
        at(0),
    ));

    let select = fixtures::select(&state, 10 * MINUTE + 1);
    assert_eq!(
        select.collection("users", &params),
        CollectionRead::Loading { needs_fetch: true }
    );
    assert!(select.record("users", 1u64).needs_fetch());
}

#[test]
fn repeated_success_is_idempotent() {
    let params = Params::new().with("page", 1);
    let success = CrudEvent::collection_loaded(
        "users",
        params,
        page(vec![json!({"id": 1, "name": "a"}), json!({"id": 2, "name": "b"})]),
        at(3),
    );

    let once = CrudState::new().apply(&success);
    let twice = once.apply(&success);
    assert_eq!(once, twice);
}

#[test]
fn params_match_by_value() {
    let first = Params::try_from(json!({"page": 1})).unwrap();
    let same = Params::try_from(json!({"page": 1})).unwrap();
    let other = Params::try_from(json!({"page": 2})).unwrap();

    let state = CrudState::new()
        .apply(&CrudEvent::collection_loaded("users", first, page(vec![json!({"id": 1})]), at(0)))
        .apply(&CrudEvent::collection_started("users", same.clone()));

    let users = state.model("users").unwrap();
    assert_eq!(users.collections.len(), 1);
    assert_eq!(users.collections.find(&same).unwrap().fetch_time, FetchTime::InFlight);
    assert!(users.collections.find(&other).is_none());
}

#[test]
fn create_success_invalidates_every_collection() {
    let active = Params::new().with("active", true);
    let page_two = Params::new().with("page", 2);
    let state = CrudState::new()
        .apply(&CrudEvent::collection_loaded("users", active.clone(), page(vec![json!({"id": 1})]), at(0)))
        .apply(&CrudEvent::collection_loaded("users", page_two.clone(), page(vec![json!({"id": 2})]), at(0)))
        .apply(&CrudEvent::create_succeeded(
            "users",
            "r1",
            fixtures::record(json!({"id": 3, "active": false})),
            at(1),
        ));

    let users = state.model("users").unwrap();
    for params in [&active, &page_two] {
        let collection = users.collections.find(params).unwrap();
        assert_eq!(collection.fetch_time, FetchTime::Never);
        assert_eq!(&collection.params, params);
    }
    assert!(users.by_id.get(&3u64.into()).unwrap().record.is_some());
}

#[test]
fn delete_leaves_ids_in_existing_collections() {
    let params = Params::new();
    let state = CrudState::new()
        .apply(&CrudEvent::collection_loaded(
            "users",
            params.clone(),
            page(vec![json!({"id": 4}), json!({"id": 5})]),
            at(0),
        ))
        .apply(&CrudEvent::delete_succeeded("users", "r1", 5u64, at(1)));

    let users = state.model("users").unwrap();
    assert!(!users.by_id.contains(&5u64.into()));
    let collection = users.collections.find(&params).unwrap();
    assert_eq!(collection.ids, vec![RecordId::from(4u64), RecordId::from(5u64)]);
    assert_eq!(
        fixtures::select(&state, 2).collection("users", &params),
        CollectionRead::Loading { needs_fetch: true }
    );
}

#[test]
fn collection_error_keeps_previous_fetch_time() {
    let params = Params::new();
    let state = CrudState::new()
        .apply(&CrudEvent::collection_loaded("users", params.clone(), page(vec![json!({"id": 1})]), at(0)))
        .apply(&CrudEvent::collection_failed("users", params.clone(), json!({"message": "boom"}), at(60_000)));

    let collection = state.model("users").unwrap().collections.find(&params).unwrap();
    assert_eq!(collection.fetch_time, FetchTime::At(at(0)));
    assert_eq!(collection.error, Some(json!({"message": "boom"})));
    assert!(!fixtures::select(&state, MINUTE).collection("users", &params).is_loading());
}

#[test]
fn store_readers_keep_their_snapshot() {
    let store = CacheStore::new();
    store
        .dispatch(CrudEvent::record_loaded("users", 1u64, json!({"id": 1, "name": "a"}), at(0)))
        .unwrap();
    let held = store.snapshot().unwrap();

    store
        .dispatch(CrudEvent::delete_succeeded("users", "r1", 1u64, at(1)))
        .unwrap();

    assert!(fixtures::select(&held, 2).record_or_empty("users", 1u64).is_some());
    let latest = store.snapshot().unwrap();
    assert!(fixtures::select(&latest, 2).record_or_empty("users", 1u64).is_none());
}
