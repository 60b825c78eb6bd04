use std::time::Duration;

use crud_cache::{
    CacheConfig, CollectionRead, CrudEvent, CrudState, MutationFailure, Params, RecordError,
    RecordRead, Selectors,
};
use serde_json::json;

use crate::fixtures::{at, page, select, MINUTE};

#[test]
fn unknown_model_and_query_need_fetch() {
    let state = CrudState::new();
    let select = select(&state, 0);
    assert!(select.collection("users", &Params::new()).needs_fetch());
    assert!(select.record("users", 1u64).needs_fetch());
    assert_eq!(select.record_or_empty("users", 1u64), None);
}

#[test]
fn record_follows_its_fetch_lifecycle() {
    let started = CrudState::new().apply(&CrudEvent::record_started("users", 1u64));
    assert_eq!(
        select(&started, 0).record("users", 1u64),
        RecordRead::Loading { needs_fetch: false }
    );

    let loaded = started.apply(&CrudEvent::record_loaded("users", 1u64, json!({"id": 1, "name": "a"}), at(0)));
    assert_eq!(
        select(&loaded, MINUTE).record("users", 1u64),
        RecordRead::Ready(&json!({"id": 1, "name": "a"}))
    );
    assert!(select(&loaded, 10 * MINUTE).record("users", 1u64).needs_fetch());

    let failed = started.apply(&CrudEvent::record_failed("users", 1u64, json!({"status": 404}), at(0)));
    assert_eq!(
        select(&failed, MINUTE).record("users", 1u64),
        RecordRead::Failed(&RecordError::Fetch(json!({"status": 404})))
    );
}

#[test]
fn record_in_update_reads_as_loading() {
    let state = CrudState::new()
        .apply(&CrudEvent::record_loaded("users", 1u64, json!({"id": 1, "name": "a"}), at(0)))
        .apply(&CrudEvent::update_started("users", "r1", 1u64));

    assert_eq!(
        select(&state, 1).record("users", 1u64),
        RecordRead::Loading { needs_fetch: false }
    );
    let entry = state.model("users").unwrap().by_id.get(&1u64.into()).unwrap();
    assert_eq!(entry.record, Some(json!({"id": 1, "name": "a"})));
}

#[test]
fn rejected_update_surfaces_error_and_keeps_record() {
    let failure = MutationFailure::new("invalid").with_field_error("name", "too short");
    let state = CrudState::new()
        .apply(&CrudEvent::record_loaded("users", 1u64, json!({"id": 1, "name": "a"}), at(0)))
        .apply(&CrudEvent::update_failed("users", "r1", 1u64, failure.clone(), at(1)));

    assert_eq!(
        select(&state, 2).record("users", 1u64),
        RecordRead::Failed(&RecordError::Update(failure))
    );
    let entry = state.model("users").unwrap().by_id.get(&1u64.into()).unwrap();
    assert_eq!(entry.record, Some(json!({"id": 1, "name": "a"})));
}

#[test]
fn collection_waits_on_its_rows() {
    let params = Params::new();
    let state = CrudState::new()
        .apply(&CrudEvent::collection_loaded(
            "users",
            params.clone(),
            page(vec![json!({"id": 1}), json!({"id": 2})]),
            at(0),
        ))
        .apply(&CrudEvent::record_started("users", 2u64));

    assert_eq!(
        select(&state, 1).collection("users", &params),
        CollectionRead::Loading { needs_fetch: false }
    );

    let loaded = state.apply(&CrudEvent::record_loaded("users", 2u64, json!({"id": 2}), at(1)));
    assert!(!select(&loaded, 2).collection("users", &params).is_loading());
}

#[test]
fn other_info_is_returned_with_data() {
    let params = Params::new().with("page", 1);
    let state = CrudState::new().apply(&CrudEvent::collection_loaded(
        "users",
        params.clone(),
        page(vec![json!({"id": 1})]).with_info("total", 40),
        at(0),
    ));

    let read = select(&state, 1).collection("users", &params);
    assert_eq!(read.other_info().and_then(|info| info.get("total")), Some(&json!(40)));
}

#[test]
fn freshness_window_is_configurable() {
    let params = Params::new();
    let config = CacheConfig::new().with_freshness_window(Duration::from_secs(30));
    let state = CrudState::new().apply(&CrudEvent::collection_loaded(
        "users",
        params.clone(),
        page(vec![json!({"id": 1})]),
        at(0),
    ));

    let select = Selectors::new(&state, &config);
    assert!(!select.at(at(29_999)).collection("users", &params).is_loading());
    assert!(select.at(at(30_000)).collection("users", &params).needs_fetch());
}
