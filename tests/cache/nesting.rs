use crud_cache::{requests, CacheConfig, CacheStore, CollectionRead, EventType, Params, Timestamp};
use serde_json::json;

use crate::fixtures::MINUTE;

fn blog_config() -> CacheConfig {
    CacheConfig::new()
        .with_relation("posts", "author", "users")
        .with_relation("users", "team", "teams")
}

#[test]
fn embedded_records_are_normalized_and_joined_back() {
    let store = CacheStore::with_config(blog_config());
    let call = requests::fetch_collection("posts", "/posts", Params::new().with("page", 1));

    store.dispatch(call.start_event()).unwrap();
    let response = json!({
        "data": [
            {"id": 1, "title": "first", "author": {"id": 7, "name": "ann", "team": {"id": "t1", "name": "core"}}},
            {"id": 2, "title": "second", "author": 8},
        ],
        "page": 1,
    });
    let now = Timestamp::from_millis(MINUTE);
    let events = call.succeed(response, now, store.config()).unwrap();
    store.dispatch_all(events).unwrap();

    let state = store.snapshot().unwrap();
    let users = state.model("users").unwrap();
    assert_eq!(
        users.by_id.get(&7u64.into()).unwrap().record,
        Some(json!({"id": 7, "name": "ann", "team": "t1"}))
    );
    assert!(state.model("teams").unwrap().by_id.contains(&"t1".into()));

    let read = store
        .read(|select| select.at(now).collection("posts", &Params::new().with("page", 1)))
        .unwrap();
    let CollectionRead::Ready { data, other_info } = &read else {
        panic!("expected ready collection, got {:?}", read);
    };
    assert_eq!(other_info.get("page"), Some(&json!(1)));
    // Joins go one level deep; the author's team stays an id.
    assert_eq!(
        data[0],
        json!({"id": 1, "title": "first", "author": {"id": 7, "name": "ann", "team": "t1"}})
    );
    // Author 8 was never cached, so the id is left in place.
    assert_eq!(data[1], json!({"id": 2, "title": "second", "author": 8}));
}

#[test]
fn nested_records_dispatch_before_their_parent() {
    let store = CacheStore::with_config(blog_config());
    let mut notices = store.subscribe();
    let call = requests::fetch_record("posts", 1u64, "/posts/1");

    let events = call
        .succeed(
            json!({"id": 1, "author": {"id": 7, "name": "ann"}}),
            Timestamp::from_millis(0),
            store.config(),
        )
        .unwrap();
    store.dispatch_all(events).unwrap();

    let first = notices.try_recv().unwrap();
    assert_eq!(first.event_type, EventType::FetchOneSuccess);
    assert_eq!(first.model.as_deref(), Some("users"));
    assert_eq!(notices.try_recv().unwrap().model.as_deref(), Some("posts"));
}

#[test]
fn mutation_round_trip_through_store() {
    let store = CacheStore::with_config(blog_config());
    let call = requests::create_record("posts", "/posts", json!({"title": "new"})).with_request_id("c1");

    store.dispatch(call.start_event()).unwrap();
    let pending = store
        .read(|select| select.action_status("posts", crud_cache::Operation::Create, &"c1".into()))
        .unwrap();
    assert!(pending.pending);

    let events = call
        .succeed(json!({"id": 10, "title": "new"}), Timestamp::from_millis(5), store.config())
        .unwrap();
    store.dispatch_all(events).unwrap();

    let done = store
        .read(|select| {
            select
                .at(Timestamp::from_millis(6))
                .record_or_empty("posts", 10u64)
                .cloned()
        })
        .unwrap();
    assert_eq!(done, Some(json!({"id": 10, "title": "new"})));
}

#[test]
fn failed_mutation_body_is_parsed_leniently() {
    let store = CacheStore::new();
    let call = requests::update_record("posts", 3u64, "/posts/3", json!({"title": ""})).with_request_id("u1");

    store.dispatch(call.start_event()).unwrap();
    store
        .dispatch(call.fail(
            json!({"message": "invalid", "errors": {"title": ["blank"]}}),
            Timestamp::from_millis(1),
        ))
        .unwrap();

    let status = store
        .read(|select| select.action_status("posts", crud_cache::Operation::Update, &"u1".into()))
        .unwrap();
    assert_eq!(status.is_success, Some(false));
    assert_eq!(status.message.as_deref(), Some("invalid"));
    assert_eq!(status.errors["title"], vec!["blank".to_string()]);
}
