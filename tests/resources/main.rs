//! Integration tests for typed resources (derive(Resource) + typed selectors).

mod views;

use crud_cache::{
    CacheConfig, CacheError, CollectionPage, CollectionRead, CrudEvent, CrudState, Params, Record,
    RecordId, RecordRead, Resource, Selectors, Timestamp,
};
use serde_json::json;
use views::{BlogPost, Profile, User};

fn at(millis: u64) -> Timestamp {
    Timestamp::from_millis(millis)
}

#[test]
fn derive_names_models() {
    assert_eq!(User::MODEL, "users");
    assert_eq!(BlogPost::MODEL, "blog_posts");
    assert_eq!(Profile::MODEL, "people");
}

#[test]
fn derive_reads_id_field() {
    let user = User { id: 7, name: "ann".into() };
    assert_eq!(user.record_id(), RecordId::from(7u64));

    let profile = Profile { handle: "ann".into(), bio: None };
    assert_eq!(profile.record_id(), RecordId::from("ann"));
}

#[test]
fn typed_record_read() {
    let config = CacheConfig::default();
    let state = CrudState::new()
        .apply(&CrudEvent::record_loaded(User::MODEL, 7u64, json!({"id": 7, "name": "ann"}), at(0)));

    let read = Selectors::new(&state, &config).at(at(1)).record_as::<User>(7u64).unwrap();
    assert_eq!(read, RecordRead::Ready(User { id: 7, name: "ann".into() }));

    let missing = Selectors::new(&state, &config).at(at(1)).record_as::<User>(8u64).unwrap();
    assert!(missing.needs_fetch());
}

#[test]
fn typed_collection_read() {
    let config = CacheConfig::default();
    let params = Params::new().with("tag", "rust");
    let page = CollectionPage::new(vec![
        Record::from_value(json!({"id": 1, "title": "a", "tags": ["rust"]})).unwrap(),
        Record::from_value(json!({"id": 2, "title": "b", "tags": []})).unwrap(),
    ]);
    let state = CrudState::new().apply(&CrudEvent::collection_loaded(BlogPost::MODEL, params.clone(), page, at(0)));

    let read = Selectors::new(&state, &config)
        .at(at(1))
        .collection_as::<BlogPost>(&params)
        .unwrap();
    let CollectionRead::Ready { data, .. } = read else {
        panic!("expected typed collection");
    };
    assert_eq!(data.iter().map(|p| p.record_id()).collect::<Vec<_>>(), vec![RecordId::from(1u64), RecordId::from(2u64)]);
    assert_eq!(data[0].tags, vec!["rust".to_string()]);
}

#[test]
fn decode_failure_names_the_model() {
    let config = CacheConfig::default();
    let state = CrudState::new()
        .apply(&CrudEvent::record_loaded(User::MODEL, 7u64, json!({"id": "seven"}), at(0)));

    let err = Selectors::new(&state, &config)
        .at(at(1))
        .record_as::<User>(7u64)
        .unwrap_err();
    assert!(matches!(err, CacheError::Decode { ref model, .. } if model == "users"));
}
