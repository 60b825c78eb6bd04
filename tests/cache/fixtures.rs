//! Shared builders for cache tests.

#![allow(dead_code)]

use std::sync::OnceLock;

use crud_cache::{CacheConfig, CollectionPage, CrudState, Record, Selectors, Timestamp};
use serde_json::Value;

pub const MINUTE: u64 = 60_000;

pub fn at(millis: u64) -> Timestamp {
    Timestamp::from_millis(millis)
}

pub fn record(value: Value) -> Record {
    Record::from_value(value).unwrap()
}

pub fn page(values: Vec<Value>) -> CollectionPage {
    CollectionPage::new(values.into_iter().map(record).collect())
}

pub fn default_config() -> &'static CacheConfig {
    static CONFIG: OnceLock<CacheConfig> = OnceLock::new();
    CONFIG.get_or_init(CacheConfig::default)
}

/// Selectors over `state` with the default config, pinned to `now` millis.
pub fn select(state: &CrudState, now: u64) -> Selectors<'_> {
    Selectors::new(state, default_config()).at(at(now))
}
