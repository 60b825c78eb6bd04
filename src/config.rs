//! Cache configuration: the freshness window and declared relations.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Ten minutes.
pub const DEFAULT_FRESHNESS_WINDOW: Duration = Duration::from_secs(10 * 60);

/// A foreign-key field on one model that points at records of another.
///
/// Relations drive both directions of nesting: responses that embed the
/// related object are split apart before they reach the cache, and
/// collection reads put the related record back at read time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// Model whose records carry the field.
    pub model: String,
    /// Field holding the related record (embedded) or its id (normalized).
    pub field: String,
    /// Model the field points at.
    pub target: String,
}

impl Relation {
    pub fn new(
        model: impl Into<String>,
        field: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Relation {
            model: model.into(),
            field: field.into(),
            target: target.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// How long a completed fetch stays fresh, in milliseconds.
    pub freshness_window_ms: u64,
    pub relations: Vec<Relation>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            freshness_window_ms: DEFAULT_FRESHNESS_WINDOW.as_millis() as u64,
            relations: Vec::new(),
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_freshness_window(mut self, window: Duration) -> Self {
        self.freshness_window_ms = window.as_millis() as u64;
        self
    }

    /// Declare that `model.field` references records of `target`.
    pub fn with_relation(
        mut self,
        model: impl Into<String>,
        field: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        self.relations.push(Relation::new(model, field, target));
        self
    }

    pub fn freshness_window(&self) -> Duration {
        Duration::from_millis(self.freshness_window_ms)
    }

    /// Relations declared on `model`, in declaration order.
    pub fn relations_for<'a>(&'a self, model: &'a str) -> impl Iterator<Item = &'a Relation> + 'a {
        self.relations.iter().filter(move |r| r.model == model)
    }
}
