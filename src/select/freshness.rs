use std::time::Duration;

use crate::core::{FetchTime, Timestamp};

/// Where a fetch time sits relative to the freshness window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Staleness {
    Fresh,
    /// A request is outstanding; do not start another one.
    InFlight,
    /// Never fetched, invalidated, or older than the window.
    Stale,
}

/// Freshness oracle pinned to one instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Freshness {
    window: Duration,
    now: Timestamp,
}

impl Freshness {
    pub fn new(window: Duration, now: Timestamp) -> Self {
        Freshness { window, now }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn now(&self) -> Timestamp {
        self.now
    }

    /// True only for completed fetches younger than the window. An
    /// in-flight fetch is not recent, but see [`Freshness::staleness`].
    pub fn is_recent(&self, fetch_time: FetchTime) -> bool {
        match fetch_time {
            FetchTime::At(at) => self.now.since(at) < self.window,
            FetchTime::Never | FetchTime::InFlight => false,
        }
    }

    pub fn staleness(&self, fetch_time: FetchTime) -> Staleness {
        match fetch_time {
            FetchTime::InFlight => Staleness::InFlight,
            other if self.is_recent(other) => Staleness::Fresh,
            _ => Staleness::Stale,
        }
    }
}
