use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Milliseconds since the Unix epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn from_millis(millis: u64) -> Self {
        Timestamp(millis)
    }

    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Timestamp(millis)
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// Time elapsed from `earlier` to `self`, zero if `earlier` is later.
    pub fn since(&self, earlier: Timestamp) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }
}

/// Fetch lifecycle of a record or collection.
///
/// `Never` means nothing was ever fetched (or the entry was invalidated),
/// `InFlight` means a request is outstanding, `At` holds the completion time
/// of the last fetch, successful or not.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "at")]
pub enum FetchTime {
    #[default]
    Never,
    InFlight,
    At(Timestamp),
}

impl FetchTime {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, FetchTime::InFlight)
    }

    pub fn completed_at(&self) -> Option<Timestamp> {
        match self {
            FetchTime::At(ts) => Some(*ts),
            _ => None,
        }
    }
}
