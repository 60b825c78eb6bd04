//! CacheStore - the shared holder of the latest snapshot.
//!
//! Writers fold events through [`CrudState::apply`] and swap in the result;
//! readers clone the current `Arc<CrudState>` and never observe a partially
//! applied event. Subscribers get a [`StoreNotice`] after every dispatch.

use std::sync::{Arc, RwLock};

use tokio::sync::broadcast;

use crate::config::CacheConfig;
use crate::error::CacheError;
use crate::event::{CrudEvent, EventType};
use crate::select::Selectors;
use crate::state::CrudState;

const NOTICE_CAPACITY: usize = 256;

/// Sent to subscribers once an event has been applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreNotice {
    pub event_type: EventType,
    /// Target model; `None` for passthrough calls.
    pub model: Option<String>,
}

/// Shared cache store. Clone-friendly via Arc; clones see the same state.
#[derive(Clone)]
pub struct CacheStore {
    state: Arc<RwLock<Arc<CrudState>>>,
    config: Arc<CacheConfig>,
    notices: broadcast::Sender<StoreNotice>,
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore {
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    pub fn with_config(config: CacheConfig) -> Self {
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);
        Self {
            state: Arc::new(RwLock::new(Arc::new(CrudState::new()))),
            config: Arc::new(config),
            notices,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// The current snapshot. It stays valid however many events follow.
    pub fn snapshot(&self) -> Result<Arc<CrudState>, CacheError> {
        let state = self
            .state
            .read()
            .map_err(|_| CacheError::LockPoisoned("snapshot"))?;
        Ok(Arc::clone(&state))
    }

    /// Apply one event and publish the resulting snapshot.
    pub fn dispatch(&self, event: CrudEvent) -> Result<Arc<CrudState>, CacheError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| CacheError::LockPoisoned("dispatch"))?;
        let next = Arc::new(state.apply(&event));
        *state = Arc::clone(&next);

        tracing::debug!(
            event = event.event_type().as_str(),
            model = event.model().unwrap_or_default(),
            "dispatched cache event"
        );

        // Sent under the write lock so notices arrive in apply order.
        // No subscribers is not an error.
        let _ = self.notices.send(StoreNotice {
            event_type: event.event_type(),
            model: event.model().map(str::to_string),
        });
        drop(state);

        Ok(next)
    }

    /// Apply events in order, returning the final snapshot.
    pub fn dispatch_all(
        &self,
        events: impl IntoIterator<Item = CrudEvent>,
    ) -> Result<Arc<CrudState>, CacheError> {
        let mut last = None;
        for event in events {
            last = Some(self.dispatch(event)?);
        }
        match last {
            Some(state) => Ok(state),
            None => self.snapshot(),
        }
    }

    /// Run selectors against the current snapshot.
    pub fn read<R>(&self, f: impl FnOnce(Selectors<'_>) -> R) -> Result<R, CacheError> {
        let snapshot = self.snapshot()?;
        Ok(f(Selectors::new(&snapshot, &self.config)))
    }

    /// Receive a notice for every event dispatched from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreNotice> {
        self.notices.subscribe()
    }
}
