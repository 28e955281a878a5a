//! Lifecycle observers and the location writer collaborator.

use std::sync::{Arc, Mutex, PoisonError};

use futures_util::future::{self, BoxFuture, FutureExt};
use serde::Serialize;
use serde_json::Value;

use crate::routing::Route;
use crate::transition::error::TransitionError;
use crate::transition::state::RouteState;

/// Observers of a transition. Each method runs exactly once per transition.
pub trait LifecycleHooks: Send + Sync {
    /// Called before anything is exited. A returned future is awaited.
    fn on_start(&self, _route: &Route) -> Option<BoxFuture<'static, ()>> {
        None
    }

    /// Called after commit.
    fn on_success(&self, _state: &RouteState) {}

    /// Called when the transition fails for any reason.
    fn on_error(&self, _error: &TransitionError) {}
}

/// Hooks that do nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl LifecycleHooks for NoopHooks {}

/// What the engine asks the platform to record after a commit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    /// The committed state, serialized.
    pub state: Value,
    pub title: String,
    pub url: String,
}

impl HistoryEntry {
    pub fn from_state(state: &RouteState) -> Self {
        Self {
            state: serde_json::to_value(state).unwrap_or(Value::Null),
            title: state.title().to_string(),
            url: state.url().to_string(),
        }
    }
}

/// Platform url/title mutation.
pub trait LocationWriter: Send + Sync {
    /// Record a committed location.
    fn write(&self, entry: HistoryEntry) -> BoxFuture<'_, ()>;

    /// Reload the whole page at `url`. No transition runs.
    fn hard_reload(&self, _url: &str) {}
}

/// In-process history, used by the CLI and tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryHistory {
    entries: Arc<Mutex<Vec<HistoryEntry>>>,
    reloads: Arc<Mutex<Vec<String>>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last(&self) -> Option<HistoryEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    pub fn reloads(&self) -> Vec<String> {
        self.reloads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl LocationWriter for MemoryHistory {
    fn write(&self, entry: HistoryEntry) -> BoxFuture<'_, ()> {
        tracing::debug!(url = %entry.url, title = %entry.title, "Location written");
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
        future::ready(()).boxed()
    }

    fn hard_reload(&self, url: &str) {
        self.reloads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_string());
    }
}
