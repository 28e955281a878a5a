//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::future::{self, BoxFuture, FutureExt};
use serde_json::{json, Value};

use nav_router::config::RouterConfig;
use nav_router::resolve::{Rejection, ResolveSpec, Resolved};
use nav_router::routing::{Activation, Controller, Params, Route, RouteDefinition};
use nav_router::transition::{LifecycleHooks, MemoryHistory, RouteState, RouterBuilder, TransitionError};
use nav_router::Router;

/// Ordered log of everything the engine did, shared by controllers and hooks.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    /// Drain the log.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }

    pub fn count(&self, event: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|e| *e == event).count()
    }
}

/// A controller that logs `enter:<name>` and hands out a [`Tracked`] instance.
pub struct Recording {
    name: String,
    journal: Journal,
    veto: Arc<AtomicBool>,
    seen: Arc<Mutex<Vec<(Params, Value)>>>,
}

impl Recording {
    pub fn new(name: &str, journal: &Journal) -> Self {
        Self {
            name: name.to_string(),
            journal: journal.clone(),
            veto: Arc::new(AtomicBool::new(false)),
            seen: Arc::default(),
        }
    }

    /// Switch that makes every live instance reject its exit.
    pub fn veto_switch(&self) -> Arc<AtomicBool> {
        self.veto.clone()
    }

    /// Params and resolved data of every activation.
    pub fn seen(&self) -> Arc<Mutex<Vec<(Params, Value)>>> {
        self.seen.clone()
    }
}

impl Controller for Recording {
    fn activate(&self, params: &Params, resolved: &Resolved) -> Option<Arc<dyn Activation>> {
        self.journal.push(format!("enter:{}", self.name));
        let resolved = serde_json::to_value(resolved).unwrap_or(Value::Null);
        self.seen.lock().unwrap().push((params.clone(), resolved));
        Some(Arc::new(Tracked {
            name: self.name.clone(),
            journal: self.journal.clone(),
            veto: self.veto.clone(),
        }))
    }
}

/// Live controller instance with an exit hook.
pub struct Tracked {
    name: String,
    journal: Journal,
    veto: Arc<AtomicBool>,
}

impl Activation for Tracked {
    fn exit(&self) -> Option<BoxFuture<'_, Result<(), Rejection>>> {
        self.journal.push(format!("exit:{}", self.name));
        let outcome = if self.veto.load(Ordering::SeqCst) {
            Err(Rejection::new(format!("{} has unsaved changes", self.name)))
        } else {
            Ok(())
        };
        Some(future::ready(outcome).boxed())
    }
}

/// A resolver that logs `resolve:<name>` and yields `{"route": name, "params": ...}`.
pub fn logged_resolve(name: &str, journal: &Journal) -> ResolveSpec {
    let name = name.to_string();
    let journal = journal.clone();
    ResolveSpec::single(move |params: Params| {
        journal.push(format!("resolve:{name}"));
        let value = json!({ "route": name.clone(), "params": params });
        async move { Ok(value) }
    })
}

/// A resolver that always fails.
pub fn failing_resolve(reason: &'static str) -> ResolveSpec {
    ResolveSpec::single(move |_params: Params| async move { Err(Rejection::new(reason)) })
}

/// Lifecycle hooks that log `start:<route>`, `success:<route>` and `error:<kind>`.
pub struct RecordingHooks {
    journal: Journal,
}

impl RecordingHooks {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
        }
    }
}

impl LifecycleHooks for RecordingHooks {
    fn on_start(&self, route: &Route) -> Option<BoxFuture<'static, ()>> {
        self.journal.push(format!("start:{}", route.name()));
        None
    }

    fn on_success(&self, state: &RouteState) {
        self.journal.push(format!("success:{}", state.name()));
    }

    fn on_error(&self, error: &TransitionError) {
        self.journal.push(format!("error:{}", error.kind()));
    }
}

/// A definition whose controller and resolver both log to `journal`.
pub fn tracked(name: &str, url: &str, journal: &Journal) -> RouteDefinition {
    RouteDefinition::new()
        .url(url)
        .controller(Recording::new(name, journal))
        .resolve(logged_resolve(name, journal))
}

/// Builder with recording hooks and an in-memory history.
pub fn builder(journal: &Journal, history: &MemoryHistory) -> RouterBuilder {
    Router::builder(RouterConfig::default())
        .hooks(RecordingHooks::new(journal))
        .location_writer(history.clone())
}

/// The `foo` / `foo.bar` / `foo.baz` / `biz` tree used across tests.
pub fn foo_tree(journal: &Journal, history: &MemoryHistory) -> Router {
    builder(journal, history)
        .register("foo", tracked("foo", "/foo/:fooId", journal))
        .and_then(|b| b.register("foo.bar", tracked("foo.bar", "/bar/:barId?tab", journal)))
        .and_then(|b| b.register("foo.baz", tracked("foo.baz", "/baz", journal)))
        .and_then(|b| b.register("biz", RouteDefinition::new().parent("foo")))
        .unwrap()
        .build()
}

/// Events of a journal that are not lifecycle hook calls.
pub fn steps(journal: &Journal) -> Vec<String> {
    journal
        .take()
        .into_iter()
        .filter(|e| !e.starts_with("start:") && !e.starts_with("success:") && !e.starts_with("error:"))
        .collect()
}
