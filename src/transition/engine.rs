//! The router: navigation surface and the transition pipeline.
//!
//! # States
//! ```text
//! Idle → Diffing → Exiting → Resolving ⇄ Entering → Committed
//!                     │          │
//!                     └──────────┴──→ Failed → Idle (nothing written)
//! ```
//!
//! # Design Decisions
//! - `current`, `previous` and the live controller instances form one
//!   snapshot, swapped atomically on commit and never edited in place
//! - Exit hooks run one at a time, deepest route first
//! - Route N is resolved and activated before route N+1 starts resolving
//! - Latest request wins: each transition holds a generation ticket and
//!   stops at the next phase boundary once a newer one exists
//! - Issuing a ticket and committing take the same lock, so a stale
//!   transition can never commit under a newer one
//! - Every transition runs on its own task from the moment it is requested;
//!   a handle only observes the outcome

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use arc_swap::ArcSwap;
use futures_util::future::{self, BoxFuture, FutureExt};
use tracing::Instrument;
use uuid::Uuid;

use crate::config::{AppConfig, RouterConfig, UrlMode};
use crate::observability::metrics;
use crate::resolve::Resolved;
use crate::routing::{Params, Registry, Route, RouteDefinition, RouteMatch, RouterError};
use crate::transition::diff::{self, TransitionPlan};
use crate::transition::error::TransitionError;
use crate::transition::hooks::{HistoryEntry, LifecycleHooks, LocationWriter, NoopHooks};
use crate::transition::state::{ActiveRoute, RouteState, Snapshot};

/// Settles with the committed state, or with why the transition stopped.
///
/// Dropping a handle does not cancel the transition.
pub type TransitionHandle = BoxFuture<'static, Result<RouteState, TransitionError>>;

/// Where a transition is in its pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Diffing,
    Exiting,
    Resolving,
    Entering,
    Committed,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Diffing => "diffing",
            Phase::Exiting => "exiting",
            Phase::Resolving => "resolving",
            Phase::Entering => "entering",
            Phase::Committed => "committed",
            Phase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Per-navigation options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionOptions {
    /// Ask the location writer to record the new url after commit.
    pub location: bool,
}

impl Default for TransitionOptions {
    fn default() -> Self {
        Self { location: true }
    }
}

/// One navigation attempt.
struct Transition {
    id: Uuid,
    ticket: u64,
    to: RouteState,
    location: bool,
}

/// Collects routes and collaborators before the router is shared.
pub struct RouterBuilder {
    registry: Registry,
    config: RouterConfig,
    hooks: Arc<dyn LifecycleHooks>,
    writer: Option<Arc<dyn LocationWriter>>,
}

impl RouterBuilder {
    /// Start from a route table, registered in declaration order.
    pub fn from_config(config: &AppConfig) -> Result<Self, RouterError> {
        let mut builder = Router::builder(config.router.clone());
        for route in &config.routes {
            let mut definition = RouteDefinition::new()
                .url(&route.url)
                .is_abstract(route.is_abstract);
            if let Some(parent) = &route.parent {
                definition = definition.parent(parent);
            }
            if let Some(title) = &route.title {
                definition = definition.title(title);
            }
            builder = builder.register(&route.name, definition)?;
        }
        Ok(builder)
    }

    /// Register a route. Chainable with `?`.
    pub fn register(
        mut self,
        name: impl Into<String>,
        definition: RouteDefinition,
    ) -> Result<Self, RouterError> {
        self.registry.register(name, definition)?;
        Ok(self)
    }

    /// Direct access, e.g. to reuse a registered route as an explicit parent.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn hooks(mut self, hooks: impl LifecycleHooks + 'static) -> Self {
        self.hooks = Arc::new(hooks);
        self
    }

    pub fn location_writer(mut self, writer: impl LocationWriter + 'static) -> Self {
        self.writer = Some(Arc::new(writer));
        self
    }

    pub fn build(self) -> Router {
        metrics::record_registered_routes(self.registry.len());
        tracing::info!(
            routes = self.registry.len(),
            prefix = %self.config.prefix,
            mode = ?self.config.mode(),
            "Router built"
        );

        Router {
            inner: Arc::new(Inner {
                registry: self.registry,
                config: self.config,
                snapshot: ArcSwap::from_pointee(Snapshot::default()),
                generation: AtomicU64::new(0),
                settled: AtomicU64::new(0),
                commit_lock: Mutex::new(()),
                hooks: self.hooks,
                writer: self.writer,
            }),
        }
    }
}

struct Inner {
    registry: Registry,
    config: RouterConfig,
    snapshot: ArcSwap<Snapshot>,
    /// Last ticket issued.
    generation: AtomicU64,
    /// Highest ticket whose transition has settled.
    settled: AtomicU64,
    commit_lock: Mutex<()>,
    hooks: Arc<dyn LifecycleHooks>,
    writer: Option<Arc<dyn LocationWriter>>,
}

/// A navigation engine over an immutable route table.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Router {
    inner: Arc<Inner>,
}

impl Router {
    pub fn builder(config: RouterConfig) -> RouterBuilder {
        RouterBuilder {
            registry: Registry::new(),
            config,
            hooks: Arc::new(NoopHooks),
            writer: None,
        }
    }

    /// Build a router from a route table. Routes carry no controllers.
    pub fn from_config(config: &AppConfig) -> Result<Self, RouterError> {
        Ok(RouterBuilder::from_config(config)?.build())
    }

    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    pub fn config(&self) -> &RouterConfig {
        &self.inner.config
    }

    pub fn mode(&self) -> UrlMode {
        self.inner.config.mode()
    }

    pub fn lookup(&self, name: &str) -> Result<&Arc<Route>, RouterError> {
        self.inner.registry.lookup(name)
    }

    /// The last committed state.
    pub fn current(&self) -> Option<RouteState> {
        self.inner.snapshot.load().current.clone()
    }

    /// The state `current` replaced.
    pub fn previous(&self) -> Option<RouteState> {
        self.inner.snapshot.load().previous.clone()
    }

    /// Whether every requested transition has settled.
    pub fn is_idle(&self) -> bool {
        self.inner.settled.load(Ordering::SeqCst) >= self.inner.generation.load(Ordering::SeqCst)
    }

    /// Match a raw url, with or without the configured prefix.
    pub fn match_url(&self, url: &str) -> Option<RouteMatch> {
        self.inner.registry.find(self.strip_prefix(url))
    }

    fn strip_prefix<'a>(&self, url: &'a str) -> &'a str {
        let prefix = self.inner.config.prefix.as_str();
        if prefix.is_empty() {
            return url;
        }
        url.strip_prefix(prefix).unwrap_or(url)
    }

    fn merged_with_current(&self, params: &Params) -> Params {
        match &self.inner.snapshot.load().current {
            Some(current) => current.params().merged(params),
            None => params.clone(),
        }
    }

    /// Url for a named route, inheriting params bound in the current state.
    pub fn href(&self, name: &str, params: &Params) -> Result<String, RouterError> {
        let route = self.lookup(name)?;
        let path = route.render(&self.merged_with_current(params))?;
        Ok(format!("{}{}", self.inner.config.prefix, path))
    }

    /// Navigate to a named route, inheriting params bound in the current state.
    ///
    /// Unknown names, abstract targets and missing path params fail here,
    /// before any asynchronous work.
    pub fn go(&self, name: &str, params: Params) -> Result<TransitionHandle, RouterError> {
        let route = self.lookup(name)?.clone();
        let params = self.merged_with_current(&params);
        self.transition_to(
            &route,
            params,
            TransitionOptions {
                location: self.inner.config.update_location,
            },
        )
    }

    /// Start a transition to `route` with exactly `params`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn transition_to(
        &self,
        route: &Arc<Route>,
        params: Params,
        options: TransitionOptions,
    ) -> Result<TransitionHandle, RouterError> {
        if route.is_abstract() {
            return Err(RouterError::AbstractTarget(route.name().to_string()));
        }

        let to = RouteState::new(route.clone(), params, &self.inner.config.prefix)?;
        let ticket = {
            let _issue = self.lock_commits();
            self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1
        };
        let transition = Transition {
            id: Uuid::new_v4(),
            ticket,
            to,
            location: options.location,
        };

        let name = transition.to.name().to_string();
        let task = tokio::spawn(self.clone().run(transition));
        Ok(async move {
            match task.await {
                Ok(outcome) => outcome,
                Err(error) if error.is_panic() => std::panic::resume_unwind(error.into_panic()),
                Err(_) => Err(TransitionError::Interrupted { route: name }),
            }
        }
        .boxed())
    }

    /// Start the transition for a url reported by the platform.
    ///
    /// The url is already in the location bar, so it is not written back.
    pub fn dispatch(&self, url: &str) -> Result<TransitionHandle, RouterError> {
        self.dispatch_with(url, TransitionOptions { location: false })
    }

    pub fn dispatch_with(
        &self,
        url: &str,
        options: TransitionOptions,
    ) -> Result<TransitionHandle, RouterError> {
        let matched = self
            .match_url(url)
            .ok_or_else(|| RouterError::NoMatch(url.to_string()))?;
        self.transition_to(&matched.route, matched.params, options)
    }

    /// Re-enter the current route with `params` merged over its own.
    ///
    /// With `hard_refresh` the location writer reloads the page instead and
    /// the handle settles with the unchanged current state.
    pub fn reload(&self, params: &Params, hard_refresh: bool) -> Result<TransitionHandle, RouterError> {
        let current = self.current().ok_or(RouterError::NothingToReload)?;

        if hard_refresh {
            tracing::info!(url = %current.url(), "Hard reload requested");
            if let Some(writer) = &self.inner.writer {
                writer.hard_reload(current.url());
            }
            return Ok(future::ready(Ok(current)).boxed());
        }

        let params = current.params().merged(params);
        self.transition_to(
            current.route(),
            params,
            TransitionOptions {
                location: self.inner.config.update_location,
            },
        )
    }

    async fn run(self, transition: Transition) -> Result<RouteState, TransitionError> {
        let span = tracing::info_span!(
            "transition",
            id = %transition.id,
            to = %transition.to.name(),
        );

        async move {
            let started = Instant::now();
            let outcome = self.execute(&transition).await;
            self.inner
                .settled
                .fetch_max(transition.ticket, Ordering::SeqCst);

            match &outcome {
                Ok(state) => {
                    tracing::info!(
                        url = %state.url(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Transition committed"
                    );
                    metrics::record_transition("committed", started.elapsed());
                    self.inner.hooks.on_success(state);
                }
                Err(error) => {
                    tracing::warn!(phase = %Phase::Failed, error = %error, "Transition failed");
                    metrics::record_transition(error.kind(), started.elapsed());
                    self.inner.hooks.on_error(error);
                }
            }
            outcome
        }
        .instrument(span)
        .await
    }

    async fn execute(&self, transition: &Transition) -> Result<RouteState, TransitionError> {
        let from = self.inner.snapshot.load_full();
        let to = &transition.to;

        tracing::debug!(
            phase = %Phase::Diffing,
            from = ?from.current.as_ref().map(RouteState::name),
            "Transition started"
        );
        if let Some(delay) = self.inner.hooks.on_start(to.route()) {
            delay.await;
        }

        let registry = &self.inner.registry;
        let to_chain = registry.ancestor_chain(to.route());
        let from_chain = from
            .current
            .as_ref()
            .map(|state| registry.ancestor_chain(state.route()));
        let plan: TransitionPlan = diff::plan(
            from.current
                .as_ref()
                .zip(from_chain.as_deref())
                .map(|(state, chain)| (chain, state.params())),
            &to_chain,
            to.params(),
        );

        tracing::debug!(
            phase = %Phase::Exiting,
            exit = ?plan.exit_names(),
            enter = ?plan.enter_names(),
            "Transition planned"
        );
        for route in &plan.exit {
            self.ensure_latest(transition)?;
            let Some(hook) = from.activation_of(route).and_then(|active| active.exit()) else {
                continue;
            };
            hook.await.map_err(|reason| TransitionError::ExitRejected {
                route: route.name().to_string(),
                reason,
            })?;
            tracing::debug!(route = %route.name(), "Exit hook passed");
        }

        let mut active: Vec<ActiveRoute> = from
            .active
            .iter()
            .take(plan.retained.len())
            .cloned()
            .collect();

        for route in &plan.enter {
            self.ensure_latest(transition)?;

            let resolved = match route.resolve_spec() {
                Some(spec) => {
                    tracing::debug!(phase = %Phase::Resolving, route = %route.name(), "Resolving");
                    spec.run(to.params())
                        .await
                        .map_err(|reason| TransitionError::ResolveRejected {
                            route: route.name().to_string(),
                            reason,
                        })?
                }
                None => Resolved::None,
            };

            tracing::debug!(phase = %Phase::Entering, route = %route.name(), "Entering");
            let activation = route
                .controller()
                .and_then(|controller| controller.activate(to.params(), &resolved));
            active.push(ActiveRoute {
                route: route.clone(),
                activation,
            });
        }

        let next = Snapshot {
            current: Some(to.clone()),
            previous: from.current.clone(),
            active,
        };
        let committed = {
            let _commit = self.lock_commits();
            self.ensure_latest(transition)?;
            let prior = self.inner.snapshot.compare_and_swap(&from, Arc::new(next));
            Arc::ptr_eq(&*prior, &from)
        };
        if !committed {
            return Err(self.superseded(transition));
        }
        tracing::debug!(phase = %Phase::Committed, "State committed");

        if transition.location {
            if let Some(writer) = &self.inner.writer {
                writer.write(HistoryEntry::from_state(to)).await;
            }
        }

        Ok(to.clone())
    }

    fn lock_commits(&self) -> std::sync::MutexGuard<'_, ()> {
        self.inner
            .commit_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_latest(&self, transition: &Transition) -> Result<(), TransitionError> {
        if self.inner.generation.load(Ordering::SeqCst) == transition.ticket {
            Ok(())
        } else {
            Err(self.superseded(transition))
        }
    }

    fn superseded(&self, transition: &Transition) -> TransitionError {
        TransitionError::Superseded {
            route: transition.to.name().to_string(),
        }
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.inner.registry)
            .field("prefix", &self.inner.config.prefix)
            .field("current", &self.current())
            .finish_non_exhaustive()
    }
}
