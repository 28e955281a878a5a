//! Dispatch of platform url changes.
//!
//! # Responsibilities
//! - Turn a raw url into a transition on the router
//! - Apply the `otherwise` path when nothing matches
//! - Run as a task fed by a channel until shutdown
//!
//! # Design Decisions
//! - A url that matches nothing is never an error for the platform; it is
//!   redirected or logged
//! - A url equal to the committed one is ignored (the engine wrote it),
//!   unless another transition is still pending
//! - Transitions are started in arrival order so the latest url wins

use futures_util::future::{BoxFuture, FutureExt};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinSet;

use crate::observability::metrics;
use crate::routing::RouterError;
use crate::transition::{Router, RouteState, TransitionError, TransitionHandle, TransitionOptions};

/// What became of one url.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatched {
    /// The url's route was entered.
    Committed(RouteState),
    /// Nothing matched; the `otherwise` path was entered instead.
    Redirected(RouteState),
    /// The url is already the committed location.
    Unchanged(RouteState),
    /// A transition started but did not commit.
    Failed(TransitionError),
    /// Nothing matched and there was no usable fallback.
    Unmatched,
}

/// Starts transitions for urls. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    router: Router,
    otherwise: Option<String>,
}

impl Dispatcher {
    pub fn new(router: Router) -> Self {
        let otherwise = router.config().otherwise.clone();
        Self { router, otherwise }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Start handling `url`.
    ///
    /// The transition is started before this returns; the future only waits
    /// for it to settle.
    pub fn dispatch(&self, url: &str) -> BoxFuture<'static, Dispatched> {
        if let Some(current) = self.router.current().filter(|_| self.router.is_idle()) {
            if current.url() == url || current.path() == url {
                tracing::debug!(url, "Url already committed");
                return futures_util::future::ready(Dispatched::Unchanged(current)).boxed();
            }
        }

        match self.router.dispatch(url) {
            Ok(handle) => settle(handle, Dispatched::Committed),
            Err(RouterError::NoMatch(_)) => {
                metrics::record_no_match();
                self.fallback(url)
            }
            Err(error) => {
                tracing::warn!(url, error = %error, "Url could not be dispatched");
                futures_util::future::ready(Dispatched::Unmatched).boxed()
            }
        }
    }

    fn fallback(&self, url: &str) -> BoxFuture<'static, Dispatched> {
        let Some(otherwise) = &self.otherwise else {
            tracing::warn!(url, "No route matches url");
            return futures_util::future::ready(Dispatched::Unmatched).boxed();
        };

        tracing::info!(url, otherwise = %otherwise, "No route matches url, redirecting");
        match self
            .router
            .dispatch_with(otherwise, TransitionOptions { location: true })
        {
            Ok(handle) => settle(handle, Dispatched::Redirected),
            Err(error) => {
                tracing::warn!(url, otherwise = %otherwise, error = %error, "Fallback path could not be dispatched");
                futures_util::future::ready(Dispatched::Unmatched).boxed()
            }
        }
    }
}

fn settle(
    handle: TransitionHandle,
    committed: fn(RouteState) -> Dispatched,
) -> BoxFuture<'static, Dispatched> {
    async move {
        match handle.await {
            Ok(state) => committed(state),
            Err(error) => Dispatched::Failed(error),
        }
    }
    .boxed()
}

/// Long-running task that dispatches every url sent to it.
pub struct UrlListener {
    dispatcher: Dispatcher,
    urls: mpsc::UnboundedReceiver<String>,
}

impl UrlListener {
    /// Create a listener and the sender the platform feeds urls into.
    pub fn new(router: Router) -> (Self, mpsc::UnboundedSender<String>) {
        let (tx, urls) = mpsc::unbounded_channel();
        (
            Self {
                dispatcher: Dispatcher::new(router),
                urls,
            },
            tx,
        )
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Dispatch a single url and wait for it to settle.
    pub async fn handle(&self, url: &str) -> Dispatched {
        self.dispatcher.dispatch(url).await
    }

    /// Dispatch urls until shutdown or until every sender is dropped.
    ///
    /// In-flight transitions are awaited before returning.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!("Url listener starting");
        let mut in_flight: JoinSet<Dispatched> = JoinSet::new();

        loop {
            tokio::select! {
                url = self.urls.recv() => {
                    let Some(url) = url else {
                        tracing::info!("Url channel closed, exiting loop");
                        break;
                    };
                    tracing::debug!(url = %url, "Url received");
                    in_flight.spawn(self.dispatcher.dispatch(&url));
                }
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    log_settled(joined);
                }
                _ = shutdown.recv() => {
                    tracing::info!("Url listener received shutdown signal, exiting loop");
                    break;
                }
            }
        }

        while let Some(joined) = in_flight.join_next().await {
            log_settled(joined);
        }
        tracing::info!("Url listener stopped");
    }
}

fn log_settled(joined: Result<Dispatched, tokio::task::JoinError>) {
    match joined {
        Ok(Dispatched::Failed(error)) => {
            tracing::debug!(error = %error, "Dispatched url did not commit");
        }
        Ok(_) => {}
        Err(error) => tracing::error!(error = %error, "Dispatch task failed"),
    }
}
