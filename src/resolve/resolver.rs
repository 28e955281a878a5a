//! Resolve specifications and the dispatcher that runs them.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::{try_join_all, BoxFuture, FutureExt};
use serde::Serialize;
use serde_json::Value;

use crate::resolve::deferred::{Deferred, Promise, Rejection};
use crate::routing::params::Params;

/// A data producer. Called with the full transition params.
pub type ResolveFn =
    Arc<dyn Fn(Params) -> BoxFuture<'static, Result<Value, Rejection>> + Send + Sync>;

/// Wrap an async closure as a [`ResolveFn`].
pub fn resolver<F, Fut>(producer: F) -> ResolveFn
where
    F: Fn(Params) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, Rejection>> + Send + 'static,
{
    Arc::new(move |params| producer(params).boxed())
}

/// What a route needs before its controller may run.
#[derive(Clone)]
pub enum ResolveSpec {
    /// One producer; the controller receives its value.
    Single(ResolveFn),
    /// Producers keyed by name, run concurrently.
    Named(Vec<(String, ResolveFn)>),
    /// Producers run concurrently; values keep their declared positions.
    Ordered(Vec<ResolveFn>),
    /// An already constructed asynchronous value.
    Ready(Promise<Value>),
}

impl ResolveSpec {
    pub fn single<F, Fut>(producer: F) -> Self
    where
        F: Fn(Params) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, Rejection>> + Send + 'static,
    {
        Self::Single(resolver(producer))
    }

    pub fn named<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, ResolveFn)>,
        K: Into<String>,
    {
        Self::Named(entries.into_iter().map(|(k, f)| (k.into(), f)).collect())
    }

    pub fn ordered(producers: impl IntoIterator<Item = ResolveFn>) -> Self {
        Self::Ordered(producers.into_iter().collect())
    }

    /// A value that is available immediately.
    pub fn value(value: Value) -> Self {
        Self::Ready(Deferred::resolved(value).promise())
    }

    /// Run the producers and normalize the outcome.
    pub async fn run(&self, params: &Params) -> Result<Resolved, Rejection> {
        match self {
            ResolveSpec::Single(producer) => producer(params.clone()).await.map(Resolved::Single),
            ResolveSpec::Named(entries) => {
                let pending = entries.iter().map(|(key, producer)| {
                    let key = key.clone();
                    producer(params.clone()).map(move |outcome| outcome.map(|value| (key, value)))
                });
                let pairs = try_join_all(pending).await?;
                Ok(Resolved::Named(pairs.into_iter().collect()))
            }
            ResolveSpec::Ordered(producers) => {
                let pending = producers.iter().map(|producer| producer(params.clone()));
                try_join_all(pending).await.map(Resolved::Ordered)
            }
            ResolveSpec::Ready(promise) => promise.clone().await.map(Resolved::Single),
        }
    }
}

impl From<Deferred<Value>> for ResolveSpec {
    fn from(deferred: Deferred<Value>) -> Self {
        Self::Ready(deferred.promise())
    }
}

impl std::fmt::Debug for ResolveSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveSpec::Single(_) => f.write_str("Single"),
            ResolveSpec::Named(entries) => f
                .debug_tuple("Named")
                .field(&entries.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>())
                .finish(),
            ResolveSpec::Ordered(producers) => {
                f.debug_tuple("Ordered").field(&producers.len()).finish()
            }
            ResolveSpec::Ready(_) => f.write_str("Ready"),
        }
    }
}

/// Data handed to a controller on activation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Resolved {
    /// The route declared nothing to resolve.
    #[default]
    None,
    Single(Value),
    Named(BTreeMap<String, Value>),
    Ordered(Vec<Value>),
}

impl Resolved {
    /// The value of a `Single` resolution.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Resolved::Single(value) => Some(value),
            _ => None,
        }
    }

    /// A keyed value of a `Named` resolution.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Resolved::Named(values) => values.get(key),
            _ => None,
        }
    }

    /// A positional value of an `Ordered` resolution.
    pub fn at(&self, index: usize) -> Option<&Value> {
        match self {
            Resolved::Ordered(values) => values.get(index),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Resolved::None)
    }
}
