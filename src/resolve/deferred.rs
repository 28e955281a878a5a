//! Externally settled asynchronous results.

use std::sync::{Arc, Mutex, PoisonError};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use thiserror::Error;
use tokio::sync::oneshot;

/// Reason carried by a rejected resolver, exit hook or deferred.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct Rejection {
    reason: String,
}

impl Rejection {
    /// Create a rejection with a human readable reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// The rejection reason.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub(crate) fn abandoned() -> Self {
        Self::new("deferred dropped before it was settled")
    }
}

/// A cloneable future that yields the settled outcome of a [`Deferred`].
pub type Promise<T> = Shared<BoxFuture<'static, Result<T, Rejection>>>;

type Slot<T> = Arc<Mutex<Option<oneshot::Sender<Result<T, Rejection>>>>>;

/// An asynchronous result whose outcome is decided by whoever holds a handle.
///
/// Handles are cheap to clone and all share the same outcome; the first call
/// to [`resolve`](Self::resolve) or [`reject`](Self::reject) wins. Dropping
/// every handle without settling rejects the promise.
pub struct Deferred<T: Clone> {
    sender: Slot<T>,
    promise: Promise<T>,
}

impl<T> Deferred<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create an unsettled deferred.
    pub fn new() -> Self {
        let (tx, rx) = oneshot::channel();
        let promise = rx
            .map(|received| received.unwrap_or_else(|_| Err(Rejection::abandoned())))
            .boxed()
            .shared();

        Self {
            sender: Arc::new(Mutex::new(Some(tx))),
            promise,
        }
    }

    /// Create a deferred that is already resolved with `value`.
    pub fn resolved(value: T) -> Self {
        let deferred = Self::new();
        deferred.resolve(value);
        deferred
    }

    /// Create a deferred that is already rejected.
    pub fn rejected(reason: Rejection) -> Self {
        let deferred = Self::new();
        deferred.reject(reason);
        deferred
    }

    /// A future for the outcome. May be called any number of times.
    pub fn promise(&self) -> Promise<T> {
        self.promise.clone()
    }

    /// Settle with a value. Returns false if already settled.
    pub fn resolve(&self, value: T) -> bool {
        self.settle(Ok(value))
    }

    /// Settle with a rejection. Returns false if already settled.
    pub fn reject(&self, reason: Rejection) -> bool {
        self.settle(Err(reason))
    }

    /// Whether resolve or reject has been called.
    pub fn is_settled(&self) -> bool {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    fn settle(&self, outcome: Result<T, Rejection>) -> bool {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match sender {
            // The receiver lives inside our own promise, so send only fails
            // once every promise clone has been polled to completion.
            Some(tx) => {
                let _ = tx.send(outcome);
                true
            }
            None => false,
        }
    }
}

impl<T> Default for Deferred<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            promise: self.promise.clone(),
        }
    }
}

impl<T: Clone> std::fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let settled = self
            .sender
            .lock()
            .map(|slot| slot.is_none())
            .unwrap_or(true);
        f.debug_struct("Deferred")
            .field("settled", &settled)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_after_promise_taken() {
        let deferred = Deferred::<u32>::new();
        let promise = deferred.promise();

        let settler = deferred.clone();
        tokio::spawn(async move {
            settler.resolve(7);
        });

        assert_eq!(promise.await, Ok(7));
        assert!(deferred.is_settled());
    }

    #[tokio::test]
    async fn test_first_settlement_wins() {
        let deferred = Deferred::<&'static str>::new();
        assert!(deferred.reject(Rejection::new("nope")));
        assert!(!deferred.resolve("late"));

        let err = deferred.promise().await.unwrap_err();
        assert_eq!(err.reason(), "nope");
    }

    #[tokio::test]
    async fn test_many_awaiters_share_outcome() {
        let deferred = Deferred::resolved(vec![1, 2, 3]);
        let (a, b) = tokio::join!(deferred.promise(), deferred.promise());
        assert_eq!(a, b);
        assert_eq!(a.unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_dropped_deferred_rejects() {
        let promise = {
            let deferred = Deferred::<u8>::new();
            deferred.promise()
        };
        let err = promise.await.unwrap_err();
        assert_eq!(err, Rejection::abandoned());
    }
}
