//! Errors surfaced by a running transition.

use thiserror::Error;

use crate::resolve::Rejection;

/// Why an in-flight transition did not commit.
///
/// Whatever the variant, `current` and `previous` are untouched and the
/// location was not rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// An exit hook vetoed the navigation. Nothing was entered.
    #[error("exit hook of route '{route}' rejected the transition: {reason}")]
    ExitRejected {
        route: String,
        #[source]
        reason: Rejection,
    },

    /// A resolver failed. Routes entered before it stay entered.
    #[error("resolve of route '{route}' rejected: {reason}")]
    ResolveRejected {
        route: String,
        #[source]
        reason: Rejection,
    },

    /// A newer navigation started before this one could commit.
    #[error("transition to '{route}' was superseded by a newer navigation")]
    Superseded { route: String },

    /// The task running the transition was cancelled, e.g. by runtime shutdown.
    #[error("transition to '{route}' was interrupted before it settled")]
    Interrupted { route: String },
}

impl TransitionError {
    /// Label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            TransitionError::ExitRejected { .. } => "exit_rejected",
            TransitionError::ResolveRejected { .. } => "resolve_rejected",
            TransitionError::Superseded { .. } => "superseded",
            TransitionError::Interrupted { .. } => "interrupted",
        }
    }

    /// The rejection behind the failure, if a hook or resolver produced one.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            TransitionError::ExitRejected { reason, .. }
            | TransitionError::ResolveRejected { reason, .. } => Some(reason),
            TransitionError::Superseded { .. } | TransitionError::Interrupted { .. } => None,
        }
    }
}
