//! Registration, lookup and render errors.

use thiserror::Error;

/// Errors returned synchronously by the registry and the router.
///
/// These describe programmer mistakes (bad definitions, unknown names) or a
/// URL that matches nothing. None of them leave the router in a changed state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    #[error("route '{0}' is already registered")]
    DuplicateRoute(String),

    #[error("parent '{parent}' of route '{route}' is not registered")]
    UnknownParent { route: String, parent: String },

    #[error("path param '{param}' of route '{route}' is already declared by an ancestor")]
    DuplicateParam { route: String, param: String },

    #[error("invalid url template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("route '{0}' not found")]
    RouteNotFound(String),

    #[error("cannot render route '{route}': missing path param '{param}'")]
    MissingParam { route: String, param: String },

    #[error("no route matches url '{0}'")]
    NoMatch(String),

    #[error("route '{0}' is abstract and cannot be navigated to")]
    AbstractTarget(String),

    #[error("no committed state to reload")]
    NothingToReload,
}
