//! Committed route states.

use std::sync::Arc;

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::routing::{Activation, Params, Route, RouterError};

/// An immutable `(route, params)` snapshot with its rendered location.
#[derive(Clone)]
pub struct RouteState {
    route: Arc<Route>,
    params: Params,
    path: String,
    url: String,
}

impl RouteState {
    /// Render the location up front so a committed state always has one.
    pub(crate) fn new(route: Arc<Route>, params: Params, prefix: &str) -> Result<Self, RouterError> {
        let path = route.render(&params)?;
        let url = format!("{prefix}{path}");
        Ok(Self {
            route,
            params,
            path,
            url,
        })
    }

    pub fn route(&self) -> &Arc<Route> {
        &self.route
    }

    pub fn name(&self) -> &str {
        self.route.name()
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn title(&self) -> &str {
        self.route.title()
    }

    /// Path and query, without the url prefix.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Prefix, path and query.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl PartialEq for RouteState {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.route, &other.route) && self.params == other.params
    }
}

impl std::fmt::Debug for RouteState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteState")
            .field("route", &self.route.name())
            .field("params", &self.params)
            .field("url", &self.url)
            .finish()
    }
}

impl Serialize for RouteState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("RouteState", 3)?;
        state.serialize_field("name", self.name())?;
        state.serialize_field("params", &self.params)?;
        state.serialize_field("url", &self.url)?;
        state.end()
    }
}

/// A route of the committed chain and its live controller instance.
#[derive(Clone)]
pub(crate) struct ActiveRoute {
    pub(crate) route: Arc<Route>,
    pub(crate) activation: Option<Arc<dyn Activation>>,
}

/// Everything a commit replaces at once.
#[derive(Clone, Default)]
pub(crate) struct Snapshot {
    pub(crate) current: Option<RouteState>,
    pub(crate) previous: Option<RouteState>,
    /// Root-to-leaf, aligned with the ancestor chain of `current`.
    pub(crate) active: Vec<ActiveRoute>,
}

impl Snapshot {
    pub(crate) fn activation_of(&self, route: &Arc<Route>) -> Option<&Arc<dyn Activation>> {
        self.active
            .iter()
            .find(|active| Arc::ptr_eq(&active.route, route))
            .and_then(|active| active.activation.as_ref())
    }
}
