//! Route storage and hierarchy resolution.
//!
//! # Responsibilities
//! - Own every registered route, in registration order
//! - Resolve a route's parent once, at registration
//! - Cache each route's ancestor chain (root to self)
//! - Find the first concrete route whose template matches a url
//!
//! # Design Decisions
//! - Parents must be registered before their children
//! - Explicit parent wins over dot-notation in the name
//! - Hierarchy is immutable after registration, so chains never go stale

use std::collections::HashMap;
use std::sync::Arc;

use crate::routing::error::RouterError;
use crate::routing::params::Params;
use crate::routing::route::{ParentRef, Route, RouteDefinition};

/// A matched url: the route and the params bound from path and query.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub route: Arc<Route>,
    pub params: Params,
}

struct Entry {
    route: Arc<Route>,
    chain: Arc<[Arc<Route>]>,
}

/// Every route known to a router.
#[derive(Default)]
pub struct Registry {
    entries: Vec<Entry>,
    by_name: HashMap<String, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a route built from `definition`.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        definition: RouteDefinition,
    ) -> Result<Arc<Route>, RouterError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(RouterError::DuplicateRoute(name));
        }

        let parent = self.resolve_parent(&name, definition.parent.as_ref())?;
        let route = Arc::new(Route::new(name.clone(), definition, parent.clone())?);

        let mut seen: Vec<&str> = Vec::new();
        for param in route.full_template().path_params() {
            if seen.contains(&param) {
                return Err(RouterError::DuplicateParam {
                    route: name,
                    param: param.to_string(),
                });
            }
            seen.push(param);
        }

        let mut chain: Vec<Arc<Route>> = match &parent {
            Some(parent) => self.chain_of(parent.name()).to_vec(),
            None => Vec::new(),
        };
        chain.push(route.clone());

        tracing::debug!(
            route = %name,
            template = %route.full_template(),
            depth = chain.len(),
            "Route registered"
        );

        self.by_name.insert(name, self.entries.len());
        self.entries.push(Entry {
            route: route.clone(),
            chain: chain.into(),
        });
        Ok(route)
    }

    fn resolve_parent(
        &self,
        name: &str,
        parent: Option<&ParentRef>,
    ) -> Result<Option<Arc<Route>>, RouterError> {
        let unknown = |parent: &str| RouterError::UnknownParent {
            route: name.to_string(),
            parent: parent.to_string(),
        };

        match parent {
            Some(ParentRef::Route(route)) => match self.get(route.name()) {
                Some(registered) if Arc::ptr_eq(registered, route) => Ok(Some(route.clone())),
                _ => Err(unknown(route.name())),
            },
            Some(ParentRef::Name(parent)) => self
                .get(parent)
                .cloned()
                .map(Some)
                .ok_or_else(|| unknown(parent.as_str())),
            None => match name.rsplit_once('.') {
                Some((parent, _)) => {
                    self.get(parent).cloned().map(Some).ok_or_else(|| unknown(parent))
                }
                None => Ok(None),
            },
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Route>> {
        self.by_name.get(name).map(|&i| &self.entries[i].route)
    }

    pub fn lookup(&self, name: &str) -> Result<&Arc<Route>, RouterError> {
        self.get(name)
            .ok_or_else(|| RouterError::RouteNotFound(name.to_string()))
    }

    fn chain_of(&self, name: &str) -> &[Arc<Route>] {
        self.by_name
            .get(name)
            .map(|&i| &*self.entries[i].chain)
            .unwrap_or(&[])
    }

    /// Root-to-self ancestors of `route`, inclusive.
    ///
    /// A route that was never registered here has only itself.
    pub fn ancestor_chain(&self, route: &Arc<Route>) -> Arc<[Arc<Route>]> {
        match self.by_name.get(route.name()) {
            Some(&i) if Arc::ptr_eq(&self.entries[i].route, route) => {
                self.entries[i].chain.clone()
            }
            _ => Arc::from(vec![route.clone()]),
        }
    }

    /// Full url template of a registered route, as text.
    pub fn full_url_template(&self, name: &str) -> Result<String, RouterError> {
        self.lookup(name)
            .map(|route| route.full_template().to_string())
    }

    /// First concrete route, in registration order, matching `url`.
    ///
    /// `url` is a path with an optional `?query`; any prefix must already be
    /// stripped.
    pub fn find(&self, url: &str) -> Option<RouteMatch> {
        let (path, query) = match url.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (url, None),
        };

        self.routes()
            .filter(|route| !route.is_abstract())
            .find_map(|route| {
                route.full_template().matches(path, query).map(|params| RouteMatch {
                    route: route.clone(),
                    params,
                })
            })
    }

    /// Routes in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &Arc<Route>> {
        self.entries.iter().map(|entry| &entry.route)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.routes().map(|route| route.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .register("foo", RouteDefinition::new().url("/foo/:fooId"))
            .unwrap();
        registry
            .register("foo.bar", RouteDefinition::new().url("/bar/:barId?tab"))
            .unwrap();
        registry
    }

    #[test]
    fn test_dot_notation_parent() {
        let registry = registry();
        let child = registry.lookup("foo.bar").unwrap();
        let parent = registry.lookup("foo").unwrap();
        assert!(Arc::ptr_eq(child.parent().unwrap(), parent));
    }

    #[test]
    fn test_explicit_parent() {
        let mut registry = registry();
        let foo = registry.lookup("foo").unwrap().clone();

        let by_ref = registry
            .register("detail", RouteDefinition::new().url("/detail").parent_route(&foo))
            .unwrap();
        assert!(Arc::ptr_eq(by_ref.parent().unwrap(), &foo));

        let by_name = registry
            .register("edit", RouteDefinition::new().url("/edit").parent("foo.bar"))
            .unwrap();
        assert_eq!(by_name.parent().unwrap().name(), "foo.bar");
        assert_eq!(
            registry.full_url_template("edit").unwrap(),
            "/foo/:fooId/bar/:barId/edit?tab"
        );
    }

    #[test]
    fn test_registration_errors() {
        let mut registry = registry();

        assert_eq!(
            registry.register("foo", RouteDefinition::new()).unwrap_err(),
            RouterError::DuplicateRoute("foo".into())
        );
        assert_eq!(
            registry.register("ghost.child", RouteDefinition::new()).unwrap_err(),
            RouterError::UnknownParent {
                route: "ghost.child".into(),
                parent: "ghost".into()
            }
        );
        assert!(matches!(
            registry.register("x", RouteDefinition::new().parent("nope")),
            Err(RouterError::UnknownParent { .. })
        ));
        assert_eq!(
            registry
                .register("foo.again", RouteDefinition::new().url("/again/:fooId"))
                .unwrap_err(),
            RouterError::DuplicateParam {
                route: "foo.again".into(),
                param: "fooId".into()
            }
        );
        assert_eq!(
            registry.lookup("missing").unwrap_err(),
            RouterError::RouteNotFound("missing".into())
        );
        // failed registrations leave nothing behind
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_ancestor_chain_is_root_first() {
        let registry = registry();
        let child = registry.lookup("foo.bar").unwrap();
        let chain = registry.ancestor_chain(child);
        let names: Vec<_> = chain.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["foo", "foo.bar"]);

        // cached: the same allocation is handed out each time
        assert!(Arc::ptr_eq(&chain, &registry.ancestor_chain(child)));
    }

    #[test]
    fn test_find_skips_abstract_and_respects_order() {
        let mut registry = Registry::new();
        registry
            .register("app", RouteDefinition::new().url("/app").is_abstract(true))
            .unwrap();
        registry
            .register("app.home", RouteDefinition::new().url("/home"))
            .unwrap();
        registry
            .register("app.user", RouteDefinition::new().url("/:section"))
            .unwrap();

        assert!(registry.find("/app").is_none());

        // both app.home and app.user fit; the first registered wins
        let matched = registry.find("/app/home").unwrap();
        assert_eq!(matched.route.name(), "app.home");

        let matched = registry.find("/app/settings").unwrap();
        assert_eq!(matched.route.name(), "app.user");
        assert_eq!(matched.params.get("section"), Some(&json!("settings")));
    }

    #[test]
    fn test_find_merges_declared_query() {
        let registry = registry();
        let matched = registry.find("/foo/1/bar/2?tab=info&other=x").unwrap();
        assert_eq!(matched.route.name(), "foo.bar");
        assert_eq!(matched.params.get("fooId"), Some(&json!("1")));
        assert_eq!(matched.params.get("barId"), Some(&json!("2")));
        assert_eq!(matched.params.get("tab"), Some(&json!("info")));
        assert_eq!(matched.params.get("other"), None);
    }
}
