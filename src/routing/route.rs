//! Route definitions and the controller capability.

use std::sync::{Arc, OnceLock};

use futures_util::future::BoxFuture;

use crate::resolve::{Rejection, ResolveSpec, Resolved};
use crate::routing::error::RouterError;
use crate::routing::matcher::UrlTemplate;
use crate::routing::params::Params;

/// The live result of activating a controller.
///
/// Kept by the engine for as long as its route stays entered.
pub trait Activation: Send + Sync {
    /// Optional exit hook, run before the route is exited.
    ///
    /// A rejection vetoes the transition. Returning `None` means the route has
    /// no exit hook.
    fn exit(&self) -> Option<BoxFuture<'_, Result<(), Rejection>>> {
        None
    }
}

/// Something a route activates once its data is resolved.
pub trait Controller: Send + Sync {
    /// Invoked with the transition params and the resolved data.
    fn activate(&self, params: &Params, resolved: &Resolved) -> Option<Arc<dyn Activation>>;

    /// Resolve specification used when the route declares none.
    fn static_resolve(&self) -> Option<ResolveSpec> {
        None
    }
}

/// A plain function used as a controller. It has no exit hook.
pub struct FnController<F>(F);

impl<F> Controller for FnController<F>
where
    F: Fn(&Params, &Resolved) + Send + Sync,
{
    fn activate(&self, params: &Params, resolved: &Resolved) -> Option<Arc<dyn Activation>> {
        (self.0)(params, resolved);
        None
    }
}

/// How a definition names its parent.
#[derive(Clone)]
pub enum ParentRef {
    Route(Arc<Route>),
    Name(String),
}

/// Options accepted by `register`.
#[derive(Clone, Default)]
pub struct RouteDefinition {
    pub(crate) url: String,
    pub(crate) controller: Option<Arc<dyn Controller>>,
    pub(crate) resolve: Option<ResolveSpec>,
    pub(crate) parent: Option<ParentRef>,
    pub(crate) is_abstract: bool,
    pub(crate) title: Option<String>,
}

impl RouteDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Url segment owned by this route, e.g. `/bar/:barId?tab`.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn controller(mut self, controller: impl Controller + 'static) -> Self {
        self.controller = Some(Arc::new(controller));
        self
    }

    pub fn shared_controller(mut self, controller: Arc<dyn Controller>) -> Self {
        self.controller = Some(controller);
        self
    }

    pub fn controller_fn<F>(self, f: F) -> Self
    where
        F: Fn(&Params, &Resolved) + Send + Sync + 'static,
    {
        self.controller(FnController(f))
    }

    pub fn resolve(mut self, resolve: ResolveSpec) -> Self {
        self.resolve = Some(resolve);
        self
    }

    /// Parent by name. Overrides dot-notation.
    pub fn parent(mut self, name: impl Into<String>) -> Self {
        self.parent = Some(ParentRef::Name(name.into()));
        self
    }

    /// Parent by reference. Overrides dot-notation.
    pub fn parent_route(mut self, route: &Arc<Route>) -> Self {
        self.parent = Some(ParentRef::Route(route.clone()));
        self
    }

    pub fn is_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// A registered node of the navigation tree.
pub struct Route {
    name: String,
    url: String,
    segment: UrlTemplate,
    parent: Option<Arc<Route>>,
    is_abstract: bool,
    resolve: Option<ResolveSpec>,
    controller: Option<Arc<dyn Controller>>,
    title: String,
    template: OnceLock<UrlTemplate>,
}

impl Route {
    pub(crate) fn new(
        name: String,
        definition: RouteDefinition,
        parent: Option<Arc<Route>>,
    ) -> Result<Self, RouterError> {
        let segment = UrlTemplate::parse(&definition.url)?;
        let title = definition.title.unwrap_or_else(|| name.clone());

        Ok(Self {
            name,
            url: definition.url,
            segment,
            parent,
            is_abstract: definition.is_abstract,
            resolve: definition.resolve,
            controller: definition.controller,
            title,
            template: OnceLock::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The url segment exactly as it was registered.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn parent(&self) -> Option<&Arc<Route>> {
        self.parent.as_ref()
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn controller(&self) -> Option<&Arc<dyn Controller>> {
        self.controller.as_ref()
    }

    /// The route's own resolve, falling back to the controller's static one.
    pub fn resolve_spec(&self) -> Option<ResolveSpec> {
        self.resolve
            .clone()
            .or_else(|| self.controller.as_ref().and_then(|c| c.static_resolve()))
    }

    /// Template of this route's own url segment.
    pub fn segment(&self) -> &UrlTemplate {
        &self.segment
    }

    /// Every ancestor's segment concatenated root to self. Cached.
    pub fn full_template(&self) -> &UrlTemplate {
        self.template.get_or_init(|| match &self.parent {
            Some(parent) => parent.full_template().join(&self.segment),
            None => self.segment.clone(),
        })
    }

    /// Render this route's path and query for `params`.
    pub fn render(&self, params: &Params) -> Result<String, RouterError> {
        self.full_template()
            .render(params)
            .map_err(|param| RouterError::MissingParam {
                route: self.name.clone(),
                param: param.to_string(),
            })
    }

    /// Whether `params_a` and `params_b` agree on every param this route or
    /// any ancestor declares.
    pub fn params_unchanged(&self, params_a: &Params, params_b: &Params) -> bool {
        self.full_template()
            .param_names()
            .all(|name| params_a.same(params_b, name))
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .field("abstract", &self.is_abstract)
            .field("resolve", &self.resolve)
            .field("has_controller", &self.controller.is_some())
            .finish()
    }
}
