//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route registration (before the router is shared):
//!     name + RouteDefinition
//!     → registry.rs (duplicate check, parent resolution, chain caching)
//!     → matcher.rs (parse url segment, join with the parent's template)
//!     → Arc<Route>, immutable from then on
//!
//! Url lookup:
//!     "/foo/1/bar/2?tab=info"
//!     → registry.rs (concrete routes in registration order)
//!     → matcher.rs (exact token count, literal compare, bind params)
//!     → RouteMatch or None
//!
//! Url rendering:
//!     Route + Params → matcher.rs → "/foo/1/bar/2?tab=info"
//! ```
//!
//! # Design Decisions
//! - Hierarchy is a strict tree; one parent per route
//! - Deterministic: same url always matches the same route
//! - First match wins (registration order)
//! - No-match is a value, not an error, at this layer

pub mod error;
pub mod matcher;
pub mod params;
pub mod registry;
pub mod route;

pub use error::RouterError;
pub use matcher::{Token, UrlTemplate};
pub use params::Params;
pub use registry::{Registry, RouteMatch};
pub use route::{Activation, Controller, FnController, ParentRef, Route, RouteDefinition};
