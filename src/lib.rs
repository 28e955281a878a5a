//! Client-side navigation engine.
//!
//! A named route tree with url templates, a matcher that maps urls onto it,
//! and a transition engine that exits, resolves and enters routes before
//! committing a new current state.

pub mod config;
pub mod listener;
pub mod observability;
pub mod resolve;
pub mod routing;
pub mod transition;

pub use config::schema::AppConfig;
pub use resolve::{Deferred, Rejection, ResolveSpec, Resolved};
pub use routing::{Params, RouteDefinition, RouterError};
pub use transition::{Router, RouteState, TransitionError};
