//! Asynchronous data resolution subsystem.
//!
//! # Data Flow
//! ```text
//! Route entered by the transition engine
//!     → resolver.rs (dispatch on ResolveSpec variant)
//!         - Single  → one producer future
//!         - Named   → all producers joined concurrently → keyed mapping
//!         - Ordered → all producers joined concurrently → positional sequence
//!         - Ready   → await the shared promise
//!     → Resolved value handed to the route's controller
//!
//! Externally driven results:
//!     deferred.rs (Deferred) → resolve()/reject() from anywhere
//!     → Promise (shared, cloneable future) awaited by any number of consumers
//! ```
//!
//! # Design Decisions
//! - One dispatcher normalizes all four resolve shapes
//! - A single rejection among concurrent producers fails the whole step
//! - Resolved data lives only as long as the transition that produced it

pub mod deferred;
pub mod resolver;

pub use deferred::{Deferred, Promise, Rejection};
pub use resolver::{resolver, ResolveFn, ResolveSpec, Resolved};
