//! Transition subsystem.
//!
//! # Data Flow
//! ```text
//! go / transition_to / dispatch / reload
//!     → engine.rs (sync checks, ticket, spawned pipeline task)
//!     → hooks.rs on_start
//!     → diff.rs (retained prefix, exit list, enter list)
//!     → exit hooks, deepest first
//!     → resolve + activate, shallowest first
//!     → state.rs snapshot swap (current, previous, live controllers)
//!     → hooks.rs on_success / on_error, LocationWriter
//! ```
//!
//! # Design Decisions
//! - A failed transition leaves the committed snapshot untouched
//! - Errors that can be detected before any async work are `RouterError`s
//!   returned by the call itself; everything later is a `TransitionError`
//!   delivered through the handle

pub mod diff;
pub mod engine;
pub mod error;
pub mod hooks;
pub mod state;

pub use diff::TransitionPlan;
pub use engine::{Phase, Router, RouterBuilder, TransitionHandle, TransitionOptions};
pub use error::TransitionError;
pub use hooks::{HistoryEntry, LifecycleHooks, LocationWriter, MemoryHistory, NoopHooks};
pub use state::RouteState;
