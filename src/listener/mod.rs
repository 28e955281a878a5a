//! Platform url listener.
//!
//! # Data Flow
//! ```text
//! platform navigation event / initial load
//!     → mpsc channel of raw urls
//!     → url_listener.rs UrlListener task
//!     → Dispatcher: Router::dispatch (no location write)
//!         ↳ no match → `otherwise` path (location write) or warning
//! ```

pub mod url_listener;

pub use url_listener::{Dispatched, Dispatcher, UrlListener};
