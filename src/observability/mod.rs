//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Registry, transition engine and url listener produce:
//!     → tracing events (phase changes, commits, rejections, no-match)
//!       inside a per-transition span carrying its id
//!     → metrics.rs (counters, gauges, histograms via the `metrics` facade)
//!
//! Consumers:
//!     → logging.rs installs a fmt subscriber for the binary
//!     → Any metrics recorder the host application installs
//! ```
//!
//! # Design Decisions
//! - The library never installs a subscriber or recorder itself
//! - Every transition gets a span with a UUID so interleaved logs stay readable
//! - Metrics are cheap no-ops when no recorder is installed

pub mod logging;
pub mod metrics;
