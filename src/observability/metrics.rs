//! Metrics collection.
//!
//! # Metrics
//! - `router_transitions_total` (counter): transitions by outcome
//! - `router_transition_duration_seconds` (histogram): start to settle
//! - `router_url_no_match_total` (counter): urls that matched no route
//! - `router_registered_routes` (gauge): size of the route table
//!
//! # Design Decisions
//! - Outcome label is `committed` or the failure kind
//! - Recording goes through the `metrics` facade; exporting is up to the host

use std::time::Duration;

/// Record a settled transition.
pub fn record_transition(outcome: &'static str, elapsed: Duration) {
    metrics::counter!("router_transitions_total", "outcome" => outcome).increment(1);
    metrics::histogram!("router_transition_duration_seconds", "outcome" => outcome)
        .record(elapsed.as_secs_f64());
}

/// Record a url that no route matched.
pub fn record_no_match() {
    metrics::counter!("router_url_no_match_total").increment(1);
}

/// Record the size of a freshly built route table.
pub fn record_registered_routes(count: usize) {
    metrics::gauge!("router_registered_routes").set(count as f64);
}
