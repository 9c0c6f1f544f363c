//! Metrics collection.
//!
//! # Metrics
//! - `router_navigations_total` (counter): started navigations by action
//! - `router_navigation_duration_seconds` (histogram): start to commit
//! - `router_loader_calls_total` (counter): loader calls by outcome
//! - `router_loader_duration_seconds` (histogram)
//! - `router_action_calls_total` (counter): action calls by outcome
//! - `router_action_duration_seconds` (histogram)
//! - `router_redirects_total` (counter)
//! - `router_navigations_superseded_total` (counter)
//!
//! # Design Decisions
//! - Thin wrappers over the `metrics` facade so call sites stay one line
//! - Labels are low-cardinality (action, outcome); never route ids or URLs

use std::time::Instant;

use crate::navigation::state::HistoryAction;

pub fn record_navigation_started(action: HistoryAction) {
    ::metrics::counter!("router_navigations_total", "action" => action.as_str()).increment(1);
}

pub fn record_navigation_committed(started: Instant) {
    ::metrics::histogram!("router_navigation_duration_seconds")
        .record(started.elapsed().as_secs_f64());
}

pub fn record_loader_call(outcome: &'static str, started: Instant) {
    ::metrics::counter!("router_loader_calls_total", "outcome" => outcome).increment(1);
    ::metrics::histogram!("router_loader_duration_seconds").record(started.elapsed().as_secs_f64());
}

pub fn record_action_call(outcome: &'static str, started: Instant) {
    ::metrics::counter!("router_action_calls_total", "outcome" => outcome).increment(1);
    ::metrics::histogram!("router_action_duration_seconds").record(started.elapsed().as_secs_f64());
}

pub fn record_redirect() {
    ::metrics::counter!("router_redirects_total").increment(1);
}

pub fn record_superseded() {
    ::metrics::counter!("router_navigations_superseded_total").increment(1);
}
