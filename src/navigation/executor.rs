//! Loader/action invocation.
//!
//! # Responsibilities
//! - Build handler arguments (params, request, cancellation signal)
//! - Run one action, or a batch of loaders concurrently
//! - Normalize every outcome into a `DataResult`
//! - Report `None` when the navigation was cancelled while waiting
//!
//! # Design Decisions
//! - Loaders of one batch share one signal and are polled together on the
//!   calling task (no spawning); a failing loader never aborts its siblings
//! - Results are only returned once the entire batch has resolved
//! - Cancellation is checked again after every await

use std::time::Instant;

use futures_util::future::join_all;
use tokio_util::sync::CancellationToken;

use crate::navigation::request::{HandlerArgs, NavRequest};
use crate::navigation::result::DataResult;
use crate::observability::metrics;
use crate::routing::{Handler, RouteMatch};

/// Invoke the action of `target`. The caller has already checked it has one.
pub async fn call_action(
    target: &RouteMatch,
    request: NavRequest,
    signal: &CancellationToken,
) -> Option<DataResult> {
    let handler = target.route.action.clone()?;
    let started = Instant::now();
    tracing::debug!(route_id = %target.route_id(), method = %request.method, "Invoking action");

    let result = invoke(&handler, target, request, signal).await?;
    metrics::record_action_call(result.outcome(), started);
    Some(result)
}

/// Invoke every loader in `matches` concurrently and wait for all of them.
pub async fn call_loaders(
    matches: &[RouteMatch],
    request: &NavRequest,
    signal: &CancellationToken,
) -> Option<Vec<(RouteMatch, DataResult)>> {
    let started = Instant::now();
    let calls = matches.iter().filter_map(|m| {
        let handler = m.route.loader.clone()?;
        tracing::debug!(route_id = %m.route_id(), url = %request.url, "Invoking loader");
        Some(async move {
            let result = invoke(&handler, m, request.clone(), signal).await;
            result.map(|r| (m.clone(), r))
        })
    });

    let batch = tokio::select! {
        biased;
        _ = signal.cancelled() => return None,
        batch = join_all(calls) => batch,
    };
    if signal.is_cancelled() {
        return None;
    }

    let results: Option<Vec<_>> = batch.into_iter().collect();
    if let Some(results) = &results {
        for (m, result) in results {
            tracing::debug!(route_id = %m.route_id(), outcome = result.outcome(), "Loader resolved");
            metrics::record_loader_call(result.outcome(), started);
        }
    }
    results
}

async fn invoke(
    handler: &Handler,
    m: &RouteMatch,
    request: NavRequest,
    signal: &CancellationToken,
) -> Option<DataResult> {
    let args = HandlerArgs {
        params: m.params.clone(),
        request,
        signal: signal.clone(),
    };

    let outcome = tokio::select! {
        biased;
        _ = signal.cancelled() => return None,
        outcome = handler(args) => outcome,
    };
    if signal.is_cancelled() {
        return None;
    }
    Some(DataResult::from_handler(outcome))
}
