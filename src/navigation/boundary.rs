//! Exception boundary resolution.

use crate::navigation::result::RouteError;
use crate::navigation::state::Exceptions;
use crate::routing::RouteMatch;

/// Nearest boundary-capable ancestor (inclusive) of `route_id`, falling back
/// to the root match. `matches` must be non-empty.
pub fn find_nearest_boundary<'a>(matches: &'a [RouteMatch], route_id: &str) -> &'a RouteMatch {
    let end = matches
        .iter()
        .position(|m| m.route_id() == route_id)
        .map(|i| i + 1)
        .unwrap_or(matches.len());

    matches[..end]
        .iter()
        .rev()
        .find(|m| m.route.error_boundary)
        .unwrap_or(&matches[0])
}

/// Index of the boundary for `route_id` within `matches`.
pub fn boundary_index(matches: &[RouteMatch], route_id: &str) -> usize {
    let boundary = find_nearest_boundary(matches, route_id);
    matches
        .iter()
        .position(|m| m.route_id() == boundary.route_id())
        .unwrap_or(0)
}

/// Attribute an exception to its boundary. The first exception recorded for
/// a boundary is kept.
pub fn assign_exception(
    exceptions: &mut Exceptions,
    matches: &[RouteMatch],
    route_id: &str,
    error: RouteError,
) {
    let boundary = find_nearest_boundary(matches, route_id);
    tracing::debug!(
        route_id = %route_id,
        boundary_id = %boundary.route_id(),
        error = %error,
        "Exception assigned to boundary"
    );
    exceptions
        .entry(boundary.route_id().to_string())
        .or_insert(error);
}
