//! Revalidation policy: which matched loaders run for a navigation.
//!
//! # Rules
//! A matched route with a loader runs when any of:
//! - a different route (or none) was matched at the same depth before
//! - its pathname (or splat value) changed at that depth
//! - no data is recorded for it
//! - the navigation follows a submission, or is a forced revalidation
//! - the URL is unchanged or only its search changed, and its
//!   `should_reload` predicate is absent or returns true
//!
//! The predicate is only consulted for the last rule.

use url::Url;

use crate::navigation::state::RouterState;
use crate::navigation::submission::Submission;
use crate::routing::matcher::SPLAT_PARAM;
use crate::routing::{Params, RouteMatch};

/// Context handed to a route's `should_reload` predicate.
#[derive(Debug, Clone, Copy)]
pub struct ShouldReloadArgs<'a> {
    pub prev_url: &'a Url,
    pub url: &'a Url,
    pub submission: Option<&'a Submission>,
    pub params: &'a Params,
}

/// Everything the policy needs to know about one navigation.
#[derive(Debug, Clone, Copy)]
pub struct RevalidationContext<'a> {
    pub previous: &'a RouterState,
    pub prev_url: &'a Url,
    pub url: &'a Url,
    pub submission: Option<&'a Submission>,
    /// Post-submission reloads and explicit revalidation.
    pub force: bool,
}

impl RevalidationContext<'_> {
    fn is_new(&self, m: &RouteMatch, index: usize) -> bool {
        self.previous
            .matches
            .get(index)
            .map_or(true, |prev| prev.route_id() != m.route_id())
    }

    fn path_changed(&self, m: &RouteMatch, index: usize) -> bool {
        self.previous.matches.get(index).map_or(true, |prev| {
            prev.pathname != m.pathname
                || prev.params.get(SPLAT_PARAM) != m.params.get(SPLAT_PARAM)
        })
    }

    /// Same href, or only the search string differs.
    fn same_url_or_search_changed(&self) -> bool {
        let same_href = self.url.path() == self.prev_url.path()
            && self.url.query() == self.prev_url.query();
        same_href || self.url.query() != self.prev_url.query()
    }
}

/// Decide for one match at position `index`.
pub fn should_run_loader(ctx: &RevalidationContext<'_>, m: &RouteMatch, index: usize) -> bool {
    if m.route.loader.is_none() {
        return false;
    }

    if ctx.is_new(m, index)
        || ctx.path_changed(m, index)
        || !ctx.previous.loader_data.contains_key(m.route_id())
        || ctx.force
    {
        return true;
    }

    if ctx.same_url_or_search_changed() {
        return match &m.route.should_reload {
            Some(predicate) => predicate(&ShouldReloadArgs {
                prev_url: ctx.prev_url,
                url: ctx.url,
                submission: ctx.submission,
                params: &m.params,
            }),
            None => true,
        };
    }

    false
}

/// Matches whose loaders run, in match order.
pub fn matches_to_load(ctx: &RevalidationContext<'_>, matches: &[RouteMatch]) -> Vec<RouteMatch> {
    matches
        .iter()
        .enumerate()
        .filter(|(i, m)| should_run_loader(ctx, m, *i))
        .map(|(_, m)| m.clone())
        .collect()
}
