//! Route matching logic.
//!
//! # Responsibilities
//! - Walk the route tree depth-first in declaration order
//! - Compare static segments (case-insensitive)
//! - Capture `:param` segments (percent-decoded)
//! - Capture a trailing `*` splat under the `"*"` key
//! - Return the full branch, root first
//!
//! # Design Decisions
//! - First fully-satisfying branch wins; there is no ranking pass
//! - Index routes match only when no path remains
//! - Pathless layout routes match only through a matching child
//! - A route with a path that consumes the whole URL matches on its own
//!   when none of its children do

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::routing::tree::{RouteNode, RouteTree, Segment};

/// Resolved dynamic parameters, keyed by name.
pub type Params = BTreeMap<String, String>;

/// Key under which a splat's value is stored.
pub const SPLAT_PARAM: &str = "*";

/// One matched route frame.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub route: Arc<RouteNode>,
    /// All params resolved along the branch up to and including this route.
    pub params: Params,
    /// URL prefix matched by this route.
    pub pathname: String,
    /// Same as `pathname` minus any splat portion.
    pub pathname_base: String,
}

impl RouteMatch {
    /// Synthetic match used when nothing matched.
    pub fn fallback(route: Arc<RouteNode>) -> Self {
        Self {
            route,
            params: Params::new(),
            pathname: "/".to_string(),
            pathname_base: "/".to_string(),
        }
    }

    pub fn route_id(&self) -> &str {
        &self.route.id
    }
}

impl PartialEq for RouteMatch {
    fn eq(&self, other: &Self) -> bool {
        self.route.id == other.route.id
            && self.params == other.params
            && self.pathname == other.pathname
            && self.pathname_base == other.pathname_base
    }
}

impl Serialize for RouteMatch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("RouteMatch", 4)?;
        s.serialize_field("routeId", &self.route.id)?;
        s.serialize_field("params", &self.params)?;
        s.serialize_field("pathname", &self.pathname)?;
        s.serialize_field("pathnameBase", &self.pathname_base)?;
        s.end()
    }
}

/// Match a pathname against the tree. `None` when no branch is satisfied.
pub fn match_routes(tree: &RouteTree, pathname: &str) -> Option<Vec<RouteMatch>> {
    let segments: Vec<&str> = pathname.split('/').filter(|s| !s.is_empty()).collect();
    let mut matches = Vec::new();
    if match_branch(tree.routes(), &segments, 0, &Params::new(), &mut matches) {
        Some(matches)
    } else {
        None
    }
}

/// Outcome of matching one route's own pattern.
struct Step {
    params: Params,
    consumed: usize,
    /// Segments consumed before a splat.
    base_len: usize,
}

fn match_branch(
    nodes: &[Arc<RouteNode>],
    segments: &[&str],
    offset: usize,
    params: &Params,
    out: &mut Vec<RouteMatch>,
) -> bool {
    for node in nodes {
        let Some(step) = match_own_segments(node, &segments[offset..]) else {
            continue;
        };

        let mut merged = params.clone();
        merged.extend(step.params);
        let end = offset + step.consumed;
        let remaining = segments.len() - end;

        let frame = RouteMatch {
            route: node.clone(),
            params: merged,
            pathname: join_pathname(&segments[..end]),
            pathname_base: join_pathname(&segments[..offset + step.base_len]),
        };

        if node.index {
            if remaining == 0 {
                out.push(frame);
                return true;
            }
            continue;
        }

        let child_params = frame.params.clone();
        let mark = out.len();
        out.push(frame);
        if !node.children.is_empty()
            && match_branch(&node.children, segments, end, &child_params, out)
        {
            return true;
        }

        if remaining == 0 && !node.is_pathless() {
            out.truncate(mark + 1);
            return true;
        }
        out.truncate(mark);
    }
    false
}

fn match_own_segments(node: &RouteNode, remaining: &[&str]) -> Option<Step> {
    let mut params = Params::new();
    let mut consumed = 0;

    for segment in &node.segments {
        match segment {
            Segment::Static(expected) => {
                let actual = remaining.get(consumed)?;
                if !actual.eq_ignore_ascii_case(expected) {
                    return None;
                }
                consumed += 1;
            }
            Segment::Param(name) => {
                let actual = remaining.get(consumed)?;
                params.insert(name.clone(), decode(actual));
                consumed += 1;
            }
            Segment::Splat => {
                let base_len = consumed;
                let rest = remaining[consumed..].join("/");
                params.insert(SPLAT_PARAM.to_string(), decode(&rest));
                return Some(Step {
                    params,
                    consumed: remaining.len(),
                    base_len,
                });
            }
        }
    }

    Some(Step {
        params,
        consumed,
        base_len: consumed,
    })
}

fn decode(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => {
            tracing::warn!(segment = %raw, "Path segment is not valid UTF-8 after decoding");
            raw.to_string()
        }
    }
}

fn join_pathname(segments: &[&str]) -> String {
    format!("/{}", segments.join("/"))
}
