//! Compiled route tree.
//!
//! # Responsibilities
//! - Nest flat declarations under their `parent_id`
//! - Assign positional ids to routes declared without one
//! - Parse path patterns into segments
//! - Reject misconfiguration before any navigation runs

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::routing::route::{Handler, Route, ShouldReload};

/// Route declaration errors. These indicate caller misconfiguration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteTreeError {
    #[error("route tree is empty")]
    Empty,

    #[error("duplicate route id `{0}`")]
    DuplicateId(String),

    #[error("route `{route_id}` references unknown or cyclic parent `{parent_id}`")]
    UnknownParent { route_id: String, parent_id: String },

    #[error("flat route declared without an id cannot be referenced as a parent")]
    MissingFlatId,

    #[error("route `{route_id}`: malformed path segment `{segment}`")]
    MalformedSegment { route_id: String, segment: String },

    #[error("route `{route_id}`: splat `*` must be the final segment")]
    SplatNotLast { route_id: String },

    #[error("route `{route_id}`: parameter `{name}` is already bound by an ancestor")]
    DuplicateParam { route_id: String, name: String },

    #[error("index route `{0}` cannot have children")]
    IndexWithChildren(String),
}

/// One parsed path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Static(String),
    Param(String),
    Splat,
}

/// A compiled, immutable route.
pub struct RouteNode {
    pub id: String,
    pub path: Option<String>,
    pub index: bool,
    pub error_boundary: bool,
    pub loader: Option<Handler>,
    pub action: Option<Handler>,
    pub should_reload: Option<ShouldReload>,
    pub children: Vec<Arc<RouteNode>>,
    pub(crate) segments: Vec<Segment>,
}

impl RouteNode {
    /// Layout routes have neither a path nor the index flag.
    pub fn is_pathless(&self) -> bool {
        self.path.is_none() && !self.index
    }
}

impl fmt::Debug for RouteNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteNode")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("index", &self.index)
            .field("error_boundary", &self.error_boundary)
            .field("loader", &self.loader.is_some())
            .field("action", &self.action.is_some())
            .field("children", &self.children)
            .finish()
    }
}

/// The full set of compiled routes.
#[derive(Debug, Clone)]
pub struct RouteTree {
    roots: Vec<Arc<RouteNode>>,
}

impl RouteTree {
    /// Compile declarations. Entries carrying a `parent_id` are nested first.
    pub fn new(routes: Vec<Route>) -> Result<Self, RouteTreeError> {
        if routes.is_empty() {
            return Err(RouteTreeError::Empty);
        }

        let routes = nest_flat(routes)?;
        let mut seen = HashSet::new();
        let mut roots = Vec::with_capacity(routes.len());
        for (i, route) in routes.into_iter().enumerate() {
            roots.push(compile(route, i.to_string(), &mut Vec::new(), &mut seen)?);
        }

        Ok(Self { roots })
    }

    pub fn routes(&self) -> &[Arc<RouteNode>] {
        &self.roots
    }

    /// The first declared route; receives unmatched URLs.
    pub fn root(&self) -> &Arc<RouteNode> {
        &self.roots[0]
    }

    /// Depth-first lookup by id.
    pub fn find(&self, id: &str) -> Option<&Arc<RouteNode>> {
        fn walk<'a>(nodes: &'a [Arc<RouteNode>], id: &str) -> Option<&'a Arc<RouteNode>> {
            nodes
                .iter()
                .find_map(|n| if n.id == id { Some(n) } else { walk(&n.children, id) })
        }
        walk(&self.roots, id)
    }
}

/// Move every entry with a `parent_id` under its parent.
fn nest_flat(routes: Vec<Route>) -> Result<Vec<Route>, RouteTreeError> {
    let (mut roots, mut pending): (Vec<Route>, Vec<Route>) =
        routes.into_iter().partition(|r| r.parent_id.is_none());

    if pending.is_empty() {
        return Ok(roots);
    }

    for root in &mut roots {
        attach(root, &mut pending)?;
    }

    match pending.into_iter().next() {
        None => Ok(roots),
        Some(orphan) => Err(RouteTreeError::UnknownParent {
            route_id: orphan.id.unwrap_or_default(),
            parent_id: orphan.parent_id.unwrap_or_default(),
        }),
    }
}

fn attach(route: &mut Route, pending: &mut Vec<Route>) -> Result<(), RouteTreeError> {
    for child in &mut route.children {
        attach(child, pending)?;
    }

    let Some(id) = route.id.clone() else {
        return Ok(());
    };

    let (mine, rest): (Vec<Route>, Vec<Route>) = std::mem::take(pending)
        .into_iter()
        .partition(|r| r.parent_id.as_deref() == Some(id.as_str()));
    *pending = rest;

    for mut child in mine {
        if child.id.is_none() {
            return Err(RouteTreeError::MissingFlatId);
        }
        child.parent_id = None;
        attach(&mut child, pending)?;
        route.children.push(child);
    }
    Ok(())
}

fn compile(
    route: Route,
    positional_id: String,
    bound_params: &mut Vec<String>,
    seen: &mut HashSet<String>,
) -> Result<Arc<RouteNode>, RouteTreeError> {
    let id = route.id.unwrap_or(positional_id);
    if !seen.insert(id.clone()) {
        return Err(RouteTreeError::DuplicateId(id));
    }
    if route.index && !route.children.is_empty() {
        return Err(RouteTreeError::IndexWithChildren(id));
    }

    let segments = match route.path.as_deref() {
        Some(path) => parse_pattern(&id, path)?,
        None => Vec::new(),
    };

    let depth = bound_params.len();
    for segment in &segments {
        if let Segment::Param(name) = segment {
            if bound_params.contains(name) {
                return Err(RouteTreeError::DuplicateParam {
                    route_id: id,
                    name: name.clone(),
                });
            }
            bound_params.push(name.clone());
        }
    }

    let mut children = Vec::with_capacity(route.children.len());
    for (i, child) in route.children.into_iter().enumerate() {
        children.push(compile(child, format!("{}-{}", id, i), bound_params, seen)?);
    }
    bound_params.truncate(depth);

    Ok(Arc::new(RouteNode {
        id,
        path: route.path,
        index: route.index,
        error_boundary: route.error_boundary,
        loader: route.loader,
        action: route.action,
        should_reload: route.should_reload,
        children,
        segments,
    }))
}

fn parse_pattern(route_id: &str, path: &str) -> Result<Vec<Segment>, RouteTreeError> {
    let raw: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let mut segments = Vec::with_capacity(raw.len());

    for (i, part) in raw.iter().enumerate() {
        if *part == "*" {
            if i + 1 != raw.len() {
                return Err(RouteTreeError::SplatNotLast {
                    route_id: route_id.to_string(),
                });
            }
            segments.push(Segment::Splat);
        } else if let Some(name) = part.strip_prefix(':') {
            if name.is_empty() || name.contains([':', '*']) {
                return Err(RouteTreeError::MalformedSegment {
                    route_id: route_id.to_string(),
                    segment: part.to_string(),
                });
            }
            segments.push(Segment::Param(name.to_string()));
        } else if part.contains([':', '*']) {
            return Err(RouteTreeError::MalformedSegment {
                route_id: route_id.to_string(),
                segment: part.to_string(),
            });
        } else {
            segments.push(Segment::Static(part.to_string()));
        }
    }

    Ok(segments)
}
