//! Route declarations.
//!
//! A [`Route`] is what callers hand to the engine: an optional path pattern,
//! optional loader/action handlers and a handful of flags. Declarations are
//! compiled into a [`RouteTree`](crate::routing::RouteTree) and never mutated.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};

use crate::navigation::request::HandlerArgs;
use crate::navigation::result::HandlerResult;
use crate::navigation::revalidation::ShouldReloadArgs;

/// A loader or action function.
pub type Handler = Arc<dyn Fn(HandlerArgs) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Override predicate consulted when a route is matched again at the same path.
pub type ShouldReload = Arc<dyn Fn(&ShouldReloadArgs<'_>) -> bool + Send + Sync>;

/// Caller-supplied route declaration.
#[derive(Clone, Default)]
pub struct Route {
    /// Stable identifier. Assigned positionally when absent.
    pub id: Option<String>,
    /// Path pattern relative to the parent (`users/:id`, `files/*`).
    pub path: Option<String>,
    /// Index routes render at their parent's exact path.
    pub index: bool,
    /// Parent id for flat declarations.
    pub parent_id: Option<String>,
    /// Read-only data fetch.
    pub loader: Option<Handler>,
    /// Mutating operation invoked for non-GET submissions.
    pub action: Option<Handler>,
    /// Revalidation override.
    pub should_reload: Option<ShouldReload>,
    /// Whether this route can render an exception for itself or its descendants.
    pub error_boundary: bool,
    /// Nested routes.
    pub children: Vec<Route>,
}

impl Route {
    /// Create a route with a path pattern.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Create an index route.
    pub fn index() -> Self {
        Self {
            index: true,
            ..Self::default()
        }
    }

    /// Create a pathless layout route.
    pub fn layout() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Attach a loader.
    pub fn loader<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(HandlerArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.loader = Some(Arc::new(move |args| f(args).boxed()));
        self
    }

    /// Attach an action.
    pub fn action<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(HandlerArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.action = Some(Arc::new(move |args| f(args).boxed()));
        self
    }

    pub fn should_reload<F>(mut self, f: F) -> Self
    where
        F: Fn(&ShouldReloadArgs<'_>) -> bool + Send + Sync + 'static,
    {
        self.should_reload = Some(Arc::new(f));
        self
    }

    pub fn error_boundary(mut self) -> Self {
        self.error_boundary = true;
        self
    }

    pub fn child(mut self, route: Route) -> Self {
        self.children.push(route);
        self
    }

    pub fn children(mut self, routes: impl IntoIterator<Item = Route>) -> Self {
        self.children.extend(routes);
        self
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("index", &self.index)
            .field("parent_id", &self.parent_id)
            .field("loader", &self.loader.is_some())
            .field("action", &self.action.is_some())
            .field("should_reload", &self.should_reload.is_some())
            .field("error_boundary", &self.error_boundary)
            .field("children", &self.children)
            .finish()
    }
}
