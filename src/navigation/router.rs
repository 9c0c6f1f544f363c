//! Navigation coordinator.
//!
//! # Responsibilities
//! - Own the current [`RouterState`] and replace it wholesale on commit
//! - Keep exactly one navigation active, cancelling the previous one
//! - Run the action phase, the loader phase and redirect re-entry
//! - Write history for Push/Replace navigations
//! - Notify subscribers once per committed state
//!
//! # Design Decisions
//! - The pending navigation (id + cancellation token) lives behind one lock;
//!   commits check under that lock that the navigation is still current, so
//!   a superseded navigation can never publish state
//! - Redirects are followed by a loop in [`Router::drive`], bounded by
//!   `max_redirects`
//! - Loader/action failures are data; only caller misconfiguration surfaces
//!   as [`NavigationError`]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Instant;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use url::Url;
use uuid::Uuid;

use crate::config::schema::RouterSettings;
use crate::history::{History, Unlisten};
use crate::navigation::boundary::{assign_exception, boundary_index};
use crate::navigation::executor;
use crate::navigation::location::{Location, LocationError};
use crate::navigation::redirect::{find_redirect, Redirect};
use crate::navigation::request::NavRequest;
use crate::navigation::result::{DataResult, RouteError};
use crate::navigation::revalidation::{matches_to_load, RevalidationContext};
use crate::navigation::state::{
    merge_loader_data, Exceptions, HistoryAction, HydrationData, RouteData, RouterState,
};
use crate::navigation::submission::Submission;
use crate::navigation::transition::{LoadKind, Transition};
use crate::observability::metrics;
use crate::routing::{match_routes, RouteMatch, RouteTree};

/// Caller misconfiguration surfaced from a navigation.
#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("route `{route_id}` has no action to handle the submission")]
    MissingAction { route_id: String },

    #[error("no route can handle a submission to `{pathname}`")]
    NoSubmissionTarget { pathname: String },

    #[error("redirect chain exceeded {limit} redirects")]
    TooManyRedirects { limit: usize },

    #[error("cannot resolve location `{target}`: {source}")]
    InvalidLocation {
        target: String,
        #[source]
        source: LocationError,
    },

    #[error("invalid base url `{base_url}`: {source}")]
    InvalidBaseUrl {
        base_url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("router has been disposed")]
    Disposed,
}

/// Where to navigate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationTarget {
    /// Absolute or relative location.
    Location(String),
    /// History offset, handed to the history adapter.
    Delta(isize),
}

impl From<&str> for NavigationTarget {
    fn from(to: &str) -> Self {
        NavigationTarget::Location(to.to_string())
    }
}

impl From<String> for NavigationTarget {
    fn from(to: String) -> Self {
        NavigationTarget::Location(to)
    }
}

impl From<isize> for NavigationTarget {
    fn from(delta: isize) -> Self {
        NavigationTarget::Delta(delta)
    }
}

/// Options for [`Router::navigate`].
#[derive(Debug, Clone, Default)]
pub struct NavigateOptions {
    pub replace: bool,
    pub state: Option<Value>,
    pub submission: Option<Submission>,
}

impl NavigateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(mut self) -> Self {
        self.replace = true;
        self
    }

    pub fn state(mut self, state: Value) -> Self {
        self.state = Some(state);
        self
    }

    pub fn submission(mut self, submission: Submission) -> Self {
        self.submission = Some(submission);
        self
    }
}

/// How a navigation ended.
#[derive(Debug, Clone)]
pub enum NavigationOutcome {
    /// The navigation committed this state.
    Committed(Arc<RouterState>),
    /// A newer navigation took over; nothing was committed.
    Superseded,
    /// A history offset was handed to the history adapter.
    Delegated,
}

impl NavigationOutcome {
    pub fn state(&self) -> Option<&Arc<RouterState>> {
        match self {
            NavigationOutcome::Committed(state) => Some(state),
            NavigationOutcome::Superseded | NavigationOutcome::Delegated => None,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, NavigationOutcome::Superseded)
    }
}

#[derive(Debug, Clone)]
struct PendingNavigation {
    id: Uuid,
    token: CancellationToken,
}

/// Result of one pass through the pipeline.
enum Step {
    Done(Arc<RouterState>),
    Redirect(Redirect),
    Cancelled,
}

/// Everything a final commit needs besides the location.
struct Completion {
    matches: Vec<RouteMatch>,
    loader_data: RouteData,
    action_data: Option<RouteData>,
    exceptions: Exceptions,
}

struct RouterInner {
    routes: RouteTree,
    history: Arc<dyn History>,
    settings: RouterSettings,
    base: Url,
    state: ArcSwap<RouterState>,
    pending: Mutex<Option<PendingNavigation>>,
    notifier: broadcast::Sender<Arc<RouterState>>,
    unlisten: Mutex<Option<Unlisten>>,
    hydrated: bool,
    disposed: AtomicBool,
}

/// The navigation coordinator. Cloning shares the router.
#[derive(Clone)]
pub struct Router {
    inner: Arc<RouterInner>,
}

impl Router {
    /// Build a router positioned at the history's current location.
    ///
    /// With `hydration`, the initial state carries its data and
    /// [`Router::initialize`] skips the initial load.
    pub fn new(
        routes: RouteTree,
        history: Arc<dyn History>,
        settings: RouterSettings,
        hydration: Option<HydrationData>,
    ) -> Result<Self, NavigationError> {
        let base = Url::parse(&settings.base_url).map_err(|source| NavigationError::InvalidBaseUrl {
            base_url: settings.base_url.clone(),
            source,
        })?;

        let location = history.location();
        let (matches, mut exceptions) = match match_routes(&routes, &location.pathname) {
            Some(matches) => (matches, Exceptions::new()),
            None => not_found(&routes, &location),
        };

        let hydrated = hydration.is_some();
        let (loader_data, action_data) = match hydration {
            Some(data) => {
                exceptions.extend(data.exceptions());
                (data.loader_data, data.action_data)
            }
            None => (RouteData::new(), None),
        };

        let state = RouterState {
            action: history.action(),
            location,
            matches,
            transition: Transition::Idle,
            loader_data,
            action_data,
            exceptions,
        };
        let (notifier, _) = broadcast::channel(settings.notify_capacity.max(1));

        Ok(Self {
            inner: Arc::new(RouterInner {
                routes,
                history,
                settings,
                base,
                state: ArcSwap::from_pointee(state),
                pending: Mutex::new(None),
                notifier,
                unlisten: Mutex::new(None),
                hydrated,
                disposed: AtomicBool::new(false),
            }),
        })
    }

    /// Current committed state.
    pub fn state(&self) -> Arc<RouterState> {
        self.inner.state.load_full()
    }

    /// One message per committed state, intermediate transitions included.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<RouterState>> {
        self.inner.notifier.subscribe()
    }

    pub fn routes(&self) -> &RouteTree {
        &self.inner.routes
    }

    /// Start listening for history pops and, unless hydrated, load the
    /// current location. Must be called inside a Tokio runtime.
    pub async fn initialize(&self) -> Result<NavigationOutcome, NavigationError> {
        self.ensure_active()?;
        self.listen_history();

        if self.inner.hydrated {
            tracing::debug!("Hydrated; skipping initial load");
            return Ok(NavigationOutcome::Committed(self.state()));
        }

        let current = self.state();
        let nav = self.begin();
        let transition = Transition::Loading {
            location: current.location.clone(),
            kind: LoadKind::Normal,
        };
        self.drive(nav, current.action, transition, false, false).await
    }

    /// Cancel any in-flight navigation and stop listening to history.
    pub fn dispose(&self) {
        self.inner.disposed.store(true, Ordering::SeqCst);
        if let Some(pending) = self.inner.pending.lock().take() {
            pending.token.cancel();
        }
        if let Some(unlisten) = self.inner.unlisten.lock().take() {
            unlisten.unlisten();
        }
        tracing::debug!("Router disposed");
    }

    /// Navigate to a location, or delegate a history offset.
    pub async fn navigate(
        &self,
        target: impl Into<NavigationTarget>,
        options: NavigateOptions,
    ) -> Result<NavigationOutcome, NavigationError> {
        self.ensure_active()?;

        let to = match target.into() {
            NavigationTarget::Delta(delta) => {
                tracing::debug!(delta, "Delegating history offset");
                self.inner.history.go(delta);
                return Ok(NavigationOutcome::Delegated);
            }
            NavigationTarget::Location(to) => to,
        };

        let current = self.state();
        let mut location = current
            .location
            .resolve(&to, &self.inner.base)
            .map_err(|source| NavigationError::InvalidLocation {
                target: to.clone(),
                source,
            })?;
        if let Some(state) = options.state {
            location = location.with_state(state);
        }

        let action = if options.replace {
            HistoryAction::Replace
        } else {
            HistoryAction::Push
        };

        let transition = match options.submission {
            Some(submission) if submission.is_mutating() => Transition::SubmittingAction {
                location,
                submission,
            },
            Some(submission) => {
                let encoded = submission.encoded();
                location.search = if encoded.is_empty() {
                    String::new()
                } else {
                    format!("?{}", encoded)
                };
                Transition::SubmittingLoader {
                    location,
                    submission,
                }
            }
            None => Transition::Loading {
                location,
                kind: LoadKind::Normal,
            },
        };

        let nav = self.begin();
        self.drive(nav, action, transition, true, false).await
    }

    /// Re-run every matched loader for the current location. History is not touched.
    pub async fn revalidate(&self) -> Result<NavigationOutcome, NavigationError> {
        self.ensure_active()?;

        let current = self.state();
        let nav = self.begin();
        let transition = Transition::Loading {
            location: current.location.clone(),
            kind: LoadKind::Normal,
        };
        self.drive(nav, current.action, transition, false, true).await
    }

    fn ensure_active(&self) -> Result<(), NavigationError> {
        if self.inner.disposed.load(Ordering::SeqCst) {
            return Err(NavigationError::Disposed);
        }
        Ok(())
    }

    /// Pops are forwarded through a channel to a pump task, which starts each
    /// navigation in arrival order.
    fn listen_history(&self) {
        let mut slot = self.inner.unlisten.lock();
        if slot.is_some() {
            return;
        }

        let (tx, rx) = mpsc::unbounded_channel::<Location>();
        let listener = move |action: HistoryAction, location: &Location| {
            if action == HistoryAction::Pop {
                let _ = tx.send(location.clone());
            }
        };
        *slot = Some(self.inner.history.listen(Arc::new(listener)));

        tokio::spawn(pump_pops(Arc::downgrade(&self.inner), rx));
    }

    /// Install a new pending navigation, cancelling the previous one.
    fn begin(&self) -> PendingNavigation {
        let nav = PendingNavigation {
            id: Uuid::new_v4(),
            token: CancellationToken::new(),
        };
        if let Some(previous) = self.inner.pending.lock().replace(nav.clone()) {
            previous.token.cancel();
            metrics::record_superseded();
            tracing::debug!(superseded = %previous.id, by = %nav.id, "Cancelled in-flight navigation");
        }
        nav
    }

    async fn drive(
        &self,
        nav: PendingNavigation,
        action: HistoryAction,
        transition: Transition,
        write_history: bool,
        force: bool,
    ) -> Result<NavigationOutcome, NavigationError> {
        let span = tracing::info_span!("navigation", nav_id = %nav.id);
        let result = self
            .follow(&nav, action, transition, write_history, force)
            .instrument(span)
            .await;
        if result.is_err() {
            self.abandon(&nav);
        }
        result
    }

    async fn follow(
        &self,
        nav: &PendingNavigation,
        mut action: HistoryAction,
        mut transition: Transition,
        mut write_history: bool,
        force: bool,
    ) -> Result<NavigationOutcome, NavigationError> {
        let started = Instant::now();
        let mut redirects = 0;
        metrics::record_navigation_started(action);

        loop {
            let location = match transition.location() {
                Some(location) => location.clone(),
                None => self.state().location.clone(),
            };
            tracing::info!(
                action = %action,
                transition = transition.kind(),
                target = %location.href(),
                "Navigation started"
            );

            let step = self
                .attempt(nav, action, &location, transition.clone(), write_history, force)
                .await?;

            match step {
                Step::Done(state) => {
                    metrics::record_navigation_committed(started);
                    return Ok(NavigationOutcome::Committed(state));
                }
                Step::Cancelled => {
                    tracing::debug!("Navigation superseded; results discarded");
                    return Ok(NavigationOutcome::Superseded);
                }
                Step::Redirect(redirect) => {
                    redirects += 1;
                    let limit = self.inner.settings.max_redirects;
                    if redirects > limit {
                        tracing::error!(limit, location = %redirect.location, "Redirect limit exceeded");
                        return Err(NavigationError::TooManyRedirects { limit });
                    }
                    metrics::record_redirect();

                    // Relative to the location before this navigation started.
                    let origin = self.state().location.clone();
                    let next = origin
                        .resolve(&redirect.location, &self.inner.base)
                        .map_err(|source| {
                            tracing::error!(
                                route_id = %redirect.route_id,
                                location = %redirect.location,
                                error = %source,
                                "Redirect target cannot be followed"
                            );
                            NavigationError::InvalidLocation {
                                target: redirect.location.clone(),
                                source,
                            }
                        })?;
                    tracing::info!(
                        route_id = %redirect.route_id,
                        location = %next.href(),
                        "Following redirect"
                    );

                    transition = transition.redirected(next);
                    action = HistoryAction::Replace;
                    write_history = true;
                }
            }
        }
    }

    async fn attempt(
        &self,
        nav: &PendingNavigation,
        action: HistoryAction,
        location: &Location,
        mut transition: Transition,
        write_history: bool,
        force: bool,
    ) -> Result<Step, NavigationError> {
        let previous = self.state();

        let matches = match match_routes(&self.inner.routes, &location.pathname) {
            Some(matches) => matches,
            None => {
                tracing::info!(pathname = %location.pathname, "No route matches; rendering root boundary");
                let (matches, exceptions) = not_found(&self.inner.routes, location);
                let loader_data =
                    merge_loader_data(&previous.loader_data, &RouteData::new(), &matches);
                return Ok(self.complete(
                    nav,
                    action,
                    location,
                    write_history,
                    Completion {
                        matches,
                        loader_data,
                        action_data: None,
                        exceptions,
                    },
                ));
            }
        };

        let plain_load = matches!(
            transition,
            Transition::Loading {
                kind: LoadKind::Normal,
                ..
            }
        );
        if plain_load && !force && previous.location.is_hash_change_only(location) {
            tracing::debug!(hash = %location.hash, "Hash-only change");
            return Ok(self.complete(
                nav,
                action,
                location,
                write_history,
                Completion {
                    matches,
                    loader_data: previous.loader_data.clone(),
                    action_data: None,
                    exceptions: previous.exceptions.clone(),
                },
            ));
        }

        let mut action_data = None;
        let mut exceptions = Exceptions::new();
        let mut cutoff = matches.len();

        if let Transition::SubmittingAction { submission, .. } = transition.clone() {
            let Some(target) = action_target(&matches, location) else {
                return Err(NavigationError::NoSubmissionTarget {
                    pathname: location.pathname.clone(),
                });
            };
            if target.route.action.is_none() {
                tracing::error!(route_id = %target.route_id(), "Submission target has no action");
                return Err(NavigationError::MissingAction {
                    route_id: target.route_id().to_string(),
                });
            }

            if !self.commit_transition(nav, &previous, transition.clone()) {
                return Ok(Step::Cancelled);
            }

            let url = self.url_for(location)?;
            let request = NavRequest::for_submission(url, &submission);
            let Some(result) = executor::call_action(target, request, &nav.token).await else {
                return Ok(Step::Cancelled);
            };

            if let Some(redirect) = result.redirect_location() {
                return Ok(Step::Redirect(Redirect {
                    route_id: target.route_id().to_string(),
                    location: redirect.to_string(),
                }));
            }
            match result {
                DataResult::Success(value) => {
                    action_data = Some(RouteData::from([(target.route_id().to_string(), value)]));
                }
                DataResult::Exception(error) => {
                    cutoff = boundary_index(&matches, target.route_id());
                    assign_exception(&mut exceptions, &matches, target.route_id(), error);
                }
            }

            transition = Transition::LoadingAction {
                location: location.clone(),
                submission,
            };
        }

        let prev_url = self.url_for(&previous.location)?;
        let url = self.url_for(location)?;
        let ctx = RevalidationContext {
            previous: &previous,
            prev_url: &prev_url,
            url: &url,
            submission: transition.submission(),
            force: force || transition.is_post_submission(),
        };
        let to_load = matches_to_load(&ctx, &matches[..cutoff]);

        if to_load.is_empty() {
            let loader_data =
                merge_loader_data(&previous.loader_data, &RouteData::new(), &matches);
            return Ok(self.complete(
                nav,
                action,
                location,
                write_history,
                Completion {
                    matches,
                    loader_data,
                    action_data,
                    exceptions,
                },
            ));
        }

        if !self.commit_transition(nav, &previous, transition) {
            return Ok(Step::Cancelled);
        }

        let request = NavRequest::get(url);
        let Some(results) = executor::call_loaders(&to_load, &request, &nav.token).await else {
            return Ok(Step::Cancelled);
        };

        if let Some(redirect) = find_redirect(&results) {
            return Ok(Step::Redirect(redirect));
        }

        let mut fresh = RouteData::new();
        for (m, result) in results {
            match result {
                DataResult::Success(value) => {
                    fresh.insert(m.route_id().to_string(), value);
                }
                DataResult::Exception(error) => {
                    assign_exception(&mut exceptions, &matches, m.route_id(), error);
                }
            }
        }

        let loader_data = merge_loader_data(&previous.loader_data, &fresh, &matches);
        Ok(self.complete(
            nav,
            action,
            location,
            write_history,
            Completion {
                matches,
                loader_data,
                action_data,
                exceptions,
            },
        ))
    }

    fn url_for(&self, location: &Location) -> Result<Url, NavigationError> {
        location
            .to_url(&self.inner.base)
            .map_err(|source| NavigationError::InvalidLocation {
                target: location.href(),
                source: source.into(),
            })
    }

    /// Publish an in-flight transition over the previous state.
    fn commit_transition(
        &self,
        nav: &PendingNavigation,
        previous: &RouterState,
        transition: Transition,
    ) -> bool {
        let next = RouterState {
            transition,
            ..previous.clone()
        };
        self.commit(nav, next, false, None).is_some()
    }

    fn complete(
        &self,
        nav: &PendingNavigation,
        action: HistoryAction,
        location: &Location,
        write_history: bool,
        completion: Completion,
    ) -> Step {
        let location = if write_history {
            location.clone().with_new_key()
        } else {
            location.clone()
        };
        let next = RouterState {
            action,
            location,
            matches: completion.matches,
            transition: Transition::Idle,
            loader_data: completion.loader_data,
            action_data: completion.action_data,
            exceptions: completion.exceptions,
        };
        let history_update = write_history.then_some(action);

        match self.commit(nav, next, true, history_update) {
            Some(state) => Step::Done(state),
            None => Step::Cancelled,
        }
    }

    /// Swap in `next` if `nav` is still the active navigation.
    fn commit(
        &self,
        nav: &PendingNavigation,
        next: RouterState,
        finished: bool,
        history_update: Option<HistoryAction>,
    ) -> Option<Arc<RouterState>> {
        let mut pending = self.inner.pending.lock();
        let current = matches!(pending.as_ref(), Some(p) if p.id == nav.id);
        if !current || nav.token.is_cancelled() {
            return None;
        }

        match history_update {
            Some(HistoryAction::Push) => self.inner.history.push(&next.location),
            Some(HistoryAction::Replace) => self.inner.history.replace(&next.location),
            Some(HistoryAction::Pop) | None => {}
        }

        let next = Arc::new(next);
        self.inner.state.store(next.clone());
        if finished {
            *pending = None;
        }
        tracing::debug!(
            pathname = %next.location.pathname,
            transition = next.transition.kind(),
            "State committed"
        );
        // Sent under the lock so subscribers see commits in order.
        let _ = self.inner.notifier.send(next.clone());
        Some(next)
    }

    /// Return to idle after a failed navigation, if it is still current.
    fn abandon(&self, nav: &PendingNavigation) {
        let mut pending = self.inner.pending.lock();
        if !matches!(pending.as_ref(), Some(p) if p.id == nav.id) {
            return;
        }
        *pending = None;

        let state = self.inner.state.load_full();
        if !state.transition.is_idle() {
            let next = Arc::new(RouterState {
                transition: Transition::Idle,
                ..(*state).clone()
            });
            self.inner.state.store(next.clone());
            let _ = self.inner.notifier.send(next);
        }
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.load();
        f.debug_struct("Router")
            .field("location", &state.location.href())
            .field("transition", &state.transition.kind())
            .field("hydrated", &self.inner.hydrated)
            .finish()
    }
}

async fn pump_pops(inner: Weak<RouterInner>, mut rx: mpsc::UnboundedReceiver<Location>) {
    while let Some(location) = rx.recv().await {
        let Some(inner) = inner.upgrade() else {
            break;
        };
        let router = Router { inner };
        if router.ensure_active().is_err() {
            break;
        }

        let nav = router.begin();
        let transition = Transition::Loading {
            location,
            kind: LoadKind::Normal,
        };
        tokio::spawn(async move {
            if let Err(e) = router
                .drive(nav, HistoryAction::Pop, transition, false, false)
                .await
            {
                tracing::warn!(error = %e, "Pop navigation failed");
            }
        });
    }
    tracing::debug!("History listener closed");
}

/// Synthetic root match plus a 404 exception on it.
fn not_found(routes: &RouteTree, location: &Location) -> (Vec<RouteMatch>, Exceptions) {
    let root = RouteMatch::fallback(routes.root().clone());
    let mut exceptions = Exceptions::new();
    exceptions.insert(
        root.route_id().to_string(),
        RouteError::NotFound {
            pathname: location.pathname.clone(),
        },
    );
    (vec![root], exceptions)
}

/// Deepest match, except that a trailing index route yields to its parent
/// unless the URL carries `?index`.
fn action_target<'a>(matches: &'a [RouteMatch], location: &Location) -> Option<&'a RouteMatch> {
    let wants_index = url::form_urlencoded::parse(location.search.trim_start_matches('?').as_bytes())
        .any(|(key, _)| key == "index");

    match matches {
        [.., parent, last] if last.route.index && !wants_index => Some(parent),
        _ => matches.last(),
    }
}
