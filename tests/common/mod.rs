//! Shared fixtures for navigation integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures_util::future::{ready, Ready};
use serde_json::Value;
use tokio::sync::{broadcast, Notify};

use transition_router::navigation::{HandlerArgs, HandlerResult, Payload, RouterState};
use transition_router::{MemoryHistory, Route, RouteTree, Router, RouterSettings};

/// Router over a fresh in-memory history positioned at `path`.
#[allow(dead_code)]
pub fn router(routes: Vec<Route>, path: &str) -> (Router, MemoryHistory) {
    let history = MemoryHistory::new(path);
    let router = Router::new(
        RouteTree::new(routes).unwrap(),
        Arc::new(history.clone()),
        RouterSettings::default(),
        None,
    )
    .unwrap();
    (router, history)
}

#[allow(dead_code)]
pub fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

#[allow(dead_code)]
pub fn count(calls: &Arc<AtomicUsize>) -> usize {
    calls.load(Ordering::SeqCst)
}

/// Handler that counts its invocations and returns `value`.
#[allow(dead_code)]
pub fn counted(
    calls: &Arc<AtomicUsize>,
    value: Value,
) -> impl Fn(HandlerArgs) -> Ready<HandlerResult> + Send + Sync + 'static {
    let calls = calls.clone();
    move |_| {
        calls.fetch_add(1, Ordering::SeqCst);
        ready(Ok(Payload::Data(value.clone())))
    }
}

/// Lets a test decide when a handler resolves.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct Gate {
    started: Arc<Notify>,
    release: Arc<Notify>,
}

#[allow(dead_code)]
impl Gate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called from inside a handler: announce, then wait for release.
    pub async fn pass(&self) {
        self.started.notify_one();
        self.release.notified().await;
    }

    pub async fn wait_started(&self) {
        self.started.notified().await;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }
}

/// Drain every state already sent to `rx`.
#[allow(dead_code)]
pub fn drain(rx: &mut broadcast::Receiver<Arc<RouterState>>) -> Vec<Arc<RouterState>> {
    let mut states = Vec::new();
    while let Ok(state) = rx.try_recv() {
        states.push(state);
    }
    states
}

/// Wait for the next committed idle state.
#[allow(dead_code)]
pub async fn next_idle(rx: &mut broadcast::Receiver<Arc<RouterState>>) -> Arc<RouterState> {
    loop {
        let state = rx.recv().await.unwrap();
        if state.is_idle() {
            return state;
        }
    }
}
