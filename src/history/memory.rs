//! In-memory history.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::history::{History, HistoryListener, Unlisten};
use crate::navigation::location::Location;
use crate::navigation::state::HistoryAction;

struct Inner {
    entries: Vec<Location>,
    index: usize,
    action: HistoryAction,
    listeners: Vec<(u64, HistoryListener)>,
    next_listener: u64,
}

/// A history stack held in memory. Cloning shares the stack.
#[derive(Clone)]
pub struct MemoryHistory {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryHistory {
    /// History with a single entry at `path`.
    pub fn new(path: &str) -> Self {
        Self::with_entries([path], 0)
    }

    /// History with `paths` as entries, positioned at `index` (clamped).
    pub fn with_entries<'a>(paths: impl IntoIterator<Item = &'a str>, index: usize) -> Self {
        let mut entries: Vec<Location> = paths.into_iter().map(Location::parse).collect();
        if entries.is_empty() {
            entries.push(Location::parse("/"));
        }
        let index = index.min(entries.len() - 1);

        Self {
            inner: Arc::new(Mutex::new(Inner {
                entries,
                index,
                action: HistoryAction::Pop,
                listeners: Vec::new(),
                next_listener: 0,
            })),
        }
    }

    pub fn index(&self) -> usize {
        self.inner.lock().index
    }

    pub fn entries(&self) -> Vec<Location> {
        self.inner.lock().entries.clone()
    }

    pub fn listener_count(&self) -> usize {
        self.inner.lock().listeners.len()
    }
}

impl History for MemoryHistory {
    fn location(&self) -> Location {
        let inner = self.inner.lock();
        inner.entries[inner.index].clone()
    }

    fn action(&self) -> HistoryAction {
        self.inner.lock().action
    }

    fn push(&self, location: &Location) {
        let mut inner = self.inner.lock();
        let next = inner.index + 1;
        inner.entries.truncate(next);
        inner.entries.push(location.clone());
        inner.index = next;
        inner.action = HistoryAction::Push;
    }

    fn replace(&self, location: &Location) {
        let mut inner = self.inner.lock();
        let index = inner.index;
        inner.entries[index] = location.clone();
        inner.action = HistoryAction::Replace;
    }

    fn go(&self, delta: isize) {
        let (location, listeners) = {
            let mut inner = self.inner.lock();
            let last = inner.entries.len() - 1;
            let target = inner
                .index
                .saturating_add_signed(delta)
                .min(last);
            if target == inner.index {
                return;
            }
            inner.index = target;
            inner.action = HistoryAction::Pop;
            let listeners: Vec<HistoryListener> =
                inner.listeners.iter().map(|(_, l)| l.clone()).collect();
            (inner.entries[target].clone(), listeners)
        };

        tracing::debug!(delta, pathname = %location.pathname, "History pop");
        for listener in listeners {
            listener(HistoryAction::Pop, &location);
        }
    }

    fn listen(&self, listener: HistoryListener) -> Unlisten {
        let id = {
            let mut inner = self.inner.lock();
            let id = inner.next_listener;
            inner.next_listener += 1;
            inner.listeners.push((id, listener));
            id
        };

        let inner = Arc::downgrade(&self.inner);
        Unlisten::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner.lock().listeners.retain(|(l, _)| *l != id);
            }
        })
    }
}

impl std::fmt::Debug for MemoryHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("MemoryHistory")
            .field("index", &inner.index)
            .field("entries", &inner.entries.len())
            .field("action", &inner.action)
            .finish()
    }
}
