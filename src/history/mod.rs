//! History adapters.
//!
//! # Data Flow
//! ```text
//! Router::navigate (Push/Replace)
//!     → History::push / History::replace   (no notification)
//!
//! History::go(delta)
//!     → listeners(Pop, location)
//!     → router pump task
//!     → Router::navigate as a Pop navigation
//! ```
//!
//! # Design Decisions
//! - The router only talks to the `History` trait; storage is the adapter's concern
//! - Listeners are called synchronously and must not block
//! - `listen` returns a guard; dropping it unsubscribes

pub mod memory;

use std::sync::Arc;

use crate::navigation::location::Location;
use crate::navigation::state::HistoryAction;

pub use memory::MemoryHistory;

/// Called with the action and the new current location on history-originated changes.
pub type HistoryListener = Arc<dyn Fn(HistoryAction, &Location) + Send + Sync>;

/// Session history consumed by the router.
pub trait History: Send + Sync {
    /// Current location.
    fn location(&self) -> Location;

    /// Action that produced the current location.
    fn action(&self) -> HistoryAction;

    fn push(&self, location: &Location);

    fn replace(&self, location: &Location);

    /// Travel `delta` entries; listeners observe the result as a Pop.
    fn go(&self, delta: isize);

    fn listen(&self, listener: HistoryListener) -> Unlisten;
}

/// Subscription guard returned by [`History::listen`].
pub struct Unlisten(Option<Box<dyn FnOnce() + Send>>);

impl Unlisten {
    pub fn new(f: impl FnOnce() + Send + 'static) -> Self {
        Self(Some(Box::new(f)))
    }

    /// Unsubscribe now.
    pub fn unlisten(mut self) {
        if let Some(f) = self.0.take() {
            f();
        }
    }
}

impl Drop for Unlisten {
    fn drop(&mut self) {
        if let Some(f) = self.0.take() {
            f();
        }
    }
}

impl std::fmt::Debug for Unlisten {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Unlisten")
            .field("active", &self.0.is_some())
            .finish()
    }
}
