//! Router navigation transition engine.
//!
//! Matches URLs against a nested route tree and drives each navigation
//! through loaders, actions, redirects and exception boundaries, keeping
//! exactly one navigation active at a time.

pub mod config;
pub mod history;
pub mod navigation;
pub mod observability;
pub mod routing;

pub use config::schema::RouterSettings;
pub use history::{History, MemoryHistory};
pub use navigation::{NavigateOptions, NavigationError, NavigationOutcome, Router, RouterState};
pub use routing::{Route, RouteTree};
