//! Navigation transition engine.
//!
//! # Data Flow
//! ```text
//! Router::navigate(target, options)
//!     → location.rs (resolve target against current location)
//!     → routing::match_routes (404 → synthetic root match)
//!     → [mutating submission] executor::call_action
//!           redirect → redirect loop
//!           exception → boundary.rs, loaders cut off at the boundary
//!     → revalidation.rs (which loaders run)
//!     → executor::call_loaders (concurrent, shared cancellation token)
//!     → redirect.rs (deepest redirect wins → Replace navigation)
//!     → boundary.rs (exceptions → nearest boundary)
//!     → state.rs (merge loader data)
//!     → Router::commit (history write, ArcSwap store, broadcast)
//! ```
//!
//! # Design Decisions
//! - `RouterState` is immutable; every commit swaps a new `Arc`
//! - One cancellation token per navigation; starting a navigation cancels
//!   the previous token before anything else happens
//! - `Transition` is an enum carrying only the fields each phase needs
//! - Loader/action outcomes are a two-variant `DataResult`

pub mod boundary;
pub mod executor;
pub mod location;
pub mod redirect;
pub mod request;
pub mod result;
pub mod revalidation;
pub mod router;
pub mod state;
pub mod submission;
pub mod transition;

pub use location::{Location, LocationError};
pub use request::{HandlerArgs, NavRequest};
pub use result::{DataResult, HandlerResult, HydratedError, Payload, RouteError, RouteResponse};
pub use revalidation::ShouldReloadArgs;
pub use router::{NavigateOptions, NavigationError, NavigationOutcome, NavigationTarget, Router};
pub use state::{HistoryAction, HydrationData, RouteData, RouterState};
pub use submission::{FormMethod, Submission};
pub use transition::{LoadKind, Transition, TransitionState};
