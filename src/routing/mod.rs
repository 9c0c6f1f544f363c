//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Declaration (at startup):
//!     Route[] (nested `children` or flat `parent_id`)
//!     → tree.rs (nest flat entries, assign ids, parse path patterns)
//!     → Freeze as immutable RouteTree
//!
//! Every navigation:
//!     pathname
//!     → matcher.rs (depth-first walk, first satisfying branch wins)
//!     → Return: ordered RouteMatch list (root first) or NoMatch
//! ```
//!
//! # Design Decisions
//! - Routes compiled once, immutable at runtime (shared via Arc)
//! - No regex in the matcher (segment-by-segment comparison)
//! - Deterministic: declaration order decides between siblings
//! - Misconfiguration is rejected when the tree is built, not while matching

pub mod matcher;
pub mod route;
pub mod tree;

pub use matcher::{match_routes, Params, RouteMatch};
pub use route::{Handler, Route, ShouldReload};
pub use tree::{RouteNode, RouteTree, RouteTreeError};
