//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, route tree compiles)
//!     → AppConfig (validated, immutable)
//!     → fixtures.rs (RouteConfig → Route declarations)
//!     → RouterSettings handed to navigation::Router
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod fixtures;
pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{AppConfig, ObservabilityConfig, RouteConfig, RouterSettings};
