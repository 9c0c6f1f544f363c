//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! navigation coordinator / executor produce:
//!     → logging.rs (structured events inside a per-navigation span)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stderr (pretty or JSON fmt layer)
//!     → whatever `metrics` recorder the host installs
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Navigation id flows through every event via the span
//! - The library never installs a metrics recorder; without one the
//!   macros are no-ops

pub mod logging;
pub mod metrics;
