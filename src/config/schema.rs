//! Configuration schema definitions.
//!
//! [`RouterSettings`] and [`ObservabilityConfig`] are used by the library;
//! [`AppConfig`] is the document the `transition-router` binary reads.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::navigation::state::HydrationData;
use crate::navigation::submission::FormMethod;

/// Root configuration for the `transition-router` binary.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Router behaviour.
    pub router: RouterSettings,

    /// Logging settings.
    pub observability: ObservabilityConfig,

    /// In-memory history the router starts on.
    pub history: HistoryConfig,

    /// Route declarations (nested via `children` or flat via `parent_id`).
    pub routes: Vec<RouteConfig>,

    /// Optional server-computed snapshot; skips the initial load.
    pub hydration: Option<HydrationData>,

    /// Navigations to run, in order.
    pub navigations: Vec<NavigationStep>,
}

/// Router settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterSettings {
    /// Origin used to build loader/action request URLs.
    pub base_url: String,

    /// Longest redirect chain followed before failing.
    pub max_redirects: usize,

    /// Capacity of the state change broadcast channel.
    pub notify_capacity: usize,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost".to_string(),
            max_redirects: 20,
            notify_capacity: 64,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level or filter directive (`info`, `transition_router=debug`).
    pub log_level: String,

    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

/// In-memory history setup.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub entries: Vec<String>,

    /// Starting entry; defaults to the last one.
    pub index: Option<usize>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            entries: vec!["/".to_string()],
            index: None,
        }
    }
}

/// A declarative route.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RouteConfig {
    pub id: Option<String>,

    /// Path pattern relative to the parent.
    pub path: Option<String>,

    pub index: bool,

    /// Parent id for flat declarations.
    pub parent_id: Option<String>,

    pub error_boundary: bool,

    pub loader: Option<FixtureConfig>,

    pub action: Option<FixtureConfig>,

    /// Revalidation override for same-path navigations.
    pub revalidate: RevalidateMode,

    pub children: Vec<RouteConfig>,
}

/// Which `should_reload` predicate a configured route gets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RevalidateMode {
    /// No predicate: reload on every same-path navigation.
    #[default]
    Default,
    /// Never reload on same-path navigations.
    Never,
    /// Reload only when the search string changed.
    SearchChanged,
}

/// Canned behaviour for a configured loader or action.
///
/// Checked in order: `redirect`, `error`, then `data`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct FixtureConfig {
    /// Value returned on success.
    pub data: Value,

    /// Artificial latency before resolving.
    pub delay_ms: u64,

    /// Redirect target; thrown as a 302 (or `status` when it is 3xx).
    pub redirect: Option<String>,

    /// Status for `redirect` or `error` responses.
    pub status: Option<u16>,

    /// Error message. With `status`, thrown as a response; otherwise as a plain error.
    pub error: Option<String>,

    /// Wrap `data` together with params, URL and form fields.
    pub echo: bool,
}

/// One scripted navigation.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct NavigationStep {
    /// Target location (absolute or relative).
    pub to: Option<String>,

    /// History offset instead of a location.
    pub delta: Option<isize>,

    pub replace: bool,

    /// Submit `form` with this method.
    pub method: Option<FormMethod>,

    pub form: BTreeMap<String, String>,

    /// Revalidate the current location instead of navigating.
    pub revalidate: bool,
}
