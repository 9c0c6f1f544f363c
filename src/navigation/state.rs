//! Router state snapshots.
//!
//! A [`RouterState`] is never patched in place: the coordinator builds a new
//! value and swaps it in wholesale.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::navigation::location::Location;
use crate::navigation::result::{HydratedError, RouteError};
use crate::navigation::transition::Transition;
use crate::routing::RouteMatch;

/// Route id → data.
pub type RouteData = BTreeMap<String, Value>;

/// Route id → exception.
pub type Exceptions = BTreeMap<String, RouteError>;

/// How the current location was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HistoryAction {
    Push,
    Replace,
    Pop,
}

impl HistoryAction {
    pub fn as_str(self) -> &'static str {
        match self {
            HistoryAction::Push => "PUSH",
            HistoryAction::Replace => "REPLACE",
            HistoryAction::Pop => "POP",
        }
    }
}

impl fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable snapshot of the router.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterState {
    pub action: HistoryAction,
    pub location: Location,
    /// Root first. Never empty.
    pub matches: Vec<RouteMatch>,
    pub transition: Transition,
    pub loader_data: RouteData,
    pub action_data: Option<RouteData>,
    pub exceptions: Exceptions,
}

impl RouterState {
    pub fn loader_data(&self, route_id: &str) -> Option<&Value> {
        self.loader_data.get(route_id)
    }

    pub fn action_data(&self, route_id: &str) -> Option<&Value> {
        self.action_data.as_ref()?.get(route_id)
    }

    pub fn exception(&self, route_id: &str) -> Option<&RouteError> {
        self.exceptions.get(route_id)
    }

    pub fn match_ids(&self) -> Vec<&str> {
        self.matches.iter().map(|m| m.route_id()).collect()
    }

    pub fn is_idle(&self) -> bool {
        self.transition.is_idle()
    }
}

/// Server-computed data used to seed the initial state without running loaders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HydrationData {
    pub loader_data: RouteData,
    pub action_data: Option<RouteData>,
    pub exceptions: BTreeMap<String, HydratedError>,
}

impl HydrationData {
    pub fn exceptions(&self) -> Exceptions {
        self.exceptions
            .iter()
            .map(|(id, e)| (id.clone(), RouteError::from(e.clone())))
            .collect()
    }
}

/// Union of fresh results and previous values for routes that stay matched.
pub fn merge_loader_data(
    previous: &RouteData,
    fresh: &RouteData,
    matches: &[RouteMatch],
) -> RouteData {
    matches
        .iter()
        .filter_map(|m| {
            let id = m.route_id();
            fresh
                .get(id)
                .or_else(|| previous.get(id))
                .map(|value| (id.to_string(), value.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{match_routes, Route, RouteTree};
    use serde_json::json;

    fn matches(path: &str) -> Vec<RouteMatch> {
        let tree = RouteTree::new(vec![Route::new("/").id("root").children([
            Route::new("a").id("a").child(Route::new("b").id("b")),
            Route::new("c").id("c"),
        ])])
        .unwrap();
        match_routes(&tree, path).unwrap()
    }

    #[test]
    fn test_merge_carries_over_and_drops_unmatched() {
        let previous: RouteData = [
            ("root".to_string(), json!("r0")),
            ("c".to_string(), json!("c0")),
        ]
        .into();
        let fresh: RouteData = [("a".to_string(), json!("a1"))].into();

        let merged = merge_loader_data(&previous, &fresh, &matches("/a"));
        assert_eq!(merged.get("root"), Some(&json!("r0")));
        assert_eq!(merged.get("a"), Some(&json!("a1")));
        assert!(!merged.contains_key("c"));
    }

    #[test]
    fn test_merge_keeps_descendants_of_failed_route() {
        let previous: RouteData = [
            ("root".to_string(), json!("r0")),
            ("b".to_string(), json!("b0")),
        ]
        .into();
        let fresh: RouteData = [("root".to_string(), json!("r1"))].into();

        // `a` failed this time: it has neither a fresh nor a previous value.
        let merged = merge_loader_data(&previous, &fresh, &matches("/a/b"));
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get("root"), Some(&json!("r1")));
        assert_eq!(merged.get("b"), Some(&json!("b0")));
    }

    #[test]
    fn test_hydration_deserializes() {
        let data: HydrationData = serde_json::from_value(json!({
            "loaderData": {"root": {"user": "ada"}},
            "exceptions": {"root": {"status": 500, "message": "down"}}
        }))
        .unwrap();
        assert_eq!(data.loader_data["root"]["user"], "ada");
        assert!(data.action_data.is_none());
        assert_eq!(data.exceptions()["root"].status().map(|s| s.as_u16()), Some(500));
    }
}
