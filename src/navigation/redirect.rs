//! Redirect detection.

use crate::navigation::result::DataResult;
use crate::routing::RouteMatch;

/// A redirect instruction found in a batch of results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub route_id: String,
    pub location: String,
}

/// Scan a fully resolved batch deepest-first; the deepest redirect wins.
pub fn find_redirect(results: &[(RouteMatch, DataResult)]) -> Option<Redirect> {
    results.iter().rev().find_map(|(m, result)| {
        result.redirect_location().map(|location| Redirect {
            route_id: m.route_id().to_string(),
            location: location.to_string(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::result::{RouteError, RouteResponse};
    use crate::routing::{match_routes, Route, RouteTree};
    use serde_json::json;

    #[test]
    fn test_deepest_redirect_wins() {
        let tree = RouteTree::new(vec![Route::new("/")
            .id("root")
            .child(Route::new("a").id("a").child(Route::new("b").id("b")))])
        .unwrap();
        let m = match_routes(&tree, "/a/b").unwrap();

        let results = vec![
            (m[0].clone(), DataResult::Exception(RouteResponse::redirect("/from-root").into())),
            (m[1].clone(), DataResult::Success(json!(1))),
            (m[2].clone(), DataResult::Exception(RouteResponse::redirect("/from-b").into())),
        ];
        let redirect = find_redirect(&results).unwrap();
        assert_eq!(redirect.route_id, "b");
        assert_eq!(redirect.location, "/from-b");
    }

    #[test]
    fn test_plain_exceptions_are_not_redirects() {
        let tree = RouteTree::new(vec![Route::new("/").id("root")]).unwrap();
        let m = match_routes(&tree, "/").unwrap();
        let results = vec![(m[0].clone(), DataResult::Exception(RouteError::message("x")))];
        assert!(find_redirect(&results).is_none());
    }
}
