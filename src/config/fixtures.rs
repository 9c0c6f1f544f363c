//! Route declarations built from configuration.
//!
//! Configured loaders and actions are canned fixtures: they wait, then
//! redirect, fail or return data as described by a [`FixtureConfig`].

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use http::StatusCode;
use serde_json::{json, Value};

use crate::config::schema::{FixtureConfig, RevalidateMode, RouteConfig};
use crate::navigation::request::HandlerArgs;
use crate::navigation::result::{HandlerResult, RouteError, RouteResponse};
use crate::routing::Route;

/// Convert configured routes (and their children) into declarations.
pub fn build_routes(configs: &[RouteConfig]) -> Vec<Route> {
    configs.iter().map(build_route).collect()
}

fn build_route(config: &RouteConfig) -> Route {
    let mut route = Route {
        id: config.id.clone(),
        path: config.path.clone(),
        index: config.index,
        parent_id: config.parent_id.clone(),
        error_boundary: config.error_boundary,
        children: build_routes(&config.children),
        ..Route::default()
    };

    if let Some(fixture) = &config.loader {
        let fixture = Arc::new(fixture.clone());
        route = route.loader(move |args| run_fixture(fixture.clone(), args));
    }
    if let Some(fixture) = &config.action {
        let fixture = Arc::new(fixture.clone());
        route = route.action(move |args| run_fixture(fixture.clone(), args));
    }

    match config.revalidate {
        RevalidateMode::Default => route,
        RevalidateMode::Never => route.should_reload(|_| false),
        RevalidateMode::SearchChanged => {
            route.should_reload(|args| args.url.query() != args.prev_url.query())
        }
    }
}

async fn run_fixture(fixture: Arc<FixtureConfig>, args: HandlerArgs) -> HandlerResult {
    if fixture.delay_ms > 0 {
        tokio::select! {
            biased;
            _ = args.signal.cancelled() => return Err(RouteError::message("cancelled")),
            _ = tokio::time::sleep(Duration::from_millis(fixture.delay_ms)) => {}
        }
    }

    let status = fixture.status.and_then(|s| StatusCode::from_u16(s).ok());

    if let Some(location) = &fixture.redirect {
        let status = status
            .filter(StatusCode::is_redirection)
            .unwrap_or(StatusCode::FOUND);
        return Err(RouteResponse::redirect_with_status(location, status).into());
    }

    if let Some(message) = &fixture.error {
        return Err(match status {
            Some(status) => RouteResponse::new(status, Value::String(message.clone())).into(),
            None => RouteError::message(message.clone()),
        });
    }

    if fixture.echo {
        let form: Option<BTreeMap<String, String>> =
            args.request.body.map(|body| body.into_iter().collect());
        return Ok(json!({
            "data": fixture.data,
            "params": args.params,
            "method": args.request.method.as_str(),
            "url": args.request.url.as_str(),
            "form": form,
        })
        .into());
    }

    Ok(fixture.data.clone().into())
}
