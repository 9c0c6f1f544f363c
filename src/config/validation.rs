//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the route declarations compile into a tree
//! - Validate value ranges (redirect limit, channel capacity, statuses)
//! - Check every scripted navigation says exactly one thing to do
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use http::StatusCode;
use thiserror::Error;
use url::Url;

use crate::config::fixtures::build_routes;
use crate::config::schema::{AppConfig, FixtureConfig, RouteConfig};
use crate::routing::{RouteTree, RouteTreeError};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("router.base_url `{0}` is not an absolute URL")]
    InvalidBaseUrl(String),

    #[error("router.max_redirects must be greater than 0")]
    ZeroRedirectLimit,

    #[error("router.notify_capacity must be greater than 0")]
    ZeroNotifyCapacity,

    #[error("history.entries must not be empty")]
    EmptyHistory,

    #[error("history.index {index} is out of range for {len} entries")]
    HistoryIndexOutOfRange { index: usize, len: usize },

    #[error("at least one route must be declared")]
    NoRoutes,

    #[error("invalid route tree: {0}")]
    RouteTree(#[from] RouteTreeError),

    #[error("route `{route}`: status {status} is not a valid HTTP status")]
    InvalidStatus { route: String, status: u16 },

    #[error("route `{route}`: redirect status {status} is not 3xx")]
    RedirectStatusNot3xx { route: String, status: u16 },

    #[error("navigation #{step}: set exactly one of `to`, `delta` or `revalidate`")]
    AmbiguousStep { step: usize },

    #[error("navigation #{step}: `method` requires `to`")]
    SubmissionWithoutTarget { step: usize },
}

/// Validate the full configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.router.base_url) {
        Ok(url) if !url.cannot_be_a_base() => {}
        _ => errors.push(ValidationError::InvalidBaseUrl(config.router.base_url.clone())),
    }
    if config.router.max_redirects == 0 {
        errors.push(ValidationError::ZeroRedirectLimit);
    }
    if config.router.notify_capacity == 0 {
        errors.push(ValidationError::ZeroNotifyCapacity);
    }

    let len = config.history.entries.len();
    if len == 0 {
        errors.push(ValidationError::EmptyHistory);
    } else if let Some(index) = config.history.index.filter(|i| *i >= len) {
        errors.push(ValidationError::HistoryIndexOutOfRange { index, len });
    }

    if config.routes.is_empty() {
        errors.push(ValidationError::NoRoutes);
    } else {
        if let Err(e) = RouteTree::new(build_routes(&config.routes)) {
            errors.push(e.into());
        }
        for (i, route) in config.routes.iter().enumerate() {
            check_route(route, &i.to_string(), &mut errors);
        }
    }

    for (i, step) in config.navigations.iter().enumerate() {
        let step_no = i + 1;
        let targets = [step.to.is_some(), step.delta.is_some(), step.revalidate];
        if targets.iter().filter(|set| **set).count() != 1 {
            errors.push(ValidationError::AmbiguousStep { step: step_no });
        }
        if step.method.is_some() && step.to.is_none() {
            errors.push(ValidationError::SubmissionWithoutTarget { step: step_no });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_route(route: &RouteConfig, position: &str, errors: &mut Vec<ValidationError>) {
    let name = route.id.clone().unwrap_or_else(|| position.to_string());
    for fixture in [&route.loader, &route.action].into_iter().flatten() {
        check_fixture(fixture, &name, errors);
    }
    for (i, child) in route.children.iter().enumerate() {
        check_route(child, &format!("{}-{}", position, i), errors);
    }
}

fn check_fixture(fixture: &FixtureConfig, route: &str, errors: &mut Vec<ValidationError>) {
    let Some(status) = fixture.status else {
        return;
    };
    match StatusCode::from_u16(status) {
        Err(_) => errors.push(ValidationError::InvalidStatus {
            route: route.to_string(),
            status,
        }),
        Ok(code) if fixture.redirect.is_some() && !code.is_redirection() => {
            errors.push(ValidationError::RedirectStatusNot3xx {
                route: route.to_string(),
                status,
            })
        }
        Ok(_) => {}
    }
}
