//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = parse_config(
            r#"
            [[routes]]
            id = "root"
            path = "/"
            "#,
        )
        .unwrap();

        assert_eq!(config.router.max_redirects, 20);
        assert_eq!(config.router.base_url, "http://localhost");
        assert_eq!(config.history.entries, vec!["/"]);
        assert_eq!(config.routes.len(), 1);
    }

    #[test]
    fn test_nested_routes_and_script() {
        let config = parse_config(
            r#"
            [[routes]]
            id = "root"
            path = "/"
            error_boundary = true
            loader = { data = { user = "ada" } }

            [[routes.children]]
            id = "user"
            path = "users/:id"
            revalidate = "search_changed"
            loader = { echo = true, delay_ms = 5 }

            [[navigations]]
            to = "/users/42"

            [[navigations]]
            to = "/users/42"
            method = "POST"
            form = { name = "ada" }
            "#,
        )
        .unwrap();

        let user = &config.routes[0].children[0];
        assert_eq!(user.id.as_deref(), Some("user"));
        assert!(user.loader.as_ref().unwrap().echo);
        assert_eq!(config.navigations.len(), 2);
        assert_eq!(config.navigations[1].form["name"], "ada");
    }

    #[test]
    fn test_demo_script_is_valid() {
        let config = parse_config(include_str!("../../demos/todos.toml")).unwrap();
        assert_eq!(config.router.max_redirects, 10);
        assert_eq!(config.routes[0].children.len(), 3);
        assert_eq!(config.navigations.len(), 7);
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("routes = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_error_lists_all() {
        let err = parse_config(
            r#"
            [router]
            max_redirects = 0
            base_url = "not a url"
            "#,
        )
        .unwrap_err();

        match err {
            ConfigError::Validation(errors) => assert_eq!(errors.len(), 3),
            other => panic!("expected validation error, got {other}"),
        }
    }
}
