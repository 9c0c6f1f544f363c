//! Locations and relative target resolution.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

/// Key given to the location a history starts on.
pub const DEFAULT_KEY: &str = "default";

/// Why a target could not become a [`Location`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error(transparent)]
    Parse(#[from] url::ParseError),

    /// Absolute URL on another origin; the router cannot render it.
    #[error("`{0}` is outside the router's origin")]
    CrossOrigin(String),
}

/// A concrete application location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub pathname: String,
    /// Either empty or starting with `?`.
    #[serde(default)]
    pub search: String,
    /// Either empty or starting with `#`.
    #[serde(default)]
    pub hash: String,
    /// Caller state attached to the history entry.
    #[serde(default)]
    pub state: Value,
    #[serde(default = "default_key")]
    pub key: String,
}

fn default_key() -> String {
    DEFAULT_KEY.to_string()
}

impl Location {
    /// Parse an absolute path such as `/users/42?tab=1#bio`.
    pub fn parse(path: &str) -> Self {
        let (rest, hash) = match path.find('#') {
            Some(i) => (&path[..i], &path[i..]),
            None => (path, ""),
        };
        let (pathname, search) = match rest.find('?') {
            Some(i) => (&rest[..i], &rest[i..]),
            None => (rest, ""),
        };
        let pathname = if pathname.starts_with('/') {
            pathname.to_string()
        } else {
            format!("/{}", pathname)
        };

        Self {
            pathname,
            search: normalize(search),
            hash: normalize(hash),
            state: Value::Null,
            key: default_key(),
        }
    }

    pub(crate) fn from_url(url: &Url) -> Self {
        Self {
            pathname: url.path().to_string(),
            search: url.query().map(|q| format!("?{}", q)).unwrap_or_default(),
            hash: url.fragment().map(|f| format!("#{}", f)).unwrap_or_default(),
            state: Value::Null,
            key: default_key(),
        }
    }

    /// Path, search and hash joined.
    pub fn href(&self) -> String {
        format!("{}{}{}", self.pathname, self.search, self.hash)
    }

    /// Absolute URL of this location under `base`.
    pub fn to_url(&self, base: &Url) -> Result<Url, url::ParseError> {
        base.join(&self.href())
    }

    /// Resolve `target` relative to this location with URL semantics.
    ///
    /// Absolute targets must share `base`'s origin.
    pub fn resolve(&self, target: &str, base: &Url) -> Result<Location, LocationError> {
        let current = self.to_url(base)?;
        let next = current.join(target)?;
        if next.origin() != base.origin() {
            return Err(LocationError::CrossOrigin(next.origin().ascii_serialization()));
        }
        Ok(Location::from_url(&next))
    }

    pub fn with_state(mut self, state: Value) -> Self {
        self.state = state;
        self
    }

    /// Fresh history key.
    pub fn with_new_key(mut self) -> Self {
        let mut key = Uuid::new_v4().simple().to_string();
        key.truncate(8);
        self.key = key;
        self
    }

    /// True when `next` differs from `self` only by a non-empty hash.
    pub fn is_hash_change_only(&self, next: &Location) -> bool {
        self.pathname == next.pathname
            && self.search == next.search
            && !next.hash.is_empty()
            && self.hash != next.hash
    }
}

fn normalize(part: &str) -> String {
    if part.len() <= 1 {
        String::new()
    } else {
        part.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://localhost").unwrap()
    }

    #[test]
    fn test_parse() {
        let loc = Location::parse("/users/42?tab=1#bio");
        assert_eq!(loc.pathname, "/users/42");
        assert_eq!(loc.search, "?tab=1");
        assert_eq!(loc.hash, "#bio");
        assert_eq!(loc.href(), "/users/42?tab=1#bio");

        let bare = Location::parse("about?");
        assert_eq!(bare.pathname, "/about");
        assert_eq!(bare.search, "");
    }

    #[test]
    fn test_resolve_relative() {
        let current = Location::parse("/users/42?tab=1");

        let sibling = current.resolve("7", &base()).unwrap();
        assert_eq!(sibling.pathname, "/users/7");
        assert_eq!(sibling.search, "");

        let search_only = current.resolve("?tab=2", &base()).unwrap();
        assert_eq!(search_only.pathname, "/users/42");
        assert_eq!(search_only.search, "?tab=2");

        let absolute = current.resolve("/login", &base()).unwrap();
        assert_eq!(absolute.href(), "/login");

        let up = current.resolve("../posts", &base()).unwrap();
        assert_eq!(up.pathname, "/posts");
    }

    #[test]
    fn test_resolve_rejects_other_origins() {
        let current = Location::parse("/users/42");

        let same = current.resolve("http://localhost/login?next=1", &base()).unwrap();
        assert_eq!(same.href(), "/login?next=1");

        let err = current.resolve("https://example.com/login", &base()).unwrap_err();
        assert_eq!(err, LocationError::CrossOrigin("https://example.com".to_string()));
        assert!(matches!(
            current.resolve("//evil.test/x", &base()),
            Err(LocationError::CrossOrigin(_))
        ));
    }

    #[test]
    fn test_hash_change_only() {
        let a = Location::parse("/docs?x=1");
        assert!(a.is_hash_change_only(&Location::parse("/docs?x=1#intro")));
        assert!(!a.is_hash_change_only(&Location::parse("/docs?x=1")));
        assert!(!a.is_hash_change_only(&Location::parse("/docs?x=2#intro")));
    }

    #[test]
    fn test_new_key() {
        let loc = Location::parse("/").with_new_key();
        assert_eq!(loc.key.len(), 8);
        assert_ne!(loc.key, DEFAULT_KEY);
    }
}
