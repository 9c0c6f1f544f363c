//! Loader/action results.
//!
//! Handlers return [`HandlerResult`]; the executor normalizes every invocation
//! into exactly one [`DataResult`]. Redirects travel as thrown (or returned)
//! 3xx [`RouteResponse`]s carrying a `Location` header.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use http::header::{HeaderMap, HeaderValue, LOCATION};
use http::StatusCode;
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A response produced by a loader or action.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl RouteResponse {
    pub fn new(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body,
        }
    }

    /// `302 Found` to `location`.
    pub fn redirect(location: &str) -> Self {
        Self::redirect_with_status(location, StatusCode::FOUND)
    }

    /// A header value that is not valid leaves the response without `Location`,
    /// which makes it an ordinary (non-redirect) response.
    pub fn redirect_with_status(location: &str, status: StatusCode) -> Self {
        let mut response = Self::new(status, Value::Null);
        match HeaderValue::from_str(location) {
            Ok(value) => {
                response.headers.insert(LOCATION, value);
            }
            Err(e) => {
                tracing::warn!(location = %location, error = %e, "Redirect target is not a valid header value");
            }
        }
        response
    }

    pub fn not_found(body: Value) -> Self {
        Self::new(StatusCode::NOT_FOUND, body)
    }

    pub fn location(&self) -> Option<&str> {
        self.headers.get(LOCATION).and_then(|v| v.to_str().ok())
    }

    /// 3xx with a usable `Location`.
    pub fn is_redirect(&self) -> bool {
        self.status.is_redirection() && self.location().is_some()
    }
}

/// An exception attributed to a route.
#[derive(Debug, Clone, Error)]
pub enum RouteError {
    /// A thrown response (a redirect when 3xx with `Location`).
    #[error("{} response", .0.status)]
    Response(RouteResponse),

    /// Nothing matched the URL.
    #[error("no route matches `{pathname}`")]
    NotFound { pathname: String },

    #[error("{0}")]
    Message(String),

    #[error("{0}")]
    Other(Arc<dyn StdError + Send + Sync>),
}

impl RouteError {
    pub fn message(message: impl Into<String>) -> Self {
        RouteError::Message(message.into())
    }

    pub fn from_error<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        RouteError::Other(Arc::new(error))
    }

    /// HTTP-equivalent status, when the exception has one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RouteError::Response(r) => Some(r.status),
            RouteError::NotFound { .. } => Some(StatusCode::NOT_FOUND),
            RouteError::Message(_) | RouteError::Other(_) => None,
        }
    }

    /// Redirect target if this exception is redirect-shaped.
    pub fn redirect_location(&self) -> Option<&str> {
        match self {
            RouteError::Response(r) if r.is_redirect() => r.location(),
            _ => None,
        }
    }
}

impl From<RouteResponse> for RouteError {
    fn from(response: RouteResponse) -> Self {
        RouteError::Response(response)
    }
}

impl Serialize for RouteError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("RouteError", 3)?;
        match self {
            RouteError::Response(r) => {
                s.serialize_field("kind", "response")?;
                s.serialize_field("status", &r.status.as_u16())?;
                s.serialize_field("data", &r.body)?;
            }
            RouteError::NotFound { pathname } => {
                s.serialize_field("kind", "notFound")?;
                s.serialize_field("status", &404u16)?;
                s.serialize_field("data", pathname)?;
            }
            RouteError::Message(_) | RouteError::Other(_) => {
                s.serialize_field("kind", "error")?;
                s.serialize_field("status", &Option::<u16>::None)?;
                s.serialize_field("data", &self.to_string())?;
            }
        }
        s.end()
    }
}

/// Serialized form of an exception, used to hydrate state computed elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HydratedError {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Value,
}

impl From<HydratedError> for RouteError {
    fn from(e: HydratedError) -> Self {
        match e.status.and_then(|s| StatusCode::from_u16(s).ok()) {
            Some(status) => {
                let body = if e.data.is_null() {
                    Value::String(e.message)
                } else {
                    e.data
                };
                RouteError::Response(RouteResponse::new(status, body))
            }
            None => RouteError::Message(e.message),
        }
    }
}

/// What a handler hands back on success.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Data(Value),
    Response(RouteResponse),
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Data(value)
    }
}

impl From<RouteResponse> for Payload {
    fn from(response: RouteResponse) -> Self {
        Payload::Response(response)
    }
}

/// Return type of loaders and actions.
pub type HandlerResult = Result<Payload, RouteError>;

/// Normalized outcome of one loader or action invocation.
#[derive(Debug, Clone)]
pub enum DataResult {
    Success(Value),
    Exception(RouteError),
}

impl DataResult {
    /// A returned redirect is treated as thrown; any other returned response
    /// contributes its body.
    pub fn from_handler(result: HandlerResult) -> Self {
        match result {
            Ok(Payload::Data(value)) => DataResult::Success(value),
            Ok(Payload::Response(response)) if response.is_redirect() => {
                DataResult::Exception(RouteError::Response(response))
            }
            Ok(Payload::Response(response)) => DataResult::Success(response.body),
            Err(e) => DataResult::Exception(e),
        }
    }

    pub fn is_exception(&self) -> bool {
        matches!(self, DataResult::Exception(_))
    }

    pub fn redirect_location(&self) -> Option<&str> {
        match self {
            DataResult::Exception(e) => e.redirect_location(),
            DataResult::Success(_) => None,
        }
    }

    /// Outcome label for metrics and logs.
    pub fn outcome(&self) -> &'static str {
        match self {
            DataResult::Success(_) => "success",
            DataResult::Exception(e) if e.redirect_location().is_some() => "redirect",
            DataResult::Exception(_) => "exception",
        }
    }
}

impl fmt::Display for DataResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataResult::Success(_) => f.write_str("success"),
            DataResult::Exception(e) => write!(f, "exception: {}", e),
        }
    }
}
