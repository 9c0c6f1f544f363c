//! Requests handed to loaders and actions.

use http::Method;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::navigation::submission::{FormData, Submission};
use crate::routing::Params;

/// The request a loader or action receives.
#[derive(Debug, Clone)]
pub struct NavRequest {
    pub method: Method,
    pub url: Url,
    /// Form body, present for action requests only.
    pub body: Option<FormData>,
    pub content_type: Option<String>,
}

impl NavRequest {
    /// Plain `GET` used for every loader call.
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            body: None,
            content_type: None,
        }
    }

    /// Mutating request carrying the submission body.
    pub fn for_submission(url: Url, submission: &Submission) -> Self {
        Self {
            method: submission.form_method.to_http(),
            url,
            body: Some(submission.form_data.clone()),
            content_type: Some(submission.form_enc_type.clone()),
        }
    }

    /// First body value for `name`.
    pub fn form_value(&self, name: &str) -> Option<&str> {
        self.body
            .as_ref()?
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// First query value for `name`.
    pub fn query_value(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }
}

/// Arguments for a single loader or action invocation.
#[derive(Debug, Clone)]
pub struct HandlerArgs {
    pub params: Params,
    pub request: NavRequest,
    /// Cancelled when a newer navigation supersedes this one.
    pub signal: CancellationToken,
}
