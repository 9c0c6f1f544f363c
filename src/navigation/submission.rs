//! Form submissions.

use std::fmt;
use std::str::FromStr;

use http::Method;
use serde::{Deserialize, Serialize};

/// Encoding used when none is given.
pub const URL_ENCODED: &str = "application/x-www-form-urlencoded";

/// Ordered form fields; names may repeat.
pub type FormData = Vec<(String, String)>;

/// Submission method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FormMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl FormMethod {
    /// Everything except GET goes through an action.
    pub fn is_mutating(self) -> bool {
        !matches!(self, FormMethod::Get)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FormMethod::Get => "GET",
            FormMethod::Post => "POST",
            FormMethod::Put => "PUT",
            FormMethod::Patch => "PATCH",
            FormMethod::Delete => "DELETE",
        }
    }

    pub fn to_http(self) -> Method {
        match self {
            FormMethod::Get => Method::GET,
            FormMethod::Post => Method::POST,
            FormMethod::Put => Method::PUT,
            FormMethod::Patch => Method::PATCH,
            FormMethod::Delete => Method::DELETE,
        }
    }
}

impl fmt::Display for FormMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(FormMethod::Get),
            "POST" => Ok(FormMethod::Post),
            "PUT" => Ok(FormMethod::Put),
            "PATCH" => Ok(FormMethod::Patch),
            "DELETE" => Ok(FormMethod::Delete),
            other => Err(format!("unsupported form method `{}`", other)),
        }
    }
}

/// A pending form submission. Lives for one navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub form_method: FormMethod,
    pub form_enc_type: String,
    pub form_data: FormData,
}

impl Submission {
    pub fn new<K, V>(form_method: FormMethod, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            form_method,
            form_enc_type: URL_ENCODED.to_string(),
            form_data: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(FormMethod::Get, fields)
    }

    pub fn post<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(FormMethod::Post, fields)
    }

    pub fn is_mutating(&self) -> bool {
        self.form_method.is_mutating()
    }

    /// First value for `name`.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.form_data
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// `application/x-www-form-urlencoded` body, also used as the search of GET submissions.
    pub fn encoded(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.form_data.iter())
            .finish()
    }
}
