//! Shared plumbing for the component interfaces.
//!
//! # Design
//! `ComponentClient` holds the transport, the component's base URL and its
//! base headers, all fixed at construction. It carries no mutable state
//! between calls. Each interface operation is a request built here and a
//! response checked by [`check_status`] against the outcome it expects, so
//! the status-to-error mapping lives in one place.

use serde_json::Value;
use tracing::{debug, warn};

use crate::codec::{list_from_repr, Repr};
use crate::error::{ApiError, DecodeError};
use crate::http::{Headers, HttpResponse, RestClient};
use crate::query::QueryParams;

/// What a call expects back, which decides how a failure status is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome<'a> {
    /// A single entity looked up by id; 404 names the entity.
    Fetch { kind: &'static str, id: &'a str },
    /// A listing or other read with no single subject.
    Read,
    /// A create or update write, successful on any of `accepted`.
    Write { accepted: &'static [u16] },
}

/// Transport plus the fixed per-component request context.
#[derive(Debug, Clone)]
pub struct ComponentClient<C> {
    rest: C,
    component: &'static str,
    base_url: String,
    base_headers: Headers,
}

impl<C: RestClient> ComponentClient<C> {
    pub fn new(rest: C, component: &'static str, base_url: &str, base_headers: Headers) -> Self {
        Self {
            rest,
            component,
            base_url: base_url.trim_end_matches('/').to_string(),
            base_headers,
        }
    }

    pub fn component(&self) -> &'static str {
        self.component
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn base_headers(&self) -> &Headers {
        &self.base_headers
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Caller headers merged with the base headers; base headers win.
    pub(crate) fn headers(&self, extra: Option<&Headers>) -> Headers {
        let mut merged = extra.cloned().unwrap_or_default();
        merged.extend(self.base_headers.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }

    pub(crate) fn get(&self, path: &str, query: QueryParams, headers: Option<&Headers>) -> Result<HttpResponse, ApiError> {
        let url = self.url(path);
        debug!(component = self.component, method = "GET", %url, query = ?query, "sending request");
        self.rest.get(&url, query, &self.headers(headers))
    }

    pub(crate) fn post(&self, path: &str, body: &Value, headers: Option<&Headers>) -> Result<HttpResponse, ApiError> {
        let url = self.url(path);
        debug!(component = self.component, method = "POST", %url, "sending request");
        self.rest.post(&url, body, &self.headers(headers))
    }

    pub(crate) fn put(&self, path: &str, body: &Value, headers: Option<&Headers>) -> Result<HttpResponse, ApiError> {
        let url = self.url(path);
        debug!(component = self.component, method = "PUT", %url, "sending request");
        self.rest.put(&url, body, &self.headers(headers))
    }

    pub(crate) fn check(&self, response: HttpResponse, outcome: Outcome<'_>) -> Result<HttpResponse, ApiError> {
        check_status(self.component, response, outcome)
    }
}

/// Map a response status onto the expected outcome, or onto the error it
/// stands for.
pub(crate) fn check_status(
    component: &'static str,
    response: HttpResponse,
    outcome: Outcome<'_>,
) -> Result<HttpResponse, ApiError> {
    let status = response.status;
    let success = match outcome {
        Outcome::Write { accepted } => accepted.contains(&status),
        Outcome::Fetch { .. } | Outcome::Read => status == 200,
    };
    if success {
        return Ok(response);
    }

    warn!(component, status, "request failed");
    let body = response.body;
    Err(match (status, outcome) {
        (401 | 403, _) => ApiError::Authentication {
            component,
            status,
            body,
        },
        (404, Outcome::Fetch { kind, id }) => ApiError::NotFound {
            kind,
            id: id.to_string(),
            status,
            body,
        },
        (_, Outcome::Write { .. }) => ApiError::Creation { status, body },
        _ => ApiError::UnexpectedResponse { status, body },
    })
}

/// Decode a successful response body into an entity.
pub(crate) fn decode<T: Repr>(response: &HttpResponse) -> Result<T, ApiError> {
    Ok(T::from_repr(&response.json()?)?)
}

/// A body that must be a bare JSON list.
pub(crate) fn json_list(response: &HttpResponse, entity: &'static str) -> Result<Vec<Value>, ApiError> {
    match response.json()? {
        Value::Array(items) => Ok(items),
        _ => Err(DecodeError::InvalidType {
            entity,
            field: "<root>",
            expected: "a list",
        }
        .into()),
    }
}

pub(crate) fn decode_list<T: Repr>(response: &HttpResponse, entity: &'static str) -> Result<Vec<T>, ApiError> {
    Ok(list_from_repr(&json_list(response, entity)?)?)
}
