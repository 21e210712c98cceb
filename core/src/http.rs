//! HTTP transport types and the transport seam.
//!
//! # Design
//! Requests and responses are plain data. The interfaces build `HttpRequest`
//! values and interpret `HttpResponse` values; the actual network I/O lives
//! behind the [`RestClient`] trait, implemented by the host (an API-key or
//! OAuth2 client in production, a scripted fake in tests). Keeping the core on
//! this side of the seam makes every operation deterministic to test.
//!
//! All fields use owned types so a request can be recorded or replayed freely.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::{ApiError, DecodeError};
use crate::query::QueryParams;

/// Header mapping. Ordered so that requests are reproducible.
pub type Headers = BTreeMap<String, String>;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
        }
    }
}

/// An HTTP request described as plain data.
///
/// `query` holds already-rendered parameters; the transport is responsible
/// for percent-encoding them onto the URL.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn get(url: &str, query: QueryParams, headers: &Headers) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.to_string(),
            query: query.into_pairs(),
            headers: header_pairs(headers, false),
            body: None,
        }
    }

    pub fn post(url: &str, body: &Value, headers: &Headers) -> Self {
        Self::with_body(HttpMethod::Post, url, body, headers)
    }

    pub fn put(url: &str, body: &Value, headers: &Headers) -> Self {
        Self::with_body(HttpMethod::Put, url, body, headers)
    }

    fn with_body(method: HttpMethod, url: &str, body: &Value, headers: &Headers) -> Self {
        Self {
            method,
            url: url.to_string(),
            query: Vec::new(),
            headers: header_pairs(headers, true),
            body: Some(body.to_string()),
        }
    }

    /// Look up a query parameter by name.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Look up a header by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Parse the body back into JSON, if there is one.
    pub fn json_body(&self) -> Option<Value> {
        self.body.as_deref().and_then(|b| serde_json::from_str(b).ok())
    }
}

fn header_pairs(headers: &Headers, json_body: bool) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = headers
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    if json_body && !headers.keys().any(|k| k.eq_ignore_ascii_case("content-type")) {
        pairs.push(("content-type".to_string(), "application/json".to_string()));
    }
    pairs
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status
    }

    /// Raw body text.
    pub fn text(&self) -> &str {
        &self.body
    }

    /// Body parsed as JSON.
    pub fn json(&self) -> Result<Value, DecodeError> {
        serde_json::from_str(&self.body).map_err(|e| DecodeError::NotJson(e.to_string()))
    }
}

/// The transport collaborator.
///
/// Implementors execute one request and return whatever the server answered,
/// including 4xx/5xx statuses; only failures to complete the round trip
/// should be reported as `Err`. Implementations must not retry.
pub trait RestClient {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;

    fn get(&self, url: &str, query: QueryParams, headers: &Headers) -> Result<HttpResponse, ApiError> {
        self.execute(HttpRequest::get(url, query, headers))
    }

    fn post(&self, url: &str, body: &Value, headers: &Headers) -> Result<HttpResponse, ApiError> {
        self.execute(HttpRequest::post(url, body, headers))
    }

    fn put(&self, url: &str, body: &Value, headers: &Headers) -> Result<HttpResponse, ApiError> {
        self.execute(HttpRequest::put(url, body, headers))
    }
}

impl<T: RestClient + ?Sized> RestClient for &T {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

impl<T: RestClient + ?Sized> RestClient for Box<T> {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}
