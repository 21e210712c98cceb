//! Error types for the WeNet client.
//!
//! # Design
//! HTTP outcomes and decode outcomes are kept apart. `ApiError` carries the
//! status-driven taxonomy (authentication, not found, creation, unexpected)
//! with the raw status code and body for debugging. `DecodeError` covers a
//! body that arrived fine but does not describe the expected entity; it is
//! wrapped into `ApiError::Decode` when it happens inside a remote call.

use thiserror::Error;

/// Errors returned by the component interfaces.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered 401 or 403.
    #[error("authentication failed for {component}: HTTP {status}: {body}")]
    Authentication {
        component: &'static str,
        status: u16,
        body: String,
    },

    /// The server answered 404 for a single-entity lookup.
    #[error("{kind} [{id}] not found: HTTP {status}: {body}")]
    NotFound {
        kind: &'static str,
        id: String,
        status: u16,
        body: String,
    },

    /// A create or update write was rejected.
    #[error("creation failed: HTTP {status}: {body}")]
    Creation { status: u16, body: String },

    /// Any other non-success status.
    #[error("request has returned a code [{status}] with content [{body}]")]
    UnexpectedResponse { status: u16, body: String },

    /// The response body could not be decoded into the expected entity.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The transport could not complete the round trip.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The call was rejected locally before any request was sent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl ApiError {
    /// Status code of the failed response, when the failure came from one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Authentication { status, .. }
            | ApiError::NotFound { status, .. }
            | ApiError::Creation { status, .. }
            | ApiError::UnexpectedResponse { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response body of the failed response, verbatim.
    pub fn body(&self) -> Option<&str> {
        match self {
            ApiError::Authentication { body, .. }
            | ApiError::NotFound { body, .. }
            | ApiError::Creation { body, .. }
            | ApiError::UnexpectedResponse { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Errors raised while mapping a JSON representation onto a domain entity.
///
/// `InvalidType` and `UnknownType` are the type-class failures (the value has
/// the wrong shape, or a discriminator names no known variant). `InvalidValue`
/// is the value-class failure (right shape, unacceptable content such as an
/// unknown enum string or a malformed email address).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("body is not valid JSON: {0}")]
    NotJson(String),

    #[error("{entity}: missing required field [{field}]")]
    MissingField {
        entity: &'static str,
        field: &'static str,
    },

    #[error("{entity}: field [{field}] should be {expected}")]
    InvalidType {
        entity: &'static str,
        field: &'static str,
        expected: &'static str,
    },

    #[error("unexpected type [{value}] of {kind}")]
    UnknownType { kind: &'static str, value: String },

    #[error("[{value}] is not a valid {kind}")]
    InvalidValue { kind: &'static str, value: String },
}

impl DecodeError {
    /// Whether this is a shape failure rather than a content failure.
    pub fn is_type_error(&self) -> bool {
        matches!(
            self,
            DecodeError::InvalidType { .. } | DecodeError::UnknownType { .. } | DecodeError::MissingField { .. }
        )
    }
}

/// Errors raised while loading a component configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration is not valid: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("configuration value [{field}] is not valid: {reason}")]
    Invalid { field: &'static str, reason: String },
}
