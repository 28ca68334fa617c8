//! Error types for the outbound collaborators.
//!
//! [`ExchangeError`] covers the token vault round trip, [`InvokeError`] the
//! downstream calendar call. Both map onto the shared
//! [`ErrorKind`](calgate_core::ErrorKind) taxonomy through `kind()`.

use calgate_core::ErrorKind;
use thiserror::Error;

/// Longest slice of an error body kept in an error message.
const MAX_BODY_IN_ERROR: usize = 200;

/// Errors from exchanging an identity for an outbound provider token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExchangeError {
    /// The vault answered 4xx.
    #[error("token exchange denied (status {status}): {message}")]
    Denied { status: u16, message: String },

    /// The vault answered 5xx, timed out or could not be reached.
    #[error("token exchange unavailable: {reason}")]
    Unavailable { reason: String },

    /// The vault answered 2xx without a usable access token.
    #[error("malformed token exchange response: {reason}")]
    MalformedResponse { reason: String },
}

impl ExchangeError {
    /// Creates a denied error, truncating the response body.
    pub fn denied(status: u16, body: &str) -> Self {
        Self::Denied {
            status,
            message: truncate(body),
        }
    }

    /// Creates an unavailable error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Creates a malformed response error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
        }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Denied { .. } => ErrorKind::ExchangeDenied,
            Self::Unavailable { .. } => ErrorKind::ExchangeUnavailable,
            Self::MalformedResponse { .. } => ErrorKind::MalformedExchangeResponse,
        }
    }
}

/// Errors from calling the downstream provider API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvokeError {
    /// The API answered 4xx.
    #[error("provider API error (status {status})")]
    ClientError { status: u16 },

    /// The API answered 5xx or a status the request does not accept.
    #[error("provider API error (status {status})")]
    ServerError { status: u16 },

    /// The API could not be reached or timed out.
    #[error("provider API unreachable: {reason}")]
    Unreachable { reason: String },

    /// The API answered with a success status but the body is not JSON.
    #[error("invalid provider response: {reason}")]
    InvalidBody { reason: String },
}

impl InvokeError {
    /// Creates an unreachable error.
    pub fn unreachable(reason: impl Into<String>) -> Self {
        Self::Unreachable {
            reason: reason.into(),
        }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ClientError { .. } => ErrorKind::ProviderClientError,
            Self::ServerError { .. } => ErrorKind::ProviderServerError,
            Self::Unreachable { .. } => ErrorKind::ProviderUnreachable,
            Self::InvalidBody { .. } => ErrorKind::InvalidProviderResponse,
        }
    }
}

/// Failure to construct an HTTP client.
#[derive(Debug, Error)]
#[error("failed to build HTTP client: {0}")]
pub struct ClientBuildError(#[from] reqwest::Error);

fn truncate(body: &str) -> String {
    let body = body.trim();
    if body.len() <= MAX_BODY_IN_ERROR {
        return body.to_string();
    }
    let mut end = MAX_BODY_IN_ERROR;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
