//! Error taxonomy shared by every gateway component.
//!
//! Each component boundary returns its own typed error. [`ErrorKind`] is the
//! flat classification used in logs and protocol bodies so that callers can
//! still tell failures apart after they have been rendered to text.

use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

/// The category of a gateway error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The Authorization header is not of the form `Bearer <token>`.
    InvalidCredentialFormat,
    /// No identity is attached to the current request.
    MissingIdentity,
    /// The inbound token failed validation.
    InvalidToken,
    /// The inbound token has expired.
    ExpiredToken,
    /// The token-validation service could not be reached.
    TokenServiceUnavailable,
    /// The identity lacks one or more required scopes.
    InsufficientScope,
    /// The token vault refused the exchange (4xx).
    ExchangeDenied,
    /// The token vault could not be reached or failed (5xx, network).
    ExchangeUnavailable,
    /// The token vault answered without an access token.
    MalformedExchangeResponse,
    /// A tool argument failed validation.
    InvalidArgument,
    /// The requested operation does not exist.
    UnknownOperation,
    /// The provider API rejected the request (4xx).
    ProviderClientError,
    /// The provider API failed (5xx or unexpected status).
    ProviderServerError,
    /// The provider API could not be reached.
    ProviderUnreachable,
    /// The provider API answered with a body that is not JSON.
    InvalidProviderResponse,
}

impl ErrorKind {
    /// Returns a stable snake_case name for this error kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidCredentialFormat => "invalid_credential_format",
            Self::MissingIdentity => "missing_identity",
            Self::InvalidToken => "invalid_token",
            Self::ExpiredToken => "expired_token",
            Self::TokenServiceUnavailable => "token_service_unavailable",
            Self::InsufficientScope => "insufficient_scope",
            Self::ExchangeDenied => "exchange_denied",
            Self::ExchangeUnavailable => "exchange_unavailable",
            Self::MalformedExchangeResponse => "malformed_exchange_response",
            Self::InvalidArgument => "invalid_argument",
            Self::UnknownOperation => "unknown_operation",
            Self::ProviderClientError => "provider_client_error",
            Self::ProviderServerError => "provider_server_error",
            Self::ProviderUnreachable => "provider_unreachable",
            Self::InvalidProviderResponse => "invalid_provider_response",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors produced while authenticating an inbound credential.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The header did not match `Bearer <token>`, or the token was empty.
    #[error("invalid credential format: {reason}")]
    InvalidCredentialFormat { reason: String },

    /// The token was rejected by the validation service.
    #[error("invalid token: {reason}")]
    InvalidToken { reason: String },

    /// The token is past its expiry.
    #[error("token has expired")]
    ExpiredToken,

    /// The validation service could not be consulted.
    #[error("token service unavailable: {reason}")]
    TokenServiceUnavailable { reason: String },
}

impl AuthError {
    /// Creates an invalid credential format error.
    pub fn invalid_format(reason: impl Into<String>) -> Self {
        Self::InvalidCredentialFormat {
            reason: reason.into(),
        }
    }

    /// Creates an invalid token error.
    pub fn invalid_token(reason: impl Into<String>) -> Self {
        Self::InvalidToken {
            reason: reason.into(),
        }
    }

    /// Creates a token service unavailable error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::TokenServiceUnavailable {
            reason: reason.into(),
        }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidCredentialFormat { .. } => ErrorKind::InvalidCredentialFormat,
            Self::InvalidToken { .. } => ErrorKind::InvalidToken,
            Self::ExpiredToken => ErrorKind::ExpiredToken,
            Self::TokenServiceUnavailable { .. } => ErrorKind::TokenServiceUnavailable,
        }
    }
}

/// The identity does not carry every scope an operation requires.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error("insufficient scope: missing {}", join(.missing))]
    InsufficientScope { missing: BTreeSet<String> },
}

impl ScopeError {
    /// Returns the scopes that were required but not granted.
    pub fn missing(&self) -> &BTreeSet<String> {
        match self {
            Self::InsufficientScope { missing } => missing,
        }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InsufficientScope
    }
}

/// No identity has been attached to the request context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no authenticated identity for this request")]
pub struct MissingIdentity;

impl MissingIdentity {
    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::MissingIdentity
    }
}

fn join(scopes: &BTreeSet<String>) -> String {
    scopes
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
