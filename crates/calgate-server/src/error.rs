//! Server error types.

use thiserror::Error;

use calgate_core::{ErrorKind, MissingIdentity, ScopeError};
use calgate_providers::{ClientBuildError, ExchangeError, InvokeError};

/// Result type for gateway assembly.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors raised while assembling the gateway.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Missing or invalid configuration.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// An HTTP client could not be built.
    #[error(transparent)]
    Client(#[from] ClientBuildError),
}

impl ServerError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// Failures once dispatch of a tool call has started.
///
/// These never reach the transport as errors: the façade renders them into
/// an `Error: ` text payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// No identity in the request context.
    #[error(transparent)]
    MissingIdentity(#[from] MissingIdentity),

    /// The identity lacks a required scope.
    #[error(transparent)]
    Scope(#[from] ScopeError),

    /// An argument failed validation.
    #[error("invalid argument '{field}': {reason}")]
    InvalidArgument { field: String, reason: String },

    /// No operation by that name.
    #[error("unknown operation '{name}'")]
    UnknownOperation { name: String },

    /// The token exchange failed.
    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    /// The downstream call failed.
    #[error(transparent)]
    Invoke(#[from] InvokeError),
}

impl DispatchError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingIdentity(e) => e.kind(),
            Self::Scope(e) => e.kind(),
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::UnknownOperation { .. } => ErrorKind::UnknownOperation,
            Self::Exchange(e) => e.kind(),
            Self::Invoke(e) => e.kind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn kinds_follow_source() {
        assert_eq!(
            DispatchError::from(MissingIdentity).kind(),
            ErrorKind::MissingIdentity
        );
        assert_eq!(
            DispatchError::from(ExchangeError::unavailable("down")).kind(),
            ErrorKind::ExchangeUnavailable
        );
        assert_eq!(
            DispatchError::from(InvokeError::ServerError { status: 500 }).kind(),
            ErrorKind::ProviderServerError
        );
        assert_eq!(
            DispatchError::invalid_argument("query", "must not be empty").kind(),
            ErrorKind::InvalidArgument
        );
    }

    #[test]
    fn display_messages() {
        let err = DispatchError::invalid_argument("start_date", "expected YYYY-MM-DD");
        assert_eq!(
            err.to_string(),
            "invalid argument 'start_date': expected YYYY-MM-DD"
        );

        let missing: BTreeSet<String> = ["calendar:search".to_string()].into();
        let err = DispatchError::from(ScopeError::InsufficientScope { missing });
        assert_eq!(
            err.to_string(),
            "insufficient scope: missing calendar:search"
        );
    }

    #[test]
    fn config_error() {
        let err = ServerError::config("DESCOPE_PROJECT_ID is not set");
        assert_eq!(
            err.to_string(),
            "Configuration error: DESCOPE_PROJECT_ID is not set"
        );
    }
}
