//! Client error types.

use thiserror::Error;

use calgate_core::TracingError;
use calgate_protocol::Rejection;
use calgate_server::ServerError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that end a CLI run with a failure status.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Gateway configuration is missing or invalid.
    #[error(transparent)]
    Server(#[from] ServerError),

    /// Logging could not be set up.
    #[error(transparent)]
    Tracing(#[from] TracingError),

    /// The `--args` value is not a JSON object.
    #[error("invalid tool arguments: {0}")]
    Arguments(String),

    /// The request was rejected before dispatch.
    #[error("request rejected ({}): {}", .0.status_code(), .0.message)]
    Rejected(Box<Rejection>),

    /// The tool ran and reported a failure.
    #[error("{0}")]
    ToolFailed(String),

    /// Output could not be rendered.
    #[error("failed to render output: {0}")]
    Render(#[from] serde_json::Error),
}

impl From<Rejection> for ClientError {
    fn from(rejection: Rejection) -> Self {
        Self::Rejected(Box::new(rejection))
    }
}

#[cfg(test)]
mod tests {
    use calgate_core::AuthError;

    use super::*;

    #[test]
    fn rejection_display() {
        let err = ClientError::from(Rejection::from(AuthError::ExpiredToken));
        assert_eq!(err.to_string(), "request rejected (401): token has expired");
    }

    #[test]
    fn tool_failure_keeps_payload() {
        let err = ClientError::ToolFailed("Error: exchange denied".into());
        assert_eq!(err.to_string(), "Error: exchange denied");
    }
}
