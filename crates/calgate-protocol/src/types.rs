//! Tool call, tool response and rejection types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use calgate_core::{AuthError, ErrorKind};

use crate::ERROR_PREFIX;

/// One tool invocation as delivered by the transport layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the operation to run.
    pub name: String,
    /// JSON arguments for the operation.
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl ToolCall {
    /// Creates a call with no arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Map::new(),
        }
    }

    /// Builder method to add an argument.
    pub fn with_argument(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// Creates a call from a JSON arguments value.
    ///
    /// `null` is treated as no arguments. Anything other than an object is
    /// returned unchanged as the error.
    pub fn from_value(name: impl Into<String>, arguments: Value) -> Result<Self, Value> {
        let arguments = match arguments {
            Value::Null => Map::new(),
            Value::Object(map) => map,
            other => return Err(other),
        };
        Ok(Self {
            name: name.into(),
            arguments,
        })
    }
}

/// Describes one exposed operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    /// Tool name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON Schema of the arguments object.
    pub input_schema: Value,
}

/// A single content item of a tool response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Content {
    /// Plain text.
    Text {
        /// The text payload.
        text: String,
    },
}

/// Result envelope of a tool call.
///
/// Failures that happen once dispatch has started are still delivered in a
/// successful envelope: the text starts with `Error: ` and `is_error` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResponse {
    /// Response content; always exactly one text item.
    pub content: Vec<Content>,
    /// Whether the payload describes a failure.
    #[serde(default)]
    pub is_error: bool,
}

impl ToolResponse {
    /// Creates a successful response.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![Content::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// Creates an error response with the `Error: ` prefix applied.
    pub fn error(message: impl std::fmt::Display) -> Self {
        Self {
            content: vec![Content::Text {
                text: format!("{ERROR_PREFIX}{message}"),
            }],
            is_error: true,
        }
    }

    /// Returns the text payload.
    pub fn as_text(&self) -> &str {
        match self.content.first() {
            Some(Content::Text { text }) => text,
            None => "",
        }
    }
}

/// Unauthorized-class rejection produced before dispatch begins.
///
/// Only ever produced by calgate and serialized for the transport; the
/// status travels out of band, so the body alone cannot rebuild it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    /// Short error label, `"Unauthorized"` or `"Service Unavailable"`.
    pub error: String,
    /// Human-readable detail.
    pub message: String,
    /// Stable error code.
    pub kind: String,
    /// When the rejection was produced.
    pub timestamp: DateTime<Utc>,
    /// HTTP status the transport should answer with.
    #[serde(skip)]
    pub status: u16,
}

impl Rejection {
    /// Creates a rejection with the given status and kind.
    pub fn new(status: u16, kind: ErrorKind, message: impl Into<String>) -> Self {
        let error = match status {
            503 => "Service Unavailable",
            _ => "Unauthorized",
        };
        Self {
            error: error.to_string(),
            message: message.into(),
            kind: kind.as_str().to_string(),
            timestamp: Utc::now(),
            status,
        }
    }

    /// Returns the HTTP status code.
    pub fn status_code(&self) -> u16 {
        self.status
    }
}

impl From<AuthError> for Rejection {
    fn from(err: AuthError) -> Self {
        let status = match err {
            AuthError::TokenServiceUnavailable { .. } => 503,
            _ => 401,
        };
        Self::new(status, err.kind(), err.to_string())
    }
}
