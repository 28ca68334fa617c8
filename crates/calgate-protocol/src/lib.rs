//! Types exchanged between calgate and the transport layer that hosts it.
//!
//! The transport hands calgate a [`ToolCall`] plus the raw `Authorization`
//! header. It gets back either a [`ToolResponse`] (always a successful
//! envelope, possibly carrying an `Error: ` text) or a [`Rejection`] when the
//! credential could not be authenticated.
//!
//! # Example
//!
//! ```rust
//! use calgate_protocol::{ToolCall, ToolResponse};
//!
//! let call = ToolCall::new("get_upcoming_events").with_argument("max_results", 5);
//! assert_eq!(call.arguments["max_results"], 5);
//!
//! let response = ToolResponse::error("token vault unavailable");
//! assert!(response.as_text().starts_with("Error: "));
//! ```

mod types;

pub use types::{Content, Rejection, ToolCall, ToolDescriptor, ToolResponse};

/// Prefix of every error payload.
pub const ERROR_PREFIX: &str = "Error: ";
