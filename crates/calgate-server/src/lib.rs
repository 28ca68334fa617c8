//! Gateway assembly: configuration, tool façade and per-request handling.
//!
//! This crate ties the pieces together:
//! - Environment-driven configuration
//! - The four calendar tools and their argument validation
//! - The façade that authorizes, exchanges and invokes for one tool call
//! - The request handler that authenticates and scopes the identity
//!
//! # Example
//!
//! ```rust,no_run
//! use calgate_core::RequestContext;
//! use calgate_protocol::ToolCall;
//! use calgate_server::{GatewayConfig, RequestHandler};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let handler = RequestHandler::from_config(&GatewayConfig::from_env()?)?;
//!
//!     let mut ctx = RequestContext::new();
//!     let call = ToolCall::new("get_upcoming_events").with_argument("max_results", 5);
//!     match handler.handle(&mut ctx, call, Some("Bearer eyJ...")).await {
//!         Ok(response) => println!("{}", response.as_text()),
//!         Err(rejection) => eprintln!("{}: {}", rejection.status_code(), rejection.message),
//!     }
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod facade;
mod handler;
mod tools;

#[cfg(test)]
mod testing;

pub use config::{
    DEFAULT_PROVIDER_APP_ID, ENV_CALENDAR_API_BASE, ENV_JWKS_URL, ENV_PROJECT_ID,
    ENV_PROVIDER_APP_ID, ENV_TIMEOUT_SECS, ENV_TOKEN_AUDIENCE, ENV_TOKEN_ISSUER,
    ENV_VAULT_BASE_URL, GatewayConfig,
};
pub use error::{DispatchError, ServerError, ServerResult};
pub use facade::ToolFacade;
pub use handler::RequestHandler;
pub use tools::{
    DEFAULT_MAX_RESULTS, MAX_RESULTS_RANGE, Operation, SCOPE_READ, SCOPE_SEARCH, SCOPE_WRITE,
    descriptors,
};
