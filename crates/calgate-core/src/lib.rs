//! Core types for the calgate credential-exchange gateway.
//!
//! - [`Identity`] and [`RequestContext`] - who is calling, carried per request
//! - [`AuthGateway`] - turns an `Authorization` header into an [`Identity`]
//! - [`ScopeRequirement`] and [`authorize`] - scope checks
//! - [`ErrorKind`] - the shared error taxonomy
//!
//! # Request flow
//!
//! ```text
//! Authorization header
//!        │
//!        ▼ AuthGateway::authenticate()
//!    Identity ──► RequestContext::enter() ──► facade dispatch
//!                                                 │
//!                                                 ▼ authorize()
//!                                            exchange ─► invoke
//! ```

pub mod auth;
pub mod error;
pub mod identity;
pub mod scope;
pub mod tracing;

pub use auth::{
    AuthGateway, BEARER_PREFIX, BoxFuture, TokenValidator, ValidatedToken, extract_bearer_token,
    extract_scopes,
};
pub use error::{AuthError, ErrorKind, MissingIdentity, ScopeError};
pub use identity::{ContextScope, Identity, RequestContext};
pub use scope::{ScopeRequirement, authorize};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
