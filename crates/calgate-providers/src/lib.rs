//! Outbound collaborators of the calgate gateway.
//!
//! - [`TokenExchanger`] / [`vault::VaultClient`] - trade a validated identity
//!   for a provider access token held by the token vault
//! - [`ApiInvoker`] / [`google::CalendarInvoker`] - spend that token on one
//!   Calendar API request
//! - [`jwks::JwksValidator`] - verify inbound bearer tokens against the
//!   vault's published signing keys
//!
//! ```text
//!   Identity ──exchange──▶ OutboundToken ──invoke──▶ ProviderResponse
//!              (vault)                    (calendar)
//! ```

pub mod error;
pub mod google;
pub mod jwks;
pub mod provider;
pub mod vault;

pub use error::{ClientBuildError, ExchangeError, InvokeError};
pub use provider::{
    ApiInvoker, ApiRequest, BoxFuture, HttpMethod, OutboundToken, ProviderResponse, ResponseClass,
    TokenExchanger,
};
