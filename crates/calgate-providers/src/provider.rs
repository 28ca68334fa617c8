//! Outbound collaborator traits and the values they exchange.
//!
//! The façade talks to the outside world through two seams:
//!
//! - [`TokenExchanger`] turns a validated [`Identity`] into an
//!   [`OutboundToken`] for one provider app
//! - [`ApiInvoker`] spends that token on exactly one [`ApiRequest`]
//!
//! Both traits return [`BoxFuture`]s so they can be used as trait objects.

use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::Value;

pub use calgate_core::BoxFuture;
use calgate_core::Identity;

use crate::error::{ExchangeError, InvokeError};

/// HTTP method of a downstream request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET, no body.
    Get,
    /// POST with an optional JSON body.
    Post,
}

impl HttpMethod {
    /// Returns the method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }

    /// Returns true if `status` counts as success for this method.
    ///
    /// GET accepts only 200; POST accepts 200 and 201.
    pub fn accepts(&self, status: u16) -> bool {
        match self {
            Self::Get => status == 200,
            Self::Post => status == 200 || status == 201,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A downstream request relative to the provider API base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// Request method.
    pub method: HttpMethod,
    /// Path and query, already percent-encoded, starting with `/`.
    pub path: String,
    /// JSON body for POST requests, sent as-is.
    pub body: Option<String>,
}

impl ApiRequest {
    /// Creates a GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            body: None,
        }
    }

    /// Creates a POST request with a body.
    pub fn post(path: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Post,
            path: path.into(),
            body: Some(body.into()),
        }
    }
}

/// A delegated provider access token.
///
/// Not `Clone`: a token is moved into the single
/// [`ApiInvoker::invoke`] call that consumes it and dropped there.
pub struct OutboundToken {
    provider_app_id: String,
    access_token: String,
    expires_at: Option<DateTime<Utc>>,
}

impl OutboundToken {
    /// Creates a token without expiry information.
    pub fn new(provider_app_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            provider_app_id: provider_app_id.into(),
            access_token: access_token.into(),
            expires_at: None,
        }
    }

    /// Builder method to set the expiry.
    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Returns the provider app this token was minted for.
    pub fn provider_app_id(&self) -> &str {
        &self.provider_app_id
    }

    /// Returns the bearer value for the downstream call.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Returns the expiry reported by the vault, if any.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }
}

impl fmt::Debug for OutboundToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutboundToken")
            .field("provider_app_id", &self.provider_app_id)
            .field("access_token", &"[redacted]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Status classification of a downstream response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    /// Accepted status for the method.
    Success,
    /// 4xx.
    ClientError,
    /// 5xx or any other status the method does not accept.
    ServerError,
}

impl ResponseClass {
    /// Classifies `status` for a request made with `method`.
    pub fn classify(method: HttpMethod, status: u16) -> Self {
        if method.accepts(status) {
            Self::Success
        } else if (400..500).contains(&status) {
            Self::ClientError
        } else {
            Self::ServerError
        }
    }
}

/// A successful downstream response.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResponse {
    /// HTTP status.
    pub status: u16,
    /// Status classification; always [`ResponseClass::Success`] once
    /// returned by an invoker.
    pub class: ResponseClass,
    /// Parsed JSON body.
    pub body: Value,
}

impl ProviderResponse {
    /// Creates a successful response.
    pub fn success(status: u16, body: Value) -> Self {
        Self {
            status,
            class: ResponseClass::Success,
            body,
        }
    }

    /// Renders the body as pretty-printed JSON.
    pub fn to_pretty_text(&self) -> String {
        serde_json::to_string_pretty(&self.body).unwrap_or_else(|_| self.body.to_string())
    }
}

/// Exchanges a validated identity for a provider access token.
pub trait TokenExchanger: Send + Sync {
    /// Returns a short name for logs (e.g., "descope").
    fn name(&self) -> &str;

    /// Performs exactly one exchange round trip.
    ///
    /// # Errors
    ///
    /// - [`ExchangeError::Denied`] when the vault answers 4xx
    /// - [`ExchangeError::Unavailable`] on 5xx, timeout or network failure
    /// - [`ExchangeError::MalformedResponse`] when no access token is present
    fn exchange<'a>(
        &'a self,
        identity: &'a Identity,
        provider_app_id: &'a str,
    ) -> BoxFuture<'a, Result<OutboundToken, ExchangeError>>;
}

/// Performs authenticated calls against the provider API.
pub trait ApiInvoker: Send + Sync {
    /// Returns a short name for logs (e.g., "google-calendar").
    fn name(&self) -> &str;

    /// Performs one downstream call, consuming `token`.
    ///
    /// # Errors
    ///
    /// - [`InvokeError::ClientError`] for 4xx
    /// - [`InvokeError::ServerError`] for 5xx and unaccepted statuses
    /// - [`InvokeError::Unreachable`] on timeout or network failure
    /// - [`InvokeError::InvalidBody`] when a success body is not JSON
    fn invoke(
        &self,
        token: OutboundToken,
        request: ApiRequest,
    ) -> BoxFuture<'_, Result<ProviderResponse, InvokeError>>;
}
