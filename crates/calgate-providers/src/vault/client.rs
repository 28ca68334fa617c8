//! HTTP client for the vault's latest-token endpoint.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use calgate_core::Identity;

use crate::error::{ClientBuildError, ExchangeError};
use crate::provider::{BoxFuture, OutboundToken, TokenExchanger};

use super::config::VaultConfig;

/// Exchanges inbound identities for provider tokens held by the vault.
#[derive(Debug)]
pub struct VaultClient {
    client: Client,
    config: VaultConfig,
}

#[derive(Debug, Deserialize)]
struct LatestTokenResponse {
    token: Option<TokenPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenPayload {
    access_token: Option<String>,
    access_token_expiry: Option<Value>,
}

impl VaultClient {
    /// Creates a client for the given configuration.
    ///
    /// Idle connections are not kept between exchanges.
    pub fn new(config: VaultConfig) -> Result<Self, ClientBuildError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .pool_max_idle_per_host(0)
            .build()?;

        Ok(Self { client, config })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    async fn fetch_latest(
        &self,
        identity: &Identity,
        provider_app_id: &str,
    ) -> Result<OutboundToken, ExchangeError> {
        let url = self.config.token_url();
        debug!(
            subject = identity.subject_id(),
            app = provider_app_id,
            "requesting outbound token"
        );

        let inbound = identity.raw_inbound_token();
        let response = self
            .client
            .post(&url)
            .bearer_auth(self.config.delegation_credential(inbound))
            .json(&json!({
                "appId": provider_app_id,
                "userId": identity.subject_id(),
            }))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ExchangeError::unavailable("request timed out")
                } else if e.is_connect() {
                    ExchangeError::unavailable(format!("connection failed: {e}"))
                } else {
                    ExchangeError::unavailable(format!("request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ExchangeError::unavailable(format!("failed to read response: {e}")))?;

        if status.is_client_error() {
            warn!(
                status = status.as_u16(),
                app = provider_app_id,
                "token exchange denied"
            );
            return Err(ExchangeError::denied(status.as_u16(), &body));
        }

        if !status.is_success() {
            warn!(
                status = status.as_u16(),
                app = provider_app_id,
                "token vault failed"
            );
            let reason = format!("vault returned status {}", status.as_u16());
            return Err(ExchangeError::unavailable(reason));
        }

        parse_token_response(&body, provider_app_id)
    }
}

impl TokenExchanger for VaultClient {
    fn name(&self) -> &str {
        "descope"
    }

    fn exchange<'a>(
        &'a self,
        identity: &'a Identity,
        provider_app_id: &'a str,
    ) -> BoxFuture<'a, Result<OutboundToken, ExchangeError>> {
        Box::pin(self.fetch_latest(identity, provider_app_id))
    }
}

/// Extracts `token.accessToken` (and the optional expiry) from a 2xx body.
fn parse_token_response(body: &str, provider_app_id: &str) -> Result<OutboundToken, ExchangeError> {
    let response: LatestTokenResponse = serde_json::from_str(body)
        .map_err(|e| ExchangeError::malformed(format!("response is not valid JSON: {e}")))?;

    let payload = response
        .token
        .ok_or_else(|| ExchangeError::malformed("missing 'token' object"))?;

    let access_token = payload
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ExchangeError::malformed("missing 'token.accessToken'"))?;

    let token = OutboundToken::new(provider_app_id, access_token);
    Ok(match payload.access_token_expiry.as_ref().and_then(parse_expiry) {
        Some(expires_at) => token.with_expiry(expires_at),
        None => token,
    })
}

/// Parses a unix-seconds expiry given as a number or a numeric string.
fn parse_expiry(value: &Value) -> Option<DateTime<Utc>> {
    let secs = match value {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    if secs <= 0 {
        return None;
    }
    DateTime::from_timestamp(secs, 0)
}
