//! HTTP client for the Google Calendar API.

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{ClientBuildError, InvokeError};
use crate::provider::{
    ApiInvoker, ApiRequest, BoxFuture, HttpMethod, OutboundToken, ProviderResponse, ResponseClass,
};

use super::config::CalendarConfig;

/// Performs bearer-authenticated calls against the Calendar API.
#[derive(Debug)]
pub struct CalendarInvoker {
    client: Client,
    config: CalendarConfig,
}

impl CalendarInvoker {
    /// Creates an invoker for the given configuration.
    ///
    /// Idle connections are not kept between calls.
    pub fn new(config: CalendarConfig) -> Result<Self, ClientBuildError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .pool_max_idle_per_host(0)
            .build()?;

        Ok(Self { client, config })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &CalendarConfig {
        &self.config
    }

    async fn send(
        &self,
        token: OutboundToken,
        request: ApiRequest,
    ) -> Result<ProviderResponse, InvokeError> {
        let url = self.config.url_for(&request.path);
        debug!(method = %request.method, path = %request.path, "calling provider API");

        let builder = match request.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => {
                let builder = self
                    .client
                    .post(&url)
                    .header(CONTENT_TYPE, "application/json");
                match request.body {
                    Some(body) => builder.body(body),
                    None => builder,
                }
            }
        };

        let response = builder
            .bearer_auth(token.access_token())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    InvokeError::unreachable("request timed out")
                } else if e.is_connect() {
                    InvokeError::unreachable(format!("connection failed: {e}"))
                } else {
                    InvokeError::unreachable(format!("request failed: {e}"))
                }
            })?;
        drop(token);

        let status = response.status().as_u16();
        match ResponseClass::classify(request.method, status) {
            ResponseClass::Success => {}
            ResponseClass::ClientError => {
                warn!(status, path = %request.path, "provider API rejected request");
                return Err(InvokeError::ClientError { status });
            }
            ResponseClass::ServerError => {
                warn!(status, path = %request.path, "provider API failed");
                return Err(InvokeError::ServerError { status });
            }
        }

        let body = response
            .text()
            .await
            .map_err(|e| InvokeError::unreachable(format!("failed to read response: {e}")))?;

        Ok(ProviderResponse::success(status, parse_body(&body)?))
    }
}

impl ApiInvoker for CalendarInvoker {
    fn name(&self) -> &str {
        "google-calendar"
    }

    fn invoke(
        &self,
        token: OutboundToken,
        request: ApiRequest,
    ) -> BoxFuture<'_, Result<ProviderResponse, InvokeError>> {
        Box::pin(self.send(token, request))
    }
}

/// Parses a success body. An empty body becomes `{}`.
fn parse_body(body: &str) -> Result<Value, InvokeError> {
    if body.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_str(body).map_err(|e| InvokeError::InvalidBody {
        reason: format!("response is not valid JSON: {e}"),
    })
}
