//! Per-request handling.
//!
//! [`RequestHandler::handle`] is the entry point the transport layer calls
//! once per inbound tool invocation. It authenticates the `Authorization`
//! header, attaches the identity to the caller's [`RequestContext`] for the
//! duration of the request, runs the façade in a child task that owns a
//! forked copy of the context, and clears the context on the way out.

use std::sync::Arc;

use tracing::{debug, info, warn};

use calgate_core::{AuthGateway, RequestContext};
use calgate_protocol::{Rejection, ToolCall, ToolDescriptor, ToolResponse};
use calgate_providers::google::CalendarInvoker;
use calgate_providers::jwks::JwksValidator;
use calgate_providers::vault::VaultClient;

use crate::config::GatewayConfig;
use crate::error::ServerResult;
use crate::facade::ToolFacade;

/// Authenticates and dispatches tool calls.
#[derive(Debug, Clone)]
pub struct RequestHandler {
    gateway: AuthGateway,
    facade: Arc<ToolFacade>,
}

impl RequestHandler {
    /// Creates a handler from its two halves.
    pub fn new(gateway: AuthGateway, facade: Arc<ToolFacade>) -> Self {
        Self { gateway, facade }
    }

    /// Wires the JWKS validator, vault client and calendar invoker from
    /// `config`.
    pub fn from_config(config: &GatewayConfig) -> ServerResult<Self> {
        let validator = JwksValidator::new(config.jwks_config()?)?;
        let exchanger = VaultClient::new(config.vault_config()?)?;
        let invoker = CalendarInvoker::new(config.calendar_config()?)?;

        let facade = ToolFacade::new(
            Arc::new(exchanger),
            Arc::new(invoker),
            config.provider_app_id.clone(),
        );
        Ok(Self::new(AuthGateway::new(Arc::new(validator)), Arc::new(facade)))
    }

    /// Returns the descriptors of every exposed tool.
    ///
    /// Listing tools needs no identity.
    pub fn tools(&self) -> Vec<ToolDescriptor> {
        self.facade.tools()
    }

    /// Handles one tool invocation.
    ///
    /// A missing or blank `authorization` skips authentication; the façade
    /// then reports the missing identity in the response text. A header that
    /// fails authentication is rejected before dispatch.
    ///
    /// `ctx` is empty when this returns, whatever the outcome.
    #[tracing::instrument(skip_all, fields(tool = %call.name))]
    pub async fn handle(
        &self,
        ctx: &mut RequestContext,
        call: ToolCall,
        authorization: Option<&str>,
    ) -> Result<ToolResponse, Rejection> {
        ctx.clear();

        let identity = match authorization.filter(|h| !h.trim().is_empty()) {
            Some(header) => Some(self.gateway.authenticate(header).await.map_err(|e| {
                warn!(kind = %e.kind(), "rejecting request");
                Rejection::from(e)
            })?),
            None => {
                debug!("no authorization header, dispatching without identity");
                None
            }
        };

        let scope = ctx.enter(identity);
        let child = scope.fork();
        let facade = Arc::clone(&self.facade);

        let task = tokio::spawn(async move { facade.dispatch(&child, &call).await });
        let response = match task.await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "tool task did not complete");
                ToolResponse::error(format!("tool execution failed: {e}"))
            }
        };

        info!(is_error = response.is_error, "tool call handled");
        Ok(response)
    }
}
