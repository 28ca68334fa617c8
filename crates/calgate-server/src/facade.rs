//! Tool operation façade.
//!
//! [`ToolFacade::dispatch`] runs one tool call for the identity found in the
//! request context:
//!
//! ```text
//! identity ─▶ lookup ─▶ authorize ─▶ build request ─▶ exchange ─▶ invoke ─▶ text
//! ```
//!
//! Every step returns a typed [`DispatchError`]; the chain is flattened to an
//! `Error: ` text payload only in `dispatch`.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use calgate_core::{RequestContext, authorize};
use calgate_protocol::{ToolCall, ToolDescriptor, ToolResponse};
use calgate_providers::{ApiInvoker, TokenExchanger};

use crate::error::DispatchError;
use crate::tools::{Operation, descriptors};

/// Maps tool calls onto the exchange and invoke collaborators.
pub struct ToolFacade {
    exchanger: Arc<dyn TokenExchanger>,
    invoker: Arc<dyn ApiInvoker>,
    provider_app_id: String,
}

impl fmt::Debug for ToolFacade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolFacade")
            .field("exchanger", &self.exchanger.name())
            .field("invoker", &self.invoker.name())
            .field("provider_app_id", &self.provider_app_id)
            .finish()
    }
}

impl ToolFacade {
    /// Creates a façade requesting tokens for `provider_app_id`.
    pub fn new(
        exchanger: Arc<dyn TokenExchanger>,
        invoker: Arc<dyn ApiInvoker>,
        provider_app_id: impl Into<String>,
    ) -> Self {
        Self {
            exchanger,
            invoker,
            provider_app_id: provider_app_id.into(),
        }
    }

    /// Returns the descriptors of every exposed tool.
    pub fn tools(&self) -> Vec<ToolDescriptor> {
        descriptors()
    }

    /// Runs `call` and renders the outcome as a response envelope.
    pub async fn dispatch(&self, ctx: &RequestContext, call: &ToolCall) -> ToolResponse {
        match self.execute(ctx, &call.name, &call.arguments).await {
            Ok(text) => ToolResponse::text(text),
            Err(e) => {
                warn!(tool = %call.name, kind = %e.kind(), error = %e, "tool call failed");
                ToolResponse::error(e)
            }
        }
    }

    /// Runs one tool call and returns the pretty-printed provider response.
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        name: &str,
        args: &Map<String, Value>,
    ) -> Result<String, DispatchError> {
        let identity = ctx.get()?;

        let operation = Operation::from_name(name).ok_or_else(|| DispatchError::UnknownOperation {
            name: name.to_string(),
        })?;

        authorize(identity, &operation.required_scopes())?;

        let request = operation.build_request(args, Utc::now())?;
        info!(
            subject = identity.subject_id(),
            tool = operation.name(),
            "dispatching tool call"
        );

        let token = self
            .exchanger
            .exchange(identity, &self.provider_app_id)
            .await?;
        debug!(
            exchanger = self.exchanger.name(),
            app = token.provider_app_id(),
            "outbound token obtained"
        );

        let response = self.invoker.invoke(token, request).await?;
        debug!(status = response.status, tool = operation.name(), "provider call succeeded");

        Ok(response.to_pretty_text())
    }
}
