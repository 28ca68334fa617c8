//! Tool invocation.

use serde_json::Value;
use tracing::debug;

use calgate_core::RequestContext;
use calgate_protocol::{ToolCall, ToolResponse};
use calgate_server::{GatewayConfig, RequestHandler};

use crate::error::{ClientError, ClientResult};

/// Invoke `tool` with the JSON object in `args` and print the result.
///
/// A rejection or an error payload ends the run with a failure.
pub async fn run(tool: &str, args: &str, authorization: Option<&str>) -> ClientResult<()> {
    let call = parse_call(tool, args)?;
    let handler = RequestHandler::from_config(&GatewayConfig::from_env()?)?;

    let mut ctx = RequestContext::new();
    let response = handler.handle(&mut ctx, call, authorization).await?;
    debug!(is_error = response.is_error, "tool returned");

    finish(response)
}

/// Builds a tool call from the raw `--args` value.
pub fn parse_call(tool: &str, args: &str) -> ClientResult<ToolCall> {
    let value: Value = serde_json::from_str(args)
        .map_err(|e| ClientError::Arguments(format!("not valid JSON: {e}")))?;

    ToolCall::from_value(tool, value).map_err(|other| {
        ClientError::Arguments(format!("expected a JSON object, got {other}"))
    })
}

fn finish(response: ToolResponse) -> ClientResult<()> {
    if response.is_error {
        return Err(ClientError::ToolFailed(response.as_text().to_string()));
    }
    println!("{}", response.as_text());
    Ok(())
}
