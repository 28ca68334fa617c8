//! Configuration commands.

use calgate_server::{GatewayConfig, RequestHandler};

use crate::error::ClientResult;

/// Print the effective configuration with the project id masked.
pub fn show() -> ClientResult<()> {
    let config = GatewayConfig::from_env()?;
    println!("{}", serde_json::to_string_pretty(&config.redacted())?);
    Ok(())
}

/// Validate the configuration by assembling the gateway from it.
pub fn validate() -> ClientResult<()> {
    let config = GatewayConfig::from_env()?;
    RequestHandler::from_config(&config)?;
    println!("Configuration is valid.");
    Ok(())
}
