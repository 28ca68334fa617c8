//! Gateway configuration.
//!
//! Values come from environment variables. [`GatewayConfig::from_lookup`]
//! takes the lookup as a function so tests never touch the process
//! environment.

use std::time::Duration;

use serde_json::{Value, json};

use calgate_providers::google::CalendarConfig;
use calgate_providers::jwks::JwksConfig;
use calgate_providers::vault::VaultConfig;

use crate::error::{ServerError, ServerResult};

/// Vault project identifier (required).
pub const ENV_PROJECT_ID: &str = "DESCOPE_PROJECT_ID";
/// Vault base URL.
pub const ENV_VAULT_BASE_URL: &str = "DESCOPE_BASE_URL";
/// Outbound provider app identifier.
pub const ENV_PROVIDER_APP_ID: &str = "CALGATE_PROVIDER_APP_ID";
/// Calendar API base URL.
pub const ENV_CALENDAR_API_BASE: &str = "CALGATE_CALENDAR_API_BASE";
/// Outbound request timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "CALGATE_TIMEOUT_SECS";
/// JWKS URL override.
pub const ENV_JWKS_URL: &str = "CALGATE_JWKS_URL";
/// Expected inbound token issuer.
pub const ENV_TOKEN_ISSUER: &str = "CALGATE_TOKEN_ISSUER";
/// Expected inbound token audience.
pub const ENV_TOKEN_AUDIENCE: &str = "CALGATE_TOKEN_AUDIENCE";

/// Default outbound provider app identifier.
pub const DEFAULT_PROVIDER_APP_ID: &str = "google-calendar";

/// Gateway configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Vault project identifier.
    pub project_id: String,

    /// Vault base URL.
    pub vault_base_url: String,

    /// Provider app whose tokens are requested from the vault.
    pub provider_app_id: String,

    /// Calendar API base URL.
    pub calendar_api_base: String,

    /// Timeout applied to every outbound round trip.
    pub timeout: Duration,

    /// JWKS URL; derived from the vault base URL and project when unset.
    pub jwks_url: Option<String>,

    /// Expected inbound token issuer.
    pub token_issuer: Option<String>,

    /// Expected inbound token audience.
    pub token_audience: Option<String>,
}

impl GatewayConfig {
    /// Creates a configuration for `project_id` with all defaults.
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            vault_base_url: VaultConfig::DEFAULT_BASE_URL.to_string(),
            provider_app_id: DEFAULT_PROVIDER_APP_ID.to_string(),
            calendar_api_base: CalendarConfig::DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(VaultConfig::DEFAULT_TIMEOUT_SECS),
            jwks_url: None,
            token_issuer: None,
            token_audience: None,
        }
    }

    /// Reads the configuration from the process environment.
    pub fn from_env() -> ServerResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// Blank values count as unset.
    ///
    /// # Errors
    ///
    /// Fails if the project id is missing or the timeout is not a positive
    /// integer.
    pub fn from_lookup<F>(lookup: F) -> ServerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let project_id = get(ENV_PROJECT_ID)
            .ok_or_else(|| ServerError::config(format!("{ENV_PROJECT_ID} is not set")))?;

        let mut config = Self::new(project_id);

        if let Some(url) = get(ENV_VAULT_BASE_URL) {
            config.vault_base_url = url;
        }
        if let Some(app) = get(ENV_PROVIDER_APP_ID) {
            config.provider_app_id = app;
        }
        if let Some(url) = get(ENV_CALENDAR_API_BASE) {
            config.calendar_api_base = url;
        }
        if let Some(secs) = get(ENV_TIMEOUT_SECS) {
            config.timeout = parse_timeout(&secs)?;
        }
        config.jwks_url = get(ENV_JWKS_URL);
        config.token_issuer = get(ENV_TOKEN_ISSUER);
        config.token_audience = get(ENV_TOKEN_AUDIENCE);

        Ok(config)
    }

    /// Builder: set the vault base URL.
    pub fn with_vault_base_url(mut self, url: impl Into<String>) -> Self {
        self.vault_base_url = url.into();
        self
    }

    /// Builder: set the provider app identifier.
    pub fn with_provider_app_id(mut self, app_id: impl Into<String>) -> Self {
        self.provider_app_id = app_id.into();
        self
    }

    /// Builder: set the calendar API base URL.
    pub fn with_calendar_api_base(mut self, url: impl Into<String>) -> Self {
        self.calendar_api_base = url.into();
        self
    }

    /// Builder: set the outbound timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder: set the JWKS URL.
    pub fn with_jwks_url(mut self, url: impl Into<String>) -> Self {
        self.jwks_url = Some(url.into());
        self
    }

    /// Returns the effective JWKS URL.
    pub fn effective_jwks_url(&self) -> String {
        match self.jwks_url {
            Some(ref url) => url.clone(),
            None => JwksConfig::project_url(&self.vault_base_url, &self.project_id),
        }
    }

    /// Builds the vault client configuration.
    pub fn vault_config(&self) -> ServerResult<VaultConfig> {
        let config = VaultConfig::new(&self.vault_base_url, &self.project_id).map_err(|e| {
            ServerError::config(format!(
                "invalid {ENV_VAULT_BASE_URL} '{}': {e}",
                self.vault_base_url
            ))
        })?;
        Ok(config.with_timeout(self.timeout))
    }

    /// Builds the calendar invoker configuration.
    pub fn calendar_config(&self) -> ServerResult<CalendarConfig> {
        let config = CalendarConfig::new(&self.calendar_api_base).map_err(|e| {
            ServerError::config(format!(
                "invalid {ENV_CALENDAR_API_BASE} '{}': {e}",
                self.calendar_api_base
            ))
        })?;
        Ok(config.with_timeout(self.timeout))
    }

    /// Builds the JWKS validator configuration.
    pub fn jwks_config(&self) -> ServerResult<JwksConfig> {
        let url = self.effective_jwks_url();
        let mut config = JwksConfig::new(&url)
            .map_err(|e| ServerError::config(format!("invalid JWKS URL '{url}': {e}")))?
            .with_timeout(self.timeout);
        if let Some(ref issuer) = self.token_issuer {
            config = config.with_issuer(issuer);
        }
        if let Some(ref audience) = self.token_audience {
            config = config.with_audience(audience);
        }
        Ok(config)
    }

    /// Renders the configuration for display with the project id masked.
    pub fn redacted(&self) -> Value {
        json!({
            "project_id": mask(&self.project_id),
            "vault_base_url": self.vault_base_url,
            "provider_app_id": self.provider_app_id,
            "calendar_api_base": self.calendar_api_base,
            "timeout_secs": self.timeout.as_secs(),
            "jwks_url": self.effective_jwks_url(),
            "token_issuer": self.token_issuer,
            "token_audience": self.token_audience,
        })
    }
}

fn parse_timeout(raw: &str) -> ServerResult<Duration> {
    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ServerError::config(format!(
            "{ENV_TIMEOUT_SECS} must be a positive integer, got '{raw}'"
        ))),
    }
}

fn mask(value: &str) -> String {
    let visible: String = value.chars().take(4).collect();
    if visible.len() == value.len() {
        return "****".to_string();
    }
    format!("{visible}****")
}
