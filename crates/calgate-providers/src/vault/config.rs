//! Token vault configuration.

use std::fmt;
use std::time::Duration;

use url::Url;

/// Configuration for the token vault client.
#[derive(Clone)]
pub struct VaultConfig {
    /// Base URL of the vault management API.
    pub base_url: Url,

    /// Project identifier presented as the service half of the credential.
    pub project_id: String,

    /// Timeout for the whole exchange round trip.
    pub timeout: Duration,

    /// User agent string.
    pub user_agent: String,
}

impl VaultConfig {
    /// Default vault base URL.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.descope.com";

    /// Path of the latest-token endpoint.
    pub const TOKEN_PATH: &'static str = "/v1/mgmt/outbound/app/user/token/latest";

    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Creates a configuration for `project_id` against `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(
        base_url: impl AsRef<str>,
        project_id: impl Into<String>,
    ) -> Result<Self, url::ParseError> {
        Ok(Self {
            base_url: Url::parse(base_url.as_ref())?,
            project_id: project_id.into(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("calgate/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the full URL of the latest-token endpoint.
    pub fn token_url(&self) -> String {
        format!(
            "{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            Self::TOKEN_PATH
        )
    }

    /// Returns the dual credential `<project>:<inbound token>`.
    pub(crate) fn delegation_credential(&self, inbound_token: &str) -> String {
        format!("{}:{}", self.project_id, inbound_token)
    }
}

impl fmt::Debug for VaultConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultConfig")
            .field("base_url", &self.base_url.as_str())
            .field("project_id", &self.project_id)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_url_joins_without_double_slash() {
        let config = VaultConfig::new("https://api.descope.com/", "P123").unwrap();
        assert_eq!(
            config.token_url(),
            "https://api.descope.com/v1/mgmt/outbound/app/user/token/latest"
        );

        let config = VaultConfig::new("http://127.0.0.1:8080", "P123").unwrap();
        assert_eq!(
            config.token_url(),
            "http://127.0.0.1:8080/v1/mgmt/outbound/app/user/token/latest"
        );
    }

    #[test]
    fn delegation_credential_format() {
        let config = VaultConfig::new(VaultConfig::DEFAULT_BASE_URL, "P123").unwrap();
        assert_eq!(config.delegation_credential("abc"), "P123:abc");
    }

    #[test]
    fn defaults() {
        let config = VaultConfig::new(VaultConfig::DEFAULT_BASE_URL, "P123").unwrap();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("calgate/"));
        assert!(VaultConfig::new("not a url", "P").is_err());
    }

    #[test]
    fn with_timeout() {
        let config = VaultConfig::new(VaultConfig::DEFAULT_BASE_URL, "P")
            .unwrap()
            .with_timeout(Duration::from_secs(5));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}
