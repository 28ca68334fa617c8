//! Calendar API configuration.

use std::time::Duration;

use url::Url;

/// Configuration for the downstream calendar invoker.
#[derive(Debug, Clone)]
pub struct CalendarConfig {
    /// Base URL every request path is appended to.
    pub base_url: Url,

    /// Timeout for one downstream call.
    pub timeout: Duration,

    /// User agent string.
    pub user_agent: String,
}

impl CalendarConfig {
    /// Base URL for Google Calendar API v3.
    pub const DEFAULT_BASE_URL: &'static str = "https://www.googleapis.com/calendar/v3";

    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Creates a configuration for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, url::ParseError> {
        Ok(Self {
            base_url: Url::parse(base_url.as_ref())?,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("calgate/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    /// Creates a configuration for the public Google Calendar API.
    pub fn google() -> Result<Self, url::ParseError> {
        Self::new(Self::DEFAULT_BASE_URL)
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the absolute URL for a request path.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }
}
