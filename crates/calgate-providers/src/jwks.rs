//! JWKS-backed inbound token validation.
//!
//! [`JwksValidator`] implements [`TokenValidator`] by verifying JWT
//! signatures against a JSON Web Key Set fetched over HTTP. The key set is
//! cached and refetched when a token names a key id the cache does not know,
//! which covers signing-key rotation. Refetches are spaced at least
//! [`JwksConfig::min_refetch_interval`] apart so that tokens with made-up key
//! ids cannot drive one outbound fetch per inbound request.

use std::fmt;
use std::time::{Duration, Instant};

use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use reqwest::Client;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use url::Url;

use calgate_core::{AuthError, BoxFuture, TokenValidator, ValidatedToken};

use crate::error::ClientBuildError;

/// Configuration for [`JwksValidator`].
#[derive(Debug, Clone)]
pub struct JwksConfig {
    /// URL of the JWK set document.
    pub url: Url,
    /// Accepted signing algorithms.
    pub algorithms: Vec<Algorithm>,
    /// Expected `iss`, if any.
    pub issuer: Option<String>,
    /// Expected `aud`, if any.
    pub audience: Option<String>,
    /// Timeout for fetching the key set.
    pub timeout: Duration,
    /// Minimum time between two fetches of the key set.
    pub min_refetch_interval: Duration,
}

impl JwksConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Default minimum refetch interval in seconds.
    pub const DEFAULT_MIN_REFETCH_SECS: u64 = 30;

    /// Creates a configuration for the given JWKS URL, accepting RS256.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(url: impl AsRef<str>) -> Result<Self, url::ParseError> {
        Ok(Self {
            url: Url::parse(url.as_ref())?,
            algorithms: vec![Algorithm::RS256],
            issuer: None,
            audience: None,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            min_refetch_interval: Duration::from_secs(Self::DEFAULT_MIN_REFETCH_SECS),
        })
    }

    /// Returns the project key set URL under a vault base URL.
    pub fn project_url(base_url: &str, project_id: &str) -> String {
        format!(
            "{}/{}/.well-known/jwks.json",
            base_url.trim_end_matches('/'),
            urlencoding::encode(project_id)
        )
    }

    /// Sets the expected issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Sets the expected audience.
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    /// Sets the fetch timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the minimum time between two key set fetches.
    pub fn with_min_refetch_interval(mut self, interval: Duration) -> Self {
        self.min_refetch_interval = interval;
        self
    }

    fn validation(&self) -> Validation {
        let default_alg = self.algorithms.first().copied().unwrap_or(Algorithm::RS256);
        let mut validation = Validation::new(default_alg);
        validation.algorithms = self.algorithms.clone();
        validation.set_required_spec_claims(&["exp", "sub"]);
        match self.audience {
            Some(ref audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }
        if let Some(ref issuer) = self.issuer {
            validation.set_issuer(&[issuer]);
        }
        validation
    }
}

/// The cached key set and when it was last fetched.
#[derive(Default)]
struct KeyCache {
    set: Option<JwkSet>,
    last_fetch: Option<Instant>,
}

impl KeyCache {
    fn key(&self, kid: Option<&str>) -> Option<Jwk> {
        self.set.as_ref().and_then(|set| select_key(set, kid))
    }

    /// True if a fetch was attempted less than `interval` ago, whatever
    /// its outcome.
    fn fetched_within(&self, interval: Duration) -> bool {
        self.last_fetch.is_some_and(|at| at.elapsed() < interval)
    }
}

/// Validates inbound JWTs against a remote JWK set.
pub struct JwksValidator {
    client: Client,
    config: JwksConfig,
    validation: Validation,
    keys: RwLock<KeyCache>,
}

impl fmt::Debug for JwksValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwksValidator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl JwksValidator {
    /// Creates a validator. The key set is fetched lazily on first use.
    pub fn new(config: JwksConfig) -> Result<Self, ClientBuildError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        let validation = config.validation();
        Ok(Self {
            client,
            config,
            validation,
            keys: RwLock::default(),
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &JwksConfig {
        &self.config
    }

    async fn verify(&self, token: &str) -> Result<ValidatedToken, AuthError> {
        let header = decode_header(token)
            .map_err(|e| AuthError::invalid_token(format!("malformed token header: {e}")))?;

        let jwk = self.signing_key(header.kid.as_deref()).await?;
        let key = DecodingKey::from_jwk(&jwk)
            .map_err(|e| AuthError::invalid_token(format!("unusable signing key: {e}")))?;

        let data = decode::<Map<String, Value>>(token, &key, &self.validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::invalid_token(e.to_string()),
            }
        })?;

        let subject = data
            .claims
            .get("sub")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AuthError::invalid_token("missing subject"))?
            .to_string();

        Ok(ValidatedToken::new(subject, data.claims))
    }

    /// Finds the key for `kid`, refetching the set on a miss unless it was
    /// fetched within the minimum refetch interval.
    async fn signing_key(&self, kid: Option<&str>) -> Result<Jwk, AuthError> {
        if let Some(jwk) = self.keys.read().await.key(kid) {
            return Ok(jwk);
        }

        let mut cache = self.keys.write().await;
        // Another request may have refreshed the set while this one waited.
        if let Some(jwk) = cache.key(kid) {
            return Ok(jwk);
        }

        if cache.fetched_within(self.config.min_refetch_interval) {
            debug!(kid = ?kid, "key set fetched recently, not refetching");
            return Err(match cache.set {
                Some(_) => AuthError::invalid_token("unknown signing key"),
                None => AuthError::unavailable("key set fetch failed recently"),
            });
        }

        debug!(kid = ?kid, "signing key not cached, fetching key set");
        cache.last_fetch = Some(Instant::now());
        let set = self.fetch().await?;
        let jwk = select_key(&set, kid);
        cache.set = Some(set);

        jwk.ok_or_else(|| {
            warn!(kid = ?kid, "no matching signing key");
            AuthError::invalid_token("unknown signing key")
        })
    }

    async fn fetch(&self) -> Result<JwkSet, AuthError> {
        let response = self
            .client
            .get(self.config.url.as_str())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AuthError::unavailable("key set request timed out")
                } else {
                    AuthError::unavailable(format!("key set request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::unavailable(format!(
                "key set endpoint returned status {}",
                status.as_u16()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AuthError::unavailable(format!("failed to read key set: {e}")))?;

        serde_json::from_str(&body)
            .map_err(|e| AuthError::unavailable(format!("invalid key set document: {e}")))
    }
}

impl TokenValidator for JwksValidator {
    fn validate<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<ValidatedToken, AuthError>> {
        Box::pin(self.verify(token))
    }
}

/// Picks the key named by `kid`. Without a `kid` the set must hold exactly
/// one key.
fn select_key(set: &JwkSet, kid: Option<&str>) -> Option<Jwk> {
    match kid {
        Some(kid) => set.find(kid).cloned(),
        None if set.keys.len() == 1 => set.keys.first().cloned(),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwk_set(kids: &[&str]) -> JwkSet {
        let keys: Vec<Value> = kids
            .iter()
            .map(|kid| {
                serde_json::json!({
                    "kty": "RSA",
                    "kid": kid,
                    "alg": "RS256",
                    "use": "sig",
                    "n": "sXchDaQebHnPiGvyDOAT4saGEUetSyo9MKLOoWFsueri23bOdgWp4Dy1WlUzewbgBHod5pcM9H95GQRV3JDXboIRROSBigeC5yjU1hGzHHyXss8UDprecbAYxknTcQkhslANGRUZmdTOQ5qTRsLAt6BTYuyvVRdhS8exSZEy_c4gs_7svlJJQ4H9_NxsiIoLwAEk7-Q3UXERGYw_75IDrGA84-lA_-Ct4eTlXHBIY2EaV7t7LjJaynVJCpkv4LKjTTAumiGUIuQhrNhZLuF_RJLqHpM2kgWFLU7-VTdL1VbC2tejvcI2BlMkEpk1BzBZI0KQB0GaDWFLN-aEAw3vRw",
                    "e": "AQAB",
                })
            })
            .collect();
        serde_json::from_value(serde_json::json!({ "keys": keys })).unwrap()
    }

    #[test]
    fn select_key_by_kid() {
        let set = jwk_set(&["k1", "k2"]);
        let key = select_key(&set, Some("k2")).unwrap();
        assert_eq!(key.common.key_id.as_deref(), Some("k2"));
        assert!(select_key(&set, Some("k3")).is_none());
        assert!(select_key(&set, None).is_none());
    }

    #[test]
    fn select_single_key_without_kid() {
        let set = jwk_set(&["only"]);
        assert!(select_key(&set, None).is_some());
    }

    #[test]
    fn key_cache_fetch_window() {
        let mut cache = KeyCache::default();
        assert!(!cache.fetched_within(Duration::from_secs(30)));

        cache.last_fetch = Some(Instant::now());
        assert!(cache.fetched_within(Duration::from_secs(30)));
        assert!(!cache.fetched_within(Duration::ZERO));
        assert!(cache.key(Some("k1")).is_none());

        cache.set = Some(jwk_set(&["k1"]));
        assert!(cache.key(Some("k1")).is_some());
    }

    #[test]
    fn default_refetch_interval() {
        let config = JwksConfig::new("https://example.com/jwks.json").unwrap();
        assert_eq!(config.min_refetch_interval, Duration::from_secs(30));
        let config = config.with_min_refetch_interval(Duration::from_millis(50));
        assert_eq!(config.min_refetch_interval, Duration::from_millis(50));
    }

    #[test]
    fn project_url() {
        assert_eq!(
            JwksConfig::project_url("https://api.descope.com/", "P2abc"),
            "https://api.descope.com/P2abc/.well-known/jwks.json"
        );
    }

    #[test]
    fn validation_requires_exp_and_sub() {
        let validation = JwksConfig::new("https://example.com/jwks.json")
            .unwrap()
            .validation();
        assert!(validation.required_spec_claims.contains("exp"));
        assert!(validation.required_spec_claims.contains("sub"));
        assert!(!validation.validate_aud);
        assert_eq!(validation.algorithms, vec![Algorithm::RS256]);
    }

    #[test]
    fn validation_with_audience_and_issuer() {
        let validation = JwksConfig::new("https://example.com/jwks.json")
            .unwrap()
            .with_audience("calgate")
            .with_issuer("https://issuer.example.com")
            .validation();
        assert!(validation.validate_aud);
        assert!(validation.aud.as_ref().unwrap().contains("calgate"));
        assert!(
            validation
                .iss
                .as_ref()
                .unwrap()
                .contains("https://issuer.example.com")
        );
    }

    #[tokio::test]
    async fn malformed_token_is_invalid() {
        let validator =
            JwksValidator::new(JwksConfig::new("http://127.0.0.1:1/jwks.json").unwrap()).unwrap();
        assert!(matches!(
            validator.validate("not-a-jwt").await,
            Err(AuthError::InvalidToken { .. })
        ));
    }
}
