//! Authentication gateway.
//!
//! [`AuthGateway::authenticate`] turns a raw `Authorization` header value into
//! an [`Identity`]. Token verification itself is delegated to a
//! [`TokenValidator`]; the gateway only parses the header and extracts scopes
//! from the validated claims.
//!
//! The gateway does not touch any [`RequestContext`](crate::RequestContext).
//! Attaching the identity is the caller's job, as is deciding whether a
//! request without an `Authorization` header needs authentication at all.

use std::collections::BTreeSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::AuthError;
use crate::identity::Identity;

/// A boxed future for object-safe async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The exact prefix an `Authorization` header must carry.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Name of the claim holding the space-delimited scope list.
pub const SCOPE_CLAIM: &str = "scope";

/// Result of a successful token validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedToken {
    /// The subject identifier.
    pub subject: String,
    /// All claims carried by the token.
    pub claims: Map<String, Value>,
}

impl ValidatedToken {
    /// Creates a validated token from a subject and claims map.
    pub fn new(subject: impl Into<String>, claims: Map<String, Value>) -> Self {
        Self {
            subject: subject.into(),
            claims,
        }
    }
}

/// Verifies inbound bearer tokens.
///
/// Implementations return the token's subject and claims, or one of
/// [`AuthError::InvalidToken`], [`AuthError::ExpiredToken`] or
/// [`AuthError::TokenServiceUnavailable`].
pub trait TokenValidator: Send + Sync {
    /// Validates `token` (already stripped of its `Bearer ` prefix).
    fn validate<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<ValidatedToken, AuthError>>;
}

impl<T: TokenValidator + ?Sized> TokenValidator for Arc<T> {
    fn validate<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<ValidatedToken, AuthError>> {
        (**self).validate(token)
    }
}

/// Validates inbound credentials and produces identities.
#[derive(Clone)]
pub struct AuthGateway {
    validator: Arc<dyn TokenValidator>,
}

impl std::fmt::Debug for AuthGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGateway").finish_non_exhaustive()
    }
}

impl AuthGateway {
    /// Creates a gateway backed by `validator`.
    pub fn new(validator: Arc<dyn TokenValidator>) -> Self {
        Self { validator }
    }

    /// Authenticates a raw `Authorization` header value.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidCredentialFormat`] if the header does not start
    ///   with exactly `Bearer ` or the token after it is empty
    /// - whatever the validator returns for a rejected token
    pub async fn authenticate(&self, raw_header: &str) -> Result<Identity, AuthError> {
        let token = extract_bearer_token(raw_header)?;

        let validated = self.validator.validate(token).await.inspect_err(|e| {
            warn!(kind = %e.kind(), "inbound token rejected");
        })?;

        let scopes = extract_scopes(&validated.claims);
        debug!(
            subject = %validated.subject,
            scopes = scopes.len(),
            "inbound token validated"
        );

        Ok(Identity::new(validated.subject, scopes, token))
    }
}

/// Strips the `Bearer ` prefix from a header value.
///
/// The prefix is matched exactly (case and single space included). Anything
/// else, or an empty token, is an [`AuthError::InvalidCredentialFormat`].
pub fn extract_bearer_token(raw_header: &str) -> Result<&str, AuthError> {
    let token = raw_header
        .strip_prefix(BEARER_PREFIX)
        .ok_or_else(|| AuthError::invalid_format("expected 'Bearer <token>'"))?;

    if token.trim().is_empty() {
        return Err(AuthError::invalid_format("empty bearer token"));
    }

    Ok(token)
}

/// Extracts the granted scopes from a claims map.
///
/// The `scope` claim is normally a space-delimited string. A JSON array of
/// strings is also accepted. A missing claim, an empty claim or any other
/// shape yields an empty set, which can only satisfy an empty requirement.
pub fn extract_scopes(claims: &Map<String, Value>) -> BTreeSet<String> {
    match claims.get(SCOPE_CLAIM) {
        None | Some(Value::Null) => BTreeSet::new(),
        Some(Value::String(scope)) => scope.split_whitespace().map(String::from).collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .flat_map(str::split_whitespace)
            .map(String::from)
            .collect(),
        Some(other) => {
            warn!(claim = %other, "ignoring scope claim with unexpected type");
            BTreeSet::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;

    /// Validator that accepts a fixed token and returns fixed claims.
    struct StaticValidator {
        accept: &'static str,
        claims: Value,
        calls: AtomicUsize,
    }

    impl StaticValidator {
        fn new(accept: &'static str, claims: Value) -> Arc<Self> {
            Arc::new(Self {
                accept,
                claims,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl TokenValidator for StaticValidator {
        fn validate<'a>(
            &'a self,
            token: &'a str,
        ) -> BoxFuture<'a, Result<ValidatedToken, AuthError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                match token {
                    "expired" => Err(AuthError::ExpiredToken),
                    "down" => Err(AuthError::unavailable("connection refused")),
                    t if t == self.accept => {
                        let claims = self.claims.as_object().cloned().unwrap_or_default();
                        Ok(ValidatedToken::new("u1", claims))
                    }
                    _ => Err(AuthError::invalid_token("signature mismatch")),
                }
            })
        }
    }

    #[tokio::test]
    async fn authenticate_builds_identity() {
        let validator =
            StaticValidator::new("abc", json!({"scope": "calendar:read calendar:write"}));
        let gateway = AuthGateway::new(validator.clone());

        let identity = gateway.authenticate("Bearer abc").await.unwrap();
        assert_eq!(identity.subject_id(), "u1");
        assert_eq!(identity.raw_inbound_token(), "abc");
        assert!(identity.has_scope("calendar:read"));
        assert!(identity.has_scope("calendar:write"));
        assert_eq!(validator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn wrong_prefix_never_reaches_validator() {
        let validator = StaticValidator::new("abc", json!({}));
        let gateway = AuthGateway::new(validator.clone());

        for header in [
            "bearer abc",
            "Basic abc",
            "Bearerabc",
            "Token abc",
            "abc",
            "",
        ] {
            let err = gateway.authenticate(header).await.unwrap_err();
            assert!(
                matches!(err, AuthError::InvalidCredentialFormat { .. }),
                "header {header:?} gave {err:?}"
            );
        }
        assert_eq!(validator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_token_is_invalid_format() {
        let gateway = AuthGateway::new(StaticValidator::new("abc", json!({})));
        for header in ["Bearer ", "Bearer    "] {
            assert!(matches!(
                gateway.authenticate(header).await,
                Err(AuthError::InvalidCredentialFormat { .. })
            ));
        }
    }

    #[tokio::test]
    async fn validator_errors_propagate() {
        let gateway = AuthGateway::new(StaticValidator::new("abc", json!({})));
        assert_eq!(
            gateway.authenticate("Bearer expired").await,
            Err(AuthError::ExpiredToken)
        );
        assert!(matches!(
            gateway.authenticate("Bearer down").await,
            Err(AuthError::TokenServiceUnavailable { .. })
        ));
        assert!(matches!(
            gateway.authenticate("Bearer nope").await,
            Err(AuthError::InvalidToken { .. })
        ));
    }

    #[tokio::test]
    async fn missing_scope_claim_yields_empty_set() {
        let gateway = AuthGateway::new(StaticValidator::new("abc", json!({"sub": "u1"})));
        let identity = gateway.authenticate("Bearer abc").await.unwrap();
        assert!(identity.scopes().is_empty());
    }

    #[test]
    fn extract_strips_exactly_seven_characters() {
        assert_eq!(BEARER_PREFIX.len(), 7);
        assert_eq!(extract_bearer_token("Bearer tok123").unwrap(), "tok123");
        assert_eq!(extract_bearer_token("Bearer  tok").unwrap(), " tok");
        assert_eq!(extract_bearer_token("Bearer a b").unwrap(), "a b");
    }

    #[test]
    fn extract_scopes_shapes() {
        let claims = |v: Value| v.as_object().cloned().unwrap();

        let scopes = extract_scopes(&claims(json!({"scope": "  a   b\tc "})));
        assert_eq!(scopes.len(), 3);

        let scopes = extract_scopes(&claims(json!({"scope": ["a", "b", 3]})));
        assert_eq!(scopes.into_iter().collect::<Vec<_>>(), vec!["a", "b"]);

        assert!(extract_scopes(&claims(json!({"scope": ""}))).is_empty());
        assert!(extract_scopes(&claims(json!({"scope": null}))).is_empty());
        assert!(extract_scopes(&claims(json!({"scope": 42}))).is_empty());
        assert!(extract_scopes(&claims(json!({}))).is_empty());
    }
}
