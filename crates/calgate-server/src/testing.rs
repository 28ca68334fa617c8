//! Counting collaborators for unit tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::{Map, Value};

use calgate_core::{AuthError, BoxFuture, Identity, TokenValidator, ValidatedToken};
use calgate_providers::{
    ApiInvoker, ApiRequest, ExchangeError, InvokeError, OutboundToken, ProviderResponse,
    TokenExchanger,
};

/// Exchanger returning a fixed token or a fixed error.
pub struct CountingExchanger {
    outcome: Result<String, ExchangeError>,
    calls: AtomicUsize,
    last: Mutex<Option<(String, String)>>,
}

impl CountingExchanger {
    pub fn granting(access_token: &str) -> Self {
        Self::with_outcome(Ok(access_token.to_string()))
    }

    pub fn failing(error: ExchangeError) -> Self {
        Self::with_outcome(Err(error))
    }

    fn with_outcome(outcome: Result<String, ExchangeError>) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Subject and provider app of the latest exchange.
    pub fn last_request(&self) -> Option<(String, String)> {
        self.last.lock().unwrap().clone()
    }
}

impl TokenExchanger for CountingExchanger {
    fn name(&self) -> &str {
        "counting"
    }

    fn exchange<'a>(
        &'a self,
        identity: &'a Identity,
        provider_app_id: &'a str,
    ) -> BoxFuture<'a, Result<OutboundToken, ExchangeError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let subject = identity.subject_id().to_string();
        *self.last.lock().unwrap() = Some((subject, provider_app_id.to_string()));
        let outcome = self
            .outcome
            .clone()
            .map(|token| OutboundToken::new(provider_app_id, token));
        Box::pin(async move { outcome })
    }
}

/// Invoker returning a fixed response and recording every request.
pub struct CountingInvoker {
    outcome: Result<ProviderResponse, InvokeError>,
    requests: Mutex<Vec<(String, ApiRequest)>>,
}

impl CountingInvoker {
    pub fn answering(status: u16, body: Value) -> Self {
        Self {
            outcome: Ok(ProviderResponse::success(status, body)),
            requests: Mutex::default(),
        }
    }

    pub fn failing(error: InvokeError) -> Self {
        Self {
            outcome: Err(error),
            requests: Mutex::default(),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Access token and request of every call so far.
    pub fn requests(&self) -> Vec<(String, ApiRequest)> {
        self.requests.lock().unwrap().clone()
    }
}

impl ApiInvoker for CountingInvoker {
    fn name(&self) -> &str {
        "counting"
    }

    fn invoke(
        &self,
        token: OutboundToken,
        request: ApiRequest,
    ) -> BoxFuture<'_, Result<ProviderResponse, InvokeError>> {
        self.requests
            .lock()
            .unwrap()
            .push((token.access_token().to_string(), request));
        let outcome = self.outcome.clone();
        Box::pin(async move { outcome })
    }
}

/// Validator accepting `Bearer <subject>:<scope,scope>` style tokens.
///
/// `u1:calendar:read,calendar:search` yields subject `u1` with two scopes.
/// `expired` and `down` produce the matching errors; anything without a
/// colon is invalid.
pub struct ScriptedValidator {
    calls: AtomicUsize,
}

impl ScriptedValidator {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TokenValidator for ScriptedValidator {
    fn validate<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<ValidatedToken, AuthError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let outcome = match token {
            "expired" => Err(AuthError::ExpiredToken),
            "down" => Err(AuthError::unavailable("connection refused")),
            _ => match token.split_once(':') {
                Some((subject, scopes)) => {
                    let mut claims = Map::new();
                    claims.insert("sub".into(), Value::from(subject));
                    claims.insert("scope".into(), Value::from(scopes.replace(',', " ")));
                    Ok(ValidatedToken::new(subject, claims))
                }
                None => Err(AuthError::invalid_token("unknown token")),
            },
        };
        Box::pin(async move { outcome })
    }
}
