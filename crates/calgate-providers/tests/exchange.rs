//! Token vault client against a stub vault.

mod common;

use std::time::Duration;

use calgate_core::Identity;
use calgate_providers::vault::{VaultClient, VaultConfig};
use calgate_providers::{ExchangeError, TokenExchanger};
use serde_json::json;

use common::{Stub, closed_port_url};

const TOKEN_PATH: &str = "/v1/mgmt/outbound/app/user/token/latest";

fn identity() -> Identity {
    Identity::new("u1", ["calendar:read"], "inbound-tok")
}

fn vault(base_url: &str) -> VaultClient {
    VaultClient::new(VaultConfig::new(base_url, "P123").unwrap()).unwrap()
}

#[tokio::test]
async fn exchange_sends_dual_credential_and_parses_token() {
    let (url, requests) = Stub::new(
        200,
        json!({"token": {"accessToken": "tok123", "accessTokenExpiry": 1700000000}}).to_string(),
    )
    .start()
    .await;

    let token = vault(&url)
        .exchange(&identity(), "google-calendar")
        .await
        .unwrap();

    assert_eq!(token.access_token(), "tok123");
    assert_eq!(token.provider_app_id(), "google-calendar");
    assert_eq!(token.expires_at().unwrap().timestamp(), 1_700_000_000);

    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.uri.path(), TOKEN_PATH);
    assert_eq!(
        request.header("authorization"),
        Some("Bearer P123:inbound-tok")
    );
    assert_eq!(
        request.json(),
        json!({"appId": "google-calendar", "userId": "u1"})
    );
}

#[tokio::test]
async fn client_error_is_denied_without_retry() {
    let (url, requests) = Stub::new(403, r#"{"errorDescription":"app not connected"}"#)
        .start()
        .await;

    let err = vault(&url)
        .exchange(&identity(), "google-calendar")
        .await
        .unwrap_err();

    match err {
        ExchangeError::Denied { status, ref message } => {
            assert_eq!(status, 403);
            assert!(message.contains("app not connected"));
        }
        other => panic!("expected Denied, got {other:?}"),
    }
    assert_eq!(requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn server_error_is_unavailable() {
    let (url, requests) = Stub::new(502, "bad gateway").start().await;

    let err = vault(&url)
        .exchange(&identity(), "google-calendar")
        .await
        .unwrap_err();

    assert!(matches!(err, ExchangeError::Unavailable { .. }), "{err:?}");
    assert_eq!(requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn missing_access_token_is_malformed() {
    let (url, _requests) = Stub::new(200, r#"{"token": {"scopes": []}}"#).start().await;

    let err = vault(&url)
        .exchange(&identity(), "google-calendar")
        .await
        .unwrap_err();

    assert!(
        matches!(err, ExchangeError::MalformedResponse { .. }),
        "{err:?}"
    );
}

#[tokio::test]
async fn unreachable_vault_is_unavailable() {
    let url = closed_port_url().await;

    let err = vault(&url)
        .exchange(&identity(), "google-calendar")
        .await
        .unwrap_err();

    assert!(matches!(err, ExchangeError::Unavailable { .. }), "{err:?}");
}

#[tokio::test]
async fn slow_vault_times_out_as_unavailable() {
    let (url, _requests) = Stub::new(200, r#"{"token": {"accessToken": "late"}}"#)
        .with_delay(Duration::from_secs(5))
        .start()
        .await;

    let config = VaultConfig::new(&url, "P123")
        .unwrap()
        .with_timeout(Duration::from_millis(200));
    let err = VaultClient::new(config)
        .unwrap()
        .exchange(&identity(), "google-calendar")
        .await
        .unwrap_err();

    assert_eq!(err, ExchangeError::unavailable("request timed out"));
}
