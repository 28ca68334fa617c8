//! Shared axum stub server for the HTTP client tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};

/// A request captured by the stub.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

pub type Requests = Arc<Mutex<Vec<Recorded>>>;

/// Answers every request with a fixed status and body.
#[derive(Clone)]
pub struct Stub {
    status: StatusCode,
    body: String,
    delay: Duration,
    requests: Requests,
}

impl Stub {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.into(),
            delay: Duration::ZERO,
            requests: Arc::default(),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Serves the stub on an ephemeral port and returns its base URL.
    pub async fn start(self) -> (String, Requests) {
        let requests = self.requests.clone();
        let app = Router::new().fallback(record).with_state(self);
        (serve(app).await, requests)
    }
}

async fn record(
    State(stub): State<Stub>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    stub.requests.lock().unwrap().push(Recorded {
        method,
        uri,
        headers,
        body: body.to_vec(),
    });

    if !stub.delay.is_zero() {
        tokio::time::sleep(stub.delay).await;
    }

    (
        stub.status,
        [(header::CONTENT_TYPE, "application/json")],
        stub.body.clone(),
    )
        .into_response()
}

/// Serves `app` on `127.0.0.1:0` and returns `http://127.0.0.1:<port>`.
pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Returns a base URL nothing is listening on.
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
