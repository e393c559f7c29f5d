#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use oauth_bootstrap_lib::test_support::{spawn_bootstrap_server, BootstrapTestServer};
use tokio::sync::oneshot;

pub const CLIENT_ID: &str = "clientid";
pub const CLIENT_SECRET: &str = "clientsecret";
pub const AUTH_URL: &str = "https://provider.test/oauth/authorize";
pub const REDIRECT_URI: &str = "http://x/cb";
pub const SCOPE: &str = "offline_access read:user";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedTokenRequest {
    pub content_type: Option<String>,
    pub authorization: Option<String>,
    pub body: String,
}

#[derive(Clone)]
struct MockState {
    captured: Arc<Mutex<Vec<CapturedTokenRequest>>>,
    status: StatusCode,
    body: String,
    delay: Option<Duration>,
}

fn header_string(headers: &HeaderMap, name: axum::http::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn token_handler(
    State(state): State<MockState>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    state
        .captured
        .lock()
        .expect("lock captured requests")
        .push(CapturedTokenRequest {
            content_type: header_string(&headers, CONTENT_TYPE),
            authorization: header_string(&headers, AUTHORIZATION),
            body,
        });
    if let Some(delay) = state.delay {
        tokio::time::sleep(delay).await;
    }
    (state.status, state.body.clone())
}

/// Stand-in for the provider's token endpoint.
pub struct MockTokenEndpoint {
    url: String,
    captured: Arc<Mutex<Vec<CapturedTokenRequest>>>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl MockTokenEndpoint {
    pub async fn start(status: StatusCode, body: &str) -> Self {
        Self::start_with_delay(status, body, None).await
    }

    pub async fn start_with_delay(status: StatusCode, body: &str, delay: Option<Duration>) -> Self {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            captured: captured.clone(),
            status,
            body: body.to_string(),
            delay,
        };
        let app = Router::new()
            .route("/oauth/token", post(token_handler))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0))
            .await
            .expect("bind mock token endpoint");
        let addr = listener.local_addr().expect("mock local addr");
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        Self {
            url: format!("http://{addr}/oauth/token"),
            captured,
            shutdown: Some(shutdown_tx),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn requests(&self) -> Vec<CapturedTokenRequest> {
        self.captured.lock().expect("lock captured requests").clone()
    }
}

impl Drop for MockTokenEndpoint {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// A loopback URL nothing listens on (connection refused).
pub async fn unreachable_token_url() -> String {
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0))
        .await
        .expect("bind probe listener");
    let port = listener.local_addr().expect("probe local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}/oauth/token")
}

pub async fn spawn_with_token_url(
    token_url: &str,
    token_timeout: Option<Duration>,
) -> BootstrapTestServer {
    let env = [
        ("CLIENT_ID", CLIENT_ID),
        ("CLIENT_SECRET", CLIENT_SECRET),
        ("AUTH_URL", AUTH_URL),
        ("TOKEN_URL", token_url),
        ("REDIRECT_URI", REDIRECT_URI),
        ("SCOPE", SCOPE),
    ];
    spawn_bootstrap_server(&env, token_timeout)
        .await
        .expect("spawn bootstrap server")
}

pub async fn get(url: &str) -> (StatusCode, String) {
    let response = reqwest::Client::new()
        .get(url)
        .send()
        .await
        .expect("send request");
    let status = StatusCode::from_u16(response.status().as_u16()).expect("status code");
    let body = response.text().await.expect("read body");
    (status, body)
}
