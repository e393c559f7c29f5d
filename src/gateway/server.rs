//! Usage: Bind + serve the bootstrap HTTP server and hold the per-request shared state.

use crate::infra::settings::{OAuthSettings, ServerSettings};
use crate::shared::error::{AppError, AppResult, SYSTEM_ERROR};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use super::listen;
use super::oauth::report::TokenReporter;
use super::oauth::token_exchange::build_http_client;
use super::routes::build_router;

/// Cloned into every handler; nothing in here is mutated after startup.
#[derive(Clone)]
pub(crate) struct BootstrapAppState {
    pub(crate) settings: Arc<OAuthSettings>,
    pub(crate) client: reqwest::Client,
    pub(crate) reporter: Arc<dyn TokenReporter>,
}

impl BootstrapAppState {
    pub(crate) fn new(
        settings: OAuthSettings,
        server: &ServerSettings,
        reporter: Arc<dyn TokenReporter>,
    ) -> AppResult<Self> {
        Ok(Self {
            settings: Arc::new(settings),
            client: build_http_client(server.token_timeout)?,
            reporter,
        })
    }
}

pub(crate) async fn bind(host: &str, port: u16) -> AppResult<TcpListener> {
    let bind_addr = listen::format_host_port(host, port);
    TcpListener::bind((host, port)).await.map_err(|e| {
        AppError::new(SYSTEM_ERROR, format!("bind {bind_addr} failed: {e}")).with_source(e)
    })
}

pub(crate) fn local_addr(listener: &TcpListener) -> AppResult<SocketAddr> {
    listener.local_addr().map_err(|e| {
        AppError::new(SYSTEM_ERROR, format!("listener local_addr failed: {e}")).with_source(e)
    })
}

/// Serves until `shutdown` resolves; in-flight requests are allowed to finish.
pub(crate) async fn serve(
    listener: TcpListener,
    state: BootstrapAppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> AppResult<()> {
    let app = build_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| {
            AppError::new(SYSTEM_ERROR, format!("http server error: {e}")).with_source(e)
        })
}

pub(crate) async fn ctrl_c_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("ctrl-c received, shutting down"),
        Err(err) => {
            tracing::error!("failed to listen for ctrl-c: {}", err);
            std::future::pending::<()>().await;
        }
    }
}
