//! Usage: Public test helpers for integration tests.

use crate::gateway::oauth::report::{render_banner, TokenReporter};
use crate::gateway::oauth::token_exchange::TokenResponse;
use crate::gateway::server::{self, BootstrapAppState};
use crate::infra::settings::{OAuthSettings, ServerSettings};
use crate::shared::error::AppResult;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;

#[derive(Default)]
struct RecordingTokenReporter {
    banners: Mutex<Vec<String>>,
}

impl RecordingTokenReporter {
    /// Poisoned locks are recovered.
    fn banners(&self) -> MutexGuard<'_, Vec<String>> {
        self.banners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TokenReporter for RecordingTokenReporter {
    fn report(&self, token: &TokenResponse) {
        self.banners().push(render_banner(token));
    }
}

/// Bootstrap server bound on an ephemeral loopback port; shut down on drop.
pub struct BootstrapTestServer {
    base_url: String,
    reporter: Arc<RecordingTokenReporter>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl BootstrapTestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Console banners that would have been printed, in order.
    pub fn reported_banners(&self) -> Vec<String> {
        self.reporter.banners().clone()
    }
}

impl Drop for BootstrapTestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// `env` stands in for the process environment (`CLIENT_ID`, `TOKEN_URL`, ...).
pub async fn spawn_bootstrap_server(
    env: &[(&str, &str)],
    token_timeout: Option<Duration>,
) -> AppResult<BootstrapTestServer> {
    let oauth = OAuthSettings::from_lookup(|key| {
        env.iter()
            .rev()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    });
    let server_settings = ServerSettings {
        host: "127.0.0.1".to_string(),
        port: 0,
        token_timeout,
    };

    let reporter = Arc::new(RecordingTokenReporter::default());
    let state = BootstrapAppState::new(oauth, &server_settings, reporter.clone())?;
    let listener = server::bind(&server_settings.host, server_settings.port).await?;
    let addr = server::local_addr(&listener)?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        let shutdown = async move {
            let _ = shutdown_rx.await;
        };
        if let Err(err) = server::serve(listener, state, shutdown).await {
            tracing::error!("test bootstrap server failed: {}", err);
        }
    });

    Ok(BootstrapTestServer {
        base_url: format!("http://{addr}"),
        reporter,
        shutdown: Some(shutdown_tx),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_reporter_survives_a_poisoned_lock() {
        let reporter = Arc::new(RecordingTokenReporter::default());
        reporter.report(&TokenResponse::default());

        let poisoner = Arc::clone(&reporter);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.banners.lock().expect("lock");
            panic!("poison the banner lock");
        })
        .join();
        assert!(reporter.banners.is_poisoned());

        reporter.report(&TokenResponse::default());
        let banners = reporter.banners();
        assert_eq!(banners.len(), 2);
        assert!(banners[1].contains("ACCESS TOKEN: <missing>"));
    }
}
