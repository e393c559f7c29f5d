mod app;
mod gateway;
mod infra;
mod shared;
pub mod test_support;

use app::cli::Cli;
use clap::Parser;
use gateway::oauth::report::ConsoleTokenReporter;
use gateway::{listen, server};
use infra::settings::{self, OAuthSettings};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

const ENV_FILE_VAR: &str = "ENV_FILE";

pub async fn run() -> ExitCode {
    // Env files must be loaded before clap reads its env fallbacks.
    let env_file = std::env::var_os(ENV_FILE_VAR).map(PathBuf::from);
    let env_file_result = settings::load_env_file(env_file.as_deref());

    let cli = Cli::parse();
    app::logging::init(&cli.log_level, cli.json_logs);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "oauth-bootstrap starting");
    match env_file_result {
        Ok(Some(path)) => tracing::info!(path = %path.display(), "loaded env file"),
        Ok(None) => tracing::debug!("no .env file found; using process environment"),
        Err(err) => {
            tracing::error!(code = err.code(), "{}", err.message());
            return ExitCode::FAILURE;
        }
    }

    let oauth = OAuthSettings::from_env();
    for key in oauth.missing_keys() {
        tracing::warn!(key, "oauth setting is empty; the login flow will not work");
    }
    tracing::debug!(settings = ?oauth, "oauth settings loaded");

    let server_settings = cli.server_settings();
    let state = match server::BootstrapAppState::new(
        oauth,
        &server_settings,
        Arc::new(ConsoleTokenReporter),
    ) {
        Ok(state) => state,
        Err(err) => {
            tracing::error!(code = err.code(), "{}", err.message());
            return ExitCode::FAILURE;
        }
    };

    let listener = match server::bind(&server_settings.host, server_settings.port).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(code = err.code(), "{}", err.message());
            return ExitCode::FAILURE;
        }
    };

    let base_url = listen::display_base_url(&server_settings.host, server_settings.port);
    tracing::info!(
        listen_addr = %listen::format_host_port(&server_settings.host, server_settings.port),
        token_timeout_secs = server_settings.token_timeout.map(|d| d.as_secs()),
        "http server listening"
    );
    tracing::info!("OAuth bootstrap server running at {base_url}");
    tracing::info!("Open {base_url}/login to start OAuth login");

    match server::serve(listener, state, server::ctrl_c_signal()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(code = err.code(), "{}", err.message());
            ExitCode::FAILURE
        }
    }
}
