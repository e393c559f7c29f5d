//! Usage: Command-line options for the bootstrap server.

use crate::infra::settings::{
    timeout_from_seconds, ServerSettings, DEFAULT_HOST, DEFAULT_PORT,
    DEFAULT_TOKEN_TIMEOUT_SECONDS,
};
use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "oauth-bootstrap",
    version,
    about = "Run a one-time OAuth2 authorization code grant and print the refresh token"
)]
pub(crate) struct Cli {
    /// Host to bind the callback server on.
    #[arg(long, env = "HOST", default_value = DEFAULT_HOST)]
    pub(crate) host: String,

    /// Port to bind the callback server on.
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub(crate) port: u16,

    /// Timeout for the token endpoint call in seconds (0 = wait forever).
    #[arg(long, env = "TOKEN_TIMEOUT_SECS", default_value_t = DEFAULT_TOKEN_TIMEOUT_SECONDS)]
    pub(crate) token_timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    #[arg(long, default_value = "info")]
    pub(crate) log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, default_value_t = false)]
    pub(crate) json_logs: bool,
}

impl Cli {
    pub(crate) fn server_settings(&self) -> ServerSettings {
        ServerSettings {
            host: self.host.trim().to_string(),
            port: self.port,
            token_timeout: timeout_from_seconds(self.token_timeout_secs),
        }
    }
}
