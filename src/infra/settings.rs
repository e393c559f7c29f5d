//! Usage: Immutable process settings (OAuth client values from env, server options from CLI).

use crate::shared::error::{AppError, AppResult, CONFIG_ERROR};
use crate::shared::security::mask_token;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_TOKEN_TIMEOUT_SECONDS: u64 = 0;

pub(crate) const ENV_CLIENT_ID: &str = "CLIENT_ID";
pub(crate) const ENV_CLIENT_SECRET: &str = "CLIENT_SECRET";
pub(crate) const ENV_AUTH_URL: &str = "AUTH_URL";
pub(crate) const ENV_TOKEN_URL: &str = "TOKEN_URL";
pub(crate) const ENV_REDIRECT_URI: &str = "REDIRECT_URI";
pub(crate) const ENV_SCOPE: &str = "SCOPE";

/// OAuth client values, read once at startup and shared read-only by every handler.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct OAuthSettings {
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    pub redirect_uri: String,
    pub scope: String,
}

impl OAuthSettings {
    /// Missing keys become empty strings; nothing here fails.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .unwrap_or_default()
        };
        Self {
            client_id: read(ENV_CLIENT_ID),
            client_secret: read(ENV_CLIENT_SECRET),
            auth_url: read(ENV_AUTH_URL),
            token_url: read(ENV_TOKEN_URL),
            redirect_uri: read(ENV_REDIRECT_URI),
            scope: read(ENV_SCOPE),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn missing_keys(&self) -> Vec<&'static str> {
        [
            (ENV_CLIENT_ID, &self.client_id),
            (ENV_CLIENT_SECRET, &self.client_secret),
            (ENV_AUTH_URL, &self.auth_url),
            (ENV_TOKEN_URL, &self.token_url),
            (ENV_REDIRECT_URI, &self.redirect_uri),
            (ENV_SCOPE, &self.scope),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(key, _)| key)
        .collect()
    }
}

impl fmt::Debug for OAuthSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthSettings")
            .field("client_id", &self.client_id)
            .field("client_secret", &mask_token(&self.client_secret))
            .field("auth_url", &self.auth_url)
            .field("token_url", &self.token_url)
            .field("redirect_uri", &self.redirect_uri)
            .field("scope", &self.scope)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// `None` keeps the outbound token call unbounded.
    pub token_timeout: Option<Duration>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            token_timeout: timeout_from_seconds(DEFAULT_TOKEN_TIMEOUT_SECONDS),
        }
    }
}

pub(crate) fn timeout_from_seconds(seconds: u64) -> Option<Duration> {
    if seconds == 0 {
        None
    } else {
        Some(Duration::from_secs(seconds))
    }
}

/// Loads a dotenv file into the process environment. Existing variables win.
///
/// Without an explicit path a missing `.env` is fine; an explicit path must be readable.
pub fn load_env_file(path: Option<&Path>) -> AppResult<Option<PathBuf>> {
    match path {
        Some(path) => {
            dotenvy::from_path(path).map_err(|e| {
                AppError::new(
                    CONFIG_ERROR,
                    format!("failed to load env file {}: {e}", path.display()),
                )
                .with_source(e)
            })?;
            Ok(Some(path.to_path_buf()))
        }
        None => match dotenvy::dotenv() {
            Ok(found) => Ok(Some(found)),
            Err(err) if err.not_found() => Ok(None),
            Err(err) => Err(AppError::new(
                CONFIG_ERROR,
                format!("failed to load .env: {err}"),
            )
            .with_source(err)),
        },
    }
}
