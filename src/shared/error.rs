//! Usage: Unified error model for the bootstrap server (`CODE: message` display).

use std::sync::Arc;

pub type AppResult<T> = Result<T, AppError>;

pub(crate) const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub(crate) const SYSTEM_ERROR: &str = "SYSTEM_ERROR";
pub(crate) const UPSTREAM_REQUEST_FAILED: &str = "UPSTREAM_REQUEST_FAILED";
pub(crate) const UPSTREAM_TIMEOUT: &str = "UPSTREAM_TIMEOUT";
pub(crate) const UPSTREAM_MALFORMED_RESPONSE: &str = "UPSTREAM_MALFORMED_RESPONSE";

#[derive(Debug, Clone, thiserror::Error)]
#[error("{code}: {message}")]
pub struct AppError {
    code: String,
    message: String,
    #[source]
    source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn with_source(
        mut self,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn display_joins_code_and_message() {
        let err = AppError::new(UPSTREAM_TIMEOUT, "token endpoint took too long");
        assert_eq!(err.code(), UPSTREAM_TIMEOUT);
        assert_eq!(err.message(), "token endpoint took too long");
        assert_eq!(
            err.to_string(),
            "UPSTREAM_TIMEOUT: token endpoint took too long"
        );
        assert!(err.source().is_none());
    }

    #[test]
    fn with_source_is_exposed_through_error_trait() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing .env");
        let err = AppError::new(CONFIG_ERROR, "env file unreadable").with_source(io);
        assert!(err.source().is_some());
    }
}
