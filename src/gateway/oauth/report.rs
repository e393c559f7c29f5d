//! Usage: Where a successfully exchanged token ends up (stdout banner by default).

use super::token_exchange::TokenResponse;
use std::io::Write;

const BANNER_RULE: &str = "====================================";
const MISSING: &str = "<missing>";

/// Receives the token set after a successful exchange.
pub(crate) trait TokenReporter: Send + Sync {
    fn report(&self, token: &TokenResponse);
}

/// Prints the banner to stdout so the operator can copy the refresh token.
pub(crate) struct ConsoleTokenReporter;

impl TokenReporter for ConsoleTokenReporter {
    fn report(&self, token: &TokenResponse) {
        if let Err(err) = write_banner(&mut std::io::stdout().lock(), token) {
            tracing::error!("failed to write token banner to stdout: {}", err);
        }
    }
}

pub(crate) fn write_banner(out: &mut impl Write, token: &TokenResponse) -> std::io::Result<()> {
    out.write_all(render_banner(token).as_bytes())?;
    out.flush()
}

pub(crate) fn render_banner(token: &TokenResponse) -> String {
    let access_token = token.access_token.as_deref().unwrap_or(MISSING);
    let refresh_token = token.refresh_token.as_deref().unwrap_or(MISSING);
    let expires_in = token
        .expires_in_display()
        .unwrap_or_else(|| MISSING.to_string());

    format!(
        "{BANNER_RULE}\nACCESS TOKEN: {access_token}\nREFRESH TOKEN: {refresh_token}\nEXPIRES IN: {expires_in}\n{BANNER_RULE}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn banner_lists_the_three_fields_between_rules() {
        let token = TokenResponse {
            access_token: Some("A".to_string()),
            refresh_token: Some("R".to_string()),
            expires_in: Some(Value::from(3600)),
            ..TokenResponse::default()
        };
        assert_eq!(
            render_banner(&token),
            "====================================\n\
             ACCESS TOKEN: A\n\
             REFRESH TOKEN: R\n\
             EXPIRES IN: 3600\n\
             ====================================\n"
        );
    }

    #[test]
    fn write_banner_emits_the_rendered_banner() {
        let token = TokenResponse {
            access_token: Some("A".to_string()),
            refresh_token: Some("R".to_string()),
            expires_in: Some(Value::from("3600")),
            ..TokenResponse::default()
        };
        let mut out = Vec::new();
        write_banner(&mut out, &token).expect("write banner");
        assert_eq!(String::from_utf8(out).expect("utf8"), render_banner(&token));
    }

    #[test]
    fn write_banner_reports_writer_errors() {
        struct BrokenPipe;
        impl Write for BrokenPipe {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }
        let err = write_banner(&mut BrokenPipe, &TokenResponse::default()).expect_err("fail");
        assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn console_reporter_writes_without_panicking() {
        ConsoleTokenReporter.report(&TokenResponse::default());
    }

    #[test]
    fn banner_marks_missing_fields() {
        let banner = render_banner(&TokenResponse::default());
        assert!(banner.contains("ACCESS TOKEN: <missing>"));
        assert!(banner.contains("REFRESH TOKEN: <missing>"));
        assert!(banner.contains("EXPIRES IN: <missing>"));
    }
}
