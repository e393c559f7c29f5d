//! Usage: `/callback` handler: provider redirect -> token exchange -> console report.

use super::token_exchange::exchange_authorization_code;
use crate::gateway::server::BootstrapAppState;
use crate::shared::error::{AppError, UPSTREAM_MALFORMED_RESPONSE};
use crate::shared::html::escape_html;
use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

pub(crate) const NO_CODE_MESSAGE: &str = "No authorization code received";
pub(crate) const EXCHANGE_FAILED_MESSAGE: &str = "Failed to exchange token";
pub(crate) const MALFORMED_RESPONSE_MESSAGE: &str =
    "Failed to exchange token: malformed provider response";

const SUCCESS_HTML: &str = "
      <h2>OAuth Success</h2>
      <p>Refresh token received.</p>
      <p><strong>YOU MAY CLOSE THIS PAGE.</strong></p>
      <p>Check the terminal for the refresh_token.</p>
    ";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct OAuthCallbackPayload {
    pub(crate) code: Option<String>,
    pub(crate) state: Option<String>,
    pub(crate) error: Option<String>,
    pub(crate) error_description: Option<String>,
}

/// Empty values count as absent; a repeated key keeps its last value.
pub(crate) fn parse_callback_query(query: Option<&str>) -> OAuthCallbackPayload {
    let mut payload = OAuthCallbackPayload::default();
    let Some(query) = query else {
        return payload;
    };

    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        let slot = match key.as_ref() {
            "code" => &mut payload.code,
            "state" => &mut payload.state,
            "error" => &mut payload.error,
            "error_description" => &mut payload.error_description,
            _ => continue,
        };
        *slot = Some(value.into_owned()).filter(|v| !v.is_empty());
    }

    payload
}

pub(crate) fn render_provider_error(error: &str, description: Option<&str>) -> String {
    match description {
        Some(description) => format!(
            "OAuth Error: {} ({})",
            escape_html(error),
            escape_html(description)
        ),
        None => format!("OAuth Error: {}", escape_html(error)),
    }
}

fn exchange_failure_response(err: &AppError) -> Response {
    let body = if err.code() == UPSTREAM_MALFORMED_RESPONSE {
        MALFORMED_RESPONSE_MESSAGE
    } else {
        EXCHANGE_FAILED_MESSAGE
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Html(body)).into_response()
}

pub(crate) async fn callback(
    State(state): State<BootstrapAppState>,
    RawQuery(query): RawQuery,
) -> Response {
    let payload = parse_callback_query(query.as_deref());

    if let Some(error) = payload.error.as_deref() {
        tracing::warn!(
            error,
            error_description = payload.error_description.as_deref().unwrap_or("<none>"),
            "oauth provider redirected with an error"
        );
        let body = render_provider_error(error, payload.error_description.as_deref());
        return (StatusCode::BAD_REQUEST, Html(body)).into_response();
    }

    let Some(code) = payload.code.as_deref() else {
        tracing::warn!("oauth callback without authorization code");
        return (StatusCode::BAD_REQUEST, Html(NO_CODE_MESSAGE)).into_response();
    };

    if let Some(oauth_state) = payload.state.as_deref() {
        tracing::debug!(state = oauth_state, "oauth callback carried a state parameter");
    }

    match exchange_authorization_code(&state.client, &state.settings, code).await {
        Ok(token) => {
            tracing::info!(
                has_refresh_token = token.refresh_token.is_some(),
                token_type = token.token_type.as_deref().unwrap_or("<none>"),
                scope = token.scope.as_deref().unwrap_or("<none>"),
                expires_in = token.expires_in_seconds(),
                extra_fields = token.extra.len(),
                "oauth token exchange completed"
            );
            state.reporter.report(&token);
            (StatusCode::OK, Html(SUCCESS_HTML)).into_response()
        }
        Err(err) => {
            tracing::error!(code = err.code(), "oauth token exchange failed: {}", err);
            exchange_failure_response(&err)
        }
    }
}
