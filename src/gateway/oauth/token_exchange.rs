//! Usage: OAuth token endpoint call for the authorization_code grant.

use crate::infra::settings::OAuthSettings;
use crate::shared::error::{
    AppError, AppResult, CONFIG_ERROR, UPSTREAM_MALFORMED_RESPONSE, UPSTREAM_REQUEST_FAILED,
    UPSTREAM_TIMEOUT,
};
use crate::shared::security::{is_sensitive_key, mask_token};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const ERROR_SNIPPET_MAX_CHARS: usize = 500;

/// Token endpoint payload. Every field is optional; unknown fields land in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(default)]
    pub(crate) access_token: Option<String>,
    #[serde(default)]
    pub(crate) refresh_token: Option<String>,
    #[serde(default)]
    pub(crate) expires_in: Option<Value>,
    #[serde(default)]
    pub(crate) token_type: Option<String>,
    #[serde(default)]
    pub(crate) scope: Option<String>,
    #[serde(flatten)]
    pub(crate) extra: Map<String, Value>,
}

impl TokenResponse {
    pub(crate) fn expires_in_seconds(&self) -> Option<i64> {
        self.expires_in.as_ref().and_then(parse_i64_lossy)
    }

    /// Printable `expires_in`: the parsed number, or the raw JSON when it is not numeric.
    pub(crate) fn expires_in_display(&self) -> Option<String> {
        match (self.expires_in_seconds(), self.expires_in.as_ref()) {
            (Some(seconds), _) => Some(seconds.to_string()),
            (None, None | Some(Value::Null)) => None,
            (None, Some(raw)) => Some(raw.to_string()),
        }
    }
}

pub(crate) fn build_http_client(timeout: Option<Duration>) -> AppResult<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().map_err(|e| {
        AppError::new(CONFIG_ERROR, format!("failed to build http client: {e}")).with_source(e)
    })
}

/// `grant_type=authorization_code&code=<code>&redirect_uri=<uri>`, in that order.
pub(crate) fn build_exchange_form(code: &str, redirect_uri: &str) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .append_pair("grant_type", "authorization_code")
        .append_pair("code", code)
        .append_pair("redirect_uri", redirect_uri)
        .finish()
}

pub(crate) fn basic_authorization(client_id: &str, client_secret: &str) -> String {
    let credentials = STANDARD.encode(format!("{client_id}:{client_secret}"));
    format!("Basic {credentials}")
}

pub(crate) async fn exchange_authorization_code(
    client: &reqwest::Client,
    settings: &OAuthSettings,
    code: &str,
) -> AppResult<TokenResponse> {
    let form = build_exchange_form(code, &settings.redirect_uri);

    let response = client
        .post(settings.token_url.as_str())
        .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
        .header(
            AUTHORIZATION,
            basic_authorization(&settings.client_id, &settings.client_secret),
        )
        .body(form)
        .send()
        .await
        .map_err(|e| upstream_error("token exchange request failed", e))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| upstream_error("token response read failed", e))?;

    tracing::debug!(status = status.as_u16(), "token endpoint responded");
    parse_token_response(status, &body)
}

fn upstream_error(context: &str, err: reqwest::Error) -> AppError {
    let code = if err.is_timeout() {
        UPSTREAM_TIMEOUT
    } else {
        UPSTREAM_REQUEST_FAILED
    };
    AppError::new(code, format!("{context}: {err}")).with_source(err)
}

/// Non-2xx statuses are still parsed and reported; they only add a warning.
pub(crate) fn parse_token_response(
    status: reqwest::StatusCode,
    body: &str,
) -> AppResult<TokenResponse> {
    if !status.is_success() {
        let (error_code, error_message) = parse_oauth_error_details(body);
        tracing::warn!(
            status = status.as_u16(),
            error = error_code.as_deref().unwrap_or("<none>"),
            error_description = error_message.as_deref().unwrap_or("<none>"),
            body = %sanitize_oauth_error_body_snippet(body),
            "token endpoint returned a non-success status"
        );
    }

    let value: Value = serde_json::from_str(body).map_err(|e| {
        AppError::new(
            UPSTREAM_MALFORMED_RESPONSE,
            format!(
                "token response is not valid json: {e}; body={}",
                sanitize_oauth_error_body_snippet(body)
            ),
        )
    })?;
    if !value.is_object() {
        return Err(AppError::new(
            UPSTREAM_MALFORMED_RESPONSE,
            "token response json is not an object",
        ));
    }

    serde_json::from_value(value).map_err(|e| {
        AppError::new(
            UPSTREAM_MALFORMED_RESPONSE,
            format!("token response has unexpected field types: {e}"),
        )
    })
}

fn parse_i64_lossy(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn redact_sensitive_json_fields(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                if is_sensitive_key(key) {
                    if let Some(raw) = nested.as_str() {
                        *nested = Value::String(mask_token(raw));
                        continue;
                    }
                }
                redact_sensitive_json_fields(nested);
            }
        }
        Value::Array(items) => {
            for nested in items {
                redact_sensitive_json_fields(nested);
            }
        }
        _ => {}
    }
}

fn sanitize_oauth_error_body_snippet(body: &str) -> String {
    if let Ok(mut value) = serde_json::from_str::<Value>(body) {
        redact_sensitive_json_fields(&mut value);
        if let Ok(encoded) = serde_json::to_string(&value) {
            return encoded.chars().take(ERROR_SNIPPET_MAX_CHARS).collect();
        }
    }
    body.chars().take(ERROR_SNIPPET_MAX_CHARS).collect()
}

fn parse_oauth_error_details(body: &str) -> (Option<String>, Option<String>) {
    let value: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(_) => return (None, None),
    };

    let non_empty = |v: &Value| {
        v.as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let mut code = value.get("error").and_then(non_empty);
    let mut message = value.get("error_description").and_then(non_empty);

    if let Some(err_obj) = value.get("error").and_then(Value::as_object) {
        if code.is_none() {
            code = err_obj
                .get("code")
                .or_else(|| err_obj.get("type"))
                .and_then(non_empty);
        }
        if message.is_none() {
            message = err_obj.get("message").and_then(non_empty);
        }
    }

    (code, message)
}
