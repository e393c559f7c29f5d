//! Usage: Authorization URL construction and the `/login` page.

use crate::gateway::server::BootstrapAppState;
use crate::infra::settings::OAuthSettings;
use axum::extract::State;
use axum::response::Html;

/// Builds `<auth_url>?response_type=code&client_id=..&redirect_uri=..&scope=..`.
///
/// Values are percent-encoded; empty config values still produce a (broken) link.
pub(crate) fn build_authorize_url(settings: &OAuthSettings) -> String {
    let separator = if settings.auth_url.contains('?') {
        '&'
    } else {
        '?'
    };
    format!(
        "{auth_url}{separator}response_type=code&client_id={client_id}&redirect_uri={redirect_uri}&scope={scope}",
        auth_url = settings.auth_url,
        client_id = urlencoding::encode(&settings.client_id),
        redirect_uri = urlencoding::encode(&settings.redirect_uri),
        scope = urlencoding::encode(&settings.scope),
    )
}

pub(crate) fn render_login_page(authorize_url: &str) -> String {
    format!(
        "\n    <h2>OAuth Login</h2>\n    <a href=\"{}\">Login via OAuth Provider</a>\n  ",
        authorize_url.replace('"', "%22")
    )
}

pub(crate) async fn login(State(state): State<BootstrapAppState>) -> Html<String> {
    let authorize_url = build_authorize_url(&state.settings);
    tracing::debug!(authorize_url = %authorize_url, "serving oauth login page");
    Html(render_login_page(&authorize_url))
}
