//! Twitch OAuth 2.0 authorization code flow.
//!
//! Three requests: send the broadcaster to `/oauth2/authorize`, exchange the
//! returned code at `/oauth2/token`, then refresh at the same endpoint.

use subwatch_config::TwitchConfig;

/// Authorization endpoint path on the OAuth host.
pub const AUTHORIZE_PATH: &str = "/oauth2/authorize";

/// Token endpoint path, used for both code exchange and refresh.
pub const TOKEN_PATH: &str = "/oauth2/token";

/// Token introspection endpoint path.
pub const VALIDATE_PATH: &str = "/oauth2/validate";

/// Scopes the broadcaster must grant.
pub const REQUIRED_SCOPES: &[&str] = &["channel:read:subscriptions"];

/// Build the authorization URL the broadcaster is redirected to.
#[must_use]
pub fn build_auth_url(config: &TwitchConfig) -> String {
    let scope = REQUIRED_SCOPES.join(" ");
    let query = serde_urlencoded::to_string([
        ("response_type", "code"),
        ("client_id", config.client_id.as_str()),
        ("redirect_uri", config.redirect_uri.as_str()),
        ("scope", scope.as_str()),
    ])
    .unwrap_or_default();
    format!(
        "{}{AUTHORIZE_PATH}?{query}",
        config.id_base_url.trim_end_matches('/')
    )
}

/// Form body for exchanging an authorization code.
#[must_use]
pub fn code_form_params(config: &TwitchConfig, code: &str) -> Vec<(&'static str, String)> {
    vec![
        ("client_id", config.client_id.clone()),
        ("client_secret", config.client_secret.clone()),
        ("code", code.to_string()),
        ("grant_type", "authorization_code".to_string()),
        ("redirect_uri", config.redirect_uri.clone()),
    ]
}

/// Form body for minting a new access token from a refresh token.
#[must_use]
pub fn refresh_form_params(
    config: &TwitchConfig,
    refresh_token: &str,
) -> Vec<(&'static str, String)> {
    vec![
        ("client_id", config.client_id.clone()),
        ("client_secret", config.client_secret.clone()),
        ("grant_type", "refresh_token".to_string()),
        ("refresh_token", refresh_token.to_string()),
    ]
}

/// Required scopes absent from `granted`.
#[must_use]
pub fn missing_scopes(granted: &[String]) -> Vec<String> {
    REQUIRED_SCOPES
        .iter()
        .filter(|required| !granted.iter().any(|g| g == *required))
        .map(|s| (*s).to_string())
        .collect()
}
